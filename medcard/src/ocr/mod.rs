//! OCR (Optical Character Recognition) Module
//!
//! Turns a raw card photo into recognized text candidates.
//!
//! # Architecture
//!
//! - `preprocessing`: decodes the upload into grayscale and renders the
//!   binarized variants (Otsu + median, contrast-stretched Otsu, adaptive Gaussian)
//! - `RecognitionMode`: the engine configurations, most restrictive first
//! - `RecognitionEngine` trait, implemented by `TesseractEngine` via leptess
//! - `OcrProvider`: resolves engine availability once at startup and hands out
//!   pooled engines, bounded by `OcrConfig::workers`
//! - `RecognitionDriver`: the ordered (variant, mode) sweep with early termination
//!
//! # Usage
//!
//! ```rust,ignore
//! let gray = normalize(&bytes)?;
//! let variants = generate_variants(&gray);
//! let mut lease = ocr.acquire().await?;
//! let engine = lease.as_mut().and_then(|l| l.engine());
//! let sweep = driver.sweep(engine.map(|e| e as _), &variants, &gray);
//! ```

mod driver;
mod engine;
mod mode;
mod preprocessing;
mod provider;

pub use driver::{RecognitionDriver, Sweep};
pub use engine::{BoxedEngine, RecognitionEngine, TesseractEngine};
pub use mode::RecognitionMode;
pub use preprocessing::{
    generate_variants, normalize, PreprocessedVariant, VariantKind, ORIGINAL_VARIANT,
};
pub use provider::{EngineCapability, EngineLease, OcrProvider};
