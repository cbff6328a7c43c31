//! Reads the 10-digit patient number from a photographed medical card.
//!
//! The pipeline is decode → preprocess → recognize → extract → assemble:
//! [`ocr`] turns bytes into recognized text, [`extraction`] turns text into at
//! most one [`models::PatientNumber`], and [`services::CardScanner`] ties the
//! two together behind the HTTP surface in [`api`].

pub mod api;
pub mod config;
pub mod error;
pub mod extraction;
pub mod models;
pub mod ocr;
pub mod services;
