use std::sync::{Arc, Mutex};

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{info, warn};

use super::engine::{BoxedEngine, RecognitionEngine, TesseractEngine};
use crate::config::OcrConfig;
use crate::error::{MedcardError, Result};

type EngineFactory = dyn Fn() -> Result<BoxedEngine> + Send + Sync;

/// Whether a recognition engine could be started. Resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCapability {
    Available,
    Unavailable { reason: String },
}

/// Bounded set of reusable engines. At most `permits` sweeps run at once;
/// idle engines are kept for the next request instead of being re-initialized.
struct EnginePool {
    idle: Mutex<Vec<BoxedEngine>>,
    permits: Arc<Semaphore>,
    factory: Box<EngineFactory>,
}

impl EnginePool {
    fn take(&self) -> Result<BoxedEngine> {
        let reused = self
            .idle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop();
        match reused {
            Some(engine) => Ok(engine),
            None => (self.factory)(),
        }
    }

    fn give_back(&self, engine: BoxedEngine) {
        self.idle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(engine);
    }
}

enum OcrBackend {
    Pooled { pool: Arc<EnginePool> },
    Unavailable { reason: String },
}

#[derive(Clone)]
pub struct OcrProvider {
    backend: Arc<OcrBackend>,
}

/// Exclusive use of one pooled engine for the duration of a request.
/// The engine goes back to the pool when the lease is dropped.
pub struct EngineLease {
    engine: Option<BoxedEngine>,
    pool: Arc<EnginePool>,
    _permit: OwnedSemaphorePermit,
}

impl EngineLease {
    pub fn engine(&mut self) -> Option<&mut (dyn RecognitionEngine + Send + 'static)> {
        self.engine.as_deref_mut()
    }
}

impl Drop for EngineLease {
    fn drop(&mut self) {
        if let Some(engine) = self.engine.take() {
            self.pool.give_back(engine);
        }
    }
}

impl OcrProvider {
    pub fn new(config: &OcrConfig) -> Result<Self> {
        let engine = config.engine.to_lowercase();

        if engine == "none" || engine == "disabled" {
            let reason = "OCR engine disabled by configuration".to_string();
            warn!("{}", reason);
            return Ok(Self::unavailable(reason));
        }

        if engine != "tesseract" {
            return Err(MedcardError::Validation(format!(
                "Unknown OCR engine '{}', expected 'tesseract' or 'none'",
                config.engine
            )));
        }

        // Probe once so a missing install is detected at startup, not per request
        match TesseractEngine::new(config.datapath.as_deref(), &config.languages) {
            Ok(first) => {
                info!(
                    languages = %config.languages,
                    workers = config.workers,
                    "Tesseract OCR initialized"
                );
                let datapath = config.datapath.clone();
                let languages = config.languages.clone();
                let provider = Self::with_factory(config.workers, move || {
                    let engine = TesseractEngine::new(datapath.as_deref(), &languages)?;
                    Ok(Box::new(engine) as BoxedEngine)
                });
                if let OcrBackend::Pooled { pool } = provider.backend.as_ref() {
                    pool.give_back(Box::new(first));
                }
                Ok(provider)
            }
            Err(e) => {
                let reason = e.to_string();
                warn!("{}", reason);
                Ok(Self::unavailable(reason))
            }
        }
    }

    /// Build a provider whose engines come from `factory`, created lazily up to `workers`.
    pub fn with_factory<F>(workers: usize, factory: F) -> Self
    where
        F: Fn() -> Result<BoxedEngine> + Send + Sync + 'static,
    {
        let pool = EnginePool {
            idle: Mutex::new(Vec::new()),
            permits: Arc::new(Semaphore::new(workers.max(1))),
            factory: Box::new(factory),
        };
        Self {
            backend: Arc::new(OcrBackend::Pooled {
                pool: Arc::new(pool),
            }),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            backend: Arc::new(OcrBackend::Unavailable {
                reason: reason.into(),
            }),
        }
    }

    pub fn capability(&self) -> EngineCapability {
        match self.backend.as_ref() {
            OcrBackend::Pooled { .. } => EngineCapability::Available,
            OcrBackend::Unavailable { reason } => EngineCapability::Unavailable {
                reason: reason.clone(),
            },
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.capability(), EngineCapability::Available)
    }

    /// Wait for a free worker slot and check out an engine.
    ///
    /// Returns `Ok(None)` when the engine is unavailable; callers continue in degraded mode.
    pub async fn acquire(&self) -> Result<Option<EngineLease>> {
        let pool = match self.backend.as_ref() {
            OcrBackend::Pooled { pool } => Arc::clone(pool),
            OcrBackend::Unavailable { .. } => return Ok(None),
        };

        let permit = Arc::clone(&pool.permits)
            .acquire_owned()
            .await
            .map_err(|e| MedcardError::Internal(format!("OCR worker pool closed: {e}")))?;

        match pool.take() {
            Ok(engine) => Ok(Some(EngineLease {
                engine: Some(engine),
                pool,
                _permit: permit,
            })),
            Err(MedcardError::EngineUnavailable(reason)) => {
                warn!(%reason, "Could not start an additional OCR engine");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
