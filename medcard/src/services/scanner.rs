use std::cmp::Reverse;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use tracing::{debug, info, Instrument};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{MedcardError, Result};
use crate::extraction::{digit_runs, CandidateExtractor};
use crate::models::{RecognitionAttempt, ScanResult};
use crate::ocr::{
    generate_variants, normalize, EngineLease, OcrProvider, RecognitionDriver, RecognitionEngine,
    Sweep,
};

/// Reads the patient number off a card photo, end to end.
///
/// Cheap to clone; clones share the engine pool.
#[derive(Clone)]
pub struct CardScanner {
    ocr: OcrProvider,
    driver: RecognitionDriver,
    extractor: Arc<CandidateExtractor>,
    timeout: Duration,
}

impl CardScanner {
    pub fn new(config: &Config, ocr: OcrProvider) -> Self {
        Self {
            ocr,
            driver: RecognitionDriver::new(config.extraction.acceptance_run_length),
            extractor: Arc::new(CandidateExtractor::new(&config.extraction)),
            timeout: Duration::from_secs(config.server.request_timeout_secs),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn ocr(&self) -> &OcrProvider {
        &self.ocr
    }

    /// Decode a base64 upload and scan it.
    pub async fn scan_base64(&self, encoded: &str) -> Result<ScanResult> {
        let bytes = decode_base64_image(encoded)?;
        self.scan(bytes).await
    }

    pub async fn scan(&self, image_bytes: Vec<u8>) -> Result<ScanResult> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("scan", %request_id);

        async move {
            info!(bytes = image_bytes.len(), "Scanning card image");

            let driver = self.driver.clone();
            let extractor = Arc::clone(&self.extractor);
            let result = self
                .run_blocking(move |engine| {
                    run_pipeline(&image_bytes, engine, &driver, &extractor)
                })
                .await?;

            match &result {
                ScanResult::Found(found) => info!(
                    method = %found.method,
                    pattern_type = %found.pattern_type,
                    "Patient number recognized"
                ),
                ScanResult::NotFound(failure) => info!(
                    total_digits = failure.total_digits,
                    "No patient number found"
                ),
            }

            Ok(result)
        }
        .instrument(span)
        .await
    }

    /// Every variant and mode without early termination, for diagnosing bad scans.
    pub async fn inspect(&self, image_bytes: Vec<u8>) -> Result<Vec<RecognitionAttempt>> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("inspect", %request_id);

        let driver = self.driver.clone();
        self.run_blocking(move |engine| {
            let gray = normalize(&image_bytes)?;
            let variants = generate_variants(&gray);
            Ok(driver.sweep_all(engine, &variants, &gray).attempts)
        })
        .instrument(span)
        .await
    }

    /// Check out an engine and run `job` on the blocking pool under the request timeout.
    async fn run_blocking<T, F>(&self, job: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(Option<&mut dyn RecognitionEngine>) -> Result<T> + Send + 'static,
    {
        let ocr = self.ocr.clone();
        let span = tracing::Span::current();

        let work = async move {
            let lease = ocr.acquire().await?;
            tokio::task::spawn_blocking(move || {
                let _entered = span.enter();
                with_engine(lease, job)
            })
            .await
            .map_err(|e| MedcardError::Internal(format!("Scan worker failed: {e}")))?
        };

        match tokio::time::timeout(self.timeout, work).await {
            Ok(result) => result,
            Err(_) => Err(MedcardError::Timeout(self.timeout.as_secs())),
        }
    }
}

fn with_engine<T>(
    mut lease: Option<EngineLease>,
    job: impl FnOnce(Option<&mut dyn RecognitionEngine>) -> Result<T>,
) -> Result<T> {
    let engine = lease
        .as_mut()
        .and_then(|lease| lease.engine())
        .map(|engine| engine as &mut dyn RecognitionEngine);
    job(engine)
}

/// Decode, preprocess, recognize, extract. Synchronous and CPU-bound.
///
/// With no engine the sweep is empty and the result is a failure with empty
/// `raw_text`; no number is ever invented.
pub fn run_pipeline(
    image_bytes: &[u8],
    engine: Option<&mut dyn RecognitionEngine>,
    driver: &RecognitionDriver,
    extractor: &CandidateExtractor,
) -> Result<ScanResult> {
    let gray = normalize(image_bytes)?;
    debug!(
        width = gray.width(),
        height = gray.height(),
        "Normalized image"
    );

    let variants = generate_variants(&gray);
    let sweep = driver.sweep(engine, &variants, &gray);
    Ok(select_result(&sweep, extractor))
}

/// Pick the reported outcome of a sweep.
///
/// The accepted attempt is tried first, then every attempt in sweep order.
/// On failure the diagnostics come from the attempt with the most digits.
pub fn select_result(sweep: &Sweep, extractor: &CandidateExtractor) -> ScanResult {
    let found = sweep
        .accepted_attempt()
        .into_iter()
        .chain(sweep.attempts.iter())
        .find_map(|attempt| {
            let extraction = extractor.extract(&attempt.text);
            extraction
                .is_success()
                .then(|| ScanResult::assemble(extraction, Some(attempt.method())))
        });

    if let Some(result) = found {
        return result;
    }

    let richest = sweep
        .attempts
        .iter()
        .min_by_key(|attempt| Reverse(digit_count(&attempt.text)))
        .map_or("", |attempt| attempt.text.as_str());

    ScanResult::assemble(extractor.extract(richest), None)
}

fn digit_count(text: &str) -> usize {
    digit_runs(text).iter().map(|run| run.len()).sum()
}

/// Raw image bytes from the `image` field of a scan request.
///
/// Accepts plain base64 or a `data:<mime>;base64,` URL; embedded whitespace is ignored.
pub fn decode_base64_image(encoded: &str) -> Result<Vec<u8>> {
    let trimmed = encoded.trim();
    let payload = match trimmed.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(";base64,")
            .map(|(_, data)| data)
            .ok_or_else(|| MedcardError::Decode("Data URL is not base64 encoded".to_string()))?,
        None => trimmed,
    };

    let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return Err(MedcardError::Decode("Image payload is empty".to_string()));
    }

    base64::engine::general_purpose::STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|e| MedcardError::Decode(format!("Invalid base64 image data: {e}")))
}
