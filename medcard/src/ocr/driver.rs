use image::GrayImage;
use tracing::{debug, info, warn};

use super::engine::RecognitionEngine;
use super::preprocessing::{PreprocessedVariant, ORIGINAL_VARIANT};
use super::RecognitionMode;
use crate::extraction::longest_digit_run;
use crate::models::RecognitionAttempt;

/// Every attempt made for one request, in the order they ran.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sweep {
    pub attempts: Vec<RecognitionAttempt>,
    /// Index into `attempts` of the first text that met the acceptance predicate.
    pub accepted: Option<usize>,
}

impl Sweep {
    pub fn accepted_attempt(&self) -> Option<&RecognitionAttempt> {
        self.accepted.and_then(|i| self.attempts.get(i))
    }
}

/// Runs the engine over (image, mode) pairs in priority order.
///
/// The plan is every preprocessed variant crossed with [`RecognitionMode::SWEEP`],
/// followed by the same modes on the untouched grayscale image. The sweep stops
/// at the first text containing a digit run of at least `acceptance_run_length`.
#[derive(Debug, Clone)]
pub struct RecognitionDriver {
    acceptance_run_length: usize,
}

struct Step<'a> {
    variant: &'static str,
    image: &'a GrayImage,
    mode: RecognitionMode,
}

impl RecognitionDriver {
    pub fn new(acceptance_run_length: usize) -> Self {
        Self {
            acceptance_run_length,
        }
    }

    pub fn accepts(&self, text: &str) -> bool {
        longest_digit_run(text) >= self.acceptance_run_length
    }

    /// Short-circuiting sweep. `engine` is `None` when no engine is available,
    /// in which case nothing runs and the sweep is empty.
    pub fn sweep(
        &self,
        engine: Option<&mut dyn RecognitionEngine>,
        variants: &[PreprocessedVariant],
        original: &GrayImage,
    ) -> Sweep {
        self.run(engine, variants, original, true)
    }

    /// Run the whole plan without stopping early. Used for diagnostics.
    pub fn sweep_all(
        &self,
        engine: Option<&mut dyn RecognitionEngine>,
        variants: &[PreprocessedVariant],
        original: &GrayImage,
    ) -> Sweep {
        self.run(engine, variants, original, false)
    }

    fn run(
        &self,
        engine: Option<&mut dyn RecognitionEngine>,
        variants: &[PreprocessedVariant],
        original: &GrayImage,
        stop_early: bool,
    ) -> Sweep {
        let mut sweep = Sweep::default();

        let Some(engine) = engine else {
            warn!("OCR engine unavailable, skipping recognition");
            return sweep;
        };

        for step in plan(variants, original) {
            let text = match engine.recognize(step.image, step.mode) {
                Ok(text) => text,
                Err(e) => {
                    warn!(
                        variant = step.variant,
                        mode = %step.mode,
                        error = %e,
                        "Recognition attempt failed"
                    );
                    continue;
                }
            };

            debug!(variant = step.variant, mode = %step.mode, %text, "Recognition attempt");

            let accepted = self.accepts(&text);
            sweep.attempts.push(RecognitionAttempt {
                variant: step.variant,
                mode: step.mode,
                text,
            });

            if accepted && sweep.accepted.is_none() {
                sweep.accepted = Some(sweep.attempts.len() - 1);
                info!(
                    variant = step.variant,
                    mode = %step.mode,
                    attempts = sweep.attempts.len(),
                    "Accepted recognition result"
                );
                if stop_early {
                    break;
                }
            }
        }

        sweep
    }
}

fn plan<'a>(variants: &'a [PreprocessedVariant], original: &'a GrayImage) -> Vec<Step<'a>> {
    let images = variants
        .iter()
        .map(|v| (v.name, &v.pixels))
        .chain(std::iter::once((ORIGINAL_VARIANT, original)));

    images
        .flat_map(|(variant, image)| {
            RecognitionMode::SWEEP.into_iter().map(move |mode| Step {
                variant,
                image,
                mode,
            })
        })
        .collect()
}
