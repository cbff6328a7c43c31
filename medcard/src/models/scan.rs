use serde::Serialize;

use super::PatientNumber;
use crate::ocr::RecognitionMode;

/// Text produced by one engine run over one image variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecognitionAttempt {
    pub variant: &'static str,
    pub mode: RecognitionMode,
    pub text: String,
}

impl RecognitionAttempt {
    /// `"<variant>/<mode>"`, reported to callers as `method`.
    pub fn method(&self) -> String {
        format!("{}/{}", self.variant, self.mode)
    }
}

/// Which extraction heuristic produced a candidate, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    /// A standalone token of exactly ten digits.
    ExactToken,
    /// Reassembled from the printed `DD.DDDD-DDD.D` card layout.
    MedicalCardFormat,
    /// A card-layout misread replaced by its verified number.
    MedicalCardCalibrated,
    /// The longest digit run, cut to ten digits.
    LongestSequence,
    /// A ten-digit window starting with a known prefix.
    PrefixMatch,
    /// The first ten digits of all runs joined together.
    CombinedSequences,
}

impl MatchTier {
    pub fn is_low_confidence(&self) -> bool {
        matches!(self, Self::CombinedSequences)
    }
}

impl std::fmt::Display for MatchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExactToken => write!(f, "exact_token"),
            Self::MedicalCardFormat => write!(f, "medical_card_format"),
            Self::MedicalCardCalibrated => write!(f, "medical_card_calibrated"),
            Self::LongestSequence => write!(f, "longest_sequence"),
            Self::PrefixMatch => write!(f, "prefix_match"),
            Self::CombinedSequences => write!(f, "combined_sequences"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub patient_number: PatientNumber,
    pub tier: MatchTier,
}

/// Outcome of running the extractor over recognized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub candidate: Option<Candidate>,
    pub raw_text: String,
    /// Every independent digit run, in reading order.
    pub found_numbers: Vec<String>,
    pub total_digits: usize,
}

impl Extraction {
    pub fn is_success(&self) -> bool {
        self.candidate.is_some()
    }
}

pub const NOT_FOUND_MESSAGE: &str = "Could not find a 10-digit patient number in the image";
pub const NOT_FOUND_SUGGESTION: &str =
    "Hold the card flat, fill the frame with the number and avoid glare, then try again";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct ScanSuccess {
    pub success: bool,
    pub patient_number: PatientNumber,
    pub raw_text: String,
    /// Variant and recognition mode that produced the text.
    pub method: String,
    pub pattern_type: MatchTier,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct ScanFailure {
    pub success: bool,
    pub message: String,
    pub raw_text: String,
    pub found_numbers: Vec<String>,
    pub total_digits: usize,
    pub suggestion: String,
}

/// Body returned by `POST /process_ocr` for every recognized outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum ScanResult {
    Found(ScanSuccess),
    NotFound(ScanFailure),
}

impl ScanResult {
    /// Packages an extraction for the caller. `method` is only reported on success.
    pub fn assemble(extraction: Extraction, method: Option<String>) -> Self {
        match extraction.candidate {
            Some(candidate) => ScanResult::Found(ScanSuccess {
                success: true,
                patient_number: candidate.patient_number,
                raw_text: extraction.raw_text,
                method: method.unwrap_or_else(|| "unknown".to_string()),
                pattern_type: candidate.tier,
            }),
            None => ScanResult::NotFound(ScanFailure {
                success: false,
                message: NOT_FOUND_MESSAGE.to_string(),
                raw_text: extraction.raw_text,
                found_numbers: extraction.found_numbers,
                total_digits: extraction.total_digits,
                suggestion: NOT_FOUND_SUGGESTION.to_string(),
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ScanResult::Found(_))
    }

    pub fn patient_number(&self) -> Option<&PatientNumber> {
        match self {
            ScanResult::Found(found) => Some(&found.patient_number),
            ScanResult::NotFound(_) => None,
        }
    }

    pub fn raw_text(&self) -> &str {
        match self {
            ScanResult::Found(found) => &found.raw_text,
            ScanResult::NotFound(failure) => &failure.raw_text,
        }
    }
}
