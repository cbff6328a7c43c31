//! Candidate extraction: recognized text in, at most one patient number out.
//!
//! Heuristics run strongest first and the first hit wins:
//!
//! 1. a standalone token of exactly ten digits
//! 2. the printed card layout `DD.DDDD-DDD.D`, reassembled (or calibrated)
//! 3. the longest digit run of ten or more, cut to its first ten digits
//! 4. a ten-digit window over all digits that starts with a known prefix
//! 5. the first ten of all digits joined together (low confidence)

pub mod calibration;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ExtractionConfig;
use crate::models::{Candidate, Extraction, MatchTier, PatientNumber, PATIENT_NUMBER_LEN};

/// Printed card layout, ASCII digits only. Over-length trailing groups are tolerated and trimmed.
static CARD_FORMAT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^0-9])([0-9]{2})\s?[.,]\s?([0-9]{4})\s?[-–—]\s?([0-9]{3,})\s?[.,]\s?([0-9]+)")
        .expect("static regex")
});

/// Digits each card-layout group contributes to the patient number.
const CARD_GROUP_WIDTHS: [usize; 4] = [2, 4, 3, 1];

/// Maximal runs of ASCII digits, in reading order.
pub fn digit_runs(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_ascii_digit())
        .filter(|run| !run.is_empty())
        .collect()
}

pub fn longest_digit_run(text: &str) -> usize {
    digit_runs(text).iter().map(|run| run.len()).max().unwrap_or(0)
}

fn all_digits(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[derive(Debug, Clone)]
pub struct CandidateExtractor {
    known_prefixes: Vec<String>,
}

impl CandidateExtractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            known_prefixes: config.known_prefixes.clone(),
        }
    }

    /// Run every tier over `text` and collect the digit diagnostics.
    pub fn extract(&self, text: &str) -> Extraction {
        let found_numbers: Vec<String> = digit_runs(text).into_iter().map(String::from).collect();
        let total_digits = found_numbers.iter().map(|run| run.len()).sum();

        Extraction {
            candidate: self.find_candidate(text),
            raw_text: text.to_string(),
            found_numbers,
            total_digits,
        }
    }

    pub fn find_candidate(&self, text: &str) -> Option<Candidate> {
        exact_token(text)
            .map(|number| (number, MatchTier::ExactToken))
            .or_else(|| card_format(text))
            .or_else(|| longest_sequence(text).map(|number| (number, MatchTier::LongestSequence)))
            .or_else(|| {
                self.prefix_window(text)
                    .map(|number| (number, MatchTier::PrefixMatch))
            })
            .or_else(|| combined(text).map(|number| (number, MatchTier::CombinedSequences)))
            .map(|(patient_number, tier)| {
                if tier.is_low_confidence() {
                    tracing::debug!(%patient_number, "Patient number combined from multiple sequences");
                }
                Candidate {
                    patient_number,
                    tier,
                }
            })
    }

    /// First ten-digit window, left to right over all digits, that starts with a known prefix.
    pub fn prefix_window(&self, text: &str) -> Option<PatientNumber> {
        let digits = all_digits(text);
        if digits.len() < PATIENT_NUMBER_LEN {
            return None;
        }

        (0..=digits.len() - PATIENT_NUMBER_LEN)
            .map(|start| &digits[start..start + PATIENT_NUMBER_LEN])
            .find(|window| {
                self.known_prefixes
                    .iter()
                    .any(|prefix| !prefix.is_empty() && window.starts_with(prefix.as_str()))
            })
            .and_then(PatientNumber::new)
    }
}

/// A whitespace-delimited token made of exactly ten digits.
pub fn exact_token(text: &str) -> Option<PatientNumber> {
    text.split_whitespace().find_map(PatientNumber::new)
}

/// Reassemble the punctuated card layout, preferring a calibrated correction.
pub fn card_format(text: &str) -> Option<(PatientNumber, MatchTier)> {
    let captures = CARD_FORMAT_RE.captures(text)?;
    let groups: Vec<&str> = (1..=4)
        .map(|i| captures.get(i).map_or("", |m| m.as_str()))
        .collect();

    let reading = format!("{}.{}-{}.{}", groups[0], groups[1], groups[2], groups[3]);
    if let Some(number) = calibration::lookup(&reading) {
        tracing::debug!(%reading, %number, "Applied card calibration");
        return Some((number, MatchTier::MedicalCardCalibrated));
    }

    let assembled: String = groups
        .iter()
        .zip(CARD_GROUP_WIDTHS)
        .map(|(group, width)| group.get(..width).unwrap_or(group))
        .collect();

    PatientNumber::new(assembled).map(|number| (number, MatchTier::MedicalCardFormat))
}

/// Longest digit run of at least ten digits (leftmost on ties), truncated to ten.
pub fn longest_sequence(text: &str) -> Option<PatientNumber> {
    let mut best: Option<&str> = None;
    for run in digit_runs(text) {
        if run.len() >= PATIENT_NUMBER_LEN && best.map_or(true, |b| run.len() > b.len()) {
            best = Some(run);
        }
    }
    best.and_then(PatientNumber::from_leading)
}

/// First ten of all digits in the text, ignoring separators.
pub fn combined(text: &str) -> Option<PatientNumber> {
    PatientNumber::from_leading(&all_digits(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extractor() -> CandidateExtractor {
        CandidateExtractor::new(&ExtractionConfig::default())
    }

    fn candidate(text: &str) -> Option<(String, MatchTier)> {
        extractor()
            .find_candidate(text)
            .map(|c| (c.patient_number.to_string(), c.tier))
    }

    #[test]
    fn test_digit_runs_split_on_any_non_digit() {
        assert_eq!(digit_runs("ab12-34 5\n678x"), vec!["12", "34", "5", "678"]);
        assert!(digit_runs("").is_empty());
        assert!(digit_runs("no digits").is_empty());
    }

    #[test]
    fn test_longest_digit_run() {
        assert_eq!(longest_digit_run("12 12345 123"), 5);
        assert_eq!(longest_digit_run("none"), 0);
    }

    #[test]
    fn test_exact_token_tier() {
        assert_eq!(
            candidate("PATIENT 1234567890 ID"),
            Some(("1234567890".to_string(), MatchTier::ExactToken))
        );
    }

    #[test]
    fn test_exact_token_requires_whole_token() {
        assert!(exact_token("ID:1234567890").is_none());
        assert!(exact_token("12345678901").is_none());
        assert!(exact_token("1234567890\n").is_some());
    }

    #[test]
    fn test_exact_token_preempts_longer_run() {
        assert_eq!(
            candidate("999999999999 1234567890"),
            Some(("1234567890".to_string(), MatchTier::ExactToken))
        );
    }

    #[test]
    fn test_exact_token_preempts_card_format() {
        assert_eq!(
            candidate("39.1217-193.06 5555555555"),
            Some(("5555555555".to_string(), MatchTier::ExactToken))
        );
    }

    #[test]
    fn test_calibrated_card_reading() {
        assert_eq!(
            candidate("39.1217-193.06"),
            Some(("3912171035".to_string(), MatchTier::MedicalCardCalibrated))
        );
    }

    #[test]
    fn test_calibrated_card_reading_with_ocr_spacing() {
        assert_eq!(
            candidate("Nr: 39. 1217 - 193,06"),
            Some(("3912171035".to_string(), MatchTier::MedicalCardCalibrated))
        );
    }

    #[test]
    fn test_card_format_reassembles_groups() {
        assert_eq!(
            candidate("40.5521-874.3"),
            Some(("4055218743".to_string(), MatchTier::MedicalCardFormat))
        );
    }

    #[test]
    fn test_card_format_uses_leading_digits_of_long_groups() {
        assert_eq!(
            card_format("40.5521-8749.37"),
            Some((
                PatientNumber::new("4055218743").unwrap(),
                MatchTier::MedicalCardFormat
            ))
        );
    }

    #[test]
    fn test_card_format_requires_layout() {
        assert!(card_format("40-5521-874-3").is_none());
        assert!(card_format("405521874.3").is_none());
        assert!(card_format("4.5521-874.3").is_none());
    }

    #[test]
    fn test_card_format_preempts_longest_sequence() {
        assert_eq!(
            candidate("40.5521-874.3 ref 77777777777"),
            Some(("4055218743".to_string(), MatchTier::MedicalCardFormat))
        );
    }

    #[test]
    fn test_longest_sequence_truncates_to_first_ten() {
        assert_eq!(
            candidate("No.123456789012"),
            Some(("1234567890".to_string(), MatchTier::LongestSequence))
        );
    }

    #[test]
    fn test_longest_sequence_picks_longest_run() {
        assert_eq!(
            longest_sequence("a1111111111b222222222222c").map(|n| n.to_string()),
            Some("2222222222".to_string())
        );
    }

    #[test]
    fn test_longest_sequence_prefers_leftmost_on_tie() {
        assert_eq!(
            longest_sequence("x11111111111y22222222222").map(|n| n.to_string()),
            Some("1111111111".to_string())
        );
    }

    #[test]
    fn test_longest_sequence_preempts_prefix_window() {
        assert_eq!(
            candidate("39 12345678901"),
            Some(("1234567890".to_string(), MatchTier::LongestSequence))
        );
    }

    #[test]
    fn test_prefix_window_scans_concatenated_digits() {
        assert_eq!(
            candidate("12 3912 171 035 88"),
            Some(("3912171035".to_string(), MatchTier::PrefixMatch))
        );
    }

    #[test]
    fn test_prefix_window_uses_configured_prefixes() {
        let extractor = CandidateExtractor::new(&ExtractionConfig {
            known_prefixes: vec!["55".to_string()],
            ..ExtractionConfig::default()
        });
        assert_eq!(
            extractor
                .prefix_window("1 2 55123 45678 9")
                .map(|n| n.to_string()),
            Some("5512345678".to_string())
        );
        assert!(extractor.prefix_window("39121 71035").is_none());
    }

    #[test]
    fn test_combined_fallback_is_low_confidence() {
        let found = extractor().find_candidate("12 34 56 78 90 1").expect("candidate");
        assert_eq!(found.patient_number.as_str(), "1234567890");
        assert_eq!(found.tier, MatchTier::CombinedSequences);
        assert!(found.tier.is_low_confidence());
    }

    #[test]
    fn test_fewer_than_ten_digits_has_no_candidate() {
        let extraction = extractor().extract("12 34 56 78 9");
        assert!(extraction.candidate.is_none());
        assert_eq!(extraction.found_numbers, vec!["12", "34", "56", "78", "9"]);
        assert_eq!(extraction.total_digits, 9);
    }

    #[test]
    fn test_empty_text_has_no_candidate() {
        let extraction = extractor().extract("");
        assert!(!extraction.is_success());
        assert_eq!(extraction.raw_text, "");
        assert!(extraction.found_numbers.is_empty());
        assert_eq!(extraction.total_digits, 0);
    }

    #[test]
    fn test_extract_reports_diagnostics_on_success() {
        let extraction = extractor().extract("PATIENT 1234567890 ID 7");
        assert!(extraction.is_success());
        assert_eq!(extraction.found_numbers, vec!["1234567890", "7"]);
        assert_eq!(extraction.total_digits, 11);
    }

    #[test]
    fn test_non_ascii_digits_are_ignored() {
        assert!(extractor().find_candidate("١٢٣٤٥٦٧٨٩٠").is_none());
    }

    #[test]
    fn test_card_layout_in_non_ascii_digits_is_not_a_match() {
        assert!(card_format("١٢.١٢٣٤-١٢٣.١").is_none());

        let extraction = extractor().extract("١٢.١٢٣٤-١٢٣.١");
        assert!(extraction.candidate.is_none());
        assert_eq!(extraction.total_digits, 0);
    }

    #[test]
    fn test_card_layout_next_to_non_ascii_digits() {
        assert_eq!(
            card_format("١40.5521-874.3").map(|(n, tier)| (n.to_string(), tier)),
            Some(("4055218743".to_string(), MatchTier::MedicalCardFormat))
        );
    }
}
