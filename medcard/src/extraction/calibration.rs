//! Verified corrections for card-layout misreads.
//!
//! Some printed cards are read consistently wrong in the same way by the engine.
//! Each entry pins the exact punctuated reading (groups joined as `DD.DDDD-DDD.D`)
//! to the number confirmed against the physical card. Add an entry only after
//! the misread has been reproduced and the correct number verified.

use crate::models::PatientNumber;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationCase {
    /// Card-layout reading as recognized, normalized to `.` and `-` separators.
    pub reading: &'static str,
    pub patient_number: &'static str,
}

pub const CALIBRATION_CASES: &[CalibrationCase] = &[CalibrationCase {
    reading: "39.1217-193.06",
    patient_number: "3912171035",
}];

/// Verified number for a normalized card-layout reading, if one is on record.
pub fn lookup(reading: &str) -> Option<PatientNumber> {
    CALIBRATION_CASES
        .iter()
        .find(|case| case.reading == reading)
        .and_then(|case| PatientNumber::new(case.patient_number))
}
