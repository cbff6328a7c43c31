use serde::Serialize;

/// Number of digits in every patient number.
pub const PATIENT_NUMBER_LEN: usize = 10;

/// A patient identifier: always exactly ten ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, utoipa::ToSchema)]
#[schema(value_type = String, example = "3912171035")]
pub struct PatientNumber(String);

impl PatientNumber {
    /// Returns `None` unless `digits` is exactly ten ASCII digits.
    pub fn new(digits: impl Into<String>) -> Option<Self> {
        let digits = digits.into();
        if digits.len() == PATIENT_NUMBER_LEN && digits.bytes().all(|b| b.is_ascii_digit()) {
            Some(Self(digits))
        } else {
            None
        }
    }

    /// Takes the first ten characters of a digit string.
    pub fn from_leading(digits: &str) -> Option<Self> {
        digits.get(..PATIENT_NUMBER_LEN).and_then(Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PatientNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PatientNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
