use serde::Serialize;

const DIGITS: &str = "0123456789";

/// Engine configuration for a single recognition pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionMode {
    /// One token, digits only (psm 8).
    SingleWordDigits,
    /// General-purpose block layout, any character (psm 6).
    Block,
    /// A single text line (psm 7).
    SingleLine,
    /// Scattered glyphs in no particular order (psm 11).
    SparseText,
}

impl RecognitionMode {
    /// Modes tried against each image, most restrictive first.
    pub const SWEEP: [RecognitionMode; 4] = [
        RecognitionMode::SingleWordDigits,
        RecognitionMode::Block,
        RecognitionMode::SingleLine,
        RecognitionMode::SparseText,
    ];

    /// Tesseract `tessedit_pageseg_mode` value.
    pub fn page_seg_mode(&self) -> u8 {
        match self {
            Self::SingleWordDigits => 8,
            Self::Block => 6,
            Self::SingleLine => 7,
            Self::SparseText => 11,
        }
    }

    pub fn char_whitelist(&self) -> Option<&'static str> {
        match self {
            Self::SingleWordDigits => Some(DIGITS),
            _ => None,
        }
    }
}

impl std::fmt::Display for RecognitionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SingleWordDigits => write!(f, "single_word_digits"),
            Self::Block => write!(f, "block"),
            Self::SingleLine => write!(f, "single_line"),
            Self::SparseText => write!(f, "sparse_text"),
        }
    }
}
