use image::{GrayImage, ImageFormat};
use leptess::{LepTess, Variable};

use super::RecognitionMode;
use crate::error::{MedcardError, Result};

/// A text-recognition backend.
///
/// Implementations are used by one request at a time and may keep mutable
/// state between calls, but every call must fully reconfigure the engine for `mode`.
pub trait RecognitionEngine {
    fn recognize(&mut self, image: &GrayImage, mode: RecognitionMode) -> Result<String>;
}

pub type BoxedEngine = Box<dyn RecognitionEngine + Send>;

/// Local Tesseract via leptess.
pub struct TesseractEngine {
    tesseract: LepTess,
}

impl TesseractEngine {
    pub fn new(datapath: Option<&str>, languages: &str) -> Result<Self> {
        let tesseract = LepTess::new(datapath, languages).map_err(|e| {
            MedcardError::EngineUnavailable(format!("Tesseract not available: {e}"))
        })?;
        Ok(Self { tesseract })
    }

    fn configure(&mut self, mode: RecognitionMode) -> Result<()> {
        let psm = mode.page_seg_mode().to_string();
        self.tesseract
            .set_variable(Variable::TesseditPagesegMode, &psm)
            .map_err(|e| MedcardError::RecognitionConfig {
                mode,
                message: format!("Failed to set page segmentation mode: {e:?}"),
            })?;

        // An empty whitelist lifts the restriction left by a previous digits-only pass
        let whitelist = mode.char_whitelist().unwrap_or("");
        self.tesseract
            .set_variable(Variable::TesseditCharWhitelist, whitelist)
            .map_err(|e| MedcardError::RecognitionConfig {
                mode,
                message: format!("Failed to set character whitelist: {e:?}"),
            })
    }
}

impl RecognitionEngine for TesseractEngine {
    fn recognize(&mut self, image: &GrayImage, mode: RecognitionMode) -> Result<String> {
        let encoded = encode_png(image).map_err(|message| MedcardError::RecognitionConfig {
            mode,
            message,
        })?;

        self.configure(mode)?;

        self.tesseract
            .set_image_from_mem(&encoded)
            .map_err(|e| MedcardError::RecognitionConfig {
                mode,
                message: format!("Failed to set image: {e}"),
            })?;

        let text = self
            .tesseract
            .get_utf8_text()
            .map_err(|e| MedcardError::RecognitionConfig {
                mode,
                message: format!("Failed to extract text: {e}"),
            })?;

        Ok(text.trim().to_string())
    }
}

fn encode_png(image: &GrayImage) -> std::result::Result<Vec<u8>, String> {
    let mut output = Vec::new();
    image
        .write_to(&mut std::io::Cursor::new(&mut output), ImageFormat::Png)
        .map_err(|e| format!("Failed to encode image: {e}"))?;
    Ok(output)
}
