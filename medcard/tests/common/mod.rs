#![allow(dead_code)]

use std::io::Cursor;

use base64::Engine;
use image::{GrayImage, ImageFormat, Luma};

use medcard::config::{Config, ExtractionConfig, OcrConfig, ServerConfig};
use medcard::error::Result;
use medcard::ocr::{BoxedEngine, OcrProvider, RecognitionEngine, RecognitionMode};

/// Config that does not depend on the process environment.
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            max_body_bytes: 4 * 1024 * 1024,
            request_timeout_secs: 10,
        },
        ocr: OcrConfig::default(),
        extraction: ExtractionConfig::default(),
    }
}

/// A small striped card-like image, PNG encoded.
pub fn card_png() -> Vec<u8> {
    let img = GrayImage::from_fn(48, 24, |x, y| {
        if (x / 3 + y / 4) % 2 == 0 {
            Luma([30])
        } else {
            Luma([220])
        }
    });
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encode test image");
    bytes
}

pub fn card_png_base64() -> String {
    base64::engine::general_purpose::STANDARD.encode(card_png())
}

/// Engine that answers by recognition mode and ignores the image.
#[derive(Debug, Clone, Default)]
pub struct ModeScriptedEngine {
    answers: Vec<(RecognitionMode, String)>,
}

impl ModeScriptedEngine {
    pub fn answer(mut self, mode: RecognitionMode, text: &str) -> Self {
        self.answers.push((mode, text.to_string()));
        self
    }
}

impl RecognitionEngine for ModeScriptedEngine {
    fn recognize(&mut self, _image: &GrayImage, mode: RecognitionMode) -> Result<String> {
        Ok(self
            .answers
            .iter()
            .find(|(m, _)| *m == mode)
            .map(|(_, text)| text.clone())
            .unwrap_or_default())
    }
}

pub fn scripted_provider(engine: ModeScriptedEngine) -> OcrProvider {
    OcrProvider::with_factory(2, move || Ok(Box::new(engine.clone()) as BoxedEngine))
}
