use std::sync::Arc;

use crate::config::Config;
use crate::ocr::OcrProvider;
use crate::services::CardScanner;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub scanner: CardScanner,
}

impl AppState {
    pub fn new(config: Config, ocr: OcrProvider) -> Self {
        let scanner = CardScanner::new(&config, ocr);
        Self {
            config: Arc::new(config),
            scanner,
        }
    }

    pub fn ocr(&self) -> &OcrProvider {
        self.scanner.ocr()
    }
}
