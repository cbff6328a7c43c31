pub(crate) mod health;
pub(crate) mod ocr;
pub(crate) mod status;

pub use health::health_check;
pub use ocr::process_ocr;
pub use status::api_status;
