mod scanner;

pub use scanner::{decode_base64_image, run_pipeline, select_result, CardScanner};
