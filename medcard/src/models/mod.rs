mod patient;
mod scan;

pub use patient::*;
pub use scan::*;
