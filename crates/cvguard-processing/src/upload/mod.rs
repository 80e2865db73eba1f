//! Upload validation: declared metadata → content → static threats → scan.

pub mod traits;

mod pipeline;

pub use pipeline::ValidationPipeline;
pub use traits::VirusScanner;
