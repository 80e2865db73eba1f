pub mod scan;
pub mod upload;

pub use scan::AvScanResult;
pub use upload::{
    SupportedFormat, UploadCandidate, ValidationDetails, ValidationResult, DOC_SIGNATURES,
    PDF_SIGNATURES, PDF_TRAILERS, ZIP_SIGNATURES,
};
