//! CVGuard Core Library
//!
//! Domain models, error taxonomy, constants, and configuration shared by the
//! upload validation pipeline and the scanner client.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{AvScanConfig, UploadConfig};
pub use error::{RejectionKind, UploadRejection, ValidationError};
pub use models::{
    AvScanResult, SupportedFormat, UploadCandidate, ValidationDetails, ValidationResult,
};
