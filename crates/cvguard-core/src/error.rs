//! Error types module
//!
//! Rejections are values, not faults: every stage of the upload pipeline
//! reports failure by returning one of these, and the caller maps it to a
//! response. Reason strings are safe to show to the uploader; they never
//! carry raw scanner replies, hostnames, or internal state.

use serde::Serialize;

use crate::models::SupportedFormat;

/// Client-correctable problems with an upload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("No file provided")]
    MissingFile,

    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("File too small: {size} bytes (min: {min} bytes)")]
    FileTooSmall { size: usize, min: usize },

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Unsupported file extension: {0}")]
    UnsupportedExtension(String),

    #[error("Unable to determine file type from content")]
    UndeterminedType,

    #[error("File content ({detected}) does not match declared type ({declared})")]
    TypeMismatch { detected: String, declared: String },

    #[error("File is not a valid {0} document")]
    InvalidStructure(SupportedFormat),
}

/// Why an upload was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadRejection {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// Static signature hit, zip-bomb heuristic, or scanner-reported infection.
    /// Never overridable by policy.
    #[error("File rejected: {0}")]
    ThreatDetected(String),

    /// The external scanner could not give an answer and policy is fail-closed.
    #[error("Virus scan unavailable, please retry later")]
    ScannerUnavailable,
}

/// Coarse classification of a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    Validation,
    ThreatDetected,
    ScannerUnavailable,
}

impl UploadRejection {
    pub fn kind(&self) -> RejectionKind {
        match self {
            UploadRejection::Invalid(_) => RejectionKind::Validation,
            UploadRejection::ThreatDetected(_) => RejectionKind::ThreatDetected,
            UploadRejection::ScannerUnavailable => RejectionKind::ScannerUnavailable,
        }
    }

    /// Machine-readable code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            UploadRejection::Invalid(e) => match e {
                ValidationError::MissingFile => "MISSING_FILE",
                ValidationError::UnsupportedContentType(_) => "INVALID_CONTENT_TYPE",
                ValidationError::FileTooSmall { .. } => "FILE_TOO_SMALL",
                ValidationError::FileTooLarge { .. } => "FILE_TOO_LARGE",
                ValidationError::UnsupportedExtension(_) => "INVALID_EXTENSION",
                ValidationError::UndeterminedType => "UNDETERMINED_TYPE",
                ValidationError::TypeMismatch { .. } => "TYPE_MISMATCH",
                ValidationError::InvalidStructure(_) => "INVALID_STRUCTURE",
            },
            UploadRejection::ThreatDetected(_) => "THREAT_DETECTED",
            UploadRejection::ScannerUnavailable => "SCAN_UNAVAILABLE",
        }
    }
}
