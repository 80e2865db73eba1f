use std::path::Path;

use anyhow::Context;
use cvguard_core::{SupportedFormat, UploadCandidate, ValidationResult};

/// Content type sent when the caller gives none and the extension is unknown.
pub const UNKNOWN_CONTENT_TYPE: &str = "application/octet-stream";

/// Read a file from disk into an upload candidate.
///
/// Without an explicit `content_type`, the declared type is inferred from the
/// file extension, the same way a browser would fill it in.
pub fn load_candidate(path: &Path, content_type: Option<&str>) -> anyhow::Result<UploadCandidate> {
    let data = std::fs::read(path).with_context(|| format!("Read {}", path.display()))?;

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let content_type = match content_type {
        Some(t) => t.to_string(),
        None => infer_content_type(&filename).to_string(),
    };

    Ok(UploadCandidate::from_bytes(data, filename, content_type))
}

pub fn infer_content_type(filename: &str) -> &'static str {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .and_then(SupportedFormat::from_extension)
        .map(SupportedFormat::mime_type)
        .unwrap_or(UNKNOWN_CONTENT_TYPE)
}

/// One-line, human-readable verdict.
pub fn summarize(result: &ValidationResult) -> String {
    match (&result.error, &result.details) {
        (None, Some(details)) => format!(
            "accepted: {} ({} bytes), stored as {}",
            details.detected_type,
            details.size,
            details.sanitized_filename.as_deref().unwrap_or("-"),
        ),
        (None, None) => "accepted".to_string(),
        (Some(error), _) => format!("rejected [{}]: {}", error.error_code(), error),
    }
}

/// Initialize tracing for CLI binaries.
///
/// Logs go to stderr so `--json` output on stdout stays parseable.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
