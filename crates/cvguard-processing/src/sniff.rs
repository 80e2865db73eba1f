//! Content-based type detection.

use cvguard_core::SupportedFormat;

use crate::signature::matches_signature;

/// Identify the document format from its leading bytes.
///
/// Formats are tried in [`SupportedFormat::ALL`] order (PDF, DOC, DOCX) and the
/// first match wins.
pub fn sniff_type(buffer: &[u8]) -> Option<SupportedFormat> {
    SupportedFormat::ALL
        .into_iter()
        .find(|format| matches_signature(buffer, format.signatures()))
}
