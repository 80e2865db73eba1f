//! Zip-bomb heuristic for ZIP-backed documents.
//!
//! This does not inflate anything. A genuine Office package carries a minimum
//! amount of internal structure, so a ZIP container below
//! [`ZIP_MIN_CONTAINER_SIZE_BYTES`] is treated as crafted. `max_ratio` is only
//! checked for sanity.

use cvguard_core::constants::ZIP_MIN_CONTAINER_SIZE_BYTES;
use cvguard_core::models::ZIP_SIGNATURES;

use crate::signature::matches_signature;

/// True if a ZIP-signed buffer should be refused as a probable zip bomb.
///
/// Buffers without a ZIP header are never flagged. A non-finite or
/// non-positive `max_ratio` is an unsafe configuration and flags every ZIP.
pub fn looks_like_zip_bomb(buffer: &[u8], max_ratio: f64) -> bool {
    if !matches_signature(buffer, ZIP_SIGNATURES) {
        return false;
    }
    if !max_ratio.is_finite() || max_ratio <= 0.0 {
        tracing::warn!(max_ratio, "Unsafe zip ratio configuration, rejecting ZIP content");
        return true;
    }
    buffer.len() < ZIP_MIN_CONTAINER_SIZE_BYTES
}
