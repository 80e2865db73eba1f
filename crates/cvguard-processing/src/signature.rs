//! Magic-byte and trailer matching.

use cvguard_core::constants::TRAILER_SEARCH_WINDOW;
use memchr::memmem;
use subtle::{Choice, ConstantTimeEq};

/// True if `buffer` starts with any of `signatures`.
///
/// Each candidate prefix is compared in constant time, and every candidate is
/// checked even after a hit, so timing does not reveal where a mismatch
/// occurred. Empty signatures never match and an empty buffer never matches.
pub fn matches_signature(buffer: &[u8], signatures: &[&[u8]]) -> bool {
    if buffer.is_empty() {
        return false;
    }

    let mut matched = Choice::from(0u8);
    for sig in signatures {
        if sig.is_empty() || buffer.len() < sig.len() {
            continue;
        }
        matched |= buffer[..sig.len()].ct_eq(sig);
    }
    matched.into()
}

/// True if any trailer appears within the last [`TRAILER_SEARCH_WINDOW`] bytes.
pub fn has_trailer(buffer: &[u8], trailers: &[&[u8]]) -> bool {
    let tail = &buffer[buffer.len().saturating_sub(TRAILER_SEARCH_WINDOW)..];
    trailers
        .iter()
        .any(|t| !t.is_empty() && memmem::find(tail, t).is_some())
}
