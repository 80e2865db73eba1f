//! CVGuard Processing Library
//!
//! Content inspection for uploaded CV documents: magic-byte sniffing,
//! structure checks, filename sanitization, static threat heuristics, and the
//! pipeline that strings them together.

pub mod filename;
pub mod malware;
pub mod signature;
pub mod sniff;
pub mod structure;
pub mod upload;
pub mod validator;
pub mod zipbomb;

pub use filename::sanitize_filename;
pub use malware::{contains_known_signature, find_known_signature, EICAR_TEST_STRING};
pub use signature::{has_trailer, matches_signature};
pub use sniff::sniff_type;
pub use structure::{find_polyglot_marker, validate_structure};
pub use upload::{ValidationPipeline, VirusScanner};
pub use validator::{normalize_content_type, DocumentValidator};
pub use zipbomb::looks_like_zip_bomb;
