//! Fixed limits and allow-lists for CV uploads.

/// Smallest upload accepted, in bytes.
pub const MIN_UPLOAD_SIZE_BYTES: usize = 10;

/// Largest upload accepted, in bytes (5 MiB).
pub const MAX_UPLOAD_SIZE_BYTES: usize = 5 * 1024 * 1024;

/// Maximum length of a sanitized filename.
pub const MAX_FILENAME_LENGTH: usize = 80;

/// Fallback used whenever a filename sanitizes down to nothing.
pub const FALLBACK_FILENAME: &str = "cv";

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOC: &str = "application/msword";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Declared MIME types accepted at the front door.
pub const ALLOWED_MIME_TYPES: &[&str] = &[MIME_PDF, MIME_DOC, MIME_DOCX];

/// Declared filename extensions accepted at the front door (lowercase, no dot).
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx"];

/// Default sanity bound for the zip-bomb heuristic.
pub const ZIP_BOMB_MAX_RATIO: f64 = 100.0;

/// ZIP-backed uploads smaller than this are treated as suspicious.
pub const ZIP_MIN_CONTAINER_SIZE_BYTES: usize = 200;

/// Strict-mode lower bound for an OLE2 compound document (one sector).
pub const OLE_MIN_SIZE_BYTES: usize = 512;

/// Window at the end of a buffer searched for trailer markers.
pub const TRAILER_SEARCH_WINDOW: usize = 1024;

/// Leading bytes of a PDF skipped by the polyglot body scan.
pub const PDF_HEADER_SKIP_BYTES: usize = 256;

// Scanner defaults
pub const CLAMAV_DEFAULT_HOST: &str = "localhost";
pub const CLAMAV_DEFAULT_PORT: u16 = 3310;
pub const CLAMAV_DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const CLAMAV_MIN_TIMEOUT_MS: u64 = 100;
pub const CLAMAV_MAX_TIMEOUT_MS: u64 = 30_000;

/// Payload bytes per INSTREAM frame.
pub const CLAMAV_CHUNK_SIZE: usize = 64 * 1024;
