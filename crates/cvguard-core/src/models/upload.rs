use std::fmt;

use serde::{Serialize, Serializer};

use crate::constants::{MIME_DOC, MIME_DOCX, MIME_PDF};
use crate::error::UploadRejection;

/// `%PDF-`
pub const PDF_SIGNATURES: &[&[u8]] = &[b"%PDF-"];

/// End-of-file markers a complete PDF carries near its tail.
pub const PDF_TRAILERS: &[&[u8]] = &[b"%%EOF"];

/// OLE2 compound document header (legacy Word).
pub const DOC_SIGNATURES: &[&[u8]] = &[&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]];

/// ZIP local file header, empty archive, and spanned archive markers.
pub const ZIP_SIGNATURES: &[&[u8]] = &[b"PK\x03\x04", b"PK\x05\x06", b"PK\x07\x08"];

/// Document formats accepted for CV uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportedFormat {
    Pdf,
    Doc,
    Docx,
}

impl SupportedFormat {
    /// Sniffing order. Earlier entries win when several would match.
    pub const ALL: [SupportedFormat; 3] = [
        SupportedFormat::Pdf,
        SupportedFormat::Doc,
        SupportedFormat::Docx,
    ];

    pub fn mime_type(self) -> &'static str {
        match self {
            SupportedFormat::Pdf => MIME_PDF,
            SupportedFormat::Doc => MIME_DOC,
            SupportedFormat::Docx => MIME_DOCX,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            SupportedFormat::Pdf => "pdf",
            SupportedFormat::Doc => "doc",
            SupportedFormat::Docx => "docx",
        }
    }

    pub fn signatures(self) -> &'static [&'static [u8]] {
        match self {
            SupportedFormat::Pdf => PDF_SIGNATURES,
            SupportedFormat::Doc => DOC_SIGNATURES,
            SupportedFormat::Docx => ZIP_SIGNATURES,
        }
    }

    pub fn trailers(self) -> Option<&'static [&'static [u8]]> {
        match self {
            SupportedFormat::Pdf => Some(PDF_TRAILERS),
            SupportedFormat::Doc | SupportedFormat::Docx => None,
        }
    }

    /// Look up a format by MIME type. Expects an already normalized value.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.mime_type() == mime)
    }

    /// Look up a format by extension, case-insensitively, with or without the dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        Self::ALL.into_iter().find(|f| f.extension() == ext)
    }
}

impl fmt::Display for SupportedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SupportedFormat::Pdf => "PDF",
            SupportedFormat::Doc => "DOC",
            SupportedFormat::Docx => "DOCX",
        };
        f.write_str(label)
    }
}

/// A file as handed over by the upload route. Never mutated.
#[derive(Clone)]
pub struct UploadCandidate {
    pub data: Vec<u8>,
    pub filename: String,
    pub content_type: String,
    pub declared_size: usize,
}

impl UploadCandidate {
    pub fn new(
        data: Vec<u8>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        declared_size: usize,
    ) -> Self {
        Self {
            data,
            filename: filename.into(),
            content_type: content_type.into(),
            declared_size,
        }
    }

    /// Candidate whose declared size is the buffer length.
    pub fn from_bytes(
        data: Vec<u8>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        let declared_size = data.len();
        Self::new(data, filename, content_type, declared_size)
    }
}

impl fmt::Debug for UploadCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadCandidate")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("declared_size", &self.declared_size)
            .field("data_len", &self.data.len())
            .finish()
    }
}

/// What the pipeline learned about a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationDetails {
    pub detected_type: String,
    pub declared_type: String,
    pub extension: String,
    pub size: usize,
    pub is_polyglot: bool,
    pub has_valid_structure: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sanitized_filename: Option<String>,
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_rejection"
    )]
    pub error: Option<UploadRejection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ValidationDetails>,
}

impl ValidationResult {
    pub fn accepted(details: ValidationDetails) -> Self {
        Self {
            valid: true,
            error: None,
            details: Some(details),
        }
    }

    pub fn rejected(error: impl Into<UploadRejection>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
            details: None,
        }
    }

    pub fn rejected_with_details(
        error: impl Into<UploadRejection>,
        details: ValidationDetails,
    ) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
            details: Some(details),
        }
    }

    /// User-facing reason, if rejected.
    pub fn reason(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.to_string())
    }
}

#[derive(Serialize)]
struct RejectionBody<'a> {
    kind: crate::error::RejectionKind,
    code: &'a str,
    message: String,
}

fn serialize_rejection<S>(error: &Option<UploadRejection>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match error {
        Some(e) => RejectionBody {
            kind: e.kind(),
            code: e.error_code(),
            message: e.to_string(),
        }
        .serialize(serializer),
        None => serializer.serialize_none(),
    }
}
