//! Per-format structure checks beyond the magic header.
//!
//! Strict mode asks for what every real document carries (a PDF trailer, a
//! full OLE sector, an OPC content-types part). Non-strict mode only checks the
//! header so minimal synthetic fixtures still pass. The PDF polyglot scan runs
//! in both modes.

use cvguard_core::constants::{OLE_MIN_SIZE_BYTES, PDF_HEADER_SKIP_BYTES};
use cvguard_core::SupportedFormat;
use memchr::memmem;

use crate::signature::{has_trailer, matches_signature};

/// Marker present in every Office Open XML package.
const OPC_CONTENT_TYPES: &[u8] = b"[Content_Types]";

/// Windows executable headers, matched byte for byte.
const BINARY_MARKERS: &[(&str, &[u8])] = &[
    ("pe-dos-header", b"MZ\x90\x00"),
    ("pe-dos-header", b"MZP\x00"),
    ("pe-signature", b"PE\x00\x00"),
];

/// Script content, matched against the ASCII-lowercased body.
const TEXT_MARKERS: &[(&str, &[u8])] = &[
    ("pe-dos-stub", b"this program cannot be run in dos mode"),
    ("script-tag", b"<script"),
    ("php-tag", b"<?php"),
    ("asp-directive", b"<%@"),
    ("asp-expression", b"<%="),
];

/// Short server-side openers; only a hit when followed by whitespace or `$`.
const OPENER_MARKERS: &[(&str, &[u8])] = &[("php-echo-tag", b"<?="), ("asp-block", b"<%")];

const SHEBANG_INTERPRETERS: &[&[u8]] = &[
    b"python", b"perl", b"ruby", b"node", b"bash", b"env", b"php", b"sh",
];

/// Run the structure check for `format`.
pub fn validate_structure(format: SupportedFormat, buffer: &[u8], strict: bool) -> bool {
    match format {
        SupportedFormat::Pdf => validate_pdf(buffer, strict),
        SupportedFormat::Doc => validate_doc(buffer, strict),
        SupportedFormat::Docx => validate_docx(buffer, strict),
    }
}

pub fn validate_pdf(buffer: &[u8], strict: bool) -> bool {
    let format = SupportedFormat::Pdf;
    if !matches_signature(buffer, format.signatures()) {
        return false;
    }
    if strict && !format.trailers().is_some_and(|t| has_trailer(buffer, t)) {
        tracing::debug!("PDF has no %%EOF trailer");
        return false;
    }
    if let Some(marker) = find_polyglot_marker(buffer) {
        tracing::warn!(marker, "Embedded executable or script content in PDF body");
        return false;
    }
    true
}

pub fn validate_doc(buffer: &[u8], strict: bool) -> bool {
    if !matches_signature(buffer, SupportedFormat::Doc.signatures()) {
        return false;
    }
    !strict || buffer.len() >= OLE_MIN_SIZE_BYTES
}

pub fn validate_docx(buffer: &[u8], strict: bool) -> bool {
    if !matches_signature(buffer, SupportedFormat::Docx.signatures()) {
        return false;
    }
    !strict || memmem::find(buffer, OPC_CONTENT_TYPES).is_some()
}

/// Name of the first polyglot marker found after the PDF header region.
pub fn find_polyglot_marker(buffer: &[u8]) -> Option<&'static str> {
    let body = buffer.get(PDF_HEADER_SKIP_BYTES..)?;
    if let Some(name) = find_any(body, BINARY_MARKERS) {
        return Some(name);
    }

    let lowered = body.to_ascii_lowercase();
    find_any(&lowered, TEXT_MARKERS)
        .or_else(|| find_opener(&lowered))
        .or_else(|| has_shebang(&lowered).then_some("shebang"))
}

fn find_any(haystack: &[u8], markers: &[(&'static str, &[u8])]) -> Option<&'static str> {
    markers
        .iter()
        .find(|(_, pattern)| memmem::find(haystack, pattern).is_some())
        .map(|(name, _)| *name)
}

fn find_opener(haystack: &[u8]) -> Option<&'static str> {
    OPENER_MARKERS
        .iter()
        .find(|(_, opener)| {
            memmem::find_iter(haystack, opener).any(|at| {
                matches!(
                    haystack.get(at + opener.len()).copied(),
                    Some(b' ' | b'\t' | b'\r' | b'\n' | b'$')
                )
            })
        })
        .map(|(name, _)| *name)
}

/// `#!` followed, after optional blanks, by an absolute path or a known interpreter.
fn has_shebang(haystack: &[u8]) -> bool {
    memmem::find_iter(haystack, b"#!").any(|at| {
        let rest = &haystack[at + 2..];
        let skip = rest.iter().take_while(|b| matches!(**b, b' ' | b'\t')).count();
        let rest = &rest[skip..];
        match rest {
            [b'/', next, ..] => next.is_ascii_alphabetic(),
            _ => SHEBANG_INTERPRETERS.iter().any(|name| rest.starts_with(name)),
        }
    })
}
