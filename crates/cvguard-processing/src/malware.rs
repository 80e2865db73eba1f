//! Static byte-pattern check against well-known test and attack payloads.
//!
//! A supplement to the external scanner, not a replacement: a miss here says
//! nothing about whether the file is safe.

use std::sync::LazyLock;

use memchr::memmem::Finder;

/// The industry-standard anti-virus test string.
pub const EICAR_TEST_STRING: &[u8] =
    br"X5O!P%@AP[4\PZX54(P^)7CC)7}$EICAR-STANDARD-ANTIVIRUS-TEST-FILE!$H+H*";

const KNOWN_SIGNATURES: &[(&str, &[u8])] = &[
    ("Eicar-Test-Signature", EICAR_TEST_STRING),
    // Base64 of a PE/DOS header, typical of droppers hidden in text streams.
    ("Base64-PE-Header", b"TVqQAAMAAAAEAAAA//8AALgAAAAAAAAAQ"),
    ("PowerShell-EncodedCommand", b"powershell.exe -EncodedCommand"),
    ("PowerShell-EncodedCommand", b"powershell -enc "),
];

static FINDERS: LazyLock<Vec<(&'static str, Finder<'static>)>> = LazyLock::new(|| {
    KNOWN_SIGNATURES
        .iter()
        .map(|(name, pattern)| (*name, Finder::new(*pattern)))
        .collect()
});

/// Name of the first known signature contained in `buffer`.
pub fn find_known_signature(buffer: &[u8]) -> Option<&'static str> {
    FINDERS
        .iter()
        .find(|(_, finder)| finder.find(buffer).is_some())
        .map(|(name, _)| *name)
}

pub fn contains_known_signature(buffer: &[u8]) -> bool {
    find_known_signature(buffer).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_eicar_anywhere() {
        let mut buf = b"%PDF-1.7\n".to_vec();
        buf.extend_from_slice(EICAR_TEST_STRING);
        buf.extend_from_slice(b"\n%%EOF");
        assert!(contains_known_signature(&buf));
        assert_eq!(find_known_signature(&buf), Some("Eicar-Test-Signature"));
    }

    #[test]
    fn clean_buffer_has_no_hit() {
        assert!(!contains_known_signature(b"%PDF-1.7\nJane Doe, Engineer\n%%EOF"));
        assert!(!contains_known_signature(b""));
    }

    #[test]
    fn match_is_case_sensitive() {
        let lowered = EICAR_TEST_STRING.to_ascii_lowercase();
        assert!(!contains_known_signature(&lowered));
    }

    #[test]
    fn detects_encoded_powershell() {
        assert_eq!(
            find_known_signature(b"cmd /c powershell -enc SQBFAFgA"),
            Some("PowerShell-EncodedCommand")
        );
    }
}
