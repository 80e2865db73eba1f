//! Filename normalization for stored uploads.

use cvguard_core::constants::{FALLBACK_FILENAME, MAX_FILENAME_LENGTH};

/// Normalize an uploaded filename into a short, ASCII-safe name.
///
/// The output is never empty, at most [`MAX_FILENAME_LENGTH`] bytes, and
/// `sanitize_filename(sanitize_filename(x)) == sanitize_filename(x)`.
pub fn sanitize_filename(name: &str) -> String {
    let (sanitized, truncated) = sanitize_once(name);
    // Truncation can expose an interior dot as the extension separator; one
    // more pass settles it, and a pass that does not truncate is a fixed point.
    if truncated {
        sanitize_once(&sanitized).0
    } else {
        sanitized
    }
}

fn sanitize_once(name: &str) -> (String, bool) {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return (FALLBACK_FILENAME.to_string(), false);
    }

    let (base, ext) = match trimmed.rfind('.') {
        Some(i) if i > 0 && i < trimmed.len() - 1 => trimmed.split_at(i),
        _ => (trimmed, ""),
    };

    let mut base = collapse_unsafe_runs(base).trim_matches('_').to_string();
    if base.is_empty() {
        base = FALLBACK_FILENAME.to_string();
    }

    let ext: String = ext
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.')
        .collect();

    if base.len() + ext.len() <= MAX_FILENAME_LENGTH {
        return (base + &ext, false);
    }

    if ext.len() < MAX_FILENAME_LENGTH {
        // base and ext are ASCII here, so byte slicing is char-safe.
        base.truncate(MAX_FILENAME_LENGTH - ext.len());
        let base = base.trim_end_matches('_');
        (format!("{}{}", base, ext), true)
    } else {
        let mut whole = base + &ext;
        whole.truncate(MAX_FILENAME_LENGTH);
        (whole, true)
    }
}

fn is_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

/// Replace each run of characters outside `[A-Za-z0-9._-]` with one underscore.
fn collapse_unsafe_runs(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_run = false;
    for c in s.chars() {
        if is_safe(c) {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_idempotent(input: &str) {
        let once = sanitize_filename(input);
        let twice = sanitize_filename(&once);
        assert_eq!(once, twice, "not idempotent for {:?}", input);
        assert!(!once.is_empty());
        assert!(once.len() <= MAX_FILENAME_LENGTH, "too long for {:?}", input);
    }

    #[test]
    fn keeps_simple_names() {
        assert_eq!(sanitize_filename("resume.pdf"), "resume.pdf");
        assert_eq!(sanitize_filename("John-Doe_CV.v2.docx"), "John-Doe_CV.v2.docx");
    }

    #[test]
    fn empty_and_blank_fall_back() {
        assert_eq!(sanitize_filename(""), "cv");
        assert_eq!(sanitize_filename("   \t"), "cv");
        assert_eq!(sanitize_filename("***.pdf"), "cv.pdf");
    }

    #[test]
    fn collapses_unsafe_runs() {
        assert_eq!(sanitize_filename("my  résumé (final).pdf"), "my_r_sum_final.pdf");
        assert_eq!(sanitize_filename("path/to/cv.pdf"), "path_to_cv.pdf");
        assert_eq!(sanitize_filename("  spaced out .doc  "), "spaced_out.doc");
    }

    #[test]
    fn extension_loses_non_alphanumerics() {
        assert_eq!(sanitize_filename("cv.p d-f"), "cv.pdf");
        assert_eq!(sanitize_filename("cv.$"), "cv.");
    }

    #[test]
    fn leading_dot_is_not_an_extension() {
        assert_eq!(sanitize_filename(".hidden"), ".hidden");
    }

    #[test]
    fn trailing_dot_is_not_an_extension() {
        assert_eq!(sanitize_filename("name."), "name.");
    }

    #[test]
    fn long_names_keep_extension() {
        let long = format!("{}.docx", "a".repeat(200));
        let out = sanitize_filename(&long);
        assert_eq!(out.len(), MAX_FILENAME_LENGTH);
        assert!(out.ends_with(".docx"));
    }

    #[test]
    fn long_extension_hard_truncates() {
        let long = format!("cv.{}", "x".repeat(200));
        let out = sanitize_filename(&long);
        assert_eq!(out.len(), MAX_FILENAME_LENGTH);
        assert!(out.starts_with("cv.xxx"));
    }

    #[test]
    fn idempotent_on_awkward_inputs() {
        let cases = [
            "resume.pdf",
            "",
            ".",
            "..",
            "...pdf",
            "_",
            "__a__.pdf",
            "a b.c d",
            "name.",
            ".bashrc",
            "x.a-b.",
            "日本語の履歴書.pdf",
            "C:\\Users\\me\\cv.docx",
        ];
        for case in cases {
            assert_idempotent(case);
        }
        assert_idempotent(&format!("{}_{}.pdf", "a".repeat(76), "b"));
        assert_idempotent(&format!("x.a-b{}.", "c".repeat(100)));
        assert_idempotent(&format!("{}.{}", "a".repeat(10), "b".repeat(100)));
        assert_idempotent(&"a b ".repeat(60));
    }
}
