use serde::Serialize;

/// Answer from the external scanner.
///
/// `unavailable` is its own axis: a scanner that could not be reached did not
/// find the file clean, and callers must route it through their fail-open or
/// fail-closed policy rather than read `clean`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvScanResult {
    pub clean: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unavailable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AvScanResult {
    pub fn clean() -> Self {
        Self {
            clean: true,
            unavailable: None,
            reason: None,
        }
    }

    pub fn infected(reason: impl Into<String>) -> Self {
        Self {
            clean: false,
            unavailable: None,
            reason: Some(reason.into()),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            clean: false,
            unavailable: Some(true),
            reason: Some(reason.into()),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        self.unavailable.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_is_never_clean() {
        let result = AvScanResult::unavailable("timeout");
        assert!(!result.clean);
        assert!(result.is_unavailable());
        assert_eq!(result.reason.as_deref(), Some("timeout"));
    }

    #[test]
    fn infected_is_available() {
        let result = AvScanResult::infected("stream: Eicar-Test-Signature FOUND");
        assert!(!result.clean);
        assert!(!result.is_unavailable());
    }
}
