//! Upload validation pipeline.
//!
//! Stages run in a fixed order and each one either rejects or hands over to
//! the next, so a later stage never runs once an earlier one has refused the
//! file. Only the final virus scan suspends.

use std::sync::Arc;
use std::time::Instant;

use cvguard_core::{
    SupportedFormat, UploadCandidate, UploadConfig, UploadRejection, ValidationDetails,
    ValidationError, ValidationResult,
};

use super::traits::VirusScanner;
use crate::filename::sanitize_filename;
use crate::malware::find_known_signature;
use crate::sniff::sniff_type;
use crate::structure::{find_polyglot_marker, validate_structure};
use crate::validator::DocumentValidator;
use crate::zipbomb::looks_like_zip_bomb;

/// Decides whether an uploaded CV may be stored.
#[derive(Clone)]
pub struct ValidationPipeline {
    validator: DocumentValidator,
    config: UploadConfig,
    scanner: Option<Arc<dyn VirusScanner>>,
    fail_closed: bool,
}

impl Default for ValidationPipeline {
    fn default() -> Self {
        Self::new(UploadConfig::default())
    }
}

impl ValidationPipeline {
    /// Pipeline without external scanning.
    pub fn new(config: UploadConfig) -> Self {
        Self {
            validator: DocumentValidator::default(),
            config,
            scanner: None,
            fail_closed: true,
        }
    }

    /// Enable the external scan stage.
    ///
    /// `fail_closed` decides what happens when the scanner cannot answer:
    /// reject (`true`) or accept with a warning (`false`).
    pub fn with_scanner(mut self, scanner: Arc<dyn VirusScanner>, fail_closed: bool) -> Self {
        self.scanner = Some(scanner);
        self.fail_closed = fail_closed;
        self
    }

    pub fn scanning_enabled(&self) -> bool {
        self.scanner.is_some()
    }

    /// Run every stage against `candidate`.
    pub async fn validate_upload(&self, candidate: &UploadCandidate) -> ValidationResult {
        let start = Instant::now();
        let data = candidate.data.as_slice();

        // 1. Presence
        if data.is_empty() {
            return reject("presence", ValidationError::MissingFile);
        }

        // 2. Declared content type
        let declared_type = match self.validator.validate_content_type(&candidate.content_type) {
            Ok(t) => t,
            Err(e) => return reject("content_type", e),
        };

        // 3. Size, both as declared and as received
        for size in [candidate.declared_size, data.len()] {
            if let Err(e) = self.validator.validate_file_size(size) {
                return reject("size", e);
            }
        }

        // 4. Declared extension
        let extension = match self.validator.validate_extension(&candidate.filename) {
            Ok(ext) => ext,
            Err(e) => return reject("extension", e),
        };

        // 5. Content sniffing
        let Some(detected) = sniff_type(data) else {
            return reject("sniff", ValidationError::UndeterminedType);
        };

        let mut details = ValidationDetails {
            detected_type: detected.mime_type().to_string(),
            declared_type: declared_type.clone(),
            extension,
            size: data.len(),
            is_polyglot: false,
            has_valid_structure: false,
            sanitized_filename: None,
        };

        // 6. Declared vs detected type. Checked before structure so a
        // well-formed file of another type is still refused as spoofed.
        if SupportedFormat::from_mime_type(&declared_type) != Some(detected) {
            details.is_polyglot = true;
            return reject_with_details(
                "type_match",
                ValidationError::TypeMismatch {
                    detected: detected.mime_type().to_string(),
                    declared: declared_type,
                },
                details,
            );
        }

        // 7. Structure
        if !validate_structure(detected, data, self.config.strict_structure) {
            details.is_polyglot =
                detected == SupportedFormat::Pdf && find_polyglot_marker(data).is_some();
            return reject_with_details(
                "structure",
                ValidationError::InvalidStructure(detected),
                details,
            );
        }
        details.has_valid_structure = true;

        // 8. Filename, observational only
        let sanitized = sanitize_filename(&candidate.filename);
        if sanitized != candidate.filename {
            tracing::info!(
                original = %candidate.filename,
                sanitized = %sanitized,
                "Upload filename sanitized"
            );
        }
        details.sanitized_filename = Some(sanitized);

        // 9. Static threats
        if looks_like_zip_bomb(data, self.config.zip_max_ratio) {
            return reject_with_details(
                "zip_bomb",
                UploadRejection::ThreatDetected("suspicious compressed container".to_string()),
                details,
            );
        }

        if let Some(signature) = find_known_signature(data) {
            tracing::warn!(signature, "Known malware signature in upload");
            return reject_with_details(
                "signature",
                UploadRejection::ThreatDetected("known malware signature".to_string()),
                details,
            );
        }

        // 10. External scan
        if let Some(scanner) = &self.scanner {
            let scan = scanner.scan(data).await;

            if scan.is_unavailable() {
                if self.fail_closed {
                    tracing::error!(
                        reason = scan.reason.as_deref().unwrap_or("unknown"),
                        "Virus scan unavailable, rejecting upload (fail-closed)"
                    );
                    return reject_with_details(
                        "virus_scan",
                        UploadRejection::ScannerUnavailable,
                        details,
                    );
                }
                tracing::warn!(
                    reason = scan.reason.as_deref().unwrap_or("unknown"),
                    "Virus scan unavailable, continuing (fail-open)"
                );
            } else if !scan.clean {
                tracing::warn!(
                    reason = scan.reason.as_deref().unwrap_or("unknown"),
                    "Virus scanner reported infection"
                );
                return reject_with_details(
                    "virus_scan",
                    UploadRejection::ThreatDetected("malware detected by virus scanner".to_string()),
                    details,
                );
            }
        }

        tracing::debug!(
            detected_type = %details.detected_type,
            size = details.size,
            duration_ms = start.elapsed().as_millis() as u64,
            "Upload accepted"
        );
        ValidationResult::accepted(details)
    }
}

fn reject(stage: &'static str, error: impl Into<UploadRejection>) -> ValidationResult {
    let error = error.into();
    log_rejection(stage, &error);
    ValidationResult::rejected(error)
}

fn reject_with_details(
    stage: &'static str,
    error: impl Into<UploadRejection>,
    details: ValidationDetails,
) -> ValidationResult {
    let error = error.into();
    log_rejection(stage, &error);
    ValidationResult::rejected_with_details(error, details)
}

fn log_rejection(stage: &'static str, error: &UploadRejection) {
    tracing::warn!(
        stage,
        kind = ?error.kind(),
        reason = %error,
        "Upload rejected"
    );
}
