use std::path::Path;

use cvguard_core::constants::{
    ALLOWED_EXTENSIONS, ALLOWED_MIME_TYPES, MAX_UPLOAD_SIZE_BYTES, MIN_UPLOAD_SIZE_BYTES,
};
use cvguard_core::ValidationError;

/// Front-door checks on what the uploader declared, before any byte is read.
///
/// Provides the allow-list and size gates without coupling to content
/// inspection or storage.
#[derive(Debug, Clone)]
pub struct DocumentValidator {
    min_file_size: usize,
    max_file_size: usize,
    allowed_extensions: &'static [&'static str],
    allowed_content_types: &'static [&'static str],
}

impl Default for DocumentValidator {
    fn default() -> Self {
        Self::new(
            MIN_UPLOAD_SIZE_BYTES,
            MAX_UPLOAD_SIZE_BYTES,
            ALLOWED_EXTENSIONS,
            ALLOWED_MIME_TYPES,
        )
    }
}

impl DocumentValidator {
    pub fn new(
        min_file_size: usize,
        max_file_size: usize,
        allowed_extensions: &'static [&'static str],
        allowed_content_types: &'static [&'static str],
    ) -> Self {
        Self {
            min_file_size,
            max_file_size,
            allowed_extensions,
            allowed_content_types,
        }
    }

    /// Validate the declared content type and return its normalized form.
    pub fn validate_content_type(&self, content_type: &str) -> Result<String, ValidationError> {
        let normalized = normalize_content_type(content_type);

        if !self.allowed_content_types.contains(&normalized.as_str()) {
            return Err(ValidationError::UnsupportedContentType(
                content_type.trim().to_string(),
            ));
        }

        Ok(normalized)
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size < self.min_file_size {
            return Err(ValidationError::FileTooSmall {
                size,
                min: self.min_file_size,
            });
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate the filename extension and return it lowercased, without the dot.
    pub fn validate_extension(&self, filename: &str) -> Result<String, ValidationError> {
        let extension = Path::new(filename.trim())
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .ok_or_else(|| ValidationError::UnsupportedExtension(String::new()))?;

        if !self.allowed_extensions.contains(&extension.as_str()) {
            return Err(ValidationError::UnsupportedExtension(extension));
        }

        Ok(extension)
    }
}

/// Lowercase, trim, and drop MIME parameters such as `; charset=binary`.
pub fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase()
}
