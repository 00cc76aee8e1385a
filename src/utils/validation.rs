// file: src/utils/validation.rs
// description: pre-flight validation for uploads, urls and form fields
// reference: input validation patterns

use crate::error::{ConsoleError, Result};
use std::path::Path;

/// MIME types the file service accepts for upload.
pub const ALLOWED_MIME_TYPES: [&str; 6] = [
    "application/pdf",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
];

pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

pub struct Validator;

impl Validator {
    pub fn validate_upload_type(mime_type: &str) -> Result<()> {
        let mime_type = mime_type.trim().to_lowercase();
        if ALLOWED_MIME_TYPES.contains(&mime_type.as_str()) {
            return Ok(());
        }
        Err(ConsoleError::Validation(format!(
            "Unsupported file type {}. Accepted: PDF, PPT, PPTX, DOC, DOCX, TXT",
            if mime_type.is_empty() { "(unknown)" } else { &mime_type }
        )))
    }

    pub fn validate_upload_size(size: u64, max_bytes: u64) -> Result<()> {
        if size > max_bytes {
            return Err(ConsoleError::Validation(format!(
                "File is too large ({}). Maximum size is {}",
                crate::utils::format_file_size(size),
                crate::utils::format_file_size(max_bytes)
            )));
        }
        Ok(())
    }

    pub fn mime_type_for_path(path: &Path) -> &'static str {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension.as_deref() {
            Some("pdf") => "application/pdf",
            Some("ppt") => "application/vnd.ms-powerpoint",
            Some("pptx") => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
            Some("doc") => "application/msword",
            Some("docx") => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Some("txt") => "text/plain",
            _ => FALLBACK_MIME_TYPE,
        }
    }

    pub fn validate_url(url: &str) -> Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConsoleError::Validation(format!(
                "Invalid URL format: {}",
                url
            )));
        }
        Ok(())
    }

    pub fn validate_required(field: &str, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(ConsoleError::Validation(format!("{} is required", field)));
        }
        Ok(())
    }

    /// Blank identifiers are treated as absent.
    pub fn non_blank(value: Option<&str>) -> Option<String> {
        value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// Last path component of a remote file name, safe to write in the
    /// current directory.
    pub fn local_file_name(name: &str) -> Result<String> {
        Path::new(name.trim())
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                ConsoleError::Validation(format!(
                    "Cannot derive a local file name from \"{}\"; pass an output path",
                    name
                ))
            })
    }

    pub fn truncate_text(text: &str, max_chars: usize) -> String {
        if text.chars().count() <= max_chars {
            text.to_string()
        } else {
            let head: String = text.chars().take(max_chars).collect();
            format!("{}...", head)
        }
    }
}
