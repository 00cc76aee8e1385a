// file: src/models/upload.rs
// description: in-memory upload payload with pre-flight validation
// reference: internal data structures

use crate::error::{ConsoleError, Result};
use crate::utils::Validator;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Reads a file from disk, inferring its MIME type from the extension.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                ConsoleError::Validation(format!("Not a file path: {}", path.display()))
            })?
            .to_string();

        let bytes = tokio::fs::read(path).await?;

        Ok(Self {
            file_name,
            mime_type: Validator::mime_type_for_path(path).to_string(),
            bytes,
        })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Type allow-list and size ceiling checks, run before anything is sent.
    pub fn validate(&self, max_bytes: u64) -> Result<()> {
        Validator::validate_required("file name", &self.file_name)?;
        Validator::validate_upload_type(&self.mime_type)?;
        Validator::validate_upload_size(self.size(), max_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MAX: u64 = 15 * 1024 * 1024;

    #[tokio::test]
    async fn test_from_path_infers_mime_type() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("minutes.docx");
        std::fs::write(&path, b"PK\x03\x04").unwrap();

        let upload = UploadFile::from_path(&path).await.unwrap();
        assert_eq!(upload.file_name, "minutes.docx");
        assert_eq!(
            upload.mime_type,
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
        assert_eq!(upload.size(), 4);
        assert!(upload.validate(MAX).is_ok());
    }

    #[tokio::test]
    async fn test_from_path_missing_file() {
        let result = UploadFile::from_path(Path::new("/nonexistent/report.pdf")).await;
        assert!(matches!(result, Err(ConsoleError::Io(_))));
    }

    #[test]
    fn test_validate_rejects_type_and_size() {
        let image = UploadFile::new("photo.png", "image/png", vec![0; 10]);
        assert!(matches!(image.validate(MAX), Err(ConsoleError::Validation(_))));

        let large = UploadFile::new("big.pdf", "application/pdf", vec![0; (MAX + 1) as usize]);
        assert!(matches!(large.validate(MAX), Err(ConsoleError::Validation(_))));

        let exact = UploadFile::new("edge.txt", "text/plain", vec![0; MAX as usize]);
        assert!(exact.validate(MAX).is_ok());
    }
}
