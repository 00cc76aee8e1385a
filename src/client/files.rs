// file: src/client/files.rs
// description: file service REST boundary (upload, listing, processing, chunks)
// reference: https://docs.rs/reqwest

use crate::client::http::{ApiClient, Envelope, NO_QUERY};
use crate::config::ServiceConfig;
use crate::error::{ConsoleError, Result};
use crate::models::{
    ChunkPage, ChunkQuery, FileListQuery, FilePage, FileRecord, Pagination, ProcessAck,
    StatusReport, UploadFile,
};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use tracing::{debug, info};

pub const FILES_PATH: &str = "/api/v1/files";

/// Operations the tracker needs from the remote file service.
#[async_trait]
pub trait FileService: Send + Sync {
    async fn upload(&self, file: &UploadFile, knowledge_base_id: Option<&str>)
    -> Result<FileRecord>;

    async fn list(&self, query: &FileListQuery) -> Result<FilePage>;

    async fn get(&self, id: &str) -> Result<FileRecord>;

    async fn process(&self, id: &str, knowledge_base_id: Option<&str>) -> Result<ProcessAck>;

    async fn status(&self, id: &str) -> Result<StatusReport>;

    async fn chunks(&self, id: &str, query: &ChunkQuery) -> Result<ChunkPage>;

    async fn download(&self, id: &str) -> Result<Vec<u8>>;

    async fn delete(&self, id: &str) -> Result<()>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProcessRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    knowledge_base_id: Option<&'a str>,
}

#[derive(Clone)]
pub struct FileServiceClient {
    api: ApiClient,
}

impl FileServiceClient {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(config)?,
        })
    }
}

#[async_trait]
impl FileService for FileServiceClient {
    async fn upload(
        &self,
        file: &UploadFile,
        knowledge_base_id: Option<&str>,
    ) -> Result<FileRecord> {
        info!(
            "Uploading {} ({} bytes, {})",
            file.file_name,
            file.size(),
            file.mime_type
        );

        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| ConsoleError::Validation(format!("Invalid MIME type: {}", e)))?;

        let mut form = Form::new().part("file", part);
        if let Some(kb) = knowledge_base_id {
            form = form.text("knowledge_base_id", kb.to_string());
        }

        let url = self.api.url(&[FILES_PATH, "upload"])?;
        let envelope: Envelope<FileRecord> = self.api.post_multipart(url, form).await?;
        Ok(envelope.into_data()?.normalized())
    }

    async fn list(&self, query: &FileListQuery) -> Result<FilePage> {
        let url = self.api.url(&[FILES_PATH])?;
        let envelope: Envelope<Vec<FileRecord>> = self.api.get_json(url, query).await?;

        let pagination = envelope.pagination;
        let files: Vec<FileRecord> = envelope
            .into_data()?
            .into_iter()
            .map(FileRecord::normalized)
            .collect();

        let pagination = pagination.unwrap_or_else(|| {
            Pagination::new(
                query.page.unwrap_or(1),
                query.limit.unwrap_or(files.len() as u32),
                files.len() as u64,
            )
        });

        debug!(
            "Listed {} files (page {}/{})",
            files.len(),
            pagination.page,
            pagination.pages
        );
        Ok(FilePage { files, pagination })
    }

    async fn get(&self, id: &str) -> Result<FileRecord> {
        let url = self.api.resource_url(FILES_PATH, id, None)?;
        let envelope: Envelope<FileRecord> = self.api.get_json(url, NO_QUERY).await?;
        Ok(envelope.into_data()?.normalized())
    }

    async fn process(&self, id: &str, knowledge_base_id: Option<&str>) -> Result<ProcessAck> {
        let url = self.api.resource_url(FILES_PATH, id, Some("process"))?;
        let body = ProcessRequest { knowledge_base_id };
        let envelope: Envelope<ProcessAck> = self.api.put_json(url, &body).await?;
        envelope.into_data()
    }

    async fn status(&self, id: &str) -> Result<StatusReport> {
        let url = self.api.resource_url(FILES_PATH, id, Some("status"))?;
        let envelope: Envelope<StatusReport> = self.api.get_json(url, NO_QUERY).await?;
        envelope.into_data()
    }

    async fn chunks(&self, id: &str, query: &ChunkQuery) -> Result<ChunkPage> {
        let url = self.api.resource_url(FILES_PATH, id, Some("chunks"))?;
        let envelope: Envelope<ChunkPage> = self.api.get_json(url, query).await?;
        envelope.into_data()
    }

    async fn download(&self, id: &str) -> Result<Vec<u8>> {
        let url = self.api.resource_url(FILES_PATH, id, Some("download"))?;
        self.api.get_bytes(url).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let url = self.api.resource_url(FILES_PATH, id, None)?;
        self.api.delete(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileStatus;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_process_request_body() {
        let empty = serde_json::to_value(ProcessRequest {
            knowledge_base_id: None,
        })
        .unwrap();
        assert_eq!(empty, serde_json::json!({}));

        let with_kb = serde_json::to_value(ProcessRequest {
            knowledge_base_id: Some("kb-1"),
        })
        .unwrap();
        assert_eq!(with_kb, serde_json::json!({"knowledgeBaseId": "kb-1"}));
    }

    #[test]
    fn test_decode_list_envelope() {
        let json = r#"{
            "success": true,
            "data": [{
                "id": "1", "uuid": "u1", "filename": "a.pdf", "originalName": "a.pdf",
                "url": "/u/a.pdf", "size": 10, "mimeType": "application/pdf",
                "status": "processing", "createdAt": "2024-05-01T10:00:00Z",
                "updatedAt": "2024-05-01T10:00:00Z"
            }],
            "pagination": {"page": 1, "limit": 10, "total": 1, "pages": 1}
        }"#;
        let envelope: Envelope<Vec<FileRecord>> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.pagination, Some(Pagination::new(1, 10, 1)));
        let files = envelope.into_data().unwrap();
        assert_eq!(files[0].status, FileStatus::Processing);
    }

    #[test]
    fn test_decode_chunk_and_status_envelopes() {
        let chunks = r#"{
            "success": true,
            "data": {
                "chunks": [
                    {"id": "c1", "position": 1, "content": "Intro", "wordCount": 1, "difyChunkId": "d1"},
                    {"id": "c2", "position": 2, "content": "Body text", "wordCount": 2}
                ],
                "pagination": {"page": 1, "limit": 20, "total": 2, "pages": 1}
            }
        }"#;
        let page = serde_json::from_str::<Envelope<ChunkPage>>(chunks)
            .unwrap()
            .into_data()
            .unwrap();
        assert_eq!(page.chunks.len(), 2);
        assert_eq!(page.chunks[0].remote_chunk_id.as_deref(), Some("d1"));

        let status = r#"{"success": true, "data": {"id": "1", "status": "failed", "processingError": "timeout"}}"#;
        let report = serde_json::from_str::<Envelope<StatusReport>>(status)
            .unwrap()
            .into_data()
            .unwrap();
        assert_eq!(report.status, FileStatus::Failed);
        assert_eq!(report.processing_error.as_deref(), Some("timeout"));
    }

    #[test]
    fn test_client_rejects_bad_base_url() {
        let result = FileServiceClient::new(&ServiceConfig {
            base_url: "files.local".to_string(),
            timeout_secs: 30,
        });
        assert!(result.is_err());
    }
}
