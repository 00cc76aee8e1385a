// file: src/models/file.rs
// description: uploaded document, chunk and pagination models for the file service
// reference: internal data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Message attached to failed records the server reported without an error text.
pub const DEFAULT_PROCESSING_ERROR: &str = "processing failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Uploaded,
    Processing,
    Processed,
    Failed,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Uploaded => "uploaded",
            FileStatus::Processing => "processing",
            FileStatus::Processed => "processed",
            FileStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "uploaded" => Ok(FileStatus::Uploaded),
            "processing" => Ok(FileStatus::Processing),
            "processed" => Ok(FileStatus::Processed),
            "failed" => Ok(FileStatus::Failed),
            other => Err(format!("unknown file status: {}", other)),
        }
    }
}

/// Whether a process request is a first submission or a resubmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessMode {
    Initial,
    Reprocess,
}

impl fmt::Display for ProcessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessMode::Initial => f.write_str("initial"),
            ProcessMode::Reprocess => f.write_str("reprocess"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub original_name: String,
    #[serde(rename = "filename")]
    pub stored_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub mime_type: String,
    #[serde(rename = "size")]
    pub size_bytes: u64,
    pub status: FileStatus,
    #[serde(
        default,
        rename = "difyKnowledgeBaseId",
        alias = "knowledgeBaseId",
        skip_serializing_if = "Option::is_none"
    )]
    pub knowledge_base_id: Option<String>,
    #[serde(
        default,
        rename = "difyDocumentId",
        skip_serializing_if = "Option::is_none"
    )]
    pub document_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_error: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl FileRecord {
    /// Enforces `processing_error` being present exactly when the record failed.
    pub fn normalized(mut self) -> Self {
        let status = self.status;
        let processing_error = self.processing_error.take();
        self.set_status(status, processing_error);
        self
    }

    pub fn set_status(&mut self, status: FileStatus, processing_error: Option<String>) {
        self.status = status;
        self.processing_error = match status {
            FileStatus::Failed => Some(
                processing_error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_PROCESSING_ERROR.to_string()),
            ),
            _ => None,
        };
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileChunk {
    pub id: String,
    pub position: u32,
    pub content: String,
    pub word_count: u32,
    #[serde(
        default,
        rename = "difyChunkId",
        skip_serializing_if = "Option::is_none"
    )]
    pub remote_chunk_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u32,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        Self {
            page,
            limit,
            total,
            pages: Self::page_count(total, limit),
        }
    }

    pub fn page_count(total: u64, limit: u32) -> u32 {
        if limit == 0 {
            return 0;
        }
        total.div_ceil(limit as u64) as u32
    }

    pub fn has_next(&self) -> bool {
        self.page < self.pages
    }
}

/// Filters and window for a file listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<FileStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knowledge_base_id: Option<String>,
}

impl FileListQuery {
    pub fn for_knowledge_base(knowledge_base_id: impl Into<String>) -> Self {
        Self {
            knowledge_base_id: Some(knowledge_base_id.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChunkQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilePage {
    pub files: Vec<FileRecord>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChunkPage {
    pub chunks: Vec<FileChunk>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub id: String,
    pub status: FileStatus,
    #[serde(default)]
    pub processing_error: Option<String>,
}

/// Server acknowledgement of a process request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProcessAck {
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}
