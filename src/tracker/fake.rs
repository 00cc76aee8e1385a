// file: src/tracker/fake.rs
// description: in-memory file service used by tracker tests

use crate::client::FileService;
use crate::error::{ConsoleError, Result};
use crate::models::{
    ChunkPage, ChunkQuery, FileChunk, FileListQuery, FilePage, FileRecord, FileStatus,
    Pagination, ProcessAck, StatusReport, UploadFile,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct FakeState {
    files: Vec<FileRecord>,
    blobs: HashMap<String, Vec<u8>>,
    chunks: HashMap<String, Vec<FileChunk>>,
    next_id: u64,
    upload_failure: Option<String>,
    failing_lists: usize,
    failing_deletes: bool,
}

/// Behaves like the remote file service, counting every call by operation name.
#[derive(Default)]
pub(crate) struct FakeFileService {
    state: Mutex<FakeState>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl FakeFileService {
    pub fn calls(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    pub fn file_count(&self) -> usize {
        self.state.lock().unwrap().files.len()
    }

    /// Creates a record on the server side only.
    pub fn seed(&self, name: &str, status: FileStatus) -> String {
        let mut state = self.state.lock().unwrap();
        let record = new_record(&mut state, name, "text/plain", 1, None);
        let id = record.id.clone();
        state.files.push(FileRecord { status, ..record }.normalized());
        id
    }

    pub fn set_chunks(&self, id: &str, chunks: Vec<FileChunk>) {
        self.state
            .lock()
            .unwrap()
            .chunks
            .insert(id.to_string(), chunks);
    }

    pub fn complete_processing(&self, id: &str, chunks: Vec<FileChunk>) {
        self.set_server_status(id, FileStatus::Processed, None);
        self.set_chunks(id, chunks);
    }

    pub fn fail_processing(&self, id: &str, error: &str) {
        self.set_server_status(id, FileStatus::Failed, Some(error.to_string()));
    }

    pub fn fail_uploads(&self, message: &str) {
        self.state.lock().unwrap().upload_failure = Some(message.to_string());
    }

    pub fn fail_next_lists(&self, count: usize) {
        self.state.lock().unwrap().failing_lists = count;
    }

    pub fn fail_deletes(&self, failing: bool) {
        self.state.lock().unwrap().failing_deletes = failing;
    }

    fn set_server_status(&self, id: &str, status: FileStatus, error: Option<String>) {
        let mut state = self.state.lock().unwrap();
        if let Some(record) = state.files.iter_mut().find(|f| f.id == id) {
            record.set_status(status, error);
            record.updated_at = Some(Utc::now());
        }
    }

    fn record_call(&self, operation: &'static str) {
        *self.calls.lock().unwrap().entry(operation).or_insert(0) += 1;
    }

    fn find(&self, id: &str) -> Result<FileRecord> {
        self.state
            .lock()
            .unwrap()
            .files
            .iter()
            .find(|f| f.id == id)
            .cloned()
            .ok_or_else(not_found)
    }
}

fn not_found() -> ConsoleError {
    ConsoleError::remote(Some(404), Some("File not found".to_string()))
}

fn new_record(
    state: &mut FakeState,
    name: &str,
    mime_type: &str,
    size: u64,
    knowledge_base_id: Option<&str>,
) -> FileRecord {
    state.next_id += 1;
    let now = Utc::now();
    FileRecord {
        id: state.next_id.to_string(),
        uuid: Some(format!("uuid-{}", state.next_id)),
        original_name: name.to_string(),
        stored_name: format!("{}-{}", now.timestamp_millis(), name),
        url: Some(format!("/uploads/{}", name)),
        mime_type: mime_type.to_string(),
        size_bytes: size,
        status: FileStatus::Uploaded,
        knowledge_base_id: knowledge_base_id.map(str::to_string),
        document_id: None,
        processing_error: None,
        created_at: now,
        updated_at: Some(now),
    }
}

#[async_trait]
impl FileService for FakeFileService {
    async fn upload(
        &self,
        file: &UploadFile,
        knowledge_base_id: Option<&str>,
    ) -> Result<FileRecord> {
        self.record_call("upload");
        let mut state = self.state.lock().unwrap();
        if let Some(message) = state.upload_failure.clone() {
            return Err(ConsoleError::remote(Some(500), Some(message)));
        }

        let record = new_record(
            &mut state,
            &file.file_name,
            &file.mime_type,
            file.size(),
            knowledge_base_id,
        );
        state.blobs.insert(record.id.clone(), file.bytes.clone());
        state.files.push(record.clone());
        Ok(record)
    }

    async fn list(&self, query: &FileListQuery) -> Result<FilePage> {
        self.record_call("list");
        let mut state = self.state.lock().unwrap();
        if state.failing_lists > 0 {
            state.failing_lists -= 1;
            return Err(ConsoleError::remote(Some(503), None));
        }

        let matching: Vec<&FileRecord> = state
            .files
            .iter()
            .filter(|f| query.status.is_none_or(|s| f.status == s))
            .filter(|f| {
                query
                    .knowledge_base_id
                    .as_deref()
                    .is_none_or(|kb| f.knowledge_base_id.as_deref() == Some(kb))
            })
            .collect();

        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(10);
        let files = matching
            .iter()
            .skip(((page - 1) * limit) as usize)
            .take(limit as usize)
            .map(|f| (*f).clone())
            .collect();

        Ok(FilePage {
            files,
            pagination: Pagination::new(page, limit, matching.len() as u64),
        })
    }

    async fn get(&self, id: &str) -> Result<FileRecord> {
        self.record_call("get");
        self.find(id)
    }

    async fn process(&self, id: &str, knowledge_base_id: Option<&str>) -> Result<ProcessAck> {
        self.record_call("process");
        let mut state = self.state.lock().unwrap();
        let record = state
            .files
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(not_found)?;

        record.set_status(FileStatus::Processing, None);
        if let Some(kb) = knowledge_base_id {
            record.knowledge_base_id = Some(kb.to_string());
        }

        Ok(ProcessAck {
            id: id.to_string(),
            status: "processing".to_string(),
            message: "File processing started".to_string(),
        })
    }

    async fn status(&self, id: &str) -> Result<StatusReport> {
        self.record_call("status");
        let record = self.find(id)?;
        Ok(StatusReport {
            id: record.id,
            status: record.status,
            processing_error: record.processing_error,
        })
    }

    async fn chunks(&self, id: &str, _query: &ChunkQuery) -> Result<ChunkPage> {
        self.record_call("chunks");
        let chunks = self
            .state
            .lock()
            .unwrap()
            .chunks
            .get(id)
            .cloned()
            .unwrap_or_default();
        let total = chunks.len() as u64;
        Ok(ChunkPage {
            chunks,
            pagination: Pagination::new(1, 20, total),
        })
    }

    async fn download(&self, id: &str) -> Result<Vec<u8>> {
        self.record_call("download");
        self.state
            .lock()
            .unwrap()
            .blobs
            .get(id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.record_call("delete");
        let mut state = self.state.lock().unwrap();
        if state.failing_deletes {
            return Err(ConsoleError::remote(Some(500), None));
        }
        let before = state.files.len();
        state.files.retain(|f| f.id != id);
        if state.files.len() == before {
            return Err(not_found());
        }
        state.blobs.remove(id);
        state.chunks.remove(id);
        Ok(())
    }
}
