// file: src/tracker/state.rs
// description: cached listing state, pending status overlays and the process transition guard
// reference: internal state management

use crate::error::{ConsoleError, Result};
use crate::models::{FileListQuery, FilePage, FileRecord, FileStatus, Pagination, ProcessMode, StatusReport};
use std::collections::HashMap;

/// Checks whether a process request may be sent for a record in `current` state.
///
/// `uploaded` accepts both modes, `processed` and `failed` only accept a
/// reprocess, and a record already `processing` accepts neither.
pub fn check_process_request(id: &str, current: FileStatus, mode: ProcessMode) -> Result<()> {
    let allowed = match current {
        FileStatus::Uploaded => true,
        FileStatus::Processed | FileStatus::Failed => mode == ProcessMode::Reprocess,
        FileStatus::Processing => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(ConsoleError::InvalidTransition {
            id: id.to_string(),
            from: current,
            mode,
        })
    }
}

/// Point-in-time copy of the cached listing page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackerSnapshot {
    pub files: Vec<FileRecord>,
    pub pagination: Option<Pagination>,
    pub query: Option<FileListQuery>,
}

#[derive(Debug, Default)]
pub(crate) struct TrackerCache {
    records: HashMap<String, FileRecord>,
    page: Vec<String>,
    pagination: Option<Pagination>,
    active_query: Option<FileListQuery>,
    // locally applied statuses awaiting the next authoritative read
    pending: HashMap<String, FileStatus>,
}

impl TrackerCache {
    pub fn active_query(&self) -> Option<&FileListQuery> {
        self.active_query.as_ref()
    }

    /// Replaces the cached page with a freshly fetched one.
    pub fn apply_page(&mut self, query: FileListQuery, page: FilePage) {
        self.page = page.files.iter().map(|f| f.id.clone()).collect();
        self.pagination = Some(page.pagination);
        self.active_query = Some(query);

        for record in page.files {
            self.upsert(record);
        }
    }

    pub fn upsert(&mut self, record: FileRecord) {
        self.pending.remove(&record.id);
        self.records.insert(record.id.clone(), record);
    }

    pub fn apply_status(&mut self, report: &StatusReport) {
        self.pending.remove(&report.id);
        if let Some(record) = self.records.get_mut(&report.id) {
            record.set_status(report.status, report.processing_error.clone());
        }
    }

    pub fn mark_pending(&mut self, id: &str, status: FileStatus) {
        self.pending.insert(id.to_string(), status);
    }

    /// Drops every trace of a record. Returns whether it was cached.
    pub fn remove(&mut self, id: &str) -> bool {
        self.pending.remove(id);
        let was_cached = self.records.remove(id).is_some();

        let before = self.page.len();
        self.page.retain(|p| p != id);
        if self.page.len() < before {
            if let Some(pagination) = self.pagination.as_mut() {
                *pagination = Pagination::new(
                    pagination.page,
                    pagination.limit,
                    pagination.total.saturating_sub(1),
                );
            }
        }

        was_cached
    }

    /// Status as currently perceived, overlay included.
    pub fn effective_status(&self, id: &str) -> Option<FileStatus> {
        self.pending
            .get(id)
            .copied()
            .or_else(|| self.records.get(id).map(|r| r.status))
    }

    pub fn view(&self, id: &str) -> Option<FileRecord> {
        let mut record = self.records.get(id)?.clone();
        if let Some(status) = self.pending.get(id) {
            record.set_status(*status, None);
        }
        Some(record)
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        TrackerSnapshot {
            files: self.page.iter().filter_map(|id| self.view(id)).collect(),
            pagination: self.pagination,
            query: self.active_query.clone(),
        }
    }
}
