// file: src/tracker/file_tracker.rs
// description: file lifecycle tracker with cached listing, status reconciliation and polling
// reference: internal state management

use crate::client::FileService;
use crate::config::TrackerConfig;
use crate::error::{ConsoleError, Result};
use crate::models::{
    ChunkPage, ChunkQuery, FileListQuery, FileRecord, FileStatus, ProcessAck, ProcessMode,
    StatusReport, UploadFile,
};
use crate::tracker::poller::{TaskHandle, spawn_periodic};
use crate::tracker::state::{TrackerCache, TrackerSnapshot, check_process_request};
use crate::utils::Validator;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Mediates file lifecycle operations against a [`FileService`] and keeps a
/// locally cached view of the active listing.
///
/// The remote service stays the source of truth: the cache is only ever
/// written from server responses, except for the pending `processing`
/// overlay applied after an accepted process request.
pub struct FileTracker<S> {
    service: Arc<S>,
    cache: Arc<RwLock<TrackerCache>>,
    settings: TrackerConfig,
}

impl<S> Clone for FileTracker<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            cache: Arc::clone(&self.cache),
            settings: self.settings.clone(),
        }
    }
}

impl<S: FileService + 'static> FileTracker<S> {
    pub fn new(service: S, settings: TrackerConfig) -> Self {
        Self::with_shared(Arc::new(service), settings)
    }

    pub fn with_shared(service: Arc<S>, settings: TrackerConfig) -> Self {
        Self {
            service,
            cache: Arc::new(RwLock::new(TrackerCache::default())),
            settings,
        }
    }

    pub fn settings(&self) -> &TrackerConfig {
        &self.settings
    }

    pub async fn upload(
        &self,
        file: &UploadFile,
        knowledge_base_id: Option<&str>,
    ) -> Result<FileRecord> {
        file.validate(self.settings.max_upload_bytes)?;

        let knowledge_base_id = Validator::non_blank(knowledge_base_id);
        let record = self
            .service
            .upload(file, knowledge_base_id.as_deref())
            .await?;

        if record.status != FileStatus::Uploaded {
            warn!(
                "Upload of {} returned status {} instead of uploaded",
                record.original_name, record.status
            );
        }
        info!("Uploaded {} as {}", record.original_name, record.id);

        self.cache.write().await.upsert(record.clone());

        let has_listing = self.cache.read().await.active_query().is_some();
        if has_listing {
            if let Err(e) = self.refresh(None).await {
                warn!("Listing refresh after upload failed: {}", e);
            }
        }

        Ok(record)
    }

    /// Submits a file for processing.
    ///
    /// The current status (cached, or read from the status endpoint for
    /// uncached files) is checked with [`check_process_request`] before the
    /// request is sent. Once the server accepts, the record reads as
    /// `processing` until the next authoritative read replaces it.
    pub async fn request_process(
        &self,
        file_id: &str,
        knowledge_base_id: Option<&str>,
        mode: ProcessMode,
    ) -> Result<ProcessAck> {
        let cached = self.cache.read().await.effective_status(file_id);
        let current = match cached {
            Some(status) => status,
            None => {
                debug!("File {} not cached, reading status before processing", file_id);
                self.status(file_id).await?.status
            }
        };
        check_process_request(file_id, current, mode)?;

        let knowledge_base_id = Validator::non_blank(knowledge_base_id);
        let ack = self
            .service
            .process(file_id, knowledge_base_id.as_deref())
            .await?;

        self.cache
            .write()
            .await
            .mark_pending(file_id, FileStatus::Processing);
        info!("Processing accepted for {} ({})", file_id, mode);

        Ok(ack)
    }

    /// Fetches one listing page and replaces the cached page with it.
    ///
    /// `None` re-runs the active query (or the default first page when no
    /// listing has been fetched yet).
    pub async fn refresh(&self, query: Option<FileListQuery>) -> Result<TrackerSnapshot> {
        let query = match query {
            Some(query) => query,
            None => self
                .cache
                .read()
                .await
                .active_query()
                .cloned()
                .unwrap_or_else(|| self.default_query()),
        };

        let page = self.service.list(&query).await?;
        debug!(
            "Refreshed listing: {} files, total {}",
            page.files.len(),
            page.pagination.total
        );

        let mut cache = self.cache.write().await;
        cache.apply_page(query, page);
        Ok(cache.snapshot())
    }

    /// Starts refreshing the active listing every `period`.
    ///
    /// Failed refreshes are logged and the schedule carries on. Cancel or drop
    /// the returned handle when the listing is no longer shown.
    pub fn start_polling(&self, period: Duration) -> TaskHandle {
        info!("Polling file listing every {:.0}s", period.as_secs_f64());
        let tracker = self.clone();

        spawn_periodic(period, move || {
            let tracker = tracker.clone();
            async move {
                if let Err(e) = tracker.refresh(None).await {
                    warn!("Poll refresh failed: {}", e);
                }
            }
        })
    }

    pub fn start_default_polling(&self) -> TaskHandle {
        self.start_polling(self.settings.poll_interval())
    }

    /// Chunks of a processed file, ordered by position.
    ///
    /// Files that are not `processed` yield [`ConsoleError::NotReady`] and the
    /// chunks endpoint is not called.
    pub async fn get_chunks(&self, file_id: &str, query: ChunkQuery) -> Result<ChunkPage> {
        let cached = self.cache.read().await.effective_status(file_id);
        let status = match cached {
            Some(status) => status,
            None => self.status(file_id).await?.status,
        };

        if status != FileStatus::Processed {
            return Err(ConsoleError::NotReady {
                id: file_id.to_string(),
                status,
            });
        }

        let mut page = self.service.chunks(file_id, &query).await?;
        page.chunks.sort_by_key(|c| c.position);

        if page
            .chunks
            .windows(2)
            .any(|pair| pair[0].position == pair[1].position)
        {
            return Err(ConsoleError::InvalidResponse(format!(
                "duplicate chunk positions for file {}",
                file_id
            )));
        }

        Ok(page)
    }

    pub async fn delete(&self, file_id: &str) -> Result<()> {
        self.service.delete(file_id).await?;
        self.cache.write().await.remove(file_id);
        info!("Deleted file {}", file_id);
        Ok(())
    }

    pub async fn download(&self, file_id: &str) -> Result<Vec<u8>> {
        self.service.download(file_id).await
    }

    /// Lightweight status read, reconciled into the cache.
    pub async fn status(&self, file_id: &str) -> Result<StatusReport> {
        let report = self.service.status(file_id).await?;
        self.cache.write().await.apply_status(&report);
        Ok(report)
    }

    /// Full record read, reconciled into the cache.
    pub async fn detail(&self, file_id: &str) -> Result<FileRecord> {
        let record = self.service.get(file_id).await?;
        self.cache.write().await.upsert(record.clone());
        Ok(record)
    }

    pub async fn snapshot(&self) -> TrackerSnapshot {
        self.cache.read().await.snapshot()
    }

    pub async fn cached(&self, file_id: &str) -> Option<FileRecord> {
        self.cache.read().await.view(file_id)
    }

    fn default_query(&self) -> FileListQuery {
        FileListQuery {
            page: Some(1),
            limit: Some(self.settings.page_limit),
            ..FileListQuery::default()
        }
    }
}
