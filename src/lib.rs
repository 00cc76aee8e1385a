// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod tracker;
pub mod utils;

pub use client::{ApiClient, ConnectionClient, DatasetClient, FileService, FileServiceClient};
pub use config::{Config, ServiceConfig, TrackerConfig};
pub use error::{ConsoleError, Result};
pub use models::{
    ChunkPage, ChunkQuery, Connection, CreateConnection, Dataset, FileChunk, FileListQuery,
    FileRecord, FileStatus, Pagination, ProcessMode, UpdateConnection, UploadFile,
};
pub use tracker::{FileTracker, TaskHandle, TrackerSnapshot};
pub use utils::{Spinner, Validator};
