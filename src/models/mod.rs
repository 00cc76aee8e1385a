// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod connection;
pub mod dataset;
pub mod file;
pub mod upload;

pub use connection::{Connection, CreateConnection, UpdateConnection};
pub use dataset::Dataset;
pub use file::{
    ChunkPage, ChunkQuery, FileChunk, FileListQuery, FilePage, FileRecord, FileStatus,
    Pagination, ProcessAck, ProcessMode, StatusReport,
};
pub use upload::UploadFile;
