// file: src/client/mod.rs
// description: REST clients for the file, connection and dataset services
// reference: internal module structure

pub mod connections;
pub mod datasets;
pub mod files;
pub mod http;

pub use connections::ConnectionClient;
pub use datasets::DatasetClient;
pub use files::{FileService, FileServiceClient};
pub use http::ApiClient;
