// file: src/utils/mod.rs
// description: utility functions module exports
// reference: internal module structure

pub mod format;
pub mod logging;
pub mod progress;
pub mod validation;

pub use format::{dataset_names, format_file_size, retrieve_curl};
pub use progress::Spinner;
pub use validation::Validator;
