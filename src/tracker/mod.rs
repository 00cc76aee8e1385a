// file: src/tracker/mod.rs
// description: file lifecycle tracking module exports
// reference: internal module structure

#[cfg(test)]
mod fake;
mod file_tracker;
pub mod poller;
pub mod state;

pub use file_tracker::FileTracker;
pub use poller::{TaskHandle, spawn_periodic};
pub use state::{TrackerSnapshot, check_process_request};
