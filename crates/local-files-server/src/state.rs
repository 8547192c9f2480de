//! Shared application state.

use std::path::Path;

use crate::ingest::TrackIngest;

/// Per-process state shared by every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub ingest: TrackIngest,
    /// Upper bound on any single multipart field.
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(ingest: TrackIngest, max_upload_bytes: usize) -> Self {
        Self {
            ingest,
            max_upload_bytes,
        }
    }

    /// Directory used when a request carries no `custom_path`.
    pub fn default_save_dir(&self) -> &Path {
        self.ingest.default_dir()
    }
}
