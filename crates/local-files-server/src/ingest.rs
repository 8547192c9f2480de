//! Track ingest: persist an upload and tag it for Spotify.
//!
//! Validation happens before anything touches disk. Once the audio bytes are
//! written, a later tagging failure leaves the file in place.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use local_files_types::ErrorResponse;

use crate::cover_art::CoverImage;
use crate::metadata::{MetadataError, TrackMetadata};
use crate::save_path::{self, PathError};
use crate::tag_writer::{self, TagWriteError};

/// Raw parts of a `POST /api/tracks` request.
#[derive(Debug, Default)]
pub struct TrackUpload {
    pub audio: Vec<u8>,
    pub metadata: Vec<u8>,
    pub cover: Option<CoverImage>,
    pub custom_path: Option<String>,
}

/// Result of a successful ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    pub path: PathBuf,
    pub cover_written: bool,
}

#[derive(Debug)]
pub enum IngestError {
    InvalidJson,
    Validation(String),
    Path(PathError),
    PayloadTooLarge { limit: usize },
    TagWrite(TagWriteError),
    Io { path: PathBuf, source: io::Error },
    Internal(String),
}

impl IngestError {
    pub fn status(&self) -> StatusCode {
        match self {
            IngestError::InvalidJson | IngestError::Validation(_) | IngestError::Path(_) => {
                StatusCode::BAD_REQUEST
            }
            IngestError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            IngestError::TagWrite(_) | IngestError::Io { .. } | IngestError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Convert an ingest error into a JSON `{detail}` response.
    pub fn into_response(self) -> HttpResponse {
        HttpResponse::build(self.status()).json(ErrorResponse::new(self.to_string()))
    }
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::InvalidJson => write!(f, "{}", MetadataError::InvalidJson),
            IngestError::Validation(msg) => f.write_str(msg),
            IngestError::Path(err) => write!(f, "Invalid or inaccessible save path: {err}"),
            IngestError::PayloadTooLarge { limit } => write!(f, "Upload exceeds {limit} bytes."),
            IngestError::TagWrite(err) => write!(f, "{err}"),
            IngestError::Io { path, source } => write!(f, "write {}: {source}", path.display()),
            IngestError::Internal(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for IngestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IngestError::Path(err) => Some(err),
            IngestError::TagWrite(err) => Some(err),
            IngestError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<MetadataError> for IngestError {
    fn from(err: MetadataError) -> Self {
        match err {
            MetadataError::InvalidJson => IngestError::InvalidJson,
            other => IngestError::Validation(other.to_string()),
        }
    }
}

impl From<PathError> for IngestError {
    fn from(err: PathError) -> Self {
        IngestError::Path(err)
    }
}

impl From<TagWriteError> for IngestError {
    fn from(err: TagWriteError) -> Self {
        IngestError::TagWrite(err)
    }
}

/// Writes uploads into a save directory and tags them.
#[derive(Clone, Debug)]
pub struct TrackIngest {
    default_dir: PathBuf,
}

impl TrackIngest {
    pub fn new(default_dir: PathBuf) -> Self {
        Self { default_dir }
    }

    pub fn default_dir(&self) -> &Path {
        &self.default_dir
    }

    /// Validate, persist, then tag an upload. Blocking.
    pub fn add_track(&self, upload: TrackUpload) -> Result<IngestOutcome, IngestError> {
        let meta = TrackMetadata::from_json(&upload.metadata)?;
        let dir = save_path::resolve_save_path(upload.custom_path.as_deref(), &self.default_dir)?;
        let path = dir.join(save_path::format_filename(&meta.artist, &meta.title));

        std::fs::write(&path, &upload.audio).map_err(|source| IngestError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::info!(
            path = %path.display(),
            bytes = upload.audio.len(),
            "audio written"
        );

        tag_writer::write_fields(&path, &meta).inspect_err(|err| log_partial(&path, err))?;

        let cover_written = match upload.cover.as_ref() {
            Some(cover) => {
                tag_writer::replace_cover(&path, cover).inspect_err(|err| log_partial(&path, err))?;
                tracing::info!(
                    path = %path.display(),
                    mime = %cover.mime_type(),
                    bytes = cover.data.len(),
                    "cover art embedded"
                );
                true
            }
            None => false,
        };

        Ok(IngestOutcome {
            path,
            cover_written,
        })
    }
}

fn log_partial(path: &Path, err: &TagWriteError) {
    tracing::warn!(
        path = %path.display(),
        step = %err.step(),
        error = %err,
        "tagging failed; audio file left in place"
    );
}
