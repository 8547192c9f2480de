use serde::{Deserialize, Serialize};

/// Response returned after a track has been written and tagged.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TrackAddResponse {
    /// Always `"success"`.
    pub status: String,
    /// Human-readable summary.
    pub message: String,
    /// Absolute path of the written audio file.
    pub path: String,
}

impl TrackAddResponse {
    pub fn success(path: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: "Track added to Spotify local files".to_string(),
            path: path.into(),
        }
    }
}

/// Error body shared by every failing endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorResponse {
    /// Description of what went wrong.
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Setup status of the default Spotify local files directory.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SpotifyStatus {
    /// `true` when the directory exists.
    pub local_files_enabled: bool,
    /// `true` when a marker file can be created in the directory.
    pub path_writable: bool,
    /// The directory that was checked.
    pub path: String,
    /// Static setup hints for the Spotify desktop client.
    pub tips: Vec<String>,
}

/// Default save directory, as exposed by `/api/spotify-path`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SpotifyPathResponse {
    pub path: String,
}
