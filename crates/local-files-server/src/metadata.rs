//! Track metadata parsing and validation.

use std::fmt;

use serde::Deserialize;

/// Validated metadata for a single uploaded track.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackMetadata {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub year: Option<String>,
    pub track_number: Option<u32>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum MetadataError {
    /// The blob is not parseable JSON.
    InvalidJson,
    /// JSON parsed, but a field is missing, empty, or has the wrong type.
    Invalid(String),
}

impl fmt::Display for MetadataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataError::InvalidJson => f.write_str("Invalid JSON format in metadata."),
            MetadataError::Invalid(msg) => write!(f, "Invalid metadata: {msg}"),
        }
    }
}

impl std::error::Error for MetadataError {}

#[derive(Deserialize)]
struct RawTrackMetadata {
    title: Option<String>,
    artist: Option<String>,
    album: Option<String>,
    #[serde(default)]
    year: Option<YearValue>,
    #[serde(default)]
    track_number: Option<u32>,
}

/// Clients send the year either as `"2021"` or `2021`.
#[derive(Deserialize)]
#[serde(untagged)]
enum YearValue {
    Text(String),
    Number(i64),
}

impl YearValue {
    fn into_text(self) -> Option<String> {
        let text = match self {
            YearValue::Text(text) => text.trim().to_string(),
            YearValue::Number(num) => num.to_string(),
        };
        (!text.is_empty()).then_some(text)
    }
}

impl TrackMetadata {
    /// Parse the JSON metadata part of an upload.
    pub fn from_json(raw: &[u8]) -> Result<Self, MetadataError> {
        let parsed: RawTrackMetadata = serde_json::from_slice(raw).map_err(|err| {
            if err.is_syntax() || err.is_eof() {
                MetadataError::InvalidJson
            } else {
                MetadataError::Invalid(err.to_string())
            }
        })?;

        Ok(Self {
            title: required("title", parsed.title)?,
            artist: required("artist", parsed.artist)?,
            album: required("album", parsed.album)?,
            year: parsed.year.and_then(YearValue::into_text),
            track_number: parsed.track_number,
        })
    }
}

fn required(field: &str, value: Option<String>) -> Result<String, MetadataError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| MetadataError::Invalid(format!("missing required field `{field}`")))
}
