//! ID3v2 tag writing for uploaded tracks.
//!
//! Two independent save passes: the text field batch, then (optionally) the
//! cover picture. Both passes open the container, normalize it to ID3v2.4 and
//! rewrite it in one save.

use std::fmt;
use std::path::Path;

use id3::frame::{Content, Picture, PictureType};
use id3::{Encoding, ErrorKind, Frame, Tag, TagLike, Version};

use crate::cover_art::CoverImage;
use crate::metadata::TrackMetadata;

const TARGET_VERSION: Version = Version::Id3v24;
const PICTURE_FRAME: &str = "APIC";
const COVER_DESCRIPTION: &str = "Cover";

/// ID3v2.3 frames that are dropped once their content has been migrated.
const LEGACY_FRAMES: [&str; 8] = [
    "TYER", "TDAT", "TIME", "TORY", "TRDA", "TSIZ", "EQUA", "RVAD",
];

/// Stage of the tag update that failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagWriteStep {
    Read,
    WriteFields,
    WriteCover,
}

impl fmt::Display for TagWriteStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TagWriteStep::Read => "read tags",
            TagWriteStep::WriteFields => "write tags",
            TagWriteStep::WriteCover => "write cover art",
        };
        f.write_str(label)
    }
}

#[derive(Debug)]
pub struct TagWriteError {
    step: TagWriteStep,
    source: id3::Error,
}

impl TagWriteError {
    fn new(step: TagWriteStep, source: id3::Error) -> Self {
        Self { step, source }
    }

    pub fn step(&self) -> TagWriteStep {
        self.step
    }
}

impl fmt::Display for TagWriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.step, self.source)
    }
}

impl std::error::Error for TagWriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Write title, artist, album, album artist and the optional date/track number.
///
/// `date` and `tracknumber` are only touched when the metadata carries them;
/// an existing value is kept otherwise.
pub fn write_fields(path: &Path, meta: &TrackMetadata) -> Result<(), TagWriteError> {
    let mut tag = open_container(path)?;

    tag.set_title(meta.title.as_str());
    tag.set_artist(meta.artist.as_str());
    tag.set_album(meta.album.as_str());
    // Spotify groups local files by album artist.
    tag.set_album_artist(meta.artist.as_str());
    if let Some(year) = meta.year.as_deref() {
        tag.set_text("TDRC", year);
    }
    if let Some(track) = meta.track_number {
        tag.set_text("TRCK", track.to_string());
    }

    save(&tag, path, TagWriteStep::WriteFields)
}

/// Replace every attached picture with a single front cover.
pub fn replace_cover(path: &Path, cover: &CoverImage) -> Result<(), TagWriteError> {
    let mut tag = open_container(path)?;

    let removed = tag.remove(PICTURE_FRAME).len();
    if removed > 0 {
        tracing::debug!(path = %path.display(), removed, "dropped existing pictures");
    }

    let frame = Frame::with_content(
        PICTURE_FRAME,
        Content::Picture(Picture {
            mime_type: cover.mime_type(),
            picture_type: PictureType::CoverFront,
            description: COVER_DESCRIPTION.to_string(),
            data: cover.data.clone(),
        }),
    )
    .set_encoding(Some(Encoding::UTF8));
    tag.add_frame(frame);

    save(&tag, path, TagWriteStep::WriteCover)
}

/// Read the file's tag, creating an empty one when the file has none.
fn open_container(path: &Path) -> Result<Tag, TagWriteError> {
    let mut tag = match Tag::read_from_path(path) {
        Ok(tag) => tag,
        Err(err) if matches!(err.kind, ErrorKind::NoTag) => {
            tracing::debug!(path = %path.display(), "no tag container; creating one");
            Tag::new()
        }
        Err(mut err) => match err.partial_tag.take() {
            Some(tag) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "tag container partially readable; continuing with recovered frames"
                );
                tag
            }
            None => return Err(TagWriteError::new(TagWriteStep::Read, err)),
        },
    };
    normalize_to_v24(&mut tag);
    Ok(tag)
}

fn save(tag: &Tag, path: &Path, step: TagWriteStep) -> Result<(), TagWriteError> {
    tag.write_to_path(path, TARGET_VERSION)
        .map_err(|err| TagWriteError::new(step, err))
}

/// Migrate ID3v2.3-only frames to their ID3v2.4 equivalents.
fn normalize_to_v24(tag: &mut Tag) {
    if tag.get("TDRC").is_none() {
        if let Some(date) = legacy_recording_date(tag) {
            tag.set_text("TDRC", date);
        }
    }
    if tag.get("TDOR").is_none() {
        if let Some(original) = frame_text(tag, "TORY").map(str::to_string) {
            tag.set_text("TDOR", original);
        }
    }
    for id in LEGACY_FRAMES {
        tag.remove(id);
    }
}

/// Combine `TYER` + `TDAT` (DDMM) + `TIME` (HHMM) into an ISO-8601 timestamp.
fn legacy_recording_date(tag: &Tag) -> Option<String> {
    let year = frame_text(tag, "TYER")?.trim();
    if year.is_empty() {
        return None;
    }
    let mut date = year.to_string();
    if let Some(ddmm) = frame_text(tag, "TDAT").filter(|v| is_four_digits(v)) {
        date.push_str(&format!("-{}-{}", &ddmm[2..4], &ddmm[0..2]));
        if let Some(hhmm) = frame_text(tag, "TIME").filter(|v| is_four_digits(v)) {
            date.push_str(&format!("T{}:{}", &hhmm[0..2], &hhmm[2..4]));
        }
    }
    Some(date)
}

fn frame_text<'a>(tag: &'a Tag, id: &str) -> Option<&'a str> {
    tag.get(id)?.content().text()
}

fn is_four_digits(value: &str) -> bool {
    value.len() == 4 && value.bytes().all(|b| b.is_ascii_digit())
}
