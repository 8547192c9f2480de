//! Destination directory and filename resolution.
//!
//! Computes the per-OS Spotify local files folder, sanitizes track filenames,
//! and checks that a target directory can actually be written to.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Characters Spotify (and Windows) choke on in a filename.
const INVALID_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
const PROBE_FILE_NAME: &str = ".local-files-write-probe";

/// Operating system family used to pick the default Spotify folder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OsKind {
    Windows,
    MacOs,
    Other,
}

impl OsKind {
    /// OS family of the running binary.
    pub fn current() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    fn from_os_name(name: &str) -> Self {
        match name {
            "windows" => OsKind::Windows,
            "macos" => OsKind::MacOs,
            _ => OsKind::Other,
        }
    }
}

/// Failure to create or write into a save directory.
#[derive(Debug)]
pub struct PathError {
    action: &'static str,
    path: PathBuf,
    source: io::Error,
}

impl PathError {
    fn new(action: &'static str, path: &Path, source: io::Error) -> Self {
        Self {
            action,
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.action, self.path.display(), self.source)
    }
}

impl std::error::Error for PathError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Default Spotify local files directory for `os` under `home`.
pub fn default_save_dir(os: OsKind, home: &Path) -> PathBuf {
    match os {
        OsKind::Windows | OsKind::MacOs => home.join("Music").join("Spotify").join("Local Files"),
        OsKind::Other => home.join(".config").join("spotify").join("Local Files"),
    }
}

/// Build `"{artist} - {title}.mp3"`, stripping unsafe characters from each part.
pub fn format_filename(artist: &str, title: &str) -> String {
    format!("{} - {}.mp3", strip_invalid(artist), strip_invalid(title))
}

fn strip_invalid(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !INVALID_FILENAME_CHARS.contains(ch))
        .collect()
}

/// Pick `custom` (when non-blank) or `default`, create it and verify it is writable.
pub fn resolve_save_path(custom: Option<&str>, default: &Path) -> Result<PathBuf, PathError> {
    let dir = custom
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| default.to_path_buf());

    fs::create_dir_all(&dir).map_err(|err| PathError::new("create directory", &dir, err))?;
    probe_writable(&dir)?;
    Ok(dir)
}

/// Create and immediately delete a marker file inside `dir`.
pub fn probe_writable(dir: &Path) -> Result<(), PathError> {
    let probe = dir.join(PROBE_FILE_NAME);
    fs::write(&probe, b"").map_err(|err| PathError::new("write to", dir, err))?;
    fs::remove_file(&probe).map_err(|err| PathError::new("clean up probe in", dir, err))?;
    Ok(())
}
