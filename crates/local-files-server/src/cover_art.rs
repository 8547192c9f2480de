//! Uploaded cover image + MIME resolution.

use std::path::Path;

const FALLBACK_MIME: &str = "image/jpeg";

/// Cover image supplied alongside an upload.
#[derive(Clone, Debug, Default)]
pub struct CoverImage {
    pub data: Vec<u8>,
    /// Content type declared by the client for the form part.
    pub declared_mime: Option<String>,
    /// Client-side filename, used for extension-based guessing.
    pub file_name: Option<String>,
}

impl CoverImage {
    /// MIME type for the picture frame: declared type, then extension, then JPEG.
    pub fn mime_type(&self) -> String {
        if let Some(mime) = self.declared_mime.as_deref().and_then(image_mime) {
            return mime;
        }
        self.file_name
            .as_deref()
            .and_then(|name| mime_for_extension(Path::new(name).extension()))
            .unwrap_or(FALLBACK_MIME)
            .to_string()
    }
}

/// Normalized declared type when it names an image, `None` when indeterminate.
fn image_mime(declared: &str) -> Option<String> {
    let essence = declared.split(';').next()?.trim().to_ascii_lowercase();
    match essence.split_once('/') {
        Some(("image", sub)) if !sub.is_empty() && sub != "*" => Some(essence),
        _ => None,
    }
}

fn mime_for_extension(ext: Option<&std::ffi::OsStr>) -> Option<&'static str> {
    let ext = ext?.to_string_lossy().to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}
