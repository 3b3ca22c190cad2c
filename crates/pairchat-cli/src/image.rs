//! Loading local images as `data:` URLs for sending.

use std::path::Path;

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Image types accepted for upload, keyed by file extension.
const ALLOWED_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("webp", "image/webp"),
    ("svg", "image/svg+xml"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("ico", "image/x-icon"),
    ("heif", "image/heif"),
    ("heic", "image/heic"),
];

/// MIME type for `path`, if its extension is an allowed image type.
pub fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    ALLOWED_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
}

/// Read `path` and encode it as `data:<mime>;base64,<payload>`.
pub fn load_data_url(path: &Path, max_kib: Option<u64>) -> Result<String> {
    let Some(mime) = mime_for(path) else {
        bail!("invalid file type: {}", path.display());
    };
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read image {}", path.display()))?;
    if let Some(max) = max_kib {
        if bytes.len() as u64 > max * 1024 {
            bail!("file size exceeds {max}KB: {}", path.display());
        }
    }
    Ok(format!("data:{mime};base64,{}", STANDARD.encode(&bytes)))
}
