//! Inline media encoding.
//!
//! Uploaded images are stored inside the site document as `data:` URLs.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Largest file accepted for inline storage.
pub const MAX_INLINE_BYTES: usize = 768 * 1024;

/// Errors that can occur when encoding media.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("File is too large to inline: {size} bytes (limit {limit})")]
    TooLarge { size: usize, limit: usize },

    #[error("Unsupported media type: {0}")]
    UnsupportedType(String),
}

/// Encode bytes as a base64 `data:` URL.
pub fn encode_data_url(bytes: &[u8], mime: &str) -> Result<String, MediaError> {
    if !mime.starts_with("image/") {
        return Err(MediaError::UnsupportedType(mime.to_string()));
    }
    if bytes.len() > MAX_INLINE_BYTES {
        return Err(MediaError::TooLarge {
            size: bytes.len(),
            limit: MAX_INLINE_BYTES,
        });
    }

    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}

/// Guess an image MIME type from a file extension.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}
