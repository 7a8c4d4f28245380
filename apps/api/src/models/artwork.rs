use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

pub const JPEG_MIME: &str = "image/jpeg";

/// Opaque handle to a piece of artwork.
///
/// Stored the way the image collaborator exchanges it: a MIME type plus a
/// base64 payload. Two handles with the same payload are the same image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Artwork {
    pub mime_type: String,
    /// Base64-encoded image bytes (standard alphabet, padded).
    pub data: String,
}

impl Artwork {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Wraps raw JPEG bytes.
    pub fn from_jpeg_bytes(bytes: &[u8]) -> Self {
        Self::new(JPEG_MIME, BASE64.encode(bytes))
    }

    /// Decodes the base64 payload back into raw image bytes.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        BASE64.decode(self.data.as_bytes())
    }

    /// Parses a `data:<mime>;base64,<payload>` URL, the shape browsers hand over
    /// for uploaded reference images.
    pub fn from_data_url(url: &str) -> Option<Self> {
        let rest = url.strip_prefix("data:")?;
        let (header, payload) = rest.split_once(',')?;
        let mime_type = header.strip_suffix(";base64")?;
        if payload.is_empty() {
            return None;
        }
        Some(Self::new(mime_type, payload))
    }
}
