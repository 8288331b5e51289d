//! Encoded still frames

use std::fmt;
use std::io::Cursor;

use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::result::{Error, Result};

const DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// A JPEG frame carried as a `data:image/jpeg;base64,...` URI
///
/// Deserializing goes through [`EncodedImage::from_data_uri`], so every
/// value holds a well-formed URI.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct EncodedImage(String);

impl EncodedImage {
    /// Encode a frame as JPEG at the given quality (1-100)
    pub fn from_frame(frame: &RgbImage, quality: u8) -> Result<Self> {
        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(Cursor::new(&mut jpeg), quality.clamp(1, 100))
            .encode_image(frame)
            .map_err(|e| Error::Image(e.to_string()))?;
        Ok(Self::from_jpeg_bytes(&jpeg))
    }

    pub fn from_jpeg_bytes(jpeg: &[u8]) -> Self {
        let encoded = base64::engine::general_purpose::STANDARD.encode(jpeg);
        Self(format!("{}{}", DATA_URI_PREFIX, encoded))
    }

    /// Parse an existing data URI
    pub fn from_data_uri(uri: impl Into<String>) -> Result<Self> {
        let uri = uri.into();
        let payload = uri
            .strip_prefix(DATA_URI_PREFIX)
            .ok_or_else(|| Error::Image("not a JPEG data URI".to_string()))?;
        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| Error::Image(format!("invalid base64 payload: {}", e)))?;
        Ok(Self(uri))
    }

    pub fn as_data_uri(&self) -> &str {
        &self.0
    }

    /// Raw JPEG bytes
    pub fn jpeg_bytes(&self) -> Result<Vec<u8>> {
        let payload = self
            .0
            .strip_prefix(DATA_URI_PREFIX)
            .ok_or_else(|| Error::Image("not a JPEG data URI".to_string()))?;
        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| Error::Image(e.to_string()))
    }

    /// Short sha256 prefix, safe to log
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        hex::encode(&digest[..6])
    }

    /// Size of the data URI in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.len() <= DATA_URI_PREFIX.len()
    }
}

impl TryFrom<String> for EncodedImage {
    type Error = Error;

    fn try_from(uri: String) -> Result<Self> {
        Self::from_data_uri(uri)
    }
}

impl From<EncodedImage> for String {
    fn from(image: EncodedImage) -> Self {
        image.0
    }
}

// Never dump the whole payload into logs.
impl fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedImage")
            .field("len", &self.0.len())
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}
