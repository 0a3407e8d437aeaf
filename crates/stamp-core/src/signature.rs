//! Signature image payloads
//!
//! Payloads travel as `data:<mime>;base64,<data>` strings. The declared MIME
//! type alone decides how the bytes are decoded.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat as RasterFormat};

use crate::error::EmbedError;

/// Raster formats a signature may be declared as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    /// Classify a declared MIME type. `image/jpg` is accepted as an alias.
    pub fn from_mime(mime: &str) -> Result<Self, EmbedError> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Ok(Self::Png),
            "image/jpeg" | "image/jpg" => Ok(Self::Jpeg),
            other => Err(EmbedError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    fn raster(self) -> RasterFormat {
        match self {
            Self::Png => RasterFormat::Png,
            Self::Jpeg => RasterFormat::Jpeg,
        }
    }
}

/// A data URI split into its declared MIME type and decoded bytes
#[derive(Debug, Clone, PartialEq)]
pub struct DataUri {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl DataUri {
    pub fn parse(uri: &str) -> Result<Self, EmbedError> {
        let rest = uri
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| EmbedError::MalformedDataUri("missing data: prefix".into()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| EmbedError::MalformedDataUri("missing ',' separator".into()))?;
        let (mime, encoding) = match header.split_once(';') {
            Some((mime, params)) => (mime, params),
            None => (header, ""),
        };
        if !encoding
            .split(';')
            .any(|p| p.trim().eq_ignore_ascii_case("base64"))
        {
            return Err(EmbedError::MalformedDataUri(
                "only base64 payloads are supported".into(),
            ));
        }
        let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| EmbedError::MalformedDataUri(e.to_string()))?;
        Ok(Self {
            mime: mime.trim().to_string(),
            bytes,
        })
    }

    /// Encode bytes as a base64 data URI
    pub fn encode(mime: &str, bytes: &[u8]) -> String {
        format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
    }
}

/// Decoded signature, ready to be embedded
#[derive(Debug, Clone)]
pub struct SignatureImage {
    format: ImageFormat,
    image: DynamicImage,
}

impl SignatureImage {
    /// Parse and decode a data URI. The format is checked before decoding, so
    /// an undeclared or unsupported type never reaches the decoder.
    pub fn from_data_uri(uri: &str) -> Result<Self, EmbedError> {
        let data = DataUri::parse(uri)?;
        let format = ImageFormat::from_mime(&data.mime)?;
        Self::decode(format, &data.bytes)
    }

    pub fn decode(format: ImageFormat, bytes: &[u8]) -> Result<Self, EmbedError> {
        let image = image::load_from_memory_with_format(bytes, format.raster())
            .map_err(|e| EmbedError::ImageDecode(e.to_string()))?;
        if image.width() == 0 || image.height() == 0 {
            return Err(EmbedError::ImageDecode("image has no pixels".into()));
        }
        Ok(Self { format, image })
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn has_alpha(&self) -> bool {
        self.image.color().has_alpha()
    }

    pub fn is_grayscale(&self) -> bool {
        !self.image.color().has_color()
    }

    /// Color samples, 8 bits per component: gray or RGB
    pub(crate) fn color_samples(&self) -> Vec<u8> {
        if self.is_grayscale() {
            self.image.to_luma8().into_raw()
        } else {
            self.image.to_rgb8().into_raw()
        }
    }

    /// Alpha channel as 8-bit gray samples, if the source has one
    pub(crate) fn alpha_samples(&self) -> Option<Vec<u8>> {
        if !self.has_alpha() {
            return None;
        }
        Some(self.image.to_rgba8().pixels().map(|p| p.0[3]).collect())
    }
}
