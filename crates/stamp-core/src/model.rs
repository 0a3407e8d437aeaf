//! Session data: loaded documents, signature settings and stamp positions.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Default stamp width in PDF points
pub const DEFAULT_STAMP_SIZE: f64 = 100.0;

/// Default stamp opacity (fully opaque)
pub const DEFAULT_OPACITY: f64 = 1.0;

/// Where to put the stamp: top-left origin, y growing downward, 1-based page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    /// Out-of-range values (including zero and negatives) mean "last page"
    pub page: i64,
}

impl Position {
    pub fn new(x: f64, y: f64, page: i64) -> Self {
        Self { x, y, page }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self {
            x: 100.0,
            y: 100.0,
            page: 1,
        }
    }
}

/// A PDF loaded into the session
#[derive(Debug, Clone)]
pub struct PdfDocument {
    id: String,
    name: String,
    bytes: Vec<u8>,
    pub(crate) selected: bool,
    pub(crate) position: Option<Position>,
}

impl PdfDocument {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            bytes,
            selected: false,
            position: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    /// Builder used by hosts and tests that assemble documents outside a session
    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }
}

/// Signature image and how to draw it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureConfig {
    /// `data:<mime>;base64,<data>`
    image: Option<String>,
    size: f64,
    opacity: f64,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            image: None,
            size: DEFAULT_STAMP_SIZE,
            opacity: DEFAULT_OPACITY,
        }
    }
}

impl SignatureConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn set_image(&mut self, data_uri: impl Into<String>) {
        self.image = Some(data_uri.into());
    }

    pub fn clear_image(&mut self) {
        self.image = None;
    }

    pub fn set_size(&mut self, size: f64) -> Result<(), ValidationError> {
        if !size.is_finite() || size <= 0.0 {
            return Err(ValidationError::InvalidStampSize(size));
        }
        self.size = size;
        Ok(())
    }

    pub fn set_opacity(&mut self, opacity: f64) -> Result<(), ValidationError> {
        if !(0.0..=1.0).contains(&opacity) {
            return Err(ValidationError::InvalidOpacity(opacity));
        }
        self.opacity = opacity;
        Ok(())
    }

    pub fn with_image(mut self, data_uri: impl Into<String>) -> Self {
        self.set_image(data_uri);
        self
    }

    pub fn with_size(mut self, size: f64) -> Result<Self, ValidationError> {
        self.set_size(size)?;
        Ok(self)
    }

    pub fn with_opacity(mut self, opacity: f64) -> Result<Self, ValidationError> {
        self.set_opacity(opacity)?;
        Ok(self)
    }
}

/// A successfully stamped document, ready to persist
#[derive(Debug, Clone, PartialEq)]
pub struct SignResult {
    pub file_name: String,
    pub bytes: Vec<u8>,
}
