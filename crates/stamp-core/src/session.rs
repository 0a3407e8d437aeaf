//! In-memory signing session
//!
//! Holds the loaded documents and the signature settings. Selection flags and
//! per-document positions only change through this type.

use crate::batch::{sign_documents, BatchOutcome};
use crate::error::ValidationError;
use crate::model::{PdfDocument, Position, SignatureConfig};

#[derive(Debug, Default)]
pub struct SigningSession {
    documents: Vec<PdfDocument>,
    signature: SignatureConfig,
}

/// A validated sign request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignPlan {
    pub fallback: Position,
    pub selected: usize,
}

impl SigningSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a document. New documents start unselected. Returns its id.
    pub fn add_document(&mut self, name: impl Into<String>, bytes: Vec<u8>) -> String {
        let doc = PdfDocument::new(name, bytes);
        let id = doc.id().to_string();
        self.documents.push(doc);
        id
    }

    pub fn remove_document(&mut self, id: &str) -> Result<PdfDocument, ValidationError> {
        let index = self.index_of(id)?;
        Ok(self.documents.remove(index))
    }

    pub fn documents(&self) -> &[PdfDocument] {
        &self.documents
    }

    pub fn document(&self, id: &str) -> Option<&PdfDocument> {
        self.documents.iter().find(|d| d.id() == id)
    }

    pub fn set_selected(&mut self, id: &str, selected: bool) -> Result<(), ValidationError> {
        let index = self.index_of(id)?;
        self.documents[index].selected = selected;
        Ok(())
    }

    pub fn select_all(&mut self, selected: bool) {
        for doc in &mut self.documents {
            doc.selected = selected;
        }
    }

    pub fn set_position(&mut self, id: &str, position: Position) -> Result<(), ValidationError> {
        let index = self.index_of(id)?;
        self.documents[index].position = Some(position);
        Ok(())
    }

    pub fn clear_position(&mut self, id: &str) -> Result<(), ValidationError> {
        let index = self.index_of(id)?;
        self.documents[index].position = None;
        Ok(())
    }

    pub fn selected_count(&self) -> usize {
        self.documents.iter().filter(|d| d.is_selected()).count()
    }

    pub fn signature(&self) -> &SignatureConfig {
        &self.signature
    }

    pub fn set_signature_image(&mut self, data_uri: impl Into<String>) {
        self.signature.set_image(data_uri);
    }

    pub fn clear_signature_image(&mut self) {
        self.signature.clear_image();
    }

    pub fn set_stamp_size(&mut self, size: f64) -> Result<(), ValidationError> {
        self.signature.set_size(size)
    }

    pub fn set_opacity(&mut self, opacity: f64) -> Result<(), ValidationError> {
        self.signature.set_opacity(opacity)
    }

    /// Check that a sign request can start.
    ///
    /// The fallback position is `default_position` when the host has one,
    /// otherwise the first selected document's own position. Without either,
    /// the request is rejected.
    pub fn plan(&self, default_position: Option<Position>) -> Result<SignPlan, ValidationError> {
        let selected: Vec<&PdfDocument> =
            self.documents.iter().filter(|d| d.is_selected()).collect();
        if selected.is_empty() {
            return Err(ValidationError::NoDocumentSelected);
        }
        if self.signature.image().is_none() {
            return Err(ValidationError::NoSignatureImage);
        }
        let fallback = default_position
            .or_else(|| selected.iter().find_map(|d| d.position()))
            .ok_or(ValidationError::NoPositionDefined)?;
        Ok(SignPlan {
            fallback,
            selected: selected.len(),
        })
    }

    pub fn sign(&self, plan: &SignPlan) -> BatchOutcome {
        sign_documents(&self.documents, &self.signature, plan.fallback)
    }

    fn index_of(&self, id: &str) -> Result<usize, ValidationError> {
        self.documents
            .iter()
            .position(|d| d.id() == id)
            .ok_or_else(|| ValidationError::UnknownDocument(id.to_string()))
    }
}
