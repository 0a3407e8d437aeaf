//! PDF inspection, used to pick stamp positions before signing

use lopdf::Document;
use serde::Serialize;

use crate::error::EmbedError;
use crate::geometry::page_size;

/// Size of one page, in points
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PageInfo {
    pub number: u32,
    pub width: f64,
    pub height: f64,
}

/// Basic facts about a PDF file
#[derive(Debug, Clone, Serialize, Default)]
pub struct PdfInfo {
    /// Number of pages in the document
    pub page_count: u32,
    /// PDF version string (e.g., "1.7")
    pub version: String,
    /// Whether the document is encrypted
    pub encrypted: bool,
    /// File size in bytes
    pub size_bytes: usize,
    pub pages: Vec<PageInfo>,
}

/// Parse a PDF and report its pages
pub fn inspect_pdf(bytes: &[u8]) -> Result<PdfInfo, EmbedError> {
    if !bytes.starts_with(b"%PDF-") {
        return Err(EmbedError::Parse(
            "Not a valid PDF file (missing %PDF- header)".to_string(),
        ));
    }

    let doc = Document::load_mem(bytes).map_err(|e| EmbedError::Parse(e.to_string()))?;

    let pages: Vec<PageInfo> = doc
        .get_pages()
        .into_iter()
        .map(|(number, id)| {
            let size = page_size(&doc, id);
            PageInfo {
                number,
                width: size.width,
                height: size.height,
            }
        })
        .collect();

    Ok(PdfInfo {
        page_count: pages.len() as u32,
        version: doc.version.clone(),
        encrypted: doc.is_encrypted(),
        size_bytes: bytes.len(),
        pages,
    })
}
