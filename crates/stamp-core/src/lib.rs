//! Batch signature stamping for PDF documents
//!
//! This crate places a signature image onto a page of many PDFs at once,
//! using lopdf for the document work. It is a visual overlay only: no
//! certificates or cryptographic signing are involved.
//!
//! - `geometry`: page resolution and top-left to PDF coordinate conversion
//! - `signature`: data-URI payloads and PNG/JPEG decoding
//! - `embed`: drawing the stamp onto a page
//! - `batch`: sequential signing of the selected documents
//! - `session` / `workflow`: session state and the complete sign action
//! - `host`: persistence, notification and capability seams

pub mod batch;
pub mod embed;
pub mod error;
pub mod geometry;
pub mod host;
pub mod info;
pub mod model;
pub mod session;
pub mod signature;
pub mod workflow;

pub use batch::{sign_documents, signed_file_name, BatchOutcome};
pub use embed::{sign_pdf, stamp_pdf};
pub use error::{EmbedError, PersistError, ValidationError};
pub use geometry::{placement, resolve_page, stamp_height, PageSize, Placement};
pub use host::{CapabilityProvider, HostCapabilities, Notifier, PersistenceSink, Severity};
pub use info::{inspect_pdf, PdfInfo};
pub use model::{PdfDocument, Position, SignResult, SignatureConfig};
pub use session::{SignPlan, SigningSession};
pub use signature::{DataUri, ImageFormat, SignatureImage};
pub use workflow::{sign_and_export, ExportReport, SavedFile};
