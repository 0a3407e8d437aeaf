//! Sequential batch signing
//!
//! Each selected document is stamped independently. A document that fails is
//! logged and left out of the results; the rest of the batch carries on.

use tracing::{debug, info, warn};

use crate::embed::stamp_pdf;
use crate::error::EmbedError;
use crate::model::{PdfDocument, Position, SignResult, SignatureConfig};
use crate::signature::SignatureImage;

const SIGNED_SUFFIX: &str = "_signed";

/// Output name for a signed document: `contract.pdf` -> `contract_signed.pdf`
pub fn signed_file_name(name: &str) -> String {
    let stem = match name.rsplit_once('.') {
        Some((stem, ext)) if ext.eq_ignore_ascii_case("pdf") => stem,
        _ => name,
    };
    format!("{}{}.pdf", stem, SIGNED_SUFFIX)
}

/// Outcome of a batch: the stamped documents, plus the ones that were skipped
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub signed: Vec<SignResult>,
    pub failures: Vec<(String, EmbedError)>,
}

/// Sign every selected document, in order.
///
/// Documents without their own position use `fallback`. The signature image
/// is decoded once; if that fails every selected document fails with the
/// same error.
pub fn sign_documents(
    documents: &[PdfDocument],
    config: &SignatureConfig,
    fallback: Position,
) -> BatchOutcome {
    let selected: Vec<&PdfDocument> = documents.iter().filter(|d| d.is_selected()).collect();
    let mut outcome = BatchOutcome::default();

    let image = config
        .image()
        .ok_or(EmbedError::NoSignature)
        .and_then(SignatureImage::from_data_uri);
    let image = match image {
        Ok(image) => image,
        Err(e) => {
            for doc in selected {
                warn!(document = doc.name(), error = %e, "Failed to sign document");
                outcome.failures.push((doc.name().to_string(), e.clone()));
            }
            return outcome;
        }
    };

    for doc in selected {
        let position = doc.position().unwrap_or(fallback);
        debug!(
            document = doc.name(),
            x = position.x,
            y = position.y,
            page = position.page,
            "Stamping document"
        );
        match stamp_pdf(
            doc.bytes(),
            &image,
            config.size(),
            config.opacity(),
            position,
        ) {
            Ok(bytes) => outcome.signed.push(SignResult {
                file_name: signed_file_name(doc.name()),
                bytes,
            }),
            Err(e) => {
                warn!(document = doc.name(), error = %e, "Failed to sign document");
                outcome.failures.push((doc.name().to_string(), e));
            }
        }
    }

    info!(
        signed = outcome.signed.len(),
        skipped = outcome.failures.len(),
        "Batch signing finished"
    );
    outcome
}
