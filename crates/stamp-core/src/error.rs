use thiserror::Error;

/// Problems with a sign request, reported before any document is touched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Select at least one file to sign")]
    NoDocumentSelected,

    #[error("Add a signature image first")]
    NoSignatureImage,

    #[error("Set the signature position for at least one file")]
    NoPositionDefined,

    #[error("Opacity must be between 0 and 1, got {0}")]
    InvalidOpacity(f64),

    #[error("Stamp size must be a positive number, got {0}")]
    InvalidStampSize(f64),

    #[error("Unknown document: {0}")]
    UnknownDocument(String),
}

/// Failure to stamp a single document. Scoped to that document only.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmbedError {
    #[error("No signature provided")]
    NoSignature,

    #[error("Unsupported format: {0} (use PNG or JPEG)")]
    UnsupportedFormat(String),

    #[error("Malformed data URI: {0}")]
    MalformedDataUri(String),

    #[error("Could not decode signature image: {0}")]
    ImageDecode(String),

    #[error("Page not found")]
    PageNotFound,

    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    #[error("Failed to write PDF: {0}")]
    Write(String),
}

/// Failure to hand a signed document to its destination.
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("Cannot save an empty PDF file.")]
    EmptyDocument,

    #[error("Could not save the file. Please make sure you have permission to write to this location. ({0})")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_errors_read_like_user_messages() {
        assert_eq!(EmbedError::NoSignature.to_string(), "No signature provided");
        assert_eq!(EmbedError::PageNotFound.to_string(), "Page not found");
        assert!(EmbedError::UnsupportedFormat("image/gif".into())
            .to_string()
            .starts_with("Unsupported format"));
    }

    #[test]
    fn test_persist_error_mentions_permission() {
        let err = PersistError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert!(err.to_string().contains("permission"));
        assert!(err.to_string().contains("denied"));
    }
}
