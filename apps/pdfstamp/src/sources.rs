//! Reading PDFs and signature images from disk
//!
//! Unreadable or oversized PDFs are skipped with a warning so one bad path
//! does not stop the others from loading.

use std::path::Path;

use stamp_core::DataUri;
use tracing::warn;

/// Maximum file size allowed (100MB)
pub const MAX_FILE_SIZE: usize = 100 * 1024 * 1024;

/// A PDF read from disk
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Validates file size against the maximum limit.
pub fn validate_file_size(size: usize) -> Result<(), String> {
    if size > MAX_FILE_SIZE {
        Err("This PDF file is too large (over 100MB). Please select a smaller file.".to_string())
    } else {
        Ok(())
    }
}

/// Whether a file name looks like a PDF
pub fn is_pdf_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Formats an error for a single file in multi-file selection.
pub fn format_file_skip_error(filename: &str, reason: &str) -> String {
    if reason.contains("100MB") {
        format!("Skipped '{}' - file is too large (over 100MB)", filename)
    } else {
        format!("Could not read '{}': {}", filename, reason)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "document.pdf".to_string())
}

/// Read every PDF path. Returns the files that loaded and a message for each
/// one that was skipped.
pub async fn load_pdfs<P: AsRef<Path>>(paths: &[P]) -> (Vec<LoadedFile>, Vec<String>) {
    let mut files = Vec::with_capacity(paths.len());
    let mut skipped = Vec::new();

    for path in paths {
        let path = path.as_ref();
        let name = display_name(path);

        if !is_pdf_name(&name) {
            let msg = format_file_skip_error(&name, "not a PDF file");
            warn!("{}", msg);
            skipped.push(msg);
            continue;
        }

        match tokio::fs::read(path).await {
            Ok(bytes) => {
                if let Err(reason) = validate_file_size(bytes.len()) {
                    let msg = format_file_skip_error(&name, &reason);
                    warn!("{}", msg);
                    skipped.push(msg);
                    continue;
                }
                files.push(LoadedFile { name, bytes });
            }
            Err(e) => {
                let msg = format_file_skip_error(&name, &e.to_string());
                warn!("{}", msg);
                skipped.push(msg);
            }
        }
    }

    (files, skipped)
}

/// MIME type declared for a signature image, chosen from its extension
pub fn image_mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        _ => "image/png",
    }
}

/// Read a signature image and encode it as a data URI
pub async fn load_signature(path: &Path) -> std::io::Result<String> {
    let bytes = tokio::fs::read(path).await?;
    Ok(DataUri::encode(image_mime_for(path), &bytes))
}
