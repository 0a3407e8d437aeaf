//! Where signed PDFs are written
//!
//! Two destinations, picked once at startup:
//! - native: a user-chosen output directory, reports the saved path
//! - download: the Downloads folder, never overwrites, reports no path
//!
//! A failed native save falls back to the download destination once.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use stamp_core::{CapabilityProvider, HostCapabilities, PersistError, PersistenceSink};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

/// Sanitizes a suggested filename for saving.
///
/// - Removes path separators to prevent directory traversal
/// - Replaces dangerous characters (including control characters)
/// - Ensures non-empty result
/// - Limits length to reasonable value (respecting UTF-8 boundaries)
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .filter_map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => Some('_'),
            '\0'..='\x1f' | '\x7f' => None,
            c => Some(c),
        })
        .collect();

    let trimmed = sanitized.trim().trim_matches('.');

    let limited = match trimmed.char_indices().nth(200) {
        Some((end_idx, _)) => &trimmed[..end_idx],
        None => trimmed,
    };

    if limited.is_empty() {
        "document.pdf".to_string()
    } else {
        limited.to_string()
    }
}

/// Ensures a path has the .pdf extension.
pub fn ensure_pdf_extension(path: &Path) -> PathBuf {
    let mut result = path.to_path_buf();
    if result.extension().map_or(true, |ext| {
        ext.to_str().map_or(true, |s| !s.eq_ignore_ascii_case("pdf"))
    }) {
        result.set_extension("pdf");
    }
    result
}

/// `name.pdf`, `name (1).pdf`, `name (2).pdf`, ...
fn numbered_candidate(dir: &Path, file_name: &str, n: u32) -> PathBuf {
    if n == 0 {
        return dir.join(file_name);
    }
    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    match path.extension() {
        Some(ext) => dir.join(format!("{} ({}).{}", stem, n, ext.to_string_lossy())),
        None => dir.join(format!("{} ({})", stem, n)),
    }
}

fn target_name(file_name: &str) -> String {
    let sanitized = sanitize_filename(file_name);
    ensure_pdf_extension(Path::new(&sanitized))
        .to_string_lossy()
        .to_string()
}

/// Writes into an explicitly chosen directory, replacing same-named files
#[derive(Debug, Clone)]
pub struct NativeSink {
    dir: PathBuf,
}

impl NativeSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl PersistenceSink for NativeSink {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<Option<PathBuf>, PersistError> {
        if bytes.is_empty() {
            return Err(PersistError::EmptyDocument);
        }
        let path = self.dir.join(target_name(file_name));
        tokio::fs::write(&path, bytes).await?;
        Ok(Some(path))
    }
}

/// Drops files into the Downloads folder the way a browser does
#[derive(Debug, Clone)]
pub struct DownloadSink {
    dir: PathBuf,
}

impl DownloadSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The user's Downloads folder, or the current directory
    pub fn default_location() -> Self {
        Self::new(dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl PersistenceSink for DownloadSink {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<Option<PathBuf>, PersistError> {
        if bytes.is_empty() {
            return Err(PersistError::EmptyDocument);
        }
        let name = target_name(file_name);
        let mut n = 0;
        loop {
            let path = numbered_candidate(&self.dir, &name, n);
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    file.write_all(bytes).await?;
                    file.flush().await?;
                    info!(path = %path.display(), "Downloaded signed document");
                    return Ok(None);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => n += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Persistence destination selected at startup
#[derive(Debug, Clone)]
pub enum ExportTarget {
    Native {
        native: NativeSink,
        fallback: DownloadSink,
    },
    Download(DownloadSink),
}

impl ExportTarget {
    pub fn select(
        capabilities: HostCapabilities,
        out_dir: Option<PathBuf>,
        downloads: DownloadSink,
    ) -> Self {
        match out_dir {
            Some(dir) if capabilities.native_save => Self::Native {
                native: NativeSink::new(dir),
                fallback: downloads,
            },
            _ => Self::Download(downloads),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Native { native, .. } => format!("directory {}", native.dir().display()),
            Self::Download(d) => format!("downloads folder {}", d.dir().display()),
        }
    }
}

impl PersistenceSink for ExportTarget {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<Option<PathBuf>, PersistError> {
        match self {
            Self::Native { native, fallback } => match native.save(file_name, bytes).await {
                Ok(path) => Ok(path),
                Err(e) => {
                    warn!(file = file_name, error = %e, "Native save failed, downloading instead");
                    fallback.save(file_name, bytes).await
                }
            },
            Self::Download(sink) => sink.save(file_name, bytes).await,
        }
    }
}

/// Native saving is available when the configured output directory exists
/// or can be created.
#[derive(Debug, Clone, Default)]
pub struct OutputDirProbe {
    out_dir: Option<PathBuf>,
}

impl OutputDirProbe {
    pub fn new(out_dir: Option<PathBuf>) -> Self {
        Self { out_dir }
    }
}

impl CapabilityProvider for OutputDirProbe {
    fn capabilities(&self) -> HostCapabilities {
        let native_save = match &self.out_dir {
            Some(dir) if dir.is_dir() => true,
            Some(dir) => match std::fs::create_dir_all(dir) {
                Ok(()) => true,
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "Output directory unavailable");
                    false
                }
            },
            None => false,
        };
        HostCapabilities { native_save }
    }
}
