//! Seams to the host application: where signed files go, how the user is
//! told about outcomes, and what the host is able to do.

use std::fmt;
use std::path::PathBuf;

use crate::error::PersistError;

/// Alert severity shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(label)
    }
}

/// Destination for signed documents.
///
/// `Ok(Some(path))` when the file landed at a known path, `Ok(None)` when the
/// user cancelled or the destination does not report a path.
#[allow(async_fn_in_trait)]
pub trait PersistenceSink {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<Option<PathBuf>, PersistError>;
}

/// User-facing alerts
#[allow(async_fn_in_trait)]
pub trait Notifier {
    async fn notify(&self, severity: Severity, title: &str, message: &str);
}

/// What the host can do, decided once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HostCapabilities {
    /// Files can be written to a user-chosen location on the local filesystem
    pub native_save: bool,
}

pub trait CapabilityProvider {
    fn capabilities(&self) -> HostCapabilities;
}

impl CapabilityProvider for HostCapabilities {
    fn capabilities(&self) -> HostCapabilities {
        *self
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_labels() {
        assert_eq!(Severity::Info.to_string(), "info");
        assert_eq!(Severity::Warning.to_string(), "warning");
        assert_eq!(Severity::Error.to_string(), "error");
    }

    #[test]
    fn test_capabilities_default_to_download_only() {
        assert!(!HostCapabilities::default().capabilities().native_save);
    }
}
