//! The "sign documents" action: validate, stamp, save, tell the user.

use std::path::PathBuf;

use tracing::{error, info};

use crate::error::ValidationError;
use crate::host::{Notifier, PersistenceSink, Severity};
use crate::model::Position;
use crate::session::SigningSession;

/// Message shown when an unexpected error stops a sign request
pub const GENERIC_FAILURE_MESSAGE: &str = "Error signing documents. Check the log for details.";

/// A signed file handed to the persistence sink
#[derive(Debug, Clone, PartialEq)]
pub struct SavedFile {
    pub file_name: String,
    /// `None` when the sink reports no path (download, or cancelled)
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportReport {
    pub signed: usize,
    pub skipped: usize,
    pub saved: Vec<SavedFile>,
    pub failed_saves: usize,
}

/// Run a complete sign request against the session.
///
/// Validation problems are reported as a warning and returned; nothing is
/// signed in that case. Per-document and per-save failures are logged and
/// counted in the report.
pub async fn sign_and_export<S, N>(
    session: &SigningSession,
    default_position: Option<Position>,
    sink: &S,
    notifier: &N,
) -> Result<ExportReport, ValidationError>
where
    S: PersistenceSink,
    N: Notifier,
{
    let plan = match session.plan(default_position) {
        Ok(plan) => plan,
        Err(e) => {
            notifier
                .notify(Severity::Warning, "Attention", &e.to_string())
                .await;
            return Err(e);
        }
    };

    info!(documents = plan.selected, "Signing selected documents");
    let outcome = session.sign(&plan);

    let mut report = ExportReport {
        signed: outcome.signed.len(),
        skipped: outcome.failures.len(),
        ..ExportReport::default()
    };

    if outcome.signed.is_empty() {
        notifier
            .notify(
                Severity::Error,
                "Error",
                "No document was signed. Check the files and try again.",
            )
            .await;
        return Ok(report);
    }

    for result in &outcome.signed {
        match sink.save(&result.file_name, &result.bytes).await {
            Ok(path) => {
                if let Some(p) = &path {
                    info!(file = %result.file_name, path = %p.display(), "Saved signed document");
                }
                report.saved.push(SavedFile {
                    file_name: result.file_name.clone(),
                    path,
                });
            }
            Err(e) => {
                error!(file = %result.file_name, error = %e, "Failed to save signed document");
                report.failed_saves += 1;
            }
        }
    }

    notifier
        .notify(
            Severity::Info,
            "Success",
            &format!("{} document(s) signed successfully!", report.signed),
        )
        .await;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::test_pdfs::create_test_pdf;
    use crate::host::recording::{MemorySink, RecordingNotifier};
    use crate::signature::test_images::png_bytes;
    use crate::signature::DataUri;
    use pretty_assertions::assert_eq;

    fn session(names: &[&str]) -> SigningSession {
        let mut session = SigningSession::new();
        for name in names {
            session.add_document(*name, create_test_pdf(2));
        }
        session.select_all(true);
        session.set_signature_image(DataUri::encode("image/png", &png_bytes(30, 10)));
        session
    }

    #[tokio::test]
    async fn test_validation_error_warns_and_aborts() {
        let mut session = session(&["a.pdf"]);
        session.select_all(false);
        let sink = MemorySink::default();
        let notifier = RecordingNotifier::default();

        let result = sign_and_export(&session, None, &sink, &notifier).await;

        assert_eq!(result, Err(ValidationError::NoDocumentSelected));
        assert!(sink.saved.borrow().is_empty());
        let alerts = notifier.alerts.borrow();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].0, Severity::Warning);
        assert_eq!(alerts[0].1, "Attention");
        assert_eq!(alerts[0].2, "Select at least one file to sign");
    }

    #[tokio::test]
    async fn test_success_saves_each_and_reports() {
        let session = session(&["a.pdf", "b.pdf"]);
        let sink = MemorySink::default();
        let notifier = RecordingNotifier::default();

        let report = sign_and_export(&session, Some(Position::default()), &sink, &notifier)
            .await
            .unwrap();

        assert_eq!(report.signed, 2);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.failed_saves, 0);
        let names: Vec<String> = sink.saved.borrow().iter().map(|(n, _)| n.clone()).collect();
        assert_eq!(names, vec!["a_signed.pdf", "b_signed.pdf"]);
        assert_eq!(
            report.saved[0].path,
            Some(PathBuf::from("/out/a_signed.pdf"))
        );
        let alerts = notifier.alerts.borrow();
        assert_eq!(
            alerts.last().unwrap(),
            &(
                Severity::Info,
                "Success".to_string(),
                "2 document(s) signed successfully!".to_string()
            )
        );
    }

    #[tokio::test]
    async fn test_nothing_signed_reports_error() {
        let mut session = SigningSession::new();
        let id = session.add_document("broken.pdf", b"garbage".to_vec());
        session.set_selected(&id, true).unwrap();
        session.set_signature_image(DataUri::encode("image/png", &png_bytes(3, 3)));
        let sink = MemorySink::default();
        let notifier = RecordingNotifier::default();

        let report = sign_and_export(&session, Some(Position::default()), &sink, &notifier)
            .await
            .unwrap();

        assert_eq!(report.signed, 0);
        assert_eq!(report.skipped, 1);
        assert!(sink.saved.borrow().is_empty());
        assert_eq!(notifier.alerts.borrow()[0].0, Severity::Error);
    }

    #[tokio::test]
    async fn test_failed_save_is_counted_not_fatal() {
        let session = session(&["a.pdf", "b.pdf"]);
        let sink = MemorySink {
            fail_on: Some("a_signed.pdf".into()),
            ..MemorySink::default()
        };
        let notifier = RecordingNotifier::default();

        let report = sign_and_export(&session, Some(Position::default()), &sink, &notifier)
            .await
            .unwrap();

        assert_eq!(report.failed_saves, 1);
        assert_eq!(report.saved.len(), 1);
        assert_eq!(report.saved[0].file_name, "b_signed.pdf");
    }
}
