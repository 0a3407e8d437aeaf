//! Console alerts

use std::io::Write;
use std::sync::Mutex;

use stamp_core::{Notifier, Severity};
use tracing::debug;

/// Format an alert the way it is printed
pub fn format_alert(severity: Severity, title: &str, message: &str) -> String {
    format!("[{}] {}: {}", severity, title, message)
}

/// Prints alerts to a writer, stderr by default
pub struct ConsoleNotifier<W = std::io::Stderr> {
    out: Mutex<W>,
}

impl ConsoleNotifier {
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write> ConsoleNotifier<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write> Notifier for ConsoleNotifier<W> {
    async fn notify(&self, severity: Severity, title: &str, message: &str) {
        debug!(%severity, title, message, "Showing alert");
        let line = format_alert(severity, title, message);
        let mut out = match self.out.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        // Nothing sensible to do if the console is gone
        let _ = writeln!(out, "{}", line);
    }
}
