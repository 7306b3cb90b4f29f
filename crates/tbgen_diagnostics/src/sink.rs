//! Collection point for diagnostics raised during a generation run.

use std::fmt;
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;

use crate::code::DiagnosticCode;
use crate::diagnostic::Diagnostic;
use crate::severity::Severity;

/// Collects diagnostics in emission order.
///
/// Emitting only needs a shared reference, so the sink can be handed to
/// every stage of a run at once.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

/// Diagnostic counts per severity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Number of error diagnostics.
    pub errors: usize,
    /// Number of warning diagnostics.
    pub warnings: usize,
    /// Number of note diagnostics.
    pub notes: usize,
}

impl Summary {
    /// Whether no diagnostics were counted at all.
    pub fn is_empty(&self) -> bool {
        self.errors == 0 && self.warnings == 0 && self.notes == 0
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error(s), {} warning(s)", self.errors, self.warnings)?;
        if self.notes > 0 {
            write!(f, ", {} note(s)", self.notes)?;
        }
        Ok(())
    }
}

impl DiagnosticSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic.
    pub fn emit(&self, diag: Diagnostic) {
        self.lock().push(diag);
    }

    /// Whether any error has been recorded.
    pub fn has_errors(&self) -> bool {
        self.lock().iter().any(|d| d.severity.is_error())
    }

    /// Number of recorded diagnostics at `severity`.
    pub fn count(&self, severity: Severity) -> usize {
        self.lock().iter().filter(|d| d.severity == severity).count()
    }

    /// Counts of the recorded diagnostics, by severity.
    pub fn summary(&self) -> Summary {
        self.lock()
            .iter()
            .fold(Summary::default(), |mut summary, d| {
                match d.severity {
                    Severity::Error => summary.errors += 1,
                    Severity::Warning => summary.warnings += 1,
                    Severity::Note => summary.notes += 1,
                }
                summary
            })
    }

    /// Recorded diagnostics carrying `code`, in emission order.
    pub fn with_code(&self, code: DiagnosticCode) -> Vec<Diagnostic> {
        self.lock().iter().filter(|d| d.code == code).cloned().collect()
    }

    /// Drains every recorded diagnostic, leaving the sink empty.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.lock())
    }

    /// A copy of every recorded diagnostic.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.lock().clone()
    }

    // A poisoned lock still holds a valid vector; keep reporting.
    fn lock(&self) -> MutexGuard<'_, Vec<Diagnostic>> {
        self.diagnostics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
