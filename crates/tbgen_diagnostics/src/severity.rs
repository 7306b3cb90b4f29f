//! How serious a diagnostic is for the run that raised it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a diagnostic, ordered `Note < Warning < Error`.
///
/// None of the levels stop generation on their own: configuration problems
/// are returned as errors before a sink exists, so anything reaching a sink
/// describes a single file or setting.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A fallback was applied, e.g. a bus width that could not be inferred.
    Note,
    /// Something was ignored or skipped, e.g. a missing template.
    Warning,
    /// An artifact could not be rendered or written.
    Error,
}

impl Severity {
    /// The lowercase label printed before the diagnostic code.
    pub fn label(self) -> &'static str {
        match self {
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }

    /// Returns `true` for [`Severity::Error`].
    pub fn is_error(self) -> bool {
        matches!(self, Severity::Error)
    }

    pub(crate) fn ansi(self) -> &'static str {
        match self {
            Severity::Note => "\x1b[1;34m",
            Severity::Warning => "\x1b[1;33m",
            Severity::Error => "\x1b[1;31m",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
