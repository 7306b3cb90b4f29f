//! The outcome of one generation run.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Why an artifact was not produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// The artifact's template (or component tree) does not exist.
    TemplateMissing,
    /// The template could not be read, parsed, or rendered.
    RenderFailed,
    /// The rendered output could not be written.
    WriteFailed,
}

/// One artifact that was skipped or failed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ArtifactIssue {
    /// Artifact name, e.g. `package` or `vip/apb`.
    pub artifact: String,
    /// The template or output path involved.
    pub path: PathBuf,
    /// What went wrong.
    pub kind: IssueKind,
    /// Human-readable cause.
    pub message: String,
}

/// Files written and artifacts skipped by [`generate`](crate::generate).
///
/// A run with issues still counts as completed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    /// Output files in the order they were written.
    pub written: Vec<PathBuf>,
    /// Skipped or failed artifacts in the order they were encountered.
    pub issues: Vec<ArtifactIssue>,
}

impl GenerationReport {
    pub(crate) fn record_written(&mut self, path: PathBuf) {
        self.written.push(path);
    }

    pub(crate) fn record_issue(
        &mut self,
        artifact: &str,
        path: &Path,
        kind: IssueKind,
        message: impl Into<String>,
    ) {
        self.issues.push(ArtifactIssue {
            artifact: artifact.to_string(),
            path: path.to_path_buf(),
            kind,
            message: message.into(),
        });
    }

    /// Number of artifacts skipped because their template was missing.
    pub fn skipped(&self) -> usize {
        self.count(IssueKind::TemplateMissing)
    }

    /// Number of artifacts that failed to render or write.
    pub fn failed(&self) -> usize {
        self.count(IssueKind::RenderFailed) + self.count(IssueKind::WriteFailed)
    }

    /// Returns `true` if every artifact was produced.
    pub fn is_complete(&self) -> bool {
        self.issues.is_empty()
    }

    /// Returns `true` if `path` was written during this run.
    pub fn wrote(&self, path: &Path) -> bool {
        self.written.iter().any(|p| p == path)
    }

    fn count(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|i| i.kind == kind).count()
    }
}
