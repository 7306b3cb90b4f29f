//! DUT source files loaded once per generation run.

use crate::widths::{scan_ports, InferredWidths};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tbgen_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};

/// A readable DUT source file.
struct SourceText {
    path: PathBuf,
    text: String,
}

/// The readable DUT source files of a configuration, in declared order.
///
/// Files that cannot be read are reported once, at load time, and are then
/// treated as empty.
#[derive(Default)]
pub struct DutSources {
    files: Vec<SourceText>,
    identifiers: HashSet<String>,
}

impl DutSources {
    /// Reads every file in `paths`; unreadable files are reported to `sink` and skipped.
    pub fn load(paths: &[PathBuf], sink: &DiagnosticSink) -> Self {
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            match std::fs::read(path) {
                Ok(bytes) => {
                    log::debug!("scanning DUT source {}", path.display());
                    files.push(SourceText {
                        path: path.clone(),
                        text: String::from_utf8_lossy(&bytes).into_owned(),
                    });
                }
                Err(e) => {
                    log::warn!("cannot read DUT source {}: {e}", path.display());
                    sink.emit(
                        Diagnostic::warning(
                            DiagnosticCode::SOURCE_UNREADABLE,
                            format!("cannot read DUT source: {e}"),
                        )
                        .with_path(path),
                    );
                }
            }
        }
        Self::from_files(files)
    }

    /// Builds a source set from in-memory `(name, text)` pairs.
    pub fn from_texts<I, P, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = (P, S)>,
        P: Into<PathBuf>,
        S: Into<String>,
    {
        Self::from_files(
            texts
                .into_iter()
                .map(|(path, text)| SourceText {
                    path: path.into(),
                    text: text.into(),
                })
                .collect(),
        )
    }

    fn from_files(files: Vec<SourceText>) -> Self {
        let identifiers = files
            .iter()
            .flat_map(|f| identifiers_in(&f.text))
            .map(str::to_string)
            .collect();
        Self { files, identifiers }
    }

    /// Infers bus widths; files are merged in order and the first value found wins.
    pub fn infer_widths(&self) -> InferredWidths {
        let mut merged = InferredWidths::default();
        for file in &self.files {
            let mut widths = InferredWidths::default();
            for port in scan_ports(&file.text) {
                widths.observe(&port);
            }
            merged.merge(widths);
            if merged.is_complete() {
                break;
            }
        }
        merged
    }

    /// Whether `name` appears as a whole identifier in any readable source file.
    pub fn mentions(&self, name: &str) -> bool {
        self.identifiers.contains(name)
    }

    /// Paths of the files that were read successfully.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(|f| f.path.as_path())
    }

    /// Whether no source file could be read.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Splits HDL text into identifier-like words.
fn identifiers_in(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
        .filter(|w| !w.is_empty())
}
