//! Renders one template to one output file, recording the outcome.

use std::fs;
use std::io;
use std::path::Path;

use serde_json::Value;
use tbgen_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};
use tbgen_template::Template;

use crate::report::{GenerationReport, IssueKind};

/// Best-effort file renderer: every failure is reported and then swallowed.
pub(crate) struct ArtifactWriter<'a> {
    sink: &'a DiagnosticSink,
    report: GenerationReport,
}

impl<'a> ArtifactWriter<'a> {
    pub(crate) fn new(sink: &'a DiagnosticSink) -> Self {
        Self {
            sink,
            report: GenerationReport::default(),
        }
    }

    pub(crate) fn finish(self) -> GenerationReport {
        self.report
    }

    /// Renders `template` against `context` into `dest`. Returns `true` if written.
    pub(crate) fn render_file(
        &mut self,
        artifact: &str,
        template: &Path,
        dest: &Path,
        context: &Value,
    ) -> bool {
        let source = match fs::read_to_string(template) {
            Ok(source) => source,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.missing(artifact, template);
                return false;
            }
            Err(e) => {
                let note = remove_stale(dest);
                self.report_render_failure(
                    artifact,
                    template,
                    format!("failed to read template: {e}"),
                    note,
                );
                return false;
            }
        };

        let rendered = match Template::parse(&source).and_then(|t| t.render(context)) {
            Ok(rendered) => rendered,
            Err(e) => {
                let note = remove_stale(dest);
                self.report_render_failure(artifact, template, e.to_string(), note);
                return false;
            }
        };

        if let Some(parent) = dest.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                self.write_failed(artifact, dest, &e);
                return false;
            }
        }
        if let Err(e) = fs::write(dest, rendered) {
            self.write_failed(artifact, dest, &e);
            return false;
        }

        log::info!("generated {}", dest.display());
        self.report.record_written(dest.to_path_buf());
        true
    }

    /// Records a skipped artifact whose template does not exist.
    pub(crate) fn missing(&mut self, artifact: &str, template: &Path) {
        log::warn!(
            "template not found: {}; skipping {artifact}",
            template.display()
        );
        self.sink.emit(
            Diagnostic::warning(
                DiagnosticCode::TEMPLATE_MISSING,
                format!("template for `{artifact}` not found; artifact skipped"),
            )
            .with_path(template),
        );
        self.report.record_issue(
            artifact,
            template,
            IssueKind::TemplateMissing,
            "template not found",
        );
    }

    pub(crate) fn render_failed(&mut self, artifact: &str, template: &Path, message: String) {
        self.report_render_failure(artifact, template, message, None);
    }

    fn report_render_failure(
        &mut self,
        artifact: &str,
        template: &Path,
        message: String,
        note: Option<String>,
    ) {
        log::error!("failed to render {}: {message}", template.display());
        let mut diag = Diagnostic::error(
            DiagnosticCode::RENDER_FAILED,
            format!("failed to render `{artifact}`: {message}"),
        )
        .with_path(template);
        if let Some(note) = note {
            diag = diag.with_note(note);
        }
        self.sink.emit(diag);
        self.report
            .record_issue(artifact, template, IssueKind::RenderFailed, message);
    }

    pub(crate) fn write_failed(&mut self, artifact: &str, dest: &Path, error: &io::Error) {
        log::error!("failed to write {}: {error}", dest.display());
        self.sink.emit(
            Diagnostic::error(
                DiagnosticCode::WRITE_FAILED,
                format!("failed to write `{artifact}`: {error}"),
            )
            .with_path(dest),
        );
        self.report
            .record_issue(artifact, dest, IssueKind::WriteFailed, error.to_string());
    }
}

/// Deletes output left by an earlier run for an artifact that failed to render.
///
/// Returns a note describing what happened to the old file, if there was one.
fn remove_stale(dest: &Path) -> Option<String> {
    match fs::remove_file(dest) {
        Ok(()) => {
            log::debug!("removed stale {}", dest.display());
            Some(format!("removed stale {} from a previous run", dest.display()))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => Some(format!(
            "{} is left over from a previous run and could not be removed: {e}",
            dest.display()
        )),
    }
}
