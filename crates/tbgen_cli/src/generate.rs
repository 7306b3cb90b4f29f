//! `tbgen generate`: validate a configuration and render the testbench.
//!
//! Orchestrates the run:
//! 1. Load the protocol signal catalog
//! 2. Load and validate the configuration (any failure aborts before output)
//! 3. Generate every artifact, best-effort
//! 4. Render collected diagnostics and a summary

use std::path::PathBuf;

use serde::Serialize;
use tbgen_config::{load_config, ProtocolCatalog, Validator};
use tbgen_diagnostics::{Diagnostic, DiagnosticRenderer, DiagnosticSink, Summary, TerminalRenderer};
use tbgen_generate::{ArtifactIssue, GenerationReport};

use crate::{GenerateArgs, GlobalArgs, ReportFormat};

/// Machine-readable summary printed with `--format json`.
#[derive(Serialize)]
struct JsonReport<'a> {
    written: &'a [PathBuf],
    issues: &'a [ArtifactIssue],
    summary: Summary,
    diagnostics: &'a [Diagnostic],
}

/// Runs the `tbgen generate` command.
///
/// Returns exit code 0 when generation ran to completion, even if individual
/// artifacts were skipped or failed; those are reported, not fatal. A
/// configuration that cannot be parsed or validated is an error.
pub fn run(args: &GenerateArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    if !args.config.is_file() {
        return Err(format!(
            "configuration file '{}' not found (run `tbgen init <protocol>` to create one)",
            args.config.display()
        )
        .into());
    }

    let catalog = ProtocolCatalog::load(&global.catalog)?;

    if !global.quiet {
        eprintln!("     Loading {}", args.config.display());
    }

    let validator = Validator::new(&global.templates, &catalog);
    let config = load_config(&args.config, &validator)?;

    if let (false, Some(primary)) = (global.quiet, config.primary_protocol()) {
        eprintln!(
            "  Generating {} ({} interface(s), primary protocol {primary})",
            config.project_name,
            config.interfaces.len(),
        );
    }

    let sink = DiagnosticSink::new();
    let report = tbgen_generate::generate(&config, &global.templates, &catalog, &sink)?;

    render_and_report(&sink, &report, global);

    if !global.quiet && global.format == ReportFormat::Text {
        eprintln!(
            "   Generated {} file(s) in {}",
            report.written.len(),
            config.output_root().display()
        );
        if !report.is_complete() {
            eprintln!(
                "     Skipped {} artifact(s), {} failed",
                report.skipped(),
                report.failed()
            );
        }
    }

    Ok(0)
}

/// Renders diagnostics and the report in the selected format.
fn render_and_report(sink: &DiagnosticSink, report: &GenerationReport, global: &GlobalArgs) {
    let diagnostics = sink.diagnostics();

    match global.format {
        ReportFormat::Text => {
            let renderer = TerminalRenderer::new(global.color);
            for diag in &diagnostics {
                eprintln!("{}", renderer.render(diag));
            }
            let summary = sink.summary();
            if !global.quiet && !summary.is_empty() {
                eprintln!("   Result: {summary}");
            }
        }
        ReportFormat::Json => {
            let json_report = JsonReport {
                written: &report.written,
                issues: &report.issues,
                summary: sink.summary(),
                diagnostics: &diagnostics,
            };
            let json =
                serde_json::to_string_pretty(&json_report).unwrap_or_else(|_| "{}".to_string());
            println!("{json}");
        }
    }
}
