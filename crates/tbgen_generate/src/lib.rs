//! Testbench generation for a validated configuration.
//!
//! [`generate`] is the entry point. It renders each protocol's reusable
//! component tree and the fixed set of per-project artifacts
//! ([`ArtifactKind`]) into the configured output directory, and returns a
//! [`GenerationReport`] listing what was written and what was skipped.
//!
//! Only failing to create the output directory is fatal. Everything after
//! that is best-effort per file, with each problem emitted to the
//! [`DiagnosticSink`](tbgen_diagnostics::DiagnosticSink).

#![warn(missing_docs)]

pub mod artifact;
mod components;
pub mod context;
pub mod error;
pub mod layout;
mod pipeline;
pub mod port_map;
pub mod report;
mod writer;

pub use artifact::ArtifactKind;
pub use context::ContextBuilder;
pub use error::GenerateError;
pub use layout::OutputLayout;
pub use pipeline::generate;
pub use port_map::{resolve_port_map, PortBinding, ResolvedPortMap};
pub use report::{ArtifactIssue, GenerationReport, IssueKind};
