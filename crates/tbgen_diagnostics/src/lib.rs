//! Problems found while generating a testbench, and how they are shown.
//!
//! A [`Diagnostic`] pairs a [`Severity`] with a stable [`DiagnosticCode`]
//! (`T101` for a missing template, `P102` for an unknown port-map signal,
//! ...), an optional path, and notes or help lines. Generation stages emit
//! into a shared [`DiagnosticSink`]; the CLI prints them through a
//! [`DiagnosticRenderer`].

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::{DiagnosticSink, Summary};
