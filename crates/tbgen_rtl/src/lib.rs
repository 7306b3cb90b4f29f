//! DUT source scanning: bus width inference and port name lookup.
//!
//! The generator never elaborates the DUT. It only needs two facts from the
//! HDL text: the widths of the address and data buses, and whether a name
//! used in a port map actually appears in the source. Both come from a
//! [`DutSources`] loaded once per run.

#![warn(missing_docs)]

pub mod sources;
pub mod widths;

pub use sources::DutSources;
pub use widths::{infer_widths, infer_widths_from_source, InferredWidths, PortDecl};
