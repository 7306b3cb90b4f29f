//! Loading and validation of testbench generator configuration documents.
//!
//! This crate reads the configuration document (YAML or TOML) into a raw
//! [`ConfigDocument`], validates it into an immutable [`Configuration`], and
//! provides the [`Protocol`] variant, the [`ProtocolCatalog`] of canonical
//! signal names, and DUT parameter precedence resolution.

#![warn(missing_docs)]

pub mod catalog;
pub mod error;
pub mod loader;
pub mod protocol;
pub mod resolve;
pub mod types;
pub mod validate;

pub use catalog::ProtocolCatalog;
pub use error::{CatalogError, ConfigError};
pub use loader::{load_config, load_config_from_str, load_document, load_document_from_str, DocumentFormat};
pub use protocol::{Protocol, Role, UnknownProtocol};
pub use resolve::{resolve_parameters, ParameterSource, ResolvedParameters};
pub use types::*;
pub use validate::Validator;
