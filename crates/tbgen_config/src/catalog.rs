//! The protocol signal catalog: canonical signal names per protocol.

use crate::error::CatalogError;
use crate::loader::DocumentFormat;
use crate::protocol::Protocol;
use std::collections::BTreeMap;
use std::path::Path;

/// Read-only lookup from protocol tag to its ordered canonical signal names.
///
/// Loaded once per process and shared by reference with every component that
/// needs it. An absent catalog file yields an empty catalog, which makes every
/// protocol fail validation instead of failing the load.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProtocolCatalog {
    entries: BTreeMap<String, Vec<String>>,
}

impl ProtocolCatalog {
    /// Creates an empty catalog.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Loads the catalog from `path`, or returns an empty catalog if it does not exist.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        if !path.exists() {
            log::debug!(
                "protocol catalog {} not found, using an empty catalog",
                path.display()
            );
            return Ok(Self::empty());
        }
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::parse(&content, DocumentFormat::from_path(path))?;
        log::debug!(
            "loaded protocol catalog {} ({} protocols)",
            path.display(),
            catalog.len()
        );
        Ok(catalog)
    }

    /// Parses a catalog document: a mapping of protocol tag → list of signal names.
    ///
    /// Tags are matched case-insensitively.
    pub fn parse(content: &str, format: DocumentFormat) -> Result<Self, CatalogError> {
        if content.trim().is_empty() {
            return Ok(Self::empty());
        }
        let raw: BTreeMap<String, Vec<String>> =
            format.parse(content).map_err(CatalogError::ParseError)?;
        let entries = raw
            .into_iter()
            .map(|(tag, signals)| (tag.to_ascii_lowercase(), signals))
            .collect();
        Ok(Self { entries })
    }

    /// Builds a catalog from in-memory entries.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Protocol, Vec<S>)>,
        S: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(p, signals)| {
                (
                    p.tag().to_string(),
                    signals.into_iter().map(Into::into).collect(),
                )
            })
            .collect();
        Self { entries }
    }

    /// The canonical signals of `protocol`, if the catalog has an entry for it.
    pub fn signals(&self, protocol: Protocol) -> Option<&[String]> {
        self.entries.get(protocol.tag()).map(Vec::as_slice)
    }

    /// Whether the catalog has an entry for `protocol`.
    pub fn contains(&self, protocol: Protocol) -> bool {
        self.entries.contains_key(protocol.tag())
    }

    /// Whether `signal` is one of the canonical signals of `protocol`.
    pub fn is_canonical(&self, protocol: Protocol, signal: &str) -> bool {
        self.signals(protocol)
            .is_some_and(|signals| signals.iter().any(|s| s == signal))
    }

    /// Number of protocols in the catalog.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
