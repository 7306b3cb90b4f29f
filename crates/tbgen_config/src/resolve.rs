//! DUT parameter resolution: explicit values over inferred values over defaults.

use std::collections::BTreeMap;

/// Name of the address bus width parameter.
pub const ADDR_WIDTH: &str = "ADDR_WIDTH";
/// Name of the data bus width parameter.
pub const DATA_WIDTH: &str = "DATA_WIDTH";
/// Width used when a bus width is neither configured nor inferred.
pub const DEFAULT_WIDTH: i64 = 32;

/// Where a resolved parameter value came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParameterSource {
    /// Written in the configuration document.
    Explicit,
    /// Inferred from DUT source port declarations.
    Inferred,
    /// The hard default for bus widths.
    Default,
}

/// The merged parameter set shared by every artifact of one generation run.
///
/// Always contains [`ADDR_WIDTH`] and [`DATA_WIDTH`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedParameters {
    values: BTreeMap<String, (i64, ParameterSource)>,
}

/// Merges explicit parameters with inferred ones and fills in the width defaults.
///
/// An inferred value is added only for names the configuration does not set,
/// so explicit values are never overwritten.
pub fn resolve_parameters(
    explicit: &BTreeMap<String, i64>,
    inferred: &BTreeMap<String, i64>,
) -> ResolvedParameters {
    let mut values: BTreeMap<String, (i64, ParameterSource)> = explicit
        .iter()
        .map(|(name, value)| (name.clone(), (*value, ParameterSource::Explicit)))
        .collect();

    for (name, value) in inferred {
        values
            .entry(name.clone())
            .or_insert((*value, ParameterSource::Inferred));
    }

    for name in [ADDR_WIDTH, DATA_WIDTH] {
        values
            .entry(name.to_string())
            .or_insert((DEFAULT_WIDTH, ParameterSource::Default));
    }

    ResolvedParameters { values }
}

impl ResolvedParameters {
    /// The resolved address bus width.
    pub fn addr_width(&self) -> i64 {
        self.get(ADDR_WIDTH).unwrap_or(DEFAULT_WIDTH)
    }

    /// The resolved data bus width.
    pub fn data_width(&self) -> i64 {
        self.get(DATA_WIDTH).unwrap_or(DEFAULT_WIDTH)
    }

    /// The value of a parameter, if known.
    pub fn get(&self, name: &str) -> Option<i64> {
        self.values.get(name).map(|(value, _)| *value)
    }

    /// Where a parameter's value came from, if known.
    pub fn source(&self, name: &str) -> Option<ParameterSource> {
        self.values.get(name).map(|(_, source)| *source)
    }

    /// All parameters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.values
            .iter()
            .map(|(name, (value, _))| (name.as_str(), *value))
    }
}
