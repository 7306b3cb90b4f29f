//! Configuration types: the raw document as written, and the validated form.

use crate::protocol::{Protocol, Role};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The configuration document exactly as deserialized from YAML or TOML.
///
/// Every required field is optional here so that the
/// [`Validator`](crate::Validator) can name the specific field that is missing
/// instead of surfacing a generic deserialization error.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigDocument {
    /// Project name used in generated file headers.
    pub project_name: Option<String>,
    /// Root directory of the generated output tree.
    pub output_dir: Option<PathBuf>,
    /// The device under test.
    pub dut: Option<DutDocument>,
    /// Declared protocol interfaces, in declaration order.
    pub interfaces: Option<Vec<InterfaceDocument>>,
    /// Constraint and coverage description, passed through to templates.
    #[serde(default)]
    pub test_plan: Option<serde_json::Value>,
    /// Toolchain bindings for the simulation script.
    #[serde(default)]
    pub simulation: Option<SimulationConfig>,
}

/// The `dut` section of a configuration document.
#[derive(Debug, Default, Deserialize)]
pub struct DutDocument {
    /// Name of the DUT module.
    pub module_name: Option<String>,
    /// HDL source files, in the order they should be scanned and compiled.
    pub source_files: Option<Vec<PathBuf>>,
    /// Integer parameters such as `ADDR_WIDTH` and `DATA_WIDTH`.
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub parameters: BTreeMap<String, i64>,
    /// Parameter overrides applied to the DUT instance in the top wiring.
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub dut_parameters: IndexMap<String, serde_json::Value>,
}

/// One entry of the `interfaces` list of a configuration document.
#[derive(Debug, Default, Deserialize)]
pub struct InterfaceDocument {
    /// Interface instance name (e.g. `vif_0`).
    pub name: Option<String>,
    /// Protocol tag (e.g. `apb`).
    pub protocol: Option<String>,
    /// `master` or `slave`; defaults to `slave`.
    #[serde(rename = "type")]
    pub role: Option<String>,
    /// DUT port name → canonical protocol signal name.
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub port_map: IndexMap<String, String>,
}

/// Deserializes a field that may be explicitly null as its default value.
///
/// Allows documents to write an empty section (`parameters:` in YAML) with
/// the same meaning as omitting it.
fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Bindings used by the simulation script to build the foreign-function wrapper.
///
/// The values come from the document, never from the running process, so
/// repeated runs produce identical scripts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Include directory of the embedded interpreter headers.
    pub python_include: String,
    /// Directory holding the interpreter's link library.
    pub python_lib_dir: String,
    /// Link library name without prefix or extension.
    pub python_lib_name: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            python_include: "/usr/include/python3".to_string(),
            python_lib_dir: "/usr/lib".to_string(),
            python_lib_name: "python3".to_string(),
        }
    }
}

/// A validated configuration, immutable for the rest of the run.
#[derive(Clone, Debug)]
pub struct Configuration {
    /// Project name.
    pub project_name: String,
    /// Output directory as written in the document.
    pub output_dir: PathBuf,
    /// The device under test.
    pub dut: Dut,
    /// Interfaces in declaration order; never empty.
    pub interfaces: Vec<Interface>,
    /// Optional test plan, passed through to templates untouched.
    pub test_plan: Option<serde_json::Value>,
    /// Simulation script bindings.
    pub simulation: SimulationConfig,
    /// Directory that relative paths in the document are resolved against.
    pub base_dir: PathBuf,
}

impl Configuration {
    /// The primary protocol: the protocol of the first declared interface.
    ///
    /// Default test, package, and simulation model names all derive from it.
    /// `None` only for a configuration assembled without any interfaces.
    pub fn primary_protocol(&self) -> Option<Protocol> {
        self.interfaces.first().map(|intf| intf.protocol)
    }

    /// Distinct protocols in first-declaration order.
    pub fn protocols(&self) -> Vec<Protocol> {
        let mut seen = Vec::new();
        for intf in &self.interfaces {
            if !seen.contains(&intf.protocol) {
                seen.push(intf.protocol);
            }
        }
        seen
    }

    /// Resolves a path from the document against [`base_dir`](Self::base_dir).
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }

    /// The output directory, resolved against the base directory.
    pub fn output_root(&self) -> PathBuf {
        self.resolve_path(&self.output_dir)
    }

    /// DUT source files, resolved against the base directory, in declared order.
    pub fn source_paths(&self) -> Vec<PathBuf> {
        self.dut
            .source_files
            .iter()
            .map(|p| self.resolve_path(p))
            .collect()
    }
}

/// The validated device under test.
#[derive(Clone, Debug)]
pub struct Dut {
    /// Module name.
    pub module_name: String,
    /// Source files as written in the document; each existed at validation time.
    pub source_files: Vec<PathBuf>,
    /// Explicit parameters; inferred values never overwrite these.
    pub parameters: BTreeMap<String, i64>,
    /// Instance parameter overrides for the top wiring.
    pub instance_parameters: IndexMap<String, serde_json::Value>,
}

/// A validated protocol interface.
#[derive(Clone, Debug)]
pub struct Interface {
    /// Interface instance name, unique within the configuration.
    pub name: String,
    /// The bus protocol.
    pub protocol: Protocol,
    /// Master or slave.
    pub role: Role,
    /// DUT port name → canonical signal name, in document order.
    pub port_map: IndexMap<String, String>,
}
