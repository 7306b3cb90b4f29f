//! Configuration document loading.

use crate::error::ConfigError;
use crate::types::{ConfigDocument, Configuration};
use crate::validate::Validator;
use serde::de::DeserializeOwned;
use std::path::Path;

/// The serialization format of a configuration or catalog document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentFormat {
    /// YAML (`.yaml`, `.yml`, and anything unrecognized).
    Yaml,
    /// TOML (`.toml`).
    Toml,
}

impl DocumentFormat {
    /// Chooses the format from a file extension; YAML unless the extension is `.toml`.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => DocumentFormat::Toml,
            _ => DocumentFormat::Yaml,
        }
    }

    /// Deserializes `content` in this format, returning the parser's message on failure.
    pub(crate) fn parse<T: DeserializeOwned>(self, content: &str) -> Result<T, String> {
        match self {
            DocumentFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            DocumentFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        }
    }
}

/// Reads and parses a configuration document without validating it.
pub fn load_document(path: &Path) -> Result<ConfigDocument, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    log::debug!("loaded configuration document {}", path.display());
    load_document_from_str(&content, DocumentFormat::from_path(path))
}

/// Parses a configuration document from a string without validating it.
pub fn load_document_from_str(
    content: &str,
    format: DocumentFormat,
) -> Result<ConfigDocument, ConfigError> {
    // An empty YAML document deserializes to unit, not a mapping.
    if content.trim().is_empty() {
        return Ok(ConfigDocument::default());
    }
    format.parse(content).map_err(ConfigError::ParseError)
}

/// Loads, parses, and validates a configuration document from disk.
pub fn load_config(path: &Path, validator: &Validator<'_>) -> Result<Configuration, ConfigError> {
    validator.validate(load_document(path)?)
}

/// Parses and validates a configuration document from a string.
///
/// Useful for testing without a configuration file on disk.
pub fn load_config_from_str(
    content: &str,
    format: DocumentFormat,
    validator: &Validator<'_>,
) -> Result<Configuration, ConfigError> {
    validator.validate(load_document_from_str(content, format)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn format_from_extension() {
        assert_eq!(DocumentFormat::from_path(Path::new("config.toml")), DocumentFormat::Toml);
        assert_eq!(DocumentFormat::from_path(Path::new("config.TOML")), DocumentFormat::Toml);
        assert_eq!(DocumentFormat::from_path(Path::new("config.yaml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("config.yml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("config")), DocumentFormat::Yaml);
    }

    #[test]
    fn parse_yaml_document() {
        let yaml = r#"
project_name: "apb_mem_project"
output_dir: "./output"
dut:
  module_name: apb_slave_mem
  source_files:
    - "rtl/mem.v"
  parameters:
    ADDR_WIDTH: 32
    RAM_DEPTH: 256
interfaces:
  - name: "vif_0"
    protocol: "apb"
    type: "slave"
    port_map:
      pclk: "pclk"
test_plan:
  constraints:
    iterations: 100
"#;
        let doc = load_document_from_str(yaml, DocumentFormat::Yaml).unwrap();
        assert_eq!(doc.project_name.as_deref(), Some("apb_mem_project"));
        assert_eq!(doc.output_dir, Some(PathBuf::from("./output")));
        let dut = doc.dut.unwrap();
        assert_eq!(dut.parameters["RAM_DEPTH"], 256);
        let interfaces = doc.interfaces.unwrap();
        assert_eq!(interfaces[0].role.as_deref(), Some("slave"));
        let plan = doc.test_plan.unwrap();
        assert_eq!(plan["constraints"]["iterations"], 100);
    }

    #[test]
    fn parse_toml_document() {
        let toml = r#"
project_name = "axi_proj"
output_dir = "out"

[dut]
module_name = "axi_mem"
source_files = ["rtl/axi_mem.v"]

[dut.parameters]
DATA_WIDTH = 64

[[interfaces]]
name = "vif_0"
protocol = "axi"
type = "master"

[interfaces.port_map]
aclk = "aclk"
"#;
        let doc = load_document_from_str(toml, DocumentFormat::Toml).unwrap();
        assert_eq!(doc.project_name.as_deref(), Some("axi_proj"));
        assert_eq!(doc.dut.unwrap().parameters["DATA_WIDTH"], 64);
        assert_eq!(doc.interfaces.unwrap()[0].port_map["aclk"], "aclk");
    }

    #[test]
    fn missing_keys_are_none_not_parse_errors() {
        let doc = load_document_from_str("project_name: x\n", DocumentFormat::Yaml).unwrap();
        assert!(doc.output_dir.is_none());
        assert!(doc.dut.is_none());
        assert!(doc.interfaces.is_none());
    }

    #[test]
    fn empty_document_is_empty() {
        let doc = load_document_from_str("   \n", DocumentFormat::Yaml).unwrap();
        assert!(doc.project_name.is_none());
    }

    #[test]
    fn invalid_yaml_errors() {
        let err = load_document_from_str("dut: [unclosed", DocumentFormat::Yaml).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn invalid_toml_errors() {
        let err =
            load_document_from_str("this is not valid toml {{{}}}", DocumentFormat::Toml).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn wrong_value_type_is_parse_error() {
        let yaml = "dut:\n  parameters:\n    ADDR_WIDTH: wide\n";
        let err = load_document_from_str(yaml, DocumentFormat::Yaml).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn io_error_from_nonexistent_file() {
        let err = load_document(Path::new("/nonexistent/dir/config.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
