//! Configuration validation: the gate every run passes before any output is written.

use crate::catalog::ProtocolCatalog;
use crate::error::ConfigError;
use crate::protocol::{Protocol, Role};
use crate::resolve::{ADDR_WIDTH, DATA_WIDTH};
use crate::types::{ConfigDocument, Configuration, Dut, Interface};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Checks a [`ConfigDocument`] for structural completeness and environmental
/// preconditions, producing an immutable [`Configuration`].
///
/// Checks run in order and stop at the first failure:
/// 1. required keys are present (`project_name`, `output_dir`, `dut`,
///    `interfaces`, `dut.module_name`)
/// 2. the DUT lists at least one source file, each of which exists, and
///    explicit bus widths are positive
/// 3. every interface has a unique name, a protocol tag, and a valid role
/// 4. every protocol tag is known and has a component template directory
/// 5. every protocol has a catalog entry
///
/// Validation never parses DUT sources; width inference happens later.
pub struct Validator<'a> {
    template_root: &'a Path,
    catalog: &'a ProtocolCatalog,
    base_dir: PathBuf,
}

impl<'a> Validator<'a> {
    /// Creates a validator against an installed template set and signal catalog.
    ///
    /// Relative paths in the document resolve against the current directory
    /// unless [`with_base_dir`](Self::with_base_dir) is used.
    pub fn new(template_root: &'a Path, catalog: &'a ProtocolCatalog) -> Self {
        Self {
            template_root,
            catalog,
            base_dir: PathBuf::from("."),
        }
    }

    /// Sets the directory that relative document paths resolve against.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Validates `doc`, consuming it.
    pub fn validate(&self, doc: ConfigDocument) -> Result<Configuration, ConfigError> {
        let project_name = required(doc.project_name, "project_name")?;
        let output_dir = doc
            .output_dir
            .ok_or_else(|| ConfigError::MissingField("output_dir".to_string()))?;
        let dut_doc = doc
            .dut
            .ok_or_else(|| ConfigError::MissingField("dut".to_string()))?;
        let interface_docs = doc
            .interfaces
            .ok_or_else(|| ConfigError::MissingField("interfaces".to_string()))?;
        let module_name = required(dut_doc.module_name, "dut.module_name")?;

        let source_files = dut_doc
            .source_files
            .ok_or_else(|| ConfigError::MissingField("dut.source_files".to_string()))?;
        if source_files.is_empty() {
            return Err(ConfigError::ValidationError(
                "dut.source_files must list at least one file".to_string(),
            ));
        }
        for src in &source_files {
            if !self.base_dir.join(src).exists() {
                return Err(ConfigError::SourceNotFound(src.clone()));
            }
        }
        for name in [ADDR_WIDTH, DATA_WIDTH] {
            if let Some(&value) = dut_doc.parameters.get(name) {
                if value <= 0 {
                    return Err(ConfigError::ValidationError(format!(
                        "dut.parameters.{name} must be positive, got {value}"
                    )));
                }
            }
        }

        if interface_docs.is_empty() {
            return Err(ConfigError::ValidationError(
                "interfaces must declare at least one interface".to_string(),
            ));
        }

        let mut names = HashSet::new();
        let mut interfaces = Vec::with_capacity(interface_docs.len());
        for (index, intf) in interface_docs.into_iter().enumerate() {
            let name = required(intf.name, &format!("interfaces[{index}].name"))?;
            let tag = required(intf.protocol, &format!("interfaces[{index}].protocol"))?;
            if !names.insert(name.clone()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate interface name '{name}'"
                )));
            }
            let role = match intf.role {
                Some(role) => role.parse::<Role>().map_err(|e| {
                    ConfigError::ValidationError(format!("interface '{name}': {e}"))
                })?,
                None => Role::default(),
            };
            let protocol = self.check_protocol(&tag)?;
            interfaces.push(Interface {
                name,
                protocol,
                role,
                port_map: intf.port_map,
            });
        }

        log::debug!(
            "configuration '{}' validated: {} interface(s)",
            project_name,
            interfaces.len()
        );

        Ok(Configuration {
            project_name,
            output_dir,
            dut: Dut {
                module_name,
                source_files,
                parameters: dut_doc.parameters,
                instance_parameters: dut_doc.dut_parameters,
            },
            interfaces,
            test_plan: doc.test_plan,
            simulation: doc.simulation.unwrap_or_default(),
            base_dir: self.base_dir.clone(),
        })
    }

    /// Resolves a protocol tag and checks that its template set and catalog entry exist.
    fn check_protocol(&self, tag: &str) -> Result<Protocol, ConfigError> {
        let protocol = tag
            .parse::<Protocol>()
            .map_err(|e| ConfigError::UnsupportedProtocol {
                protocol: tag.to_string(),
                reason: e.to_string(),
            })?;

        let template_dir = self.template_root.join(protocol.template_dir());
        if !template_dir.is_dir() {
            return Err(ConfigError::UnsupportedProtocol {
                protocol: tag.to_string(),
                reason: format!("template directory not found: {}", template_dir.display()),
            });
        }

        if !self.catalog.contains(protocol) {
            return Err(ConfigError::UnsupportedProtocol {
                protocol: tag.to_string(),
                reason: "no entry in the protocol signal catalog".to_string(),
            });
        }

        Ok(protocol)
    }
}

/// Returns the value of a required string field, treating empty strings as missing.
fn required(value: Option<String>, field: &str) -> Result<String, ConfigError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingField(field.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{load_config_from_str, DocumentFormat};
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        tmp: TempDir,
        catalog: ProtocolCatalog,
    }

    impl Fixture {
        fn new() -> Self {
            let tmp = TempDir::new().unwrap();
            fs::create_dir_all(tmp.path().join("templates/vip/apb")).unwrap();
            fs::create_dir_all(tmp.path().join("templates/vip/axi")).unwrap();
            fs::create_dir_all(tmp.path().join("rtl")).unwrap();
            fs::write(tmp.path().join("rtl/mem.v"), "module mem; endmodule\n").unwrap();
            let catalog = ProtocolCatalog::from_entries([
                (Protocol::Apb, vec!["pclk", "presetn", "paddr"]),
                (Protocol::Ahb, vec!["hclk"]),
            ]);
            Self { tmp, catalog }
        }

        fn templates(&self) -> PathBuf {
            self.tmp.path().join("templates")
        }

        fn validate(&self, yaml: &str) -> Result<Configuration, ConfigError> {
            let templates = self.templates();
            let validator =
                Validator::new(&templates, &self.catalog).with_base_dir(self.tmp.path());
            load_config_from_str(yaml, DocumentFormat::Yaml, &validator)
        }
    }

    const VALID: &str = r#"
project_name: mem_proj
output_dir: out
dut:
  module_name: mem
  source_files: [rtl/mem.v]
  parameters:
    ADDR_WIDTH: 16
interfaces:
  - name: vif_0
    protocol: apb
    type: slave
    port_map:
      pclk: pclk
"#;

    #[test]
    fn valid_configuration() {
        let fx = Fixture::new();
        let config = fx.validate(VALID).unwrap();
        assert_eq!(config.project_name, "mem_proj");
        assert_eq!(config.dut.module_name, "mem");
        assert_eq!(config.dut.parameters[ADDR_WIDTH], 16);
        assert_eq!(config.interfaces[0].protocol, Protocol::Apb);
        assert_eq!(config.interfaces[0].role, Role::Slave);
        assert_eq!(config.primary_protocol(), Some(Protocol::Apb));
        assert_eq!(config.base_dir, fx.tmp.path());
    }

    #[test]
    fn missing_top_level_keys_in_order() {
        let fx = Fixture::new();
        for (doc, field) in [
            ("output_dir: out\n", "project_name"),
            ("project_name: p\n", "output_dir"),
            ("project_name: p\noutput_dir: out\n", "dut"),
            ("project_name: p\noutput_dir: out\ndut: {module_name: m}\n", "interfaces"),
        ] {
            match fx.validate(doc).unwrap_err() {
                ConfigError::MissingField(f) => assert_eq!(f, field),
                other => panic!("expected MissingField({field}), got {other:?}"),
            }
        }
    }

    #[test]
    fn missing_source_files_is_reported_by_name() {
        let fx = Fixture::new();
        let doc = VALID.replace("  source_files: [rtl/mem.v]\n", "");
        match fx.validate(&doc).unwrap_err() {
            ConfigError::MissingField(f) => assert_eq!(f, "dut.source_files"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_source_files_rejected() {
        let fx = Fixture::new();
        let doc = VALID.replace("[rtl/mem.v]", "[]");
        assert!(matches!(
            fx.validate(&doc).unwrap_err(),
            ConfigError::ValidationError(_)
        ));
    }

    #[test]
    fn nonexistent_source_file_rejected() {
        let fx = Fixture::new();
        let doc = VALID.replace("rtl/mem.v", "rtl/missing.v");
        match fx.validate(&doc).unwrap_err() {
            ConfigError::SourceNotFound(p) => assert_eq!(p, PathBuf::from("rtl/missing.v")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_positive_width_rejected() {
        let fx = Fixture::new();
        let doc = VALID.replace("ADDR_WIDTH: 16", "ADDR_WIDTH: 0");
        assert!(matches!(
            fx.validate(&doc).unwrap_err(),
            ConfigError::ValidationError(_)
        ));
    }

    #[test]
    fn interface_without_protocol_rejected() {
        let fx = Fixture::new();
        let doc = VALID.replace("    protocol: apb\n", "");
        match fx.validate(&doc).unwrap_err() {
            ConfigError::MissingField(f) => assert_eq!(f, "interfaces[0].protocol"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_interface_list_rejected() {
        let fx = Fixture::new();
        let doc = r#"
project_name: p
output_dir: out
dut:
  module_name: mem
  source_files: [rtl/mem.v]
interfaces: []
"#;
        assert!(matches!(
            fx.validate(doc).unwrap_err(),
            ConfigError::ValidationError(_)
        ));
    }

    #[test]
    fn duplicate_interface_names_rejected() {
        let fx = Fixture::new();
        let doc = format!("{VALID}  - name: vif_0\n    protocol: apb\n");
        let err = fx.validate(&doc).unwrap_err();
        assert!(format!("{err}").contains("duplicate interface name 'vif_0'"));
    }

    #[test]
    fn invalid_role_rejected() {
        let fx = Fixture::new();
        let doc = VALID.replace("type: slave", "type: monitor");
        assert!(matches!(
            fx.validate(&doc).unwrap_err(),
            ConfigError::ValidationError(_)
        ));
    }

    #[test]
    fn missing_role_defaults_to_slave() {
        let fx = Fixture::new();
        let doc = VALID.replace("    type: slave\n", "");
        assert_eq!(fx.validate(&doc).unwrap().interfaces[0].role, Role::Slave);
    }

    #[test]
    fn unknown_protocol_tag_rejected() {
        let fx = Fixture::new();
        let doc = VALID.replace("protocol: apb", "protocol: wishbone");
        assert!(matches!(
            fx.validate(&doc).unwrap_err(),
            ConfigError::UnsupportedProtocol { .. }
        ));
    }

    #[test]
    fn protocol_without_template_dir_rejected() {
        let fx = Fixture::new();
        // ahb is in the catalog but has no templates/vip/ahb directory.
        let doc = VALID.replace("protocol: apb", "protocol: ahb");
        match fx.validate(&doc).unwrap_err() {
            ConfigError::UnsupportedProtocol { protocol, reason } => {
                assert_eq!(protocol, "ahb");
                assert!(reason.contains("template directory not found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn protocol_without_catalog_entry_rejected() {
        let fx = Fixture::new();
        // axi has templates but no catalog entry.
        let doc = VALID.replace("protocol: apb", "protocol: axi");
        match fx.validate(&doc).unwrap_err() {
            ConfigError::UnsupportedProtocol { reason, .. } => {
                assert!(reason.contains("catalog"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_catalog_rejects_every_protocol() {
        let fx = Fixture::new();
        let templates = fx.templates();
        let empty = ProtocolCatalog::empty();
        let validator = Validator::new(&templates, &empty).with_base_dir(fx.tmp.path());
        let err = load_config_from_str(VALID, DocumentFormat::Yaml, &validator).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedProtocol { .. }));
    }

    #[test]
    fn validation_creates_no_output() {
        let fx = Fixture::new();
        let doc = VALID.replace("rtl/mem.v", "rtl/missing.v");
        assert!(fx.validate(&doc).is_err());
        assert!(!fx.tmp.path().join("out").exists());
    }
}
