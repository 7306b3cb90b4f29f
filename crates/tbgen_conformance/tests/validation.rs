//! Configurations rejected before any output is written.

use tbgen_config::ConfigError;
use tbgen_conformance::{apb_memory_config, ConfigBuilder, RunError, Workspace, APB_MEMORY};

fn apb_workspace() -> Workspace {
    let ws = Workspace::with_installed_templates().unwrap();
    ws.write("rtl/apb_mem.v", APB_MEMORY).unwrap();
    ws
}

fn config_error(result: Result<tbgen_conformance::GenerationRun, RunError>) -> ConfigError {
    match result {
        Err(RunError::Config(err)) => err,
        Err(other) => panic!("expected a configuration error, got {other}"),
        Ok(_) => panic!("expected a configuration error, generation ran"),
    }
}

#[test]
fn missing_source_files_names_the_field() {
    let ws = apb_workspace();
    let yaml = ConfigBuilder::new("t", "apb_mem")
        .interface("apb_if0", "apb", "slave", &[("paddr", "paddr")])
        .build();

    let err = config_error(ws.run(&yaml));
    assert!(matches!(&err, ConfigError::MissingField(f) if f == "dut.source_files"));
    assert!(err.to_string().contains("dut.source_files"));
    assert!(!ws.output().exists());
}

#[test]
fn nonexistent_source_file_is_rejected() {
    let ws = apb_workspace();
    let yaml = ConfigBuilder::new("t", "apb_mem")
        .source("rtl/missing.v")
        .interface("apb_if0", "apb", "slave", &[("paddr", "paddr")])
        .build();

    let err = config_error(ws.run(&yaml));
    assert!(matches!(err, ConfigError::SourceNotFound(p) if p.ends_with("rtl/missing.v")));
    assert!(!ws.output().exists());
}

#[test]
fn protocol_without_component_templates_is_rejected() {
    let ws = apb_workspace();
    ws.remove_template("vip/axi").unwrap();
    let yaml = apb_memory_config()
        .interface("axi_if0", "axi", "master", &[("awaddr", "awaddr")])
        .build();

    match config_error(ws.run(&yaml)) {
        ConfigError::UnsupportedProtocol { protocol, .. } => assert_eq!(protocol, "axi"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!ws.output().exists());
}

#[test]
fn unknown_protocol_is_rejected() {
    let ws = apb_workspace();
    let yaml = apb_memory_config()
        .interface("pcie_if0", "pcie", "slave", &[])
        .build();

    let err = config_error(ws.run(&yaml));
    assert!(matches!(err, ConfigError::UnsupportedProtocol { ref protocol, .. } if protocol == "pcie"));
}

#[test]
fn protocol_missing_from_catalog_is_rejected() {
    let ws = apb_workspace();
    ws.write_template("protocol_signals.yaml", "apb: [pclk, paddr]\n")
        .unwrap();
    let yaml = apb_memory_config()
        .interface("ahb_if0", "ahb", "slave", &[("haddr", "haddr")])
        .build();

    let err = config_error(ws.run(&yaml));
    assert!(matches!(err, ConfigError::UnsupportedProtocol { ref protocol, .. } if protocol == "ahb"));
}

#[test]
fn duplicate_interface_names_are_rejected() {
    let ws = apb_workspace();
    let yaml = apb_memory_config()
        .interface("apb_if0", "apb", "slave", &[("paddr", "paddr")])
        .build();

    let err = config_error(ws.run(&yaml));
    assert!(matches!(err, ConfigError::ValidationError(ref m) if m.contains("apb_if0")));
}

#[test]
fn invalid_role_is_rejected() {
    let ws = apb_workspace();
    let yaml = ConfigBuilder::new("t", "apb_mem")
        .source("rtl/apb_mem.v")
        .interface("apb_if0", "apb", "observer", &[("paddr", "paddr")])
        .build();

    let err = config_error(ws.run(&yaml));
    assert!(err.to_string().contains("observer"));
}

#[test]
fn valid_configuration_resolves_paths_against_workspace() {
    let ws = apb_workspace();
    let config = ws.validate(&apb_memory_config().build()).unwrap();

    assert_eq!(config.output_root(), ws.root().join("out"));
    assert_eq!(config.source_paths(), vec![ws.root().join("rtl/apb_mem.v")]);
    assert_eq!(config.interfaces.len(), 1);
    assert!(!ws.output().exists());
}
