//! `tbgen init`: starter configuration scaffolding.
//!
//! Writes a YAML configuration document with one interface of the requested
//! protocol. When the protocol signal catalog is available, the interface's
//! port map binds each canonical signal to a DUT port of the same name.

use std::fs;

use tbgen_config::{Protocol, ProtocolCatalog};

use crate::{GlobalArgs, InitArgs};

/// Runs the `tbgen init` command.
///
/// Refuses to overwrite an existing file unless `--force` is given.
/// Returns exit code 0 on success.
pub fn run(args: &InitArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let protocol: Protocol = args.protocol.parse()?;

    if args.output.exists() && !args.force {
        return Err(format!(
            "'{}' already exists (use --force to overwrite)",
            args.output.display()
        )
        .into());
    }

    let catalog = ProtocolCatalog::load(&global.catalog)?;
    let signals = catalog.signals(protocol).unwrap_or_default();
    if signals.is_empty() {
        log::warn!(
            "no catalog entry for {protocol} in {}; writing an empty port map",
            global.catalog.display()
        );
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(&args.output, starter_config(protocol, signals))?;

    if !global.quiet {
        eprintln!("     Created {} for protocol `{protocol}`", args.output.display());
    }
    Ok(0)
}

/// Renders the starter configuration document.
fn starter_config(protocol: Protocol, signals: &[String]) -> String {
    let tag = protocol.tag();
    let mut content = format!(
        r#"# tbgen configuration
project_name: "my_{tag}_tb"
output_dir: "./output"

dut:
  module_name: "my_dut"
  source_files:
    - "rtl/my_dut.v"
  # Explicit values win over widths inferred from the DUT ports.
  parameters:
    ADDR_WIDTH: 32
    DATA_WIDTH: 32

interfaces:
  - name: "{tag}_if0"
    protocol: "{tag}"
    type: "slave"    # master or slave
    # DUT port : {tag} interface signal
    port_map:
"#
    );

    if signals.is_empty() {
        content.push_str("      {}\n");
    } else {
        let width = signals.iter().map(String::len).max().unwrap_or(0) + 1;
        for signal in signals {
            content.push_str(&format!(
                "      {:<width$} \"{signal}\"\n",
                format!("{signal}:")
            ));
        }
    }

    content.push_str(
        r#"
# Drives the generated sequence item, base sequence and monitor.
test_plan:
  constraints:
    addr:
      min: 0
      max: 1020
      align: 4
    data:
      type: random
    iterations: 16
  coverage:
    addr_ranges:
      - name: "low"
        range: [0, 511]
      - name: "high"
        range: [512, 1023]
    corner_cases: []
"#,
    );
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReportFormat;
    use std::path::{Path, PathBuf};
    use tbgen_config::{load_document, DocumentFormat};
    use tempfile::TempDir;

    fn global(catalog: &Path) -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
            format: ReportFormat::Text,
            templates: PathBuf::from("templates"),
            catalog: catalog.to_path_buf(),
        }
    }

    fn args(protocol: &str, output: PathBuf, force: bool) -> InitArgs {
        InitArgs {
            protocol: protocol.to_string(),
            output,
            force,
        }
    }

    #[test]
    fn writes_identity_port_map_from_catalog() {
        let tmp = TempDir::new().unwrap();
        let catalog = tmp.path().join("signals.yaml");
        fs::write(&catalog, "apb: [pclk, presetn, paddr]\n").unwrap();
        let output = tmp.path().join("config.yaml");

        let code = run(&args("APB", output.clone(), false), &global(&catalog)).unwrap();
        assert_eq!(code, 0);

        let doc = load_document(&output).unwrap();
        assert_eq!(doc.project_name.as_deref(), Some("my_apb_tb"));
        let interfaces = doc.interfaces.unwrap();
        let intf = &interfaces[0];
        assert_eq!(intf.protocol.as_deref(), Some("apb"));
        let entries: Vec<_> = intf
            .port_map
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(
            entries,
            vec![("pclk", "pclk"), ("presetn", "presetn"), ("paddr", "paddr")]
        );
    }

    #[test]
    fn starter_test_plan_is_nested() {
        let text = starter_config(Protocol::Ahb, &[]);
        let doc = tbgen_config::load_document_from_str(&text, DocumentFormat::Yaml).unwrap();
        let plan = doc.test_plan.unwrap();

        assert_eq!(plan["constraints"]["addr"]["align"], 4);
        assert_eq!(plan["constraints"]["iterations"], 16);
        assert_eq!(plan["coverage"]["addr_ranges"][1]["name"], "high");
        assert_eq!(plan["coverage"]["addr_ranges"][1]["range"][1], 1023);
        assert!(plan["coverage"]["corner_cases"].as_array().unwrap().is_empty());
    }

    #[test]
    fn missing_catalog_gives_empty_port_map() {
        let tmp = TempDir::new().unwrap();
        let output = tmp.path().join("cfg").join("axi.yaml");
        run(
            &args("axi", output.clone(), false),
            &global(&tmp.path().join("absent.yaml")),
        )
        .unwrap();

        let text = fs::read_to_string(&output).unwrap();
        let doc = tbgen_config::load_document_from_str(&text, DocumentFormat::Yaml).unwrap();
        assert!(doc.interfaces.unwrap()[0].port_map.is_empty());
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        let output = tmp.path().join("config.yaml");
        fs::write(&output, "keep me").unwrap();
        let catalog = tmp.path().join("absent.yaml");

        let err = run(&args("apb", output.clone(), false), &global(&catalog)).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(fs::read_to_string(&output).unwrap(), "keep me");

        run(&args("apb", output.clone(), true), &global(&catalog)).unwrap();
        assert!(fs::read_to_string(&output).unwrap().contains("apb_if0"));
    }

    #[test]
    fn unknown_protocol_is_error() {
        let tmp = TempDir::new().unwrap();
        let output = tmp.path().join("config.yaml");
        let err = run(
            &args("pcie", output.clone(), false),
            &global(&tmp.path().join("absent.yaml")),
        )
        .unwrap_err();
        assert!(err.to_string().contains("pcie"));
        assert!(!output.exists());
    }
}
