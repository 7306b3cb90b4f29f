//! The artifact rendering pipeline.

use std::path::Path;

use tbgen_config::resolve::{ADDR_WIDTH, DATA_WIDTH, DEFAULT_WIDTH};
use tbgen_config::{resolve_parameters, Configuration, ParameterSource, ProtocolCatalog};
use tbgen_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};
use tbgen_rtl::DutSources;

use crate::artifact::ArtifactKind;
use crate::components::render_component_tree;
use crate::context::ContextBuilder;
use crate::error::GenerateError;
use crate::layout::OutputLayout;
use crate::port_map::{resolve_port_map, ResolvedPortMap};
use crate::report::GenerationReport;
use crate::writer::ArtifactWriter;

/// Generates the complete testbench for a validated configuration.
///
/// Steps:
/// 1. Create `<out>`, `<out>/tb` and `<out>/sim` (fatal, as is a
///    configuration without interfaces, which is rejected before this)
/// 2. Read the DUT sources once, infer bus widths, and resolve parameters
///    (explicit, then inferred, then the default of 32)
/// 3. Check every interface's port map against the catalog and the sources
/// 4. Render each protocol's component tree into `<out>/vip/<tag>`
/// 5. Render every [`ArtifactKind`] from its own template
///
/// Steps 4 and 5 are best-effort: a missing template, a render failure, or a
/// write failure is reported to `sink` and recorded in the returned report,
/// and generation continues with the next file.
pub fn generate(
    config: &Configuration,
    template_root: &Path,
    catalog: &ProtocolCatalog,
    sink: &DiagnosticSink,
) -> Result<GenerationReport, GenerateError> {
    let primary = config
        .primary_protocol()
        .ok_or_else(|| GenerateError::NoInterfaces {
            project: config.project_name.clone(),
        })?;

    let layout = OutputLayout::new(config.output_root());
    layout.create()?;
    log::debug!("output directory {}", layout.root().display());

    let sources = DutSources::load(&config.source_paths(), sink);
    let inferred = sources.infer_widths();
    let params = resolve_parameters(&config.dut.parameters, &inferred.to_parameters());
    report_width_fallbacks(&params, sink);

    let port_maps: Vec<ResolvedPortMap> = config
        .interfaces
        .iter()
        .map(|intf| resolve_port_map(intf, catalog, &sources, sink))
        .collect();

    let contexts = ContextBuilder::new(config, primary, &params, &port_maps, &layout);
    let mut writer = ArtifactWriter::new(sink);

    for protocol in config.protocols() {
        let context = contexts.component(protocol);
        render_component_tree(&mut writer, protocol, template_root, &layout, &context);
    }

    for kind in ArtifactKind::ALL {
        let template = template_root.join(kind.template_path(primary));
        let dest = kind.destination(&layout, primary);
        writer.render_file(kind.name(), &template, &dest, &contexts.artifact(kind));
    }

    let report = writer.finish();
    log::debug!(
        "generation finished: {} written, {} skipped, {} failed",
        report.written.len(),
        report.skipped(),
        report.failed()
    );
    Ok(report)
}

/// Notes each bus width that fell back to the default.
fn report_width_fallbacks(params: &tbgen_config::ResolvedParameters, sink: &DiagnosticSink) {
    for name in [ADDR_WIDTH, DATA_WIDTH] {
        match params.source(name) {
            Some(ParameterSource::Default) => sink.emit(
                Diagnostic::note(
                    DiagnosticCode::WIDTH_NOT_INFERRED,
                    format!("no port declaration found for {name}; using {DEFAULT_WIDTH}"),
                )
                .with_help(format!("set dut.parameters.{name} to choose a width")),
            ),
            Some(source) => {
                log::debug!("{name} = {:?} ({source:?})", params.get(name));
            }
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::PathBuf;
    use tbgen_config::{Dut, Interface, Protocol, Role, SimulationConfig};
    use tbgen_diagnostics::Severity;

    fn config(base: &Path, parameters: BTreeMap<String, i64>) -> Configuration {
        Configuration {
            project_name: "mem_tb".into(),
            output_dir: PathBuf::from("out"),
            dut: Dut {
                module_name: "mem".into(),
                source_files: vec![PathBuf::from("rtl/mem.v")],
                parameters,
                instance_parameters: Default::default(),
            },
            interfaces: vec![Interface {
                name: "apb_if0".into(),
                protocol: Protocol::Apb,
                role: Role::Slave,
                port_map: [("paddr".to_string(), "paddr".to_string())]
                    .into_iter()
                    .collect(),
            }],
            test_plan: None,
            simulation: SimulationConfig::default(),
            base_dir: base.to_path_buf(),
        }
    }

    fn write(path: &Path, text: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    fn setup(dut: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let t = dir.path().join("templates");
        write(&dir.path().join("rtl/mem.v"), dut);
        write(&t.join("vip/apb/apb_if.sv"), "[{{ ADDR_WIDTH }}:{{ DATA_WIDTH }}] {{ clock_name }}");
        write(&t.join("tb/top.sv"), "module top; // {{ default_test }} {{ addr_width }}");
        write(&t.join("tb/tb_env.sv"), "{% for i in interfaces %}{{ i.agent_type }}{% endfor %}");
        write(&t.join("tb/tb_pkg.sv"), "package {{ package_name }}; // {{ test_name }}");
        write(&t.join("test/apb_test.sv"), "class {{ test_name }};");
        write(&t.join("sim/run.tcl"), "{{ dut_files }} {{ tb_files }}");
        write(&t.join("dpi/wrapper.c"), "\"{{ model_module_name }}\"");
        dir
    }

    #[test]
    fn writes_every_artifact() {
        let dir = setup("module mem(input [11:0] paddr, output [15:0] prdata);");
        let sink = DiagnosticSink::new();
        let cfg = config(dir.path(), BTreeMap::new());
        let report = generate(
            &cfg,
            &dir.path().join("templates"),
            &ProtocolCatalog::empty(),
            &sink,
        )
        .unwrap();

        let out = dir.path().join("out");
        assert!(report.is_complete(), "{:?}", report.issues);
        assert_eq!(report.written.len(), 7);
        assert_eq!(
            fs::read_to_string(out.join("vip/apb/apb_if.sv")).unwrap(),
            "[12:16] pclk"
        );
        assert_eq!(
            fs::read_to_string(out.join("tb/top.sv")).unwrap(),
            "module top; // apb_test 12"
        );
        assert_eq!(fs::read_to_string(out.join("tb/tb_env.sv")).unwrap(), "apb_agent");
        assert_eq!(
            fs::read_to_string(out.join("sim/run.tcl")).unwrap(),
            "../../rtl/mem.v ../tb/tb_pkg.sv ../tb/top.sv"
        );
        assert_eq!(
            fs::read_to_string(out.join("sim/wrapper.c")).unwrap(),
            "\"apb_model\""
        );
        assert!(out.join("tb/apb_test.sv").is_file());
    }

    #[test]
    fn configuration_without_interfaces_is_rejected() {
        let dir = setup("module mem(input [11:0] paddr);");
        let sink = DiagnosticSink::new();
        let mut cfg = config(dir.path(), BTreeMap::new());
        cfg.interfaces.clear();

        let err = generate(&cfg, &dir.path().join("templates"), &ProtocolCatalog::empty(), &sink)
            .unwrap_err();
        assert!(matches!(err, GenerateError::NoInterfaces { ref project } if project == "mem_tb"));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn explicit_width_wins_over_inferred() {
        let dir = setup("module mem(input [11:0] paddr, output [15:0] prdata);");
        let sink = DiagnosticSink::new();
        let cfg = config(dir.path(), BTreeMap::from([("ADDR_WIDTH".to_string(), 20)]));
        generate(&cfg, &dir.path().join("templates"), &ProtocolCatalog::empty(), &sink).unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join("out/vip/apb/apb_if.sv")).unwrap(),
            "[20:16] pclk"
        );
    }

    #[test]
    fn default_width_is_noted() {
        let dir = setup("module mem(input clk);");
        let sink = DiagnosticSink::new();
        let cfg = config(dir.path(), BTreeMap::new());
        generate(&cfg, &dir.path().join("templates"), &ProtocolCatalog::empty(), &sink).unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join("out/vip/apb/apb_if.sv")).unwrap(),
            "[32:32] pclk"
        );
        let notes: Vec<_> = sink
            .diagnostics()
            .into_iter()
            .filter(|d| d.code == DiagnosticCode::WIDTH_NOT_INFERRED)
            .collect();
        assert_eq!(notes.len(), 2);
        assert!(notes.iter().all(|d| d.severity == Severity::Note));
    }

    #[test]
    fn render_failure_does_not_stop_other_artifacts() {
        let dir = setup("module mem(input [7:0] paddr);");
        write(&dir.path().join("templates/tb/top.sv"), "{{ no_such_field }}");
        let sink = DiagnosticSink::new();
        let cfg = config(dir.path(), BTreeMap::new());
        let report = generate(
            &cfg,
            &dir.path().join("templates"),
            &ProtocolCatalog::empty(),
            &sink,
        )
        .unwrap();

        assert_eq!(report.failed(), 1);
        assert_eq!(report.issues[0].artifact, "top");
        assert_eq!(report.written.len(), 6);
        assert!(!dir.path().join("out/tb/top.sv").exists());
        assert!(sink.has_errors());
    }
}
