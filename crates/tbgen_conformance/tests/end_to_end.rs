//! End-to-end generation against the installed template set.

use tbgen_conformance::{apb_memory_config, Workspace, APB_MEMORY};
use tbgen_diagnostics::Severity;

fn apb_workspace() -> Workspace {
    let ws = Workspace::with_installed_templates().unwrap();
    ws.write("rtl/apb_mem.v", APB_MEMORY).unwrap();
    ws
}

// ---------------------------------------------------------------------------
// Single APB interface
// ---------------------------------------------------------------------------

#[test]
fn apb_run_writes_every_artifact() {
    let ws = apb_workspace();
    let run = ws.run(&apb_memory_config().build()).unwrap();

    assert!(run.report.is_complete(), "issues: {:?}", run.report.issues);
    assert!(!run
        .diagnostics
        .iter()
        .any(|d| d.severity >= Severity::Warning));

    for path in [
        "tb/top.sv",
        "tb/tb_env.sv",
        "tb/tb_pkg.sv",
        "tb/apb_test.sv",
        "sim/run.tcl",
        "sim/wrapper.c",
        "vip/apb/apb_if.sv",
        "vip/apb/apb_pkg.sv",
        "vip/apb/apb_agent.sv",
        "vip/apb/apb_driver.sv",
        "vip/apb/apb_monitor.sv",
        "vip/apb/apb_seq_item.sv",
        "vip/apb/apb_base_seq.sv",
    ] {
        assert!(run.exists(path), "{path} was not generated");
    }
    assert_eq!(run.report.written.len(), 13);
}

#[test]
fn top_and_script_agree_on_package_and_test() {
    let ws = apb_workspace();
    let run = ws.run(&apb_memory_config().build()).unwrap();

    let top = run.read("tb/top.sv").unwrap();
    let script = run.read("sim/run.tcl").unwrap();
    assert!(!top.trim().is_empty());
    assert!(!script.trim().is_empty());

    assert!(top.contains("import tb_pkg::*;"));
    assert!(top.contains("run_test(\"apb_test\");"));
    assert!(script.contains("set TEST apb_test"));
    assert!(script.contains("../tb/tb_pkg.sv"));

    let package = run.read("tb/tb_pkg.sv").unwrap();
    assert!(package.contains("package tb_pkg;"));
    assert!(package.contains("`include \"apb_test.sv\""));
}

#[test]
fn port_map_binds_dut_to_interface() {
    let ws = apb_workspace();
    let run = ws.run(&apb_memory_config().build()).unwrap();
    let top = run.read("tb/top.sv").unwrap();

    assert!(top.contains("apb_if apb_if0 (.pclk(clk), .presetn(rst_n));"));
    assert!(top.contains("  apb_mem dut ("));
    assert!(top.contains("    .paddr(apb_if0.paddr),"));
    // Last binding carries no trailing comma.
    assert!(top.contains("    .pslverr(apb_if0.pslverr)\n  );"));
}

#[test]
fn sim_script_references_sources_relative_to_sim_dir() {
    let ws = apb_workspace();
    let run = ws.run(&apb_memory_config().build()).unwrap();
    let script = run.read("sim/run.tcl").unwrap();

    assert!(script.contains("../../rtl/apb_mem.v"));
    assert!(script.contains("../vip/apb/apb_pkg.sv ../vip/apb/apb_if.sv"));
    assert!(script.contains("-i ../vip/apb"));
    assert!(script.contains("apb_model.py"));
}

#[test]
fn inferred_widths_reach_component_tree() {
    let ws = Workspace::with_installed_templates().unwrap();
    ws.write(
        "rtl/apb_mem.v",
        &APB_MEMORY.replace("[31:0] prdata", "[15:0] prdata").replace("[31:0] pwdata", "[15:0] pwdata"),
    )
    .unwrap();
    let run = ws.run(&apb_memory_config().build()).unwrap();
    let intf = run.read("vip/apb/apb_if.sv").unwrap();

    assert!(intf.contains("logic [31:0] paddr;"));
    assert!(intf.contains("logic [15:0] prdata;"));
    let package = run.read("vip/apb/apb_pkg.sv").unwrap();
    assert!(package.contains("localparam int APB_DATA_WIDTH = 16;"));
}

#[test]
fn wrapper_loads_protocol_model() {
    let ws = apb_workspace();
    let run = ws.run(&apb_memory_config().build()).unwrap();
    let wrapper = run.read("sim/wrapper.c").unwrap();
    assert!(wrapper.contains("PyImport_ImportModule(\"apb_model\")"));
}

// ---------------------------------------------------------------------------
// Test plan pass-through
// ---------------------------------------------------------------------------

fn planner_test_plan() -> serde_json::Value {
    serde_json::json!({
        "constraints": {
            "addr": {"min": 0, "max": 1020, "align": 4},
            "data": {"type": "random"},
            "iterations": 100,
        },
        "coverage": {
            "addr_ranges": [
                {"name": "low", "range": [0, 255]},
                {"name": "high", "range": [768, 1023]},
            ],
            "corner_cases": ["boundary_addr: 0x0, 0x3FC"],
        },
    })
}

#[test]
fn nested_test_plan_drives_constraints_and_coverage() {
    let ws = apb_workspace();
    let yaml = apb_memory_config().test_plan(planner_test_plan()).build();
    let run = ws.run(&yaml).unwrap();
    assert!(run.report.is_complete(), "issues: {:?}", run.report.issues);

    let item = run.read("vip/apb/apb_seq_item.sv").unwrap();
    assert!(item.contains(
        "  constraint plan_c {\n    addr inside {[0:1020]};\n    addr % 4 == 0;\n  }"
    ));
    assert!(!item.contains("iterations;"));

    let sequence = run.read("vip/apb/apb_base_seq.sv").unwrap();
    assert!(sequence.contains("num_transfers = 100;"));

    let monitor = run.read("vip/apb/apb_monitor.sv").unwrap();
    assert!(monitor.contains("      bins low = {[0:255]};\n      bins high = {[768:1023]};"));
    assert!(monitor.contains("    plan_cg = new();"));
    assert!(monitor.contains("plan_cg.sample(observed.addr);"));
    assert!(monitor.contains("  // Corner cases\n  //   boundary_addr: 0x0, 0x3FC"));

    let test = run.read("tb/apb_test.sv").unwrap();
    assert!(test.contains("//   address: 0 to 1020, align 4"));
    assert!(test.contains("//   data: random"));
    assert!(test.contains("//   iterations: 100"));
    assert!(test.contains("//   coverage bin high: 768 to 1023"));
    assert!(test.contains("//   corner case: boundary_addr: 0x0, 0x3FC"));
}

#[test]
fn partial_test_plan_keeps_remaining_defaults() {
    let ws = apb_workspace();
    let yaml = apb_memory_config()
        .interface("axi_if0", "axi", "master", &[("awaddr", "awaddr")])
        .test_plan(serde_json::json!({"constraints": {"iterations": 8}}))
        .build();
    let run = ws.run(&yaml).unwrap();
    assert!(run.report.is_complete(), "issues: {:?}", run.report.issues);

    for seq in ["vip/apb/apb_base_seq.sv", "vip/axi/axi_base_seq.sv"] {
        assert!(run.read(seq).unwrap().contains("num_transfers = 8;"), "{seq}");
    }
    assert!(!run.read("vip/axi/axi_seq_item.sv").unwrap().contains("plan_c"));
    let monitor = run.read("vip/axi/axi_monitor.sv").unwrap();
    assert!(!monitor.contains("plan_cg"));
    assert!(!monitor.contains("Corner cases"));
}

#[test]
fn no_test_plan_uses_template_defaults() {
    let ws = apb_workspace();
    let run = ws.run(&apb_memory_config().build()).unwrap();

    assert!(!run.read("vip/apb/apb_seq_item.sv").unwrap().contains("plan_c"));
    assert!(!run.read("vip/apb/apb_monitor.sv").unwrap().contains("plan_cg"));
    assert!(!run.read("tb/apb_test.sv").unwrap().contains("// Test plan"));
    assert!(run
        .read("vip/apb/apb_base_seq.sv")
        .unwrap()
        .contains("num_transfers = 16;"));
}

// ---------------------------------------------------------------------------
// Multiple protocols
// ---------------------------------------------------------------------------

#[test]
fn mixed_protocols_render_each_component_tree() {
    let ws = apb_workspace();
    let yaml = apb_memory_config()
        .interface("axi_if0", "axi", "master", &[("awaddr", "awaddr")])
        .build();
    let run = ws.run(&yaml).unwrap();

    assert!(run.exists("vip/apb/apb_if.sv"));
    assert!(run.exists("vip/axi/axi_if.sv"));
    assert!(run.exists("vip/axi/axi_driver.sv"));

    let top = run.read("tb/top.sv").unwrap();
    assert!(top.contains("import apb_pkg::*;\n  import axi_pkg::*;"));
    assert!(top.contains("axi_if axi_if0 (.aclk(clk), .aresetn(rst_n));"));

    let env = run.read("tb/tb_env.sv").unwrap();
    assert!(env.contains("apb_agent apb_if0_agent;"));
    assert!(env.contains("axi_agent axi_if0_agent;"));

    // The first interface selects the test.
    assert!(run.exists("tb/apb_test.sv"));
    assert!(!run.exists("tb/axi_test.sv"));

    let script = run.read("sim/run.tcl").unwrap();
    assert!(script.contains("-i ../vip/apb -i ../vip/axi"));
}

#[test]
fn ahb_primary_interface_selects_ahb_test() {
    let ws = Workspace::with_installed_templates().unwrap();
    ws.write(
        "rtl/ahb_mem.v",
        "module ahb_mem(input hclk, input [15:0] haddr, output [31:0] hrdata);\nendmodule\n",
    )
    .unwrap();
    let yaml = tbgen_conformance::ConfigBuilder::new("ahb_tb", "ahb_mem")
        .source("rtl/ahb_mem.v")
        .interface(
            "ahb_if0",
            "ahb",
            "slave",
            &[("hclk", "hclk"), ("haddr", "haddr"), ("hrdata", "hrdata")],
        )
        .build();
    let run = ws.run(&yaml).unwrap();

    assert!(run.report.is_complete(), "issues: {:?}", run.report.issues);
    assert!(run.read("tb/top.sv").unwrap().contains("run_test(\"ahb_test\");"));
    assert!(run.read("vip/ahb/ahb_if.sv").unwrap().contains("logic [15:0] haddr;"));
    assert!(run.read("sim/wrapper.c").unwrap().contains("\"ahb_model\""));
}
