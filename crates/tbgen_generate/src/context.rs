//! Render contexts for each artifact.
//!
//! Every context starts from the same shared fields (project name, bus widths,
//! primary test and package names, test plan) so that files rendered
//! independently still agree on the names they reference. Artifact-specific
//! fields are layered on top.

use serde_json::{json, Map, Value};
use tbgen_config::resolve::{ADDR_WIDTH, DATA_WIDTH};
use tbgen_config::{Configuration, Protocol, ResolvedParameters};

use crate::artifact::ArtifactKind;
use crate::layout::{sim_relative_path, OutputLayout};
use crate::port_map::ResolvedPortMap;

/// Name of the generated testbench package.
pub const PACKAGE_NAME: &str = "tb_pkg";
/// Name of the generated top-level module.
pub const TOP_MODULE: &str = "top";

/// Builds render contexts from one resolved configuration.
pub struct ContextBuilder<'a> {
    config: &'a Configuration,
    primary: Protocol,
    params: &'a ResolvedParameters,
    port_maps: &'a [ResolvedPortMap],
    layout: &'a OutputLayout,
    shared: Map<String, Value>,
}

impl<'a> ContextBuilder<'a> {
    /// Creates a builder, computing the shared fields once.
    ///
    /// `primary` names the default test, package and simulation model.
    pub fn new(
        config: &'a Configuration,
        primary: Protocol,
        params: &'a ResolvedParameters,
        port_maps: &'a [ResolvedPortMap],
        layout: &'a OutputLayout,
    ) -> Self {
        let mut shared = Map::new();
        shared.insert("project_name".into(), json!(config.project_name));
        shared.insert("addr_width".into(), json!(params.addr_width()));
        shared.insert("data_width".into(), json!(params.data_width()));
        shared.insert("test_name".into(), json!(primary.test_name()));
        shared.insert("package_name".into(), json!(PACKAGE_NAME));
        shared.insert("primary_protocol".into(), json!(primary.tag()));
        if let Some(plan) = &config.test_plan {
            shared.insert("test_plan".into(), plan.clone());
        }

        Self {
            config,
            primary,
            params,
            port_maps,
            layout,
            shared,
        }
    }

    /// The fields common to every context.
    pub fn shared(&self) -> Value {
        Value::Object(self.shared.clone())
    }

    /// The context for one artifact.
    pub fn artifact(&self, kind: ArtifactKind) -> Value {
        let specific = match kind {
            ArtifactKind::Top => self.top(),
            ArtifactKind::Env => self.env(),
            ArtifactKind::Package => self.package(),
            ArtifactKind::Test => self.test(),
            ArtifactKind::SimScript => self.sim_script(),
            ArtifactKind::Wrapper => self.wrapper(),
        };
        self.layered(specific)
    }

    /// The context applied to every file of `protocol`'s component tree.
    ///
    /// Carries every resolved DUT parameter by name, plus the protocol's
    /// clock and reset signal names.
    pub fn component(&self, protocol: Protocol) -> Value {
        let mut specific = Map::new();
        for (name, value) in self.params.iter() {
            specific.insert(name.to_string(), json!(value));
        }
        specific.insert(ADDR_WIDTH.into(), json!(self.params.addr_width()));
        specific.insert(DATA_WIDTH.into(), json!(self.params.data_width()));
        specific.insert("protocol".into(), json!(protocol.tag()));
        specific.insert("clock_name".into(), json!(protocol.clock_signal()));
        specific.insert("reset_name".into(), json!(protocol.reset_signal()));
        self.layered(specific)
    }

    fn layered(&self, specific: Map<String, Value>) -> Value {
        let mut merged = self.shared.clone();
        merged.extend(specific);
        Value::Object(merged)
    }

    fn vip_packages(&self) -> Value {
        self.config
            .protocols()
            .into_iter()
            .map(|p| Value::String(p.package_name()))
            .collect()
    }

    fn top(&self) -> Map<String, Value> {
        let interfaces: Vec<Value> = self
            .config
            .interfaces
            .iter()
            .map(|intf| {
                json!({
                    "type": intf.protocol.interface_type(),
                    "name": intf.name,
                    "protocol": intf.protocol.tag(),
                    "role": intf.role.as_str(),
                    "clock": intf.protocol.clock_signal(),
                    "reset": intf.protocol.reset_signal(),
                })
            })
            .collect();

        let port_maps: Vec<Value> = self
            .port_maps
            .iter()
            .flat_map(|map| {
                map.bindings.iter().map(move |binding| {
                    json!({
                        "dut_port": binding.dut_port,
                        "intf_sig": format!("{}.{}", map.interface, binding.signal),
                        "interface": map.interface,
                        "signal": binding.signal,
                    })
                })
            })
            .collect();

        let dut_parameters: Map<String, Value> = self
            .config
            .dut
            .instance_parameters
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        let mut ctx = Map::new();
        ctx.insert("vip_packages".into(), self.vip_packages());
        ctx.insert("interfaces".into(), Value::Array(interfaces));
        ctx.insert("dut_name".into(), json!(self.config.dut.module_name));
        ctx.insert("dut_parameters".into(), Value::Object(dut_parameters));
        ctx.insert(
            "default_test".into(),
            json!(self.primary.test_name()),
        );
        ctx.insert("port_maps".into(), Value::Array(port_maps));
        ctx
    }

    fn env(&self) -> Map<String, Value> {
        let interfaces: Vec<Value> = self
            .config
            .interfaces
            .iter()
            .map(|intf| {
                json!({
                    "name": intf.name,
                    "agent_type": intf.protocol.agent_type(),
                    "protocol": intf.protocol.tag(),
                    "role": intf.role.as_str(),
                })
            })
            .collect();

        let mut ctx = Map::new();
        ctx.insert("interfaces".into(), Value::Array(interfaces));
        ctx
    }

    fn package(&self) -> Map<String, Value> {
        let mut ctx = Map::new();
        ctx.insert("vip_packages".into(), self.vip_packages());
        ctx
    }

    fn test(&self) -> Map<String, Value> {
        let interfaces: Vec<Value> = self
            .config
            .interfaces
            .iter()
            .map(|intf| json!({ "name": intf.name, "protocol": intf.protocol.tag() }))
            .collect();

        let mut ctx = Map::new();
        ctx.insert("interfaces".into(), Value::Array(interfaces));
        ctx
    }

    fn sim_script(&self) -> Map<String, Value> {
        let primary = self.primary;
        let protocols = self.config.protocols();
        let sim_dir = self.layout.sim_dir();

        let dut_files: Vec<String> = self
            .config
            .source_paths()
            .iter()
            .map(|src| sim_relative_path(src, &sim_dir))
            .collect();

        let vip_files: Vec<String> = protocols
            .iter()
            .flat_map(|p| {
                [
                    format!("../vip/{}/{}.sv", p.tag(), p.package_name()),
                    format!("../vip/{}/{}.sv", p.tag(), p.interface_type()),
                ]
            })
            .collect();

        let include_flags: Vec<String> = protocols
            .iter()
            .map(|p| format!("-i ../vip/{}", p.tag()))
            .collect();

        let sim = &self.config.simulation;
        let mut ctx = Map::new();
        ctx.insert("dut_files".into(), json!(dut_files.join(" ")));
        ctx.insert("vip_files".into(), json!(vip_files.join(" ")));
        ctx.insert(
            "tb_files".into(),
            json!(format!("../tb/{PACKAGE_NAME}.sv ../tb/{TOP_MODULE}.sv")),
        );
        ctx.insert("vip_include_flags".into(), json!(include_flags.join(" ")));
        ctx.insert("protocol".into(), json!(primary.tag()));
        ctx.insert(
            "model_file".into(),
            json!(format!("{}.py", primary.model_module())),
        );
        ctx.insert("model_module_name".into(), json!(primary.model_module()));
        ctx.insert("python_include".into(), json!(sim.python_include));
        ctx.insert("python_lib_dir".into(), json!(sim.python_lib_dir));
        ctx.insert("python_lib_name".into(), json!(sim.python_lib_name));
        ctx.insert("top_module".into(), json!(TOP_MODULE));
        ctx
    }

    fn wrapper(&self) -> Map<String, Value> {
        let mut ctx = Map::new();
        ctx.insert(
            "model_module_name".into(),
            json!(self.primary.model_module()),
        );
        ctx
    }
}
