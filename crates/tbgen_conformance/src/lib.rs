//! Conformance harness for the tbgen pipeline.
//!
//! A [`Workspace`] is a throwaway project directory holding a template set,
//! the protocol signal catalog, DUT sources and generated output. Tests drive
//! the same load, validate, generate sequence the CLI runs and then inspect
//! the files left on disk.

#![warn(missing_docs)]

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tbgen_config::{
    load_config_from_str, CatalogError, ConfigError, Configuration, DocumentFormat,
    ProtocolCatalog, Validator,
};
use tbgen_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};
use tbgen_generate::{GenerateError, GenerationReport};
use tempfile::TempDir;
use walkdir::WalkDir;

/// Catalog file name inside a template set.
pub const CATALOG_FILE: &str = "protocol_signals.yaml";

/// An APB memory whose address and data ports are 32 bits wide.
pub const APB_MEMORY: &str = "\
module apb_mem #(parameter DEPTH = 256) (
  input  wire        pclk,
  input  wire        presetn,
  input  wire [31:0] paddr,
  input  wire        psel,
  input  wire        penable,
  input  wire        pwrite,
  input  wire [31:0] pwdata,
  output reg         pready,
  output reg  [31:0] prdata,
  output wire        pslverr
);
  reg [31:0] mem [0:DEPTH-1];
  assign pslverr = 1'b0;
  always @(posedge pclk) begin
    pready <= psel & ~penable;
    if (psel & ~penable & pwrite) mem[paddr[9:2]] <= pwdata;
    if (psel & ~penable & ~pwrite) prdata <= mem[paddr[9:2]];
  end
endmodule
";

/// APB signals bound to DUT ports of the same name.
pub const APB_IDENTITY_MAP: &[(&str, &str)] = &[
    ("pclk", "pclk"),
    ("presetn", "presetn"),
    ("paddr", "paddr"),
    ("psel", "psel"),
    ("penable", "penable"),
    ("pwrite", "pwrite"),
    ("pwdata", "pwdata"),
    ("pready", "pready"),
    ("prdata", "prdata"),
    ("pslverr", "pslverr"),
];

/// Path to the template set shipped with the repository.
pub fn installed_templates() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../templates")
}

/// Failure of a run before any generation report exists.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The catalog could not be read.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// Loading or validating the configuration failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The output directory could not be created.
    #[error(transparent)]
    Generate(#[from] GenerateError),
}

/// Outcome of one complete generation run.
pub struct GenerationRun {
    /// The validated configuration.
    pub config: Configuration,
    /// Files written and per-artifact issues.
    pub report: GenerationReport,
    /// Every diagnostic emitted during generation.
    pub diagnostics: Vec<Diagnostic>,
}

impl GenerationRun {
    /// The resolved output directory.
    pub fn output_root(&self) -> PathBuf {
        self.config.output_root()
    }

    /// Reads a generated file by its path relative to the output directory.
    pub fn read(&self, relative: &str) -> io::Result<String> {
        fs::read_to_string(self.output_root().join(relative))
    }

    /// Whether a generated file exists.
    pub fn exists(&self, relative: &str) -> bool {
        self.output_root().join(relative).is_file()
    }

    /// Diagnostics carrying `code`.
    pub fn diagnostics_with(&self, code: DiagnosticCode) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.code == code).collect()
    }

    /// Every file under the output directory, keyed by relative path.
    pub fn snapshot(&self) -> io::Result<BTreeMap<PathBuf, Vec<u8>>> {
        snapshot_dir(&self.output_root())
    }
}

/// Reads every file under `root`, keyed by its path relative to `root`.
pub fn snapshot_dir(root: &Path) -> io::Result<BTreeMap<PathBuf, Vec<u8>>> {
    let mut files = BTreeMap::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(io::Error::other)?;
        if entry.file_type().is_file() {
            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            files.insert(relative.to_path_buf(), fs::read(entry.path())?);
        }
    }
    Ok(files)
}

/// A temporary project directory.
///
/// Layout:
/// ```text
/// <root>/templates/   template set and protocol_signals.yaml
/// <root>/rtl/         DUT sources (by convention)
/// <root>/out/         generated testbench
/// ```
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Creates a workspace with an empty template set.
    pub fn new() -> io::Result<Self> {
        let dir = TempDir::new()?;
        fs::create_dir_all(dir.path().join("templates"))?;
        Ok(Self { dir })
    }

    /// Creates a workspace holding a copy of the installed template set.
    pub fn with_installed_templates() -> io::Result<Self> {
        let workspace = Self::new()?;
        let source = installed_templates();
        for entry in WalkDir::new(&source).min_depth(1) {
            let entry = entry.map_err(io::Error::other)?;
            let relative = entry.path().strip_prefix(&source).unwrap_or(entry.path());
            let target = workspace.templates().join(relative);
            if entry.file_type().is_dir() {
                fs::create_dir_all(&target)?;
            } else {
                fs::copy(entry.path(), &target)?;
            }
        }
        Ok(workspace)
    }

    /// Creates a workspace whose template set only contains `protocol`'s
    /// interface file, rendering `"{{ ADDR_WIDTH }} {{ DATA_WIDTH }}"`.
    ///
    /// Used to observe resolved widths without the full template set.
    pub fn with_width_template(protocol: &str, signals: &[&str]) -> io::Result<Self> {
        let workspace = Self::new()?;
        workspace.write_template(
            &format!("vip/{protocol}/{protocol}_if.sv"),
            "{{ ADDR_WIDTH }} {{ DATA_WIDTH }}",
        )?;
        workspace.write_template(
            CATALOG_FILE,
            &format!("{protocol}: [{}]\n", signals.join(", ")),
        )?;
        Ok(workspace)
    }

    /// The workspace root.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// The template set directory.
    pub fn templates(&self) -> PathBuf {
        self.root().join("templates")
    }

    /// The default output directory used by [`ConfigBuilder`].
    pub fn output(&self) -> PathBuf {
        self.root().join("out")
    }

    /// Writes a file relative to the workspace root, creating parents.
    pub fn write(&self, relative: &str, contents: &str) -> io::Result<PathBuf> {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Writes a template relative to the template set.
    pub fn write_template(&self, relative: &str, contents: &str) -> io::Result<PathBuf> {
        self.write(&format!("templates/{relative}"), contents)
    }

    /// Deletes a template file or a whole template directory.
    pub fn remove_template(&self, relative: &str) -> io::Result<()> {
        let path = self.templates().join(relative);
        if path.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        }
    }

    /// Loads the workspace's protocol signal catalog.
    pub fn catalog(&self) -> Result<ProtocolCatalog, CatalogError> {
        ProtocolCatalog::load(&self.templates().join(CATALOG_FILE))
    }

    /// Loads and validates a YAML configuration document.
    ///
    /// Relative paths in the document resolve against the workspace root.
    pub fn validate(&self, yaml: &str) -> Result<Configuration, RunError> {
        let catalog = self.catalog()?;
        let templates = self.templates();
        let validator = Validator::new(&templates, &catalog).with_base_dir(self.root());
        Ok(load_config_from_str(yaml, DocumentFormat::Yaml, &validator)?)
    }

    /// Validates `yaml` and runs generation.
    pub fn run(&self, yaml: &str) -> Result<GenerationRun, RunError> {
        let config = self.validate(yaml)?;
        let catalog = self.catalog()?;
        let sink = DiagnosticSink::new();
        let report = tbgen_generate::generate(&config, &self.templates(), &catalog, &sink)?;
        Ok(GenerationRun {
            config,
            report,
            diagnostics: sink.take_all(),
        })
    }
}

struct InterfaceSpec {
    name: String,
    protocol: String,
    role: String,
    port_map: Vec<(String, String)>,
}

/// Builds YAML configuration documents for tests.
///
/// The output directory is always `out`, relative to the workspace root.
/// Source files are only emitted when at least one was added, so a builder
/// without sources produces a document lacking `dut.source_files`.
pub struct ConfigBuilder {
    project_name: String,
    module_name: String,
    sources: Vec<String>,
    parameters: Vec<(String, i64)>,
    interfaces: Vec<InterfaceSpec>,
    test_plan: Option<Value>,
}

impl ConfigBuilder {
    /// Starts a document for `module_name`.
    pub fn new(project_name: &str, module_name: &str) -> Self {
        Self {
            project_name: project_name.to_string(),
            module_name: module_name.to_string(),
            sources: Vec::new(),
            parameters: Vec::new(),
            interfaces: Vec::new(),
            test_plan: None,
        }
    }

    /// Adds a DUT source file path.
    pub fn source(mut self, path: &str) -> Self {
        self.sources.push(path.to_string());
        self
    }

    /// Adds an explicit DUT parameter.
    pub fn parameter(mut self, name: &str, value: i64) -> Self {
        self.parameters.push((name.to_string(), value));
        self
    }

    /// Adds an interface with an explicit role.
    pub fn interface(
        mut self,
        name: &str,
        protocol: &str,
        role: &str,
        port_map: &[(&str, &str)],
    ) -> Self {
        self.interfaces.push(InterfaceSpec {
            name: name.to_string(),
            protocol: protocol.to_string(),
            role: role.to_string(),
            port_map: port_map
                .iter()
                .map(|(port, signal)| (port.to_string(), signal.to_string()))
                .collect(),
        });
        self
    }

    /// Attaches a test plan, emitted as a JSON flow mapping.
    pub fn test_plan(mut self, plan: Value) -> Self {
        self.test_plan = Some(plan);
        self
    }

    /// Renders the document.
    pub fn build(&self) -> String {
        let mut doc = String::new();
        let _ = writeln!(doc, "project_name: '{}'", self.project_name);
        let _ = writeln!(doc, "output_dir: out");
        let _ = writeln!(doc, "dut:");
        let _ = writeln!(doc, "  module_name: '{}'", self.module_name);
        if !self.sources.is_empty() {
            let _ = writeln!(doc, "  source_files:");
            for source in &self.sources {
                let _ = writeln!(doc, "    - '{source}'");
            }
        }
        if !self.parameters.is_empty() {
            let _ = writeln!(doc, "  parameters:");
            for (name, value) in &self.parameters {
                let _ = writeln!(doc, "    {name}: {value}");
            }
        }
        let _ = writeln!(doc, "interfaces:");
        for intf in &self.interfaces {
            let _ = writeln!(doc, "  - name: '{}'", intf.name);
            let _ = writeln!(doc, "    protocol: '{}'", intf.protocol);
            let _ = writeln!(doc, "    type: '{}'", intf.role);
            if intf.port_map.is_empty() {
                let _ = writeln!(doc, "    port_map: {{}}");
            } else {
                let _ = writeln!(doc, "    port_map:");
                for (port, signal) in &intf.port_map {
                    let _ = writeln!(doc, "      {port}: '{signal}'");
                }
            }
        }
        if let Some(plan) = &self.test_plan {
            let _ = writeln!(doc, "test_plan: {plan}");
        }
        doc
    }
}

/// A single APB slave interface over [`APB_MEMORY`] at `rtl/apb_mem.v`.
pub fn apb_memory_config() -> ConfigBuilder {
    ConfigBuilder::new("apb_mem_tb", "apb_mem")
        .source("rtl/apb_mem.v")
        .interface("apb_if0", "apb", "slave", APB_IDENTITY_MAP)
}
