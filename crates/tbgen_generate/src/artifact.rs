//! The fixed set of per-project artifacts and where they come from and go.

use std::fmt;
use std::path::PathBuf;

use tbgen_config::Protocol;

use crate::layout::OutputLayout;

/// An artifact rendered once per run from its own template.
///
/// Protocol component trees are handled separately because they expand to
/// any number of files.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Top-level wiring module.
    Top,
    /// Verification environment.
    Env,
    /// Testbench package.
    Package,
    /// Protocol test stub for the primary protocol.
    Test,
    /// Simulation script.
    SimScript,
    /// Foreign-function wrapper for the runtime model.
    Wrapper,
}

impl ArtifactKind {
    /// Every artifact kind, in generation order.
    pub const ALL: [ArtifactKind; 6] = [
        ArtifactKind::Top,
        ArtifactKind::Env,
        ArtifactKind::Test,
        ArtifactKind::Package,
        ArtifactKind::SimScript,
        ArtifactKind::Wrapper,
    ];

    /// Short name used in reports and diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            ArtifactKind::Top => "top",
            ArtifactKind::Env => "env",
            ArtifactKind::Package => "package",
            ArtifactKind::Test => "test",
            ArtifactKind::SimScript => "sim_script",
            ArtifactKind::Wrapper => "wrapper",
        }
    }

    /// Template path relative to the template root.
    pub fn template_path(self, primary: Protocol) -> PathBuf {
        match self {
            ArtifactKind::Top => PathBuf::from("tb/top.sv"),
            ArtifactKind::Env => PathBuf::from("tb/tb_env.sv"),
            ArtifactKind::Package => PathBuf::from("tb/tb_pkg.sv"),
            ArtifactKind::Test => PathBuf::from("test").join(format!("{}.sv", primary.test_name())),
            ArtifactKind::SimScript => PathBuf::from("sim/run.tcl"),
            ArtifactKind::Wrapper => PathBuf::from("dpi/wrapper.c"),
        }
    }

    /// Output path within `layout`.
    pub fn destination(self, layout: &OutputLayout, primary: Protocol) -> PathBuf {
        match self {
            ArtifactKind::Top => layout.tb_dir().join("top.sv"),
            ArtifactKind::Env => layout.tb_dir().join("tb_env.sv"),
            ArtifactKind::Package => layout.tb_dir().join("tb_pkg.sv"),
            ArtifactKind::Test => layout.tb_dir().join(format!("{}.sv", primary.test_name())),
            ArtifactKind::SimScript => layout.sim_dir().join("run.tcl"),
            ArtifactKind::Wrapper => layout.sim_dir().join("wrapper.c"),
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
