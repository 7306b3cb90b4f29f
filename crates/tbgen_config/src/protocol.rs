//! Supported bus protocols and interface roles.
//!
//! Every protocol-dependent name used by the generator (clock and reset
//! signals, component template directory, package, agent, test, and runtime
//! model names) is derived here from a single [`Protocol`] variant, so each
//! new protocol must supply its full record.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// A bus protocol with a reusable verification component set.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// AMBA APB.
    Apb,
    /// AMBA AXI.
    Axi,
    /// AMBA AHB.
    Ahb,
}

impl Protocol {
    /// All supported protocols.
    pub const ALL: [Protocol; 3] = [Protocol::Apb, Protocol::Axi, Protocol::Ahb];

    /// The lowercase tag used in documents, directory names, and derived names.
    pub fn tag(self) -> &'static str {
        match self {
            Protocol::Apb => "apb",
            Protocol::Axi => "axi",
            Protocol::Ahb => "ahb",
        }
    }

    /// Canonical clock signal name.
    pub fn clock_signal(self) -> &'static str {
        match self {
            Protocol::Apb => "pclk",
            Protocol::Axi => "aclk",
            Protocol::Ahb => "hclk",
        }
    }

    /// Canonical active-low reset signal name.
    pub fn reset_signal(self) -> &'static str {
        match self {
            Protocol::Apb => "presetn",
            Protocol::Axi => "aresetn",
            Protocol::Ahb => "hresetn",
        }
    }

    /// Directory of the reusable-component tree, relative to the template root.
    pub fn template_dir(self) -> PathBuf {
        PathBuf::from("vip").join(self.tag())
    }

    /// Name of the protocol's verification package (e.g. `apb_pkg`).
    pub fn package_name(self) -> String {
        format!("{}_pkg", self.tag())
    }

    /// Name of the protocol's SystemVerilog interface type (e.g. `apb_if`).
    pub fn interface_type(self) -> String {
        format!("{}_if", self.tag())
    }

    /// Name of the protocol's agent class (e.g. `apb_agent`).
    pub fn agent_type(self) -> String {
        format!("{}_agent", self.tag())
    }

    /// Name of the default test class (e.g. `apb_test`).
    pub fn test_name(self) -> String {
        format!("{}_test", self.tag())
    }

    /// Module name of the runtime memory model loaded by the wrapper.
    pub fn model_module(self) -> String {
        format!("{}_model", self.tag())
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Error returned when a protocol tag names no supported protocol.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown protocol tag '{0}' (expected one of: apb, axi, ahb)")]
pub struct UnknownProtocol(pub String);

impl FromStr for Protocol {
    type Err = UnknownProtocol;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        Protocol::ALL
            .into_iter()
            .find(|p| p.tag().eq_ignore_ascii_case(tag))
            .ok_or_else(|| UnknownProtocol(tag.to_string()))
    }
}

/// Which side of the bus the verification environment drives.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The environment drives requests into the DUT.
    Master,
    /// The environment responds to requests from the DUT.
    #[default]
    Slave,
}

impl Role {
    /// The lowercase name used in documents and templates.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Master => "master",
            Role::Slave => "slave",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "master" => Ok(Role::Master),
            "slave" => Ok(Role::Slave),
            other => Err(format!("invalid interface type '{other}' (expected master or slave)")),
        }
    }
}
