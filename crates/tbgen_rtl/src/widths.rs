//! Port declaration scanning and address/data width inference.

use crate::sources::DutSources;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::OnceLock;
use tbgen_diagnostics::DiagnosticSink;

/// Port name fragments that mark an address bus.
const ADDR_KEYWORDS: [&str; 5] = ["addr", "paddr", "haddr", "awaddr", "araddr"];
/// Port name fragments that mark a data bus.
const DATA_KEYWORDS: [&str; 7] = ["data", "wdata", "rdata", "pwdata", "prdata", "hwdata", "hrdata"];

/// `direction [storage] [N:0] name`, e.g. `input wire [31:0] paddr`.
fn port_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\b(input|output|inout)\s+(?:(?:wire|reg|logic)\b\s*)?\[\s*(\d+)\s*:\s*0\s*\]\s*([A-Za-z_]\w*)")
            .unwrap_or_else(|e| unreachable!("port pattern is a valid regex: {e}"))
    })
}

/// A ranged port declaration found in DUT source text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortDecl {
    /// The port identifier as written.
    pub name: String,
    /// Bit width, `msb + 1`.
    pub width: u32,
}

/// Scans source text for ranged port declarations, in textual order.
///
/// Declarations whose range is not a plain `[N:0]` (e.g. `[ADDR_WIDTH-1:0]`)
/// are skipped, as are ranges too large to represent.
pub fn scan_ports(text: &str) -> Vec<PortDecl> {
    port_pattern()
        .captures_iter(text)
        .filter_map(|caps| {
            let msb: u32 = caps[2].parse().ok()?;
            Some(PortDecl {
                name: caps[3].to_string(),
                width: msb.checked_add(1)?,
            })
        })
        .collect()
}

/// Address and data bus widths inferred from DUT sources.
///
/// Each width is present only if a qualifying port declaration was found.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InferredWidths {
    /// Width of the first address-like port.
    pub addr_width: Option<u32>,
    /// Width of the first data-like port.
    pub data_width: Option<u32>,
}

impl InferredWidths {
    /// Applies a port declaration; only widths not already known are set.
    ///
    /// The address and data checks are independent, so a name containing
    /// both keyword sets (e.g. `addr_data`) sets both widths.
    pub fn observe(&mut self, port: &PortDecl) {
        let lower = port.name.to_ascii_lowercase();
        if self.addr_width.is_none() && ADDR_KEYWORDS.iter().any(|k| lower.contains(k)) {
            log::debug!("inferred ADDR_WIDTH={} from port '{}'", port.width, port.name);
            self.addr_width = Some(port.width);
        }
        if self.data_width.is_none() && DATA_KEYWORDS.iter().any(|k| lower.contains(k)) {
            log::debug!("inferred DATA_WIDTH={} from port '{}'", port.width, port.name);
            self.data_width = Some(port.width);
        }
    }

    /// Fills widths that are still unknown from `other`; known widths are kept.
    pub fn merge(&mut self, other: InferredWidths) {
        self.addr_width = self.addr_width.or(other.addr_width);
        self.data_width = self.data_width.or(other.data_width);
    }

    /// Whether both widths are known.
    pub fn is_complete(&self) -> bool {
        self.addr_width.is_some() && self.data_width.is_some()
    }

    /// The widths as a parameter mapping with at most `ADDR_WIDTH` and `DATA_WIDTH`.
    pub fn to_parameters(&self) -> BTreeMap<String, i64> {
        let mut params = BTreeMap::new();
        if let Some(w) = self.addr_width {
            params.insert("ADDR_WIDTH".to_string(), i64::from(w));
        }
        if let Some(w) = self.data_width {
            params.insert("DATA_WIDTH".to_string(), i64::from(w));
        }
        params
    }
}

/// Infers widths from a single source text; the first qualifying port wins.
pub fn infer_widths_from_source(text: &str) -> InferredWidths {
    let mut widths = InferredWidths::default();
    for port in scan_ports(text) {
        widths.observe(&port);
        if widths.is_complete() {
            break;
        }
    }
    widths
}

/// Infers widths from source files in order; earlier files win.
///
/// Unreadable files contribute nothing and are reported to `sink`.
pub fn infer_widths(paths: &[PathBuf], sink: &DiagnosticSink) -> InferredWidths {
    DutSources::load(paths, sink).infer_widths()
}
