//! Port-map resolution.
//!
//! The configured port map is authoritative and used as written. Resolution
//! only checks it: values outside the protocol's canonical signal list and
//! DUT ports that never appear in the DUT sources are reported as warnings,
//! since templates substitute them verbatim either way.

use tbgen_config::{Interface, ProtocolCatalog};
use tbgen_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};
use tbgen_rtl::DutSources;

/// One DUT port bound to an interface signal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortBinding {
    /// DUT port name as written in the DUT source.
    pub dut_port: String,
    /// Interface signal name.
    pub signal: String,
}

/// The final port map of one interface, in document order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedPortMap {
    /// Interface instance name.
    pub interface: String,
    /// Bindings in declaration order.
    pub bindings: Vec<PortBinding>,
}

/// Resolves the port map of `interface`, emitting warnings for suspicious entries.
///
/// DUT port names are checked only when at least one DUT source could be read.
pub fn resolve_port_map(
    interface: &Interface,
    catalog: &ProtocolCatalog,
    sources: &DutSources,
    sink: &DiagnosticSink,
) -> ResolvedPortMap {
    if interface.port_map.is_empty() {
        sink.emit(
            Diagnostic::warning(
                DiagnosticCode::EMPTY_PORT_MAP,
                format!(
                    "interface `{}` has an empty port map; no DUT ports will be connected",
                    interface.name
                ),
            )
            .with_help("add `port_map` entries of the form `<dut_port>: <signal>`"),
        );
    }

    let canonical = catalog.signals(interface.protocol).unwrap_or_default();
    let mut bindings = Vec::with_capacity(interface.port_map.len());

    for (dut_port, signal) in &interface.port_map {
        if !catalog.is_canonical(interface.protocol, signal) {
            log::warn!(
                "{}: `{signal}` is not a canonical {} signal",
                interface.name,
                interface.protocol
            );
            let mut diag = Diagnostic::warning(
                DiagnosticCode::NON_CANONICAL_SIGNAL,
                format!(
                    "interface `{}` maps `{dut_port}` to `{signal}`, which is not a canonical {} signal",
                    interface.name, interface.protocol
                ),
            );
            if !canonical.is_empty() {
                diag = diag.with_note(format!("canonical signals: {}", canonical.join(", ")));
            }
            sink.emit(diag);
        }

        if !sources.is_empty() && !sources.mentions(dut_port) {
            sink.emit(Diagnostic::warning(
                DiagnosticCode::PORT_NOT_IN_SOURCE,
                format!(
                    "DUT port `{dut_port}` mapped by interface `{}` does not appear in the DUT sources",
                    interface.name
                ),
            ));
        }

        bindings.push(PortBinding {
            dut_port: dut_port.clone(),
            signal: signal.clone(),
        });
    }

    ResolvedPortMap {
        interface: interface.name.clone(),
        bindings,
    }
}
