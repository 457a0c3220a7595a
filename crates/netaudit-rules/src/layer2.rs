//! Switching protections.
//!
//! The global feature checks (ARP inspection, port security, 802.1X, DHCP
//! snooping) apply to any capture that describes ports or VLANs. Without
//! such facts they are not applicable; with them, a missing directive is a
//! finding.

use std::collections::BTreeSet;

use netaudit_core::facts::Interface;
use netaudit_core::utils::format_vlan_list;
use netaudit_core::{canonical_interface_name, Assessment, Document, Rule, RuleError};

const NO_SWITCHING: &str = "no interface or VLAN facts in capture";

fn active_access_ports(doc: &Document) -> impl Iterator<Item = &Interface> {
    doc.interfaces
        .values()
        .filter(|i| i.is_access() && !i.is_administratively_shutdown)
}

/// Requires dynamic ARP inspection on at least one VLAN.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArpInspection;

impl Rule for ArpInspection {
    rule_identity!(
        "NA321",
        "arp-inspection",
        Layer2,
        "Dynamic ARP inspection is enabled"
    );

    fn is_applicable(&self, doc: &Document) -> bool {
        doc.has_switching_facts()
    }

    fn not_applicable_reason(&self) -> &'static str {
        NO_SWITCHING
    }

    fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError> {
        let l2 = &doc.layer2;
        let assessment = if l2.arp_inspection_vlans.is_empty() {
            Assessment::non_compliant().with_evidence("no ip arp inspection vlan directive")
        } else {
            Assessment::compliant().with_evidence(format!(
                "ip arp inspection vlan {}",
                format_vlan_list(&l2.arp_inspection_vlans)
            ))
        };
        Ok(assessment
            .with_evidence_lines(l2.source_bindings.iter().map(|b| {
                format!("ip source binding {} vlan {} {}", b.mac, b.vlan, b.ip)
            }))
            .with_detail("static_bindings", l2.source_bindings.len()))
    }
}

/// Requires `switchport port-security` on at least one port.
#[derive(Debug, Clone, Copy, Default)]
pub struct PortSecurity;

impl Rule for PortSecurity {
    rule_identity!(
        "NA322",
        "port-security",
        Layer2,
        "Port security is configured on switch ports"
    );

    fn is_applicable(&self, doc: &Document) -> bool {
        doc.has_switching_facts()
    }

    fn not_applicable_reason(&self) -> &'static str {
        NO_SWITCHING
    }

    fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError> {
        let secured: Vec<String> = doc
            .interfaces
            .values()
            .filter(|i| i.port_security)
            .map(|i| format!("{}: switchport port-security", i.name))
            .collect();
        Ok(if secured.is_empty() {
            Assessment::non_compliant().with_evidence("no port has switchport port-security")
        } else {
            Assessment::compliant()
                .with_detail("secured_ports", secured.len())
                .with_evidence_lines(secured)
        })
    }
}

/// Requires `dot1x system-auth-control`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dot1x;

impl Rule for Dot1x {
    rule_identity!("NA323", "dot1x", Layer2, "802.1X port authentication is enabled");

    fn is_applicable(&self, doc: &Document) -> bool {
        doc.has_switching_facts()
    }

    fn not_applicable_reason(&self) -> &'static str {
        NO_SWITCHING
    }

    fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError> {
        let ports = doc.interfaces.values().filter(|i| i.dot1x_port_control).count();
        let assessment = if doc.layer2.dot1x_system_auth_control {
            Assessment::compliant().with_evidence("dot1x system-auth-control")
        } else {
            Assessment::non_compliant().with_evidence("no dot1x system-auth-control directive")
        };
        Ok(assessment.with_detail("port_control_auto", ports))
    }
}

/// Requires BPDU guard on every PortFast port.
///
/// A port is covered by its own `spanning-tree bpduguard enable` or by the
/// global default, unless it disables BPDU guard explicitly.
#[derive(Debug, Clone, Copy, Default)]
pub struct BpduGuard;

impl BpduGuard {
    fn portfast_ports(doc: &Document) -> impl Iterator<Item = &Interface> {
        let default = doc.layer2.portfast_default;
        doc.interfaces
            .values()
            .filter(move |i| i.portfast || (default && i.is_access()))
    }
}

impl Rule for BpduGuard {
    rule_identity!("NA324", "bpdu-guard", Layer2, "PortFast ports have BPDU guard");

    fn is_applicable(&self, doc: &Document) -> bool {
        Self::portfast_ports(doc).next().is_some()
    }

    fn not_applicable_reason(&self) -> &'static str {
        "no PortFast ports"
    }

    fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError> {
        let global = doc.layer2.bpduguard_default;
        let unguarded: Vec<String> = Self::portfast_ports(doc)
            .filter(|i| !i.bpduguard.unwrap_or(global))
            .map(|i| format!("{}: PortFast without BPDU guard", i.name))
            .collect();

        let assessment = if unguarded.is_empty() {
            let source = if global {
                "spanning-tree portfast bpduguard default"
            } else {
                "spanning-tree bpduguard enable on every PortFast port"
            };
            Assessment::compliant().with_evidence(source)
        } else {
            Assessment::non_compliant()
                .with_detail("unguarded_ports", unguarded.len())
                .with_evidence_lines(unguarded)
        };
        Ok(assessment.with_detail("global_default", global))
    }
}

/// Requires `switchport protected` on active access ports.
#[derive(Debug, Clone, Copy, Default)]
pub struct PortIsolation;

impl Rule for PortIsolation {
    rule_identity!(
        "NA325",
        "port-isolation",
        Layer2,
        "Access ports are isolated from each other"
    );

    fn is_applicable(&self, doc: &Document) -> bool {
        active_access_ports(doc).next().is_some()
    }

    fn not_applicable_reason(&self) -> &'static str {
        "no active access ports"
    }

    fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError> {
        let (protected, open): (Vec<&Interface>, Vec<&Interface>) =
            active_access_ports(doc).partition(|i| i.protected);

        Ok(if open.is_empty() {
            Assessment::compliant().with_evidence(format!(
                "{} access port(s) with switchport protected",
                protected.len()
            ))
        } else {
            Assessment::non_compliant()
                .with_evidence_lines(
                    open.iter()
                        .map(|i| format!("{}: access port without switchport protected", i.name)),
                )
                .with_detail("unprotected_ports", open.len())
        }
        .with_detail("protected_ports", protected.len()))
    }
}

/// Requires DHCP snooping, from configuration or `show ip dhcp snooping`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DhcpSnooping;

impl Rule for DhcpSnooping {
    rule_identity!("NA330", "dhcp-snooping", Layer2, "DHCP snooping is enabled");

    fn is_applicable(&self, doc: &Document) -> bool {
        doc.has_switching_facts()
    }

    fn not_applicable_reason(&self) -> &'static str {
        NO_SWITCHING
    }

    fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError> {
        let l2 = &doc.layer2;
        if !l2.dhcp_snooping {
            return Ok(Assessment::non_compliant().with_evidence("DHCP snooping is not enabled"));
        }

        let trusted: Vec<String> = doc
            .interfaces
            .iter()
            .filter(|(_, i)| i.dhcp_snooping_trust)
            .map(|(key, _)| key)
            .chain(&l2.dhcp_trusted_ports)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(|key| canonical_interface_name(key))
            .collect();

        let mut assessment = Assessment::compliant().with_evidence("DHCP snooping is enabled");
        if !l2.dhcp_snooping_vlans.is_empty() {
            assessment = assessment.with_evidence(format!(
                "snooping VLANs: {}",
                format_vlan_list(&l2.dhcp_snooping_vlans)
            ));
        }
        if !trusted.is_empty() {
            assessment = assessment.with_evidence(format!("trusted ports: {}", trusted.join(", ")));
        }
        Ok(assessment.with_detail("trusted_ports", trusted))
    }
}
