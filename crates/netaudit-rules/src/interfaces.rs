//! Port state and VLAN usage.

use netaudit_core::facts::Interface;
use netaudit_core::utils::format_vlan_list;
use netaudit_core::{Assessment, Document, Rule, RuleError, Severity};

/// Requires ports that are down to be administratively shut down.
///
/// Needs `show ip interface brief`. A port reported `down` (not
/// `administratively down`) passes only when its configuration carries
/// `shutdown`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnusedPortsShutdown;

impl Rule for UnusedPortsShutdown {
    rule_identity!(
        "NA210",
        "unused-ports-shutdown",
        Interfaces,
        "Unused ports are administratively shut down"
    );

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn is_applicable(&self, doc: &Document) -> bool {
        !doc.interface_status.is_empty()
    }

    fn not_applicable_reason(&self) -> &'static str {
        "no show ip interface brief output in capture"
    }

    fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError> {
        let unused: Vec<String> = doc
            .interface_status
            .values()
            .filter(|row| row.is_down_not_shutdown())
            .filter(|row| {
                !doc.interface(&row.interface)
                    .is_some_and(|i| i.is_administratively_shutdown)
            })
            .map(|row| format!("{}: {} / {}", row.interface, row.status, row.protocol))
            .collect();

        let ports = doc.interface_status.len();
        Ok(if unused.is_empty() {
            Assessment::compliant()
                .with_evidence(format!("{ports} port(s) checked, none down without shutdown"))
        } else {
            Assessment::non_compliant()
                .with_detail("unused_ports", unused.len())
                .with_evidence_lines(unused)
        }
        .with_detail("ports_checked", ports))
    }
}

/// Forbids VLAN 1 as access VLAN, native VLAN or allowed trunk VLAN.
///
/// An access port without `switchport access vlan` and a trunk without
/// `switchport trunk native vlan` both use VLAN 1. A trunk without an
/// allowed list carries every VLAN.
#[derive(Debug, Clone, Copy, Default)]
pub struct Vlan1OnPorts;

impl Vlan1OnPorts {
    fn findings(iface: &Interface) -> Vec<String> {
        let mut found = Vec::new();
        if iface.is_access() && iface.access_vlan.unwrap_or(1) == 1 {
            found.push(format!("{}: access VLAN 1", iface.name));
        }
        if iface.is_trunk() {
            if iface.native_vlan.unwrap_or(1) == 1 {
                found.push(format!("{}: native VLAN 1", iface.name));
            }
            match &iface.allowed_vlans {
                None => found.push(format!("{}: trunk allows all VLANs", iface.name)),
                Some(allowed) if allowed.contains(&1) => found.push(format!(
                    "{}: trunk allows VLAN 1 ({})",
                    iface.name,
                    format_vlan_list(allowed)
                )),
                Some(_) => {}
            }
        }
        found
    }
}

impl Rule for Vlan1OnPorts {
    rule_identity!(
        "NA310",
        "vlan1-on-ports",
        Interfaces,
        "VLAN 1 is not used on access or trunk ports"
    );

    fn is_applicable(&self, doc: &Document) -> bool {
        doc.interfaces.values().any(|i| i.is_access() || i.is_trunk())
    }

    fn not_applicable_reason(&self) -> &'static str {
        "no access or trunk switchports configured"
    }

    fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError> {
        let findings: Vec<String> = doc
            .interfaces
            .values()
            .flat_map(Self::findings)
            .collect();
        let checked = doc
            .interfaces
            .values()
            .filter(|i| i.is_access() || i.is_trunk())
            .count();

        Ok(if findings.is_empty() {
            Assessment::compliant().with_evidence(format!(
                "{checked} switchport(s) checked, none use VLAN 1"
            ))
        } else {
            Assessment::non_compliant()
                .with_detail("violations", findings.len())
                .with_evidence_lines(findings)
        }
        .with_detail("ports_checked", checked))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::check;
    use netaudit_core::Status;

    // --- unused-ports-shutdown ---

    const BRIEF: &str = "SW01#show ip interface brief
Interface              IP-Address      OK? Method Status                Protocol
GigabitEthernet0/1     10.0.0.1        YES manual up                    up
GigabitEthernet0/2     unassigned      YES unset  down                  down
GigabitEthernet0/3     unassigned      YES unset  administratively down down
SW01#show running-config
";

    #[test]
    fn down_port_without_shutdown_fails() {
        let a = check(&UnusedPortsShutdown, BRIEF);
        assert_eq!(a.status, Status::NonCompliant);
        assert_eq!(a.evidence.len(), 1);
        assert!(a.evidence[0].starts_with("GigabitEthernet0/2"));
    }

    #[test]
    fn configured_shutdown_counts() {
        let text = format!("{BRIEF}interface GigabitEthernet0/2\n shutdown\n!\n");
        assert_eq!(check(&UnusedPortsShutdown, &text).status, Status::Compliant);
    }

    #[test]
    fn no_status_output_is_not_applicable() {
        let a = check(&UnusedPortsShutdown, "interface Gi0/1\n shutdown\n!\n");
        assert_eq!(a.status, Status::NotApplicable);
    }

    // --- vlan1-on-ports ---

    #[test]
    fn access_port_defaults_to_vlan_1() {
        let a = check(&Vlan1OnPorts, "interface Gi0/1\n switchport mode access\n!\n");
        assert_eq!(a.status, Status::NonCompliant);
        assert_eq!(a.evidence, vec!["GigabitEthernet0/1: access VLAN 1"]);
    }

    #[test]
    fn pruned_trunk_with_native_vlan_passes() {
        let a = check(
            &Vlan1OnPorts,
            "interface Gi0/1\n switchport mode access\n switchport access vlan 10\n!\ninterface Gi0/48\n switchport mode trunk\n switchport trunk native vlan 999\n switchport trunk allowed vlan 10,20\n!\n",
        );
        assert_eq!(a.status, Status::Compliant);
    }

    #[test]
    fn unpruned_trunk_fails() {
        let a = check(
            &Vlan1OnPorts,
            "interface Gi0/48\n switchport mode trunk\n switchport trunk native vlan 999\n!\n",
        );
        assert_eq!(a.status, Status::NonCompliant);
        assert!(a.evidence[0].contains("all VLANs"));
    }

    #[test]
    fn routed_ports_only_is_not_applicable() {
        let a = check(&Vlan1OnPorts, "interface Gi0/0\n ip address 10.0.0.1 255.255.255.0\n!\n");
        assert_eq!(a.status, Status::NotApplicable);
    }
}
