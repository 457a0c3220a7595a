//! Service and management plane separation through VRFs.

use std::net::Ipv4Addr;

use netaudit_core::facts::Interface;
use netaudit_core::{Assessment, Document, Rule, RuleError};

use crate::management_access::is_management_interface;

/// Returns true for addresses outside the private, loopback, link-local
/// and `0.0.0.0/8` ranges.
fn is_public(addr: Ipv4Addr) -> bool {
    !(addr.is_private() || addr.is_loopback() || addr.is_link_local() || addr.octets()[0] == 0)
}

fn is_public_interface(iface: &Interface) -> bool {
    iface.ip_address.is_some_and(is_public)
}

/// Requires public-facing and management interfaces to sit in declared
/// VRFs, with at least two VRFs separating service and management traffic.
#[derive(Debug, Clone, Copy, Default)]
pub struct VrfSeparation;

impl Rule for VrfSeparation {
    rule_identity!(
        "NA430",
        "vrf-separation",
        Routing,
        "Public and management interfaces are separated by VRFs"
    );

    fn is_applicable(&self, doc: &Document) -> bool {
        doc.interfaces
            .values()
            .any(|i| is_public_interface(i) || is_management_interface(i))
    }

    fn not_applicable_reason(&self) -> &'static str {
        "no public or management interfaces"
    }

    fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError> {
        let declared = &doc.vrfs.declared;
        let mut findings = Vec::new();
        let mut bound = Vec::new();
        let mut public = 0usize;
        let mut management = 0usize;

        for iface in doc.interfaces.values() {
            let role = if is_management_interface(iface) {
                management += 1;
                "management"
            } else if is_public_interface(iface) {
                public += 1;
                "public"
            } else {
                continue;
            };

            match (&iface.vrf, iface.vrf_declared) {
                (None, _) => findings.push(format!("{}: {role} interface not in a VRF", iface.name)),
                (Some(vrf), Some(false)) => findings.push(format!(
                    "{}: {role} interface bound to undeclared VRF {vrf}",
                    iface.name
                )),
                (Some(vrf), _) => bound.push(format!("{}: {role} interface in VRF {vrf}", iface.name)),
            }
        }

        if declared.is_empty() {
            findings.insert(0, "no VRF declared".to_string());
        } else if declared.len() < 2 {
            findings.insert(
                0,
                format!(
                    "only one VRF declared ({}); service and management planes are not separated",
                    declared.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
                ),
            );
        }

        let assessment = if findings.is_empty() {
            Assessment::compliant().with_evidence_lines(bound)
        } else {
            Assessment::non_compliant().with_evidence_lines(findings)
        };
        Ok(assessment
            .with_detail("vrfs", declared.iter().cloned().collect::<Vec<_>>())
            .with_detail("public_interfaces", public)
            .with_detail("management_interfaces", management))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::check;
    use netaudit_core::Status;

    const SEPARATED: &str = "vrf definition INTERNET
!
vrf definition MGMT
!
interface GigabitEthernet0/0
 vrf forwarding INTERNET
 ip address 203.0.113.1 255.255.255.252
!
interface GigabitEthernet0/3
 description OOB management
 vrf forwarding MGMT
 ip address 10.255.0.1 255.255.255.0
!
interface GigabitEthernet0/1
 ip address 10.0.0.1 255.255.255.0
!
";

    #[test]
    fn public_addresses() {
        assert!(is_public(Ipv4Addr::new(203, 0, 113, 1)));
        assert!(!is_public(Ipv4Addr::new(172, 20, 0, 1)));
        assert!(!is_public(Ipv4Addr::new(169, 254, 1, 1)));
        assert!(!is_public(Ipv4Addr::new(0, 1, 2, 3)));
    }

    #[test]
    fn separated_planes_pass() {
        let a = check(&VrfSeparation, SEPARATED);
        assert_eq!(a.status, Status::Compliant, "{:?}", a.evidence);
        assert_eq!(
            a.evidence,
            vec![
                "GigabitEthernet0/0: public interface in VRF INTERNET",
                "GigabitEthernet0/3: management interface in VRF MGMT",
            ]
        );
    }

    #[test]
    fn unbound_public_interface_fails() {
        let a = check(
            &VrfSeparation,
            "vrf definition A\n!\nvrf definition B\n!\ninterface Gi0/0\n ip address 198.51.100.1 255.255.255.0\n!\n",
        );
        assert_eq!(a.status, Status::NonCompliant);
        assert_eq!(a.evidence, vec!["GigabitEthernet0/0: public interface not in a VRF"]);
    }

    #[test]
    fn single_vrf_fails() {
        let a = check(
            &VrfSeparation,
            "vrf definition INTERNET\n!\ninterface Gi0/0\n vrf forwarding INTERNET\n ip address 198.51.100.1 255.255.255.0\n!\n",
        );
        assert_eq!(a.status, Status::NonCompliant);
        assert!(a.evidence[0].starts_with("only one VRF declared"));
    }

    #[test]
    fn no_vrfs_fails_and_undeclared_binding_is_reported() {
        let a = check(
            &VrfSeparation,
            "interface Gi0/0\n vrf forwarding GHOST\n ip address 198.51.100.1 255.255.255.0\n!\n",
        );
        assert_eq!(a.status, Status::NonCompliant);
        assert_eq!(a.evidence[0], "no VRF declared");
        assert!(a.evidence[1].contains("undeclared VRF GHOST"));
    }

    #[test]
    fn private_only_device_is_not_applicable() {
        let a = check(&VrfSeparation, "interface Gi0/1\n ip address 10.0.0.1 255.255.255.0\n!\n");
        assert_eq!(a.status, Status::NotApplicable);
    }
}
