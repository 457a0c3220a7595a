//! Parsing and cross-reference resolution over whole captures.

use netaudit_core::facts::{AnomalyKind, ProtocolKind, Resolution};
use netaudit_core::Document;

const DISTRIBUTION_SWITCH: &str = "DS1#show running-config
Building configuration...
!
hostname DS1
!
vrf definition MGMT
!
interface Gi0/1
 description uplink
 switchport mode trunk
!
interface Vlan100
 vrf forwarding OOB
 ip address 10.100.0.2 255.255.255.0
!
interface GigabitEthernet0/1
 shutdown
!
router bgp 65010
 neighbor RR peer-group
 neighbor RR remote-as 65010
 neighbor RR maximum-prefix 500
 neighbor 10.0.0.1 peer-group RR
 neighbor 10.0.0.2 peer-group SPINES
 neighbor 10.0.0.2 remote-as 65010
!
router lisp
 locator-set CORE
!
access-list 10 permit 10.100.0.0 0.0.0.255
!
line vty 0 4
 access-class 10 in
line vty 5 15
 access-class 99 in
!
end
";

// --- structure ---

#[test]
fn abbreviated_and_full_interface_names_share_one_record() {
    let doc = Document::parse(DISTRIBUTION_SWITCH);

    let uplink = doc.interface("GigabitEthernet0/1").expect("interface present");
    assert_eq!(doc.interface("gi0/1"), Some(uplink));
    assert_eq!(uplink.description.as_deref(), Some("uplink"));
    assert!(uplink.is_administratively_shutdown);
    assert_eq!(doc.anomalies_of(AnomalyKind::DuplicateBlock).count(), 1);
}

#[test]
fn unmodeled_router_block_is_recorded_not_dropped_silently() {
    let doc = Document::parse(DISTRIBUTION_SWITCH);
    assert!(doc.has_protocol(ProtocolKind::Bgp));
    assert_eq!(doc.anomalies_of(AnomalyKind::UnknownProtocol).count(), 1);
}

#[test]
fn block_running_to_end_of_input_is_an_anomaly() {
    let doc = Document::parse("hostname R1\ninterface Gi0/2\n shutdown");
    assert!(doc.interface("Gi0/2").is_some());
    assert_eq!(doc.anomalies_of(AnomalyKind::UnterminatedBlock).count(), 1);
}

// --- cross references ---

#[test]
fn access_classes_resolve_against_acls() {
    let doc = Document::parse(DISTRIBUTION_SWITCH);

    let first = &doc.lines[0];
    assert_eq!(first.label(), "line vty 0 4");
    assert_eq!(first.access_class.resolved().map(Vec::len), Some(1));

    let second = &doc.lines[1];
    assert!(second.access_class.is_unresolved());
    assert_eq!(doc.anomalies_of(AnomalyKind::UnresolvedAcl).count(), 1);
}

#[test]
fn undeclared_vrf_binding_is_flagged() {
    let doc = Document::parse(DISTRIBUTION_SWITCH);

    let svi = doc.interface("Vlan100").expect("svi present");
    assert_eq!(svi.vrf.as_deref(), Some("OOB"));
    assert_eq!(svi.vrf_declared, Some(false));
    assert!(doc.vrfs.declared.contains("MGMT"));
    assert_eq!(doc.anomalies_of(AnomalyKind::UndeclaredVrf).count(), 1);
}

#[test]
fn neighbors_inherit_from_declared_peer_groups() {
    let doc = Document::parse(DISTRIBUTION_SWITCH);
    let bgp = doc.bgp().expect("bgp present");

    let member = &bgp.neighbors["10.0.0.1"];
    assert_eq!(member.remote_as, Some(65010));
    assert_eq!(member.maximum_prefix, Some(500));

    let orphan = &bgp.neighbors["10.0.0.2"];
    assert_eq!(orphan.maximum_prefix, None);
    assert_eq!(doc.anomalies_of(AnomalyKind::UnresolvedPeerGroup).count(), 1);
}

#[test]
fn unreferenced_lines_stay_pending() {
    let doc = Document::parse("line con 0\n exec-timeout 5 0\n!\n");
    assert_eq!(doc.lines[0].access_class, Resolution::Pending);
    assert!(doc.anomalies.is_empty());
}
