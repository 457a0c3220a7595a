//! The configuration document: every fact extracted from one capture.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::block::split_blocks;
use crate::extract::extract;
use crate::facts::{
    AclEntry, Anomaly, AnomalyKind, AsPathEntry, Backup, Credential, Firmware, Interface,
    KeyChain, Layer2, LinkStatus, ManagementLine, Monitoring, PrefixListEntry, Protocol,
    ProtocolKind, Services, Snmp, VrfTable, Aaa,
};
use crate::resolve::resolve;

/// Canonical interface-type names, in abbreviation-lookup order.
const INTERFACE_TYPES: &[&str] = &[
    "GigabitEthernet",
    "FastEthernet",
    "TenGigabitEthernet",
    "TwentyFiveGigE",
    "FortyGigabitEthernet",
    "HundredGigE",
    "Ethernet",
    "Loopback",
    "Port-channel",
    "Vlan",
    "Tunnel",
    "Serial",
];

/// Expands an abbreviated interface name (`Gi0/1` to `GigabitEthernet0/1`).
///
/// Names whose type prefix is unknown are returned with whitespace removed
/// and otherwise untouched.
#[must_use]
pub fn canonical_interface_name(name: &str) -> String {
    let compact: String = name.split_whitespace().collect();
    let split = compact
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(compact.len());
    let (prefix, rest) = compact.split_at(split);
    let lowered = prefix.to_ascii_lowercase();

    if lowered.len() >= 2 {
        if let Some(full) = INTERFACE_TYPES
            .iter()
            .find(|full| full.to_ascii_lowercase().starts_with(&lowered))
        {
            return format!("{full}{rest}");
        }
    }
    compact
}

/// Lookup key for an interface name: canonical and lowercased.
#[must_use]
pub fn interface_key(name: &str) -> String {
    canonical_interface_name(name).to_ascii_lowercase()
}

/// Normalized view of one configuration capture.
///
/// Built once per input by [`Document::parse`]: blocks are split, facts are
/// extracted, then cross-references are resolved. Rules only ever read it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Document {
    /// `hostname`.
    pub hostname: Option<String>,
    /// Firmware reported by `show version`.
    pub firmware: Option<Firmware>,
    /// Top-level lines outside any block, in order.
    pub global_directives: Vec<String>,
    /// Interfaces keyed by [`interface_key`].
    pub interfaces: BTreeMap<String, Interface>,
    /// `show ip interface brief` rows keyed by [`interface_key`].
    pub interface_status: BTreeMap<String, LinkStatus>,
    /// Console, vty and aux lines, in order.
    pub lines: Vec<ManagementLine>,
    /// Routing protocols.
    pub routing_protocols: BTreeMap<ProtocolKind, Protocol>,
    /// ACLs keyed by number or name.
    pub acls: BTreeMap<String, Vec<AclEntry>>,
    /// Prefix lists keyed by name.
    pub prefix_lists: BTreeMap<String, Vec<PrefixListEntry>>,
    /// AS-path access lists keyed by number.
    pub as_path_lists: BTreeMap<String, Vec<AsPathEntry>>,
    /// Route-map clause counts keyed by map name.
    pub route_maps: BTreeMap<String, usize>,
    /// Key chains keyed by name.
    pub key_chains: BTreeMap<String, KeyChain>,
    /// VRFs.
    pub vrfs: VrfTable,
    /// SNMP.
    pub snmp: Snmp,
    /// AAA and local accounts.
    pub aaa: Aaa,
    /// Configuration archive.
    pub backup: Backup,
    /// SSH/HTTP services.
    pub services: Services,
    /// Switching features.
    pub layer2: Layer2,
    /// NTP and syslog.
    pub monitoring: Monitoring,
    /// Recorded ambiguities and dangling references.
    pub anomalies: Vec<Anomaly>,
}

impl Document {
    /// Parses a raw capture into a resolved document.
    ///
    /// Never fails: anything that cannot be understood is recorded in
    /// [`Document::anomalies`] and treated as absent.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let blocks = split_blocks(text);
        let mut doc = extract(&blocks);
        resolve(&mut doc);
        doc
    }

    /// Looks up an interface by any spelling of its name.
    #[must_use]
    pub fn interface(&self, name: &str) -> Option<&Interface> {
        self.interfaces.get(&interface_key(name))
    }

    /// Returns the record for a routing protocol.
    #[must_use]
    pub fn protocol(&self, kind: ProtocolKind) -> Option<&Protocol> {
        self.routing_protocols.get(&kind)
    }

    /// Returns true when a `router` block exists for `kind`.
    #[must_use]
    pub fn has_protocol(&self, kind: ProtocolKind) -> bool {
        self.routing_protocols.contains_key(&kind)
    }

    /// Returns the BGP record.
    #[must_use]
    pub fn bgp(&self) -> Option<&Protocol> {
        self.protocol(ProtocolKind::Bgp)
    }

    /// All credentials for `kind`: process-level first, then per interface.
    #[must_use]
    pub fn credentials(&self, kind: ProtocolKind) -> Vec<&Credential> {
        let process = self
            .protocol(kind)
            .into_iter()
            .flat_map(|p| p.credentials.iter());
        let interfaces = self
            .interfaces
            .values()
            .flat_map(|i| i.routing_auth.iter())
            .filter(|c| c.protocol == kind);
        process.chain(interfaces).collect()
    }

    /// Returns true when the capture describes switch ports or VLANs at all.
    #[must_use]
    pub fn has_switching_facts(&self) -> bool {
        !self.interfaces.is_empty() || !self.layer2.vlans.is_empty()
    }

    /// Anomalies of one kind.
    pub fn anomalies_of(&self, kind: AnomalyKind) -> impl Iterator<Item = &Anomaly> {
        self.anomalies.iter().filter(move |a| a.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbreviations_expand_to_canonical_names() {
        assert_eq!(canonical_interface_name("Gi0/1"), "GigabitEthernet0/1");
        assert_eq!(canonical_interface_name("fa0/24"), "FastEthernet0/24");
        assert_eq!(canonical_interface_name("Te1/1/1"), "TenGigabitEthernet1/1/1");
        assert_eq!(canonical_interface_name("Po10"), "Port-channel10");
        assert_eq!(canonical_interface_name("Vlan 10"), "Vlan10");
        assert_eq!(canonical_interface_name("Lo0"), "Loopback0");
    }

    #[test]
    fn unknown_prefixes_are_kept() {
        assert_eq!(canonical_interface_name("mgmt0"), "mgmt0");
        assert_eq!(canonical_interface_name("e0"), "e0");
    }

    #[test]
    fn interface_keys_ignore_case_and_abbreviation() {
        assert_eq!(interface_key("GIGABITETHERNET0/1"), interface_key("gi0/1"));
    }

    #[test]
    fn parse_is_idempotent() {
        let text = "hostname R1\ninterface Gi0/1\n ip address 10.0.0.1 255.255.255.0\n!\nline vty 0 4\n access-class 10 in\n!\naccess-list 10 permit 10.0.0.0 0.0.0.255\n";
        assert_eq!(Document::parse(text), Document::parse(text));
    }

    #[test]
    fn interface_lookup_accepts_any_spelling() {
        let doc = Document::parse("interface GigabitEthernet0/1\n description uplink\n!\n");
        assert!(doc.interface("Gi0/1").is_some());
        assert!(doc.interface("gigabitethernet0/1").is_some());
        assert!(doc.interface("Gi0/2").is_none());
    }
}
