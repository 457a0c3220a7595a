//! `interface` blocks.

use std::collections::{BTreeMap, BTreeSet};
use std::net::Ipv4Addr;

use super::{parse_number, rest_after, words};
use crate::document::canonical_interface_name;
use crate::facts::{
    AclBinding, Anomaly, AnomalyKind, Credential, Direction, FhrpGroup, FhrpProtocol, Interface,
    ProtocolKind, Resolution, SwitchportMode,
};
use crate::utils::{parse_vlan_list, MAX_VLAN};

/// Builds an interface record from its (possibly merged) body.
pub(super) fn extract_interface(name: &str, body: &[String]) -> (Interface, Vec<Anomaly>) {
    let canonical = canonical_interface_name(name);
    let subject = format!("interface {canonical}");
    let mut iface = Interface {
        name: canonical,
        ..Interface::default()
    };
    let mut anomalies = Vec::new();
    let mut auth: BTreeMap<ProtocolKind, (Vec<String>, Option<String>)> = BTreeMap::new();

    for line in body.iter().map(String::as_str) {
        if line.is_empty() || line.starts_with('!') {
            continue;
        }
        iface.raw_lines.push(line.to_string());
        let (original, lower) = words(line);
        let lw: Vec<&str> = lower.iter().map(String::as_str).collect();

        match lw.as_slice() {
            ["description", ..] => iface.description = Some(rest_after(line, 1)),
            ["shutdown"] => iface.is_administratively_shutdown = true,
            ["no", "shutdown"] => iface.is_administratively_shutdown = false,
            ["switchport", "mode", mode @ ..] => iface.admin_mode = Some(switchport_mode(mode)),
            ["switchport", "access", "vlan", vlan, ..] => {
                iface.access_vlan = parse_number(Some(*vlan), &subject, "access vlan", &mut anomalies);
            }
            ["switchport", "trunk", "native", "vlan", vlan, ..] => {
                iface.native_vlan = parse_number(Some(*vlan), &subject, "native vlan", &mut anomalies);
            }
            ["switchport", "trunk", "allowed", "vlan", spec @ ..] => {
                allowed_vlans(&mut iface, spec, &subject, &mut anomalies);
            }
            ["switchport", "port-security", ..] => iface.port_security = true,
            ["switchport", "protected"] => iface.protected = true,
            ["spanning-tree", "portfast", rest @ ..] => {
                iface.portfast = rest.first() != Some(&"disable");
            }
            ["spanning-tree", "bpduguard", "enable"] => iface.bpduguard = Some(true),
            ["spanning-tree", "bpduguard", "disable"] => iface.bpduguard = Some(false),
            ["ip", "dhcp", "snooping", "trust"] => iface.dhcp_snooping_trust = true,
            ["dot1x" | "authentication", "port-control", "auto"] => iface.dot1x_port_control = true,
            ["ip", "address", addr, mask, rest @ ..] if !rest.contains(&"secondary") => {
                if let (Ok(addr), Ok(mask)) = (addr.parse::<Ipv4Addr>(), mask.parse::<Ipv4Addr>()) {
                    iface.ip_address = Some(addr);
                    iface.ip_mask = Some(mask);
                }
            }
            ["no", "ip", "address"] => {
                iface.ip_address = None;
                iface.ip_mask = None;
            }
            ["vrf", "forwarding", _] => iface.vrf = Some(original[2].to_string()),
            ["ip", "vrf", "forwarding", _] => iface.vrf = Some(original[3].to_string()),
            ["ip", "access-group", _, direction] => {
                if let Some(direction) = Direction::parse(direction) {
                    iface.access_groups.push(AclBinding {
                        acl_id: original[2].to_string(),
                        direction,
                        entries: Resolution::Pending,
                    });
                }
            }
            ["standby", rest @ ..] => fhrp(&mut iface, FhrpProtocol::Hsrp, rest, &original),
            ["vrrp", rest @ ..] => fhrp(&mut iface, FhrpProtocol::Vrrp, rest, &original),
            ["glbp", rest @ ..] => fhrp(&mut iface, FhrpProtocol::Glbp, rest, &original),
            _ => {
                if let Some(kind) = routing_auth_protocol(&lw) {
                    let entry = auth.entry(kind).or_default();
                    entry.0.push(line.to_string());
                    if entry.1.is_none() {
                        entry.1 = key_chain_name(kind, &lw, &original);
                    }
                }
            }
        }
    }

    iface.routing_auth = auth
        .into_iter()
        .map(|(protocol, (directives, key_chain))| Credential {
            protocol,
            scope: subject.clone(),
            directive: directives.join("; "),
            key_chain,
            strength: None,
        })
        .collect();

    (iface, anomalies)
}

fn switchport_mode(mode: &[&str]) -> SwitchportMode {
    match mode {
        ["access", ..] => SwitchportMode::Access,
        ["trunk", ..] => SwitchportMode::Trunk,
        ["dynamic", "auto", ..] => SwitchportMode::DynamicAuto,
        ["dynamic", "desirable", ..] => SwitchportMode::DynamicDesirable,
        other => SwitchportMode::Other(other.join(" ")),
    }
}

fn allowed_vlans(iface: &mut Interface, spec: &[&str], subject: &str, anomalies: &mut Vec<Anomaly>) {
    let (op, list) = match spec {
        [op @ ("add" | "remove" | "except"), rest @ ..] => (*op, rest.join("")),
        rest => ("set", rest.join("")),
    };
    let Some(vlans) = parse_vlan_list(&list) else {
        anomalies.push(Anomaly::new(
            AnomalyKind::MalformedNumber,
            subject,
            format!("allowed vlan: `{list}` is not a valid VLAN list"),
        ));
        return;
    };
    let all = || (1..=MAX_VLAN).collect::<BTreeSet<u16>>();
    match op {
        "add" => {
            if let Some(current) = &mut iface.allowed_vlans {
                current.extend(vlans);
            }
        }
        "remove" => {
            let current = iface.allowed_vlans.get_or_insert_with(all);
            current.retain(|v| !vlans.contains(v));
        }
        "except" => {
            iface.allowed_vlans = Some(all().difference(&vlans).copied().collect());
        }
        _ => iface.allowed_vlans = Some(vlans),
    }
}

fn fhrp(iface: &mut Interface, protocol: FhrpProtocol, rest: &[&str], original: &[&str]) {
    let (group, attr, offset) = match rest.first().and_then(|w| w.parse::<u32>().ok()) {
        Some(group) => (group, &rest[1..], 2),
        None => (0, rest, 1),
    };
    let creates = matches!(attr.first(), Some(&("ip" | "authentication")));
    let existing = iface
        .fhrp_groups
        .iter()
        .position(|g| g.protocol == protocol && g.group == group);
    let index = match existing {
        Some(index) => index,
        None if creates => {
            iface.fhrp_groups.push(FhrpGroup {
                protocol,
                group,
                virtual_ip: None,
                authentication: None,
            });
            iface.fhrp_groups.len() - 1
        }
        None => return,
    };
    let record = &mut iface.fhrp_groups[index];
    match attr {
        ["ip", ..] => {
            record.virtual_ip = original.get(offset + 1).map(|s| (*s).to_string());
        }
        ["authentication", ..] => {
            record.authentication = Some(original.get(offset + 1..).unwrap_or_default().join(" "));
        }
        _ => {}
    }
}

fn routing_auth_protocol(lw: &[&str]) -> Option<ProtocolKind> {
    match lw {
        ["ip", "ospf", "authentication" | "authentication-key" | "message-digest-key", ..] => {
            Some(ProtocolKind::Ospf)
        }
        ["ip", "rip", "authentication", ..] => Some(ProtocolKind::Rip),
        ["ip", "authentication", "mode" | "key-chain", "eigrp", ..] => Some(ProtocolKind::Eigrp),
        ["isis", "authentication" | "password", ..] => Some(ProtocolKind::Isis),
        _ => None,
    }
}

fn key_chain_name(kind: ProtocolKind, lw: &[&str], original: &[&str]) -> Option<String> {
    let at = lw.iter().position(|w| *w == "key-chain")?;
    let token = if kind == ProtocolKind::Eigrp {
        original.last()
    } else {
        original.get(at + 1)
    };
    token.map(|s| (*s).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(text: &str) -> Vec<String> {
        text.lines().map(|l| l.trim().to_string()).collect()
    }

    fn iface(text: &str) -> Interface {
        extract_interface("Gi0/1", &body(text)).0
    }

    #[test]
    fn access_port_attributes() {
        let i = iface(
            "description User port\nswitchport mode access\nswitchport access vlan 20\nswitchport port-security\nspanning-tree portfast\nspanning-tree bpduguard enable",
        );
        assert_eq!(i.name, "GigabitEthernet0/1");
        assert!(i.is_access());
        assert_eq!(i.access_vlan, Some(20));
        assert!(i.port_security);
        assert!(i.portfast);
        assert_eq!(i.bpduguard, Some(true));
        assert_eq!(i.description.as_deref(), Some("User port"));
    }

    #[test]
    fn trunk_allowed_vlans_add_and_remove() {
        let i = iface(
            "switchport mode trunk\nswitchport trunk allowed vlan 10,20\nswitchport trunk allowed vlan add 30-31\nswitchport trunk allowed vlan remove 20",
        );
        assert!(i.is_trunk());
        let allowed: Vec<u16> = i.allowed_vlans.expect("restricted").into_iter().collect();
        assert_eq!(allowed, vec![10, 30, 31]);
    }

    #[test]
    fn trunk_allowed_except_excludes_listed() {
        let i = iface("switchport trunk allowed vlan except 1");
        let allowed = i.allowed_vlans.expect("restricted");
        assert!(!allowed.contains(&1));
        assert!(allowed.contains(&2));
    }

    #[test]
    fn malformed_access_vlan_is_absent() {
        let (i, anomalies) = extract_interface("Gi0/1", &body("switchport access vlan 1x"));
        assert!(i.access_vlan.is_none());
        assert_eq!(anomalies.len(), 1);
    }

    #[test]
    fn secondary_address_does_not_replace_primary() {
        let i = iface(
            "ip address 192.0.2.1 255.255.255.0\nip address 198.51.100.1 255.255.255.0 secondary",
        );
        assert_eq!(i.ip_address, Some(Ipv4Addr::new(192, 0, 2, 1)));
    }

    #[test]
    fn vrf_and_access_group() {
        let i = iface("vrf forwarding Mgmt-vrf\nip access-group EDGE-IN in");
        assert_eq!(i.vrf.as_deref(), Some("Mgmt-vrf"));
        assert_eq!(i.access_groups[0].acl_id, "EDGE-IN");
        assert_eq!(i.access_groups[0].direction, Direction::In);
    }

    #[test]
    fn fhrp_groups_and_authentication() {
        let i = iface(
            "standby 1 ip 10.0.0.1\nstandby 1 priority 110\nstandby 1 authentication md5 key-string s3cret\nvrrp 5 ip 10.0.1.1\nstandby ip 10.0.2.1",
        );
        assert_eq!(i.fhrp_groups.len(), 3);
        let hsrp = &i.fhrp_groups[0];
        assert_eq!(hsrp.virtual_ip.as_deref(), Some("10.0.0.1"));
        assert_eq!(hsrp.authentication.as_deref(), Some("md5 key-string s3cret"));
        assert!(i.fhrp_groups[1].authentication.is_none());
        assert_eq!(i.fhrp_groups[2].group, 0);
    }

    #[test]
    fn routing_auth_lines_group_by_protocol() {
        let i = iface(
            "ip ospf authentication message-digest\nip ospf message-digest-key 1 md5 7 0822455D0A16\nip authentication mode eigrp 100 md5\nip authentication key-chain eigrp 100 EIGRP-KEYS",
        );
        assert_eq!(i.routing_auth.len(), 2);
        let ospf = &i.routing_auth[0];
        assert_eq!(ospf.protocol, ProtocolKind::Ospf);
        assert!(ospf.directive.contains("message-digest-key"));
        let eigrp = &i.routing_auth[1];
        assert_eq!(eigrp.protocol, ProtocolKind::Eigrp);
        assert_eq!(eigrp.key_chain.as_deref(), Some("EIGRP-KEYS"));
        assert_eq!(eigrp.scope, "interface GigabitEthernet0/1");
    }

    #[test]
    fn portfast_disable_is_not_portfast() {
        assert!(!iface("spanning-tree portfast disable").portfast);
        assert!(iface("spanning-tree portfast edge").portfast);
    }
}
