//! `router` and `key chain` blocks.

use std::collections::BTreeSet;

use super::{parse_number, rest_after, words};
use crate::block::Block;
use crate::document::interface_key;
use crate::facts::{
    Anomaly, ChainKey, Credential, Direction, DistributeList, FilterKind, KeyChain, Neighbor,
    NeighborFilter, Protocol, ProtocolKind, Resolution,
};

/// Builds a protocol record from one `router` block.
pub(super) fn extract_router(
    kind: ProtocolKind,
    process: Option<&str>,
    block: &Block,
) -> (Protocol, Vec<Anomaly>) {
    let subject = block.header_line.as_str();
    let mut protocol = Protocol::new(kind);
    let mut anomalies = Vec::new();
    let mut declared_groups = BTreeSet::new();
    let mut process_auth: Vec<String> = Vec::new();
    let mut process_chain = None;

    if let Some(process) = process {
        protocol.processes.push(process.to_string());
        if kind == ProtocolKind::Bgp {
            protocol.local_as = parse_number(Some(process), subject, "local AS", &mut anomalies);
        }
    }

    for line in block.lines() {
        protocol.raw_lines.push(line.to_string());
        let (original, lower) = words(line);
        let lw: Vec<&str> = lower.iter().map(String::as_str).collect();

        match lw.as_slice() {
            ["neighbor", _, attr @ ..] => {
                let address = original[1].to_string();
                if attr == ["peer-group"] {
                    declared_groups.insert(address.clone());
                }
                let neighbor = protocol
                    .neighbors
                    .entry(address.clone())
                    .or_insert_with(|| Neighbor {
                        address,
                        ..Neighbor::default()
                    });
                neighbor.raw_lines.push(line.to_string());
                neighbor_attribute(neighbor, attr, line, &original, subject, &mut anomalies);
            }
            ["area", area, "authentication", ..] => protocol.credentials.push(Credential {
                protocol: kind,
                scope: format!("area {area}"),
                directive: line.to_string(),
                key_chain: None,
                strength: None,
            }),
            ["authentication", "mode" | "key-chain", ..] => {
                process_auth.push(line.to_string());
                if lw[1] == "key-chain" {
                    process_chain = original.get(2).map(|s| (*s).to_string());
                }
            }
            ["passive-interface", "default"] => protocol.passive_default = true,
            ["passive-interface", ..] => {
                protocol.passive_interfaces.insert(interface_key(&rest_after(line, 1)));
            }
            ["no", "passive-interface", ..] => {
                protocol.active_interfaces.insert(interface_key(&rest_after(line, 2)));
            }
            ["distribute-list", ..] => {
                if let Some(list) = distribute_list(&original[1..]) {
                    protocol.distribute_lists.push(list);
                }
            }
            _ => {}
        }
    }

    if !process_auth.is_empty() {
        protocol.credentials.push(Credential {
            protocol: kind,
            scope: subject.to_string(),
            directive: process_auth.join("; "),
            key_chain: process_chain,
            strength: None,
        });
    }

    for name in declared_groups {
        if let Some(mut group) = protocol.neighbors.remove(&name) {
            group.peer_group = None;
            protocol.peer_groups.insert(name, group);
        }
    }

    (protocol, anomalies)
}

fn neighbor_attribute(
    neighbor: &mut Neighbor,
    attr: &[&str],
    line: &str,
    original: &[&str],
    subject: &str,
    anomalies: &mut Vec<Anomaly>,
) {
    let filter = |kind: FilterKind| {
        let direction = Direction::parse(attr.get(2)?)?;
        Some(NeighborFilter {
            kind,
            name: (*original.get(3)?).to_string(),
            direction,
            target: Resolution::Pending,
        })
    };

    match attr {
        ["remote-as", value, ..] => {
            neighbor.remote_as = parse_number(Some(*value), subject, "remote-as", anomalies);
        }
        ["peer-group", _] => neighbor.peer_group = Some(original[3].to_string()),
        ["description", ..] => neighbor.description = Some(rest_after(line, 3)),
        ["password", ..] => neighbor.password = Some(rest_after(line, 3)),
        ["ao", _, ..] => neighbor.tcp_ao = Some(original[3].to_string()),
        ["maximum-prefix", value, ..] => {
            neighbor.maximum_prefix = parse_number(Some(*value), subject, "maximum-prefix", anomalies);
        }
        ["remove-private-as", ..] => neighbor.remove_private_as = true,
        ["shutdown", ..] => neighbor.shutdown = true,
        ["prefix-list", ..] => neighbor.filters.extend(filter(FilterKind::PrefixList)),
        ["filter-list", ..] => neighbor.filters.extend(filter(FilterKind::FilterList)),
        ["distribute-list", ..] => neighbor.filters.extend(filter(FilterKind::DistributeList)),
        ["route-map", ..] => neighbor.filters.extend(filter(FilterKind::RouteMap)),
        _ => {}
    }
}

/// Parses the words after `distribute-list`.
fn distribute_list(args: &[&str]) -> Option<DistributeList> {
    let args = match args.first().map(|w| w.to_ascii_lowercase()).as_deref() {
        Some("prefix" | "route-map" | "gateway") => args.get(1..)?,
        _ => args,
    };
    let list = (*args.first()?).to_string();
    let direction = Direction::parse(args.get(1)?)?;
    let interface = args
        .get(2..)
        .filter(|rest| !rest.is_empty())
        .map(|rest| interface_key(&rest.join("")));
    Some(DistributeList {
        list,
        direction,
        interface,
    })
}

/// Reads a `key chain` block.
pub(super) fn extract_key_chain(name: &str, block: &Block) -> KeyChain {
    let mut chain = KeyChain {
        name: name.to_string(),
        keys: Vec::new(),
    };
    for line in block.lines() {
        let (original, lower) = words(line);
        match lower.first().map(String::as_str) {
            Some("key") => chain.keys.push(ChainKey {
                id: original.get(1).and_then(|id| id.parse().ok()),
                ..ChainKey::default()
            }),
            Some("key-string") => {
                current_key(&mut chain).key_string = Some(rest_after(line, 1));
            }
            Some("cryptographic-algorithm") => {
                current_key(&mut chain).algorithm = original.get(1).map(|s| s.to_ascii_lowercase());
            }
            _ => {}
        }
    }
    chain
}

fn current_key(chain: &mut KeyChain) -> &mut ChainKey {
    if chain.keys.is_empty() {
        chain.keys.push(ChainKey::default());
    }
    let last = chain.keys.len() - 1;
    &mut chain.keys[last]
}
