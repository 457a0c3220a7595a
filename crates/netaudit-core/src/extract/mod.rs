//! Fact extraction.
//!
//! Every block kind has its own pure extractor that turns the block into a
//! fact fragment. [`extract`] runs them in block order and merges the
//! fragments into one [`Document`]. Extractors never look at other blocks;
//! anything that needs another block's facts is left to the resolver.

mod acl;
mod global;
mod interface;
mod line;
mod router;
mod show;

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::block::{Block, BlockKind, Termination};
use crate::document::{interface_key, Document};
use crate::facts::{Anomaly, AnomalyKind, ProtocolKind};

pub use acl::{parse_acl_entry, parse_numbered_acl};
pub use show::detect_firmware;

/// Builds an unresolved document from blocks.
#[must_use]
pub fn extract(blocks: &[Block]) -> Document {
    let mut doc = Document::default();
    let mut interfaces: BTreeMap<String, (String, Vec<String>)> = BTreeMap::new();

    for block in blocks {
        if block.termination == Termination::EndOfInput
            && !matches!(
                block.kind,
                BlockKind::Global | BlockKind::CommandOutput { .. }
            )
        {
            doc.anomalies.push(Anomaly::new(
                AnomalyKind::UnterminatedBlock,
                block.header_line.clone(),
                format!("block starting at line {} runs to end of input", block.start_line),
            ));
        }

        match &block.kind {
            BlockKind::Global => {
                global::extract_global(&block.body_lines).merge_into(&mut doc);
            }
            BlockKind::Interface { name } => match interfaces.entry(interface_key(name)) {
                Entry::Vacant(slot) => {
                    slot.insert((name.clone(), block.body_lines.clone()));
                }
                Entry::Occupied(mut slot) => {
                    doc.anomalies.push(Anomaly::new(
                        AnomalyKind::DuplicateBlock,
                        block.header_line.clone(),
                        format!("interface declared again at line {}; bodies merged", block.start_line),
                    ));
                    slot.get_mut().1.extend(block.body_lines.iter().cloned());
                }
            },
            BlockKind::Line { kind, range } => {
                let (line, anomalies) = line::extract_line(kind, range, block);
                doc.lines.push(line);
                doc.anomalies.extend(anomalies);
            }
            BlockKind::Router { protocol, process } => {
                let Some(kind) = ProtocolKind::parse(protocol) else {
                    debug!("ignoring router block `{}`", block.header_line);
                    doc.anomalies.push(Anomaly::new(
                        AnomalyKind::UnknownProtocol,
                        block.header_line.clone(),
                        format!("routing protocol `{protocol}` is not modeled"),
                    ));
                    continue;
                };
                let (record, anomalies) =
                    router::extract_router(kind, process.as_deref(), block);
                doc.anomalies.extend(anomalies);
                match doc.routing_protocols.entry(kind) {
                    Entry::Vacant(slot) => {
                        slot.insert(record);
                    }
                    Entry::Occupied(mut slot) => slot.get_mut().absorb(record),
                }
            }
            BlockKind::KeyChain { name } => {
                doc.key_chains
                    .insert(name.clone(), router::extract_key_chain(name, block));
            }
            BlockKind::AccessList { name, extended } => {
                let entries = acl::extract_named_acl(*extended, block);
                doc.acls.entry(name.clone()).or_default().extend(entries);
            }
            BlockKind::Archive => {
                let (backup, anomalies) = global::extract_archive(block);
                doc.anomalies.extend(anomalies);
                global::merge_backup(&mut doc.backup, backup);
            }
            BlockKind::CommandOutput { command } => {
                show::extract_output(command, block).merge_into(&mut doc);
            }
        }
    }

    for (key, (name, body)) in interfaces {
        let (iface, anomalies) = interface::extract_interface(&name, &body);
        doc.anomalies.extend(anomalies);
        if let Some(vrf) = &iface.vrf {
            doc.vrfs.bindings.insert(key.clone(), vrf.clone());
        }
        doc.interfaces.insert(key, iface);
    }

    if !doc.anomalies.is_empty() {
        warn!("{} structural anomalies recorded", doc.anomalies.len());
    }
    debug!(
        "extracted {} interfaces, {} lines, {} routing protocols, {} ACLs",
        doc.interfaces.len(),
        doc.lines.len(),
        doc.routing_protocols.len(),
        doc.acls.len()
    );
    doc
}

/// Parses a numeric field; a missing or malformed value is recorded and
/// reported as absent.
pub(crate) fn parse_number<T: FromStr>(
    token: Option<&str>,
    subject: &str,
    field: &str,
    anomalies: &mut Vec<Anomaly>,
) -> Option<T> {
    let Some(token) = token else {
        anomalies.push(Anomaly::new(
            AnomalyKind::MalformedNumber,
            subject,
            format!("{field}: value missing"),
        ));
        return None;
    };
    if let Ok(value) = token.parse() {
        Some(value)
    } else {
        anomalies.push(Anomaly::new(
            AnomalyKind::MalformedNumber,
            subject,
            format!("{field}: `{token}` is not a valid number"),
        ));
        None
    }
}

/// Splits a line into original-case words and their lowercase forms.
pub(crate) fn words(line: &str) -> (Vec<&str>, Vec<String>) {
    let original: Vec<&str> = line.split_whitespace().collect();
    let lower = original.iter().map(|w| w.to_ascii_lowercase()).collect();
    (original, lower)
}

/// Returns the line with its first `n` words removed.
pub(crate) fn rest_after(line: &str, n: usize) -> String {
    line.split_whitespace().skip(n).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::split_blocks;

    #[test]
    fn duplicate_interfaces_merge_with_anomaly() {
        let blocks = split_blocks(
            "interface Gi0/1\n description first\n!\ninterface GigabitEthernet0/1\n shutdown\n!\n",
        );
        let doc = extract(&blocks);
        assert_eq!(doc.interfaces.len(), 1);
        let iface = doc.interface("Gi0/1").expect("merged interface");
        assert_eq!(iface.description.as_deref(), Some("first"));
        assert!(iface.is_administratively_shutdown);
        assert_eq!(doc.anomalies_of(AnomalyKind::DuplicateBlock).count(), 1);
    }

    #[test]
    fn unterminated_block_is_recorded() {
        let doc = extract(&split_blocks("interface Gi0/1\n shutdown"));
        assert_eq!(doc.anomalies_of(AnomalyKind::UnterminatedBlock).count(), 1);
    }

    #[test]
    fn unknown_router_protocol_is_recorded() {
        let doc = extract(&split_blocks("router lisp\n!\n"));
        assert!(doc.routing_protocols.is_empty());
        assert_eq!(doc.anomalies_of(AnomalyKind::UnknownProtocol).count(), 1);
    }

    #[test]
    fn multiple_ospf_processes_merge() {
        let doc = extract(&split_blocks(
            "router ospf 1\n area 0 authentication message-digest\n!\nrouter ospf 2\n passive-interface default\n!\n",
        ));
        let ospf = doc.protocol(ProtocolKind::Ospf).expect("ospf");
        assert_eq!(ospf.processes, vec!["1", "2"]);
        assert_eq!(ospf.credentials.len(), 1);
        assert!(ospf.passive_default);
    }

    #[test]
    fn vrf_bindings_mirror_interfaces() {
        let doc = extract(&split_blocks("interface Gi0/0\n vrf forwarding MGMT\n!\n"));
        assert_eq!(
            doc.vrfs.bindings.get("gigabitethernet0/0").map(String::as_str),
            Some("MGMT")
        );
    }

    #[test]
    fn malformed_number_is_absent_and_recorded() {
        let mut anomalies = Vec::new();
        let value: Option<u32> = parse_number(Some("1O"), "line vty 0 4", "exec-timeout", &mut anomalies);
        assert!(value.is_none());
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].kind, AnomalyKind::MalformedNumber);
    }
}
