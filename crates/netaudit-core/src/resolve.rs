//! Cross-reference resolution.
//!
//! Runs after extraction and annotates consumers of indirect references:
//! ACL lookups, VRF membership, key chains, peer groups, neighbor filters
//! and per-interface route filtering. Definitions (`acls`, `vrfs`,
//! `key_chains`, ...) are only read. Every pass writes a disjoint set of
//! annotation fields, so passes can run in any order, and running them again
//! reproduces the same document.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::document::Document;
use crate::facts::{
    AclEntry, Anomaly, AnomalyKind, AuthStrength, ChainKey, Credential, Direction, FilterKind,
    KeyChain, Neighbor, Resolution, RouteFilter, RouteFilterMethod,
};
use crate::utils::compile;

static DIGEST: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)^(?:hmac-)?(sha-?(?:1|224|256|384|512)?|md5)$"));

/// A resolver pass: annotates the document and returns the anomalies it found.
pub type Pass = fn(&mut Document) -> Vec<Anomaly>;

/// All passes, by name.
pub const PASSES: &[(&str, Pass)] = &[
    ("access-classes", access_classes),
    ("interface-vrfs", interface_vrfs),
    ("interface-acls", interface_acls),
    ("interface-credentials", interface_credentials),
    ("protocol-credentials", protocol_credentials),
    ("neighbors", neighbors),
    ("snmp-acls", snmp_acls),
    ("route-filters", route_filters),
];

/// Runs every pass over an extracted document.
pub fn resolve(doc: &mut Document) {
    resolve_with(doc, PASSES);
}

/// Runs the given passes.
///
/// Anomalies from an earlier resolution are dropped first; the new ones are
/// appended sorted, so the result does not depend on pass order.
pub fn resolve_with(doc: &mut Document, passes: &[(&str, Pass)]) {
    doc.anomalies.retain(|a| !a.kind.is_resolution());

    let mut found = Vec::new();
    for (name, pass) in passes {
        let anomalies = pass(doc);
        debug!("resolver pass {name}: {} anomalies", anomalies.len());
        found.extend(anomalies);
    }
    found.sort();
    found.dedup();

    for anomaly in &found {
        warn!("{:?}: {anomaly}", anomaly.kind);
    }
    doc.anomalies.extend(found);
}

fn lookup_acl(
    acls: &BTreeMap<String, Vec<AclEntry>>,
    id: &str,
    subject: &str,
    anomalies: &mut Vec<Anomaly>,
) -> Resolution<Vec<AclEntry>> {
    match acls.get(id) {
        Some(entries) => Resolution::Resolved(entries.clone()),
        None => {
            anomalies.push(Anomaly::new(
                AnomalyKind::UnresolvedAcl,
                subject,
                format!("ACL `{id}` is not defined"),
            ));
            Resolution::Unresolved
        }
    }
}

fn access_classes(doc: &mut Document) -> Vec<Anomaly> {
    let Document { lines, acls, .. } = doc;
    let mut anomalies = Vec::new();
    for line in lines.iter_mut() {
        if let Some(id) = &line.access_class_acl_id {
            line.access_class = lookup_acl(acls, id, &line.label(), &mut anomalies);
        }
    }
    anomalies
}

fn interface_vrfs(doc: &mut Document) -> Vec<Anomaly> {
    let Document {
        interfaces, vrfs, ..
    } = doc;
    let mut anomalies = Vec::new();
    for iface in interfaces.values_mut() {
        iface.vrf_declared = iface.vrf.as_ref().map(|vrf| {
            let declared = vrfs.declared.contains(vrf);
            if !declared {
                anomalies.push(Anomaly::new(
                    AnomalyKind::UndeclaredVrf,
                    format!("interface {}", iface.name),
                    format!("VRF `{vrf}` is not declared"),
                ));
            }
            declared
        });
    }
    anomalies
}

fn interface_acls(doc: &mut Document) -> Vec<Anomaly> {
    let Document {
        interfaces, acls, ..
    } = doc;
    let mut anomalies = Vec::new();
    for iface in interfaces.values_mut() {
        let subject = format!("interface {}", iface.name);
        for binding in &mut iface.access_groups {
            binding.entries = lookup_acl(acls, &binding.acl_id, &subject, &mut anomalies);
        }
    }
    anomalies
}

fn interface_credentials(doc: &mut Document) -> Vec<Anomaly> {
    let Document {
        interfaces,
        key_chains,
        ..
    } = doc;
    let mut anomalies = Vec::new();
    for credential in interfaces
        .values_mut()
        .flat_map(|iface| iface.routing_auth.iter_mut())
    {
        credential.strength = Some(credential_strength(credential, key_chains, &mut anomalies));
    }
    anomalies
}

fn protocol_credentials(doc: &mut Document) -> Vec<Anomaly> {
    let Document {
        routing_protocols,
        key_chains,
        ..
    } = doc;
    let mut anomalies = Vec::new();
    for credential in routing_protocols
        .values_mut()
        .flat_map(|p| p.credentials.iter_mut())
    {
        credential.strength = Some(credential_strength(credential, key_chains, &mut anomalies));
    }
    anomalies
}

fn neighbors(doc: &mut Document) -> Vec<Anomaly> {
    let Document {
        routing_protocols,
        key_chains,
        prefix_lists,
        as_path_lists,
        acls,
        route_maps,
        ..
    } = doc;
    let mut anomalies = Vec::new();

    for protocol in routing_protocols.values_mut() {
        for neighbor in protocol.neighbors.values_mut() {
            let subject = format!("neighbor {}", neighbor.address);

            if let Some(group_name) = neighbor.peer_group.clone() {
                match protocol.peer_groups.get(&group_name) {
                    Some(group) => inherit(neighbor, group),
                    None => anomalies.push(Anomaly::new(
                        AnomalyKind::UnresolvedPeerGroup,
                        subject.as_str(),
                        format!("peer-group `{group_name}` is not declared"),
                    )),
                }
            }

            neighbor.auth_strength = Some(session_strength(
                neighbor,
                key_chains,
                &subject,
                &mut anomalies,
            ));

            for filter in &mut neighbor.filters {
                let size = match filter.kind {
                    FilterKind::PrefixList => prefix_lists.get(&filter.name).map(Vec::len),
                    FilterKind::FilterList => as_path_lists.get(&filter.name).map(Vec::len),
                    FilterKind::DistributeList => acls.get(&filter.name).map(Vec::len),
                    FilterKind::RouteMap => route_maps.get(&filter.name).copied(),
                };
                filter.target = match size {
                    Some(size) => Resolution::Resolved(size),
                    None => {
                        anomalies.push(Anomaly::new(
                            AnomalyKind::UnresolvedFilter,
                            subject.as_str(),
                            format!("{} `{}` is not defined", filter.kind, filter.name),
                        ));
                        Resolution::Unresolved
                    }
                };
            }
        }
    }
    anomalies
}

/// Fills unset neighbor attributes from its peer group.
fn inherit(neighbor: &mut Neighbor, group: &Neighbor) {
    neighbor.remote_as = neighbor.remote_as.or(group.remote_as);
    if neighbor.password.is_none() {
        neighbor.password.clone_from(&group.password);
    }
    if neighbor.tcp_ao.is_none() {
        neighbor.tcp_ao.clone_from(&group.tcp_ao);
    }
    neighbor.maximum_prefix = neighbor.maximum_prefix.or(group.maximum_prefix);
    neighbor.remove_private_as |= group.remove_private_as;
    if neighbor.filters.is_empty() {
        neighbor.filters.clone_from(&group.filters);
    }
}

fn session_strength(
    neighbor: &Neighbor,
    chains: &BTreeMap<String, KeyChain>,
    subject: &str,
    anomalies: &mut Vec<Anomaly>,
) -> AuthStrength {
    if let Some(chain) = &neighbor.tcp_ao {
        if chains.contains_key(chain) {
            return AuthStrength::Strong;
        }
        anomalies.push(Anomaly::new(
            AnomalyKind::UnresolvedKeyChain,
            subject,
            format!("TCP-AO key chain `{chain}` is not defined"),
        ));
        return AuthStrength::None;
    }
    neighbor
        .password
        .as_deref()
        .map_or(AuthStrength::None, classify_directive)
}

fn snmp_acls(doc: &mut Document) -> Vec<Anomaly> {
    let Document { snmp, acls, .. } = doc;
    let mut anomalies = Vec::new();
    for community in &mut snmp.communities {
        if let Some(id) = &community.acl {
            let subject = format!("snmp-server community {}", community.name);
            community.acl_entries = lookup_acl(acls, id, &subject, &mut anomalies);
        }
    }
    anomalies
}

fn route_filters(doc: &mut Document) -> Vec<Anomaly> {
    let Document {
        interfaces,
        routing_protocols,
        ..
    } = doc;
    for (key, iface) in interfaces.iter_mut() {
        let mut filters = Vec::new();
        for protocol in routing_protocols.values() {
            if protocol.is_passive(key) {
                filters.push(RouteFilter {
                    protocol: protocol.kind,
                    method: RouteFilterMethod::Passive,
                });
            }
            for list in &protocol.distribute_lists {
                if list.interface.as_deref() == Some(key.as_str())
                    && list.direction == Direction::In
                {
                    filters.push(RouteFilter {
                        protocol: protocol.kind,
                        method: RouteFilterMethod::DistributeList(list.list.clone()),
                    });
                }
            }
        }
        iface.route_filters = filters;
    }
    Vec::new()
}

// --- Credential classification ---

/// Strength implied by a single marker token, if it is one.
fn marker_strength(token: &str) -> Option<AuthStrength> {
    if token.eq_ignore_ascii_case("message-digest") {
        return Some(AuthStrength::Weak);
    }
    let caps = DIGEST.captures(token)?;
    let algorithm = caps[1].to_ascii_lowercase();
    if algorithm == "md5" || algorithm.ends_with('1') {
        Some(AuthStrength::Weak)
    } else {
        Some(AuthStrength::Strong)
    }
}

/// Classifies an authentication directive from its encoding markers.
///
/// SHA-2 markers are strong, MD5 and SHA-1 weak, `null` means no
/// authentication and anything else carrying a credential is cleartext.
#[must_use]
pub fn classify_directive(directive: &str) -> AuthStrength {
    let tokens = directive.split(|c: char| c.is_whitespace() || c == ';');
    let mut strongest = None;
    let mut null = false;
    let mut any = false;
    for token in tokens.filter(|t| !t.is_empty()) {
        any = true;
        null |= token.eq_ignore_ascii_case("null");
        strongest = strongest.max(marker_strength(token));
    }
    match strongest {
        Some(strength) => strength,
        None if null || !any => AuthStrength::None,
        None => AuthStrength::Cleartext,
    }
}

fn key_strength(key: &ChainKey) -> AuthStrength {
    key.algorithm
        .as_deref()
        .and_then(marker_strength)
        .unwrap_or_else(|| match &key.key_string {
            Some(secret) => classify_directive(secret),
            None => AuthStrength::None,
        })
}

/// Strength of a key chain: that of its weakest key.
#[must_use]
pub fn chain_strength(chain: &KeyChain) -> AuthStrength {
    chain
        .keys
        .iter()
        .map(key_strength)
        .min()
        .unwrap_or(AuthStrength::None)
}

/// Strength of a credential. A reference to an undefined key chain carries
/// no secret and counts as no authentication.
fn credential_strength(
    credential: &Credential,
    chains: &BTreeMap<String, KeyChain>,
    anomalies: &mut Vec<Anomaly>,
) -> AuthStrength {
    let direct = classify_directive(&credential.directive);
    let Some(name) = &credential.key_chain else {
        return direct;
    };
    if let Some(chain) = chains.get(name) {
        direct.max(chain_strength(chain))
    } else {
        anomalies.push(Anomaly::new(
            AnomalyKind::UnresolvedKeyChain,
            credential.scope.as_str(),
            format!("key chain `{name}` is not defined"),
        ));
        AuthStrength::None
    }
}
