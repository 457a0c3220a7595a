//! Routing and gateway authentication.
//!
//! Credentials are classified by the resolver; these rules only read
//! [`AuthStrength`] annotations. A missing credential and a weak one are
//! distinct findings and are told apart by the `reason` detail.

use netaudit_core::facts::{AuthStrength, Credential, Neighbor, Protocol, ProtocolKind};
use netaudit_core::resolve::classify_directive;
use netaudit_core::{Assessment, Document, Rule, RuleError};

const MISSING: &str = "missing";
const WEAK: &str = "weak";

fn is_weak(strength: Option<AuthStrength>) -> bool {
    strength.is_some_and(|s| s < AuthStrength::Strong && s > AuthStrength::None)
}

fn is_present(strength: Option<AuthStrength>) -> bool {
    strength.is_some_and(|s| s > AuthStrength::None)
}

fn describe(credential: &Credential) -> String {
    let strength = credential.strength.unwrap_or(AuthStrength::None);
    format!(
        "{} {}: {} ({strength})",
        credential.protocol, credential.scope, credential.directive
    )
}

fn bgp_process(doc: &Document) -> Result<&Protocol, RuleError> {
    doc.bgp()
        .ok_or_else(|| RuleError::MissingFact("router bgp".to_string()))
}

fn active_neighbors(doc: &Document) -> impl Iterator<Item = &Neighbor> {
    doc.bgp()
        .into_iter()
        .flat_map(|bgp| bgp.neighbors.values())
        .filter(|n| !n.shutdown)
}

/// Requires authentication on every HSRP, VRRP and GLBP group.
#[derive(Debug, Clone, Copy, Default)]
pub struct FhrpAuthentication;

impl Rule for FhrpAuthentication {
    rule_identity!(
        "NA411",
        "fhrp-authentication",
        Routing,
        "First-hop redundancy groups are authenticated"
    );

    fn is_applicable(&self, doc: &Document) -> bool {
        doc.interfaces.values().any(|i| !i.fhrp_groups.is_empty())
    }

    fn not_applicable_reason(&self) -> &'static str {
        "no HSRP, VRRP or GLBP groups"
    }

    fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError> {
        let mut missing = Vec::new();
        let mut present = Vec::new();
        for iface in doc.interfaces.values() {
            for group in &iface.fhrp_groups {
                let label = format!("{}: {} group {}", iface.name, group.protocol, group.group);
                match &group.authentication {
                    Some(auth) if classify_directive(auth) > AuthStrength::None => {
                        present.push(format!("{label} authentication {auth}"));
                    }
                    _ => missing.push(format!("{label} without authentication")),
                }
            }
        }

        Ok(if missing.is_empty() {
            Assessment::compliant().with_evidence_lines(present)
        } else {
            Assessment::non_compliant()
                .with_detail("unauthenticated_groups", missing.len())
                .with_evidence_lines(missing)
                .with_detail("reason", MISSING)
        })
    }
}

/// Requires authentication for every configured interior gateway protocol.
///
/// A protocol passes when it has at least one credential other than `null`
/// and none of its credentials is weak or cleartext.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgpAuthentication;

impl IgpAuthentication {
    fn igps(doc: &Document) -> impl Iterator<Item = ProtocolKind> + '_ {
        doc.routing_protocols.keys().copied().filter(|k| k.is_igp())
    }
}

impl Rule for IgpAuthentication {
    rule_identity!(
        "NA412",
        "igp-authentication",
        Routing,
        "Interior routing protocols authenticate their peers"
    );

    fn is_applicable(&self, doc: &Document) -> bool {
        Self::igps(doc).next().is_some()
    }

    fn not_applicable_reason(&self) -> &'static str {
        "no interior routing protocol configured"
    }

    fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError> {
        if Self::igps(doc).next().is_none() {
            return Err(RuleError::MissingFact("interior routing protocol".to_string()));
        }
        let mut unauthenticated = Vec::new();
        let mut weak = Vec::new();
        let mut evidence = Vec::new();

        for kind in Self::igps(doc) {
            let credentials = doc.credentials(kind);
            if !credentials.iter().any(|c| is_present(c.strength)) {
                unauthenticated.push(kind.to_string());
                evidence.push(format!("{kind}: no authentication configured"));
                evidence.extend(credentials.into_iter().map(describe));
                continue;
            }
            for credential in credentials {
                if is_weak(credential.strength) {
                    weak.push(kind.to_string());
                }
                evidence.push(describe(credential));
            }
        }
        weak.dedup();

        let assessment = if !unauthenticated.is_empty() {
            Assessment::non_compliant().with_detail("reason", MISSING)
        } else if !weak.is_empty() {
            Assessment::non_compliant().with_detail("reason", WEAK)
        } else {
            Assessment::compliant()
        };
        Ok(assessment
            .with_evidence_lines(evidence)
            .with_detail("unauthenticated", unauthenticated)
            .with_detail("weak", weak))
    }
}

/// Requires authentication on every active BGP session.
///
/// Neighbors inherit `password` and TCP-AO from their peer group.
#[derive(Debug, Clone, Copy, Default)]
pub struct BgpAuthentication;

impl Rule for BgpAuthentication {
    rule_identity!(
        "NA413",
        "bgp-authentication",
        Bgp,
        "BGP sessions are authenticated"
    );

    fn is_applicable(&self, doc: &Document) -> bool {
        doc.bgp().is_some()
    }

    fn not_applicable_reason(&self) -> &'static str {
        "no router bgp block"
    }

    fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError> {
        let bgp = bgp_process(doc)?;
        let mut missing = Vec::new();
        let mut weak = Vec::new();
        let mut evidence = Vec::new();

        for neighbor in bgp.neighbors.values().filter(|n| !n.shutdown) {
            let strength = neighbor.auth_strength.unwrap_or(AuthStrength::None);
            match strength {
                AuthStrength::None => {
                    missing.push(neighbor.address.clone());
                    evidence.push(format!("neighbor {}: no password or TCP-AO", neighbor.address));
                }
                AuthStrength::Cleartext | AuthStrength::Weak => {
                    weak.push(neighbor.address.clone());
                    evidence.push(format!("neighbor {}: {strength} authentication", neighbor.address));
                }
                AuthStrength::Strong => {
                    evidence.push(format!("neighbor {}: strong authentication", neighbor.address));
                }
            }
        }

        if evidence.is_empty() {
            return Ok(Assessment::compliant().with_evidence("no active BGP neighbors"));
        }
        let assessment = if !missing.is_empty() {
            Assessment::non_compliant().with_detail("reason", MISSING)
        } else if !weak.is_empty() {
            Assessment::non_compliant().with_detail("reason", WEAK)
        } else {
            Assessment::compliant()
        };
        Ok(assessment
            .with_evidence_lines(evidence)
            .with_detail("unauthenticated", missing)
            .with_detail("weak", weak))
    }
}

/// Requires every routing credential to use a SHA-2 digest or TCP-AO.
///
/// Covers process and interface credentials of every protocol as well as BGP
/// session passwords. Cleartext and MD5/SHA-1 credentials are reported with
/// distinct reasons.
#[derive(Debug, Clone, Copy, Default)]
pub struct CredentialStrength;

impl CredentialStrength {
    fn findings(doc: &Document) -> Vec<(String, AuthStrength)> {
        let mut found: Vec<(String, AuthStrength)> = doc
            .routing_protocols
            .keys()
            .flat_map(|kind| doc.credentials(*kind))
            .map(|c| (describe(c), c.strength.unwrap_or(AuthStrength::None)))
            .collect();
        found.extend(
            active_neighbors(doc)
                .filter(|n| n.password.is_some() || n.tcp_ao.is_some())
                .map(|n| {
                    let strength = n.auth_strength.unwrap_or(AuthStrength::None);
                    (format!("BGP neighbor {} ({strength})", n.address), strength)
                }),
        );
        found
    }
}

impl Rule for CredentialStrength {
    rule_identity!(
        "NA414",
        "credential-strength",
        Routing,
        "Routing credentials use strong digests"
    );

    fn is_applicable(&self, doc: &Document) -> bool {
        !Self::findings(doc).is_empty()
    }

    fn not_applicable_reason(&self) -> &'static str {
        "no routing credentials configured"
    }

    fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError> {
        let findings = Self::findings(doc);
        let weakest = findings
            .iter()
            .map(|(_, s)| *s)
            .min()
            .unwrap_or(AuthStrength::None);
        let (strong, not_strong): (Vec<_>, Vec<_>) = findings
            .into_iter()
            .partition(|(_, s)| *s == AuthStrength::Strong);

        let assessment = if not_strong.is_empty() {
            Assessment::compliant().with_evidence_lines(strong.into_iter().map(|(e, _)| e))
        } else {
            let reason = if weakest <= AuthStrength::Cleartext {
                "cleartext"
            } else {
                WEAK
            };
            Assessment::non_compliant()
                .with_detail("reason", reason)
                .with_detail("non_compliant_credentials", not_strong.len())
                .with_evidence_lines(not_strong.into_iter().map(|(e, _)| e))
        };
        Ok(assessment.with_detail("weakest", weakest.to_string()))
    }
}
