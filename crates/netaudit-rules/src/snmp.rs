//! SNMP agent hardening.
//!
//! Every check here is not applicable when the capture carries no
//! `snmp-server` directive at all.

use netaudit_core::facts::{Resolution, SnmpPermission};
use netaudit_core::{Assessment, Document, Rule, RuleError};

const NO_SNMP: &str = "SNMP is not configured";

/// Community strings shipped as vendor defaults.
const DEFAULT_COMMUNITIES: &[&str] = &["public", "private"];

/// Requires at least one SNMPv3 group.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnmpV3;

impl Rule for SnmpV3 {
    rule_identity!("NA631", "snmp-v3", Snmp, "SNMP uses version 3");

    fn is_applicable(&self, doc: &Document) -> bool {
        doc.snmp.is_configured
    }

    fn not_applicable_reason(&self) -> &'static str {
        NO_SNMP
    }

    fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError> {
        let groups = &doc.snmp.groups_v3;
        let assessment = if groups.is_empty() {
            Assessment::non_compliant().with_evidence("no snmp-server group ... v3")
        } else {
            Assessment::compliant()
                .with_evidence_lines(groups.iter().map(|g| format!("snmp-server group {g} v3")))
        };
        Ok(assessment.with_detail("v2c_communities", doc.snmp.communities.len()))
    }
}

/// Forbids read-write communities.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnmpReadOnly;

impl Rule for SnmpReadOnly {
    rule_identity!("NA632", "snmp-read-only", Snmp, "SNMP communities are read-only");

    fn is_applicable(&self, doc: &Document) -> bool {
        doc.snmp.is_configured
    }

    fn not_applicable_reason(&self) -> &'static str {
        NO_SNMP
    }

    fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError> {
        let (rw, ro): (Vec<_>, Vec<_>) = doc
            .snmp
            .communities
            .iter()
            .partition(|c| c.permission == SnmpPermission::ReadWrite);

        Ok(if rw.is_empty() {
            Assessment::compliant().with_evidence(format!("{} community(ies), all RO", ro.len()))
        } else {
            Assessment::non_compliant()
                .with_evidence_lines(rw.iter().map(|c| format!("snmp-server community {} RW", c.name)))
                .with_detail("rw_communities", rw.len())
        })
    }
}

/// Forbids the `public` and `private` community strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnmpDefaultCommunity;

impl Rule for SnmpDefaultCommunity {
    rule_identity!(
        "NA633",
        "snmp-default-community",
        Snmp,
        "Default SNMP community strings are not used"
    );

    fn is_applicable(&self, doc: &Document) -> bool {
        doc.snmp.is_configured
    }

    fn not_applicable_reason(&self) -> &'static str {
        NO_SNMP
    }

    fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError> {
        let defaults: Vec<String> = doc
            .snmp
            .communities
            .iter()
            .filter(|c| DEFAULT_COMMUNITIES.iter().any(|d| c.name.eq_ignore_ascii_case(d)))
            .map(|c| format!("snmp-server community {} {}", c.name, c.permission))
            .collect();

        Ok(if defaults.is_empty() {
            Assessment::compliant().with_evidence("no public or private community")
        } else {
            Assessment::non_compliant().with_evidence_lines(defaults)
        })
    }
}

/// Requires SNMP notifications to target explicit hosts.
///
/// Community ACLs are reported alongside the hosts.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnmpHostRestriction;

impl Rule for SnmpHostRestriction {
    rule_identity!(
        "NA634",
        "snmp-host-restriction",
        Snmp,
        "SNMP is restricted to known hosts"
    );

    fn is_applicable(&self, doc: &Document) -> bool {
        doc.snmp.is_configured
    }

    fn not_applicable_reason(&self) -> &'static str {
        NO_SNMP
    }

    fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError> {
        let snmp = &doc.snmp;
        let acls = snmp.communities.iter().filter_map(|c| {
            let acl = c.acl.as_deref()?;
            Some(match &c.acl_entries {
                Resolution::Resolved(entries) => format!(
                    "community {} restricted by ACL {acl} ({} entries)",
                    c.name,
                    entries.len()
                ),
                Resolution::Unresolved | Resolution::Pending => {
                    format!("community {} references undefined ACL {acl}", c.name)
                }
            })
        });

        let assessment = if snmp.hosts.is_empty() {
            Assessment::non_compliant().with_evidence("no snmp-server host configured")
        } else {
            Assessment::compliant()
                .with_evidence_lines(snmp.hosts.iter().map(|h| format!("snmp-server host {h}")))
        };
        Ok(assessment.with_evidence_lines(acls).with_detail(
            "hosts",
            snmp.hosts.iter().map(ToString::to_string).collect::<Vec<_>>(),
        ))
    }
}
