//! Management-plane access: dedicated interfaces, remote-access protocols,
//! session timeouts and source restrictions on vty lines.
//!
//! The protocol checks fail closed: a capture that never states a secure
//! setting is treated as running the insecure default.

use netaudit_core::facts::{AclAction, Interface, LineKind, ManagementLine, Resolution};
use netaudit_core::{Assessment, Document, Rule, RuleConfig, RuleError};

const MGMT_NAME_HINTS: &[&str] = &["mgmt", "management"];
const MGMT_DESCRIPTION_HINTS: &[&str] = &["mgmt", "management", "oob"];

/// Returns true for interfaces dedicated to out-of-band management.
///
/// Matches on the interface name, its description, or membership in a VRF
/// named `mgmt`/`management`.
pub(crate) fn is_management_interface(iface: &Interface) -> bool {
    let name = iface.name.to_ascii_lowercase();
    MGMT_NAME_HINTS.iter().any(|h| name.contains(h))
        || iface.description_mentions(MGMT_DESCRIPTION_HINTS)
        || iface
            .vrf
            .as_deref()
            .is_some_and(|vrf| MGMT_NAME_HINTS.iter().any(|h| vrf.eq_ignore_ascii_case(h)))
}

fn vty_lines(doc: &Document) -> impl Iterator<Item = &ManagementLine> {
    doc.lines.iter().filter(|l| l.kind == LineKind::Vty)
}

/// Requires a dedicated management interface.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManagementInterface;

impl Rule for ManagementInterface {
    rule_identity!(
        "NA531",
        "management-interface",
        Management,
        "A dedicated management interface exists"
    );

    fn is_applicable(&self, doc: &Document) -> bool {
        !doc.interfaces.is_empty()
    }

    fn not_applicable_reason(&self) -> &'static str {
        "no interfaces in capture"
    }

    fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError> {
        let mgmt: Vec<String> = doc
            .interfaces
            .values()
            .filter(|i| is_management_interface(i))
            .map(|i| match &i.description {
                Some(desc) => format!("{} ({desc})", i.name),
                None => i.name.clone(),
            })
            .collect();

        Ok(if mgmt.is_empty() {
            Assessment::non_compliant().with_evidence(format!(
                "none of {} interface(s) is dedicated to management",
                doc.interfaces.len()
            ))
        } else {
            Assessment::compliant().with_evidence_lines(mgmt)
        })
    }
}

/// Requires `ip ssh version 2`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SshVersion2;

impl Rule for SshVersion2 {
    rule_identity!(
        "NA532",
        "ssh-version-2",
        Management,
        "SSH is restricted to version 2"
    );

    fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError> {
        Ok(match doc.services.ssh_version {
            Some(2) => Assessment::compliant().with_evidence("ip ssh version 2"),
            Some(v) => Assessment::non_compliant()
                .with_evidence(format!("ip ssh version {v}"))
                .with_detail("ssh_version", u32::from(v)),
            None => Assessment::non_compliant().with_evidence("no ip ssh version 2 directive"),
        })
    }
}

/// Requires every vty line to restrict `transport input` to non-Telnet protocols.
///
/// A vty line without `transport input` accepts Telnet, and a capture with
/// no vty lines proves nothing; both are findings.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisableTelnet;

impl Rule for DisableTelnet {
    rule_identity!("NA533", "disable-telnet", Management, "Telnet is disabled");

    fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError> {
        let mut findings = Vec::new();
        let mut closed = Vec::new();
        for line in vty_lines(doc) {
            match &line.transport_input {
                None => findings.push(format!("{}: no transport input directive", line.label())),
                Some(_) if line.allows_transport("telnet") => {
                    findings.push(format!("{}: transport input allows telnet", line.label()));
                }
                Some(protocols) => closed.push(format!(
                    "{}: transport input {}",
                    line.label(),
                    protocols.iter().map(String::as_str).collect::<Vec<_>>().join(" ")
                )),
            }
        }

        if findings.is_empty() && closed.is_empty() {
            return Ok(Assessment::non_compliant().with_evidence("no vty lines configured"));
        }
        Ok(if findings.is_empty() {
            Assessment::compliant().with_evidence_lines(closed)
        } else {
            Assessment::non_compliant().with_evidence_lines(findings)
        })
    }
}

/// Requires `no ip http server`.
///
/// The HTTPS server is reported but does not affect the verdict.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisableHttp;

impl Rule for DisableHttp {
    rule_identity!(
        "NA534",
        "disable-http",
        Management,
        "The plain HTTP server is disabled"
    );

    fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError> {
        let services = &doc.services;
        let mut assessment = match services.http_server {
            Some(false) => Assessment::compliant().with_evidence("no ip http server"),
            Some(true) => Assessment::non_compliant().with_evidence("ip http server"),
            None => Assessment::non_compliant().with_evidence("no explicit no ip http server"),
        };
        if let Some(https) = services.https_server {
            assessment = assessment
                .with_evidence(if https {
                    "ip http secure-server"
                } else {
                    "no ip http secure-server"
                })
                .with_detail("https_server", https);
        }
        Ok(assessment)
    }
}

/// Requires management sessions to time out.
///
/// The shortest configured `exec-timeout` must be within the ceiling, and
/// no line may disable the timeout (`exec-timeout 0 0` or `no exec-timeout`).
///
/// # Configuration
///
/// - `max_minutes`: longest accepted timeout (default: 15)
#[derive(Debug, Clone)]
pub struct SessionTimeout {
    max_minutes: u32,
}

impl Default for SessionTimeout {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionTimeout {
    /// Creates a new rule with a 15-minute ceiling.
    #[must_use]
    pub fn new() -> Self {
        Self { max_minutes: 15 }
    }

    /// Sets the longest accepted timeout.
    #[must_use]
    pub fn max_minutes(mut self, minutes: u32) -> Self {
        self.max_minutes = minutes;
        self
    }

    /// Reads the `max_minutes` option.
    #[must_use]
    pub fn from_config(config: &RuleConfig) -> Self {
        let rule = Self::new();
        let minutes = config.get_u32("max_minutes", rule.max_minutes);
        rule.max_minutes(minutes)
    }
}

impl Rule for SessionTimeout {
    rule_identity!(
        "NA535",
        "session-timeout",
        Management,
        "Idle management sessions time out"
    );

    fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError> {
        let timeouts: Vec<(&ManagementLine, u32, u32)> = doc
            .lines
            .iter()
            .filter_map(|l| Some((l, l.exec_timeout_minutes?, l.exec_timeout_seconds.unwrap_or(0))))
            .collect();

        let disabled: Vec<String> = timeouts
            .iter()
            .filter(|(_, m, s)| *m == 0 && *s == 0)
            .map(|(l, _, _)| format!("{}: exec-timeout disabled", l.label()))
            .collect();
        let shortest = timeouts
            .iter()
            .filter(|(_, m, s)| *m != 0 || *s != 0)
            .map(|(_, m, _)| *m)
            .min();

        let assessment = match shortest {
            _ if !disabled.is_empty() => Assessment::non_compliant().with_evidence_lines(disabled),
            None => Assessment::non_compliant().with_evidence("no exec-timeout configured"),
            Some(m) => Assessment::from_check(m <= self.max_minutes).with_evidence(format!(
                "shortest exec-timeout {m} minute(s), ceiling {} minute(s)",
                self.max_minutes
            )),
        };

        let mut assessment = assessment.with_detail("threshold", self.max_minutes);
        if let Some(m) = shortest {
            assessment = assessment.with_detail("timeout_minutes", m);
        }
        Ok(assessment)
    }
}

/// Requires a vty `access-class` that permits specific sources only.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManagementAcl;

impl Rule for ManagementAcl {
    rule_identity!(
        "NA536",
        "management-acl",
        Management,
        "Management access is restricted by source address"
    );

    fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError> {
        let mut restricted = Vec::new();
        let mut findings = Vec::new();
        let mut allowed = Vec::new();

        for line in vty_lines(doc) {
            let Some(id) = &line.access_class_acl_id else {
                findings.push(format!("{}: no access-class", line.label()));
                continue;
            };
            let entries = match &line.access_class {
                Resolution::Resolved(entries) => entries,
                Resolution::Unresolved | Resolution::Pending => {
                    findings.push(format!("{}: access-class {id} is not defined", line.label()));
                    continue;
                }
            };
            let sources: Vec<&str> = entries
                .iter()
                .filter(|e| e.action == AclAction::Permit)
                .map(|e| e.source.as_str())
                .collect();
            if sources.is_empty() {
                findings.push(format!("{}: access-class {id} permits nothing", line.label()));
            } else if sources.contains(&"any") {
                findings.push(format!("{}: access-class {id} permits any source", line.label()));
            } else {
                restricted.push(format!(
                    "{}: access-class {id} permits {}",
                    line.label(),
                    sources.join(", ")
                ));
                allowed.extend(sources.iter().map(ToString::to_string));
            }
        }

        Ok(if restricted.is_empty() {
            if findings.is_empty() {
                Assessment::non_compliant().with_evidence("no vty lines configured")
            } else {
                Assessment::non_compliant().with_evidence_lines(findings)
            }
        } else {
            Assessment::compliant()
                .with_evidence_lines(restricted)
                .with_detail("allowed_sources", allowed)
        })
    }
}
