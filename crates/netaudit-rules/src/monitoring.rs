//! Time synchronization and log collection.

use netaudit_core::{Assessment, Document, Rule, RuleError, Severity};

/// Requires at least one `ntp server`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NtpServer;

impl Rule for NtpServer {
    rule_identity!(
        "NA610",
        "ntp-server",
        Monitoring,
        "Clock is synchronized with an NTP server"
    );

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError> {
        let servers = &doc.monitoring.ntp_servers;
        Ok(if servers.is_empty() {
            Assessment::non_compliant().with_evidence("no ntp server configured")
        } else {
            Assessment::compliant()
                .with_evidence_lines(servers.iter().map(|s| format!("ntp server {s}")))
                .with_detail("servers", servers.clone())
        })
    }
}

/// Requires log export to at least one collector.
///
/// `no logging on` overrides any configured host.
#[derive(Debug, Clone, Copy, Default)]
pub struct CentralizedLogging;

impl Rule for CentralizedLogging {
    rule_identity!(
        "NA620",
        "centralized-logging",
        Monitoring,
        "Logs are sent to a central collector"
    );

    fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError> {
        let monitoring = &doc.monitoring;
        let hosts = &monitoring.logging_hosts;

        let assessment = if monitoring.logging_enabled == Some(false) {
            Assessment::non_compliant().with_evidence("no logging on")
        } else if hosts.is_empty() {
            Assessment::non_compliant().with_evidence("no logging host configured")
        } else {
            Assessment::compliant()
                .with_evidence_lines(hosts.iter().map(|h| format!("logging host {h}")))
        };
        Ok(assessment.with_detail("hosts", hosts.clone()))
    }
}
