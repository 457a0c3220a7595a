//! Shared output formatting for audit results.

use anyhow::Result;
use netaudit_core::{AuditResult, DocumentReport, Severity, Status, Verdict};
use serde::Serialize;
use std::fmt::Write;

use crate::OutputFormat;

/// Print audit results in the specified format.
pub fn print(result: &AuditResult, format: OutputFormat, fail_on: Severity) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", render_text(result, fail_on)),
        OutputFormat::Json => println!("{}", render_json(result, fail_on)?),
        OutputFormat::Compact => print!("{}", render_compact(result)),
    }
    Ok(())
}

fn render_text(result: &AuditResult, fail_on: Severity) -> String {
    let mut out = String::new();

    for report in &result.reports {
        let _ = writeln!(out, "\x1b[1m{}\x1b[0m", report.identifier);
        for verdict in report.verdicts.iter().filter(|v| v.status == Status::NonCompliant) {
            write_verdict(&mut out, verdict);
        }
        let (compliant, non_compliant, not_applicable) = count(report);
        let _ = writeln!(
            out,
            "  {compliant} compliant, {non_compliant} non-compliant, {not_applicable} not applicable\n"
        );
    }

    let (compliant, non_compliant, not_applicable) = result.count_by_status();
    let summary_color = if result.has_failures_at(fail_on) {
        "\x1b[31m"
    } else if non_compliant > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    let _ = writeln!(
        out,
        "{}{} compliant, {} non-compliant, {} not applicable in {} document(s)\x1b[0m",
        summary_color, compliant, non_compliant, not_applicable, result.documents_checked
    );
    out
}

fn write_verdict(out: &mut String, verdict: &Verdict) {
    let severity_indicator = match verdict.severity {
        Severity::Error => "\x1b[31merror\x1b[0m",
        Severity::Warning => "\x1b[33mwarning\x1b[0m",
        Severity::Info => "\x1b[34minfo\x1b[0m",
    };

    let _ = writeln!(out, "  {} {}", verdict.rule_id, verdict.rule);
    let _ = writeln!(out, "    {}: {}", severity_indicator, verdict.title);
    for line in &verdict.evidence {
        let _ = writeln!(out, "    | {line}");
    }
    for (key, value) in &verdict.details {
        let _ = writeln!(out, "    = {key}: {value}");
    }
}

fn count(report: &DocumentReport) -> (usize, usize, usize) {
    let by = |status| report.verdicts.iter().filter(|v| v.status == status).count();
    (
        by(Status::Compliant),
        by(Status::NonCompliant),
        by(Status::NotApplicable),
    )
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    result: &'a AuditResult,
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonSummary {
    compliant: usize,
    non_compliant: usize,
    not_applicable: usize,
    fail_on: Severity,
    failed: bool,
}

fn render_json(result: &AuditResult, fail_on: Severity) -> Result<String> {
    let (compliant, non_compliant, not_applicable) = result.count_by_status();
    let report = JsonReport {
        result,
        summary: JsonSummary {
            compliant,
            non_compliant,
            not_applicable,
            fail_on,
            failed: result.has_failures_at(fail_on),
        },
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

fn render_compact(result: &AuditResult) -> String {
    let mut out = String::new();
    for report in &result.reports {
        for verdict in &report.verdicts {
            let _ = writeln!(out, "{}: {} {}", report.identifier, verdict.severity, verdict);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use netaudit_core::Auditor;
    use netaudit_rules::{DisableTelnet, NtpServer, SnmpV3, SshVersion2};

    const CAPTURE: &str = "hostname SW1\nip ssh version 2\nline vty 0 4\n transport input telnet ssh\n!\n";

    fn audit() -> AuditResult {
        let auditor = Auditor::builder()
            .rule(SshVersion2)
            .rule(DisableTelnet)
            .rule(NtpServer)
            .rule(SnmpV3)
            .parallelism(1)
            .build()
            .unwrap();
        auditor.audit_all(&[("sw1.log".to_string(), CAPTURE.to_string())])
    }

    #[test]
    fn compact_output_is_one_line_per_verdict() {
        insta::assert_snapshot!(render_compact(&audit()), @r"
        sw1.log: error [NA532] ssh-version-2 compliant: SSH is restricted to version 2 (ip ssh version 2)
        sw1.log: error [NA533] disable-telnet non-compliant: Telnet is disabled (line vty 0 4: transport input allows telnet)
        sw1.log: warning [NA610] ntp-server non-compliant: Clock is synchronized with an NTP server (no ntp server configured)
        sw1.log: error [NA631] snmp-v3 not applicable: SNMP uses version 3 (SNMP is not configured)
        ");
    }

    #[test]
    fn text_output_lists_only_findings() {
        let text = render_text(&audit(), Severity::Error);
        assert!(text.contains("NA533 disable-telnet"));
        assert!(text.contains("| line vty 0 4: transport input allows telnet"));
        assert!(!text.contains("NA532"));
        assert!(text.contains("1 compliant, 2 non-compliant, 1 not applicable in 1 document(s)"));
    }

    #[test]
    fn json_output_carries_summary() {
        let json = render_json(&audit(), Severity::Error).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["documents_checked"], 1);
        assert_eq!(value["summary"]["non_compliant"], 2);
        assert_eq!(value["summary"]["fail_on"], "error");
        assert_eq!(value["summary"]["failed"], true);
        assert_eq!(value["reports"][0]["verdicts"][1]["status"], "non_compliant");
    }

    #[test]
    fn warnings_alone_do_not_fail_at_error() {
        let auditor = Auditor::builder().rule(NtpServer).build().unwrap();
        let result = auditor.audit_all(&[("r1.log".to_string(), "hostname R1\n".to_string())]);
        let json = render_json(&result, Severity::Error).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["summary"]["failed"], false);
    }
}
