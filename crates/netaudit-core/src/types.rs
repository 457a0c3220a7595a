//! Core types for verdicts and audit results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Severity level of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational finding, never fails an audit.
    Info,
    /// Hardening gap that should be addressed.
    Warning,
    /// Hardening gap that must be fixed.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Three-valued outcome of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// The configuration satisfies the rule.
    Compliant,
    /// The configuration violates the rule.
    NonCompliant,
    /// The rule does not apply to this device.
    NotApplicable,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compliant => write!(f, "compliant"),
            Self::NonCompliant => write!(f, "non-compliant"),
            Self::NotApplicable => write!(f, "not applicable"),
        }
    }
}

/// A value in a verdict's details map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetailValue {
    /// Flag.
    Bool(bool),
    /// Measured value or threshold.
    Int(i64),
    /// Free text.
    Text(String),
    /// List of names.
    List(Vec<String>),
}

impl fmt::Display for DetailValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

impl From<bool> for DetailValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for DetailValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for DetailValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<usize> for DetailValue {
    fn from(value: usize) -> Self {
        Self::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<&str> for DetailValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for DetailValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for DetailValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// What a rule concluded, before the evaluator stamps rule metadata on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    /// Outcome.
    pub status: Status,
    /// Evidence lines, in display order.
    pub evidence: Vec<String>,
    /// Measured values and thresholds.
    pub details: BTreeMap<String, DetailValue>,
}

impl Assessment {
    fn with_status(status: Status) -> Self {
        Self {
            status,
            evidence: Vec::new(),
            details: BTreeMap::new(),
        }
    }

    /// A compliant outcome.
    #[must_use]
    pub fn compliant() -> Self {
        Self::with_status(Status::Compliant)
    }

    /// A non-compliant outcome.
    #[must_use]
    pub fn non_compliant() -> Self {
        Self::with_status(Status::NonCompliant)
    }

    /// A not-applicable outcome with its reason as evidence.
    #[must_use]
    pub fn not_applicable(reason: impl Into<String>) -> Self {
        Self::with_status(Status::NotApplicable).with_evidence(reason)
    }

    /// Compliant when `ok`, non-compliant otherwise.
    #[must_use]
    pub fn from_check(ok: bool) -> Self {
        if ok {
            Self::compliant()
        } else {
            Self::non_compliant()
        }
    }

    /// Appends one evidence line.
    #[must_use]
    pub fn with_evidence(mut self, line: impl Into<String>) -> Self {
        self.evidence.push(line.into());
        self
    }

    /// Appends several evidence lines.
    #[must_use]
    pub fn with_evidence_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.evidence.extend(lines.into_iter().map(Into::into));
        self
    }

    /// Sets a detail.
    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<DetailValue>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// The outcome of one rule against one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Rule code (e.g., "NA533").
    pub rule_id: String,
    /// Rule name (e.g., "disable-telnet").
    pub rule: String,
    /// Rule title.
    pub title: String,
    /// Effective severity.
    pub severity: Severity,
    /// Outcome.
    pub status: Status,
    /// Supporting evidence; never empty unless compliant.
    pub evidence: Vec<String>,
    /// Measured values and thresholds.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, DetailValue>,
}

impl Verdict {
    /// Returns true when the verdict is non-compliant at or above `severity`.
    #[must_use]
    pub fn fails_at(&self, severity: Severity) -> bool {
        self.status == Status::NonCompliant && self.severity >= severity
    }

    /// Formats the verdict for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut output = format!("{} {} [{}]\n", self.rule_id, self.rule, self.status);
        let _ = writeln!(output, "  {}: {}", self.severity, self.title);
        for line in &self.evidence {
            let _ = writeln!(output, "  | {line}");
        }
        for (key, value) in &self.details {
            let _ = writeln!(output, "  = {key}: {value}");
        }
        output
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}: {}",
            self.rule_id, self.rule, self.status, self.title
        )?;
        if let Some(first) = self.evidence.first() {
            write!(f, " ({first})")?;
        }
        Ok(())
    }
}

/// Verdicts for one input document, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentReport {
    /// Caller-supplied identifier (usually the file path).
    pub identifier: String,
    /// Verdicts.
    pub verdicts: Vec<Verdict>,
}

/// Result of an audit run.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AuditResult {
    /// Per-document reports, in input order.
    pub reports: Vec<DocumentReport>,
    /// Number of documents audited.
    pub documents_checked: usize,
}

impl AuditResult {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterates over all verdicts of all documents.
    pub fn verdicts(&self) -> impl Iterator<Item = &Verdict> {
        self.reports.iter().flat_map(|r| r.verdicts.iter())
    }

    /// Counts verdicts as (compliant, non-compliant, not applicable).
    #[must_use]
    pub fn count_by_status(&self) -> (usize, usize, usize) {
        let count = |status| self.verdicts().filter(|v| v.status == status).count();
        (
            count(Status::Compliant),
            count(Status::NonCompliant),
            count(Status::NotApplicable),
        )
    }

    /// Checks if any non-compliant verdict meets or exceeds the severity threshold.
    #[must_use]
    pub fn has_failures_at(&self, severity: Severity) -> bool {
        self.verdicts().any(|v| v.fails_at(severity))
    }

    /// Formats failing verdicts as a plain multi-line report.
    #[must_use]
    pub fn format_report(&self, fail_on: Severity) -> String {
        use std::fmt::Write;

        let mut report = String::new();
        for doc in &self.reports {
            let failing: Vec<&Verdict> =
                doc.verdicts.iter().filter(|v| v.fails_at(fail_on)).collect();
            if failing.is_empty() {
                continue;
            }
            let _ = writeln!(
                report,
                "\n=== {}: {} finding(s) ===\n",
                doc.identifier,
                failing.len()
            );
            for verdict in failing {
                let _ = writeln!(report, "{}", verdict.format());
            }
        }

        let (compliant, non_compliant, not_applicable) = self.count_by_status();
        let _ = writeln!(
            report,
            "Total: {} compliant, {} non-compliant, {} not applicable in {} document(s)",
            compliant, non_compliant, not_applicable, self.documents_checked
        );
        report
    }

    /// Adds reports from another result.
    pub fn extend(&mut self, other: Self) {
        self.reports.extend(other.reports);
        self.documents_checked += other.documents_checked;
    }
}
