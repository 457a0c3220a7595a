//! Configuration archiving.

use netaudit_core::{Assessment, Document, Rule, RuleConfig, RuleError, Severity};

/// URL schemes that place the archive on a remote server.
const REMOTE_SCHEMES: &[&str] = &["ftp", "scp", "tftp", "sftp"];

/// Requires `archive` to write to a remote server at least every few days.
///
/// # Configuration
///
/// - `max_days`: longest accepted archive period (default: 7)
#[derive(Debug, Clone)]
pub struct ConfigBackup {
    max_days: u32,
}

impl Default for ConfigBackup {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBackup {
    /// Creates a new rule with a weekly ceiling.
    #[must_use]
    pub fn new() -> Self {
        Self { max_days: 7 }
    }

    /// Sets the longest accepted archive period.
    #[must_use]
    pub fn max_days(mut self, days: u32) -> Self {
        self.max_days = days;
        self
    }

    /// Reads the `max_days` option.
    #[must_use]
    pub fn from_config(config: &RuleConfig) -> Self {
        let rule = Self::new();
        let days = config.get_u32("max_days", rule.max_days);
        rule.max_days(days)
    }

    fn is_remote(path: &str) -> bool {
        let lower = path.to_ascii_lowercase();
        lower
            .split_once(':')
            .is_some_and(|(scheme, _)| REMOTE_SCHEMES.contains(&scheme))
    }
}

impl Rule for ConfigBackup {
    rule_identity!(
        "NA510",
        "config-backup",
        Management,
        "Configuration is archived to a remote server"
    );

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError> {
        let backup = &doc.backup;
        let mut findings = Vec::new();
        let mut evidence = Vec::new();

        match backup.archive_path.as_deref() {
            None => findings.push("no archive path configured".to_string()),
            Some(path) if Self::is_remote(path) => evidence.push(format!("archive path {path}")),
            Some(path) => findings.push(format!("archive path {path} is not a remote server")),
        }

        match backup.archive_period_days {
            None => findings.push("no archive time-period configured".to_string()),
            Some(days) if days <= self.max_days => {
                evidence.push(format!("archive every {days} day(s)"));
            }
            Some(days) => findings.push(format!(
                "archive every {days} day(s), longer than {} day(s)",
                self.max_days
            )),
        }

        if backup.write_memory {
            evidence.push("archive on write-memory".to_string());
        }

        let assessment = if findings.is_empty() {
            Assessment::compliant().with_evidence_lines(evidence)
        } else {
            Assessment::non_compliant().with_evidence_lines(findings)
        };
        let mut assessment = assessment.with_detail("max_days", self.max_days);
        if let Some(days) = backup.archive_period_days {
            assessment = assessment.with_detail("period_days", days);
        }
        Ok(assessment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::check;
    use netaudit_core::{DetailValue, Status};

    #[test]
    fn remote_daily_archive_passes() {
        let a = check(
            &ConfigBackup::new(),
            "archive\n path scp://backup@192.0.2.10/configs/$h-$t\n time-period 1440\n write-memory\n!\n",
        );
        assert_eq!(a.status, Status::Compliant);
        assert_eq!(a.details.get("period_days"), Some(&DetailValue::Int(1)));
        assert!(a.evidence.contains(&"archive on write-memory".to_string()));
    }

    #[test]
    fn local_path_fails() {
        let a = check(
            &ConfigBackup::new(),
            "archive\n path flash:archive\n time-period 1440\n!\n",
        );
        assert_eq!(a.status, Status::NonCompliant);
        assert_eq!(a.evidence, vec!["archive path flash:archive is not a remote server"]);
    }

    #[test]
    fn monthly_period_exceeds_ceiling() {
        let text = "archive\n path tftp://192.0.2.10/r1\n time-period 43200\n!\n";
        let a = check(&ConfigBackup::new(), text);
        assert_eq!(a.status, Status::NonCompliant);
        assert_eq!(a.evidence, vec!["archive every 30 day(s), longer than 7 day(s)"]);

        assert_eq!(check(&ConfigBackup::new().max_days(30), text).status, Status::Compliant);
    }

    #[test]
    fn missing_archive_reports_both_gaps() {
        let a = check(&ConfigBackup::new(), "hostname R1\n");
        assert_eq!(a.status, Status::NonCompliant);
        assert_eq!(a.evidence.len(), 2);
    }
}
