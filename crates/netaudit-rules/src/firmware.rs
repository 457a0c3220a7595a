//! Firmware identification.

use netaudit_core::{Assessment, Document, Rule, RuleError, Severity};

/// Requires `show version` output that identifies the running firmware.
///
/// IOS-XE is reported in preference to classic IOS when a capture mentions
/// both.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirmwareVersion;

impl Rule for FirmwareVersion {
    rule_identity!(
        "NA110",
        "firmware-version",
        Platform,
        "Running firmware version is identified"
    );

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError> {
        Ok(match &doc.firmware {
            Some(firmware) => Assessment::compliant()
                .with_evidence(format!("{} version {}", firmware.platform, firmware.version))
                .with_detail("platform", firmware.platform.to_string())
                .with_detail("version", firmware.version.as_str()),
            None => Assessment::non_compliant()
                .with_evidence("no IOS or IOS-XE version found in show version output"),
        })
    }
}
