//! Configuration types for netaudit.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::types::Severity;

/// Top-level configuration for netaudit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Preset to use ("full", "switching", "routing", "management").
    #[serde(default)]
    pub preset: Option<String>,

    /// Severity threshold for a failing exit status (default: "error").
    /// Non-compliant verdicts at or above this severity fail the run.
    #[serde(default)]
    pub fail_on: Option<Severity>,

    /// Auditor configuration.
    #[serde(default)]
    pub auditor: AuditorConfig,

    /// Per-rule configurations, keyed by rule name.
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,
}

impl Config {
    /// Creates a configuration with every default in place.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads and parses a `netaudit.toml` file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read and
    /// [`ConfigError::Parse`] when it is not valid.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for invalid TOML or unknown severities.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.message().to_string(),
        })
    }

    /// Rules are enabled unless their table says `enabled = false`.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_name: &str) -> bool {
        self.rule_config(rule_name)
            .and_then(|c| c.enabled)
            .unwrap_or(true)
    }

    /// Severity configured for a rule, if overridden.
    #[must_use]
    pub fn rule_severity(&self, rule_name: &str) -> Option<Severity> {
        self.rule_config(rule_name).and_then(|c| c.severity)
    }

    /// The `[rules.<name>]` table of a rule.
    #[must_use]
    pub fn rule_config(&self, rule_name: &str) -> Option<&RuleConfig> {
        self.rules.get(rule_name)
    }

    /// Severity at which non-compliant verdicts fail a run (default: error).
    #[must_use]
    pub fn fail_on(&self) -> Severity {
        self.fail_on.unwrap_or(Severity::Error)
    }
}

/// Auditor-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditorConfig {
    /// File-name glob patterns to audit.
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    /// Glob patterns to exclude from discovery.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Whether to respect .gitignore files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,

    /// Number of documents audited in parallel (default: one per CPU).
    #[serde(default)]
    pub parallelism: Option<usize>,
}

impl Default for AuditorConfig {
    fn default() -> Self {
        Self {
            include: default_include(),
            exclude: Vec::new(),
            respect_gitignore: true,
            parallelism: None,
        }
    }
}

fn default_include() -> Vec<String> {
    ["*.log", "*.txt", "*.cfg", "*.conf"]
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn default_true() -> bool {
    true
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this rule.
    #[serde(default)]
    pub severity: Option<Severity>,

    /// Rule-specific options (thresholds, name lists) as key-value pairs.
    #[serde(flatten)]
    pub options: HashMap<String, toml::Value>,
}

impl RuleConfig {
    /// Gets a non-negative integer option, falling back to `default` when
    /// the value is missing, negative, too large or not an integer.
    #[must_use]
    pub fn get_u32(&self, key: &str, default: u32) -> u32 {
        self.options
            .get(key)
            .and_then(toml::Value::as_integer)
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(default)
    }

    /// Gets a list of names; non-string items are skipped and a missing key
    /// yields an empty list.
    #[must_use]
    pub fn get_str_array(&self, key: &str) -> Vec<String> {
        let Some(items) = self.options.get(key).and_then(toml::Value::as_array) else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(toml::Value::as_str)
            .map(String::from)
            .collect()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The file is not valid netaudit TOML.
    #[error("invalid netaudit config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.auditor.respect_gitignore);
        assert!(config.auditor.include.contains(&"*.log".to_string()));
        assert!(config.rules.is_empty());
        assert_eq!(config.fail_on(), Severity::Error);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
preset = "switching"
fail_on = "warning"

[auditor]
include = ["*.log"]
exclude = ["**/archive/**"]
parallelism = 4

[rules.session-timeout]
severity = "warning"
max_minutes = 10

[rules.snmp-v3]
enabled = false

[rules.default-accounts]
names = ["admin", "cisco", "root"]
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.preset.as_deref(), Some("switching"));
        assert_eq!(config.fail_on(), Severity::Warning);
        assert_eq!(config.auditor.include, vec!["*.log"]);
        assert_eq!(config.auditor.parallelism, Some(4));
        assert!(config.is_rule_enabled("session-timeout"));
        assert!(!config.is_rule_enabled("snmp-v3"));
        assert_eq!(config.rule_severity("session-timeout"), Some(Severity::Warning));

        let timeout = config.rule_config("session-timeout").expect("rule config");
        assert_eq!(timeout.get_u32("max_minutes", 15), 10);
        assert_eq!(timeout.get_u32("missing", 15), 15);

        let accounts = config.rule_config("default-accounts").expect("rule config");
        assert_eq!(accounts.get_str_array("names").len(), 3);
    }

    #[test]
    fn negative_thresholds_fall_back_to_default() {
        let config = Config::parse("[rules.bgp-prefix-limit]\nlimit = -1\n").expect("parses");
        let rule = config.rule_config("bgp-prefix-limit").expect("rule config");
        assert_eq!(rule.get_u32("limit", 100), 100);
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let err = Config::parse("fail_on = [").expect_err("invalid");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
