//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# netaudit configuration

# Rule preset: "full", "switching", "routing" or "management"
preset = "full"

# Non-compliant verdicts at or above this severity fail the run
# ("info", "warning" or "error")
fail_on = "error"

[auditor]
# File-name patterns treated as configuration captures
include = ["*.log", "*.txt", "*.cfg", "*.conf"]

# Glob patterns to exclude from discovery
exclude = [
    "**/archive/**",
]

# Respect .gitignore files
respect_gitignore = true

# Captures audited in parallel (default: one per CPU)
# parallelism = 4

# Rule configurations
# Each rule can be disabled, have its severity overridden, and take
# rule-specific thresholds.

[rules.session-timeout]
# severity = "warning"
max_minutes = 15

[rules.password-policy]
min_length = 8

[rules.account-lockout]
max_attempts = 5
min_lockout_minutes = 5

[rules.config-backup]
max_days = 7

[rules.bgp-prefix-limit]
limit = 100

[rules.default-accounts]
names = ["admin", "cisco"]

# [rules.bgp-bogon-filter]
# prefixes = ["10.0.0.0/8", "172.16.0.0/12", "192.168.0.0/16"]

# [rules.firmware-version]
# enabled = false
"#;

const CONFIG_NAME: &str = "netaudit.toml";

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    write_config(Path::new(CONFIG_NAME), force)?;

    println!("Created {CONFIG_NAME}");
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_NAME} to configure rules");
    println!("  2. Run: netaudit audit <captures-dir>");

    Ok(())
}

fn write_config(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use netaudit_core::{Config, Severity};
    use tempfile::TempDir;

    #[test]
    fn default_config_parses() {
        let config = Config::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.preset.as_deref(), Some("full"));
        assert_eq!(config.fail_on(), Severity::Error);
        assert!(config.auditor.respect_gitignore);
        assert_eq!(
            config
                .rule_config("session-timeout")
                .map(|r| r.get_u32("max_minutes", 0)),
            Some(15)
        );
    }

    #[test]
    fn existing_config_is_kept_without_force() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_NAME);
        std::fs::write(&path, "preset = \"routing\"\n").unwrap();

        assert!(write_config(&path, false).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "preset = \"routing\"\n");

        write_config(&path, true).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
    }
}
