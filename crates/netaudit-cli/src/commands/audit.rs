//! Audit command implementation.

use anyhow::{bail, Context, Result};
use netaudit_core::{Auditor, AuditorConfig, Config, RuleBox};
use netaudit_rules::{configured_rules, Preset};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Options of the audit subcommand.
#[derive(Debug, Clone, Default)]
pub struct AuditOptions {
    /// Report format.
    pub format: OutputFormat,
    /// Comma-separated rule names or codes to keep.
    pub rules: Option<String>,
    /// Extra exclude patterns from the command line.
    pub exclude: Vec<String>,
    /// Preset name overriding the configured one.
    pub preset: Option<String>,
}

/// Runs the audit command.
///
/// Returns `true` when a non-compliant verdict reaches the `fail_on`
/// severity.
pub fn run(path: &Path, options: &AuditOptions, source: &ConfigSource) -> Result<bool> {
    let config = load_config(source)?;

    let preset = resolve_preset(options.preset.as_deref(), config.preset.as_deref())?;
    let mut rules = configured_rules(preset, &config);
    if let Some(filter) = &options.rules {
        let names: Vec<&str> = filter.split(',').map(str::trim).collect();
        rules = filter_rules(rules, &names);
    }

    let files = discover_files(path, &config.auditor, &options.exclude)?;
    if files.is_empty() {
        warn!("No configuration captures found under {}", path.display());
    }
    let inputs = read_inputs(&files)?;

    let fail_on = config.fail_on();
    let auditor = Auditor::builder()
        .rules(rules)
        .config(config)
        .build()
        .context("Failed to build auditor")?;

    info!(
        "Auditing {} capture(s) under {} with {} rules",
        inputs.len(),
        path.display(),
        auditor.rule_count()
    );

    let result = auditor.audit_all(&inputs);

    super::output::print(&result, options.format, fail_on)?;

    Ok(result.has_failures_at(fail_on))
}

fn load_config(source: &ConfigSource) -> Result<Config> {
    match source {
        ConfigSource::Default => Ok(Config::default()),
        other => {
            // Invariant: non-Default variants always have a path
            let p = other.path().context("resolved config has no path")?;
            if source.is_global() {
                info!("Using global config: {}", p.display());
            }
            Config::from_file(p).with_context(|| format!("Failed to load config: {}", p.display()))
        }
    }
}

/// Picks the preset: command line first, then the config file, then `full`.
fn resolve_preset(flag: Option<&str>, configured: Option<&str>) -> Result<Preset> {
    match flag.or(configured) {
        None => Ok(Preset::default()),
        Some(name) => match Preset::parse(name) {
            Some(preset) => Ok(preset),
            None => bail!(
                "Unknown preset '{}'. Available presets: {}",
                name,
                Preset::NAMES.join(", ")
            ),
        },
    }
}

/// Keeps the rules whose name or code appears in `names`, in catalog order.
fn filter_rules(rules: Vec<RuleBox>, names: &[&str]) -> Vec<RuleBox> {
    for name in names {
        if !rules
            .iter()
            .any(|r| r.name() == *name || r.code().eq_ignore_ascii_case(name))
        {
            warn!("Unknown rule: {}", name);
        }
    }

    rules
        .into_iter()
        .filter(|r| {
            names
                .iter()
                .any(|n| r.name() == *n || r.code().eq_ignore_ascii_case(n))
        })
        .collect()
}

/// Collects capture files under `root`.
///
/// A file given directly is always audited; directory entries must match an
/// include pattern and no exclude pattern.
fn discover_files(
    root: &Path,
    settings: &AuditorConfig,
    extra_exclude: &[String],
) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    if !root.exists() {
        bail!("Path does not exist: {}", root.display());
    }

    let include = compile_patterns(&settings.include)?;
    let exclude = compile_patterns(settings.exclude.iter().chain(extra_exclude))?;

    let mut builder = ignore::WalkBuilder::new(root);
    builder
        .hidden(false)
        .require_git(false)
        .git_ignore(settings.respect_gitignore)
        .git_exclude(settings.respect_gitignore)
        .ignore(settings.respect_gitignore);

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = entry?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !include.iter().any(|p| p.matches(file_name)) {
            continue;
        }

        let rel = path.strip_prefix(root).unwrap_or(path);
        if exclude.iter().any(|p| p.matches_path(rel) || p.matches_path(path)) {
            debug!("Excluding: {}", path.display());
            continue;
        }

        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

fn compile_patterns<'a, I>(patterns: I) -> Result<Vec<glob::Pattern>>
where
    I: IntoIterator<Item = &'a String>,
{
    patterns
        .into_iter()
        .map(|p| glob::Pattern::new(p).with_context(|| format!("Invalid glob pattern: {p}")))
        .collect()
}

/// Reads every capture as text; invalid UTF-8 bytes are replaced.
fn read_inputs(files: &[PathBuf]) -> Result<Vec<(String, String)>> {
    files
        .iter()
        .map(|path| -> Result<(String, String)> {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok((
                path.display().to_string(),
                String::from_utf8_lossy(&bytes).into_owned(),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SWITCH: &str = "hostname SW1\n!\nline vty 0 4\n transport input telnet\n!\nend\n";

    fn write(dir: &Path, rel: &str, content: &str) -> PathBuf {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    // --- preset resolution ---

    #[test]
    fn flag_overrides_configured_preset() {
        let preset = resolve_preset(Some("routing"), Some("switching")).unwrap();
        assert_eq!(preset, Preset::Routing);
    }

    #[test]
    fn configured_preset_used_without_flag() {
        assert_eq!(resolve_preset(None, Some("Management")).unwrap(), Preset::Management);
        assert_eq!(resolve_preset(None, None).unwrap(), Preset::Full);
    }

    #[test]
    fn unknown_preset_is_an_error() {
        let err = resolve_preset(Some("strict"), None).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("strict"));
        assert!(message.contains("full, switching, routing, management"));
    }

    // --- rule filter ---

    #[test]
    fn filter_accepts_names_and_codes() {
        let rules = configured_rules(Preset::Full, &Config::new());
        let kept = filter_rules(rules, &["disable-telnet", "na532", "no-such-rule"]);
        let names: Vec<&str> = kept.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["ssh-version-2", "disable-telnet"]);
    }

    // --- discovery ---

    #[test]
    fn discovery_applies_include_and_exclude() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "core/sw1.log", SWITCH);
        write(tmp.path(), "core/sw2.txt", SWITCH);
        write(tmp.path(), "core/notes.md", "not a capture");
        write(tmp.path(), "archive/old.log", SWITCH);

        let settings = AuditorConfig::default();
        let files = discover_files(tmp.path(), &settings, &["archive/**".to_string()]).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(tmp.path()).unwrap().display().to_string())
            .collect();
        assert_eq!(names, vec!["core/sw1.log", "core/sw2.txt"]);
    }

    #[test]
    fn gitignored_captures_are_skipped_when_configured() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), ".gitignore", "scratch/\n");
        write(tmp.path(), "sw1.log", SWITCH);
        write(tmp.path(), "scratch/sw9.log", SWITCH);

        let settings = AuditorConfig::default();
        let files = discover_files(tmp.path(), &settings, &[]).unwrap();
        assert_eq!(files, vec![tmp.path().join("sw1.log")]);

        let settings = AuditorConfig {
            respect_gitignore: false,
            ..AuditorConfig::default()
        };
        let files = discover_files(tmp.path(), &settings, &[]).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn single_file_is_audited_regardless_of_include() {
        let tmp = TempDir::new().unwrap();
        let path = write(tmp.path(), "sw1.running", SWITCH);
        let files = discover_files(&path, &AuditorConfig::default(), &[]).unwrap();
        assert_eq!(files, vec![path]);
    }

    #[test]
    fn missing_path_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nowhere");
        assert!(discover_files(&missing, &AuditorConfig::default(), &[]).is_err());
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sw1.log");
        fs::write(&path, b"hostname SW\xff1\n").unwrap();

        let inputs = read_inputs(&[path]).unwrap();
        assert!(inputs[0].1.starts_with("hostname SW"));
    }

    // --- end to end ---

    #[test]
    fn failing_capture_reports_failure() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "sw1.log", SWITCH);
        write(tmp.path(), "netaudit.toml", "preset = \"management\"\n");

        let options = AuditOptions {
            format: OutputFormat::Compact,
            rules: Some("disable-telnet".to_string()),
            ..AuditOptions::default()
        };
        let source = ConfigSource::Project(tmp.path().join("netaudit.toml"));
        assert!(run(tmp.path(), &options, &source).unwrap());
    }

    #[test]
    fn disabled_rule_does_not_fail_the_run() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "sw1.log", SWITCH);
        let config = write(
            tmp.path(),
            "netaudit.toml",
            "[rules.disable-telnet]\nenabled = false\n",
        );

        let options = AuditOptions {
            format: OutputFormat::Compact,
            rules: Some("disable-telnet".to_string()),
            ..AuditOptions::default()
        };
        assert!(!run(tmp.path(), &options, &ConfigSource::Explicit(config)).unwrap());
    }

    #[test]
    fn unreadable_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let source = ConfigSource::Explicit(tmp.path().join("missing.toml"));
        let err = run(tmp.path(), &AuditOptions::default(), &source).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }
}
