//! Locates the configuration file for an audit run.
//!
//! First match wins:
//!
//! 1. `--config` flag (or `$NETAUDIT_CONFIG`)
//! 2. `netaudit.toml` or `.netaudit.toml` next to the captures: the audited
//!    directory, or the parent of an audited file
//! 3. `config.toml` in `$NETAUDIT_CONFIG_DIR`, else in `~/.netaudit/`
//! 4. built-in defaults

use std::path::{Path, PathBuf};

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given on the command line.
    Explicit(PathBuf),
    /// Found next to the captures.
    Project(PathBuf),
    /// Found in the global config directory.
    Global(PathBuf),
    /// Nothing found; defaults apply.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Returns `true` if the config came from the global directory.
    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global(_))
    }
}

const LOCAL_NAMES: &[&str] = &["netaudit.toml", ".netaudit.toml"];

const GLOBAL_NAME: &str = "config.toml";

/// Resolves the configuration for auditing `target` (a capture file or a
/// directory of captures).
#[must_use]
pub fn resolve(target: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_from(target, explicit, global_config_dir().as_deref())
}

fn resolve_from(
    target: &Path,
    explicit: Option<&Path>,
    global_dir: Option<&Path>,
) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    let dir = captures_dir(target);
    if let Some(found) = LOCAL_NAMES.iter().map(|n| dir.join(n)).find(|p| p.is_file()) {
        tracing::debug!("Found config next to captures: {}", found.display());
        return ConfigSource::Project(found);
    }

    global_dir
        .map(|d| d.join(GLOBAL_NAME))
        .filter(|p| p.is_file())
        .map_or(ConfigSource::Default, |found| {
            tracing::debug!("Found global config: {}", found.display());
            ConfigSource::Global(found)
        })
}

/// Directory holding the captures of `target`.
fn captures_dir(target: &Path) -> &Path {
    if target.is_file() {
        target
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    } else {
        target
    }
}

/// Returns the global config directory: `$NETAUDIT_CONFIG_DIR`, else
/// `~/.netaudit/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os("NETAUDIT_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".netaudit"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct Layout {
        captures: TempDir,
        global: TempDir,
    }

    impl Layout {
        fn new() -> Self {
            Self {
                captures: TempDir::new().unwrap(),
                global: TempDir::new().unwrap(),
            }
        }

        fn touch_local(&self, name: &str) -> PathBuf {
            let path = self.captures.path().join(name);
            fs::write(&path, "").unwrap();
            path
        }

        fn touch_global(&self) -> PathBuf {
            let path = self.global.path().join(GLOBAL_NAME);
            fs::write(&path, "").unwrap();
            path
        }

        fn resolve(&self, target: &Path, explicit: Option<&Path>) -> ConfigSource {
            resolve_from(target, explicit, Some(self.global.path()))
        }
    }

    #[test]
    fn flag_wins_even_when_missing() {
        let layout = Layout::new();
        layout.touch_local("netaudit.toml");
        layout.touch_global();

        let flag = Path::new("/nonexistent/audit.toml");
        assert_eq!(
            layout.resolve(layout.captures.path(), Some(flag)),
            ConfigSource::Explicit(flag.to_path_buf())
        );
    }

    #[test]
    fn plain_name_preferred_over_dotfile() {
        let layout = Layout::new();
        let plain = layout.touch_local("netaudit.toml");
        layout.touch_local(".netaudit.toml");

        assert_eq!(
            layout.resolve(layout.captures.path(), None),
            ConfigSource::Project(plain)
        );
    }

    #[test]
    fn dotfile_found_alone() {
        let layout = Layout::new();
        let dot = layout.touch_local(".netaudit.toml");

        assert_eq!(layout.resolve(layout.captures.path(), None), ConfigSource::Project(dot));
    }

    #[test]
    fn capture_file_uses_its_directory() {
        let layout = Layout::new();
        let config = layout.touch_local("netaudit.toml");
        let capture = layout.captures.path().join("edge-r1.log");
        fs::write(&capture, "hostname R1\n").unwrap();

        assert_eq!(layout.resolve(&capture, None), ConfigSource::Project(config));
    }

    #[test]
    fn global_used_only_without_local_config() {
        let layout = Layout::new();
        let global = layout.touch_global();
        assert_eq!(
            layout.resolve(layout.captures.path(), None),
            ConfigSource::Global(global)
        );

        layout.touch_local("netaudit.toml");
        assert!(matches!(
            layout.resolve(layout.captures.path(), None),
            ConfigSource::Project(_)
        ));
    }

    #[test]
    fn defaults_when_nothing_exists() {
        let layout = Layout::new();
        assert_eq!(layout.resolve(layout.captures.path(), None), ConfigSource::Default);
        assert_eq!(
            resolve_from(layout.captures.path(), None, None),
            ConfigSource::Default
        );
        assert!(ConfigSource::Default.path().is_none());
    }

    #[test]
    fn only_global_source_reports_global() {
        let p = PathBuf::from("netaudit.toml");
        assert!(!ConfigSource::Explicit(p.clone()).is_global());
        assert!(!ConfigSource::Project(p.clone()).is_global());
        assert!(ConfigSource::Global(p).is_global());
    }
}
