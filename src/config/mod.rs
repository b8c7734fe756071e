//! Configuration loading for the monitors

mod schema;

pub use schema::{AuthorFormat, Config, CoverageConfig, RestClientConfig, UntrackedPolicy};

use crate::MonitorError;
use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILENAME: &str = ".monitorsrc.json";

/// Find and load the config file. Searches the repository directory then parents.
pub fn load_config(work_dir: &Path, custom_path: Option<&Path>) -> Result<Config> {
    let path = if let Some(p) = custom_path {
        let path = if p.is_absolute() {
            p.to_path_buf()
        } else {
            work_dir.join(p)
        };
        if path.exists() {
            Some(path)
        } else {
            anyhow::bail!("Config file not found: {}", path.display());
        }
    } else {
        find_config_in_parents(work_dir)
    };

    let Some(path) = path else {
        debug!("no {} found, using defaults", CONFIG_FILENAME);
        return Ok(Config::default());
    };

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in config: {}", path.display()))?;
    validate(&config, &path)?;
    debug!("loaded config from {}", path.display());
    Ok(config)
}

/// Reject configs whose patterns would fail later, mid-run
fn validate(config: &Config, path: &Path) -> Result<(), MonitorError> {
    for pattern in &config.termination_patterns {
        Regex::new(pattern).map_err(|e| MonitorError::Config {
            path: path.to_path_buf(),
            reason: format!("invalid termination pattern {pattern:?}: {e}"),
        })?;
    }
    for wrap in &config.wrap_functions {
        if !wrap.contains('.') {
            return Err(MonitorError::Config {
                path: path.to_path_buf(),
                reason: format!("wrap function {wrap:?} must be qualified as pkg.Func"),
            });
        }
    }
    if config.coverage.command.is_empty() {
        return Err(MonitorError::Config {
            path: path.to_path_buf(),
            reason: "coverage.command must not be empty".to_string(),
        });
    }
    Ok(())
}

/// Search for .monitorsrc.json in directory and its parents
fn find_config_in_parents(mut dir: &Path) -> Option<PathBuf> {
    loop {
        let candidate = dir.join(CONFIG_FILENAME);
        if candidate.exists() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
}

/// Build a GlobSet from ignore patterns for path matching.
/// `*` stops at `/`; use `**` to cross directories.
pub fn build_ignore_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .with_context(|| format!("Invalid ignore pattern: {}", pattern))?;
        builder.add(glob);
    }
    builder.build().map_err(|e| anyhow::anyhow!("{}", e))
}

/// Check if a path should be ignored based on glob patterns
pub fn is_ignored(path: &Path, ignore_set: &GlobSet) -> bool {
    ignore_set.is_match(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn missing_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(dir.path(), None).unwrap();
        assert_eq!(config.ports_dir, "internal/core/ports");
    }

    #[test]
    fn config_found_in_parent() {
        let dir = TempDir::new().unwrap();
        let mut f = fs::File::create(dir.path().join(CONFIG_FILENAME)).unwrap();
        writeln!(f, r#"{{ "entrypointDir": "bin" }}"#).unwrap();
        let nested = dir.path().join("svc");
        fs::create_dir_all(&nested).unwrap();

        let config = load_config(&nested, None).unwrap();
        assert_eq!(config.entrypoint_dir, "bin");
    }

    #[test]
    fn explicit_missing_config_is_error() {
        let dir = TempDir::new().unwrap();
        let err = load_config(dir.path(), Some(Path::new("nope.json"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn invalid_termination_pattern_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, r#"{ "terminationPatterns": ["panic\\("] }"#).unwrap();
        assert!(load_config(dir.path(), None).is_ok());

        fs::write(&path, r#"{ "terminationPatterns": ["panic("] }"#).unwrap();
        let err = load_config(dir.path(), None).unwrap_err();
        assert!(format!("{err:#}").contains("invalid termination pattern"));
    }

    #[test]
    fn ignore_set_matches_globs() {
        let set = build_ignore_set(&["internal/mocks/*".to_string()]).unwrap();
        assert!(is_ignored(Path::new("internal/mocks/store.go"), &set));
        assert!(!is_ignored(Path::new("internal/store.go"), &set));
        assert!(!is_ignored(Path::new("internal/mocks/sub/store.go"), &set));
    }
}
