//! Config schema and deserialization

use serde::{Deserialize, Serialize};
use std::path::Path;

/// How a Git author is rendered in `git_author`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AuthorFormat {
    /// `Name <email>`
    #[default]
    NameEmail,
    /// Bare email
    Email,
}

/// What to do when a flagged file has no commit history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UntrackedPolicy {
    /// Abort the whole run with an error naming the file
    #[default]
    Abort,
    /// Log a warning and drop the file from the report
    Skip,
}

/// Coverage monitor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageConfig {
    /// Command (program followed by arguments) that writes the coverage profile
    #[serde(default = "default_coverage_command")]
    pub command: Vec<String>,

    /// Profile path written by the command, relative to the repository root
    #[serde(default = "default_coverage_profile")]
    pub profile: String,

    /// Ignore file with one exact/glob pattern per line
    #[serde(default = "default_ignore_file")]
    pub ignore_file: String,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            command: default_coverage_command(),
            profile: default_coverage_profile(),
            ignore_file: default_ignore_file(),
        }
    }
}

fn default_coverage_command() -> Vec<String> {
    ["go", "test", "./...", "-coverprofile=coverage.out"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_coverage_profile() -> String {
    "coverage.out".to_string()
}

fn default_ignore_file() -> String {
    ".covignore".to_string()
}

/// REST-client monitor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestClientConfig {
    /// Organisation prefixes hosting the `fury_go-core` toolkit
    #[serde(default = "default_orgs")]
    pub orgs: Vec<String>,
}

impl Default for RestClientConfig {
    fn default() -> Self {
        Self {
            orgs: default_orgs(),
        }
    }
}

fn default_orgs() -> Vec<String> {
    vec![
        "github.com/melisource".to_string(),
        "github.com/mercadolibre".to_string(),
    ]
}

/// Root config structure for .monitorsrc.json
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory name marking command entrypoints (exempt from error checks)
    #[serde(default = "default_entrypoint_dir")]
    pub entrypoint_dir: String,

    /// Location of port interfaces, relative to the repository root
    #[serde(default = "default_ports_dir")]
    pub ports_dir: String,

    /// Location of adapter implementations, relative to the repository root
    #[serde(default = "default_adapters_dir")]
    pub adapters_dir: String,

    /// Qualified calls that count as wrapping an error (`pkg.Func`)
    #[serde(default = "default_wrap_functions")]
    pub wrap_functions: Vec<String>,

    /// Regular expressions for abrupt-termination calls
    #[serde(default = "default_termination_patterns")]
    pub termination_patterns: Vec<String>,

    /// Directory names skipped while walking the repository
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,

    #[serde(default)]
    pub author_format: AuthorFormat,

    #[serde(default)]
    pub on_untracked: UntrackedPolicy,

    #[serde(default)]
    pub coverage: CoverageConfig,

    #[serde(default)]
    pub rest_client: RestClientConfig,
}

fn default_entrypoint_dir() -> String {
    "cmd".to_string()
}

fn default_ports_dir() -> String {
    "internal/core/ports".to_string()
}

fn default_adapters_dir() -> String {
    "internal/adapters".to_string()
}

fn default_wrap_functions() -> Vec<String> {
    [
        "fmt.Errorf",
        "errors.Wrap",
        "errors.Wrapf",
        "errors.WithMessage",
        "errors.WithMessagef",
        "errors.WithStack",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_termination_patterns() -> Vec<String> {
    [
        r"\bpanic\(",
        r"\blog\.Fatal\(",
        r"\blog\.Fatalf\(",
        r"\blog\.Fatalln\(",
        r"\bos\.Exit\(",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_exclude_dirs() -> Vec<String> {
    vec![".git".to_string(), "vendor".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            entrypoint_dir: default_entrypoint_dir(),
            ports_dir: default_ports_dir(),
            adapters_dir: default_adapters_dir(),
            wrap_functions: default_wrap_functions(),
            termination_patterns: default_termination_patterns(),
            exclude_dirs: default_exclude_dirs(),
            author_format: AuthorFormat::default(),
            on_untracked: UntrackedPolicy::default(),
            coverage: CoverageConfig::default(),
            rest_client: RestClientConfig::default(),
        }
    }
}

impl Config {
    /// Merge CLI overrides into config. CLI values take precedence.
    pub fn merge_with_cli(
        mut self,
        on_untracked: Option<UntrackedPolicy>,
        author_format: Option<AuthorFormat>,
    ) -> Self {
        if let Some(policy) = on_untracked {
            self.on_untracked = policy;
        }
        if let Some(format) = author_format {
            self.author_format = format;
        }
        self
    }

    /// True when any component of `path` is the entrypoint directory
    pub fn is_entrypoint(&self, path: &Path) -> bool {
        path.components()
            .any(|c| c.as_os_str() == self.entrypoint_dir.as_str())
    }

    /// True when `path` lies under the configured ports location
    pub fn is_port(&self, path: &Path) -> bool {
        path.starts_with(&self.ports_dir)
    }

    /// True when `path` lies under the configured adapters location
    pub fn is_adapter(&self, path: &Path) -> bool {
        path.starts_with(&self.adapters_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.entrypoint_dir, "cmd");
        assert_eq!(config.author_format, AuthorFormat::NameEmail);
        assert_eq!(config.on_untracked, UntrackedPolicy::Abort);
        assert!(config.wrap_functions.contains(&"fmt.Errorf".to_string()));
        assert_eq!(config.coverage.profile, "coverage.out");
    }

    #[test]
    fn entrypoint_matches_whole_components_only() {
        let config = Config::default();
        assert!(config.is_entrypoint(Path::new("cmd/api/main.go")));
        assert!(config.is_entrypoint(Path::new("tools/cmd/run.go")));
        assert!(!config.is_entrypoint(Path::new("internal/cmdutil/flags.go")));
    }

    #[test]
    fn cli_overrides_file_values() {
        let config: Config =
            serde_json::from_str(r#"{ "onUntracked": "skip", "authorFormat": "email" }"#).unwrap();
        assert_eq!(config.on_untracked, UntrackedPolicy::Skip);
        let merged = config.merge_with_cli(Some(UntrackedPolicy::Abort), None);
        assert_eq!(merged.on_untracked, UntrackedPolicy::Abort);
        assert_eq!(merged.author_format, AuthorFormat::Email);
    }

    #[test]
    fn ports_and_adapters_locations() {
        let config = Config::default();
        assert!(config.is_port(Path::new("internal/core/ports/item.go")));
        assert!(config.is_adapter(Path::new("internal/adapters/repository/pg.go")));
        assert!(!config.is_adapter(Path::new("internal/core/domain/item.go")));
    }
}
