//! Go cover profile parser
//!
//! Parses the text profiles written by `go test -coverprofile`:
//!
//! ```text
//! mode: set
//! example.com/shop/internal/cart/cart.go:10.40,12.2 2 1
//! ```
//!
//! Each record is `file:startLine.startCol,endLine.endCol numStatements count`.

use crate::config::{build_ignore_set, is_ignored};
use crate::MonitorError;
use globset::GlobSet;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::debug;

/// Statement totals for one file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileCoverage {
    pub statements: u64,
    /// Statements in blocks executed at least once
    pub covered: u64,
}

impl FileCoverage {
    /// Percentage of covered statements (0 for a file without statements)
    pub fn percent(&self) -> f64 {
        crate::analyzer::scoring::coverage_percent(self.covered, self.statements).unwrap_or(0.0)
    }
}

/// Per-file statement coverage keyed by module-relative path
#[derive(Debug, Clone, Default)]
pub struct CoverageProfile {
    pub files: BTreeMap<String, FileCoverage>,
}

impl CoverageProfile {
    pub fn total(&self) -> FileCoverage {
        self.files
            .values()
            .fold(FileCoverage::default(), |acc, f| FileCoverage {
                statements: acc.statements + f.statements,
                covered: acc.covered + f.covered,
            })
    }
}

/// `.covignore` patterns: exact module-relative paths or globs
#[derive(Debug, Default)]
pub struct IgnoreList {
    exact: HashSet<String>,
    globs: GlobSet,
}

impl IgnoreList {
    /// One pattern per line; blank lines and `#` comments are skipped
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let patterns: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(str::to_string)
            .collect();
        Ok(Self {
            globs: build_ignore_set(&patterns)?,
            exact: patterns.into_iter().collect(),
        })
    }

    pub fn matches(&self, rel: &str) -> bool {
        self.exact.contains(rel) || is_ignored(Path::new(rel), &self.globs)
    }
}

/// Module path declared by the `module` directive of a go.mod file
pub fn module_name(go_mod: &str, path: &Path) -> Result<String, MonitorError> {
    go_mod
        .lines()
        .filter_map(|line| line.trim().strip_prefix("module"))
        .filter(|rest| rest.starts_with(char::is_whitespace))
        .map(|rest| rest.trim().trim_matches('"').to_string())
        .find(|name| !name.is_empty())
        .ok_or_else(|| MonitorError::MissingModule {
            path: path.to_path_buf(),
        })
}

/// Parse a profile, dropping files matched by `ignore`.
/// Records with the wrong shape are skipped; non-numeric counts are an error.
pub fn parse_profile(
    content: &str,
    module: &str,
    ignore: &IgnoreList,
) -> Result<CoverageProfile, MonitorError> {
    let module_prefix = format!("{}/", module.trim_end_matches('/'));
    let mut profile = CoverageProfile::default();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with("mode:") {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        let &[location, statements, count] = parts.as_slice() else {
            debug!(line = line_no, "skipping malformed coverage record");
            continue;
        };
        let Some((file, _range)) = location.rsplit_once(':') else {
            debug!(line = line_no, "skipping coverage record without a range");
            continue;
        };

        let statements: u64 = statements.parse().map_err(|_| MonitorError::CoverageFormat {
            line: line_no,
            reason: format!("statement count {statements:?} is not a number"),
        })?;
        let count: u64 = count.parse().map_err(|_| MonitorError::CoverageFormat {
            line: line_no,
            reason: format!("execution count {count:?} is not a number"),
        })?;

        let rel = file.strip_prefix(&module_prefix).unwrap_or(file);
        if ignore.matches(rel) {
            continue;
        }
        let entry = profile.files.entry(rel.to_string()).or_default();
        entry.statements += statements;
        if count > 0 {
            entry.covered += statements;
        }
    }
    Ok(profile)
}
