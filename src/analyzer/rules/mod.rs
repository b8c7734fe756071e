//! Signal rules applied to a single source file

pub mod error_wrap;
pub mod ignored_errors;
pub mod interface_impl;
pub mod java_rest_client;
pub mod rest_client;
pub mod termination;
pub mod test_idioms;

pub use error_wrap::ErrorWrapRule;
pub use ignored_errors::IgnoredErrorRule;
pub use interface_impl::{InterfaceImplementation, InterfaceSpec};
pub use java_rest_client::JavaRestClientRule;
pub use rest_client::RestClientRule;
pub use termination::TerminationRule;
pub use test_idioms::TestIdiomRule;

use crate::parser::GoSource;
use crate::{FileAnalysisResult, MonitorError, Skill};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// One file handed to the rules: raw text plus the Go model when it parsed
#[derive(Debug)]
pub struct SourceUnit {
    /// Repository-relative path
    pub path: PathBuf,
    pub text: String,
    /// `None` for non-Go files and for Go files that failed to parse
    pub go: Option<GoSource>,
}

impl SourceUnit {
    /// Read `rel` under `root`. Go files are parsed; a parse failure is logged
    /// and leaves `go` empty.
    pub fn load(root: &Path, rel: &Path) -> Result<Self, MonitorError> {
        let full = root.join(rel);
        let text = fs::read_to_string(&full).map_err(|e| MonitorError::io(&full, e))?;
        Ok(Self::from_text(rel, text))
    }

    pub fn from_text(rel: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let path = rel.into();
        let text = text.into();
        let is_go = path.extension().is_some_and(|ext| ext == "go");
        let go = if is_go {
            match GoSource::parse(&text, &path) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    warn!("{}", e);
                    None
                }
            }
        } else {
            None
        };
        Self { path, text, go }
    }

    /// Forward-slash path used in evidence
    pub fn display_path(&self) -> String {
        display_path(&self.path)
    }

    /// Lines with 1-indexed line numbers
    pub fn numbered_lines(&self) -> impl Iterator<Item = (usize, &str)> {
        self.text.lines().enumerate().map(|(i, l)| (i + 1, l))
    }
}

pub fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// A rule producing one metric's result per file
pub trait SignalRule {
    /// Metric id the result is reported under
    fn id(&self) -> &'static str;

    fn analyze(&self, unit: &SourceUnit) -> FileAnalysisResult;
}

/// A detector producing one result per declared skill per file
pub trait SkillDetector {
    fn skills(&self) -> &'static [Skill];

    /// One `(skill_id, result)` pair per declared skill, in declared order
    fn detect(&self, unit: &SourceUnit) -> Vec<(&'static str, FileAnalysisResult)>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broken_go_file_has_no_model() {
        let unit = SourceUnit::from_text("a.go", "package x\nfunc {{{");
        assert!(unit.go.is_none());
        assert_eq!(unit.text.lines().count(), 2);
    }

    #[test]
    fn non_go_file_is_not_parsed() {
        let unit = SourceUnit::from_text("A.java", "class A {}");
        assert!(unit.go.is_none());
        assert_eq!(unit.display_path(), "A.java");
    }

    #[test]
    fn numbered_lines_start_at_one() {
        let unit = SourceUnit::from_text("a.go", "package x\n\nfunc f() {}\n");
        let first: Vec<usize> = unit.numbered_lines().map(|(n, _)| n).collect();
        assert_eq!(first, vec![1, 2, 3]);
    }
}
