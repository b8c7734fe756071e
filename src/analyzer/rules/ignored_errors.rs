//! Ignored errors: `_, err := f()` not followed by an `if err != nil` check

use super::{SignalRule, SourceUnit};
use crate::{Evidence, FileAnalysisResult};
use regex::Regex;
use std::sync::LazyLock;

const IGNORED_ERROR_SCORE: u32 = 2;

static DISCARD_ASSIGN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_,\s*err\s*:?=").expect("valid regex"));
static ERROR_CHECK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"if\s+err\s*!=\s*nil").expect("valid regex"));
/// `if _, err := f(); err != nil {`
static INLINE_CHECK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_,\s*err\s*:?=[^;]*;\s*err\s*!=\s*nil").expect("valid regex"));

#[derive(Default)]
pub struct IgnoredErrorRule;

impl IgnoredErrorRule {
    pub fn new() -> Self {
        Self
    }
}

impl SignalRule for IgnoredErrorRule {
    fn id(&self) -> &'static str {
        "errors_ignore"
    }

    fn analyze(&self, unit: &SourceUnit) -> FileAnalysisResult {
        let file = unit.display_path();
        let lines: Vec<&str> = unit.text.lines().collect();
        let evidence = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| DISCARD_ASSIGN.is_match(line) && !INLINE_CHECK.is_match(line))
            .filter(|(i, _)| {
                lines
                    .get(i + 1)
                    .is_none_or(|next| !ERROR_CHECK.is_match(next))
            })
            .map(|(i, _)| Evidence::new(file.as_str(), i + 1))
            .collect();
        FileAnalysisResult::flagged(IGNORED_ERROR_SCORE, evidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(source: &str) -> FileAnalysisResult {
        IgnoredErrorRule::new().analyze(&SourceUnit::from_text("internal/a.go", source))
    }

    #[test]
    fn unchecked_discard_is_flagged_once() {
        let result = analyze("package a\n\nfunc f() {\n\t_, err := g()\n\tuse(err)\n}\n");
        assert!(result.is_valid);
        assert_eq!(result.score, 2);
        assert_eq!(result.evidence, vec![Evidence::new("internal/a.go", 4)]);
    }

    #[test]
    fn checked_discard_is_clean() {
        let result = analyze("package a\n\nfunc f() {\n\t_, err := g()\n\tif err != nil {\n\t\treturn\n\t}\n}\n");
        assert!(!result.is_valid);
        assert!(result.evidence.is_empty());
    }

    #[test]
    fn inline_check_is_clean() {
        let result = analyze(
            "package a\n\nfunc f() error {\n\tif _, err := g(); err != nil {\n\t\treturn err\n\t}\n\tif _, err = h(); err == nil {\n\t\treturn nil\n\t}\n\treturn nil\n}\n",
        );
        assert_eq!(result.evidence, vec![Evidence::new("internal/a.go", 7)]);
    }

    #[test]
    fn reassignment_and_last_line_are_flagged() {
        let result = analyze("package a\nfunc f() {\n\t_, err = g()\n}\n_, err := h()");
        let lines: Vec<usize> = result.evidence.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![3, 5]);
    }
}
