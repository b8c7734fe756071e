//! Initial project layout check. Needs no Git history.

use crate::{Evidence, Metric, Report};
use anyhow::Result;
use std::path::Path;

const MAIN_FILE: &str = "cmd/api/main.go";

pub fn run(root: &Path) -> Result<Report> {
    if !root.is_dir() {
        anyhow::bail!("{} is not a directory", root.display());
    }
    Ok(Report::List(vec![initial_scaffolding(root)]))
}

/// Lowest score of the failed checks; 3 when nothing is missing
pub fn initial_scaffolding(root: &Path) -> Metric {
    let mut score = 3;
    let mut evidence = Vec::new();

    if !root.join(MAIN_FILE).is_file() {
        score = score.min(1);
        evidence.push(
            Evidence::new(MAIN_FILE, 0).with_detail("main.go file does not exist in cmd/api"),
        );
    }
    if !root.join("internal").is_dir() && !root.join("pkg").is_dir() {
        score = score.min(2);
        evidence.push(
            Evidence::new("internal", 0).with_detail("neither internal nor pkg directory exists"),
        );
    }

    Metric::new("initial-scaffolding", "", score).with_evidence(evidence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn complete_layout_scores_three() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("cmd/api")).unwrap();
        fs::write(dir.path().join(MAIN_FILE), "package main\n").unwrap();
        fs::create_dir(dir.path().join("pkg")).unwrap();

        let metric = initial_scaffolding(dir.path());
        assert_eq!(metric.score, "3");
        assert!(metric.evidence.is_empty());
    }

    #[test]
    fn missing_package_dirs_scores_two() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("cmd/api")).unwrap();
        fs::write(dir.path().join(MAIN_FILE), "package main\n").unwrap();

        let metric = initial_scaffolding(dir.path());
        assert_eq!(metric.score, "2");
        assert_eq!(
            metric.evidence[0].detail.as_deref(),
            Some("neither internal nor pkg directory exists")
        );
    }

    #[test]
    fn empty_repo_takes_lowest_score() {
        let dir = TempDir::new().unwrap();
        let metric = initial_scaffolding(dir.path());
        assert_eq!(metric.score, "1");
        assert_eq!(metric.evidence.len(), 2);
        assert_eq!(metric.git_author, "");
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(run(&dir.path().join("nope")).is_err());
    }
}
