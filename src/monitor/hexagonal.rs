//! Hexagonal monitor: port implementation by adapters, plus directory layout

use super::Pipeline;
use crate::analyzer::rules::{display_path, InterfaceImplementation};
use crate::analyzer::scoring::{port_score, scaffolding_score};
use crate::locator::FileFilter;
use crate::{Evidence, Metric, Report};
use anyhow::Result;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const REQUIRED_DIRS: &[&str] = &["internal/core/ports", "internal/core/domain", "internal/adapters"];

#[derive(Default)]
struct AuthorPorts {
    implemented: BTreeSet<String>,
    evidence: Vec<Evidence>,
}

/// Interfaces come from the located ports files; adapters are always read
/// from the whole adapters tree.
pub fn run(pipeline: &mut Pipeline, files: &[PathBuf]) -> Result<Report> {
    let config = pipeline.config();
    let mut checker = InterfaceImplementation::new();

    for rel in pipeline.locate(FileFilter::GoSources, files)? {
        if config.is_port(&rel) && !is_test_file(&rel) {
            checker.add_port_file(&pipeline.load(&rel)?);
        }
    }
    for iface in checker.interfaces() {
        debug!(name = %iface.name, file = %iface.file, methods = iface.methods.len(), "port interface");
    }

    let scaffolding = scaffolding_metric(pipeline.root());
    let total = checker.interface_count();
    if total == 0 {
        info!("no port interfaces found");
        return Ok(Report::List(vec![
            Metric::new("port_implementation", "", "N/A"),
            scaffolding,
        ]));
    }

    let adapters: Vec<PathBuf> = pipeline
        .locate(FileFilter::GoSources, &[])?
        .into_iter()
        .filter(|rel| config.is_adapter(rel) && !is_test_file(rel))
        .collect();

    let mut owners: BTreeMap<PathBuf, (String, String)> = BTreeMap::new();
    for rel in &adapters {
        let Some(attribution) = pipeline.attribute(rel)? else {
            continue;
        };
        checker.add_adapter_file(&pipeline.load(rel)?);
        owners.insert(rel.clone(), (attribution.author, attribution.commit_id));
    }

    let mut by_author: BTreeMap<String, AuthorPorts> = BTreeMap::new();
    for (author, _) in owners.values() {
        by_author.entry(author.clone()).or_default();
    }
    for implementation in checker.implementations() {
        let Some((author, commit_id)) = owners.get(&implementation.file) else {
            continue;
        };
        let entry = by_author.entry(author.clone()).or_default();
        for iface in &implementation.implemented {
            entry.implemented.insert(iface.clone());
            entry.evidence.push(
                Evidence::new(display_path(&implementation.file), implementation.line)
                    .with_commit(commit_id.as_str())
                    .with_detail(format!("{} implements {}", implementation.struct_name, iface)),
            );
        }
    }

    let mut metrics: Vec<Metric> = by_author
        .into_iter()
        .map(|(author, ports)| {
            let score = port_score(ports.implemented.len(), total)
                .map(|s| s.to_string())
                .unwrap_or_else(|| "N/A".to_string());
            Metric::new("port_implementation", author, score).with_evidence(ports.evidence)
        })
        .collect();
    metrics.push(scaffolding);
    Ok(Report::List(metrics))
}

/// `hexagonal_scaffolding`: one evidence entry per missing directory
pub fn scaffolding_metric(root: &Path) -> Metric {
    let missing: Vec<Evidence> = REQUIRED_DIRS
        .iter()
        .filter(|dir| !root.join(dir).is_dir())
        .map(|dir| Evidence::new(*dir, 0).with_detail(format!("missing directory {dir}")))
        .collect();
    let present = REQUIRED_DIRS.len() - missing.len();
    Metric::new(
        "hexagonal_scaffolding",
        "",
        scaffolding_score(present, REQUIRED_DIRS.len()),
    )
    .with_evidence(missing)
}

fn is_test_file(rel: &Path) -> bool {
    FileFilter::GoTests.matches(rel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn scaffolding_counts_missing_dirs() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("internal/core/ports")).unwrap();
        let metric = scaffolding_metric(dir.path());
        assert_eq!(metric.score, "2");
        let files: Vec<&str> = metric.evidence.iter().map(|e| e.file.as_str()).collect();
        assert_eq!(files, vec!["internal/core/domain", "internal/adapters"]);
        assert!(metric.evidence.iter().all(|e| e.line == 0));
    }

    #[test]
    fn scaffolding_complete_and_empty() {
        let dir = TempDir::new().unwrap();
        assert_eq!(scaffolding_metric(dir.path()).score, "1");
        for d in REQUIRED_DIRS {
            fs::create_dir_all(dir.path().join(d)).unwrap();
        }
        let metric = scaffolding_metric(dir.path());
        assert_eq!(metric.score, "3");
        assert!(metric.evidence.is_empty());
    }
}
