//! Monitors: coding-practice scoring for Go repositories
//!
//! This library scans a repository's source files and Git history and scores
//! each developer's adherence to coding practices (error wrapping, abrupt
//! termination, ignored errors, testing idioms, REST-client idioms, hexagonal
//! ports and adapters, statement coverage). Every monitor produces a list of
//! [`Metric`] results keyed by metric id and Git author.

pub mod analyzer;
pub mod config;
pub mod coverage;
pub mod error;
pub mod git;
pub mod locator;
pub mod logging;
pub mod monitor;
pub mod parser;
pub mod reporter;

pub use error::{MonitorError, ParseError};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A located proof-point for a detected signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    /// Commit that last touched the file (when attributed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_id: Option<String>,
    /// Repository-relative (or module-relative, for coverage) path
    pub file: String,
    /// Line number (1-indexed; 0 when the evidence is file- or directory-level)
    pub line: usize,
    /// Statement coverage percentage (coverage monitor only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<f64>,
    /// Human-readable detail (scaffolding checks)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Evidence {
    pub fn new(file: impl Into<String>, line: usize) -> Self {
        Self {
            commit_id: None,
            file: file.into(),
            line,
            coverage: None,
            detail: None,
        }
    }

    /// Evidence pointing at a line with no file yet; the aggregator stamps the file later
    pub fn at_line(line: usize) -> Self {
        Self::new(String::new(), line)
    }

    pub fn with_commit(mut self, commit_id: impl Into<String>) -> Self {
        self.commit_id = Some(commit_id.into());
        self
    }

    pub fn with_coverage(mut self, pct: f64) -> Self {
        self.coverage = Some(pct);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Outcome of applying one signal rule to one file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAnalysisResult {
    /// Whether the file produced a usable signal at all
    pub is_valid: bool,
    /// Discrete score (0 when invalid)
    pub score: u32,
    /// Ordered evidence for the score
    pub evidence: Vec<Evidence>,
}

impl FileAnalysisResult {
    /// A file that contributes no signal (excluded, unparsable, nothing qualifying)
    pub fn invalid() -> Self {
        Self::default()
    }

    pub fn valid(score: u32, evidence: Vec<Evidence>) -> Self {
        Self {
            is_valid: true,
            score,
            evidence,
        }
    }

    /// Valid with a fixed score when any evidence was found, invalid otherwise
    pub fn flagged(score: u32, evidence: Vec<Evidence>) -> Self {
        if evidence.is_empty() {
            Self::invalid()
        } else {
            Self::valid(score, evidence)
        }
    }
}

/// A named detectable coding pattern used as a scoring dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Skill {
    pub id: &'static str,
    pub name: &'static str,
}

/// Final externally-visible result: one per (metric, author) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub metric_id: String,
    pub git_author: String,
    /// Textual score ("0".."5", or "N/A")
    pub score: String,
    pub evidence: Vec<Evidence>,
}

impl Metric {
    pub fn new(metric_id: impl Into<String>, git_author: impl Into<String>, score: impl ToString) -> Self {
        Self {
            metric_id: metric_id.into(),
            git_author: git_author.into(),
            score: score.to_string(),
            evidence: Vec::new(),
        }
    }

    pub fn with_evidence(mut self, evidence: Vec<Evidence>) -> Self {
        self.evidence = evidence;
        self
    }
}

/// Serialized shape of a monitor run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Report {
    /// Flat array of metrics
    List(Vec<Metric>),
    /// Metrics grouped by metric id
    Keyed(BTreeMap<String, Vec<Metric>>),
}

impl Report {
    /// Group a flat metric list by metric id
    pub fn keyed(metrics: Vec<Metric>) -> Self {
        let mut map: BTreeMap<String, Vec<Metric>> = BTreeMap::new();
        for metric in metrics {
            map.entry(metric.metric_id.clone()).or_default().push(metric);
        }
        Report::Keyed(map)
    }

    /// All metrics regardless of shape
    pub fn metrics(&self) -> Vec<&Metric> {
        match self {
            Report::List(list) => list.iter().collect(),
            Report::Keyed(map) => map.values().flatten().collect(),
        }
    }
}
