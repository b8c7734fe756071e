//! Monitor pipelines: locate, parse, match, attribute, aggregate
//!
//! Each monitor wires the shared pipeline together with its own signal set.
//! `run` is the single entry point used by the CLI.

pub mod coverage;
pub mod error_handling;
pub mod hexagonal;
pub mod scaffolding;
pub mod skills;

use crate::analyzer::SourceUnit;
use crate::config::{Config, UntrackedPolicy};
use crate::git::{Attribution, GitAttributor};
use crate::locator::{FileFilter, SourceLocator};
use crate::{MonitorError, Report};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// The available monitors
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum MonitorKind {
    /// Error wrapping, abrupt termination and ignored errors in Go sources
    ErrorHandling,
    /// Go testing idioms in `_test.go` files
    Testing,
    /// fury_go-core REST-client idioms (rusty, httpclient, breaker)
    RestClient,
    /// MeliRestClient/RESTPool idioms in Java sources
    JavaRestClient,
    /// Hexagonal ports/adapters layout and port implementation
    Hexagonal,
    /// Statement coverage from `go test -coverprofile`
    Coverage,
    /// Initial project layout (cmd/api/main.go, internal or pkg)
    Scaffolding,
}

/// Run one monitor over `root`, optionally restricted to `files`
pub fn run(kind: MonitorKind, root: &Path, files: &[PathBuf], config: &Config) -> Result<Report> {
    info!(monitor = ?kind, root = %root.display(), "starting monitor");
    // Scaffolding only inspects the layout; every other monitor needs Git
    let open = || Pipeline::open(root, config);
    match kind {
        MonitorKind::Scaffolding => scaffolding::run(root),
        MonitorKind::ErrorHandling => error_handling::run(&mut open()?, files),
        MonitorKind::Testing => skills::run_testing(&mut open()?, files),
        MonitorKind::RestClient => skills::run_rest_client(&mut open()?, files),
        MonitorKind::JavaRestClient => skills::run_java_rest_client(&mut open()?, files),
        MonitorKind::Hexagonal => hexagonal::run(&mut open()?, files),
        MonitorKind::Coverage => coverage::run(&mut open()?),
    }
}

/// Shared per-run state: repository root, config and attribution
pub struct Pipeline<'a> {
    root: PathBuf,
    config: &'a Config,
    git: GitAttributor,
}

impl<'a> Pipeline<'a> {
    pub fn open(root: &Path, config: &'a Config) -> Result<Self> {
        let git = GitAttributor::open(root, config.author_format)
            .with_context(|| format!("Failed to open repository: {}", root.display()))?;
        Ok(Self {
            root: root.to_path_buf(),
            config,
            git,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &'a Config {
        self.config
    }

    /// Files to analyze for `filter`, honoring the explicit list
    pub fn locate(&self, filter: FileFilter, explicit: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let files = SourceLocator::new(&self.root, filter)
            .with_exclude_dirs(&self.config.exclude_dirs)
            .locate(explicit)
            .with_context(|| format!("Failed to list files under {}", self.root.display()))?;
        Ok(files)
    }

    pub fn load(&self, rel: &Path) -> Result<SourceUnit> {
        SourceUnit::load(&self.root, rel)
            .with_context(|| format!("Failed to read source file: {}", rel.display()))
    }

    /// Last-commit attribution for `rel`. Under the `skip` policy an untracked
    /// file yields `None` instead of failing the run.
    pub fn attribute(&mut self, rel: &Path) -> Result<Option<Attribution>> {
        match self.git.last_commit(rel) {
            Ok(attribution) => Ok(Some(attribution)),
            Err(e @ MonitorError::NotTracked { .. })
                if self.config.on_untracked == UntrackedPolicy::Skip =>
            {
                warn!("skipping {}: {}", rel.display(), e);
                Ok(None)
            }
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("Failed to get file author: {}", rel.display()))),
        }
    }
}
