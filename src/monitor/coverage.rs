//! Coverage monitor: statement coverage per file, attributed to last committers

use super::Pipeline;
use crate::analyzer::scoring::{coverage_score, round_percent};
use crate::coverage::{load_ignore_list, load_profile, read_module_name, run_coverage_command};
use crate::{Evidence, Metric, Report};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

pub fn run(pipeline: &mut Pipeline) -> Result<Report> {
    let root = pipeline.root().to_path_buf();
    let config = &pipeline.config().coverage;

    run_coverage_command(&root, config).context("Coverage command failed")?;
    let module = read_module_name(&root)?;
    let ignore = load_ignore_list(&root, config)
        .with_context(|| format!("Invalid pattern in {}", config.ignore_file))?;
    let profile = load_profile(&root, config, &module, &ignore)?;

    let mut author = None;
    let mut evidence = Vec::with_capacity(profile.files.len());
    for (file, stats) in &profile.files {
        let Some(attribution) = pipeline.attribute(Path::new(file))? else {
            continue;
        };
        debug!(file = %file, covered = stats.covered, statements = stats.statements, "file coverage");
        evidence.push(
            Evidence::new(file.as_str(), 0)
                .with_commit(attribution.commit_id)
                .with_coverage(round_percent(stats.percent())),
        );
        author.get_or_insert(attribution.author);
    }

    let total = profile.total();
    info!(
        module = %module,
        covered = total.covered,
        statements = total.statements,
        "coverage collected"
    );
    let metric = Metric::new(
        "coverage",
        author.unwrap_or_default(),
        coverage_score(total.covered, total.statements),
    )
    .with_evidence(evidence);
    Ok(Report::List(vec![metric]))
}
