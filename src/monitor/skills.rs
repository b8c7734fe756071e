//! Skill monitors: testing idioms and REST-client idioms

use super::Pipeline;
use crate::analyzer::rules::{display_path, JavaRestClientRule, RestClientRule, TestIdiomRule};
use crate::analyzer::{Aggregator, EmitPolicy, SkillDetector};
use crate::locator::FileFilter;
use crate::Report;
use anyhow::Result;
use std::path::PathBuf;
use tracing::debug;

pub fn run_testing(pipeline: &mut Pipeline, files: &[PathBuf]) -> Result<Report> {
    scan(pipeline, files, FileFilter::GoTests, &TestIdiomRule::new())
}

pub fn run_rest_client(pipeline: &mut Pipeline, files: &[PathBuf]) -> Result<Report> {
    let rule = RestClientRule::new(&pipeline.config().rest_client);
    scan(pipeline, files, FileFilter::GoSources, &rule)
}

pub fn run_java_rest_client(pipeline: &mut Pipeline, files: &[PathBuf]) -> Result<Report> {
    scan(pipeline, files, FileFilter::JavaSources, &JavaRestClientRule::new())
}

/// Every located file is attributed; each author gets every declared skill
fn scan(
    pipeline: &mut Pipeline,
    files: &[PathBuf],
    filter: FileFilter,
    detector: &dyn SkillDetector,
) -> Result<Report> {
    let mut aggregator = Aggregator::new(detector.skills(), EmitPolicy::EmitAll);

    for rel in pipeline.locate(filter, files)? {
        let Some(attribution) = pipeline.attribute(&rel)? else {
            continue;
        };
        aggregator.see(&attribution.author);

        let unit = pipeline.load(&rel)?;
        let file = display_path(&rel);
        for (skill_id, result) in detector.detect(&unit) {
            debug!(file = %file, skill_id, score = result.score, "skill result");
            aggregator.observe(
                &attribution.author,
                Some(&attribution.commit_id),
                &file,
                skill_id,
                &result,
            );
        }
    }

    Ok(Report::List(aggregator.into_metrics()))
}
