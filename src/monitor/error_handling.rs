//! Error-handling monitor: error_wrap, panic_usage and errors_ignore

use super::Pipeline;
use crate::analyzer::rules::{
    display_path, ErrorWrapRule, IgnoredErrorRule, SignalRule, TerminationRule,
};
use crate::analyzer::{Aggregator, EmitPolicy};
use crate::locator::FileFilter;
use crate::{Report, Skill};
use anyhow::{Context, Result};
use std::path::PathBuf;

pub const SKILLS: &[Skill] = &[
    Skill {
        id: "error_wrap",
        name: "Wrapping returned errors with context",
    },
    Skill {
        id: "panic_usage",
        name: "Avoiding panic and abrupt exits outside entrypoints",
    },
    Skill {
        id: "errors_ignore",
        name: "Checking errors instead of discarding them",
    },
];

/// Only files with at least one valid result are attributed
pub fn run(pipeline: &mut Pipeline, files: &[PathBuf]) -> Result<Report> {
    let config = pipeline.config();
    let termination =
        TerminationRule::new(config).context("Invalid termination pattern in config")?;
    let rules: Vec<Box<dyn SignalRule>> = vec![
        Box::new(ErrorWrapRule::new(config)),
        Box::new(termination),
        Box::new(IgnoredErrorRule::new()),
    ];
    let mut aggregator = Aggregator::new(SKILLS, EmitPolicy::OmitAbsent);

    for rel in pipeline.locate(FileFilter::GoSources, files)? {
        let unit = pipeline.load(&rel)?;
        let results: Vec<_> = rules.iter().map(|r| (r.id(), r.analyze(&unit))).collect();
        if results.iter().all(|(_, r)| !r.is_valid) {
            continue;
        }

        let Some(attribution) = pipeline.attribute(&rel)? else {
            continue;
        };
        let file = display_path(&rel);
        for (id, result) in &results {
            aggregator.observe(
                &attribution.author,
                Some(&attribution.commit_id),
                &file,
                id,
                result,
            );
        }
    }

    Ok(Report::keyed(aggregator.into_metrics()))
}
