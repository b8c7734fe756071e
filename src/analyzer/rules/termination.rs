//! Abrupt termination: panic, log.Fatal* and os.Exit outside entrypoints

use super::{SignalRule, SourceUnit};
use crate::config::Config;
use crate::{Evidence, FileAnalysisResult};
use regex::RegexSet;

/// Fixed score for a file that terminates abruptly
const TERMINATION_SCORE: u32 = 2;

pub struct TerminationRule {
    patterns: RegexSet,
    config: Config,
}

impl TerminationRule {
    pub fn new(config: &Config) -> Result<Self, regex::Error> {
        Ok(Self {
            patterns: RegexSet::new(&config.termination_patterns)?,
            config: config.clone(),
        })
    }
}

impl SignalRule for TerminationRule {
    fn id(&self) -> &'static str {
        "panic_usage"
    }

    fn analyze(&self, unit: &SourceUnit) -> FileAnalysisResult {
        if self.config.is_entrypoint(&unit.path) {
            return FileAnalysisResult::invalid();
        }
        let file = unit.display_path();
        let evidence = unit
            .numbered_lines()
            .filter(|(_, line)| self.patterns.is_match(line))
            .map(|(n, _)| Evidence::new(file.as_str(), n))
            .collect();
        FileAnalysisResult::flagged(TERMINATION_SCORE, evidence)
    }
}
