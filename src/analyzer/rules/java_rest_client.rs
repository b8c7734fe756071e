//! MeliRestClient / RESTPool idioms in Java sources

use super::{SkillDetector, SourceUnit};
use crate::{Evidence, FileAnalysisResult, Skill};
use regex::Regex;
use std::sync::LazyLock;

pub const SKILLS: &[Skill] = &[
    Skill {
        id: "rest_client_usage",
        name: "REST Client Usage",
    },
    Skill {
        id: "rest_pool_usage",
        name: "REST Pool Usage",
    },
    Skill {
        id: "error_handling",
        name: "Handling exceptions effectively in REST client requests",
    },
    Skill {
        id: "retry_strategy_usage",
        name: "Implementing retry mechanisms for HTTP requests",
    },
];

const PRESENT: u32 = 1;

/// (skill id, line pattern)
static PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("rest_client_usage", r"import\s+.*com\.mercadolibre\.restclient\.MeliRestClient"),
        ("rest_client_usage", r"MeliRestClient\.builder\(\)"),
        ("rest_pool_usage", r"import\s+.*com\.mercadolibre\.restclient\.RESTPool"),
        ("rest_pool_usage", r"RESTPool\.builder\(\)"),
        ("error_handling", r"catch\s*\((RestException|ParseException)\s*(\w+)\)"),
        ("retry_strategy_usage", r"withRetryStrategy\([^)]*\)"),
    ]
    .into_iter()
    .map(|(id, p)| (id, Regex::new(p).expect("valid regex")))
    .collect()
});

#[derive(Default)]
pub struct JavaRestClientRule;

impl JavaRestClientRule {
    pub fn new() -> Self {
        Self
    }
}

impl SkillDetector for JavaRestClientRule {
    fn skills(&self) -> &'static [Skill] {
        SKILLS
    }

    fn detect(&self, unit: &SourceUnit) -> Vec<(&'static str, FileAnalysisResult)> {
        SKILLS
            .iter()
            .map(|skill| {
                let evidence = unit
                    .numbered_lines()
                    .filter(|(_, line)| {
                        PATTERNS
                            .iter()
                            .any(|(id, re)| *id == skill.id && re.is_match(line))
                    })
                    .map(|(n, _)| Evidence::at_line(n))
                    .collect();
                (skill.id, FileAnalysisResult::flagged(PRESENT, evidence))
            })
            .collect()
    }
}
