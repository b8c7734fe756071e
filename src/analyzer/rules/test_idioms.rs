//! Testing idioms in `_test.go` files

use super::{SkillDetector, SourceUnit};
use crate::{Evidence, FileAnalysisResult, Skill};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

pub const SKILLS: &[Skill] = &[
    Skill {
        id: "go_unit_tests",
        name: "Writing unit tests using Go's testing package",
    },
    Skill {
        id: "testify_assertions",
        name: "Using Testify for enhanced assertions",
    },
    Skill {
        id: "table_driven_tests",
        name: "Implementing table-driven tests",
    },
    Skill {
        id: "mock_objects",
        name: "Using mock objects for testing",
    },
];

/// Score for a detected idiom. Presence only; detections do not stack.
const PRESENT: u32 = 1;

const MOCK_IMPORTS: &[&str] = &[
    "github.com/golang/mock/gomock",
    "go.uber.org/mock/gomock",
    "github.com/stretchr/testify/mock",
];

static TEST_FUNC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^func\s+Test\w*\s*\(\s*\w+\s+\*testing\.T\s*\)").expect("valid regex")
});
static TESTIFY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"github\.com/stretchr/testify/(assert|require|suite)""#).expect("valid regex")
});
static TABLE_SLICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\w+)\s*:=\s*\[\]\s*struct\s*\{").expect("valid regex")
});
static TABLE_LOOP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*for\s+_\s*,\s*\w+\s*:=\s*range\s+(\w+)\s*\{").expect("valid regex")
});

#[derive(Default)]
pub struct TestIdiomRule;

impl TestIdiomRule {
    pub fn new() -> Self {
        Self
    }

    fn table_driven(&self, unit: &SourceUnit) -> Vec<Evidence> {
        let mut tables: HashMap<&str, usize> = HashMap::new();
        let mut evidence = Vec::new();
        for (n, line) in unit.numbered_lines() {
            if let Some(caps) = TABLE_SLICE.captures(line) {
                if let Some(name) = caps.get(1) {
                    tables.insert(name.as_str(), n);
                }
            } else if let Some(caps) = TABLE_LOOP.captures(line) {
                let table_line = caps.get(1).and_then(|m| tables.get(m.as_str()));
                if let Some(&table_line) = table_line {
                    evidence.push(Evidence::at_line(table_line));
                    evidence.push(Evidence::at_line(n));
                }
            }
        }
        evidence
    }

    fn matching_lines(&self, unit: &SourceUnit, pred: impl Fn(&str) -> bool) -> Vec<Evidence> {
        unit.numbered_lines()
            .filter(|(_, line)| pred(line))
            .map(|(n, _)| Evidence::at_line(n))
            .collect()
    }
}

impl SkillDetector for TestIdiomRule {
    fn skills(&self) -> &'static [Skill] {
        SKILLS
    }

    fn detect(&self, unit: &SourceUnit) -> Vec<(&'static str, FileAnalysisResult)> {
        let unit_tests = self.matching_lines(unit, |l| TEST_FUNC.is_match(l));
        let testify = self.matching_lines(unit, |l| TESTIFY.is_match(l));
        let tables = self.table_driven(unit);
        let mocks = self.matching_lines(unit, |l| MOCK_IMPORTS.iter().any(|m| l.contains(m)));

        vec![
            ("go_unit_tests", FileAnalysisResult::flagged(PRESENT, unit_tests)),
            ("testify_assertions", FileAnalysisResult::flagged(PRESENT, testify)),
            ("table_driven_tests", FileAnalysisResult::flagged(PRESENT, tables)),
            ("mock_objects", FileAnalysisResult::flagged(PRESENT, mocks)),
        ]
    }
}
