//! Per-author, per-skill accumulation of file results

use crate::{Evidence, FileAnalysisResult, Metric, Skill};
use std::collections::BTreeMap;
use tracing::debug;

/// Which (author, skill) pairs end up in the report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitPolicy {
    /// Every declared skill for every seen author; unobserved skills score 0
    EmitAll,
    /// Only pairs with at least one valid observation
    OmitAbsent,
}

/// Best score so far for one (author, skill) pair and its supporting evidence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillData {
    pub score: u32,
    pub evidence: Vec<Evidence>,
}

impl SkillData {
    /// Higher score replaces, equal score appends, lower score is dropped
    fn merge(&mut self, score: u32, evidence: Vec<Evidence>) {
        if score > self.score {
            self.score = score;
            self.evidence = evidence;
        } else if score == self.score {
            self.evidence.extend(evidence);
        }
    }
}

/// Reduces per-file results into one metric per (skill, author)
pub struct Aggregator {
    skills: Vec<Skill>,
    policy: EmitPolicy,
    authors: BTreeMap<String, BTreeMap<&'static str, SkillData>>,
}

impl Aggregator {
    pub fn new(skills: &[Skill], policy: EmitPolicy) -> Self {
        Self {
            skills: skills.to_vec(),
            policy,
            authors: BTreeMap::new(),
        }
    }

    /// Register an author even if none of their files produce a signal
    pub fn see(&mut self, author: &str) {
        self.authors.entry(author.to_string()).or_default();
    }

    /// Fold one file's result for `skill_id` into the author's record.
    /// Evidence is stamped with the file and commit before it is stored.
    pub fn observe(
        &mut self,
        author: &str,
        commit_id: Option<&str>,
        file: &str,
        skill_id: &str,
        result: &FileAnalysisResult,
    ) {
        let Some(skill) = self.skills.iter().find(|s| s.id == skill_id) else {
            debug!(skill_id, "ignoring observation for undeclared skill");
            return;
        };
        let skill_key = skill.id;
        let skills = self.authors.entry(author.to_string()).or_default();
        if !result.is_valid {
            return;
        }

        let evidence: Vec<Evidence> = result
            .evidence
            .iter()
            .cloned()
            .map(|mut ev| {
                if ev.file.is_empty() {
                    ev.file = file.to_string();
                }
                if ev.commit_id.is_none() {
                    ev.commit_id = commit_id.map(str::to_string);
                }
                ev
            })
            .collect();

        match skills.get_mut(skill_key) {
            Some(data) => data.merge(result.score, evidence),
            None => {
                skills.insert(
                    skill_key,
                    SkillData {
                        score: result.score,
                        evidence,
                    },
                );
            }
        }
    }

    /// Current record for a pair, if any
    pub fn get(&self, author: &str, skill_id: &str) -> Option<&SkillData> {
        self.authors.get(author)?.get(skill_id)
    }

    /// Final metrics, ordered by declared skill then author
    pub fn into_metrics(self) -> Vec<Metric> {
        let mut metrics = Vec::new();
        for skill in &self.skills {
            for (author, skills) in &self.authors {
                match (skills.get(skill.id), self.policy) {
                    (Some(data), _) => metrics.push(
                        Metric::new(skill.id, author.as_str(), data.score)
                            .with_evidence(data.evidence.clone()),
                    ),
                    (None, EmitPolicy::EmitAll) => {
                        metrics.push(Metric::new(skill.id, author.as_str(), 0))
                    }
                    (None, EmitPolicy::OmitAbsent) => {}
                }
            }
        }
        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SKILLS: &[Skill] = &[
        Skill {
            id: "go_unit_tests",
            name: "Go unit tests",
        },
        Skill {
            id: "mock_objects",
            name: "Mock objects",
        },
    ];

    fn result(score: u32, line: usize) -> FileAnalysisResult {
        FileAnalysisResult::valid(score, vec![Evidence::at_line(line)])
    }

    #[test]
    fn higher_score_replaces_evidence() {
        let mut agg = Aggregator::new(SKILLS, EmitPolicy::OmitAbsent);
        agg.observe("ana", Some("c1"), "a.go", "go_unit_tests", &result(1, 3));
        agg.observe("ana", Some("c2"), "b.go", "go_unit_tests", &result(2, 7));
        let data = agg.get("ana", "go_unit_tests").unwrap();
        assert_eq!(data.score, 2);
        assert_eq!(data.evidence.len(), 1);
        assert_eq!(data.evidence[0].file, "b.go");
        assert_eq!(data.evidence[0].commit_id.as_deref(), Some("c2"));
    }

    #[test]
    fn equal_score_appends_and_lower_is_dropped() {
        let mut agg = Aggregator::new(SKILLS, EmitPolicy::OmitAbsent);
        agg.observe("ana", Some("c1"), "a.go", "go_unit_tests", &result(2, 3));
        agg.observe("ana", Some("c2"), "b.go", "go_unit_tests", &result(2, 9));
        agg.observe("ana", Some("c3"), "c.go", "go_unit_tests", &result(1, 4));
        let data = agg.get("ana", "go_unit_tests").unwrap();
        assert_eq!(data.score, 2);
        let files: Vec<&str> = data.evidence.iter().map(|e| e.file.as_str()).collect();
        assert_eq!(files, vec!["a.go", "b.go"]);
    }

    #[test]
    fn emit_all_fills_missing_skills_with_zero() {
        let mut agg = Aggregator::new(SKILLS, EmitPolicy::EmitAll);
        agg.observe("bob", None, "x_test.go", "go_unit_tests", &result(1, 5));
        agg.see("ana");
        let metrics = agg.into_metrics();
        let pairs: Vec<(&str, &str, &str)> = metrics
            .iter()
            .map(|m| (m.metric_id.as_str(), m.git_author.as_str(), m.score.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("go_unit_tests", "ana", "0"),
                ("go_unit_tests", "bob", "1"),
                ("mock_objects", "ana", "0"),
                ("mock_objects", "bob", "0"),
            ]
        );
    }

    #[test]
    fn omit_absent_skips_invalid_results() {
        let mut agg = Aggregator::new(SKILLS, EmitPolicy::OmitAbsent);
        agg.observe("ana", None, "a.go", "go_unit_tests", &FileAnalysisResult::invalid());
        assert!(agg.into_metrics().is_empty());
    }
}
