//! REST-client idioms for the `fury_go-core` toolkit (rusty, httpclient, breaker)

use super::{SkillDetector, SourceUnit};
use crate::config::RestClientConfig;
use crate::parser::{Expr, GoSource};
use crate::{Evidence, FileAnalysisResult, Skill};
use std::collections::BTreeMap;

pub const SKILLS: &[Skill] = &[
    Skill {
        id: "rusty_pkg_usage",
        name: "Proper usage of rusty for making API requests",
    },
    Skill {
        id: "http_client_provided",
        name: "httpclient pkg Usage",
    },
    Skill {
        id: "rusty_error_handling",
        name: "Handling errors effectively in REST client requests",
    },
    Skill {
        id: "http_retry_mechanism",
        name: "Implementing retry mechanisms for HTTP requests",
    },
    Skill {
        id: "circuit_breaker_pattern",
        name: "Using circuit breaker pattern for REST requests",
    },
];

const PRESENT: u32 = 1;
const TOOLKIT: &str = "fury_go-core/pkg";

pub struct RestClientRule {
    /// (skill id, import fragments)
    imports: Vec<(&'static str, Vec<String>)>,
}

impl RestClientRule {
    pub fn new(config: &RestClientConfig) -> Self {
        let fragments = |pkg: &str| -> Vec<String> {
            config
                .orgs
                .iter()
                .map(|org| format!("{}/{}/{}", org.trim_end_matches('/'), TOOLKIT, pkg))
                .collect()
        };
        Self {
            imports: vec![
                ("rusty_pkg_usage", fragments("rusty")),
                ("http_client_provided", fragments("transport/httpclient")),
                ("circuit_breaker_pattern", fragments("breaker")),
            ],
        }
    }

    fn import_lines(&self, go: &GoSource, fragments: &[String]) -> Vec<usize> {
        go.imports
            .iter()
            .filter(|imp| fragments.iter().any(|f| imp.path.contains(f.as_str())))
            .map(|imp| imp.line)
            .collect()
    }

    /// `if x != nil { var e *rusty.Error; if errors.As(...) { ... } }`
    fn rusty_error_checks(&self, go: &GoSource) -> Vec<usize> {
        go.ifs
            .iter()
            .filter(|stmt| stmt.condition.is_not_nil_check())
            .filter(|stmt| stmt.body_var_types.iter().any(|t| t == "*rusty.Error"))
            .filter(|stmt| {
                stmt.body_conditions.iter().any(|cond| {
                    matches!(cond, Expr::Call(call) if call.callee.is("errors", "As"))
                })
            })
            .map(|stmt| stmt.line)
            .collect()
    }
}

impl SkillDetector for RestClientRule {
    fn skills(&self) -> &'static [Skill] {
        SKILLS
    }

    fn detect(&self, unit: &SourceUnit) -> Vec<(&'static str, FileAnalysisResult)> {
        let Some(go) = &unit.go else {
            return SKILLS
                .iter()
                .map(|s| (s.id, FileAnalysisResult::invalid()))
                .collect();
        };

        let mut lines: BTreeMap<&'static str, Vec<usize>> = BTreeMap::new();
        for (skill, fragments) in &self.imports {
            lines.insert(*skill, self.import_lines(go, fragments));
        }
        lines.insert(
            "http_retry_mechanism",
            go.calls
                .iter()
                .filter(|c| c.callee.is("httpclient", "NewRetryable"))
                .map(|c| c.line)
                .collect(),
        );
        lines.insert("rusty_error_handling", self.rusty_error_checks(go));

        SKILLS
            .iter()
            .map(|skill| {
                let evidence = lines
                    .remove(skill.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(Evidence::at_line)
                    .collect();
                (skill.id, FileAnalysisResult::flagged(PRESENT, evidence))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const CLIENT: &str = r#"package client

import (
	"errors"

	"github.com/melisource/fury_go-core/pkg/rusty"
	"github.com/mercadolibre/fury_go-core/pkg/transport/httpclient"
	"github.com/melisource/fury_go-core/pkg/breaker"
)

func New() *rusty.Endpoint {
	client := httpclient.NewRetryable(3)
	_ = breaker.New()
	return rusty.NewEndpoint(client, "/items")
}

func Get(e *rusty.Endpoint) error {
	_, err := e.Get(ctx)
	if err != nil {
		var rerr *rusty.Error
		if errors.As(err, &rerr) {
			return rerr
		}
		return err
	}
	return nil
}
"#;

    fn detect(source: &str) -> HashMap<&'static str, FileAnalysisResult> {
        RestClientRule::new(&RestClientConfig::default())
            .detect(&SourceUnit::from_text("internal/client/client.go", source))
            .into_iter()
            .collect()
    }

    fn lines(result: &FileAnalysisResult) -> Vec<usize> {
        result.evidence.iter().map(|e| e.line).collect()
    }

    #[test]
    fn detects_toolkit_usage() {
        let found = detect(CLIENT);
        assert_eq!(lines(&found["rusty_pkg_usage"]), vec![6]);
        assert_eq!(lines(&found["http_client_provided"]), vec![7]);
        assert_eq!(lines(&found["circuit_breaker_pattern"]), vec![8]);
        assert_eq!(lines(&found["http_retry_mechanism"]), vec![12]);
        assert_eq!(lines(&found["rusty_error_handling"]), vec![19]);
        assert!(found.values().all(|r| r.score == 1));
    }

    #[test]
    fn other_orgs_are_ignored() {
        let found = detect("package c\n\nimport \"github.com/acme/fury_go-core/pkg/rusty\"\n");
        assert!(!found["rusty_pkg_usage"].is_valid);
    }

    #[test]
    fn unparsable_file_yields_nothing() {
        let found = detect("package c\nimport (");
        assert_eq!(found.len(), SKILLS.len());
        assert!(found.values().all(|r| !r.is_valid));
    }
}
