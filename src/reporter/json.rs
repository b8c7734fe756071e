//! JSON reporter for machine-readable output

use crate::Report;

/// Reporter for JSON output
pub struct JsonReporter {
    /// Whether to pretty-print JSON
    pretty: bool,
}

impl JsonReporter {
    /// Create a new JSON reporter
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// Enable pretty-printing (two-space indent)
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// Render a monitor report: a flat array, or an object keyed by metric id
    pub fn report(&self, report: &Report) -> serde_json::Result<String> {
        if self.pretty {
            serde_json::to_string_pretty(report)
        } else {
            serde_json::to_string(report)
        }
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Evidence, Metric};

    fn metric(id: &str, author: &str) -> Metric {
        Metric::new(id, author, 3).with_evidence(vec![Evidence::new("internal/a.go", 7)
            .with_commit("4f1c2d0")])
    }

    #[test]
    fn list_report_is_an_array() {
        let json = JsonReporter::new()
            .report(&Report::List(vec![metric("coverage", "Ana <ana@x.io>")]))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["metric_id"], "coverage");
        assert_eq!(value[0]["git_author"], "Ana <ana@x.io>");
        assert_eq!(value[0]["score"], "3");
        assert_eq!(value[0]["evidence"][0]["commit_id"], "4f1c2d0");
    }

    #[test]
    fn keyed_report_is_an_object() {
        let report = Report::keyed(vec![metric("error_wrap", "a"), metric("panic_usage", "a")]);
        let value: serde_json::Value =
            serde_json::from_str(&JsonReporter::new().report(&report).unwrap()).unwrap();
        assert_eq!(value["error_wrap"][0]["git_author"], "a");
        assert_eq!(value["panic_usage"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn pretty_uses_two_space_indent() {
        let json = JsonReporter::new()
            .pretty()
            .report(&Report::List(vec![metric("coverage", "a")]))
            .unwrap();
        assert!(json.starts_with("[\n  {\n    \"metric_id\""));
    }
}
