//! Error wrapping: returned errors should carry context.
//!
//! A return statement qualifies when one of its results is an error-typed
//! identifier. It counts as wrapped when the same function also returns that
//! identifier through a wrap call such as `fmt.Errorf("...: %w", err)`.

use super::{SignalRule, SourceUnit};
use crate::analyzer::scoring::wrap_ratio_score;
use crate::config::Config;
use crate::parser::{CallExpr, Expr, FunctionDecl};
use crate::{Evidence, FileAnalysisResult};
use tracing::debug;

pub struct ErrorWrapRule {
    config: Config,
}

impl ErrorWrapRule {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }

    fn is_wrap_call(&self, call: &CallExpr) -> bool {
        let qualified = call.callee.qualified();
        self.config
            .wrap_functions
            .iter()
            .any(|w| *w == qualified)
    }

    /// True when some return in `func` passes `ident` straight into a wrap call
    fn is_wrapped(&self, func: &FunctionDecl, ident: &str) -> bool {
        func.returns.iter().any(|ret| {
            ret.results.iter().any(|expr| match expr {
                Expr::Call(call) => {
                    self.is_wrap_call(call)
                        && call.args.iter().any(|arg| arg.as_ident() == Some(ident))
                }
                _ => false,
            })
        })
    }
}

impl SignalRule for ErrorWrapRule {
    fn id(&self) -> &'static str {
        "error_wrap"
    }

    fn analyze(&self, unit: &SourceUnit) -> FileAnalysisResult {
        if self.config.is_entrypoint(&unit.path) {
            return FileAnalysisResult::invalid();
        }
        let Some(go) = &unit.go else {
            return FileAnalysisResult::invalid();
        };

        let mut total = 0;
        let mut wrapped = 0;
        let mut evidence = Vec::new();

        for func in &go.functions {
            for ret in &func.returns {
                for ident in ret.results.iter().filter_map(Expr::as_ident) {
                    if !func.is_error_ident(ident) {
                        continue;
                    }
                    total += 1;
                    if self.is_wrapped(func, ident) {
                        wrapped += 1;
                    } else {
                        evidence.push(Evidence::new(unit.display_path(), ret.line));
                    }
                }
            }
        }

        debug!(file = %unit.path.display(), total, wrapped, "error wrap ratio");
        match wrap_ratio_score(wrapped, total) {
            Some(score) => FileAnalysisResult::valid(score, evidence),
            None => FileAnalysisResult::invalid(),
        }
    }
}
