//! Analyzer module - signal rules, scoring and per-author aggregation

pub mod aggregate;
pub mod rules;
pub mod scoring;

pub use aggregate::{Aggregator, EmitPolicy, SkillData};
pub use rules::{SignalRule, SkillDetector, SourceUnit};
