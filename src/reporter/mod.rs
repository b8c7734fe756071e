//! Reporter module for output formatting

pub mod json;

pub use json::JsonReporter;
