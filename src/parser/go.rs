//! Go parser using tree-sitter

use crate::ParseError;
use tree_sitter::{Language, Parser, Tree};

/// Parser for Go files using tree-sitter
pub struct GoParser {
    parser: Parser,
}

impl GoParser {
    /// Create a new Go parser
    pub fn new() -> Result<Self, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&Self::language())
            .map_err(|e| ParseError::Language(e.to_string()))?;
        Ok(Self { parser })
    }

    /// Parse source code into a syntax tree. The tree may contain error nodes;
    /// callers decide whether that makes the file unusable.
    pub fn parse(&mut self, source: &str) -> Option<Tree> {
        self.parser.parse(source, None)
    }

    /// Get the tree-sitter language for Go
    pub fn language() -> Language {
        tree_sitter_go::LANGUAGE.into()
    }
}
