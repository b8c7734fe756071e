//! Shared tree-sitter query library for Go extraction.
//!
//! Compiles S-expression queries once and reuses them across files.
//! Declarations with a fixed shape (imports, struct type specs) go through
//! queries; nested constructs (returns, calls, if blocks) use tree walks in
//! `source_file`.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Mutex;
use tree_sitter::{Language, Query, QueryCursor, StreamingIterator, Tree};

/// Cache of compiled queries per query id. Compile once, reuse per file.
pub struct QueryCache {
    ts: Mutex<HashMap<QueryId, Query>>,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum QueryId {
    /// import "path" / import alias "path"
    ImportSpec,
    /// type Name struct { ... }
    StructSpec,
}

/// One capture from a query match
#[derive(Debug)]
pub struct QueryCaptureInfo {
    pub name: String,
    /// 1-indexed (line, column)
    pub start_point: (usize, usize),
    pub text: String,
}

impl QueryCache {
    pub fn new() -> Self {
        Self {
            ts: Mutex::new(HashMap::new()),
        }
    }

    fn compile(lang: &Language, query_id: QueryId) -> Result<Query, tree_sitter::QueryError> {
        let source = match query_id {
            QueryId::ImportSpec => {
                r#"
                (import_spec
                  name: (_)? @alias
                  path: (_) @path) @spec
                "#
            }
            QueryId::StructSpec => {
                r#"
                (type_spec
                  name: (type_identifier) @name
                  type: (struct_type)) @spec
                "#
            }
        };
        Query::new(lang, source)
    }

    /// Run a cached query on the tree. Returns list of captures per match.
    pub fn run_cached_query(
        &self,
        source: &str,
        tree: &Tree,
        lang: &Language,
        query_id: QueryId,
    ) -> Result<Vec<Vec<QueryCaptureInfo>>, tree_sitter::QueryError> {
        let mut guard = self.ts.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let query: &Query = match guard.entry(query_id) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => e.insert(Self::compile(lang, query_id)?),
        };

        let mut cursor = QueryCursor::new();
        let mut results = Vec::new();
        let mut matches = cursor.matches(query, tree.root_node(), source.as_bytes());
        while let Some(m) = matches.next() {
            let captures = m
                .captures
                .iter()
                .map(|cap| {
                    let pos = cap.node.start_position();
                    QueryCaptureInfo {
                        name: query.capture_names()[cap.index as usize].to_string(),
                        start_point: (pos.row + 1, pos.column + 1),
                        text: source
                            .get(cap.node.byte_range())
                            .unwrap_or_default()
                            .to_string(),
                    }
                })
                .collect();
            results.push(captures);
        }
        Ok(results)
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Global query cache (compile once per process).
pub fn global_query_cache() -> &'static QueryCache {
    use std::sync::OnceLock;
    static CACHE: OnceLock<QueryCache> = OnceLock::new();
    CACHE.get_or_init(QueryCache::new)
}
