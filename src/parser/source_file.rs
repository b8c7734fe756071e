//! Go source model - functions, returns, calls, if blocks, type declarations

use super::queries::{global_query_cache, QueryId};
use super::GoParser;
use crate::ParseError;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Tree};
use tracing::debug;

/// Callee of a call expression: `qualifier.name` or bare `name`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callee {
    /// Operand of a selector (`fmt` in `fmt.Errorf`, `a.b` in `a.b.C`)
    pub qualifier: Option<String>,
    pub name: String,
}

impl Callee {
    /// True for `qualifier.name` with exactly this qualifier and name
    pub fn is(&self, qualifier: &str, name: &str) -> bool {
        self.qualifier.as_deref() == Some(qualifier) && self.name == name
    }

    /// Dotted form, e.g. `fmt.Errorf`
    pub fn qualified(&self) -> String {
        match &self.qualifier {
            Some(q) => format!("{}.{}", q, self.name),
            None => self.name.clone(),
        }
    }
}

/// A call expression with its arguments
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub callee: Callee,
    pub args: Vec<Expr>,
    /// 1-indexed line
    pub line: usize,
}

/// Expression shapes the matchers care about
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(String),
    Nil,
    Call(CallExpr),
    Binary {
        op: String,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Anything else, kept as source text
    Other(String),
}

impl Expr {
    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Expr::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// `x != nil` or `nil != x` (exactly one side nil)
    pub fn is_not_nil_check(&self) -> bool {
        match self {
            Expr::Binary { op, left, right } if op == "!=" => {
                matches!(**left, Expr::Nil) != matches!(**right, Expr::Nil)
            }
            _ => false,
        }
    }
}

/// A return statement and its result expressions
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub line: usize,
    pub results: Vec<Expr>,
}

/// Method receiver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receiver {
    /// Base type name without pointer or type arguments
    pub type_name: String,
    pub pointer: bool,
}

/// A function or method declaration
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: String,
    pub receiver: Option<Receiver>,
    pub line: usize,
    /// Identifiers known to hold an `error` in this function
    pub error_idents: BTreeSet<String>,
    /// Every return statement in the body, closures included
    pub returns: Vec<ReturnStmt>,
}

impl FunctionDecl {
    /// `err` by convention; any other name only when declared with type `error`
    pub fn is_error_ident(&self, name: &str) -> bool {
        name == "err" || self.error_idents.contains(name)
    }
}

/// An if statement with what its consequence block declares and tests
#[derive(Debug, Clone)]
pub struct IfStmt {
    pub line: usize,
    pub condition: Expr,
    /// Types of `var` declarations anywhere in the consequence (whitespace-free text)
    pub body_var_types: Vec<String>,
    /// Conditions of if statements nested anywhere in the consequence
    pub body_conditions: Vec<Expr>,
}

/// An import spec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Unquoted import path
    pub path: String,
    pub alias: Option<String>,
    pub line: usize,
}

/// `type Name struct { ... }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDecl {
    pub name: String,
    pub line: usize,
}

/// `type Name interface { ... }` with its method names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDecl {
    pub name: String,
    pub methods: BTreeSet<String>,
    pub line: usize,
}

/// Structured view of one Go file
#[derive(Debug, Clone)]
pub struct GoSource {
    pub path: PathBuf,
    pub package: Option<String>,
    pub imports: Vec<ImportSpec>,
    pub functions: Vec<FunctionDecl>,
    /// Every call expression in the file
    pub calls: Vec<CallExpr>,
    /// Every if statement in the file
    pub ifs: Vec<IfStmt>,
    pub structs: Vec<StructDecl>,
    pub interfaces: Vec<InterfaceDecl>,
}

impl GoSource {
    /// Parse Go source. Syntax errors yield `ParseError::Syntax`; callers treat
    /// that as "no signal" for the file.
    pub fn parse(source: &str, path: &Path) -> Result<Self, ParseError> {
        let mut parser = GoParser::new()?;
        let tree = parser.parse(source).ok_or_else(|| ParseError::NoTree {
            path: path.to_path_buf(),
        })?;

        let root = tree.root_node();
        if root.has_error() {
            let line = first_error_line(root).unwrap_or(1);
            return Err(ParseError::Syntax {
                path: path.to_path_buf(),
                line,
            });
        }

        let extractor = GoSourceParser::new(source);
        let parsed = GoSource {
            path: path.to_path_buf(),
            package: extractor.extract_package(&tree),
            imports: extractor.extract_imports(&tree),
            functions: extractor.extract_functions(&tree),
            calls: extractor.extract_calls(&tree),
            ifs: extractor.extract_ifs(&tree),
            structs: extractor.extract_structs(&tree),
            interfaces: extractor.extract_interfaces(&tree),
        };
        debug!(
            path = %path.display(),
            functions = parsed.functions.len(),
            imports = parsed.imports.len(),
            "parsed Go source"
        );
        Ok(parsed)
    }

    /// Method names declared with `type_name` as receiver
    pub fn methods_of<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.functions
            .iter()
            .filter(move |f| {
                f.receiver
                    .as_ref()
                    .is_some_and(|r| r.type_name == type_name)
            })
            .map(|f| f.name.as_str())
    }
}

fn first_error_line(node: Node) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position().row + 1);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() {
            if let Some(line) = first_error_line(child) {
                return Some(line);
            }
        }
    }
    None
}

fn line_of(node: Node) -> usize {
    node.start_position().row + 1
}

/// Extracts the `GoSource` model from a tree
pub struct GoSourceParser<'a> {
    source: &'a str,
}

impl<'a> GoSourceParser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }

    pub fn extract_package(&self, tree: &Tree) -> Option<String> {
        let root = tree.root_node();
        let mut cursor = root.walk();
        let clause = root
            .named_children(&mut cursor)
            .find(|n| n.kind() == "package_clause")?;
        let mut inner = clause.walk();
        let name = clause
            .named_children(&mut inner)
            .find(|n| n.kind() == "package_identifier")?;
        Some(self.node_text(name).to_string())
    }

    pub fn extract_imports(&self, tree: &Tree) -> Vec<ImportSpec> {
        let lang = GoParser::language();
        let Ok(matches) =
            global_query_cache().run_cached_query(self.source, tree, &lang, QueryId::ImportSpec)
        else {
            return Vec::new();
        };

        let mut imports: Vec<ImportSpec> = matches
            .into_iter()
            .filter_map(|caps| {
                let path = caps.iter().find(|c| c.name == "path")?;
                let alias = caps.iter().find(|c| c.name == "alias").map(|c| c.text.clone());
                Some(ImportSpec {
                    path: unquote(&path.text),
                    alias,
                    line: path.start_point.0,
                })
            })
            .collect();
        imports.sort_by_key(|i| i.line);
        imports
    }

    pub fn extract_structs(&self, tree: &Tree) -> Vec<StructDecl> {
        let lang = GoParser::language();
        let Ok(matches) =
            global_query_cache().run_cached_query(self.source, tree, &lang, QueryId::StructSpec)
        else {
            return Vec::new();
        };

        matches
            .into_iter()
            .filter_map(|caps| {
                let name = caps.iter().find(|c| c.name == "name")?;
                let spec = caps.iter().find(|c| c.name == "spec")?;
                Some(StructDecl {
                    name: name.text.clone(),
                    line: spec.start_point.0,
                })
            })
            .collect()
    }

    pub fn extract_interfaces(&self, tree: &Tree) -> Vec<InterfaceDecl> {
        let mut out = Vec::new();
        self.visit_for_interfaces(tree.root_node(), &mut out);
        out
    }

    fn visit_for_interfaces(&self, node: Node, out: &mut Vec<InterfaceDecl>) {
        if node.kind() == "type_spec" {
            let name = node.child_by_field_name("name");
            let ty = node.child_by_field_name("type");
            if let (Some(name), Some(ty)) = (name, ty) {
                if ty.kind() == "interface_type" {
                    let mut methods = BTreeSet::new();
                    let mut cursor = ty.walk();
                    for elem in ty.named_children(&mut cursor) {
                        if matches!(elem.kind(), "method_elem" | "method_spec") {
                            if let Some(m) = elem.child_by_field_name("name") {
                                methods.insert(self.node_text(m).to_string());
                            }
                        }
                    }
                    out.push(InterfaceDecl {
                        name: self.node_text(name).to_string(),
                        methods,
                        line: line_of(node),
                    });
                }
            }
        }
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.visit_for_interfaces(child, out);
        }
    }

    pub fn extract_functions(&self, tree: &Tree) -> Vec<FunctionDecl> {
        let root = tree.root_node();
        let mut cursor = root.walk();
        root.named_children(&mut cursor)
            .filter(|n| matches!(n.kind(), "function_declaration" | "method_declaration"))
            .filter_map(|n| self.parse_function(n))
            .collect()
    }

    fn parse_function(&self, node: Node) -> Option<FunctionDecl> {
        let name = self.node_text(node.child_by_field_name("name")?).to_string();
        let receiver = node
            .child_by_field_name("receiver")
            .and_then(|r| self.parse_receiver(r));

        let mut error_idents = BTreeSet::new();
        if let Some(params) = node.child_by_field_name("parameters") {
            self.collect_error_params(params, &mut error_idents);
        }
        if let Some(result) = node.child_by_field_name("result") {
            if result.kind() == "parameter_list" {
                self.collect_error_params(result, &mut error_idents);
            }
        }

        let mut returns = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            self.visit_for_error_vars(body, &mut error_idents);
            self.visit_for_returns(body, &mut returns);
        }

        Some(FunctionDecl {
            name,
            receiver,
            line: line_of(node),
            error_idents,
            returns,
        })
    }

    fn parse_receiver(&self, receiver: Node) -> Option<Receiver> {
        let mut cursor = receiver.walk();
        let decl = receiver
            .named_children(&mut cursor)
            .find(|n| n.kind() == "parameter_declaration")?;
        let ty = decl.child_by_field_name("type")?;
        let text = self.node_text(ty).trim();
        let pointer = text.starts_with('*');
        let base = text.trim_start_matches('*').trim();
        // Generic receivers: `*Repo[T]`
        let base = base.split('[').next().unwrap_or(base).trim();
        Some(Receiver {
            type_name: base.to_string(),
            pointer,
        })
    }

    /// Names declared as `error` in a parameter or named-result list
    fn collect_error_params(&self, list: Node, out: &mut BTreeSet<String>) {
        let mut cursor = list.walk();
        for decl in list.named_children(&mut cursor) {
            if decl.kind() != "parameter_declaration" {
                continue;
            }
            let is_error = decl
                .child_by_field_name("type")
                .is_some_and(|t| self.node_text(t) == "error");
            if !is_error {
                continue;
            }
            let mut names = decl.walk();
            for name in decl.children_by_field_name("name", &mut names) {
                out.insert(self.node_text(name).to_string());
            }
        }
    }

    /// `var x error` anywhere in the body
    fn visit_for_error_vars(&self, node: Node, out: &mut BTreeSet<String>) {
        if node.kind() == "var_spec" {
            let is_error = node
                .child_by_field_name("type")
                .is_some_and(|t| self.node_text(t) == "error");
            if is_error {
                let mut names = node.walk();
                for name in node.children_by_field_name("name", &mut names) {
                    out.insert(self.node_text(name).to_string());
                }
            }
        }
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.visit_for_error_vars(child, out);
        }
    }

    fn visit_for_returns(&self, node: Node, out: &mut Vec<ReturnStmt>) {
        if node.kind() == "return_statement" {
            let mut results = Vec::new();
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                if child.kind() == "expression_list" {
                    let mut inner = child.walk();
                    for expr in child.named_children(&mut inner) {
                        if expr.kind() != "comment" {
                            results.push(self.parse_expr(expr));
                        }
                    }
                } else if child.kind() != "comment" {
                    results.push(self.parse_expr(child));
                }
            }
            out.push(ReturnStmt {
                line: line_of(node),
                results,
            });
        }
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.visit_for_returns(child, out);
        }
    }

    pub fn extract_calls(&self, tree: &Tree) -> Vec<CallExpr> {
        let mut out = Vec::new();
        self.visit_for_calls(tree.root_node(), &mut out);
        out
    }

    fn visit_for_calls(&self, node: Node, out: &mut Vec<CallExpr>) {
        if node.kind() == "call_expression" {
            out.push(self.parse_call(node));
        }
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.visit_for_calls(child, out);
        }
    }

    pub fn extract_ifs(&self, tree: &Tree) -> Vec<IfStmt> {
        let mut out = Vec::new();
        self.visit_for_ifs(tree.root_node(), &mut out);
        out
    }

    fn visit_for_ifs(&self, node: Node, out: &mut Vec<IfStmt>) {
        if node.kind() == "if_statement" {
            if let Some(cond) = node.child_by_field_name("condition") {
                let mut body_var_types = Vec::new();
                let mut body_conditions = Vec::new();
                if let Some(body) = node.child_by_field_name("consequence") {
                    self.visit_if_body(body, &mut body_var_types, &mut body_conditions);
                }
                out.push(IfStmt {
                    line: line_of(node),
                    condition: self.parse_expr(cond),
                    body_var_types,
                    body_conditions,
                });
            }
        }
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.visit_for_ifs(child, out);
        }
    }

    fn visit_if_body(&self, node: Node, var_types: &mut Vec<String>, conditions: &mut Vec<Expr>) {
        match node.kind() {
            "var_spec" => {
                if let Some(ty) = node.child_by_field_name("type") {
                    var_types.push(compact(self.node_text(ty)));
                }
            }
            "if_statement" => {
                if let Some(cond) = node.child_by_field_name("condition") {
                    conditions.push(self.parse_expr(cond));
                }
            }
            _ => {}
        }
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.visit_if_body(child, var_types, conditions);
        }
    }

    fn parse_expr(&self, node: Node) -> Expr {
        match node.kind() {
            "identifier" => Expr::Ident(self.node_text(node).to_string()),
            "nil" => Expr::Nil,
            "call_expression" => Expr::Call(self.parse_call(node)),
            "parenthesized_expression" => {
                let mut cursor = node.walk();
                let inner = node.named_children(&mut cursor).next();
                match inner {
                    Some(inner) => self.parse_expr(inner),
                    None => Expr::Other(self.node_text(node).to_string()),
                }
            }
            "binary_expression" => {
                let left = node.child_by_field_name("left");
                let right = node.child_by_field_name("right");
                let op = node
                    .child_by_field_name("operator")
                    .map(|o| self.node_text(o).to_string());
                match (left, op, right) {
                    (Some(l), Some(op), Some(r)) => Expr::Binary {
                        op,
                        left: Box::new(self.parse_expr(l)),
                        right: Box::new(self.parse_expr(r)),
                    },
                    _ => Expr::Other(self.node_text(node).to_string()),
                }
            }
            _ => Expr::Other(self.node_text(node).to_string()),
        }
    }

    fn parse_call(&self, node: Node) -> CallExpr {
        let callee = match node.child_by_field_name("function") {
            Some(f) if f.kind() == "selector_expression" => Callee {
                qualifier: f
                    .child_by_field_name("operand")
                    .map(|o| self.node_text(o).to_string()),
                name: f
                    .child_by_field_name("field")
                    .map(|n| self.node_text(n).to_string())
                    .unwrap_or_default(),
            },
            Some(f) => Callee {
                qualifier: None,
                name: self.node_text(f).to_string(),
            },
            None => Callee {
                qualifier: None,
                name: String::new(),
            },
        };

        let mut args = Vec::new();
        if let Some(list) = node.child_by_field_name("arguments") {
            let mut cursor = list.walk();
            for arg in list.named_children(&mut cursor) {
                if arg.kind() != "comment" {
                    args.push(self.parse_expr(arg));
                }
            }
        }

        CallExpr {
            callee,
            args,
            line: line_of(node),
        }
    }

    fn node_text(&self, node: Node) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }
}

fn unquote(text: &str) -> String {
    text.trim_matches(|c| c == '"' || c == '`').to_string()
}

fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> GoSource {
        GoSource::parse(source, Path::new("x.go")).unwrap()
    }

    #[test]
    fn test_extract_package_and_imports() {
        let src = parse(
            r#"package store

import (
	"fmt"
	pg "github.com/lib/pq"
)
"#,
        );
        assert_eq!(src.package.as_deref(), Some("store"));
        assert_eq!(src.imports.len(), 2);
        assert_eq!(src.imports[0].path, "fmt");
        assert_eq!(src.imports[0].line, 4);
        assert_eq!(src.imports[1].alias.as_deref(), Some("pg"));
    }

    #[test]
    fn test_extract_returns_with_lines() {
        let src = parse(
            r#"package x

func f() (int, error) {
	v, err := g()
	if err != nil {
		return 0, err
	}
	return v, nil
}
"#,
        );
        let f = &src.functions[0];
        assert_eq!(f.name, "f");
        assert_eq!(f.returns.len(), 2);
        assert_eq!(f.returns[0].line, 6);
        assert_eq!(f.returns[0].results[1], Expr::Ident("err".to_string()));
        assert_eq!(f.returns[1].results[1], Expr::Nil);
    }

    #[test]
    fn test_wrap_call_arguments() {
        let src = parse(
            r#"package x

import "fmt"

func f() error {
	err := g()
	return fmt.Errorf("f: %w", err)
}
"#,
        );
        let ret = &src.functions[0].returns[0];
        let Expr::Call(call) = &ret.results[0] else {
            panic!("expected call");
        };
        assert!(call.callee.is("fmt", "Errorf"));
        assert_eq!(call.args[1], Expr::Ident("err".to_string()));
    }

    #[test]
    fn test_error_idents_from_signature_and_vars() {
        let src = parse(
            r#"package x

func f(cause error) (n int, failure error) {
	var last error
	return 0, last
}
"#,
        );
        let f = &src.functions[0];
        assert!(f.is_error_ident("cause"));
        assert!(f.is_error_ident("failure"));
        assert!(f.is_error_ident("last"));
        assert!(f.is_error_ident("err"));
        assert!(!f.is_error_ident("errRead"));
        assert!(!f.is_error_ident("n"));
        assert!(!f.is_error_ident("errors"));
    }

    #[test]
    fn test_receivers_and_methods() {
        let src = parse(
            r#"package adapters

type Repo struct{}

func (r *Repo) Save() error { return nil }
func (r Repo) Find() {}
func helper() {}
"#,
        );
        assert_eq!(src.structs, vec![StructDecl { name: "Repo".to_string(), line: 3 }]);
        let methods: BTreeSet<&str> = src.methods_of("Repo").collect();
        assert_eq!(methods, BTreeSet::from(["Save", "Find"]));
        let save = src.functions.iter().find(|f| f.name == "Save").unwrap();
        assert!(save.receiver.as_ref().unwrap().pointer);
    }

    #[test]
    fn test_interfaces() {
        let src = parse(
            r#"package ports

type ItemRepository interface {
	Save(item Item) error
	FindByID(id int) (*Item, error)
}
"#,
        );
        assert_eq!(src.interfaces.len(), 1);
        let iface = &src.interfaces[0];
        assert_eq!(iface.name, "ItemRepository");
        assert_eq!(iface.line, 3);
        assert_eq!(
            iface.methods,
            BTreeSet::from(["Save".to_string(), "FindByID".to_string()])
        );
    }

    #[test]
    fn test_if_blocks() {
        let src = parse(
            r#"package x

func f() {
	if err != nil {
		var rerr *rusty.Error
		if errors.As(err, &rerr) {
			return
		}
	}
}
"#,
        );
        let outer = src.ifs.iter().find(|i| i.line == 4).unwrap();
        assert!(outer.condition.is_not_nil_check());
        assert_eq!(outer.body_var_types, vec!["*rusty.Error".to_string()]);
        let Expr::Call(call) = &outer.body_conditions[0] else {
            panic!("expected call condition");
        };
        assert!(call.callee.is("errors", "As"));
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let err = GoSource::parse("package x\nfunc {{{", Path::new("bad.go")).unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
    }
}

#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn source_parser_never_panics(ref input in ".{0,500}") {
            let _ = GoSource::parse(input, Path::new("fuzz.go"));
        }
    }
}
