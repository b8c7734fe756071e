//! Parser module for Go source files

pub mod go;
pub mod queries;
pub mod source_file;

pub use go::GoParser;
pub use queries::{global_query_cache, QueryCache, QueryCaptureInfo, QueryId};
pub use source_file::{
    CallExpr, Callee, Expr, FunctionDecl, GoSource, GoSourceParser, IfStmt, ImportSpec,
    InterfaceDecl, Receiver, ReturnStmt, StructDecl,
};
