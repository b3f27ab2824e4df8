//! Tree-sitter integration for TypeScript and TSX sources.
//!
//! Grammar selection, parse units that own a buffer together with its tree,
//! the closed node-kind vocabulary used by the rewrite rules, and syntax
//! validation of rewritten output.

pub mod errors;
pub mod kinds;
pub mod parser;
pub mod validator;

pub use errors::TreeSitterError;
pub use kinds::NodeKind;
pub use parser::{ErrorNode, Grammar, ParseUnit, SourceParser};
pub use validator::{count_syntax_errors, validate_rewrite};
