use crate::edit::EditError;
use crate::ts::TreeSitterError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tree_sitter::Node;

const SNIPPET_LIMIT: usize = 160;

/// Where in a file a structural error was found, with the offending text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub path: PathBuf,
    pub line: usize,
    pub column: usize,
    pub snippet: String,
}

impl SourceLocation {
    pub fn of(path: impl Into<PathBuf>, node: Node<'_>, source: &str) -> Self {
        let point = node.start_position();
        Self {
            path: path.into(),
            line: point.row + 1,
            column: point.column + 1,
            snippet: truncate_snippet(&source[node.byte_range()]),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.path.display(), self.line, self.column)
    }
}

fn truncate_snippet(text: &str) -> String {
    if text.len() <= SNIPPET_LIMIT {
        return text.to_string();
    }
    let mut end = SNIPPET_LIMIT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

fn suggestion_hint(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(name) => format!(" (did you mean `jest.{name}`?)"),
        None => String::new(),
    }
}

/// A node shape the rule set does not model. Fatal to one file only.
#[derive(Error, Debug)]
pub enum StructuralError {
    #[error("{at}: unhandled import shape\n    {}", .at.snippet)]
    UnhandledImportShape { at: SourceLocation },

    #[error("{at}: unhandled jest type: jest.{name}{}", suggestion_hint(.suggestion))]
    UnhandledTypeKind {
        at: SourceLocation,
        name: String,
        suggestion: Option<String>,
    },

    #[error("{at}: unhandled jest.mock factory\n    {}", .at.snippet)]
    UnhandledMockFactory { at: SourceLocation },

    #[error("{at}: missing arguments for jest.{method} call\n    {}", .at.snippet)]
    MissingArgument { at: SourceLocation, method: String },

    #[error("{at}: unable to find enclosing function for non-awaited userEvent call\n    {}", .at.snippet)]
    NoEnclosingFunction { at: SourceLocation },
}

#[derive(Error, Debug)]
pub enum RewriteError {
    #[error(transparent)]
    Parse(#[from] TreeSitterError),

    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error("{}: {source}", path.display())]
    Edit {
        path: PathBuf,
        #[source]
        source: EditError,
    },

    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RewriteError {
    /// Fatal errors stop the whole batch rather than one file.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RewriteError::Parse(TreeSitterError::UnsupportedExtension { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location() -> SourceLocation {
        SourceLocation {
            path: PathBuf::from("src/a.test.ts"),
            line: 3,
            column: 7,
            snippet: "jest.Foo".to_string(),
        }
    }

    #[test]
    fn type_error_message_names_member_and_hint() {
        let err = StructuralError::UnhandledTypeKind {
            at: location(),
            name: "Mok".to_string(),
            suggestion: Some("Mock".to_string()),
        };
        let message = err.to_string();
        assert!(message.starts_with("src/a.test.ts:3:7"));
        assert!(message.contains("jest.Mok"));
        assert!(message.contains("did you mean `jest.Mock`?"));
    }

    #[test]
    fn long_snippets_are_truncated() {
        let long = "x".repeat(SNIPPET_LIMIT * 2);
        let snippet = truncate_snippet(&long);
        assert_eq!(snippet.len(), SNIPPET_LIMIT + 3);
        assert!(snippet.ends_with("..."));
    }

    #[test]
    fn only_unsupported_extension_is_fatal() {
        let fatal = RewriteError::Parse(TreeSitterError::UnsupportedExtension {
            path: PathBuf::from("a.js"),
        });
        assert!(fatal.is_fatal());

        let local = RewriteError::Parse(TreeSitterError::ParseFailed);
        assert!(!local.is_fatal());

        let structural = RewriteError::Structural(StructuralError::UnhandledImportShape {
            at: location(),
        });
        assert!(!structural.is_fatal());
    }
}
