use crate::cursor::TextCursor;
use crate::ts::errors::TreeSitterError;
use ast_grep_language::{LanguageExt, SupportLang};
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Parser, Tree};

/// Grammar variant selected from a file's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grammar {
    TypeScript,
    Tsx,
}

impl Grammar {
    /// Pick the grammar for `path`, failing for anything that is not
    /// TypeScript or TSX.
    pub fn from_path(path: &Path) -> Result<Self, TreeSitterError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("ts" | "mts" | "cts") => Ok(Grammar::TypeScript),
            Some("tsx") => Ok(Grammar::Tsx),
            _ => Err(TreeSitterError::UnsupportedExtension {
                path: path.to_path_buf(),
            }),
        }
    }

    /// True when `path` has an extension some grammar accepts.
    pub fn supports(path: &Path) -> bool {
        Self::from_path(path).is_ok()
    }

    fn support_lang(self) -> SupportLang {
        match self {
            Grammar::TypeScript => SupportLang::TypeScript,
            Grammar::Tsx => SupportLang::Tsx,
        }
    }
}

/// Tree-sitter parser wrapper bound to one grammar.
pub struct SourceParser {
    parser: Parser,
    grammar: Grammar,
}

impl SourceParser {
    pub fn new(grammar: Grammar) -> Result<Self, TreeSitterError> {
        let mut parser = Parser::new();
        let ts_lang = grammar.support_lang().get_ts_language();
        parser
            .set_language(&ts_lang)
            .map_err(|_| TreeSitterError::LanguageSet)?;

        Ok(Self { parser, grammar })
    }

    pub fn grammar(&self) -> Grammar {
        self.grammar
    }

    /// Parse source code into a tree-sitter Tree.
    pub fn parse(&mut self, source: &str) -> Result<Tree, TreeSitterError> {
        self.parser
            .parse(source, None)
            .ok_or(TreeSitterError::ParseFailed)
    }

    /// Parse `source` and bundle the tree with the buffer it was built from.
    pub fn parse_unit(
        &mut self,
        path: impl Into<PathBuf>,
        source: String,
    ) -> Result<ParseUnit, TreeSitterError> {
        let tree = self.parse(&source)?;
        Ok(ParseUnit {
            path: path.into(),
            source,
            grammar: self.grammar,
            tree,
        })
    }
}

/// One file's source buffer and the syntax tree over it.
///
/// Nodes borrowed from [`ParseUnit::root_node`] cannot outlive the unit, and
/// dropping the unit releases both the tree and the buffer.
pub struct ParseUnit {
    path: PathBuf,
    source: String,
    grammar: Grammar,
    tree: Tree,
}

impl ParseUnit {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn grammar(&self) -> Grammar {
        self.grammar
    }

    pub fn root_node(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Fresh cursor positioned at the start of the buffer.
    pub fn cursor(&self) -> TextCursor<'_> {
        TextCursor::new(&self.source)
    }

    /// Extract text for a node's byte range.
    pub fn node_text(&self, node: Node<'_>) -> &str {
        &self.source[node.byte_range()]
    }

    /// Check if the tree contains any ERROR or MISSING nodes.
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    pub fn error_nodes(&self) -> Vec<ErrorNode> {
        error_nodes(self.tree.root_node())
    }

    /// Fail with the location of the first syntax error, if any.
    pub fn ensure_well_formed(&self) -> Result<(), TreeSitterError> {
        match self.error_nodes().first() {
            None => Ok(()),
            Some(first) => Err(TreeSitterError::SyntaxError {
                line: first.start_point.row + 1,
                column: first.start_point.column + 1,
                byte_start: first.byte_start,
                byte_end: first.byte_end,
            }),
        }
    }
}

/// Information about an ERROR or MISSING node in the parse tree.
#[derive(Debug, Clone)]
pub struct ErrorNode {
    pub byte_start: usize,
    pub byte_end: usize,
    pub start_point: tree_sitter::Point,
    pub end_point: tree_sitter::Point,
}

/// Collect every ERROR/MISSING node under `root` in document order.
pub fn error_nodes(root: Node<'_>) -> Vec<ErrorNode> {
    let mut errors = Vec::new();
    collect_error_nodes(root, &mut errors);
    errors
}

fn collect_error_nodes(node: Node<'_>, errors: &mut Vec<ErrorNode>) {
    if node.is_error() || node.is_missing() {
        errors.push(ErrorNode {
            byte_start: node.start_byte(),
            byte_end: node.end_byte(),
            start_point: node.start_position(),
            end_point: node.end_position(),
        });
    }

    // Subtrees without errors can be skipped entirely
    if !node.has_error() {
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_error_nodes(child, errors);
    }
}
