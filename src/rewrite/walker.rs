use crate::rewrite::errors::{SourceLocation, StructuralError};
use crate::rewrite::ledger::EditLedger;
use crate::rewrite::RewriteOptions;
use crate::ts::kinds::named_children;
use crate::ts::{NodeKind, ParseUnit};
use tree_sitter::Node;

/// Whether a rule wants the walker to continue into the node's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Visit {
    Descend,
    Skip,
}

/// Pre-order traversal that dispatches each node to the rule for its kind.
///
/// The walk only records edits and requirements in its [`EditLedger`]; turning
/// those requirements into edits happens afterwards in
/// [`finalize`](crate::rewrite::finalize::finalize).
pub struct Walker<'u> {
    pub(crate) unit: &'u ParseUnit,
    pub(crate) options: &'u RewriteOptions,
    pub(crate) ledger: EditLedger,
}

impl<'u> Walker<'u> {
    pub fn new(unit: &'u ParseUnit, options: &'u RewriteOptions) -> Self {
        Self {
            unit,
            options,
            ledger: EditLedger::new(),
        }
    }

    /// Walk the whole tree and hand back everything that was recorded.
    pub fn run(mut self) -> Result<EditLedger, StructuralError> {
        let root = self.unit.root_node();
        self.walk(root)?;
        Ok(self.ledger)
    }

    fn walk(&mut self, node: Node<'u>) -> Result<(), StructuralError> {
        let visit = match NodeKind::of(node) {
            NodeKind::ImportStatement => self.visit_import(node)?,
            NodeKind::CallExpression => self.visit_call(node)?,
            NodeKind::Identifier | NodeKind::ShorthandPropertyIdentifier => {
                self.visit_identifier(node)
            }
            NodeKind::NestedTypeIdentifier => self.visit_nested_type(node)?,
            NodeKind::StringLiteral | NodeKind::Comment => Visit::Skip,
            NodeKind::ImportClause
            | NodeKind::NamedImports
            | NodeKind::ImportSpecifier
            | NodeKind::NamespaceImport
            | NodeKind::MemberExpression
            | NodeKind::Arguments
            | NodeKind::VariableDeclarator
            | NodeKind::ArrowFunction
            | NodeKind::FunctionDeclaration
            | NodeKind::FunctionExpression
            | NodeKind::MethodDefinition
            | NodeKind::ExpressionStatement
            | NodeKind::AwaitExpression
            | NodeKind::Other => Visit::Descend,
        };

        match visit {
            Visit::Descend => self.walk_children(node),
            Visit::Skip => Ok(()),
        }
    }

    fn walk_children(&mut self, node: Node<'u>) -> Result<(), StructuralError> {
        for child in named_children(node) {
            self.walk(child)?;
        }
        Ok(())
    }

    pub(crate) fn text(&self, node: Node<'_>) -> &'u str {
        self.unit.node_text(node)
    }

    pub(crate) fn source(&self) -> &'u str {
        self.unit.source()
    }

    pub(crate) fn locate(&self, node: Node<'_>) -> SourceLocation {
        SourceLocation::of(self.unit.path(), node, self.unit.source())
    }
}
