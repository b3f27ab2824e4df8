//! Closed vocabulary of syntax-node kinds the rewrite rules care about.
//!
//! Everything else collapses into [`NodeKind::Other`], so teaching the walker
//! a new kind means adding a variant here and handling it at every match.

use tree_sitter::Node;

pub const FIELD_ALIAS: &str = "alias";
pub const FIELD_ARGUMENTS: &str = "arguments";
pub const FIELD_BODY: &str = "body";
pub const FIELD_FUNCTION: &str = "function";
pub const FIELD_MODULE: &str = "module";
pub const FIELD_NAME: &str = "name";
pub const FIELD_OBJECT: &str = "object";
pub const FIELD_PROPERTY: &str = "property";
pub const FIELD_RETURN_TYPE: &str = "return_type";
pub const FIELD_SOURCE: &str = "source";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    ImportStatement,
    ImportClause,
    NamedImports,
    ImportSpecifier,
    NamespaceImport,
    CallExpression,
    MemberExpression,
    Arguments,
    Identifier,
    ShorthandPropertyIdentifier,
    NestedTypeIdentifier,
    VariableDeclarator,
    ArrowFunction,
    FunctionDeclaration,
    FunctionExpression,
    MethodDefinition,
    ExpressionStatement,
    AwaitExpression,
    StringLiteral,
    Comment,
    Other,
}

impl NodeKind {
    pub fn of(node: Node<'_>) -> Self {
        match node.kind() {
            "import_statement" => NodeKind::ImportStatement,
            "import_clause" => NodeKind::ImportClause,
            "named_imports" => NodeKind::NamedImports,
            "import_specifier" => NodeKind::ImportSpecifier,
            "namespace_import" => NodeKind::NamespaceImport,
            "call_expression" => NodeKind::CallExpression,
            "member_expression" => NodeKind::MemberExpression,
            "arguments" => NodeKind::Arguments,
            "identifier" => NodeKind::Identifier,
            "shorthand_property_identifier" => NodeKind::ShorthandPropertyIdentifier,
            "nested_type_identifier" => NodeKind::NestedTypeIdentifier,
            "variable_declarator" => NodeKind::VariableDeclarator,
            "arrow_function" => NodeKind::ArrowFunction,
            "function_declaration" => NodeKind::FunctionDeclaration,
            "function_expression" | "function" => NodeKind::FunctionExpression,
            "method_definition" => NodeKind::MethodDefinition,
            "expression_statement" => NodeKind::ExpressionStatement,
            "await_expression" => NodeKind::AwaitExpression,
            "string" => NodeKind::StringLiteral,
            "comment" => NodeKind::Comment,
            _ => NodeKind::Other,
        }
    }

    /// Function-like nodes that can receive an `async` marker.
    pub fn is_function(self) -> bool {
        matches!(
            self,
            NodeKind::ArrowFunction
                | NodeKind::FunctionDeclaration
                | NodeKind::FunctionExpression
                | NodeKind::MethodDefinition
        )
    }
}

/// Named children of `node`, in document order.
pub fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// True when an anonymous child of `node` is the keyword `keyword`.
pub fn has_keyword(node: Node<'_>, keyword: &str) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|child| !child.is_named() && child.kind() == keyword);
    found
}
