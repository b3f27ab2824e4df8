use crate::edit::Edit;
use crate::rewrite::catalog::{is_vitest_type, VITEST_MODULE};
use crate::rewrite::errors::StructuralError;
use crate::rewrite::ledger::ImportSymbol;
use crate::rewrite::walker::{Visit, Walker};
use crate::ts::kinds::{has_keyword, named_children, FIELD_ALIAS, FIELD_NAME, FIELD_SOURCE};
use crate::ts::NodeKind;
use std::ops::Range;
use tree_sitter::Node;

impl<'u> Walker<'u> {
    /// Import statements are never descended: their contents are names and
    /// string literals only.
    pub(crate) fn visit_import(&mut self, node: Node<'u>) -> Result<Visit, StructuralError> {
        let source_node = import_source(node).ok_or_else(|| {
            StructuralError::UnhandledImportShape {
                at: self.locate(node),
            }
        })?;

        match unquote(self.text(source_node)) {
            VITEST_MODULE => self.fold_vitest_import(node)?,
            "node:url" | "url" => {
                if self.default_binding(node) == Some("url") {
                    let span = self.statement_span(node);
                    self.ledger.record_url_import(span);
                }
            }
            "node:path" | "path" => {
                if self.default_binding(node) == Some("path") {
                    self.ledger.record_path_import();
                }
            }
            _ => {}
        }

        Ok(Visit::Skip)
    }

    /// Record every named vitest import and delete the statement, so all of
    /// them end up in the one consolidated import.
    fn fold_vitest_import(&mut self, node: Node<'u>) -> Result<(), StructuralError> {
        let at = self.locate(node);
        let unhandled = || StructuralError::UnhandledImportShape { at: at.clone() };

        let clause = named_children(node)
            .into_iter()
            .find(|child| NodeKind::of(*child) == NodeKind::ImportClause)
            .ok_or_else(unhandled)?;

        let statement_is_type = has_keyword(node, "type");

        for binding in named_children(clause) {
            if NodeKind::of(binding) != NodeKind::NamedImports {
                // default or namespace import of vitest
                return Err(unhandled());
            }

            for specifier in named_children(binding) {
                if NodeKind::of(specifier) != NodeKind::ImportSpecifier {
                    continue;
                }
                let Some(name_node) = specifier.child_by_field_name(FIELD_NAME) else {
                    return Err(unhandled());
                };
                let name = self.text(name_node);
                let alias = specifier
                    .child_by_field_name(FIELD_ALIAS)
                    .map(|alias| self.text(alias).to_string());
                let type_only =
                    statement_is_type || has_keyword(specifier, "type") || is_vitest_type(name);

                let symbol = if type_only {
                    ImportSymbol::type_only(name)
                } else {
                    ImportSymbol::value(name)
                };
                self.ledger.require(symbol.with_alias(alias));
            }
        }

        let span = self.statement_span(node);
        self.ledger.push(Edit::delete(span.start, span.end));
        Ok(())
    }

    /// Local name of a default or namespace import binding.
    fn default_binding(&self, node: Node<'u>) -> Option<&'u str> {
        let clause = named_children(node)
            .into_iter()
            .find(|child| NodeKind::of(*child) == NodeKind::ImportClause)?;

        named_children(clause).into_iter().find_map(|binding| {
            match NodeKind::of(binding) {
                NodeKind::Identifier => Some(self.text(binding)),
                NodeKind::NamespaceImport => named_children(binding)
                    .into_iter()
                    .find(|n| NodeKind::of(*n) == NodeKind::Identifier)
                    .map(|n| self.text(n)),
                _ => None,
            }
        })
    }

    /// Statement span extended over its line terminator, when there is one.
    fn statement_span(&self, node: Node<'u>) -> Range<usize> {
        let rest = &self.source()[node.end_byte()..];
        let terminator = if rest.starts_with("\r\n") {
            2
        } else if rest.starts_with('\n') {
            1
        } else {
            0
        };
        node.start_byte()..node.end_byte() + terminator
    }
}

/// Module specifier of an import, including `import x = require('y')`.
fn import_source(node: Node<'_>) -> Option<Node<'_>> {
    if let Some(source) = node.child_by_field_name(FIELD_SOURCE) {
        return Some(source);
    }
    named_children(node)
        .into_iter()
        .find(|child| child.kind() == "import_require_clause")
        .and_then(|clause| clause.child_by_field_name(FIELD_SOURCE))
}

fn unquote(literal: &str) -> &str {
    literal.trim_matches(|c| c == '\'' || c == '"')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unquote_either_style() {
        assert_eq!(unquote("'vitest'"), "vitest");
        assert_eq!(unquote("\"node:path\""), "node:path");
    }
}
