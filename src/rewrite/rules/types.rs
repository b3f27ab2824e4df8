use crate::edit::Edit;
use crate::rewrite::catalog::{jest_type, suggest_jest_type, TypeRewrite, JEST_NAMESPACE};
use crate::rewrite::errors::StructuralError;
use crate::rewrite::walker::{Visit, Walker};
use crate::ts::kinds::{FIELD_MODULE, FIELD_NAME};
use tree_sitter::Node;

impl<'u> Walker<'u> {
    /// `jest.Member` in type position. Unknown members fail the file.
    pub(crate) fn visit_nested_type(&mut self, node: Node<'u>) -> Result<Visit, StructuralError> {
        let module = node.child_by_field_name(FIELD_MODULE);
        if module.map(|m| self.text(m)) != Some(JEST_NAMESPACE) {
            return Ok(Visit::Skip);
        }

        let member = node
            .child_by_field_name(FIELD_NAME)
            .map(|name| self.text(name))
            .unwrap_or_default();

        let replacement = match jest_type(member) {
            Some(TypeRewrite::Inline(inline)) => inline,
            Some(TypeRewrite::Imported(name)) => {
                self.ledger.require_type(name);
                name
            }
            None => {
                return Err(StructuralError::UnhandledTypeKind {
                    at: self.locate(node),
                    name: member.to_string(),
                    suggestion: suggest_jest_type(member),
                })
            }
        };

        self.ledger
            .push(Edit::replace(node.start_byte(), node.end_byte(), replacement));
        Ok(Visit::Skip)
    }
}
