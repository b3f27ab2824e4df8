use crate::rewrite::ledger::LocationGlobal;
use crate::rewrite::walker::{Visit, Walker};
use crate::ts::kinds::FIELD_NAME;
use crate::ts::NodeKind;
use tree_sitter::Node;

/// True when `node` is the name being bound by a `const`/`let`/`var`.
fn is_declared_name(node: Node<'_>) -> bool {
    node.parent()
        .filter(|parent| NodeKind::of(*parent) == NodeKind::VariableDeclarator)
        .and_then(|parent| parent.child_by_field_name(FIELD_NAME))
        .is_some_and(|name| name.id() == node.id())
}

impl<'u> Walker<'u> {
    /// Track `__dirname` / `__filename`, which do not exist in ES modules.
    pub(crate) fn visit_identifier(&mut self, node: Node<'u>) -> Visit {
        if !self.options.esm_shims {
            return Visit::Skip;
        }

        if let Some(global) = LocationGlobal::from_name(self.text(node)) {
            if is_declared_name(node) {
                self.ledger.declare_global(global);
            } else {
                self.ledger.reference_global(global);
            }
        }

        Visit::Skip
    }
}
