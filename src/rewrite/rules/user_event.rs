use super::enclosing_function;
use crate::edit::Edit;
use crate::rewrite::errors::StructuralError;
use crate::rewrite::walker::Walker;
use crate::ts::kinds::{FIELD_BODY, FIELD_FUNCTION};
use crate::ts::NodeKind;
use tree_sitter::Node;

/// Where a userEvent call that is an arrow's expression body gets awaited.
#[derive(Debug)]
enum ArrowBody<'t> {
    /// `act(() => userEvent.click(x));`: await the `act(...)` statement.
    ActStatement(Node<'t>),
    /// `act(...)` used in any other position, already awaited or not.
    ActExpression,
    /// Any other arrow: await the call inside the arrow itself.
    Call,
}

impl<'u> Walker<'u> {
    /// Classify `call`, the expression body of `arrow`.
    fn arrow_body(&self, call: Node<'u>, arrow: Node<'u>) -> Option<ArrowBody<'u>> {
        let body = arrow.child_by_field_name(FIELD_BODY)?;
        if body.id() != call.id() {
            return None;
        }

        let act = arrow
            .parent()
            .filter(|p| NodeKind::of(*p) == NodeKind::Arguments)
            .and_then(|list| list.parent())
            .filter(|outer| self.is_act_call(*outer));
        let Some(act) = act else {
            return Some(ArrowBody::Call);
        };

        Some(match act.parent() {
            Some(statement) if NodeKind::of(statement) == NodeKind::ExpressionStatement => {
                ArrowBody::ActStatement(statement)
            }
            _ => ArrowBody::ActExpression,
        })
    }

    fn is_act_call(&self, node: Node<'u>) -> bool {
        NodeKind::of(node) == NodeKind::CallExpression
            && node
                .child_by_field_name(FIELD_FUNCTION)
                .is_some_and(|callee| {
                    NodeKind::of(callee) == NodeKind::Identifier && self.text(callee) == "act"
                })
    }

    /// user-event v14 calls return promises that must be awaited.
    pub(crate) fn await_user_event(&mut self, node: Node<'u>) -> Result<(), StructuralError> {
        let Some(parent) = node.parent() else {
            return Ok(());
        };

        let awaited = match NodeKind::of(parent) {
            NodeKind::ExpressionStatement => node,
            NodeKind::ArrowFunction => match self.arrow_body(node, parent) {
                Some(ArrowBody::ActStatement(statement)) => statement,
                Some(ArrowBody::Call) => node,
                Some(ArrowBody::ActExpression) | None => return Ok(()),
            },
            _ => return Ok(()),
        };

        let function = enclosing_function(awaited).ok_or_else(|| {
            StructuralError::NoEnclosingFunction {
                at: self.locate(node),
            }
        })?;

        self.ledger.push(Edit::insert(awaited.start_byte(), "await "));
        self.require_async(function);
        Ok(())
    }
}
