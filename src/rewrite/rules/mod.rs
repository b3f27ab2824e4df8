//! Per-node-kind rewrite rules, each an `impl Walker` block.

mod calls;
mod env;
mod imports;
mod mocks;
mod types;
mod user_event;

use crate::rewrite::ledger::AsyncPatch;
use crate::rewrite::walker::Walker;
use crate::ts::kinds::{has_keyword, named_children, FIELD_ARGUMENTS, FIELD_NAME, FIELD_RETURN_TYPE};
use crate::ts::NodeKind;
use tree_sitter::Node;

/// Argument nodes of a call, without interleaved comments.
///
/// Tagged template calls have no argument list and yield `None`.
pub(crate) fn call_arguments(call: Node<'_>) -> Option<(Node<'_>, Vec<Node<'_>>)> {
    let list = call.child_by_field_name(FIELD_ARGUMENTS)?;
    if NodeKind::of(list) != NodeKind::Arguments {
        return None;
    }
    let args = named_children(list)
        .into_iter()
        .filter(|arg| NodeKind::of(*arg) != NodeKind::Comment)
        .collect();
    Some((list, args))
}

/// Nearest function-like ancestor of `node`.
pub(crate) fn enclosing_function(node: Node<'_>) -> Option<Node<'_>> {
    let mut current = node.parent();
    while let Some(candidate) = current {
        if NodeKind::of(candidate).is_function() {
            return Some(candidate);
        }
        current = candidate.parent();
    }
    None
}

/// Byte offset where `async ` goes for `function`.
///
/// Methods take it after their modifiers (`static async go()`) and before a
/// generator star; everything else takes it at its first byte.
fn async_insertion_point(function: Node<'_>) -> usize {
    if NodeKind::of(function) != NodeKind::MethodDefinition {
        return function.start_byte();
    }

    let mut cursor = function.walk();
    let star = function
        .children(&mut cursor)
        .find(|child| !child.is_named() && child.kind() == "*")
        .map(|star| star.start_byte());
    star.or_else(|| {
        function
            .child_by_field_name(FIELD_NAME)
            .map(|name| name.start_byte())
    })
    .unwrap_or_else(|| function.start_byte())
}

impl<'u> Walker<'u> {
    /// Flag `function` to become async, unless it already is.
    pub(crate) fn require_async(&mut self, function: Node<'u>) {
        if has_keyword(function, "async") {
            return;
        }

        let return_type = function
            .child_by_field_name(FIELD_RETURN_TYPE)
            .and_then(|annotation| named_children(annotation).into_iter().next())
            .map(|ty| ty.byte_range());

        self.ledger.require_async(AsyncPatch {
            fn_start: async_insertion_point(function),
            return_type,
        });
    }
}
