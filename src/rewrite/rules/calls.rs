use super::call_arguments;
use crate::edit::Edit;
use crate::rewrite::catalog::{
    is_bare_only, is_lifecycle, timer_helper, JEST_NAMESPACE, TIMER_SCALE_MS, VI_NAMESPACE,
};
use crate::rewrite::errors::StructuralError;
use crate::rewrite::walker::{Visit, Walker};
use crate::ts::kinds::{FIELD_FUNCTION, FIELD_OBJECT, FIELD_PROPERTY};
use crate::ts::NodeKind;
use tree_sitter::Node;

/// What a call expression calls.
#[derive(Debug, Clone, Copy)]
enum Callee<'t> {
    /// `name(...)`
    Bare { name: Node<'t> },
    /// `object.property(...)`
    Member { object: Node<'t>, property: Node<'t> },
    Other,
}

fn resolve_callee(call: Node<'_>) -> Callee<'_> {
    let Some(function) = call.child_by_field_name(FIELD_FUNCTION) else {
        return Callee::Other;
    };

    match NodeKind::of(function) {
        NodeKind::Identifier => Callee::Bare { name: function },
        NodeKind::MemberExpression => {
            match (
                function.child_by_field_name(FIELD_OBJECT),
                function.child_by_field_name(FIELD_PROPERTY),
            ) {
                (Some(object), Some(property)) => Callee::Member { object, property },
                _ => Callee::Other,
            }
        }
        _ => Callee::Other,
    }
}

/// Argument expressions that can be multiplied without parenthesizing.
fn is_simple_operand(node: Node<'_>) -> bool {
    matches!(
        node.kind(),
        "number" | "identifier" | "member_expression" | "call_expression" | "parenthesized_expression"
    )
}

impl<'u> Walker<'u> {
    pub(crate) fn visit_call(&mut self, node: Node<'u>) -> Result<Visit, StructuralError> {
        match resolve_callee(node) {
            Callee::Bare { name } => Ok(self.bare_call(node, name)),
            Callee::Member { object, property } => self.member_call(node, object, property),
            Callee::Other => Ok(Visit::Descend),
        }
    }

    fn bare_call(&mut self, node: Node<'u>, name: Node<'u>) -> Visit {
        let name_text = self.text(name);

        if let Some(target) = timer_helper(name_text) {
            self.rewrite_timer_helper(node, name, target);
        }

        if is_lifecycle(name_text) {
            self.ledger.require_value(name_text);
        }

        Visit::Descend
    }

    fn member_call(
        &mut self,
        node: Node<'u>,
        object: Node<'u>,
        property: Node<'u>,
    ) -> Result<Visit, StructuralError> {
        if self.text(property) == "mockImplementation" {
            self.default_mock_implementation(node);
        }

        if NodeKind::of(object) != NodeKind::Identifier {
            return Ok(Visit::Descend);
        }

        let namespace = self.text(object);
        match namespace {
            VI_NAMESPACE => {
                self.ledger.require_value(VI_NAMESPACE);
            }
            JEST_NAMESPACE => {
                self.ledger.require_value(VI_NAMESPACE);
                let method = self.text(property);
                return self.jest_call(node, object, method);
            }
            "userEvent" if self.options.testing_library => {
                self.await_user_event(node)?;
            }
            _ if is_lifecycle(namespace) && !is_bare_only(namespace) => {
                self.ledger.require_value(namespace);
            }
            _ => {}
        }

        Ok(Visit::Descend)
    }

    fn jest_call(
        &mut self,
        node: Node<'u>,
        namespace: Node<'u>,
        method: &str,
    ) -> Result<Visit, StructuralError> {
        match method {
            "mock" => self.rewrite_mock(node)?,
            "requireActual" => self.rewrite_require_actual(node)?,
            "setTimeout" => self.rewrite_set_timeout(node)?,
            _ => {
                self.ledger.push(Edit::replace(
                    namespace.start_byte(),
                    namespace.end_byte(),
                    VI_NAMESPACE,
                ));
                return Ok(Visit::Descend);
            }
        }
        Ok(Visit::Skip)
    }

    /// `advanceTimers(n)` and friends take seconds; vitest takes milliseconds.
    fn rewrite_timer_helper(&mut self, node: Node<'u>, name: Node<'u>, target: &str) {
        self.ledger.require_value(VI_NAMESPACE);
        self.ledger
            .push(Edit::replace(name.start_byte(), name.end_byte(), target));

        let Some((list, args)) = call_arguments(node) else {
            return;
        };

        // The argument keeps its own edits, so scaling only wraps its span.
        match args.first() {
            None => self.ledger.push(Edit::replace(
                list.start_byte(),
                list.end_byte(),
                format!("({TIMER_SCALE_MS})"),
            )),
            Some(arg) if is_simple_operand(*arg) => self
                .ledger
                .push(Edit::insert(arg.end_byte(), format!(" * {TIMER_SCALE_MS}"))),
            Some(arg) => {
                self.ledger.push(Edit::insert(arg.start_byte(), "("));
                self.ledger
                    .push(Edit::insert(arg.end_byte(), format!(") * {TIMER_SCALE_MS}")));
            }
        }
    }

    /// `x.mockImplementation()` needs an explicit no-op implementation.
    fn default_mock_implementation(&mut self, node: Node<'u>) {
        if let Some((list, args)) = call_arguments(node) {
            if args.is_empty() {
                self.ledger.push(Edit::replace(
                    list.start_byte(),
                    list.end_byte(),
                    "(() => {})",
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ts::kinds::named_children;
    use crate::ts::{Grammar, SourceParser};

    fn first_call_callee(source: &str) -> String {
        let mut parser = SourceParser::new(Grammar::TypeScript).unwrap();
        let unit = parser.parse_unit("a.ts", source.to_string()).unwrap();
        let statement = named_children(unit.root_node())[0];
        let call = named_children(statement)[0];
        match resolve_callee(call) {
            Callee::Bare { name } => format!("bare {}", unit.node_text(name)),
            Callee::Member { object, property } => format!(
                "member {}.{}",
                unit.node_text(object),
                unit.node_text(property)
            ),
            Callee::Other => "other".to_string(),
        }
    }

    #[test]
    fn callee_shapes() {
        assert_eq!(first_call_callee("describe('x', () => {});"), "bare describe");
        assert_eq!(first_call_callee("jest.fn();"), "member jest.fn");
        assert_eq!(first_call_callee("expect(a).toBe(1);"), "member expect(a).toBe");
        assert_eq!(first_call_callee("test.each([1])('x', () => {});"), "other");
    }
}
