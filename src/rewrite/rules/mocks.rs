use super::{call_arguments, enclosing_function};
use crate::edit::Edit;
use crate::rewrite::errors::StructuralError;
use crate::rewrite::walker::Walker;
use crate::ts::kinds::FIELD_BODY;
use crate::ts::NodeKind;
use regex::{NoExpand, Regex};
use std::sync::LazyLock;
use tree_sitter::Node;

static REQUIRE_ACTUAL: LazyLock<Regex> = LazyLock::new(|| {
    // jest.requireActual('m') or jest.requireActual<typeof import('m')>('m')
    Regex::new(r"\bjest\.requireActual(?:<[^>]*>)?\(([^)]+)\)").unwrap()
});

static JEST_MEMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bjest\.").unwrap());

/// Rewrite the text of a mock factory body for vitest's `importActual`
/// parameter. Only `body` is touched; callers pass exactly the factory's span.
pub(crate) fn rewrite_factory_body(body: &str, module: &str) -> String {
    let actual = format!("(await importActual<typeof import({module})>())");
    let body = REQUIRE_ACTUAL.replace_all(body, NoExpand(&actual));
    JEST_MEMBER.replace_all(&body, "vi.").into_owned()
}

impl<'u> Walker<'u> {
    /// First argument of a `jest.<method>` call, or a structural error.
    fn required_argument(&self, node: Node<'u>, method: &str) -> Result<Node<'u>, StructuralError> {
        call_arguments(node)
            .and_then(|(_, args)| args.first().copied())
            .ok_or_else(|| StructuralError::MissingArgument {
                at: self.locate(node),
                method: method.to_string(),
            })
    }

    pub(crate) fn rewrite_mock(&mut self, node: Node<'u>) -> Result<(), StructuralError> {
        let module = self.text(self.required_argument(node, "mock")?);
        let args = call_arguments(node).map(|(_, args)| args).unwrap_or_default();

        let replacement = match args.get(1) {
            None => format!("vi.mock({module})"),
            Some(factory) => {
                let body = NodeKind::of(*factory)
                    .is_function()
                    .then(|| factory.child_by_field_name(FIELD_BODY))
                    .flatten()
                    .ok_or_else(|| StructuralError::UnhandledMockFactory {
                        at: self.locate(*factory),
                    })?;

                let body = rewrite_factory_body(self.text(body), module);
                format!(
                    "vi.mock({module}, async (importActual): Promise<typeof import({module})> => {body})"
                )
            }
        };

        self.ledger
            .push(Edit::replace(node.start_byte(), node.end_byte(), replacement));
        Ok(())
    }

    pub(crate) fn rewrite_require_actual(&mut self, node: Node<'u>) -> Result<(), StructuralError> {
        let module = self.text(self.required_argument(node, "requireActual")?);
        self.ledger.push(Edit::replace(
            node.start_byte(),
            node.end_byte(),
            format!("(await vi.importActual<typeof import({module})>({module}))"),
        ));
        // Top-level await needs no marker
        if let Some(function) = enclosing_function(node) {
            self.require_async(function);
        }
        Ok(())
    }

    pub(crate) fn rewrite_set_timeout(&mut self, node: Node<'u>) -> Result<(), StructuralError> {
        let timeout = self.text(self.required_argument(node, "setTimeout")?);
        self.ledger.push(Edit::replace(
            node.start_byte(),
            node.end_byte(),
            format!("vi.setConfig({{ testTimeout: {timeout} }})"),
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_body_require_actual() {
        let body = "({ ...jest.requireActual('./api'), fetch: jest.fn() })";
        assert_eq!(
            rewrite_factory_body(body, "'./api'"),
            "({ ...(await importActual<typeof import('./api')>()), fetch: vi.fn() })"
        );
    }

    #[test]
    fn factory_body_typed_require_actual() {
        let body = "{ const real = jest.requireActual<typeof import('./a')>('./a'); return real; }";
        assert_eq!(
            rewrite_factory_body(body, "'./a'"),
            "{ const real = (await importActual<typeof import('./a')>()); return real; }"
        );
    }

    #[test]
    fn factory_body_leaves_lookalikes() {
        let body = "({ myjest: 1, value: notjest.fn() })";
        assert_eq!(rewrite_factory_body(body, "'x'"), body);
    }

    #[test]
    fn factory_body_dollar_signs_are_literal() {
        let body = "jest.requireActual('$1')";
        assert_eq!(
            rewrite_factory_body(body, "'$1'"),
            "(await importActual<typeof import('$1')>())"
        );
    }
}
