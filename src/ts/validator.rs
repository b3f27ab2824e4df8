use crate::pool::with_parser;
use crate::ts::errors::TreeSitterError;
use crate::ts::parser::{error_nodes, Grammar};

/// Count ERROR/MISSING nodes in `source` parsed with `grammar`.
pub fn count_syntax_errors(grammar: Grammar, source: &str) -> Result<usize, TreeSitterError> {
    let tree = with_parser(grammar, |parser| parser.parse(source))??;
    Ok(error_nodes(tree.root_node()).len())
}

/// Check that rewritten output did not introduce syntax errors.
///
/// The input may already have been broken when syntax errors are tolerated,
/// so only an increase in the error count is rejected.
pub fn validate_rewrite(
    grammar: Grammar,
    errors_before: usize,
    output: &str,
) -> Result<(), TreeSitterError> {
    let after = count_syntax_errors(grammar, output)?;
    if after > errors_before {
        return Err(TreeSitterError::OutputSyntaxError {
            before: errors_before,
            after,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_output_passes() {
        let output = "import { vi } from 'vitest';\nvi.fn();\n";
        assert!(validate_rewrite(Grammar::TypeScript, 0, output).is_ok());
    }

    #[test]
    fn broken_output_is_rejected() {
        let output = "vi.mock('x', async (importActual => {});\n";
        assert!(matches!(
            validate_rewrite(Grammar::TypeScript, 0, output),
            Err(TreeSitterError::OutputSyntaxError { before: 0, .. })
        ));
    }

    #[test]
    fn already_broken_input_is_tolerated() {
        let broken = "function f( {\n";
        let before = count_syntax_errors(Grammar::TypeScript, broken).unwrap();
        assert!(before > 0);
        assert!(validate_rewrite(Grammar::TypeScript, before, broken).is_ok());
    }

    #[test]
    fn tsx_grammar_accepts_jsx() {
        let output = "const el = <Button onClick={() => {}} />;\n";
        assert_eq!(count_syntax_errors(Grammar::Tsx, output).unwrap(), 0);
    }
}
