//! Thread-local parser pooling.
//!
//! Each worker thread keeps one parser per grammar, created on first use and
//! reused for every later file that thread handles.

use crate::ts::{Grammar, SourceParser, TreeSitterError};
use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

thread_local! {
    static PARSERS: RefCell<HashMap<Grammar, SourceParser>> = RefCell::new(HashMap::new());
}

/// Execute `f` with this thread's pooled parser for `grammar`.
///
/// `f` must not call back into `with_parser`.
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use vitestify::pool::with_parser;
/// use vitestify::ts::Grammar;
///
/// let tree = with_parser(Grammar::TypeScript, |parser| parser.parse("test('x', () => {});"))??;
/// assert_eq!(tree.root_node().kind(), "program");
/// # Ok(())
/// # }
/// ```
pub fn with_parser<F, R>(grammar: Grammar, f: F) -> Result<R, TreeSitterError>
where
    F: FnOnce(&mut SourceParser) -> R,
{
    PARSERS.with(|cell| {
        let mut parsers = cell.borrow_mut();
        let parser = match parsers.entry(grammar) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(SourceParser::new(grammar)?),
        };
        Ok(f(parser))
    })
}
