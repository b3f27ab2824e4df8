//! Syntax-tree driven Jest to Vitest rewriting of a single file.
//!
//! A rewrite runs in two phases. The [`Walker`] traverses the parse tree and
//! records edits plus derived requirements (imports, async patches, shim
//! flags) in an [`EditLedger`]. [`finalize`](finalize::finalize) then turns the
//! requirements into edits, and [`apply_edits`] replays everything over the
//! original buffer.

pub mod catalog;
pub mod errors;
pub mod finalize;
pub mod ledger;
mod rules;
pub mod walker;

pub use errors::{RewriteError, SourceLocation, StructuralError};
pub use ledger::{EditLedger, ImportSymbol};
pub use walker::Walker;

use crate::edit::apply_edits;
use crate::pool::with_parser;
use crate::ts::{validate_rewrite, Grammar};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

static JEST_TRIGGERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\b(?:jest|vi)\.",
        r"|\b(?:afterAll|afterEach|beforeAll|beforeEach|describe|expect|it|test)\s*[.(]",
        r"|\badvanceTimers(?:AndPromises)?\s*\(",
        r"|\.mockImplementation\s*\(\s*\)",
        r#"|\bfrom\s*['"]vitest['"]"#,
    ))
    .unwrap()
});

static ENV_TRIGGERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b__(?:dirname|filename)\b").unwrap());

static USER_EVENT_TRIGGERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\buserEvent\.").unwrap());

/// Switches for optional rule families and safety checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RewriteOptions {
    /// Replace `__dirname` / `__filename` with an ES module shim.
    pub esm_shims: bool,
    /// Await `userEvent.*` calls and make their functions async.
    pub testing_library: bool,
    /// Refuse to rewrite files that already contain syntax errors.
    pub reject_syntax_errors: bool,
    /// Reparse the output and fail if it gained syntax errors.
    pub validate_output: bool,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            esm_shims: false,
            testing_library: false,
            reject_syntax_errors: true,
            validate_output: true,
        }
    }
}

/// Result of rewriting one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Rewritten(String),
    /// Nothing to change; the file must be left as it is.
    NoOp,
}

/// Cheap textual check that a file might need rewriting at all.
///
/// False positives only cost a parse; the walk decides what actually changes.
pub fn has_trigger(source: &str, options: &RewriteOptions) -> bool {
    JEST_TRIGGERS.is_match(source)
        || (options.esm_shims && ENV_TRIGGERS.is_match(source))
        || (options.testing_library && USER_EVENT_TRIGGERS.is_match(source))
}

/// Read a file as UTF-8 text.
pub fn read_source(path: &Path) -> Result<String, RewriteError> {
    let bytes = fs::read(path).map_err(|source| RewriteError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|e| RewriteError::Io {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e.utf8_error()),
    })
}

/// Rewrite the file at `path`. Never writes; see [`crate::edit::write_back`].
pub fn rewrite_file(path: &Path, options: &RewriteOptions) -> Result<Outcome, RewriteError> {
    // Reject unsupported files before touching the disk
    Grammar::from_path(path)?;
    let source = read_source(path)?;
    rewrite_source(path, source, options)
}

/// Rewrite `source` as if it were the contents of `path`.
pub fn rewrite_source(
    path: &Path,
    source: String,
    options: &RewriteOptions,
) -> Result<Outcome, RewriteError> {
    let grammar = Grammar::from_path(path)?;

    if !has_trigger(&source, options) {
        return Ok(Outcome::NoOp);
    }

    let unit = with_parser(grammar, |parser| parser.parse_unit(path, source))??;

    let errors_before = if unit.has_errors() {
        unit.error_nodes().len()
    } else {
        0
    };
    if options.reject_syntax_errors {
        unit.ensure_well_formed()?;
    }

    let ledger = Walker::new(&unit, options).run()?;
    if ledger.is_empty() {
        return Ok(Outcome::NoOp);
    }

    let edits = finalize::finalize(ledger, unit.source());
    let output = apply_edits(unit.source(), edits).map_err(|source| RewriteError::Edit {
        path: path.to_path_buf(),
        source,
    })?;

    if output == unit.source() {
        return Ok(Outcome::NoOp);
    }

    if options.validate_output {
        validate_rewrite(unit.grammar(), errors_before, &output)?;
    }

    Ok(Outcome::Rewritten(output))
}
