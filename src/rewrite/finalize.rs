//! Second phase: turn what the walk recorded into concrete edits.

use crate::edit::Edit;
use crate::rewrite::catalog::{IMPORT_COLUMN_BUDGET, VITEST_MODULE};
use crate::rewrite::ledger::{AsyncPatch, EditLedger, EnvShimState, ImportSymbol};

/// Render the consolidated vitest import, breaking it into a brace block
/// when the single-line form is wider than the column budget.
pub fn render_import_statement(symbols: &[ImportSymbol], eol: &str) -> String {
    let names: Vec<String> = symbols.iter().map(ToString::to_string).collect();

    let line = format!("import {{ {} }} from '{VITEST_MODULE}';", names.join(", "));
    if line.len() <= IMPORT_COLUMN_BUDGET {
        return line;
    }

    let separator = format!(",{eol}  ");
    format!(
        "import {{{eol}  {}{eol}}} from '{VITEST_MODULE}';",
        names.join(&separator)
    )
}

/// ES module replacement for the CommonJS `__dirname` / `__filename` globals.
///
/// A file that declares its own `__filename` keeps it, so `__dirname` is
/// derived from `import.meta.url` directly rather than from a binding that is
/// not initialized yet when the header runs. An existing `url` import is only
/// kept in that case; otherwise finalize removes it and the shim re-emits it.
pub fn render_env_shim(
    shims: EnvShimState,
    has_path_import: bool,
    has_url_import: bool,
    eol: &str,
) -> String {
    let mut out = String::new();
    let define_filename = !shims.filename.is_declared();
    let define_dirname = shims.dirname.is_needed();

    if define_filename || (define_dirname && !has_url_import) {
        out.push_str("import url from 'node:url';");
        out.push_str(eol);
    }
    if define_dirname && !has_path_import {
        out.push_str("import path from 'node:path';");
        out.push_str(eol);
    }
    out.push_str(eol);
    if define_filename {
        out.push_str("const __filename = url.fileURLToPath(import.meta.url);");
        out.push_str(eol);
    }
    if define_dirname {
        if define_filename {
            out.push_str("const __dirname = path.dirname(__filename);");
        } else {
            out.push_str("const __dirname = path.dirname(url.fileURLToPath(import.meta.url));");
        }
        out.push_str(eol);
    }
    out.push_str(eol);
    out
}

/// Line terminator used by the file, so inserted lines match it.
pub fn detect_eol(source: &str) -> &'static str {
    match source.find('\n') {
        Some(i) if i > 0 && source.as_bytes()[i - 1] == b'\r' => "\r\n",
        _ => "\n",
    }
}

fn async_edits(patch: &AsyncPatch, source: &str, edits: &mut Vec<Edit>) {
    edits.push(Edit::insert(patch.fn_start, "async "));

    if let Some(range) = &patch.return_type {
        let annotated = &source[range.clone()];
        if !annotated.starts_with("Promise<") {
            // Wrap with two insertions so edits inside the type stay valid
            edits.push(Edit::insert(range.start, "Promise<"));
            edits.push(Edit::insert(range.end, ">"));
        }
    }
}

/// Produce the full edit list for one file.
///
/// The header insertion (import and shim) comes first so that it is emitted
/// before any other edit at byte 0.
pub fn finalize(ledger: EditLedger, source: &str) -> Vec<Edit> {
    let eol = detect_eol(source);
    let mut header = String::new();
    let mut synthesized = Vec::new();

    let symbols = ledger.sorted_imports();
    if !symbols.is_empty() {
        header.push_str(&render_import_statement(&symbols, eol));
        header.push_str(eol);
    }

    let shims = ledger.shims();
    if shims.is_needed() {
        let url_import = ledger.url_import();
        let keep_url_import = shims.filename.is_declared();
        if let Some(span) = url_import.clone().filter(|_| !keep_url_import) {
            synthesized.push(Edit::delete(span.start, span.end));
        }
        header.push_str(&render_env_shim(
            shims,
            ledger.has_path_import(),
            keep_url_import && url_import.is_some(),
            eol,
        ));
    }

    for patch in ledger.async_patches() {
        async_edits(patch, source, &mut synthesized);
    }

    let mut edits = Vec::with_capacity(ledger.edits().len() + synthesized.len() + 1);
    if !header.is_empty() {
        edits.push(Edit::insert(0, header));
    }
    edits.extend(ledger.into_edits());
    edits.extend(synthesized);
    edits
}
