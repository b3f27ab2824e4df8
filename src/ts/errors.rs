use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeSitterError {
    #[error("failed to set language for parser")]
    LanguageSet,

    #[error("failed to parse source code")]
    ParseFailed,

    #[error("syntax error at {line}:{column} (byte {byte_start}..{byte_end})")]
    SyntaxError {
        line: usize,
        column: usize,
        byte_start: usize,
        byte_end: usize,
    },

    #[error("unsupported file extension: {} (expected .ts, .mts, .cts or .tsx)", path.display())]
    UnsupportedExtension { path: PathBuf },

    #[error("rewrite introduced syntax errors: {before} ERROR nodes before, {after} after")]
    OutputSyntaxError { before: usize, after: usize },
}
