//! Vitestify: syntax-tree driven migration of Jest test files to Vitest
//!
//! Each TypeScript file is parsed with tree-sitter, walked once to collect
//! edits and requirements (imports, async patches, ES module shims), and
//! rewritten by replaying byte-span edits over the original text.
//!
//! # Architecture
//!
//! All rewrites compile down to a single primitive: [`Edit`], a byte-span
//! replacement against the unmodified source. Intelligence lives in the
//! rule set that decides which spans to replace; [`apply_edits`] only
//! checks ordering and bounds and splices.
//!
//! # Safety
//!
//! - Files with syntax errors are rejected before rewriting
//! - Output is reparsed and rejected if it gained syntax errors
//! - Write-back is atomic (tempfile + fsync + rename)
//! - Files changed on disk since they were read are not overwritten
//! - Workspace boundary enforcement, `node_modules` is never touched
//! - Rewriting an already migrated file is a no-op
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use vitestify::{rewrite_file, Outcome, RewriteOptions};
//!
//! match rewrite_file(Path::new("src/app.test.ts"), &RewriteOptions::default()) {
//!     Ok(Outcome::Rewritten(text)) => print!("{}", text),
//!     Ok(Outcome::NoOp) => println!("nothing to do"),
//!     Err(e) => eprintln!("rewrite failed: {}", e),
//! }
//! ```

pub mod config;
pub mod cursor;
pub mod discovery;
pub mod edit;
pub mod pool;
pub mod rewrite;
pub mod runner;
pub mod safety;
pub mod ts;

// Re-exports
pub use config::{load_for_root, load_from_path, load_from_str, ConfigError, VitestifyConfig};
pub use cursor::{CursorError, TextCursor};
pub use discovery::{DiscoveryError, FileFilter};
pub use edit::{apply_edits, write_back, Edit, EditError, Fingerprint};
pub use rewrite::{
    rewrite_file, rewrite_source, Outcome, RewriteError, RewriteOptions, StructuralError,
};
pub use runner::{run, FileOutcome, FileReport, RunMode, RunOptions, RunSummary};
pub use safety::{SafetyError, WorkspaceGuard};
pub use ts::{Grammar, TreeSitterError};
