use crate::cursor::{CursorError, TextCursor};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// The fundamental edit primitive: a byte-span replacement.
///
/// Every rule in the rewrite engine compiles down to this one primitive.
/// Intelligence lives in finding the span, not in applying it. A zero-width
/// span (`byte_start == byte_end`) is a pure insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Edit does nothing until it is replayed with apply_edits()"]
pub struct Edit {
    /// Starting byte offset (inclusive)
    pub byte_start: usize,
    /// Ending byte offset (exclusive)
    pub byte_end: usize,
    /// Text emitted in place of [byte_start, byte_end)
    pub new_text: String,
}

impl Edit {
    pub fn replace(byte_start: usize, byte_end: usize, new_text: impl Into<String>) -> Self {
        Self {
            byte_start,
            byte_end,
            new_text: new_text.into(),
        }
    }

    pub fn insert(at: usize, new_text: impl Into<String>) -> Self {
        Self::replace(at, at, new_text)
    }

    pub fn delete(byte_start: usize, byte_end: usize) -> Self {
        Self::replace(byte_start, byte_end, "")
    }

    pub fn is_insertion(&self) -> bool {
        self.byte_start == self.byte_end
    }

    /// Number of original bytes this edit consumes.
    pub fn span_len(&self) -> usize {
        self.byte_end.saturating_sub(self.byte_start)
    }
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} - {}]: {}", self.byte_start, self.byte_end, self.new_text)
    }
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("invalid byte range: [{byte_start}, {byte_end}) is inverted")]
    InvertedRange { byte_start: usize, byte_end: usize },

    #[error("invalid byte range: [{byte_start}, {byte_end}) in source of length {len}")]
    OutOfRange {
        byte_start: usize,
        byte_end: usize,
        len: usize,
    },

    #[error("overlapping edits: [{}, {}) and [{}, {})", previous.0, previous.1, next.0, next.1)]
    Overlap {
        previous: (usize, usize),
        next: (usize, usize),
    },

    #[error("cursor error during replay: {0}")]
    Cursor(#[from] CursorError),

    #[error("{file} changed on disk after it was read")]
    ConcurrentModification { file: PathBuf },

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("UTF-8 validation error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// Sort edits by position and check that no two claim the same bytes.
///
/// Sorting is stable on `(byte_start, byte_end)`, so an insertion always
/// precedes a replacement starting at the same offset and insertions at the
/// same offset keep the order they were recorded in.
pub fn order_edits(edits: &mut [Edit], source_len: usize) -> Result<(), EditError> {
    edits.sort_by_key(|edit| (edit.byte_start, edit.byte_end));

    let mut previous: Option<&Edit> = None;
    for edit in edits.iter() {
        if edit.byte_start > edit.byte_end {
            return Err(EditError::InvertedRange {
                byte_start: edit.byte_start,
                byte_end: edit.byte_end,
            });
        }
        if edit.byte_end > source_len {
            return Err(EditError::OutOfRange {
                byte_start: edit.byte_start,
                byte_end: edit.byte_end,
                len: source_len,
            });
        }
        if let Some(prev) = previous {
            if prev.byte_end > edit.byte_start {
                return Err(EditError::Overlap {
                    previous: (prev.byte_start, prev.byte_end),
                    next: (edit.byte_start, edit.byte_end),
                });
            }
        }
        previous = Some(edit);
    }

    Ok(())
}

/// Replay a set of edits over `source` and return the new text.
///
/// Unchanged spans are streamed through a [`TextCursor`] and interleaved
/// with replacement text, so output construction is linear in the size of
/// the source plus the replacements.
pub fn apply_edits(source: &str, mut edits: Vec<Edit>) -> Result<String, EditError> {
    order_edits(&mut edits, source.len())?;

    let removed: usize = edits.iter().map(Edit::span_len).sum();
    let added: usize = edits.iter().map(|e| e.new_text.len()).sum();
    let mut output = String::with_capacity(source.len() - removed + added);

    let mut cursor = TextCursor::new(source);
    for edit in &edits {
        output.push_str(cursor.read_to(edit.byte_start)?);
        output.push_str(&edit.new_text);
        cursor.seek(edit.byte_end)?;
    }
    output.push_str(cursor.read_to_end()?);

    Ok(output)
}

/// Content hash of a file as it was read, used to detect concurrent changes
/// before writing a rewrite back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint(u64);

impl Fingerprint {
    pub fn of(content: &[u8]) -> Self {
        Fingerprint(xxh3_64(content))
    }

    pub fn matches(&self, content: &[u8]) -> bool {
        xxh3_64(content) == self.0
    }
}

/// Write rewritten content over `path` if the file still matches `expected`.
pub fn write_back(path: &Path, content: &str, expected: Fingerprint) -> Result<(), EditError> {
    let current = fs::read(path)?;
    if !expected.matches(&current) {
        return Err(EditError::ConcurrentModification {
            file: path.to_path_buf(),
        });
    }

    atomic_write(path, content.as_bytes())?;

    // Bump mtime so watch-mode test runners pick the change up
    let now = filetime::FileTime::now();
    filetime::set_file_mtime(path, now)?;

    Ok(())
}

/// Atomic file write: tempfile + fsync + rename.
///
/// Either the full write succeeds or nothing changes.
fn atomic_write(path: &Path, content: &[u8]) -> Result<(), EditError> {
    // Tempfile in the same directory keeps the rename on one filesystem
    let parent = path.parent().ok_or_else(|| {
        EditError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Path has no parent directory",
        ))
    })?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;

    // Preserve the original permissions across the rename
    if let Ok(metadata) = fs::metadata(path) {
        temp.as_file().set_permissions(metadata.permissions())?;
    }

    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
