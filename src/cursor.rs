//! Forward-only reader over an immutable source buffer.
//!
//! The cursor is the only thing that walks the buffer linearly while output
//! is synthesized, so every byte is emitted exactly once: either as part of
//! an unchanged span returned by [`TextCursor::read_to`] or skipped over by a
//! [`TextCursor::seek`] past an edited range.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CursorError {
    #[error("cursor read/seek to byte {requested} is out of range (position {position}, length {len})")]
    OutOfRange {
        requested: usize,
        position: usize,
        len: usize,
    },

    #[error("byte {offset} is not on a UTF-8 character boundary")]
    NotCharBoundary { offset: usize },
}

/// Sequential reader with a single position marker.
#[derive(Debug, Clone)]
pub struct TextCursor<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> TextCursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    /// Current byte offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    pub fn is_at_end(&self) -> bool {
        self.pos == self.source.len()
    }

    /// Return bytes `[pos, n)` and advance to `n`.
    ///
    /// Reading to the current position is a no-op returning `""`. Reading
    /// backwards, past the end, or anywhere once the end has been reached
    /// is an error.
    pub fn read_to(&mut self, n: usize) -> Result<&'a str, CursorError> {
        if n == self.pos {
            return Ok("");
        }

        if n > self.source.len() || n < self.pos || self.is_at_end() {
            return Err(self.out_of_range(n));
        }

        let chunk = self
            .source
            .get(self.pos..n)
            .ok_or(CursorError::NotCharBoundary { offset: n })?;
        self.pos = n;
        Ok(chunk)
    }

    /// Return everything from the current position to the end of the buffer.
    pub fn read_to_end(&mut self) -> Result<&'a str, CursorError> {
        self.read_to(self.source.len())
    }

    /// Move the position marker without emitting anything.
    pub fn seek(&mut self, n: usize) -> Result<(), CursorError> {
        if n > self.source.len() {
            return Err(self.out_of_range(n));
        }
        if !self.source.is_char_boundary(n) {
            return Err(CursorError::NotCharBoundary { offset: n });
        }
        self.pos = n;
        Ok(())
    }

    fn out_of_range(&self, requested: usize) -> CursorError {
        CursorError::OutOfRange {
            requested,
            position: self.pos,
            len: self.source.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_sequential_chunks() {
        let mut cursor = TextCursor::new("hello world");
        assert_eq!(cursor.read_to(5).unwrap(), "hello");
        assert_eq!(cursor.position(), 5);
        assert_eq!(cursor.read_to_end().unwrap(), " world");
        assert!(cursor.is_at_end());
    }

    #[test]
    fn read_to_current_position_is_noop() {
        let mut cursor = TextCursor::new("abc");
        assert_eq!(cursor.read_to(0).unwrap(), "");
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn read_to_end_at_end_is_empty() {
        let mut cursor = TextCursor::new("abc");
        cursor.read_to_end().unwrap();
        assert_eq!(cursor.read_to_end().unwrap(), "");
    }

    #[test]
    fn read_past_end_fails() {
        let mut cursor = TextCursor::new("abc");
        assert!(matches!(
            cursor.read_to(4),
            Err(CursorError::OutOfRange { requested: 4, .. })
        ));
    }

    #[test]
    fn read_after_end_fails() {
        let mut cursor = TextCursor::new("abc");
        cursor.read_to_end().unwrap();
        assert!(matches!(
            cursor.read_to(1),
            Err(CursorError::OutOfRange { .. })
        ));
    }

    #[test]
    fn read_backwards_fails() {
        let mut cursor = TextCursor::new("abcdef");
        cursor.seek(4).unwrap();
        assert!(matches!(
            cursor.read_to(2),
            Err(CursorError::OutOfRange { .. })
        ));
    }

    #[test]
    fn seek_skips_bytes() {
        let mut cursor = TextCursor::new("keep DROP keep");
        assert_eq!(cursor.read_to(5).unwrap(), "keep ");
        cursor.seek(10).unwrap();
        assert_eq!(cursor.read_to_end().unwrap(), "keep");
    }

    #[test]
    fn seek_past_end_fails() {
        let mut cursor = TextCursor::new("abc");
        assert!(cursor.seek(3).is_ok());
        assert!(matches!(
            cursor.seek(9),
            Err(CursorError::OutOfRange { .. })
        ));
    }

    #[test]
    fn split_multibyte_char_is_rejected() {
        let mut cursor = TextCursor::new("héllo");
        assert!(matches!(
            cursor.read_to(2),
            Err(CursorError::NotCharBoundary { offset: 2 })
        ));
        assert!(matches!(
            cursor.seek(2),
            Err(CursorError::NotCharBoundary { offset: 2 })
        ));
    }

    #[test]
    fn empty_buffer() {
        let mut cursor = TextCursor::new("");
        assert!(cursor.is_empty());
        assert_eq!(cursor.read_to_end().unwrap(), "");
    }
}
