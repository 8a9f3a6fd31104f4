//! Type definitions for source code representation.
//!
//! Key types include:
//!
//! - `Position`: a specific location in source code with line, column, and byte offset
//! - `Span` and `SourceRange`: ranges within source files
//! - `SourceFile`: a complete source file with efficient position lookup
//! - `SourceManager`: multiple source files addressed by `FileId`
//!
//! Files added through `SourceManager::add_file` must have a `.java` extension
//! and must exist on disk, matching the producer contract the core expects.

use std::fmt;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use thiserror::Error;

/// A unique identifier for a source file.
///
/// `FileId` is a newtype wrapper around `usize` that uniquely identifies
/// a source file within a [`SourceManager`]. IDs are assigned by the
/// manager when source files are added to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileId(usize);

impl FileId {
    /// Creates a new `FileId` with the given value.
    #[must_use]
    pub const fn new(id: usize) -> Self { Self(id) }

    /// Returns the inner value of the `FileId`.
    #[must_use]
    pub const fn value(&self) -> usize { self.0 }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "file:{}", self.0) }
}

/// Failure to register a source file with a [`SourceManager`].
#[derive(Debug, Error)]
pub enum SourceError {
    /// The path does not end in `.java`.
    #[error("file {0} is not a .java file")]
    NotJavaFile(String),
    /// The file could not be read from disk.
    #[error("file {path} does not exist or could not be read: {source}")]
    Io {
        /// The path that failed to read.
        path: String,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

/// A position in a source file.
///
/// Positions are 1-indexed for line and column, following common editor
/// conventions. The `offset` is 0-indexed, representing the byte offset
/// from the start of the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
    /// Byte offset from the start of the file (0-indexed).
    pub offset: usize,
}

impl Position {
    /// Creates a new position with the given line, column, and byte offset.
    #[must_use]
    pub const fn new(line: usize, column: usize, offset: usize) -> Self {
        Self { line, column, offset }
    }

    /// The position at the start of a file (line 1, column 1, offset 0).
    #[must_use]
    pub const fn start_of_file() -> Self { Self { line: 1, column: 1, offset: 0 } }

    /// Returns true if this position precedes the other position.
    #[must_use]
    pub const fn precedes(&self, other: &Self) -> bool { self.offset < other.offset }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A source file: its content, name, and precomputed line-start offsets for
/// efficient line/column lookup.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Identifier of the file.
    pub id: FileId,
    /// Name of the file (usually a path).
    pub name: String,
    /// Path to the file, if it came from disk.
    pub path: Option<PathBuf>,
    /// Content of the file.
    pub content: String,
    /// Byte offsets of line starts (0-indexed, first entry is always 0).
    pub line_starts: Vec<usize>,
}

impl SourceFile {
    /// Creates a new source file with the given ID, name, and content.
    #[must_use]
    pub fn new(id: FileId, name: String, content: String) -> Self {
        let line_starts = compute_line_starts(&content);
        Self { id, name, path: None, content, line_starts }
    }

    /// Creates a new source file with the given ID, name, path, and content.
    #[must_use]
    pub fn with_path(id: FileId, name: String, path: PathBuf, content: String) -> Self {
        let line_starts = compute_line_starts(&content);
        Self { id, name, path: Some(path), content, line_starts }
    }

    /// Converts a byte offset to a [`Position`].
    ///
    /// ## Panics
    ///
    /// Panics if the byte offset is greater than the length of the file's content.
    #[must_use]
    pub fn position_from_offset(&self, byte_offset: usize) -> Position {
        assert!(
            byte_offset <= self.content.len(),
            "byte offset {} out of range for file with length {}",
            byte_offset,
            self.content.len()
        );

        match self.line_starts.binary_search(&byte_offset) {
            Ok(line) => Position::new(line + 1, 1, byte_offset),
            Err(line) => {
                let line = line - 1;
                let line_start_offset = self.line_starts[line];
                let column = byte_offset - line_start_offset + 1;
                Position::new(line + 1, column, byte_offset)
            }
        }
    }

    /// Returns the text at the given range.
    ///
    /// ## Panics
    ///
    /// Panics if the range belongs to a different file.
    #[must_use]
    pub fn text_at_range(&self, range: SourceRange) -> &str {
        assert_eq!(range.file_id, self.id, "range is from a different file");
        &self.content[range.byte_range()]
    }
}

fn compute_line_starts(content: &str) -> Vec<usize> {
    let mut line_starts = vec![0];
    for (i, c) in content.char_indices() {
        if c == '\n' {
            line_starts.push(i + 1);
        }
    }
    line_starts
}

/// Manages all source files for a compiler run and assigns unique `FileId`s.
#[derive(Debug, Default)]
pub struct SourceManager {
    files: FxHashMap<FileId, SourceFile>,
    next_id: usize,
}

impl SourceManager {
    /// Creates a new, empty `SourceManager`.
    #[must_use]
    pub fn new() -> Self { Self { files: FxHashMap::default(), next_id: 1 } }

    /// Registers in-memory source text under `name` without touching the filesystem.
    pub fn add_buffer(&mut self, name: String, content: String) -> FileId {
        let id = FileId::new(self.next_id);
        self.next_id += 1;
        let _ = self.files.insert(id, SourceFile::new(id, name, content));
        id
    }

    /// Reads `path` from disk and registers it.
    ///
    /// ## Errors
    ///
    /// Returns [`SourceError::NotJavaFile`] if the path does not end in `.java`,
    /// or [`SourceError::Io`] if the file cannot be read.
    pub fn add_file(&mut self, path: &Path) -> Result<FileId, SourceError> {
        if path.extension().and_then(|ext| ext.to_str()) != Some("java") {
            return Err(SourceError::NotJavaFile(path.display().to_string()));
        }
        let content = fs::read_to_string(path)
            .map_err(|source| SourceError::Io { path: path.display().to_string(), source })?;
        let id = FileId::new(self.next_id);
        self.next_id += 1;
        let name = path.display().to_string();
        let file = SourceFile::with_path(id, name, path.to_path_buf(), content);
        let _ = self.files.insert(id, file);
        Ok(id)
    }

    /// Returns the source file with the given ID, if it exists.
    #[must_use]
    pub fn get_file(&self, id: FileId) -> Option<&SourceFile> { self.files.get(&id) }

    /// Iterates over every registered file, in ascending `FileId` order.
    pub fn files(&self) -> impl Iterator<Item = &SourceFile> {
        let mut ids: Vec<_> = self.files.keys().copied().collect();
        ids.sort_unstable();
        ids.into_iter().filter_map(move |id| self.files.get(&id))
    }

    /// Returns the position corresponding to a byte offset in the given file.
    #[must_use]
    pub fn position_from_offset(&self, file_id: FileId, byte_offset: usize) -> Option<Position> {
        self.get_file(file_id).map(|file| file.position_from_offset(byte_offset))
    }
}

/// A range in a source file, between two positions. Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceRange {
    /// Starting position of the range.
    pub start: Position,
    /// Ending position of the range (exclusive).
    pub end: Position,
    /// File the range belongs to.
    pub file_id: FileId,
}

impl SourceRange {
    /// Creates a new range with the given start and end positions and file ID.
    #[must_use]
    pub const fn new(start: Position, end: Position, file_id: FileId) -> Self {
        Self { start, end, file_id }
    }

    /// Returns the byte range of this range.
    #[must_use]
    pub const fn byte_range(&self) -> Range<usize> { self.start.offset..self.end.offset }

    /// Creates a new range that encompasses both input ranges.
    ///
    /// ## Panics
    ///
    /// Panics if the ranges are from different files.
    #[must_use]
    pub fn combine(&self, other: &Self) -> Self {
        assert_eq!(self.file_id, other.file_id, "cannot combine ranges from different files");
        let start = if self.start.precedes(&other.start) { self.start } else { other.start };
        let end = if self.end.precedes(&other.end) { other.end } else { self.end };
        Self { start, end, file_id: self.file_id }
    }
}

impl Default for SourceRange {
    fn default() -> Self {
        Self {
            start: Position::new(0, 0, 0),
            end: Position::new(0, 0, 0),
            file_id: FileId(0),
        }
    }
}

impl fmt::Display for SourceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.file_id, self.start, self.end)
    }
}

/// A simple span containing only start/end byte offsets, used before a
/// [`SourceRange`] can be resolved against a specific file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Start offset.
    pub start: usize,
    /// End offset.
    pub end: usize,
}

impl Span {
    /// Creates a new span with the given start and end offsets.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self { Self { start, end } }

    /// Merges two spans, creating a new span that covers both.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        Self::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self { Self { start: range.start, end: range.end } }
}

impl From<Span> for Range<usize> {
    fn from(span: Span) -> Self { span.start..span.end }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_and_column_tracking() {
        let mut mgr = SourceManager::new();
        let id = mgr.add_buffer("Test.java".to_string(), "a\nbc\nd".to_string());
        let file = mgr.get_file(id).unwrap();
        assert_eq!(file.position_from_offset(0), Position::new(1, 1, 0));
        assert_eq!(file.position_from_offset(3), Position::new(2, 2, 3));
        assert_eq!(file.position_from_offset(5), Position::new(3, 1, 5));
    }

    #[test]
    fn combine_spans_takes_outer_bounds() {
        let file_id = FileId::new(1);
        let a = SourceRange::new(Position::new(1, 1, 0), Position::new(1, 5, 4), file_id);
        let b = SourceRange::new(Position::new(1, 3, 2), Position::new(2, 1, 7), file_id);
        let combined = a.combine(&b);
        assert_eq!(combined.start.offset, 0);
        assert_eq!(combined.end.offset, 7);
    }
}
