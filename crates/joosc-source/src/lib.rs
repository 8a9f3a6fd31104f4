//! Source file handling and position tracking for the compiler core.
//!
//! This crate owns the opaque [`FileId`] / [`SourceRange`] data model and the
//! `SourceManager` collaborator described in the core's external interfaces:
//! producers add files by path, the core looks up file names and buffers by
//! `FileId`, and every downstream diagnostic carries a `SourceRange` built
//! from this crate's types. Ranges are immutable once constructed.

pub mod types;

pub use types::{FileId, Position, SourceFile, SourceManager, SourceRange, Span};
