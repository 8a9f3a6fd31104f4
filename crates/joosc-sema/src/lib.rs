//! Name resolution, expression resolution, and hierarchy checking.
//!
//! - [`resolve::NameResolver`] (C5) builds the global package tree and
//!   resolves imports and qualified type names per JLS 6.5.2.
//! - [`resolve::ExpressionResolver`] (C6) classifies the ambiguous names
//!   inside method and constructor bodies once every type is known.
//! - [`hierarchy::HierarchyChecker`] (C7) checks the `extends`/`implements`
//!   graph for cycles and enforces override, constructor, and abstract-method
//!   coverage rules.
//!
//! All three report failures as [`error::SemaError`].

pub mod error;
pub mod hierarchy;
pub mod resolve;

pub use error::SemaError;
pub use hierarchy::HierarchyChecker;
pub use resolve::{ExpressionResolver, ImportResolution, LocalScope, NameResolver, PackageTree, PkgId, PkgMember};
