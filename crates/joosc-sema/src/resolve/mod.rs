//! Name and expression resolution (C5, C6).

mod expr;
mod name;
mod package;

pub use expr::{ExpressionResolver, LocalScope};
pub use name::{ImportResolution, NameResolver};
pub use package::{PackageTree, PkgId, PkgMember};
