//! Fatal errors raised by code generation and name mangling (§7: both are
//! programmer errors, since every user-facing mistake is already caught by
//! the resolver and hierarchy checker before this crate ever runs).

use thiserror::Error;

/// An invariant code generation expects the earlier passes to have already
/// established was violated. Each variant keeps enough context to diagnose
/// the bug without re-running the compiler under a debugger.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodegenError {
    #[error("name '{name}' used in an expression was never classified by the expression resolver")]
    UnresolvedName { name: String },

    #[error("'{name}' has no lowered value; its declaring pass did not run before code generation")]
    UndeclaredValue { name: String },

    #[error("type node could not be lowered to a TIR type")]
    UnlowerableType,

    #[error("expression evaluator reported: {0}")]
    Eval(#[from] joosc_ast::expr::EvalError),

    #[error("name mangling failed: {0}")]
    Mangle(#[from] MangleError),
}

/// A name mangler input that the C++ mangling scheme this one is ported from
/// has no encoding for.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MangleError {
    #[error("cannot mangle built-in type {kind:?}: it never appears as a value type")]
    UnsupportedBuiltIn { kind: joosc_ast::ty::BuiltIn },
}
