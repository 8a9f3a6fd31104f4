//! Errors raised by name resolution, expression resolution, and hierarchy
//! checking.

use joosc_diagnostics::Diagnostic;
use joosc_source::SourceRange;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SemaError {
    #[error("cannot resolve name '{name}'")]
    UnresolvedName { name: String, span: SourceRange },

    #[error("ambiguous import-on-demand conflict for '{name}'")]
    AmbiguousImport { name: String, span: SourceRange },

    #[error("single-type import '{name}' conflicts with another import")]
    ConflictingSingleTypeImport { name: String, span: SourceRange },

    #[error("field access on '{name}', which is not a field of reference type")]
    NotAFieldAccess { name: String, span: SourceRange },

    #[error("'{name}' is not declared on class '{class}'")]
    UndeclaredMember { name: String, class: String, span: SourceRange },

    #[error("static access to non-static member '{name}'")]
    StaticAccessToInstanceMember { name: String, span: SourceRange },

    #[error("static access on '{name}', which is not a class")]
    StaticAccessOnNonClass { name: String, span: SourceRange },

    #[error("'{name}' is not a member of package '{package}'")]
    UndeclaredPackageMember { name: String, package: String, span: SourceRange },

    #[error("cyclic inheritance detected: {}", cycle.join(" -> "))]
    CyclicInheritance { cycle: Vec<String>, span: SourceRange },

    #[error("class '{name}' declares no constructor")]
    MissingConstructor { name: String, span: SourceRange },

    #[error("method '{method}' in '{class}' may not narrow visibility inherited from '{parent}'")]
    OverrideNarrowsVisibility { class: String, method: String, parent: String, span: SourceRange },

    #[error("method '{method}' in '{class}' changes static-ness of the overridden method in '{parent}'")]
    OverrideChangesStaticness { class: String, method: String, parent: String, span: SourceRange },

    #[error("method '{method}' in '{class}' overrides a final method declared in '{parent}'")]
    OverrideOfFinalMethod { class: String, method: String, parent: String, span: SourceRange },

    #[error("method '{method}' in '{class}' does not match the return type declared in '{parent}'")]
    OverrideReturnTypeMismatch { class: String, method: String, parent: String, span: SourceRange },

    #[error("class '{class}' does not implement abstract method '{method}' from '{source}'")]
    MissingAbstractMethodImpl { class: String, method: String, source: String, span: SourceRange },

    #[error("interface method '{method}' conflicts on return type between '{first}' and '{second}'")]
    InterfaceMethodConflict { method: String, first: String, second: String, span: SourceRange },

    #[error("'{name}' has an invalid modifier combination: {reason}")]
    InvalidModifierCombination { name: String, reason: String, span: SourceRange },
}

impl SemaError {
    #[must_use]
    pub const fn span(&self) -> SourceRange {
        match self {
            Self::UnresolvedName { span, .. }
            | Self::AmbiguousImport { span, .. }
            | Self::ConflictingSingleTypeImport { span, .. }
            | Self::NotAFieldAccess { span, .. }
            | Self::UndeclaredMember { span, .. }
            | Self::StaticAccessToInstanceMember { span, .. }
            | Self::StaticAccessOnNonClass { span, .. }
            | Self::UndeclaredPackageMember { span, .. }
            | Self::CyclicInheritance { span, .. }
            | Self::MissingConstructor { span, .. }
            | Self::OverrideNarrowsVisibility { span, .. }
            | Self::OverrideChangesStaticness { span, .. }
            | Self::OverrideOfFinalMethod { span, .. }
            | Self::OverrideReturnTypeMismatch { span, .. }
            | Self::MissingAbstractMethodImpl { span, .. }
            | Self::InterfaceMethodConflict { span, .. }
            | Self::InvalidModifierCombination { span, .. } => *span,
        }
    }

    /// Renders this error as a diagnostic record for the engine described
    /// in §4.3, using this error's `Display` message verbatim.
    #[must_use]
    pub fn to_diagnostic(&self) -> Diagnostic { Diagnostic::error(self.to_string(), self.span()) }
}
