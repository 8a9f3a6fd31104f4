//! Structured diagnostic records and the diagnostic engine collaborator (C3).
//!
//! The engine itself does not render anything; an external pretty-printer
//! consumes the records it accumulates. It records one [`Diagnostic`] per
//! semantic or hierarchy failure, each carrying a severity, a message, and a
//! [`SourceRange`]. `ReportError`/`ReportDebug` append records; `hasErrors`
//! and `Verbose` read back engine state, matching the collaborator contract.

use std::fmt;

use joosc_source::SourceRange;

/// Severity level of a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticLevel {
    /// An error that prevents successful compilation.
    Error,
    /// A warning about a potential issue that does not block compilation.
    Warning,
    /// Informational message.
    Info,
    /// Additional note attached to another diagnostic.
    Note,
}

impl DiagnosticLevel {
    /// Returns a string representation of the diagnostic level.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Note => "note",
        }
    }

    /// Returns the ANSI color code for the level.
    #[must_use]
    pub const fn color_code(&self) -> &'static str {
        match self {
            Self::Error => "\x1b[31m",
            Self::Warning => "\x1b[33m",
            Self::Info => "\x1b[36m",
            Self::Note => "\x1b[34m",
        }
    }

    /// Returns the ANSI reset code.
    #[must_use]
    pub const fn reset_code() -> &'static str { "\x1b[0m" }
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str()) }
}

/// A diagnostic message with source location information.
///
/// Diagnostics represent issues found during semantic analysis: unresolved
/// names, ambiguous imports, visibility violations, hierarchy cycles, and so
/// on (§7). They carry severity, message, source range, and optional notes,
/// suggestions, and a stable error code.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// Severity of this diagnostic.
    pub level: DiagnosticLevel,
    /// Message describing the issue.
    pub message: String,
    /// Source location of the issue.
    pub span: SourceRange,
    /// Additional explanatory notes.
    pub notes: Vec<String>,
    /// Suggested fixes or alternatives.
    pub suggestions: Vec<String>,
    /// Optional stable error code (e.g. `E0001`).
    pub code: Option<String>,
}

impl Diagnostic {
    /// Creates a new error-level diagnostic.
    #[must_use]
    pub const fn error(message: String, span: SourceRange) -> Self {
        Self {
            level: DiagnosticLevel::Error,
            message,
            span,
            notes: Vec::new(),
            suggestions: Vec::new(),
            code: None,
        }
    }

    /// Creates a new warning-level diagnostic.
    #[must_use]
    pub const fn warning(message: String, span: SourceRange) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            message,
            span,
            notes: Vec::new(),
            suggestions: Vec::new(),
            code: None,
        }
    }

    /// Creates a new info-level diagnostic.
    #[must_use]
    pub const fn info(message: String, span: SourceRange) -> Self {
        Self {
            level: DiagnosticLevel::Info,
            message,
            span,
            notes: Vec::new(),
            suggestions: Vec::new(),
            code: None,
        }
    }

    /// Adds an explanatory note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Adds a suggested fix.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Attaches a stable error code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let color = self.level.color_code();
        let reset = DiagnosticLevel::reset_code();
        write!(f, "{color}{}{reset}: {}", self.level, self.message)?;
        if let Some(code) = &self.code {
            write!(f, " [{code}]")?;
        }
        write!(f, " at {}", self.span)?;
        for note in &self.notes {
            write!(f, "\n  note: {note}")?;
        }
        for suggestion in &self.suggestions {
            write!(f, "\n  suggestion: {suggestion}")?;
        }
        Ok(())
    }
}

/// Accumulates diagnostics for a compiler run.
///
/// This is the collaborator described in §4.3: it does not render anything,
/// it just records and reports on the sequence of diagnostics raised by the
/// semantic pipeline. Pass-execution tracing is a separate, lower-severity
/// concern handled through the `log` facade (§10.1), not through this engine.
#[derive(Debug, Default)]
pub struct DiagnosticEngine {
    diagnostics: Vec<Diagnostic>,
    verbosity: u8,
}

impl DiagnosticEngine {
    /// Creates a new, empty engine.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Records an error-level diagnostic at `span` with `message`.
    pub fn report_error(&mut self, message: impl Into<String>, span: SourceRange) -> &Diagnostic {
        self.diagnostics.push(Diagnostic::error(message.into(), span));
        self.diagnostics.last().expect("just pushed")
    }

    /// Records a diagnostic only if the engine's verbosity is at least `level`.
    pub fn report_debug(&mut self, level: u8, message: impl Into<String>, span: SourceRange) {
        if self.verbosity >= level {
            self.diagnostics.push(Diagnostic::info(message.into(), span));
        }
    }

    /// Records a pre-built diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) { self.diagnostics.push(diagnostic); }

    /// Returns true if any recorded diagnostic is at error level.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.level == DiagnosticLevel::Error)
    }

    /// Sets the verbosity threshold used by [`Self::report_debug`].
    pub fn set_verbose(&mut self, level: u8) { self.verbosity = level; }

    /// Returns the current verbosity threshold.
    #[must_use]
    pub const fn verbose(&self) -> u8 { self.verbosity }

    /// Iterates over every recorded diagnostic, in report order.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> { self.diagnostics.iter() }

    /// Number of diagnostics recorded so far.
    #[must_use]
    pub fn len(&self) -> usize { self.diagnostics.len() }

    /// Returns true if no diagnostics have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.diagnostics.is_empty() }
}

#[cfg(test)]
mod tests {
    use joosc_source::{FileId, Position};

    use super::*;

    fn dummy_span() -> SourceRange {
        SourceRange::new(Position::start_of_file(), Position::start_of_file(), FileId::new(1))
    }

    #[test]
    fn has_errors_reflects_error_level_records() {
        let mut engine = DiagnosticEngine::new();
        assert!(!engine.has_errors());
        engine.report_debug(0, "informational", dummy_span());
        assert!(!engine.has_errors());
        let _ = engine.report_error("boom", dummy_span());
        assert!(engine.has_errors());
    }

    #[test]
    fn report_debug_respects_verbosity() {
        let mut engine = DiagnosticEngine::new();
        engine.report_debug(2, "only at verbose >= 2", dummy_span());
        assert_eq!(engine.len(), 0);
        engine.set_verbose(2);
        engine.report_debug(2, "now visible", dummy_span());
        assert_eq!(engine.len(), 1);
    }
}
