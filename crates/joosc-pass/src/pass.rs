//! The `Pass` trait and the per-pass execution state machine.

use std::any::{Any, TypeId};

use joosc_arena::Heap;
use joosc_diagnostics::DiagnosticEngine;

use crate::error::PassError;

/// Lifecycle state of a single registered pass, tracked by the manager.
///
/// Passes move strictly left to right except for the final fork: a pass that
/// runs to completion becomes `Valid`; one whose `run` reports failure
/// becomes `Invalid` and the manager aborts the remainder of the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassState {
    /// Registered but not yet visited by any phase.
    Uninitialized,
    /// Visited by the enable-propagation phase.
    PropagateEnabled,
    /// Dependency edges and heap ownership have been recorded.
    RegisterDependencies,
    /// `run` is executing or has been dispatched.
    Running,
    /// Dependency heap ref-counts have been released.
    Cleanup,
    /// Ran to completion successfully.
    Valid,
    /// `run` reported failure or a dependency is `Invalid`.
    Invalid,
}

/// Accumulates the dependency set and preservation flag a pass declares
/// during [`Pass::compute_dependencies`]. The manager calls this once per
/// pass up front and reuses the result across the enable-propagation and
/// dependency-registration phases, so a pass only ever lists its
/// dependencies one way, regardless of which phase the manager is driving.
#[derive(Debug, Default)]
pub struct DependencyContext {
    dependencies: Vec<TypeId>,
    preserve: bool,
}

impl DependencyContext {
    pub(crate) fn new() -> Self { Self::default() }

    /// Declares that this pass depends on pass type `T`: `T` is guaranteed
    /// to have already run (and, transitively, to be enabled) before this
    /// pass runs.
    pub fn require<T: Pass>(&mut self) { self.dependencies.push(TypeId::of::<T>()); }

    /// Marks this pass's results as preserved: its heap is not returned to
    /// the pool during cleanup even once its ref-count reaches zero. The
    /// manager extends this transitively to every pass this one depends on.
    pub fn preserve(&mut self) { self.preserve = true; }

    pub(crate) fn into_parts(self) -> (Vec<TypeId>, bool) { (self.dependencies, self.preserve) }
}

/// Read/write access handed to a pass's `run` method.
///
/// Borrows the pass's own heap and the shared diagnostic engine, and exposes
/// lookups into the results of passes that already ran (its dependencies).
pub struct RunContext<'a> {
    heap: &'a Heap,
    diag: &'a mut DiagnosticEngine,
    passes: &'a [Option<Box<dyn Pass>>],
}

impl<'a> RunContext<'a> {
    pub(crate) fn new(
        heap: &'a Heap,
        diag: &'a mut DiagnosticEngine,
        passes: &'a [Option<Box<dyn Pass>>],
    ) -> Self {
        Self { heap, diag, passes }
    }

    /// The heap owned by the currently-running pass.
    #[must_use]
    pub const fn heap(&self) -> &Heap { self.heap }

    /// The shared diagnostic engine.
    pub fn diag(&mut self) -> &mut DiagnosticEngine { self.diag }

    /// Looks up the single already-run pass of type `T`.
    ///
    /// ## Errors
    ///
    /// Returns [`PassError::PassNotFound`] if no pass of type `T` is
    /// registered, or [`PassError::MultiplePassesFound`] if more than one is.
    pub fn get_pass<T: Pass>(&self) -> Result<&T, PassError> {
        let mut found =
            self.passes.iter().filter_map(Option::as_deref).filter_map(|p| p.as_any().downcast_ref::<T>());
        let first = found.next().ok_or(PassError::PassNotFound { type_name: std::any::type_name::<T>() })?;
        if found.next().is_some() {
            return Err(PassError::MultiplePassesFound { type_name: std::any::type_name::<T>() });
        }
        Ok(first)
    }

    /// Looks up every already-run pass of type `T`.
    pub fn get_passes<T: Pass>(&self) -> Vec<&T> {
        self.passes.iter().filter_map(Option::as_deref).filter_map(|p| p.as_any().downcast_ref::<T>()).collect()
    }
}

/// A single compilation step.
///
/// Implementors own whatever state they build during `run` in the heap
/// handed to them through [`RunContext::heap`]; downstream passes reach that
/// state back out through [`RunContext::get_pass`].
pub trait Pass: Any {
    /// Short, stable identifier used in logs and dependency-cycle messages.
    fn name(&self) -> &'static str;

    /// One-line human-readable description, surfaced by `--list-passes`.
    fn description(&self) -> &'static str { "" }

    /// Declares this pass's dependencies and preservation intent. Called
    /// once per pass before scheduling; must not have side effects beyond
    /// calls into `ctx`.
    fn compute_dependencies(&self, ctx: &mut DependencyContext) { let _ = ctx; }

    /// One-time setup before the pass is eligible to run. The default is a
    /// no-op; most passes only need `run`.
    ///
    /// ## Errors
    ///
    /// Returns [`PassError::PassFailed`] if setup cannot proceed.
    fn init(&mut self) -> Result<(), PassError> { Ok(()) }

    /// Executes the pass's work against its own heap and the results of its
    /// dependencies.
    ///
    /// ## Errors
    ///
    /// Returns [`PassError::PassFailed`] if the pass cannot complete.
    fn run(&mut self, ctx: &mut RunContext<'_>) -> Result<(), PassError>;

    #[doc(hidden)]
    fn as_any(&self) -> &dyn Any;

    #[doc(hidden)]
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
