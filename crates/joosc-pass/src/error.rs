//! Fatal failure modes of the pass manager.

use thiserror::Error;

/// Errors that abort a compilation run. A conforming pass graph never
/// triggers these; they exist to turn a programmer mistake (a cycle, a
/// double-registered pass, a stale heap handle) into a diagnosable `Err`
/// instead of a panic.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PassError {
    /// The dependency graph contains a cycle, so no run order exists.
    #[error("cyclic pass dependency involving: {}", .cycle.join(" -> "))]
    CyclicDependency {
        /// Names of the passes participating in the cycle, in edge order.
        cycle: Vec<String>,
    },

    /// A pass tried to allocate from a heap after it was returned to the pool.
    #[error("heap owned by pass `{owner}` was used after being freed")]
    HeapUseAfterDestroy {
        /// Name of the pass that originally owned the heap.
        owner: String,
    },

    /// `get_pass::<T>` found no registered pass of the requested type.
    #[error("no registered pass of type `{type_name}`")]
    PassNotFound {
        /// Type name of the requested pass, for diagnostics only.
        type_name: &'static str,
    },

    /// `get_passes::<T>` is unambiguous by construction, but `get_pass::<T>`
    /// requires exactly one match; more than one is a registration bug.
    #[error("multiple registered passes of type `{type_name}`, expected exactly one")]
    MultiplePassesFound {
        /// Type name of the requested pass, for diagnostics only.
        type_name: &'static str,
    },

    /// A pass's own `init` or `run` hook reported an unrecoverable failure.
    #[error("pass `{pass}` failed: {message}")]
    PassFailed {
        /// Name of the failing pass.
        pass: String,
        /// Failure description from the pass itself.
        message: String,
    },
}
