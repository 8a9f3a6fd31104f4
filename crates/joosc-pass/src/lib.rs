//! Dependency-ordered, heap-pooled pass execution (C2).
//!
//! A [`PassManager`] owns a fixed roster of [`Pass`]es. Enabling one
//! transitively enables every pass it depends on; the manager then
//! topologically sorts the enabled subset with Kahn's algorithm and runs it
//! in order, handing each pass a [`joosc_arena::Heap`] drawn from a pool
//! shared with passes whose results are no longer referenced.

mod error;
mod manager;
mod pass;

pub use error::PassError;
pub use manager::PassManager;
pub use pass::{DependencyContext, Pass, PassState, RunContext};
