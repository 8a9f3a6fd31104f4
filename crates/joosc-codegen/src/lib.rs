//! Code generation and name mangling.
//!
//! - [`mangle::Mangler`] (C10) derives a linker-safe symbol for every method,
//!   constructor, and static field.
//! - [`types::TypeLowering`] and [`declare::Declarations`] (C9, part 1) lower
//!   AST types to TIR types, lay out every class's non-static fields into a
//!   struct, and forward-declare every global and function.
//! - [`expressions::Evaluator`] and [`statements::lower_stmt`] (C9, part 2)
//!   lower one method or constructor body's statements and expressions.
//! - [`functions::define_function`] (C9, part 3) turns a declared function
//!   into a defined one by allocating its locals and lowering its body.
//! - [`generator::generate`] (C9, part 4) drives the whole pipeline over a
//!   run's compilation units.
//!
//! Every failure here is [`error::CodegenError`]: a programmer-error
//! signaling that an earlier pass did not establish an invariant this crate
//! depends on, never a user-facing diagnostic.

pub mod declare;
pub mod error;
pub mod expressions;
pub mod functions;
pub mod generator;
pub mod mangle;
pub mod statements;
pub mod symbol_table;
pub mod types;

pub use declare::Declarations;
pub use error::{CodegenError, MangleError};
pub use expressions::{EvalValue, Evaluator};
pub use generator::generate;
pub use mangle::Mangler;
pub use symbol_table::SymbolTable;
pub use types::{ClassLayout, TypeLowering};
