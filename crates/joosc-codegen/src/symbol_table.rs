//! Local-value tracking during one function's definition.
//!
//! Grounded in the teacher's LLVM-backed `SymbolTable`, but flattened: every
//! local and parameter gets its alloca up front, at function entry (§4.9),
//! before any statement is lowered, so a local's `VarDecl` node id is already
//! a unique key for the whole function body. No push/pop scoping is needed
//! here the way name resolution needs it, since shadowing was already
//! resolved to distinct node ids by the time code generation runs.

use joosc_ast::NodeID;
use joosc_tir::ValueId;
use rustc_hash::FxHashMap;

/// Maps a local/parameter's declaration node to the alloca holding its
/// value, for the duration of one function's definition.
#[derive(Debug, Default)]
pub struct SymbolTable {
    locals: FxHashMap<NodeID, ValueId>,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    pub fn bind(&mut self, decl: NodeID, alloca: ValueId) { self.locals.insert(decl, alloca); }

    #[must_use]
    pub fn lookup(&self, decl: NodeID) -> Option<ValueId> { self.locals.get(&decl).copied() }
}
