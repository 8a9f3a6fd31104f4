//! Values: constants, arguments, globals, functions, basic blocks, and
//! instructions, all addressed through one [`ValueId`] space so any of them
//! can appear as another's operand.

use crate::function::{BasicBlockId, FunctionId};
use crate::types::TypeId;

/// A handle into [`crate::context::Context`]'s value table. Never reused:
/// the context lives for exactly one code generation pass (§5) and nothing
/// frees individual values out of it, so unlike `joosc_ast::NodeID` this
/// carries no generation counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueId(pub(crate) u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constant {
    Int(i32),
    Bool(bool),
    Null,
    /// A string literal's payload. Breaks this enum's `Copy`-ness, but a
    /// dedicated `ValueKind` would only duplicate `Constant`'s role.
    Str(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ICmp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// A source/target type pair the code generator needs an explicit cast
/// instruction for: a widening numeric conversion, a narrowing numeric
/// conversion, or an opaque pointer reinterpretation (reference downcasts
/// erase to this at the IR level; the hierarchy checker already proved
/// them sound by the time code generation runs).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastKind {
    Widen,
    Narrow,
    Bitcast,
}

/// What one instruction does. Operand lists are stored alongside in
/// [`ValueData::operands`], not here, so `replaceAllUsesWith` never needs to
/// match on this enum to find them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionKind {
    Alloca { allocated: TypeId },
    Load,
    /// Operand 0 is the value, operand 1 is the destination pointer.
    Store,
    BinOp(BinOp),
    ICmp(ICmp),
    Neg,
    Not,
    /// Operand 0 is the target block, carried as a `BasicBlock` value.
    Branch,
    /// Operand 0 is the condition, operands 1/2 are the then/else blocks.
    CondBranch,
    /// Operand 0, if present, is the returned value.
    Return,
    /// Operand 0 is the callee, the rest are arguments.
    Call,
    /// Operand 0 is the base pointer; yields a pointer to one struct field.
    FieldAccess { field_index: u32 },
    /// Operands are the base pointer and the index; yields an element pointer.
    ArrayIndex,
    /// Operand 0 is the base pointer to an array struct; yields its `i32` length.
    ArrayLength,
    /// Operand 0 is the element count; yields a pointer to a fresh array struct.
    ArrayAlloc,
    /// Yields a pointer to a fresh, zeroed instance of the allocated struct type.
    StructAlloc { allocated: TypeId },
    /// Operand 0 is the value being converted.
    Cast(CastKind),
}

#[derive(Debug, Clone)]
pub enum ValueKind {
    Constant(Constant),
    Argument { index: u32, name: String },
    GlobalVariable { name: String, pointee: TypeId, initializer: Option<ValueId> },
    Function(FunctionId),
    BasicBlock(BasicBlockId),
    Instruction(InstructionKind),
}

/// One entry in the context's value table: its type, what kind of value it
/// is, the operands it consumes, and the users that consume it in turn.
#[derive(Debug, Clone)]
pub struct ValueData {
    pub ty: TypeId,
    pub kind: ValueKind,
    pub operands: Vec<ValueId>,
    /// Every value currently using this one as an operand, insertion-order,
    /// with one entry per operand slot (so a user referencing the same
    /// operand twice appears twice).
    pub users: Vec<ValueId>,
}
