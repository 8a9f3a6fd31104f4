//! `IRBuilder`: an insert point (a basic block, always appended at its end)
//! plus one creation method per instruction kind (§4.8). Every `create_*`
//! call appends at the insert point, which then advances past it.

use crate::context::Context;
use crate::function::BasicBlockId;
use crate::types::TypeId;
use crate::value::{BinOp, CastKind, Constant, ICmp, InstructionKind, ValueId};

pub struct IRBuilder<'ctx> {
    ctx: &'ctx mut Context,
    block: Option<BasicBlockId>,
}

impl<'ctx> IRBuilder<'ctx> {
    pub fn new(ctx: &'ctx mut Context) -> Self { Self { ctx, block: None } }

    pub fn position_at_end(&mut self, block: BasicBlockId) { self.block = Some(block); }

    #[must_use]
    pub fn insert_block(&self) -> Option<BasicBlockId> { self.block }

    #[must_use]
    pub fn context_mut(&mut self) -> &mut Context { self.ctx }

    fn insert(&mut self, ty: TypeId, kind: InstructionKind, operands: Vec<ValueId>) -> ValueId {
        let block = self.block.expect("create_* called with no insert point set");
        self.ctx.append_instruction(block, ty, kind, operands)
    }

    pub fn create_basic_block(&mut self, name: impl Into<String>) -> BasicBlockId {
        let function = self.ctx.basic_block(self.block.expect("insert point set")).function;
        self.ctx.create_basic_block(function, name.into())
    }

    pub fn create_alloca_instr(&mut self, allocated: TypeId) -> ValueId {
        let ptr_ty = self.ctx.pointer_ty();
        self.insert(ptr_ty, InstructionKind::Alloca { allocated }, Vec::new())
    }

    pub fn create_store_instr(&mut self, value: ValueId, ptr: ValueId) -> ValueId {
        let void_ty = self.ctx.void_ty();
        self.insert(void_ty, InstructionKind::Store, vec![value, ptr])
    }

    pub fn create_load_instr(&mut self, ty: TypeId, ptr: ValueId) -> ValueId {
        self.insert(ty, InstructionKind::Load, vec![ptr])
    }

    pub fn create_int_constant(&mut self, value: i32) -> ValueId {
        let ty = self.ctx.int32_ty();
        self.ctx.create_constant(ty, Constant::Int(value))
    }

    pub fn create_bool_constant(&mut self, value: bool) -> ValueId {
        let ty = self.ctx.int1_ty();
        self.ctx.create_constant(ty, Constant::Bool(value))
    }

    /// A `char` literal, lowered to `i16` per §4.9's type table.
    pub fn create_char_constant(&mut self, value: char) -> ValueId {
        let ty = self.ctx.int16_ty();
        self.ctx.create_constant(ty, Constant::Int(i32::from(u32::from(value))))
    }

    pub fn create_null_constant(&mut self) -> ValueId {
        let ty = self.ctx.pointer_ty();
        self.ctx.create_constant(ty, Constant::Null)
    }

    /// A string literal, lowered to `Pointer` per §4.9's type table.
    pub fn create_string_constant(&mut self, value: impl Into<String>) -> ValueId {
        let ty = self.ctx.pointer_ty();
        self.ctx.create_constant(ty, Constant::Str(value.into()))
    }

    pub fn create_binop_instr(&mut self, op: BinOp, ty: TypeId, lhs: ValueId, rhs: ValueId) -> ValueId {
        self.insert(ty, InstructionKind::BinOp(op), vec![lhs, rhs])
    }

    pub fn create_icmp_instr(&mut self, pred: ICmp, lhs: ValueId, rhs: ValueId) -> ValueId {
        let bool_ty = self.ctx.int1_ty();
        self.insert(bool_ty, InstructionKind::ICmp(pred), vec![lhs, rhs])
    }

    pub fn create_neg_instr(&mut self, ty: TypeId, value: ValueId) -> ValueId {
        self.insert(ty, InstructionKind::Neg, vec![value])
    }

    pub fn create_not_instr(&mut self, value: ValueId) -> ValueId {
        let bool_ty = self.ctx.int1_ty();
        self.insert(bool_ty, InstructionKind::Not, vec![value])
    }

    /// The target block's identity `Value`, from [`crate::function::BasicBlockData::value`].
    fn block_value(&self, block: BasicBlockId) -> ValueId { self.ctx.basic_block(block).value }

    pub fn create_branch_instr(&mut self, target: BasicBlockId) -> ValueId {
        let void_ty = self.ctx.void_ty();
        let target_value = self.block_value(target);
        self.insert(void_ty, InstructionKind::Branch, vec![target_value])
    }

    pub fn create_cond_branch_instr(
        &mut self,
        condition: ValueId,
        then_block: BasicBlockId,
        else_block: BasicBlockId,
    ) -> ValueId {
        let void_ty = self.ctx.void_ty();
        let then_value = self.block_value(then_block);
        let else_value = self.block_value(else_block);
        self.insert(void_ty, InstructionKind::CondBranch, vec![condition, then_value, else_value])
    }

    pub fn create_return_instr(&mut self, value: Option<ValueId>) -> ValueId {
        let void_ty = self.ctx.void_ty();
        self.insert(void_ty, InstructionKind::Return, value.into_iter().collect())
    }

    pub fn create_call_instr(&mut self, callee: ValueId, ret_ty: TypeId, args: Vec<ValueId>) -> ValueId {
        let mut operands = Vec::with_capacity(args.len() + 1);
        operands.push(callee);
        operands.extend(args);
        self.insert(ret_ty, InstructionKind::Call, operands)
    }

    /// A pointer to one struct field of `base`, for a subsequent load/store.
    pub fn create_field_access_instr(&mut self, base: ValueId, field_index: u32) -> ValueId {
        let ptr_ty = self.ctx.pointer_ty();
        self.insert(ptr_ty, InstructionKind::FieldAccess { field_index }, vec![base])
    }

    /// A pointer to one array element of `base`, for a subsequent load/store.
    pub fn create_array_index_instr(&mut self, base: ValueId, index: ValueId) -> ValueId {
        let ptr_ty = self.ctx.pointer_ty();
        self.insert(ptr_ty, InstructionKind::ArrayIndex, vec![base, index])
    }

    pub fn create_array_length_instr(&mut self, base: ValueId) -> ValueId {
        let i32_ty = self.ctx.int32_ty();
        self.insert(i32_ty, InstructionKind::ArrayLength, vec![base])
    }

    pub fn create_array_alloc_instr(&mut self, length: ValueId) -> ValueId {
        let ptr_ty = self.ctx.pointer_ty();
        self.insert(ptr_ty, InstructionKind::ArrayAlloc, vec![length])
    }

    pub fn create_struct_alloc_instr(&mut self, allocated: TypeId) -> ValueId {
        let ptr_ty = self.ctx.pointer_ty();
        self.insert(ptr_ty, InstructionKind::StructAlloc { allocated }, Vec::new())
    }

    pub fn create_cast_instr(&mut self, kind: CastKind, target_ty: TypeId, value: ValueId) -> ValueId {
        self.insert(target_ty, InstructionKind::Cast(kind), vec![value])
    }
}
