//! A hand-rolled, SSA-ish intermediate representation (C8): no borrowed
//! LLVM wrapper underneath, just a type table and a value table owned by
//! one [`Context`] per compilation run.
//!
//! [`Context`] interns [`Type`]s and owns every [`ValueId`], [`FunctionId`],
//! and [`BasicBlockId`] the code generator creates; [`IRBuilder`] tracks an
//! insert point and exposes one `create_*` method per instruction kind.

pub mod builder;
pub mod context;
pub mod function;
pub mod types;
pub mod value;

pub use builder::IRBuilder;
pub use context::Context;
pub use function::{BasicBlockData, BasicBlockId, CompilationUnit, Function, FunctionId};
pub use types::{Type, TypeId};
pub use value::{BinOp, CastKind, Constant, ICmp, InstructionKind, ValueData, ValueId, ValueKind};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_returns_the_same_id_for_equal_types() {
        let mut ctx = Context::new();
        let a = ctx.int32_ty();
        let b = ctx.int32_ty();
        assert_eq!(a, b);
        let array_a = ctx.array_struct_ty();
        let array_b = ctx.array_struct_ty();
        assert_eq!(array_a, array_b);
    }

    #[test]
    fn set_operand_moves_the_user_between_use_lists() {
        let mut ctx = Context::new();
        let i32_ty = ctx.int32_ty();
        let a = ctx.create_constant(i32_ty, Constant::Int(1));
        let b = ctx.create_constant(i32_ty, Constant::Int(2));
        let fn_ty = ctx.function_ty(i32_ty, Vec::new());
        let f = ctx.create_function("main".into(), fn_ty, Vec::new());
        let entry = ctx.create_basic_block(f, "entry".into());
        let mut builder = IRBuilder::new(&mut ctx);
        builder.position_at_end(entry);
        let sum = builder.create_binop_instr(BinOp::Add, i32_ty, a, a);

        assert_eq!(ctx.value(a).users, vec![sum, sum]);
        assert!(ctx.value(b).users.is_empty());

        ctx.set_operand(sum, 1, b);
        assert_eq!(ctx.value(a).users, vec![sum]);
        assert_eq!(ctx.value(b).users, vec![sum]);
    }

    #[test]
    fn replace_all_uses_with_rewrites_every_user_in_order() {
        let mut ctx = Context::new();
        let i32_ty = ctx.int32_ty();
        let old = ctx.create_constant(i32_ty, Constant::Int(1));
        let new = ctx.create_constant(i32_ty, Constant::Int(2));
        let other = ctx.create_constant(i32_ty, Constant::Int(3));
        let fn_ty = ctx.function_ty(i32_ty, Vec::new());
        let f = ctx.create_function("main".into(), fn_ty, Vec::new());
        let entry = ctx.create_basic_block(f, "entry".into());
        let mut builder = IRBuilder::new(&mut ctx);
        builder.position_at_end(entry);
        let first = builder.create_binop_instr(BinOp::Add, i32_ty, old, other);
        let second = builder.create_binop_instr(BinOp::Sub, i32_ty, old, old);

        ctx.replace_all_uses_with(old, new);

        assert!(ctx.value(old).users.is_empty());
        assert_eq!(ctx.value(new).users, vec![first, second, second]);
        assert_eq!(ctx.value(first).operands, vec![new, other]);
        assert_eq!(ctx.value(second).operands, vec![new, new]);
    }

    #[test]
    fn builder_appends_instructions_to_the_positioned_block() {
        let mut ctx = Context::new();
        let i32_ty = ctx.int32_ty();
        let void_ty = ctx.void_ty();
        let fn_ty = ctx.function_ty(void_ty, Vec::new());
        let f = ctx.create_function("main".into(), fn_ty, Vec::new());
        let entry = ctx.create_basic_block(f, "entry".into());
        let mut builder = IRBuilder::new(&mut ctx);
        builder.position_at_end(entry);
        let local = builder.create_alloca_instr(i32_ty);
        let value = builder.create_int_constant(7);
        builder.create_store_instr(value, local);
        builder.create_return_instr(None);

        assert_eq!(ctx.basic_block(entry).instructions.len(), 3);
    }
}
