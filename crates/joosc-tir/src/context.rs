//! `Context`: interns types and owns every value, function, and basic block
//! created during code generation.
//!
//! Constructors of concrete IR entities all go through this type and take
//! `&mut Context`, registering themselves in its tables rather than
//! allocating independently. Operand mutation maintains def/use edges:
//! [`Context::set_operand`] removes the user from its old operand's `users`
//! and inserts it into the new one; [`Context::replace_all_uses_with`]
//! applies that to every current user of a value, left-to-right, so the
//! replacement's resulting user order is insertion order.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::function::{BasicBlockData, BasicBlockId, CompilationUnit, Function, FunctionId};
use crate::types::{Type, TypeId};
use crate::value::{Constant, InstructionKind, ValueData, ValueId, ValueKind};

#[derive(Debug, Default)]
pub struct Context {
    types: Vec<Type>,
    type_cache: FxHashMap<Type, TypeId>,
    values: Vec<ValueData>,
    functions: Vec<Function>,
    blocks: Vec<BasicBlockData>,
}

impl Context {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    // -- types ------------------------------------------------------------

    pub fn intern_type(&mut self, ty: Type) -> TypeId {
        if let Some(&id) = self.type_cache.get(&ty) {
            return id;
        }
        let id = TypeId(u32::try_from(self.types.len()).expect("fewer than u32::MAX types"));
        self.types.push(ty.clone());
        self.type_cache.insert(ty, id);
        id
    }

    #[must_use]
    pub fn type_of(&self, ty: TypeId) -> &Type { &self.types[ty.0 as usize] }

    pub fn void_ty(&mut self) -> TypeId { self.intern_type(Type::Void) }
    pub fn int1_ty(&mut self) -> TypeId { self.intern_type(Type::Int { width: 1 }) }
    pub fn int8_ty(&mut self) -> TypeId { self.intern_type(Type::Int { width: 8 }) }
    pub fn int16_ty(&mut self) -> TypeId { self.intern_type(Type::Int { width: 16 }) }
    pub fn int32_ty(&mut self) -> TypeId { self.intern_type(Type::Int { width: 32 }) }
    pub fn pointer_ty(&mut self) -> TypeId { self.intern_type(Type::Pointer) }
    pub fn struct_ty(&mut self, fields: Vec<TypeId>) -> TypeId { self.intern_type(Type::Struct { fields }) }

    pub fn function_ty(&mut self, ret: TypeId, params: Vec<TypeId>) -> TypeId {
        self.intern_type(Type::Function { ret, params })
    }

    /// `{ i32 length, ptr data }`, the monomorphic lowering of every Java
    /// array type (§4.9).
    pub fn array_struct_ty(&mut self) -> TypeId {
        let i32_ty = self.int32_ty();
        let ptr_ty = self.pointer_ty();
        self.struct_ty(vec![i32_ty, ptr_ty])
    }

    // -- values -------------------------------------------------------------

    fn push_value(&mut self, ty: TypeId, kind: ValueKind, operands: Vec<ValueId>) -> ValueId {
        let id = ValueId(u32::try_from(self.values.len()).expect("fewer than u32::MAX values"));
        for &operand in &operands {
            self.values[operand.0 as usize].users.push(id);
        }
        self.values.push(ValueData { ty, kind, operands, users: Vec::new() });
        id
    }

    #[must_use]
    pub fn value(&self, id: ValueId) -> &ValueData { &self.values[id.0 as usize] }

    pub fn create_constant(&mut self, ty: TypeId, constant: Constant) -> ValueId {
        self.push_value(ty, ValueKind::Constant(constant), Vec::new())
    }

    pub fn create_argument(&mut self, ty: TypeId, index: u32, name: String) -> ValueId {
        self.push_value(ty, ValueKind::Argument { index, name }, Vec::new())
    }

    pub fn create_global(&mut self, pointee: TypeId, name: String) -> ValueId {
        let ty = self.pointer_ty();
        self.push_value(ty, ValueKind::GlobalVariable { name, pointee, initializer: None }, Vec::new())
    }

    /// Sets a global's initializer, registering the def/use edge.
    pub fn set_global_initializer(&mut self, global: ValueId, initializer: ValueId) {
        self.values[initializer.0 as usize].users.push(global);
        let ValueKind::GlobalVariable { initializer: slot, .. } = &mut self.values[global.0 as usize].kind
        else {
            panic!("set_global_initializer called on a non-global value")
        };
        *slot = Some(initializer);
    }

    /// Creates a function declaration: its identity `Value`, one `Argument`
    /// value per parameter, and an empty block list. Callers append blocks
    /// with [`Self::create_basic_block`] to turn it into a definition.
    pub fn create_function(&mut self, name: String, fn_ty: TypeId, param_types: Vec<TypeId>) -> FunctionId {
        let fid = FunctionId(u32::try_from(self.functions.len()).expect("fewer than u32::MAX functions"));
        let value = self.push_value(fn_ty, ValueKind::Function(fid), Vec::new());
        let params = param_types
            .into_iter()
            .enumerate()
            .map(|(i, ty)| {
                let index = u32::try_from(i).expect("fewer than u32::MAX parameters");
                self.create_argument(ty, index, format!("arg{i}"))
            })
            .collect();
        self.functions.push(Function { value, name, params, blocks: Vec::new() });
        fid
    }

    #[must_use]
    pub fn function(&self, id: FunctionId) -> &Function { &self.functions[id.0 as usize] }

    pub fn create_basic_block(&mut self, function: FunctionId, name: String) -> BasicBlockId {
        let void_ty = self.void_ty();
        let bid = BasicBlockId(u32::try_from(self.blocks.len()).expect("fewer than u32::MAX basic blocks"));
        let value = self.push_value(void_ty, ValueKind::BasicBlock(bid), Vec::new());
        self.blocks.push(BasicBlockData { value, function, name, instructions: Vec::new() });
        self.functions[function.0 as usize].blocks.push(bid);
        bid
    }

    #[must_use]
    pub fn basic_block(&self, id: BasicBlockId) -> &BasicBlockData { &self.blocks[id.0 as usize] }

    /// Appends a new instruction to `block` and returns its `Value` handle.
    /// This is the only way an [`InstructionKind`] enters the context, so
    /// every instruction value is, by construction, a member of exactly one
    /// block's instruction list.
    pub fn append_instruction(
        &mut self,
        block: BasicBlockId,
        ty: TypeId,
        kind: InstructionKind,
        operands: Vec<ValueId>,
    ) -> ValueId {
        let id = self.push_value(ty, ValueKind::Instruction(kind), operands);
        self.blocks[block.0 as usize].instructions.push(id);
        id
    }

    /// Replaces operand `index` of `user` with `new_operand`, updating both
    /// the old and new operand's `users` lists.
    pub fn set_operand(&mut self, user: ValueId, index: usize, new_operand: ValueId) {
        let old = self.values[user.0 as usize].operands[index];
        if let Some(pos) = self.values[old.0 as usize].users.iter().position(|&u| u == user) {
            self.values[old.0 as usize].users.remove(pos);
        }
        self.values[user.0 as usize].operands[index] = new_operand;
        self.values[new_operand.0 as usize].users.push(user);
    }

    /// Redirects every current user of `old` to `new`, one operand slot at a
    /// time. `new`'s resulting `users` order is the order `old`'s users were
    /// encountered in, left to right.
    pub fn replace_all_uses_with(&mut self, old: ValueId, new: ValueId) {
        let users = self.values[old.0 as usize].users.clone();
        let mut seen = FxHashSet::default();
        for user in users {
            if !seen.insert(user) {
                continue;
            }
            let positions: Vec<usize> = self.values[user.0 as usize]
                .operands
                .iter()
                .enumerate()
                .filter(|&(_, &op)| op == old)
                .map(|(i, _)| i)
                .collect();
            for index in positions {
                self.set_operand(user, index, new);
            }
        }
    }

    #[must_use]
    pub fn compilation_unit(&self) -> CompilationUnit {
        let index = |i: usize| u32::try_from(i).expect("fewer than u32::MAX entries");
        CompilationUnit {
            functions: (0..self.functions.len()).map(|i| FunctionId(index(i))).collect(),
            globals: self
                .values
                .iter()
                .enumerate()
                .filter(|(_, v)| matches!(v.kind, ValueKind::GlobalVariable { .. }))
                .map(|(i, _)| ValueId(index(i)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod proptests {
    use crate::builder::IRBuilder;
    use crate::value::BinOp;

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TypeSpec {
        Void,
        Pointer,
        Int(u8),
    }

    fn type_spec() -> impl proptest::strategy::Strategy<Value = TypeSpec> {
        use proptest::prelude::*;
        prop_oneof![
            Just(TypeSpec::Void),
            Just(TypeSpec::Pointer),
            prop_oneof![Just(1u8), Just(8), Just(16), Just(32)].prop_map(TypeSpec::Int),
        ]
    }

    fn to_type(spec: TypeSpec) -> Type {
        match spec {
            TypeSpec::Void => Type::Void,
            TypeSpec::Pointer => Type::Pointer,
            TypeSpec::Int(width) => Type::Int { width },
        }
    }

    proptest::proptest! {
        /// Interning the same type twice always returns the same id, and
        /// interning two specs returns the same id exactly when the specs
        /// describe the same `Type` — `TypeId` equality stands in for the
        /// type table's pointer equality.
        #[test]
        fn interning_is_equal_iff_the_types_are_equal(a in type_spec(), b in type_spec()) {
            let mut ctx = Context::new();
            let id_a1 = ctx.intern_type(to_type(a));
            let id_a2 = ctx.intern_type(to_type(a));
            proptest::prop_assert_eq!(id_a1, id_a2);

            let id_b = ctx.intern_type(to_type(b));
            proptest::prop_assert_eq!(id_a1 == id_b, a == b);
        }
    }

    proptest::proptest! {
        /// After `replace_all_uses_with(old, new)`, no surviving user
        /// references `old` in any operand slot and `old` itself has no
        /// users left, regardless of how many slots referenced it or in
        /// what mix with other operands.
        #[test]
        fn replace_all_uses_with_leaves_no_trace_of_old(
            slots in proptest::collection::vec((proptest::bool::ANY, proptest::bool::ANY), 0..6),
        ) {
            let mut ctx = Context::new();
            let i32_ty = ctx.int32_ty();
            let old = ctx.create_constant(i32_ty, Constant::Int(1));
            let new = ctx.create_constant(i32_ty, Constant::Int(2));
            let other = ctx.create_constant(i32_ty, Constant::Int(3));
            let fn_ty = ctx.function_ty(i32_ty, Vec::new());
            let f = ctx.create_function("main".to_string(), fn_ty, Vec::new());
            let entry = ctx.create_basic_block(f, "entry".to_string());
            let mut builder = IRBuilder::new(&mut ctx);
            builder.position_at_end(entry);

            let users: Vec<ValueId> = slots
                .iter()
                .map(|&(lhs_old, rhs_old)| {
                    let lhs = if lhs_old { old } else { other };
                    let rhs = if rhs_old { old } else { other };
                    builder.create_binop_instr(BinOp::Add, i32_ty, lhs, rhs)
                })
                .collect();

            ctx.replace_all_uses_with(old, new);

            proptest::prop_assert!(ctx.value(old).users.is_empty());
            for &user in &users {
                proptest::prop_assert!(!ctx.value(user).operands.contains(&old));
            }
        }
    }
}
