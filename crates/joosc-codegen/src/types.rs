//! Type lowering (§4.9): AST types to TIR types, and per-class struct
//! layouts for non-static fields.
//!
//! Lowering of a class's fields always walks the superclass chain first:
//! instance field offsets must agree with an overriding method inherited
//! from a superclass, so a subclass's struct is the superclass's struct with
//! its own fields appended, never a fresh, unrelated layout.

use joosc_ast::{AnyNode, Ast, BuiltIn, Modifiers, NodeID};
use joosc_sema::NameResolver;
use joosc_tir::{Context, TypeId};
use rustc_hash::FxHashMap;

use crate::error::CodegenError;

/// A class's non-static field layout: which fields it has, in declaration
/// order (superclass fields first), and the interned struct type once it has
/// at least one field.
#[derive(Debug, Default, Clone)]
pub struct ClassLayout {
    /// Every non-static field reachable on an instance, ancestor-first.
    pub fields: Vec<NodeID>,
    /// `None` for a class with no instance fields at all (§4.9: "only if
    /// non-empty").
    pub struct_ty: Option<TypeId>,
}

/// Lowers AST types to TIR types and assembles class struct layouts. One
/// instance is shared across the whole declaration phase so every class's
/// layout is computed at most once.
///
/// A field's position within its declaring class's struct never changes in
/// a subclass's layout (subclasses only append fields, per single
/// inheritance), so one flat index table, not one per class, is enough to
/// answer `FieldAccess`'s index for any reachable field.
#[derive(Debug, Default)]
pub struct TypeLowering {
    layouts: FxHashMap<NodeID, ClassLayout>,
    field_index: FxHashMap<NodeID, u32>,
}

impl TypeLowering {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// An already-computed layout, for callers downstream of the
    /// declaration phase that never need to trigger lowering themselves.
    #[must_use]
    pub fn get_layout(&self, class: NodeID) -> Option<&ClassLayout> { self.layouts.get(&class) }

    /// A field's ordinal position within whichever struct declares it,
    /// valid for `FieldAccess` regardless of which subclass's layout it was
    /// reached through.
    #[must_use]
    pub fn field_index(&self, field: NodeID) -> Option<u32> { self.field_index.get(&field).copied() }

    /// Lowers a `BuiltInTypeNode`/`ArrayTypeNode`/`ReferenceTypeNode` to its
    /// TIR type, per §4.9's table. `Void` only ever appears as a return type,
    /// handled by the caller before reaching here.
    pub fn lower_type(&self, ast: &Ast, ctx: &mut Context, ty: NodeID) -> Result<TypeId, CodegenError> {
        match &ast.node(ty).ok_or(CodegenError::UnlowerableType)?.data {
            AnyNode::BuiltInTypeNode(n) => Ok(match n.kind {
                BuiltIn::Void => ctx.void_ty(),
                BuiltIn::Boolean => ctx.int1_ty(),
                BuiltIn::Byte => ctx.int8_ty(),
                BuiltIn::Char | BuiltIn::Short => ctx.int16_ty(),
                BuiltIn::Int => ctx.int32_ty(),
                BuiltIn::String | BuiltIn::None => ctx.pointer_ty(),
            }),
            AnyNode::ArrayTypeNode(_) => Ok(ctx.array_struct_ty()),
            AnyNode::ReferenceTypeNode(_) => Ok(ctx.pointer_ty()),
            _ => Err(CodegenError::UnlowerableType),
        }
    }

    /// The class/interface a type ultimately names, for struct-layout
    /// lookups. `None` for primitives, arrays, and unresolved references.
    #[must_use]
    pub fn referenced_class(ast: &Ast, ty: NodeID) -> Option<NodeID> { NameResolver::get_type_as_class(ast, ty) }

    /// Computes (and caches) `class`'s field layout, recursing into its
    /// superclass first. Interfaces have no fields and are never passed here.
    pub fn layout_of(&mut self, ast: &Ast, ctx: &mut Context, class: NodeID) -> Result<ClassLayout, CodegenError> {
        if let Some(layout) = self.layouts.get(&class) {
            return Ok(layout.clone());
        }
        let AnyNode::ClassDecl(cd) = &ast.node(class).ok_or(CodegenError::UnlowerableType)?.data else {
            return Err(CodegenError::UnlowerableType);
        };
        let superclass = cd.superclass;
        let own_fields: Vec<NodeID> = cd
            .fields
            .iter()
            .copied()
            .filter(|&f| match &ast.node(f).map(|n| &n.data) {
                Some(AnyNode::FieldDecl(fd)) => !fd.modifiers.contains(Modifiers::STATIC),
                _ => false,
            })
            .collect();

        let mut fields = match superclass {
            Some(parent) => self.layout_of(ast, ctx, parent)?.fields,
            None => Vec::new(),
        };
        fields.extend(own_fields.iter().copied());

        let mut field_types = Vec::with_capacity(fields.len());
        for (i, &field) in fields.iter().enumerate() {
            let index = u32::try_from(i).expect("fewer than u32::MAX fields");
            self.field_index.insert(field, index);
            let AnyNode::FieldDecl(fd) = &ast.node(field).ok_or(CodegenError::UnlowerableType)?.data else {
                return Err(CodegenError::UnlowerableType);
            };
            field_types.push(self.lower_type(ast, ctx, fd.ty)?);
        }
        let struct_ty = if field_types.is_empty() { None } else { Some(ctx.struct_ty(field_types)) };

        let layout = ClassLayout { fields, struct_ty };
        self.layouts.insert(class, layout.clone());
        Ok(layout)
    }
}
