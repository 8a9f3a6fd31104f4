//! Declaration phase (§4.9, part 1): before any method body is lowered,
//! every static field becomes a global, every class's non-static fields
//! become a struct layout, and every method and constructor — static or
//! not — gets a forward-declared `Function`.
//!
//! Instance methods are declared so a call through one resolves to *a*
//! function value at all, but only static methods and constructors are
//! later given a body (§9: this core has no vtable or dynamic dispatch
//! instruction, so overridable instance methods cannot be devirtualized
//! soundly; constructors, never overridden, are treated like a static
//! method taking an implicit receiver).

use joosc_ast::{AnyNode, Ast, Modifiers, NodeID};
use joosc_tir::{Context, FunctionId, ValueId};
use rustc_hash::FxHashMap;

use crate::error::CodegenError;
use crate::mangle::Mangler;
use crate::types::{ClassLayout, TypeLowering};

/// Accumulates every declared global and function across a whole
/// compilation, and the class layouts the definition phase needs to access
/// fields by index.
#[derive(Debug, Default)]
pub struct Declarations {
    pub layouts: TypeLowering,
    pub functions: FxHashMap<NodeID, FunctionId>,
    pub globals: FxHashMap<NodeID, ValueId>,
    mangler: Mangler,
}

impl Declarations {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn class_layout(&self, class: NodeID) -> Option<&ClassLayout> { self.layouts.get_layout(class) }

    #[must_use]
    pub fn function(&self, method: NodeID) -> Option<FunctionId> { self.functions.get(&method).copied() }

    #[must_use]
    pub fn global(&self, field: NodeID) -> Option<ValueId> { self.globals.get(&field).copied() }

    #[must_use]
    pub fn field_index(&self, field: NodeID) -> Option<u32> { self.layouts.field_index(field) }

    #[must_use]
    pub fn lower_type(&self, ast: &Ast, ctx: &mut Context, ty: NodeID) -> Result<joosc_tir::TypeId, CodegenError> {
        self.layouts.lower_type(ast, ctx, ty)
    }

    /// Declares every static field, instance-field layout, method, and
    /// constructor reachable from `roots`' compilation units. Interfaces
    /// contribute nothing here: they declare no fields and no bodies.
    pub fn declare_all(&mut self, ast: &Ast, ctx: &mut Context, roots: &[NodeID]) -> Result<(), CodegenError> {
        for &root in roots {
            let Some(AnyNode::CompilationUnit(cu)) = ast.node(root).map(|n| &n.data) else { continue };
            let Some(AnyNode::ClassDecl(class)) = ast.node(cu.body).map(|n| &n.data) else { continue };
            self.declare_class(ast, ctx, cu.body, &class.fields, &class.methods, &class.constructors)?;
        }
        Ok(())
    }

    fn declare_class(
        &mut self,
        ast: &Ast,
        ctx: &mut Context,
        class: NodeID,
        fields: &[NodeID],
        methods: &[NodeID],
        constructors: &[NodeID],
    ) -> Result<(), CodegenError> {
        self.layouts.layout_of(ast, ctx, class)?;

        for &field in fields {
            let AnyNode::FieldDecl(fd) = &ast.node(field).ok_or(CodegenError::UnlowerableType)?.data else {
                continue;
            };
            if !fd.modifiers.contains(Modifiers::STATIC) {
                continue;
            }
            let pointee = self.layouts.lower_type(ast, ctx, fd.ty)?;
            let name = self.mangler.mangle_field(ast, class, field)?;
            let global = ctx.create_global(pointee, name);
            self.globals.insert(field, global);
        }

        for &method in methods.iter().chain(constructors) {
            self.declare_function(ast, ctx, class, method)?;
        }
        Ok(())
    }

    fn declare_function(
        &mut self,
        ast: &Ast,
        ctx: &mut Context,
        class: NodeID,
        method: NodeID,
    ) -> Result<(), CodegenError> {
        let AnyNode::MethodDecl(m) = &ast.node(method).ok_or(CodegenError::UnlowerableType)?.data else {
            return Err(CodegenError::UnlowerableType);
        };
        let is_static = m.modifiers.contains(Modifiers::STATIC);
        let is_constructor = m.is_constructor;
        let params = m.params.clone();
        let return_type = m.return_type;

        let mut param_types = Vec::with_capacity(params.len() + 1);
        if !is_static {
            param_types.push(ctx.pointer_ty());
        }
        for &param in &params {
            let AnyNode::VarDecl(v) = &ast.node(param).ok_or(CodegenError::UnlowerableType)?.data else {
                return Err(CodegenError::UnlowerableType);
            };
            param_types.push(self.layouts.lower_type(ast, ctx, v.ty)?);
        }

        let ret_ty = if is_constructor {
            ctx.void_ty()
        } else {
            match return_type {
                Some(rt) => self.layouts.lower_type(ast, ctx, rt)?,
                None => ctx.void_ty(),
            }
        };

        let name = self.mangler.mangle_function(ast, class, method)?;
        let fn_ty = ctx.function_ty(ret_ty, param_types.clone());
        let fid = ctx.create_function(name, fn_ty, param_types);
        self.functions.insert(method, fid);
        Ok(())
    }
}
