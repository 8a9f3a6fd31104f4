//! Top-level orchestration (§4.9): declares every static field, field
//! layout, method, and constructor reachable from a run's compilation
//! units, then defines every eligible method/constructor's body, producing
//! one linked compilation unit.

use joosc_ast::{AnyNode, Ast, NodeID};
use joosc_tir::{CompilationUnit, Context};

use crate::declare::Declarations;
use crate::error::CodegenError;
use crate::functions::define_function;

/// Runs the whole code generation pipeline over `roots`, returning the
/// populated [`Context`] alongside the linked output it now holds.
pub fn generate(ast: &Ast, roots: &[NodeID]) -> Result<(Context, CompilationUnit), CodegenError> {
    let mut ctx = Context::new();
    let mut decls = Declarations::new();
    decls.declare_all(ast, &mut ctx, roots)?;
    log::debug!("declared {} function(s) and {} global(s)", decls.functions.len(), decls.globals.len());

    for &root in roots {
        let Some(AnyNode::CompilationUnit(cu)) = ast.node(root).map(|n| &n.data) else { continue };
        let Some(AnyNode::ClassDecl(class)) = ast.node(cu.body).map(|n| &n.data) else { continue };
        for &method in class.methods.iter().chain(&class.constructors) {
            define_function(ast, &mut ctx, &decls, method)?;
        }
        log::debug!("defined bodies for class `{}`", class.name);
    }

    let unit = ctx.compilation_unit();
    log::debug!("code generation produced {} function(s)", unit.functions.len());
    Ok((ctx, unit))
}
