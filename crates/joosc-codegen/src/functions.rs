//! Function definition (§4.9, part 4): turns a declared `Function` with a
//! body into one with basic blocks, by allocating every local and parameter
//! up front and then lowering the body statement by statement.
//!
//! Only static methods and constructors ever reach [`define_function`];
//! plain instance methods stop at [`crate::declare::Declarations::declare_all`]'s
//! forward declaration (see that module's doc for why).

use joosc_ast::{AnyNode, Ast, Modifiers, NodeID};
use joosc_tir::{Context, IRBuilder};

use crate::declare::Declarations;
use crate::error::CodegenError;
use crate::statements::lower_stmt;
use crate::symbol_table::SymbolTable;

/// Defines `method`'s body, if it has one and is eligible (static method or
/// constructor). A no-op for everything else, including abstract/native
/// methods and ordinary instance methods.
pub fn define_function(ast: &Ast, ctx: &mut Context, decls: &Declarations, method: NodeID) -> Result<(), CodegenError> {
    let AnyNode::MethodDecl(m) = &ast.node(method).ok_or(CodegenError::UnlowerableType)?.data else {
        return Err(CodegenError::UnlowerableType);
    };
    let is_static = m.modifiers.contains(Modifiers::STATIC);
    let is_constructor = m.is_constructor;
    if !is_static && !is_constructor {
        return Ok(());
    }
    let Some(body) = m.body else { return Ok(()) };
    let params = m.params.clone();
    let name = m.name.clone();
    log::debug!("lowering body of `{name}`");

    let fid = decls.function(method).ok_or_else(|| CodegenError::UndeclaredValue { name: name.clone() })?;
    let entry = ctx.create_basic_block(fid, "entry".to_string());
    let mut builder = IRBuilder::new(ctx);
    builder.position_at_end(entry);

    let mut locals = SymbolTable::new();
    let fn_params = builder.context_mut().function(fid).params.clone();

    let this_value = if is_static {
        None
    } else {
        Some(*fn_params.first().ok_or(CodegenError::UnlowerableType)?)
    };
    let offset = usize::from(!is_static);

    for (i, &param) in params.iter().enumerate() {
        let AnyNode::VarDecl(v) = &ast.node(param).ok_or(CodegenError::UnlowerableType)?.data else {
            return Err(CodegenError::UnlowerableType);
        };
        let arg = *fn_params.get(offset + i).ok_or(CodegenError::UnlowerableType)?;
        let ty = decls.lower_type(ast, builder.context_mut(), v.ty)?;
        let ptr = builder.create_alloca_instr(ty);
        builder.create_store_instr(arg, ptr);
        locals.bind(param, ptr);
    }

    for node in ast.collect_pre_order(body) {
        let Some(AnyNode::VarDecl(v)) = ast.node(node).map(|n| &n.data) else { continue };
        let ty = decls.lower_type(ast, builder.context_mut(), v.ty)?;
        let ptr = builder.create_alloca_instr(ty);
        locals.bind(node, ptr);
    }

    lower_stmt(ast, decls, &locals, &mut builder, this_value, body)?;

    // A method's last reachable statement usually already returns; this
    // only guards the common `}` -> implicit `return;` case for a void
    // method/constructor, not full path-reachability analysis.
    if !body_already_returns(ast, body) {
        builder.create_return_instr(None);
    }
    log::debug!("finished lowering `{name}`");
    Ok(())
}

fn body_already_returns(ast: &Ast, body: NodeID) -> bool {
    let last = match ast.node(body).map(|n| &n.data) {
        Some(AnyNode::BlockStmt(b)) => b.statements.last().copied(),
        _ => Some(body),
    };
    matches!(last.and_then(|id| ast.node(id)).map(|n| &n.data), Some(AnyNode::ReturnStmt(_)))
}
