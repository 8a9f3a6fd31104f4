//! Statement lowering (§4.9, part 3): each statement either emits
//! instructions directly into the current block or reshapes control flow
//! into fresh blocks, reusing the same [`Evaluator`] throughout one body.

use joosc_ast::{AnyNode, Ast, ForStmt, IfStmt, NodeID, WhileStmt};
use joosc_tir::{IRBuilder, ValueId};

use crate::declare::Declarations;
use crate::error::CodegenError;
use crate::expressions::Evaluator;
use crate::symbol_table::SymbolTable;

/// Lowers one statement node, recursing into nested statements (`BlockStmt`,
/// `IfStmt`'s branches, loop bodies) as needed.
pub fn lower_stmt(
    ast: &Ast,
    decls: &Declarations,
    locals: &SymbolTable,
    builder: &mut IRBuilder<'_>,
    this_value: Option<ValueId>,
    stmt: NodeID,
) -> Result<(), CodegenError> {
    let node = &ast.node(stmt).ok_or(CodegenError::UnlowerableType)?.data;
    match node {
        AnyNode::BlockStmt(n) => {
            for &s in &n.statements {
                lower_stmt(ast, decls, locals, builder, this_value, s)?;
            }
            Ok(())
        }
        AnyNode::DeclStmt(n) => lower_decl(ast, decls, locals, builder, this_value, n.var),
        AnyNode::ExprStmt(n) => {
            let mut eval = Evaluator::new(ast, decls, locals, builder, this_value);
            eval.eval_value(n.expr)?;
            Ok(())
        }
        AnyNode::IfStmt(n) => lower_if(ast, decls, locals, builder, this_value, n),
        AnyNode::WhileStmt(n) => lower_while(ast, decls, locals, builder, this_value, n),
        AnyNode::ForStmt(n) => lower_for(ast, decls, locals, builder, this_value, n),
        AnyNode::ReturnStmt(n) => {
            let value = match n.value {
                Some(expr) => {
                    let mut eval = Evaluator::new(ast, decls, locals, builder, this_value);
                    Some(eval.eval_value(expr)?)
                }
                None => None,
            };
            builder.create_return_instr(value);
            Ok(())
        }
        AnyNode::NullStmt(_) => Ok(()),
        _ => Err(CodegenError::UnlowerableType),
    }
}

/// A local's alloca was already created at function entry (§4.9); here we
/// only store its initializer, if it has one.
fn lower_decl(
    ast: &Ast,
    decls: &Declarations,
    locals: &SymbolTable,
    builder: &mut IRBuilder<'_>,
    this_value: Option<ValueId>,
    var: NodeID,
) -> Result<(), CodegenError> {
    let AnyNode::VarDecl(v) = &ast.node(var).ok_or(CodegenError::UnlowerableType)?.data else {
        return Err(CodegenError::UnlowerableType);
    };
    let Some(init) = v.initializer else { return Ok(()) };
    let ptr = locals.lookup(var).ok_or_else(|| CodegenError::UndeclaredValue { name: v.name.clone() })?;
    let mut eval = Evaluator::new(ast, decls, locals, builder, this_value);
    let value = eval.eval_value(init)?;
    builder.create_store_instr(value, ptr);
    Ok(())
}

fn lower_if(
    ast: &Ast,
    decls: &Declarations,
    locals: &SymbolTable,
    builder: &mut IRBuilder<'_>,
    this_value: Option<ValueId>,
    n: &IfStmt,
) -> Result<(), CodegenError> {
    let mut eval = Evaluator::new(ast, decls, locals, builder, this_value);
    let cond = eval.eval_value(n.condition)?;

    let then_bb = builder.create_basic_block("if.then");
    let else_bb = n.else_branch.map(|_| builder.create_basic_block("if.else"));
    let merge_bb = builder.create_basic_block("if.end");
    builder.create_cond_branch_instr(cond, then_bb, else_bb.unwrap_or(merge_bb));

    builder.position_at_end(then_bb);
    lower_stmt(ast, decls, locals, builder, this_value, n.then_branch)?;
    builder.create_branch_instr(merge_bb);

    if let (Some(else_branch), Some(else_bb)) = (n.else_branch, else_bb) {
        builder.position_at_end(else_bb);
        lower_stmt(ast, decls, locals, builder, this_value, else_branch)?;
        builder.create_branch_instr(merge_bb);
    }

    builder.position_at_end(merge_bb);
    Ok(())
}

fn lower_while(
    ast: &Ast,
    decls: &Declarations,
    locals: &SymbolTable,
    builder: &mut IRBuilder<'_>,
    this_value: Option<ValueId>,
    n: &WhileStmt,
) -> Result<(), CodegenError> {
    let cond_bb = builder.create_basic_block("while.cond");
    let body_bb = builder.create_basic_block("while.body");
    let end_bb = builder.create_basic_block("while.end");

    builder.create_branch_instr(cond_bb);

    builder.position_at_end(cond_bb);
    let mut eval = Evaluator::new(ast, decls, locals, builder, this_value);
    let cond = eval.eval_value(n.condition)?;
    builder.create_cond_branch_instr(cond, body_bb, end_bb);

    builder.position_at_end(body_bb);
    lower_stmt(ast, decls, locals, builder, this_value, n.body)?;
    builder.create_branch_instr(cond_bb);

    builder.position_at_end(end_bb);
    Ok(())
}

fn lower_for(
    ast: &Ast,
    decls: &Declarations,
    locals: &SymbolTable,
    builder: &mut IRBuilder<'_>,
    this_value: Option<ValueId>,
    n: &ForStmt,
) -> Result<(), CodegenError> {
    if let Some(init) = n.init {
        lower_stmt(ast, decls, locals, builder, this_value, init)?;
    }

    let cond_bb = builder.create_basic_block("for.cond");
    let body_bb = builder.create_basic_block("for.body");
    let end_bb = builder.create_basic_block("for.end");

    builder.create_branch_instr(cond_bb);

    builder.position_at_end(cond_bb);
    match n.condition {
        Some(condition) => {
            let mut eval = Evaluator::new(ast, decls, locals, builder, this_value);
            let cond = eval.eval_value(condition)?;
            builder.create_cond_branch_instr(cond, body_bb, end_bb);
        }
        // No condition means "always true" (§4.9's `for (;;)` case).
        None => {
            builder.create_branch_instr(body_bb);
        }
    }

    builder.position_at_end(body_bb);
    lower_stmt(ast, decls, locals, builder, this_value, n.body)?;
    if let Some(update) = n.update {
        lower_stmt(ast, decls, locals, builder, this_value, update)?;
    }
    builder.create_branch_instr(cond_bb);

    builder.position_at_end(end_bb);
    Ok(())
}
