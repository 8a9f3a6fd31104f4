//! A plain-text AST dump pass, enabled by `--print-ast`. Not a pretty
//! printer that could round-trip back to source, just a readable rendering
//! of the resolved tree for inspecting what the earlier passes produced.

use std::fmt::Write as _;

use joosc_ast::{AnyNode, Ast, NodeID};
use joosc_pass::{DependencyContext, Pass, PassError, RunContext};

use super::ast_builder::AstBuilderPass;
use super::hierarchy_check::HierarchyCheckPass;

#[derive(Default)]
pub struct AstPrinterPass;

impl AstPrinterPass {
    #[must_use]
    pub fn new() -> Self { Self::default() }
}

fn print_type(ast: &Ast, ty: NodeID) -> String {
    match ast.node(ty).map(|n| &n.data) {
        Some(AnyNode::BuiltInTypeNode(t)) => format!("{:?}", t.kind),
        Some(AnyNode::ArrayTypeNode(t)) => format!("{}[]", print_type(ast, t.element)),
        Some(AnyNode::ReferenceTypeNode(t)) => {
            if t.resolved.is_some() { t.path.join(".") } else { format!("{}?", t.path.join(".")) }
        }
        _ => "<unknown>".to_string(),
    }
}

fn print_method(ast: &Ast, out: &mut String, method: NodeID) {
    let Some(AnyNode::MethodDecl(m)) = ast.node(method).map(|n| &n.data) else { return };
    let ret = m.return_type.map_or_else(|| "void".to_string(), |ty| print_type(ast, ty));
    let params: Vec<String> = m
        .params
        .iter()
        .filter_map(|&p| match ast.node(p).map(|n| &n.data) {
            Some(AnyNode::VarDecl(v)) => Some(format!("{} {}", print_type(ast, v.ty), v.name)),
            _ => None,
        })
        .collect();
    let kind = if m.is_constructor { "<init>" } else { &m.name };
    let _ = writeln!(out, "    {} {}({})", ret, kind, params.join(", "));
}

fn print_class(ast: &Ast, out: &mut String, class: NodeID) {
    match ast.node(class).map(|n| &n.data) {
        Some(AnyNode::ClassDecl(cd)) => {
            let _ = writeln!(out, "class {} ({})", cd.name, cd.canonical_name.as_deref().unwrap_or("?"));
            for &field in &cd.fields {
                if let Some(AnyNode::FieldDecl(f)) = ast.node(field).map(|n| &n.data) {
                    let _ = writeln!(out, "    {} {};", print_type(ast, f.ty), f.name);
                }
            }
            for &ctor in &cd.constructors {
                print_method(ast, out, ctor);
            }
            for &method in &cd.methods {
                print_method(ast, out, method);
            }
        }
        Some(AnyNode::InterfaceDecl(id)) => {
            let _ = writeln!(out, "interface {} ({})", id.name, id.canonical_name.as_deref().unwrap_or("?"));
            for &method in &id.methods {
                print_method(ast, out, method);
            }
        }
        _ => {}
    }
}

impl Pass for AstPrinterPass {
    fn name(&self) -> &'static str { "ast-printer" }

    fn description(&self) -> &'static str { "prints a plain-text dump of the resolved AST" }

    fn compute_dependencies(&self, ctx: &mut DependencyContext) {
        ctx.require::<AstBuilderPass>();
        ctx.require::<HierarchyCheckPass>();
    }

    fn run(&mut self, ctx: &mut RunContext<'_>) -> Result<(), PassError> {
        let builder = ctx.get_pass::<AstBuilderPass>()?;
        let ast = builder.ast();
        let mut out = String::new();
        for &root in builder.roots() {
            if let Some(AnyNode::CompilationUnit(cu)) = ast.node(root).map(|n| &n.data) {
                if !cu.package.is_empty() {
                    let _ = writeln!(out, "package {};", cu.package.join("."));
                }
                print_class(&ast, &mut out, cu.body);
            }
        }
        print!("{out}");
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any { self }
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any { self }
}

#[cfg(test)]
mod tests {
    use joosc_pass::PassManager;

    use super::*;
    use crate::passes::name_resolution::NameResolutionPass;

    #[test]
    fn runs_over_the_resolved_worked_example() {
        let mut manager = PassManager::new();
        let _ = manager.add_pass(AstBuilderPass::new(), false);
        let _ = manager.add_pass(NameResolutionPass::new(), false);
        let _ = manager.add_pass(HierarchyCheckPass::new(), false);
        let _ = manager.add_pass(AstPrinterPass::new(), true);
        manager.run().expect("dependency graph is acyclic");
        assert!(!manager.diag().has_errors());
    }
}
