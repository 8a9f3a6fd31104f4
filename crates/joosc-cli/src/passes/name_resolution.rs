//! Wraps [`joosc_sema::NameResolver`] as a pass: declares every top-level
//! type, stamps each compilation unit's class/interface with its canonical
//! (fully-qualified) name, and resolves the reference-type nodes the AST
//! builder left pointing at a bare path.

use joosc_ast::AnyNode;
use joosc_pass::{DependencyContext, Pass, PassError, RunContext};
use joosc_sema::{NameResolver, SemaError};

use super::ast_builder::AstBuilderPass;

fn report(errors: Vec<SemaError>, ctx: &mut RunContext<'_>) {
    for error in errors {
        ctx.diag().push(error.to_diagnostic());
    }
}

/// Resolves top-level names (C5): type declarations, canonical names, and
/// the reference-type nodes produced by the AST builder.
#[derive(Default)]
pub struct NameResolutionPass {
    names: NameResolver,
}

impl NameResolutionPass {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn names(&self) -> &NameResolver { &self.names }
}

impl Pass for NameResolutionPass {
    fn name(&self) -> &'static str { "name-resolution" }

    fn description(&self) -> &'static str { "resolves top-level type names and reference types" }

    fn compute_dependencies(&self, ctx: &mut DependencyContext) {
        ctx.require::<AstBuilderPass>();
    }

    fn run(&mut self, ctx: &mut RunContext<'_>) -> Result<(), PassError> {
        let builder = ctx.get_pass::<AstBuilderPass>()?;
        let mut ast = builder.ast_mut();

        if let Err(errors) = self.names.collect_top_level_types(&ast) {
            report(errors, ctx);
        }

        for &root in builder.roots() {
            let Some(AnyNode::CompilationUnit(cu)) = ast.node(root).map(|n| n.data.clone()) else { continue };
            let Some(simple_name) = ast.simple_name(cu.body) else { continue };
            let canonical =
                if cu.package.is_empty() { simple_name.to_string() } else { format!("{}.{}", cu.package.join("."), simple_name) };
            if let Some(node) = ast.node_mut(cu.body) {
                match &mut node.data {
                    AnyNode::ClassDecl(decl) => decl.canonical_name = Some(canonical),
                    AnyNode::InterfaceDecl(decl) => decl.canonical_name = Some(canonical),
                    _ => {}
                }
            }
        }

        for &(ty_id, ref path, cu_id) in builder.reference_types() {
            let Some(AnyNode::CompilationUnit(cu)) = ast.node(cu_id).map(|n| n.data.clone()) else { continue };
            let Some(simple_name) = path.last() else { continue };
            let resolution = self.names.get_import(&ast, &cu, simple_name);
            if let Err(error) = NameResolver::bind_reference_type(&mut ast, ty_id, resolution, path) {
                ctx.diag().push(error.to_diagnostic());
            }
        }

        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any { self }
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any { self }
}

#[cfg(test)]
mod tests {
    use joosc_pass::PassManager;

    use super::*;

    #[test]
    fn resolves_worked_example_without_errors() {
        let mut manager = PassManager::new();
        let _ = manager.add_pass(AstBuilderPass::new(), false);
        let _ = manager.add_pass(NameResolutionPass::new(), true);
        manager.run().expect("dependency graph is acyclic");

        let diag = manager.diag();
        assert!(!diag.has_errors(), "unexpected diagnostics: {:?}", diag.diagnostics().collect::<Vec<_>>());

        let builder = manager.get_pass::<AstBuilderPass>().unwrap();
        let ast = builder.ast();
        for &class in builder.classes() {
            let Some(AnyNode::ClassDecl(cd)) = ast.node(class).map(|n| &n.data) else { continue };
            assert!(cd.canonical_name.is_some());
        }
        for &(ty, _, _) in builder.reference_types() {
            let Some(AnyNode::ReferenceTypeNode(t)) = ast.node(ty).map(|n| &n.data) else {
                panic!("expected a ReferenceTypeNode");
            };
            assert!(t.resolved.is_some(), "reference type left unresolved");
        }
    }
}
