//! Wraps [`joosc_sema::ExpressionResolver`] as a pass (C6): resolves every
//! name appearing inside a method body against locals, fields, and the
//! top-level names [`super::name_resolution::NameResolutionPass`] already
//! declared.

use joosc_ast::AnyNode;
use joosc_pass::{DependencyContext, Pass, PassError, RunContext};
use joosc_sema::ExpressionResolver;

use super::ast_builder::AstBuilderPass;
use super::name_resolution::NameResolutionPass;

/// Resolves expression-level names in every class body.
#[derive(Default)]
pub struct ExpressionResolutionPass;

impl ExpressionResolutionPass {
    #[must_use]
    pub fn new() -> Self { Self::default() }
}

impl Pass for ExpressionResolutionPass {
    fn name(&self) -> &'static str { "expression-resolution" }

    fn description(&self) -> &'static str { "resolves local, field, and method names inside method bodies" }

    fn compute_dependencies(&self, ctx: &mut DependencyContext) {
        ctx.require::<AstBuilderPass>();
        ctx.require::<NameResolutionPass>();
    }

    fn run(&mut self, ctx: &mut RunContext<'_>) -> Result<(), PassError> {
        let builder = ctx.get_pass::<AstBuilderPass>()?;
        let names = ctx.get_pass::<NameResolutionPass>()?.names();
        let resolver = ExpressionResolver::new(names);
        let mut ast = builder.ast_mut();

        for &root in builder.roots() {
            let Some(AnyNode::CompilationUnit(cu)) = ast.node(root).map(|n| n.data.clone()) else { continue };
            if let Err(errors) = resolver.resolve_class(&mut ast, &cu, cu.body) {
                for error in errors {
                    ctx.diag().push(error.to_diagnostic());
                }
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
    fn resolves_every_name_chain_without_errors() {
        let mut manager = PassManager::new();
        let _ = manager.add_pass(AstBuilderPass::new(), false);
        let _ = manager.add_pass(NameResolutionPass::new(), false);
        let _ = manager.add_pass(ExpressionResolutionPass::new(), true);
        manager.run().expect("dependency graph is acyclic");

        let diag = manager.diag();
        assert!(!diag.has_errors(), "unexpected diagnostics: {:?}", diag.diagnostics().collect::<Vec<_>>());
    }
}
