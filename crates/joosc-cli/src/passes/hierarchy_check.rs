//! Wraps [`joosc_sema::HierarchyChecker`] as a pass (C7): checks inheritance
//! cycles, constructor presence, override compatibility, abstract-method
//! coverage, and interface method conflicts.
//!
//! Depends on name resolution, not just the tree itself: override and
//! interface-conflict checks compare method signatures structurally, and a
//! `ReferenceTypeNode` only compares equal to another once both have been
//! resolved to the same declaration.

use joosc_pass::{DependencyContext, Pass, PassError, RunContext};
use joosc_sema::HierarchyChecker;

use super::ast_builder::AstBuilderPass;
use super::name_resolution::NameResolutionPass;

/// Checks class and interface hierarchies for soundness.
#[derive(Default)]
pub struct HierarchyCheckPass;

impl HierarchyCheckPass {
    #[must_use]
    pub fn new() -> Self { Self::default() }
}

impl Pass for HierarchyCheckPass {
    fn name(&self) -> &'static str { "hierarchy-check" }

    fn description(&self) -> &'static str { "checks inheritance cycles, overrides, and abstract coverage" }

    fn compute_dependencies(&self, ctx: &mut DependencyContext) {
        ctx.require::<AstBuilderPass>();
        ctx.require::<NameResolutionPass>();
    }

    fn run(&mut self, ctx: &mut RunContext<'_>) -> Result<(), PassError> {
        let builder = ctx.get_pass::<AstBuilderPass>()?;
        let ast = builder.ast();
        let checker = HierarchyChecker::new(&ast);
        if let Err(errors) = checker.check_all(builder.classes(), builder.interfaces()) {
            for error in errors {
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
    fn helper_override_of_get_field_is_accepted() {
        let mut manager = PassManager::new();
        let _ = manager.add_pass(AstBuilderPass::new(), false);
        let _ = manager.add_pass(NameResolutionPass::new(), false);
        let _ = manager.add_pass(HierarchyCheckPass::new(), true);
        manager.run().expect("dependency graph is acyclic");

        let diag = manager.diag();
        assert!(!diag.has_errors(), "unexpected diagnostics: {:?}", diag.diagnostics().collect::<Vec<_>>());
    }
}
