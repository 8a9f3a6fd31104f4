//! Wraps [`joosc_codegen::generate`] as a pass (C9/C10): lowers the resolved
//! and checked AST to a linked TIR compilation unit.
//!
//! [`joosc_codegen::error::CodegenError`] signals that an earlier pass
//! failed to establish an invariant this crate depends on; it is never a
//! user-facing diagnostic, so a failure here is reported as a pass failure
//! rather than pushed onto the diagnostic engine.

use std::cell::{Ref, RefCell};

use joosc_pass::{DependencyContext, Pass, PassError, RunContext};
use joosc_tir::{CompilationUnit, Context};

use super::ast_builder::AstBuilderPass;
use super::expression_resolution::ExpressionResolutionPass;
use super::hierarchy_check::HierarchyCheckPass;

/// Generates mangled-ABI TIR for every compilation unit the AST builder
/// produced.
#[derive(Default)]
pub struct CodegenPass {
    output: RefCell<Option<(Context, CompilationUnit)>>,
}

impl CodegenPass {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn output(&self) -> Ref<'_, Option<(Context, CompilationUnit)>> { self.output.borrow() }
}

impl Pass for CodegenPass {
    fn name(&self) -> &'static str { "codegen" }

    fn description(&self) -> &'static str { "lowers the checked AST to a linked TIR compilation unit" }

    fn compute_dependencies(&self, ctx: &mut DependencyContext) {
        ctx.require::<AstBuilderPass>();
        ctx.require::<ExpressionResolutionPass>();
        ctx.require::<HierarchyCheckPass>();
    }

    fn run(&mut self, ctx: &mut RunContext<'_>) -> Result<(), PassError> {
        let builder = ctx.get_pass::<AstBuilderPass>()?;
        let ast = builder.ast();
        let (context, unit) = joosc_codegen::generate(&ast, builder.roots())
            .map_err(|error| PassError::PassFailed { pass: self.name().to_string(), message: error.to_string() })?;
        *self.output.borrow_mut() = Some((context, unit));
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any { self }
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any { self }
}

#[cfg(test)]
mod tests {
    use joosc_pass::PassManager;

    use super::*;
    use crate::passes::expression_resolution::ExpressionResolutionPass;
    use crate::passes::hierarchy_check::HierarchyCheckPass;
    use crate::passes::name_resolution::NameResolutionPass;

    #[test]
    fn generates_one_function_per_method_and_constructor() {
        let mut manager = PassManager::new();
        let _ = manager.add_pass(AstBuilderPass::new(), false);
        let _ = manager.add_pass(NameResolutionPass::new(), false);
        let _ = manager.add_pass(ExpressionResolutionPass::new(), false);
        let _ = manager.add_pass(HierarchyCheckPass::new(), false);
        let _ = manager.add_pass(CodegenPass::new(), true);
        manager.run().expect("dependency graph is acyclic");

        assert!(!manager.diag().has_errors());

        let codegen = manager.get_pass::<CodegenPass>().unwrap();
        let output = codegen.output();
        let (_, unit) = output.as_ref().expect("codegen populated its output");
        // MyClass: add, getField, chain, nextCounter, sum, <init> (6);
        // Helper: getField, <init> (2).
        assert_eq!(unit.functions.len(), 8);
    }
}
