//! A plain-text TIR dump pass, enabled by `--emit-tir`. Renders every
//! function's basic blocks and instructions with `{:?}`; this is a debugging
//! aid, not a textual IR format meant to be reparsed.

use std::fmt::Write as _;

use joosc_pass::{DependencyContext, Pass, PassError, RunContext};

use super::codegen::CodegenPass;

#[derive(Default)]
pub struct TirPrinterPass;

impl TirPrinterPass {
    #[must_use]
    pub fn new() -> Self { Self::default() }
}

impl Pass for TirPrinterPass {
    fn name(&self) -> &'static str { "tir-printer" }

    fn description(&self) -> &'static str { "prints a plain-text dump of the generated TIR" }

    fn compute_dependencies(&self, ctx: &mut DependencyContext) {
        ctx.require::<CodegenPass>();
    }

    fn run(&mut self, ctx: &mut RunContext<'_>) -> Result<(), PassError> {
        let codegen = ctx.get_pass::<CodegenPass>()?;
        let output = codegen.output();
        let Some((context, unit)) = output.as_ref() else { return Ok(()) };

        let mut out = String::new();
        for &fid in &unit.functions {
            let function = context.function(fid);
            let params: Vec<String> = function.params.iter().map(|p| format!("{p:?}")).collect();
            let _ = writeln!(out, "function {}({}) {{", function.name, params.join(", "));
            for &bid in &function.blocks {
                let block = context.basic_block(bid);
                let _ = writeln!(out, "  {}:", block.name);
                for &value in &block.instructions {
                    let data = context.value(value);
                    let _ = writeln!(out, "    {value:?} = {:?} {:?}", data.kind, data.operands);
                }
            }
            let _ = writeln!(out, "}}");
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
    use crate::passes::ast_builder::AstBuilderPass;
    use crate::passes::expression_resolution::ExpressionResolutionPass;
    use crate::passes::hierarchy_check::HierarchyCheckPass;
    use crate::passes::name_resolution::NameResolutionPass;

    #[test]
    fn runs_over_the_generated_tir() {
        let mut manager = PassManager::new();
        let _ = manager.add_pass(AstBuilderPass::new(), false);
        let _ = manager.add_pass(NameResolutionPass::new(), false);
        let _ = manager.add_pass(ExpressionResolutionPass::new(), false);
        let _ = manager.add_pass(HierarchyCheckPass::new(), false);
        let _ = manager.add_pass(CodegenPass::new(), false);
        let _ = manager.add_pass(TirPrinterPass::new(), true);
        manager.run().expect("dependency graph is acyclic");
        assert!(!manager.diag().has_errors());
    }
}
