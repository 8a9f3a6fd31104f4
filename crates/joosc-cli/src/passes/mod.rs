//! One [`joosc_pass::Pass`] wrapper per compilation stage, wired together by
//! [`crate::main`] into a single [`joosc_pass::PassManager`] run.

pub mod ast_builder;
pub mod ast_printer;
pub mod codegen;
pub mod expression_resolution;
pub mod hierarchy_check;
pub mod name_resolution;
pub mod tir_printer;

pub use ast_builder::AstBuilderPass;
pub use ast_printer::AstPrinterPass;
pub use codegen::CodegenPass;
pub use expression_resolution::ExpressionResolutionPass;
pub use hierarchy_check::HierarchyCheckPass;
pub use name_resolution::NameResolutionPass;
pub use tir_printer::TirPrinterPass;
