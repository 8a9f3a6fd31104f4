//! Arena-backed AST with RPN-encoded expressions (C4).
//!
//! [`Ast`] owns every node of one compiler run behind generation-checked
//! [`NodeID`] handles. Declarations, types, and statements form an ordinary
//! tree via [`ASTNode::children`]; expressions are flat postfix sequences
//! ([`expr::ExprNodeList`]) walked by the generic [`expr::evaluate_list`]
//! stack machine, which later passes instantiate to resolve names
//! (`joosc-sema`) and to lower to IR (`joosc-codegen`).

pub mod ast;
pub mod decl;
pub mod expr;
mod macros;
pub mod nodes;
pub mod stmt;
pub mod ty;

pub use ast::{Ast, Node};
pub use decl::{ClassDecl, CompilationUnit, FieldDecl, Import, InterfaceDecl, MethodDecl, Modifiers, VarDecl};
pub use expr::{
    ArrayAccessNode, ArrayInstanceCreationNode, BinOp, BinaryOpNode, CastNode,
    ClassInstanceCreationNode, EvalError, ExprEvaluator, ExprNodeList, LiteralNode, LiteralValue,
    MemberAccessNode, MemberName, MethodInvocationNode, MethodNameNode, NameResolution, ThisNode,
    UnOp, UnaryOpNode, evaluate_list,
};
pub use nodes::{ASTNode, AnyNode, NodeCastError, NodeID, NodeKind};
pub use stmt::{BlockStmt, DeclStmt, ExprStmt, ForStmt, IfStmt, NullStmt, ReturnStmt, WhileStmt};
pub use ty::{ArrayTypeNode, BuiltIn, BuiltInTypeNode, ReferenceTypeNode, UnresolvedTypeNode};
