//! The node handle, the node-kind tag, and the `AnyNode` discriminated union.

use std::fmt;

use joosc_source::SourceRange;

use crate::decl::{ClassDecl, CompilationUnit, FieldDecl, InterfaceDecl, MethodDecl, VarDecl};
use crate::expr::{
    ArrayAccessNode, ArrayInstanceCreationNode, BinaryOpNode, CastNode, ClassInstanceCreationNode,
    LiteralNode, MemberAccessNode, MemberName, MethodInvocationNode, MethodNameNode, ThisNode,
    UnaryOpNode,
};
use crate::stmt::{BlockStmt, DeclStmt, ExprStmt, ForStmt, IfStmt, NullStmt, ReturnStmt, WhileStmt};
use crate::ty::{ArrayTypeNode, BuiltInTypeNode, ReferenceTypeNode, UnresolvedTypeNode};
use crate::{for_each_node_variant, impl_astnode_for_anynode, impl_get_as_for_anynode};

/// A handle to a node in an [`crate::ast::Ast`] arena: a slot index plus a
/// generation counter that invalidates the handle once the slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeID {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl NodeID {
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self { Self { index, generation } }
}

impl fmt::Display for NodeID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeID({}, {})", self.index, self.generation)
    }
}

/// Returned by [`AnyNode::get_as`] when the node is not the requested variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeCastError {
    pub expected: &'static str,
    pub actual: NodeKind,
}

impl fmt::Display for NodeCastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected node of type {}, found {:?}", self.expected, self.actual)
    }
}

impl std::error::Error for NodeCastError {}

/// Common behavior every node variant provides.
pub trait ASTNode {
    fn id(&self) -> NodeID;
    fn span(&self) -> SourceRange;
    fn kind(&self) -> NodeKind;
    /// Ordered, non-owning children used by generic traversals. Flat-list
    /// expression nodes always return an empty vec; their structure lives
    /// in operator arity, walked by [`crate::expr::evaluate_list`] instead.
    fn children(&self) -> Vec<NodeID>;
}

/// Discriminated union of every concrete node type storable in the arena.
#[derive(Debug, Clone)]
pub enum AnyNode {
    CompilationUnit(CompilationUnit),
    ClassDecl(ClassDecl),
    InterfaceDecl(InterfaceDecl),
    MethodDecl(MethodDecl),
    FieldDecl(FieldDecl),
    VarDecl(VarDecl),
    BuiltInTypeNode(BuiltInTypeNode),
    ArrayTypeNode(ArrayTypeNode),
    ReferenceTypeNode(ReferenceTypeNode),
    UnresolvedTypeNode(UnresolvedTypeNode),
    BlockStmt(BlockStmt),
    DeclStmt(DeclStmt),
    ExprStmt(ExprStmt),
    IfStmt(IfStmt),
    WhileStmt(WhileStmt),
    ForStmt(ForStmt),
    ReturnStmt(ReturnStmt),
    NullStmt(NullStmt),
    LiteralNode(LiteralNode),
    MemberName(MemberName),
    MethodNameNode(MethodNameNode),
    ThisNode(ThisNode),
    BinaryOpNode(BinaryOpNode),
    UnaryOpNode(UnaryOpNode),
    MemberAccessNode(MemberAccessNode),
    MethodInvocationNode(MethodInvocationNode),
    ClassInstanceCreationNode(ClassInstanceCreationNode),
    ArrayInstanceCreationNode(ArrayInstanceCreationNode),
    ArrayAccessNode(ArrayAccessNode),
    CastNode(CastNode),
}

/// High-level tag mirroring `AnyNode`'s variants, used where only the kind
/// (not the payload) matters, e.g. error messages and `find_nodes_of_kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    CompilationUnit,
    ClassDecl,
    InterfaceDecl,
    MethodDecl,
    FieldDecl,
    VarDecl,
    BuiltInTypeNode,
    ArrayTypeNode,
    ReferenceTypeNode,
    UnresolvedTypeNode,
    BlockStmt,
    DeclStmt,
    ExprStmt,
    IfStmt,
    WhileStmt,
    ForStmt,
    ReturnStmt,
    NullStmt,
    LiteralNode,
    MemberName,
    MethodNameNode,
    ThisNode,
    BinaryOpNode,
    UnaryOpNode,
    MemberAccessNode,
    MethodInvocationNode,
    ClassInstanceCreationNode,
    ArrayInstanceCreationNode,
    ArrayAccessNode,
    CastNode,
}

for_each_node_variant!(impl_astnode_for_anynode);
for_each_node_variant!(impl_get_as_for_anynode);
