//! Statement nodes.

use joosc_source::SourceRange;

use crate::nodes::NodeID;

#[derive(Debug, Clone)]
pub struct BlockStmt {
    pub id: NodeID,
    pub span: SourceRange,
    pub statements: Vec<NodeID>,
}

impl BlockStmt {
    #[must_use]
    pub fn children(&self) -> Vec<NodeID> { self.statements.clone() }
}

/// A local-variable declaration statement; the `VarDecl` carries its own
/// optional initializer expression.
#[derive(Debug, Clone)]
pub struct DeclStmt {
    pub id: NodeID,
    pub span: SourceRange,
    pub var: NodeID,
}

impl DeclStmt {
    #[must_use]
    pub fn children(&self) -> Vec<NodeID> { vec![self.var] }
}

#[derive(Debug, Clone)]
pub struct ExprStmt {
    pub id: NodeID,
    pub span: SourceRange,
    pub expr: NodeID,
}

impl ExprStmt {
    #[must_use]
    pub fn children(&self) -> Vec<NodeID> { vec![self.expr] }
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub id: NodeID,
    pub span: SourceRange,
    pub condition: NodeID,
    pub then_branch: NodeID,
    pub else_branch: Option<NodeID>,
}

impl IfStmt {
    #[must_use]
    pub fn children(&self) -> Vec<NodeID> {
        let mut out = vec![self.condition, self.then_branch];
        out.extend(self.else_branch);
        out
    }
}

#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub id: NodeID,
    pub span: SourceRange,
    pub condition: NodeID,
    pub body: NodeID,
}

impl WhileStmt {
    #[must_use]
    pub fn children(&self) -> Vec<NodeID> { vec![self.condition, self.body] }
}

#[derive(Debug, Clone)]
pub struct ForStmt {
    pub id: NodeID,
    pub span: SourceRange,
    pub init: Option<NodeID>,
    pub condition: Option<NodeID>,
    pub update: Option<NodeID>,
    pub body: NodeID,
}

impl ForStmt {
    #[must_use]
    pub fn children(&self) -> Vec<NodeID> {
        let mut out = Vec::new();
        out.extend(self.init);
        out.extend(self.condition);
        out.extend(self.update);
        out.push(self.body);
        out
    }
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub id: NodeID,
    pub span: SourceRange,
    pub value: Option<NodeID>,
}

impl ReturnStmt {
    #[must_use]
    pub fn children(&self) -> Vec<NodeID> { self.value.into_iter().collect() }
}

/// The empty statement (`;`).
#[derive(Debug, Clone)]
pub struct NullStmt {
    pub id: NodeID,
    pub span: SourceRange,
}

impl NullStmt {
    #[must_use]
    pub fn children(&self) -> Vec<NodeID> { vec![] }
}
