//! Declaration nodes: classes, interfaces, methods, fields, and locals.

use bitflags::bitflags;
use joosc_source::SourceRange;

use crate::nodes::NodeID;

bitflags! {
    /// Modifier flags shared by every declaration kind. This type itself
    /// allows any combination of bits; rules over valid combinations
    /// (abstract+final, native implies static, ...) are enforced by
    /// `joosc_sema::HierarchyChecker::check_all`'s modifier pass, not here.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Modifiers: u16 {
        const PUBLIC    = 1 << 0;
        const PROTECTED = 1 << 1;
        const STATIC    = 1 << 2;
        const FINAL     = 1 << 3;
        const ABSTRACT  = 1 << 4;
        const NATIVE    = 1 << 5;
    }
}

/// A parsed source file: an optional package name, its imports, and exactly
/// one top-level type declaration.
#[derive(Debug, Clone)]
pub struct CompilationUnit {
    pub id: NodeID,
    pub span: SourceRange,
    /// Dot-separated package name, empty for the unnamed package.
    pub package: Vec<String>,
    pub imports: Vec<Import>,
    /// The single top-level `ClassDecl` or `InterfaceDecl`.
    pub body: NodeID,
}

impl CompilationUnit {
    #[must_use]
    pub fn children(&self) -> Vec<NodeID> { vec![self.body] }
}

/// One `import` declaration: a dotted identifier chain, optionally `.*`.
#[derive(Debug, Clone)]
pub struct Import {
    pub path: Vec<String>,
    pub on_demand: bool,
}

/// A class declaration.
#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub id: NodeID,
    pub span: SourceRange,
    pub name: String,
    /// Filled in by the name resolver once the enclosing package is known.
    pub canonical_name: Option<String>,
    pub modifiers: Modifiers,
    pub superclass: Option<NodeID>,
    pub interfaces: Vec<NodeID>,
    pub fields: Vec<NodeID>,
    pub methods: Vec<NodeID>,
    pub constructors: Vec<NodeID>,
}

impl ClassDecl {
    #[must_use]
    pub fn children(&self) -> Vec<NodeID> {
        let mut out = Vec::new();
        out.extend(self.superclass);
        out.extend(self.interfaces.iter().copied());
        out.extend(self.fields.iter().copied());
        out.extend(self.methods.iter().copied());
        out.extend(self.constructors.iter().copied());
        out
    }

    /// Looks up an immediately-declared (non-inherited) member by simple name.
    #[must_use]
    pub fn declared_member(&self, name: &str, ast: &crate::ast::Ast) -> Option<NodeID> {
        self.fields
            .iter()
            .chain(self.methods.iter())
            .chain(self.constructors.iter())
            .copied()
            .find(|&id| ast.simple_name(id).is_some_and(|n| n == name))
    }
}

/// An interface declaration.
#[derive(Debug, Clone)]
pub struct InterfaceDecl {
    pub id: NodeID,
    pub span: SourceRange,
    pub name: String,
    pub canonical_name: Option<String>,
    pub modifiers: Modifiers,
    pub extends: Vec<NodeID>,
    pub methods: Vec<NodeID>,
}

impl InterfaceDecl {
    #[must_use]
    pub fn children(&self) -> Vec<NodeID> {
        self.extends.iter().chain(self.methods.iter()).copied().collect()
    }
}

/// A method or constructor declaration. Constructors carry `return_type =
/// None` and `name` equal to the enclosing class's name.
#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub id: NodeID,
    pub span: SourceRange,
    pub name: String,
    pub modifiers: Modifiers,
    pub is_constructor: bool,
    /// Absent for constructors and `void` methods.
    pub return_type: Option<NodeID>,
    pub params: Vec<NodeID>,
    /// Absent iff abstract or native.
    pub body: Option<NodeID>,
}

impl MethodDecl {
    #[must_use]
    pub fn children(&self) -> Vec<NodeID> {
        let mut out = Vec::new();
        out.extend(self.return_type);
        out.extend(self.params.iter().copied());
        out.extend(self.body);
        out
    }
}

/// A field declaration. Fields are never final, abstract, or native.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub id: NodeID,
    pub span: SourceRange,
    pub name: String,
    pub modifiers: Modifiers,
    pub ty: NodeID,
}

impl FieldDecl {
    #[must_use]
    pub fn children(&self) -> Vec<NodeID> { vec![self.ty] }
}

/// A local variable or formal parameter declaration.
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub id: NodeID,
    pub span: SourceRange,
    pub name: String,
    pub ty: NodeID,
    pub is_parameter: bool,
    /// Locals only: the statement's expression to evaluate and store.
    pub initializer: Option<NodeID>,
}

impl VarDecl {
    #[must_use]
    pub fn children(&self) -> Vec<NodeID> {
        let mut out = vec![self.ty];
        out.extend(self.initializer);
        out
    }
}
