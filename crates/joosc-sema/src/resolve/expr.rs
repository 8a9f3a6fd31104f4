//! Expression resolution (C6): classifies ambiguous names per JLS 6.5.2 and
//! writes the result onto the `MemberName`/`MethodNameNode` chain each
//! qualified name forms.
//!
//! A dotted name like `a.b.c` is not three entries in the flat postfix
//! expression list; only its last link appears there, linked back through
//! `prev`. [`ExpressionResolver::resolve_name_chain`] walks `prev` out to the
//! unqualified root, classifies it first, then classifies each qualified
//! step back down to the leaf, since each step needs its qualifier's
//! classification already known.

use joosc_ast::{AnyNode, Ast, CompilationUnit, Modifiers, NameResolution, NodeID, NodeKind};
use rustc_hash::FxHashMap;

use crate::error::SemaError;
use crate::resolve::name::{ImportResolution, NameResolver};
use crate::resolve::package::PkgMember;

/// Nested lexical scopes of locals and parameters, searched innermost-first.
/// Fields are not part of this: they are looked up separately, on the
/// enclosing class, once no local or parameter matches.
#[derive(Debug, Default)]
pub struct LocalScope {
    frames: Vec<FxHashMap<String, NodeID>>,
}

impl LocalScope {
    #[must_use]
    pub fn new() -> Self { Self { frames: vec![FxHashMap::default()] } }

    pub fn push(&mut self) {
        self.frames.push(FxHashMap::default());
        log::trace!("entered scope, depth {}", self.frames.len());
    }

    pub fn pop(&mut self) {
        self.frames.pop();
        log::trace!("exited scope, depth {}", self.frames.len());
    }

    pub fn define(&mut self, name: String, decl: NodeID) {
        self.frames.last_mut().expect("at least one frame").insert(name, decl);
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<NodeID> {
        self.frames.iter().rev().find_map(|frame| frame.get(name).copied())
    }
}

pub struct ExpressionResolver<'a> {
    names: &'a NameResolver,
}

impl<'a> ExpressionResolver<'a> {
    #[must_use]
    pub fn new(names: &'a NameResolver) -> Self { Self { names } }

    /// Resolves every expression in one class's method and constructor
    /// bodies. Field declarations in this language subset carry no
    /// initializer, so fields need no expression resolution of their own.
    pub fn resolve_class(&self, ast: &mut Ast, cu: &CompilationUnit, class: NodeID) -> Result<(), Vec<SemaError>> {
        let (methods, constructors) = {
            let AnyNode::ClassDecl(cd) = &ast.node(class).expect("class exists").data else {
                return Ok(());
            };
            (cd.methods.clone(), cd.constructors.clone())
        };
        let mut errors = Vec::new();
        for method in methods.into_iter().chain(constructors) {
            self.resolve_method_body(ast, cu, class, method, &mut errors);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    fn resolve_method_body(
        &self,
        ast: &mut Ast,
        cu: &CompilationUnit,
        class: NodeID,
        method: NodeID,
        errors: &mut Vec<SemaError>,
    ) {
        let (params, body) = {
            let AnyNode::MethodDecl(m) = &ast.node(method).expect("method exists").data else {
                return;
            };
            (m.params.clone(), m.body)
        };
        let mut scope = LocalScope::new();
        for param in &params {
            if let Some(name) = ast.simple_name(*param) {
                scope.define(name.to_string(), *param);
            }
        }
        if let Some(body) = body {
            self.resolve_stmt(ast, &mut scope, cu, class, body, errors);
        }
    }

    fn resolve_stmt(
        &self,
        ast: &mut Ast,
        scope: &mut LocalScope,
        cu: &CompilationUnit,
        class: NodeID,
        stmt: NodeID,
        errors: &mut Vec<SemaError>,
    ) {
        let Some(node) = ast.node(stmt) else { return };
        match &node.data {
            AnyNode::BlockStmt(b) => {
                let statements = b.statements.clone();
                scope.push();
                for s in statements {
                    self.resolve_stmt(ast, scope, cu, class, s, errors);
                }
                scope.pop();
            }
            AnyNode::DeclStmt(d) => {
                let var = d.var;
                let (name, initializer) = {
                    let AnyNode::VarDecl(v) = &ast.node(var).expect("var exists").data else {
                        return;
                    };
                    (v.name.clone(), v.initializer)
                };
                if let Some(root) = initializer {
                    self.resolve_expr_at(ast, scope, cu, class, root, errors);
                }
                scope.define(name, var);
            }
            AnyNode::ExprStmt(e) => {
                let expr = e.expr;
                self.resolve_expr_at(ast, scope, cu, class, expr, errors);
            }
            AnyNode::IfStmt(i) => {
                let (condition, then_branch, else_branch) = (i.condition, i.then_branch, i.else_branch);
                self.resolve_expr_at(ast, scope, cu, class, condition, errors);
                self.resolve_stmt(ast, scope, cu, class, then_branch, errors);
                if let Some(else_branch) = else_branch {
                    self.resolve_stmt(ast, scope, cu, class, else_branch, errors);
                }
            }
            AnyNode::WhileStmt(w) => {
                let (condition, body) = (w.condition, w.body);
                self.resolve_expr_at(ast, scope, cu, class, condition, errors);
                self.resolve_stmt(ast, scope, cu, class, body, errors);
            }
            AnyNode::ForStmt(f) => {
                let (init, condition, update, body) = (f.init, f.condition, f.update, f.body);
                scope.push();
                if let Some(init) = init {
                    self.resolve_stmt(ast, scope, cu, class, init, errors);
                }
                if let Some(condition) = condition {
                    self.resolve_expr_at(ast, scope, cu, class, condition, errors);
                }
                if let Some(update) = update {
                    self.resolve_expr_at(ast, scope, cu, class, update, errors);
                }
                self.resolve_stmt(ast, scope, cu, class, body, errors);
                scope.pop();
            }
            AnyNode::ReturnStmt(r) => {
                if let Some(value) = r.value {
                    self.resolve_expr_at(ast, scope, cu, class, value, errors);
                }
            }
            AnyNode::NullStmt(_) => {}
            _ => {}
        }
    }

    /// Resolves every ambiguous-name chain appearing in the expression
    /// rooted at `root` (an `IfStmt::condition`-style handle into
    /// [`Ast::expr_list`]).
    fn resolve_expr_at(
        &self,
        ast: &mut Ast,
        scope: &LocalScope,
        cu: &CompilationUnit,
        class: NodeID,
        root: NodeID,
        errors: &mut Vec<SemaError>,
    ) {
        let Some(list) = ast.expr_list(root).cloned() else { return };
        for &id in &list.nodes {
            if matches!(ast.kind(id), Some(NodeKind::MemberName | NodeKind::MethodNameNode)) {
                if let Err(e) = self.resolve_name_chain(ast, scope, cu, class, id) {
                    errors.push(e);
                }
            }
        }
    }

    /// Classifies the name chain ending at `id`, recursing outward through
    /// `prev` to the unqualified root first. Returns the chain's
    /// classification and writes it onto every `MemberName`/`MethodNameNode`
    /// link it touches, skipping links already resolved.
    fn resolve_name_chain(
        &self,
        ast: &mut Ast,
        scope: &LocalScope,
        cu: &CompilationUnit,
        class: NodeID,
        id: NodeID,
    ) -> Result<NameResolution, SemaError> {
        if ast.kind(id) == Some(NodeKind::ThisNode) {
            return Ok(NameResolution::ExpressionName(class));
        }

        let (name, prev, already, is_method_name) = {
            let node = ast.node(id).expect("name chain node exists");
            match &node.data {
                AnyNode::MemberName(n) => (n.name.clone(), n.prev, n.resolution.clone(), false),
                AnyNode::MethodNameNode(n) => (n.name.clone(), n.prev, n.resolution.clone(), true),
                _ => unreachable!("resolve_name_chain only visits name nodes"),
            }
        };
        if already != NameResolution::Unresolved {
            return Ok(already);
        }

        let resolution = if let Some(q) = prev {
            let q_resolution = self.resolve_name_chain(ast, scope, cu, class, q)?;
            self.resolve_qualified(ast, q, &q_resolution, &name)?
        } else if is_method_name {
            let span = ast.span(id).expect("span");
            Self::lookup_member(ast, class, &name)
                .map(NameResolution::ExpressionName)
                .ok_or(SemaError::UnresolvedName { name: name.clone(), span })?
        } else {
            self.reclassify_single_name(ast, scope, cu, class, id, &name)?
        };

        if let Some(node) = ast.node_mut(id) {
            match &mut node.data {
                AnyNode::MemberName(n) => n.resolution = resolution.clone(),
                AnyNode::MethodNameNode(n) => n.resolution = resolution.clone(),
                _ => {}
            }
        }
        Ok(resolution)
    }

    /// Single ambiguous name reclassification (JLS 6.5.2): local/parameter,
    /// then field (own class or an ancestor), then the compilation unit's
    /// import scope.
    fn reclassify_single_name(
        &self,
        ast: &Ast,
        scope: &LocalScope,
        cu: &CompilationUnit,
        class: NodeID,
        id: NodeID,
        name: &str,
    ) -> Result<NameResolution, SemaError> {
        if let Some(decl) = scope.lookup(name) {
            return Ok(NameResolution::ExpressionName(decl));
        }
        if let Some(decl) = Self::lookup_member(ast, class, name) {
            return Ok(NameResolution::ExpressionName(decl));
        }
        let span = ast.span(id).expect("span");
        match self.names.get_import(ast, cu, name) {
            ImportResolution::Decl(decl) => Ok(NameResolution::TypeName(decl)),
            ImportResolution::Package(_) => Ok(NameResolution::PackageName(vec![name.to_string()])),
            ImportResolution::Ambiguous => {
                Err(SemaError::AmbiguousImport { name: name.to_string(), span })
            }
            ImportResolution::NotFound => Err(SemaError::UnresolvedName { name: name.to_string(), span }),
        }
    }

    /// Reduces `Q . name` given `Q`'s already-known classification.
    fn resolve_qualified(
        &self,
        ast: &mut Ast,
        q_id: NodeID,
        q_resolution: &NameResolution,
        name: &str,
    ) -> Result<NameResolution, SemaError> {
        let span = ast.span(q_id).expect("span");
        match q_resolution {
            NameResolution::ExpressionName(decl) => {
                // `this` resolves to `ExpressionName(enclosing class)`: its
                // "type" is the class itself, not a field/local to look up.
                let is_this = matches!(ast.node(*decl).map(|n| &n.data), Some(AnyNode::ClassDecl(_)));
                let owner = if is_this {
                    *decl
                } else {
                    let ty = Self::decl_type(ast, *decl)
                        .ok_or_else(|| SemaError::NotAFieldAccess { name: name.to_string(), span })?;
                    NameResolver::get_type_as_class(ast, ty)
                        .ok_or_else(|| SemaError::NotAFieldAccess { name: name.to_string(), span })?
                };
                let member = Self::lookup_member(ast, owner, name).ok_or_else(|| {
                    SemaError::UndeclaredMember {
                        name: name.to_string(),
                        class: Self::class_name(ast, owner),
                        span,
                    }
                })?;
                Ok(NameResolution::ExpressionName(member))
            }
            NameResolution::TypeName(decl) => {
                let member = Self::lookup_member(ast, *decl, name).ok_or_else(|| {
                    SemaError::UndeclaredMember {
                        name: name.to_string(),
                        class: Self::class_name(ast, *decl),
                        span,
                    }
                })?;
                if !Self::is_static(ast, member) {
                    return Err(SemaError::StaticAccessToInstanceMember { name: name.to_string(), span });
                }
                Ok(NameResolution::ExpressionName(member))
            }
            NameResolution::PackageName(path) => {
                let mut full = path.clone();
                full.push(name.to_string());
                match self.names.resolve_package_path(&full) {
                    Some(PkgMember::Type(decl)) => Ok(NameResolution::TypeName(decl)),
                    Some(PkgMember::Package(_)) => Ok(NameResolution::PackageName(full)),
                    None => Err(SemaError::UndeclaredPackageMember {
                        name: name.to_string(),
                        package: path.join("."),
                        span,
                    }),
                }
            }
            NameResolution::Unresolved => unreachable!("qualifier is resolved before this is called"),
        }
    }

    /// Walks the `superclass` chain starting at `class`, returning the first
    /// declared member named `name`. Bounded defensively in case a cyclic
    /// hierarchy reaches here before the hierarchy checker has run.
    fn lookup_member(ast: &Ast, class: NodeID, name: &str) -> Option<NodeID> {
        let mut current = Some(class);
        let mut steps = 0;
        while let Some(id) = current {
            if steps > 256 {
                return None;
            }
            steps += 1;
            let AnyNode::ClassDecl(cd) = &ast.node(id)?.data else { return None };
            if let Some(member) = cd.declared_member(name, ast) {
                return Some(member);
            }
            current = cd.superclass;
        }
        None
    }

    fn decl_type(ast: &Ast, decl: NodeID) -> Option<NodeID> {
        match &ast.node(decl)?.data {
            AnyNode::FieldDecl(f) => Some(f.ty),
            AnyNode::VarDecl(v) => Some(v.ty),
            _ => None,
        }
    }

    fn is_static(ast: &Ast, decl: NodeID) -> bool {
        match ast.node(decl).map(|n| &n.data) {
            Some(AnyNode::FieldDecl(f)) => f.modifiers.contains(Modifiers::STATIC),
            Some(AnyNode::MethodDecl(m)) => m.modifiers.contains(Modifiers::STATIC),
            _ => false,
        }
    }

    fn class_name(ast: &Ast, class: NodeID) -> String {
        ast.simple_name(class).unwrap_or("<unknown>").to_string()
    }
}

#[cfg(test)]
mod tests {
    use joosc_ast::{BuiltIn, BuiltInTypeNode, ClassDecl, FieldDecl, Import, MemberName};
    use joosc_source::{FileId, Position, SourceRange};

    use super::*;

    fn span() -> SourceRange {
        SourceRange::new(Position::start_of_file(), Position::start_of_file(), FileId::new(1))
    }

    fn int_ty(ast: &mut Ast) -> NodeID {
        ast.alloc(AnyNode::BuiltInTypeNode(BuiltInTypeNode { id: NodeID::new(0, 0), span: span(), kind: BuiltIn::Int }))
    }

    fn class_decl(
        ast: &mut Ast,
        name: &str,
        fields: Vec<NodeID>,
        methods: Vec<NodeID>,
        constructors: Vec<NodeID>,
    ) -> NodeID {
        ast.alloc(AnyNode::ClassDecl(ClassDecl {
            id: NodeID::new(0, 0),
            span: span(),
            name: name.to_string(),
            canonical_name: None,
            modifiers: Modifiers::PUBLIC,
            superclass: None,
            interfaces: vec![],
            fields,
            methods,
            constructors,
        }))
    }

    fn member_name(ast: &mut Ast, name: &str, prev: Option<NodeID>) -> NodeID {
        ast.alloc(AnyNode::MemberName(MemberName {
            id: NodeID::new(0, 0),
            span: span(),
            name: name.to_string(),
            prev,
            resolution: NameResolution::Unresolved,
        }))
    }

    #[test]
    fn local_variable_resolves_to_its_declaration() {
        let ast = Ast::new();
        let names = NameResolver::new();
        let resolver = ExpressionResolver::new(&names);
        let mut scope = LocalScope::new();
        let local = NodeID::new(0, 1);
        scope.define("x".to_string(), local);

        let cu = CompilationUnit { id: NodeID::new(0, 0), span: span(), package: vec![], imports: vec![], body: local };
        let class = NodeID::new(0, 2);
        let resolution = resolver.reclassify_single_name(&ast, &scope, &cu, class, local, "x").unwrap();
        assert_eq!(resolution, NameResolution::ExpressionName(local));
    }

    #[test]
    fn static_access_to_instance_member_is_rejected() {
        let mut ast = Ast::new();
        let ty = int_ty(&mut ast);
        let field_x = ast.alloc(AnyNode::FieldDecl(FieldDecl {
            id: NodeID::new(0, 0),
            span: span(),
            name: "x".to_string(),
            modifiers: Modifiers::PUBLIC,
            ty,
        }));
        let class_a = class_decl(&mut ast, "A", vec![field_x], vec![], vec![]);
        let cu = CompilationUnit { id: NodeID::new(0, 0), span: span(), package: vec![], imports: vec![], body: class_a };

        let root = member_name(&mut ast, "A", None);
        let leaf = member_name(&mut ast, "x", Some(root));

        let names = NameResolver::new();
        let resolver = ExpressionResolver::new(&names);
        let scope = LocalScope::new();
        let err = resolver.resolve_name_chain(&mut ast, &scope, &cu, class_a, leaf).unwrap_err();
        assert!(matches!(err, SemaError::StaticAccessToInstanceMember { name, .. } if name == "x"));
    }

    #[test]
    fn undeclared_member_on_qualified_access_is_rejected() {
        let mut ast = Ast::new();
        let class_a = class_decl(&mut ast, "A", vec![], vec![], vec![]);
        let cu = CompilationUnit { id: NodeID::new(0, 0), span: span(), package: vec![], imports: vec![], body: class_a };

        let root = member_name(&mut ast, "A", None);
        let leaf = member_name(&mut ast, "missing", Some(root));

        let names = NameResolver::new();
        let resolver = ExpressionResolver::new(&names);
        let scope = LocalScope::new();
        let err = resolver.resolve_name_chain(&mut ast, &scope, &cu, class_a, leaf).unwrap_err();
        assert!(matches!(err, SemaError::UndeclaredMember { name, .. } if name == "missing"));
    }

    #[test]
    fn ambiguous_on_demand_import_is_rejected() {
        let mut ast = Ast::new();
        let helper_a = class_decl(&mut ast, "Helper", vec![], vec![], vec![]);
        let cu_a_node = ast.alloc(AnyNode::CompilationUnit(CompilationUnit {
            id: NodeID::new(0, 0),
            span: span(),
            package: vec!["a".into()],
            imports: vec![],
            body: helper_a,
        }));
        ast.add_root(cu_a_node);

        let helper_b = class_decl(&mut ast, "Helper", vec![], vec![], vec![]);
        let cu_b_node = ast.alloc(AnyNode::CompilationUnit(CompilationUnit {
            id: NodeID::new(0, 0),
            span: span(),
            package: vec!["b".into()],
            imports: vec![],
            body: helper_b,
        }));
        ast.add_root(cu_b_node);

        let main = class_decl(&mut ast, "Main", vec![], vec![], vec![]);
        let imports =
            vec![Import { path: vec!["a".into()], on_demand: true }, Import { path: vec!["b".into()], on_demand: true }];
        let cu_main_node = ast.alloc(AnyNode::CompilationUnit(CompilationUnit {
            id: NodeID::new(0, 0),
            span: span(),
            package: vec![],
            imports: imports.clone(),
            body: main,
        }));
        ast.add_root(cu_main_node);

        let mut names = NameResolver::new();
        names.collect_top_level_types(&ast).unwrap();

        let cu_main = CompilationUnit { id: NodeID::new(0, 0), span: span(), package: vec![], imports, body: main };
        let resolver = ExpressionResolver::new(&names);
        let scope = LocalScope::new();
        let id = member_name(&mut ast, "Helper", None);
        let err = resolver.reclassify_single_name(&ast, &scope, &cu_main, main, id, "Helper").unwrap_err();
        assert!(matches!(err, SemaError::AmbiguousImport { name, .. } if name == "Helper"));
    }
}
