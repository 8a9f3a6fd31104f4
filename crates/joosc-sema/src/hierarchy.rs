//! Hierarchy checking (C7): cycle detection over `extends`/`implements`,
//! constructor presence, override rules, and abstract-method coverage.
//!
//! Inherited-member lookup for expression resolution (§4.7's "inherited
//! lookup tables") is not a separate cache here: [`super::resolve::expr`]'s
//! `lookup_member` already walks the (now cycle-free) `superclass` chain
//! directly, which is cheap enough for this language's shallow hierarchies
//! and needs no precomputed table.

use joosc_ast::{AnyNode, Ast, Modifiers, NodeID};
use joosc_source::SourceRange;
use rustc_hash::FxHashSet;

use crate::error::SemaError;

struct MethodInfo {
    name: String,
    modifiers: Modifiers,
    is_constructor: bool,
    return_type: Option<NodeID>,
    param_types: Vec<NodeID>,
    span: SourceRange,
}

pub struct HierarchyChecker<'a> {
    ast: &'a Ast,
}

impl<'a> HierarchyChecker<'a> {
    #[must_use]
    pub fn new(ast: &'a Ast) -> Self { Self { ast } }

    /// Runs every check in dependency order: modifiers and cycles first,
    /// since every other check walks `extends`/`implements` (and would loop
    /// forever on a cycle) or assumes well-formed modifier combinations.
    pub fn check_all(&self, classes: &[NodeID], interfaces: &[NodeID]) -> Result<(), Vec<SemaError>> {
        let mut errors = Vec::new();
        self.check_modifiers(classes, interfaces, &mut errors);
        self.check_cycles(classes, interfaces, &mut errors);
        if !errors.is_empty() {
            return Err(errors);
        }

        for &class in classes {
            self.check_constructor(class, &mut errors);
            self.check_overrides(class, &mut errors);
            self.check_abstract_coverage(class, &mut errors);
        }
        for &interface in interfaces {
            self.check_interface_conflicts(interface, &mut errors);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    fn parents_of(&self, id: NodeID) -> Vec<NodeID> {
        match self.ast.node(id).map(|n| &n.data) {
            Some(AnyNode::ClassDecl(cd)) => {
                cd.superclass.into_iter().chain(cd.interfaces.iter().copied()).collect()
            }
            Some(AnyNode::InterfaceDecl(ifc)) => ifc.extends.clone(),
            _ => Vec::new(),
        }
    }

    fn check_cycles(&self, classes: &[NodeID], interfaces: &[NodeID], errors: &mut Vec<SemaError>) {
        let mut visited = FxHashSet::default();
        for &start in classes.iter().chain(interfaces) {
            if !visited.contains(&start) {
                let mut stack = FxHashSet::default();
                let mut path = Vec::new();
                self.dfs_cycle(start, &mut visited, &mut stack, &mut path, errors);
            }
        }
    }

    fn dfs_cycle(
        &self,
        id: NodeID,
        visited: &mut FxHashSet<NodeID>,
        stack: &mut FxHashSet<NodeID>,
        path: &mut Vec<NodeID>,
        errors: &mut Vec<SemaError>,
    ) {
        if stack.contains(&id) {
            let start = path.iter().position(|&n| n == id).unwrap_or(0);
            let cycle = path[start..]
                .iter()
                .chain(std::iter::once(&id))
                .map(|&n| self.ast.simple_name(n).unwrap_or("?").to_string())
                .collect();
            errors.push(SemaError::CyclicInheritance {
                cycle,
                span: self.ast.span(id).expect("type decl has a span"),
            });
            return;
        }
        if visited.contains(&id) {
            return;
        }
        visited.insert(id);
        stack.insert(id);
        path.push(id);
        for parent in self.parents_of(id) {
            self.dfs_cycle(parent, visited, stack, path, errors);
        }
        path.pop();
        stack.remove(&id);
    }

    /// Validates the modifier-combination rules that apply purely to a
    /// single declaration, independent of its place in the hierarchy: class
    /// and interface modifiers, and every method/constructor's abstract,
    /// static, final, native, and visibility flags.
    fn check_modifiers(&self, classes: &[NodeID], interfaces: &[NodeID], errors: &mut Vec<SemaError>) {
        for &class in classes {
            let Some(AnyNode::ClassDecl(cd)) = self.ast.node(class).map(|n| &n.data) else { continue };
            Self::check_visibility(&cd.name, cd.modifiers, cd.span, errors);
            if cd.modifiers.contains(Modifiers::ABSTRACT) && cd.modifiers.contains(Modifiers::FINAL) {
                errors.push(SemaError::InvalidModifierCombination {
                    name: cd.name.clone(),
                    reason: "a class cannot be both abstract and final".to_string(),
                    span: cd.span,
                });
            }
            for &method in cd.methods.iter().chain(&cd.constructors) {
                self.check_method_modifiers(method, errors);
            }
            for &field in &cd.fields {
                let Some(AnyNode::FieldDecl(fd)) = self.ast.node(field).map(|n| &n.data) else { continue };
                Self::check_visibility(&fd.name, fd.modifiers, fd.span, errors);
            }
        }
        for &interface in interfaces {
            let Some(AnyNode::InterfaceDecl(ifc)) = self.ast.node(interface).map(|n| &n.data) else { continue };
            if !ifc.modifiers.contains(Modifiers::PUBLIC) || ifc.modifiers.contains(Modifiers::FINAL) {
                errors.push(SemaError::InvalidModifierCombination {
                    name: ifc.name.clone(),
                    reason: "an interface must be public and non-final".to_string(),
                    span: ifc.span,
                });
            }
            for &method in &ifc.methods {
                self.check_method_modifiers(method, errors);
            }
        }
    }

    fn check_method_modifiers(&self, method: NodeID, errors: &mut Vec<SemaError>) {
        let Some(AnyNode::MethodDecl(m)) = self.ast.node(method).map(|n| &n.data) else { return };
        Self::check_visibility(&m.name, m.modifiers, m.span, errors);
        let is_abstract = m.modifiers.contains(Modifiers::ABSTRACT);
        let is_native = m.modifiers.contains(Modifiers::NATIVE);
        let is_static = m.modifiers.contains(Modifiers::STATIC);
        let is_final = m.modifiers.contains(Modifiers::FINAL);

        if m.body.is_some() == (is_abstract || is_native) {
            errors.push(SemaError::InvalidModifierCombination {
                name: m.name.clone(),
                reason: "a method has a body if and only if it is neither abstract nor native".to_string(),
                span: m.span,
            });
        }
        if is_abstract && (is_static || is_final || is_native) {
            errors.push(SemaError::InvalidModifierCombination {
                name: m.name.clone(),
                reason: "an abstract method cannot also be static, final, or native".to_string(),
                span: m.span,
            });
        }
        if is_native && !is_static {
            errors.push(SemaError::InvalidModifierCombination {
                name: m.name.clone(),
                reason: "a native method must also be static".to_string(),
                span: m.span,
            });
        }
    }

    fn check_visibility(name: &str, modifiers: Modifiers, span: SourceRange, errors: &mut Vec<SemaError>) {
        if modifiers.contains(Modifiers::PUBLIC) == modifiers.contains(Modifiers::PROTECTED) {
            errors.push(SemaError::InvalidModifierCombination {
                name: name.to_string(),
                reason: "exactly one of `public` or `protected` is required".to_string(),
                span,
            });
        }
    }

    fn check_constructor(&self, class: NodeID, errors: &mut Vec<SemaError>) {
        let Some(AnyNode::ClassDecl(cd)) = self.ast.node(class).map(|n| &n.data) else { return };
        if cd.constructors.is_empty() {
            errors.push(SemaError::MissingConstructor { name: cd.name.clone(), span: cd.span });
        }
    }

    fn check_overrides(&self, class: NodeID, errors: &mut Vec<SemaError>) {
        let (class_name, methods, superclass) = {
            let Some(AnyNode::ClassDecl(cd)) = self.ast.node(class).map(|n| &n.data) else { return };
            (cd.name.clone(), cd.methods.clone(), cd.superclass)
        };
        let Some(superclass) = superclass else { return };

        for &method in &methods {
            let info = self.method_info(method);
            if info.is_constructor {
                continue;
            }
            let Some(parent_method) = self.find_matching_method(superclass, &info.name, &info.param_types)
            else {
                continue;
            };
            let parent_info = self.method_info(parent_method);
            let parent_name = self.class_name(superclass);

            if Self::visibility_rank(info.modifiers) < Self::visibility_rank(parent_info.modifiers) {
                errors.push(SemaError::OverrideNarrowsVisibility {
                    class: class_name.clone(),
                    method: info.name.clone(),
                    parent: parent_name.clone(),
                    span: info.span,
                });
            }
            if info.modifiers.contains(Modifiers::STATIC) != parent_info.modifiers.contains(Modifiers::STATIC) {
                errors.push(SemaError::OverrideChangesStaticness {
                    class: class_name.clone(),
                    method: info.name.clone(),
                    parent: parent_name.clone(),
                    span: info.span,
                });
            }
            if parent_info.modifiers.contains(Modifiers::FINAL) {
                errors.push(SemaError::OverrideOfFinalMethod {
                    class: class_name.clone(),
                    method: info.name.clone(),
                    parent: parent_name.clone(),
                    span: info.span,
                });
            }
            if !Self::return_types_match(self.ast, info.return_type, parent_info.return_type) {
                errors.push(SemaError::OverrideReturnTypeMismatch {
                    class: class_name.clone(),
                    method: info.name.clone(),
                    parent: parent_name.clone(),
                    span: info.span,
                });
            }
        }
    }

    /// Every abstract method reachable from `class` (via an abstract
    /// superclass or any implemented interface) that a concrete class must
    /// provide a body for. Duplicate requirements from more than one path
    /// to the same signature are reported once per path, not deduplicated:
    /// harmless since a class satisfying one occurrence satisfies all.
    fn collect_abstract_requirements(&self, class: NodeID) -> Vec<(MethodInfo, String)> {
        let mut out = Vec::new();
        for id in self.collect_reachable(class) {
            if id == class {
                continue;
            }
            match self.ast.node(id).map(|n| &n.data) {
                Some(AnyNode::InterfaceDecl(ifc)) => {
                    for &m in &ifc.methods {
                        out.push((self.method_info(m), ifc.name.clone()));
                    }
                }
                Some(AnyNode::ClassDecl(cd)) if cd.modifiers.contains(Modifiers::ABSTRACT) => {
                    for &m in &cd.methods {
                        let info = self.method_info(m);
                        if info.modifiers.contains(Modifiers::ABSTRACT) {
                            out.push((info, cd.name.clone()));
                        }
                    }
                }
                _ => {}
            }
        }
        out
    }

    fn check_abstract_coverage(&self, class: NodeID, errors: &mut Vec<SemaError>) {
        let (class_name, modifiers, span) = {
            let Some(AnyNode::ClassDecl(cd)) = self.ast.node(class).map(|n| &n.data) else { return };
            (cd.name.clone(), cd.modifiers, cd.span)
        };
        if modifiers.contains(Modifiers::ABSTRACT) {
            return;
        }
        for (requirement, source) in self.collect_abstract_requirements(class) {
            let implemented = self
                .find_matching_method(class, &requirement.name, &requirement.param_types)
                .is_some_and(|m| !self.method_info(m).modifiers.contains(Modifiers::ABSTRACT));
            if !implemented {
                errors.push(SemaError::MissingAbstractMethodImpl {
                    class: class_name.clone(),
                    method: requirement.name,
                    source,
                    span,
                });
            }
        }
    }

    fn check_interface_conflicts(&self, interface: NodeID, errors: &mut Vec<SemaError>) {
        let mut seen: Vec<(MethodInfo, String)> = Vec::new();
        for id in self.collect_reachable(interface) {
            let Some(AnyNode::InterfaceDecl(ifc)) = self.ast.node(id).map(|n| &n.data) else { continue };
            for &m in &ifc.methods {
                let info = self.method_info(m);
                let conflict = seen.iter().find(|(existing, _)| {
                    existing.name == info.name
                        && Self::param_types_match(self.ast, &existing.param_types, &info.param_types)
                });
                if let Some((existing, existing_owner)) = conflict {
                    if !Self::return_types_match(self.ast, existing.return_type, info.return_type) {
                        errors.push(SemaError::InterfaceMethodConflict {
                            method: info.name.clone(),
                            first: existing_owner.clone(),
                            second: ifc.name.clone(),
                            span: info.span,
                        });
                    }
                } else {
                    seen.push((info, ifc.name.clone()));
                }
            }
        }
    }

    fn collect_reachable(&self, start: NodeID) -> Vec<NodeID> {
        let mut out = Vec::new();
        let mut seen = FxHashSet::default();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            out.push(id);
            stack.extend(self.parents_of(id));
        }
        out
    }

    fn find_matching_method(&self, start_class: NodeID, name: &str, param_types: &[NodeID]) -> Option<NodeID> {
        let mut current = Some(start_class);
        while let Some(id) = current {
            let Some(AnyNode::ClassDecl(cd)) = self.ast.node(id).map(|n| &n.data) else { break };
            for &m in &cd.methods {
                let info = self.method_info(m);
                if info.name == name && Self::param_types_match(self.ast, &info.param_types, param_types) {
                    return Some(m);
                }
            }
            current = cd.superclass;
        }
        None
    }

    fn method_info(&self, method: NodeID) -> MethodInfo {
        let Some(AnyNode::MethodDecl(m)) = self.ast.node(method).map(|n| &n.data) else {
            panic!("method_info called on a non-method node")
        };
        let param_types = m
            .params
            .iter()
            .filter_map(|&p| match self.ast.node(p).map(|n| &n.data) {
                Some(AnyNode::VarDecl(v)) => Some(v.ty),
                _ => None,
            })
            .collect();
        MethodInfo {
            name: m.name.clone(),
            modifiers: m.modifiers,
            is_constructor: m.is_constructor,
            return_type: m.return_type,
            param_types,
            span: m.span,
        }
    }

    fn class_name(&self, class: NodeID) -> String {
        self.ast.simple_name(class).unwrap_or("<unknown>").to_string()
    }

    const fn visibility_rank(modifiers: Modifiers) -> u8 {
        if modifiers.contains(Modifiers::PUBLIC) {
            2
        } else if modifiers.contains(Modifiers::PROTECTED) {
            1
        } else {
            0
        }
    }

    fn param_types_match(ast: &Ast, a: &[NodeID], b: &[NodeID]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(&x, &y)| Self::type_equal(ast, x, y))
    }

    fn return_types_match(ast: &Ast, a: Option<NodeID>, b: Option<NodeID>) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(x), Some(y)) => Self::type_equal(ast, x, y),
            _ => false,
        }
    }

    /// Structural equality for the subset language's type nodes. Reference
    /// types compare by resolved declaration, not by spelling, so `Foo` and
    /// an imported `pkg.Foo` compare equal once the name resolver has run.
    fn type_equal(ast: &Ast, a: NodeID, b: NodeID) -> bool {
        let (Some(na), Some(nb)) = (ast.node(a), ast.node(b)) else { return false };
        match (&na.data, &nb.data) {
            (AnyNode::BuiltInTypeNode(x), AnyNode::BuiltInTypeNode(y)) => x.kind == y.kind,
            (AnyNode::ArrayTypeNode(x), AnyNode::ArrayTypeNode(y)) => Self::type_equal(ast, x.element, y.element),
            (AnyNode::ReferenceTypeNode(x), AnyNode::ReferenceTypeNode(y)) => {
                x.resolved.is_some() && x.resolved == y.resolved
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use joosc_ast::{BuiltIn, BuiltInTypeNode, FieldDecl, InterfaceDecl, MethodDecl};
    use joosc_source::{FileId, Position};

    use super::*;

    fn span() -> SourceRange {
        SourceRange::new(Position::start_of_file(), Position::start_of_file(), FileId::new(1))
    }

    fn builtin(ast: &mut Ast, kind: BuiltIn) -> NodeID {
        ast.alloc(AnyNode::BuiltInTypeNode(BuiltInTypeNode { id: NodeID::new(0, 0), span: span(), kind }))
    }

    fn method(
        ast: &mut Ast,
        name: &str,
        modifiers: Modifiers,
        is_constructor: bool,
        return_type: Option<NodeID>,
        body: Option<NodeID>,
    ) -> NodeID {
        ast.alloc(AnyNode::MethodDecl(MethodDecl {
            id: NodeID::new(0, 0),
            span: span(),
            name: name.to_string(),
            modifiers,
            is_constructor,
            return_type,
            params: Vec::new(),
            body,
        }))
    }

    fn empty_body(ast: &mut Ast) -> NodeID {
        ast.alloc(AnyNode::BlockStmt(joosc_ast::BlockStmt { id: NodeID::new(0, 0), span: span(), statements: Vec::new() }))
    }

    #[allow(clippy::too_many_arguments)]
    fn class(
        ast: &mut Ast,
        name: &str,
        modifiers: Modifiers,
        superclass: Option<NodeID>,
        interfaces: Vec<NodeID>,
        fields: Vec<NodeID>,
        methods: Vec<NodeID>,
        constructors: Vec<NodeID>,
    ) -> NodeID {
        ast.alloc(AnyNode::ClassDecl(joosc_ast::ClassDecl {
            id: NodeID::new(0, 0),
            span: span(),
            name: name.to_string(),
            canonical_name: None,
            modifiers,
            superclass,
            interfaces,
            fields,
            methods,
            constructors,
        }))
    }

    fn interface(ast: &mut Ast, name: &str, modifiers: Modifiers, extends: Vec<NodeID>, methods: Vec<NodeID>) -> NodeID {
        ast.alloc(AnyNode::InterfaceDecl(InterfaceDecl {
            id: NodeID::new(0, 0),
            span: span(),
            name: name.to_string(),
            canonical_name: None,
            modifiers,
            extends,
            methods,
        }))
    }

    fn basic_ctor(ast: &mut Ast) -> NodeID {
        let body = empty_body(ast);
        method(ast, "<init>", Modifiers::PUBLIC, true, None, Some(body))
    }

    #[test]
    fn two_classes_extending_each_other_report_a_cycle() {
        let mut ast = Ast::new();
        let a = class(&mut ast, "A", Modifiers::PUBLIC, None, vec![], vec![], vec![], vec![]);
        let b = class(&mut ast, "B", Modifiers::PUBLIC, Some(a), vec![], vec![], vec![], vec![]);
        if let Some(AnyNode::ClassDecl(cd)) = ast.node_mut(a).map(|n| &mut n.data) {
            cd.superclass = Some(b);
        }

        let checker = HierarchyChecker::new(&ast);
        let err = checker.check_all(&[a, b], &[]).unwrap_err();
        assert!(err.iter().any(|e| matches!(e, SemaError::CyclicInheritance { .. })));
    }

    #[test]
    fn class_without_a_constructor_is_rejected() {
        let mut ast = Ast::new();
        let a = class(&mut ast, "A", Modifiers::PUBLIC, None, vec![], vec![], vec![], vec![]);

        let checker = HierarchyChecker::new(&ast);
        let err = checker.check_all(&[a], &[]).unwrap_err();
        assert!(err.iter().any(|e| matches!(e, SemaError::MissingConstructor { .. })));
    }

    #[test]
    fn override_narrowing_visibility_is_rejected() {
        let mut ast = Ast::new();
        let parent_body = empty_body(&mut ast);
        let parent_method = method(&mut ast, "f", Modifiers::PUBLIC, false, None, Some(parent_body));
        let ctor_a = basic_ctor(&mut ast);
        let a = class(&mut ast, "A", Modifiers::ABSTRACT | Modifiers::PUBLIC, None, vec![], vec![], vec![parent_method], vec![ctor_a]);

        let child_body = empty_body(&mut ast);
        let child_method = method(&mut ast, "f", Modifiers::PROTECTED, false, None, Some(child_body));
        let ctor_b = basic_ctor(&mut ast);
        let b = class(&mut ast, "B", Modifiers::PUBLIC, Some(a), vec![], vec![], vec![child_method], vec![ctor_b]);

        let checker = HierarchyChecker::new(&ast);
        let err = checker.check_all(&[a, b], &[]).unwrap_err();
        assert!(err.iter().any(|e| matches!(e, SemaError::OverrideNarrowsVisibility { .. })));
    }

    #[test]
    fn concrete_class_missing_an_abstract_override_is_rejected() {
        let mut ast = Ast::new();
        let abstract_method = method(&mut ast, "f", Modifiers::PUBLIC | Modifiers::ABSTRACT, false, None, None);
        let ctor_a = basic_ctor(&mut ast);
        let a = class(
            &mut ast,
            "A",
            Modifiers::ABSTRACT | Modifiers::PUBLIC,
            None,
            vec![],
            vec![],
            vec![abstract_method],
            vec![ctor_a],
        );
        let ctor_b = basic_ctor(&mut ast);
        let b = class(&mut ast, "B", Modifiers::PUBLIC, Some(a), vec![], vec![], vec![], vec![ctor_b]);

        let checker = HierarchyChecker::new(&ast);
        let err = checker.check_all(&[a, b], &[]).unwrap_err();
        assert!(err.iter().any(|e| matches!(e, SemaError::MissingAbstractMethodImpl { .. })));
    }

    #[test]
    fn conflicting_interface_methods_are_rejected() {
        let mut ast = Ast::new();
        let int_ty = builtin(&mut ast, BuiltIn::Int);
        let bool_ty = builtin(&mut ast, BuiltIn::Boolean);
        let m1 = method(&mut ast, "f", Modifiers::PUBLIC | Modifiers::ABSTRACT, false, Some(int_ty), None);
        let i1 = interface(&mut ast, "I1", Modifiers::PUBLIC, vec![], vec![m1]);
        let m2 = method(&mut ast, "f", Modifiers::PUBLIC | Modifiers::ABSTRACT, false, Some(bool_ty), None);
        let i2 = interface(&mut ast, "I2", Modifiers::PUBLIC, vec![], vec![m2]);
        let i3 = interface(&mut ast, "I3", Modifiers::PUBLIC, vec![i1, i2], vec![]);

        let checker = HierarchyChecker::new(&ast);
        let err = checker.check_all(&[], &[i1, i2, i3]).unwrap_err();
        assert!(err.iter().any(|e| matches!(e, SemaError::InterfaceMethodConflict { .. })));
    }

    #[test]
    fn abstract_and_final_class_is_rejected() {
        let mut ast = Ast::new();
        let ctor = basic_ctor(&mut ast);
        let a = class(&mut ast, "A", Modifiers::PUBLIC | Modifiers::ABSTRACT | Modifiers::FINAL, None, vec![], vec![], vec![], vec![ctor]);

        let checker = HierarchyChecker::new(&ast);
        let err = checker.check_all(&[a], &[]).unwrap_err();
        assert!(err.iter().any(|e| matches!(e, SemaError::InvalidModifierCombination { .. })));
    }

    #[test]
    fn native_method_without_static_is_rejected() {
        let mut ast = Ast::new();
        let native_method = method(&mut ast, "f", Modifiers::PUBLIC | Modifiers::NATIVE, false, None, None);
        let ctor = basic_ctor(&mut ast);
        let a = class(&mut ast, "A", Modifiers::PUBLIC, None, vec![], vec![], vec![native_method], vec![ctor]);

        let checker = HierarchyChecker::new(&ast);
        let err = checker.check_all(&[a], &[]).unwrap_err();
        assert!(err.iter().any(|e| matches!(e, SemaError::InvalidModifierCombination { .. })));
    }

    #[test]
    fn package_private_field_with_neither_public_nor_protected_is_rejected() {
        let mut ast = Ast::new();
        let int_ty = builtin(&mut ast, BuiltIn::Int);
        let f = ast.alloc(AnyNode::FieldDecl(FieldDecl {
            id: NodeID::new(0, 0),
            span: span(),
            name: "x".to_string(),
            modifiers: Modifiers::empty(),
            ty: int_ty,
        }));
        let ctor = basic_ctor(&mut ast);
        let a = class(&mut ast, "A", Modifiers::PUBLIC, None, vec![], vec![f], vec![], vec![ctor]);

        let checker = HierarchyChecker::new(&ast);
        let err = checker.check_all(&[a], &[]).unwrap_err();
        assert!(err.iter().any(|e| matches!(e, SemaError::InvalidModifierCombination { .. })));
    }
}
