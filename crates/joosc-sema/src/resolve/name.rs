//! Name resolution (C5): the global package tree, import resolution per JLS
//! 6.5.2, and writing resolved declarations onto `ReferenceType` nodes.

use joosc_ast::{AnyNode, Ast, NodeID};

use crate::error::SemaError;
use crate::resolve::package::{PackageTree, PkgId, PkgMember};

/// What an import or qualified name resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportResolution {
    Decl(NodeID),
    Package(PkgId),
    Ambiguous,
    NotFound,
}

/// Cached `java.lang.Object`/`java.lang.String` handles, resolved lazily on
/// first use since not every compilation references them.
#[derive(Debug, Default, Clone, Copy)]
struct JavaLang {
    object: Option<NodeID>,
    string: Option<NodeID>,
}

#[derive(Debug, Default)]
pub struct NameResolver {
    packages: PackageTree,
    java_lang: JavaLang,
}

impl NameResolver {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Registers the top-level type of every compilation unit in the package
    /// tree. Must run before any `GetImport`/`GetTypeAsClass` call.
    ///
    /// ## Errors
    ///
    /// Returns one [`SemaError::UnresolvedName`] per compilation unit whose
    /// top-level type name collides with another already declared in the
    /// same package.
    pub fn collect_top_level_types(&mut self, ast: &Ast) -> Result<(), Vec<SemaError>> {
        let mut errors = Vec::new();
        for &root in ast.roots() {
            let Some(node) = ast.node(root) else { continue };
            let AnyNode::CompilationUnit(cu) = &node.data else { continue };
            let Some(simple_name) = ast.simple_name(cu.body) else { continue };
            let span = ast.span(cu.body).unwrap_or(cu.span);
            if !self.packages.declare_type(&cu.package, simple_name, cu.body) {
                errors.push(SemaError::UnresolvedName {
                    name: format!("{}.{simple_name}", cu.package.join(".")),
                    span,
                });
            }
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Resolves `name` in `cu`'s imported scope, following JLS 6.5.2 order:
    /// the compilation unit's own type, single-type imports, other types in
    /// the same package, then type-import-on-demand declarations.
    #[must_use]
    pub fn get_import(&self, ast: &Ast, cu: &joosc_ast::CompilationUnit, name: &str) -> ImportResolution {
        let resolution = self.get_import_uncached(ast, cu, name);
        log::trace!("import lookup for `{name}` in package `{}` resolved to {resolution:?}", cu.package.join("."));
        resolution
    }

    fn get_import_uncached(&self, ast: &Ast, cu: &joosc_ast::CompilationUnit, name: &str) -> ImportResolution {
        if ast.simple_name(cu.body) == Some(name) {
            return ImportResolution::Decl(cu.body);
        }

        for import in cu.imports.iter().filter(|i| !i.on_demand) {
            if import.path.last().map(String::as_str) == Some(name) {
                if let Some(decl) = self.packages.resolve_path(&import.path) {
                    return ImportResolution::Decl(decl);
                }
            }
        }

        if let Some(pkg) = self.packages.find_package(&cu.package)
            && let Some(member) = self.packages.lookup(pkg, name)
        {
            return Self::member_to_resolution(member);
        }

        let mut found: Option<NodeID> = None;
        for import in cu.imports.iter().filter(|i| i.on_demand) {
            let Some(pkg) = self.packages.find_package(&import.path) else { continue };
            if let Some(PkgMember::Type(decl)) = self.packages.lookup(pkg, name) {
                if found.is_some_and(|existing| existing != decl) {
                    return ImportResolution::Ambiguous;
                }
                found = Some(decl);
            }
        }
        match found {
            Some(decl) => ImportResolution::Decl(decl),
            None => ImportResolution::NotFound,
        }
    }

    fn member_to_resolution(member: PkgMember) -> ImportResolution {
        match member {
            PkgMember::Type(decl) => ImportResolution::Decl(decl),
            PkgMember::Package(id) => ImportResolution::Package(id),
        }
    }

    /// Returns the `ClassDecl`/`InterfaceDecl` a reference or array-of-reference
    /// type ultimately refers to, or `None` for primitives and unresolved types.
    #[must_use]
    pub fn get_type_as_class(ast: &Ast, ty: NodeID) -> Option<NodeID> {
        match &ast.node(ty)?.data {
            AnyNode::ArrayTypeNode(n) => Self::get_type_as_class(ast, n.element),
            AnyNode::ReferenceTypeNode(n) => n.resolved,
            _ => None,
        }
    }

    /// Cached handles for the built-in `Object` and `String` declarations.
    /// Returns `None` for either if the compilation did not include the
    /// corresponding standard-library source.
    pub fn get_java_lang(&mut self) -> (Option<NodeID>, Option<NodeID>) {
        if self.java_lang.object.is_none() {
            self.java_lang.object =
                self.packages.resolve_path(&["java".into(), "lang".into(), "Object".into()]);
        }
        if self.java_lang.string.is_none() {
            self.java_lang.string =
                self.packages.resolve_path(&["java".into(), "lang".into(), "String".into()]);
        }
        (self.java_lang.object, self.java_lang.string)
    }

    /// Looks up a dotted path through packages only, returning whatever the
    /// last segment names (a nested package or a type). Used by the
    /// expression resolver to extend a `PackageName` chain by one segment.
    #[must_use]
    pub fn resolve_package_path(&self, path: &[String]) -> Option<PkgMember> {
        let (last, prefix) = path.split_last()?;
        let pkg = self.packages.find_package(prefix)?;
        self.packages.lookup(pkg, last)
    }

    /// Writes `decl` onto `ty`'s `resolved` slot, or records an
    /// [`SemaError::UnresolvedName`] at `ty`'s span if resolution failed.
    pub fn bind_reference_type(
        ast: &mut Ast,
        ty: NodeID,
        resolution: ImportResolution,
        path: &[String],
    ) -> Result<(), SemaError> {
        let span = ast.span(ty).expect("reference type node exists");
        let decl = match resolution {
            ImportResolution::Decl(decl) => decl,
            ImportResolution::Ambiguous => {
                return Err(SemaError::AmbiguousImport { name: path.join("."), span });
            }
            ImportResolution::Package(_) | ImportResolution::NotFound => {
                return Err(SemaError::UnresolvedName { name: path.join("."), span });
            }
        };
        if let Some(node) = ast.node_mut(ty)
            && let AnyNode::ReferenceTypeNode(n) = &mut node.data
        {
            n.resolved = Some(decl);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use joosc_ast::{ClassDecl, Import, Modifiers};
    use joosc_source::{FileId, Position, SourceRange};

    use super::*;

    fn span() -> SourceRange {
        SourceRange::new(Position::start_of_file(), Position::start_of_file(), FileId::new(1))
    }

    fn class(ast: &mut Ast, name: &str) -> NodeID {
        ast.alloc(AnyNode::ClassDecl(ClassDecl {
            id: NodeID::new(0, 0),
            span: span(),
            name: name.to_string(),
            canonical_name: None,
            modifiers: Modifiers::PUBLIC,
            superclass: None,
            interfaces: vec![],
            fields: vec![],
            methods: vec![],
            constructors: vec![],
        }))
    }

    fn cu(body: NodeID, package: Vec<String>, imports: Vec<Import>) -> joosc_ast::CompilationUnit {
        joosc_ast::CompilationUnit { id: NodeID::new(0, 0), span: span(), package, imports, body }
    }

    #[test]
    fn own_top_level_type_resolves_to_itself() {
        let mut ast = Ast::new();
        let decl = class(&mut ast, "Main");
        let cu = cu(decl, vec![], vec![]);
        let mut resolver = NameResolver::new();
        resolver.collect_top_level_types(&ast).unwrap();

        assert_eq!(resolver.get_import(&ast, &cu, "Main"), ImportResolution::Decl(decl));
    }

    #[test]
    fn single_type_import_resolves_by_last_segment() {
        let mut ast = Ast::new();
        let helper = class(&mut ast, "Helper");
        let main = class(&mut ast, "Main");
        let mut resolver = NameResolver::new();
        resolver.packages.declare_type(&["util".into()], "Helper", helper);
        resolver.packages.declare_type(&[], "Main", main);

        let cu = cu(main, vec![], vec![Import { path: vec!["util".into(), "Helper".into()], on_demand: false }]);
        assert_eq!(resolver.get_import(&ast, &cu, "Helper"), ImportResolution::Decl(helper));
    }

    #[test]
    fn ambiguous_on_demand_imports_report_ambiguous() {
        let mut ast = Ast::new();
        let helper_a = class(&mut ast, "Helper");
        let helper_b = class(&mut ast, "Helper");
        let main = class(&mut ast, "Main");

        let mut resolver = NameResolver::new();
        resolver.packages.declare_type(&["a".into()], "Helper", helper_a);
        resolver.packages.declare_type(&["b".into()], "Helper", helper_b);
        resolver.packages.declare_type(&[], "Main", main);

        let cu = cu(
            main,
            vec![],
            vec![
                Import { path: vec!["a".into()], on_demand: true },
                Import { path: vec!["b".into()], on_demand: true },
            ],
        );
        assert_eq!(resolver.get_import(&ast, &cu, "Helper"), ImportResolution::Ambiguous);
    }

    #[test]
    fn unimported_name_is_not_found() {
        let mut ast = Ast::new();
        let main = class(&mut ast, "Main");
        let mut resolver = NameResolver::new();
        resolver.packages.declare_type(&[], "Main", main);
        let cu = cu(main, vec![], vec![]);

        assert_eq!(resolver.get_import(&ast, &cu, "Nonexistent"), ImportResolution::NotFound);
    }
}
