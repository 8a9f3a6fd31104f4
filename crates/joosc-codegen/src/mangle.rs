//! Name mangling (§4.10): encodes a method, constructor, or static field's
//! canonical class, simple name, and signature into a linker-safe symbol, so
//! overloaded methods and same-named fields across classes never collide.
//!
//! # Mangling Scheme
//!
//! ```text
//! _JF            prefix
//! C              present iff the member is an instance member
//! <canonical>    the declaring class's canonical name, mangled
//! <name>         the member's simple name, mangled the same way
//! <return>       return type, or 'v' for void/constructors
//! <params>...    each parameter type, in order
//! ```
//!
//! A canonical name mangles as one `<len><chunk>` pair per dot-separated
//! segment, the whole run closed by a single `E`. A type mangles as one of:
//!
//! | type               | encoding        |
//! |---------------------|-----------------|
//! | `boolean`            | `B`             |
//! | `byte`               | `b`             |
//! | `char`               | `c`             |
//! | `short`              | `s`             |
//! | `int`                | `i`             |
//! | `java.lang.String`   | `S`             |
//! | `java.lang.Object`   | `O`             |
//! | other reference type | `R<canonical>`  |
//! | `T[]`                | `A<T>`          |
//!
//! For example, `static int Foo.bar(int, String)` mangles to
//! `_JF3FooE3barEiiS`.

use joosc_ast::{AnyNode, Ast, BuiltIn, Modifiers, NodeID};

use crate::error::{CodegenError, MangleError};

const JAVA_LANG_STRING: &str = "java.lang.String";
const JAVA_LANG_OBJECT: &str = "java.lang.Object";

/// Stateless: every mangled name is a pure function of the declaration it
/// names, so one instance is shared across the whole declaration phase.
#[derive(Debug, Default)]
pub struct Mangler;

impl Mangler {
    #[must_use]
    pub fn new() -> Self { Self }

    /// Mangles a method or constructor declaration's symbol name.
    pub fn mangle_function(&self, ast: &Ast, class: NodeID, method: NodeID) -> Result<String, CodegenError> {
        let AnyNode::MethodDecl(m) = &ast.node(method).ok_or(CodegenError::UnlowerableType)?.data else {
            return Err(CodegenError::UnlowerableType);
        };
        let class_name = Self::canonical_name_of(ast, class)?;

        let mut out = String::from("_JF");
        if !m.modifiers.contains(Modifiers::STATIC) {
            out.push('C');
        }
        Self::write_canonical_name(&mut out, &class_name);
        Self::write_canonical_name(&mut out, &m.name);

        match m.return_type {
            Some(rt) => out.push_str(&self.mangle_type(ast, rt)?),
            None => out.push('v'),
        }
        for &param in &m.params {
            let AnyNode::VarDecl(v) = &ast.node(param).ok_or(CodegenError::UnlowerableType)?.data else {
                return Err(CodegenError::UnlowerableType);
            };
            out.push_str(&self.mangle_type(ast, v.ty)?);
        }
        Ok(out)
    }

    /// Mangles a static field's global symbol name.
    pub fn mangle_field(&self, ast: &Ast, class: NodeID, field: NodeID) -> Result<String, CodegenError> {
        let AnyNode::FieldDecl(fd) = &ast.node(field).ok_or(CodegenError::UnlowerableType)?.data else {
            return Err(CodegenError::UnlowerableType);
        };
        let class_name = Self::canonical_name_of(ast, class)?;

        let mut out = String::from("_JF");
        Self::write_canonical_name(&mut out, &class_name);
        Self::write_canonical_name(&mut out, &fd.name);
        out.push_str(&self.mangle_type(ast, fd.ty)?);
        Ok(out)
    }

    fn mangle_type(&self, ast: &Ast, ty: NodeID) -> Result<String, CodegenError> {
        match &ast.node(ty).ok_or(CodegenError::UnlowerableType)?.data {
            AnyNode::BuiltInTypeNode(n) => Ok(match n.kind {
                BuiltIn::Boolean => "B".to_string(),
                BuiltIn::Byte => "b".to_string(),
                BuiltIn::Char => "c".to_string(),
                BuiltIn::Short => "s".to_string(),
                BuiltIn::Int => "i".to_string(),
                BuiltIn::String => "S".to_string(),
                kind @ (BuiltIn::Void | BuiltIn::None) => {
                    return Err(CodegenError::Mangle(MangleError::UnsupportedBuiltIn { kind }));
                }
            }),
            AnyNode::ArrayTypeNode(n) => Ok(format!("A{}", self.mangle_type(ast, n.element)?)),
            AnyNode::ReferenceTypeNode(n) => {
                let target = n.resolved.ok_or(CodegenError::UnlowerableType)?;
                let name = Self::canonical_name_of(ast, target)?;
                Ok(match name.as_str() {
                    JAVA_LANG_STRING => "S".to_string(),
                    JAVA_LANG_OBJECT => "O".to_string(),
                    _ => {
                        let mut out = String::from("R");
                        Self::write_canonical_name(&mut out, &name);
                        out
                    }
                })
            }
            _ => Err(CodegenError::UnlowerableType),
        }
    }

    fn canonical_name_of(ast: &Ast, decl: NodeID) -> Result<String, CodegenError> {
        match &ast.node(decl).ok_or(CodegenError::UnlowerableType)?.data {
            AnyNode::ClassDecl(cd) => Ok(cd.canonical_name.clone().unwrap_or_else(|| cd.name.clone())),
            AnyNode::InterfaceDecl(id) => Ok(id.canonical_name.clone().unwrap_or_else(|| id.name.clone())),
            _ => Err(CodegenError::UnlowerableType),
        }
    }

    fn write_canonical_name(out: &mut String, name: &str) {
        for segment in name.split('.') {
            out.push_str(&segment.len().to_string());
            out.push_str(segment);
        }
        out.push('E');
    }
}

#[cfg(test)]
mod tests {
    use joosc_ast::{AnyNode, Ast, BuiltIn, Modifiers, NodeID};

    use super::Mangler;

    #[test]
    fn writes_single_segment_canonical_names() {
        let mut out = String::new();
        Mangler::write_canonical_name(&mut out, "Foo");
        assert_eq!(out, "3FooE");
    }

    #[test]
    fn writes_dotted_canonical_names() {
        let mut out = String::new();
        Mangler::write_canonical_name(&mut out, "pkg.Foo");
        assert_eq!(out, "3pkg3FooE");
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum TypeSpec {
        Prim(BuiltIn),
        Array(Box<TypeSpec>),
    }

    fn type_spec() -> impl proptest::strategy::Strategy<Value = TypeSpec> {
        use proptest::prelude::*;
        let leaf = prop_oneof![
            Just(BuiltIn::Boolean),
            Just(BuiltIn::Byte),
            Just(BuiltIn::Char),
            Just(BuiltIn::Short),
            Just(BuiltIn::Int),
            Just(BuiltIn::String),
        ]
        .prop_map(TypeSpec::Prim);
        leaf.prop_recursive(2, 4, 1, |inner| inner.prop_map(|t| TypeSpec::Array(Box::new(t))))
    }

    fn build_type(ast: &mut Ast, spec: &TypeSpec) -> NodeID {
        match spec {
            TypeSpec::Prim(kind) => {
                ast.alloc(AnyNode::BuiltInTypeNode(joosc_ast::BuiltInTypeNode { id: NodeID::new(0, 0), span: span(), kind: *kind }))
            }
            TypeSpec::Array(inner) => {
                let element = build_type(ast, inner);
                ast.alloc(AnyNode::ArrayTypeNode(joosc_ast::ArrayTypeNode { id: NodeID::new(0, 0), span: span(), element }))
            }
        }
    }

    fn span() -> joosc_source::SourceRange {
        joosc_source::SourceRange::new(
            joosc_source::Position::start_of_file(),
            joosc_source::Position::start_of_file(),
            joosc_source::FileId::new(1),
        )
    }

    /// Builds a throwaway class with one method matching `name`/`is_static`/
    /// `ret`/`params` and returns its mangled symbol.
    fn mangle_of(
        class_name: &str,
        name: &str,
        is_static: bool,
        ret: &Option<TypeSpec>,
        params: &[TypeSpec],
    ) -> String {
        let mut ast = Ast::new();
        let return_type = ret.as_ref().map(|spec| build_type(&mut ast, spec));
        let param_ids: Vec<NodeID> = params
            .iter()
            .map(|spec| {
                let ty = build_type(&mut ast, spec);
                ast.alloc(AnyNode::VarDecl(joosc_ast::VarDecl {
                    id: NodeID::new(0, 0),
                    span: span(),
                    name: "p".to_string(),
                    ty,
                    is_parameter: true,
                    initializer: None,
                }))
            })
            .collect();
        let modifiers = if is_static { Modifiers::STATIC | Modifiers::PUBLIC } else { Modifiers::PUBLIC };
        let method = ast.alloc(AnyNode::MethodDecl(joosc_ast::MethodDecl {
            id: NodeID::new(0, 0),
            span: span(),
            name: name.to_string(),
            modifiers,
            is_constructor: false,
            return_type,
            params: param_ids,
            body: None,
        }));
        let class = ast.alloc(AnyNode::ClassDecl(joosc_ast::ClassDecl {
            id: NodeID::new(0, 0),
            span: span(),
            name: class_name.to_string(),
            canonical_name: None,
            modifiers: Modifiers::PUBLIC,
            superclass: None,
            interfaces: vec![],
            fields: vec![],
            methods: vec![method],
            constructors: vec![],
        }));
        Mangler::new().mangle_function(&ast, class, method).expect("fixture type is always mangleable")
    }

    proptest::proptest! {
        /// Two signatures that differ in declaring class, method name,
        /// static-ness, return type, or any parameter type must mangle to
        /// distinct symbols.
        #[test]
        fn distinct_signatures_mangle_to_distinct_symbols(
            class_a in "[A-Z][a-zA-Z0-9]{0,4}",
            class_b in "[A-Z][a-zA-Z0-9]{0,4}",
            name_a in "[a-z][a-zA-Z0-9]{0,4}",
            name_b in "[a-z][a-zA-Z0-9]{0,4}",
            static_a in proptest::bool::ANY,
            static_b in proptest::bool::ANY,
            ret_a in proptest::option::of(type_spec()),
            ret_b in proptest::option::of(type_spec()),
            params_a in proptest::collection::vec(type_spec(), 0..3),
            params_b in proptest::collection::vec(type_spec(), 0..3),
        ) {
            let sig_a = (&class_a, &name_a, static_a, &ret_a, &params_a);
            let sig_b = (&class_b, &name_b, static_b, &ret_b, &params_b);
            proptest::prop_assume!(sig_a != sig_b);

            let mangled_a = mangle_of(&class_a, &name_a, static_a, &ret_a, &params_a);
            let mangled_b = mangle_of(&class_b, &name_b, static_b, &ret_b, &params_b);
            proptest::prop_assert_ne!(mangled_a, mangled_b);
        }
    }
}
