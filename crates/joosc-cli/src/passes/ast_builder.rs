//! A minimal, hand-built front end standing in for the grammar-driven parser
//! this core does not provide: constructs the worked-example compilation
//! units the driver compiles, directly as an [`joosc_ast::Ast`], the same way
//! every inline test elsewhere in this workspace builds a tree by hand.
//!
//! Stores its `Ast` behind a `RefCell` for the same reason `joosc_arena::Heap`
//! takes `&self` on every allocator: later passes only ever get `&AstBuilderPass`
//! back out of [`joosc_pass::RunContext::get_pass`], never `&mut`, but still
//! need to write resolved names and canonical class names onto this tree.

use std::cell::{Ref, RefCell, RefMut};

use joosc_ast::{
    AnyNode, Ast, BinOp, BinaryOpNode, BlockStmt, BuiltIn, BuiltInTypeNode, ClassDecl, CompilationUnit,
    ExprNodeList, FieldDecl, LiteralNode, LiteralValue, MemberName, MethodDecl, MethodInvocationNode,
    MethodNameNode, Modifiers, NameResolution, NodeID, NullStmt, ReferenceTypeNode, ReturnStmt, ThisNode,
    VarDecl,
};
use joosc_pass::{Pass, PassError, RunContext};
use joosc_source::{FileId, Position, SourceRange};

fn span() -> SourceRange {
    SourceRange::new(Position::start_of_file(), Position::start_of_file(), FileId::new(1))
}

/// Allocates a placeholder node to get a real handle, then overwrites it in
/// place. Only type nodes need this: `joosc-codegen` reads a
/// `BuiltInTypeNode`/`ReferenceTypeNode`'s own `id` field back as the value
/// a `new`/cast expression carries, so that field must equal the handle the
/// arena actually assigned, not an inert placeholder.
fn alloc_placeholder(ast: &mut Ast) -> NodeID {
    ast.alloc(AnyNode::NullStmt(NullStmt { id: NodeID::new(0, 0), span: span() }))
}

fn builtin_type(ast: &mut Ast, kind: BuiltIn) -> NodeID {
    let id = alloc_placeholder(ast);
    if let Some(node) = ast.node_mut(id) {
        node.data = AnyNode::BuiltInTypeNode(BuiltInTypeNode { id, span: span(), kind });
    }
    id
}

fn reference_type(ast: &mut Ast, path: Vec<String>) -> NodeID {
    let id = alloc_placeholder(ast);
    if let Some(node) = ast.node_mut(id) {
        node.data = AnyNode::ReferenceTypeNode(ReferenceTypeNode { id, span: span(), path, resolved: None });
    }
    id
}

fn var(ast: &mut Ast, name: &str, ty: NodeID, is_parameter: bool) -> NodeID {
    ast.alloc(AnyNode::VarDecl(VarDecl {
        id: NodeID::new(0, 0),
        span: span(),
        name: name.to_string(),
        ty,
        is_parameter,
        initializer: None,
    }))
}

fn field(ast: &mut Ast, name: &str, modifiers: Modifiers, ty: NodeID) -> NodeID {
    ast.alloc(AnyNode::FieldDecl(FieldDecl { id: NodeID::new(0, 0), span: span(), name: name.to_string(), modifiers, ty }))
}

fn this_node(ast: &mut Ast) -> NodeID { ast.alloc(AnyNode::ThisNode(ThisNode { id: NodeID::new(0, 0), span: span() })) }

fn member_name(ast: &mut Ast, name: &str, prev: Option<NodeID>) -> NodeID {
    ast.alloc(AnyNode::MemberName(MemberName {
        id: NodeID::new(0, 0),
        span: span(),
        name: name.to_string(),
        prev,
        resolution: NameResolution::Unresolved,
    }))
}

fn method_name(ast: &mut Ast, name: &str, prev: Option<NodeID>) -> NodeID {
    ast.alloc(AnyNode::MethodNameNode(MethodNameNode {
        id: NodeID::new(0, 0),
        span: span(),
        name: name.to_string(),
        prev,
        resolution: NameResolution::Unresolved,
    }))
}

fn int_lit(ast: &mut Ast, v: i32) -> NodeID {
    ast.alloc(AnyNode::LiteralNode(LiteralNode { id: NodeID::new(0, 0), span: span(), value: LiteralValue::Int(v) }))
}

fn bin_op(ast: &mut Ast, op: BinOp) -> NodeID {
    ast.alloc(AnyNode::BinaryOpNode(BinaryOpNode { id: NodeID::new(0, 0), span: span(), op }))
}

fn method_invocation(ast: &mut Ast, nargs: u32) -> NodeID {
    ast.alloc(AnyNode::MethodInvocationNode(MethodInvocationNode { id: NodeID::new(0, 0), span: span(), nargs }))
}

fn return_stmt(ast: &mut Ast, value: Option<NodeID>) -> NodeID {
    ast.alloc(AnyNode::ReturnStmt(ReturnStmt { id: NodeID::new(0, 0), span: span(), value }))
}

fn block(ast: &mut Ast, statements: Vec<NodeID>) -> NodeID {
    ast.alloc(AnyNode::BlockStmt(BlockStmt { id: NodeID::new(0, 0), span: span(), statements }))
}

#[allow(clippy::too_many_arguments)]
fn method_decl(
    ast: &mut Ast,
    name: &str,
    modifiers: Modifiers,
    is_constructor: bool,
    return_type: Option<NodeID>,
    params: Vec<NodeID>,
    body: Option<NodeID>,
) -> NodeID {
    ast.alloc(AnyNode::MethodDecl(MethodDecl {
        id: NodeID::new(0, 0),
        span: span(),
        name: name.to_string(),
        modifiers,
        is_constructor,
        return_type,
        params,
        body,
    }))
}

/// Constructs the worked-example compilation units and exposes the shared
/// tree to every pass downstream of it.
pub struct AstBuilderPass {
    ast: RefCell<Ast>,
    roots: Vec<NodeID>,
    classes: Vec<NodeID>,
    interfaces: Vec<NodeID>,
    /// `ReferenceTypeNode`s this builder left unresolved, paired with the
    /// dotted path they name and the compilation unit they appear in, so the
    /// name-resolution pass can drive the real resolver over exactly these
    /// instead of walking the whole tree looking for them.
    reference_types: Vec<(NodeID, Vec<String>, NodeID)>,
}

impl Default for AstBuilderPass {
    fn default() -> Self {
        Self { ast: RefCell::new(Ast::new()), roots: Vec::new(), classes: Vec::new(), interfaces: Vec::new(), reference_types: Vec::new() }
    }
}

impl AstBuilderPass {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn ast(&self) -> Ref<'_, Ast> { self.ast.borrow() }

    pub fn ast_mut(&self) -> RefMut<'_, Ast> { self.ast.borrow_mut() }

    #[must_use]
    pub fn roots(&self) -> &[NodeID] { &self.roots }

    #[must_use]
    pub fn classes(&self) -> &[NodeID] { &self.classes }

    #[must_use]
    pub fn interfaces(&self) -> &[NodeID] { &self.interfaces }

    #[must_use]
    pub fn reference_types(&self) -> &[(NodeID, Vec<String>, NodeID)] { &self.reference_types }

    fn build(&mut self) {
        let mut ast = Ast::new();
        let package = vec!["org".to_string(), "example".to_string(), "joos1w".to_string()];

        let my_class_id = alloc_placeholder(&mut ast);

        let my_field_ty = builtin_type(&mut ast, BuiltIn::Int);
        let my_field = field(&mut ast, "myField", Modifiers::PUBLIC, my_field_ty);
        let counter_ty = builtin_type(&mut ast, BuiltIn::Int);
        let counter = field(&mut ast, "counter", Modifiers::PUBLIC.union(Modifiers::STATIC), counter_ty);
        let next_ty = reference_type(&mut ast, vec!["MyClass".to_string()]);
        let next = field(&mut ast, "next", Modifiers::PUBLIC, next_ty);

        let ctor_body = block(&mut ast, vec![]);
        let ctor = method_decl(&mut ast, "MyClass", Modifiers::PUBLIC, true, None, vec![], Some(ctor_body));

        // public static int add(int a, int b) { return a + b; }
        let a_ty = builtin_type(&mut ast, BuiltIn::Int);
        let a = var(&mut ast, "a", a_ty, true);
        let b_ty = builtin_type(&mut ast, BuiltIn::Int);
        let b = var(&mut ast, "b", b_ty, true);
        let member_a = member_name(&mut ast, "a", None);
        let member_b = member_name(&mut ast, "b", None);
        let add_op = bin_op(&mut ast, BinOp::Add);
        let add_expr = ast.register_expr_list(ExprNodeList::new(vec![member_a, member_b, add_op]));
        let add_return = return_stmt(&mut ast, Some(add_expr));
        let add_body = block(&mut ast, vec![add_return]);
        let add_return_ty = builtin_type(&mut ast, BuiltIn::Int);
        let add =
            method_decl(&mut ast, "add", Modifiers::PUBLIC.union(Modifiers::STATIC), false, Some(add_return_ty), vec![a, b], Some(add_body));

        // public int getField() { return this.myField; }
        let this1 = this_node(&mut ast);
        let field_access = member_name(&mut ast, "myField", Some(this1));
        let get_field_expr = ast.register_expr_list(ExprNodeList::new(vec![field_access]));
        let get_field_return = return_stmt(&mut ast, Some(get_field_expr));
        let get_field_body = block(&mut ast, vec![get_field_return]);
        let get_field_return_ty = builtin_type(&mut ast, BuiltIn::Int);
        let get_field =
            method_decl(&mut ast, "getField", Modifiers::PUBLIC, false, Some(get_field_return_ty), vec![], Some(get_field_body));

        // public MyClass chain() { return this.next; }
        let this2 = this_node(&mut ast);
        let next_access = member_name(&mut ast, "next", Some(this2));
        let chain_expr = ast.register_expr_list(ExprNodeList::new(vec![next_access]));
        let chain_return = return_stmt(&mut ast, Some(chain_expr));
        let chain_body = block(&mut ast, vec![chain_return]);
        let chain_return_ty = reference_type(&mut ast, vec!["MyClass".to_string()]);
        let chain = method_decl(&mut ast, "chain", Modifiers::PUBLIC, false, Some(chain_return_ty), vec![], Some(chain_body));

        // public static int nextCounter() { return counter; }
        let counter_ref = member_name(&mut ast, "counter", None);
        let next_counter_expr = ast.register_expr_list(ExprNodeList::new(vec![counter_ref]));
        let next_counter_return = return_stmt(&mut ast, Some(next_counter_expr));
        let next_counter_body = block(&mut ast, vec![next_counter_return]);
        let next_counter_ty = builtin_type(&mut ast, BuiltIn::Int);
        let next_counter = method_decl(
            &mut ast,
            "nextCounter",
            Modifiers::PUBLIC.union(Modifiers::STATIC),
            false,
            Some(next_counter_ty),
            vec![],
            Some(next_counter_body),
        );

        // public static int sum() { return MyClass.add(1, 2); }
        let lit1 = int_lit(&mut ast, 1);
        let lit2 = int_lit(&mut ast, 2);
        let my_class_qualifier = member_name(&mut ast, "MyClass", None);
        let add_call_name = method_name(&mut ast, "add", Some(my_class_qualifier));
        let add_invocation = method_invocation(&mut ast, 3);
        let sum_expr = ast.register_expr_list(ExprNodeList::new(vec![lit1, lit2, add_call_name, add_invocation]));
        let sum_return = return_stmt(&mut ast, Some(sum_expr));
        let sum_body = block(&mut ast, vec![sum_return]);
        let sum_return_ty = builtin_type(&mut ast, BuiltIn::Int);
        let sum = method_decl(&mut ast, "sum", Modifiers::PUBLIC.union(Modifiers::STATIC), false, Some(sum_return_ty), vec![], Some(sum_body));

        if let Some(node) = ast.node_mut(my_class_id) {
            node.data = AnyNode::ClassDecl(ClassDecl {
                id: my_class_id,
                span: span(),
                name: "MyClass".to_string(),
                canonical_name: None,
                modifiers: Modifiers::PUBLIC,
                superclass: None,
                interfaces: vec![],
                fields: vec![my_field, counter, next],
                methods: vec![add, get_field, chain, next_counter, sum],
                constructors: vec![ctor],
            });
        }

        let my_class_cu = ast.alloc(AnyNode::CompilationUnit(CompilationUnit {
            id: NodeID::new(0, 0),
            span: span(),
            package: package.clone(),
            imports: vec![],
            body: my_class_id,
        }));
        ast.add_root(my_class_cu);

        // public class Helper extends MyClass { public Helper() {} public int getField() { return this.myField; } }
        let helper_id = alloc_placeholder(&mut ast);
        let helper_ctor_body = block(&mut ast, vec![]);
        let helper_ctor = method_decl(&mut ast, "Helper", Modifiers::PUBLIC, true, None, vec![], Some(helper_ctor_body));

        let this3 = this_node(&mut ast);
        let helper_field_access = member_name(&mut ast, "myField", Some(this3));
        let helper_get_field_expr = ast.register_expr_list(ExprNodeList::new(vec![helper_field_access]));
        let helper_get_field_return = return_stmt(&mut ast, Some(helper_get_field_expr));
        let helper_get_field_body = block(&mut ast, vec![helper_get_field_return]);
        let helper_get_field_ty = builtin_type(&mut ast, BuiltIn::Int);
        let helper_get_field = method_decl(
            &mut ast,
            "getField",
            Modifiers::PUBLIC,
            false,
            Some(helper_get_field_ty),
            vec![],
            Some(helper_get_field_body),
        );

        if let Some(node) = ast.node_mut(helper_id) {
            node.data = AnyNode::ClassDecl(ClassDecl {
                id: helper_id,
                span: span(),
                name: "Helper".to_string(),
                canonical_name: None,
                modifiers: Modifiers::PUBLIC,
                superclass: Some(my_class_id),
                interfaces: vec![],
                fields: vec![],
                methods: vec![helper_get_field],
                constructors: vec![helper_ctor],
            });
        }

        let helper_cu = ast.alloc(AnyNode::CompilationUnit(CompilationUnit {
            id: NodeID::new(0, 0),
            span: span(),
            package,
            imports: vec![],
            body: helper_id,
        }));
        ast.add_root(helper_cu);

        self.classes = vec![my_class_id, helper_id];
        self.interfaces = vec![];
        self.roots = vec![my_class_cu, helper_cu];
        self.reference_types = vec![
            (next_ty, vec!["MyClass".to_string()], my_class_cu),
            (chain_return_ty, vec!["MyClass".to_string()], my_class_cu),
        ];
        self.ast = RefCell::new(ast);
    }
}

impl Pass for AstBuilderPass {
    fn name(&self) -> &'static str { "ast-builder" }

    fn description(&self) -> &'static str { "constructs the worked-example compilation units this core ships with" }

    fn run(&mut self, _ctx: &mut RunContext<'_>) -> Result<(), PassError> {
        self.build();
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any { self }
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any { self }
}

#[cfg(test)]
mod tests {
    use joosc_ast::AnyNode;

    use super::*;

    #[test]
    fn build_produces_my_class_and_helper() {
        let mut pass = AstBuilderPass::new();
        pass.build();

        assert_eq!(pass.classes().len(), 2);
        assert_eq!(pass.roots().len(), 2);
        assert!(pass.interfaces().is_empty());

        let ast = pass.ast();
        let names: Vec<String> = pass
            .classes()
            .iter()
            .filter_map(|&id| match ast.node(id).map(|n| &n.data) {
                Some(AnyNode::ClassDecl(cd)) => Some(cd.name.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["MyClass".to_string(), "Helper".to_string()]);
    }

    #[test]
    fn helper_extends_my_class_directly() {
        let mut pass = AstBuilderPass::new();
        pass.build();
        let ast = pass.ast();
        let helper_id = pass.classes()[1];
        let Some(AnyNode::ClassDecl(helper)) = ast.node(helper_id).map(|n| &n.data) else {
            panic!("expected Helper to be a ClassDecl");
        };
        assert_eq!(helper.superclass, Some(pass.classes()[0]));
    }

    #[test]
    fn reference_types_all_name_my_class() {
        let mut pass = AstBuilderPass::new();
        pass.build();
        assert_eq!(pass.reference_types().len(), 2);
        for (_, path, cu) in pass.reference_types() {
            assert_eq!(path, &vec!["MyClass".to_string()]);
            assert!(pass.roots().contains(cu));
        }
    }
}
