//! Declarative macros generating the boilerplate trait implementations for
//! [`crate::nodes::AnyNode`] from a single master variant list.

/// Master list of every node variant stored in the arena.
///
/// Single source of truth: add a struct to `decl`/`ty`/`stmt`/`expr`, list it
/// here, and every generated trait implementation picks it up.
#[macro_export]
macro_rules! for_each_node_variant {
    ($callback:ident) => {
        $callback! {
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
    };
}

/// Generates `ASTNode` for `AnyNode` by delegating to each variant's inner type.
#[macro_export]
macro_rules! impl_astnode_for_anynode {
    ($($variant:ident($type:ty)),* $(,)?) => {
        impl $crate::nodes::ASTNode for $crate::nodes::AnyNode {
            fn id(&self) -> $crate::nodes::NodeID {
                match self { $(Self::$variant(n) => n.id,)* }
            }

            fn span(&self) -> joosc_source::SourceRange {
                match self { $(Self::$variant(n) => n.span,)* }
            }

            fn children(&self) -> Vec<$crate::nodes::NodeID> {
                match self { $(Self::$variant(n) => n.children(),)* }
            }

            fn kind(&self) -> $crate::nodes::NodeKind {
                match self { $(Self::$variant(_) => $crate::nodes::NodeKind::$variant,)* }
            }
        }
    };
}

/// Generates the runtime-checked downcast `AnyNode::get_as::<T>()`.
#[macro_export]
macro_rules! impl_get_as_for_anynode {
    ($($variant:ident($type:ty)),* $(,)?) => {
        impl $crate::nodes::AnyNode {
            /// Downcasts to the concrete node type `T`, if this node holds one.
            ///
            /// ## Errors
            ///
            /// Returns [`crate::nodes::NodeCastError`] if the node is a
            /// different variant.
            #[allow(unsafe_code, clippy::undocumented_unsafe_blocks)]
            pub fn get_as<T: 'static>(&self) -> Result<&T, $crate::nodes::NodeCastError> {
                let expected = std::any::type_name::<T>();
                match self {
                    $(
                        Self::$variant(inner) if std::any::type_name::<$type>() == expected => {
                            // SAFETY: the `type_name` comparison above proves `T` and
                            // `$type` are the same type, so reinterpreting the
                            // reference's pointee type is a no-op cast.
                            Ok(unsafe { &*std::ptr::from_ref::<$type>(inner).cast::<T>() })
                        }
                    )*
                    _ => Err($crate::nodes::NodeCastError { expected, actual: self.kind() }),
                }
            }
        }
    };
}
