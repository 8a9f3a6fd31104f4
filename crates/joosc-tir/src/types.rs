//! IR types, interned by [`crate::context::Context`].

/// A handle to an interned [`Type`]. Equal types always intern to the same
/// `TypeId`, so type identity is handle equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(pub(crate) u32);

/// The small, fixed type lattice this IR needs: no user-level generics or
/// first-class function values, so no need for anything richer. Array types
/// are not a distinct kind: every Java array monomorphically lowers to the
/// same `Struct { i32, ptr }` shape regardless of element type (the element
/// type is tracked by the code generator's own lowering tables, not by the
/// IR type itself).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Void,
    /// `width` is one of 1 (`boolean`), 8 (`byte`), 16 (`char`/`short`), or
    /// 32 (`int`).
    Int { width: u8 },
    /// Opaque pointer; every reference, `null`, and `String` lowers to this.
    Pointer,
    Struct { fields: Vec<TypeId> },
    Function { ret: TypeId, params: Vec<TypeId> },
}
