//! Core type lattice definitions.
//!
//! This module contains the `Type` enum with one arm per kind, and the
//! per-kind payload structs. Types live in a `TypeStore` arena and refer to
//! each other through `TypeId` handles, so cyclic type graphs (a struct
//! whose fields mention its own constructor) need no owning pointers.

use crate::value::Value;
use lyra_common::Atom;

// =============================================================================
// Type ID
// =============================================================================

/// Handle to a type in the type arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeId(pub u32);

impl TypeId {
    // Well-known types, allocated at fixed indices by `TypeStore::new`.
    pub const ANY: TypeId = TypeId(0);
    pub const BOTTOM: TypeId = TypeId(1);
    pub const TYPE: TypeId = TypeId(2);
    pub const BITS_KIND: TypeId = TypeId(3);
    pub const STRUCT_KIND: TypeId = TypeId(4);
    pub const TAG_KIND: TypeId = TypeId(5);
    pub const UNION_KIND: TypeId = TypeId(6);
    pub const FUNC_KIND: TypeId = TypeId(7);
    pub const TYPEVAR: TypeId = TypeId(8);
    pub const SYMBOL: TypeId = TypeId(9);
    pub const NUMBER: TypeId = TypeId(10);
    pub const REAL: TypeId = TypeId(11);
    pub const INT: TypeId = TypeId(12);
    pub const FLOAT: TypeId = TypeId(13);
    pub const BOOL: TypeId = TypeId(14);
    pub const INT8: TypeId = TypeId(15);
    pub const UINT8: TypeId = TypeId(16);
    pub const INT16: TypeId = TypeId(17);
    pub const UINT16: TypeId = TypeId(18);
    pub const INT32: TypeId = TypeId(19);
    pub const UINT32: TypeId = TypeId(20);
    pub const INT64: TypeId = TypeId(21);
    pub const UINT64: TypeId = TypeId(22);
    pub const FLOAT32: TypeId = TypeId(23);
    pub const FLOAT64: TypeId = TypeId(24);
    /// `Any...`, the element of the universal tuple type.
    pub const SEQ_ANY: TypeId = TypeId(25);
    /// The universal tuple type `(Any...,)`.
    pub const TUPLE: TypeId = TypeId(26);
    /// The type of all functions, `Bottom --> Any`.
    pub const FUNCTION: TypeId = TypeId(27);
    pub const LAMBDA_INFO: TypeId = TypeId(28);
    pub const EXPR: TypeId = TypeId(29);
    pub const BOX: TypeId = TypeId(30);
    /// `Array{T}` with `T` still a free type variable.
    pub const ARRAY: TypeId = TypeId(32);
    /// The one-parameter constructor behind the `Array` binding.
    pub const ARRAY_CTOR: TypeId = TypeId(33);
    /// `Array{Uint8}`, the string type.
    pub const STRING: TypeId = TypeId(34);
    pub const NTUPLE: TypeId = TypeId(37);
    pub const NTUPLE_CTOR: TypeId = TypeId(38);
    /// The constructor behind the `...` binding.
    pub const SEQ_CTOR: TypeId = TypeId(41);
}

// =============================================================================
// Type variants
// =============================================================================

/// A nominal scalar type whose instances carry a raw payload of fixed width.
#[derive(Clone, Debug)]
pub struct BitsType {
    pub name: Atom,
    pub super_ty: TypeId,
    pub params: Vec<TypeId>,
    pub nbits: u32,
    /// The registered conversion method, if any. Set at most once.
    pub fconvert: Option<Value>,
}

/// A nominal parametric record type with named fields.
///
/// Construction is two-phase: `new_struct_type` builds the type with
/// `field_types` still `None`; `new_struct_fields` fills them in and
/// registers the generic constructor in `fnew`. Instantiation is forbidden
/// until the fields are complete.
#[derive(Clone, Debug)]
pub struct StructType {
    pub name: Atom,
    pub super_ty: TypeId,
    pub params: Vec<TypeId>,
    /// Supertype fields (when the supertype is a struct) followed by the
    /// locally declared fields.
    pub field_names: Vec<Atom>,
    pub field_types: Option<Vec<TypeId>>,
    pub fconvert: Option<Value>,
    /// The generic constructor registered by `new_struct_fields`.
    pub fnew: Option<Value>,
}

/// A nominal, parametric, field-less type.
#[derive(Clone, Debug)]
pub struct TagType {
    pub name: Atom,
    pub super_ty: TypeId,
    pub params: Vec<TypeId>,
}

/// A set of member types denoting their join. Never nested; the empty union
/// is `Bottom` and a singleton collapses to its member.
#[derive(Clone, Debug)]
pub struct UnionType {
    pub members: Vec<TypeId>,
}

/// A function type, contravariant in `domain` and covariant in `range`.
#[derive(Clone, Copy, Debug)]
pub struct FuncType {
    pub domain: TypeId,
    pub range: TypeId,
}

/// A bounded type variable. Not itself a type: it stands for one inside
/// type constructors and method signatures.
#[derive(Clone, Debug)]
pub struct TypeVarType {
    pub name: Atom,
    pub lower: TypeId,
    pub upper: TypeId,
}

/// A type abstraction `forall params. body`; applying it substitutes the
/// parameters positionally.
#[derive(Clone, Debug)]
pub struct TypeCtorType {
    pub params: Vec<TypeId>,
    pub body: TypeId,
}

/// All type kinds.
#[derive(Clone, Debug)]
pub enum Type {
    Bits(Box<BitsType>),
    Struct(Box<StructType>),
    Tag(Box<TagType>),
    Union(UnionType),
    Func(FuncType),
    Var(Box<TypeVarType>),
    Ctor(TypeCtorType),
    /// `P...`: zero or more of `P`. Only legal as the trailing element of a
    /// tuple type.
    Seq(TypeId),
    /// A tuple type; a tuple value's type is the tuple of its element types.
    Tuple(Vec<TypeId>),
}

impl Type {
    /// Nominal name, for the kinds that have one.
    pub fn name(&self) -> Option<Atom> {
        match self {
            Type::Bits(t) => Some(t.name),
            Type::Struct(t) => Some(t.name),
            Type::Tag(t) => Some(t.name),
            Type::Var(t) => Some(t.name),
            _ => None,
        }
    }

    /// Immediate supertype, for the nominal kinds.
    pub fn super_ty(&self) -> Option<TypeId> {
        match self {
            Type::Bits(t) => Some(t.super_ty),
            Type::Struct(t) => Some(t.super_ty),
            Type::Tag(t) => Some(t.super_ty),
            _ => None,
        }
    }

    /// Type parameters, empty for the kinds that have none.
    pub fn params(&self) -> &[TypeId] {
        match self {
            Type::Bits(t) => &t.params,
            Type::Struct(t) => &t.params,
            Type::Tag(t) => &t.params,
            _ => &[],
        }
    }
}
