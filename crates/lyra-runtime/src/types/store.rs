//! The type arena.
//!
//! All types live in a single `Vec` and reference each other by `TypeId`.
//! The well-known types are allocated at fixed indices matching the
//! associated constants on `TypeId`. Types are immutable after creation
//! except for the one-time struct-field completion and the one-time
//! `fconvert` registration.

use lyra_common::{Atom, Interner};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{RuntimeError, RuntimeResult};
use crate::subtype::SubtypeChecker;
use crate::types::def::{
    BitsType, FuncType, StructType, TagType, Type, TypeCtorType, TypeId, TypeVarType, UnionType,
};

// Private slots between the public well-known ids: the free type variables
// of the built-in constructors and the body of the `...` constructor.
const ARRAY_TVAR: TypeId = TypeId(31);
const NTUPLE_TVAR_N: TypeId = TypeId(35);
const NTUPLE_TVAR_T: TypeId = TypeId(36);
const SEQ_TVAR: TypeId = TypeId(39);
const SEQ_BODY: TypeId = TypeId(40);

#[derive(Debug)]
pub struct TypeStore {
    types: Vec<Type>,
}

fn boot_tag(s: &mut TypeStore, symbols: &mut Interner, name: &str, super_ty: TypeId) -> TypeId {
    let name = symbols.intern(name);
    s.alloc(Type::Tag(Box::new(TagType {
        name,
        super_ty,
        params: Vec::new(),
    })))
}

fn boot_bits(
    s: &mut TypeStore,
    symbols: &mut Interner,
    name: &str,
    super_ty: TypeId,
    nbits: u32,
) -> TypeId {
    let name = symbols.intern(name);
    s.alloc(Type::Bits(Box::new(BitsType {
        name,
        super_ty,
        params: Vec::new(),
        nbits,
        fconvert: None,
    })))
}

impl TypeStore {
    /// Build the arena with every well-known type allocated at its fixed
    /// index. The order here must match the constants on `TypeId`.
    pub fn new(symbols: &mut Interner) -> TypeStore {
        let mut s = TypeStore { types: Vec::new() };

        let id = boot_tag(&mut s, symbols, "Any", TypeId::ANY);
        debug_assert_eq!(id, TypeId::ANY);
        let id = s.alloc(Type::Union(UnionType {
            members: Vec::new(),
        }));
        debug_assert_eq!(id, TypeId::BOTTOM);
        boot_tag(&mut s, symbols, "Type", TypeId::ANY);
        boot_tag(&mut s, symbols, "BitsKind", TypeId::TYPE);
        boot_tag(&mut s, symbols, "StructKind", TypeId::TYPE);
        boot_tag(&mut s, symbols, "TagKind", TypeId::TYPE);
        boot_tag(&mut s, symbols, "UnionKind", TypeId::TYPE);
        boot_tag(&mut s, symbols, "FuncKind", TypeId::TYPE);
        boot_tag(&mut s, symbols, "TypeVar", TypeId::ANY);
        boot_tag(&mut s, symbols, "Symbol", TypeId::ANY);
        boot_tag(&mut s, symbols, "Number", TypeId::ANY);
        boot_tag(&mut s, symbols, "Real", TypeId::NUMBER);
        boot_tag(&mut s, symbols, "Int", TypeId::REAL);
        boot_tag(&mut s, symbols, "Float", TypeId::REAL);

        boot_bits(&mut s, symbols, "Bool", TypeId::INT, 8);
        boot_bits(&mut s, symbols, "Int8", TypeId::INT, 8);
        boot_bits(&mut s, symbols, "Uint8", TypeId::INT, 8);
        boot_bits(&mut s, symbols, "Int16", TypeId::INT, 16);
        boot_bits(&mut s, symbols, "Uint16", TypeId::INT, 16);
        boot_bits(&mut s, symbols, "Int32", TypeId::INT, 32);
        boot_bits(&mut s, symbols, "Uint32", TypeId::INT, 32);
        boot_bits(&mut s, symbols, "Int64", TypeId::INT, 64);
        boot_bits(&mut s, symbols, "Uint64", TypeId::INT, 64);
        boot_bits(&mut s, symbols, "Float32", TypeId::FLOAT, 32);
        let id = boot_bits(&mut s, symbols, "Float64", TypeId::FLOAT, 64);
        debug_assert_eq!(id, TypeId::FLOAT64);

        let id = s.alloc(Type::Seq(TypeId::ANY));
        debug_assert_eq!(id, TypeId::SEQ_ANY);
        let id = s.alloc(Type::Tuple(vec![TypeId::SEQ_ANY]));
        debug_assert_eq!(id, TypeId::TUPLE);
        let id = s.alloc(Type::Func(FuncType {
            domain: TypeId::BOTTOM,
            range: TypeId::ANY,
        }));
        debug_assert_eq!(id, TypeId::FUNCTION);
        boot_tag(&mut s, symbols, "LambdaInfo", TypeId::ANY);
        boot_tag(&mut s, symbols, "Expr", TypeId::ANY);
        boot_tag(&mut s, symbols, "Box", TypeId::ANY);

        // Array{T} and its constructor
        let t = symbols.intern("T");
        let id = s.alloc(Type::Var(Box::new(TypeVarType {
            name: t,
            lower: TypeId::BOTTOM,
            upper: TypeId::ANY,
        })));
        debug_assert_eq!(id, ARRAY_TVAR);
        let array_name = symbols.intern("Array");
        let id = s.alloc(Type::Tag(Box::new(TagType {
            name: array_name,
            super_ty: TypeId::ANY,
            params: vec![ARRAY_TVAR],
        })));
        debug_assert_eq!(id, TypeId::ARRAY);
        let id = s.alloc(Type::Ctor(TypeCtorType {
            params: vec![ARRAY_TVAR],
            body: TypeId::ARRAY,
        }));
        debug_assert_eq!(id, TypeId::ARRAY_CTOR);
        // Array{Uint8}: the string type
        let id = s.alloc(Type::Tag(Box::new(TagType {
            name: array_name,
            super_ty: TypeId::ANY,
            params: vec![TypeId::UINT8],
        })));
        debug_assert_eq!(id, TypeId::STRING);

        // NTuple{N,T} and its constructor
        let n = symbols.intern("N");
        let id = s.alloc(Type::Var(Box::new(TypeVarType {
            name: n,
            lower: TypeId::BOTTOM,
            upper: TypeId::ANY,
        })));
        debug_assert_eq!(id, NTUPLE_TVAR_N);
        let id = s.alloc(Type::Var(Box::new(TypeVarType {
            name: t,
            lower: TypeId::BOTTOM,
            upper: TypeId::ANY,
        })));
        debug_assert_eq!(id, NTUPLE_TVAR_T);
        let ntuple_name = symbols.intern("NTuple");
        let id = s.alloc(Type::Tag(Box::new(TagType {
            name: ntuple_name,
            super_ty: TypeId::ANY,
            params: vec![NTUPLE_TVAR_N, NTUPLE_TVAR_T],
        })));
        debug_assert_eq!(id, TypeId::NTUPLE);
        let id = s.alloc(Type::Ctor(TypeCtorType {
            params: vec![NTUPLE_TVAR_N, NTUPLE_TVAR_T],
            body: TypeId::NTUPLE,
        }));
        debug_assert_eq!(id, TypeId::NTUPLE_CTOR);

        // `...`: forall T. T...
        let id = s.alloc(Type::Var(Box::new(TypeVarType {
            name: t,
            lower: TypeId::BOTTOM,
            upper: TypeId::ANY,
        })));
        debug_assert_eq!(id, SEQ_TVAR);
        let id = s.alloc(Type::Seq(SEQ_TVAR));
        debug_assert_eq!(id, SEQ_BODY);
        let id = s.alloc(Type::Ctor(TypeCtorType {
            params: vec![SEQ_TVAR],
            body: SEQ_BODY,
        }));
        debug_assert_eq!(id, TypeId::SEQ_CTOR);

        s
    }

    pub fn alloc(&mut self, ty: Type) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(ty);
        id
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: TypeId) -> &mut Type {
        &mut self.types[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    // =========================================================================
    // Kind queries
    // =========================================================================

    pub fn is_bits(&self, id: TypeId) -> bool {
        matches!(self.get(id), Type::Bits(_))
    }

    pub fn is_struct(&self, id: TypeId) -> bool {
        matches!(self.get(id), Type::Struct(_))
    }

    pub fn is_tag(&self, id: TypeId) -> bool {
        matches!(self.get(id), Type::Tag(_))
    }

    pub fn is_var(&self, id: TypeId) -> bool {
        matches!(self.get(id), Type::Var(_))
    }

    pub fn is_ctor(&self, id: TypeId) -> bool {
        matches!(self.get(id), Type::Ctor(_))
    }

    pub fn is_seq(&self, id: TypeId) -> bool {
        matches!(self.get(id), Type::Seq(_))
    }

    pub fn is_union(&self, id: TypeId) -> bool {
        matches!(self.get(id), Type::Union(_))
    }

    pub fn is_tuple_type(&self, id: TypeId) -> bool {
        matches!(self.get(id), Type::Tuple(_))
    }

    /// Bits, struct, and tag types: the nominal kinds with a supertype
    /// chain, which is what promotion operates over.
    pub fn is_nominal(&self, id: TypeId) -> bool {
        matches!(
            self.get(id),
            Type::Bits(_) | Type::Struct(_) | Type::Tag(_)
        )
    }

    pub fn seq_inner(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id) {
            Type::Seq(inner) => Some(*inner),
            _ => None,
        }
    }

    pub fn nbits(&self, id: TypeId) -> Option<u32> {
        match self.get(id) {
            Type::Bits(b) => Some(b.nbits),
            _ => None,
        }
    }

    /// Unwrap a type constructor to its body; other types pass through.
    pub fn unwrap_ctor(&self, id: TypeId) -> TypeId {
        match self.get(id) {
            Type::Ctor(c) => c.body,
            _ => id,
        }
    }

    // =========================================================================
    // Factories
    // =========================================================================

    pub fn seq(&mut self, inner: TypeId) -> TypeId {
        self.alloc(Type::Seq(inner))
    }

    pub fn tuple_type(&mut self, elements: Vec<TypeId>) -> TypeId {
        self.alloc(Type::Tuple(elements))
    }

    pub fn func_type(&mut self, domain: TypeId, range: TypeId) -> TypeId {
        self.alloc(Type::Func(FuncType { domain, range }))
    }

    /// A fresh type variable with default bounds `(Bottom, Any)`.
    pub fn type_var(&mut self, name: Atom) -> TypeId {
        self.alloc(Type::Var(Box::new(TypeVarType {
            name,
            lower: TypeId::BOTTOM,
            upper: TypeId::ANY,
        })))
    }

    pub fn tag_type(&mut self, name: Atom, super_ty: TypeId, params: Vec<TypeId>) -> TypeId {
        self.alloc(Type::Tag(Box::new(TagType {
            name,
            super_ty,
            params,
        })))
    }

    /// A struct type with its field types still unfilled.
    pub fn struct_type(
        &mut self,
        name: Atom,
        super_ty: TypeId,
        params: Vec<TypeId>,
        field_names: Vec<Atom>,
    ) -> TypeId {
        self.alloc(Type::Struct(Box::new(StructType {
            name,
            super_ty,
            params,
            field_names,
            field_types: None,
            fconvert: None,
            fnew: None,
        })))
    }

    pub fn ctor(&mut self, params: Vec<TypeId>, body: TypeId) -> TypeId {
        self.alloc(Type::Ctor(TypeCtorType { params, body }))
    }

    // =========================================================================
    // Union normalization
    // =========================================================================

    /// Build a normalized union: nested unions are flattened, duplicates and
    /// strictly subsumed members are dropped, a singleton collapses to its
    /// member, and the empty union is `Bottom`.
    pub fn union_of(&mut self, members: Vec<TypeId>) -> TypeId {
        let mut flat = Vec::new();
        let mut stack = members;
        stack.reverse();
        while let Some(m) = stack.pop() {
            match self.get(m) {
                Type::Union(u) => {
                    for &inner in u.members.iter().rev() {
                        stack.push(inner);
                    }
                }
                _ => flat.push(m),
            }
        }

        let mut kept = Vec::new();
        {
            let checker = SubtypeChecker::new(self);
            'outer: for (i, &m) in flat.iter().enumerate() {
                for (j, &o) in flat.iter().enumerate() {
                    if i == j {
                        continue;
                    }
                    let mo = checker.is_subtype_of(m, o);
                    let om = checker.is_subtype_of(o, m);
                    if mo && !om {
                        continue 'outer; // strictly subsumed
                    }
                    if mo && om && j < i {
                        continue 'outer; // duplicate, keep the first
                    }
                }
                kept.push(m);
            }
        }

        match kept.len() {
            0 => TypeId::BOTTOM,
            1 => kept[0],
            _ => self.alloc(Type::Union(UnionType { members: kept })),
        }
    }

    // =========================================================================
    // Type constructor application
    // =========================================================================

    /// Apply a type constructor to positional arguments, substituting its
    /// parameters through the body.
    pub fn instantiate(&mut self, ctor: TypeId, args: &[TypeId]) -> RuntimeResult<TypeId> {
        let (params, body) = match self.get(ctor) {
            Type::Ctor(c) => (c.params.clone(), c.body),
            _ => {
                return Err(RuntimeError::Type {
                    name: "instantiate_type",
                    expected: "type constructor",
                    got: "type".to_string(),
                });
            }
        };
        if args.len() != params.len() {
            return Err(RuntimeError::Type {
                name: "instantiate_type",
                expected: "matching number of type parameters",
                got: format!("{} arguments for {} parameters", args.len(), params.len()),
            });
        }
        let mut map = FxHashMap::default();
        for (&p, &a) in params.iter().zip(args.iter()) {
            map.insert(p, a);
        }
        let mut memo = FxHashMap::default();
        Ok(self.substitute(body, &map, &mut memo))
    }

    /// Structural substitution. `memo` maps already-copied nominal types so
    /// cyclic type graphs terminate; subtrees that mention no substituted
    /// variable are shared unchanged.
    fn substitute(
        &mut self,
        id: TypeId,
        map: &FxHashMap<TypeId, TypeId>,
        memo: &mut FxHashMap<TypeId, TypeId>,
    ) -> TypeId {
        if let Some(&mapped) = map.get(&id) {
            return mapped;
        }
        if let Some(&copied) = memo.get(&id) {
            return copied;
        }
        let mut seen = FxHashSet::default();
        if !self.mentions_any(id, map, &mut seen) {
            return id;
        }
        match self.get(id).clone() {
            Type::Var(_) => id,
            Type::Seq(inner) => {
                let inner = self.substitute(inner, map, memo);
                self.alloc(Type::Seq(inner))
            }
            Type::Tuple(elements) => {
                let mut out = Vec::with_capacity(elements.len());
                for e in elements {
                    out.push(self.substitute(e, map, memo));
                }
                self.alloc(Type::Tuple(out))
            }
            Type::Union(u) => {
                let mut out = Vec::with_capacity(u.members.len());
                for m in u.members {
                    out.push(self.substitute(m, map, memo));
                }
                self.union_of(out)
            }
            Type::Func(f) => {
                let domain = self.substitute(f.domain, map, memo);
                let range = self.substitute(f.range, map, memo);
                self.alloc(Type::Func(FuncType { domain, range }))
            }
            Type::Ctor(c) => {
                let body = self.substitute(c.body, map, memo);
                self.alloc(Type::Ctor(TypeCtorType {
                    params: c.params,
                    body,
                }))
            }
            Type::Bits(b) => {
                let mut copy = b.clone();
                let nid = self.alloc(Type::Bits(copy.clone()));
                memo.insert(id, nid);
                copy.super_ty = self.substitute(b.super_ty, map, memo);
                let mut params = Vec::with_capacity(b.params.len());
                for p in &b.params {
                    params.push(self.substitute(*p, map, memo));
                }
                copy.params = params;
                *self.get_mut(nid) = Type::Bits(copy);
                nid
            }
            Type::Tag(t) => {
                let mut copy = t.clone();
                let nid = self.alloc(Type::Tag(copy.clone()));
                memo.insert(id, nid);
                copy.super_ty = self.substitute(t.super_ty, map, memo);
                let mut params = Vec::with_capacity(t.params.len());
                for p in &t.params {
                    params.push(self.substitute(*p, map, memo));
                }
                copy.params = params;
                *self.get_mut(nid) = Type::Tag(copy);
                nid
            }
            Type::Struct(st) => {
                let mut copy = st.clone();
                // Instantiated copies are constructed directly, not through
                // the generic's registered constructor.
                copy.fnew = None;
                let nid = self.alloc(Type::Struct(copy.clone()));
                memo.insert(id, nid);
                copy.super_ty = self.substitute(st.super_ty, map, memo);
                let mut params = Vec::with_capacity(st.params.len());
                for p in &st.params {
                    params.push(self.substitute(*p, map, memo));
                }
                copy.params = params;
                copy.field_types = match &st.field_types {
                    Some(fts) => {
                        let mut out = Vec::with_capacity(fts.len());
                        for ft in fts {
                            out.push(self.substitute(*ft, map, memo));
                        }
                        Some(out)
                    }
                    None => None,
                };
                *self.get_mut(nid) = Type::Struct(copy);
                nid
            }
        }
    }

    /// Does `id` mention any key of `map`? `seen` guards cyclic graphs.
    fn mentions_any(
        &self,
        id: TypeId,
        map: &FxHashMap<TypeId, TypeId>,
        seen: &mut FxHashSet<TypeId>,
    ) -> bool {
        if map.contains_key(&id) {
            return true;
        }
        if !seen.insert(id) {
            return false;
        }
        match self.get(id) {
            Type::Var(_) => false,
            Type::Seq(inner) => self.mentions_any(*inner, map, seen),
            Type::Tuple(elements) => elements
                .iter()
                .any(|&e| self.mentions_any(e, map, seen)),
            Type::Union(u) => u.members.iter().any(|&m| self.mentions_any(m, map, seen)),
            Type::Func(f) => {
                self.mentions_any(f.domain, map, seen) || self.mentions_any(f.range, map, seen)
            }
            Type::Ctor(c) => self.mentions_any(c.body, map, seen),
            Type::Bits(b) => {
                b.params.iter().any(|&p| self.mentions_any(p, map, seen))
                    || self.mentions_any(b.super_ty, map, seen)
            }
            Type::Tag(t) => {
                t.params.iter().any(|&p| self.mentions_any(p, map, seen))
                    || self.mentions_any(t.super_ty, map, seen)
            }
            Type::Struct(st) => {
                st.params.iter().any(|&p| self.mentions_any(p, map, seen))
                    || self.mentions_any(st.super_ty, map, seen)
                    || st
                        .field_types
                        .as_ref()
                        .is_some_and(|fts| fts.iter().any(|&ft| self.mentions_any(ft, map, seen)))
            }
        }
    }
}
