//! The runtime context.
//!
//! The current output stream, the print generic function, and the root
//! namespace are fields of a `Runtime` value threaded through every entry
//! point rather than process globals, so save/restore becomes ordinary
//! scoped code and the core stays free of global state.

use std::io::Write;

use indexmap::IndexMap;
use lyra_common::{Atom, Interner};
use rustc_hash::FxBuildHasher;

use crate::error::{RuntimeError, RuntimeResult};
use crate::subtype::SubtypeChecker;
use crate::types::{Type, TypeId, TypeStore};
use crate::value::Value;

/// Where `print` writes. The buffer variant backs `print_to_string`.
#[derive(Debug)]
pub enum OutputStream {
    Stdout,
    Buffer(Vec<u8>),
}

pub struct Runtime {
    pub symbols: Interner,
    pub types: TypeStore,
    /// Root namespace: insertion-ordered constant bindings.
    pub(crate) globals: IndexMap<Atom, Value, FxBuildHasher>,
    pub(crate) output: OutputStream,
    pub(crate) print_gf: Option<Value>,
}

impl Runtime {
    pub fn intern(&mut self, name: &str) -> Atom {
        self.symbols.intern(name)
    }

    pub fn symbol(&mut self, name: &str) -> Value {
        Value::Symbol(self.symbols.intern(name))
    }

    // =========================================================================
    // Root namespace
    // =========================================================================

    /// Bind a constant in the root namespace. Rebinding is an error.
    pub fn set_const(&mut self, name: &str, value: Value) -> RuntimeResult<()> {
        let atom = self.symbols.intern(name);
        if self.globals.contains_key(&atom) {
            return Err(RuntimeError::State(format!(
                "invalid redefinition of constant {}",
                name
            )));
        }
        self.globals.insert(atom, value);
        Ok(())
    }

    /// Unchecked binding, for the bootstrap only.
    pub(crate) fn bind(&mut self, name: &str, value: Value) {
        let atom = self.symbols.intern(name);
        self.globals.insert(atom, value);
    }

    pub fn global(&self, name: &str) -> Option<&Value> {
        let atom = self.symbols.get(name)?;
        self.globals.get(&atom)
    }

    // =========================================================================
    // Type queries
    // =========================================================================

    pub fn is_subtype(&self, a: TypeId, b: TypeId) -> bool {
        SubtypeChecker::new(&self.types).is_subtype_of(a, b)
    }

    pub fn types_equal(&self, a: TypeId, b: TypeId) -> bool {
        SubtypeChecker::new(&self.types).types_equal(a, b)
    }

    /// The type of a value. Tuples get a fresh tuple type of their element
    /// types; everything else carries or implies its type directly.
    pub fn type_of(&mut self, v: &Value) -> TypeId {
        match v {
            Value::Tuple(elements) => {
                let mut ids = Vec::with_capacity(elements.len());
                for e in elements.iter() {
                    ids.push(self.type_of(e));
                }
                self.types.tuple_type(ids)
            }
            Value::Symbol(_) => TypeId::SYMBOL,
            Value::Bits { ty, .. } => *ty,
            Value::Struct(s) => s.ty,
            Value::Array(a) => a.ty,
            Value::Function(_) => TypeId::FUNCTION,
            Value::Expr(_) => TypeId::EXPR,
            Value::Box(_) => TypeId::BOX,
            Value::LambdaInfo(_) => TypeId::LAMBDA_INFO,
            Value::Type(t) => match self.types.get(*t) {
                Type::Bits(_) => TypeId::BITS_KIND,
                Type::Struct(_) => TypeId::STRUCT_KIND,
                Type::Tag(_) => TypeId::TAG_KIND,
                Type::Union(_) => TypeId::UNION_KIND,
                Type::Func(_) => TypeId::FUNC_KIND,
                Type::Var(_) => TypeId::TYPEVAR,
                Type::Ctor(_) | Type::Seq(_) | Type::Tuple(_) => TypeId::TYPE,
            },
        }
    }

    /// Short display name for a type, for error messages.
    pub fn type_name(&self, id: TypeId) -> String {
        match self.types.get(id) {
            Type::Bits(t) => self.symbols.resolve(t.name).to_string(),
            Type::Struct(t) => self.symbols.resolve(t.name).to_string(),
            Type::Tag(t) => self.symbols.resolve(t.name).to_string(),
            Type::Union(u) => {
                if u.members.is_empty() {
                    "Bottom".to_string()
                } else {
                    "Union".to_string()
                }
            }
            Type::Func(_) => "Function".to_string(),
            Type::Var(v) => self.symbols.resolve(v.name).to_string(),
            Type::Ctor(c) => self.type_name(c.body),
            Type::Seq(_) => "...".to_string(),
            Type::Tuple(_) => "Tuple".to_string(),
        }
    }

    /// Kind description of a value, for error messages.
    pub fn describe(&self, v: &Value) -> String {
        match v {
            Value::Tuple(_) => "Tuple".to_string(),
            Value::Symbol(_) => "Symbol".to_string(),
            Value::Bits { ty, .. } => self.type_name(*ty),
            Value::Struct(s) => self.type_name(s.ty),
            Value::Array(a) => self.type_name(a.ty),
            Value::Function(_) => "Function".to_string(),
            Value::Expr(_) => "Expr".to_string(),
            Value::Box(_) => "Box".to_string(),
            Value::LambdaInfo(_) => "LambdaInfo".to_string(),
            Value::Type(_) => "Type".to_string(),
        }
    }

    // =========================================================================
    // Output
    // =========================================================================

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        match &mut self.output {
            OutputStream::Stdout => {
                let _ = std::io::stdout().write_all(bytes);
            }
            OutputStream::Buffer(buf) => buf.extend_from_slice(bytes),
        }
    }

    pub fn write_str(&mut self, s: &str) {
        self.write_bytes(s.as_bytes());
    }

    /// Replace the current output stream, returning the previous one.
    pub fn swap_output(&mut self, stream: OutputStream) -> OutputStream {
        std::mem::replace(&mut self.output, stream)
    }

    // =========================================================================
    // Value construction needing the type store
    // =========================================================================

    /// A fresh array of `len` elements of type `elem`. Bits-kind elements
    /// are stored inline and zero-initialized; reference elements start
    /// uninitialized.
    pub fn new_array(&mut self, elem: TypeId, len: usize) -> RuntimeResult<Value> {
        use crate::value::{ArrayData, ArrayValue};
        use std::cell::RefCell;
        use std::rc::Rc;

        let ty = self.types.instantiate(TypeId::ARRAY_CTOR, &[elem])?;
        let data = match self.types.get(elem) {
            Type::Bits(b) => {
                let elem_size = b.nbits.div_ceil(8) as usize;
                ArrayData::Bits {
                    elem_size,
                    bytes: vec![0; len * elem_size],
                }
            }
            _ => ArrayData::Refs(vec![None; len]),
        };
        Ok(Value::Array(Rc::new(ArrayValue {
            ty,
            elem,
            data: RefCell::new(data),
        })))
    }
}
