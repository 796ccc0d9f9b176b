//! Runtime values.
//!
//! Every first-class object is a `Value`. Aggregates are `Rc`-shared and
//! mutate through `RefCell`; bits payloads are stored inline as a
//! `(TypeId, u64)` pair. A type used as a value is `Value::Type`.

use std::cell::RefCell;
use std::rc::Rc;

use lyra_common::Atom;

use crate::context::Runtime;
use crate::dispatch::GenericFunction;
use crate::error::RuntimeResult;
use crate::types::TypeId;

/// Native entry point: runtime context, closure environment, arguments.
pub type NativeFn = fn(&mut Runtime, &Value, &[Value]) -> RuntimeResult<Value>;

#[derive(Clone, Debug)]
pub enum Value {
    Tuple(Rc<[Value]>),
    Symbol(Atom),
    Bits { ty: TypeId, bits: u64 },
    Struct(Rc<StructValue>),
    Array(Rc<ArrayValue>),
    Function(Rc<FunctionValue>),
    Expr(Rc<ExprValue>),
    Box(Rc<RefCell<Option<Value>>>),
    LambdaInfo(Rc<LambdaInfo>),
    Type(TypeId),
}

/// A struct instance: its type plus one slot per field.
#[derive(Debug)]
pub struct StructValue {
    pub ty: TypeId,
    pub fields: RefCell<Vec<Value>>,
}

/// An array: bits-kind elements are stored inline, anything else as
/// references that may be uninitialized.
#[derive(Debug)]
pub struct ArrayValue {
    /// The instantiated `Array{T}` type.
    pub ty: TypeId,
    /// The element type `T`.
    pub elem: TypeId,
    pub data: RefCell<ArrayData>,
}

#[derive(Debug)]
pub enum ArrayData {
    Bits { elem_size: usize, bytes: Vec<u8> },
    Refs(Vec<Option<Value>>),
}

impl ArrayValue {
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        match &*self.data.borrow() {
            ArrayData::Bits { elem_size, bytes } => {
                if *elem_size == 0 {
                    0
                } else {
                    bytes.len() / elem_size
                }
            }
            ArrayData::Refs(slots) => slots.len(),
        }
    }
}

/// Function objects: native builtins, closures over external code, and
/// generic functions with a method table.
#[derive(Debug)]
pub enum FunctionValue {
    Builtin { name: &'static str, f: NativeFn },
    Closure { linfo: Rc<LambdaInfo>, env: Value },
    Generic(RefCell<GenericFunction>),
}

/// Code descriptor, opaque to the core. `fptr` is filled by the external
/// compiler; a closure without one cannot be applied.
#[derive(Debug)]
pub struct LambdaInfo {
    pub ast: Value,
    pub fptr: Option<NativeFn>,
}

/// An AST fragment: a head symbol and an argument tuple.
#[derive(Debug)]
pub struct ExprValue {
    pub head: Atom,
    pub args: Value,
}

impl Value {
    /// The empty tuple, which doubles as the unit result.
    pub fn unit() -> Value {
        Value::Tuple(Rc::from(Vec::<Value>::new()))
    }

    pub fn tuple(elements: Vec<Value>) -> Value {
        Value::Tuple(Rc::from(elements))
    }

    pub fn builtin(name: &'static str, f: NativeFn) -> Value {
        Value::Function(Rc::new(FunctionValue::Builtin { name, f }))
    }

    /// A string is a byte array of `Uint8`.
    pub fn string(s: &str) -> Value {
        Value::Array(Rc::new(ArrayValue {
            ty: TypeId::STRING,
            elem: TypeId::UINT8,
            data: RefCell::new(ArrayData::Bits {
                elem_size: 1,
                bytes: s.as_bytes().to_vec(),
            }),
        }))
    }

    pub fn bool_value(b: bool) -> Value {
        Value::Bits {
            ty: TypeId::BOOL,
            bits: b as u64,
        }
    }

    pub fn int8(v: i8) -> Value {
        Value::Bits {
            ty: TypeId::INT8,
            bits: v as u8 as u64,
        }
    }

    pub fn uint8(v: u8) -> Value {
        Value::Bits {
            ty: TypeId::UINT8,
            bits: v as u64,
        }
    }

    pub fn int16(v: i16) -> Value {
        Value::Bits {
            ty: TypeId::INT16,
            bits: v as u16 as u64,
        }
    }

    pub fn uint16(v: u16) -> Value {
        Value::Bits {
            ty: TypeId::UINT16,
            bits: v as u64,
        }
    }

    pub fn int32(v: i32) -> Value {
        Value::Bits {
            ty: TypeId::INT32,
            bits: v as u32 as u64,
        }
    }

    pub fn uint32(v: u32) -> Value {
        Value::Bits {
            ty: TypeId::UINT32,
            bits: v as u64,
        }
    }

    pub fn int64(v: i64) -> Value {
        Value::Bits {
            ty: TypeId::INT64,
            bits: v as u64,
        }
    }

    pub fn uint64(v: u64) -> Value {
        Value::Bits {
            ty: TypeId::UINT64,
            bits: v,
        }
    }

    pub fn float32(v: f32) -> Value {
        Value::Bits {
            ty: TypeId::FLOAT32,
            bits: v.to_bits() as u64,
        }
    }

    pub fn float64(v: f64) -> Value {
        Value::Bits {
            ty: TypeId::FLOAT64,
            bits: v.to_bits(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bits { ty, bits } if *ty == TypeId::BOOL => Some(*bits != 0),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Bits { ty, bits } if *ty == TypeId::INT32 => Some(*bits as u32 as i32),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Bits { ty, bits } if *ty == TypeId::INT64 => Some(*bits as i64),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::Bits { ty, bits } if *ty == TypeId::FLOAT32 => {
                Some(f32::from_bits(*bits as u32))
            }
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Bits { ty, bits } if *ty == TypeId::FLOAT64 => Some(f64::from_bits(*bits)),
            _ => None,
        }
    }

    pub fn as_tuple_elems(&self) -> Option<&[Value]> {
        match self {
            Value::Tuple(elements) => Some(elements),
            _ => None,
        }
    }

    /// Identity equality: symbols by interned atom, bits values by type and
    /// payload, types by handle, aggregates by reference.
    pub fn is_egal(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (
                Value::Bits { ty: t1, bits: b1 },
                Value::Bits { ty: t2, bits: b2 },
            ) => t1 == t2 && b1 == b2,
            (Value::Type(a), Value::Type(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => Rc::ptr_eq(a, b),
            (Value::Struct(a), Value::Struct(b)) => Rc::ptr_eq(a, b),
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Expr(a), Value::Expr(b)) => Rc::ptr_eq(a, b),
            (Value::Box(a), Value::Box(b)) => Rc::ptr_eq(a, b),
            (Value::LambdaInfo(a), Value::LambdaInfo(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}
