//! Built-in operations.
//!
//! Each builtin is a native function over the runtime context. The
//! `check_nargs`/`as_*` helpers centralize arity and kind checking.

use std::cell::RefCell;
use std::rc::Rc;

use lyra_common::Atom;

use crate::context::Runtime;
use crate::error::{RuntimeError, RuntimeResult};
use crate::types::{Type, TypeId};
use crate::value::{
    ArrayData, ExprValue, FunctionValue, LambdaInfo, NativeFn, Value,
};

// =============================================================================
// Argument checking helpers
// =============================================================================

pub(crate) fn check_nargs(
    name: &'static str,
    args: &[Value],
    min: usize,
    max: usize,
) -> RuntimeResult<()> {
    if args.len() < min {
        return Err(RuntimeError::TooFewArgs { name, min });
    }
    if args.len() > max {
        return Err(RuntimeError::TooManyArgs { name, max });
    }
    Ok(())
}

fn check_nargs_min(name: &'static str, args: &[Value], min: usize) -> RuntimeResult<()> {
    if args.len() < min {
        return Err(RuntimeError::TooFewArgs { name, min });
    }
    Ok(())
}

fn type_error(rt: &Runtime, name: &'static str, expected: &'static str, v: &Value) -> RuntimeError {
    RuntimeError::Type {
        name,
        expected,
        got: rt.describe(v),
    }
}

fn as_tuple<'v>(rt: &Runtime, name: &'static str, v: &'v Value) -> RuntimeResult<&'v [Value]> {
    match v {
        Value::Tuple(elements) => Ok(elements),
        _ => Err(type_error(rt, name, "tuple", v)),
    }
}

fn as_symbol(rt: &Runtime, name: &'static str, v: &Value) -> RuntimeResult<Atom> {
    match v {
        Value::Symbol(atom) => Ok(*atom),
        _ => Err(type_error(rt, name, "symbol", v)),
    }
}

fn as_int32(rt: &Runtime, name: &'static str, v: &Value) -> RuntimeResult<i32> {
    v.as_i32().ok_or_else(|| type_error(rt, name, "Int32", v))
}

fn as_function(rt: &Runtime, name: &'static str, v: &Value) -> RuntimeResult<Value> {
    match v {
        Value::Function(_) | Value::Type(_) => Ok(v.clone()),
        _ => Err(type_error(rt, name, "function", v)),
    }
}

/// A proper type: type constructors unwrap to their bodies, bare type
/// variables are rejected.
fn as_type(rt: &Runtime, name: &'static str, v: &Value) -> RuntimeResult<TypeId> {
    match v {
        Value::Type(id) => {
            let id = rt.types.unwrap_ctor(*id);
            if rt.types.is_var(id) {
                Err(type_error(rt, name, "type", v))
            } else {
                Ok(id)
            }
        }
        _ => Err(type_error(rt, name, "type", v)),
    }
}

/// A type as it may appear inside a signature or parameter list: any type,
/// a type variable, or a tuple of such (which becomes a tuple type).
fn value_as_type(rt: &mut Runtime, name: &'static str, v: &Value) -> RuntimeResult<TypeId> {
    match v {
        Value::Type(id) => Ok(rt.types.unwrap_ctor(*id)),
        Value::Tuple(elements) => {
            let elements = elements.clone();
            let mut ids = Vec::with_capacity(elements.len());
            for e in elements.iter() {
                ids.push(value_as_type(rt, name, e)?);
            }
            Ok(rt.types.tuple_type(ids))
        }
        _ => Err(type_error(rt, name, "type", v)),
    }
}

fn string_bytes(v: &Value) -> Option<Vec<u8>> {
    match v {
        Value::Array(a) if a.elem == TypeId::UINT8 => match &*a.data.borrow() {
            ArrayData::Bits { bytes, .. } => Some(bytes.clone()),
            ArrayData::Refs(_) => None,
        },
        _ => None,
    }
}

// =============================================================================
// Identity, types, assertions
// =============================================================================

pub fn bi_is(_rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    check_nargs("is", args, 2, 2)?;
    Ok(Value::bool_value(args[0].is_egal(&args[1])))
}

pub fn bi_identity(_rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    check_nargs("identity", args, 1, 1)?;
    Ok(args[0].clone())
}

pub fn bi_typeof(rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    check_nargs("typeof", args, 1, 1)?;
    let t = rt.type_of(&args[0]);
    Ok(Value::Type(t))
}

pub fn bi_subtype(rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    check_nargs("subtype", args, 2, 2)?;
    let a = value_as_type(rt, "subtype", &args[0])?;
    let b = value_as_type(rt, "subtype", &args[1])?;
    Ok(Value::bool_value(rt.is_subtype(a, b)))
}

pub fn bi_istype(rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    check_nargs("istype", args, 2, 2)?;
    let target = as_type(rt, "istype", &args[1])?;
    let t = rt.type_of(&args[0]);
    Ok(Value::bool_value(rt.is_subtype(t, target)))
}

pub fn bi_typeassert(rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    check_nargs("typeassert", args, 2, 2)?;
    let target = as_type(rt, "typeassert", &args[1])?;
    let t = rt.type_of(&args[0]);
    if !rt.is_subtype(t, target) {
        return Err(RuntimeError::Assertion);
    }
    Ok(args[0].clone())
}

pub fn bi_apply(rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    check_nargs_min("apply", args, 1)?;
    let f = as_function(rt, "apply", &args[0])?;
    let mut buf: smallvec::SmallVec<[Value; 8]> = smallvec::SmallVec::new();
    for t in &args[1..] {
        let elements = as_tuple(rt, "apply", t)?;
        buf.extend(elements.iter().cloned());
    }
    rt.apply(&f, &buf)
}

pub fn bi_error(rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    check_nargs("error", args, 1, 1)?;
    match string_bytes(&args[0]) {
        Some(bytes) => Err(RuntimeError::User(
            String::from_utf8_lossy(&bytes).into_owned(),
        )),
        None => Err(type_error(rt, "error", "string", &args[0])),
    }
}

// =============================================================================
// Tuples
// =============================================================================

pub fn bi_tuple(_rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    Ok(Value::tuple(args.to_vec()))
}

pub fn bi_tupleref(rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    check_nargs("tupleref", args, 2, 2)?;
    let elements = as_tuple(rt, "tupleref", &args[0])?;
    let i = as_int32(rt, "tupleref", &args[1])? as i64;
    if i < 1 || i as usize > elements.len() {
        return Err(RuntimeError::Bounds {
            container: "tuple",
            index: i,
        });
    }
    Ok(elements[(i - 1) as usize].clone())
}

pub fn bi_tuplelen(rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    check_nargs("tuplelen", args, 1, 1)?;
    let elements = as_tuple(rt, "tuplelen", &args[0])?;
    Ok(Value::int32(elements.len() as i32))
}

// =============================================================================
// Struct fields
// =============================================================================

fn field_offset(rt: &Runtime, ty: TypeId, field: Atom) -> RuntimeResult<usize> {
    let st = match rt.types.get(ty) {
        Type::Struct(st) => st,
        _ => {
            return Err(RuntimeError::Field {
                type_name: rt.type_name(ty),
                field: rt.symbols.resolve(field).to_string(),
            });
        }
    };
    match st.field_names.iter().position(|&n| n == field) {
        Some(i) => Ok(i),
        None => Err(RuntimeError::Field {
            type_name: rt.type_name(ty),
            field: rt.symbols.resolve(field).to_string(),
        }),
    }
}

pub fn bi_getfield(rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    check_nargs("getfield", args, 2, 2)?;
    let field = as_symbol(rt, "getfield", &args[1])?;
    let sv = match &args[0] {
        Value::Struct(sv) => sv.clone(),
        _ => return Err(RuntimeError::NotAStruct { name: "getfield" }),
    };
    let i = field_offset(rt, sv.ty, field)?;
    let fields = sv.fields.borrow();
    Ok(fields[i].clone())
}

pub fn bi_setfield(rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    check_nargs("setfield", args, 3, 3)?;
    let field = as_symbol(rt, "setfield", &args[1])?;
    let sv = match &args[0] {
        Value::Struct(sv) => sv.clone(),
        _ => return Err(RuntimeError::NotAStruct { name: "setfield" }),
    };
    let i = field_offset(rt, sv.ty, field)?;
    let field_ty = match rt.types.get(sv.ty) {
        Type::Struct(st) => match &st.field_types {
            Some(fts) => fts[i],
            None => {
                return Err(RuntimeError::State(
                    "type fields not initialized".to_string(),
                ));
            }
        },
        _ => return Err(RuntimeError::NotAStruct { name: "setfield" }),
    };
    let converted = rt.convert(&args[2], field_ty)?;
    sv.fields.borrow_mut()[i] = converted;
    Ok(args[0].clone())
}

// =============================================================================
// Arrays
// =============================================================================

fn as_array(
    rt: &Runtime,
    name: &'static str,
    v: &Value,
) -> RuntimeResult<Rc<crate::value::ArrayValue>> {
    match v {
        Value::Array(a) => Ok(a.clone()),
        _ => Err(type_error(rt, name, "array", v)),
    }
}

pub fn bi_arraylen(rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    check_nargs("arraylen", args, 1, 1)?;
    let a = as_array(rt, "arraylen", &args[0])?;
    Ok(Value::int32(a.len() as i32))
}

pub fn bi_arrayref(rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    check_nargs("arrayref", args, 2, 2)?;
    let a = as_array(rt, "arrayref", &args[0])?;
    let i = as_int32(rt, "arrayref", &args[1])? as i64;
    if i < 1 || i as usize > a.len() {
        return Err(RuntimeError::Bounds {
            container: "array",
            index: i,
        });
    }
    let idx = (i - 1) as usize;
    match &*a.data.borrow() {
        ArrayData::Bits { elem_size, bytes } => {
            if a.elem == TypeId::BOOL {
                return Ok(Value::bool_value(bytes[idx] != 0));
            }
            let mut raw = [0u8; 8];
            let off = idx * elem_size;
            raw[..*elem_size].copy_from_slice(&bytes[off..off + elem_size]);
            Ok(Value::Bits {
                ty: a.elem,
                bits: u64::from_le_bytes(raw),
            })
        }
        ArrayData::Refs(slots) => match &slots[idx] {
            Some(v) => Ok(v.clone()),
            None => Err(RuntimeError::Undefined(format!(
                "array[{}]: uninitialized reference error",
                i
            ))),
        },
    }
}

pub fn bi_arrayset(rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    check_nargs("arrayset", args, 3, 3)?;
    let a = as_array(rt, "arrayset", &args[0])?;
    let i = as_int32(rt, "arrayset", &args[1])? as i64;
    if i < 1 || i as usize > a.len() {
        return Err(RuntimeError::Bounds {
            container: "array",
            index: i,
        });
    }
    let idx = (i - 1) as usize;
    let rhs = rt.convert(&args[2], a.elem)?;
    match &mut *a.data.borrow_mut() {
        ArrayData::Bits { elem_size, bytes } => {
            let bits = match &rhs {
                Value::Bits { bits, .. } => *bits,
                _ => return Err(type_error(rt, "arrayset", "bits value", &rhs)),
            };
            let off = idx * *elem_size;
            bytes[off..off + *elem_size].copy_from_slice(&bits.to_le_bytes()[..*elem_size]);
        }
        ArrayData::Refs(slots) => {
            slots[idx] = Some(rhs);
        }
    }
    Ok(args[0].clone())
}

// =============================================================================
// Boxes
// =============================================================================

pub fn bi_box(_rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    check_nargs("box", args, 0, 1)?;
    let contents = args.first().cloned();
    Ok(Value::Box(Rc::new(RefCell::new(contents))))
}

pub fn bi_unbox(rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    check_nargs("unbox", args, 1, 1)?;
    match &args[0] {
        Value::Box(cell) => match &*cell.borrow() {
            Some(v) => Ok(v.clone()),
            None => Err(RuntimeError::Undefined("variable not defined".to_string())),
        },
        _ => Err(type_error(rt, "unbox", "box", &args[0])),
    }
}

pub fn bi_boxset(rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    check_nargs("boxset", args, 2, 2)?;
    match &args[0] {
        Value::Box(cell) => {
            *cell.borrow_mut() = Some(args[1].clone());
            Ok(Value::unit())
        }
        _ => Err(type_error(rt, "boxset", "box", &args[0])),
    }
}

// =============================================================================
// User type construction
// =============================================================================

fn all_typevars(rt: &Runtime, params: &[Value]) -> bool {
    params.iter().all(|p| match p {
        Value::Type(id) => rt.types.is_var(*id),
        _ => false,
    })
}

fn typevar_ids(params: &[Value]) -> Vec<TypeId> {
    params
        .iter()
        .filter_map(|p| match p {
            Value::Type(id) => Some(*id),
            _ => None,
        })
        .collect()
}

/// A user supertype must be a tag or struct type, not `Symbol`, and not
/// below the abstract type `Type` or below `Array`.
fn check_supertype(rt: &Runtime, super_ty: TypeId, name: &str) -> RuntimeResult<()> {
    let nominal_ok = rt.types.is_tag(super_ty) || rt.types.is_struct(super_ty);
    if !nominal_ok
        || super_ty == TypeId::SYMBOL
        || rt.is_subtype(super_ty, TypeId::TYPE)
        || rt.is_subtype(super_ty, TypeId::ARRAY)
    {
        return Err(RuntimeError::Subtyping {
            name: name.to_string(),
        });
    }
    Ok(())
}

pub fn bi_new_struct_type(rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    check_nargs("new_struct_type", args, 4, 4)?;
    let name = as_symbol(rt, "new_struct_type", &args[0])?;
    let params = as_tuple(rt, "new_struct_type", &args[2])?.to_vec();
    let fname_values = as_tuple(rt, "new_struct_type", &args[3])?.to_vec();
    if !all_typevars(rt, &params) {
        return Err(type_error(
            rt,
            "new_struct_type",
            "tuple of type variables",
            &args[2],
        ));
    }
    let super_ty = as_type(rt, "new_struct_type", &args[1])?;
    let name_str = rt.symbols.resolve(name).to_string();
    check_supertype(rt, super_ty, &name_str)?;

    let mut field_names = Vec::new();
    if let Type::Struct(sup) = rt.types.get(super_ty) {
        field_names.extend_from_slice(&sup.field_names);
    }
    for v in &fname_values {
        let atom = as_symbol(rt, "new_struct_type", v)?;
        if field_names.contains(&atom) {
            return Err(RuntimeError::State(format!(
                "duplicate field name {} in definition of {}",
                rt.symbols.resolve(atom),
                name_str
            )));
        }
        field_names.push(atom);
    }
    let id = rt
        .types
        .struct_type(name, super_ty, typevar_ids(&params), field_names);
    Ok(Value::Type(id))
}

/// The body of a registered generic constructor: the environment carries
/// the struct type to build.
fn ctor_trampoline(rt: &mut Runtime, env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    let elements = as_tuple(rt, "new", env)?;
    match elements.first() {
        Some(Value::Type(ty)) => {
            let ty = *ty;
            rt.construct_struct(ty, args)
        }
        _ => Err(RuntimeError::State(
            "constructor environment is malformed".to_string(),
        )),
    }
}

pub fn bi_new_struct_fields(rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    check_nargs("new_struct_fields", args, 2, 2)?;
    let ctor_id = match &args[0] {
        Value::Type(id) if rt.types.is_ctor(*id) => *id,
        _ => {
            return Err(type_error(
                rt,
                "new_struct_fields",
                "type constructor",
                &args[0],
            ));
        }
    };
    let body = rt.types.unwrap_ctor(ctor_id);
    let ftype_values = as_tuple(rt, "new_struct_fields", &args[1])?.to_vec();
    let mut ftypes = Vec::with_capacity(ftype_values.len());
    for v in &ftype_values {
        ftypes.push(value_as_type(rt, "new_struct_fields", v)?);
    }

    let (name, super_ty, field_count, already_filled) = match rt.types.get(body) {
        Type::Struct(st) => (
            st.name,
            st.super_ty,
            st.field_names.len(),
            st.field_types.is_some(),
        ),
        _ => {
            return Err(RuntimeError::State(
                "new_struct_fields: not a struct type".to_string(),
            ));
        }
    };
    if already_filled {
        return Err(RuntimeError::State(
            "struct field types already initialized".to_string(),
        ));
    }
    let mut full_types = Vec::new();
    if let Type::Struct(sup) = rt.types.get(super_ty) {
        match &sup.field_types {
            Some(fts) => full_types.extend_from_slice(fts),
            None => {
                return Err(RuntimeError::State(
                    "supertype fields not initialized".to_string(),
                ));
            }
        }
    }
    full_types.extend_from_slice(&ftypes);
    if full_types.len() != field_count {
        return Err(RuntimeError::Type {
            name: "new_struct_fields",
            expected: "one type per declared field",
            got: format!("{} types for {} fields", full_types.len(), field_count),
        });
    }

    // Register the generic constructor.
    let seq_any = TypeId::SEQ_ANY;
    let gf = rt.make_generic(name);
    let ctor_body = Value::Function(Rc::new(FunctionValue::Closure {
        linfo: Rc::new(LambdaInfo {
            ast: Value::unit(),
            fptr: Some(ctor_trampoline as NativeFn),
        }),
        env: Value::tuple(vec![Value::Type(body)]),
    }));
    rt.add_method_to(&gf, vec![seq_any], ctor_body)?;

    if let Type::Struct(st) = rt.types.get_mut(body) {
        st.field_types = Some(full_types);
        st.fnew = Some(gf);
    }
    Ok(Value::unit())
}

pub fn bi_new_type_constructor(
    rt: &mut Runtime,
    _env: &Value,
    args: &[Value],
) -> RuntimeResult<Value> {
    check_nargs("new_type_constructor", args, 2, 2)?;
    let params = as_tuple(rt, "new_type_constructor", &args[0])?.to_vec();
    if !all_typevars(rt, &params) {
        return Err(type_error(
            rt,
            "new_type_constructor",
            "tuple of type variables",
            &args[0],
        ));
    }
    let body = match &args[1] {
        Value::Type(id) => *id,
        _ => {
            return Err(type_error(
                rt,
                "new_type_constructor",
                "type",
                &args[1],
            ));
        }
    };
    let id = rt.types.ctor(typevar_ids(&params), body);
    Ok(Value::Type(id))
}

pub fn bi_new_tag_type(rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    check_nargs("new_tag_type", args, 3, 3)?;
    let name = as_symbol(rt, "new_tag_type", &args[0])?;
    let super_ty = as_type(rt, "new_tag_type", &args[1])?;
    if !rt.types.is_tag(super_ty) {
        return Err(type_error(rt, "new_tag_type", "tag type", &args[1]));
    }
    let params = as_tuple(rt, "new_tag_type", &args[2])?.to_vec();
    if !all_typevars(rt, &params) {
        return Err(type_error(
            rt,
            "new_tag_type",
            "tuple of type variables",
            &args[2],
        ));
    }
    let name_str = rt.symbols.resolve(name).to_string();
    check_supertype(rt, super_ty, &name_str)?;
    let id = rt.types.tag_type(name, super_ty, typevar_ids(&params));
    Ok(Value::Type(id))
}

pub fn bi_typevar(rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    check_nargs("typevar", args, 1, 1)?;
    let name = as_symbol(rt, "typevar", &args[0])?;
    let id = rt.types.type_var(name);
    Ok(Value::Type(id))
}

pub fn bi_instantiate_type(rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    check_nargs_min("instantiate_type", args, 1)?;
    let ctor = match &args[0] {
        Value::Type(id) if rt.types.is_ctor(*id) => *id,
        _ => {
            return Err(type_error(
                rt,
                "instantiate_type",
                "type constructor",
                &args[0],
            ));
        }
    };
    let mut params = Vec::with_capacity(args.len() - 1);
    for v in &args[1..] {
        params.push(value_as_type(rt, "instantiate_type", v)?);
    }
    let id = rt.types.instantiate(ctor, &params)?;
    Ok(Value::Type(id))
}

pub fn bi_union(rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    if args.len() == 1 {
        return Ok(args[0].clone());
    }
    let mut members = Vec::with_capacity(args.len());
    for v in args {
        match v {
            Value::Type(id) => members.push(rt.types.unwrap_ctor(*id)),
            _ => {
                return Err(RuntimeError::Type {
                    name: "Union",
                    expected: "type",
                    got: rt.describe(v),
                });
            }
        }
    }
    let id = rt.types.union_of(members);
    Ok(Value::Type(id))
}

// =============================================================================
// Closures and generic functions
// =============================================================================

pub fn bi_new_closure(rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    check_nargs("new_closure", args, 2, 2)?;
    let linfo = match &args[0] {
        Value::LambdaInfo(li) => li.clone(),
        _ => {
            return Err(type_error(
                rt,
                "new_closure",
                "lambda info",
                &args[0],
            ));
        }
    };
    as_tuple(rt, "new_closure", &args[1])?;
    Ok(Value::Function(Rc::new(FunctionValue::Closure {
        linfo,
        env: args[1].clone(),
    })))
}

pub fn bi_new_generic_function(
    rt: &mut Runtime,
    _env: &Value,
    args: &[Value],
) -> RuntimeResult<Value> {
    check_nargs("new_generic_function", args, 1, 1)?;
    let name = as_symbol(rt, "new_generic_function", &args[0])?;
    Ok(rt.make_generic(name))
}

pub fn bi_add_method(rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    check_nargs("add_method", args, 3, 3)?;
    let sig_values = as_tuple(rt, "add_method", &args[1])?.to_vec();
    let mut signature = Vec::with_capacity(sig_values.len());
    for v in &sig_values {
        signature.push(value_as_type(rt, "add_method", v)?);
    }
    let body = as_function(rt, "add_method", &args[2])?;
    rt.add_method_to(&args[0], signature, body)?;
    Ok(args[0].clone())
}

// =============================================================================
// Conversion entry points
// =============================================================================

pub fn bi_convert(rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    check_nargs("convert", args, 2, 2)?;
    let to = as_type(rt, "convert", &args[1])?;
    rt.convert(&args[0], to)
}

pub fn bi_promote(rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    rt.promote(args)
}

/// Register the conversion method of a bits or struct type. The slot can
/// only be filled once.
pub fn bi_set_conversion(rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    check_nargs("set_conversion", args, 2, 2)?;
    let target = as_type(rt, "set_conversion", &args[0])?;
    let f = as_function(rt, "set_conversion", &args[1])?;
    let name = rt.type_name(target);
    match rt.types.get_mut(target) {
        Type::Bits(b) => {
            if b.fconvert.is_some() {
                return Err(RuntimeError::State(format!(
                    "conversion to {} already defined",
                    name
                )));
            }
            b.fconvert = Some(f);
        }
        Type::Struct(st) => {
            if st.fconvert.is_some() {
                return Err(RuntimeError::State(format!(
                    "conversion to {} already defined",
                    name
                )));
            }
            st.fconvert = Some(f);
        }
        _ => {
            return Err(RuntimeError::Type {
                name: "set_conversion",
                expected: "bits or struct type",
                got: name,
            });
        }
    }
    Ok(Value::unit())
}

// =============================================================================
// Expressions
// =============================================================================

/// Build an `Expr` value from a head symbol and argument tuple.
pub fn bi_expr(rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    check_nargs_min("expr", args, 1)?;
    let head = as_symbol(rt, "expr", &args[0])?;
    let rest = Value::tuple(args[1..].to_vec());
    Ok(Value::Expr(Rc::new(ExprValue { head, args: rest })))
}
