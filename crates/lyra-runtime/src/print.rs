//! The print subsystem.
//!
//! `print` is a generic function with one builtin method per kind, plus a
//! fallback over `Any` that covers tuples, types, functions, structs, and
//! raw bits payloads. User methods on more specific types win over the
//! fallback through ordinary dispatch.

use lyra_common::numeric::{format_float32, format_float64};

use crate::builtins::check_nargs;
use crate::context::{OutputStream, Runtime};
use crate::error::{RuntimeError, RuntimeResult};
use crate::types::{Type, TypeId};
use crate::value::{FunctionValue, Value};

impl Runtime {
    /// Print a value through the `print` generic function.
    pub fn print_value(&mut self, v: &Value) -> RuntimeResult<()> {
        let gf = match &self.print_gf {
            Some(gf) => gf.clone(),
            None => {
                return Err(RuntimeError::State(
                    "print subsystem not initialized".to_string(),
                ));
            }
        };
        self.apply(&gf, std::slice::from_ref(v))?;
        Ok(())
    }

    /// Render a value into a string. The current output stream is swapped
    /// for an in-memory buffer and restored on every exit path, including
    /// a printing error.
    pub fn print_to_string(&mut self, v: &Value) -> RuntimeResult<String> {
        let saved = self.swap_output(OutputStream::Buffer(Vec::new()));
        let result = self.print_value(v);
        let buffer = self.swap_output(saved);
        result?;
        match buffer {
            OutputStream::Buffer(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            OutputStream::Stdout => Err(RuntimeError::State(
                "output stream was replaced during printing".to_string(),
            )),
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Print a comma-separated sequence. `comma_one` prints a trailing comma
/// for a single element, as in `(x,)`.
fn print_delimited(
    rt: &mut Runtime,
    elements: &[Value],
    open: char,
    close: char,
    comma_one: bool,
) -> RuntimeResult<()> {
    let mut buf = [0u8; 4];
    rt.write_str(open.encode_utf8(&mut buf));
    let n = elements.len();
    for (i, e) in elements.iter().enumerate() {
        rt.print_value(e)?;
        if i < n - 1 || (n == 1 && comma_one) {
            rt.write_str(",");
        }
    }
    rt.write_str(close.encode_utf8(&mut buf));
    Ok(())
}

fn print_type(rt: &mut Runtime, t: TypeId) -> RuntimeResult<()> {
    match rt.types.get(t).clone() {
        Type::Func(_) => {
            rt.write_str("Function");
            Ok(())
        }
        Type::Union(u) => {
            rt.write_str("Union");
            let members: Vec<Value> = u.members.iter().map(|&m| Value::Type(m)).collect();
            print_delimited(rt, &members, '(', ')', false)
        }
        Type::Seq(inner) => {
            rt.print_value(&Value::Type(inner))?;
            rt.write_str("...");
            Ok(())
        }
        Type::Var(v) => {
            let name = rt.symbols.resolve(v.name).to_string();
            rt.write_str(&name);
            Ok(())
        }
        Type::Ctor(c) => print_type(rt, c.body),
        Type::Tuple(elements) => {
            let elements: Vec<Value> = elements.iter().map(|&e| Value::Type(e)).collect();
            print_delimited(rt, &elements, '(', ')', true)
        }
        Type::Bits(b) => print_nominal(rt, b.name, &b.params),
        Type::Struct(s) => print_nominal(rt, s.name, &s.params),
        Type::Tag(tag) => print_nominal(rt, tag.name, &tag.params),
    }
}

fn print_nominal(rt: &mut Runtime, name: lyra_common::Atom, params: &[TypeId]) -> RuntimeResult<()> {
    let name = rt.symbols.resolve(name).to_string();
    rt.write_str(&name);
    if !params.is_empty() {
        let params: Vec<Value> = params.iter().map(|&p| Value::Type(p)).collect();
        print_delimited(rt, &params, '{', '}', false)?;
    }
    Ok(())
}

fn print_function(rt: &mut Runtime, v: &Value) -> RuntimeResult<()> {
    match v {
        Value::Function(fv) => match &**fv {
            FunctionValue::Generic(cell) => {
                let name = rt.symbols.resolve(cell.borrow().name).to_string();
                rt.write_str("#<generic-function ");
                rt.write_str(&name);
                rt.write_str(">");
                Ok(())
            }
            _ => {
                rt.write_str("#<closure>");
                Ok(())
            }
        },
        _ => {
            rt.write_str("#<closure>");
            Ok(())
        }
    }
}

fn print_uint_payload(rt: &mut Runtime, bits: u64, nbits: u32) -> RuntimeResult<()> {
    let text = match nbits {
        8 => (bits as u8).to_string(),
        16 => (bits as u16).to_string(),
        32 => (bits as u32).to_string(),
        64 => bits.to_string(),
        _ => {
            return Err(RuntimeError::User(
                "print: unsupported integer size".to_string(),
            ));
        }
    };
    rt.write_str(&text);
    Ok(())
}

fn bits_payload(rt: &Runtime, name: &'static str, v: &Value) -> RuntimeResult<u64> {
    match v {
        Value::Bits { bits, .. } => Ok(*bits),
        _ => Err(RuntimeError::Type {
            name,
            expected: "bits value",
            got: rt.describe(v),
        }),
    }
}

// =============================================================================
// Builtin print methods
// =============================================================================

pub fn print_any(rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    check_nargs("print", args, 1, 1)?;
    let v = &args[0];
    match v {
        Value::Tuple(elements) => {
            let elements = elements.clone();
            print_delimited(rt, &elements, '(', ')', true)?;
        }
        Value::Type(t) => print_type(rt, *t)?,
        Value::Function(_) => print_function(rt, v)?,
        Value::Symbol(_) => {
            print_symbol(rt, _env, args)?;
        }
        Value::Expr(e) => {
            let e = e.clone();
            rt.write_str("Expr(");
            rt.print_value(&Value::Symbol(e.head))?;
            rt.write_str(",");
            rt.print_value(&e.args)?;
            rt.write_str(")");
        }
        Value::Box(cell) => {
            let contents = cell.borrow().clone();
            rt.write_str("Box(");
            if let Some(inner) = contents {
                rt.print_value(&inner)?;
            }
            rt.write_str(")");
        }
        Value::LambdaInfo(_) => {
            print_linfo(rt, _env, args)?;
        }
        Value::Array(_) => {
            rt.write_str("#<array>");
        }
        Value::Bits { ty, bits } => {
            // Fallback for bits kinds without a dedicated method: print the
            // payload as an unsigned integer of the declared width.
            let nbits = rt.types.nbits(*ty).unwrap_or(64);
            print_uint_payload(rt, *bits, nbits)?;
        }
        Value::Struct(sv) => {
            let sv = sv.clone();
            let name = rt.type_name(sv.ty);
            rt.write_str(&name);
            let fields = sv.fields.borrow().clone();
            print_delimited(rt, &fields, '(', ')', false)?;
        }
    }
    Ok(Value::unit())
}

pub fn print_symbol(rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    check_nargs("print", args, 1, 1)?;
    match &args[0] {
        Value::Symbol(atom) => {
            let name = rt.symbols.resolve(*atom).to_string();
            rt.write_str("`");
            rt.write_str(&name);
            Ok(Value::unit())
        }
        _ => Err(RuntimeError::Type {
            name: "print",
            expected: "symbol",
            got: rt.describe(&args[0]),
        }),
    }
}

pub fn print_typevar(rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    check_nargs("print", args, 1, 1)?;
    match &args[0] {
        Value::Type(id) => match rt.types.get(*id) {
            Type::Var(v) => {
                let name = rt.symbols.resolve(v.name).to_string();
                rt.write_str(&name);
                Ok(Value::unit())
            }
            _ => print_any(rt, _env, args),
        },
        _ => print_any(rt, _env, args),
    }
}

pub fn print_linfo(rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    check_nargs("print", args, 1, 1)?;
    match &args[0] {
        Value::LambdaInfo(li) => {
            let ast = li.ast.clone();
            rt.write_str("AST(");
            rt.print_value(&ast)?;
            rt.write_str(")");
            Ok(Value::unit())
        }
        _ => Err(RuntimeError::Type {
            name: "print",
            expected: "lambda info",
            got: rt.describe(&args[0]),
        }),
    }
}

pub fn print_string(rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    check_nargs("print", args, 1, 1)?;
    match &args[0] {
        Value::Array(a) => {
            let bytes = match &*a.data.borrow() {
                crate::value::ArrayData::Bits { bytes, .. } => bytes.clone(),
                crate::value::ArrayData::Refs(_) => Vec::new(),
            };
            rt.write_bytes(&bytes);
            Ok(Value::unit())
        }
        _ => Err(RuntimeError::Type {
            name: "print",
            expected: "string",
            got: rt.describe(&args[0]),
        }),
    }
}

pub fn print_bool(rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    check_nargs("print", args, 1, 1)?;
    let bits = bits_payload(rt, "print", &args[0])?;
    rt.write_str(if bits == 0 { "false" } else { "true" });
    Ok(Value::unit())
}

pub fn print_float32(rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    check_nargs("print", args, 1, 1)?;
    let bits = bits_payload(rt, "print", &args[0])?;
    let text = format_float32(f32::from_bits(bits as u32));
    rt.write_str(&text);
    Ok(Value::unit())
}

pub fn print_float64(rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
    check_nargs("print", args, 1, 1)?;
    let bits = bits_payload(rt, "print", &args[0])?;
    let text = format_float64(f64::from_bits(bits));
    rt.write_str(&text);
    Ok(Value::unit())
}

macro_rules! int_print_fn {
    ($fname:ident, $ty:ty) => {
        pub fn $fname(rt: &mut Runtime, _env: &Value, args: &[Value]) -> RuntimeResult<Value> {
            check_nargs("print", args, 1, 1)?;
            let bits = bits_payload(rt, "print", &args[0])?;
            let text = (bits as $ty).to_string();
            rt.write_str(&text);
            Ok(Value::unit())
        }
    };
}

int_print_fn!(print_int8, i8);
int_print_fn!(print_uint8, u8);
int_print_fn!(print_int16, i16);
int_print_fn!(print_uint16, u16);
int_print_fn!(print_int32, i32);
int_print_fn!(print_uint32, u32);
int_print_fn!(print_int64, i64);
int_print_fn!(print_uint64, u64);
