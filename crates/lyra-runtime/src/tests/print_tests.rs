//! Print subsystem tests: formatting per kind, dispatch to user methods,
//! and output-stream restoration.

use super::{call, define_complex};
use crate::context::OutputStream;
use crate::types::{BitsType, Type, TypeId};
use crate::value::Value;
use crate::{Runtime, RuntimeResult};

fn printed(rt: &mut Runtime, v: &Value) -> String {
    rt.print_to_string(v).unwrap()
}

// =============================================================================
// Tuples
// =============================================================================

#[test]
fn tuples_print_with_commas() {
    let mut rt = Runtime::new();
    let t = Value::tuple(vec![Value::int32(1), Value::int32(2), Value::int32(3)]);
    assert_eq!(printed(&mut rt, &t), "(1,2,3)");
    let empty = Value::unit();
    assert_eq!(printed(&mut rt, &empty), "()");
}

#[test]
fn singleton_tuple_prints_a_trailing_comma() {
    let mut rt = Runtime::new();
    let t = Value::tuple(vec![Value::int32(7)]);
    assert_eq!(printed(&mut rt, &t), "(7,)");
}

// =============================================================================
// Scalars
// =============================================================================

#[test]
fn bools_print_as_literals() {
    let mut rt = Runtime::new();
    assert_eq!(printed(&mut rt, &Value::bool_value(true)), "true");
    assert_eq!(printed(&mut rt, &Value::bool_value(false)), "false");
}

#[test]
fn signed_integers_print_with_sign() {
    let mut rt = Runtime::new();
    assert_eq!(printed(&mut rt, &Value::int8(-5)), "-5");
    assert_eq!(printed(&mut rt, &Value::int16(-300)), "-300");
    assert_eq!(printed(&mut rt, &Value::int32(-70000)), "-70000");
    assert_eq!(printed(&mut rt, &Value::int64(-5_000_000_000)), "-5000000000");
    assert_eq!(printed(&mut rt, &Value::int32(42)), "42");
}

#[test]
fn unsigned_integers_print_without_sign() {
    let mut rt = Runtime::new();
    assert_eq!(printed(&mut rt, &Value::uint8(200)), "200");
    assert_eq!(printed(&mut rt, &Value::uint16(60000)), "60000");
    assert_eq!(printed(&mut rt, &Value::uint32(4_000_000_000)), "4000000000");
    assert_eq!(
        printed(&mut rt, &Value::uint64(18_000_000_000_000_000_000)),
        "18000000000000000000"
    );
}

#[test]
fn floats_print_with_a_decimal_point() {
    let mut rt = Runtime::new();
    assert_eq!(printed(&mut rt, &Value::float64(2.0)), "2.0");
    assert_eq!(printed(&mut rt, &Value::float64(-0.5)), "-0.5");
    assert_eq!(printed(&mut rt, &Value::float32(1.5)), "1.5");
}

#[test]
fn float_specials() {
    let mut rt = Runtime::new();
    assert_eq!(printed(&mut rt, &Value::float64(f64::NAN)), "+NaN");
    assert_eq!(printed(&mut rt, &Value::float64(-f64::NAN)), "-NaN");
    assert_eq!(printed(&mut rt, &Value::float64(f64::INFINITY)), "+Inf");
    assert_eq!(printed(&mut rt, &Value::float64(f64::NEG_INFINITY)), "-Inf");
    assert_eq!(printed(&mut rt, &Value::float64(-0.0)), "-0.0");
    assert_eq!(
        printed(&mut rt, &Value::float32(f32::INFINITY)),
        "float32(+Inf)"
    );
    assert_eq!(
        printed(&mut rt, &Value::float32(f32::NEG_INFINITY)),
        "float32(-Inf)"
    );
}

#[test]
fn printed_integers_read_back_identically() {
    let mut rt = Runtime::new();
    for v in [i32::MIN, -1, 0, 1, i32::MAX] {
        let s = printed(&mut rt, &Value::int32(v));
        assert_eq!(s.parse::<i32>().unwrap(), v);
    }
}

#[test]
fn printed_floats_read_back_identically() {
    let mut rt = Runtime::new();
    for v in [0.1, 1.0 / 3.0, 1e-300, 6.02214076e23] {
        let s = printed(&mut rt, &Value::float64(v));
        assert_eq!(s.parse::<f64>().unwrap(), v);
    }
}

// =============================================================================
// Symbols and strings
// =============================================================================

#[test]
fn symbols_print_with_a_backtick() {
    let mut rt = Runtime::new();
    let s = rt.symbol("hello");
    assert_eq!(printed(&mut rt, &s), "`hello");
}

#[test]
fn strings_print_raw_bytes() {
    let mut rt = Runtime::new();
    let s = Value::string("hello world");
    assert_eq!(printed(&mut rt, &s), "hello world");
}

// =============================================================================
// Types
// =============================================================================

#[test]
fn nominal_types_print_name_and_parameters() {
    let mut rt = Runtime::new();
    assert_eq!(printed(&mut rt, &Value::Type(TypeId::INT32)), "Int32");
    assert_eq!(printed(&mut rt, &Value::Type(TypeId::ANY)), "Any");
    assert_eq!(
        printed(&mut rt, &Value::Type(TypeId::STRING)),
        "Array{Uint8}"
    );
}

#[test]
fn union_types_print_their_members() {
    let mut rt = Runtime::new();
    let u = rt.types.union_of(vec![TypeId::INT32, TypeId::FLOAT64]);
    assert_eq!(printed(&mut rt, &Value::Type(u)), "Union(Int32,Float64)");
    assert_eq!(printed(&mut rt, &Value::Type(TypeId::BOTTOM)), "Union()");
}

#[test]
fn sequence_types_print_with_dots() {
    let mut rt = Runtime::new();
    let seq = rt.types.seq(TypeId::INT32);
    assert_eq!(printed(&mut rt, &Value::Type(seq)), "Int32...");
}

#[test]
fn function_types_print_as_function() {
    let mut rt = Runtime::new();
    assert_eq!(printed(&mut rt, &Value::Type(TypeId::FUNCTION)), "Function");
}

#[test]
fn tuple_types_print_like_tuples() {
    let mut rt = Runtime::new();
    let t = rt.types.tuple_type(vec![TypeId::INT32, TypeId::FLOAT64]);
    assert_eq!(printed(&mut rt, &Value::Type(t)), "(Int32,Float64)");
}

#[test]
fn type_constructors_print_their_body() {
    let mut rt = Runtime::new();
    let array_ctor = rt.global("Array").unwrap().clone();
    assert_eq!(printed(&mut rt, &array_ctor), "Array{T}");
}

// =============================================================================
// Functions
// =============================================================================

#[test]
fn generic_functions_print_their_name() {
    let mut rt = Runtime::new();
    let print_gf = rt.global("print").unwrap().clone();
    assert_eq!(printed(&mut rt, &print_gf), "#<generic-function print>");
}

#[test]
fn builtins_print_as_closures() {
    let mut rt = Runtime::new();
    let f = rt.global("tuple").unwrap().clone();
    assert_eq!(printed(&mut rt, &f), "#<closure>");
}

// =============================================================================
// Structs
// =============================================================================

#[test]
fn struct_instances_print_fields_in_order() {
    let mut rt = Runtime::new();
    let tc = define_complex(&mut rt);
    let int32 = rt.global("Int32").unwrap().clone();
    let c_i32 = call(&mut rt, "instantiate_type", &[tc, int32]).unwrap();
    let z = rt
        .apply(&c_i32, &[Value::int32(1), Value::int32(2)])
        .unwrap();
    assert_eq!(printed(&mut rt, &z), "Complex(1,2)");
}

// =============================================================================
// Dispatch to user methods
// =============================================================================

fn print_custom(rt: &mut Runtime, _env: &Value, _args: &[Value]) -> RuntimeResult<Value> {
    rt.write_str("<mykind>");
    Ok(Value::unit())
}

#[test]
fn user_methods_override_the_fallback() {
    let mut rt = Runtime::new();
    let name = rt.symbol("MyKind");
    let any = rt.global("Any").unwrap().clone();
    let no_params = Value::tuple(vec![]);
    let st = call(
        &mut rt,
        "new_struct_type",
        &[name, any, no_params.clone(), Value::tuple(vec![])],
    )
    .unwrap();
    let tc = call(&mut rt, "new_type_constructor", &[no_params, st.clone()]).unwrap();
    call(&mut rt, "new_struct_fields", &[tc, Value::tuple(vec![])]).unwrap();
    let m = rt.apply(&st, &[]).unwrap();

    // Before the method: the struct fallback.
    assert_eq!(printed(&mut rt, &m), "MyKind()");

    let print_gf = rt.global("print").unwrap().clone();
    let body = Value::builtin("print_custom", print_custom);
    call(
        &mut rt,
        "add_method",
        &[print_gf, Value::tuple(vec![st]), body],
    )
    .unwrap();
    assert_eq!(printed(&mut rt, &m), "<mykind>");
}

// =============================================================================
// Fallback bits printing and stream restoration
// =============================================================================

#[test]
fn unknown_bits_types_print_as_unsigned() {
    let mut rt = Runtime::new();
    let name = rt.intern("Opaque16");
    let ty = rt.types.alloc(Type::Bits(Box::new(BitsType {
        name,
        super_ty: TypeId::ANY,
        params: vec![],
        nbits: 16,
        fconvert: None,
    })));
    let v = Value::Bits { ty, bits: 0xFFFF };
    assert_eq!(printed(&mut rt, &v), "65535");
}

#[test]
fn print_errors_restore_the_output_stream() {
    let mut rt = Runtime::new();
    let name = rt.intern("Odd24");
    let ty = rt.types.alloc(Type::Bits(Box::new(BitsType {
        name,
        super_ty: TypeId::ANY,
        params: vec![],
        nbits: 24,
        fconvert: None,
    })));
    let v = Value::Bits { ty, bits: 1 };
    assert!(rt.print_to_string(&v).is_err());
    assert!(matches!(rt.output, OutputStream::Stdout));
    // Printing still works afterwards.
    assert_eq!(printed(&mut rt, &Value::int32(3)), "3");
}
