//! Builtin operation tests: tuples, boxes, arrays, fields, user types.

use super::{call, define_complex};
use crate::error::RuntimeError;
use crate::types::TypeId;
use crate::value::Value;
use crate::Runtime;

// =============================================================================
// Identity and type queries
// =============================================================================

#[test]
fn is_compares_identities() {
    let mut rt = Runtime::new();
    let a = rt.symbol("a");
    let a2 = rt.symbol("a");
    let b = rt.symbol("b");
    assert_eq!(call(&mut rt, "is", &[a.clone(), a2]).unwrap().as_bool(), Some(true));
    assert_eq!(call(&mut rt, "is", &[a, b]).unwrap().as_bool(), Some(false));
    assert_eq!(
        call(&mut rt, "is", &[Value::int32(1), Value::int32(1)])
            .unwrap()
            .as_bool(),
        Some(true)
    );
    let b1 = call(&mut rt, "box", &[]).unwrap();
    let b2 = call(&mut rt, "box", &[]).unwrap();
    assert_eq!(call(&mut rt, "is", &[b1.clone(), b1.clone()]).unwrap().as_bool(), Some(true));
    assert_eq!(call(&mut rt, "is", &[b1, b2]).unwrap().as_bool(), Some(false));
}

#[test]
fn typeof_returns_the_type_value() {
    let mut rt = Runtime::new();
    let t = call(&mut rt, "typeof", &[Value::int32(1)]).unwrap();
    assert!(t.is_egal(&Value::Type(TypeId::INT32)));
    let s = rt.symbol("s");
    let t = call(&mut rt, "typeof", &[s]).unwrap();
    assert!(t.is_egal(&Value::Type(TypeId::SYMBOL)));
}

#[test]
fn every_value_istype_its_own_type() {
    let mut rt = Runtime::new();
    let values = [
        Value::int32(3),
        Value::float64(1.5),
        Value::bool_value(true),
        rt.symbol("sym"),
        Value::tuple(vec![Value::int32(1), Value::int32(2)]),
        Value::string("hi"),
        Value::Type(TypeId::INT32),
    ];
    for v in values {
        let t = call(&mut rt, "typeof", &[v.clone()]).unwrap();
        let ok = call(&mut rt, "istype", &[v, t]).unwrap();
        assert_eq!(ok.as_bool(), Some(true));
    }
}

#[test]
fn typeassert_returns_or_raises() {
    let mut rt = Runtime::new();
    let number = rt.global("Number").unwrap().clone();
    let v = call(&mut rt, "typeassert", &[Value::int32(1), number]).unwrap();
    assert_eq!(v.as_i32(), Some(1));
    let symbol_ty = rt.global("Symbol").unwrap().clone();
    let err = call(&mut rt, "typeassert", &[Value::int32(1), symbol_ty]).unwrap_err();
    assert!(matches!(err, RuntimeError::Assertion));
}

#[test]
fn istype_rejects_non_type_targets() {
    let mut rt = Runtime::new();
    let err = call(&mut rt, "istype", &[Value::int32(1), Value::int32(2)]).unwrap_err();
    assert!(matches!(err, RuntimeError::Type { .. }));
}

// =============================================================================
// Tuples
// =============================================================================

#[test]
fn tuple_roundtrip_and_bounds() {
    let mut rt = Runtime::new();
    let t = call(
        &mut rt,
        "tuple",
        &[Value::int32(10), Value::int32(20), Value::int32(30)],
    )
    .unwrap();
    let len = call(&mut rt, "tuplelen", &[t.clone()]).unwrap();
    assert_eq!(len.as_i32(), Some(3));
    for i in 1..=3 {
        let e = call(&mut rt, "tupleref", &[t.clone(), Value::int32(i)]).unwrap();
        assert_eq!(e.as_i32(), Some(i * 10));
    }
    let err = call(&mut rt, "tupleref", &[t.clone(), Value::int32(0)]).unwrap_err();
    assert!(matches!(err, RuntimeError::Bounds { .. }));
    let err = call(&mut rt, "tupleref", &[t, Value::int32(4)]).unwrap_err();
    assert!(matches!(err, RuntimeError::Bounds { .. }));
}

// =============================================================================
// Boxes
// =============================================================================

#[test]
fn box_unbox_roundtrip() {
    let mut rt = Runtime::new();
    let b = call(&mut rt, "box", &[Value::int32(9)]).unwrap();
    let v = call(&mut rt, "unbox", &[b]).unwrap();
    assert_eq!(v.as_i32(), Some(9));
}

#[test]
fn empty_box_is_undefined() {
    let mut rt = Runtime::new();
    let b = call(&mut rt, "box", &[]).unwrap();
    let err = call(&mut rt, "unbox", &[b.clone()]).unwrap_err();
    assert!(matches!(err, RuntimeError::Undefined(_)));
    call(&mut rt, "boxset", &[b.clone(), Value::int32(4)]).unwrap();
    let v = call(&mut rt, "unbox", &[b]).unwrap();
    assert_eq!(v.as_i32(), Some(4));
}

// =============================================================================
// Arrays
// =============================================================================

#[test]
fn bits_array_roundtrip_one_based() {
    let mut rt = Runtime::new();
    let a = rt.new_array(TypeId::INT32, 3).unwrap();
    let len = call(&mut rt, "arraylen", &[a.clone()]).unwrap();
    assert_eq!(len.as_i32(), Some(3));
    for i in 1..=3 {
        call(
            &mut rt,
            "arrayset",
            &[a.clone(), Value::int32(i), Value::int32(i * 100)],
        )
        .unwrap();
    }
    for i in 1..=3 {
        let e = call(&mut rt, "arrayref", &[a.clone(), Value::int32(i)]).unwrap();
        assert_eq!(e.as_i32(), Some(i * 100));
    }
    let err = call(&mut rt, "arrayref", &[a.clone(), Value::int32(0)]).unwrap_err();
    assert!(matches!(err, RuntimeError::Bounds { .. }));
    let err = call(&mut rt, "arrayref", &[a, Value::int32(4)]).unwrap_err();
    assert!(matches!(err, RuntimeError::Bounds { .. }));
}

#[test]
fn reference_array_slots_start_uninitialized() {
    let mut rt = Runtime::new();
    let a = rt.new_array(TypeId::SYMBOL, 2).unwrap();
    let err = call(&mut rt, "arrayref", &[a.clone(), Value::int32(1)]).unwrap_err();
    assert!(matches!(err, RuntimeError::Undefined(_)));
    let s = rt.symbol("x");
    call(&mut rt, "arrayset", &[a.clone(), Value::int32(1), s.clone()]).unwrap();
    let v = call(&mut rt, "arrayref", &[a, Value::int32(1)]).unwrap();
    assert!(v.is_egal(&s));
}

#[test]
fn bool_arrays_read_back_as_bools() {
    let mut rt = Runtime::new();
    let a = rt.new_array(TypeId::BOOL, 2).unwrap();
    call(
        &mut rt,
        "arrayset",
        &[a.clone(), Value::int32(2), Value::bool_value(true)],
    )
    .unwrap();
    let v = call(&mut rt, "arrayref", &[a.clone(), Value::int32(2)]).unwrap();
    assert_eq!(v.as_bool(), Some(true));
    let v = call(&mut rt, "arrayref", &[a, Value::int32(1)]).unwrap();
    assert_eq!(v.as_bool(), Some(false));
}

// =============================================================================
// Struct fields
// =============================================================================

#[test]
fn getfield_and_setfield_with_conversion() {
    let mut rt = Runtime::new();
    let tc = define_complex(&mut rt);
    let int32 = rt.global("Int32").unwrap().clone();
    let c_i32 = call(&mut rt, "instantiate_type", &[tc, int32]).unwrap();
    let z = rt
        .apply(&c_i32, &[Value::int32(1), Value::int32(2)])
        .unwrap();

    let re = rt.symbol("re");
    let v = call(&mut rt, "getfield", &[z.clone(), re.clone()]).unwrap();
    assert_eq!(v.as_i32(), Some(1));

    call(&mut rt, "setfield", &[z.clone(), re.clone(), Value::int32(7)]).unwrap();
    let v = call(&mut rt, "getfield", &[z.clone(), re]).unwrap();
    assert_eq!(v.as_i32(), Some(7));

    // No conversion from Float64 to Int32 is registered.
    let im = rt.symbol("im");
    let err = call(&mut rt, "setfield", &[z.clone(), im, Value::float64(1.0)]).unwrap_err();
    assert!(matches!(err, RuntimeError::Conversion(_)));

    let missing = rt.symbol("missing");
    let err = call(&mut rt, "getfield", &[z, missing]).unwrap_err();
    assert!(matches!(err, RuntimeError::Field { .. }));

    let s = rt.symbol("re");
    let err = call(&mut rt, "getfield", &[Value::int32(1), s]).unwrap_err();
    assert!(matches!(err, RuntimeError::NotAStruct { .. }));
}

// =============================================================================
// User type construction
// =============================================================================

#[test]
fn two_phase_struct_definition() {
    let mut rt = Runtime::new();
    let name = rt.symbol("Point");
    let any = rt.global("Any").unwrap().clone();
    let params = Value::tuple(vec![]);
    let x = rt.symbol("x");
    let y = rt.symbol("y");
    let fnames = Value::tuple(vec![x, y]);
    let st = call(&mut rt, "new_struct_type", &[name, any, params.clone(), fnames]).unwrap();
    let tc = call(&mut rt, "new_type_constructor", &[params, st.clone()]).unwrap();

    // Construction before the fields are filled is a state error.
    let err = rt.apply(&st, &[Value::int32(1), Value::int32(2)]).unwrap_err();
    assert!(matches!(err, RuntimeError::State(_)));

    let int32 = rt.global("Int32").unwrap().clone();
    let ftypes = Value::tuple(vec![int32.clone(), int32]);
    call(&mut rt, "new_struct_fields", &[tc.clone(), ftypes.clone()]).unwrap();

    let p = rt.apply(&st, &[Value::int32(3), Value::int32(4)]).unwrap();
    let x = rt.symbol("x");
    let v = call(&mut rt, "getfield", &[p.clone(), x]).unwrap();
    assert_eq!(v.as_i32(), Some(3));

    // Filling the fields twice is a state error.
    let err = call(&mut rt, "new_struct_fields", &[tc, ftypes]).unwrap_err();
    assert!(matches!(err, RuntimeError::State(_)));

    // Wrong arity through the registered constructor.
    let err = rt.apply(&st, &[Value::int32(1)]).unwrap_err();
    assert!(matches!(err, RuntimeError::TooFewArgs { .. }));
}

#[test]
fn struct_fields_include_supertype_fields() {
    let mut rt = Runtime::new();
    let any = rt.global("Any").unwrap().clone();
    let no_params = Value::tuple(vec![]);

    let base_name = rt.symbol("Base");
    let a = rt.symbol("a");
    let base = call(
        &mut rt,
        "new_struct_type",
        &[base_name, any, no_params.clone(), Value::tuple(vec![a])],
    )
    .unwrap();
    let base_tc = call(&mut rt, "new_type_constructor", &[no_params.clone(), base.clone()]).unwrap();
    let int32 = rt.global("Int32").unwrap().clone();
    call(
        &mut rt,
        "new_struct_fields",
        &[base_tc, Value::tuple(vec![int32.clone()])],
    )
    .unwrap();

    let derived_name = rt.symbol("Derived");
    let b = rt.symbol("b");
    let derived = call(
        &mut rt,
        "new_struct_type",
        &[derived_name, base, no_params.clone(), Value::tuple(vec![b])],
    )
    .unwrap();
    let derived_tc =
        call(&mut rt, "new_type_constructor", &[no_params, derived.clone()]).unwrap();
    let symbol_ty = rt.global("Symbol").unwrap().clone();
    call(
        &mut rt,
        "new_struct_fields",
        &[derived_tc, Value::tuple(vec![symbol_ty])],
    )
    .unwrap();

    let s = rt.symbol("tag");
    let d = rt.apply(&derived, &[Value::int32(1), s.clone()]).unwrap();
    let a = rt.symbol("a");
    let v = call(&mut rt, "getfield", &[d.clone(), a]).unwrap();
    assert_eq!(v.as_i32(), Some(1));
    let b = rt.symbol("b");
    let v = call(&mut rt, "getfield", &[d, b]).unwrap();
    assert!(v.is_egal(&s));
}

#[test]
fn invalid_supertypes_are_rejected() {
    let mut rt = Runtime::new();
    let name = rt.symbol("Bad");
    let no_params = Value::tuple(vec![]);
    for super_name in ["Symbol", "Type", "BitsKind", "Int32"] {
        let super_v = rt.global(super_name).unwrap().clone();
        let name = name.clone();
        let err = call(
            &mut rt,
            "new_tag_type",
            &[name, super_v, no_params.clone()],
        )
        .unwrap_err();
        assert!(
            matches!(err, RuntimeError::Subtyping { .. } | RuntimeError::Type { .. }),
            "supertype {} must be rejected",
            super_name
        );
    }
}

#[test]
fn tag_types_form_new_lattice_nodes() {
    let mut rt = Runtime::new();
    let name = rt.symbol("MyNumber");
    let number = rt.global("Number").unwrap().clone();
    let no_params = Value::tuple(vec![]);
    let t = call(&mut rt, "new_tag_type", &[name, number.clone(), no_params]).unwrap();
    let result = call(&mut rt, "subtype", &[t, number]).unwrap();
    assert_eq!(result.as_bool(), Some(true));
}

// =============================================================================
// Unions and type variables
// =============================================================================

#[test]
fn union_normalizes_duplicates() {
    let mut rt = Runtime::new();
    let int32 = rt.global("Int32").unwrap().clone();
    let u = call(&mut rt, "Union", &[int32.clone(), int32.clone()]).unwrap();
    assert!(u.is_egal(&Value::Type(TypeId::INT32)));
}

#[test]
fn union_of_two_is_a_supertype_of_both() {
    let mut rt = Runtime::new();
    let int32 = rt.global("Int32").unwrap().clone();
    let float64 = rt.global("Float64").unwrap().clone();
    let u = call(&mut rt, "Union", &[int32.clone(), float64.clone()]).unwrap();
    let k = call(&mut rt, "typeof", &[u.clone()]).unwrap();
    assert!(k.is_egal(&Value::Type(TypeId::UNION_KIND)));
    for v in [int32, float64] {
        let result = call(&mut rt, "subtype", &[v, u.clone()]).unwrap();
        assert_eq!(result.as_bool(), Some(true));
    }
}

#[test]
fn union_drops_subsumed_members() {
    let mut rt = Runtime::new();
    let int32 = rt.global("Int32").unwrap().clone();
    let number = rt.global("Number").unwrap().clone();
    let u = call(&mut rt, "Union", &[int32, number]).unwrap();
    assert!(u.is_egal(&Value::Type(TypeId::NUMBER)));
}

#[test]
fn typevar_has_default_bounds() {
    let mut rt = Runtime::new();
    let n = rt.symbol("T");
    let tv = call(&mut rt, "typevar", &[n]).unwrap();
    let k = call(&mut rt, "typeof", &[tv]).unwrap();
    assert!(k.is_egal(&Value::Type(TypeId::TYPEVAR)));
}

#[test]
fn instantiate_type_checks_its_operand() {
    let mut rt = Runtime::new();
    let int32 = rt.global("Int32").unwrap().clone();
    let err = call(&mut rt, "instantiate_type", &[int32.clone(), int32]).unwrap_err();
    assert!(matches!(err, RuntimeError::Type { .. }));
}

// =============================================================================
// Expressions
// =============================================================================

#[test]
fn expr_builds_an_ast_node() {
    let mut rt = Runtime::new();
    let head = rt.symbol("call");
    let e = call(&mut rt, "expr", &[head, Value::int32(1), Value::int32(2)]).unwrap();
    let t = call(&mut rt, "typeof", &[e.clone()]).unwrap();
    assert!(t.is_egal(&Value::Type(TypeId::EXPR)));
    let s = rt.print_to_string(&e).unwrap();
    assert_eq!(s, "Expr(`call,(1,2))");
}

// =============================================================================
// The error builtin
// =============================================================================

#[test]
fn error_builtin_raises_user_errors() {
    let mut rt = Runtime::new();
    let err = call(&mut rt, "error", &[Value::string("boom")]).unwrap_err();
    assert_eq!(err, RuntimeError::User("boom".to_string()));
    let err = call(&mut rt, "error", &[Value::int32(1)]).unwrap_err();
    assert!(matches!(err, RuntimeError::Type { .. }));
}

// =============================================================================
// Arity checking
// =============================================================================

#[test]
fn arity_errors_name_the_operation() {
    let mut rt = Runtime::new();
    let err = call(&mut rt, "typeof", &[]).unwrap_err();
    assert_eq!(
        err,
        RuntimeError::TooFewArgs {
            name: "typeof",
            min: 1
        }
    );
    let err = call(&mut rt, "is", &[Value::int32(1)]).unwrap_err();
    assert!(matches!(err, RuntimeError::TooFewArgs { .. }));
    let err = call(
        &mut rt,
        "is",
        &[Value::int32(1), Value::int32(2), Value::int32(3)],
    )
    .unwrap_err();
    assert!(matches!(err, RuntimeError::TooManyArgs { .. }));
}
