//! Root namespace bootstrap tests.

use crate::error::RuntimeError;
use crate::types::TypeId;
use crate::value::{FunctionValue, Value};
use crate::Runtime;

#[test]
fn all_builtin_operations_are_bound() {
    let rt = Runtime::new();
    let ops = [
        "is",
        "typeof",
        "subtype",
        "istype",
        "typeassert",
        "apply",
        "error",
        "tuple",
        "convert",
        "promote",
        "Union",
        "print",
        "identity",
        "tupleref",
        "tuplelen",
        "getfield",
        "setfield",
        "arraylen",
        "arrayref",
        "arrayset",
        "box",
        "unbox",
        "boxset",
        "instantiate_type",
        "typevar",
        "new_closure",
        "new_struct_type",
        "new_struct_fields",
        "new_type_constructor",
        "new_tag_type",
        "new_generic_function",
        "add_method",
        "set_conversion",
        "expr",
    ];
    for name in ops {
        assert!(rt.global(name).is_some(), "builtin {} is not bound", name);
    }
}

#[test]
fn all_builtin_types_are_bound() {
    let rt = Runtime::new();
    let names = [
        ("Any", TypeId::ANY),
        ("Bottom", TypeId::BOTTOM),
        ("TypeVar", TypeId::TYPEVAR),
        ("Tuple", TypeId::TUPLE),
        ("NTuple", TypeId::NTUPLE_CTOR),
        ("Type", TypeId::TYPE),
        ("Symbol", TypeId::SYMBOL),
        ("...", TypeId::SEQ_CTOR),
        ("Function", TypeId::FUNCTION),
        ("Array", TypeId::ARRAY_CTOR),
        ("Number", TypeId::NUMBER),
        ("Real", TypeId::REAL),
        ("Int", TypeId::INT),
        ("Float", TypeId::FLOAT),
        ("Bool", TypeId::BOOL),
        ("Int8", TypeId::INT8),
        ("Uint8", TypeId::UINT8),
        ("Int16", TypeId::INT16),
        ("Uint16", TypeId::UINT16),
        ("Int32", TypeId::INT32),
        ("Uint32", TypeId::UINT32),
        ("Int64", TypeId::INT64),
        ("Uint64", TypeId::UINT64),
        ("Float32", TypeId::FLOAT32),
        ("Float64", TypeId::FLOAT64),
        ("Expr", TypeId::EXPR),
        ("BitsKind", TypeId::BITS_KIND),
        ("StructKind", TypeId::STRUCT_KIND),
        ("FuncKind", TypeId::FUNC_KIND),
        ("TagKind", TypeId::TAG_KIND),
        ("UnionKind", TypeId::UNION_KIND),
    ];
    for (name, id) in names {
        let bound = rt.global(name);
        assert!(bound.is_some(), "type {} is not bound", name);
        assert!(
            bound.unwrap().is_egal(&Value::Type(id)),
            "type {} is bound to the wrong id",
            name
        );
    }
}

#[test]
fn print_is_a_generic_function_with_methods() {
    let rt = Runtime::new();
    let print_gf = rt.global("print").unwrap();
    match print_gf {
        Value::Function(fv) => match &**fv {
            FunctionValue::Generic(cell) => {
                let table = cell.borrow();
                assert!(
                    table.methods.len() >= 16,
                    "expected one method per builtin kind, got {}",
                    table.methods.len()
                );
                // The Any fallback sorts last.
                let last = table.methods.last().unwrap();
                assert_eq!(last.signature, vec![TypeId::ANY]);
            }
            _ => panic!("print is not generic"),
        },
        _ => panic!("print is not a function"),
    }
}

#[test]
fn kind_constants_are_below_type() {
    let rt = Runtime::new();
    for id in [
        TypeId::BITS_KIND,
        TypeId::STRUCT_KIND,
        TypeId::TAG_KIND,
        TypeId::UNION_KIND,
        TypeId::FUNC_KIND,
    ] {
        assert!(rt.is_subtype(id, TypeId::TYPE));
    }
    // Type variables are not types.
    assert!(!rt.is_subtype(TypeId::TYPEVAR, TypeId::TYPE));
}

#[test]
fn constants_cannot_be_rebound() {
    let mut rt = Runtime::new();
    let err = rt.set_const("print", Value::int32(1)).unwrap_err();
    assert!(matches!(err, RuntimeError::State(_)));
    rt.set_const("fresh_binding", Value::int32(1)).unwrap();
    let err = rt.set_const("fresh_binding", Value::int32(2)).unwrap_err();
    assert!(matches!(err, RuntimeError::State(_)));
}
