//! Runtime test suite.

mod bootstrap_tests;
mod builtins_tests;
mod print_tests;

use crate::error::RuntimeResult;
use crate::{Runtime, Value};

/// Apply a builtin from the root namespace.
pub(crate) fn call(rt: &mut Runtime, name: &str, args: &[Value]) -> RuntimeResult<Value> {
    let f = rt
        .global(name)
        .unwrap_or_else(|| panic!("no builtin named {}", name))
        .clone();
    rt.apply(&f, args)
}

/// Define a parametric struct `Complex{T}` with fields `(re::T, im::T)`,
/// returning its type constructor.
pub(crate) fn define_complex(rt: &mut Runtime) -> Value {
    let name = rt.symbol("Complex");
    let tvar = {
        let t = rt.symbol("T");
        call(rt, "typevar", &[t]).unwrap()
    };
    let number = rt.global("Number").unwrap().clone();
    let params = Value::tuple(vec![tvar.clone()]);
    let re = rt.symbol("re");
    let im = rt.symbol("im");
    let fnames = Value::tuple(vec![re, im]);
    let st = call(rt, "new_struct_type", &[name, number, params.clone(), fnames]).unwrap();
    let tc = call(rt, "new_type_constructor", &[params, st]).unwrap();
    let ftypes = Value::tuple(vec![tvar.clone(), tvar]);
    call(rt, "new_struct_fields", &[tc.clone(), ftypes]).unwrap();
    tc
}
