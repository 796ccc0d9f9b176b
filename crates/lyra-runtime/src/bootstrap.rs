//! Environment bootstrap.
//!
//! `Runtime::new` builds the type arena and populates the root namespace:
//! the `print` generic function with its builtin methods, every builtin
//! operation, and the builtin type names.

use indexmap::IndexMap;
use lyra_common::Interner;

use crate::builtins;
use crate::context::{OutputStream, Runtime};
use crate::print;
use crate::types::{TypeId, TypeStore};
use crate::value::{NativeFn, Value};

impl Runtime {
    pub fn new() -> Runtime {
        let mut symbols = Interner::new();
        let types = TypeStore::new(&mut symbols);
        let mut rt = Runtime {
            symbols,
            types,
            globals: IndexMap::default(),
            output: OutputStream::Stdout,
            print_gf: None,
        };
        rt.init_builtins();
        rt
    }

    fn add_builtin_func(&mut self, name: &'static str, f: NativeFn) {
        self.bind(name, Value::builtin(name, f));
    }

    fn add_builtin_type(&mut self, name: &str, id: TypeId) {
        self.bind(name, Value::Type(id));
    }

    /// Register a one-argument print method on the `print` generic
    /// function.
    fn add_print_method(&mut self, gf: &Value, ty: TypeId, name: &'static str, f: NativeFn) {
        let body = Value::builtin(name, f);
        // Signatures over builtin types cannot be ambiguous; ignore the
        // impossible error instead of unwinding the bootstrap.
        let _ = self.add_method_to(gf, vec![ty], body);
    }

    fn init_builtins(&mut self) {
        let print_atom = self.intern("print");
        let print_gf = self.make_generic(print_atom);

        self.add_print_method(&print_gf, TypeId::ANY, "print_any", print::print_any);
        self.add_print_method(&print_gf, TypeId::SYMBOL, "print_symbol", print::print_symbol);
        self.add_print_method(
            &print_gf,
            TypeId::TYPEVAR,
            "print_typevar",
            print::print_typevar,
        );
        self.add_print_method(
            &print_gf,
            TypeId::LAMBDA_INFO,
            "print_linfo",
            print::print_linfo,
        );
        self.add_print_method(&print_gf, TypeId::STRING, "print_string", print::print_string);
        self.add_print_method(
            &print_gf,
            TypeId::FLOAT32,
            "print_float32",
            print::print_float32,
        );
        self.add_print_method(
            &print_gf,
            TypeId::FLOAT64,
            "print_float64",
            print::print_float64,
        );
        self.add_print_method(&print_gf, TypeId::INT8, "print_int8", print::print_int8);
        self.add_print_method(&print_gf, TypeId::UINT8, "print_uint8", print::print_uint8);
        self.add_print_method(&print_gf, TypeId::INT16, "print_int16", print::print_int16);
        self.add_print_method(&print_gf, TypeId::UINT16, "print_uint16", print::print_uint16);
        self.add_print_method(&print_gf, TypeId::INT32, "print_int32", print::print_int32);
        self.add_print_method(&print_gf, TypeId::UINT32, "print_uint32", print::print_uint32);
        self.add_print_method(&print_gf, TypeId::INT64, "print_int64", print::print_int64);
        self.add_print_method(&print_gf, TypeId::UINT64, "print_uint64", print::print_uint64);
        self.add_print_method(&print_gf, TypeId::BOOL, "print_bool", print::print_bool);

        self.print_gf = Some(print_gf.clone());

        self.add_builtin_func("is", builtins::bi_is);
        self.add_builtin_func("typeof", builtins::bi_typeof);
        self.add_builtin_func("subtype", builtins::bi_subtype);
        self.add_builtin_func("istype", builtins::bi_istype);
        self.add_builtin_func("typeassert", builtins::bi_typeassert);
        self.add_builtin_func("apply", builtins::bi_apply);
        self.add_builtin_func("error", builtins::bi_error);
        self.add_builtin_func("tuple", builtins::bi_tuple);
        self.add_builtin_func("convert", builtins::bi_convert);
        self.add_builtin_func("promote", builtins::bi_promote);
        self.add_builtin_func("Union", builtins::bi_union);
        self.bind("print", print_gf);
        self.add_builtin_func("identity", builtins::bi_identity);

        // functions for internal use
        self.add_builtin_func("tupleref", builtins::bi_tupleref);
        self.add_builtin_func("tuplelen", builtins::bi_tuplelen);
        self.add_builtin_func("getfield", builtins::bi_getfield);
        self.add_builtin_func("setfield", builtins::bi_setfield);
        self.add_builtin_func("arraylen", builtins::bi_arraylen);
        self.add_builtin_func("arrayref", builtins::bi_arrayref);
        self.add_builtin_func("arrayset", builtins::bi_arrayset);
        self.add_builtin_func("box", builtins::bi_box);
        self.add_builtin_func("unbox", builtins::bi_unbox);
        self.add_builtin_func("boxset", builtins::bi_boxset);
        self.add_builtin_func("instantiate_type", builtins::bi_instantiate_type);
        self.add_builtin_func("typevar", builtins::bi_typevar);
        self.add_builtin_func("new_closure", builtins::bi_new_closure);
        self.add_builtin_func("new_struct_type", builtins::bi_new_struct_type);
        self.add_builtin_func("new_struct_fields", builtins::bi_new_struct_fields);
        self.add_builtin_func("new_type_constructor", builtins::bi_new_type_constructor);
        self.add_builtin_func("new_tag_type", builtins::bi_new_tag_type);
        self.add_builtin_func("new_generic_function", builtins::bi_new_generic_function);
        self.add_builtin_func("add_method", builtins::bi_add_method);
        self.add_builtin_func("set_conversion", builtins::bi_set_conversion);
        self.add_builtin_func("expr", builtins::bi_expr);

        // builtin types
        self.add_builtin_type("Any", TypeId::ANY);
        self.add_builtin_type("Bottom", TypeId::BOTTOM);
        self.add_builtin_type("TypeVar", TypeId::TYPEVAR);
        self.add_builtin_type("Tuple", TypeId::TUPLE);
        self.add_builtin_type("NTuple", TypeId::NTUPLE_CTOR);
        self.add_builtin_type("Type", TypeId::TYPE);
        self.add_builtin_type("Symbol", TypeId::SYMBOL);
        self.add_builtin_type("...", TypeId::SEQ_CTOR);
        self.add_builtin_type("Function", TypeId::FUNCTION);
        self.add_builtin_type("Array", TypeId::ARRAY_CTOR);
        self.add_builtin_type("Number", TypeId::NUMBER);
        self.add_builtin_type("Real", TypeId::REAL);
        self.add_builtin_type("Int", TypeId::INT);
        self.add_builtin_type("Float", TypeId::FLOAT);
        self.add_builtin_type("Bool", TypeId::BOOL);
        self.add_builtin_type("Int8", TypeId::INT8);
        self.add_builtin_type("Uint8", TypeId::UINT8);
        self.add_builtin_type("Int16", TypeId::INT16);
        self.add_builtin_type("Uint16", TypeId::UINT16);
        self.add_builtin_type("Int32", TypeId::INT32);
        self.add_builtin_type("Uint32", TypeId::UINT32);
        self.add_builtin_type("Int64", TypeId::INT64);
        self.add_builtin_type("Uint64", TypeId::UINT64);
        self.add_builtin_type("Float32", TypeId::FLOAT32);
        self.add_builtin_type("Float64", TypeId::FLOAT64);
        self.add_builtin_type("Expr", TypeId::EXPR);

        self.add_builtin_type("BitsKind", TypeId::BITS_KIND);
        self.add_builtin_type("StructKind", TypeId::STRUCT_KIND);
        self.add_builtin_type("FuncKind", TypeId::FUNC_KIND);
        self.add_builtin_type("TagKind", TypeId::TAG_KIND);
        self.add_builtin_type("UnionKind", TypeId::UNION_KIND);
    }
}
