//! Generic functions and application.
//!
//! A generic function is a named method table. The table is kept sorted by
//! signature specificity at insertion time, so application is a linear scan
//! that takes the first signature the argument types fit. Ties between
//! incomparable signatures resolve to order of definition, which keeps
//! dispatch deterministic.

use std::cell::RefCell;
use std::rc::Rc;

use lyra_common::Atom;
use smallvec::SmallVec;
use tracing::{trace, warn};

use crate::context::Runtime;
use crate::error::{RuntimeError, RuntimeResult};
use crate::subtype::SubtypeChecker;
use crate::types::{Type, TypeId};
use crate::value::{FunctionValue, Value};

/// One entry of a method table: the tuple-of-types signature (a trailing
/// `Seq` makes it variadic) and the body to invoke.
#[derive(Clone, Debug)]
pub struct Method {
    pub signature: Vec<TypeId>,
    pub body: Value,
}

#[derive(Debug)]
pub struct GenericFunction {
    pub name: Atom,
    pub methods: Vec<Method>,
}

impl GenericFunction {
    pub fn new(name: Atom) -> Self {
        GenericFunction {
            name,
            methods: Vec::new(),
        }
    }
}

impl Runtime {
    pub fn make_generic(&mut self, name: Atom) -> Value {
        Value::Function(Rc::new(FunctionValue::Generic(RefCell::new(
            GenericFunction::new(name),
        ))))
    }

    /// Insert a method, keeping the table sorted by specificity. A
    /// signature equal to an existing one replaces that method's body.
    pub fn add_method_to(
        &mut self,
        gf: &Value,
        signature: Vec<TypeId>,
        body: Value,
    ) -> RuntimeResult<()> {
        let cell = match gf {
            Value::Function(fv) => match &**fv {
                FunctionValue::Generic(cell) => cell,
                _ => {
                    return Err(RuntimeError::Type {
                        name: "add_method",
                        expected: "generic function",
                        got: self.describe(gf),
                    });
                }
            },
            _ => {
                return Err(RuntimeError::Type {
                    name: "add_method",
                    expected: "generic function",
                    got: self.describe(gf),
                });
            }
        };
        let checker = SubtypeChecker::new(&self.types);
        let mut table = cell.borrow_mut();
        let mut insert_at = table.methods.len();
        let mut replace_at = None;
        for i in 0..table.methods.len() {
            let existing = &table.methods[i].signature;
            if checker.sig_equal(&signature, existing) {
                replace_at = Some(i);
                break;
            }
            if checker.sig_more_specific(&signature, existing) {
                insert_at = i;
                break;
            }
            let overlapping = signature.len() == existing.len()
                && signature
                    .iter()
                    .zip(existing.iter())
                    .all(|(&a, &b)| checker.is_subtype_of(a, b) || checker.is_subtype_of(b, a));
            if overlapping && !checker.sig_more_specific(existing, &signature) {
                warn!(
                    gf = self.symbols.resolve(table.name),
                    "ambiguous method signatures; dispatch will prefer the earlier definition"
                );
            }
        }
        if let Some(i) = replace_at {
            table.methods[i].body = body;
            return Ok(());
        }
        table.methods.insert(insert_at, Method { signature, body });
        Ok(())
    }

    // =========================================================================
    // Application
    // =========================================================================

    /// Apply a function object to arguments. Generic functions dispatch on
    /// the tuple of argument types; complete struct types act as
    /// constructors.
    pub fn apply(&mut self, f: &Value, args: &[Value]) -> RuntimeResult<Value> {
        match f {
            Value::Function(fv) => match &**fv {
                FunctionValue::Builtin { f: func, .. } => {
                    let env = Value::unit();
                    func(self, &env, args)
                }
                FunctionValue::Closure { linfo, env } => match linfo.fptr {
                    Some(fptr) => {
                        let env = env.clone();
                        fptr(self, &env, args)
                    }
                    None => Err(RuntimeError::State(
                        "cannot apply closure: code has not been compiled".to_string(),
                    )),
                },
                FunctionValue::Generic(_) => self.apply_generic(f, args),
            },
            Value::Type(t) => self.apply_type(*t, args),
            _ => Err(RuntimeError::Type {
                name: "apply",
                expected: "function",
                got: self.describe(f),
            }),
        }
    }

    fn apply_generic(&mut self, gf: &Value, args: &[Value]) -> RuntimeResult<Value> {
        let mut argtypes: SmallVec<[TypeId; 8]> = SmallVec::new();
        for a in args {
            argtypes.push(self.type_of(a));
        }
        let (name, selected) = {
            let cell = match gf {
                Value::Function(fv) => match &**fv {
                    FunctionValue::Generic(cell) => cell,
                    _ => {
                        return Err(RuntimeError::Type {
                            name: "apply",
                            expected: "generic function",
                            got: self.describe(gf),
                        });
                    }
                },
                _ => {
                    return Err(RuntimeError::Type {
                        name: "apply",
                        expected: "generic function",
                        got: self.describe(gf),
                    });
                }
            };
            let table = cell.borrow();
            let checker = SubtypeChecker::new(&self.types);
            let mut selected = None;
            for m in &table.methods {
                if checker.tuple_subtype(&argtypes, &m.signature) {
                    selected = Some(m.body.clone());
                    break;
                }
            }
            (self.symbols.resolve(table.name).to_string(), selected)
        };
        match selected {
            Some(body) => {
                trace!(gf = %name, nargs = args.len(), "dispatch");
                self.apply(&body, args)
            }
            None => Err(RuntimeError::NoMethod { name }),
        }
    }

    fn apply_type(&mut self, ty: TypeId, args: &[Value]) -> RuntimeResult<Value> {
        let fnew = match self.types.get(ty) {
            Type::Struct(st) => st.fnew.clone(),
            Type::Ctor(_) => {
                return Err(RuntimeError::Type {
                    name: "apply",
                    expected: "a callable type",
                    got: "type constructor".to_string(),
                });
            }
            _ => {
                return Err(RuntimeError::Type {
                    name: "apply",
                    expected: "function",
                    got: self.type_name(ty),
                });
            }
        };
        match fnew {
            Some(ctor) => self.apply(&ctor, args),
            None => self.construct_struct(ty, args),
        }
    }

    /// Build a struct instance, converting every argument to the declared
    /// field type.
    pub fn construct_struct(&mut self, ty: TypeId, args: &[Value]) -> RuntimeResult<Value> {
        use crate::value::StructValue;

        let (field_types, unbound_params) = match self.types.get(ty) {
            Type::Struct(st) => {
                let unbound = st
                    .params
                    .iter()
                    .any(|&p| matches!(self.types.get(p), Type::Var(_)));
                (st.field_types.clone(), unbound)
            }
            _ => {
                return Err(RuntimeError::Type {
                    name: "new",
                    expected: "struct type",
                    got: self.type_name(ty),
                });
            }
        };
        let field_types = match field_types {
            Some(fts) => fts,
            None => {
                return Err(RuntimeError::State(format!(
                    "type {} cannot be instantiated before its fields are defined",
                    self.type_name(ty)
                )));
            }
        };
        if unbound_params {
            return Err(RuntimeError::Type {
                name: "new",
                expected: "a type with instantiated parameters",
                got: self.type_name(ty),
            });
        }
        if args.len() < field_types.len() {
            return Err(RuntimeError::TooFewArgs {
                name: "new",
                min: field_types.len(),
            });
        }
        if args.len() > field_types.len() {
            return Err(RuntimeError::TooManyArgs {
                name: "new",
                max: field_types.len(),
            });
        }
        let mut fields = Vec::with_capacity(field_types.len());
        for (arg, &ft) in args.iter().zip(field_types.iter()) {
            fields.push(self.convert(arg, ft)?);
        }
        Ok(Value::Struct(Rc::new(StructValue {
            ty,
            fields: RefCell::new(fields),
        })))
    }
}
