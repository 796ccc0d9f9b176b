//! Core value and type runtime for the Lyra language.
//!
//! This crate implements the value universe, the nominal type lattice with
//! parameters, unions, type variables, and variadic sequence types, the
//! subtyping and specificity relations, type-driven conversion and numeric
//! promotion, generic-function dispatch, the builtin operations, and the
//! polymorphic print subsystem.
//!
//! The parser, interpreter, compiler, and collector are external
//! collaborators: they drive the runtime through `Runtime::apply` and the
//! root namespace populated by `Runtime::new`.

pub mod bootstrap;
pub mod builtins;
pub mod context;
pub mod convert;
pub mod dispatch;
pub mod error;
pub mod print;
pub mod subtype;
pub mod types;
pub mod value;

pub use context::{OutputStream, Runtime};
pub use dispatch::{GenericFunction, Method};
pub use error::{RuntimeError, RuntimeResult};
pub use subtype::SubtypeChecker;
pub use types::{Type, TypeId, TypeStore};
pub use value::{FunctionValue, NativeFn, Value};

#[cfg(test)]
mod tests;
