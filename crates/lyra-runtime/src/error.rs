//! Runtime error taxonomy.
//!
//! Every fallible entry point returns `RuntimeResult`; errors propagate with
//! `?` to the nearest caller that wants to recover (the embedding
//! interpreter or REPL). Nothing in the core retries.

use std::fmt;

/// All error kinds the core runtime can raise.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuntimeError {
    /// Too few arguments to a builtin or constructor.
    TooFewArgs { name: &'static str, min: usize },
    /// Too many arguments to a builtin or constructor.
    TooManyArgs { name: &'static str, max: usize },
    /// An argument had the wrong kind.
    Type {
        name: &'static str,
        expected: &'static str,
        got: String,
    },
    /// Tuple or array index out of range (indices are 1-based).
    Bounds { container: &'static str, index: i64 },
    /// Read of an empty box or an uninitialized reference slot.
    Undefined(String),
    /// Unknown field name on a struct type.
    Field { type_name: String, field: String },
    /// Field access on something that is not a struct.
    NotAStruct { name: &'static str },
    /// `convert` could not produce a value of the target type.
    Conversion(String),
    /// No common embedding type exists.
    Promotion(String),
    /// Invalid supertype in a user type declaration.
    Subtyping { name: String },
    /// Operation applied in the wrong lifecycle state.
    State(String),
    /// Generic-function application found no matching method.
    NoMethod { name: String },
    /// `typeassert` failed.
    Assertion,
    /// Raised by the `error` builtin.
    User(String),
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::TooFewArgs { name, min } => {
                write!(f, "{}: too few arguments (expected {})", name, min)
            }
            RuntimeError::TooManyArgs { name, max } => {
                write!(f, "{}: too many arguments (expected {})", name, max)
            }
            RuntimeError::Type {
                name,
                expected,
                got,
            } => write!(f, "type error: {}: expected {}, got {}", name, expected, got),
            RuntimeError::Bounds { container, index } => {
                write!(f, "{}[{}]: index out of range", container, index)
            }
            RuntimeError::Undefined(msg) => write!(f, "{}", msg),
            RuntimeError::Field { type_name, field } => {
                write!(f, "type {} has no field {}", type_name, field)
            }
            RuntimeError::NotAStruct { name } => {
                write!(f, "{}: argument must be a struct", name)
            }
            RuntimeError::Conversion(msg) => write!(f, "convert: {}", msg),
            RuntimeError::Promotion(msg) => write!(f, "{}", msg),
            RuntimeError::Subtyping { name } => {
                write!(f, "invalid subtyping in definition of {}", name)
            }
            RuntimeError::State(msg) => write!(f, "{}", msg),
            RuntimeError::NoMethod { name } => {
                write!(f, "no method for generic function {}", name)
            }
            RuntimeError::Assertion => write!(f, "type assertion failed"),
            RuntimeError::User(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for RuntimeError {}
