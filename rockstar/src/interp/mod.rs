//! Tree-walking interpreter
//!
//! Values, scopes with pronoun tracking, and the evaluator that runs a
//! parsed [`Program`](crate::ast::Program).

mod array;
mod compare;
mod env;
mod error;
mod eval;
mod flow;
mod mutation;
mod number;
mod ops;
mod string;
mod value;

pub use array::{Array, Key};
pub use env::{child_env, store_for, EnvRef, Environment, Scope, ARGUMENTS};
pub use error::{ErrorKind, InterpResult, RuntimeError};
pub use eval::{eval, execute, Interpreter};
pub use flow::{Outcome, Signal};
pub use number::Numeric;
pub use value::{ArrayRef, Closure, StrRef, Value};
