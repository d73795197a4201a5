//! Runtime errors for the interpreter

use thiserror::Error;

/// Runtime error during interpretation
#[derive(Debug, Clone, Error)]
#[error("Runtime error: {message}")]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Kinds of runtime errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operator applied to an unsupported pair of operand types
    TypeError,
    /// Pronoun used before any variable became the subject
    UnboundPronoun,
    /// Not enough arguments for a function call
    ArityMismatch,
    /// Indexed assignment into a value that can't take one
    NotIndexable,
    /// Increment or decrement of a value that can't take one
    NotIncrementable,
    /// Call through a variable that doesn't hold a closure
    NotAFunction,
    /// Cast of a value that has no cast
    InvalidCast,
    /// Malformed number text or base
    InvalidNumber,
    /// Division by zero
    DivisionByZero,
    /// Decimal arithmetic overflowed
    Overflow,
    /// Backslash escape in output text that has no meaning
    InvalidEscape,
    /// Call depth exceeded the configured limit
    StackOverflow,
    /// Control flow: `exit` raised inside a function call
    Exit,
}

impl RuntimeError {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        RuntimeError {
            kind,
            message: message.into(),
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeError, message)
    }

    pub fn unsupported_operation(op: &str, lhs: &str, rhs: &str) -> Self {
        Self::type_error(format!("Unsupported operation: {lhs} {op} {rhs}"))
    }

    pub fn invalid_comparison(lhs: &str, rhs: &str) -> Self {
        Self::type_error(format!("Invalid comparison {lhs} vs {rhs}"))
    }

    pub fn unbound_pronoun(pronoun: &str) -> Self {
        Self::new(
            ErrorKind::UnboundPronoun,
            format!("You must assign a variable before using a pronoun ('{pronoun}')"),
        )
    }

    pub fn arity_mismatch(function: &str, params: &[String], got: usize) -> Self {
        Self::new(
            ErrorKind::ArityMismatch,
            format!(
                "Not enough arguments supplied to function {function} - expected {} ({}), got {got}",
                params.len(),
                params.join(", ")
            ),
        )
    }

    pub fn not_indexable(name: &str) -> Self {
        Self::new(
            ErrorKind::NotIndexable,
            format!("{name} is not an indexed variable"),
        )
    }

    pub fn string_not_incrementable(name: &str) -> Self {
        Self::new(
            ErrorKind::NotIncrementable,
            format!("Cannot increment '{name}' - strings can only be incremented if they're empty"),
        )
    }

    pub fn not_incrementable(name: &str, type_name: &str) -> Self {
        Self::new(
            ErrorKind::NotIncrementable,
            format!("Cannot increment '{name}' because it has type {type_name}"),
        )
    }

    pub fn not_a_function(name: &str) -> Self {
        Self::new(ErrorKind::NotAFunction, format!("'{name}' is not a function"))
    }

    pub fn invalid_cast(type_name: &str) -> Self {
        Self::new(
            ErrorKind::InvalidCast,
            format!("Can't cast expression of type {type_name}"),
        )
    }

    pub fn invalid_char_code(code: &str) -> Self {
        Self::new(
            ErrorKind::InvalidCast,
            format!("{code} is not a valid character code"),
        )
    }

    pub fn invalid_escape(escape: &str) -> Self {
        Self::new(
            ErrorKind::InvalidEscape,
            format!("Unrecognized escape sequence '{escape}'"),
        )
    }

    pub fn invalid_number(text: &str) -> Self {
        Self::new(
            ErrorKind::InvalidNumber,
            format!("'{text}' is not a valid number"),
        )
    }

    pub fn invalid_base(base: &str) -> Self {
        Self::new(
            ErrorKind::InvalidNumber,
            format!("{base} is not a valid number base (expected 2 to 36)"),
        )
    }

    pub fn division_by_zero() -> Self {
        Self::new(ErrorKind::DivisionByZero, "division by zero")
    }

    pub fn overflow() -> Self {
        Self::new(ErrorKind::Overflow, "numeric overflow")
    }

    pub fn stack_overflow(depth: usize) -> Self {
        Self::new(
            ErrorKind::StackOverflow,
            format!("stack overflow: call depth exceeded {depth}"),
        )
    }

    /// Unwinds a program `exit` out of nested function calls
    pub fn exit() -> Self {
        Self::new(ErrorKind::Exit, "exit")
    }

    pub fn is_exit(&self) -> bool {
        self.kind == ErrorKind::Exit
    }
}

/// Result type for interpreter operations
pub type InterpResult<T> = Result<T, RuntimeError>;
