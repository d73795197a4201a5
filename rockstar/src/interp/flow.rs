//! Control-flow signals threaded out of statements

use super::value::Value;
use std::fmt;

/// What the enclosing block or loop should do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Fall through to the next statement
    Next,
    /// Continue the enclosing loop
    Skip,
    /// Leave the enclosing loop
    Break,
    /// Leave the enclosing function
    Return,
    /// Stop the program
    Exit,
    /// Nothing ran
    Unknown,
}

/// Result of executing a statement, block or program
#[derive(Debug, Clone)]
pub struct Outcome {
    pub signal: Signal,
    pub value: Value,
}

impl Outcome {
    pub fn new(signal: Signal, value: Value) -> Self {
        Outcome { signal, value }
    }

    pub fn next(value: Value) -> Self {
        Self::new(Signal::Next, value)
    }

    pub fn unknown() -> Self {
        Self::new(Signal::Unknown, Value::Null)
    }

    pub fn skip() -> Self {
        Self::new(Signal::Skip, Value::Null)
    }

    pub fn brk() -> Self {
        Self::new(Signal::Break, Value::Null)
    }

    pub fn ret(value: Value) -> Self {
        Self::new(Signal::Return, value)
    }

    pub fn exit() -> Self {
        Self::new(Signal::Exit, Value::Null)
    }

    /// Signals that end the current block
    pub fn stops_block(&self) -> bool {
        matches!(
            self.signal,
            Signal::Skip | Signal::Break | Signal::Return | Signal::Exit
        )
    }

    /// Signals that end the enclosing loop and travel further out
    pub fn escapes_loop(&self) -> bool {
        matches!(self.signal, Signal::Return | Signal::Exit)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.signal {
            Signal::Return => write!(f, "value: {}", self.value),
            Signal::Skip => write!(f, "skip"),
            Signal::Break => write!(f, "break"),
            Signal::Next => write!(f, "next"),
            Signal::Exit => write!(f, "exit"),
            Signal::Unknown => write!(f, "unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_stopping_signals() {
        assert!(Outcome::skip().stops_block());
        assert!(Outcome::brk().stops_block());
        assert!(Outcome::exit().stops_block());
        assert!(Outcome::ret(Value::Null).stops_block());
        assert!(!Outcome::next(Value::Null).stops_block());
        assert!(!Outcome::unknown().stops_block());
    }

    #[test]
    fn test_loop_escaping_signals() {
        assert!(Outcome::exit().escapes_loop());
        assert!(!Outcome::brk().escapes_loop());
    }

    #[test]
    fn test_display() {
        assert_eq!(Outcome::ret(Value::number(3)).to_string(), "value: 3");
        assert_eq!(Outcome::unknown().to_string(), "unknown");
    }
}
