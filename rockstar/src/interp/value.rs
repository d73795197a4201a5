//! Runtime values for the interpreter

use super::array::{self, Array, Clones};
use super::env::EnvRef;
use super::number::{self, Numeric};
use super::string;
use crate::ast::{FunctionDef, Variable};
use rust_decimal::Decimal;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared, mutable string cell
pub type StrRef = Rc<RefCell<String>>;

/// Shared, mutable array cell
pub type ArrayRef = Rc<RefCell<Array>>;

/// Runtime value
#[derive(Debug, Clone)]
pub enum Value {
    /// Exact decimal
    Number(Decimal),
    /// Mutable string, shared by reference
    Str(StrRef),
    Bool(bool),
    Null,
    /// Read of something never assigned
    Mysterious,
    /// Hybrid list/map, shared by reference
    Array(ArrayRef),
    /// Function literal not yet bound to a name
    Function(Rc<FunctionDef>),
    /// Function bound to the scope it was assigned in
    Closure(Rc<Closure>),
}

/// A function together with its defining environment
pub struct Closure {
    pub function: Rc<FunctionDef>,
    /// Variable the function was assigned to
    pub name: Variable,
    pub scope: EnvRef,
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("name", &self.name.name)
            .field("params", &self.function.params.len())
            .finish_non_exhaustive()
    }
}

impl Value {
    /// Fresh string cell
    pub fn string(text: impl Into<String>) -> Value {
        Value::Str(Rc::new(RefCell::new(text.into())))
    }

    /// Fresh array cell
    pub fn array(array: impl Into<Array>) -> Value {
        Value::Array(Rc::new(RefCell::new(array.into())))
    }

    pub fn number(n: impl Into<Decimal>) -> Value {
        Value::Number(n.into())
    }

    /// Get type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Bool(_) => "boolean",
            Value::Null => "null",
            Value::Mysterious => "mysterious",
            Value::Array(_) => "array",
            Value::Function(_) => "function",
            Value::Closure(_) => "closure",
        }
    }

    /// Check if value is truthy. Arrays are truthy only when their map
    /// holds entries, whatever the sequence length.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(n) => !n.is_zero(),
            Value::Str(s) => !s.borrow().is_empty(),
            Value::Bool(b) => *b,
            Value::Null | Value::Mysterious => false,
            Value::Array(a) => a.borrow().has_entries(),
            Value::Function(_) | Value::Closure(_) => true,
        }
    }

    /// Text form used by output, concatenation and string comparison
    pub fn to_text(&self) -> String {
        match self {
            Value::Str(s) => s.borrow().clone(),
            other => other.to_string(),
        }
    }

    /// Element at `index`. Values that can't be indexed return themselves.
    pub fn at_index(&self, index: &Value) -> Value {
        match self {
            Value::Array(a) => a.borrow().get(index),
            Value::Str(s) => match index.numeric() {
                Some(n) => string::char_at(&s.borrow(), n),
                None => self.clone(),
            },
            Value::Number(n) => match index.numeric() {
                Some(i) => Value::Bool(number::bit_at(*n, i)),
                None => Value::Mysterious,
            },
            other => other.clone(),
        }
    }

    /// Copy with fresh string and array cells, used when binding arguments
    pub fn deep_clone(&self) -> Value {
        self.deep_clone_within(&mut Clones::new())
    }

    pub(super) fn deep_clone_within(&self, clones: &mut Clones) -> Value {
        match self {
            Value::Str(s) => Value::string(s.borrow().as_str()),
            Value::Array(a) => Value::Array(array::deep_clone(a, clones)),
            other => other.clone(),
        }
    }
}

impl fmt::Display for Value {
    /// Display form: like [`Value::to_text`] but strings are quoted, which
    /// is how they appear inside arrays and debug output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => f.write_str(&number::format(*n)),
            Value::Str(s) => write!(f, "\"{}\"", s.borrow()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Null => f.write_str("null"),
            Value::Mysterious => f.write_str("mysterious"),
            Value::Array(a) => f.write_str(&array::render(a)),
            Value::Function(def) => {
                let params: Vec<String> = def.params.iter().map(|p| p.key()).collect();
                write!(f, "function({})", params.join(", "))
            }
            Value::Closure(c) => write!(f, "closure: {}", c.name.key()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Decimal> for Value {
    fn from(n: Decimal) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_type_names() {
        assert_eq!(Value::number(1).type_name(), "number");
        assert_eq!(Value::string("x").type_name(), "string");
        assert_eq!(Value::Mysterious.type_name(), "mysterious");
        assert_eq!(Value::array(Vec::new()).type_name(), "array");
    }

    #[test]
    fn test_truthiness() {
        assert!(Value::number(3).is_truthy());
        assert!(!Value::number(0).is_truthy());
        assert!(Value::string("a").is_truthy());
        assert!(!Value::string("").is_truthy());
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Mysterious.is_truthy());
    }

    #[test]
    fn test_empty_array_is_falsey() {
        assert!(!Value::array(Vec::new()).is_truthy());
    }

    #[test]
    fn test_sequence_only_array_is_falsey() {
        let array = Value::array(vec![Value::number(1), Value::number(2)]);
        assert!(!array.is_truthy());
    }

    #[test]
    fn test_array_with_entries_is_truthy() {
        let mut array = Array::new();
        array.set(&Value::string("key"), Value::number(1));
        assert!(Value::array(array).is_truthy());
    }

    #[test]
    fn test_text_forms() {
        assert_eq!(Value::number(Decimal::new(150, 2)).to_text(), "1.5");
        assert_eq!(Value::Bool(true).to_text(), "true");
        assert_eq!(Value::Null.to_text(), "null");
        assert_eq!(Value::Mysterious.to_text(), "mysterious");
        assert_eq!(Value::string("hi").to_text(), "hi");
        assert_eq!(Value::string("hi").to_string(), "\"hi\"");
    }

    #[test]
    fn test_array_display_quotes_strings() {
        let array = Value::array(vec![Value::string("a"), Value::number(1), Value::Null]);
        assert_eq!(array.to_text(), r#"[ "a", 1, null ]"#);
    }

    #[test]
    fn test_string_index() {
        let s = Value::string("rock");
        assert_eq!(s.at_index(&Value::number(1)).to_text(), "o");
        assert!(matches!(s.at_index(&Value::number(9)), Value::Mysterious));
        assert_eq!(s.at_index(&Value::string("x")).to_text(), "rock");
    }

    #[test]
    fn test_number_index_is_bit_test() {
        let n = Value::number(6);
        assert!(matches!(n.at_index(&Value::number(1)), Value::Bool(true)));
        assert!(matches!(n.at_index(&Value::number(0)), Value::Bool(false)));
        assert!(matches!(n.at_index(&Value::string("x")), Value::Mysterious));
    }

    #[test]
    fn test_scalars_index_to_themselves() {
        assert!(matches!(Value::Null.at_index(&Value::number(0)), Value::Null));
        assert!(matches!(
            Value::Bool(true).at_index(&Value::number(0)),
            Value::Bool(true)
        ));
    }

    #[test]
    fn test_deep_clone_makes_fresh_cells() {
        let original = Value::array(vec![Value::string("a")]);
        let copy = original.deep_clone();
        if let Value::Array(a) = &copy {
            a.borrow_mut().push(Value::number(1));
            if let Value::Str(s) = &a.borrow().items()[0] {
                s.borrow_mut().push('!');
            }
        }
        assert_eq!(original.to_text(), r#"[ "a" ]"#);
        assert_eq!(copy.to_text(), r#"[ "a!", 1 ]"#);
    }

    #[test]
    fn test_shallow_clone_shares_cells() {
        let original = Value::string("a");
        let alias = original.clone();
        if let Value::Str(s) = &alias {
            s.borrow_mut().push('b');
        }
        assert_eq!(original.to_text(), "ab");
    }
}
