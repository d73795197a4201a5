//! Arithmetic between values
//!
//! Each operator dispatches on the pair of operand types rather than on the
//! left operand alone.

use super::array::Array;
use super::error::{InterpResult, RuntimeError};
use super::number::{self, Numeric};
use super::string;
use super::value::Value;
use crate::ast::BinaryOp;
use rust_decimal::Decimal;

impl Value {
    /// Apply an arithmetic operator
    pub fn arithmetic(&self, op: BinaryOp, rhs: &Value) -> InterpResult<Value> {
        match op {
            BinaryOp::Plus => self.plus(rhs),
            BinaryOp::Minus => self.minus(rhs),
            BinaryOp::Times => self.times(rhs),
            BinaryOp::Divide => self.divide(rhs),
            other => Err(RuntimeError::type_error(format!(
                "{other} is not an arithmetic operator"
            ))),
        }
    }

    pub fn plus(&self, rhs: &Value) -> InterpResult<Value> {
        if let Value::Array(a) = self {
            let a = a.borrow();
            return Ok(match rhs {
                Value::Array(b) => Value::array(a.concat(&b.borrow())),
                Value::Number(n) => Value::Number(number::add(a.length(), *n)?),
                other => Value::array(a.with_item(other.clone())),
            });
        }
        match (self.numeric(), rhs.numeric()) {
            (Some(a), Some(b)) => Ok(Value::Number(number::add(a, b)?)),
            _ => Ok(Value::string(self.to_text() + &rhs.to_text())),
        }
    }

    pub fn minus(&self, rhs: &Value) -> InterpResult<Value> {
        if let Value::Array(a) = self {
            let a = a.borrow();
            let result: Array = match rhs {
                Value::Array(b) => a.difference(&b.borrow()),
                other => a.without(other),
            };
            return Ok(Value::array(result));
        }
        match (self.numeric(), rhs.numeric()) {
            (Some(a), Some(b)) => Ok(Value::Number(number::sub(a, b)?)),
            _ => Ok(Value::string(string::minus(
                &self.to_text(),
                &rhs.to_text(),
            ))),
        }
    }

    pub fn times(&self, rhs: &Value) -> InterpResult<Value> {
        if let (Some(a), Some(b)) = (self.numeric(), rhs.numeric()) {
            return Ok(Value::Number(number::mul(a, b)?));
        }
        match (self, rhs) {
            (Value::Str(s), other) | (other, Value::Str(s)) if other.numeric().is_some() => {
                let n = other.numeric().unwrap_or_default();
                let text = s.borrow().clone();
                Ok(Value::string(string::times(&text, n)?))
            }
            (Value::Str(a), Value::Str(b)) => {
                let (a, b) = (a.borrow().clone(), b.borrow().clone());
                Ok(Value::string(string::interleave(&a, &b)))
            }
            _ => Err(RuntimeError::unsupported_operation(
                "*",
                self.type_name(),
                rhs.type_name(),
            )),
        }
    }

    pub fn divide(&self, rhs: &Value) -> InterpResult<Value> {
        if let (Some(a), Some(b)) = (self.numeric(), rhs.numeric()) {
            return Ok(Value::Number(number::div(a, b)?));
        }
        match (self, rhs) {
            (Value::Str(s), other) if other.numeric().is_some() => {
                let divisor = other.numeric().unwrap_or_default();
                let factor = number::div(Decimal::ONE, divisor)?;
                let text = s.borrow().clone();
                Ok(Value::string(string::times(&text, factor)?))
            }
            (_, Value::Str(divisor)) => {
                let found = string::count(&self.to_text(), &divisor.borrow());
                Ok(Value::Number(Decimal::from(found)))
            }
            _ => Err(RuntimeError::unsupported_operation(
                "/",
                self.type_name(),
                rhs.type_name(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::error::ErrorKind;
    use pretty_assertions::assert_eq;

    fn num(n: i64) -> Value {
        Value::number(n)
    }

    #[test]
    fn test_things_which_add_up() {
        assert_eq!(Value::Bool(true).plus(&Value::Bool(true)).unwrap().to_text(), "2");
        let pair = Value::array(vec![num(2), num(3)]);
        assert_eq!(pair.plus(&num(1)).unwrap().to_text(), "3");
        assert_eq!(num(1).plus(&pair).unwrap().to_text(), "3");
    }

    #[test]
    fn test_plus_concatenates_text() {
        let result = Value::string("hello ").plus(&num(5)).unwrap();
        assert_eq!(result.to_text(), "hello 5");
        let result = Value::Mysterious.plus(&Value::string("!")).unwrap();
        assert_eq!(result.to_text(), "mysterious!");
    }

    #[test]
    fn test_plus_on_array_builds_new_array() {
        let array = Value::array(vec![num(1)]);
        let grown = array.plus(&Value::string("x")).unwrap();
        assert_eq!(grown.to_text(), r#"[ 1, "x" ]"#);
        assert_eq!(array.to_text(), "[ 1 ]");
        let joined = array.plus(&Value::array(vec![num(2)])).unwrap();
        assert_eq!(joined.to_text(), "[ 1, 2 ]");
    }

    #[test]
    fn test_minus() {
        assert_eq!(num(5).minus(&num(7)).unwrap().to_text(), "-2");
        let trimmed = Value::string("rockstar").minus(&Value::string("star")).unwrap();
        assert_eq!(trimmed.to_text(), "rock");
        let array = Value::array(vec![num(1), num(2), num(1)]);
        assert_eq!(array.minus(&num(1)).unwrap().to_text(), "[ 2 ]");
    }

    #[test]
    fn test_times_strings() {
        let s = Value::string("abc");
        assert_eq!(s.times(&num(-1)).unwrap().to_text(), "cba");
        assert_eq!(
            s.times(&Value::number(Decimal::new(5, 1))).unwrap().to_text(),
            "ab"
        );
        assert_eq!(num(2).times(&s).unwrap().to_text(), "abcabc");
        let woven = Value::string("ab").times(&Value::string("xy")).unwrap();
        assert_eq!(woven.to_text(), "axbx\nayby");
    }

    #[test]
    fn test_times_unsupported_names_types() {
        let err = Value::Mysterious.times(&Value::string("x")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeError);
        assert!(err.message.contains("mysterious"));
        assert!(err.message.contains("string"));
    }

    #[test]
    fn test_divide() {
        assert_eq!(num(10).divide(&num(4)).unwrap().to_text(), "2.5");
        let err = num(1).divide(&num(0)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DivisionByZero);
    }

    #[test]
    fn test_divide_string_by_number_repeats_reciprocal() {
        let s = Value::string("abcd");
        assert_eq!(s.divide(&num(2)).unwrap().to_text(), "ab");
    }

    #[test]
    fn test_divide_by_string_counts() {
        let hits = Value::string("banana").divide(&Value::string("a")).unwrap();
        assert_eq!(hits.to_text(), "3");
        let hits = num(1001).divide(&Value::string("1")).unwrap();
        assert_eq!(hits.to_text(), "2");
    }

    #[test]
    fn test_divide_unsupported() {
        let err = Value::Mysterious.divide(&num(1)).unwrap_err();
        assert!(err.message.contains("mysterious / number"));
    }
}
