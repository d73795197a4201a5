//! Equality, identity and ordering between values
//!
//! Every variant owns an equality rule, and `==` picks whose rule applies:
//! a boolean operand wins, then a string operand, then the left-hand side.
//! The rules are deliberately asymmetric, so `a.equals(b)` and `b.equals(a)`
//! can disagree.

use super::array::VisitedPairs;
use super::error::{InterpResult, RuntimeError};
use super::number::{self, Numeric};
use super::value::Value;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::rc::Rc;

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

fn number_equals(n: Decimal, other: &Value) -> bool {
    match other {
        Value::Array(a) => n == a.borrow().length(),
        Value::Bool(b) => {
            if *b {
                !n.is_zero()
            } else {
                n.is_zero()
            }
        }
        Value::Number(m) => n == *m,
        Value::Null => n.is_zero(),
        Value::Str(s) => {
            let s = s.borrow();
            (n.is_zero() && s.is_empty()) || eq_ignore_case(&s, &number::format(n))
        }
        _ => false,
    }
}

fn string_equals(s: &str, other: &Value) -> bool {
    if let Value::Array(a) = other {
        return s.is_empty() && a.borrow().is_empty();
    }
    if other.numeric().is_some_and(|n| n.is_zero()) {
        return s.is_empty();
    }
    match other {
        Value::Number(n) => number::parse(s).is_ok_and(|d| d == *n),
        _ => eq_ignore_case(&other.to_text(), s),
    }
}

fn null_equals(other: &Value) -> bool {
    match other {
        Value::Array(a) => a.borrow().is_empty(),
        Value::Str(s) => s.borrow().is_empty(),
        _ => other.numeric().is_some_and(|n| n.is_zero()),
    }
}

fn array_equals(a: &Value, other: &Value, seen: &mut VisitedPairs) -> bool {
    let Value::Array(a) = a else { return false };
    if let Value::Array(b) = other {
        let pair = (Rc::as_ptr(a), Rc::as_ptr(b));
        if Rc::ptr_eq(a, b) || seen.contains(&pair) {
            return true;
        }
        seen.push(pair);
        return a.borrow().equals_within(&b.borrow(), seen);
    }
    let length = a.borrow().length();
    if let Some(n) = other.numeric() {
        return length == n;
    }
    match other {
        Value::Mysterious => length.is_zero(),
        Value::Str(s) => length.is_zero() && s.borrow().is_empty(),
        _ => false,
    }
}

impl Value {
    /// This value's own equality rule
    pub fn equals(&self, other: &Value) -> bool {
        self.equals_within(other, &mut VisitedPairs::new())
    }

    /// Equality that treats a pair of arrays already under comparison as
    /// equal
    pub(super) fn equals_within(&self, other: &Value, seen: &mut VisitedPairs) -> bool {
        match self {
            Value::Bool(_) => self.is_truthy() == other.is_truthy(),
            Value::Number(n) => number_equals(*n, other),
            Value::Str(s) => {
                let text = s.borrow().clone();
                string_equals(&text, other)
            }
            Value::Null => null_equals(other),
            Value::Mysterious => matches!(other, Value::Null | Value::Mysterious),
            Value::Array(_) => array_equals(self, other, seen),
            Value::Function(f) => matches!(other, Value::Function(g) if Rc::ptr_eq(f, g)),
            Value::Closure(c) => matches!(other, Value::Closure(d) if Rc::ptr_eq(c, d)),
        }
    }

    /// `==`: booleans take precedence, then strings, then the left operand
    pub fn loose_eq(&self, rhs: &Value) -> bool {
        match (self, rhs) {
            (Value::Bool(_), _) => self.equals(rhs),
            (_, Value::Bool(_)) => rhs.equals(self),
            (Value::Str(_), _) => self.equals(rhs),
            (_, Value::Str(_)) => rhs.equals(self),
            _ => self.equals(rhs),
        }
    }

    /// `is exactly`: same variant, then value equality for scalars and
    /// reference identity for everything else
    pub fn identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(_), Value::Number(_))
            | (Value::Str(_), Value::Str(_))
            | (Value::Bool(_), Value::Bool(_)) => self.equals(other),
            (Value::Null, Value::Null) | (Value::Mysterious, Value::Mysterious) => true,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Function(f), Value::Function(g)) => Rc::ptr_eq(f, g),
            (Value::Closure(c), Value::Closure(d)) => Rc::ptr_eq(c, d),
            _ => false,
        }
    }

    /// Ordering for `<`, `<=`, `>`, `>=`
    pub fn compare(&self, other: &Value) -> InterpResult<Ordering> {
        match (self, other) {
            (Value::Array(a), _) if other.numeric().is_some() => {
                let length = a.borrow().length();
                Ok(length.cmp(&other.numeric().unwrap_or_default()))
            }
            (_, Value::Array(b)) if self.numeric().is_some() => {
                let length = b.borrow().length();
                Ok(self.numeric().unwrap_or_default().cmp(&length))
            }
            (Value::Str(_), _) | (_, Value::Str(_)) => Ok(self.to_text().cmp(&other.to_text())),
            _ => match (self.numeric(), other.numeric()) {
                (Some(a), Some(b)) => Ok(a.cmp(&b)),
                _ => Err(RuntimeError::invalid_comparison(
                    self.type_name(),
                    other.type_name(),
                )),
            },
        }
    }
}
