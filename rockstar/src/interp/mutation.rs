//! Built-in mutation operators: split, join, cast and rounding

use super::error::{InterpResult, RuntimeError};
use super::number::{self, Numeric};
use super::string;
use super::value::Value;
use crate::ast::{MutationOp, Round};
use rust_decimal::Decimal;

/// Apply a mutation operator to a source value and optional modifier
pub fn apply(op: MutationOp, source: &Value, modifier: Option<&Value>) -> InterpResult<Value> {
    match op {
        MutationOp::Split => split(source, modifier),
        MutationOp::Join => join(source, modifier),
        MutationOp::Cast => cast(source, modifier),
    }
}

fn separator(modifier: Option<&Value>) -> String {
    modifier.map(Value::to_text).unwrap_or_default()
}

/// Split a string on the modifier's text; no modifier splits characters
pub fn split(source: &Value, modifier: Option<&Value>) -> InterpResult<Value> {
    let Value::Str(s) = source else {
        return Err(RuntimeError::type_error("Only strings can be split."));
    };
    let parts = string::split(&s.borrow(), &separator(modifier));
    Ok(Value::array(parts))
}

/// Join array elements with the modifier's text
pub fn join(source: &Value, modifier: Option<&Value>) -> InterpResult<Value> {
    let Value::Array(a) = source else {
        return Err(RuntimeError::type_error(
            "Can't join something which is not an array.",
        ));
    };
    let joined = a.borrow().join(&separator(modifier));
    Ok(Value::string(joined))
}

/// Strings become numbers (parsed in the modifier's base, or character
/// codes); numbers become the character with that code
pub fn cast(source: &Value, modifier: Option<&Value>) -> InterpResult<Value> {
    if let Value::Str(s) = source {
        let text = s.borrow().clone();
        return match modifier.and_then(Numeric::numeric) {
            Some(base) => Ok(Value::Number(number::parse_in_base(&text, base)?)),
            None => Ok(string::to_char_codes(&text)),
        };
    }
    match source.numeric() {
        Some(code) => Ok(Value::string(number::to_char(code)?.to_string())),
        None => Err(RuntimeError::invalid_cast(source.type_name())),
    }
}

/// Round a number; midpoints go to the even neighbour
pub fn round(n: Decimal, direction: Round) -> Decimal {
    match direction {
        Round::Down => n.floor(),
        Round::Up => n.ceil(),
        Round::Nearest => n.round(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::error::ErrorKind;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_split_characters_and_separator() {
        let chars = split(&Value::string("abc"), None).unwrap();
        assert_eq!(chars.to_text(), r#"[ "a", "b", "c" ]"#);
        let words = split(&Value::string("a,b"), Some(&Value::string(","))).unwrap();
        assert_eq!(words.to_text(), r#"[ "a", "b" ]"#);
    }

    #[test]
    fn test_split_non_string() {
        let err = split(&Value::number(1), None).unwrap_err();
        assert_eq!(err.message, "Only strings can be split.");
    }

    #[test]
    fn test_join() {
        let array = Value::array(vec![Value::string("a"), Value::number(1)]);
        assert_eq!(join(&array, None).unwrap().to_text(), "a1");
        let joined = join(&array, Some(&Value::string("-"))).unwrap();
        assert_eq!(joined.to_text(), "a-1");
        assert!(join(&Value::string("x"), None).is_err());
    }

    #[test]
    fn test_cast_string_in_base() {
        let n = cast(&Value::string("ff"), Some(&Value::number(16))).unwrap();
        assert_eq!(n.to_text(), "255");
        let n = cast(&Value::string("12.5"), Some(&Value::number(10))).unwrap();
        assert_eq!(n.to_text(), "12.5");
    }

    #[test]
    fn test_cast_string_to_codes() {
        assert_eq!(cast(&Value::string("A"), None).unwrap().to_text(), "65");
        assert_eq!(cast(&Value::string("AB"), None).unwrap().to_text(), "[ 65, 66 ]");
    }

    #[test]
    fn test_cast_number_to_char() {
        assert_eq!(cast(&Value::number(97), None).unwrap().to_text(), "a");
    }

    #[test]
    fn test_cast_bad_base10_text() {
        let err = cast(&Value::string("1x"), Some(&Value::number(10))).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidNumber);
    }

    #[test]
    fn test_cast_mysterious() {
        let err = cast(&Value::Mysterious, None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidCast);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round(dec("2.7"), Round::Down), dec("2"));
        assert_eq!(round(dec("-2.2"), Round::Down), dec("-3"));
        assert_eq!(round(dec("2.1"), Round::Up), dec("3"));
        assert_eq!(round(dec("2.5"), Round::Nearest), dec("2"));
        assert_eq!(round(dec("3.5"), Round::Nearest), dec("4"));
    }

    #[test]
    fn test_apply_dispatches() {
        let out = apply(MutationOp::Cast, &Value::number(66), None).unwrap();
        assert_eq!(out.to_text(), "B");
    }
}
