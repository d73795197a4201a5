//! Mutable string cells and the string operators
//!
//! Strings are shared cells: append, pop, dequeue and character assignment
//! change the string in place, and every alias sees the change.

use super::error::{InterpResult, RuntimeError};
use super::number::{self, Numeric};
use super::value::{StrRef, Value};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// `string * n`: repeat, reversing first when `n` is negative. A fractional
/// part appends the leading `ceil(len * fraction)` characters.
pub fn times(token: &str, n: Decimal) -> InterpResult<String> {
    if n.is_zero() {
        return Ok(String::new());
    }
    let chars: Vec<char> = if n.is_sign_negative() {
        token.chars().rev().collect()
    } else {
        token.chars().collect()
    };
    let magnitude = n.abs();
    let repeat = magnitude
        .trunc()
        .to_usize()
        .ok_or_else(RuntimeError::overflow)?;
    let part = magnitude.fract();

    let unit: String = chars.iter().collect();
    let mut result = unit.repeat(repeat);
    if !part.is_zero() {
        let take = (Decimal::from(chars.len()) * part)
            .ceil()
            .to_usize()
            .unwrap_or(chars.len());
        result.extend(chars.iter().take(take));
    }
    Ok(result)
}

/// `string * string`: one line per character of `rhs`, pairing every
/// character of `lhs` with it.
pub fn interleave(lhs: &str, rhs: &str) -> String {
    let mut lines = Vec::new();
    for c2 in rhs.chars() {
        let mut line = String::new();
        for c1 in lhs.chars() {
            line.push(c1);
            line.push(c2);
        }
        lines.push(line);
    }
    lines.join("\n")
}

/// `string - string`: drop `tail` if `body` ends with it
pub fn minus(body: &str, tail: &str) -> String {
    body.strip_suffix(tail).unwrap_or(body).to_string()
}

/// `x / string`: non-overlapping occurrences of `divisor`
pub fn count(body: &str, divisor: &str) -> usize {
    if divisor.is_empty() {
        return 0;
    }
    body.matches(divisor).count()
}

/// Character at a numeric position, or mysterious when out of range
pub fn char_at(text: &str, index: Decimal) -> Value {
    index
        .trunc()
        .to_usize()
        .and_then(|i| text.chars().nth(i))
        .map(|c| Value::string(c.to_string()))
        .unwrap_or(Value::Mysterious)
}

/// Replace one character in place. Needs exactly one numeric index inside
/// the string, otherwise nothing changes.
pub fn set_char_at(cell: &StrRef, indexes: &[Value], text: &str) {
    let [index] = indexes else { return };
    let Some(position) = index
        .numeric()
        .filter(|n| !n.is_sign_negative())
        .and_then(|n| n.trunc().to_usize())
    else {
        return;
    };
    let mut string = cell.borrow_mut();
    let chars: Vec<char> = string.chars().collect();
    if position >= chars.len() {
        return;
    }
    let mut updated: String = chars[..position].iter().collect();
    updated.push_str(text);
    updated.extend(&chars[position + 1..]);
    *string = updated;
}

/// Split into an array of strings; an empty separator splits into characters
pub fn split(text: &str, separator: &str) -> Vec<Value> {
    if separator.is_empty() {
        text.chars().map(|c| Value::string(c.to_string())).collect()
    } else {
        text.split(separator).map(Value::string).collect()
    }
}

/// Remove and return the first character
pub fn dequeue(cell: &StrRef) -> Value {
    let mut string = cell.borrow_mut();
    let Some(first) = string.chars().next() else {
        return Value::Mysterious;
    };
    string.replace_range(..first.len_utf8(), "");
    Value::string(first.to_string())
}

/// Remove and return the last character
pub fn pop(cell: &StrRef) -> Value {
    match cell.borrow_mut().pop() {
        Some(last) => Value::string(last.to_string()),
        None => Value::Mysterious,
    }
}

/// Character codes: one character gives a number, otherwise an array
pub fn to_char_codes(text: &str) -> Value {
    let codes: Vec<Value> = text
        .chars()
        .map(|c| Value::Number(Decimal::from(c as u32)))
        .collect();
    match codes.as_slice() {
        [single] => single.clone(),
        _ => Value::array(codes),
    }
}

/// Append a value. Numbers append the character with that code.
pub fn append(cell: &StrRef, value: &Value) -> InterpResult<()> {
    let text = match value {
        Value::Number(n) => number::to_char(*n)?.to_string(),
        other => other.to_text(),
    };
    cell.borrow_mut().push_str(&text);
    Ok(())
}

/// Expand backslash escapes in output text
pub fn unescape(text: &str) -> InterpResult<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escaped) = chars.next() else {
            return Err(RuntimeError::invalid_escape("\\"));
        };
        match escaped {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0C}'),
            'v' => out.push('\u{0B}'),
            'e' => out.push('\u{1B}'),
            'x' | 'u' => {
                let width = if escaped == 'x' { 2 } else { 4 };
                let mut hex = String::new();
                while hex.len() < width {
                    match chars.peek() {
                        Some(h) if h.is_ascii_hexdigit() => {
                            hex.push(*h);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                let decoded = (hex.len() == width)
                    .then(|| u32::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .and_then(char::from_u32)
                    .ok_or_else(|| {
                        RuntimeError::invalid_escape(&format!("\\{escaped}{hex}"))
                    })?;
                out.push(decoded);
            }
            '0'..='7' => {
                let mut code = escaped.to_digit(8).unwrap_or_default();
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(digit) => {
                            code = code * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.extend(char::from_u32(code & 0xFF));
            }
            'c' => {
                let control = chars
                    .next()
                    .filter(char::is_ascii_alphabetic)
                    .ok_or_else(|| RuntimeError::invalid_escape("\\c"))?;
                out.extend(char::from_u32(control.to_ascii_uppercase() as u32 - 64));
            }
            other if other.is_alphanumeric() || other == '_' => {
                return Err(RuntimeError::invalid_escape(&format!("\\{other}")));
            }
            other => out.push(other),
        }
    }
    Ok(out)
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
    fn test_times_whole() {
        assert_eq!(times("abc", dec("2")).unwrap(), "abcabc");
        assert_eq!(times("abc", Decimal::ZERO).unwrap(), "");
    }

    #[test]
    fn test_times_negative_reverses() {
        assert_eq!(times("abc", dec("-1")).unwrap(), "cba");
        assert_eq!(times("abc", dec("-2")).unwrap(), "cbacba");
    }

    #[test]
    fn test_times_fraction_rounds_up() {
        assert_eq!(times("abc", dec("0.5")).unwrap(), "ab");
        assert_eq!(times("abc", dec("0.1")).unwrap(), "a");
        assert_eq!(times("abcd", dec("1.5")).unwrap(), "abcdab");
    }

    #[test]
    fn test_interleave() {
        assert_eq!(interleave("ab", "xy"), "axbx\nayby");
        assert_eq!(interleave("abc", ""), "");
    }

    #[test]
    fn test_minus_trims_suffix_only() {
        assert_eq!(minus("hello world", " world"), "hello");
        assert_eq!(minus("hello world", "hello"), "hello world");
    }

    #[test]
    fn test_count() {
        assert_eq!(count("banana", "an"), 2);
        assert_eq!(count("aaaa", "aa"), 2);
        assert_eq!(count("banana", ""), 0);
    }

    #[test]
    fn test_char_at() {
        assert_eq!(char_at("hello", Decimal::ONE).to_text(), "e");
        assert!(matches!(char_at("hello", dec("10")), Value::Mysterious));
        assert!(matches!(char_at("hello", dec("-1")), Value::Mysterious));
    }

    #[test]
    fn test_set_char_at_mutates_in_place() {
        let cell = Value::string("hello");
        let Value::Str(s) = &cell else { unreachable!() };
        let alias = s.clone();
        set_char_at(s, &[Value::Number(Decimal::ZERO)], "j");
        assert_eq!(alias.borrow().as_str(), "jello");
        set_char_at(s, &[Value::Number(dec("9"))], "x");
        assert_eq!(alias.borrow().as_str(), "jello");
    }

    #[test]
    fn test_split() {
        let parts: Vec<String> = split("a,b,c", ",").iter().map(Value::to_text).collect();
        assert_eq!(parts, vec!["a", "b", "c"]);
        let chars: Vec<String> = split("hey", "").iter().map(Value::to_text).collect();
        assert_eq!(chars, vec!["h", "e", "y"]);
    }

    #[test]
    fn test_dequeue_and_pop() {
        let Value::Str(s) = Value::string("abc") else { unreachable!() };
        assert_eq!(dequeue(&s).to_text(), "a");
        assert_eq!(pop(&s).to_text(), "c");
        assert_eq!(s.borrow().as_str(), "b");
        pop(&s);
        assert!(matches!(pop(&s), Value::Mysterious));
        assert!(matches!(dequeue(&s), Value::Mysterious));
    }

    #[test]
    fn test_char_codes() {
        assert_eq!(to_char_codes("A").to_text(), "65");
        assert_eq!(to_char_codes("AB").to_text(), "[ 65, 66 ]");
        assert_eq!(to_char_codes("").to_text(), "[ ]");
    }

    #[test]
    fn test_append_number_appends_char() {
        let Value::Str(s) = Value::string("a") else { unreachable!() };
        append(&s, &Value::Number(Decimal::from(66))).unwrap();
        append(&s, &Value::Bool(true)).unwrap();
        assert_eq!(s.borrow().as_str(), "aBtrue");
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r"a\nb").unwrap(), "a\nb");
        assert_eq!(unescape(r"tab\there").unwrap(), "tab\there");
        assert_eq!(unescape(r"\x41B").unwrap(), "AB");
        assert_eq!(unescape(r"\101\u0042").unwrap(), "AB");
        assert_eq!(unescape(r"\cA").unwrap(), "\u{01}");
        assert_eq!(unescape(r"\\").unwrap(), "\\");
        assert_eq!(unescape(r#"\""#).unwrap(), "\"");
        assert_eq!(unescape(r"50\% off\!").unwrap(), "50% off!");
    }

    #[test]
    fn test_unescape_rejects_unknown_escapes() {
        for text in [r"\q", r"\x4", r"\u12", r"\c1", "end\\"] {
            let err = unescape(text).unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidEscape, "{text}");
        }
    }
}
