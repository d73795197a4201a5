//! Decimal helpers behind the Number value
//!
//! Numbers are exact decimals. Text formatting drops trailing zeros, and
//! parsing accepts any base from 2 to 36 using the alphabet `0-9A-Z`.

use super::error::{InterpResult, RuntimeError};
use super::value::Value;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::str::FromStr;

const DIGITS: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Values with a numeric reading: numbers, booleans (1/0), null (0) and
/// arrays (their sequence length).
pub trait Numeric {
    fn numeric(&self) -> Option<Decimal>;
}

impl Numeric for Decimal {
    fn numeric(&self) -> Option<Decimal> {
        Some(*self)
    }
}

impl Numeric for bool {
    fn numeric(&self) -> Option<Decimal> {
        Some(if *self { Decimal::ONE } else { Decimal::ZERO })
    }
}

impl Numeric for Value {
    fn numeric(&self) -> Option<Decimal> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Bool(b) => b.numeric(),
            Value::Null => Some(Decimal::ZERO),
            Value::Array(array) => Some(Decimal::from(array.borrow().len())),
            _ => None,
        }
    }
}

/// Format without trailing zeros ("1.50" -> "1.5", "-0" -> "0")
pub fn format(n: Decimal) -> String {
    n.normalize().to_string()
}

/// Parse base-10 text. Whitespace and thousands separators are ignored.
pub fn parse(text: &str) -> InterpResult<Decimal> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    let (negative, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.strip_prefix('+').unwrap_or(&cleaned)),
    };
    let digits = digits.strip_suffix('.').unwrap_or(digits);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(RuntimeError::invalid_number(text));
    }
    let digits = if digits.starts_with('.') {
        format!("0{digits}")
    } else {
        digits.to_string()
    };
    let value = Decimal::from_str(&digits).map_err(|_| RuntimeError::invalid_number(text))?;
    Ok(if negative { -value } else { value })
}

/// Parse text in the given base; base 10 goes through [`parse`].
///
/// Symbols outside the alphabet are skipped, and digits after a `.` are
/// fractional.
pub fn parse_in_base(text: &str, base: Decimal) -> InterpResult<Decimal> {
    if base == Decimal::TEN {
        return parse(text);
    }
    let radix = base
        .trunc()
        .to_u32()
        .filter(|b| (2..=36).contains(b))
        .ok_or_else(|| RuntimeError::invalid_base(&format(base)))?;
    let radix_dec = Decimal::from(radix);
    let upper = text.to_uppercase();
    let (whole, fraction) = match upper.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (upper.as_str(), None),
    };

    let mut value = Decimal::ZERO;
    for c in whole.chars() {
        if let Some(digit) = DIGITS.find(c) {
            value = value
                .checked_mul(radix_dec)
                .and_then(|v| v.checked_add(Decimal::from(digit)))
                .ok_or_else(RuntimeError::overflow)?;
        }
    }

    if let Some(fraction) = fraction {
        let mut multiplier = Decimal::ONE / radix_dec;
        for c in fraction.chars() {
            if let Some(digit) = DIGITS.find(c) {
                value += multiplier * Decimal::from(digit);
            }
            multiplier /= radix_dec;
        }
    }
    Ok(value)
}

/// Index into a sequence: non-negative integers only
pub fn as_index(n: Decimal) -> Option<usize> {
    if n < Decimal::ZERO || n.fract() != Decimal::ZERO {
        return None;
    }
    n.to_usize()
}

pub fn add(a: Decimal, b: Decimal) -> InterpResult<Decimal> {
    a.checked_add(b).ok_or_else(RuntimeError::overflow)
}

pub fn sub(a: Decimal, b: Decimal) -> InterpResult<Decimal> {
    a.checked_sub(b).ok_or_else(RuntimeError::overflow)
}

pub fn mul(a: Decimal, b: Decimal) -> InterpResult<Decimal> {
    a.checked_mul(b).ok_or_else(RuntimeError::overflow)
}

pub fn div(a: Decimal, b: Decimal) -> InterpResult<Decimal> {
    if b.is_zero() {
        return Err(RuntimeError::division_by_zero());
    }
    a.checked_div(b).ok_or_else(RuntimeError::overflow)
}

fn bit_mask(index: Decimal) -> Option<i64> {
    let shift = index.trunc().to_i64()?;
    (0..63).contains(&shift).then(|| 1i64 << shift)
}

/// Bit test used by `number at index`
pub fn bit_at(n: Decimal, index: Decimal) -> bool {
    match (n.trunc().to_i64(), bit_mask(index)) {
        (Some(bits), Some(mask)) => bits & mask != 0,
        _ => false,
    }
}

/// Set or clear one bit. Anything but a single numeric index leaves `n` alone.
pub fn set_bit(n: Decimal, indexes: &[Value], on: bool) -> Decimal {
    let [index] = indexes else { return n };
    let (Some(bits), Some(mask)) = (
        n.trunc().to_i64(),
        index.numeric().and_then(bit_mask),
    ) else {
        return n;
    };
    Decimal::from(if on { bits | mask } else { bits & !mask })
}

/// The character with this code point
pub fn to_char(n: Decimal) -> InterpResult<char> {
    n.trunc()
        .to_u32()
        .and_then(char::from_u32)
        .ok_or_else(|| RuntimeError::invalid_char_code(&format(n)))
}
