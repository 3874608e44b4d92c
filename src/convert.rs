//! Conversion of textual setting values into typed fields.
//!
//! Integers accept the same literal forms as source code: an optional sign,
//! then `0x`, `0o`, `0b` or a leading `0` (octal) prefix, and `_` separators
//! between digits. Widths are enforced here so that out-of-range input is
//! reported as an overflow instead of being truncated.

use std::num::IntErrorKind;

use thiserror::Error;

use crate::error::ConfigError;
use crate::record::FieldMut;

/// Why a piece of text could not become a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("invalid syntax: {0}")]
    Syntax(String),
    #[error("value out of range")]
    Range,
}

impl ValueError {
    pub fn into_config_error(self, name: &str, raw: &str) -> ConfigError {
        match self {
            ValueError::Syntax(reason) => ConfigError::InvalidValue {
                name: name.to_string(),
                raw: raw.to_string(),
                reason,
            },
            ValueError::Range => ConfigError::Overflow {
                name: name.to_string(),
                raw: raw.to_string(),
            },
        }
    }
}

fn syntax(text: &str) -> ValueError {
    ValueError::Syntax(format!("'{text}' is not a number"))
}

/// Split an unsigned literal into radix and digits, validating separators.
fn split_radix(text: &str) -> Result<(u32, String), ValueError> {
    let (radix, digits, prefixed) = match text.get(..2) {
        Some("0x" | "0X") => (16, &text[2..], true),
        Some("0o" | "0O") => (8, &text[2..], true),
        Some("0b" | "0B") => (2, &text[2..], true),
        _ if text.len() > 1 && text.starts_with('0') => (8, &text[1..], true),
        _ => (10, text, false),
    };

    if digits.is_empty()
        || digits.ends_with('_')
        || digits.contains("__")
        || (!prefixed && digits.starts_with('_'))
        || !digits.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(syntax(text));
    }
    Ok((radix, digits.replace('_', "")))
}

fn magnitude(text: &str) -> Result<u128, ValueError> {
    let (radix, digits) = split_radix(text)?;
    u128::from_str_radix(&digits, radix).map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => ValueError::Range,
        _ => syntax(text),
    })
}

/// Parse a signed integer that must fit in `bits` bits.
pub fn parse_signed(text: &str, bits: u32) -> Result<i64, ValueError> {
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let mag = magnitude(rest).map_err(|e| match e {
        ValueError::Syntax(_) => syntax(text),
        range => range,
    })?;

    let limit = 1u128 << (bits - 1);
    if negative {
        if mag > limit {
            return Err(ValueError::Range);
        }
        Ok((-(mag as i128)) as i64)
    } else {
        if mag >= limit {
            return Err(ValueError::Range);
        }
        Ok(mag as i64)
    }
}

/// Parse an unsigned integer that must fit in `bits` bits. Signs are rejected.
pub fn parse_unsigned(text: &str, bits: u32) -> Result<u64, ValueError> {
    let mag = magnitude(text)?;
    let max = if bits >= 64 {
        u128::from(u64::MAX)
    } else {
        (1u128 << bits) - 1
    };
    if mag > max {
        return Err(ValueError::Range);
    }
    Ok(mag as u64)
}

/// Parse a decimal or scientific float that must fit in `bits` bits.
///
/// Explicit infinities are accepted; finite text that only parses to an
/// infinity is out of range.
pub fn parse_float(text: &str, bits: u32) -> Result<f64, ValueError> {
    let value: f64 = text
        .parse()
        .map_err(|_| ValueError::Syntax(format!("'{text}' is not a float")))?;
    let literal_infinity = text.to_ascii_lowercase().contains("inf");
    if value.is_infinite() && !literal_infinity {
        return Err(ValueError::Range);
    }
    if bits == 32 && value.is_finite() && value.abs() > f64::from(f32::MAX) {
        return Err(ValueError::Range);
    }
    Ok(value)
}

/// Parse the usual boolean spellings: `1 t T TRUE true True` and their negatives.
pub fn parse_bool(text: &str) -> Result<bool, ValueError> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ValueError::Syntax(format!("'{text}' is not a boolean"))),
    }
}

/// Convert `raw` according to the field's kind and store it.
///
/// Text is stored verbatim. Sequences and maps are decoded from JSON and
/// replace the previous value entirely.
pub fn assign_text(name: &str, value: &mut FieldMut<'_>, raw: &str) -> Result<(), ConfigError> {
    let fail = |e: ValueError| e.into_config_error(name, raw);
    match value {
        FieldMut::Signed(slot) => {
            let parsed = parse_signed(raw, slot.bits()).map_err(fail)?;
            slot.set(parsed).map_err(|_| fail(ValueError::Range))?;
        }
        FieldMut::Unsigned(slot) => {
            let parsed = parse_unsigned(raw, slot.bits()).map_err(fail)?;
            slot.set(parsed).map_err(|_| fail(ValueError::Range))?;
        }
        FieldMut::Float(slot) => {
            let parsed = parse_float(raw, slot.bits()).map_err(fail)?;
            if slot.overflows(parsed) {
                return Err(fail(ValueError::Range));
            }
            slot.set(parsed);
        }
        FieldMut::Bool(slot) => **slot = parse_bool(raw).map_err(fail)?,
        FieldMut::Text(slot) => **slot = raw.to_string(),
        FieldMut::Seq(slot) | FieldMut::Map(slot) => {
            slot.set_json(raw).map_err(|source| ConfigError::InvalidJson {
                name: name.to_string(),
                raw: raw.to_string(),
                source,
            })?;
        }
        FieldMut::Record(_) | FieldMut::Unsupported(_) => {
            return Err(ConfigError::UnsupportedKind {
                name: name.to_string(),
                kind: value.kind_name(),
            });
        }
    }
    Ok(())
}
