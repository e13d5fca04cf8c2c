//! `serde_json` conversion routines.
use crate::{
    error::{JsonConversionError, LuaConversionError},
    value::{from_utf8_cow, from_utf8_cow_lossy},
    LuaMap, LuaValue,
};
use serde_json::{Map as JsonMap, Number as JsonNumber, Value as JsonValue};
use std::borrow::{Borrow, Cow};

/// Largest integer magnitude an `f64` can hold exactly.
const MAX_SAFE_INTEGER: f64 = ((1_i64 << f64::MANTISSA_DIGITS) - 1) as f64;

impl<'a> TryFrom<LuaValue<'a>> for JsonValue {
    type Error = JsonConversionError;

    fn try_from(value: LuaValue<'a>) -> Result<Self, Self::Error> {
        to_json_value(value, JsonConversionOptions::default())
    }
}

impl TryFrom<JsonValue> for LuaValue<'static> {
    type Error = LuaConversionError;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        from_json_value(value)
    }
}

/// [Lua to JSON][to_json_value] conversion options.
#[derive(Default, Debug, PartialEq)]
pub struct JsonConversionOptions {
    /// By default, [`to_json_value()`] returns
    /// [`JsonConversionError::Utf8Error`] on invalid UTF-8 sequences.
    ///
    /// When this option is set to `true`, it uses
    /// [lossy string conversion][String::from_utf8_lossy] instead. This can
    /// result in data loss.
    pub lossy_string: bool,
}

/// Converts a [`LuaValue`] into a [`serde_json::Value`].
///
/// The conversion is lossy in places, so `from_json_value(to_json_value(a))`
/// may not return the same value:
///
/// * [`f64::INFINITY`], [`f64::NEG_INFINITY`] and [`f64::NAN`] cannot be
///   represented in JSON, and return [`JsonConversionError`].
///
/// * Numbers without a fractional part become JSON integers.
///
/// * Lua strings are assumed to be UTF-8; anything else errors, or is
///   [replaced][String::from_utf8_lossy] when
///   [`lossy_string`][JsonConversionOptions::lossy_string] is set.
///
/// * A [`Sequence`][LuaValue::Sequence] becomes a JSON array; a
///   [`Map`][LuaValue::Map] becomes a JSON object whose keys are strings
///   (numeric keys are formatted with Rust's conventions, so `{[1] = "x"}`
///   becomes `{"1": "x"}`). Keys that are not numbers or strings return
///   [`JsonConversionError::UnrepresentableKey`].
///
/// * Duplicate stringified keys are silently overwritten (later entries take
///   precedence). `serde_json` may not preserve object key order.
pub fn to_json_value(
    value: LuaValue<'_>,
    opts: impl Borrow<JsonConversionOptions>,
) -> Result<JsonValue, JsonConversionError> {
    let opts = opts.borrow();

    match value {
        LuaValue::Nil => Ok(JsonValue::Null),

        LuaValue::Boolean(b) => Ok(JsonValue::Bool(b)),

        LuaValue::Number(n) => number_to_json(n),

        LuaValue::String(v) => Ok(JsonValue::from(string_to_json(v, opts)?.into_owned())),

        LuaValue::Sequence(items) => Ok(JsonValue::Array(
            items
                .into_iter()
                .map(|item| to_json_value(item, opts))
                .collect::<Result<_, _>>()?,
        )),

        LuaValue::Map(map) => {
            let mut object = JsonMap::with_capacity(map.len());
            for (key, value) in map {
                let key = match key {
                    LuaValue::String(s) => string_to_json(s, opts)?.into_owned(),
                    LuaValue::Number(n) => number_to_json(n)?.to_string(),
                    _ => return Err(JsonConversionError::UnrepresentableKey),
                };
                object.insert(key, to_json_value(value, opts)?);
            }
            Ok(JsonValue::Object(object))
        }
    }
}

fn number_to_json(n: f64) -> Result<JsonValue, JsonConversionError> {
    if n.is_nan() {
        return Err(JsonConversionError::NaN);
    }
    if n == f64::INFINITY {
        return Err(JsonConversionError::PositiveInfinity);
    }
    if n == f64::NEG_INFINITY {
        return Err(JsonConversionError::NegativeInfinity);
    }
    if n.fract() == 0. && n.abs() <= MAX_SAFE_INTEGER {
        return Ok(JsonValue::from(n as i64));
    }
    // finite values always convert
    Ok(JsonNumber::from_f64(n).map(JsonValue::Number).unwrap_or(JsonValue::Null))
}

fn string_to_json<'a>(
    v: Cow<'a, [u8]>,
    opts: &JsonConversionOptions,
) -> Result<Cow<'a, str>, JsonConversionError> {
    if opts.lossy_string {
        Ok(from_utf8_cow_lossy(v))
    } else {
        Ok(from_utf8_cow(v)?)
    }
}

/// Converts a [`serde_json::Value`] into an owned [`LuaValue`].
///
/// `null` becomes [`Nil`][LuaValue::Nil], arrays become
/// [`Sequence`][LuaValue::Sequence]s, and objects become string-keyed
/// [`Map`][LuaValue::Map]s. Numbers that don't fit an `f64` return
/// [`LuaConversionError::Number`].
pub fn from_json_value(value: JsonValue) -> Result<LuaValue<'static>, LuaConversionError> {
    Ok(match value {
        JsonValue::Null => LuaValue::Nil,
        JsonValue::Bool(b) => LuaValue::Boolean(b),
        JsonValue::Number(n) => {
            LuaValue::Number(n.as_f64().ok_or(LuaConversionError::Number)?)
        }
        JsonValue::String(s) => LuaValue::String(Cow::Owned(s.into_bytes())),
        JsonValue::Array(items) => LuaValue::Sequence(
            items
                .into_iter()
                .map(from_json_value)
                .collect::<Result<_, _>>()?,
        ),
        JsonValue::Object(object) => {
            let mut map = LuaMap::with_capacity(object.len());
            for (key, value) in object {
                map.insert(LuaValue::from(key), from_json_value(value)?);
            }
            LuaValue::Map(map)
        }
    })
}
