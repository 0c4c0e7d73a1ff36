//! Primitive codecs: one runtime type check each.
//!
//! | Codec              | Rust type | Accepts                   | Schema              |
//! |--------------------|-----------|---------------------------|---------------------|
//! | [`string`]         | `String`  | JSON strings              | `{"type":"string"}` |
//! | [`number`]         | `f64`     | JSON numbers              | `{"type":"number"}` |
//! | [`boolean`]        | `bool`    | `true` / `false`          | `{"type":"boolean"}`|
//! | [`null_type`]      | `()`      | `null`                    | `{"type":"null"}`   |
//! | [`undefined_type`] | `()`      | an absent property        | `{}`                |
//! | [`unknown`]        | `Value`   | anything                  | `{}`                |
//!
//! Every primitive encodes by handing the value straight back.

use serde_json::{Number, Value};

use crate::codec::Codec;
use crate::error::CodecError;
use crate::schema::{Schema, SchemaType};

/// Accepts JSON strings.
pub fn string() -> Codec<String> {
    Codec::from_parts(
        |input| match input {
            Some(Value::String(s)) => Ok(s.clone()),
            other => Err(CodecError::mismatch("a string", other)),
        },
        |value: &String| Some(Value::String(value.clone())),
        || Schema::of_type(SchemaType::String),
    )
}

/// Accepts JSON numbers.
///
/// Used as a `record` key codec, it parses the (always string) object keys
/// as numbers, so `{"1": ...}` passes and `{"a": ...}` fails.
pub fn number() -> Codec<f64> {
    Codec::from_parts(
        |input| match input {
            Some(Value::Number(n)) => n
                .as_f64()
                .ok_or_else(|| CodecError::mismatch("a number", input)),
            other => Err(CodecError::mismatch("a number", other)),
        },
        |value: &f64| Some(number_to_value(*value)),
        || Schema::of_type(SchemaType::Number),
    )
    .with_key_decoder(numeric_key)
}

/// Accepts `true` and `false`.
pub fn boolean() -> Codec<bool> {
    Codec::from_parts(
        |input| match input {
            Some(Value::Bool(b)) => Ok(*b),
            other => Err(CodecError::mismatch("a boolean", other)),
        },
        |value: &bool| Some(Value::Bool(*value)),
        || Schema::of_type(SchemaType::Boolean),
    )
}

/// Accepts exactly `null`.
pub fn null_type() -> Codec<()> {
    Codec::from_parts(
        |input| match input {
            Some(Value::Null) => Ok(()),
            other => Err(CodecError::mismatch("a null", other)),
        },
        |_: &()| Some(Value::Null),
        || Schema::of_type(SchemaType::Null),
    )
}

/// Accepts only the absent value (a missing property).
///
/// JSON-Schema has no type for "absent", so the schema is `{}`.
pub fn undefined_type() -> Codec<()> {
    Codec::from_parts(
        |input| match input {
            None => Ok(()),
            other => Err(CodecError::mismatch("an undefined", other)),
        },
        |_: &()| None,
        Schema::any,
    )
}

/// Accepts anything and returns it untouched. An absent value decodes
/// as `null`.
pub fn unknown() -> Codec<Value> {
    Codec::from_parts(
        |input| Ok(input.cloned().unwrap_or(Value::Null)),
        |value: &Value| Some(value.clone()),
        Schema::any,
    )
}

/// Converts an `f64` back into a JSON number.
///
/// Whole numbers are written without a fraction (`3`, not `3.0`), the way
/// JavaScript prints them. NaN and the infinities have no JSON form and
/// become `null`.
pub(crate) fn number_to_value(n: f64) -> Value {
    // 2^53: beyond this an f64 can't represent every integer exactly.
    const MAX_SAFE: f64 = 9_007_199_254_740_992.0;

    if n.fract() == 0.0 && n.abs() <= MAX_SAFE {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

fn numeric_key(key: &str) -> Result<f64, CodecError> {
    let trimmed = key.trim();
    let parsed = match trimmed {
        "" => None,
        "Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        _ => trimmed.parse::<f64>().ok().filter(|n| !n.is_nan()),
    };
    parsed.ok_or_else(|| CodecError::mismatch("a number", Some(&Value::String(key.to_owned()))))
}
