//! Combinators: functions that build a new [`Codec`] out of existing ones.
//!
//! Each combinator wraps the failures of its children in a context variant
//! of [`CodecError`] (`Index`, `Property`, `OneOf`, ...), which is how a
//! deeply nested problem ends up described as a path:
//!
//! ```rust
//! use verity_codec::{array, record, string, number};
//! use serde_json::json;
//!
//! let tags = record(string(), array(number()));
//! let err = tags.decode(&json!({"a": [1, "two"]})).unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     "Problem with the value of property \"a\": Problem with the value at index 1: \
//!      Expected a number, but received a string with value \"two\""
//! );
//! ```
//!
//! `array`, `record` and `tuple` stop at the first failing element.
//! `one_of` is the exception: when every alternative fails, it reports
//! all of them.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::codec::Codec;
use crate::error::CodecError;
use crate::kind::ValueKind;
use crate::schema::{optimize_schema, Schema, SchemaType};
use crate::tuple::tuple;

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

/// A JSON array whose every element matches `item`.
pub fn array<T: 'static>(item: Codec<T>) -> Codec<Vec<T>> {
    let decoder = item.clone();
    let encoder = item.clone();
    Codec::from_parts(
        move |input| match input {
            Some(Value::Array(elements)) => elements
                .iter()
                .enumerate()
                .map(|(index, element)| {
                    decoder
                        .decode_field(Some(element))
                        .map_err(|err| CodecError::index(index, err))
                })
                .collect(),
            other => Err(CodecError::mismatch("an array", other)),
        },
        move |values: &Vec<T>| {
            Some(Value::Array(
                values.iter().map(|value| encoder.encode(value)).collect(),
            ))
        },
        move || Schema::array(item.schema()),
    )
}

/// A JSON object used as a dictionary: arbitrary keys, uniform values.
///
/// Keys are decoded with `key`. Object keys are always strings, so a key
/// codec that expects something else has to know how to read one from a
/// string; [`number`](crate::number) does, which is what makes
/// `record(number(), ...)` accept `{"1": ...}`.
///
/// The result keeps the input object's key order, which serde_json holds
/// on to through its `preserve_order` feature. It is a `Vec` rather than a
/// map because key types like `f64` are neither `Ord` nor `Hash`.
pub fn record<K, V>(key: Codec<K>, value: Codec<V>) -> Codec<Vec<(K, V)>>
where
    K: 'static,
    V: 'static,
{
    let (key_decoder, value_decoder) = (key.clone(), value.clone());
    let (key_encoder, value_encoder) = (key, value.clone());
    Codec::from_parts(
        move |input| match input {
            Some(Value::Object(object)) => object
                .iter()
                .map(|(raw_key, raw_value)| {
                    let k = key_decoder
                        .decode_key(raw_key)
                        .map_err(|err| CodecError::property_key(raw_key.as_str(), err))?;
                    let v = value_decoder
                        .decode_field(Some(raw_value))
                        .map_err(|err| CodecError::property(raw_key.as_str(), err))?;
                    Ok::<_, CodecError>((k, v))
                })
                .collect(),
            other => Err(CodecError::mismatch("an object", other)),
        },
        move |entries: &Vec<(K, V)>| {
            let mut object = Map::new();
            for (k, v) in entries {
                let key = match key_encoder.encode(k) {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                // An absent value means "leave the property out".
                if let Some(v) = value_encoder.encode_field(v) {
                    object.insert(key, v);
                }
            }
            Some(Value::Object(object))
        },
        move || Schema::dictionary(optimize_schema(value.schema())),
    )
}

/// An associative container serialised as an array of `[key, value]`
/// pairs, so keys don't have to be strings.
pub fn map<K, V>(key: Codec<K>, value: Codec<V>) -> Codec<BTreeMap<K, V>>
where
    K: Ord + Clone + 'static,
    V: Clone + 'static,
{
    array(tuple((key, value))).transform(
        |pairs| Ok(pairs.into_iter().collect()),
        |entries: &BTreeMap<K, V>| {
            entries
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        },
    )
}

// ---------------------------------------------------------------------------
// Unions
// ---------------------------------------------------------------------------

/// Tries each codec in order and returns the first success.
///
/// When every alternative fails the error lists all of them, numbered
/// from zero in the order they were tried.
///
/// Encoding picks the first alternative whose own encoding decodes back
/// successfully, so with overlapping alternatives the earliest listed one
/// wins. If none round-trips, the first alternative's encoding is used.
pub fn one_of<T: 'static>(codecs: Vec<Codec<T>>) -> Codec<T> {
    let alternatives = Arc::new(codecs);
    let (decoders, encoders) = (Arc::clone(&alternatives), Arc::clone(&alternatives));
    Codec::from_parts(
        move |input| {
            let mut errors = Vec::with_capacity(decoders.len());
            for codec in decoders.iter() {
                match codec.decode_field(input) {
                    Ok(value) => return Ok(value),
                    Err(err) => errors.push(err),
                }
            }
            Err(CodecError::OneOf { errors })
        },
        move |value: &T| {
            encoders
                .iter()
                .find_map(|codec| {
                    let encoded = codec.encode_field(value);
                    codec.decode_field(encoded.as_ref()).is_ok().then_some(encoded)
                })
                .unwrap_or_else(|| encoders.first().and_then(|codec| codec.encode_field(value)))
        },
        move || optimize_schema(Schema::one_of(alternatives.iter().map(Codec::schema).collect())),
    )
}

/// Accepts the property being absent, or a value matching `codec`.
///
/// An interface omits a property decoded by this codec when it is
/// missing, and drops it from the output when it encodes `None`. The
/// schema is the inner codec's; optionality shows up in the parent's
/// `required` list instead.
pub fn optional<T: 'static>(codec: Codec<T>) -> Codec<Option<T>> {
    let (decoder, encoder) = (codec.clone(), codec.clone());
    Codec::from_parts(
        move |input| match input {
            None => Ok(None),
            Some(_) => decoder.decode_field(input).map(Some).map_err(|err| CodecError::OneOf {
                errors: vec![err, CodecError::mismatch("an undefined", input)],
            }),
        },
        move |value: &Option<T>| value.as_ref().and_then(|inner| encoder.encode_field(inner)),
        move || codec.schema(),
    )
    .into_optional()
}

/// Accepts `null`, or a value matching `codec`. The property itself is
/// still required.
pub fn nullable<T: 'static>(codec: Codec<T>) -> Codec<Option<T>> {
    let (decoder, encoder) = (codec.clone(), codec.clone());
    Codec::from_parts(
        move |input| match decoder.decode_field(input) {
            Ok(value) => Ok(Some(value)),
            Err(_) if matches!(input, Some(Value::Null)) => Ok(None),
            Err(err) => Err(CodecError::OneOf {
                errors: vec![err, CodecError::mismatch("a null", input)],
            }),
        },
        move |value: &Option<T>| match value {
            Some(inner) => encoder.encode_field(inner),
            None => Some(Value::Null),
        },
        move || {
            optimize_schema(Schema::one_of(vec![
                codec.schema(),
                Schema::of_type(SchemaType::Null),
            ]))
        },
    )
}

// ---------------------------------------------------------------------------
// Literals
// ---------------------------------------------------------------------------

/// Accepts only the given literal values.
///
/// The two failure shapes are deliberately different. A value of the
/// right type lists the allowed literals; a value of the wrong type names
/// the allowed types:
///
/// ```rust
/// use verity_codec::exactly;
/// use serde_json::json;
///
/// let zero = exactly([0]);
/// assert_eq!(
///     zero.decode(&json!(10)).unwrap_err().to_string(),
///     "Expected 0, but received a number with value 10"
/// );
/// assert_eq!(
///     zero.decode(&json!("x")).unwrap_err().to_string(),
///     "Expected a number, but received a string with value \"x\""
/// );
/// ```
pub fn exactly<I>(values: I) -> Codec<Value>
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    let literals: Arc<Vec<Value>> = Arc::new(values.into_iter().map(Into::into).collect());
    let decoder = Arc::clone(&literals);
    Codec::from_parts(
        move |input| {
            if let Some(value) = input {
                if decoder.iter().any(|literal| same_literal(literal, value)) {
                    return Ok(value.clone());
                }
            }
            Err(CodecError::mismatch(expected_literals(&decoder, input), input))
        },
        |value: &Value| Some(value.clone()),
        move || {
            let mut schema = Schema::enumeration(literals.to_vec());
            schema.schema_type = common_schema_type(&literals);
            schema
        },
    )
}

/// Maps JSON literals onto the variants of a Rust enum.
///
/// Only strings and numbers are accepted, the two value types an enum
/// member can have.
///
/// ```rust
/// use verity_codec::enumeration;
/// use serde_json::json;
///
/// #[derive(Debug, Clone, PartialEq)]
/// enum Color { Red, Green }
///
/// let color = enumeration([(Color::Red, "red"), (Color::Green, "green")]);
/// assert_eq!(color.decode(&json!("green")).unwrap(), Color::Green);
/// assert_eq!(color.encode(&Color::Red), json!("red"));
/// ```
pub fn enumeration<E, V, I>(members: I) -> Codec<E>
where
    E: Clone + PartialEq + Send + Sync + 'static,
    V: Into<Value>,
    I: IntoIterator<Item = (E, V)>,
{
    let members: Arc<Vec<(E, Value)>> = Arc::new(
        members
            .into_iter()
            .map(|(member, value)| (member, value.into()))
            .collect(),
    );
    let (decoder, encoder) = (Arc::clone(&members), Arc::clone(&members));
    Codec::from_parts(
        move |input| {
            let value = match input {
                Some(value @ (Value::String(_) | Value::Number(_))) => value,
                other => {
                    return Err(CodecError::OneOf {
                        errors: vec![
                            CodecError::mismatch("a string", other),
                            CodecError::mismatch("a number", other),
                        ],
                    });
                }
            };
            decoder
                .iter()
                .find(|(_, literal)| same_literal(literal, value))
                .map(|(member, _)| member.clone())
                .ok_or_else(|| CodecError::mismatch("an enum member", input))
        },
        move |member: &E| {
            encoder
                .iter()
                .find(|(candidate, _)| candidate == member)
                .map(|(_, value)| value.clone())
        },
        move || Schema::enumeration(members.iter().map(|(_, value)| value.clone()).collect()),
    )
}

/// Literal equality where `1` and `1.0` are the same number.
fn same_literal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// The "expected" clause of an `exactly` mismatch.
fn expected_literals(literals: &[Value], input: Option<&Value>) -> String {
    let received = ValueKind::of(input);
    if literals.iter().any(|literal| ValueKind::of(Some(literal)) == received) {
        return literals
            .iter()
            .map(Value::to_string)
            .collect::<Vec<_>>()
            .join(", ");
    }

    let mut kinds: Vec<ValueKind> = Vec::new();
    for literal in literals {
        let kind = ValueKind::of(Some(literal));
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    kinds
        .iter()
        .map(|kind| kind.expected_noun())
        .collect::<Vec<_>>()
        .join(" or ")
}

fn common_schema_type(literals: &[Value]) -> Option<SchemaType> {
    let mut types = literals.iter().map(|literal| match literal {
        Value::Null => SchemaType::Null,
        Value::Bool(_) => SchemaType::Boolean,
        Value::Number(_) => SchemaType::Number,
        Value::String(_) => SchemaType::String,
        Value::Array(_) => SchemaType::Array,
        Value::Object(_) => SchemaType::Object,
    });
    let first = types.next()?;
    types.all(|t| t == first).then_some(first)
}

// ---------------------------------------------------------------------------
// Recursion and composition
// ---------------------------------------------------------------------------

/// Defers building a codec until it is used, which is how recursive
/// types refer to themselves.
///
/// `thunk` runs on every `decode` and `encode` call; nothing is cached.
///
/// ```rust
/// use verity_codec::{array, lazy, number, tuple, Codec};
/// use serde_json::json;
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Tree {
///     value: f64,
///     children: Vec<Tree>,
/// }
///
/// // `[value, [child, ...]]`
/// fn tree() -> Codec<Tree> {
///     tuple((number(), array(lazy(tree)))).transform(
///         |(value, children)| Ok(Tree { value, children }),
///         |t: &Tree| (t.value, t.children.clone()),
///     )
/// }
///
/// let decoded = tree().decode(&json!([1, [[2, []], [3, [[4, []]]]]])).unwrap();
/// assert_eq!(decoded.children[1].children[0].value, 4.0);
/// ```
pub fn lazy<T, F>(thunk: F) -> Codec<T>
where
    T: 'static,
    F: Fn() -> Codec<T> + Send + Sync + 'static,
{
    let thunk = Arc::new(thunk);
    let encode_thunk = Arc::clone(&thunk);
    Codec::from_parts(
        move |input| thunk().decode_field(input),
        move |value: &T| encode_thunk().encode_field(value),
        || Schema::comment("Lazy codecs are not supported when generating a JSON schema"),
    )
}

/// Combines two decoded values of the same type. Used by [`intersect`].
pub trait Merge {
    /// Merges `other` into `self`; on conflict `other` wins.
    fn merge(self, other: Self) -> Self;
}

/// Objects merge shallowly. Anything else is replaced by `other`.
impl Merge for Value {
    fn merge(self, other: Self) -> Self {
        match (self, other) {
            (Value::Object(mut left), Value::Object(right)) => {
                left.extend(right);
                Value::Object(left)
            }
            (_, right) => right,
        }
    }
}

/// Accepts values that match both codecs and merges the two results.
///
/// The usual use is combining two interfaces into one wider shape.
pub fn intersect<T: Merge + 'static>(left: Codec<T>, right: Codec<T>) -> Codec<T> {
    let (left_decoder, right_decoder) = (left.clone(), right.clone());
    let (left_encoder, right_encoder) = (left.clone(), right.clone());
    Codec::from_parts(
        move |input| {
            let l = left_decoder.decode_field(input)?;
            let r = right_decoder.decode_field(input)?;
            Ok(l.merge(r))
        },
        move |value: &T| match (left_encoder.encode_field(value), right_encoder.encode_field(value)) {
            (Some(l), Some(r)) => Some(l.merge(r)),
            (l, r) => r.or(l),
        },
        move || Schema::all_of(vec![left.schema(), right.schema()]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{boolean, null_type, number, string};
    use serde_json::json;

    #[test]
    fn test_array_fails_fast_on_first_bad_index() {
        let err = array(number()).decode(&json!([0, "x", "y"])).unwrap_err();
        assert_eq!(
            err,
            CodecError::index(1, CodecError::mismatch("a number", Some(&json!("x"))))
        );
    }

    #[test]
    fn test_array_rejects_non_arrays() {
        assert_eq!(
            array(string()).decode(&json!({"0": "a"})).unwrap_err().to_string(),
            "Expected an array, but received an object with value {\"0\":\"a\"}"
        );
    }

    #[test]
    fn test_record_with_number_keys() {
        let codec = record(number(), number());
        assert_eq!(codec.decode(&json!({"0": 0})).unwrap(), vec![(0.0, 0.0)]);
        assert_eq!(
            codec.decode(&json!({"a": 0})).unwrap_err().to_string(),
            "Problem with key type of property \"a\": \
             Expected a number, but received a string with value \"a\""
        );
    }

    #[test]
    fn test_record_value_failure_names_property() {
        let err = record(string(), boolean()).decode(&json!({"ok": true, "bad": 1})).unwrap_err();
        assert_eq!(
            err,
            CodecError::property("bad", CodecError::mismatch("a boolean", Some(&json!(1))))
        );
    }

    #[test]
    fn test_record_encode_and_schema() {
        let codec = record(number(), string());
        assert_eq!(
            codec.encode(&vec![(1.0, "a".to_string())]),
            json!({"1": "a"})
        );
        assert_eq!(
            codec.schema().to_value(),
            json!({"type": "object", "additionalProperties": {"type": "string"}})
        );
    }

    fn string_value() -> Codec<Value> {
        string().transform(
            |s| Ok(Value::String(s)),
            |v: &Value| v.as_str().unwrap_or_default().to_owned(),
        )
    }

    fn boolean_value() -> Codec<Value> {
        boolean().transform(|b| Ok(Value::Bool(b)), |v: &Value| v.as_bool().unwrap_or_default())
    }

    #[test]
    fn test_one_of_first_match_wins() {
        let codec = one_of(vec![string_value(), boolean_value()]);
        assert_eq!(codec.decode(&json!(false)).unwrap(), json!(false));

        let err = codec.decode(&json!(0)).unwrap_err();
        match &err {
            CodecError::OneOf { errors } => assert_eq!(errors.len(), 2),
            other => panic!("expected OneOf, got {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            "One of the following problems occured: \
             (0) Expected a string, but received a number with value 0, \
             (1) Expected a boolean, but received a number with value 0"
        );
    }

    #[test]
    fn test_one_of_encode_uses_round_tripping_alternative() {
        let small = number().transform(
            |n| if n < 10.0 { Ok(n) } else { Err(CodecError::from("too big")) },
            |n: &f64| *n,
        );
        let as_text = string().transform(
            |s| s.parse::<f64>().map_err(|e| CodecError::from(e.to_string())),
            |n: &f64| n.to_string(),
        );
        let codec = one_of(vec![small, as_text]);
        assert_eq!(codec.encode(&3.0), json!(3));
        assert_eq!(codec.encode(&42.0), json!("42"));
    }

    #[test]
    fn test_one_of_schema_is_flattened() {
        let codec = one_of(vec![nullable(string()), nullable(string())]);
        assert_eq!(
            codec.schema().to_value(),
            json!({"oneOf": [
                {"type": "string"}, {"type": "null"},
                {"type": "string"}, {"type": "null"}
            ]})
        );
    }

    #[test]
    fn test_exactly_distinguishes_value_and_type_mismatch() {
        let zero = exactly([0]);
        assert!(zero.decode(&json!(0)).is_ok());
        assert!(zero.decode(&json!(0.0)).is_ok());
        let wrong_value = zero.decode(&json!(10)).unwrap_err().to_string();
        let wrong_type = zero.decode(&json!("x")).unwrap_err().to_string();
        assert_eq!(wrong_value, "Expected 0, but received a number with value 10");
        assert_eq!(wrong_type, "Expected a number, but received a string with value \"x\"");
    }

    #[test]
    fn test_exactly_mixed_literals() {
        let codec = exactly([json!("a"), json!(1)]);
        assert_eq!(
            codec.decode(&json!(true)).unwrap_err().to_string(),
            "Expected a string or a number, but received a boolean"
        );
        assert_eq!(
            codec.decode(&json!("b")).unwrap_err().to_string(),
            "Expected \"a\", 1, but received a string with value \"b\""
        );
        assert_eq!(codec.schema().to_value(), json!({"enum": ["a", 1]}));
    }

    #[test]
    fn test_exactly_schema_adds_shared_type() {
        assert_eq!(
            exactly(["red", "green"]).schema().to_value(),
            json!({"type": "string", "enum": ["red", "green"]})
        );
    }

    #[test]
    fn test_optional_absent_and_present() {
        let codec = optional(string());
        assert!(codec.is_optional());
        assert_eq!(codec.decode_field(None).unwrap(), None);
        assert_eq!(codec.decode(&json!("a")).unwrap(), Some("a".to_string()));
        assert_eq!(codec.encode_field(&None), None);
        assert_eq!(codec.schema(), string().schema());
    }

    #[test]
    fn test_optional_failure_lists_both_alternatives() {
        assert_eq!(
            optional(string()).decode(&json!(null)).unwrap_err().to_string(),
            "One of the following problems occured: \
             (0) Expected a string, but received null, \
             (1) Expected an undefined, but received null"
        );
    }

    #[test]
    fn test_nullable() {
        let codec = nullable(number());
        assert!(!codec.is_optional());
        assert_eq!(codec.decode(&json!(null)).unwrap(), None);
        assert_eq!(codec.decode(&json!(2)).unwrap(), Some(2.0));
        assert_eq!(codec.encode(&None), Value::Null);
        assert_eq!(
            codec.schema().to_value(),
            json!({"oneOf": [{"type": "number"}, {"type": "null"}]})
        );
        assert!(codec.decode_field(None).is_err());
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Level {
        Low,
        High,
    }

    fn level() -> Codec<Level> {
        enumeration([(Level::Low, json!(0)), (Level::High, json!("high"))])
    }

    #[test]
    fn test_enumeration_decodes_members() {
        assert_eq!(level().decode(&json!(0)).unwrap(), Level::Low);
        assert_eq!(level().decode(&json!("high")).unwrap(), Level::High);
        assert_eq!(level().encode(&Level::High), json!("high"));
    }

    #[test]
    fn test_enumeration_failures() {
        assert_eq!(
            level().decode(&json!("mid")).unwrap_err().to_string(),
            "Expected an enum member, but received a string with value \"mid\""
        );
        assert!(matches!(
            level().decode(&json!(true)).unwrap_err(),
            CodecError::OneOf { errors } if errors.len() == 2
        ));
        assert_eq!(level().schema().to_value(), json!({"enum": [0, "high"]}));
    }

    #[test]
    fn test_lazy_schema_is_a_comment() {
        let codec = lazy(string);
        assert_eq!(
            codec.schema().to_value(),
            json!({"$comment": "Lazy codecs are not supported when generating a JSON schema"})
        );
        assert_eq!(codec.decode(&json!("x")).unwrap(), "x");
    }

    #[test]
    fn test_merge_value_right_wins() {
        let merged = json!({"a": 1, "b": 1}).merge(json!({"b": 2, "c": 3}));
        assert_eq!(merged, json!({"a": 1, "b": 2, "c": 3}));
        assert_eq!(json!(1).merge(json!("x")), json!("x"));
    }

    #[test]
    fn test_intersect_requires_both() {
        let both = intersect(string_value(), crate::unknown());
        assert_eq!(both.decode(&json!("a")).unwrap(), json!("a"));
        assert!(both.decode(&json!(1)).is_err());
        assert_eq!(
            both.schema().to_value(),
            json!({"allOf": [{"type": "string"}, {}]})
        );
    }

    #[test]
    fn test_map_with_string_keys() {
        let codec = map(string(), null_type());
        let decoded = codec.decode(&json!([["b", null], ["a", null]])).unwrap();
        assert_eq!(decoded.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(codec.encode(&decoded), json!([["a", null], ["b", null]]));
        assert_eq!(
            codec.decode(&json!([["a"]])).unwrap_err().to_string(),
            "Problem with the value at index 0: \
             Expected an array of length 2, but received an array with length of 1"
        );
    }
}
