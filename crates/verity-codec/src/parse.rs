//! Structured decode errors, and the parser that recovers them from
//! rendered messages.
//!
//! A [`CodecError`] is already structured, but once it has been rendered
//! to a string (logged, sent over the wire, stored) only the text is left.
//! [`parse_error`] reads that text back into a [`DecodeError`] tree:
//!
//! ```rust
//! use verity_codec::{parse_error, DecodeError, ExpectedType, ValueKind};
//! use serde_json::json;
//!
//! let parsed = parse_error("Expected a number, but received a string with value \"4\"");
//! assert_eq!(
//!     parsed,
//!     DecodeError::Failure {
//!         expected_type: Some(ExpectedType::Number),
//!         received_type: ValueKind::String,
//!         received_value: Some(json!("4")),
//!     }
//! );
//! ```
//!
//! For errors without ambiguous one-of nesting (see below),
//! `parse_error(&err.to_string()) == DecodeError::from(&err)`.
//!
//! The parser is total. Text it does not recognise, and text nested more
//! than [`MAX_NESTING`] levels deep, becomes [`DecodeError::Custom`]
//! holding the original message.
//!
//! # Grammar
//!
//! ```text
//! error   = one-of | property | key | date | index | leaf
//! one-of  = "One of the following problems occured: " "(0) " error { ", (n) " error }
//! property= "Problem with the value of property \"" key "\": " error
//! key     = "Problem with key type of property \"" key "\": " error
//! date    = "Problem with date string: " error
//! index   = "Problem with the value at index " digits ": " error
//! leaf    = failure | missing-property | custom
//! ```
//!
//! Alternatives of a `one-of` are separated by `", (n) "` where `n` is the
//! next expected counter. When one-of lists nest, a separator is claimed
//! by the innermost list that is waiting for that counter.
//!
//! # Ambiguity
//!
//! The text grammar does not mark where a nested one-of list ends. When a
//! nested list with `k` alternatives sits at position `k - 1` of an outer
//! list that has more than `k` alternatives, the outer list's next
//! separator looks exactly like the nested list's next one, and the nested
//! list takes it. `one_of` over three `optional` codecs renders such a
//! message: the parse has two top-level alternatives, the second holding
//! three errors, while the original had three alternatives of two errors
//! each. Received values whose JSON contains `", (n) "` are misread the
//! same way. Callers that need the exact tree should keep the
//! [`CodecError`] and use [`DecodeError::from`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CodecError;
use crate::kind::ValueKind;

// ---------------------------------------------------------------------------
// DecodeError
// ---------------------------------------------------------------------------

/// A decode failure as a tree.
///
/// Serializes with a `type` tag and camelCase fields:
///
/// ```json
/// {"type": "property", "property": "age",
///  "error": {"type": "failure", "expectedType": "number", "receivedType": "string", "receivedValue": "x"}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DecodeError {
    /// The value (or key) of an object property is wrong, or the property
    /// is missing.
    Property {
        property: String,
        error: Box<DecodeError>,
    },

    /// An array or tuple element is wrong.
    Index { index: usize, error: Box<DecodeError> },

    /// Every alternative failed.
    OneOf { errors: Vec<DecodeError> },

    /// A type (or literal) mismatch.
    #[serde(rename_all = "camelCase")]
    Failure {
        /// `None` when the expected clause is not one of the basic type
        /// phrases, e.g. the literal list of an `exactly` codec.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expected_type: Option<ExpectedType>,
        received_type: ValueKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        received_value: Option<Value>,
    },

    /// Anything else, kept as its message.
    Custom { message: String },
}

/// The `expectedType` vocabulary of a [`DecodeError::Failure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpectedType {
    String,
    Number,
    Boolean,
    Null,
    Undefined,
    Object,
    Array,
    Enum,
}

impl ExpectedType {
    /// Maps the "Expected ..." clause of a mismatch to a type.
    pub fn from_phrase(phrase: &str) -> Option<Self> {
        match phrase {
            "a string" => Some(Self::String),
            "a number" => Some(Self::Number),
            "a boolean" => Some(Self::Boolean),
            "a null" => Some(Self::Null),
            "an undefined" => Some(Self::Undefined),
            "an object" => Some(Self::Object),
            "an array" => Some(Self::Array),
            "an enum member" => Some(Self::Enum),
            _ => None,
        }
    }
}

impl From<&CodecError> for DecodeError {
    fn from(err: &CodecError) -> Self {
        match err {
            CodecError::Mismatch { expected, received } => Self::Failure {
                expected_type: ExpectedType::from_phrase(expected),
                received_type: received.kind,
                received_value: received.value.clone(),
            },
            CodecError::MissingProperty { key, .. } => Self::Property {
                property: key.clone(),
                error: Box::new(absent()),
            },
            CodecError::Property { key, inner } | CodecError::PropertyKey { key, inner } => {
                Self::Property {
                    property: key.clone(),
                    error: Box::new(Self::from(inner.as_ref())),
                }
            }
            CodecError::Index { index, inner } => Self::Index {
                index: *index,
                error: Box::new(Self::from(inner.as_ref())),
            },
            CodecError::OneOf { errors } => Self::OneOf {
                errors: errors.iter().map(Self::from).collect(),
            },
            CodecError::DateString { inner } => Self::from(inner.as_ref()),
            CodecError::TupleLength { .. }
            | CodecError::EmptyList
            | CodecError::InvalidDate
            | CodecError::Custom(_) => Self::Custom {
                message: err.to_string(),
            },
        }
    }
}

impl From<CodecError> for DecodeError {
    fn from(err: CodecError) -> Self {
        Self::from(&err)
    }
}

/// A missing property, as seen from the property's side.
fn absent() -> DecodeError {
    DecodeError::Failure {
        expected_type: None,
        received_type: ValueKind::Undefined,
        received_value: None,
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

const ONE_OF: &str = "One of the following problems occured: ";
const PROPERTY: &str = "Problem with the value of property \"";
const PROPERTY_KEY: &str = "Problem with key type of property \"";
const DATE: &str = "Problem with date string: ";
const INDEX: &str = "Problem with the value at index ";
const KEY_END: &str = "\": ";

/// Text that can start an error, used to pick where a property name ends.
const ERROR_STARTS: [&str; 7] = [
    ONE_OF,
    PROPERTY,
    PROPERTY_KEY,
    DATE,
    INDEX,
    "Expected ",
    "Problem with property \"",
];

/// Deepest tree (properties, indexes and one-of lists) the parser builds.
/// Deeper messages come back as [`DecodeError::Custom`].
pub const MAX_NESTING: usize = 256;

/// `Expected X, but received Y[ with value Z]`, with Y restricted to the
/// received-noun vocabulary of [`ValueKind`].
static FAILURE_RE: Lazy<Regex> = Lazy::new(|| {
    let nouns = ValueKind::ALL
        .iter()
        .map(|kind| regex::escape(kind.received_noun()))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(
        r"(?s)^Expected (.+?), but received ({nouns})(?: with value (.+))?$"
    ))
    .expect("failure message regex")
});

static MISSING_PROPERTY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)^Problem with property "(.*?)": it does not exist in received object .*$"#)
        .expect("missing property regex")
});

/// Recovers a [`DecodeError`] from a rendered [`CodecError`] message.
///
/// Never fails: unrecognised text (or text with unparseable leftovers)
/// comes back as [`DecodeError::Custom`] with the whole message.
pub fn parse_error(message: &str) -> DecodeError {
    match parse_segment(message, &[], 0) {
        Some((error, consumed)) if consumed == message.len() => error,
        Some((_, consumed)) => {
            tracing::debug!(
                text = message,
                consumed,
                "trailing text after error message, keeping it as custom"
            );
            custom(message)
        }
        None => {
            tracing::debug!(
                max = MAX_NESTING,
                "error message nested too deeply, keeping it as custom"
            );
            custom(message)
        }
    }
}

fn custom(message: &str) -> DecodeError {
    DecodeError::Custom {
        message: message.to_owned(),
    }
}

/// A path step peeled off the front of a message, applied once the
/// innermost error is known.
enum Wrapper {
    Property(String),
    Index(usize),
}

impl Wrapper {
    fn wrap(self, error: DecodeError) -> DecodeError {
        match self {
            Self::Property(property) => DecodeError::Property {
                property,
                error: Box::new(error),
            },
            Self::Index(index) => DecodeError::Index {
                index,
                error: Box::new(error),
            },
        }
    }
}

/// Parses one error from the start of `text`.
///
/// `stops` holds the separator counters the enclosing one-of lists are
/// waiting for; a leaf ends where the first of them appears. `depth` is
/// the nesting already built above this segment. Returns the error and
/// the number of bytes consumed, or `None` past [`MAX_NESTING`].
///
/// Path prefixes are peeled in a loop, so only one-of lists recurse.
fn parse_segment(text: &str, stops: &[usize], depth: usize) -> Option<(DecodeError, usize)> {
    let mut wrappers = Vec::new();
    let mut offset = 0;
    while let Some((wrapper, used)) = strip_wrapper(&text[offset..]) {
        offset += used;
        if let Some(wrapper) = wrapper {
            wrappers.push(wrapper);
            if depth + wrappers.len() > MAX_NESTING {
                return None;
            }
        }
    }

    let rest = &text[offset..];
    let (mut error, used) = match rest.strip_prefix(ONE_OF) {
        Some(list) => {
            let level = depth + wrappers.len() + 1;
            if level > MAX_NESTING {
                return None;
            }
            let (errors, used) = parse_alternatives(list, stops, level)?;
            (DecodeError::OneOf { errors }, ONE_OF.len() + used)
        }
        None => {
            let end = leaf_end(rest, stops);
            (parse_leaf(&rest[..end]), end)
        }
    };

    for wrapper in wrappers.into_iter().rev() {
        error = wrapper.wrap(error);
    }
    Some((error, offset + used))
}

/// Strips one path prefix from `text`. The date prefix is transparent and
/// yields no wrapper. Returns `None` when `text` does not start with one.
fn strip_wrapper(text: &str) -> Option<(Option<Wrapper>, usize)> {
    for prefix in [PROPERTY, PROPERTY_KEY] {
        if let Some(rest) = text.strip_prefix(prefix) {
            if let Some(end) = property_name_end(rest) {
                let wrapper = Wrapper::Property(rest[..end].to_owned());
                return Some((Some(wrapper), prefix.len() + end + KEY_END.len()));
            }
        }
    }

    if text.starts_with(DATE) {
        return Some((None, DATE.len()));
    }

    let rest = text.strip_prefix(INDEX)?;
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    let index = rest[..digits].parse::<usize>().ok()?;
    rest[digits..].strip_prefix(": ")?;
    Some((Some(Wrapper::Index(index)), INDEX.len() + digits + 2))
}

/// Where the property name at the start of `text` ends.
///
/// Names may themselves contain `": `, so the first split followed by
/// something that starts an error wins, and the first split overall is
/// the fallback.
fn property_name_end(text: &str) -> Option<usize> {
    let mut splits = text.match_indices(KEY_END).map(|(at, _)| at);
    let first = splits.next()?;
    let starts_error = |at: usize| {
        let body = &text[at + KEY_END.len()..];
        ERROR_STARTS.iter().any(|start| body.starts_with(start))
    };
    if starts_error(first) {
        return Some(first);
    }
    Some(splits.find(|&at| starts_error(at)).unwrap_or(first))
}

/// Parses `(0) e0, (1) e1, ...`. Returns the errors and the bytes used,
/// or `None` past [`MAX_NESTING`].
fn parse_alternatives(text: &str, stops: &[usize], depth: usize) -> Option<(Vec<DecodeError>, usize)> {
    let mut errors = Vec::new();
    let Some(mut rest) = text.strip_prefix("(0) ") else {
        return Some((errors, 0));
    };
    let mut consumed = "(0) ".len();
    let mut nested = stops.to_vec();

    for index in 0.. {
        let next = index + 1;
        nested.push(next);
        let (error, used) = parse_segment(rest, &nested, depth)?;
        nested.pop();
        errors.push(error);
        consumed += used;
        rest = &rest[used..];

        let separator = format!(", ({next}) ");
        match rest.strip_prefix(separator.as_str()) {
            Some(after) => {
                consumed += separator.len();
                rest = after;
            }
            None => break,
        }
    }
    Some((errors, consumed))
}

/// Where a leaf starting at `text` ends: at the first separator any
/// enclosing one-of list is waiting for, or at the end of the text.
fn leaf_end(text: &str, stops: &[usize]) -> usize {
    stops
        .iter()
        .filter_map(|stop| text.find(&format!(", ({stop}) ")))
        .min()
        .unwrap_or(text.len())
}

fn parse_leaf(text: &str) -> DecodeError {
    if let Some(failure) = parse_failure(text) {
        return failure;
    }
    if let Some(caps) = MISSING_PROPERTY_RE.captures(text) {
        return DecodeError::Property {
            property: caps[1].to_owned(),
            error: Box::new(absent()),
        };
    }
    tracing::debug!(text, "unrecognised error message, keeping it as custom");
    DecodeError::Custom {
        message: text.to_owned(),
    }
}

fn parse_failure(text: &str) -> Option<DecodeError> {
    let caps = FAILURE_RE.captures(text)?;
    let received_type = ValueKind::from_received_noun(&caps[2])?;
    let received_value = match caps.get(3) {
        Some(literal) if received_type.carries_value() => {
            Some(serde_json::from_str::<Value>(literal.as_str()).ok()?)
        }
        _ => None,
    };
    Some(DecodeError::Failure {
        expected_type: ExpectedType::from_phrase(&caps[1]),
        received_type,
        received_value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn failure(expected: Option<ExpectedType>, kind: ValueKind, value: Option<Value>) -> DecodeError {
        DecodeError::Failure {
            expected_type: expected,
            received_type: kind,
            received_value: value,
        }
    }

    #[test]
    fn test_parse_failure_with_value() {
        assert_eq!(
            parse_error("Expected a number, but received a string with value \"4\""),
            failure(Some(ExpectedType::Number), ValueKind::String, Some(json!("4")))
        );
    }

    #[test]
    fn test_parse_failure_without_value() {
        assert_eq!(
            parse_error("Expected a string, but received null"),
            failure(Some(ExpectedType::String), ValueKind::Null, None)
        );
        assert_eq!(
            parse_error("Expected a string, but received a boolean"),
            failure(Some(ExpectedType::String), ValueKind::Boolean, None)
        );
    }

    #[test]
    fn test_parse_failure_with_literal_expectation() {
        assert_eq!(
            parse_error("Expected \"a\", \"b\", but received a string with value \"c\""),
            failure(None, ValueKind::String, Some(json!("c")))
        );
    }

    #[test]
    fn test_parse_foreign_kinds() {
        assert_eq!(
            parse_error("Expected a number, but received a bigint"),
            failure(Some(ExpectedType::Number), ValueKind::BigInt, None)
        );
    }

    #[test]
    fn test_parse_missing_property() {
        assert_eq!(
            parse_error("Problem with property \"a\": it does not exist in received object {}"),
            DecodeError::Property {
                property: "a".into(),
                error: Box::new(failure(None, ValueKind::Undefined, None)),
            }
        );
    }

    #[test]
    fn test_parse_nested_path() {
        let parsed = parse_error(
            "Problem with the value of property \"tags\": Problem with the value at index 2: \
             Expected a string, but received an object with value {\"a\":1}",
        );
        assert_eq!(
            parsed,
            DecodeError::Property {
                property: "tags".into(),
                error: Box::new(DecodeError::Index {
                    index: 2,
                    error: Box::new(failure(
                        Some(ExpectedType::String),
                        ValueKind::Object,
                        Some(json!({"a": 1}))
                    )),
                }),
            }
        );
    }

    #[test]
    fn test_parse_key_type_problem() {
        let parsed = parse_error(
            "Problem with key type of property \"a\": Expected a number, but received a string with value \"a\"",
        );
        assert!(matches!(parsed, DecodeError::Property { ref property, .. } if property == "a"));
    }

    #[test]
    fn test_parse_date_wrapper_is_transparent() {
        assert_eq!(
            parse_error("Problem with date string: Expected a string, but received undefined"),
            failure(Some(ExpectedType::String), ValueKind::Undefined, None)
        );
    }

    #[test]
    fn test_parse_one_of() {
        let parsed = parse_error(
            "One of the following problems occured: \
             (0) Expected a string, but received a number with value 0, \
             (1) Expected a boolean, but received a number with value 0",
        );
        assert_eq!(
            parsed,
            DecodeError::OneOf {
                errors: vec![
                    failure(Some(ExpectedType::String), ValueKind::Number, Some(json!(0))),
                    failure(Some(ExpectedType::Boolean), ValueKind::Number, Some(json!(0))),
                ],
            }
        );
    }

    #[test]
    fn test_parse_one_of_with_array_values_containing_commas() {
        let parsed = parse_error(
            "One of the following problems occured: \
             (0) Expected a string, but received an array with value [1,2], \
             (1) Expected a null, but received an array with value [1,2]",
        );
        let DecodeError::OneOf { errors } = parsed else {
            panic!("expected one-of");
        };
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[1],
            failure(Some(ExpectedType::Null), ValueKind::Array, Some(json!([1, 2])))
        );
    }

    #[test]
    fn test_parse_nested_one_of() {
        let inner = CodecError::OneOf {
            errors: vec![
                CodecError::mismatch("a string", Some(&json!(1))),
                CodecError::mismatch("a null", Some(&json!(1))),
                CodecError::mismatch("a boolean", Some(&json!(1))),
            ],
        };
        let outer = CodecError::OneOf {
            errors: vec![
                CodecError::property("a", inner),
                CodecError::mismatch("an array", Some(&json!({}))),
            ],
        };
        assert_eq!(parse_error(&outer.to_string()), DecodeError::from(&outer));
    }

    #[test]
    fn test_unrecognised_text_is_custom() {
        assert_eq!(
            parse_error("something broke"),
            DecodeError::Custom {
                message: "something broke".into()
            }
        );
        assert_eq!(
            parse_error("Problem with the value at index x: nope"),
            DecodeError::Custom {
                message: "Problem with the value at index x: nope".into()
            }
        );
    }

    #[test]
    fn test_projection_of_non_grammar_errors_is_custom() {
        for err in [
            CodecError::EmptyList,
            CodecError::InvalidDate,
            CodecError::TupleLength { expected: 2, received: 1 },
            CodecError::Custom("nope".into()),
        ] {
            let projected = DecodeError::from(&err);
            assert_eq!(projected, DecodeError::Custom { message: err.to_string() });
            assert_eq!(parse_error(&err.to_string()), projected);
        }
    }

    #[test]
    fn test_decode_error_json_shape() {
        let err = DecodeError::Property {
            property: "age".into(),
            error: Box::new(failure(Some(ExpectedType::Number), ValueKind::String, Some(json!("x")))),
        };
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "property",
                "property": "age",
                "error": {
                    "type": "failure",
                    "expectedType": "number",
                    "receivedType": "string",
                    "receivedValue": "x"
                }
            })
        );
        let back: DecodeError = serde_json::from_value(value).unwrap();
        assert_eq!(back, err);
    }

    #[test]
    fn test_one_of_json_tag_is_camel_case() {
        let value = serde_json::to_value(DecodeError::OneOf { errors: vec![] }).unwrap();
        assert_eq!(value, json!({"type": "oneOf", "errors": []}));
    }
}
