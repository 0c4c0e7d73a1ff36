//! Error types for the codec layer.
//!
//! A failed `decode` returns a [`CodecError`]. The value is structured
//! (you can `match` on it), and its `Display` output is a fixed English
//! grammar:
//!
//! ```text
//! Problem with the value of property "tags": Problem with the value at index 1: Expected a string, but received a number with value 5
//! ```
//!
//! The wording is a contract. [`parse_error`](crate::parse_error) turns
//! these strings back into a [`DecodeError`](crate::DecodeError) tree, so
//! changing a single quote or comma in an `#[error]` attribute below is a
//! breaking change for every consumer that stores or forwards messages.

use serde_json::Value;
use verity_adt::AdtError;

use crate::kind::Received;

/// A validation failure produced by `decode`.
///
/// Nested variants (`Property`, `Index`, `OneOf`, ...) wrap the failure of
/// a child codec, so a deeply nested problem renders as a full "path"
/// described in prose.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CodecError {
    /// The input has the wrong type (or, for `exactly`, the wrong value).
    /// `expected` is a phrase like `a number` or `"red", "green"`.
    #[error("Expected {expected}, but received {received}")]
    Mismatch { expected: String, received: Received },

    /// A required interface property is absent from the input object.
    #[error("Problem with property \"{key}\": it does not exist in received object {object}")]
    MissingProperty { key: String, object: Value },

    /// The value of an object property failed to decode.
    #[error("Problem with the value of property \"{key}\": {inner}")]
    Property { key: String, inner: Box<CodecError> },

    /// A record key failed the key codec.
    #[error("Problem with key type of property \"{key}\": {inner}")]
    PropertyKey { key: String, inner: Box<CodecError> },

    /// An array or tuple element failed to decode.
    #[error("Problem with the value at index {index}: {inner}")]
    Index { index: usize, inner: Box<CodecError> },

    /// Every alternative of a `one_of` failed. Errors are kept in the
    /// order the alternatives were tried.
    #[error("One of the following problems occured: {}", render_alternatives(.errors))]
    OneOf { errors: Vec<CodecError> },

    /// A tuple received an array of the wrong length.
    #[error(
        "Expected an array of length {expected}, but received an array with length of {received}"
    )]
    TupleLength { expected: usize, received: usize },

    /// A non-empty list received `[]`.
    #[error("Expected an array with at least one element, but received an empty array")]
    EmptyList,

    /// The date codec did not receive a string.
    #[error("Problem with date string: {inner}")]
    DateString { inner: Box<CodecError> },

    /// The date codec received a string it could not parse.
    #[error("Expected a valid date string, but received a string that cannot be parsed")]
    InvalidDate,

    /// A message from a user-defined codec, rendered as-is.
    #[error("{0}")]
    Custom(String),
}

impl CodecError {
    /// The `reportError` constructor: "expected X, got this input".
    pub fn mismatch(expected: impl Into<String>, input: Option<&Value>) -> Self {
        Self::Mismatch {
            expected: expected.into(),
            received: Received::of(input),
        }
    }

    /// Wraps `inner` as the failure of property `key`.
    pub fn property(key: impl Into<String>, inner: CodecError) -> Self {
        Self::Property {
            key: key.into(),
            inner: Box::new(inner),
        }
    }

    /// Wraps `inner` as the failure of record key `key`.
    pub fn property_key(key: impl Into<String>, inner: CodecError) -> Self {
        Self::PropertyKey {
            key: key.into(),
            inner: Box::new(inner),
        }
    }

    /// Wraps `inner` as the failure of element `index`.
    pub fn index(index: usize, inner: CodecError) -> Self {
        Self::Index {
            index,
            inner: Box::new(inner),
        }
    }
}

impl From<String> for CodecError {
    fn from(message: String) -> Self {
        Self::Custom(message)
    }
}

impl From<&str> for CodecError {
    fn from(message: &str) -> Self {
        Self::Custom(message.to_owned())
    }
}

impl From<AdtError> for CodecError {
    fn from(err: AdtError) -> Self {
        match err {
            AdtError::EmptyList => Self::EmptyList,
        }
    }
}

/// Formats a type mismatch as `Expected {expected}, but received {...}`.
///
/// This is the string form of [`CodecError::mismatch`], exposed for
/// hand-written codecs that want messages the parser understands.
pub fn report_error(expected: &str, input: Option<&Value>) -> String {
    CodecError::mismatch(expected, input).to_string()
}

fn render_alternatives(errors: &[CodecError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("({i}) {err}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_report_error_template() {
        assert_eq!(
            report_error("a number", Some(&json!("4"))),
            "Expected a number, but received a string with value \"4\""
        );
        assert_eq!(report_error("a string", None), "Expected a string, but received undefined");
        assert_eq!(
            report_error("a string", Some(&json!(true))),
            "Expected a string, but received a boolean"
        );
    }

    #[test]
    fn test_nested_rendering_builds_prose_path() {
        let err = CodecError::property(
            "tags",
            CodecError::index(1, CodecError::mismatch("a string", Some(&json!(5)))),
        );
        assert_eq!(
            err.to_string(),
            "Problem with the value of property \"tags\": Problem with the value at index 1: \
             Expected a string, but received a number with value 5"
        );
    }

    #[test]
    fn test_one_of_numbers_alternatives_from_zero() {
        let err = CodecError::OneOf {
            errors: vec![
                CodecError::mismatch("a string", Some(&json!(0))),
                CodecError::mismatch("a boolean", Some(&json!(0))),
            ],
        };
        assert_eq!(
            err.to_string(),
            "One of the following problems occured: \
             (0) Expected a string, but received a number with value 0, \
             (1) Expected a boolean, but received a number with value 0"
        );
    }

    #[test]
    fn test_missing_property_embeds_object_json() {
        let err = CodecError::MissingProperty {
            key: "a".into(),
            object: json!({"b": 1}),
        };
        assert_eq!(
            err.to_string(),
            "Problem with property \"a\": it does not exist in received object {\"b\":1}"
        );
    }

    #[test]
    fn test_from_adt_error() {
        assert_eq!(CodecError::from(AdtError::EmptyList), CodecError::EmptyList);
    }

    #[test]
    fn test_custom_renders_verbatim() {
        assert_eq!(CodecError::from("nope").to_string(), "nope");
    }
}
