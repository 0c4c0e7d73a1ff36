//! Runtime classification of untyped input.
//!
//! Every error message in this crate describes what it *received* using
//! a small, fixed vocabulary ("a string with value \"x\"", "null",
//! "an array with value [1]", ...). That vocabulary is shared by two
//! sides that must never drift apart:
//!
//! - the formatter, which renders [`Received`] into messages, and
//! - the reverse parser ([`parse_error`](crate::parse_error)), which maps
//!   those words back to a [`ValueKind`].
//!
//! Both go through the tables on [`ValueKind`] below.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// ValueKind
// ---------------------------------------------------------------------------

/// The runtime type tag of a received value.
///
/// A JSON tree can only produce the first seven variants. `Symbol`,
/// `Function` and `BigInt` exist because error strings produced by other
/// implementations of the same grammar may mention them, and
/// [`parse_error`](crate::parse_error) must be able to name them.
///
/// Serialized in lowercase (`"bigint"`, `"undefined"`, ...), which is the
/// `receivedType` vocabulary of [`DecodeError`](crate::DecodeError).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// The value is absent (a missing object property).
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
    Symbol,
    Function,
    BigInt,
}

impl ValueKind {
    /// Every variant, in the order the parser tries them.
    pub const ALL: [ValueKind; 10] = [
        Self::Undefined,
        Self::Null,
        Self::Boolean,
        Self::Number,
        Self::String,
        Self::Array,
        Self::Object,
        Self::Symbol,
        Self::Function,
        Self::BigInt,
    ];

    /// Classifies an input. `None` is the absent value.
    pub fn of(input: Option<&Value>) -> Self {
        match input {
            None => Self::Undefined,
            Some(Value::Null) => Self::Null,
            Some(Value::Bool(_)) => Self::Boolean,
            Some(Value::Number(_)) => Self::Number,
            Some(Value::String(_)) => Self::String,
            Some(Value::Array(_)) => Self::Array,
            Some(Value::Object(_)) => Self::Object,
        }
    }

    /// How the kind is named on the "received" side of a message.
    ///
    /// `null` and `undefined` are bare words here, but take an article on
    /// the "expected" side (see [`Self::expected_noun`]).
    pub fn received_noun(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Boolean => "a boolean",
            Self::Number => "a number",
            Self::String => "a string",
            Self::Array => "an array",
            Self::Object => "an object",
            Self::Symbol => "a symbol",
            Self::Function => "a function",
            Self::BigInt => "a bigint",
        }
    }

    /// How the kind is named on the "expected" side of a message.
    pub fn expected_noun(self) -> &'static str {
        match self {
            Self::Undefined => "an undefined",
            Self::Null => "a null",
            other => other.received_noun(),
        }
    }

    /// Inverse of [`Self::received_noun`].
    pub fn from_received_noun(noun: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.received_noun() == noun)
    }

    /// Whether a message about this kind carries a literal value.
    ///
    /// Booleans deliberately do not: "received a boolean" never says which
    /// one. The parser relies on this set, so it is part of the grammar.
    pub fn carries_value(self) -> bool {
        !matches!(
            self,
            Self::Undefined
                | Self::Null
                | Self::Boolean
                | Self::Symbol
                | Self::Function
                | Self::BigInt
        )
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
            Self::Symbol => "symbol",
            Self::Function => "function",
            Self::BigInt => "bigint",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Received
// ---------------------------------------------------------------------------

/// The "received" half of a mismatch: what kind of value arrived, and the
/// value itself when the grammar embeds it.
#[derive(Debug, Clone, PartialEq)]
pub struct Received {
    pub kind: ValueKind,
    /// Present only when [`ValueKind::carries_value`] is true.
    pub value: Option<Value>,
}

impl Received {
    /// Captures an input for an error message.
    pub fn of(input: Option<&Value>) -> Self {
        let kind = ValueKind::of(input);
        let value = if kind.carries_value() {
            input.cloned()
        } else {
            None
        };
        Self { kind, value }
    }
}

/// Renders the received clause, e.g. `a number with value 5` or `null`.
impl fmt::Display for Received {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{} with value {}", self.kind.received_noun(), value),
            None => f.write_str(self.kind.received_noun()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_every_json_variant() {
        assert_eq!(ValueKind::of(None), ValueKind::Undefined);
        assert_eq!(ValueKind::of(Some(&json!(null))), ValueKind::Null);
        assert_eq!(ValueKind::of(Some(&json!(true))), ValueKind::Boolean);
        assert_eq!(ValueKind::of(Some(&json!(1.5))), ValueKind::Number);
        assert_eq!(ValueKind::of(Some(&json!("x"))), ValueKind::String);
        assert_eq!(ValueKind::of(Some(&json!([]))), ValueKind::Array);
        assert_eq!(ValueKind::of(Some(&json!({}))), ValueKind::Object);
    }

    #[test]
    fn test_received_noun_round_trips() {
        for kind in ValueKind::ALL {
            assert_eq!(ValueKind::from_received_noun(kind.received_noun()), Some(kind));
        }
        assert_eq!(ValueKind::from_received_noun("a tuple"), None);
    }

    #[test]
    fn test_expected_noun_adds_article_to_null_and_undefined() {
        assert_eq!(ValueKind::Null.expected_noun(), "a null");
        assert_eq!(ValueKind::Undefined.expected_noun(), "an undefined");
        assert_eq!(ValueKind::Array.expected_noun(), "an array");
    }

    #[test]
    fn test_received_display_embeds_json_for_valued_kinds() {
        assert_eq!(Received::of(Some(&json!("4"))).to_string(), "a string with value \"4\"");
        assert_eq!(Received::of(Some(&json!(12))).to_string(), "a number with value 12");
        assert_eq!(Received::of(Some(&json!([1, 2]))).to_string(), "an array with value [1,2]");
        assert_eq!(
            Received::of(Some(&json!({"a": 1}))).to_string(),
            "an object with value {\"a\":1}"
        );
    }

    #[test]
    fn test_received_display_omits_value_for_valueless_kinds() {
        assert_eq!(Received::of(None).to_string(), "undefined");
        assert_eq!(Received::of(Some(&json!(null))).to_string(), "null");
        assert_eq!(Received::of(Some(&json!(false))).to_string(), "a boolean");
    }

    #[test]
    fn test_value_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ValueKind::BigInt).unwrap(), "\"bigint\"");
        assert_eq!(serde_json::to_string(&ValueKind::Undefined).unwrap(), "\"undefined\"");
    }
}
