//! Runtime-validating codecs for Verity.
//!
//! A [`Codec<T>`] bundles three things for one type `T`:
//!
//! - **decode**: check an untyped [`serde_json::Value`] and turn it into a
//!   `T`, or explain what is wrong with a [`CodecError`].
//! - **encode**: turn a `T` back into a `Value`.
//! - **schema**: describe the accepted shape as JSON-Schema ([`Schema`]).
//!
//! Codecs are built from primitives ([`string`], [`number`], ...) with
//! combinators ([`array`], [`one_of`], [`Codec::interface`], ...):
//!
//! ```rust
//! use verity_codec::{array, number, optional, string, Codec, Properties};
//! use serde_json::json;
//!
//! let user = Codec::interface(
//!     Properties::new()
//!         .property("name", string())
//!         .property("scores", array(number()))
//!         .property("email", optional(string())),
//! );
//!
//! assert!(user.decode(&json!({"name": "Ada", "scores": [1, 2]})).is_ok());
//!
//! let err = user.decode(&json!({"name": "Ada", "scores": [1, "2"]})).unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     "Problem with the value of property \"scores\": Problem with the value at index 1: \
//!      Expected a number, but received a string with value \"2\""
//! );
//! ```
//!
//! # Errors as text and as data
//!
//! [`CodecError`] renders to a fixed English grammar. The same failure is
//! available as a serializable tree, either directly with
//! [`DecodeError::from`] or, when only the text survived, through
//! [`parse_error`].
//!
//! # Feature Flags
//!
//! - `date` (default): the [`date`] codec, backed by `chrono`.

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod codec;
mod combinator;
mod domain;
mod error;
mod interface;
mod kind;
mod parse;
mod primitive;
mod schema;
mod tuple;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use codec::Codec;
pub use combinator::{
    array, enumeration, exactly, intersect, lazy, map, nullable, one_of, optional, record, Merge,
};
#[cfg(feature = "date")]
pub use domain::date;
pub use domain::{maybe, non_empty_list};
pub use error::{report_error, CodecError};
pub use interface::{FieldValue, Properties, Record};
pub use kind::{Received, ValueKind};
pub use parse::{parse_error, DecodeError, ExpectedType, MAX_NESTING};
pub use primitive::{boolean, null_type, number, string, undefined_type, unknown};
pub use schema::{
    flatten_nested_one_of, optimize_schema, remove_one_of_with_single_element, Items, Schema,
    SchemaType,
};
pub use tuple::{tuple, TupleCodecs};
