//! # Verity
//!
//! Runtime-validating codecs for untyped JSON.
//!
//! Verity checks data you don't control (request bodies, config files,
//! messages from other services) against a codec you build once, and
//! hands back either a typed value or an error that says exactly where
//! the data went wrong. The same codec encodes values back to JSON and
//! describes itself as JSON-Schema.
//!
//! This crate re-exports the pieces:
//!
//! - [`verity_codec`]: codecs, schemas, and the error grammar.
//! - [`verity_adt`]: [`NonEmptyList`](verity_adt::NonEmptyList).
//!
//! ## Quick Start
//!
//! ```rust
//! use verity::prelude::*;
//!
//! let point = Codec::interface(
//!     Properties::new()
//!         .property("x", number())
//!         .property("y", number()),
//! );
//!
//! let record = verity::decode_str(&point, r#"{"x": 1, "y": 2}"#)?;
//! assert_eq!(record.field::<f64>("x")?, 1.0);
//!
//! let err = verity::decode_str(&point, r#"{"x": 1}"#).unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     "Problem with property \"y\": it does not exist in received object {\"x\":1}"
//! );
//! # Ok::<(), verity::VerityError>(())
//! ```

mod error;

pub use error::VerityError;
pub use verity_adt;
pub use verity_codec;

use verity_codec::Codec;

/// Commonly used items, for `use verity::prelude::*`.
pub mod prelude {
    pub use crate::VerityError;
    pub use verity_adt::NonEmptyList;
    #[cfg(feature = "date")]
    pub use verity_codec::date;
    pub use verity_codec::{
        array, boolean, enumeration, exactly, intersect, lazy, map, maybe, non_empty_list,
        null_type, nullable, number, one_of, optional, parse_error, record, string, tuple,
        undefined_type, unknown, Codec, CodecError, DecodeError, Properties, Record, Schema,
    };
}

/// Parses `text` as JSON and decodes it with `codec`.
///
/// # Errors
/// [`VerityError::Json`] if `text` is not JSON, [`VerityError::Codec`] if
/// it is JSON of the wrong shape.
pub fn decode_str<T: 'static>(codec: &Codec<T>, text: &str) -> Result<T, VerityError> {
    let value: serde_json::Value = serde_json::from_str(text)
        .inspect_err(|err| tracing::debug!(error = %err, "input is not JSON"))?;
    Ok(codec.decode(&value)?)
}

/// Encodes `value` with `codec` and renders it as compact JSON.
pub fn encode_string<T: 'static>(codec: &Codec<T>, value: &T) -> String {
    codec.encode(value).to_string()
}
