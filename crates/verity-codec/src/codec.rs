//! The [`Codec`] type: a validator, a serializer and a schema in one value.
//!
//! A codec for `T` knows three things:
//!
//! - **decode**: how to turn an untyped [`Value`] into a `T`, or explain
//!   (with a [`CodecError`]) why it can't.
//! - **encode**: how to turn a `T` back into a [`Value`]. Encoding trusts
//!   its input and never fails.
//! - **schema**: how to describe the accepted shape as JSON-Schema.
//!
//! Codecs are built once (usually in a function or a `static`) and reused
//! for any number of calls. They hold no per-call state, so one codec can
//! be shared freely between threads.
//!
//! ```rust
//! use verity_codec::{array, number, Codec};
//! use serde_json::json;
//!
//! let scores: Codec<Vec<f64>> = array(number());
//!
//! assert_eq!(scores.decode(&json!([1, 2.5])).unwrap(), vec![1.0, 2.5]);
//!
//! let err = scores.decode(&json!([0, "x"])).unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     "Problem with the value at index 1: Expected a number, but received a string with value \"x\""
//! );
//! ```
//!
//! ## The absent value
//!
//! JSON has `null` but no `undefined`. The one place "nothing at all" can
//! show up is a missing object property, so the internal entry points take
//! `Option<&Value>`: `None` means absent. [`Codec::decode`] is the everyday
//! entry point and always passes `Some`.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::CodecError;
use crate::schema::Schema;

type DecodeFn<T> = dyn Fn(Option<&Value>) -> Result<T, CodecError> + Send + Sync;
type EncodeFn<T> = dyn Fn(&T) -> Option<Value> + Send + Sync;
type SchemaFn = dyn Fn() -> Schema + Send + Sync;
type KeyFn<T> = dyn Fn(&str) -> Result<T, CodecError> + Send + Sync;

/// A composable decoder/encoder/schema bundle for values of type `T`.
///
/// Cloning is cheap: the three functions are reference-counted, so a clone
/// shares them with the original.
///
/// ## Why closures and not a trait?
///
/// Combinators such as [`lazy`](crate::lazy) and [`one_of`](crate::one_of)
/// need to store codecs of *different* concrete implementations side by
/// side. Boxing the functions (`Arc<dyn Fn ...>`) gives every codec for `T`
/// the same type, `Codec<T>`, no matter how it was built.
pub struct Codec<T> {
    decoder: Arc<DecodeFn<T>>,
    encoder: Arc<EncodeFn<T>>,
    schema: Arc<SchemaFn>,
    /// Whether an interface may omit a property decoded by this codec.
    optional: bool,
    /// How to decode an object key. JSON keys are always strings, so a
    /// codec like `number` needs a dedicated string-to-number path here.
    key_decoder: Option<Arc<KeyFn<T>>>,
}

impl<T> Clone for Codec<T> {
    fn clone(&self) -> Self {
        Self {
            decoder: Arc::clone(&self.decoder),
            encoder: Arc::clone(&self.encoder),
            schema: Arc::clone(&self.schema),
            optional: self.optional,
            key_decoder: self.key_decoder.clone(),
        }
    }
}

impl<T> fmt::Debug for Codec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec")
            .field("type", &std::any::type_name::<T>())
            .field("optional", &self.optional)
            .finish_non_exhaustive()
    }
}

impl<T: 'static> Codec<T> {
    /// Builds a codec from its three functions. Used by every built-in
    /// codec; user code goes through [`Codec::custom`].
    pub(crate) fn from_parts<D, E, S>(decode: D, encode: E, schema: S) -> Self
    where
        D: Fn(Option<&Value>) -> Result<T, CodecError> + Send + Sync + 'static,
        E: Fn(&T) -> Option<Value> + Send + Sync + 'static,
        S: Fn() -> Schema + Send + Sync + 'static,
    {
        Self {
            decoder: Arc::new(decode),
            encoder: Arc::new(encode),
            schema: Arc::new(schema),
            optional: false,
            key_decoder: None,
        }
    }

    /// Builds a codec from a hand-written decoder and encoder.
    ///
    /// The decoder may fail with anything convertible into a
    /// [`CodecError`]; a plain `String` becomes [`CodecError::Custom`] and
    /// is shown verbatim. The schema defaults to `{}` (anything); override
    /// it with [`Codec::with_schema`].
    ///
    /// ```rust
    /// use verity_codec::{Codec, CodecError};
    /// use serde_json::{json, Value};
    ///
    /// let even = Codec::custom(
    ///     |input: &Value| match input.as_u64() {
    ///         Some(n) if n % 2 == 0 => Ok(n),
    ///         _ => Err(format!("{input} is not an even number")),
    ///     },
    ///     |n: &u64| json!(n),
    /// );
    ///
    /// assert_eq!(even.decode(&json!(4)).unwrap(), 4);
    /// assert_eq!(even.decode(&json!(3)).unwrap_err(), CodecError::from("3 is not an even number"));
    /// ```
    pub fn custom<D, E, Err>(decode: D, encode: E) -> Self
    where
        D: Fn(&Value) -> Result<T, Err> + Send + Sync + 'static,
        Err: Into<CodecError>,
        E: Fn(&T) -> Value + Send + Sync + 'static,
    {
        Self::from_parts(
            move |input| match input {
                Some(value) => decode(value).map_err(Into::into),
                None => Err(CodecError::mismatch("a value", None)),
            },
            move |value| Some(encode(value)),
            Schema::any,
        )
    }

    /// Replaces the schema this codec reports.
    pub fn with_schema<S>(mut self, schema: S) -> Self
    where
        S: Fn() -> Schema + Send + Sync + 'static,
    {
        self.schema = Arc::new(schema);
        self
    }

    /// Validates `input` and converts it into a `T`.
    ///
    /// # Errors
    /// Returns the first problem found (or, for `one_of`, every
    /// alternative's problem). See [`CodecError`] for the message format.
    pub fn decode(&self, input: &Value) -> Result<T, CodecError> {
        self.decode_field(Some(input)).inspect_err(|err| {
            tracing::trace!(error = %err, "decode failed");
        })
    }

    /// Like [`Codec::decode`], but `None` stands for an absent value.
    pub fn decode_field(&self, input: Option<&Value>) -> Result<T, CodecError> {
        (self.decoder)(input)
    }

    /// Converts a `T` into an untyped value.
    ///
    /// A codec that encodes to "absent" (an `optional` holding `None`,
    /// for example) produces `null` here, matching what JSON does with
    /// `undefined` inside an array.
    pub fn encode(&self, value: &T) -> Value {
        self.encode_field(value).unwrap_or(Value::Null)
    }

    /// Like [`Codec::encode`], but keeps "absent" as `None` so an
    /// enclosing object can leave the property out.
    pub fn encode_field(&self, value: &T) -> Option<Value> {
        (self.encoder)(value)
    }

    /// The JSON-Schema description of what [`Codec::decode`] accepts.
    pub fn schema(&self) -> Schema {
        (self.schema)()
    }

    /// Whether an interface tolerates a missing property for this codec.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Decodes `input`, panicking on failure.
    ///
    /// This is the only entry point that does not return a `Result`. Use
    /// it for data that is valid by construction (fixtures, constants).
    ///
    /// # Panics
    /// Panics with the rendered [`CodecError`] message if decoding fails.
    pub fn unwrap_decode(&self, input: &Value) -> T {
        match self.decode(input) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    /// Adapts this codec to another Rust type without changing the JSON
    /// it accepts or produces.
    ///
    /// `decode` runs after this codec succeeds and may reject the value;
    /// `encode` maps back before this codec encodes. The schema and the
    /// optional flag carry over.
    pub fn transform<U, D, E>(self, decode: D, encode: E) -> Codec<U>
    where
        U: 'static,
        D: Fn(T) -> Result<U, CodecError> + Send + Sync + 'static,
        E: Fn(&U) -> T + Send + Sync + 'static,
    {
        let Codec {
            decoder,
            encoder,
            schema,
            optional,
            key_decoder,
        } = self;
        let decode = Arc::new(decode);
        let key_decode = Arc::clone(&decode);

        let mut codec = Codec::<U>::from_parts(
            move |input| decoder(input).and_then(|value| decode(value)),
            move |value| encoder(&encode(value)),
            move || schema(),
        );
        codec.optional = optional;
        if let Some(key) = key_decoder {
            codec = codec.with_key_decoder(move |raw| key(raw).and_then(|value| key_decode(value)));
        }
        codec
    }

    /// Marks the codec as tolerating absent interface properties.
    pub(crate) fn into_optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Installs a dedicated decoder for object keys.
    pub(crate) fn with_key_decoder<K>(mut self, key_decoder: K) -> Self
    where
        K: Fn(&str) -> Result<T, CodecError> + Send + Sync + 'static,
    {
        self.key_decoder = Some(Arc::new(key_decoder));
        self
    }

    /// Decodes an object key, using the key decoder when there is one and
    /// the key as a JSON string otherwise.
    pub(crate) fn decode_key(&self, key: &str) -> Result<T, CodecError> {
        match &self.key_decoder {
            Some(key_decoder) => key_decoder(key),
            None => self.decode_field(Some(&Value::String(key.to_owned()))),
        }
    }
}
