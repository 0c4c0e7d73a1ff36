//! The interface codec: fixed-shape JSON objects.
//!
//! An interface is declared as an ordered list of `(property, codec)`
//! pairs. Each property may have a different Rust type, so the decoded
//! value is a [`Record`], a typed property bag you read back with
//! [`Record::field`]:
//!
//! ```rust
//! use verity_codec::{number, optional, string, Codec, Properties, Record};
//! use serde_json::json;
//!
//! let user = Codec::interface(
//!     Properties::new()
//!         .property("id", number())
//!         .property("nickname", optional(string())),
//! );
//!
//! let record = user.decode(&json!({"id": 7, "extra": true})).unwrap();
//! assert_eq!(record.field::<f64>("id").unwrap(), 7.0);
//! assert_eq!(record.optional_field::<String>("nickname").unwrap(), None);
//! assert!(!record.contains_key("extra"));
//! ```
//!
//! To get a plain struct instead, chain [`Codec::transform`] and read the
//! fields in the decode closure.

use std::any::{type_name, Any};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::codec::Codec;
use crate::combinator::Merge;
use crate::error::CodecError;
use crate::schema::{optimize_schema, Schema};

// ---------------------------------------------------------------------------
// FieldValue
// ---------------------------------------------------------------------------

/// A value that can live in a [`Record`].
///
/// Implemented automatically for every `'static` type that is `Clone`,
/// `PartialEq`, `Debug`, `Send` and `Sync`. The methods exist so a
/// `Box<dyn FieldValue>` can still be downcast, cloned and compared.
pub trait FieldValue: Any + Send + Sync + fmt::Debug {
    fn as_any(&self) -> &dyn Any;
    fn clone_boxed(&self) -> Box<dyn FieldValue>;
    fn eq_field(&self, other: &dyn FieldValue) -> bool;
}

impl<T> FieldValue for T
where
    T: Any + Clone + PartialEq + Send + Sync + fmt::Debug,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_boxed(&self) -> Box<dyn FieldValue> {
        Box::new(self.clone())
    }

    fn eq_field(&self, other: &dyn FieldValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| other == self)
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// The decoded form of an interface: property names mapped to values of
/// any [`FieldValue`] type.
///
/// Properties decoded by an `optional` codec hold an `Option<T>` when
/// present and are missing from the record when the input omitted them.
/// [`Record::optional_field`] covers both cases.
#[derive(Default)]
pub struct Record {
    fields: BTreeMap<String, Box<dyn FieldValue>>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Record::insert`].
    pub fn with<T: FieldValue>(mut self, key: impl Into<String>, value: T) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets a property, returning the previous value if there was one.
    pub fn insert<T: FieldValue>(
        &mut self,
        key: impl Into<String>,
        value: T,
    ) -> Option<Box<dyn FieldValue>> {
        self.fields.insert(key.into(), Box::new(value))
    }

    /// Borrows a property as a `T`. `None` if it is missing or has
    /// another type.
    pub fn get<T: 'static>(&self, key: &str) -> Option<&T> {
        self.fields
            .get(key)
            .and_then(|value| value.as_ref().as_any().downcast_ref::<T>())
    }

    /// Reads a required property as a `T`.
    ///
    /// # Errors
    /// Returns [`CodecError::Custom`] if the property is missing or holds
    /// a different type.
    pub fn field<T: Clone + 'static>(&self, key: &str) -> Result<T, CodecError> {
        let value = self
            .fields
            .get(key)
            .ok_or_else(|| CodecError::Custom(format!("record has no property \"{key}\"")))?;
        value
            .as_ref()
            .as_any()
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| wrong_type::<T>(key))
    }

    /// Reads a property decoded by an `optional` (or `maybe`) codec.
    ///
    /// A missing property is `Ok(None)`. A stored `Option<T>` is returned
    /// as is, and a bare `T` is wrapped in `Some`.
    pub fn optional_field<T: Clone + 'static>(&self, key: &str) -> Result<Option<T>, CodecError> {
        let Some(value) = self.fields.get(key) else {
            return Ok(None);
        };
        let any = value.as_ref().as_any();
        if let Some(option) = any.downcast_ref::<Option<T>>() {
            return Ok(option.clone());
        }
        any.downcast_ref::<T>()
            .map(|value| Some(value.clone()))
            .ok_or_else(|| wrong_type::<T>(key))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Property names in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<Box<dyn FieldValue>> {
        self.fields.remove(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn wrong_type<T>(key: &str) -> CodecError {
    CodecError::Custom(format!(
        "property \"{key}\" does not hold a value of type {}",
        type_name::<T>()
    ))
}

impl Clone for Record {
    fn clone(&self) -> Self {
        Self {
            fields: self
                .fields
                .iter()
                .map(|(key, value)| (key.clone(), value.as_ref().clone_boxed()))
                .collect(),
        }
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.fields.len() == other.fields.len()
            && self.fields.iter().all(|(key, value)| {
                other
                    .fields
                    .get(key)
                    .is_some_and(|theirs| value.as_ref().eq_field(theirs.as_ref()))
            })
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.fields.iter()).finish()
    }
}

/// Properties of `other` overwrite those of `self`, which is what
/// [`intersect`](crate::intersect) of two interfaces needs.
impl Merge for Record {
    fn merge(mut self, other: Self) -> Self {
        self.fields.extend(other.fields);
        self
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

/// A codec with its value type erased, so one list can hold codecs for
/// different property types.
trait ErasedCodec: Send + Sync {
    fn decode(&self, input: Option<&Value>) -> Result<Box<dyn FieldValue>, CodecError>;

    /// `Err` carries the expected type name when `value` is ill-typed.
    fn encode(&self, value: &dyn FieldValue) -> Result<Option<Value>, &'static str>;

    fn schema(&self) -> Schema;

    fn is_optional(&self) -> bool;
}

impl<T: FieldValue> ErasedCodec for Codec<T> {
    fn decode(&self, input: Option<&Value>) -> Result<Box<dyn FieldValue>, CodecError> {
        self.decode_field(input)
            .map(|value| Box::new(value) as Box<dyn FieldValue>)
    }

    fn encode(&self, value: &dyn FieldValue) -> Result<Option<Value>, &'static str> {
        value
            .as_any()
            .downcast_ref::<T>()
            .map(|value| self.encode_field(value))
            .ok_or(type_name::<T>())
    }

    fn schema(&self) -> Schema {
        Codec::schema(self)
    }

    fn is_optional(&self) -> bool {
        Codec::is_optional(self)
    }
}

/// The declared properties of an interface, in declaration order.
#[derive(Clone, Default)]
pub struct Properties {
    entries: Vec<(String, Arc<dyn ErasedCodec>)>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a property. Declaring the same name twice replaces the
    /// earlier codec but keeps its position.
    pub fn property<T: FieldValue>(mut self, key: impl Into<String>, codec: Codec<T>) -> Self {
        let key = key.into();
        let codec: Arc<dyn ErasedCodec> = Arc::new(codec);
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = codec,
            None => self.entries.push((key, codec)),
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(key, _)| key))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// The interface codec
// ---------------------------------------------------------------------------

impl Codec<Record> {
    /// Builds a codec for objects with the given properties.
    ///
    /// - **decode**: the input must be an object. Properties are checked in
    ///   declaration order and the first problem is returned. A missing
    ///   property fails unless its codec is optional, in which case it is
    ///   left out of the result. Unknown extra properties are ignored.
    /// - **encode**: only declared properties are written. A property that
    ///   encodes to "absent" is left out.
    /// - **schema**: `{"type": "object", "properties": ..., "required": ...}`
    ///   where `required` lists every non-optional property.
    pub fn interface(properties: Properties) -> Self {
        let properties = Arc::new(properties);
        let (decoder, encoder) = (Arc::clone(&properties), Arc::clone(&properties));
        Codec::from_parts(
            move |input| decode_interface(&decoder, input),
            move |record: &Record| Some(encode_interface(&encoder, record)),
            move || interface_schema(&properties),
        )
    }
}

fn decode_interface(properties: &Properties, input: Option<&Value>) -> Result<Record, CodecError> {
    let Some(Value::Object(object)) = input else {
        return Err(CodecError::mismatch("an object", input));
    };

    let mut record = Record::new();
    for (key, codec) in &properties.entries {
        match object.get(key) {
            Some(value) => {
                let decoded = codec
                    .decode(Some(value))
                    .map_err(|err| CodecError::property(key.as_str(), err))?;
                record.fields.insert(key.clone(), decoded);
            }
            None if codec.is_optional() => {}
            None => {
                return Err(CodecError::MissingProperty {
                    key: key.clone(),
                    object: Value::Object(object.clone()),
                });
            }
        }
    }
    Ok(record)
}

fn encode_interface(properties: &Properties, record: &Record) -> Value {
    let mut object = Map::new();
    for (key, codec) in &properties.entries {
        let Some(value) = record.fields.get(key) else {
            if !codec.is_optional() {
                tracing::warn!(property = %key, "required property missing from record, skipping");
            }
            continue;
        };
        match codec.encode(value.as_ref()) {
            Ok(Some(encoded)) => {
                object.insert(key.clone(), encoded);
            }
            Ok(None) => {}
            Err(expected) => {
                tracing::warn!(
                    property = %key,
                    expected,
                    "record property has the wrong type, skipping"
                );
            }
        }
    }
    Value::Object(object)
}

fn interface_schema(properties: &Properties) -> Schema {
    let mut schemas = BTreeMap::new();
    let mut required = Vec::new();
    for (key, codec) in &properties.entries {
        schemas.insert(key.clone(), optimize_schema(codec.schema()));
        if !codec.is_optional() {
            required.push(key.clone());
        }
    }
    Schema::object(schemas, required)
}
