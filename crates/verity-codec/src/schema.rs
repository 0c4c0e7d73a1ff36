//! JSON-Schema generation.
//!
//! Every codec can describe itself as a [`Schema`]: a subset of the
//! JSON-Schema vocabulary (`type`, `enum`, `oneOf`, `allOf`, `items`,
//! `properties`, `required`, ...). The schema is derived purely from how
//! the codec was built; it never looks at input data.
//!
//! Schemas built by composing codecs tend to be noisy (`nullable(optional(x))`
//! nests `oneOf` inside `oneOf`), so combinators run the result through
//! [`optimize_schema`] before handing it out.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// SchemaType
// ---------------------------------------------------------------------------

/// The JSON-Schema `type` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Boolean,
    Null,
    Array,
    Object,
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// The `items` keyword: one schema for every element, or one per position.
///
/// `#[serde(untagged)]` writes the inner value directly, so `Tuple` is a
/// JSON array and `Single` is a JSON object. `Tuple` is listed first so a
/// JSON array never gets mistaken for a struct during deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Items {
    Tuple(Vec<Schema>),
    Single(Box<Schema>),
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// A JSON-Schema node.
///
/// Every keyword is optional; `Schema::default()` is `{}`, the schema that
/// accepts anything. Absent keywords are skipped on serialization, so the
/// JSON output only contains what the codec actually constrains.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// A note for readers of the schema, used where no static schema exists.
    #[serde(rename = "$comment", skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<Schema>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_of: Option<Vec<Schema>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Items>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Schema>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<Schema>>,
}

impl Schema {
    /// `{}`: accepts anything.
    pub fn any() -> Self {
        Self::default()
    }

    /// `{"type": ...}`
    pub fn of_type(schema_type: SchemaType) -> Self {
        Self {
            schema_type: Some(schema_type),
            ..Self::default()
        }
    }

    /// `{"$comment": ...}`
    pub fn comment(text: impl Into<String>) -> Self {
        Self {
            comment: Some(text.into()),
            ..Self::default()
        }
    }

    /// `{"oneOf": [...]}`
    pub fn one_of(alternatives: Vec<Schema>) -> Self {
        Self {
            one_of: Some(alternatives),
            ..Self::default()
        }
    }

    /// `{"allOf": [...]}`
    pub fn all_of(parts: Vec<Schema>) -> Self {
        Self {
            all_of: Some(parts),
            ..Self::default()
        }
    }

    /// `{"enum": [...]}`
    pub fn enumeration(values: Vec<Value>) -> Self {
        Self {
            enum_values: Some(values),
            ..Self::default()
        }
    }

    /// `{"type": "array", "items": item}`
    pub fn array(item: Schema) -> Self {
        Self {
            schema_type: Some(SchemaType::Array),
            items: Some(Items::Single(Box::new(item))),
            ..Self::default()
        }
    }

    /// A fixed-length array with one schema per position.
    pub fn tuple(items: Vec<Schema>) -> Self {
        let len = items.len();
        Self {
            schema_type: Some(SchemaType::Array),
            items: Some(Items::Tuple(items)),
            min_items: Some(len),
            max_items: Some(len),
            ..Self::default()
        }
    }

    /// `{"type": "object", "properties": ..., "required": [...]}`
    pub fn object(properties: BTreeMap<String, Schema>, required: Vec<String>) -> Self {
        Self {
            schema_type: Some(SchemaType::Object),
            properties: Some(properties),
            required: Some(required),
            ..Self::default()
        }
    }

    /// An object whose every property value matches `value`.
    pub fn dictionary(value: Schema) -> Self {
        Self {
            schema_type: Some(SchemaType::Object),
            additional_properties: Some(Box::new(value)),
            ..Self::default()
        }
    }

    /// Returns `true` if `oneOf` is the only keyword present.
    pub fn is_only_one_of(&self) -> bool {
        // Exhaustive destructuring: a new keyword must be added here too.
        let Self {
            comment,
            schema_type,
            format,
            enum_values,
            one_of,
            all_of,
            items,
            min_items,
            max_items,
            properties,
            required,
            additional_properties,
        } = self;
        one_of.is_some()
            && comment.is_none()
            && schema_type.is_none()
            && format.is_none()
            && enum_values.is_none()
            && all_of.is_none()
            && items.is_none()
            && min_items.is_none()
            && max_items.is_none()
            && properties.is_none()
            && required.is_none()
            && additional_properties.is_none()
    }

    /// Serializes the schema to a JSON value.
    pub fn to_value(&self) -> Value {
        // Every key is a `String` and every leaf is JSON already, so
        // serialization cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

// ---------------------------------------------------------------------------
// Optimizer
// ---------------------------------------------------------------------------

/// Rewrites a schema into its simplest equivalent form.
///
/// Children are optimized first, then on each node:
///
/// 1. [`flatten_nested_one_of`]: `oneOf: [a, {oneOf: [b, c]}]` becomes
///    `oneOf: [a, b, c]`.
/// 2. [`remove_one_of_with_single_element`]: `{oneOf: [a]}` becomes `a`.
///
/// Only nodes whose sole keyword is `oneOf` are spliced or collapsed. A
/// nested `oneOf` node that also carries a `$comment`, a `type` or any
/// other keyword is kept as it is, so none of its constraints are lost.
///
/// Flattening runs first because collapsing depends on the final arity.
/// The result is a fixed point: `optimize_schema(optimize_schema(s))`
/// equals `optimize_schema(s)`.
pub fn optimize_schema(schema: Schema) -> Schema {
    let schema = optimize_children(schema);
    remove_one_of_with_single_element(flatten_nested_one_of(schema))
}

/// Splices every `oneOf`-only alternative into the parent `oneOf`.
///
/// An alternative that carries other keywords next to its `oneOf` is left
/// alone; splicing it would drop those constraints.
pub fn flatten_nested_one_of(mut schema: Schema) -> Schema {
    if let Some(alternatives) = schema.one_of.take() {
        schema.one_of = Some(flatten_alternatives(alternatives));
    }
    schema
}

/// Replaces `{oneOf: [single]}` with `single`.
pub fn remove_one_of_with_single_element(mut schema: Schema) -> Schema {
    if schema.is_only_one_of() {
        if let Some(alternatives) = schema.one_of.as_mut() {
            if alternatives.len() == 1 {
                if let Some(only) = alternatives.pop() {
                    return only;
                }
            }
        }
    }
    schema
}

fn flatten_alternatives(alternatives: Vec<Schema>) -> Vec<Schema> {
    let mut flat = Vec::with_capacity(alternatives.len());
    for alternative in alternatives {
        if alternative.is_only_one_of() {
            // The spliced list may itself contain `oneOf`-only nodes.
            flat.extend(flatten_alternatives(alternative.one_of.unwrap_or_default()));
        } else {
            flat.push(alternative);
        }
    }
    flat
}

fn optimize_children(mut schema: Schema) -> Schema {
    schema.one_of = schema.one_of.map(optimize_all);
    schema.all_of = schema.all_of.map(optimize_all);
    schema.items = schema.items.map(|items| match items {
        Items::Single(item) => Items::Single(Box::new(optimize_schema(*item))),
        Items::Tuple(items) => Items::Tuple(optimize_all(items)),
    });
    schema.properties = schema.properties.map(|properties| {
        properties
            .into_iter()
            .map(|(key, value)| (key, optimize_schema(value)))
            .collect()
    });
    schema.additional_properties = schema
        .additional_properties
        .map(|value| Box::new(optimize_schema(*value)));
    schema
}

fn optimize_all(schemas: Vec<Schema>) -> Vec<Schema> {
    schemas.into_iter().map(optimize_schema).collect()
}
