//! Integration tests for the facade crate: the prelude, text helpers,
//! and the unified error type working together.

use verity::prelude::*;
use verity::{decode_str, encode_string};

#[derive(Debug, Clone, PartialEq)]
struct Order {
    id: f64,
    items: NonEmptyList<String>,
    coupon: Option<String>,
}

fn order() -> Codec<Order> {
    Codec::interface(
        Properties::new()
            .property("id", number())
            .property("items", non_empty_list(string()))
            .property("coupon", optional(string())),
    )
    .transform(
        |record| {
            Ok(Order {
                id: record.field("id")?,
                items: record.field("items")?,
                coupon: record.optional_field("coupon")?,
            })
        },
        |order: &Order| {
            let record = Record::new()
                .with("id", order.id)
                .with("items", order.items.clone());
            match &order.coupon {
                Some(code) => record.with("coupon", Some(code.clone())),
                None => record,
            }
        },
    )
}

#[test]
fn test_decode_str_into_struct() {
    let decoded = decode_str(&order(), r#"{"id": 9, "items": ["tea"]}"#).unwrap();
    assert_eq!(
        decoded,
        Order {
            id: 9.0,
            items: NonEmptyList::new("tea".to_string()),
            coupon: None,
        }
    );
}

#[test]
fn test_encode_string_round_trip() {
    let value = Order {
        id: 1.0,
        items: NonEmptyList::from_parts("a".to_string(), vec!["b".to_string()]),
        coupon: Some("SPRING".into()),
    };
    let text = encode_string(&order(), &value);
    assert_eq!(decode_str(&order(), &text).unwrap(), value);
}

#[test]
fn test_shape_error_is_codec_variant() {
    let err = decode_str(&order(), r#"{"id": 9, "items": []}"#).unwrap_err();
    assert!(matches!(err, VerityError::Codec(CodecError::Property { .. })));
    assert_eq!(
        err.to_string(),
        "Problem with the value of property \"items\": \
         Expected an array with at least one element, but received an empty array"
    );
    assert_eq!(parse_error(&err.to_string()), err.to_decode_error());
}

#[test]
fn test_syntax_error_is_json_variant() {
    let err = decode_str(&order(), "{\"id\": ").unwrap_err();
    assert!(matches!(err, VerityError::Json(_)));
}

#[test]
fn test_schema_through_prelude() {
    let schema = order().schema().to_value();
    assert_eq!(schema["required"], serde_json::json!(["id", "items"]));
    assert_eq!(schema["properties"]["items"]["minItems"], serde_json::json!(1));
}
