//! Codecs for the ADTs the rest of the stack passes around: [`Option`]
//! as Maybe, [`NonEmptyList`], and (with the `date` feature) UTC
//! timestamps.

use serde_json::Value;
use verity_adt::NonEmptyList;

use crate::codec::Codec;
use crate::combinator::array;
use crate::schema::{optimize_schema, Schema, SchemaType};

/// Maybe: `null` and a missing property both decode to `None`.
///
/// Unlike [`nullable`](crate::nullable), the property may be left out of
/// an interface, and `None` encodes to "absent" rather than `null`.
/// A present value that fails `codec` reports the inner error unchanged.
pub fn maybe<T: 'static>(codec: Codec<T>) -> Codec<Option<T>> {
    let (decoder, encoder) = (codec.clone(), codec.clone());
    Codec::from_parts(
        move |input| match input {
            None | Some(Value::Null) => Ok(None),
            Some(_) => decoder.decode_field(input).map(Some),
        },
        move |value: &Option<T>| value.as_ref().and_then(|inner| encoder.encode_field(inner)),
        move || {
            optimize_schema(Schema::one_of(vec![
                codec.schema(),
                Schema::of_type(SchemaType::Null),
            ]))
        },
    )
    .into_optional()
}

/// An array with at least one element.
///
/// ```rust
/// use verity_codec::{non_empty_list, number};
/// use serde_json::json;
///
/// let list = non_empty_list(number()).decode(&json!([3, 4])).unwrap();
/// assert_eq!(*list.head(), 3.0);
/// assert!(non_empty_list(number()).decode(&json!([])).is_err());
/// ```
pub fn non_empty_list<T: Clone + 'static>(codec: Codec<T>) -> Codec<NonEmptyList<T>> {
    let items = array(codec);
    let schema_source = items.clone();
    items
        .transform(
            |items| Ok(NonEmptyList::try_from(items)?),
            |list: &NonEmptyList<T>| list.to_vec(),
        )
        .with_schema(move || Schema {
            min_items: Some(1),
            ..schema_source.schema()
        })
}

#[cfg(feature = "date")]
pub use self::datetime::date;

#[cfg(feature = "date")]
mod datetime {
    use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
    use serde_json::Value;

    use crate::codec::Codec;
    use crate::error::CodecError;
    use crate::primitive::string;
    use crate::schema::{Schema, SchemaType};

    /// An ISO-8601 timestamp string, decoded to a UTC [`DateTime`].
    ///
    /// Accepts full RFC 3339 timestamps (any offset, converted to UTC) and
    /// bare `YYYY-MM-DD` dates (midnight UTC). Encodes with millisecond
    /// precision and a `Z` suffix, e.g. `2024-05-01T12:00:00.000Z`.
    pub fn date() -> Codec<DateTime<Utc>> {
        let text = string();
        Codec::from_parts(
            move |input| {
                let raw = text.decode_field(input).map_err(|err| CodecError::DateString {
                    inner: Box::new(err),
                })?;
                parse_date(&raw).ok_or(CodecError::InvalidDate)
            },
            |value: &DateTime<Utc>| {
                Some(Value::String(value.to_rfc3339_opts(SecondsFormat::Millis, true)))
            },
            || Schema {
                format: Some("date-time".to_owned()),
                ..Schema::of_type(SchemaType::String)
            },
        )
    }

    fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|day| day.and_hms_opt(0, 0, 0))
            .map(|midnight| midnight.and_utc())
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use chrono::TimeZone;
        use serde_json::json;

        #[test]
        fn test_date_round_trip() {
            let instant = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
            let encoded = date().encode(&instant);
            assert_eq!(encoded, json!("2024-05-01T12:30:00.000Z"));
            assert_eq!(date().decode(&encoded).unwrap(), instant);
        }

        #[test]
        fn test_date_converts_offsets_to_utc() {
            let decoded = date().decode(&json!("2024-05-01T14:30:00+02:00")).unwrap();
            assert_eq!(decoded, Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap());
        }

        #[test]
        fn test_date_accepts_bare_day() {
            let decoded = date().decode(&json!("2024-02-29")).unwrap();
            assert_eq!(decoded, Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap());
        }

        #[test]
        fn test_date_failures() {
            assert_eq!(
                date().decode(&json!(5)).unwrap_err().to_string(),
                "Problem with date string: Expected a string, but received a number with value 5"
            );
            assert_eq!(date().decode(&json!("yesterday")).unwrap_err(), CodecError::InvalidDate);
        }

        #[test]
        fn test_date_schema() {
            assert_eq!(
                date().schema().to_value(),
                json!({"type": "string", "format": "date-time"})
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;
    use crate::{number, string};
    use serde_json::json;

    #[test]
    fn test_maybe_absent_and_null_are_none() {
        let codec = maybe(number());
        assert!(codec.is_optional());
        assert_eq!(codec.decode_field(None).unwrap(), None);
        assert_eq!(codec.decode(&json!(null)).unwrap(), None);
        assert_eq!(codec.decode(&json!(5)).unwrap(), Some(5.0));
    }

    #[test]
    fn test_maybe_round_trip() {
        let codec = maybe(number());
        assert_eq!(codec.encode(&Some(5.0)), json!(5));
        assert_eq!(codec.decode(&codec.encode(&Some(5.0))).unwrap(), Some(5.0));
        assert_eq!(codec.encode_field(&None), None);
    }

    #[test]
    fn test_maybe_reports_inner_error() {
        assert_eq!(
            maybe(string()).decode(&json!(1)).unwrap_err(),
            CodecError::mismatch("a string", Some(&json!(1)))
        );
    }

    #[test]
    fn test_maybe_schema() {
        assert_eq!(
            maybe(string()).schema().to_value(),
            json!({"oneOf": [{"type": "string"}, {"type": "null"}]})
        );
    }

    #[test]
    fn test_non_empty_list_boundary() {
        let codec = non_empty_list(number());
        assert_eq!(
            codec.decode(&json!([])).unwrap_err().to_string(),
            "Expected an array with at least one element, but received an empty array"
        );
        let list = codec.decode(&json!([0])).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(codec.encode(&list), json!([0]));
    }

    #[test]
    fn test_non_empty_list_element_errors_keep_index() {
        assert_eq!(
            non_empty_list(number()).decode(&json!([1, "x"])).unwrap_err(),
            CodecError::index(1, CodecError::mismatch("a number", Some(&json!("x"))))
        );
    }

    #[test]
    fn test_non_empty_list_schema() {
        assert_eq!(
            non_empty_list(string()).schema().to_value(),
            json!({"type": "array", "items": {"type": "string"}, "minItems": 1})
        );
    }
}
