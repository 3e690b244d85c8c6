//! Default value encoder
//!
//! Turns one [`Value`] into JSON. Records are never handed to the encoder by
//! the serializer, which handles associations itself; meeting one here means
//! a record is hidden inside a generic object or array of a plain field.

use crate::error::EncodeError;
use crate::options::EncoderOptions;
use chrono::SecondsFormat;
use reinhardt_records::{Value, ValueKind};
use serde_json::{Map, Number, Value as JsonValue};

/// Encode a value with the built-in rules
///
/// - `null`, booleans, numbers and strings pass through; non-finite floats
///   become `null`
/// - arrays and typed arrays are encoded element-wise
/// - timestamps become UTC ISO-8601 strings with millisecond precision and
///   calendar dates become `YYYY-MM-DD`
/// - binary payloads use the configured blob encoding
/// - generic objects are encoded property-wise
/// - records, methods and unknown runtime types are rejected
///
/// # Examples
///
/// ```
/// use reinhardt_records::Value;
/// use reinhardt_scheme_serializers::{EncoderOptions, encode_value};
/// use serde_json::json;
///
/// let options = EncoderOptions::default();
/// let value = Value::Array(vec![Value::from(1), Value::Bytes(b"hi".to_vec())]);
///
/// assert_eq!(encode_value(&value, &options).unwrap(), json!([1, "aGk="]));
/// ```
pub fn encode_value(value: &Value, options: &EncoderOptions) -> Result<JsonValue, EncodeError> {
	match ValueKind::of(value) {
		ValueKind::Null => Ok(JsonValue::Null),
		ValueKind::Scalar => Ok(encode_scalar(value)),
		ValueKind::Array => encode_array(value, options),
		ValueKind::DateTime => Ok(encode_datetime(value)),
		ValueKind::Binary => match value {
			Value::Bytes(bytes) => Ok(JsonValue::String(options.blob_encoding.encode(bytes))),
			other => Err(EncodeError::unsupported(other.type_name())),
		},
		ValueKind::GenericObject => encode_object(value, options),
		ValueKind::RecordInstance | ValueKind::Unsupported => {
			Err(EncodeError::unsupported(value.type_name()))
		}
	}
}

fn encode_scalar(value: &Value) -> JsonValue {
	match value {
		Value::Bool(b) => JsonValue::Bool(*b),
		Value::Int(i) => JsonValue::Number((*i).into()),
		Value::Float(f) => Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
		Value::String(s) => JsonValue::String(s.clone()),
		_ => JsonValue::Null,
	}
}

fn encode_array(value: &Value, options: &EncoderOptions) -> Result<JsonValue, EncodeError> {
	let items = match value {
		Value::Array(items) => items
			.iter()
			.map(|item| encode_value(item, options))
			.collect::<Result<Vec<_>, _>>()?,
		Value::TypedArray(array) => array.elements().iter().map(encode_scalar).collect(),
		other => return Err(EncodeError::unsupported(other.type_name())),
	};
	Ok(JsonValue::Array(items))
}

fn encode_datetime(value: &Value) -> JsonValue {
	match value {
		Value::DateTime(dt) => JsonValue::String(
			dt.with_timezone(&chrono::Utc)
				.to_rfc3339_opts(SecondsFormat::Millis, true),
		),
		Value::Date(date) => JsonValue::String(date.format("%Y-%m-%d").to_string()),
		_ => JsonValue::Null,
	}
}

fn encode_object(value: &Value, options: &EncoderOptions) -> Result<JsonValue, EncodeError> {
	match value {
		Value::Object(properties) => {
			let mut map = Map::with_capacity(properties.len());
			for (key, item) in properties {
				map.insert(key.clone(), encode_value(item, options)?);
			}
			Ok(JsonValue::Object(map))
		}
		Value::Document(document) => Ok(document.clone()),
		other => Err(EncodeError::unsupported(other.type_name())),
	}
}
