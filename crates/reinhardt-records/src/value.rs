//! Runtime values read from records
//!
//! [`Value`] is a closed tree: every value a record can hand out is one of
//! its variants, and [`ValueKind::of`] decides which encoding rule applies.

use crate::record::Record;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// A zero-argument method exposed by a record
///
/// A method returning `None` leaves its attribute undefined, so the
/// serializer's undefined policy applies to it.
///
/// # Examples
///
/// ```
/// use reinhardt_records::{Method, Value};
///
/// let method = Method::new(|| Value::from("http://x"));
/// assert!(matches!(method.call(), Some(Value::String(url)) if url == "http://x"));
///
/// let missing = Method::new(|| None::<Value>);
/// assert!(missing.call().is_none());
/// ```
#[derive(Clone)]
pub struct Method(Arc<dyn Fn() -> Option<Value> + Send + Sync>);

impl Method {
	pub fn new<F, R>(f: F) -> Self
	where
		F: Fn() -> R + Send + Sync + 'static,
		R: Into<Option<Value>>,
	{
		Self(Arc::new(move || f().into()))
	}

	pub fn call(&self) -> Option<Value> {
		(self.0)()
	}
}

impl fmt::Debug for Method {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("Method(..)")
	}
}

/// Fixed-size numeric sequences
#[derive(Debug, Clone, PartialEq)]
pub enum TypedArray {
	I8(Vec<i8>),
	U8(Vec<u8>),
	I16(Vec<i16>),
	U16(Vec<u16>),
	I32(Vec<i32>),
	U32(Vec<u32>),
	I64(Vec<i64>),
	U64(Vec<u64>),
	F32(Vec<f32>),
	F64(Vec<f64>),
}

impl TypedArray {
	pub fn len(&self) -> usize {
		match self {
			TypedArray::I8(v) => v.len(),
			TypedArray::U8(v) => v.len(),
			TypedArray::I16(v) => v.len(),
			TypedArray::U16(v) => v.len(),
			TypedArray::I32(v) => v.len(),
			TypedArray::U32(v) => v.len(),
			TypedArray::I64(v) => v.len(),
			TypedArray::U64(v) => v.len(),
			TypedArray::F32(v) => v.len(),
			TypedArray::F64(v) => v.len(),
		}
	}

	/// Elements as plain scalar values
	///
	/// `u64` elements above `i64::MAX` become floats.
	pub fn elements(&self) -> Vec<Value> {
		fn ints<T: Copy + Into<i64>>(items: &[T]) -> Vec<Value> {
			items.iter().map(|&x| Value::Int(x.into())).collect()
		}

		match self {
			TypedArray::I8(v) => ints(v),
			TypedArray::U8(v) => ints(v),
			TypedArray::I16(v) => ints(v),
			TypedArray::U16(v) => ints(v),
			TypedArray::I32(v) => ints(v),
			TypedArray::U32(v) => ints(v),
			TypedArray::I64(v) => ints(v),
			TypedArray::U64(v) => v
				.iter()
				.map(|&x| i64::try_from(x).map_or(Value::Float(x as f64), Value::Int))
				.collect(),
			TypedArray::F32(v) => v.iter().map(|&x| Value::Float(f64::from(x))).collect(),
			TypedArray::F64(v) => v.iter().map(|&x| Value::Float(x)).collect(),
		}
	}
}

/// A value read from a record
#[derive(Clone)]
pub enum Value {
	Null,
	Bool(bool),
	Int(i64),
	Float(f64),
	String(String),
	Array(Vec<Value>),
	TypedArray(TypedArray),
	/// Binary payload
	Bytes(Vec<u8>),
	DateTime(DateTime<FixedOffset>),
	Date(NaiveDate),
	/// Generic structured value with its own properties
	Object(IndexMap<String, Value>),
	/// Value that is already a JSON document
	Document(serde_json::Value),
	/// Associated record
	Record(Arc<dyn Record>),
	Function(Method),
	/// Runtime type that has no JSON representation, identified by name
	Opaque(String),
}

impl Value {
	pub fn record<R: Record + 'static>(record: Arc<R>) -> Self {
		Value::Record(record)
	}

	pub fn method<F, R>(f: F) -> Self
	where
		F: Fn() -> R + Send + Sync + 'static,
		R: Into<Option<Value>>,
	{
		Value::Function(Method::new(f))
	}

	/// Call the value if it is a method, otherwise return it unchanged
	///
	/// `None` means the method left the value undefined.
	pub fn invoked(self) -> Option<Self> {
		match self {
			Value::Function(method) => method.call(),
			other => Some(other),
		}
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	pub fn as_record(&self) -> Option<&Arc<dyn Record>> {
		match self {
			Value::Record(record) => Some(record),
			_ => None,
		}
	}

	/// Runtime type name used in error messages
	pub fn type_name(&self) -> &str {
		match self {
			Value::Null => "null",
			Value::Bool(_) => "bool",
			Value::Int(_) => "int",
			Value::Float(_) => "float",
			Value::String(_) => "string",
			Value::Array(_) => "array",
			Value::TypedArray(_) => "typed_array",
			Value::Bytes(_) => "bytes",
			Value::DateTime(_) => "datetime",
			Value::Date(_) => "date",
			Value::Object(_) => "object",
			Value::Document(_) => "document",
			Value::Record(_) => "record",
			Value::Function(_) => "function",
			Value::Opaque(name) => name,
		}
	}
}

impl fmt::Debug for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::Null => f.write_str("Null"),
			Value::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
			Value::Int(v) => f.debug_tuple("Int").field(v).finish(),
			Value::Float(v) => f.debug_tuple("Float").field(v).finish(),
			Value::String(v) => f.debug_tuple("String").field(v).finish(),
			Value::Array(v) => f.debug_tuple("Array").field(v).finish(),
			Value::TypedArray(v) => f.debug_tuple("TypedArray").field(v).finish(),
			Value::Bytes(v) => f.debug_tuple("Bytes").field(v).finish(),
			Value::DateTime(v) => f.debug_tuple("DateTime").field(v).finish(),
			Value::Date(v) => f.debug_tuple("Date").field(v).finish(),
			Value::Object(v) => f.debug_tuple("Object").field(v).finish(),
			Value::Document(v) => f.debug_tuple("Document").field(v).finish(),
			// Records may reference each other, so only the model is printed
			Value::Record(record) => write!(f, "Record({})", record.model().name()),
			Value::Function(method) => fmt::Debug::fmt(method, f),
			Value::Opaque(name) => f.debug_tuple("Opaque").field(name).finish(),
		}
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Value::Bool(value)
	}
}

impl From<i32> for Value {
	fn from(value: i32) -> Self {
		Value::Int(i64::from(value))
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Value::Int(value)
	}
}

impl From<u32> for Value {
	fn from(value: u32) -> Self {
		Value::Int(i64::from(value))
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Value::Float(value)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Value::String(value.to_string())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Value::String(value)
	}
}

impl From<Vec<u8>> for Value {
	fn from(value: Vec<u8>) -> Self {
		Value::Bytes(value)
	}
}

impl From<Vec<Value>> for Value {
	fn from(value: Vec<Value>) -> Self {
		Value::Array(value)
	}
}

impl From<TypedArray> for Value {
	fn from(value: TypedArray) -> Self {
		Value::TypedArray(value)
	}
}

impl From<DateTime<FixedOffset>> for Value {
	fn from(value: DateTime<FixedOffset>) -> Self {
		Value::DateTime(value)
	}
}

impl From<DateTime<Utc>> for Value {
	fn from(value: DateTime<Utc>) -> Self {
		Value::DateTime(value.fixed_offset())
	}
}

impl From<NaiveDate> for Value {
	fn from(value: NaiveDate) -> Self {
		Value::Date(value)
	}
}

impl From<IndexMap<String, Value>> for Value {
	fn from(value: IndexMap<String, Value>) -> Self {
		Value::Object(value)
	}
}

impl From<serde_json::Value> for Value {
	fn from(value: serde_json::Value) -> Self {
		Value::Document(value)
	}
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(value: Option<T>) -> Self {
		value.map_or(Value::Null, Into::into)
	}
}

/// Encoding-relevant classification of a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
	Scalar,
	Null,
	Array,
	DateTime,
	Binary,
	RecordInstance,
	GenericObject,
	Unsupported,
}

type KindPredicate = fn(&Value) -> bool;

fn is_null(value: &Value) -> bool {
	matches!(value, Value::Null)
}

fn is_scalar(value: &Value) -> bool {
	matches!(
		value,
		Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::String(_)
	)
}

fn is_array(value: &Value) -> bool {
	matches!(value, Value::Array(_) | Value::TypedArray(_))
}

fn is_datetime(value: &Value) -> bool {
	matches!(value, Value::DateTime(_) | Value::Date(_))
}

fn is_binary(value: &Value) -> bool {
	matches!(value, Value::Bytes(_))
}

fn is_record(value: &Value) -> bool {
	matches!(value, Value::Record(_))
}

fn is_object(value: &Value) -> bool {
	matches!(value, Value::Object(_) | Value::Document(_))
}

/// Classification rules, checked in order; the first match wins
const KIND_RULES: &[(ValueKind, KindPredicate)] = &[
	(ValueKind::Null, is_null),
	(ValueKind::Scalar, is_scalar),
	(ValueKind::Array, is_array),
	(ValueKind::DateTime, is_datetime),
	(ValueKind::Binary, is_binary),
	(ValueKind::RecordInstance, is_record),
	(ValueKind::GenericObject, is_object),
];

impl ValueKind {
	/// Classify a value
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_records::{Value, ValueKind};
	///
	/// assert_eq!(ValueKind::of(&Value::from(1)), ValueKind::Scalar);
	/// assert_eq!(ValueKind::of(&Value::Bytes(vec![0, 1])), ValueKind::Binary);
	/// assert_eq!(ValueKind::of(&Value::Opaque("Symbol".into())), ValueKind::Unsupported);
	/// ```
	pub fn of(value: &Value) -> Self {
		KIND_RULES
			.iter()
			.find(|(_, matches)| matches(value))
			.map_or(ValueKind::Unsupported, |(kind, _)| *kind)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;
	use rstest::rstest;

	#[rstest]
	#[case(Value::Null, ValueKind::Null)]
	#[case(Value::from("text"), ValueKind::Scalar)]
	#[case(Value::from(1.5), ValueKind::Scalar)]
	#[case(Value::Array(vec![]), ValueKind::Array)]
	#[case(Value::TypedArray(TypedArray::F32(vec![1.0])), ValueKind::Array)]
	#[case(Value::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()), ValueKind::DateTime)]
	#[case(Value::Bytes(vec![1]), ValueKind::Binary)]
	#[case(Value::Object(IndexMap::new()), ValueKind::GenericObject)]
	#[case(Value::Document(serde_json::json!({"a": 1})), ValueKind::GenericObject)]
	#[case(Value::method(|| Value::Null), ValueKind::Unsupported)]
	#[case(Value::Opaque("Symbol".to_string()), ValueKind::Unsupported)]
	fn test_value_kind(#[case] value: Value, #[case] expected: ValueKind) {
		assert_eq!(ValueKind::of(&value), expected);
	}

	#[rstest]
	fn test_typed_array_elements() {
		let array = TypedArray::U64(vec![1, u64::MAX]);
		let elements = array.elements();

		assert_eq!(array.len(), 2);
		assert!(matches!(elements[0], Value::Int(1)));
		assert!(matches!(elements[1], Value::Float(_)));
	}

	#[rstest]
	fn test_invoked_calls_methods_only() {
		let called = Value::method(|| Value::from(7)).invoked();
		let plain = Value::from("x").invoked();

		assert!(matches!(called, Some(Value::Int(7))));
		assert!(matches!(plain, Some(Value::String(s)) if s == "x"));
	}

	#[rstest]
	fn test_method_may_leave_value_undefined() {
		let undefined = Value::method(|| None::<Value>).invoked();
		let null = Value::method(|| Value::Null).invoked();

		assert!(undefined.is_none());
		assert!(matches!(null, Some(Value::Null)));
	}

	#[rstest]
	fn test_from_option_and_utc() {
		assert!(Value::from(None::<i64>).is_null());

		let utc = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
		assert!(matches!(Value::from(utc), Value::DateTime(dt) if dt == utc));
	}
}
