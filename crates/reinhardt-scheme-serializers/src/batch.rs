//! Batch entry points
//!
//! [`serialize_many`] builds one serializer and one [`EngineCache`] for a
//! whole collection. [`serialize`] infers the model from the records and
//! accepts either one record or a collection.

use crate::engine::{EngineCache, JsonMap, ModelSerializer};
use crate::error::Result;
use crate::options::Options;
use crate::registry::SchemeRegistry;
use crate::scheme::SchemeRef;
use reinhardt_records::{ModelMeta, Record};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::debug;

/// Serialize a homogeneous collection of `model` records
///
/// Exactly one serializer and one cache are built and reused for every item.
/// The first failing record aborts the whole batch.
///
/// # Examples
///
/// ```
/// use reinhardt_records::{DynamicRecord, FieldDescriptor, FieldType, ModelMeta};
/// use reinhardt_scheme_serializers::{Options, SchemeRef, SchemeRegistry, serialize_many};
///
/// let tag = ModelMeta::new("Tag")
///     .with_field(FieldDescriptor::new("label", FieldType::String))
///     .into_shared();
/// let registry = SchemeRegistry::new().into_shared();
/// let tags = vec![
///     DynamicRecord::new(tag.clone()).with("label", "rust"),
///     DynamicRecord::new(tag.clone()).with("label", "serde"),
/// ];
///
/// let output =
///     serialize_many(&registry, &tags, &tag, SchemeRef::Unspecified, Options::default()).unwrap();
/// assert_eq!(output.len(), 2);
/// assert_eq!(output[1]["label"], "serde");
/// ```
pub fn serialize_many<R: Record>(
	registry: &Arc<SchemeRegistry>,
	records: &[R],
	model: &Arc<ModelMeta>,
	scheme: impl Into<SchemeRef>,
	options: Options,
) -> Result<Vec<JsonMap>> {
	let serializer = ModelSerializer::new(registry.clone(), model.clone(), scheme, options)?;
	let mut cache = EngineCache::new();

	debug!(
		model = model.name(),
		count = records.len(),
		"Serializing batch"
	);

	records
		.iter()
		.map(|record| serializer.serialize(record, Some(&mut cache)))
		.collect()
}

/// One record or a collection of records
#[derive(Debug, Clone, Copy)]
pub enum SerializeInput<'a, R> {
	One(&'a R),
	Many(&'a [R]),
}

impl<'a, R> From<&'a R> for SerializeInput<'a, R> {
	fn from(record: &'a R) -> Self {
		SerializeInput::One(record)
	}
}

impl<'a, R> From<&'a [R]> for SerializeInput<'a, R> {
	fn from(records: &'a [R]) -> Self {
		SerializeInput::Many(records)
	}
}

/// Serialize one record or a collection, inferring the model from the records
///
/// A single record yields a JSON object and a collection a JSON array. An
/// empty collection yields an empty array without building any serializer.
pub fn serialize<R: Record>(
	registry: &Arc<SchemeRegistry>,
	input: SerializeInput<'_, R>,
	scheme: impl Into<SchemeRef>,
) -> Result<JsonValue> {
	match input {
		SerializeInput::One(record) => {
			let serializer = ModelSerializer::new(
				registry.clone(),
				record.model().clone(),
				scheme,
				Options::default(),
			)?;
			let mut cache = EngineCache::new();
			serializer
				.serialize(record, Some(&mut cache))
				.map(JsonValue::Object)
		}
		SerializeInput::Many(records) => {
			let Some(first) = records.first() else {
				return Ok(JsonValue::Array(Vec::new()));
			};
			let model = first.model().clone();
			let outputs = serialize_many(registry, records, &model, scheme, Options::default())?;
			Ok(JsonValue::Array(
				outputs.into_iter().map(JsonValue::Object).collect(),
			))
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::scheme::Scheme;
	use reinhardt_records::{DynamicRecord, FieldDescriptor, FieldType};
	use rstest::{fixture, rstest};
	use serde_json::json;

	#[fixture]
	fn tag() -> Arc<ModelMeta> {
		ModelMeta::new("Tag")
			.with_field(FieldDescriptor::new("id", FieldType::Integer).primary_key())
			.with_field(FieldDescriptor::new("label", FieldType::String))
			.into_shared()
	}

	#[rstest]
	fn test_empty_collection_builds_nothing() {
		// The scheme is invalid, so building a serializer would fail
		let registry = SchemeRegistry::new().into_shared();
		let records: Vec<DynamicRecord> = Vec::new();

		let output = serialize(
			&registry,
			SerializeInput::Many(&records),
			SchemeRef::Json(json!(5)),
		)
		.unwrap();
		assert_eq!(output, json!([]));
	}

	#[rstest]
	fn test_single_record_yields_object(tag: Arc<ModelMeta>) {
		let registry = SchemeRegistry::new().into_shared();
		let record = DynamicRecord::new(tag).with("id", 1).with("label", "rust");

		let output = serialize(
			&registry,
			SerializeInput::One(&record),
			Scheme::new().with_exclude(["@pk"]),
		)
		.unwrap();
		assert_eq!(output, json!({ "label": "rust" }));
	}

	#[rstest]
	fn test_collection_yields_array_in_order(tag: Arc<ModelMeta>) {
		let registry = SchemeRegistry::new().into_shared();
		let records: Vec<Arc<DynamicRecord>> = (1..=3)
			.map(|id| DynamicRecord::new(tag.clone()).with("id", id).into_shared())
			.collect();

		let output = serialize(&registry, SerializeInput::Many(&records), "missing").unwrap();
		assert_eq!(output, json!([{ "id": 1 }, { "id": 2 }, { "id": 3 }]));
	}

	#[rstest]
	fn test_heterogeneous_batch_fails(tag: Arc<ModelMeta>) {
		let registry = SchemeRegistry::new().into_shared();
		let other = ModelMeta::new("Other").into_shared();
		let records: Vec<Arc<dyn Record>> = vec![
			DynamicRecord::new(tag.clone()).with("id", 1).into_shared(),
			DynamicRecord::new(other).into_shared(),
		];

		let err = serialize_many(&registry, &records, &tag, SchemeRef::Unspecified, Options::default())
			.unwrap_err();
		assert!(err.is_type_mismatch());
	}
}
