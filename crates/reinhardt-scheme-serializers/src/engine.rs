//! Model serializer engine
//!
//! A [`ModelSerializer`] holds the compiled plan for one (model, scheme)
//! pair: the resolved scheme, the compiled attribute list and the merged
//! options. Building it is the expensive step; serializing a record with it
//! only walks the compiled list.
//!
//! Associated records are serialized by child serializers, one per
//! association path. An [`EngineCache`] keeps those children alive across
//! the records of one run so every path is compiled only once.

use crate::classify::AttributeGroups;
use crate::compile::{Attribute, AttributeSource, PROPERTY_MARKER, compile_attributes};
use crate::context::SerializationContext;
use crate::error::{Result, SerializeError};
use crate::options::{Options, ResolvedOptions, UndefinedPolicy};
use crate::registry::{ModelConfig, SchemeRegistry};
use crate::resolve::{ResolvedScheme, resolve_options, resolve_scheme};
use crate::scheme::SchemeRef;
use reinhardt_records::{ModelMeta, Record, Value};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Serialized record
pub type JsonMap = serde_json::Map<String, JsonValue>;

/// Child serializers keyed by association path
///
/// A cache belongs to one logical run (a single call or one batch) and is
/// discarded afterwards. It must not be shared between independent runs.
#[derive(Debug, Default)]
pub struct EngineCache {
	engines: HashMap<String, Arc<ModelSerializer>>,
}

impl EngineCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, path: &str) -> Option<&Arc<ModelSerializer>> {
		self.engines.get(path)
	}

	pub fn insert(&mut self, path: impl Into<String>, engine: Arc<ModelSerializer>) {
		self.engines.insert(path.into(), engine);
	}

	pub fn contains(&self, path: &str) -> bool {
		self.engines.contains_key(path)
	}

	pub fn len(&self) -> usize {
		self.engines.len()
	}

	pub fn is_empty(&self) -> bool {
		self.engines.is_empty()
	}
}

/// Serializer for one (model, scheme) pair
///
/// Immutable after construction.
///
/// # Examples
///
/// ```
/// use reinhardt_records::{DynamicRecord, FieldDescriptor, FieldType, ModelMeta};
/// use reinhardt_scheme_serializers::{ModelSerializer, Options, Scheme, SchemeRegistry};
/// use serde_json::json;
///
/// let post = ModelMeta::new("Post")
///     .with_field(FieldDescriptor::new("id", FieldType::Integer).primary_key())
///     .with_field(FieldDescriptor::new("title", FieldType::String))
///     .into_shared();
/// let registry = SchemeRegistry::new().into_shared();
///
/// let serializer = ModelSerializer::new(
///     registry,
///     post.clone(),
///     Scheme::new().with_exclude(["@pk"]),
///     Options::default(),
/// )
/// .unwrap();
///
/// let record = DynamicRecord::new(post).with("id", 1).with("title", "Hello");
/// let output = serializer.serialize(&record, None).unwrap();
///
/// assert_eq!(serde_json::Value::Object(output), json!({ "title": "Hello" }));
/// ```
#[derive(Debug)]
pub struct ModelSerializer {
	registry: Arc<SchemeRegistry>,
	model: Arc<ModelMeta>,
	config: Arc<ModelConfig>,
	scheme: ResolvedScheme,
	groups: AttributeGroups,
	attributes: Vec<Attribute>,
	options: ResolvedOptions,
	/// Options as passed by the caller, handed down to child serializers
	constructor_options: Options,
	path: String,
}

impl ModelSerializer {
	/// Build a serializer for `model`
	///
	/// # Errors
	///
	/// Returns [`SerializeError::Configuration`] if the model definition is
	/// invalid, the scheme does not resolve to an object or an option value is
	/// invalid.
	pub fn new(
		registry: Arc<SchemeRegistry>,
		model: Arc<ModelMeta>,
		scheme: impl Into<SchemeRef>,
		options: Options,
	) -> Result<Self> {
		Self::build(registry, model, &scheme.into(), options, String::new())
	}

	fn build(
		registry: Arc<SchemeRegistry>,
		model: Arc<ModelMeta>,
		reference: &SchemeRef,
		options: Options,
		path: String,
	) -> Result<Self> {
		model.validate().map_err(|e| {
			SerializeError::configuration(format!("invalid model '{}': {}", model.name(), e))
		})?;

		let config = registry
			.config(model.name())
			.cloned()
			.unwrap_or_default();
		let scheme = resolve_scheme(&model, &config, reference)?;
		let resolved_options = resolve_options(&options, scheme.scheme(), &config)?;

		let groups = AttributeGroups::classify(&model, resolved_options.attr_filter.as_ref());
		let attributes = compile_attributes(scheme.scheme(), &groups);

		debug!(
			model = model.name(),
			scheme = scheme.name().unwrap_or("<inline>"),
			path = %path,
			attributes = attributes.len(),
			"Built model serializer"
		);

		Ok(Self {
			registry,
			model,
			config,
			scheme,
			groups,
			attributes,
			options: resolved_options,
			constructor_options: options,
			path,
		})
	}

	pub fn model(&self) -> &Arc<ModelMeta> {
		&self.model
	}

	pub fn scheme(&self) -> &ResolvedScheme {
		&self.scheme
	}

	/// Compiled attribute list, in output order
	pub fn attributes(&self) -> &[Attribute] {
		&self.attributes
	}

	pub fn options(&self) -> &ResolvedOptions {
		&self.options
	}

	/// Association path from the serialization root; empty at the root
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Serialize one record
	///
	/// Pass a cache to reuse child serializers across calls of one run.
	///
	/// # Errors
	///
	/// - [`SerializeError::TypeMismatch`] if the record is not an instance of
	///   this serializer's model
	/// - [`SerializeError::UndefinedAttribute`] for an undefined attribute
	///   under the `FAIL` policy
	/// - [`SerializeError::Encoding`] if the encoder rejects a value
	/// - [`SerializeError::CircularReference`] if a record contains itself
	///   through its associations
	/// - [`SerializeError::MaxDepthExceeded`] past the configured depth
	pub fn serialize(&self, record: &dyn Record, cache: Option<&mut EngineCache>) -> Result<JsonMap> {
		let mut context = SerializationContext::new(self.options.max_depth);
		self.serialize_with(record, cache, &mut context)
	}

	fn serialize_with(
		&self,
		record: &dyn Record,
		mut cache: Option<&mut EngineCache>,
		context: &mut SerializationContext,
	) -> Result<JsonMap> {
		if !record.is_instance_of(&self.model) {
			return Err(SerializeError::type_mismatch(
				self.model.name(),
				record.model().name(),
			));
		}

		context.visit_with(record, &self.path, |context| {
			let mut output = JsonMap::with_capacity(self.attributes.len());

			for attribute in &self.attributes {
				let key = self.output_key(attribute);

				let raw = match attribute.source {
					AttributeSource::Field => record.get(&attribute.name),
					AttributeSource::Property => {
						record.property(&attribute.name).and_then(Value::invoked)
					}
				};

				let value = match raw {
					Some(value) => {
						self.serialize_value(&attribute.name, value, cache.as_deref_mut(), context)?
					}
					None => match self.options.undefined_policy {
						UndefinedPolicy::Skip => continue,
						UndefinedPolicy::SetNull => JsonValue::Null,
						UndefinedPolicy::Fail => {
							return Err(SerializeError::undefined_attribute(
								self.model.name(),
								&attribute.name,
							));
						}
					},
				};

				output.insert(key.clone(), value);
			}

			Ok(self.run_hooks(output, record))
		})
	}

	/// Output key of `attribute`
	///
	/// Property attributes may be renamed by their plain name or by the
	/// `.name` selector they were written with.
	fn output_key<'a>(&'a self, attribute: &'a Attribute) -> &'a String {
		let rename = &self.scheme.scheme().rename;
		rename
			.get(&attribute.name)
			.or_else(|| match attribute.source {
				AttributeSource::Property => {
					rename.get(&format!("{}{}", PROPERTY_MARKER, attribute.name))
				}
				AttributeSource::Field => None,
			})
			.unwrap_or(&attribute.name)
	}

	fn serialize_value(
		&self,
		name: &str,
		value: Value,
		mut cache: Option<&mut EngineCache>,
		context: &mut SerializationContext,
	) -> Result<JsonValue> {
		match value {
			Value::Document(document)
				if self.options.copy_json_fields && self.groups.is_document(name) =>
			{
				Ok(document)
			}
			Value::Array(items) => items
				.into_iter()
				.map(|item| self.serialize_value(name, item, cache.as_deref_mut(), context))
				.collect::<Result<Vec<_>>>()
				.map(JsonValue::Array),
			Value::Record(child) => self
				.serialize_association(name, child.as_ref(), cache, context)
				.map(JsonValue::Object),
			Value::DateTime(dt) if self.simple_date(name) => {
				Ok(JsonValue::String(dt.date_naive().format("%Y-%m-%d").to_string()))
			}
			Value::Date(date) if self.simple_date(name) => {
				Ok(JsonValue::String(date.format("%Y-%m-%d").to_string()))
			}
			other => Ok((self.options.encoder)(&other, &self.options.encoder_options)?),
		}
	}

	fn simple_date(&self, name: &str) -> bool {
		self.options.simple_dates && self.groups.is_date_only(name)
	}

	fn serialize_association(
		&self,
		field: &str,
		child: &dyn Record,
		mut cache: Option<&mut EngineCache>,
		context: &mut SerializationContext,
	) -> Result<JsonMap> {
		let path = if self.path.is_empty() {
			field.to_string()
		} else {
			format!("{}.{}", self.path, field)
		};

		let engine = match cache.as_deref_mut() {
			Some(cache) => match cache.get(&path).cloned() {
				Some(engine) if engine.model.name() == child.model().name() => {
					trace!(path = %path, "Engine cache hit");
					engine
				}
				Some(_) => {
					trace!(
						path = %path,
						model = child.model().name(),
						"Cached engine belongs to another model, building an uncached one"
					);
					Arc::new(self.child_engine(field, child, path.clone())?)
				}
				None => {
					trace!(path = %path, "Engine cache miss");
					let engine = Arc::new(self.child_engine(field, child, path.clone())?);
					cache.insert(path.clone(), engine.clone());
					engine
				}
			},
			None => Arc::new(self.child_engine(field, child, path.clone())?),
		};

		context.descend_with(&path, |context| engine.serialize_with(child, cache, context))
	}

	/// Serializer for a record found under association `field`
	fn child_engine(&self, field: &str, child: &dyn Record, path: String) -> Result<Self> {
		let reference = self
			.scheme
			.scheme()
			.assoc
			.get(field)
			.cloned()
			.unwrap_or_default();

		Self::build(
			self.registry.clone(),
			child.model().clone(),
			&reference,
			self.constructor_options.clone(),
			path,
		)
	}

	/// Model-wide hook first, then the scheme's own hook
	fn run_hooks(&self, mut output: JsonMap, record: &dyn Record) -> JsonMap {
		if let Some(hook) = self.config.post_serialize() {
			output = hook(output, record, &self.scheme);
		}
		if let Some(hook) = &self.scheme.scheme().post_serialize {
			output = hook(output, record);
		}
		output
	}
}
