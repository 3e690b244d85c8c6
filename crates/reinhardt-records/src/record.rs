//! Record access
//!
//! The serializers read records only through the [`Record`] trait: a field
//! accessor for model attributes and a property accessor for everything
//! else (computed values and zero-argument methods).

use crate::model::ModelMeta;
use crate::value::Value;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// A model instance as seen by the serializers
///
/// `None` from either accessor means the value is undefined, which is
/// distinct from a `Value::Null` that was actually stored.
pub trait Record: Send + Sync {
	/// Runtime model of this record
	fn model(&self) -> &Arc<ModelMeta>;

	/// Field accessor for model attributes and associations
	fn get(&self, field: &str) -> Option<Value>;

	/// Direct property access for names that are not model attributes
	///
	/// A `Value::Function` returned here is invoked with no arguments by the
	/// serializers. A method returning `None` counts as undefined.
	fn property(&self, _name: &str) -> Option<Value> {
		None
	}

	/// Whether this record is an instance of `model`
	fn is_instance_of(&self, model: &ModelMeta) -> bool {
		self.model().name() == model.name()
	}

	/// Address identifying this record instance for circular reference detection
	fn identity(&self) -> usize {
		self as *const Self as *const () as usize
	}
}

impl<T: Record + ?Sized> Record for Arc<T> {
	fn model(&self) -> &Arc<ModelMeta> {
		(**self).model()
	}

	fn get(&self, field: &str) -> Option<Value> {
		(**self).get(field)
	}

	fn property(&self, name: &str) -> Option<Value> {
		(**self).property(name)
	}

	fn is_instance_of(&self, model: &ModelMeta) -> bool {
		(**self).is_instance_of(model)
	}

	fn identity(&self) -> usize {
		(**self).identity()
	}
}

impl<T: Record + ?Sized> Record for &T {
	fn model(&self) -> &Arc<ModelMeta> {
		(**self).model()
	}

	fn get(&self, field: &str) -> Option<Value> {
		(**self).get(field)
	}

	fn property(&self, name: &str) -> Option<Value> {
		(**self).property(name)
	}

	fn is_instance_of(&self, model: &ModelMeta) -> bool {
		(**self).is_instance_of(model)
	}

	fn identity(&self) -> usize {
		(**self).identity()
	}
}

type Computed = Arc<dyn Fn(&DynamicRecord) -> Value + Send + Sync>;

#[derive(Clone)]
enum Property {
	Stored(Value),
	Computed(Computed),
}

/// In-memory record backed by ordered value maps
///
/// Field values can be assigned after the record is shared, which is how
/// mutually referencing records are built.
///
/// # Examples
///
/// ```
/// use reinhardt_records::{DynamicRecord, FieldDescriptor, FieldType, ModelMeta, Record, Value};
///
/// let user = ModelMeta::new("User")
///     .with_field(FieldDescriptor::new("id", FieldType::Integer).primary_key())
///     .into_shared();
///
/// let record = DynamicRecord::new(user)
///     .with("id", 7)
///     .with_computed("url", |r| match r.get("id") {
///         Some(Value::Int(id)) => Value::from(format!("/users/{id}")),
///         _ => Value::Null,
///     });
///
/// assert!(matches!(record.property("url"), Some(Value::String(url)) if url == "/users/7"));
/// ```
pub struct DynamicRecord {
	model: Arc<ModelMeta>,
	values: RwLock<IndexMap<String, Value>>,
	properties: IndexMap<String, Property>,
}

impl DynamicRecord {
	pub fn new(model: Arc<ModelMeta>) -> Self {
		Self {
			model,
			values: RwLock::new(IndexMap::new()),
			properties: IndexMap::new(),
		}
	}

	/// Set a field value
	pub fn with(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
		self.values.write().insert(field.into(), value.into());
		self
	}

	/// Set a property value; a `Value::Function` acts as a method
	pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.properties
			.insert(name.into(), Property::Stored(value.into()));
		self
	}

	/// Register a property computed from the record on every read
	pub fn with_computed<F>(mut self, name: impl Into<String>, f: F) -> Self
	where
		F: Fn(&DynamicRecord) -> Value + Send + Sync + 'static,
	{
		self.properties
			.insert(name.into(), Property::Computed(Arc::new(f)));
		self
	}

	/// Assign a field value on a shared record
	pub fn set(&self, field: impl Into<String>, value: impl Into<Value>) {
		self.values.write().insert(field.into(), value.into());
	}

	/// Remove a field value, leaving it undefined
	pub fn unset(&self, field: &str) -> Option<Value> {
		self.values.write().shift_remove(field)
	}

	pub fn into_shared(self) -> Arc<Self> {
		Arc::new(self)
	}
}

impl Record for DynamicRecord {
	fn model(&self) -> &Arc<ModelMeta> {
		&self.model
	}

	fn get(&self, field: &str) -> Option<Value> {
		self.values.read().get(field).cloned()
	}

	fn property(&self, name: &str) -> Option<Value> {
		match self.properties.get(name)? {
			Property::Stored(value) => Some(value.clone()),
			Property::Computed(compute) => Some(compute(self)),
		}
	}
}

impl fmt::Debug for DynamicRecord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let values = self.values.read();
		f.debug_struct("DynamicRecord")
			.field("model", &self.model.name())
			.field("fields", &values.keys().collect::<Vec<_>>())
			.field("properties", &self.properties.keys().collect::<Vec<_>>())
			.finish()
	}
}
