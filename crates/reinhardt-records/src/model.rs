//! Model metadata
//!
//! [`ModelMeta`] is the read-only description of a model that the data layer
//! hands to the serializers: its name, its fields in declaration order and
//! its associations in declaration order.

use crate::field::FieldDescriptor;
use indexmap::IndexMap;
use std::sync::Arc;

/// Cardinality of an association
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssociationKind {
	BelongsTo,
	HasOne,
	HasMany,
	BelongsToMany,
}

impl AssociationKind {
	/// Whether the association yields a collection of records
	pub fn is_many(&self) -> bool {
		matches!(self, AssociationKind::HasMany | AssociationKind::BelongsToMany)
	}
}

/// Association metadata
///
/// The alias is the name under which the associated record(s) are reachable
/// on the owning record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationDescriptor {
	/// Accessor name on the owning record
	pub alias: String,
	/// Name of the target model
	pub target: String,
	pub kind: AssociationKind,
}

impl AssociationDescriptor {
	pub fn new(alias: impl Into<String>, target: impl Into<String>, kind: AssociationKind) -> Self {
		Self {
			alias: alias.into(),
			target: target.into(),
			kind,
		}
	}

	pub fn belongs_to(alias: impl Into<String>, target: impl Into<String>) -> Self {
		Self::new(alias, target, AssociationKind::BelongsTo)
	}

	pub fn has_one(alias: impl Into<String>, target: impl Into<String>) -> Self {
		Self::new(alias, target, AssociationKind::HasOne)
	}

	pub fn has_many(alias: impl Into<String>, target: impl Into<String>) -> Self {
		Self::new(alias, target, AssociationKind::HasMany)
	}

	pub fn belongs_to_many(alias: impl Into<String>, target: impl Into<String>) -> Self {
		Self::new(alias, target, AssociationKind::BelongsToMany)
	}
}

/// Reasons a model definition is rejected
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
	#[error("model name must not be empty")]
	EmptyName,
	#[error("model '{model}' declares a field with an empty name")]
	EmptyFieldName { model: String },
	#[error("association '{alias}' of model '{model}' collides with a field of the same name")]
	AliasCollision { model: String, alias: String },
}

/// Model metadata
///
/// # Examples
///
/// ```
/// use reinhardt_records::{AssociationDescriptor, FieldDescriptor, FieldType, ModelMeta};
///
/// let post = ModelMeta::new("Post")
///     .with_field(FieldDescriptor::new("id", FieldType::Integer).primary_key())
///     .with_field(FieldDescriptor::new("author_id", FieldType::Integer).foreign_key())
///     .with_association(AssociationDescriptor::belongs_to("author", "User"));
///
/// assert_eq!(post.name(), "Post");
/// assert_eq!(post.field_names().collect::<Vec<_>>(), vec!["id", "author_id"]);
/// assert!(post.association("author").is_some());
/// assert!(post.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelMeta {
	name: String,
	fields: IndexMap<String, FieldDescriptor>,
	associations: IndexMap<String, AssociationDescriptor>,
}

impl ModelMeta {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			fields: IndexMap::new(),
			associations: IndexMap::new(),
		}
	}

	/// Append a field, replacing any previous field with the same name in place
	pub fn with_field(mut self, field: FieldDescriptor) -> Self {
		self.fields.insert(field.name.clone(), field);
		self
	}

	pub fn with_association(mut self, association: AssociationDescriptor) -> Self {
		self.associations
			.insert(association.alias.clone(), association);
		self
	}

	/// Wrap the metadata for sharing between records and serializers
	pub fn into_shared(self) -> Arc<Self> {
		Arc::new(self)
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Fields in declaration order
	pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
		self.fields.values()
	}

	pub fn field_names(&self) -> impl Iterator<Item = &str> {
		self.fields.keys().map(String::as_str)
	}

	pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
		self.fields.get(name)
	}

	pub fn has_field(&self, name: &str) -> bool {
		self.fields.contains_key(name)
	}

	/// Associations in declaration order
	pub fn associations(&self) -> impl Iterator<Item = &AssociationDescriptor> {
		self.associations.values()
	}

	pub fn association(&self, alias: &str) -> Option<&AssociationDescriptor> {
		self.associations.get(alias)
	}

	/// Check that this is a usable model definition
	pub fn validate(&self) -> Result<(), ModelError> {
		if self.name.trim().is_empty() {
			return Err(ModelError::EmptyName);
		}
		if self.fields.keys().any(|name| name.is_empty()) {
			return Err(ModelError::EmptyFieldName {
				model: self.name.clone(),
			});
		}
		if let Some(alias) = self
			.associations
			.keys()
			.find(|alias| self.fields.contains_key(alias.as_str()))
		{
			return Err(ModelError::AliasCollision {
				model: self.name.clone(),
				alias: alias.clone(),
			});
		}
		Ok(())
	}
}
