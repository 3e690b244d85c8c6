//! Field descriptors
//!
//! A [`FieldDescriptor`] carries the handful of flags the serializers need to
//! bucket a model's attributes: its type tag and whether it is a primary key,
//! a foreign key or generated by the database.

/// Storage type tag of a model field
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
	Integer,
	BigInt,
	Float,
	Decimal,
	Boolean,
	String,
	Text,
	Uuid,
	/// Timestamp with date and time
	Date,
	/// Calendar date without a time component
	DateOnly,
	Time,
	Json,
	Jsonb,
	Blob,
	/// Computed attribute with no backing column
	Virtual,
	Enum,
	Array,
	/// Backend specific type the serializers have no special handling for
	Other(String),
}

impl FieldType {
	/// Whether values of this type are JSON documents
	pub fn is_document(&self) -> bool {
		matches!(self, FieldType::Json | FieldType::Jsonb)
	}

	/// Whether values of this type are binary payloads
	pub fn is_binary(&self) -> bool {
		matches!(self, FieldType::Blob)
	}

	pub fn is_virtual(&self) -> bool {
		matches!(self, FieldType::Virtual)
	}

	pub fn is_date_only(&self) -> bool {
		matches!(self, FieldType::DateOnly)
	}
}

/// Represents a field's metadata
///
/// # Examples
///
/// ```
/// use reinhardt_records::{FieldDescriptor, FieldType};
///
/// let id = FieldDescriptor::new("id", FieldType::Integer)
///     .primary_key()
///     .auto_generated();
///
/// assert!(id.is_primary_key);
/// assert!(id.is_auto_generated);
/// assert!(!id.is_foreign_key);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
	/// Field name
	pub name: String,
	/// Storage type tag
	pub field_type: FieldType,
	/// Whether this is (part of) the primary key
	pub is_primary_key: bool,
	/// Whether this field references another model
	pub is_foreign_key: bool,
	/// Whether the value is produced by the database (serial ids, timestamps)
	pub is_auto_generated: bool,
}

impl FieldDescriptor {
	/// Create a new field descriptor
	pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
		Self {
			name: name.into(),
			field_type,
			is_primary_key: false,
			is_foreign_key: false,
			is_auto_generated: false,
		}
	}

	/// Mark field as primary key
	pub fn primary_key(mut self) -> Self {
		self.is_primary_key = true;
		self
	}

	/// Mark field as foreign key
	pub fn foreign_key(mut self) -> Self {
		self.is_foreign_key = true;
		self
	}

	/// Mark field as generated by the database
	pub fn auto_generated(mut self) -> Self {
		self.is_auto_generated = true;
		self
	}
}
