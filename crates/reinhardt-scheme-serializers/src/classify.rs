//! Attribute classification
//!
//! Buckets the attributes of one model into the groups that `@group`
//! selectors expand to. Classification is computed once per serializer and
//! never shared between serializers.

use crate::options::AttrFilter;
use indexmap::IndexSet;
use reinhardt_records::ModelMeta;

/// Named attribute groups of one model
///
/// Every set keeps the model's declaration order. Membership is not
/// exclusive, except that `all` holds data fields only and never an
/// association alias.
///
/// # Examples
///
/// ```
/// use reinhardt_records::{AssociationDescriptor, FieldDescriptor, FieldType, ModelMeta};
/// use reinhardt_scheme_serializers::AttributeGroups;
///
/// let post = ModelMeta::new("Post")
///     .with_field(FieldDescriptor::new("id", FieldType::Integer).primary_key())
///     .with_field(FieldDescriptor::new("title", FieldType::String))
///     .with_association(AssociationDescriptor::belongs_to("author", "User"));
///
/// let groups = AttributeGroups::classify(&post, None);
/// assert_eq!(groups.group("all").unwrap().iter().collect::<Vec<_>>(), ["id", "title"]);
/// assert!(groups.is_model_attribute("author"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeGroups {
	model: String,
	all: IndexSet<String>,
	primary_key: IndexSet<String>,
	foreign_key: IndexSet<String>,
	association: IndexSet<String>,
	binary: IndexSet<String>,
	document: IndexSet<String>,
	computed: IndexSet<String>,
	auto_generated: IndexSet<String>,
	date_only: IndexSet<String>,
}

impl AttributeGroups {
	/// Classify the attributes of `model`
	///
	/// Fields rejected by `filter` are left out of every group. Associations
	/// are never filtered.
	pub fn classify(model: &ModelMeta, filter: Option<&AttrFilter>) -> Self {
		let mut groups = AttributeGroups {
			model: model.name().to_string(),
			..Default::default()
		};

		for field in model.fields() {
			if let Some(filter) = filter
				&& !filter(field, model)
			{
				continue;
			}

			let name = &field.name;
			groups.all.insert(name.clone());
			if field.is_primary_key {
				groups.primary_key.insert(name.clone());
			}
			if field.is_foreign_key {
				groups.foreign_key.insert(name.clone());
			}
			if field.is_auto_generated {
				groups.auto_generated.insert(name.clone());
			}
			if field.field_type.is_binary() {
				groups.binary.insert(name.clone());
			}
			if field.field_type.is_document() {
				groups.document.insert(name.clone());
			}
			if field.field_type.is_virtual() {
				groups.computed.insert(name.clone());
			}
			if field.field_type.is_date_only() {
				groups.date_only.insert(name.clone());
			}
		}

		groups.association = model
			.associations()
			.map(|association| association.alias.clone())
			.collect();

		groups
	}

	pub fn model_name(&self) -> &str {
		&self.model
	}

	/// Members of a selector group, by group name without the marker
	///
	/// Returns `None` for names that are not a group.
	pub fn group(&self, name: &str) -> Option<&IndexSet<String>> {
		let group = match name {
			"all" => &self.all,
			"pk" => &self.primary_key,
			"fk" => &self.foreign_key,
			"assoc" => &self.association,
			"blob" => &self.binary,
			"json" => &self.document,
			"virtual" => &self.computed,
			"auto" => &self.auto_generated,
			_ => return None,
		};
		Some(group)
	}

	/// Whether `name` is read through the field accessor
	pub fn is_model_attribute(&self, name: &str) -> bool {
		self.all.contains(name) || self.association.contains(name)
	}

	pub fn is_document(&self, name: &str) -> bool {
		self.document.contains(name)
	}

	pub fn is_date_only(&self, name: &str) -> bool {
		self.date_only.contains(name)
	}
}
