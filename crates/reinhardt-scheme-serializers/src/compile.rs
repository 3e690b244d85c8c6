//! Attribute list compilation
//!
//! Expands a scheme's `include` and `exclude` selectors against the owning
//! model's [`AttributeGroups`] into the ordered list of attributes one
//! serializer emits.

use crate::classify::AttributeGroups;
use crate::scheme::Scheme;
use indexmap::IndexSet;
use tracing::warn;

/// Prefix of a group selector, as in `@pk`
pub const GROUP_MARKER: char = '@';

/// Prefix forcing direct property access, as in `.fullName`
pub const PROPERTY_MARKER: char = '.';

/// How the value of a compiled attribute is read from the record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeSource {
	/// The record's field accessor
	Field,
	/// Direct property access, invoking methods with no arguments
	Property,
}

/// One entry of a compiled attribute list
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
	/// Attribute name with any property marker stripped
	pub name: String,
	pub source: AttributeSource,
}

impl Attribute {
	pub fn field(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			source: AttributeSource::Field,
		}
	}

	pub fn property(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			source: AttributeSource::Property,
		}
	}

	pub fn is_field(&self) -> bool {
		self.source == AttributeSource::Field
	}
}

/// Compile the attribute list of `scheme`
///
/// Both selector lists are expanded and deduplicated (first occurrence
/// wins), then every excluded name is removed from the include list. A name
/// that is neither a data field nor an association of the model is read as
/// a property. Unresolvable names are kept; they simply come out undefined.
///
/// # Examples
///
/// ```
/// use reinhardt_records::{FieldDescriptor, FieldType, ModelMeta};
/// use reinhardt_scheme_serializers::{Attribute, AttributeGroups, Scheme, compile_attributes};
///
/// let user = ModelMeta::new("User")
///     .with_field(FieldDescriptor::new("id", FieldType::Integer).primary_key())
///     .with_field(FieldDescriptor::new("name", FieldType::String));
/// let groups = AttributeGroups::classify(&user, None);
///
/// let scheme = Scheme::new()
///     .with_include(["@all", "getUrl", ".name"])
///     .with_exclude(["@pk"]);
///
/// assert_eq!(
///     compile_attributes(&scheme, &groups),
///     vec![
///         Attribute::field("name"),
///         Attribute::property("getUrl"),
///         Attribute::property("name"),
///     ]
/// );
/// ```
pub fn compile_attributes(scheme: &Scheme, groups: &AttributeGroups) -> Vec<Attribute> {
	let include = expand_selectors(&scheme.include_selectors(), groups);
	let exclude = expand_selectors(&scheme.exclude_selectors(), groups);

	include
		.into_iter()
		.filter(|name| !exclude.contains(name))
		.map(|name| {
			if let Some(stripped) = name.strip_prefix(PROPERTY_MARKER) {
				Attribute::property(stripped)
			} else if groups.is_model_attribute(&name) {
				Attribute::field(name)
			} else {
				Attribute::property(name)
			}
		})
		.collect()
}

/// Expand group selectors into a fresh deduplicated list
fn expand_selectors(selectors: &[&str], groups: &AttributeGroups) -> IndexSet<String> {
	let mut expanded = IndexSet::new();
	for selector in selectors {
		match selector.strip_prefix(GROUP_MARKER) {
			Some(group) => match groups.group(group) {
				Some(members) => expanded.extend(members.iter().cloned()),
				None => warn!(
					model = groups.model_name(),
					selector = *selector,
					"Unknown attribute group, expanding to nothing"
				),
			},
			None => {
				expanded.insert((*selector).to_string());
			}
		}
	}
	expanded
}
