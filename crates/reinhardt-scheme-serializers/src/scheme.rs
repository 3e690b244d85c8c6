//! Serialization schemes
//!
//! A [`Scheme`] chooses which attributes of a model are emitted, how they are
//! renamed and which associations are recursed into. It is the counterpart of
//! a DRF serializer `Meta` class, expressed as data so that it can also be
//! loaded from configuration.

use crate::engine::JsonMap;
use crate::merge::{concat_selectors, merge_scheme_refs};
use crate::options::Options;
use crate::resolve::ResolvedScheme;
use indexmap::IndexMap;
use reinhardt_records::Record;
use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;

/// Hook run on the output of one scheme
pub type SchemeHook = Arc<dyn Fn(JsonMap, &dyn Record) -> JsonMap + Send + Sync>;

/// Hook run on the output of every scheme of a model
///
/// It receives the resolved scheme so it can read the scheme name.
pub type ModelHook = Arc<dyn Fn(JsonMap, &dyn Record, &ResolvedScheme) -> JsonMap + Send + Sync>;

/// A declarative serialization scheme
///
/// `include` defaults to `["@all"]` and `exclude` to `[]`. Selectors are
/// either literal names, `.name` to force direct property access, or
/// `@group` to expand one of the attribute groups of the owning model
/// (`@all`, `@pk`, `@fk`, `@assoc`, `@blob`, `@json`, `@virtual`, `@auto`).
///
/// # Examples
///
/// ```
/// use reinhardt_scheme_serializers::Scheme;
///
/// let scheme = Scheme::new()
///     .with_include(["@all", "getUrl"])
///     .with_exclude(["@pk", "@fk"])
///     .with_rename("getUrl", "url")
///     .with_assoc("author", Scheme::new().with_include(["name"]));
///
/// assert_eq!(scheme.include_selectors(), ["@all", "getUrl"]);
/// assert_eq!(scheme.rename.get("getUrl").map(String::as_str), Some("url"));
/// ```
#[derive(Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Scheme {
	pub include: Option<Vec<String>>,
	pub exclude: Option<Vec<String>>,
	/// Nested scheme per association name
	pub assoc: IndexMap<String, SchemeRef>,
	/// Output key per source attribute name or `.name` selector
	#[serde(rename = "as")]
	pub rename: IndexMap<String, String>,
	pub options: Option<Options>,
	#[serde(skip)]
	pub post_serialize: Option<SchemeHook>,
}

const DEFAULT_INCLUDE: &[&str] = &["@all"];

impl Scheme {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_include<I, S>(mut self, selectors: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.include = Some(selectors.into_iter().map(Into::into).collect());
		self
	}

	pub fn with_exclude<I, S>(mut self, selectors: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.exclude = Some(selectors.into_iter().map(Into::into).collect());
		self
	}

	pub fn with_rename(mut self, source: impl Into<String>, output: impl Into<String>) -> Self {
		self.rename.insert(source.into(), output.into());
		self
	}

	pub fn with_assoc(mut self, association: impl Into<String>, scheme: impl Into<SchemeRef>) -> Self {
		self.assoc.insert(association.into(), scheme.into());
		self
	}

	pub fn with_options(mut self, options: Options) -> Self {
		self.options = Some(options);
		self
	}

	pub fn with_post_serialize<F>(mut self, hook: F) -> Self
	where
		F: Fn(JsonMap, &dyn Record) -> JsonMap + Send + Sync + 'static,
	{
		self.post_serialize = Some(Arc::new(hook));
		self
	}

	/// Include selectors with the default applied
	pub fn include_selectors(&self) -> Vec<&str> {
		match &self.include {
			Some(include) => include.iter().map(String::as_str).collect(),
			None => DEFAULT_INCLUDE.to_vec(),
		}
	}

	/// Exclude selectors with the default applied
	pub fn exclude_selectors(&self) -> Vec<&str> {
		self.exclude
			.iter()
			.flatten()
			.map(String::as_str)
			.collect()
	}

	/// Deep merge `other` into this scheme
	///
	/// Selector lists are concatenated, `assoc`, `as` and `options` are
	/// merged key-wise, and a hook in `other` replaces this scheme's hook.
	pub fn merge(&mut self, other: &Scheme) {
		concat_selectors(&mut self.include, &other.include);
		concat_selectors(&mut self.exclude, &other.exclude);

		for (association, reference) in &other.assoc {
			let merged = match self.assoc.get(association) {
				Some(existing) => merge_scheme_refs(existing, reference),
				None => reference.clone(),
			};
			self.assoc.insert(association.clone(), merged);
		}

		for (source, output) in &other.rename {
			self.rename.insert(source.clone(), output.clone());
		}

		self.options = match (&self.options, &other.options) {
			(Some(current), Some(later)) => Some(later.merged_over(current)),
			(current, later) => later.clone().or_else(|| current.clone()),
		};

		if other.post_serialize.is_some() {
			self.post_serialize = other.post_serialize.clone();
		}
	}
}

impl fmt::Debug for Scheme {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Scheme")
			.field("include", &self.include)
			.field("exclude", &self.exclude)
			.field("assoc", &self.assoc)
			.field("as", &self.rename)
			.field("options", &self.options)
			.field("post_serialize", &self.post_serialize.is_some())
			.finish()
	}
}

/// How a caller designates a scheme
#[derive(Debug, Clone, Default)]
pub enum SchemeRef {
	/// Use the model's default scheme
	#[default]
	Unspecified,
	/// A scheme registered on the model under this name
	Named(String),
	/// Several registered schemes deep merged in order
	Merge(Vec<String>),
	/// A literal scheme
	Inline(Arc<Scheme>),
	/// An untyped scheme object, validated when it is resolved
	Json(JsonValue),
}

impl From<&str> for SchemeRef {
	fn from(name: &str) -> Self {
		SchemeRef::from(name.to_string())
	}
}

impl From<String> for SchemeRef {
	fn from(name: String) -> Self {
		if name.is_empty() {
			SchemeRef::Unspecified
		} else {
			SchemeRef::Named(name)
		}
	}
}

impl From<Vec<&str>> for SchemeRef {
	fn from(names: Vec<&str>) -> Self {
		SchemeRef::Merge(names.into_iter().map(str::to_string).collect())
	}
}

impl From<Vec<String>> for SchemeRef {
	fn from(names: Vec<String>) -> Self {
		SchemeRef::Merge(names)
	}
}

impl<const N: usize> From<[&str; N]> for SchemeRef {
	fn from(names: [&str; N]) -> Self {
		SchemeRef::Merge(names.iter().map(|name| name.to_string()).collect())
	}
}

impl From<Scheme> for SchemeRef {
	fn from(scheme: Scheme) -> Self {
		SchemeRef::Inline(Arc::new(scheme))
	}
}

impl From<Arc<Scheme>> for SchemeRef {
	fn from(scheme: Arc<Scheme>) -> Self {
		SchemeRef::Inline(scheme)
	}
}

impl<T: Into<SchemeRef>> From<Option<T>> for SchemeRef {
	fn from(reference: Option<T>) -> Self {
		reference.map_or(SchemeRef::Unspecified, Into::into)
	}
}

/// Falsy values mean "unspecified", strings name a scheme, string arrays
/// merge named schemes; everything else is kept for validation.
impl From<JsonValue> for SchemeRef {
	fn from(value: JsonValue) -> Self {
		match value {
			JsonValue::Null | JsonValue::Bool(false) => SchemeRef::Unspecified,
			JsonValue::String(name) => SchemeRef::from(name),
			JsonValue::Array(items) if items.iter().all(JsonValue::is_string) => SchemeRef::Merge(
				items
					.into_iter()
					.filter_map(|item| item.as_str().map(str::to_string))
					.collect(),
			),
			other => SchemeRef::Json(other),
		}
	}
}

impl<'de> Deserialize<'de> for SchemeRef {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		JsonValue::deserialize(deserializer).map(SchemeRef::from)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_default_selectors() {
		let scheme = Scheme::new();
		assert_eq!(scheme.include_selectors(), vec!["@all"]);
		assert!(scheme.exclude_selectors().is_empty());
	}

	#[rstest]
	fn test_deserialize_scheme_object() {
		let scheme: Scheme = serde_json::from_value(json!({
			"include": ["@all", "getUrl"],
			"exclude": ["@pk"],
			"as": { "getUrl": "url" },
			"assoc": { "author": { "include": ["name"] }, "tags": "short" },
			"options": { "simpleDates": true },
		}))
		.unwrap();

		assert_eq!(scheme.include_selectors(), vec!["@all", "getUrl"]);
		assert_eq!(scheme.rename.get("getUrl").unwrap(), "url");
		assert!(matches!(scheme.assoc.get("author"), Some(SchemeRef::Json(_))));
		assert!(matches!(scheme.assoc.get("tags"), Some(SchemeRef::Named(name)) if name == "short"));
		assert_eq!(scheme.options.unwrap().simple_dates, Some(true));
	}

	#[rstest]
	fn test_deserialize_rejects_unknown_keys() {
		let result: Result<Scheme, _> = serde_json::from_value(json!({ "fields": ["id"] }));
		assert!(result.is_err());
	}

	#[rstest]
	#[case(json!(null))]
	#[case(json!(false))]
	#[case(json!(""))]
	fn test_falsy_json_is_unspecified(#[case] value: JsonValue) {
		assert!(matches!(SchemeRef::from(value), SchemeRef::Unspecified));
	}

	#[rstest]
	fn test_json_string_array_merges() {
		let reference = SchemeRef::from(json!(["short", "extra"]));
		assert!(
			matches!(reference, SchemeRef::Merge(names) if names == vec!["short", "extra"])
		);
	}

	#[rstest]
	fn test_merge_concatenates_and_overrides() {
		let mut base = Scheme::new()
			.with_include(["id"])
			.with_rename("a", "x")
			.with_options(Options::new().with_simple_dates(true));
		let extra = Scheme::new()
			.with_include(["name"])
			.with_exclude(["secret"])
			.with_rename("a", "y")
			.with_options(Options::new().with_copy_json_fields(true));

		base.merge(&extra);

		assert_eq!(base.include_selectors(), vec!["id", "name"]);
		assert_eq!(base.exclude_selectors(), vec!["secret"]);
		assert_eq!(base.rename.get("a").unwrap(), "y");
		let options = base.options.unwrap();
		assert_eq!(options.simple_dates, Some(true));
		assert_eq!(options.copy_json_fields, Some(true));
	}

	#[rstest]
	fn test_merge_nested_assoc_schemes() {
		let mut base =
			Scheme::new().with_assoc("author", Scheme::new().with_include(["name"]));
		let extra =
			Scheme::new().with_assoc("author", Scheme::new().with_include(["email"]));

		base.merge(&extra);

		match base.assoc.get("author") {
			Some(SchemeRef::Inline(author)) => {
				assert_eq!(author.include_selectors(), vec!["name", "email"]);
			}
			other => panic!("Expected inline scheme, got {:?}", other),
		}
	}
}
