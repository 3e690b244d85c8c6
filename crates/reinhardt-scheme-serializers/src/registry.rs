//! Per-model serializer configuration
//!
//! Models never carry their serialization settings themselves. Instead a
//! [`SchemeRegistry`] maps model names to a [`ModelConfig`] holding the
//! named schemes, the default scheme name, model-wide options and a
//! model-wide post hook. The registry is built once and shared read-only by
//! every serializer constructed from it.

use crate::engine::JsonMap;
use crate::options::Options;
use crate::resolve::ResolvedScheme;
use crate::scheme::{ModelHook, Scheme};
use indexmap::IndexMap;
use reinhardt_records::{ModelMeta, Record};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Scheme name looked up when a model declares no default scheme
pub const DEFAULT_SCHEME_NAME: &str = "default";

/// Serializer configuration of one model
///
/// # Examples
///
/// ```
/// use reinhardt_scheme_serializers::{ModelConfig, Scheme};
///
/// let config = ModelConfig::new()
///     .with_scheme("short", Scheme::new().with_include(["id", "title"]))
///     .with_scheme("full", Scheme::new())
///     .with_default_scheme("short");
///
/// assert!(config.scheme("short").is_some());
/// assert_eq!(config.default_scheme(), Some("short"));
/// ```
#[derive(Clone, Default)]
pub struct ModelConfig {
	schemes: IndexMap<String, Arc<Scheme>>,
	default_scheme: Option<String>,
	options: Options,
	post_serialize: Option<ModelHook>,
}

impl ModelConfig {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a named scheme
	pub fn with_scheme(mut self, name: impl Into<String>, scheme: Scheme) -> Self {
		self.schemes.insert(name.into(), Arc::new(scheme));
		self
	}

	/// Scheme used when the caller does not designate one
	pub fn with_default_scheme(mut self, name: impl Into<String>) -> Self {
		self.default_scheme = Some(name.into());
		self
	}

	pub fn with_options(mut self, options: Options) -> Self {
		self.options = options;
		self
	}

	/// Hook run on the output of every scheme of this model, before the
	/// scheme's own hook
	pub fn with_post_serialize<F>(mut self, hook: F) -> Self
	where
		F: Fn(JsonMap, &dyn Record, &ResolvedScheme) -> JsonMap + Send + Sync + 'static,
	{
		self.post_serialize = Some(Arc::new(hook));
		self
	}

	pub fn scheme(&self, name: &str) -> Option<&Arc<Scheme>> {
		self.schemes.get(name)
	}

	pub fn scheme_names(&self) -> impl Iterator<Item = &str> {
		self.schemes.keys().map(String::as_str)
	}

	pub fn default_scheme(&self) -> Option<&str> {
		self.default_scheme.as_deref()
	}

	pub fn options(&self) -> &Options {
		&self.options
	}

	pub fn post_serialize(&self) -> Option<&ModelHook> {
		self.post_serialize.as_ref()
	}
}

impl fmt::Debug for ModelConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ModelConfig")
			.field("schemes", &self.schemes.keys().collect::<Vec<_>>())
			.field("default_scheme", &self.default_scheme)
			.field("options", &self.options)
			.field("post_serialize", &self.post_serialize.is_some())
			.finish()
	}
}

#[derive(Debug, Clone)]
struct RegisteredModel {
	meta: Arc<ModelMeta>,
	config: Arc<ModelConfig>,
}

/// Side table of model serializer configurations, keyed by model name
///
/// # Examples
///
/// ```
/// use reinhardt_records::{FieldDescriptor, FieldType, ModelMeta};
/// use reinhardt_scheme_serializers::{ModelConfig, SchemeRegistry};
///
/// let post = ModelMeta::new("Post")
///     .with_field(FieldDescriptor::new("id", FieldType::Integer))
///     .into_shared();
///
/// let registry = SchemeRegistry::new().with_model(post, ModelConfig::new());
///
/// assert!(registry.contains("Post"));
/// assert!(registry.config("User").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemeRegistry {
	models: HashMap<String, RegisteredModel>,
}

impl SchemeRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_model(mut self, meta: Arc<ModelMeta>, config: ModelConfig) -> Self {
		self.register(meta, config);
		self
	}

	/// Register a model, replacing any previous registration under its name
	pub fn register(&mut self, meta: Arc<ModelMeta>, config: ModelConfig) {
		let name = meta.name().to_string();
		self.models.insert(
			name,
			RegisteredModel {
				meta,
				config: Arc::new(config),
			},
		);
	}

	/// Wrap the registry for sharing between serializers
	pub fn into_shared(self) -> Arc<Self> {
		Arc::new(self)
	}

	pub fn config(&self, model_name: &str) -> Option<&Arc<ModelConfig>> {
		self.models.get(model_name).map(|entry| &entry.config)
	}

	pub fn model(&self, model_name: &str) -> Option<&Arc<ModelMeta>> {
		self.models.get(model_name).map(|entry| &entry.meta)
	}

	pub fn contains(&self, model_name: &str) -> bool {
		self.models.contains_key(model_name)
	}

	pub fn len(&self) -> usize {
		self.models.len()
	}

	pub fn is_empty(&self) -> bool {
		self.models.is_empty()
	}
}
