//! Scheme and option resolution
//!
//! Turns a [`SchemeRef`] into the one effective [`Scheme`] of a serializer,
//! and layers the option sources into [`ResolvedOptions`].

use crate::error::{Result, SerializeError};
use crate::options::{Options, ResolvedOptions, default_options};
use crate::registry::{DEFAULT_SCHEME_NAME, ModelConfig};
use crate::scheme::{Scheme, SchemeRef};
use reinhardt_records::ModelMeta;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::warn;

/// Separator joining the names of merged schemes
const MERGED_NAME_SEPARATOR: &str = "_";

/// The effective scheme of one serializer
#[derive(Debug, Clone)]
pub struct ResolvedScheme {
	name: Option<String>,
	scheme: Arc<Scheme>,
}

impl ResolvedScheme {
	pub fn new(name: Option<String>, scheme: Arc<Scheme>) -> Self {
		Self { name, scheme }
	}

	/// Scheme name; `None` for literal schemes
	///
	/// Merged schemes are named after their parts joined by `_`.
	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	pub fn scheme(&self) -> &Arc<Scheme> {
		&self.scheme
	}
}

/// Resolve a scheme reference against the configuration of `model`
///
/// # Examples
///
/// ```
/// use reinhardt_records::ModelMeta;
/// use reinhardt_scheme_serializers::{ModelConfig, Scheme, SchemeRef, resolve_scheme};
///
/// let post = ModelMeta::new("Post");
/// let config = ModelConfig::new()
///     .with_scheme("short", Scheme::new().with_include(["id"]))
///     .with_scheme("extra", Scheme::new().with_include(["title"]));
///
/// let resolved = resolve_scheme(&post, &config, &SchemeRef::from(["short", "extra"])).unwrap();
/// assert_eq!(resolved.name(), Some("short_extra"));
/// assert_eq!(resolved.scheme().include_selectors(), ["id", "title"]);
/// ```
pub fn resolve_scheme(
	model: &ModelMeta,
	config: &ModelConfig,
	reference: &SchemeRef,
) -> Result<ResolvedScheme> {
	match reference {
		SchemeRef::Unspecified => Ok(resolve_default(model, config)),
		SchemeRef::Named(name) => Ok(resolve_named(model, config, name)),
		SchemeRef::Merge(names) => Ok(resolve_merged(model, config, names)),
		SchemeRef::Inline(scheme) => Ok(ResolvedScheme::new(None, scheme.clone())),
		SchemeRef::Json(value) => resolve_json(model, value),
	}
}

fn resolve_default(model: &ModelMeta, config: &ModelConfig) -> ResolvedScheme {
	match config.default_scheme() {
		Some(name) => resolve_named(model, config, name),
		None => match config.scheme(DEFAULT_SCHEME_NAME) {
			Some(scheme) => ResolvedScheme::new(Some(DEFAULT_SCHEME_NAME.to_string()), scheme.clone()),
			None => ResolvedScheme::new(None, Arc::new(Scheme::default())),
		},
	}
}

fn resolve_named(model: &ModelMeta, config: &ModelConfig, name: &str) -> ResolvedScheme {
	let scheme = match config.scheme(name) {
		Some(scheme) => scheme.clone(),
		None => {
			warn!(
				model = model.name(),
				scheme = name,
				"Scheme not found, using the empty scheme"
			);
			Arc::new(Scheme::default())
		}
	};
	ResolvedScheme::new(Some(name.to_string()), scheme)
}

fn resolve_merged(model: &ModelMeta, config: &ModelConfig, names: &[String]) -> ResolvedScheme {
	let mut merged = Scheme::default();
	for name in names {
		match config.scheme(name) {
			Some(scheme) => merged.merge(scheme),
			None => warn!(
				model = model.name(),
				scheme = name.as_str(),
				"Scheme not found, skipping it in the merge"
			),
		}
	}
	ResolvedScheme::new(Some(names.join(MERGED_NAME_SEPARATOR)), Arc::new(merged))
}

fn resolve_json(model: &ModelMeta, value: &JsonValue) -> Result<ResolvedScheme> {
	if !value.is_object() {
		return Err(SerializeError::configuration(format!(
			"scheme for model '{}' must be an object, got {}",
			model.name(),
			value
		)));
	}

	let scheme: Scheme = serde_json::from_value(value.clone()).map_err(|e| {
		SerializeError::configuration(format!(
			"invalid scheme for model '{}': {}",
			model.name(),
			e
		))
	})?;
	Ok(ResolvedScheme::new(None, Arc::new(scheme)))
}

/// Merge the option layers of one serializer
///
/// Precedence, highest first: `constructor`, the scheme's options, the
/// model-wide options, then the process defaults.
pub fn resolve_options(
	constructor: &Options,
	scheme: &Scheme,
	config: &ModelConfig,
) -> Result<ResolvedOptions> {
	let empty = Options::default();
	let scheme_options = scheme.options.as_ref().unwrap_or(&empty);

	ResolvedOptions::resolve(&[
		constructor,
		scheme_options,
		config.options(),
		default_options(),
	])
}
