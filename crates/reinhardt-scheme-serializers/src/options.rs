//! Serialization options
//!
//! [`Options`] is a partial set of settings. Several layers are merged into
//! one [`ResolvedOptions`] when a serializer is built, highest precedence
//! first:
//!
//! 1. options passed to the serializer constructor
//! 2. the scheme's `options`
//! 3. model-wide options from the [`ModelConfig`](crate::ModelConfig)
//! 4. process defaults installed with [`install_default_options`]
//! 5. built-in defaults
//!
//! The serializable keys can be loaded from a settings file:
//!
//! ```
//! use reinhardt_scheme_serializers::{Options, UndefinedPolicy};
//!
//! let options: Options = serde_json::from_value(serde_json::json!({
//!     "undefined_policy": "SET_NULL",
//!     "simpleDates": true,
//!     "encoder_options": { "blobEncoding": "hex" },
//! }))
//! .unwrap();
//!
//! assert_eq!(options.undefined_policy, Some(UndefinedPolicy::SET_NULL));
//! assert_eq!(options.simple_dates, Some(true));
//! ```

use crate::encoder::encode_value;
use crate::error::{EncodeError, Result, SerializeError};
use crate::merge::merge_objects;
use base64::Engine as _;
use once_cell::sync::OnceCell;
use reinhardt_records::{FieldDescriptor, ModelMeta, Value};
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Value encoding function
pub type Encoder = Arc<
	dyn Fn(&Value, &EncoderOptions) -> std::result::Result<JsonValue, EncodeError> + Send + Sync,
>;

/// Predicate deciding whether a field takes part in attribute classification
pub type AttrFilter = Arc<dyn Fn(&FieldDescriptor, &ModelMeta) -> bool + Send + Sync>;

/// What to do with attributes whose value is undefined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum UndefinedPolicy {
	/// Omit the key
	#[default]
	Skip,
	/// Emit the key with a `null` value
	SetNull,
	/// Fail with [`SerializeError::UndefinedAttribute`]
	Fail,
}

impl UndefinedPolicy {
	pub const SKIP: Self = UndefinedPolicy::Skip;
	pub const SET_NULL: Self = UndefinedPolicy::SetNull;
	pub const FAIL: Self = UndefinedPolicy::Fail;

	pub fn as_str(&self) -> &'static str {
		match self {
			UndefinedPolicy::Skip => "SKIP",
			UndefinedPolicy::SetNull => "SET_NULL",
			UndefinedPolicy::Fail => "FAIL",
		}
	}
}

impl FromStr for UndefinedPolicy {
	type Err = SerializeError;

	fn from_str(s: &str) -> Result<Self> {
		match s {
			"SKIP" => Ok(UndefinedPolicy::Skip),
			"SET_NULL" => Ok(UndefinedPolicy::SetNull),
			"FAIL" => Ok(UndefinedPolicy::Fail),
			_ => Err(SerializeError::configuration(format!(
				"unknown undefined policy '{}', expected SKIP, SET_NULL or FAIL",
				s
			))),
		}
	}
}

impl TryFrom<String> for UndefinedPolicy {
	type Error = SerializeError;

	fn try_from(value: String) -> Result<Self> {
		value.parse()
	}
}

impl fmt::Display for UndefinedPolicy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Binary-to-text encoding for blob values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlobEncoding {
	#[default]
	Base64,
	Base64Url,
	Hex,
}

impl BlobEncoding {
	pub fn as_str(&self) -> &'static str {
		match self {
			BlobEncoding::Base64 => "base64",
			BlobEncoding::Base64Url => "base64url",
			BlobEncoding::Hex => "hex",
		}
	}

	pub fn encode(&self, bytes: &[u8]) -> String {
		match self {
			BlobEncoding::Base64 => base64::engine::general_purpose::STANDARD.encode(bytes),
			BlobEncoding::Base64Url => base64::engine::general_purpose::URL_SAFE.encode(bytes),
			BlobEncoding::Hex => hex::encode(bytes),
		}
	}
}

impl FromStr for BlobEncoding {
	type Err = SerializeError;

	fn from_str(s: &str) -> Result<Self> {
		match s.to_ascii_lowercase().as_str() {
			"base64" => Ok(BlobEncoding::Base64),
			"base64url" => Ok(BlobEncoding::Base64Url),
			"hex" => Ok(BlobEncoding::Hex),
			_ => Err(SerializeError::configuration(format!(
				"unknown blob encoding '{}'",
				s
			))),
		}
	}
}

/// Options handed to the encoder
///
/// `extra` holds the complete merged `encoder_options` map so that custom
/// encoders can read their own keys from it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EncoderOptions {
	pub blob_encoding: BlobEncoding,
	pub extra: Map<String, JsonValue>,
}

impl EncoderOptions {
	fn from_map(map: Map<String, JsonValue>) -> Result<Self> {
		let blob_encoding = match map.get("blobEncoding").or_else(|| map.get("blob_encoding")) {
			None => BlobEncoding::default(),
			Some(JsonValue::String(name)) => name.parse()?,
			Some(other) => {
				return Err(SerializeError::configuration(format!(
					"blob encoding must be a string, got {}",
					other
				)));
			}
		};
		Ok(Self {
			blob_encoding,
			extra: map,
		})
	}
}

/// Partial serialization options
#[derive(Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
	#[serde(skip)]
	pub encoder: Option<Encoder>,
	#[serde(alias = "undefinedPolicy")]
	pub undefined_policy: Option<UndefinedPolicy>,
	/// Pass document-typed field values through without encoding
	#[serde(alias = "copyJSONFields")]
	pub copy_json_fields: Option<bool>,
	/// Format date-only fields as `YYYY-MM-DD`
	#[serde(alias = "simpleDates")]
	pub simple_dates: Option<bool>,
	#[serde(alias = "encoderOptions")]
	pub encoder_options: Option<Map<String, JsonValue>>,
	#[serde(skip)]
	pub attr_filter: Option<AttrFilter>,
	/// Maximum association nesting depth
	#[serde(alias = "maxDepth")]
	pub max_depth: Option<usize>,
}

impl Options {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_encoder<F>(mut self, encoder: F) -> Self
	where
		F: Fn(&Value, &EncoderOptions) -> std::result::Result<JsonValue, EncodeError>
			+ Send
			+ Sync
			+ 'static,
	{
		self.encoder = Some(Arc::new(encoder));
		self
	}

	pub fn with_undefined_policy(mut self, policy: UndefinedPolicy) -> Self {
		self.undefined_policy = Some(policy);
		self
	}

	pub fn with_copy_json_fields(mut self, enabled: bool) -> Self {
		self.copy_json_fields = Some(enabled);
		self
	}

	pub fn with_simple_dates(mut self, enabled: bool) -> Self {
		self.simple_dates = Some(enabled);
		self
	}

	pub fn with_blob_encoding(self, encoding: BlobEncoding) -> Self {
		self.with_encoder_option("blobEncoding", encoding.as_str())
	}

	/// Set one key of the encoder options map
	pub fn with_encoder_option(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
		self.encoder_options
			.get_or_insert_with(Map::new)
			.insert(key.into(), value.into());
		self
	}

	pub fn with_attr_filter<F>(mut self, filter: F) -> Self
	where
		F: Fn(&FieldDescriptor, &ModelMeta) -> bool + Send + Sync + 'static,
	{
		self.attr_filter = Some(Arc::new(filter));
		self
	}

	pub fn with_max_depth(mut self, max_depth: usize) -> Self {
		self.max_depth = Some(max_depth);
		self
	}

	/// Layer these options over `lower`, keeping every key set here
	///
	/// `encoder_options` maps are deep merged key-wise.
	pub fn merged_over(&self, lower: &Options) -> Options {
		let encoder_options = match (&self.encoder_options, &lower.encoder_options) {
			(Some(upper), Some(below)) => {
				let mut merged = below.clone();
				merge_objects(&mut merged, upper);
				Some(merged)
			}
			(upper, below) => upper.clone().or_else(|| below.clone()),
		};

		Options {
			encoder: self.encoder.clone().or_else(|| lower.encoder.clone()),
			undefined_policy: self.undefined_policy.or(lower.undefined_policy),
			copy_json_fields: self.copy_json_fields.or(lower.copy_json_fields),
			simple_dates: self.simple_dates.or(lower.simple_dates),
			encoder_options,
			attr_filter: self.attr_filter.clone().or_else(|| lower.attr_filter.clone()),
			max_depth: self.max_depth.or(lower.max_depth),
		}
	}
}

impl fmt::Debug for Options {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Options")
			.field("encoder", &self.encoder.as_ref().map(|_| "custom"))
			.field("undefined_policy", &self.undefined_policy)
			.field("copy_json_fields", &self.copy_json_fields)
			.field("simple_dates", &self.simple_dates)
			.field("encoder_options", &self.encoder_options)
			.field("attr_filter", &self.attr_filter.as_ref().map(|_| "custom"))
			.field("max_depth", &self.max_depth)
			.finish()
	}
}

/// Fully merged options held by one serializer
#[derive(Clone)]
pub struct ResolvedOptions {
	pub encoder: Encoder,
	pub undefined_policy: UndefinedPolicy,
	pub copy_json_fields: bool,
	pub simple_dates: bool,
	pub encoder_options: EncoderOptions,
	pub attr_filter: Option<AttrFilter>,
	pub max_depth: Option<usize>,
}

impl ResolvedOptions {
	/// Merge option layers, highest precedence first, over the built-in defaults
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_scheme_serializers::{Options, ResolvedOptions, UndefinedPolicy};
	///
	/// let constructor = Options::new().with_undefined_policy(UndefinedPolicy::FAIL);
	/// let model = Options::new()
	///     .with_undefined_policy(UndefinedPolicy::SET_NULL)
	///     .with_simple_dates(true);
	///
	/// let resolved = ResolvedOptions::resolve(&[&constructor, &model]).unwrap();
	/// assert_eq!(resolved.undefined_policy, UndefinedPolicy::FAIL);
	/// assert!(resolved.simple_dates);
	/// assert!(!resolved.copy_json_fields);
	/// ```
	pub fn resolve(layers: &[&Options]) -> Result<Self> {
		let merged = layers
			.iter()
			.rev()
			.fold(Options::default(), |acc, layer| layer.merged_over(&acc));

		Ok(Self {
			encoder: merged.encoder.unwrap_or_else(default_encoder),
			undefined_policy: merged.undefined_policy.unwrap_or_default(),
			copy_json_fields: merged.copy_json_fields.unwrap_or(false),
			simple_dates: merged.simple_dates.unwrap_or(false),
			encoder_options: EncoderOptions::from_map(merged.encoder_options.unwrap_or_default())?,
			attr_filter: merged.attr_filter,
			max_depth: merged.max_depth,
		})
	}
}

impl Default for ResolvedOptions {
	fn default() -> Self {
		Self {
			encoder: default_encoder(),
			undefined_policy: UndefinedPolicy::default(),
			copy_json_fields: false,
			simple_dates: false,
			encoder_options: EncoderOptions::default(),
			attr_filter: None,
			max_depth: None,
		}
	}
}

impl fmt::Debug for ResolvedOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ResolvedOptions")
			.field("undefined_policy", &self.undefined_policy)
			.field("copy_json_fields", &self.copy_json_fields)
			.field("simple_dates", &self.simple_dates)
			.field("encoder_options", &self.encoder_options)
			.field("attr_filter", &self.attr_filter.is_some())
			.field("max_depth", &self.max_depth)
			.finish_non_exhaustive()
	}
}

fn default_encoder() -> Encoder {
	Arc::new(encode_value)
}

static DEFAULT_OPTIONS: OnceCell<Options> = OnceCell::new();

/// Install the process-wide default options
///
/// Call this once at process start, before any serializer is built. The
/// defaults are immutable afterwards; a second call, or a call after the
/// defaults were first read, is a configuration error.
pub fn install_default_options(options: Options) -> Result<()> {
	DEFAULT_OPTIONS
		.set(options)
		.map_err(|_| SerializeError::configuration("default options are already installed"))
}

/// Process-wide default options, empty unless installed
pub fn default_options() -> &'static Options {
	DEFAULT_OPTIONS.get_or_init(Options::default)
}
