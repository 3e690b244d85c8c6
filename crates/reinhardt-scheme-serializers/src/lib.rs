//! # reinhardt-scheme-serializers
//!
//! Scheme-driven serialization of records and their loaded associations
//! into plain JSON trees.
//!
//! A declarative [`Scheme`] chooses which attributes are exposed, how they
//! are renamed and which associations are recursed into. The expensive work
//! of resolving a scheme and compiling its attribute list is paid once per
//! [`ModelSerializer`]; an [`EngineCache`] reuses child serializers per
//! association path across a whole batch.
//!
//! ## Features
//!
//! - **Attribute groups**: `@all`, `@pk`, `@fk`, `@assoc`, `@blob`, `@json`,
//!   `@virtual`, `@auto` selectors in `include` / `exclude`
//! - **Named schemes**: per-model schemes in a [`SchemeRegistry`], merged when
//!   referenced as a list
//! - **Undefined policies**: `SKIP`, `SET_NULL` or `FAIL` for missing values
//! - **Pluggable encoding**: [`encode_value`] is the default [`Encoder`]
//! - **Hooks**: model-wide and per-scheme post-serialization hooks
//! - **Cycle guard**: self-referencing data fails instead of recursing
//!
//! ## Examples
//!
//! ```rust
//! use reinhardt_records::{
//!     AssociationDescriptor, DynamicRecord, FieldDescriptor, FieldType, ModelMeta, Value,
//! };
//! use reinhardt_scheme_serializers::{ModelConfig, Scheme, SchemeRegistry, SerializeInput, serialize};
//! use serde_json::json;
//!
//! let user = ModelMeta::new("User")
//!     .with_field(FieldDescriptor::new("id", FieldType::Integer).primary_key())
//!     .with_field(FieldDescriptor::new("name", FieldType::String))
//!     .into_shared();
//! let post = ModelMeta::new("Post")
//!     .with_field(FieldDescriptor::new("id", FieldType::Integer).primary_key())
//!     .with_field(FieldDescriptor::new("title", FieldType::String))
//!     .with_association(AssociationDescriptor::belongs_to("author", "User"))
//!     .into_shared();
//!
//! let registry = SchemeRegistry::new()
//!     .with_model(
//!         post.clone(),
//!         ModelConfig::new().with_scheme(
//!             "default",
//!             Scheme::new()
//!                 .with_include(["title", "author"])
//!                 .with_assoc("author", Scheme::new().with_include(["name"])),
//!         ),
//!     )
//!     .into_shared();
//!
//! let ann = DynamicRecord::new(user).with("id", 2).with("name", "Ann").into_shared();
//! let record = DynamicRecord::new(post)
//!     .with("id", 1)
//!     .with("title", "Hello")
//!     .with("author", Value::record(ann));
//!
//! let output = serialize(&registry, SerializeInput::One(&record), None::<&str>).unwrap();
//! assert_eq!(output, json!({ "title": "Hello", "author": { "name": "Ann" } }));
//! ```

pub mod batch;
pub mod classify;
pub mod compile;
pub mod context;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod merge;
pub mod options;
pub mod registry;
pub mod resolve;
pub mod scheme;

// Re-export commonly used types
pub use batch::{SerializeInput, serialize, serialize_many};
pub use classify::AttributeGroups;
pub use compile::{Attribute, AttributeSource, GROUP_MARKER, PROPERTY_MARKER, compile_attributes};
pub use context::SerializationContext;
pub use encoder::encode_value;
pub use engine::{EngineCache, JsonMap, ModelSerializer};
pub use error::{EncodeError, Result, SerializeError};
pub use options::{
	AttrFilter, BlobEncoding, Encoder, EncoderOptions, Options, ResolvedOptions, UndefinedPolicy,
	default_options, install_default_options,
};
pub use registry::{DEFAULT_SCHEME_NAME, ModelConfig, SchemeRegistry};
pub use resolve::{ResolvedScheme, resolve_options, resolve_scheme};
pub use scheme::{ModelHook, Scheme, SchemeHook, SchemeRef};
