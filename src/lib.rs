//! # Reinhardt Schemes
//!
//! Declarative JSON serialization of relational records, inspired by Django
//! REST Framework serializers.
//!
//! Records and their loaded associations are turned into plain JSON trees,
//! driven by a "scheme" that chooses which fields to expose, how they are
//! renamed, how associated records are nested and how values are encoded.
//!
//! ## Crates
//!
//! - [`records`] - model metadata, the runtime [`Value`] tree and the
//!   [`Record`] access trait (`reinhardt-records`)
//! - [`serializers`] - schemes, option layering and the serializer engine
//!   (`reinhardt-scheme-serializers`)
//!
//! ## Quick Example
//!
//! ```rust
//! use reinhardt_schemes::prelude::*;
//! use serde_json::json;
//!
//! let post = ModelMeta::new("Post")
//!     .with_field(FieldDescriptor::new("id", FieldType::Integer).primary_key())
//!     .with_field(FieldDescriptor::new("author_id", FieldType::Integer).foreign_key())
//!     .with_field(FieldDescriptor::new("title", FieldType::String))
//!     .with_field(FieldDescriptor::new("body", FieldType::Text))
//!     .into_shared();
//!
//! let registry = SchemeRegistry::new()
//!     .with_model(
//!         post.clone(),
//!         ModelConfig::new()
//!             .with_scheme("public", Scheme::new().with_exclude(["@pk", "@fk"]))
//!             .with_default_scheme("public"),
//!     )
//!     .into_shared();
//!
//! let record = DynamicRecord::new(post)
//!     .with("id", 1)
//!     .with("author_id", 9)
//!     .with("title", "T")
//!     .with("body", "B");
//!
//! let output = serialize(&registry, SerializeInput::One(&record), SchemeRef::Unspecified).unwrap();
//! assert_eq!(output, json!({ "title": "T", "body": "B" }));
//! ```

/// Model metadata and record access
pub mod records {
	pub use reinhardt_records::*;
}

/// Scheme-driven serializers
pub mod serializers {
	pub use reinhardt_scheme_serializers::*;
}

pub use reinhardt_records::{
	AssociationDescriptor, AssociationKind, DynamicRecord, FieldDescriptor, FieldType, ModelMeta,
	Record, Value,
};
pub use reinhardt_scheme_serializers::{
	EngineCache, ModelConfig, ModelSerializer, Options, Result, Scheme, SchemeRef, SchemeRegistry,
	SerializeError, SerializeInput, UndefinedPolicy, serialize, serialize_many,
};

/// Commonly used types
pub mod prelude {
	pub use crate::{
		AssociationDescriptor, AssociationKind, DynamicRecord, EngineCache, FieldDescriptor,
		FieldType, ModelConfig, ModelMeta, ModelSerializer, Options, Record, Scheme, SchemeRef,
		SchemeRegistry, SerializeError, SerializeInput, UndefinedPolicy, Value, serialize,
		serialize_many,
	};
}
