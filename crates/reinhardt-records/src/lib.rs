//! # reinhardt-records
//!
//! Read-only model metadata and record access interfaces consumed by the
//! scheme serializers.
//!
//! This crate does not load, persist or validate anything. It describes what
//! a data layer has to expose so that records can be turned into JSON trees:
//!
//! - **Model metadata**: [`ModelMeta`] with ordered [`FieldDescriptor`]s and
//!   [`AssociationDescriptor`]s
//! - **Runtime values**: the closed [`Value`] tree and its [`ValueKind`]
//!   classification
//! - **Record access**: the [`Record`] trait, plus [`DynamicRecord`], an
//!   in-memory implementation for callers without an ORM binding
//!
//! ## Examples
//!
//! ```rust
//! use reinhardt_records::{DynamicRecord, FieldDescriptor, FieldType, ModelMeta, Record, Value};
//!
//! let post = ModelMeta::new("Post")
//!     .with_field(FieldDescriptor::new("id", FieldType::Integer).primary_key())
//!     .with_field(FieldDescriptor::new("title", FieldType::String))
//!     .into_shared();
//!
//! let record = DynamicRecord::new(post).with("id", 1).with("title", "Hello");
//! assert!(matches!(record.get("title"), Some(Value::String(_))));
//! assert!(record.get("body").is_none());
//! ```

pub mod field;
pub mod model;
pub mod record;
pub mod value;

pub use field::{FieldDescriptor, FieldType};
pub use model::{AssociationDescriptor, AssociationKind, ModelError, ModelMeta};
pub use record::{DynamicRecord, Record};
pub use value::{Method, TypedArray, Value, ValueKind};
