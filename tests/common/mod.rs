//! Shared models and records for the integration tests

#![allow(dead_code)]

use reinhardt_schemes::prelude::*;
use std::sync::Arc;

pub struct Blog {
	pub user: Arc<ModelMeta>,
	pub post: Arc<ModelMeta>,
}

impl Blog {
	pub fn new() -> Self {
		let user = ModelMeta::new("User")
			.with_field(FieldDescriptor::new("id", FieldType::Integer).primary_key())
			.with_field(FieldDescriptor::new("name", FieldType::String))
			.with_field(FieldDescriptor::new("email", FieldType::String))
			.with_association(AssociationDescriptor::has_many("posts", "Post"))
			.into_shared();

		let post = ModelMeta::new("Post")
			.with_field(
				FieldDescriptor::new("id", FieldType::Integer)
					.primary_key()
					.auto_generated(),
			)
			.with_field(FieldDescriptor::new("authorId", FieldType::Integer).foreign_key())
			.with_field(FieldDescriptor::new("title", FieldType::String))
			.with_field(FieldDescriptor::new("body", FieldType::Text))
			.with_association(AssociationDescriptor::belongs_to("author", "User"))
			.into_shared();

		Self { user, post }
	}

	pub fn user(&self, id: i64, name: &str) -> Arc<DynamicRecord> {
		DynamicRecord::new(self.user.clone())
			.with("id", id)
			.with("name", name)
			.with("email", format!("{}@example.com", name.to_lowercase()))
			.into_shared()
	}

	pub fn post(&self, id: i64, title: &str) -> DynamicRecord {
		DynamicRecord::new(self.post.clone())
			.with("id", id)
			.with("title", title)
			.with("body", format!("Body of {}", title))
	}

	/// Post written by `author`, with the foreign key and the association set
	pub fn post_by(&self, id: i64, title: &str, author: &Arc<DynamicRecord>) -> Arc<DynamicRecord> {
		let author_id = match author.get("id") {
			Some(Value::Int(id)) => id,
			_ => 0,
		};
		self.post(id, title)
			.with("authorId", author_id)
			.with("author", Value::record(author.clone()))
			.into_shared()
	}

	pub fn registry(&self) -> SchemeRegistry {
		SchemeRegistry::new()
			.with_model(self.user.clone(), ModelConfig::new())
			.with_model(self.post.clone(), ModelConfig::new())
	}
}
