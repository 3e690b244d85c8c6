//! Integration tests for scheme-driven serialization of single records

mod common;

use common::Blog;
use reinhardt_schemes::prelude::*;
use reinhardt_schemes::serializers::{EncodeError, EncoderOptions, ResolvedScheme, encode_value};
use rstest::{fixture, rstest};
use serde_json::{Value as JsonValue, json};
use std::sync::Arc;

#[fixture]
fn blog() -> Blog {
	Blog::new()
}

fn serialize_one(
	registry: SchemeRegistry,
	model: &Arc<ModelMeta>,
	scheme: impl Into<SchemeRef>,
	options: Options,
	record: &dyn Record,
) -> reinhardt_schemes::Result<JsonValue> {
	let serializer = ModelSerializer::new(registry.into_shared(), model.clone(), scheme, options)?;
	serializer
		.serialize(record, None)
		.map(JsonValue::Object)
}

#[rstest]
fn test_exclude_primary_and_foreign_keys(blog: Blog) {
	let record = DynamicRecord::new(blog.post.clone())
		.with("id", 1)
		.with("authorId", 9)
		.with("title", "T")
		.with("body", "B");
	let scheme = Scheme::new()
		.with_include(["@all"])
		.with_exclude(["@pk", "@fk"]);

	let output = serialize_one(blog.registry(), &blog.post, scheme, Options::default(), &record)
		.unwrap();

	assert_eq!(output, json!({ "title": "T", "body": "B" }));
}

#[rstest]
fn test_method_property_is_invoked_and_renamed(blog: Blog) {
	let record = blog
		.post(1, "T")
		.with_property("getUrl", Value::method(|| Value::from("http://x")));
	let scheme = Scheme::new()
		.with_include(["getUrl"])
		.with_rename("getUrl", "url");

	let output = serialize_one(blog.registry(), &blog.post, scheme, Options::default(), &record)
		.unwrap();

	assert_eq!(output, json!({ "url": "http://x" }));
}

#[rstest]
fn test_computed_property_reads_the_record(blog: Blog) {
	let record = blog.post(7, "T").with_computed("permalink", |post| match post.get("id") {
		Some(Value::Int(id)) => Value::from(format!("/posts/{}", id)),
		_ => Value::Null,
	});
	let scheme = Scheme::new().with_include(["id", "permalink"]);

	let output = serialize_one(blog.registry(), &blog.post, scheme, Options::default(), &record)
		.unwrap();

	assert_eq!(output, json!({ "id": 7, "permalink": "/posts/7" }));
}

#[rstest]
fn test_blob_field_is_base64_by_default() {
	let file = ModelMeta::new("File")
		.with_field(FieldDescriptor::new("data", FieldType::Blob))
		.into_shared();
	let record = DynamicRecord::new(file.clone()).with("data", vec![0u8, 1, 2]);

	let output = serialize_one(
		SchemeRegistry::new(),
		&file,
		SchemeRef::Unspecified,
		Options::default(),
		&record,
	)
	.unwrap();

	assert_eq!(output, json!({ "data": "AAEC" }));
}

#[rstest]
fn test_blob_encoding_from_model_options() {
	let file = ModelMeta::new("File")
		.with_field(FieldDescriptor::new("data", FieldType::Blob))
		.into_shared();
	let registry = SchemeRegistry::new().with_model(
		file.clone(),
		ModelConfig::new().with_options(
			Options::new().with_blob_encoding(reinhardt_schemes::serializers::BlobEncoding::Hex),
		),
	);
	let record = DynamicRecord::new(file.clone()).with("data", vec![0xcau8, 0xfe]);

	let output =
		serialize_one(registry, &file, SchemeRef::Unspecified, Options::default(), &record).unwrap();

	assert_eq!(output, json!({ "data": "cafe" }));
}

#[rstest]
fn test_nested_association_scheme(blog: Blog) {
	let author = blog.user(2, "Ann");
	let record = blog.post_by(1, "T", &author);
	let scheme = Scheme::new()
		.with_include(["title", "author"])
		.with_assoc("author", Scheme::new().with_include(["name"]));

	let output = serialize_one(
		blog.registry(),
		&blog.post,
		scheme,
		Options::default(),
		record.as_ref(),
	)
	.unwrap();

	assert_eq!(output, json!({ "title": "T", "author": { "name": "Ann" } }));
}

#[rstest]
fn test_association_without_scheme_uses_target_default(blog: Blog) {
	let registry = SchemeRegistry::new().with_model(
		blog.user.clone(),
		ModelConfig::new()
			.with_scheme("card", Scheme::new().with_include(["id", "name"]))
			.with_default_scheme("card"),
	);
	let author = blog.user(2, "Ann");
	let record = blog.post_by(1, "T", &author);

	let output = serialize_one(
		registry,
		&blog.post,
		Scheme::new().with_include(["title", "@assoc"]),
		Options::default(),
		record.as_ref(),
	)
	.unwrap();

	assert_eq!(
		output,
		json!({ "title": "T", "author": { "id": 2, "name": "Ann" } })
	);
}

#[rstest]
#[case(UndefinedPolicy::SKIP, Some(json!({ "title": "T" })))]
#[case(UndefinedPolicy::SET_NULL, Some(json!({ "title": "T", "subtitle": null })))]
#[case(UndefinedPolicy::FAIL, None)]
fn test_undefined_policy(
	blog: Blog,
	#[case] policy: UndefinedPolicy,
	#[case] expected: Option<JsonValue>,
) {
	let record = DynamicRecord::new(blog.post.clone()).with("title", "T");
	let scheme = Scheme::new().with_include(["title", "subtitle"]);
	let options = Options::new().with_undefined_policy(policy);

	let result = serialize_one(blog.registry(), &blog.post, scheme, options, &record);

	match expected {
		Some(expected) => assert_eq!(result.unwrap(), expected),
		None => assert_eq!(
			result.unwrap_err(),
			SerializeError::undefined_attribute("Post", "subtitle")
		),
	}
}

#[rstest]
#[case(UndefinedPolicy::SKIP, Some(json!({ "title": "T" })))]
#[case(UndefinedPolicy::SET_NULL, Some(json!({ "title": "T", "summary": null })))]
#[case(UndefinedPolicy::FAIL, None)]
fn test_undefined_policy_applies_to_method_results(
	blog: Blog,
	#[case] policy: UndefinedPolicy,
	#[case] expected: Option<JsonValue>,
) {
	let record = blog
		.post(1, "T")
		.with_property("summary", Value::method(|| None::<Value>));
	let scheme = Scheme::new().with_include(["title", "summary"]);
	let options = Options::new().with_undefined_policy(policy);

	let result = serialize_one(blog.registry(), &blog.post, scheme, options, &record);

	match expected {
		Some(expected) => assert_eq!(result.unwrap(), expected),
		None => assert_eq!(
			result.unwrap_err(),
			SerializeError::undefined_attribute("Post", "summary")
		),
	}
}

#[rstest]
fn test_stored_null_is_not_undefined(blog: Blog) {
	let record = DynamicRecord::new(blog.post.clone())
		.with("title", "T")
		.with("body", Value::Null);
	let options = Options::new().with_undefined_policy(UndefinedPolicy::FAIL);

	let output = serialize_one(
		blog.registry(),
		&blog.post,
		Scheme::new().with_include(["title", "body"]),
		options,
		&record,
	)
	.unwrap();

	assert_eq!(output, json!({ "title": "T", "body": null }));
}

#[rstest]
fn test_serializing_twice_is_idempotent(blog: Blog) {
	let author = blog.user(2, "Ann");
	let record = blog.post_by(1, "T", &author);
	let serializer = ModelSerializer::new(
		blog.registry().into_shared(),
		blog.post.clone(),
		Scheme::new()
			.with_include(["@all", "@assoc"])
			.with_assoc("author", Scheme::new().with_exclude(["email"])),
		Options::default(),
	)
	.unwrap();

	let mut cache = EngineCache::new();
	let first = serializer.serialize(record.as_ref(), Some(&mut cache)).unwrap();
	let second = serializer.serialize(record.as_ref(), Some(&mut cache)).unwrap();
	let uncached = serializer.serialize(record.as_ref(), None).unwrap();

	assert_eq!(first, second);
	assert_eq!(first, uncached);
	assert_eq!(
		first.get("author"),
		Some(&json!({ "id": 2, "name": "Ann" }))
	);
}

#[rstest]
fn test_model_hook_runs_before_scheme_hook(blog: Blog) {
	let registry = SchemeRegistry::new().with_model(
		blog.post.clone(),
		ModelConfig::new()
			.with_scheme(
				"tagged",
				Scheme::new().with_include(["title"]).with_post_serialize(|mut out, _record| {
					if let Some(JsonValue::Array(order)) = out.get_mut("hooks") {
						order.push(json!("scheme"));
					}
					out
				}),
			)
			.with_post_serialize(|mut out, _record, scheme: &ResolvedScheme| {
				out.insert("hooks".to_string(), json!(["model"]));
				out.insert("scheme".to_string(), json!(scheme.name()));
				out
			}),
	);
	let record = blog.post(1, "T");

	let output = serialize_one(registry, &blog.post, "tagged", Options::default(), &record).unwrap();

	assert_eq!(
		output,
		json!({ "title": "T", "hooks": ["model", "scheme"], "scheme": "tagged" })
	);
}

#[rstest]
fn test_hook_receives_the_original_record(blog: Blog) {
	let scheme = Scheme::new()
		.with_include(["title"])
		.with_post_serialize(|mut out, record| {
			if let Some(Value::Int(id)) = record.get("id") {
				out.insert("ref".to_string(), json!(format!("post-{}", id)));
			}
			out
		});
	let record = blog.post(5, "T");

	let output = serialize_one(blog.registry(), &blog.post, scheme, Options::default(), &record)
		.unwrap();

	assert_eq!(output, json!({ "title": "T", "ref": "post-5" }));
}

#[rstest]
fn test_merged_named_schemes(blog: Blog) {
	let registry = SchemeRegistry::new().with_model(
		blog.post.clone(),
		ModelConfig::new()
			.with_scheme("summary", Scheme::new().with_include(["id", "title"]))
			.with_scheme(
				"withBody",
				Scheme::new()
					.with_include(["body"])
					.with_exclude(["id"])
					.with_rename("body", "content"),
			),
	);
	let record = blog.post(1, "T");
	let serializer = ModelSerializer::new(
		registry.into_shared(),
		blog.post.clone(),
		["summary", "withBody"],
		Options::default(),
	)
	.unwrap();

	assert_eq!(serializer.scheme().name(), Some("summary_withBody"));
	assert_eq!(
		JsonValue::Object(serializer.serialize(&record, None).unwrap()),
		json!({ "title": "T", "content": "Body of T" })
	);
}

#[rstest]
#[case(json!(42))]
#[case(json!({ "include": ["title"], "fields": ["id"] }))]
fn test_invalid_json_scheme_fails_construction(blog: Blog, #[case] scheme: JsonValue) {
	let err = ModelSerializer::new(
		blog.registry().into_shared(),
		blog.post.clone(),
		scheme,
		Options::default(),
	)
	.unwrap_err();

	assert!(err.is_configuration_error());
}

#[rstest]
fn test_json_scheme_with_nested_assoc(blog: Blog) {
	let author = blog.user(3, "Bo");
	let record = blog.post_by(1, "T", &author);
	let scheme = json!({
		"include": ["title", "author"],
		"assoc": { "author": { "include": ["name"], "as": { "name": "by" } } },
	});

	let output = serialize_one(
		blog.registry(),
		&blog.post,
		scheme,
		Options::default(),
		record.as_ref(),
	)
	.unwrap();

	assert_eq!(output, json!({ "title": "T", "author": { "by": "Bo" } }));
}

#[rstest]
fn test_invalid_nested_scheme_fails_when_reached(blog: Blog) {
	let author = blog.user(3, "Bo");
	let record = blog.post_by(1, "T", &author);
	let scheme = Scheme::new()
		.with_include(["author"])
		.with_assoc("author", SchemeRef::Json(json!(3)));

	let err = serialize_one(
		blog.registry(),
		&blog.post,
		scheme,
		Options::default(),
		record.as_ref(),
	)
	.unwrap_err();

	assert!(err.is_configuration_error());
}

#[rstest]
fn test_record_of_another_model_is_rejected(blog: Blog) {
	let user = blog.user(1, "Ann");

	let err = serialize_one(
		blog.registry(),
		&blog.post,
		SchemeRef::Unspecified,
		Options::default(),
		user.as_ref(),
	)
	.unwrap_err();

	assert!(err.is_type_mismatch());
}

#[rstest]
fn test_function_value_in_field_is_encoding_error(blog: Blog) {
	let record = blog.post(1, "T").with("body", Value::method(|| Value::Null));

	let err = serialize_one(
		blog.registry(),
		&blog.post,
		Scheme::new().with_include(["body"]),
		Options::default(),
		&record,
	)
	.unwrap_err();

	assert_eq!(
		err.as_encode_error(),
		Some(&EncodeError::unsupported("function"))
	);
}

#[rstest]
fn test_custom_encoder_receives_encoder_options(blog: Blog) {
	let options = Options::new()
		.with_encoder_option("suffix", "!")
		.with_encoder(|value: &Value, options: &EncoderOptions| match value {
			Value::String(s) => {
				let suffix = options.extra.get("suffix").and_then(JsonValue::as_str).unwrap_or("");
				Ok(JsonValue::String(format!("{}{}", s, suffix)))
			}
			other => encode_value(other, options),
		});
	let record = blog.post(1, "T");

	let output = serialize_one(
		blog.registry(),
		&blog.post,
		Scheme::new().with_include(["id", "title"]),
		options,
		&record,
	)
	.unwrap();

	assert_eq!(output, json!({ "id": 1, "title": "T!" }));
}

#[rstest]
fn test_attr_filter_drops_generated_fields(blog: Blog) {
	let options = Options::new()
		.with_attr_filter(|field: &FieldDescriptor, _model: &ModelMeta| !field.is_auto_generated);
	let record = blog.post(1, "T");

	let output = serialize_one(blog.registry(), &blog.post, SchemeRef::Unspecified, options, &record)
		.unwrap();

	assert_eq!(output, json!({ "title": "T", "body": "Body of T" }));
}

#[rstest]
fn test_scheme_options_override_model_options(blog: Blog) {
	let registry = SchemeRegistry::new().with_model(
		blog.post.clone(),
		ModelConfig::new()
			.with_options(Options::new().with_undefined_policy(UndefinedPolicy::FAIL))
			.with_scheme(
				"lenient",
				Scheme::new()
					.with_include(["title", "subtitle"])
					.with_options(Options::new().with_undefined_policy(UndefinedPolicy::SET_NULL)),
			),
	);
	let record = blog.post(1, "T");

	let output = serialize_one(registry, &blog.post, "lenient", Options::default(), &record).unwrap();

	assert_eq!(output, json!({ "title": "T", "subtitle": null }));
}

#[rstest]
fn test_output_keys_follow_compiled_order(blog: Blog) {
	let record = blog.post(1, "T").with("authorId", 4);
	let scheme = Scheme::new().with_include(["body", "title", "@pk", "authorId"]);

	let output = serialize_one(blog.registry(), &blog.post, scheme, Options::default(), &record)
		.unwrap();

	let keys: Vec<&String> = output.as_object().unwrap().keys().collect();
	assert_eq!(keys, ["body", "title", "id", "authorId"]);
}
