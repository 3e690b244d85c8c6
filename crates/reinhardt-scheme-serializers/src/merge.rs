//! Deep merge utilities
//!
//! The merge rule is the same everywhere it is applied: arrays are
//! concatenated, objects are merged key-wise (recursively), and any other
//! value is overwritten by the later one.

use crate::scheme::SchemeRef;
use serde_json::{Map, Value as JsonValue};

/// Merge `source` into `target`
///
/// # Examples
///
/// ```
/// use reinhardt_scheme_serializers::merge::deep_merge;
/// use serde_json::json;
///
/// let mut target = json!({ "include": ["id"], "as": { "a": "x" }, "n": 1 });
/// deep_merge(&mut target, &json!({ "include": ["name"], "as": { "b": "y" }, "n": 2 }));
///
/// assert_eq!(
///     target,
///     json!({ "include": ["id", "name"], "as": { "a": "x", "b": "y" }, "n": 2 })
/// );
/// ```
pub fn deep_merge(target: &mut JsonValue, source: &JsonValue) {
	match (target, source) {
		(JsonValue::Array(target), JsonValue::Array(source)) => {
			target.extend(source.iter().cloned());
		}
		(JsonValue::Object(target), JsonValue::Object(source)) => {
			merge_objects(target, source);
		}
		(target, source) => {
			*target = source.clone();
		}
	}
}

/// Merge the keys of `source` into `target`
pub fn merge_objects(target: &mut Map<String, JsonValue>, source: &Map<String, JsonValue>) {
	for (key, value) in source {
		match target.get_mut(key) {
			Some(existing) => deep_merge(existing, value),
			None => {
				target.insert(key.clone(), value.clone());
			}
		}
	}
}

/// Concatenate selector lists; absent on both sides stays absent
pub(crate) fn concat_selectors(
	target: &mut Option<Vec<String>>,
	source: &Option<Vec<String>>,
) {
	if let Some(source) = source {
		target
			.get_or_insert_with(Vec::new)
			.extend(source.iter().cloned());
	}
}

/// Merge two nested scheme references under the same association
pub(crate) fn merge_scheme_refs(target: &SchemeRef, source: &SchemeRef) -> SchemeRef {
	match (target, source) {
		(SchemeRef::Inline(left), SchemeRef::Inline(right)) => {
			let mut merged = (**left).clone();
			merged.merge(right);
			SchemeRef::Inline(merged.into())
		}
		(SchemeRef::Merge(left), SchemeRef::Merge(right)) => {
			SchemeRef::Merge(left.iter().chain(right).cloned().collect())
		}
		(SchemeRef::Json(left), SchemeRef::Json(right)) => {
			let mut merged = left.clone();
			deep_merge(&mut merged, right);
			SchemeRef::Json(merged)
		}
		(target, SchemeRef::Unspecified) => target.clone(),
		(_, source) => source.clone(),
	}
}
