//! Recursion tracking for one serialization run
//!
//! Path-keyed serializer reuse bounds the cost of nested schemes but not the
//! recursion itself. [`SerializationContext`] tracks the records on the
//! current ancestor chain and the association depth so that self-referencing
//! data fails with an error instead of recursing without bound.

use crate::error::{Result, SerializeError};
use reinhardt_records::Record;
use std::collections::HashSet;

/// Ancestor chain and depth of the record being serialized
#[derive(Debug, Clone, Default)]
pub struct SerializationContext {
	/// Current association depth (0 = root record)
	current_depth: usize,
	/// Maximum association depth, unlimited when `None`
	max_depth: Option<usize>,
	/// Identities of the records on the current ancestor chain
	visited: HashSet<usize>,
}

impl SerializationContext {
	/// Create a new serialization context
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_scheme_serializers::SerializationContext;
	///
	/// let context = SerializationContext::new(Some(3));
	/// assert_eq!(context.current_depth(), 0);
	/// assert_eq!(context.max_depth(), Some(3));
	/// assert!(context.can_go_deeper());
	/// ```
	pub fn new(max_depth: Option<usize>) -> Self {
		Self {
			current_depth: 0,
			max_depth,
			visited: HashSet::new(),
		}
	}

	pub fn current_depth(&self) -> usize {
		self.current_depth
	}

	pub fn max_depth(&self) -> Option<usize> {
		self.max_depth
	}

	/// Check if one more association level is allowed
	pub fn can_go_deeper(&self) -> bool {
		self.max_depth
			.is_none_or(|max_depth| self.current_depth < max_depth)
	}

	/// Mark a record as being on the ancestor chain
	///
	/// Returns `false` if it already is.
	pub fn visit(&mut self, record: &dyn Record) -> bool {
		self.visited.insert(record.identity())
	}

	/// Take a record off the ancestor chain
	pub fn leave(&mut self, record: &dyn Record) {
		self.visited.remove(&record.identity());
	}

	/// Run `f` with `record` on the ancestor chain
	///
	/// The record is taken off the chain again when `f` returns, whether it
	/// succeeded or not, so sibling occurrences of the same record are
	/// serialized normally.
	pub fn visit_with<F, R>(&mut self, record: &dyn Record, path: &str, f: F) -> Result<R>
	where
		F: FnOnce(&mut Self) -> Result<R>,
	{
		if !self.visit(record) {
			return Err(SerializeError::CircularReference {
				model: record.model().name().to_string(),
				path: display_path(path).to_string(),
			});
		}

		let result = f(self);
		self.leave(record);
		result
	}

	/// Run `f` one association level deeper
	pub fn descend_with<F, R>(&mut self, path: &str, f: F) -> Result<R>
	where
		F: FnOnce(&mut Self) -> Result<R>,
	{
		if let Some(max_depth) = self.max_depth
			&& self.current_depth >= max_depth
		{
			return Err(SerializeError::MaxDepthExceeded {
				path: display_path(path).to_string(),
				depth: self.current_depth + 1,
				max_depth,
			});
		}

		self.current_depth += 1;
		let result = f(self);
		self.current_depth -= 1;
		result
	}
}

fn display_path(path: &str) -> &str {
	if path.is_empty() { "<root>" } else { path }
}
