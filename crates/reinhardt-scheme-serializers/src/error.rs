//! Serialization errors
//!
//! Every error is a synchronous failure of the call in progress. Nothing is
//! caught or retried internally, and a failing record aborts a whole batch.

/// Errors raised by the value encoder
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
	/// The value has no JSON representation
	#[error("Cannot encode value of type '{type_name}'")]
	Unsupported { type_name: String },
}

impl EncodeError {
	pub fn unsupported(type_name: impl Into<String>) -> Self {
		EncodeError::Unsupported {
			type_name: type_name.into(),
		}
	}
}

/// Errors that can occur while building or running a serializer
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SerializeError {
	/// Invalid model, scheme or option value at construction time
	#[error("Configuration error: {message}")]
	Configuration { message: String },
	/// The record does not belong to the serializer's model
	#[error("Type mismatch: expected an instance of '{expected}', got '{found}'")]
	TypeMismatch { expected: String, found: String },
	/// An attribute was undefined under the `FAIL` policy
	#[error("Attribute '{attribute}' of model '{model}' is undefined")]
	UndefinedAttribute { model: String, attribute: String },
	#[error(transparent)]
	Encoding(#[from] EncodeError),
	/// A record was reached again through its own associations
	#[error("Circular reference detected: '{model}' at path '{path}'")]
	CircularReference { model: String, path: String },
	#[error("Maximum depth exceeded at path '{path}': depth={depth}, max={max_depth}")]
	MaxDepthExceeded {
		path: String,
		depth: usize,
		max_depth: usize,
	},
}

impl SerializeError {
	/// Create a configuration error
	pub fn configuration(message: impl Into<String>) -> Self {
		SerializeError::Configuration {
			message: message.into(),
		}
	}

	pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
		SerializeError::TypeMismatch {
			expected: expected.into(),
			found: found.into(),
		}
	}

	pub fn undefined_attribute(model: impl Into<String>, attribute: impl Into<String>) -> Self {
		SerializeError::UndefinedAttribute {
			model: model.into(),
			attribute: attribute.into(),
		}
	}

	pub fn is_configuration_error(&self) -> bool {
		matches!(self, SerializeError::Configuration { .. })
	}

	pub fn is_type_mismatch(&self) -> bool {
		matches!(self, SerializeError::TypeMismatch { .. })
	}

	pub fn is_undefined_attribute(&self) -> bool {
		matches!(self, SerializeError::UndefinedAttribute { .. })
	}

	pub fn is_encoding_error(&self) -> bool {
		matches!(self, SerializeError::Encoding(_))
	}

	/// Try to get the encoder error if this is an encoding failure
	pub fn as_encode_error(&self) -> Option<&EncodeError> {
		match self {
			SerializeError::Encoding(e) => Some(e),
			_ => None,
		}
	}
}

pub type Result<T> = std::result::Result<T, SerializeError>;
