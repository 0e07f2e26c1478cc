//! Error types for code generation.

use thiserror::Error;

/// Error type for code generation operations.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Description parsing error.
    #[error("description parse error: {0}")]
    Parse(#[from] ironmeta_schema::ParseError),

    /// Description reference or validation error.
    #[error("schema error: {0}")]
    Schema(#[from] ironmeta_schema::SchemaError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A declaration cannot be emitted in the requested shape.
    #[error("shape mismatch in '{name}': {message}")]
    ShapeMismatch {
        /// Offending entity, subtype or endpoint.
        name: String,
        /// Error message.
        message: String,
    },

    /// Endpoint payload located where no decoding strategy applies.
    #[error("unsupported payload shape for endpoint '{endpoint}' at '{path}'")]
    UnsupportedPayloadShape {
        /// Endpoint name.
        endpoint: String,
        /// Dotted key path of the payload.
        path: String,
    },

    /// Mutable remote entity without any endpoint writing it.
    #[error("entity '{entity}' is mutable but no endpoint declares a write payload for it")]
    MissingWritePayload {
        /// Entity name.
        entity: String,
    },

    /// Code generation error.
    #[error("generation error: {message}")]
    Generation {
        /// Error message.
        message: String,
    },
}

impl CodegenError {
    /// Creates a generation error with the given message.
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }

    /// Creates a shape mismatch error for `name`.
    pub fn shape_mismatch(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            name: name.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironmeta_schema::SchemaError;

    #[test]
    fn test_schema_errors_convert() {
        let err: CodegenError = SchemaError::not_found("entity", "tag", "item.tags").into();
        let message = err.to_string();
        assert!(message.contains("tag"));
        assert!(message.contains("item.tags"));
    }

    #[test]
    fn test_payload_shape_message() {
        let err = CodegenError::UnsupportedPayloadShape {
            endpoint: "items".to_string(),
            path: "a.b.c".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unsupported payload shape for endpoint 'items' at 'a.b.c'"
        );
    }
}
