//! Error types for description parsing and validation.

use thiserror::Error;

/// Failure while loading a description document.
///
/// Reading the document from disk is the caller's concern; these errors
/// only cover the XML text itself.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The document is not well-formed XML.
    #[error("malformed description XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("<{element}> requires attribute '{attribute}'")]
    MissingAttribute { element: String, attribute: String },

    /// An attribute value outside the accepted vocabulary.
    #[error("<{element}> attribute '{attribute}' does not accept '{value}'")]
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
    },

    /// An element the loader does not know at this position.
    #[error("unexpected <{element}> inside <{context}>")]
    UnknownElement { element: String, context: String },

    /// Two definitions of the same kind share a name, e.g. two properties
    /// of one entity.
    #[error("{kind} '{name}' is declared more than once")]
    DuplicateDefinition { kind: String, name: String },

    #[error("invalid description structure: {message}")]
    InvalidStructure { message: String },

    /// Element or attribute bytes that are not UTF-8.
    #[error("description text is not UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// Error type for description lookups and validation.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Parsing error.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// A cross-referenced definition does not exist.
    #[error("{kind} '{name}' not found (referenced by {referenced_by})")]
    NotFound {
        /// Kind of definition (entity, subtype, endpoint).
        kind: &'static str,
        /// Name that failed to resolve.
        name: String,
        /// Source field holding the reference.
        referenced_by: String,
    },

    /// Two definitions share a name.
    #[error("duplicate {kind} '{name}'")]
    Duplicate {
        /// Kind of definition.
        kind: &'static str,
        /// Duplicated name.
        name: String,
    },

    /// Enum subtype whose cases are all unused.
    #[error("subtype '{subtype}' has no used cases")]
    NoUsedCases {
        /// Subtype name.
        subtype: String,
    },

    /// Entity identifier declared equivalent to itself.
    #[error("entity '{entity}' declares its own identifier as equivalent")]
    SelfEquivalence {
        /// Entity name.
        entity: String,
    },

    /// Entity property shadowing a member every generated entity declares.
    #[error("entity '{entity}' declares property '{property}', which is reserved")]
    ReservedProperty {
        /// Entity name.
        entity: String,
        /// Offending property name.
        property: String,
    },

    /// Validation error.
    #[error("validation error: {message}")]
    Validation {
        /// Error message.
        message: String,
    },
}

impl ParseError {
    pub fn missing_attr(element: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::MissingAttribute {
            element: element.into(),
            attribute: attribute.into(),
        }
    }

    pub fn invalid_attr(
        element: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidAttribute {
            element: element.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    pub fn unknown_element(element: impl Into<String>, context: impl Into<String>) -> Self {
        Self::UnknownElement {
            element: element.into(),
            context: context.into(),
        }
    }

    /// `kind` names the definition, e.g. `"property"` or `"case"`.
    pub fn duplicate(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::DuplicateDefinition {
            kind: kind.into(),
            name: name.into(),
        }
    }
}

impl SchemaError {
    /// Creates a not-found error for a cross reference.
    pub fn not_found(
        kind: &'static str,
        name: impl Into<String>,
        referenced_by: impl Into<String>,
    ) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
            referenced_by: referenced_by.into(),
        }
    }
}
