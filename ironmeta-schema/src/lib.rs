//! # IronMeta Schema
//!
//! Entity description model consumed by the IronMeta generators.
//!
//! This crate provides:
//! - Entity, subtype and endpoint definitions
//! - The [`Descriptions`] set with centralized, fallible name resolution
//! - XML description parsing
//! - Description validation
//! - Case conversion helpers for emitted names

pub mod descriptions;
pub mod endpoints;
pub mod entities;
pub mod error;
pub mod naming;
pub mod parser;
pub mod types;
pub mod validation;

pub use descriptions::Descriptions;
pub use endpoints::{
    EndpointPayload, EndpointPayloadEntity, PayloadStructure, ReadWriteEndpointPayload,
};
pub use entities::{
    Association, DEFAULT_QUEUE_NAME, Entity, EntityIdentifier, EntityProperty, EntityRelationship,
    IdentifierType, IdentifierValueType, PropertyType, RelationshipId,
};
pub use error::{ParseError, SchemaError};
pub use parser::parse_descriptions;
pub use types::{
    DefaultValue, ScalarType, Subtype, SubtypeCase, SubtypeItems, SubtypeOption, SubtypeProperty,
    SubtypePropertyType,
};
pub use validation::validate_descriptions;
