//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and traits.
//!
//! ```ignore
//! use ironmeta::prelude::*;
//! ```

// AST
pub use ironmeta_core::{
    AccessLevel, Block, File, Function, FunctionParameter, Node, Property, Reference, Tuple, Type,
    TypeIdentifier, TypeKind, Variable, render_file,
};

// Descriptions
pub use ironmeta_schema::{
    Descriptions, Entity, EntityProperty, ParseError, SchemaError, Subtype, parse_descriptions,
    validate_descriptions,
};

// Generation
pub use ironmeta_codegen::{
    CodegenError, ConcurrencyStyle, GeneratedFile, GenerationConfig, Generator, PersistenceNaming,
    SignalStyle, generate_from_file, generate_from_xml, write_generated,
};
