//! # IronMeta
//!
//! Declarative-schema driven Swift data-access layer generator.
//!
//! IronMeta reads a description of entities, subtypes and endpoints and
//! emits the client-side code that models, persists and fetches them.
//!
//! ## Features
//!
//! - **Typed target AST** - Types, functions, statements and expressions built with consuming builders
//! - **Deterministic rendering** - Identical input always renders byte-identical files
//! - **Cross-reference checking** - Every relationship, subtype and endpoint reference is resolved before emission
//! - **Generation flags** - Persistence naming, concurrency and reactive styles per run
//!
//! ## Quick Start
//!
//! ```ignore
//! use ironmeta::prelude::*;
//! use std::path::Path;
//!
//! let config = GenerationConfig::new().module_name("Library");
//! let files = generate_from_file(Path::new("descriptions.xml"), &config)?;
//! write_generated(Path::new("Generated"), &files)?;
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`] - Target AST, expression algebra and renderer
//! - [`schema`] - Description model, XML loader and validation
//! - [`codegen`] - Swift translators and the generation driver

pub mod prelude;

/// Target AST, expression algebra and renderer.
pub mod core {
    pub use ironmeta_core::*;
}

/// Description model, XML loader and validation.
pub mod schema {
    pub use ironmeta_schema::*;
}

/// Swift translators and the generation driver.
pub mod codegen {
    pub use ironmeta_codegen::*;
}

// Re-export commonly used items at the crate root
pub use ironmeta_codegen::{
    CodegenError, GeneratedFile, GenerationConfig, Generator, generate_from_file,
    generate_from_xml, write_generated,
};
pub use ironmeta_core::{File, render_file};
pub use ironmeta_schema::{Descriptions, parse_descriptions, validate_descriptions};
