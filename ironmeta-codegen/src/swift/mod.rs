//! Swift code generation modules.
//!
//! Each translator reads the description set and the generation flags and
//! returns one or more [`File`] forests. Translators never share state.

pub mod container;
pub mod endpoint;
pub mod entity;
pub mod factory;
pub mod graph;
pub mod identifier;
pub mod migration;
pub mod payload;
pub mod persistence;
pub mod response_handler;
pub mod subtype;
pub mod types;

pub use container::ContainerGenerator;
pub use endpoint::EndpointGenerator;
pub use entity::EntityGenerator;
pub use factory::FactoryGenerator;
pub use graph::GraphGenerator;
pub use identifier::IdentifierGenerator;
pub use migration::MigrationGenerator;
pub use payload::PayloadGenerator;
pub use persistence::PersistenceGenerator;
pub use response_handler::ResponseHandlerGenerator;
pub use subtype::SubtypeGenerator;

use ironmeta_core::{Comment, File};

/// Module providing the runtime types generated code builds on.
pub const RUNTIME_MODULE: &str = "Lucid";

/// Creates `<name>.swift` with the generated-file header and base imports.
#[must_use]
pub fn source_file(name: &str) -> File {
    File::new(format!("{name}.swift"))
        .adding_header(Comment::line(format!("{name}.swift")))
        .adding_header(Comment::line("Generated by IronMeta. Do not edit."))
        .adding_import("Foundation")
        .adding_import(RUNTIME_MODULE)
}
