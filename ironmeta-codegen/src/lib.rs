//! # IronMeta Codegen
//!
//! Swift data-access layer generation from IronMeta descriptions.
//!
//! This crate provides:
//! - Entity, identifier, payload and subtype generation
//! - CoreData persistence bindings
//! - Endpoint payload decoding
//! - Container, entity graph and response handler wiring
//! - Test factories and migration tests

pub mod config;
pub mod error;
pub mod generator;
pub mod swift;

use std::path::Path;

pub use config::{ConcurrencyStyle, GenerationConfig, PersistenceNaming, SignalStyle};
pub use error::CodegenError;
pub use generator::{GeneratedFile, Generator};

/// Generates Swift sources from a description XML string.
///
/// # Arguments
/// * `xml` - Description XML content
/// * `config` - Generation flags
///
/// # Returns
/// Generated files in output order.
///
/// # Errors
/// Returns `CodegenError` if parsing, validation, or generation fails.
pub fn generate_from_xml(
    xml: &str,
    config: &GenerationConfig,
) -> Result<Vec<GeneratedFile>, CodegenError> {
    let descriptions = ironmeta_schema::parse_descriptions(xml)?;
    ironmeta_schema::validate_descriptions(&descriptions)?;
    Generator::new(&descriptions, config).generate()
}

/// Generates Swift sources from a description XML file.
///
/// # Arguments
/// * `path` - Path to the description XML file
/// * `config` - Generation flags
///
/// # Returns
/// Generated files in output order.
///
/// # Errors
/// Returns `CodegenError` if reading, parsing, validation, or generation fails.
pub fn generate_from_file(
    path: &Path,
    config: &GenerationConfig,
) -> Result<Vec<GeneratedFile>, CodegenError> {
    tracing::debug!("Reading descriptions from {}", path.display());
    let xml = std::fs::read_to_string(path)?;
    generate_from_xml(&xml, config)
}

/// Writes generated files below `output_dir`, creating directories as
/// needed.
///
/// # Errors
/// Returns `CodegenError::Io` if a directory or file cannot be written.
pub fn write_generated(output_dir: &Path, files: &[GeneratedFile]) -> Result<(), CodegenError> {
    for generated in files {
        let path = output_dir.join(&generated.path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, generated.render())?;
    }
    tracing::info!("Wrote {} files to {}", files.len(), output_dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const XML: &str = r#"<descriptions version="1.0.0">
        <entities>
            <entity name="item">
                <property name="title" type="string"/>
            </entity>
        </entities>
    </descriptions>"#;

    #[test]
    fn test_generate_from_xml() {
        let files = generate_from_xml(XML, &GenerationConfig::default()).expect("Failed to generate");
        let entity = files
            .iter()
            .find(|f| f.path == Path::new("Entities/Item.swift"))
            .expect("entity file");
        assert!(entity.render().contains("public final class Item: Entity {"));
    }

    #[test]
    fn test_validation_runs_before_generation() {
        let xml = r#"<descriptions version="1.0.0"><entities>
            <entity name="item"><property name="owner" relationship="user"/></entity>
        </entities></descriptions>"#;
        let err = generate_from_xml(xml, &GenerationConfig::default()).expect_err("user is missing");
        assert!(matches!(err, CodegenError::Schema(_)));
    }

    #[test]
    fn test_identifier_property_is_rejected() {
        let xml = r#"<descriptions version="1.0.0"><entities>
            <entity name="item"><property name="identifier" type="string"/></entity>
        </entities></descriptions>"#;
        let err = generate_from_xml(xml, &GenerationConfig::default())
            .expect_err("identifier is generated for every entity");
        assert!(matches!(err, CodegenError::Schema(_)));
        assert!(err.to_string().contains("'item'"));
    }

    #[test]
    fn test_invalid_xml() {
        let xml = r#"<descriptions version="1.0.0"><entities></descriptions>"#;
        let err = generate_from_xml(xml, &GenerationConfig::default()).expect_err("malformed");
        assert!(matches!(err, CodegenError::Parse(_)));
    }

    #[test]
    fn test_generate_from_file_and_write() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let input = dir.path().join("descriptions.xml");
        std::fs::write(&input, XML).expect("Failed to write descriptions");

        let files = generate_from_file(&input, &GenerationConfig::default())
            .expect("Failed to generate");
        let output = dir.path().join("Generated");
        write_generated(&output, &files).expect("Failed to write");

        let written = std::fs::read_to_string(output.join("Entities/Item.swift"))
            .expect("entity file written");
        assert!(written.starts_with("// Item.swift\n"));
        assert!(output.join("Support/EntityGraph.swift").exists());
    }

    #[test]
    fn test_missing_file() {
        let err = generate_from_file(
            Path::new("/nonexistent/descriptions.xml"),
            &GenerationConfig::default(),
        )
        .expect_err("missing file");
        assert!(matches!(err, CodegenError::Io(_)));
    }
}
