//! Generation driver.
//!
//! Runs every translator over one description set in a fixed order and
//! places each file under its output directory.

use std::path::{Path, PathBuf};

use ironmeta_core::{File, render_file};
use ironmeta_schema::Descriptions;

use crate::config::GenerationConfig;
use crate::error::CodegenError;
use crate::swift::{
    ContainerGenerator, EndpointGenerator, EntityGenerator, FactoryGenerator, GraphGenerator,
    IdentifierGenerator, MigrationGenerator, PayloadGenerator, PersistenceGenerator,
    ResponseHandlerGenerator, SubtypeGenerator,
};

/// A generated file and its path relative to the output root.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedFile {
    /// Relative output path.
    pub path: PathBuf,
    /// File contents.
    pub file: File,
}

impl GeneratedFile {
    fn new(directory: &str, file: File) -> Self {
        Self {
            path: Path::new(directory).join(&file.name),
            file,
        }
    }

    /// Renders the file to source text.
    #[must_use]
    pub fn render(&self) -> String {
        render_file(&self.file)
    }
}

/// Swift sources generator.
pub struct Generator<'a> {
    descriptions: &'a Descriptions,
    config: &'a GenerationConfig,
}

impl<'a> Generator<'a> {
    /// Creates a new generator.
    #[must_use]
    pub fn new(descriptions: &'a Descriptions, config: &'a GenerationConfig) -> Self {
        Self {
            descriptions,
            config,
        }
    }

    /// Generates every file.
    ///
    /// Files are returned in a stable order: subtypes, entities, identifiers,
    /// payloads, persistence, endpoints, support types, then tests.
    ///
    /// # Errors
    /// Returns `CodegenError` if any translator fails.
    pub fn generate(&self) -> Result<Vec<GeneratedFile>, CodegenError> {
        let descriptions = self.descriptions;
        let config = self.config;
        tracing::info!(
            "Generating sources for {} entities, {} subtypes, {} endpoints (version {})",
            descriptions.entities.len(),
            descriptions.subtypes.len(),
            descriptions.endpoints.len(),
            descriptions.version
        );

        let mut files = Vec::new();
        let mut add = |directory: &str, generated: Vec<File>| {
            files.extend(generated.into_iter().map(|file| GeneratedFile::new(directory, file)));
        };

        add("Subtypes", SubtypeGenerator::new(descriptions).generate()?);
        add("Entities", EntityGenerator::new(descriptions).generate()?);
        add("Identifiers", IdentifierGenerator::new(descriptions).generate()?);
        add("Payloads", PayloadGenerator::new(descriptions).generate()?);
        add(
            "Persistence",
            PersistenceGenerator::new(descriptions, config).generate()?,
        );
        add("Endpoints", EndpointGenerator::new(descriptions).generate()?);

        let mut support = vec![
            GraphGenerator::new(descriptions).generate(),
            ContainerGenerator::new(descriptions, config).generate()?,
        ];
        support.extend(ResponseHandlerGenerator::new(descriptions, config).generate()?);
        add("Support", support);

        add(
            "Tests/Factories",
            FactoryGenerator::new(descriptions, &config.module_name).generate()?,
        );
        add(
            "Tests",
            MigrationGenerator::new(descriptions, config)
                .generate()?
                .into_iter()
                .collect(),
        );

        for file in &files {
            tracing::debug!("Generated {}", file.path.display());
        }
        tracing::info!("Generated {} files", files.len());
        Ok(files)
    }
}
