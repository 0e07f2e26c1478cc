//! Persistence migration test generation.
//!
//! Emits one test per released schema version older than the app version.
//! Each test migrates a store created by that version and reads back every
//! persisted entity.

use std::cmp::Ordering;

use ironmeta_core::{
    AccessLevel, File, Function, FunctionParameter, Node, Property, Reference, Tuple, Type,
    TypeIdentifier, TypeKind, Variable,
};
use ironmeta_schema::Descriptions;

use super::source_file;
use super::types::entity_type;
use crate::config::GenerationConfig;
use crate::error::CodegenError;

/// Name of the generated test case.
pub const MIGRATION_TESTS_TYPE: &str = "CoreDataMigrationTests";

/// Generator for persistence migration tests.
pub struct MigrationGenerator<'a> {
    descriptions: &'a Descriptions,
    config: &'a GenerationConfig,
}

impl<'a> MigrationGenerator<'a> {
    /// Creates a new migration test generator.
    #[must_use]
    pub fn new(descriptions: &'a Descriptions, config: &'a GenerationConfig) -> Self {
        Self {
            descriptions,
            config,
        }
    }

    /// Returns the released versions to migrate from, in history order.
    ///
    /// # Errors
    /// Returns `CodegenError::Generation` if a version is not dotted numeric.
    pub fn tested_versions(&self) -> Result<Vec<&'a str>, CodegenError> {
        let app_version = self
            .config
            .app_version
            .as_deref()
            .unwrap_or(&self.descriptions.version);
        let current = parse_version(app_version)?;

        let mut versions = Vec::new();
        for version in &self.descriptions.version_history {
            if compare(&parse_version(version)?, &current) == Ordering::Less {
                versions.push(version.as_str());
            } else {
                tracing::warn!(
                    "Skipping migration test from {version}: not older than app version {app_version}"
                );
            }
        }
        Ok(versions)
    }

    /// Generates `CoreDataMigrationTests.swift`, or `None` when nothing is
    /// persisted.
    ///
    /// # Errors
    /// Returns `CodegenError::Generation` if a version is not dotted numeric.
    pub fn generate(&self) -> Result<Option<File>, CodegenError> {
        if self.descriptions.persisted_entities().next().is_none() {
            return Ok(None);
        }
        let versions = self.tested_versions()?;
        tracing::debug!("Emitting {} migration tests", versions.len());

        let mut tests = Type::new(TypeIdentifier::named(MIGRATION_TESTS_TYPE), TypeKind::FINAL_CLASS)
            .adding_inherited_type(TypeIdentifier::named("XCTestCase"));
        for version in versions {
            tests = tests
                .adding_member(Node::EmptyLine)
                .adding_member(
                    Function::named(format!(
                        "test_migration_from_{}_should_succeed",
                        version.replace('.', "_")
                    ))
                    .with_throws(true)
                    .adding_statement(Reference::try_expr(
                        Reference::named("runMigrationTest")
                            .call(Tuple::new().adding_named("for", Reference::string(version))),
                    )),
                );
        }
        let tests = tests
            .adding_member(Node::EmptyLine)
            .adding_member(self.run_migration_test());

        Ok(Some(
            source_file(MIGRATION_TESTS_TYPE)
                .adding_import("CoreData")
                .adding_import("XCTest")
                .adding_testable_import(&self.config.module_name)
                .adding(tests),
        ))
    }

    fn run_migration_test(&self) -> Function {
        let manager = Reference::named("coreDataManager");
        let mut function = Function::named("runMigrationTest")
            .with_access_level(AccessLevel::Private)
            .with_throws(true)
            .adding_parameter(FunctionParameter::new("version", TypeIdentifier::string()).with_alias("for"))
            .adding_statement(
                Property::new(Variable::new("coreDataManager")).with_value(Reference::try_expr(
                    TypeIdentifier::named("CoreDataManager")
                        .reference()
                        .member("migrated")
                        .call(
                            Tuple::new()
                                .adding_named("from", Reference::named("version"))
                                .adding_named(
                                    "modelName",
                                    Reference::string(self.config.module_name.clone()),
                                ),
                        ),
                )),
            );
        for entity in self.descriptions.persisted_entities() {
            let mut arguments = Tuple::new()
                .adding_unnamed(entity_type(&entity.name).metatype().reference())
                .adding_named("from", manager.clone());
            if let Some(previous) = &entity.legacy_previous_name {
                arguments = arguments.adding_named("legacyName", Reference::string(previous.clone()));
            }
            function = function.adding_statement(Reference::try_expr(
                Reference::named("assertCanRead").call(arguments),
            ));
        }
        function
    }
}

fn parse_version(version: &str) -> Result<Vec<u64>, CodegenError> {
    version
        .split('.')
        .map(|part| {
            part.parse().map_err(|_| {
                CodegenError::generation(format!("invalid version '{version}': expected dotted numbers"))
            })
        })
        .collect()
}

/// Compares versions component-wise, missing components counting as zero.
fn compare(lhs: &[u64], rhs: &[u64]) -> Ordering {
    let len = lhs.len().max(rhs.len());
    (0..len)
        .map(|i| {
            let a = lhs.get(i).copied().unwrap_or(0);
            let b = rhs.get(i).copied().unwrap_or(0);
            a.cmp(&b)
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironmeta_core::render_file;
    use ironmeta_schema::parse_descriptions;

    const XML: &str = r#"<descriptions version="2.0.0">
        <versions>
            <version name="1.0.0"/>
            <version name="1.10"/>
            <version name="2.0.0"/>
        </versions>
        <entities>
            <entity name="item" persist="true"/>
            <entity name="movie" persist="true" legacyPreviousName="film"/>
            <entity name="tag"/>
        </entities>
    </descriptions>"#;

    #[test]
    fn test_versions_below_app_version() {
        let descriptions = parse_descriptions(XML).expect("Failed to parse");
        let config = GenerationConfig::default();
        let generator = MigrationGenerator::new(&descriptions, &config);
        assert_eq!(generator.tested_versions().expect("valid versions"), vec!["1.0.0", "1.10"]);

        let config = GenerationConfig::new().app_version("1.2");
        let generator = MigrationGenerator::new(&descriptions, &config);
        assert_eq!(generator.tested_versions().expect("valid versions"), vec!["1.0.0"]);
    }

    #[test]
    fn test_migration_tests() {
        let descriptions = parse_descriptions(XML).expect("Failed to parse");
        let config = GenerationConfig::new().module_name("Library");
        let file = MigrationGenerator::new(&descriptions, &config)
            .generate()
            .expect("Failed to generate")
            .expect("entities are persisted");
        let output = render_file(&file);
        assert!(output.contains("import XCTest"));
        assert!(output.contains("@testable import Library"));
        assert!(output.contains("final class CoreDataMigrationTests: XCTestCase {"));
        assert!(output.contains(
            "func test_migration_from_1_0_0_should_succeed() throws {\n        try runMigrationTest(for: \"1.0.0\")\n    }"
        ));
        assert!(output.contains("func test_migration_from_1_10_should_succeed() throws {"));
        assert!(!output.contains("test_migration_from_2_0_0"));
        assert!(output.contains(
            "let coreDataManager = try CoreDataManager.migrated(from: version, modelName: \"Library\")"
        ));
        assert!(output.contains("try assertCanRead(Item.self, from: coreDataManager)"));
        assert!(output.contains(
            "try assertCanRead(Movie.self, from: coreDataManager, legacyName: \"film\")"
        ));
        assert!(!output.contains("Tag.self"));
    }

    #[test]
    fn test_nothing_persisted() {
        let descriptions = parse_descriptions(
            r#"<descriptions version="1.0.0"><entities><entity name="tag"/></entities></descriptions>"#,
        )
        .expect("Failed to parse");
        let config = GenerationConfig::default();
        let file = MigrationGenerator::new(&descriptions, &config)
            .generate()
            .expect("Failed to generate");
        assert!(file.is_none());
    }

    #[test]
    fn test_invalid_version() {
        let descriptions = parse_descriptions(XML).expect("Failed to parse");
        let config = GenerationConfig::new().app_version("next");
        let err = MigrationGenerator::new(&descriptions, &config)
            .tested_versions()
            .expect_err("not numeric");
        assert!(err.to_string().contains("invalid version 'next'"));
    }

    #[test]
    fn test_version_ordering() {
        assert_eq!(compare(&[1, 10], &[1, 2]), Ordering::Greater);
        assert_eq!(compare(&[2], &[2, 0, 0]), Ordering::Equal);
    }
}
