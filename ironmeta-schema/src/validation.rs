//! Description validation utilities.
//!
//! This module checks a [`Descriptions`] set for internal consistency before
//! generation: unique names, resolvable cross references, and subtypes that
//! can actually be emitted.
//!
//! Identifier equivalence chains (`a` equivalent to `b`, `b` to `c`) are
//! accepted here; generators only ever follow a single hop.

use std::collections::HashSet;

use crate::descriptions::Descriptions;
use crate::entities::{Entity, PropertyType};
use crate::error::SchemaError;
use crate::naming::camel_case;
use crate::types::{DefaultValue, Subtype, SubtypeItems, SubtypePropertyType};

/// Validates a description set for correctness.
///
/// # Arguments
/// * `descriptions` - The descriptions to validate
///
/// # Returns
/// Ok(()) if valid, or SchemaError describing the first issue found.
///
/// # Errors
/// Returns `SchemaError` if validation fails.
pub fn validate_descriptions(descriptions: &Descriptions) -> Result<(), SchemaError> {
    validate_unique_names(descriptions)?;
    for subtype in &descriptions.subtypes {
        validate_subtype(descriptions, subtype)?;
    }
    for entity in &descriptions.entities {
        validate_entity(descriptions, entity)?;
    }
    validate_endpoints(descriptions)?;
    Ok(())
}

/// Rejects entities, subtypes or endpoints sharing a name.
fn validate_unique_names(descriptions: &Descriptions) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for entity in &descriptions.entities {
        if !seen.insert(entity.name.as_str()) {
            return Err(SchemaError::Duplicate {
                kind: "entity",
                name: entity.name.clone(),
            });
        }
    }

    let mut seen = HashSet::new();
    for subtype in &descriptions.subtypes {
        if !seen.insert(subtype.name.as_str()) {
            return Err(SchemaError::Duplicate {
                kind: "subtype",
                name: subtype.name.clone(),
            });
        }
    }

    let mut seen = HashSet::new();
    for endpoint in &descriptions.endpoints {
        if !seen.insert(endpoint.name.as_str()) {
            return Err(SchemaError::Duplicate {
                kind: "endpoint",
                name: endpoint.name.clone(),
            });
        }
    }

    Ok(())
}

/// Validates a subtype definition.
fn validate_subtype(descriptions: &Descriptions, subtype: &Subtype) -> Result<(), SchemaError> {
    match &subtype.items {
        SubtypeItems::Cases(cases) => {
            if cases.iter().all(|case| case.unused) {
                return Err(SchemaError::NoUsedCases {
                    subtype: subtype.name.clone(),
                });
            }
            let mut seen = HashSet::new();
            for case in cases {
                if !seen.insert(case.name.as_str()) {
                    return Err(SchemaError::Validation {
                        message: format!(
                            "Duplicate case '{}' in subtype '{}'",
                            case.name, subtype.name
                        ),
                    });
                }
            }
        }
        SubtypeItems::Options(options) => {
            if options.len() > 64 {
                return Err(SchemaError::Validation {
                    message: format!(
                        "Option set '{}' declares {} options, maximum is 64",
                        subtype.name,
                        options.len()
                    ),
                });
            }
        }
        SubtypeItems::Properties(properties) => {
            for property in properties {
                if let SubtypePropertyType::Subtype(name) = &property.property_type {
                    descriptions.subtype(name, &format!("{}.{}", subtype.name, property.name))?;
                }
            }
        }
    }
    Ok(())
}

/// Member names the generated entity type owns.
const RESERVED_PROPERTY_NAMES: &[&str] = &["identifier"];

/// Validates an entity's identifier and properties.
fn validate_entity(descriptions: &Descriptions, entity: &Entity) -> Result<(), SchemaError> {
    if entity.identifier.equivalent_identifier_name.as_deref() == Some(entity.name.as_str()) {
        return Err(SchemaError::SelfEquivalence {
            entity: entity.name.clone(),
        });
    }
    descriptions.equivalent_entity(entity)?;
    descriptions.identifier_contributors(entity)?;

    for property in &entity.properties {
        if RESERVED_PROPERTY_NAMES.contains(&camel_case(&property.name).as_str()) {
            return Err(SchemaError::ReservedProperty {
                entity: entity.name.clone(),
                property: property.name.clone(),
            });
        }
        let source = format!("{}.{}", entity.name, property.name);
        match &property.property_type {
            PropertyType::Scalar(_) => {}
            PropertyType::Subtype(name) => {
                let subtype = descriptions.subtype(name, &source)?;
                if let (Some(DefaultValue::Case(case)), SubtypeItems::Cases(cases)) =
                    (&property.default_value, &subtype.items)
                    && !cases.iter().any(|c| &c.name == case && !c.unused)
                {
                    return Err(SchemaError::Validation {
                        message: format!(
                            "Default value '{case}' of '{source}' is not a used case of '{name}'"
                        ),
                    });
                }
            }
            PropertyType::Relationship(relationship) => {
                descriptions.entity(&relationship.entity_name, &source)?;
            }
        }
    }

    Ok(())
}

/// Validates endpoint payload references.
fn validate_endpoints(descriptions: &Descriptions) -> Result<(), SchemaError> {
    for endpoint in &descriptions.endpoints {
        if let Some(payload) = &endpoint.read_payload {
            descriptions.entity(
                &payload.entity.entity_name,
                &format!("{}.read", endpoint.name),
            )?;
        }
        if let Some(payload) = &endpoint.write_payload {
            descriptions.entity(
                &payload.entity.entity_name,
                &format!("{}.write", endpoint.name),
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_descriptions;

    fn parse(xml: &str) -> Descriptions {
        parse_descriptions(xml).expect("Failed to parse")
    }

    #[test]
    fn test_valid_descriptions() {
        let descriptions = parse(
            r#"<descriptions version="1.0.0">
            <subtypes>
                <subtype name="genre"><case name="fiction"/></subtype>
            </subtypes>
            <entities>
                <entity name="tag"/>
                <entity name="item">
                    <property name="genre" subtype="genre" default="fiction"/>
                    <property name="tags" relationship="tag" association="toMany"/>
                </entity>
            </entities>
        </descriptions>"#,
        );
        assert!(validate_descriptions(&descriptions).is_ok());
    }

    #[test]
    fn test_unknown_relationship_target() {
        let descriptions = parse(
            r#"<descriptions version="1.0.0"><entities>
                <entity name="item">
                    <property name="owner" relationship="user"/>
                </entity>
            </entities></descriptions>"#,
        );
        let err = validate_descriptions(&descriptions).expect_err("user is not declared");
        match err {
            SchemaError::NotFound {
                kind,
                name,
                referenced_by,
            } => {
                assert_eq!(kind, "entity");
                assert_eq!(name, "user");
                assert_eq!(referenced_by, "item.owner");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_enum_without_used_cases() {
        let descriptions = parse(
            r#"<descriptions version="1.0.0"><subtypes>
                <subtype name="genre"><case name="poetry" unused="true"/></subtype>
            </subtypes></descriptions>"#,
        );
        let err = validate_descriptions(&descriptions).expect_err("no used case");
        assert!(matches!(err, SchemaError::NoUsedCases { subtype } if subtype == "genre"));
    }

    #[test]
    fn test_self_equivalence() {
        let descriptions = parse(
            r#"<descriptions version="1.0.0"><entities>
                <entity name="item"><identifier type="int" equivalent="item"/></entity>
            </entities></descriptions>"#,
        );
        let err = validate_descriptions(&descriptions).expect_err("self equivalence");
        assert!(matches!(err, SchemaError::SelfEquivalence { .. }));
    }

    #[test]
    fn test_equivalence_chains_are_accepted() {
        let descriptions = parse(
            r#"<descriptions version="1.0.0"><entities>
                <entity name="a"><identifier type="int" equivalent="b"/></entity>
                <entity name="b"><identifier type="int" equivalent="c"/></entity>
                <entity name="c"/>
            </entities></descriptions>"#,
        );
        assert!(validate_descriptions(&descriptions).is_ok());
    }

    #[test]
    fn test_default_must_be_a_used_case() {
        let descriptions = parse(
            r#"<descriptions version="1.0.0">
            <subtypes>
                <subtype name="genre">
                    <case name="fiction"/>
                    <case name="poetry" unused="true"/>
                </subtype>
            </subtypes>
            <entities>
                <entity name="item"><property name="genre" subtype="genre" default="poetry"/></entity>
            </entities>
        </descriptions>"#,
        );
        let err = validate_descriptions(&descriptions).expect_err("retired default");
        assert!(matches!(err, SchemaError::Validation { .. }));
    }

    #[test]
    fn test_identifier_property_is_reserved() {
        let descriptions = parse(
            r#"<descriptions version="1.0.0"><entities>
                <entity name="item"><property name="identifier" type="string"/></entity>
            </entities></descriptions>"#,
        );
        let err = validate_descriptions(&descriptions).expect_err("identifier is reserved");
        match &err {
            SchemaError::ReservedProperty { entity, property } => {
                assert_eq!(entity, "item");
                assert_eq!(property, "identifier");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("'item'"));
    }

    #[test]
    fn test_unknown_endpoint_entity() {
        let descriptions = parse(
            r#"<descriptions version="1.0.0"><endpoints>
                <endpoint name="items"><read entity="item"/></endpoint>
            </endpoints></descriptions>"#,
        );
        let err = validate_descriptions(&descriptions).expect_err("item is not declared");
        assert!(err.to_string().contains("items.read"));
    }
}
