//! Test factory generation.
//!
//! `ItemFactory.make(...)` builds an entity with every stored member
//! defaulted, so tests only spell out the members they care about.

use ironmeta_core::{
    AccessLevel, File, Function, FunctionParameter, Node, Reference, Tuple, Type, TypeIdentifier,
    TypeKind,
};
use ironmeta_schema::naming::pascal_case;
use ironmeta_schema::{
    Descriptions, Entity, EntityProperty, IdentifierValueType, PropertyType, ScalarType, Subtype,
    SubtypeItems, SubtypePropertyType,
};

use super::source_file;
use super::types::{
    entity_type, first_used_case, identifier_type, property_default, property_type,
    subtype_member_type, subtype_type, variable_name,
};
use crate::error::CodegenError;

/// Value structs nested deeper than this are rejected.
const MAX_SUBTYPE_DEPTH: usize = 8;

/// Generator for per-entity test factories.
pub struct FactoryGenerator<'a> {
    descriptions: &'a Descriptions,
    module_name: &'a str,
}

impl<'a> FactoryGenerator<'a> {
    /// Creates a new factory generator for sources in `module_name`.
    #[must_use]
    pub fn new(descriptions: &'a Descriptions, module_name: &'a str) -> Self {
        Self {
            descriptions,
            module_name,
        }
    }

    /// Generates one factory file per entity, in declared order.
    ///
    /// # Errors
    /// Returns `CodegenError` if a property references a missing entity or
    /// subtype, or if a value struct has no finite default.
    pub fn generate(&self) -> Result<Vec<File>, CodegenError> {
        self.descriptions
            .entities
            .iter()
            .map(|entity| self.generate_entity(entity))
            .collect()
    }

    /// Generates `<Entity>Factory.swift`.
    ///
    /// # Errors
    /// Returns `CodegenError` if a property references a missing entity or
    /// subtype, or if a value struct has no finite default.
    pub fn generate_entity(&self, entity: &Entity) -> Result<File, CodegenError> {
        let ty = entity_type(&entity.name);
        let mut make = Function::named("make")
            .with_access_level(AccessLevel::Public)
            .with_static(true)
            .with_result_type(ty.clone());
        let mut arguments = Tuple::new();

        if !entity.has_void_identifier() {
            make = make.adding_parameter(
                FunctionParameter::new("identifier", identifier_type(entity))
                    .with_default_value(identifier_value(entity)),
            );
            arguments = arguments.adding_named("identifier", Reference::named("identifier"));
        }
        for property in entity.stored_properties() {
            let name = variable_name(&property.name);
            make = make.adding_parameter(
                FunctionParameter::new(
                    name.clone(),
                    property_type(self.descriptions, entity, property)?,
                )
                .with_default_value(self.property_value(entity, property)?),
            );
            arguments = arguments.adding_named(name.clone(), Reference::named(name));
        }

        let factory_name = format!("{}Factory", pascal_case(&entity.name));
        tracing::debug!("Emitting {factory_name}");
        let factory = Type::new(TypeIdentifier::named(factory_name.clone()), TypeKind::ENUM)
            .with_access_level(AccessLevel::Public)
            .adding_member(make.adding_statement(Node::return_value(ty.reference().call(arguments))));

        Ok(source_file(&factory_name)
            .adding_testable_import(self.module_name)
            .adding(factory))
    }

    fn property_value(
        &self,
        entity: &Entity,
        property: &EntityProperty,
    ) -> Result<Reference, CodegenError> {
        if property.lazy {
            return Ok(Reference::dot("unrequested"));
        }
        if let Some(default) = property_default(property)
            && !default.is_none()
        {
            return Ok(default);
        }
        if property.optional {
            return Ok(Reference::none());
        }
        if property.is_collection() {
            return Ok(empty_sequence());
        }
        match &property.property_type {
            PropertyType::Scalar(scalar) => Ok(scalar_value(*scalar, &property.name)),
            PropertyType::Subtype(name) => {
                let source = format!("{}.{}", entity.name, property.name);
                let subtype = self.descriptions.subtype(name, &source)?;
                self.subtype_value(subtype, 0)
            }
            PropertyType::Relationship(relationship) => {
                let target =
                    self.descriptions
                        .relationship_target(entity, &property.name, relationship)?;
                Ok(identifier_value(target))
            }
        }
    }

    fn subtype_value(&self, subtype: &Subtype, depth: usize) -> Result<Reference, CodegenError> {
        match &subtype.items {
            SubtypeItems::Cases(_) => first_used_case(subtype),
            SubtypeItems::Options(_) => Ok(Reference::array([])),
            SubtypeItems::Properties(members) => {
                if depth >= MAX_SUBTYPE_DEPTH {
                    return Err(CodegenError::shape_mismatch(
                        &subtype.name,
                        "value struct nesting has no finite default",
                    ));
                }
                let mut arguments = Tuple::new();
                for member in members {
                    // Resolves the member type so a missing subtype is reported here.
                    subtype_member_type(self.descriptions, subtype, member)?;
                    let value = if member.optional {
                        Reference::none()
                    } else if member.is_array {
                        empty_sequence()
                    } else {
                        match &member.property_type {
                            SubtypePropertyType::Scalar(scalar) => scalar_value(*scalar, &member.name),
                            SubtypePropertyType::Subtype(name) => {
                                let source = format!("{}.{}", subtype.name, member.name);
                                let nested = self.descriptions.subtype(name, &source)?;
                                self.subtype_value(nested, depth + 1)?
                            }
                        }
                    };
                    arguments = arguments.adding_named(variable_name(&member.name), value);
                }
                Ok(subtype_type(&subtype.name).reference().call(arguments))
            }
        }
    }
}

/// `ItemIdentifier(value: .remote(42, nil))`, or `VoidEntityIdentifier()`.
fn identifier_value(entity: &Entity) -> Reference {
    let ty = identifier_type(entity);
    let remote = match entity.identifier.value_type() {
        Some(IdentifierValueType::Int) => Reference::int(42),
        Some(IdentifierValueType::String) => Reference::string("42"),
        None => return ty.reference().call_empty(),
    };
    ty.reference().call(Tuple::new().adding_named(
        "value",
        Reference::dot("remote").call(Tuple::new().adding_unnamed(remote).adding_unnamed(Reference::nil())),
    ))
}

/// `AnySequence([])`
fn empty_sequence() -> Reference {
    TypeIdentifier::named("AnySequence")
        .reference()
        .call(Tuple::new().adding_unnamed(Reference::array([])))
}

fn scalar_value(scalar: ScalarType, name: &str) -> Reference {
    match scalar {
        ScalarType::String => Reference::string(name),
        ScalarType::Int => Reference::int(42),
        ScalarType::Date => TypeIdentifier::date()
            .reference()
            .call(Tuple::new().adding_named("timeIntervalSince1970", Reference::int(1000))),
        ScalarType::Double | ScalarType::Float | ScalarType::Seconds | ScalarType::Milliseconds => {
            Reference::float(4.2)
        }
        ScalarType::Bool => Reference::bool(false),
        ScalarType::Url => TypeIdentifier::url()
            .reference()
            .call(Tuple::new().adding_named("string", Reference::string("https://github.com")))
            .force_unwrapped(),
        ScalarType::Color => TypeIdentifier::named("Color")
            .reference()
            .call(Tuple::new().adding_named("hex", Reference::string("#000000"))),
    }
}
