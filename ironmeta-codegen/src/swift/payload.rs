//! Remote payload generation.
//!
//! Every remote entity gets a `Default<Entity>Payload` struct decoded from
//! the wire format. Embedded relationships decode their target's payload
//! type; id-only relationships decode identifiers.

use ironmeta_core::{
    AccessLevel, Assignment, Case, File, Function, FunctionParameter, Node, Property, Reference,
    Tuple, Type, TypeIdentifier, TypeKind, Variable,
};
use ironmeta_schema::{Descriptions, Entity, EntityProperty};

use super::source_file;
use super::types::{
    element_type, identifier_type, identifier_value_type, payload_type, property_default,
    variable_name,
};
use crate::error::CodegenError;

/// Generator for entity payload structs.
pub struct PayloadGenerator<'a> {
    descriptions: &'a Descriptions,
}

impl<'a> PayloadGenerator<'a> {
    /// Creates a new payload generator.
    #[must_use]
    pub fn new(descriptions: &'a Descriptions) -> Self {
        Self { descriptions }
    }

    /// Generates one payload file per remote entity.
    ///
    /// # Errors
    /// Returns `CodegenError` if a property cannot be resolved.
    pub fn generate(&self) -> Result<Vec<File>, CodegenError> {
        self.descriptions
            .entities
            .iter()
            .filter(|entity| entity.remote)
            .map(|entity| self.generate_entity(entity))
            .collect()
    }

    /// Generates the payload file of one entity.
    ///
    /// # Errors
    /// Returns `CodegenError::Schema` if a referenced entity or subtype is
    /// missing, or `CodegenError::ShapeMismatch` if an embedded relationship
    /// targets an entity without a payload.
    pub fn generate_entity(&self, entity: &Entity) -> Result<File, CodegenError> {
        let ty = payload_type(&entity.name);
        let mut payload = Type::new(ty.clone(), TypeKind::Struct)
            .with_access_level(AccessLevel::Public)
            .adding_inherited_type(TypeIdentifier::named("Decodable"));

        let mut keys = Vec::new();
        let mut decoding = Function::init()
            .with_access_level(AccessLevel::Public)
            .adding_parameter(
                FunctionParameter::new("decoder", TypeIdentifier::named("Decoder")).with_alias("from"),
            )
            .with_throws(true)
            .adding_statement(
                Property::new(Variable::new("container")).with_value(Reference::try_expr(
                    Reference::named("decoder").member("container").call(
                        Tuple::new().adding_named(
                            "keyedBy",
                            TypeIdentifier::named("Keys").metatype().reference(),
                        ),
                    ),
                )),
            );

        if let Some(remote) = entity.identifier.value_type() {
            let identifier = identifier_type(entity);
            payload = payload.adding_member(
                Property::new(Variable::new("identifier").with_type(identifier.clone()))
                    .with_access_level(AccessLevel::Public),
            );
            keys.push(("identifier".to_string(), entity.identifier.key.clone()));
            let value = decode_call("decode", identifier_value_type(remote), "identifier");
            decoding = decoding.adding_statement(Assignment::new(
                Reference::named("identifier"),
                Reference::try_expr(identifier.reference().call(Tuple::new().adding_named(
                    "value",
                    Reference::dot("remote").call(
                        Tuple::new()
                            .adding_unnamed(value)
                            .adding_unnamed(Reference::nil()),
                    ),
                ))),
            ));
        }

        for property in entity.stored_properties() {
            let name = variable_name(&property.name);
            let field = self.field_type(entity, property)?;
            let declared = if property.lazy {
                TypeIdentifier::lazy(field.clone())
            } else {
                field.clone()
            };
            payload = payload.adding_member(
                Property::new(Variable::new(name.clone()).with_type(declared))
                    .with_access_level(AccessLevel::Public),
            );
            keys.push((name.clone(), property.key.clone()));
            decoding = decoding.adding_statement(Assignment::new(
                Reference::named(name.clone()),
                decode_value(property, field, &name),
            ));
        }

        let payload = payload
            .adding_member(Node::EmptyLine)
            .adding_member(coding_keys(keys))
            .adding_member(Node::EmptyLine)
            .adding_member(decoding);

        Ok(source_file(&ty.name).adding(payload))
    }

    /// Returns the decoded type of a property, optional wrapping included and
    /// lazy wrapping excluded.
    fn field_type(&self, entity: &Entity, property: &EntityProperty) -> Result<TypeIdentifier, CodegenError> {
        let element = match property.relationship_type() {
            Some(relationship) if !relationship.id_only => {
                let target =
                    self.descriptions
                        .relationship_target(entity, &property.name, relationship)?;
                if !target.remote {
                    return Err(CodegenError::shape_mismatch(
                        format!("{}.{}", entity.name, property.name),
                        format!("embeds '{}' which has no remote payload", target.name),
                    ));
                }
                payload_type(&target.name)
            }
            _ => element_type(self.descriptions, entity, property)?,
        };
        let element = if property.is_collection() {
            TypeIdentifier::any_sequence(element)
        } else {
            element
        };
        Ok(element.optional_if(property.optional))
    }
}

fn decode_call(method: &str, ty: TypeIdentifier, key: &str) -> Reference {
    Reference::named("container").member(method).call(
        Tuple::new()
            .adding_unnamed(ty.metatype().reference())
            .adding_named("forKey", Reference::dot(key)),
    )
}

/// Chooses the decoding call for a property:
/// - lazy values use `decodeLazy`
/// - values with a non-nil default fall back to it when the key is absent
/// - other optional values use `decodeIfPresent`
fn decode_value(property: &EntityProperty, field: TypeIdentifier, key: &str) -> Reference {
    if property.lazy {
        return Reference::try_expr(decode_call("decodeLazy", field, key));
    }
    let default = property_default(property).filter(|value| !value.is_none());
    match default {
        Some(default) => Reference::try_expr(
            decode_call("decodeIfPresent", field.unwrapped(), key).nil_coalescing(default),
        ),
        None if property.optional => {
            Reference::try_expr(decode_call("decodeIfPresent", field.unwrapped(), key))
        }
        None => Reference::try_expr(decode_call("decode", field, key)),
    }
}

/// Builds `private enum Keys: String, CodingKey`, naming a raw value only
/// where the wire key differs from the case name.
pub(super) fn coding_keys(keys: Vec<(String, String)>) -> Type {
    let mut seen = std::collections::HashSet::new();
    Type::new(TypeIdentifier::named("Keys"), TypeKind::ENUM)
        .with_access_level(AccessLevel::Private)
        .adding_inherited_type(TypeIdentifier::string())
        .adding_inherited_type(TypeIdentifier::named("CodingKey"))
        .adding_members(
            keys.into_iter()
                .filter(|(name, _)| seen.insert(name.clone()))
                .map(|(name, key)| {
                    let case = Case::new(name.clone());
                    if name == key {
                        case.into()
                    } else {
                        case.with_raw_value(Reference::string(key)).into()
                    }
                }),
        )
}
