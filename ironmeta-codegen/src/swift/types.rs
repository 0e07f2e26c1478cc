//! Type mapping and naming shared by the Swift translators.
//!
//! Every cross reference that affects an emitted type goes through
//! [`Descriptions`] here, so a missing entity or subtype is reported with the
//! field that referenced it.

use ironmeta_core::{Reference, Tuple, TypeIdentifier};
use ironmeta_schema::naming::{camel_case, pascal_case};
use ironmeta_schema::{
    Association, DefaultValue, Descriptions, Entity, EntityProperty, IdentifierValueType,
    PropertyType, ScalarType, Subtype, SubtypeItems, SubtypePropertyType,
};

use crate::error::CodegenError;

/// Returns the emitted type of an entity.
#[must_use]
pub fn entity_type(entity_name: &str) -> TypeIdentifier {
    TypeIdentifier::named(pascal_case(entity_name))
}

/// Returns the identifier type of an entity, `VoidEntityIdentifier` when it
/// has no identity of its own.
#[must_use]
pub fn identifier_type(entity: &Entity) -> TypeIdentifier {
    if entity.has_void_identifier() {
        TypeIdentifier::named("VoidEntityIdentifier")
    } else {
        identifier_type_named(&entity.name)
    }
}

/// Returns `<Entity>Identifier`.
#[must_use]
pub fn identifier_type_named(entity_name: &str) -> TypeIdentifier {
    TypeIdentifier::named(format!("{}Identifier", pascal_case(entity_name)))
}

/// Returns `Default<Entity>Payload`.
#[must_use]
pub fn payload_type(entity_name: &str) -> TypeIdentifier {
    TypeIdentifier::named(format!("Default{}Payload", pascal_case(entity_name)))
}

/// Returns `Managed<Entity>`, the persisted record class.
#[must_use]
pub fn managed_type(entity_name: &str) -> TypeIdentifier {
    TypeIdentifier::named(format!("Managed{}", pascal_case(entity_name)))
}

/// Returns `<Entity>IndexName`.
#[must_use]
pub fn index_name_type(entity_name: &str) -> TypeIdentifier {
    TypeIdentifier::named(format!("{}IndexName", pascal_case(entity_name)))
}

/// Returns the emitted type of a subtype.
#[must_use]
pub fn subtype_type(subtype_name: &str) -> TypeIdentifier {
    TypeIdentifier::named(pascal_case(subtype_name))
}

/// Returns the emitted name of a property or case.
#[must_use]
pub fn variable_name(name: &str) -> String {
    camel_case(name)
}

/// Returns the emitted type of a scalar.
#[must_use]
pub fn scalar_type(scalar: ScalarType) -> TypeIdentifier {
    match scalar {
        ScalarType::String => TypeIdentifier::string(),
        ScalarType::Int => TypeIdentifier::int(),
        ScalarType::Date => TypeIdentifier::date(),
        ScalarType::Double => TypeIdentifier::double(),
        ScalarType::Float => TypeIdentifier::float(),
        ScalarType::Bool => TypeIdentifier::bool(),
        ScalarType::Url => TypeIdentifier::url(),
        ScalarType::Color => TypeIdentifier::named("Color"),
        ScalarType::Seconds => TypeIdentifier::named("Seconds"),
        ScalarType::Milliseconds => TypeIdentifier::named("Milliseconds"),
    }
}

/// Returns the emitted type of a remote identifier value.
#[must_use]
pub fn identifier_value_type(value_type: IdentifierValueType) -> TypeIdentifier {
    match value_type {
        IdentifierValueType::Int => TypeIdentifier::int(),
        IdentifierValueType::String => TypeIdentifier::string(),
    }
}

/// Returns the element type of a property: the scalar, subtype or related
/// identifier type, before any sequence, optional or lazy wrapping.
///
/// # Errors
/// Returns `CodegenError::Schema` if a referenced subtype or entity does not
/// exist.
pub fn element_type(
    descriptions: &Descriptions,
    entity: &Entity,
    property: &EntityProperty,
) -> Result<TypeIdentifier, CodegenError> {
    let source = format!("{}.{}", entity.name, property.name);
    Ok(match &property.property_type {
        PropertyType::Scalar(scalar) => scalar_type(*scalar),
        PropertyType::Subtype(name) => {
            let subtype = descriptions.subtype(name, &source)?;
            subtype_type(&subtype.name)
        }
        PropertyType::Relationship(relationship) => {
            let target = descriptions.relationship_target(entity, &property.name, relationship)?;
            identifier_type(target)
        }
    })
}

/// Returns the stored value type of a property: the element type, wrapped in
/// `AnySequence` for collections. Optional and lazy wrapping are not applied.
///
/// # Errors
/// Returns `CodegenError::Schema` if a referenced subtype or entity does not
/// exist.
pub fn value_type(
    descriptions: &Descriptions,
    entity: &Entity,
    property: &EntityProperty,
) -> Result<TypeIdentifier, CodegenError> {
    let element = element_type(descriptions, entity, property)?;
    Ok(if property.is_collection() {
        TypeIdentifier::any_sequence(element)
    } else {
        element
    })
}

/// Returns the declared type of an entity property, optional and lazy
/// wrapping included.
///
/// # Errors
/// Returns `CodegenError::Schema` if a referenced subtype or entity does not
/// exist.
pub fn property_type(
    descriptions: &Descriptions,
    entity: &Entity,
    property: &EntityProperty,
) -> Result<TypeIdentifier, CodegenError> {
    let value = value_type(descriptions, entity, property)?.optional_if(property.optional);
    Ok(if property.lazy {
        TypeIdentifier::lazy(value)
    } else {
        value
    })
}

/// Returns the type of a value struct member.
///
/// # Errors
/// Returns `CodegenError::Schema` if a referenced subtype does not exist.
pub fn subtype_member_type(
    descriptions: &Descriptions,
    subtype: &Subtype,
    member: &ironmeta_schema::SubtypeProperty,
) -> Result<TypeIdentifier, CodegenError> {
    let element = match &member.property_type {
        SubtypePropertyType::Scalar(scalar) => scalar_type(*scalar),
        SubtypePropertyType::Subtype(name) => {
            let nested = descriptions.subtype(name, &format!("{}.{}", subtype.name, member.name))?;
            subtype_type(&nested.name)
        }
    };
    let element = if member.is_array {
        TypeIdentifier::any_sequence(element)
    } else {
        element
    };
    Ok(element.optional_if(member.optional))
}

/// Returns the expression of a declared default value, typed for
/// `property_type`. `nil` maps to `.none`.
#[must_use]
pub fn default_value(default: &DefaultValue, property_type: &PropertyType) -> Reference {
    let scalar = match property_type {
        PropertyType::Scalar(scalar) => Some(*scalar),
        _ => None,
    };
    match default {
        DefaultValue::Nil => Reference::none(),
        DefaultValue::Bool(value) => Reference::bool(*value),
        DefaultValue::Int(value) if scalar.is_some_and(|s| s.is_floating_point()) => {
            Reference::float(*value as f64)
        }
        DefaultValue::Int(value) => Reference::int(*value),
        DefaultValue::Float(value) => Reference::float(*value),
        DefaultValue::String(value) => match scalar {
            Some(ScalarType::Url) => TypeIdentifier::url()
                .reference()
                .call(Tuple::new().adding_named("string", Reference::string(value.clone())))
                .force_unwrapped(),
            Some(ScalarType::Color) => TypeIdentifier::named("Color")
                .reference()
                .call(Tuple::new().adding_named("hex", Reference::string(value.clone()))),
            _ => Reference::string(value.clone()),
        },
        DefaultValue::CurrentDate => TypeIdentifier::date().reference().call_empty(),
        DefaultValue::Case(case) => Reference::dot(variable_name(case)),
    }
}

/// Returns the declared default of a property, if any.
#[must_use]
pub fn property_default(property: &EntityProperty) -> Option<Reference> {
    property
        .default_value
        .as_ref()
        .map(|default| default_value(default, &property.property_type))
}

/// Returns the first used case of an enum subtype.
///
/// # Errors
/// Returns `CodegenError::ShapeMismatch` if the subtype is not an enum or has
/// no used case.
pub fn first_used_case(subtype: &Subtype) -> Result<Reference, CodegenError> {
    if !subtype.is_enum() {
        return Err(CodegenError::shape_mismatch(
            &subtype.name,
            "expected an enum subtype",
        ));
    }
    subtype
        .used_cases()
        .next()
        .map(|case| Reference::dot(variable_name(&case.name)))
        .ok_or_else(|| CodegenError::shape_mismatch(&subtype.name, "enum has no used case"))
}

/// Returns true if a subtype is persisted as an encoded blob.
#[must_use]
pub fn is_blob_subtype(subtype: &Subtype) -> bool {
    matches!(subtype.items, SubtypeItems::Properties(_))
}

/// Returns true if a relationship property is to-many.
#[must_use]
pub fn is_to_many(property: &EntityProperty) -> bool {
    property
        .relationship_type()
        .is_some_and(|r| r.association == Association::ToMany)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironmeta_schema::parse_descriptions;

    const XML: &str = r#"<descriptions version="1.0.0">
        <subtypes>
            <subtype name="movie_genre"><case name="science_fiction"/></subtype>
        </subtypes>
        <entities>
            <entity name="tag"/>
            <entity name="item">
                <property name="genre" subtype="movie_genre" default="science_fiction"/>
                <property name="tags" relationship="tag" association="toMany" optional="true"/>
                <property name="views" type="int" lazy="true"/>
                <property name="owner" relationship="user"/>
            </entity>
        </entities>
    </descriptions>"#;

    #[test]
    fn test_property_types() {
        let descriptions = parse_descriptions(XML).expect("Failed to parse");
        let item = descriptions.get_entity("item").expect("item");

        let tags = item.property("tags").expect("tags");
        let ty = property_type(&descriptions, item, tags).expect("tag exists");
        assert_eq!(ty.to_string(), "AnySequence<TagIdentifier>?");

        let views = item.property("views").expect("views");
        let ty = property_type(&descriptions, item, views).expect("scalar");
        assert_eq!(ty.to_string(), "Lazy<Int>");

        let genre = item.property("genre").expect("genre");
        let ty = property_type(&descriptions, item, genre).expect("subtype exists");
        assert_eq!(ty.to_string(), "MovieGenre");
        let default = property_default(genre).expect("has default");
        assert_eq!(default.to_string(), ".scienceFiction");
    }

    #[test]
    fn test_missing_reference_names_the_field() {
        let descriptions = parse_descriptions(XML).expect("Failed to parse");
        let item = descriptions.get_entity("item").expect("item");
        let owner = item.property("owner").expect("owner");
        let err = property_type(&descriptions, item, owner).expect_err("user is missing");
        assert!(err.to_string().contains("item.owner"));
    }

    #[test]
    fn test_default_values() {
        let url = default_value(
            &DefaultValue::String("https://example.com".into()),
            &PropertyType::Scalar(ScalarType::Url),
        );
        assert_eq!(url.to_string(), "URL(string: \"https://example.com\")!");

        let seconds = default_value(&DefaultValue::Int(3), &PropertyType::Scalar(ScalarType::Seconds));
        assert_eq!(seconds.to_string(), "3.0");

        assert!(default_value(&DefaultValue::Nil, &PropertyType::Scalar(ScalarType::Int)).is_none());
    }
}
