//! XML description parser.
//!
//! This module parses `<descriptions>` documents into a [`Descriptions`]
//! model:
//!
//! ```xml
//! <descriptions version="1.1.0">
//!     <versions><version name="1.0.0"/></versions>
//!     <subtypes>...</subtypes>
//!     <entities>...</entities>
//!     <endpoints>...</endpoints>
//! </descriptions>
//! ```

use crate::descriptions::Descriptions;
use crate::endpoints::{
    EndpointPayload, EndpointPayloadEntity, PayloadStructure, ReadWriteEndpointPayload,
};
use crate::entities::{
    Association, Entity, EntityIdentifier, EntityProperty, EntityRelationship, IdentifierType,
    IdentifierValueType, PropertyType, RelationshipId,
};
use crate::error::ParseError;
use crate::types::{
    DefaultValue, ScalarType, Subtype, SubtypeCase, SubtypeItems, SubtypeOption, SubtypeProperty,
    SubtypePropertyType,
};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Parses a description document from a string.
///
/// # Arguments
/// * `xml` - XML description content
///
/// # Returns
/// Parsed descriptions or parse error.
///
/// # Errors
/// Returns `ParseError` if the XML is malformed, an element is unknown, an
/// attribute is missing or invalid, or a name is defined twice.
pub fn parse_descriptions(xml: &str) -> Result<Descriptions, ParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut descriptions: Option<Descriptions> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name_bytes = e.name().as_ref().to_vec();
                let name = std::str::from_utf8(&name_bytes)?;
                if name == "descriptions" {
                    descriptions = Some(parse_root(e)?);
                } else {
                    let target = descriptions.as_mut().ok_or_else(no_root)?;
                    match name {
                        "versions" => parse_versions(&mut reader, target)?,
                        "subtypes" => parse_subtypes(&mut reader, target)?,
                        "entities" => parse_entities(&mut reader, target)?,
                        "endpoints" => parse_endpoints(&mut reader, target)?,
                        other => return Err(ParseError::unknown_element(other, "descriptions")),
                    }
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name_bytes = e.name().as_ref().to_vec();
                let name = std::str::from_utf8(&name_bytes)?;
                match name {
                    "descriptions" => descriptions = Some(parse_root(e)?),
                    "versions" | "subtypes" | "entities" | "endpoints" => {}
                    other => return Err(ParseError::unknown_element(other, "descriptions")),
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    descriptions.ok_or_else(no_root)
}

fn no_root() -> ParseError {
    ParseError::InvalidStructure {
        message: "No descriptions element found".to_string(),
    }
}

/// Visits the child elements of the current element until its end tag.
///
/// `visit` receives the reader, the element name, the element and whether
/// the element has content; elements with content must be consumed by the
/// visitor.
fn for_each_child<F>(reader: &mut Reader<&[u8]>, mut visit: F) -> Result<(), ParseError>
where
    F: FnMut(&mut Reader<&[u8]>, &str, &BytesStart<'_>, bool) -> Result<(), ParseError>,
{
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name_bytes = e.name().as_ref().to_vec();
                let name = std::str::from_utf8(&name_bytes)?;
                visit(reader, name, e, true)?;
            }
            Ok(Event::Empty(ref e)) => {
                let name_bytes = e.name().as_ref().to_vec();
                let name = std::str::from_utf8(&name_bytes)?;
                visit(reader, name, e, false)?;
            }
            Ok(Event::End(_)) | Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

/// Skips to the end of the current element.
fn skip_to_end(reader: &mut Reader<&[u8]>) -> Result<(), ParseError> {
    let mut buf = Vec::new();
    let mut depth = 1;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(_)) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

fn parse_bool(element: &str, attribute: &str, value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::invalid_attr(element, attribute, value)),
    }
}

/// Parses the descriptions element attributes.
fn parse_root(e: &BytesStart<'_>) -> Result<Descriptions, ParseError> {
    let mut version = None;

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;

        if key == "version" {
            version = Some(value.to_string());
        }
    }

    let version = version.ok_or_else(|| ParseError::missing_attr("descriptions", "version"))?;
    Ok(Descriptions::new(version))
}

/// Parses the version history.
fn parse_versions(
    reader: &mut Reader<&[u8]>,
    descriptions: &mut Descriptions,
) -> Result<(), ParseError> {
    for_each_child(reader, |reader, name, e, has_content| {
        if name != "version" {
            return Err(ParseError::unknown_element(name, "versions"));
        }
        let mut version = None;
        for attr in e.attributes().flatten() {
            let key = std::str::from_utf8(attr.key.as_ref())?;
            let value = std::str::from_utf8(&attr.value)?;
            if key == "name" {
                version = Some(value.to_string());
            }
        }
        let version = version.ok_or_else(|| ParseError::missing_attr("version", "name"))?;
        descriptions.version_history.push(version);
        if has_content {
            skip_to_end(reader)?;
        }
        Ok(())
    })
}

/// Parses the subtypes section.
fn parse_subtypes(
    reader: &mut Reader<&[u8]>,
    descriptions: &mut Descriptions,
) -> Result<(), ParseError> {
    for_each_child(reader, |reader, name, e, has_content| {
        if name != "subtype" {
            return Err(ParseError::unknown_element(name, "subtypes"));
        }
        let subtype = parse_subtype(reader, e, has_content)?;
        if descriptions.get_subtype(&subtype.name).is_some() {
            return Err(ParseError::duplicate("subtype", subtype.name));
        }
        descriptions.add_subtype(subtype);
        Ok(())
    })
}

/// Parses a subtype definition and its items.
fn parse_subtype(
    reader: &mut Reader<&[u8]>,
    e: &BytesStart<'_>,
    has_content: bool,
) -> Result<Subtype, ParseError> {
    let mut name = None;

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;

        if key == "name" {
            name = Some(value.to_string());
        }
    }

    let name = name.ok_or_else(|| ParseError::missing_attr("subtype", "name"))?;

    let mut cases = Vec::new();
    let mut options = Vec::new();
    let mut properties = Vec::new();

    if has_content {
        for_each_child(reader, |reader, tag_name, e, has_content| {
            match tag_name {
                "case" => {
                    let (case_name, unused) = parse_named_item(e, "case")?;
                    cases.push(SubtypeCase {
                        name: case_name,
                        unused,
                    });
                }
                "option" => {
                    let (option_name, unused) = parse_named_item(e, "option")?;
                    options.push(SubtypeOption {
                        name: option_name,
                        unused,
                    });
                }
                "property" => properties.push(parse_subtype_property(e)?),
                other => return Err(ParseError::unknown_element(other, "subtype")),
            }
            if has_content {
                skip_to_end(reader)?;
            }
            Ok(())
        })?;
    }

    let items = match (cases.is_empty(), options.is_empty(), properties.is_empty()) {
        (false, true, true) => SubtypeItems::Cases(cases),
        (true, false, true) => SubtypeItems::Options(options),
        (true, true, false) => SubtypeItems::Properties(properties),
        (true, true, true) => {
            return Err(ParseError::InvalidStructure {
                message: format!("subtype '{name}' declares no items"),
            });
        }
        _ => {
            return Err(ParseError::InvalidStructure {
                message: format!("subtype '{name}' mixes cases, options and properties"),
            });
        }
    };

    Ok(Subtype::new(name, items))
}

/// Parses the `name` and `unused` attributes shared by cases and options.
fn parse_named_item(e: &BytesStart<'_>, element: &str) -> Result<(String, bool), ParseError> {
    let mut name = None;
    let mut unused = false;

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;

        match key {
            "name" => name = Some(value.to_string()),
            "unused" => unused = parse_bool(element, "unused", value)?,
            _ => {}
        }
    }

    let name = name.ok_or_else(|| ParseError::missing_attr(element, "name"))?;
    Ok((name, unused))
}

/// Parses a struct subtype member.
fn parse_subtype_property(e: &BytesStart<'_>) -> Result<SubtypeProperty, ParseError> {
    let mut name = None;
    let mut key_name = None;
    let mut property_type = None;
    let mut optional = false;
    let mut is_array = false;

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;

        match key {
            "name" => name = Some(value.to_string()),
            "key" => key_name = Some(value.to_string()),
            "type" => {
                property_type = Some(SubtypePropertyType::Scalar(
                    ScalarType::from_name(value)
                        .ok_or_else(|| ParseError::invalid_attr("property", "type", value))?,
                ))
            }
            "subtype" => property_type = Some(SubtypePropertyType::Subtype(value.to_string())),
            "optional" => optional = parse_bool("property", "optional", value)?,
            "array" => is_array = parse_bool("property", "array", value)?,
            _ => {}
        }
    }

    let name = name.ok_or_else(|| ParseError::missing_attr("property", "name"))?;
    let property_type =
        property_type.ok_or_else(|| ParseError::missing_attr("property", "type"))?;

    let mut property = SubtypeProperty::new(name, property_type);
    if let Some(key) = key_name {
        property.key = key;
    }
    property.optional = optional;
    property.is_array = is_array;

    Ok(property)
}

/// Parses the entities section.
fn parse_entities(
    reader: &mut Reader<&[u8]>,
    descriptions: &mut Descriptions,
) -> Result<(), ParseError> {
    for_each_child(reader, |reader, name, e, has_content| {
        if name != "entity" {
            return Err(ParseError::unknown_element(name, "entities"));
        }
        let entity = parse_entity(reader, e, has_content)?;
        if descriptions.get_entity(&entity.name).is_some() {
            return Err(ParseError::duplicate("entity", entity.name));
        }
        descriptions.add_entity(entity);
        Ok(())
    })
}

/// Parses an entity definition.
fn parse_entity(
    reader: &mut Reader<&[u8]>,
    e: &BytesStart<'_>,
    has_content: bool,
) -> Result<Entity, ParseError> {
    let mut name = None;
    let mut persist = false;
    let mut remote = true;
    let mut mutable = false;
    let mut client_queue_name = None;
    let mut last_remote_read = false;
    let mut legacy_previous_name = None;

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;

        match key {
            "name" => name = Some(value.to_string()),
            "persist" => persist = parse_bool("entity", "persist", value)?,
            "remote" => remote = parse_bool("entity", "remote", value)?,
            "mutable" => mutable = parse_bool("entity", "mutable", value)?,
            "queue" => client_queue_name = Some(value.to_string()),
            "lastRemoteRead" => last_remote_read = parse_bool("entity", "lastRemoteRead", value)?,
            "legacyPreviousName" => legacy_previous_name = Some(value.to_string()),
            _ => {}
        }
    }

    let name = name.ok_or_else(|| ParseError::missing_attr("entity", "name"))?;

    let mut entity = Entity::new(
        name,
        EntityIdentifier::new(IdentifierType::Scalar(IdentifierValueType::Int)),
    );
    entity.persist = persist;
    entity.remote = remote;
    entity.mutable = mutable;
    entity.client_queue_name = client_queue_name;
    entity.last_remote_read = last_remote_read;
    entity.legacy_previous_name = legacy_previous_name;

    if has_content {
        for_each_child(reader, |reader, tag_name, e, has_content| {
            match tag_name {
                "identifier" => {
                    entity.identifier = parse_identifier(reader, e, has_content)?;
                }
                "property" => {
                    let property = parse_property(e)?;
                    if entity.property(&property.name).is_some() {
                        return Err(ParseError::duplicate(
                            "property",
                            format!("{}.{}", entity.name, property.name),
                        ));
                    }
                    entity.properties.push(property);
                    if has_content {
                        skip_to_end(reader)?;
                    }
                }
                other => return Err(ParseError::unknown_element(other, "entity")),
            }
            Ok(())
        })?;
    }

    Ok(entity)
}

/// Parses an entity identifier declaration.
fn parse_identifier(
    reader: &mut Reader<&[u8]>,
    e: &BytesStart<'_>,
    has_content: bool,
) -> Result<EntityIdentifier, ParseError> {
    let mut type_name = "int".to_string();
    let mut value_type = IdentifierValueType::Int;
    let mut key_name = None;
    let mut equivalent = None;

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;

        match key {
            "type" => type_name = value.to_string(),
            "valueType" => {
                value_type = IdentifierValueType::from_name(value)
                    .ok_or_else(|| ParseError::invalid_attr("identifier", "valueType", value))?
            }
            "key" => key_name = Some(value.to_string()),
            "equivalent" => equivalent = Some(value.to_string()),
            _ => {}
        }
    }

    let mut relationships = Vec::new();
    if has_content {
        for_each_child(reader, |reader, tag_name, e, has_content| {
            if tag_name != "relationship" {
                return Err(ParseError::unknown_element(tag_name, "identifier"));
            }
            let mut variable_name = None;
            let mut entity_name = None;
            for attr in e.attributes().flatten() {
                let key = std::str::from_utf8(attr.key.as_ref())?;
                let value = std::str::from_utf8(&attr.value)?;
                match key {
                    "name" => variable_name = Some(value.to_string()),
                    "entity" => entity_name = Some(value.to_string()),
                    _ => {}
                }
            }
            let entity_name =
                entity_name.ok_or_else(|| ParseError::missing_attr("relationship", "entity"))?;
            let variable_name = variable_name.unwrap_or_else(|| entity_name.clone());
            relationships.push(RelationshipId::new(variable_name, entity_name));
            if has_content {
                skip_to_end(reader)?;
            }
            Ok(())
        })?;
    }

    let identifier_type = match type_name.as_str() {
        "void" => IdentifierType::Void,
        "relationships" => {
            if relationships.is_empty() {
                return Err(ParseError::InvalidStructure {
                    message: "relationships identifier declares no relationship".to_string(),
                });
            }
            IdentifierType::Relationships {
                value_type,
                relationships,
            }
        }
        other => IdentifierType::Scalar(
            IdentifierValueType::from_name(other)
                .ok_or_else(|| ParseError::invalid_attr("identifier", "type", other))?,
        ),
    };

    let mut identifier = EntityIdentifier::new(identifier_type);
    if let Some(key) = key_name {
        identifier.key = key;
    }
    identifier.equivalent_identifier_name = equivalent;

    Ok(identifier)
}

/// Parses an entity property.
fn parse_property(e: &BytesStart<'_>) -> Result<EntityProperty, ParseError> {
    let mut name = None;
    let mut key_name = None;
    let mut scalar = None;
    let mut subtype = None;
    let mut relationship = None;
    let mut association = Association::ToOne;
    let mut id_only = false;
    let mut optional = false;
    let mut lazy = false;
    let mut is_array = false;
    let mut default = None;
    let mut use_for_equality = true;
    let mut log_error = true;

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;

        match key {
            "name" => name = Some(value.to_string()),
            "key" => key_name = Some(value.to_string()),
            "type" => {
                scalar = Some(
                    ScalarType::from_name(value)
                        .ok_or_else(|| ParseError::invalid_attr("property", "type", value))?,
                )
            }
            "subtype" => subtype = Some(value.to_string()),
            "relationship" => relationship = Some(value.to_string()),
            "association" => {
                association = match value {
                    "toOne" => Association::ToOne,
                    "toMany" => Association::ToMany,
                    _ => return Err(ParseError::invalid_attr("property", "association", value)),
                }
            }
            "idOnly" => id_only = parse_bool("property", "idOnly", value)?,
            "optional" => optional = parse_bool("property", "optional", value)?,
            "lazy" => lazy = parse_bool("property", "lazy", value)?,
            "array" => is_array = parse_bool("property", "array", value)?,
            "default" => default = Some(value.to_string()),
            "useForEquality" => use_for_equality = parse_bool("property", "useForEquality", value)?,
            "logError" => log_error = parse_bool("property", "logError", value)?,
            _ => {}
        }
    }

    let name = name.ok_or_else(|| ParseError::missing_attr("property", "name"))?;

    let property_type = match (scalar, subtype, relationship) {
        (Some(scalar), None, None) => PropertyType::Scalar(scalar),
        (None, Some(subtype), None) => PropertyType::Subtype(subtype),
        (None, None, Some(entity_name)) => {
            if is_array {
                return Err(ParseError::invalid_attr("property", "array", "true"));
            }
            let mut relationship = EntityRelationship::new(entity_name, association);
            relationship.id_only = id_only;
            PropertyType::Relationship(relationship)
        }
        (None, None, None) => return Err(ParseError::missing_attr("property", "type")),
        _ => {
            return Err(ParseError::InvalidStructure {
                message: format!("property '{name}' declares more than one type"),
            });
        }
    };

    let default_value = match default {
        None => None,
        Some(raw) => Some(match &property_type {
            PropertyType::Scalar(scalar) => DefaultValue::parse_scalar(&raw, *scalar)
                .ok_or_else(|| ParseError::invalid_attr("property", "default", raw.as_str()))?,
            PropertyType::Subtype(_) => DefaultValue::parse_case(&raw),
            PropertyType::Relationship(_) if raw == "nil" => DefaultValue::Nil,
            PropertyType::Relationship(_) => {
                return Err(ParseError::invalid_attr("property", "default", raw));
            }
        }),
    };

    let mut property = EntityProperty::new(name, property_type);
    if let Some(key) = key_name {
        property.key = key;
    }
    property.is_array = is_array;
    property.optional = optional;
    property.lazy = lazy;
    property.default_value = default_value;
    property.use_for_equality = use_for_equality;
    property.log_error = log_error;

    Ok(property)
}

/// Parses the endpoints section.
fn parse_endpoints(
    reader: &mut Reader<&[u8]>,
    descriptions: &mut Descriptions,
) -> Result<(), ParseError> {
    for_each_child(reader, |reader, name, e, has_content| {
        if name != "endpoint" {
            return Err(ParseError::unknown_element(name, "endpoints"));
        }
        let endpoint = parse_endpoint(reader, e, has_content)?;
        if descriptions.get_endpoint(&endpoint.name).is_some() {
            return Err(ParseError::duplicate("endpoint", endpoint.name));
        }
        descriptions.add_endpoint(endpoint);
        Ok(())
    })
}

/// Parses an endpoint definition.
fn parse_endpoint(
    reader: &mut Reader<&[u8]>,
    e: &BytesStart<'_>,
    has_content: bool,
) -> Result<EndpointPayload, ParseError> {
    let mut name = None;

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;

        if key == "name" {
            name = Some(value.to_string());
        }
    }

    let name = name.ok_or_else(|| ParseError::missing_attr("endpoint", "name"))?;
    let mut endpoint = EndpointPayload::new(name);

    if has_content {
        for_each_child(reader, |reader, tag_name, e, has_content| {
            match tag_name {
                "read" => endpoint.read_payload = Some(parse_payload(e, "read")?),
                "write" => endpoint.write_payload = Some(parse_payload(e, "write")?),
                other => return Err(ParseError::unknown_element(other, "endpoint")),
            }
            if has_content {
                skip_to_end(reader)?;
            }
            Ok(())
        })?;
    }

    Ok(endpoint)
}

/// Parses the read or write payload of an endpoint.
fn parse_payload(
    e: &BytesStart<'_>,
    element: &str,
) -> Result<ReadWriteEndpointPayload, ParseError> {
    let mut base_key = Vec::new();
    let mut entity_name = None;
    let mut entity_key = None;
    let mut structure = PayloadStructure::Single;

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;

        match key {
            "baseKey" => {
                base_key = value
                    .split('.')
                    .filter(|segment| !segment.is_empty())
                    .map(str::to_string)
                    .collect()
            }
            "entity" => entity_name = Some(value.to_string()),
            "entityKey" => entity_key = Some(value.to_string()),
            "structure" => {
                structure = PayloadStructure::from_name(value)
                    .ok_or_else(|| ParseError::invalid_attr(element, "structure", value))?
            }
            _ => {}
        }
    }

    let entity_name = entity_name.ok_or_else(|| ParseError::missing_attr(element, "entity"))?;
    let mut entity = EndpointPayloadEntity::new(entity_name).with_structure(structure);
    entity.entity_key = entity_key;

    Ok(ReadWriteEndpointPayload::new(entity).with_base_key(base_key))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIBRARY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<descriptions version="1.2.0">
    <versions>
        <version name="1.0.0"/>
        <version name="1.1.0"/>
    </versions>
    <subtypes>
        <subtype name="genre">
            <case name="fiction"/>
            <case name="poetry" unused="true"/>
        </subtype>
        <subtype name="permissions">
            <option name="read"/>
            <option name="write" unused="true"/>
            <option name="share"/>
        </subtype>
        <subtype name="dimensions">
            <property name="width" type="double"/>
            <property name="height" type="double" optional="true"/>
        </subtype>
    </subtypes>
    <entities>
        <entity name="tag" persist="true" queue="tags">
            <identifier type="string"/>
            <property name="label" type="string"/>
        </entity>
        <entity name="item" persist="true" mutable="true" queue="items">
            <identifier type="int" key="item_id"/>
            <property name="title" type="string"/>
            <property name="genre" subtype="genre" default="fiction"/>
            <property name="tags" relationship="tag" association="toMany" optional="true"/>
            <property name="views" type="int" lazy="true" useForEquality="false"/>
        </entity>
    </entities>
    <endpoints>
        <endpoint name="items">
            <read baseKey="data" entity="item" entityKey="items" structure="array"/>
            <write entity="item" entityKey="item"/>
        </endpoint>
    </endpoints>
</descriptions>"#;

    #[test]
    fn test_parse_versions() {
        let descriptions = parse_descriptions(LIBRARY).expect("Failed to parse");
        assert_eq!(descriptions.version, "1.2.0");
        assert_eq!(descriptions.version_history, vec!["1.0.0", "1.1.0"]);
    }

    #[test]
    fn test_parse_subtypes() {
        let descriptions = parse_descriptions(LIBRARY).expect("Failed to parse");
        assert_eq!(descriptions.subtypes.len(), 3);

        let genre = descriptions.get_subtype("genre").expect("genre");
        assert_eq!(
            genre.items,
            SubtypeItems::Cases(vec![SubtypeCase::new("fiction"), SubtypeCase::unused("poetry")])
        );
        assert!(descriptions.get_subtype("permissions").expect("permissions").is_option_set());
        match &descriptions.get_subtype("dimensions").expect("dimensions").items {
            SubtypeItems::Properties(properties) => {
                assert_eq!(properties.len(), 2);
                assert!(properties[1].optional);
            }
            other => panic!("unexpected items: {other:?}"),
        }
    }

    #[test]
    fn test_parse_entities() {
        let descriptions = parse_descriptions(LIBRARY).expect("Failed to parse");
        let item = descriptions.get_entity("item").expect("item");

        assert!(item.persist);
        assert!(item.mutable);
        assert_eq!(item.queue_name(), "items");
        assert_eq!(item.identifier.key, "item_id");
        assert_eq!(
            item.identifier.identifier_type,
            IdentifierType::Scalar(IdentifierValueType::Int)
        );
        assert_eq!(item.properties.len(), 4);

        let genre = item.property("genre").expect("genre");
        assert_eq!(genre.default_value, Some(DefaultValue::Case("fiction".into())));

        let tags = item.property("tags").expect("tags");
        assert!(tags.optional);
        assert_eq!(
            tags.relationship_type().map(|r| r.association),
            Some(Association::ToMany)
        );

        let views = item.property("views").expect("views");
        assert!(views.lazy);
        assert!(!views.use_for_equality);
    }

    #[test]
    fn test_parse_endpoints() {
        let descriptions = parse_descriptions(LIBRARY).expect("Failed to parse");
        let endpoint = descriptions.get_endpoint("items").expect("items");
        let read = endpoint.read_payload.as_ref().expect("read payload");
        assert_eq!(read.base_key, vec!["data"]);
        assert_eq!(read.entity.structure, PayloadStructure::Array);
        assert_eq!(read.key_path(), vec!["data", "items"]);
        assert!(endpoint.write_payload.is_some());
    }

    #[test]
    fn test_duplicate_entity_is_rejected() {
        let xml = r#"<descriptions version="1.0.0"><entities>
            <entity name="a"/>
            <entity name="a"/>
        </entities></descriptions>"#;
        let err = parse_descriptions(xml).expect_err("duplicate entity");
        assert!(matches!(err, ParseError::DuplicateDefinition { .. }));
    }

    #[test]
    fn test_invalid_scalar_type_is_rejected() {
        let xml = r#"<descriptions version="1.0.0"><entities>
            <entity name="a"><property name="p" type="decimal"/></entity>
        </entities></descriptions>"#;
        let err = parse_descriptions(xml).expect_err("invalid type");
        match err {
            ParseError::InvalidAttribute { attribute, value, .. } => {
                assert_eq!(attribute, "type");
                assert_eq!(value, "decimal");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_element_is_rejected() {
        let xml = r#"<descriptions version="1.0.0"><entities>
            <entity name="a"><field name="p"/></entity>
        </entities></descriptions>"#;
        let err = parse_descriptions(xml).expect_err("unknown element");
        assert!(matches!(err, ParseError::UnknownElement { .. }));
    }

    #[test]
    fn test_missing_root() {
        let err = parse_descriptions("<other/>").expect_err("no root");
        assert!(matches!(err, ParseError::UnknownElement { .. }));
    }

    #[test]
    fn test_relationship_identifier() {
        let xml = r#"<descriptions version="1.0.0"><entities>
            <entity name="membership">
                <identifier type="relationships" valueType="string">
                    <relationship name="member" entity="user"/>
                    <relationship entity="group"/>
                </identifier>
            </entity>
        </entities></descriptions>"#;
        let descriptions = parse_descriptions(xml).expect("Failed to parse");
        let membership = descriptions.get_entity("membership").expect("membership");
        let relationships = membership.identifier.relationships();
        assert_eq!(relationships.len(), 2);
        assert_eq!(relationships[0].variable_name, "member");
        assert_eq!(relationships[1].variable_name, "group");
        assert_eq!(
            membership.identifier.value_type(),
            Some(IdentifierValueType::String)
        );
    }
}
