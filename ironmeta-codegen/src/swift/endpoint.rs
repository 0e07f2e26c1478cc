//! Endpoint payload generation.
//!
//! Each side (read or write) of an endpoint decodes its entities with exactly
//! one [`PayloadStrategy`], chosen from where the entities sit in the
//! response document.

use ironmeta_core::{
    AccessLevel, Assignment, Block, Case, File, Function, FunctionParameter, Node, Property, Reference, Tuple,
    Type, TypeIdentifier, TypeKind, Variable,
};
use ironmeta_schema::naming::pascal_case;
use ironmeta_schema::{Descriptions, EndpointPayload, PayloadStructure, ReadWriteEndpointPayload};

use super::source_file;
use super::types::payload_type;
use crate::error::CodegenError;

/// Side of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadSide {
    /// Response to reads.
    Read,
    /// Response to writes.
    Write,
}

impl PayloadSide {
    const fn suffix(self) -> &'static str {
        match self {
            Self::Read => "Read",
            Self::Write => "Write",
        }
    }
}

/// Location of the entities in a response document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadStrategy {
    /// The document is the payload.
    Root,
    /// The payload sits under one key.
    Keyed(String),
    /// The payload sits two keys deep.
    NestedKeys(String, String),
    /// A list of containers, each holding one entity under `entity_key`.
    /// The list is the document itself or sits under `list_key`.
    ListOfContainers {
        /// Key of the list, if not at the root.
        list_key: Option<String>,
        /// Key of the entity inside each container.
        entity_key: String,
    },
}

/// Selects the decoding strategy of an endpoint payload.
///
/// # Errors
/// Returns `CodegenError::UnsupportedPayloadShape` if the payload is nested
/// deeper than any strategy navigates, or if a list of containers does not
/// name its entity key.
pub fn payload_strategy(
    endpoint_name: &str,
    payload: &ReadWriteEndpointPayload,
) -> Result<PayloadStrategy, CodegenError> {
    let unsupported = |path: String| CodegenError::UnsupportedPayloadShape {
        endpoint: endpoint_name.to_string(),
        path,
    };

    if payload.entity.structure == PayloadStructure::NestedArray {
        let Some(entity_key) = payload.entity.entity_key.clone() else {
            return Err(unsupported(payload.base_key.join(".")));
        };
        return match payload.base_key.as_slice() {
            [] => Ok(PayloadStrategy::ListOfContainers {
                list_key: None,
                entity_key,
            }),
            [key] => Ok(PayloadStrategy::ListOfContainers {
                list_key: Some(key.clone()),
                entity_key,
            }),
            keys => Err(unsupported(format!("{}.{entity_key}", keys.join(".")))),
        };
    }

    match payload.key_path().as_slice() {
        [] => Ok(PayloadStrategy::Root),
        [key] => Ok(PayloadStrategy::Keyed((*key).to_string())),
        [outer, inner] => Ok(PayloadStrategy::NestedKeys(
            (*outer).to_string(),
            (*inner).to_string(),
        )),
        path => Err(unsupported(path.join("."))),
    }
}

/// Returns `<Endpoint>Endpoint<Side>Payload`.
#[must_use]
pub fn endpoint_payload_type(endpoint_name: &str, side: PayloadSide) -> TypeIdentifier {
    TypeIdentifier::named(format!(
        "{}Endpoint{}Payload",
        pascal_case(endpoint_name),
        side.suffix()
    ))
}

/// Generator for endpoint payloads.
pub struct EndpointGenerator<'a> {
    descriptions: &'a Descriptions,
}

impl<'a> EndpointGenerator<'a> {
    /// Creates a new endpoint generator.
    #[must_use]
    pub fn new(descriptions: &'a Descriptions) -> Self {
        Self { descriptions }
    }

    /// Generates one file per endpoint declaring at least one payload.
    ///
    /// # Errors
    /// Returns `CodegenError` if an endpoint payload cannot be decoded by any
    /// strategy or names a missing entity.
    pub fn generate(&self) -> Result<Vec<File>, CodegenError> {
        let mut files = Vec::with_capacity(self.descriptions.endpoints.len());
        for endpoint in &self.descriptions.endpoints {
            if endpoint.read_payload.is_none() && endpoint.write_payload.is_none() {
                tracing::warn!("Endpoint '{}' declares no payload, skipping", endpoint.name);
                continue;
            }
            files.push(self.generate_endpoint(endpoint)?);
        }
        Ok(files)
    }

    /// Generates the payload types of one endpoint, read side first.
    ///
    /// # Errors
    /// Returns `CodegenError` if a payload cannot be decoded by any strategy
    /// or names a missing entity.
    pub fn generate_endpoint(&self, endpoint: &EndpointPayload) -> Result<File, CodegenError> {
        let mut nodes = Vec::with_capacity(2);
        if let Some(payload) = &endpoint.read_payload {
            nodes.push(self.payload(endpoint, payload, PayloadSide::Read)?.into());
        }
        if let Some(payload) = &endpoint.write_payload {
            nodes.push(self.payload(endpoint, payload, PayloadSide::Write)?.into());
        }
        let name = format!("{}EndpointPayloads", pascal_case(&endpoint.name));
        Ok(source_file(&name).adding_separated(nodes))
    }

    fn payload(
        &self,
        endpoint: &EndpointPayload,
        payload: &ReadWriteEndpointPayload,
        side: PayloadSide,
    ) -> Result<Type, CodegenError> {
        let entity = self.descriptions.entity(
            &payload.entity.entity_name,
            &format!("{}.{}", endpoint.name, side.suffix().to_lowercase()),
        )?;
        let strategy = payload_strategy(&endpoint.name, payload)?;
        tracing::debug!(
            "Endpoint '{}' {} payload uses {:?}",
            endpoint.name,
            side.suffix().to_lowercase(),
            strategy
        );

        let element = payload_type(&entity.name);
        let single = payload.entity.structure == PayloadStructure::Single;
        let (field, field_type) = if single {
            ("entity", element.clone())
        } else {
            ("entities", TypeIdentifier::any_sequence(element.clone()))
        };

        let mut ty = Type::new(endpoint_payload_type(&endpoint.name, side), TypeKind::Struct)
            .with_access_level(AccessLevel::Public)
            .adding_inherited_type(TypeIdentifier::named("Decodable"))
            .adding_member(
                Property::new(Variable::new(field).with_type(field_type.clone()))
                    .with_access_level(AccessLevel::Public),
            )
            .adding_member(Node::EmptyLine);

        let mut init = decoder_init().with_access_level(AccessLevel::Public);
        let field_ref = Reference::named(field);
        match &strategy {
            PayloadStrategy::Root => {
                init = init
                    .adding_statement(single_value_container())
                    .adding_statement(Assignment::new(field_ref, decode(&field_type, None)));
            }
            PayloadStrategy::Keyed(key) => {
                ty = ty
                    .adding_member(keys_enum("Keys", "payload", key))
                    .adding_member(Node::EmptyLine);
                init = init
                    .adding_statement(keyed_container())
                    .adding_statement(Assignment::new(field_ref, decode(&field_type, Some("payload"))));
            }
            PayloadStrategy::NestedKeys(outer, inner) => {
                ty = ty
                    .adding_member(keys_enum("Keys", "base", outer))
                    .adding_member(Node::EmptyLine)
                    .adding_member(keys_enum("NestedKeys", "payload", inner))
                    .adding_member(Node::EmptyLine);
                init = init.adding_statement(keyed_container()).adding_statement(
                    Property::new(Variable::new("nested")).with_value(Reference::try_expr(
                        Reference::named("container").member("nestedContainer").call(
                            Tuple::new()
                                .adding_named(
                                    "keyedBy",
                                    TypeIdentifier::named("NestedKeys").metatype().reference(),
                                )
                                .adding_named("forKey", Reference::dot("base")),
                        ),
                    )),
                );
                init = init.adding_statement(Assignment::new(
                    field_ref,
                    Reference::try_expr(
                        Reference::named("nested").member("decode").call(
                            Tuple::new()
                                .adding_unnamed(field_type.metatype().reference())
                                .adding_named("forKey", Reference::dot("payload")),
                        ),
                    ),
                ));
            }
            PayloadStrategy::ListOfContainers {
                list_key,
                entity_key,
            } => {
                ty = ty
                    .adding_member(entity_container(&element, entity_key))
                    .adding_member(Node::EmptyLine);
                let list = TypeIdentifier::named("EntityContainer").array();
                let containers = match list_key {
                    Some(key) => {
                        ty = ty
                            .adding_member(keys_enum("Keys", "payload", key))
                            .adding_member(Node::EmptyLine);
                        init = init.adding_statement(keyed_container());
                        decode(&list, Some("payload"))
                    }
                    None => {
                        init = init.adding_statement(single_value_container());
                        decode(&list, None)
                    }
                };
                init = init
                    .adding_statement(Property::new(Variable::new("containers")).with_value(containers))
                    .adding_statement(Assignment::new(
                        field_ref,
                        Reference::named("containers")
                            .member("lazy")
                            .member("map")
                            .call_block(Block::expression(Reference::named("$0").member("entity")))
                            .member("any"),
                    ));
            }
        }

        Ok(ty.adding_member(init))
    }
}

fn decoder_init() -> Function {
    Function::init()
        .adding_parameter(
            FunctionParameter::new("decoder", TypeIdentifier::named("Decoder")).with_alias("from"),
        )
        .with_throws(true)
}

fn single_value_container() -> Property {
    Property::new(Variable::new("container")).with_value(Reference::try_expr(
        Reference::named("decoder").member("singleValueContainer").call_empty(),
    ))
}

fn keyed_container() -> Property {
    Property::new(Variable::new("container")).with_value(Reference::try_expr(
        Reference::named("decoder").member("container").call(
            Tuple::new().adding_named("keyedBy", TypeIdentifier::named("Keys").metatype().reference()),
        ),
    ))
}

/// `try container.decode(T.self[, forKey: .key])`
fn decode(ty: &TypeIdentifier, key: Option<&str>) -> Reference {
    let mut arguments = Tuple::new().adding_unnamed(ty.clone().metatype().reference());
    if let Some(key) = key {
        arguments = arguments.adding_named("forKey", Reference::dot(key));
    }
    Reference::try_expr(Reference::named("container").member("decode").call(arguments))
}

fn keys_enum(name: &str, case: &str, key: &str) -> Type {
    Type::new(TypeIdentifier::named(name), TypeKind::ENUM)
        .with_access_level(AccessLevel::Private)
        .adding_inherited_type(TypeIdentifier::string())
        .adding_inherited_type(TypeIdentifier::named("CodingKey"))
        .adding_member(Case::new(case).with_raw_value(Reference::string(key)))
}

fn entity_container(element: &TypeIdentifier, entity_key: &str) -> Type {
    Type::new(TypeIdentifier::named("EntityContainer"), TypeKind::Struct)
        .with_access_level(AccessLevel::Private)
        .adding_inherited_type(TypeIdentifier::named("Decodable"))
        .adding_member(Property::new(Variable::new("entity").with_type(element.clone())))
        .adding_member(Node::EmptyLine)
        .adding_member(keys_enum("Keys", "entity", entity_key))
        .adding_member(Node::EmptyLine)
        .adding_member(
            decoder_init()
                .adding_statement(keyed_container())
                .adding_statement(Assignment::new(Reference::named("entity"), decode(element, Some("entity")))),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironmeta_core::render_file;
    use ironmeta_schema::parse_descriptions;

    fn descriptions(endpoints: &str) -> Descriptions {
        parse_descriptions(&format!(
            r#"<descriptions version="1.0.0">
                <entities><entity name="item"/></entities>
                <endpoints>{endpoints}</endpoints>
            </descriptions>"#
        ))
        .expect("Failed to parse")
    }

    fn render(endpoints: &str) -> String {
        let descriptions = descriptions(endpoints);
        let files = EndpointGenerator::new(&descriptions)
            .generate()
            .expect("Failed to generate");
        assert_eq!(files.len(), 1);
        render_file(&files[0])
    }

    #[test]
    fn test_strategy_selection() {
        let descriptions = descriptions(
            r#"<endpoint name="root"><read entity="item"/></endpoint>
               <endpoint name="keyed"><read entity="item" baseKey="data"/></endpoint>
               <endpoint name="entity_keyed"><read entity="item" baseKey="data" entityKey="item"/></endpoint>
               <endpoint name="list"><read entity="item" structure="nested_array" entityKey="item"/></endpoint>
               <endpoint name="deep"><read entity="item" baseKey="a.b.c"/></endpoint>"#,
        );
        let strategy = |name: &str| {
            let endpoint = descriptions.get_endpoint(name).expect("endpoint");
            payload_strategy(name, endpoint.read_payload.as_ref().expect("read"))
        };
        assert_eq!(strategy("root").expect("root"), PayloadStrategy::Root);
        assert_eq!(
            strategy("keyed").expect("keyed"),
            PayloadStrategy::Keyed("data".to_string())
        );
        assert_eq!(
            strategy("entity_keyed").expect("nested"),
            PayloadStrategy::NestedKeys("data".to_string(), "item".to_string())
        );
        assert_eq!(
            strategy("list").expect("list"),
            PayloadStrategy::ListOfContainers {
                list_key: None,
                entity_key: "item".to_string()
            }
        );
        let err = strategy("deep").expect_err("too deep");
        assert_eq!(
            err.to_string(),
            "unsupported payload shape for endpoint 'deep' at 'a.b.c'"
        );
    }

    #[test]
    fn test_root_payload() {
        let output = render(r#"<endpoint name="item"><read entity="item"/></endpoint>"#);
        assert!(output.contains("public struct ItemEndpointReadPayload: Decodable {"));
        assert!(output.contains("public let entity: DefaultItemPayload"));
        assert!(output.contains("let container = try decoder.singleValueContainer()"));
        assert!(output.contains("entity = try container.decode(DefaultItemPayload.self)"));
    }

    #[test]
    fn test_keyed_array_payload() {
        let output = render(
            r#"<endpoint name="items"><read entity="item" baseKey="items" structure="array"/></endpoint>"#,
        );
        assert!(output.contains("public let entities: AnySequence<DefaultItemPayload>"));
        assert!(output.contains("case payload = \"items\""));
        assert!(output.contains(
            "entities = try container.decode(AnySequence<DefaultItemPayload>.self, forKey: .payload)"
        ));
    }

    #[test]
    fn test_nested_keys_payload() {
        let output = render(
            r#"<endpoint name="item"><write entity="item" baseKey="data" entityKey="item"/></endpoint>"#,
        );
        assert!(output.contains("public struct ItemEndpointWritePayload: Decodable {"));
        assert!(output.contains("private enum NestedKeys: String, CodingKey {"));
        assert!(output.contains(
            "let nested = try container.nestedContainer(keyedBy: NestedKeys.self, forKey: .base)"
        ));
        assert!(output.contains("entity = try nested.decode(DefaultItemPayload.self, forKey: .payload)"));
    }

    #[test]
    fn test_list_of_containers_payload() {
        let output = render(
            r#"<endpoint name="feed"><read entity="item" baseKey="feed" structure="nested_array" entityKey="item"/></endpoint>"#,
        );
        assert!(output.contains("private struct EntityContainer: Decodable {"));
        assert!(output.contains("case entity = \"item\""));
        assert!(output.contains("let containers = try container.decode([EntityContainer].self, forKey: .payload)"));
        assert!(output.contains("entities = containers.lazy.map { $0.entity }.any"));
    }

    #[test]
    fn test_list_without_entity_key_is_rejected() {
        let descriptions = descriptions(
            r#"<endpoint name="feed"><read entity="item" structure="nested_array"/></endpoint>"#,
        );
        let err = EndpointGenerator::new(&descriptions)
            .generate()
            .expect_err("no entity key");
        assert!(matches!(err, CodegenError::UnsupportedPayloadShape { endpoint, .. } if endpoint == "feed"));
    }

    #[test]
    fn test_endpoint_without_payload_is_skipped() {
        let descriptions = descriptions(r#"<endpoint name="ping"/>"#);
        let files = EndpointGenerator::new(&descriptions)
            .generate()
            .expect("Failed to generate");
        assert!(files.is_empty());
    }
}
