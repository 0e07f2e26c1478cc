//! Entity class generation.
//!
//! For one entity this emits:
//! - the entity class, stored properties in storage order (identifier, then
//!   values, then relationships) and a memberwise initializer
//! - a convenience initializer from the remote payload
//! - `Equatable` conformance comparing the properties used for equality
//! - the index name enum and the index value accessor
//! - `merging(_:)` for entities with lazy properties

use ironmeta_core::{
    AccessLevel, Assignment, Block, Case, Extension, File, Function, FunctionParameter, Guard,
    Node, Property, Reference, Switch, SwitchCase, Tuple, Type, TypeAlias, TypeIdentifier,
    TypeKind, Variable,
};
use ironmeta_schema::naming::pascal_case;
use ironmeta_schema::{Association, Descriptions, Entity, EntityProperty, PropertyType};

use super::source_file;
use super::types::{
    entity_type, identifier_type, index_name_type, payload_type, property_type, variable_name,
};
use crate::error::CodegenError;

/// Generator for entity classes.
pub struct EntityGenerator<'a> {
    descriptions: &'a Descriptions,
}

impl<'a> EntityGenerator<'a> {
    /// Creates a new entity generator.
    #[must_use]
    pub fn new(descriptions: &'a Descriptions) -> Self {
        Self { descriptions }
    }

    /// Generates one file per entity, in declared order.
    ///
    /// # Errors
    /// Returns `CodegenError` if a property references a missing entity or
    /// subtype.
    pub fn generate(&self) -> Result<Vec<File>, CodegenError> {
        self.descriptions
            .entities
            .iter()
            .map(|entity| self.generate_entity(entity))
            .collect()
    }

    /// Generates the file of a single entity.
    ///
    /// # Errors
    /// Returns `CodegenError` if a property references a missing entity or
    /// subtype.
    pub fn generate_entity(&self, entity: &Entity) -> Result<File, CodegenError> {
        let mut nodes = vec![Node::Type(self.class(entity)?)];
        if entity.remote {
            nodes.push(self.payload_initializer(entity).into());
        }
        nodes.push(self.equatable(entity).into());
        if !entity.properties.is_empty() {
            nodes.push(self.index_name(entity).into());
            nodes.push(self.index_value_accessor(entity)?.into());
        }
        if entity.has_lazy_properties() {
            nodes.push(self.merging(entity).into());
        }
        Ok(source_file(&pascal_case(&entity.name)).adding_separated(nodes))
    }

    /// Returns the stored members as `(name, type)`, identifier first.
    fn stored_members(&self, entity: &Entity) -> Result<Vec<(String, TypeIdentifier)>, CodegenError> {
        let mut members = Vec::new();
        if !entity.has_void_identifier() {
            members.push(("identifier".to_string(), identifier_type(entity)));
        }
        for property in entity.stored_properties() {
            members.push((
                variable_name(&property.name),
                property_type(self.descriptions, entity, property)?,
            ));
        }
        Ok(members)
    }

    fn class(&self, entity: &Entity) -> Result<Type, CodegenError> {
        let index_name = if entity.properties.is_empty() {
            TypeIdentifier::named("VoidIndexName")
        } else {
            index_name_type(&entity.name)
        };
        let mut ty = Type::new(entity_type(&entity.name), TypeKind::FINAL_CLASS)
            .with_access_level(AccessLevel::Public)
            .adding_inherited_type(TypeIdentifier::named("Entity"))
            .adding_member(
                TypeAlias::new(TypeIdentifier::named("Identifier"), identifier_type(entity))
                    .with_access_level(AccessLevel::Public),
            )
            .adding_member(
                TypeAlias::new(TypeIdentifier::named("IndexName"), index_name)
                    .with_access_level(AccessLevel::Public),
            )
            .adding_member(Node::EmptyLine);

        if entity.has_void_identifier() {
            let void = identifier_type(entity);
            ty = ty.adding_member(
                Property::new(Variable::new("identifier").with_type(void.clone()))
                    .with_access_level(AccessLevel::Public)
                    .with_body(vec![Node::return_value(void.reference().call_empty())]),
            );
        }

        let members = self.stored_members(entity)?;
        let mut init = Function::init().with_access_level(AccessLevel::Public);
        for (name, member_type) in &members {
            ty = ty.adding_member(
                Property::new(Variable::new(name.clone()).with_type(member_type.clone()))
                    .with_access_level(AccessLevel::Public),
            );
            init = init
                .adding_parameter(FunctionParameter::new(name.clone(), member_type.clone()))
                .adding_statement(Assignment::new(
                    Reference::self_ref().member(name.clone()),
                    Reference::named(name.clone()),
                ));
        }

        Ok(ty.adding_member(Node::EmptyLine).adding_member(init))
    }

    fn payload_initializer(&self, entity: &Entity) -> Extension {
        let payload = Reference::named("payload");
        let mut arguments = Tuple::new();
        if !entity.has_void_identifier() {
            arguments = arguments.adding_named("identifier", payload.clone().member("identifier"));
        }
        for property in entity.stored_properties() {
            let name = variable_name(&property.name);
            let value = payload_value(property, payload.clone().member(name.clone()));
            arguments = arguments.adding_named(name, value);
        }

        Extension::new(entity_type(&entity.name)).adding_member(
            Function::convenience_init()
                .adding_parameter(FunctionParameter::new("payload", payload_type(&entity.name)))
                .adding_statement(Reference::self_ref().member("init").call(arguments)),
        )
    }

    fn equatable(&self, entity: &Entity) -> Extension {
        let ty = entity_type(&entity.name);
        let mut function = Function::operator("==")
            .with_access_level(AccessLevel::Public)
            .adding_parameter(FunctionParameter::new("lhs", ty.clone()))
            .adding_parameter(FunctionParameter::new("rhs", ty.clone()))
            .with_result_type(TypeIdentifier::bool());
        for property in entity.equality_properties() {
            let name = variable_name(&property.name);
            let comparison = Reference::named("lhs")
                .member(name.clone())
                .equals(Reference::named("rhs").member(name));
            function = function.adding_statement(
                Guard::new(comparison).adding_else_statement(Node::return_value(Reference::bool(false))),
            );
        }
        function = function.adding_statement(Node::return_value(Reference::bool(true)));

        Extension::new(ty)
            .adding_inherited_type(TypeIdentifier::named("Equatable"))
            .adding_member(function)
    }

    fn index_name(&self, entity: &Entity) -> Type {
        Type::new(index_name_type(&entity.name), TypeKind::ENUM)
            .with_access_level(AccessLevel::Public)
            .adding_members(
                entity
                    .stored_properties()
                    .into_iter()
                    .map(|property| Case::new(variable_name(&property.name)).into()),
            )
    }

    fn index_value_accessor(&self, entity: &Entity) -> Result<Extension, CodegenError> {
        let mut switch = Switch::new(Reference::named("indexName"));
        for property in entity.stored_properties() {
            let name = variable_name(&property.name);
            let value = self.index_value(entity, property, Reference::named(name.clone()))?;
            switch = switch.adding_case(
                SwitchCase::tag(name).adding_statement(Node::return_value(value)),
            );
        }

        Ok(Extension::new(entity_type(&entity.name)).adding_member(
            Function::named("entityIndexValue")
                .with_access_level(AccessLevel::Public)
                .adding_parameter(
                    FunctionParameter::new("indexName", index_name_type(&entity.name))
                        .with_alias("for"),
                )
                .with_result_type(TypeIdentifier::named("EntityIndexValue"))
                .adding_statement(switch),
        ))
    }

    /// Projects a property value into an index value, flat-mapping through
    /// lazy and optional wrappers first.
    fn index_value(
        &self,
        entity: &Entity,
        property: &EntityProperty,
        value: Reference,
    ) -> Result<Reference, CodegenError> {
        let projected = self.collection_index_value(entity, property, Reference::named("value"))?;
        let wrapped = |inner: Reference| {
            Reference::dot("optional").call(Tuple::new().adding_unnamed(
                inner.member("map").call_block(
                    Block::new()
                        .adding_parameter("value")
                        .adding_statement(projected.clone()),
                ),
            ))
        };

        if property.lazy {
            let mut inner = value.member("value").call_empty();
            if property.optional {
                inner = inner
                    .member("flatMap")
                    .call_block(Block::expression(Reference::named("$0")));
            }
            return Ok(wrapped(inner));
        }
        if property.optional {
            return Ok(wrapped(value));
        }
        self.collection_index_value(entity, property, value)
    }

    fn collection_index_value(
        &self,
        entity: &Entity,
        property: &EntityProperty,
        value: Reference,
    ) -> Result<Reference, CodegenError> {
        if !property.is_collection() {
            return self.element_index_value(entity, property, value);
        }
        let element = self.element_index_value(entity, property, Reference::named("$0"))?;
        let sequence = value
            .member("lazy")
            .member("map")
            .call_block(Block::expression(element))
            .member("any");
        Ok(Reference::dot("array").call(Tuple::new().adding_unnamed(sequence)))
    }

    fn element_index_value(
        &self,
        entity: &Entity,
        property: &EntityProperty,
        value: Reference,
    ) -> Result<Reference, CodegenError> {
        let source = format!("{}.{}", entity.name, property.name);
        let wrap = |case: &str, inner: Reference| {
            Reference::dot(case.to_string()).call(Tuple::new().adding_unnamed(inner))
        };
        Ok(match &property.property_type {
            PropertyType::Scalar(scalar) => wrap(scalar.name(), value),
            PropertyType::Subtype(name) => {
                let subtype = self.descriptions.subtype(name, &source)?;
                wrap("subtype", wrap(&variable_name(&subtype.name), value))
            }
            PropertyType::Relationship(relationship) => {
                let target =
                    self.descriptions
                        .relationship_target(entity, &property.name, relationship)?;
                wrap("relationship", wrap(&variable_name(&target.name), value))
            }
        })
    }

    fn merging(&self, entity: &Entity) -> Extension {
        let ty = entity_type(&entity.name);
        let updated = Reference::named("updated");
        let mut arguments = Tuple::new();
        if !entity.has_void_identifier() {
            arguments = arguments.adding_named("identifier", updated.clone().member("identifier"));
        }
        for property in entity.stored_properties() {
            let name = variable_name(&property.name);
            let value = if property.lazy {
                Reference::named(name.clone())
                    .member("merging")
                    .call(Tuple::new().adding_named("with", updated.clone().member(name.clone())))
            } else {
                updated.clone().member(name.clone())
            };
            arguments = arguments.adding_named(name, value);
        }

        Extension::new(ty.clone()).adding_member(
            Function::named("merging")
                .adding_parameter(FunctionParameter::new("updated", ty.clone()).with_alias("_"))
                .with_result_type(ty.clone())
                .adding_statement(Node::return_value(ty.reference().call(arguments))),
        )
    }
}

/// Maps a payload field to the entity constructor argument.
///
/// Embedded relationship payloads are reduced to their identifiers; lazy
/// values are mapped inside their wrapper.
fn payload_value(property: &EntityProperty, value: Reference) -> Reference {
    let Some(relationship) = property.relationship_type() else {
        return value;
    };
    if relationship.id_only {
        return value;
    }
    let project = |base: Reference| {
        let base = base.optional_if(property.optional);
        match relationship.association {
            Association::ToOne => base.member("identifier"),
            Association::ToMany => base
                .member("lazy")
                .member("map")
                .call_block(Block::expression(Reference::named("$0").member("identifier")))
                .member("any"),
        }
    };
    if property.lazy {
        value.member("map").call_block(
            Block::new()
                .adding_parameter("value")
                .adding_statement(project(Reference::named("value"))),
        )
    } else {
        project(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironmeta_core::render_file;
    use ironmeta_schema::parse_descriptions;

    const ITEM_XML: &str = r#"<descriptions version="1.0.0">
        <subtypes>
            <subtype name="genre"><case name="fiction"/><case name="drama"/></subtype>
        </subtypes>
        <entities>
            <entity name="tag" persist="true"/>
            <entity name="item" persist="true">
                <property name="tags" relationship="tag" association="toMany" optional="true"/>
                <property name="title" type="string"/>
                <property name="genre" subtype="genre" useForEquality="false"/>
                <property name="views" type="int" lazy="true"/>
            </entity>
        </entities>
    </descriptions>"#;

    fn render_item() -> String {
        let descriptions = parse_descriptions(ITEM_XML).expect("Failed to parse");
        let item = descriptions.get_entity("item").expect("item");
        let file = EntityGenerator::new(&descriptions)
            .generate_entity(item)
            .expect("Failed to generate");
        render_file(&file)
    }

    #[test]
    fn test_stored_properties_in_storage_order() {
        let output = render_item();
        let identifier = output.find("public let identifier: ItemIdentifier").expect("identifier");
        let title = output.find("public let title: String").expect("title");
        let genre = output.find("public let genre: Genre").expect("genre");
        let views = output.find("public let views: Lazy<Int>").expect("views");
        let tags = output
            .find("public let tags: AnySequence<TagIdentifier>?")
            .expect("tags");
        assert!(identifier < title && title < genre && genre < views && views < tags);
    }

    #[test]
    fn test_payload_initializer_maps_relationships() {
        let output = render_item();
        assert!(output.contains("convenience init(payload: DefaultItemPayload) {"));
        assert!(output.contains("tags: payload.tags?.lazy.map { $0.identifier }.any"));
        assert!(output.contains("title: payload.title"));
    }

    #[test]
    fn test_equality_skips_excluded_properties() {
        let output = render_item();
        assert!(output.contains("public static func == (lhs: Item, rhs: Item) -> Bool {"));
        assert!(output.contains("guard lhs.title == rhs.title else { return false }"));
        assert!(output.contains("guard lhs.tags == rhs.tags else { return false }"));
        assert!(!output.contains("lhs.genre"));
    }

    #[test]
    fn test_index_values() {
        let output = render_item();
        assert!(output.contains("public enum ItemIndexName {"));
        assert!(output.contains("return .string(title)"));
        assert!(output.contains("return .subtype(.genre(genre))"));
        assert!(output.contains("return .optional(views.value().map { value in .int(value) })"));
        assert!(output.contains(
            "return .optional(tags.map { value in .array(value.lazy.map { .relationship(.tag($0)) }.any) })"
        ));
    }

    #[test]
    fn test_lazy_merge() {
        let output = render_item();
        assert!(output.contains("func merging(_ updated: Item) -> Item {"));
        assert!(output.contains("views: views.merging(with: updated.views)"));
        assert!(output.contains("title: updated.title"));
    }

    #[test]
    fn test_void_identifier_entity() {
        let descriptions = parse_descriptions(
            r#"<descriptions version="1.0.0"><entities>
                <entity name="settings"><identifier type="void"/>
                    <property name="theme" type="string"/>
                </entity>
            </entities></descriptions>"#,
        )
        .expect("Failed to parse");
        let files = EntityGenerator::new(&descriptions)
            .generate()
            .expect("Failed to generate");
        let output = render_file(&files[0]);
        assert!(output.contains("public var identifier: VoidEntityIdentifier {"));
        assert!(output.contains("public init(theme: String) {"));
        assert!(output.contains("self.init(theme: payload.theme)"));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let descriptions = parse_descriptions(ITEM_XML).expect("Failed to parse");
        let generator = EntityGenerator::new(&descriptions);
        let first = generator.generate().expect("Failed to generate");
        let second = generator.generate().expect("Failed to generate");
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_relationship_target() {
        let descriptions = parse_descriptions(
            r#"<descriptions version="1.0.0"><entities>
                <entity name="item"><property name="owner" relationship="user"/></entity>
            </entities></descriptions>"#,
        )
        .expect("Failed to parse");
        let err = EntityGenerator::new(&descriptions)
            .generate()
            .expect_err("user is not declared");
        assert!(err.to_string().contains("item.owner"));
    }
}
