//! Entity graph generation.
//!
//! `AppAnyEntity` is a closed union over every entity. `EntityGraph`
//! indexes inserted entities by identifier, keeps identifier-less entities in
//! insertion order, and merges entities with lazy properties instead of
//! overwriting them.

use ironmeta_core::{
    AccessLevel, Assignment, Block, Case, File, Function, FunctionParameter, GenericConstraint,
    Node, Property, Reference, Switch, SwitchCase, SwitchPattern, Tuple, Type, TypeIdentifier,
    TypeKind, Variable,
};
use ironmeta_schema::{Descriptions, Entity};

use super::source_file;
use super::types::{entity_type, identifier_type, variable_name};

/// Name of the generated entity union.
pub const ANY_ENTITY_TYPE: &str = "AppAnyEntity";

/// Generator for the entity union and graph.
pub struct GraphGenerator<'a> {
    descriptions: &'a Descriptions,
}

impl<'a> GraphGenerator<'a> {
    /// Creates a new graph generator.
    #[must_use]
    pub fn new(descriptions: &'a Descriptions) -> Self {
        Self { descriptions }
    }

    /// Generates `EntityGraph.swift`.
    #[must_use]
    pub fn generate(&self) -> File {
        let any_entity = Type::new(TypeIdentifier::named(ANY_ENTITY_TYPE), TypeKind::ENUM)
            .with_access_level(AccessLevel::Public)
            .adding_members(self.descriptions.entities.iter().map(|entity| {
                Case::new(variable_name(&entity.name))
                    .adding_associated_type(entity_type(&entity.name))
                    .into()
            }));

        let mut graph = Type::new(TypeIdentifier::named("EntityGraph"), TypeKind::FINAL_CLASS)
            .with_access_level(AccessLevel::Public);
        let mut switch = Switch::new(Reference::named("entity"));
        for entity in &self.descriptions.entities {
            let storage = storage_name(entity);
            let storage_type = if entity.has_void_identifier() {
                entity_type(&entity.name).array()
            } else {
                TypeIdentifier::dictionary(identifier_type(entity), entity_type(&entity.name))
            };
            graph = graph.adding_member(
                Property::new(Variable::new(storage.clone()).with_immutable(false))
                    .with_access_level(AccessLevel::Public)
                    .with_setter_access_level(AccessLevel::Private)
                    .with_value(storage_type.reference().call_empty()),
            );
            switch = switch.adding_case(
                SwitchCase::new(SwitchPattern::TagWithBindings(
                    variable_name(&entity.name),
                    vec!["value".to_string()],
                ))
                .adding_statement(insertion(entity, &storage)),
            );
        }

        let insert = Function::named("insert")
            .with_access_level(AccessLevel::Public)
            .adding_generic_parameter(TypeIdentifier::named("S"))
            .adding_parameter(
                FunctionParameter::new("entities", TypeIdentifier::named("S")).with_alias("_"),
            )
            .adding_constraint(GenericConstraint::conforms(
                TypeIdentifier::named("S"),
                TypeIdentifier::named("Sequence"),
            ))
            .adding_constraint(GenericConstraint::equals(
                TypeIdentifier::named("S.Element"),
                TypeIdentifier::named(ANY_ENTITY_TYPE),
            ));
        let insert = if self.descriptions.entities.is_empty() {
            insert
        } else {
            insert.adding_statement(Reference::named("entities").member("forEach").call_block(
                Block::new().adding_parameter("entity").adding_statement(switch),
            ))
        };

        let graph = graph
            .adding_member(Node::EmptyLine)
            .adding_member(Function::init().with_access_level(AccessLevel::Public))
            .adding_member(Node::EmptyLine)
            .adding_member(insert);

        source_file("EntityGraph").adding_separated([any_entity.into(), graph.into()])
    }
}

/// `itemByIdentifier`, or `settingsList` for identifier-less entities.
fn storage_name(entity: &Entity) -> String {
    if entity.has_void_identifier() {
        format!("{}List", variable_name(&entity.name))
    } else {
        format!("{}ByIdentifier", variable_name(&entity.name))
    }
}

fn insertion(entity: &Entity, storage: &str) -> Node {
    let value = Reference::named("value");
    if entity.has_void_identifier() {
        return Reference::named(storage)
            .member("append")
            .call(Tuple::new().adding_unnamed(value))
            .into();
    }
    let slot = Reference::named(storage).subscript(value.clone().member("identifier"));
    let stored = if entity.has_lazy_properties() {
        slot.clone()
            .member("map")
            .call_block(Block::expression(
                Reference::named("$0")
                    .member("merging")
                    .call(Tuple::new().adding_unnamed(value.clone())),
            ))
            .nil_coalescing(value)
    } else {
        value
    };
    Assignment::new(slot, stored).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironmeta_core::render_file;
    use ironmeta_schema::parse_descriptions;

    fn render() -> String {
        let descriptions = parse_descriptions(
            r#"<descriptions version="1.0.0"><entities>
                <entity name="item"><property name="views" type="int" lazy="true"/></entity>
                <entity name="tag"/>
                <entity name="settings"><identifier type="void"/></entity>
            </entities></descriptions>"#,
        )
        .expect("Failed to parse");
        render_file(&GraphGenerator::new(&descriptions).generate())
    }

    #[test]
    fn test_any_entity_union() {
        let output = render();
        assert!(output.contains(
            "public enum AppAnyEntity {\n    case item(Item)\n    case tag(Tag)\n    case settings(Settings)\n}"
        ));
    }

    #[test]
    fn test_graph_storage() {
        let output = render();
        assert!(output.contains("public private(set) var itemByIdentifier = [ItemIdentifier: Item]()"));
        assert!(output.contains("public private(set) var settingsList = [Settings]()"));
        assert!(output.contains(
            "public func insert<S>(_ entities: S) where S: Sequence, S.Element == AppAnyEntity {"
        ));
    }

    #[test]
    fn test_lazy_entities_merge_on_insert() {
        let output = render();
        assert!(output.contains(
            "itemByIdentifier[value.identifier] = itemByIdentifier[value.identifier].map { $0.merging(value) } ?? value"
        ));
        assert!(output.contains("tagByIdentifier[value.identifier] = value"));
        assert!(output.contains("case .settings(let value):\n                settingsList.append(value)"));
    }
}
