//! Identifier type generation.
//!
//! Emits one identifier class per entity with an identity of its own, and a
//! shared file of conversions between identifiers that refer to the same
//! object:
//! - an entity and the entity its identifier is declared equivalent to
//! - a relationship-derived identifier and each contributing entity
//!
//! Both directions are emitted for every pair. Equivalence is followed for a
//! single hop only: `a ~ b` and `b ~ c` never yield an `a`/`c` conversion.

use std::collections::BTreeSet;

use ironmeta_core::{
    AccessLevel, Assignment, Case, Extension, File, Function, FunctionParameter, InfixOperator, Node,
    Property,
    Reference, Tuple, Type, TypeAlias, TypeIdentifier, TypeKind, Variable,
};
use ironmeta_schema::{Descriptions, Entity, IdentifierValueType};

use super::source_file;
use super::types::{identifier_type_named, identifier_value_type};
use crate::error::CodegenError;

/// Generator for identifier types.
pub struct IdentifierGenerator<'a> {
    descriptions: &'a Descriptions,
}

impl<'a> IdentifierGenerator<'a> {
    /// Creates a new identifier generator.
    #[must_use]
    pub fn new(descriptions: &'a Descriptions) -> Self {
        Self { descriptions }
    }

    /// Generates every identifier file followed by the conversions file.
    ///
    /// # Errors
    /// Returns `CodegenError` if an equivalence or contributing relationship
    /// cannot be resolved.
    pub fn generate(&self) -> Result<Vec<File>, CodegenError> {
        let mut files: Vec<File> = self
            .descriptions
            .entities
            .iter()
            .filter(|entity| !entity.has_void_identifier())
            .map(|entity| self.generate_identifier(entity))
            .collect::<Result<_, _>>()?;
        if let Some(conversions) = self.generate_conversions()? {
            files.push(conversions);
        }
        Ok(files)
    }

    /// Generates the identifier file of one entity.
    ///
    /// # Errors
    /// Returns `CodegenError::ShapeMismatch` if the entity has no identity.
    pub fn generate_identifier(&self, entity: &Entity) -> Result<File, CodegenError> {
        let remote = entity
            .identifier
            .value_type()
            .ok_or_else(|| CodegenError::shape_mismatch(&entity.name, "entity has a void identifier"))?;
        let ty = identifier_type_named(&entity.name);
        let value_type = value_box_type(remote);

        let mut identifier = Type::new(ty.clone(), TypeKind::FINAL_CLASS)
            .with_access_level(AccessLevel::Public)
            .adding_inherited_types(["Codable", "Hashable", "Comparable"].map(TypeIdentifier::named));
        if entity.persist {
            identifier = identifier.adding_inherited_type(TypeIdentifier::named("CoreDataIdentifier"));
        }
        if entity.remote {
            identifier = identifier.adding_inherited_type(TypeIdentifier::named("RemoteIdentifier"));
        }

        let identifier = identifier
            .adding_member(
                TypeAlias::new(TypeIdentifier::named("LocalValueType"), TypeIdentifier::string())
                    .with_access_level(AccessLevel::Public),
            )
            .adding_member(
                TypeAlias::new(
                    TypeIdentifier::named("RemoteValueType"),
                    identifier_value_type(remote),
                )
                .with_access_level(AccessLevel::Public),
            )
            .adding_member(Node::EmptyLine)
            .adding_member(
                Property::new(Variable::new("entityTypeUID").with_static(true))
                    .with_access_level(AccessLevel::Public)
                    .with_value(Reference::string(entity.name.clone())),
            )
            .adding_member(
                Property::new(Variable::new("identifierTypeID").with_type(TypeIdentifier::string()))
                    .with_access_level(AccessLevel::Public),
            )
            .adding_member(
                Property::new(
                    Variable::new("property").with_type(
                        TypeIdentifier::named("PropertyBox").adding_generic_parameter(value_type.clone()),
                    ),
                ),
            )
            .adding_member(
                Property::new(Variable::new("value").with_type(value_type.clone()))
                    .with_access_level(AccessLevel::Public)
                    .with_body(vec![Node::return_value(Reference::named("property").member("value"))]),
            )
            .adding_member(Node::EmptyLine)
            .adding_member(designated_init(&ty, &value_type))
            .adding_member(Node::EmptyLine)
            .adding_member(coding_keys())
            .adding_member(Node::EmptyLine)
            .adding_member(decoding_init(&value_type))
            .adding_member(Node::EmptyLine)
            .adding_member(encode_function())
            .adding_member(Node::EmptyLine)
            .adding_member(update_function(&ty))
            .adding_member(Node::EmptyLine)
            .adding_members(comparison_functions(&ty));

        Ok(source_file(&ty.name).adding(identifier))
    }

    /// Returns every `(target, source)` conversion pair, sorted.
    ///
    /// # Errors
    /// Returns `CodegenError::Schema` if a referenced entity is missing, or
    /// `CodegenError::ShapeMismatch` if it has no identity.
    pub fn conversion_pairs(&self) -> Result<BTreeSet<(String, String)>, CodegenError> {
        let mut pairs = BTreeSet::new();
        for entity in &self.descriptions.entities {
            let mut related = Vec::new();
            if let Some(equivalent) = self.descriptions.equivalent_entity(entity)? {
                related.push(equivalent);
            }
            related.extend(self.descriptions.identifier_contributors(entity)?);

            for other in related {
                for side in [entity, other] {
                    if side.has_void_identifier() {
                        return Err(CodegenError::shape_mismatch(
                            &side.name,
                            format!(
                                "void identifier cannot convert to or from '{}'",
                                if side.name == entity.name { &other.name } else { &entity.name }
                            ),
                        ));
                    }
                }
                if other.name != entity.name {
                    pairs.insert((entity.name.clone(), other.name.clone()));
                    pairs.insert((other.name.clone(), entity.name.clone()));
                }
            }
        }
        Ok(pairs)
    }

    /// Generates the conversions file, or `None` when no identifiers relate.
    ///
    /// # Errors
    /// Returns `CodegenError` if a conversion pair cannot be resolved.
    pub fn generate_conversions(&self) -> Result<Option<File>, CodegenError> {
        let pairs = self.conversion_pairs()?;
        if pairs.is_empty() {
            return Ok(None);
        }

        let mut nodes = Vec::with_capacity(pairs.len());
        for (target, source) in &pairs {
            let target_entity = self.descriptions.entity(target, source)?;
            let source_entity = self.descriptions.entity(source, target)?;
            let source_value = Reference::named("identifier").member("value");
            let value = if target_entity.identifier.value_type() == source_entity.identifier.value_type() {
                source_value
            } else {
                source_value.member("converted").call_empty()
            };
            nodes.push(
                Extension::new(identifier_type_named(target))
                    .adding_member(
                        Function::convenience_init()
                            .adding_parameter(
                                FunctionParameter::new("identifier", identifier_type_named(source))
                                    .with_alias("_"),
                            )
                            .adding_statement(
                                Reference::self_ref().member("init").call(
                                    Tuple::new().adding_named("value", value).adding_named(
                                        "identifierTypeID",
                                        Reference::named("identifier").member("identifierTypeID"),
                                    ),
                                ),
                            ),
                    )
                    .into(),
            );
        }
        Ok(Some(source_file("IdentifierConversions").adding_separated(nodes)))
    }
}

fn value_box_type(remote: IdentifierValueType) -> TypeIdentifier {
    TypeIdentifier::named("IdentifierValueType")
        .adding_generic_parameter(TypeIdentifier::string())
        .adding_generic_parameter(identifier_value_type(remote))
}

fn designated_init(ty: &TypeIdentifier, value_type: &TypeIdentifier) -> Function {
    Function::init()
        .with_access_level(AccessLevel::Public)
        .adding_parameter(FunctionParameter::new("value", value_type.clone()))
        .adding_parameter(
            FunctionParameter::new("identifierTypeID", TypeIdentifier::string().optional())
                .with_default_value(Reference::nil()),
        )
        .adding_statement(Assignment::new(
            Reference::named("property"),
            TypeIdentifier::named("PropertyBox").reference().call(
                Tuple::new()
                    .adding_unnamed(Reference::named("value"))
                    .adding_named("atomic", Reference::bool(false)),
            ),
        ))
        .adding_statement(Assignment::new(
            Reference::self_ref().member("identifierTypeID"),
            Reference::named("identifierTypeID")
                .nil_coalescing(ty.reference().member("entityTypeUID")),
        ))
}

fn coding_keys() -> Type {
    Type::new(TypeIdentifier::named("Keys"), TypeKind::ENUM)
        .with_access_level(AccessLevel::Private)
        .adding_inherited_type(TypeIdentifier::string())
        .adding_inherited_type(TypeIdentifier::named("CodingKey"))
        .adding_member(Case::new("value"))
        .adding_member(Case::new("identifierTypeID"))
}

fn container(source: &str, mutable: bool) -> Property {
    let call = Reference::named(source).member("container").call(
        Tuple::new().adding_named("keyedBy", TypeIdentifier::named("Keys").metatype().reference()),
    );
    Property::new(Variable::new("container").with_immutable(!mutable)).with_value(if mutable {
        call
    } else {
        Reference::try_expr(call)
    })
}

fn decoding_init(value_type: &TypeIdentifier) -> Function {
    let decode = |ty: TypeIdentifier, key: &str| {
        Reference::try_expr(
            Reference::named("container").member("decode").call(
                Tuple::new()
                    .adding_unnamed(ty.metatype().reference())
                    .adding_named("forKey", Reference::dot(key)),
            ),
        )
    };
    Function::convenience_init()
        .with_access_level(AccessLevel::Public)
        .adding_parameter(
            FunctionParameter::new("decoder", TypeIdentifier::named("Decoder")).with_alias("from"),
        )
        .with_throws(true)
        .adding_statement(container("decoder", false))
        .adding_statement(
            Property::new(Variable::new("value")).with_value(decode(value_type.clone(), "value")),
        )
        .adding_statement(
            Property::new(Variable::new("identifierTypeID"))
                .with_value(decode(TypeIdentifier::string(), "identifierTypeID")),
        )
        .adding_statement(
            Reference::self_ref().member("init").call(
                Tuple::new()
                    .adding_named("value", Reference::named("value"))
                    .adding_named("identifierTypeID", Reference::named("identifierTypeID")),
            ),
        )
}

fn encode_function() -> Function {
    let encode = |value: Reference, key: &str| {
        Reference::try_expr(
            Reference::named("container").member("encode").call(
                Tuple::new()
                    .adding_unnamed(value)
                    .adding_named("forKey", Reference::dot(key)),
            ),
        )
    };
    Function::named("encode")
        .with_access_level(AccessLevel::Public)
        .adding_parameter(FunctionParameter::new("encoder", TypeIdentifier::named("Encoder")).with_alias("to"))
        .with_throws(true)
        .adding_statement(container("encoder", true))
        .adding_statement(encode(Reference::named("property").member("value"), "value"))
        .adding_statement(encode(Reference::named("identifierTypeID"), "identifierTypeID"))
}

/// `update(with:)` merges a remote value received for the same object.
fn update_function(ty: &TypeIdentifier) -> Function {
    Function::named("update")
        .with_access_level(AccessLevel::Public)
        .adding_parameter(FunctionParameter::new("identifier", ty.clone()).with_alias("with"))
        .adding_statement(
            Reference::named("property").member("value").member("merge").call(
                Tuple::new().adding_named("with", Reference::named("identifier").member("value")),
            ),
        )
}

fn comparison_functions(ty: &TypeIdentifier) -> Vec<Node> {
    let lhs = Reference::named("lhs");
    let rhs = Reference::named("rhs");
    let operands = |function: Function| {
        function
            .with_access_level(AccessLevel::Public)
            .adding_parameter(FunctionParameter::new("lhs", ty.clone()))
            .adding_parameter(FunctionParameter::new("rhs", ty.clone()))
            .with_result_type(TypeIdentifier::bool())
    };

    let equal = operands(Function::operator("==")).adding_statement(Node::return_value(
        lhs.clone()
            .member("value")
            .equals(rhs.clone().member("value"))
            .and(
                lhs.clone()
                    .member("identifierTypeID")
                    .equals(rhs.clone().member("identifierTypeID")),
            ),
    ));
    let hash = Function::named("hash")
        .with_access_level(AccessLevel::Public)
        .adding_parameter(
            FunctionParameter::new("hasher", TypeIdentifier::named("Hasher"))
                .with_alias("into")
                .with_inout(true),
        )
        .adding_statement(
            Reference::named("hasher")
                .member("combine")
                .call(Tuple::new().adding_unnamed(Reference::named("value"))),
        )
        .adding_statement(
            Reference::named("hasher")
                .member("combine")
                .call(Tuple::new().adding_unnamed(Reference::named("identifierTypeID"))),
        );
    let less = operands(Function::operator("<")).adding_statement(Node::return_value(
        lhs.member("value")
            .infix(InfixOperator::Less, rhs.member("value")),
    ));

    vec![equal.into(), Node::EmptyLine, hash.into(), Node::EmptyLine, less.into()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironmeta_core::render_file;
    use ironmeta_schema::parse_descriptions;

    #[test]
    fn test_identifier_type() {
        let descriptions = parse_descriptions(
            r#"<descriptions version="1.0.0"><entities>
                <entity name="item" persist="true"><identifier type="int"/></entity>
            </entities></descriptions>"#,
        )
        .expect("Failed to parse");
        let item = descriptions.get_entity("item").expect("item");
        let file = IdentifierGenerator::new(&descriptions)
            .generate_identifier(item)
            .expect("Failed to generate");
        assert_eq!(file.name, "ItemIdentifier.swift");

        let output = render_file(&file);
        assert!(output.contains(
            "public final class ItemIdentifier: Codable, Hashable, Comparable, CoreDataIdentifier, RemoteIdentifier {"
        ));
        assert!(output.contains("public typealias RemoteValueType = Int"));
        assert!(output.contains("public static let entityTypeUID = \"item\""));
        assert!(output.contains("public var value: IdentifierValueType<String, Int> {"));
        assert!(output.contains(
            "self.identifierTypeID = identifierTypeID ?? ItemIdentifier.entityTypeUID"
        ));
        assert!(output.contains(
            "let value = try container.decode(IdentifierValueType<String, Int>.self, forKey: .value)"
        ));
        assert!(output.contains("var container = encoder.container(keyedBy: Keys.self)"));
        assert!(output.contains("public func hash(into hasher: inout Hasher) {"));
    }

    #[test]
    fn test_equivalence_is_not_transitive() {
        let descriptions = parse_descriptions(
            r#"<descriptions version="1.0.0"><entities>
                <entity name="a"><identifier type="int" equivalent="b"/></entity>
                <entity name="b"><identifier type="int" equivalent="c"/></entity>
                <entity name="c"/>
            </entities></descriptions>"#,
        )
        .expect("Failed to parse");
        let pairs = IdentifierGenerator::new(&descriptions)
            .conversion_pairs()
            .expect("Failed to resolve");
        let expected: BTreeSet<(String, String)> = [("a", "b"), ("b", "a"), ("b", "c"), ("c", "b")]
            .into_iter()
            .map(|(x, y)| (x.to_string(), y.to_string()))
            .collect();
        assert_eq!(pairs, expected);

        let file = IdentifierGenerator::new(&descriptions)
            .generate_conversions()
            .expect("Failed to generate")
            .expect("conversions exist");
        let output = render_file(&file);
        assert!(output.contains("extension AIdentifier {"));
        assert!(output.contains("convenience init(_ identifier: BIdentifier) {"));
        assert!(!output.contains("extension AIdentifier {\n    convenience init(_ identifier: CIdentifier)"));
        assert!(!output.contains("extension CIdentifier {\n    convenience init(_ identifier: AIdentifier)"));
    }

    #[test]
    fn test_relationship_identifiers_convert_both_ways() {
        let descriptions = parse_descriptions(
            r#"<descriptions version="1.0.0"><entities>
                <entity name="user"/>
                <entity name="membership">
                    <identifier type="relationships" valueType="string">
                        <relationship name="user" entity="user"/>
                    </identifier>
                </entity>
            </entities></descriptions>"#,
        )
        .expect("Failed to parse");
        let file = IdentifierGenerator::new(&descriptions)
            .generate_conversions()
            .expect("Failed to generate")
            .expect("conversions exist");
        let output = render_file(&file);
        assert!(output.contains("extension MembershipIdentifier {\n    convenience init(_ identifier: UserIdentifier) {"));
        assert!(output.contains("extension UserIdentifier {\n    convenience init(_ identifier: MembershipIdentifier) {"));
        assert!(output.contains("self.init(value: identifier.value.converted(), identifierTypeID: identifier.identifierTypeID)"));
    }

    #[test]
    fn test_void_identifiers_are_skipped() {
        let descriptions = parse_descriptions(
            r#"<descriptions version="1.0.0"><entities>
                <entity name="settings"><identifier type="void"/></entity>
            </entities></descriptions>"#,
        )
        .expect("Failed to parse");
        let files = IdentifierGenerator::new(&descriptions)
            .generate()
            .expect("Failed to generate");
        assert!(files.is_empty());
    }

    #[test]
    fn test_missing_equivalent_entity() {
        let descriptions = parse_descriptions(
            r#"<descriptions version="1.0.0"><entities>
                <entity name="a"><identifier type="int" equivalent="ghost"/></entity>
            </entities></descriptions>"#,
        )
        .expect("Failed to parse");
        let err = IdentifierGenerator::new(&descriptions)
            .generate()
            .expect_err("ghost is missing");
        assert!(err.to_string().contains("a.identifier"));
    }
}
