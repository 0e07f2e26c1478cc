//! Subtype generation.
//!
//! Enums are string backed and reject retired raw values with a different
//! error than unknown ones. Option sets keep the bit of every option at its
//! index in the full declared list. Value structs get a keyed decoder and
//! encoder.

use ironmeta_core::{
    AccessLevel, Assignment, Case, Comment, Extension, File, Function, FunctionParameter, InfixOperator, Node,
    Property, Reference, Switch, SwitchCase, SwitchPattern, Tuple, Type, TypeIdentifier, TypeKind,
    Variable,
};
use ironmeta_schema::{Descriptions, Subtype, SubtypeCase, SubtypeItems, SubtypeProperty};

use super::payload::coding_keys;
use super::source_file;
use super::types::{subtype_member_type, subtype_type, variable_name};
use crate::error::CodegenError;

/// Name of the error raised by generated enum initializers.
pub const SUBTYPE_ERROR: &str = "SubtypeError";

/// Generator for subtypes.
pub struct SubtypeGenerator<'a> {
    descriptions: &'a Descriptions,
}

impl<'a> SubtypeGenerator<'a> {
    /// Creates a new subtype generator.
    #[must_use]
    pub fn new(descriptions: &'a Descriptions) -> Self {
        Self { descriptions }
    }

    /// Generates the shared error file, when any enum exists, followed by
    /// one file per subtype.
    ///
    /// # Errors
    /// Returns `CodegenError` if a subtype cannot be emitted.
    pub fn generate(&self) -> Result<Vec<File>, CodegenError> {
        let mut files = Vec::with_capacity(self.descriptions.subtypes.len() + 1);
        if self.descriptions.subtypes.iter().any(Subtype::is_enum) {
            files.push(subtype_error_file());
        }
        for subtype in &self.descriptions.subtypes {
            files.push(self.generate_subtype(subtype)?);
        }
        Ok(files)
    }

    /// Generates the file of one subtype.
    ///
    /// # Errors
    /// Returns `CodegenError::ShapeMismatch` for an enum without used cases,
    /// or `CodegenError::Schema` if a struct member names a missing subtype.
    pub fn generate_subtype(&self, subtype: &Subtype) -> Result<File, CodegenError> {
        let ty = subtype_type(&subtype.name);
        let nodes: Vec<Node> = match &subtype.items {
            SubtypeItems::Cases(cases) => enum_nodes(subtype, &ty, cases)?,
            SubtypeItems::Options(_) => vec![option_set(subtype, &ty).into()],
            SubtypeItems::Properties(properties) => {
                vec![self.value_struct(subtype, &ty, properties)?.into()]
            }
        };
        Ok(source_file(&ty.name).adding_separated(nodes))
    }

    fn value_struct(
        &self,
        subtype: &Subtype,
        ty: &TypeIdentifier,
        properties: &[SubtypeProperty],
    ) -> Result<Type, CodegenError> {
        let mut value = Type::new(ty.clone(), TypeKind::Struct)
            .with_access_level(AccessLevel::Public)
            .adding_inherited_type(TypeIdentifier::named("Codable"));
        let mut init = Function::init().with_access_level(AccessLevel::Public);
        let mut decoding = Function::init()
            .with_access_level(AccessLevel::Public)
            .adding_parameter(
                FunctionParameter::new("decoder", TypeIdentifier::named("Decoder")).with_alias("from"),
            )
            .with_throws(true)
            .adding_statement(keyed_container("decoder", false));
        let mut encoding = Function::named("encode")
            .with_access_level(AccessLevel::Public)
            .adding_parameter(
                FunctionParameter::new("encoder", TypeIdentifier::named("Encoder")).with_alias("to"),
            )
            .with_throws(true)
            .adding_statement(keyed_container("encoder", true));
        let mut keys = Vec::with_capacity(properties.len());

        for property in properties {
            let name = variable_name(&property.name);
            let member_type = subtype_member_type(self.descriptions, subtype, property)?;
            value = value.adding_member(
                Property::new(Variable::new(name.clone()).with_type(member_type.clone()))
                    .with_access_level(AccessLevel::Public),
            );
            init = init
                .adding_parameter(FunctionParameter::new(name.clone(), member_type.clone()))
                .adding_statement(Assignment::new(
                    Reference::self_ref().member(name.clone()),
                    Reference::named(name.clone()),
                ));
            keys.push((name.clone(), property.key.clone()));

            let (decode, encode) = if property.optional {
                ("decodeIfPresent", "encodeIfPresent")
            } else {
                ("decode", "encode")
            };
            decoding = decoding.adding_statement(Assignment::new(
                Reference::named(name.clone()),
                Reference::try_expr(
                    Reference::named("container").member(decode).call(
                        Tuple::new()
                            .adding_unnamed(member_type.unwrapped().metatype().reference())
                            .adding_named("forKey", Reference::dot(name.clone())),
                    ),
                ),
            ));
            encoding = encoding.adding_statement(Reference::try_expr(
                Reference::named("container").member(encode).call(
                    Tuple::new()
                        .adding_unnamed(Reference::named(name.clone()))
                        .adding_named("forKey", Reference::dot(name)),
                ),
            ));
        }

        Ok(value
            .adding_member(Node::EmptyLine)
            .adding_member(init)
            .adding_member(Node::EmptyLine)
            .adding_member(coding_keys(keys))
            .adding_member(Node::EmptyLine)
            .adding_member(decoding)
            .adding_member(Node::EmptyLine)
            .adding_member(encoding))
    }
}

/// `enum SubtypeError: Error`, shared by every generated enum. Both cases
/// carry the subtype name and the offending raw value.
fn subtype_error_file() -> File {
    let payload = [TypeIdentifier::string(), TypeIdentifier::string()];
    source_file(SUBTYPE_ERROR).adding(
        Type::new(TypeIdentifier::named(SUBTYPE_ERROR), TypeKind::ENUM)
            .with_access_level(AccessLevel::Public)
            .adding_inherited_type(TypeIdentifier::named("Error"))
            .adding_member(Comment::doc("Raw value of a retired case."))
            .adding_member(
                Case::new("unusedCase")
                    .adding_associated_type(payload[0].clone())
                    .adding_associated_type(payload[1].clone()),
            )
            .adding_member(Comment::doc("Raw value matching no declared case."))
            .adding_member(
                Case::new("unknownCase")
                    .adding_associated_type(payload[0].clone())
                    .adding_associated_type(payload[1].clone()),
            ),
    )
}

fn enum_nodes(
    subtype: &Subtype,
    ty: &TypeIdentifier,
    cases: &[SubtypeCase],
) -> Result<Vec<Node>, CodegenError> {
    let used: Vec<&SubtypeCase> = subtype.used_cases().collect();
    if used.is_empty() {
        return Err(CodegenError::shape_mismatch(&subtype.name, "enum has no used case"));
    }

    let declaration = Type::new(ty.clone(), TypeKind::ENUM)
        .with_access_level(AccessLevel::Public)
        .adding_inherited_type(TypeIdentifier::named("Hashable"))
        .adding_members(used.iter().map(|case| Case::new(variable_name(&case.name)).into()));

    let raw_value = Switch::new(Reference::self_ref()).adding_cases(used.iter().map(|case| {
        SwitchCase::tag(variable_name(&case.name))
            .adding_statement(Node::return_value(Reference::string(case.name.clone())))
    }));

    let raw_type_name = Reference::string(subtype.name.clone());
    let raise = |error: &str| {
        Reference::throw_expr(
            TypeIdentifier::named(SUBTYPE_ERROR).reference().member(error).call(
                Tuple::new()
                    .adding_unnamed(raw_type_name.clone())
                    .adding_unnamed(Reference::named("rawValue")),
            ),
        )
    };
    let from_raw = Switch::new(Reference::named("rawValue"))
        .adding_cases(cases.iter().map(|case| {
            let pattern = SwitchCase::new(SwitchPattern::Value(Reference::string(case.name.clone())));
            if case.unused {
                pattern.adding_statement(raise("unusedCase"))
            } else {
                pattern.adding_statement(Assignment::new(
                    Reference::self_ref(),
                    Reference::dot(variable_name(&case.name)),
                ))
            }
        }))
        .adding_case(SwitchCase::default_case().adding_statement(raise("unknownCase")));

    let raw_representation = Extension::new(ty.clone())
        .adding_member(
            Property::new(Variable::new("rawValue").with_type(TypeIdentifier::string()))
                .with_access_level(AccessLevel::Public)
                .with_body(vec![raw_value.into()]),
        )
        .adding_member(Node::EmptyLine)
        .adding_member(
            Function::init()
                .with_access_level(AccessLevel::Public)
                .adding_parameter(FunctionParameter::new("rawValue", TypeIdentifier::string()))
                .with_throws(true)
                .adding_statement(from_raw),
        );

    let codable = Extension::new(ty.clone())
        .adding_inherited_type(TypeIdentifier::named("Codable"))
        .adding_member(
            Function::init()
                .with_access_level(AccessLevel::Public)
                .adding_parameter(
                    FunctionParameter::new("decoder", TypeIdentifier::named("Decoder"))
                        .with_alias("from"),
                )
                .with_throws(true)
                .adding_statement(single_value_container("decoder", false))
                .adding_statement(
                    Property::new(Variable::new("rawValue")).with_value(Reference::try_expr(
                        Reference::named("container").member("decode").call(
                            Tuple::new().adding_unnamed(TypeIdentifier::string().metatype().reference()),
                        ),
                    )),
                )
                .adding_statement(Reference::try_expr(
                    Reference::self_ref()
                        .member("init")
                        .call(Tuple::new().adding_named("rawValue", Reference::named("rawValue"))),
                )),
        )
        .adding_member(Node::EmptyLine)
        .adding_member(
            Function::named("encode")
                .with_access_level(AccessLevel::Public)
                .adding_parameter(
                    FunctionParameter::new("encoder", TypeIdentifier::named("Encoder")).with_alias("to"),
                )
                .with_throws(true)
                .adding_statement(single_value_container("encoder", true))
                .adding_statement(Reference::try_expr(
                    Reference::named("container")
                        .member("encode")
                        .call(Tuple::new().adding_unnamed(Reference::named("rawValue"))),
                )),
        );

    Ok(vec![declaration.into(), raw_representation.into(), codable.into()])
}

fn option_set(subtype: &Subtype, ty: &TypeIdentifier) -> Type {
    let mut set = Type::new(ty.clone(), TypeKind::Struct)
        .with_access_level(AccessLevel::Public)
        .adding_inherited_types(["OptionSet", "Codable", "Hashable"].map(TypeIdentifier::named))
        .adding_member(
            Property::new(Variable::new("rawValue").with_type(TypeIdentifier::int()))
                .with_access_level(AccessLevel::Public),
        )
        .adding_member(Node::EmptyLine)
        .adding_member(
            Function::init()
                .with_access_level(AccessLevel::Public)
                .adding_parameter(FunctionParameter::new("rawValue", TypeIdentifier::int()))
                .adding_statement(Assignment::new(
                    Reference::self_ref().member("rawValue"),
                    Reference::named("rawValue"),
                )),
        )
        .adding_member(Node::EmptyLine);

    let mut all = Vec::new();
    for (option, bit) in subtype.option_bits() {
        let name = variable_name(&option.name);
        set = set.adding_member(
            Property::new(Variable::new(name.clone()).with_static(true))
                .with_access_level(AccessLevel::Public)
                .with_value(ty.reference().call(Tuple::new().adding_named(
                    "rawValue",
                    Reference::int(1).infix(InfixOperator::ShiftLeft, Reference::int(i64::from(bit))),
                ))),
        );
        all.push(Reference::dot(name));
    }

    set.adding_member(Node::EmptyLine).adding_member(
        Property::new(Variable::new("all").with_type(ty.clone()).with_static(true))
            .with_access_level(AccessLevel::Public)
            .with_value(Reference::array(all)),
    )
}

fn keyed_container(source: &str, mutable: bool) -> Property {
    let call = Reference::named(source).member("container").call(
        Tuple::new().adding_named("keyedBy", TypeIdentifier::named("Keys").metatype().reference()),
    );
    Property::new(Variable::new("container").with_immutable(!mutable)).with_value(if mutable {
        call
    } else {
        Reference::try_expr(call)
    })
}

fn single_value_container(source: &str, mutable: bool) -> Property {
    let call = Reference::named(source).member("singleValueContainer").call_empty();
    Property::new(Variable::new("container").with_immutable(!mutable)).with_value(if mutable {
        call
    } else {
        Reference::try_expr(call)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironmeta_core::render_file;
    use ironmeta_schema::parse_descriptions;

    const XML: &str = r#"<descriptions version="1.0.0"><subtypes>
        <subtype name="genre">
            <case name="fiction"/>
            <case name="poetry" unused="true"/>
            <case name="true_crime"/>
        </subtype>
        <subtype name="permissions">
            <option name="read"/>
            <option name="legacy_write" unused="true"/>
            <option name="share"/>
        </subtype>
        <subtype name="dimensions">
            <property name="width" type="double"/>
            <property name="unit" key="unit_name" type="string" optional="true"/>
        </subtype>
    </subtypes></descriptions>"#;

    fn render(name: &str) -> String {
        let descriptions = parse_descriptions(XML).expect("Failed to parse");
        let subtype = descriptions.get_subtype(name).expect("subtype");
        let file = SubtypeGenerator::new(&descriptions)
            .generate_subtype(subtype)
            .expect("Failed to generate");
        render_file(&file)
    }

    #[test]
    fn test_enum_emits_used_cases_only() {
        let output = render("genre");
        assert!(output.contains("public enum Genre: Hashable {\n    case fiction\n    case trueCrime\n}"));
        assert!(output.contains("case .trueCrime:\n            return \"true_crime\""));
    }

    #[test]
    fn test_keyword_case_names_are_escaped() {
        let descriptions = parse_descriptions(
            r#"<descriptions version="1.0.0"><subtypes>
                <subtype name="visibility">
                    <case name="default"/>
                    <case name="private"/>
                    <case name="shared"/>
                </subtype>
            </subtypes></descriptions>"#,
        )
        .expect("Failed to parse");
        let subtype = descriptions.get_subtype("visibility").expect("subtype");
        let output = render_file(
            &SubtypeGenerator::new(&descriptions)
                .generate_subtype(subtype)
                .expect("Failed to generate"),
        );
        assert!(output.contains("    case `default`\n    case `private`\n    case shared\n"));
        assert!(output.contains("case .default:\n            return \"default\""));
        assert!(output.contains("case \"private\":\n            self = .private"));
    }

    #[test]
    fn test_retired_and_unknown_raw_values_raise_distinct_errors() {
        let output = render("genre");
        assert!(output.contains("public init(rawValue: String) throws {"));
        assert!(output.contains("case \"fiction\":\n            self = .fiction"));
        assert!(output.contains(
            "case \"poetry\":\n            throw SubtypeError.unusedCase(\"genre\", rawValue)"
        ));
        assert!(output.contains(
            "default:\n            throw SubtypeError.unknownCase(\"genre\", rawValue)"
        ));
    }

    #[test]
    fn test_enum_codable_round_trips_through_raw_value() {
        let output = render("genre");
        assert!(output.contains("extension Genre: Codable {"));
        assert!(output.contains("let container = try decoder.singleValueContainer()"));
        assert!(output.contains("try self.init(rawValue: rawValue)"));
        assert!(output.contains("try container.encode(rawValue)"));
    }

    #[test]
    fn test_option_bits_follow_full_list() {
        let output = render("permissions");
        assert!(output.contains("public struct Permissions: OptionSet, Codable, Hashable {"));
        assert!(output.contains("public static let read = Permissions(rawValue: 1 << 0)"));
        assert!(output.contains("public static let share = Permissions(rawValue: 1 << 2)"));
        assert!(!output.contains("legacyWrite"));
        assert!(output.contains("public static let all: Permissions = [.read, .share]"));
    }

    #[test]
    fn test_value_struct_coding() {
        let output = render("dimensions");
        assert!(output.contains("public struct Dimensions: Codable {"));
        assert!(output.contains("public let unit: String?"));
        assert!(output.contains("case unit = \"unit_name\""));
        assert!(output.contains("unit = try container.decodeIfPresent(String.self, forKey: .unit)"));
        assert!(output.contains("try container.encode(width, forKey: .width)"));
        assert!(output.contains("try container.encodeIfPresent(unit, forKey: .unit)"));
    }

    #[test]
    fn test_error_file_only_with_enums() {
        let descriptions = parse_descriptions(XML).expect("Failed to parse");
        let files = SubtypeGenerator::new(&descriptions)
            .generate()
            .expect("Failed to generate");
        assert_eq!(files[0].name, "SubtypeError.swift");
        assert_eq!(files.len(), 4);
        let output = render_file(&files[0]);
        assert!(output.contains("case unusedCase(String, String)"));

        let descriptions = parse_descriptions(
            r#"<descriptions version="1.0.0"><subtypes>
                <subtype name="flags"><option name="a"/></subtype>
            </subtypes></descriptions>"#,
        )
        .expect("Failed to parse");
        let files = SubtypeGenerator::new(&descriptions)
            .generate()
            .expect("Failed to generate");
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "Flags.swift");
    }
}
