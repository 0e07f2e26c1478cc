//! Persistence bindings generation.
//!
//! Every persisted property maps to a [`PersistedField`]: a record key, an
//! optional lazy flag key and a storage strategy. The same field value
//! produces both directions of the mapping, so the record written by
//! `merge(into:)` is exactly the record read by `init(coreDataEntity:)`.
//!
//! | value              | storage      | required              | optional / lazy |
//! |--------------------|--------------|-----------------------|-----------------|
//! | scalar, enum, set  | direct       | throwing decode       | optional decode |
//! | to-one             | direct       | throwing decode       | optional decode |
//! | to-many, arrays    | encoded blob | throwing decode       | optional decode |
//! | value struct       | encoded blob | throwing decode       | optional decode |
//!
//! A required field with a declared default is decoded with that default as
//! fallback and never throws.

use ironmeta_core::{
    AccessLevel, Assignment, Catch, Condition, DoCatch, Extension, File, Function,
    FunctionParameter, If, Node, Reference, Tuple, TypeIdentifier,
};
use ironmeta_schema::naming::pascal_case;
use ironmeta_schema::{Descriptions, Entity, EntityProperty, PropertyType};

use super::source_file;
use super::types::{
    entity_type, identifier_type, is_blob_subtype, managed_type, property_default, value_type,
    variable_name,
};
use crate::config::{GenerationConfig, PersistenceNaming};
use crate::error::CodegenError;

const RECORD: &str = "coreDataEntity";

/// How a field is laid out in the persisted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStorage {
    /// Stored as a native record attribute.
    Direct,
    /// Stored as encoded data, decoded with a fallback on corruption.
    EncodedBlob,
}

/// Persisted layout of one entity property.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedField {
    /// Record attribute holding the value.
    pub key: String,
    /// Record attribute flagging a requested lazy value.
    pub flag_key: Option<String>,
    /// Storage strategy.
    pub storage: FieldStorage,
    /// Whether the value may be absent.
    pub optional: bool,
    /// Stored value type, without optional or lazy wrapping.
    pub value_type: TypeIdentifier,
    /// Fallback used instead of throwing on a missing required value.
    pub fallback: Option<Reference>,
    /// Whether decode failures of optional values are logged.
    pub log_error: bool,
}

impl PersistedField {
    /// Resolves the persisted layout of `property`.
    ///
    /// # Errors
    /// Returns `CodegenError::Schema` if the property references a missing
    /// entity or subtype.
    pub fn resolve(
        descriptions: &Descriptions,
        config: &GenerationConfig,
        entity: &Entity,
        property: &EntityProperty,
    ) -> Result<Self, CodegenError> {
        let name = variable_name(&property.name);
        let storage = match &property.property_type {
            _ if property.is_collection() => FieldStorage::EncodedBlob,
            PropertyType::Subtype(subtype) => {
                let subtype =
                    descriptions.subtype(subtype, &format!("{}.{}", entity.name, property.name))?;
                if is_blob_subtype(subtype) {
                    FieldStorage::EncodedBlob
                } else {
                    FieldStorage::Direct
                }
            }
            _ => FieldStorage::Direct,
        };
        let (key, flag_key) = match config.persistence_naming {
            PersistenceNaming::Current => (format!("_{name}"), format!("__{name}_ExtraFlag")),
            PersistenceNaming::Legacy => (name.clone(), format!("{name}_ExtraFlag")),
        };
        Ok(Self {
            key,
            flag_key: property.lazy.then_some(flag_key),
            storage,
            optional: property.optional,
            value_type: value_type(descriptions, entity, property)?,
            fallback: property_default(property).filter(|value| !value.is_none()),
            log_error: property.log_error,
        })
    }

    /// Returns true if the value is wrapped in `Lazy`.
    #[must_use]
    pub fn is_lazy(&self) -> bool {
        self.flag_key.is_some()
    }

    /// Statements writing `value` into `record`.
    #[must_use]
    pub fn to_record(&self, value: Reference, record: &Reference) -> Vec<Node> {
        let encode = |value: Reference| {
            let method = match self.storage {
                FieldStorage::Direct => "coreDataValue",
                FieldStorage::EncodedBlob => "encodedCoreDataValue",
            };
            value.optional_if(self.optional).member(method).call_empty()
        };
        let assignment = |value: Reference| {
            Node::from(Assignment::new(record.clone().member(self.key.clone()), encode(value)))
        };

        match &self.flag_key {
            None => vec![assignment(value)],
            Some(flag) => vec![
                If::new(Condition::binding("value", value.member("value").call_empty()))
                    .adding_statement(assignment(Reference::named("value")))
                    .adding_statement(Assignment::new(
                        record.clone().member(flag.clone()),
                        Reference::bool(true),
                    ))
                    .into(),
            ],
        }
    }

    /// Expression reading the value back from `record`.
    #[must_use]
    pub fn from_record(&self, record: &Reference) -> Reference {
        let stored = record.clone().member(self.key.clone());
        let value_type = self.value_type.reference();
        let property_name = Reference::string(self.key.clone());

        let optional_decode = || {
            let arguments = Tuple::new().adding_unnamed(stored.clone());
            match self.storage {
                FieldStorage::Direct => value_type
                    .clone()
                    .member("fromOptionalCoreData")
                    .call(arguments),
                FieldStorage::EncodedBlob => {
                    let mut arguments = arguments.adding_named("propertyName", property_name.clone());
                    if !self.log_error {
                        arguments = arguments.adding_named("logError", Reference::bool(false));
                    }
                    value_type.clone().member("decodeOptionalCoreData").call(arguments)
                }
            }
        };

        if let Some(flag) = &self.flag_key {
            let lazy_type = TypeIdentifier::lazy(self.value_type.clone().optional_if(self.optional));
            return lazy_type.reference().call(
                Tuple::new()
                    .adding_named("value", optional_decode())
                    .adding_named("requested", record.clone().member(flag.clone())),
            );
        }
        if self.optional {
            return optional_decode();
        }
        if let Some(fallback) = &self.fallback {
            return match self.storage {
                FieldStorage::Direct => optional_decode().nil_coalescing(fallback.clone()),
                FieldStorage::EncodedBlob => value_type.clone().member("decodeCoreData").call(
                    Tuple::new()
                        .adding_unnamed(stored.clone())
                        .adding_named("fallback", fallback.clone())
                        .adding_named("propertyName", property_name.clone())
                        .adding_named("logError", Reference::bool(self.log_error)),
                ),
            };
        }
        let method = match self.storage {
            FieldStorage::Direct => "fromCoreData",
            FieldStorage::EncodedBlob => "decodeCoreData",
        };
        Reference::try_expr(value_type.clone().member(method).call(
            Tuple::new()
                .adding_unnamed(stored.clone())
                .adding_named("propertyName", property_name.clone()),
        ))
    }
}

/// Generator for persistence bindings.
pub struct PersistenceGenerator<'a> {
    descriptions: &'a Descriptions,
    config: &'a GenerationConfig,
}

impl<'a> PersistenceGenerator<'a> {
    /// Creates a new persistence generator.
    #[must_use]
    pub fn new(descriptions: &'a Descriptions, config: &'a GenerationConfig) -> Self {
        Self {
            descriptions,
            config,
        }
    }

    /// Generates one file per persisted entity, in declared order.
    ///
    /// # Errors
    /// Returns `CodegenError` if a property references a missing entity or
    /// subtype.
    pub fn generate(&self) -> Result<Vec<File>, CodegenError> {
        self.descriptions
            .persisted_entities()
            .map(|entity| self.generate_entity(entity))
            .collect()
    }

    /// Generates the persistence file of a single entity.
    ///
    /// # Errors
    /// Returns `CodegenError` if a property references a missing entity or
    /// subtype.
    pub fn generate_entity(&self, entity: &Entity) -> Result<File, CodegenError> {
        let initializer = self.record_initializer(entity)?;
        let throws = initializer.throws;
        let extension = Extension::new(entity_type(&entity.name))
            .adding_inherited_type(TypeIdentifier::named("CoreDataEntity"))
            .adding_member(self.entity_from_record(entity, throws))
            .adding_member(Node::EmptyLine)
            .adding_member(self.merge_into_record(entity)?)
            .adding_member(Node::EmptyLine)
            .adding_member(initializer);

        Ok(source_file(&format!("{}+CoreData", pascal_case(&entity.name)))
            .adding_import("CoreData")
            .adding(extension))
    }

    /// Returns the persisted fields of `entity`, in storage order.
    ///
    /// # Errors
    /// Returns `CodegenError` if a property references a missing entity or
    /// subtype.
    pub fn fields<'e>(
        &self,
        entity: &'e Entity,
    ) -> Result<Vec<(&'e EntityProperty, PersistedField)>, CodegenError> {
        entity
            .stored_properties()
            .into_iter()
            .map(|property| {
                PersistedField::resolve(self.descriptions, self.config, entity, property)
                    .map(|field| (property, field))
            })
            .collect()
    }

    fn entity_from_record(&self, entity: &Entity, throws: bool) -> Function {
        let ty = entity_type(&entity.name);
        let construct = ty.reference().call(
            Tuple::new().adding_named("coreDataEntity", Reference::named(RECORD)),
        );
        let function = Function::named("entity")
            .with_access_level(AccessLevel::Public)
            .with_static(true)
            .adding_parameter(FunctionParameter::new(RECORD, managed_type(&entity.name)).with_alias("from"))
            .with_result_type(ty.optional());

        if !throws {
            return function.adding_statement(Node::return_value(construct));
        }

        let log = Reference::named("Logger").member("log").call(
            Tuple::new()
                .adding_unnamed(Reference::dot("error"))
                .adding_unnamed(Reference::string(format!(
                    "{}: Could not convert CoreData entity",
                    pascal_case(&entity.name)
                )))
                .adding_named("error", Reference::named("error"))
                .adding_named("assert", Reference::bool(true)),
        );
        function.adding_statement(
            DoCatch::new()
                .adding_statement(Node::return_value(Reference::try_expr(construct)))
                .adding_catch(
                    Catch::new()
                        .adding_statement(log)
                        .adding_statement(Node::return_value(Reference::nil())),
                ),
        )
    }

    fn merge_into_record(&self, entity: &Entity) -> Result<Function, CodegenError> {
        let record = Reference::named(RECORD);
        let mut function = Function::named("merge")
            .with_access_level(AccessLevel::Public)
            .adding_parameter(FunctionParameter::new(RECORD, managed_type(&entity.name)).with_alias("into"));

        if !entity.has_void_identifier() {
            function = function.adding_statement(
                Reference::named("identifier")
                    .member("merge")
                    .call(Tuple::new().adding_named("into", record.clone())),
            );
        }
        for (property, field) in self.fields(entity)? {
            function = function
                .adding_statements(field.to_record(Reference::named(variable_name(&property.name)), &record));
        }
        if entity.last_remote_read {
            let key = match self.config.persistence_naming {
                PersistenceNaming::Current => "__lastRemoteRead",
                PersistenceNaming::Legacy => "_lastRemoteRead",
            };
            function = function.adding_statement(Assignment::new(
                record.member(key),
                TypeIdentifier::date().reference().call_empty(),
            ));
        }
        Ok(function)
    }

    /// Builds `init(coreDataEntity:)`, marked throwing exactly when one of
    /// its arguments throws.
    fn record_initializer(&self, entity: &Entity) -> Result<Function, CodegenError> {
        let record = Reference::named(RECORD);
        let mut arguments = Tuple::new();
        if !entity.has_void_identifier() {
            arguments = arguments.adding_named(
                "identifier",
                identifier_type(entity)
                    .reference()
                    .call(Tuple::new().adding_named("coreDataEntity", record.clone())),
            );
        }
        for (property, field) in self.fields(entity)? {
            arguments = arguments.adding_named(variable_name(&property.name), field.from_record(&record));
        }

        let throws = arguments.contains_throwing();
        Ok(Function::convenience_init()
            .with_access_level(AccessLevel::Private)
            .adding_parameter(FunctionParameter::new(RECORD, managed_type(&entity.name)))
            .with_throws(throws)
            .adding_statement(Reference::self_ref().member("init").call(arguments)))
    }
}
