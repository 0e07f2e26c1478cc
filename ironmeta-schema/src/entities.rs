//! Entity definitions.
//!
//! An [`Entity`] is a schema-declared domain object: an identifier shape, an
//! ordered list of properties, and flags steering persistence, remote
//! synchronization and mutability.

use crate::types::{DefaultValue, ScalarType};

/// Queue used by entities that do not name one.
pub const DEFAULT_QUEUE_NAME: &str = "main";

/// Scalar kind backing an identifier value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierValueType {
    /// Integer identifiers.
    Int,
    /// String identifiers.
    String,
}

impl IdentifierValueType {
    /// Parses an identifier value type from its description name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" => Some(Self::Int),
            "string" => Some(Self::String),
            _ => None,
        }
    }
}

/// Relationship contributing to a composite identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipId {
    /// Name of the relationship property.
    pub variable_name: String,
    /// Related entity.
    pub entity_name: String,
}

impl RelationshipId {
    /// Creates a relationship identifier component.
    #[must_use]
    pub fn new(variable_name: impl Into<String>, entity_name: impl Into<String>) -> Self {
        Self {
            variable_name: variable_name.into(),
            entity_name: entity_name.into(),
        }
    }
}

/// Shape of an entity identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierType {
    /// The entity has no identity of its own.
    Void,
    /// Plain scalar identifier.
    Scalar(IdentifierValueType),
    /// Identifier derived from related entities.
    Relationships {
        /// Scalar kind of the derived value.
        value_type: IdentifierValueType,
        /// Contributing relationships, in declared order.
        relationships: Vec<RelationshipId>,
    },
}

/// Identifier declaration of an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityIdentifier {
    /// Payload key holding the identifier value.
    pub key: String,
    /// Identifier shape.
    pub identifier_type: IdentifierType,
    /// Entity whose identifier is interchangeable with this one.
    pub equivalent_identifier_name: Option<String>,
}

impl EntityIdentifier {
    /// Creates an identifier read from `id`.
    #[must_use]
    pub fn new(identifier_type: IdentifierType) -> Self {
        Self {
            key: "id".to_string(),
            identifier_type,
            equivalent_identifier_name: None,
        }
    }

    /// Returns the scalar kind of the identifier value, if any.
    #[must_use]
    pub fn value_type(&self) -> Option<IdentifierValueType> {
        match &self.identifier_type {
            IdentifierType::Void => None,
            IdentifierType::Scalar(value_type)
            | IdentifierType::Relationships { value_type, .. } => Some(*value_type),
        }
    }

    /// Returns the relationships contributing to the identifier.
    #[must_use]
    pub fn relationships(&self) -> &[RelationshipId] {
        match &self.identifier_type {
            IdentifierType::Relationships { relationships, .. } => relationships,
            _ => &[],
        }
    }
}

/// Cardinality of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Association {
    /// Single related entity.
    ToOne,
    /// Sequence of related entities.
    ToMany,
}

/// Typed reference to another entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRelationship {
    /// Related entity.
    pub entity_name: String,
    /// Cardinality.
    pub association: Association,
    /// The payload carries identifiers only, never embedded entities.
    pub id_only: bool,
}

impl EntityRelationship {
    /// Creates a relationship to `entity_name`.
    #[must_use]
    pub fn new(entity_name: impl Into<String>, association: Association) -> Self {
        Self {
            entity_name: entity_name.into(),
            association,
            id_only: false,
        }
    }
}

/// Value type of an entity property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyType {
    /// Scalar value.
    Scalar(ScalarType),
    /// Subtype value, by name.
    Subtype(String),
    /// Relationship to another entity.
    Relationship(EntityRelationship),
}

/// Entity property.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityProperty {
    /// Property name.
    pub name: String,
    /// Payload key.
    pub key: String,
    /// Value type.
    pub property_type: PropertyType,
    /// Scalar and subtype values only: the property is a list.
    pub is_array: bool,
    /// The value may be absent.
    pub optional: bool,
    /// The value may be missing from a payload and is merged incrementally.
    pub lazy: bool,
    /// Value used when the payload omits the property.
    pub default_value: Option<DefaultValue>,
    /// The property takes part in equality.
    pub use_for_equality: bool,
    /// Decoding failures of the property are logged.
    pub log_error: bool,
}

impl EntityProperty {
    /// Creates a required, non-lazy property keyed by its name.
    #[must_use]
    pub fn new(name: impl Into<String>, property_type: PropertyType) -> Self {
        let name = name.into();
        Self {
            key: name.clone(),
            name,
            property_type,
            is_array: false,
            optional: false,
            lazy: false,
            default_value: None,
            use_for_equality: true,
            log_error: true,
        }
    }

    /// Creates a scalar property.
    #[must_use]
    pub fn scalar(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self::new(name, PropertyType::Scalar(scalar))
    }

    /// Creates a subtype property.
    #[must_use]
    pub fn subtype(name: impl Into<String>, subtype_name: impl Into<String>) -> Self {
        Self::new(name, PropertyType::Subtype(subtype_name.into()))
    }

    /// Creates a relationship property.
    #[must_use]
    pub fn relationship(
        name: impl Into<String>,
        entity_name: impl Into<String>,
        association: Association,
    ) -> Self {
        Self::new(
            name,
            PropertyType::Relationship(EntityRelationship::new(entity_name, association)),
        )
    }

    /// Marks the property optional.
    #[must_use]
    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// Marks the property lazy.
    #[must_use]
    pub fn with_lazy(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }

    /// Marks the property as a list.
    #[must_use]
    pub fn with_array(mut self, is_array: bool) -> Self {
        self.is_array = is_array;
        self
    }

    /// Sets the payload key.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default_value(mut self, value: DefaultValue) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Includes or excludes the property from equality.
    #[must_use]
    pub fn with_use_for_equality(mut self, use_for_equality: bool) -> Self {
        self.use_for_equality = use_for_equality;
        self
    }

    /// Returns the relationship, if the property is one.
    #[must_use]
    pub fn relationship_type(&self) -> Option<&EntityRelationship> {
        match &self.property_type {
            PropertyType::Relationship(relationship) => Some(relationship),
            _ => None,
        }
    }

    /// Returns true if the property is a relationship.
    #[must_use]
    pub fn is_relationship(&self) -> bool {
        self.relationship_type().is_some()
    }

    /// Returns true if the property holds a sequence of values.
    #[must_use]
    pub fn is_collection(&self) -> bool {
        self.is_array
            || self
                .relationship_type()
                .is_some_and(|r| r.association == Association::ToMany)
    }
}

/// Schema-declared domain object.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Entity name.
    pub name: String,
    /// Stored in the local database.
    pub persist: bool,
    /// Fetched from the remote API.
    pub remote: bool,
    /// Writable by the client.
    pub mutable: bool,
    /// Request queue name; [`DEFAULT_QUEUE_NAME`] when absent.
    pub client_queue_name: Option<String>,
    /// Identifier declaration.
    pub identifier: EntityIdentifier,
    /// Properties in declared order.
    pub properties: Vec<EntityProperty>,
    /// Tracks the date of the last remote read.
    pub last_remote_read: bool,
    /// Name the entity was persisted under before a rename.
    pub legacy_previous_name: Option<String>,
}

impl Entity {
    /// Creates a remote, non-persisted, read-only entity without properties.
    #[must_use]
    pub fn new(name: impl Into<String>, identifier: EntityIdentifier) -> Self {
        Self {
            name: name.into(),
            persist: false,
            remote: true,
            mutable: false,
            client_queue_name: None,
            identifier,
            properties: Vec::new(),
            last_remote_read: false,
            legacy_previous_name: None,
        }
    }

    /// Appends a property.
    #[must_use]
    pub fn adding_property(mut self, property: EntityProperty) -> Self {
        self.properties.push(property);
        self
    }

    /// Sets the persistence flag.
    #[must_use]
    pub fn with_persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    /// Sets the mutability flag.
    #[must_use]
    pub fn with_mutable(mut self, mutable: bool) -> Self {
        self.mutable = mutable;
        self
    }

    /// Sets the request queue.
    #[must_use]
    pub fn with_client_queue_name(mut self, queue: impl Into<String>) -> Self {
        self.client_queue_name = Some(queue.into());
        self
    }

    /// Returns the request queue name.
    #[must_use]
    pub fn queue_name(&self) -> &str {
        self.client_queue_name
            .as_deref()
            .unwrap_or(DEFAULT_QUEUE_NAME)
    }

    /// Returns true if any property is lazy.
    #[must_use]
    pub fn has_lazy_properties(&self) -> bool {
        self.properties.iter().any(|p| p.lazy)
    }

    /// Returns true if the entity has no identity of its own.
    #[must_use]
    pub fn has_void_identifier(&self) -> bool {
        self.identifier.identifier_type == IdentifierType::Void
    }

    /// Looks up a property by name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&EntityProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Returns non-relationship properties, in declared order.
    pub fn values(&self) -> impl Iterator<Item = &EntityProperty> {
        self.properties.iter().filter(|p| !p.is_relationship())
    }

    /// Returns relationship properties with their relationship, in declared order.
    pub fn relationships(&self) -> impl Iterator<Item = (&EntityProperty, &EntityRelationship)> {
        self.properties
            .iter()
            .filter_map(|p| p.relationship_type().map(|r| (p, r)))
    }

    /// Returns properties in storage order: values first, then relationships.
    #[must_use]
    pub fn stored_properties(&self) -> Vec<&EntityProperty> {
        self.values()
            .chain(self.relationships().map(|(p, _)| p))
            .collect()
    }

    /// Returns the properties compared by equality, in storage order.
    #[must_use]
    pub fn equality_properties(&self) -> Vec<&EntityProperty> {
        self.stored_properties()
            .into_iter()
            .filter(|p| p.use_for_equality)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> Entity {
        Entity::new(
            "item",
            EntityIdentifier::new(IdentifierType::Scalar(IdentifierValueType::Int)),
        )
        .adding_property(EntityProperty::relationship(
            "owner",
            "user",
            Association::ToOne,
        ))
        .adding_property(EntityProperty::scalar("title", ScalarType::String))
        .adding_property(
            EntityProperty::relationship("tags", "tag", Association::ToMany).with_optional(true),
        )
        .adding_property(
            EntityProperty::scalar("rating", ScalarType::Double).with_use_for_equality(false),
        )
    }

    #[test]
    fn test_stored_properties_put_values_first() {
        let entity = item();
        let names: Vec<_> = entity
            .stored_properties()
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["title", "rating", "owner", "tags"]);
    }

    #[test]
    fn test_equality_properties() {
        let entity = item();
        let names: Vec<_> = entity
            .equality_properties()
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["title", "owner", "tags"]);
    }

    #[test]
    fn test_default_queue_and_flags() {
        let entity = item();
        assert_eq!(entity.queue_name(), DEFAULT_QUEUE_NAME);
        assert!(!entity.has_lazy_properties());
        assert!(!entity.has_void_identifier());
        assert!(entity.property("tags").is_some_and(EntityProperty::is_collection));

        let entity = entity.with_client_queue_name("items");
        assert_eq!(entity.queue_name(), "items");
    }

    #[test]
    fn test_identifier_accessors() {
        let identifier = EntityIdentifier::new(IdentifierType::Relationships {
            value_type: IdentifierValueType::String,
            relationships: vec![RelationshipId::new("owner", "user")],
        });
        assert_eq!(identifier.value_type(), Some(IdentifierValueType::String));
        assert_eq!(identifier.relationships().len(), 1);
        assert_eq!(EntityIdentifier::new(IdentifierType::Void).value_type(), None);
    }
}
