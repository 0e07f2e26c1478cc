//! Description set and cross-reference resolution.
//!
//! [`Descriptions`] aggregates every entity, subtype and endpoint of one
//! generation run. Definitions are kept in declared order; name indexes are
//! used only for lookups, never for iteration.
//!
//! Every lookup that follows a reference takes the source field the reference
//! came from, so a failed resolution reports which declaration to fix.

use std::collections::HashMap;

use crate::endpoints::EndpointPayload;
use crate::entities::{Entity, EntityRelationship};
use crate::error::SchemaError;
use crate::types::Subtype;

/// Complete description set.
#[derive(Debug, Clone, Default)]
pub struct Descriptions {
    /// Current schema version.
    pub version: String,
    /// Previously released schema versions, oldest first.
    pub version_history: Vec<String>,
    /// Entities in declared order.
    pub entities: Vec<Entity>,
    /// Subtypes in declared order.
    pub subtypes: Vec<Subtype>,
    /// Endpoints in declared order.
    pub endpoints: Vec<EndpointPayload>,
    entity_map: HashMap<String, usize>,
    subtype_map: HashMap<String, usize>,
    endpoint_map: HashMap<String, usize>,
}

impl Descriptions {
    /// Creates an empty description set.
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Self::default()
        }
    }

    /// Appends a previously released version.
    #[must_use]
    pub fn adding_version(mut self, version: impl Into<String>) -> Self {
        self.version_history.push(version.into());
        self
    }

    /// Adds an entity. The first definition of a name wins lookups.
    pub fn add_entity(&mut self, entity: Entity) {
        let index = self.entities.len();
        self.entity_map.entry(entity.name.clone()).or_insert(index);
        self.entities.push(entity);
    }

    /// Adds a subtype. The first definition of a name wins lookups.
    pub fn add_subtype(&mut self, subtype: Subtype) {
        let index = self.subtypes.len();
        self.subtype_map.entry(subtype.name.clone()).or_insert(index);
        self.subtypes.push(subtype);
    }

    /// Adds an endpoint. The first definition of a name wins lookups.
    pub fn add_endpoint(&mut self, endpoint: EndpointPayload) {
        let index = self.endpoints.len();
        self.endpoint_map.entry(endpoint.name.clone()).or_insert(index);
        self.endpoints.push(endpoint);
    }

    /// Builder form of [`Descriptions::add_entity`].
    #[must_use]
    pub fn adding_entity(mut self, entity: Entity) -> Self {
        self.add_entity(entity);
        self
    }

    /// Builder form of [`Descriptions::add_subtype`].
    #[must_use]
    pub fn adding_subtype(mut self, subtype: Subtype) -> Self {
        self.add_subtype(subtype);
        self
    }

    /// Builder form of [`Descriptions::add_endpoint`].
    #[must_use]
    pub fn adding_endpoint(mut self, endpoint: EndpointPayload) -> Self {
        self.add_endpoint(endpoint);
        self
    }

    /// Looks up an entity by name.
    #[must_use]
    pub fn get_entity(&self, name: &str) -> Option<&Entity> {
        self.entity_map.get(name).map(|&idx| &self.entities[idx])
    }

    /// Looks up a subtype by name.
    #[must_use]
    pub fn get_subtype(&self, name: &str) -> Option<&Subtype> {
        self.subtype_map.get(name).map(|&idx| &self.subtypes[idx])
    }

    /// Looks up an endpoint by name.
    #[must_use]
    pub fn get_endpoint(&self, name: &str) -> Option<&EndpointPayload> {
        self.endpoint_map.get(name).map(|&idx| &self.endpoints[idx])
    }

    /// Resolves an entity reference.
    ///
    /// # Errors
    /// Returns `SchemaError::NotFound` naming `referenced_by` if no entity
    /// is called `name`.
    pub fn entity(&self, name: &str, referenced_by: &str) -> Result<&Entity, SchemaError> {
        self.get_entity(name)
            .ok_or_else(|| SchemaError::not_found("entity", name, referenced_by))
    }

    /// Resolves a subtype reference.
    ///
    /// # Errors
    /// Returns `SchemaError::NotFound` naming `referenced_by` if no subtype
    /// is called `name`.
    pub fn subtype(&self, name: &str, referenced_by: &str) -> Result<&Subtype, SchemaError> {
        self.get_subtype(name)
            .ok_or_else(|| SchemaError::not_found("subtype", name, referenced_by))
    }

    /// Resolves an endpoint reference.
    ///
    /// # Errors
    /// Returns `SchemaError::NotFound` naming `referenced_by` if no endpoint
    /// is called `name`.
    pub fn endpoint(
        &self,
        name: &str,
        referenced_by: &str,
    ) -> Result<&EndpointPayload, SchemaError> {
        self.get_endpoint(name)
            .ok_or_else(|| SchemaError::not_found("endpoint", name, referenced_by))
    }

    /// Resolves the target of a relationship declared on `entity.property`.
    ///
    /// # Errors
    /// Returns `SchemaError::NotFound` if the related entity does not exist.
    pub fn relationship_target(
        &self,
        entity: &Entity,
        property: &str,
        relationship: &EntityRelationship,
    ) -> Result<&Entity, SchemaError> {
        self.entity(
            &relationship.entity_name,
            &format!("{}.{}", entity.name, property),
        )
    }

    /// Resolves the entity whose identifier is declared equivalent to the
    /// identifier of `entity`. Only this single hop is followed.
    ///
    /// # Errors
    /// Returns `SchemaError::NotFound` if the declared entity does not exist.
    pub fn equivalent_entity(&self, entity: &Entity) -> Result<Option<&Entity>, SchemaError> {
        entity
            .identifier
            .equivalent_identifier_name
            .as_deref()
            .map(|name| self.entity(name, &format!("{}.identifier", entity.name)))
            .transpose()
    }

    /// Resolves the entities contributing to a relationship-derived
    /// identifier, in declared order.
    ///
    /// # Errors
    /// Returns `SchemaError::NotFound` if a contributing entity does not exist.
    pub fn identifier_contributors(&self, entity: &Entity) -> Result<Vec<&Entity>, SchemaError> {
        entity
            .identifier
            .relationships()
            .iter()
            .map(|relationship| {
                self.entity(
                    &relationship.entity_name,
                    &format!("{}.identifier.{}", entity.name, relationship.variable_name),
                )
            })
            .collect()
    }

    /// Returns the endpoints whose write payload carries `entity_name`, in
    /// declared order.
    pub fn endpoints_writing<'a>(
        &'a self,
        entity_name: &'a str,
    ) -> impl Iterator<Item = &'a EndpointPayload> + 'a {
        self.endpoints.iter().filter(move |endpoint| {
            endpoint
                .write_payload
                .as_ref()
                .is_some_and(|payload| payload.entity.entity_name == entity_name)
        })
    }

    /// Returns persisted entities, in declared order.
    pub fn persisted_entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|entity| entity.persist)
    }
}
