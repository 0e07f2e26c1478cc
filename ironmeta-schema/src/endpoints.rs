//! Endpoint payload definitions.

/// How entities are laid out at the payload location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PayloadStructure {
    /// One entity.
    #[default]
    Single,
    /// A list of entities.
    Array,
    /// A list of small containers, each holding one entity under the
    /// entity key.
    NestedArray,
}

impl PayloadStructure {
    /// Parses a structure from its description name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "single" => Some(Self::Single),
            "array" => Some(Self::Array),
            "nested_array" => Some(Self::NestedArray),
            _ => None,
        }
    }
}

/// Entity carried by an endpoint payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointPayloadEntity {
    /// Entity name.
    pub entity_name: String,
    /// Key under which the entity sits, if any.
    pub entity_key: Option<String>,
    /// Layout of the entity values.
    pub structure: PayloadStructure,
}

impl EndpointPayloadEntity {
    /// Creates a single-entity payload located at the payload root.
    #[must_use]
    pub fn new(entity_name: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            entity_key: None,
            structure: PayloadStructure::Single,
        }
    }

    /// Sets the entity key.
    #[must_use]
    pub fn with_entity_key(mut self, key: impl Into<String>) -> Self {
        self.entity_key = Some(key.into());
        self
    }

    /// Sets the structure.
    #[must_use]
    pub fn with_structure(mut self, structure: PayloadStructure) -> Self {
        self.structure = structure;
        self
    }
}

/// Read or write side of an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadWriteEndpointPayload {
    /// Keys leading from the document root to the payload.
    pub base_key: Vec<String>,
    /// Carried entity.
    pub entity: EndpointPayloadEntity,
}

impl ReadWriteEndpointPayload {
    /// Creates a payload located at the document root.
    #[must_use]
    pub fn new(entity: EndpointPayloadEntity) -> Self {
        Self {
            base_key: Vec::new(),
            entity,
        }
    }

    /// Sets the base key path.
    #[must_use]
    pub fn with_base_key<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.base_key = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the keys leading from the root to the entity values.
    ///
    /// For nested arrays the entity key belongs to each list element and is
    /// not part of the path.
    #[must_use]
    pub fn key_path(&self) -> Vec<&str> {
        let mut path: Vec<&str> = self.base_key.iter().map(String::as_str).collect();
        if self.entity.structure != PayloadStructure::NestedArray
            && let Some(key) = &self.entity.entity_key
        {
            path.push(key);
        }
        path
    }
}

/// Remote endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointPayload {
    /// Endpoint name.
    pub name: String,
    /// Response payload of reads.
    pub read_payload: Option<ReadWriteEndpointPayload>,
    /// Response payload of writes.
    pub write_payload: Option<ReadWriteEndpointPayload>,
}

impl EndpointPayload {
    /// Creates an endpoint without payloads.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            read_payload: None,
            write_payload: None,
        }
    }

    /// Sets the read payload.
    #[must_use]
    pub fn with_read_payload(mut self, payload: ReadWriteEndpointPayload) -> Self {
        self.read_payload = Some(payload);
        self
    }

    /// Sets the write payload.
    #[must_use]
    pub fn with_write_payload(mut self, payload: ReadWriteEndpointPayload) -> Self {
        self.write_payload = Some(payload);
        self
    }

    /// Returns the payloads present, read side first.
    pub fn payloads(&self) -> impl Iterator<Item = &ReadWriteEndpointPayload> {
        self.read_payload.iter().chain(self.write_payload.iter())
    }
}
