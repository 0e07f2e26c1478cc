//! Scalar, default value and subtype definitions.
//!
//! This module contains the leaf types of a description: the scalar value
//! kinds properties can hold, default value literals, and the three shapes of
//! subtype (enum, option set, value struct).

/// Scalar value kind of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScalarType {
    /// UTF-8 string.
    String,
    /// Signed integer.
    Int,
    /// Point in time.
    Date,
    /// 64-bit float.
    Double,
    /// 32-bit float.
    Float,
    /// Boolean.
    Bool,
    /// URL.
    Url,
    /// Color value.
    Color,
    /// Duration in seconds.
    Seconds,
    /// Duration in milliseconds.
    Milliseconds,
}

impl ScalarType {
    /// Parses a scalar type from its description name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "int" => Some(Self::Int),
            "date" => Some(Self::Date),
            "double" => Some(Self::Double),
            "float" => Some(Self::Float),
            "bool" => Some(Self::Bool),
            "url" => Some(Self::Url),
            "color" => Some(Self::Color),
            "seconds" => Some(Self::Seconds),
            "milliseconds" => Some(Self::Milliseconds),
            _ => None,
        }
    }

    /// Returns the description name of the scalar type.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Date => "date",
            Self::Double => "double",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Url => "url",
            Self::Color => "color",
            Self::Seconds => "seconds",
            Self::Milliseconds => "milliseconds",
        }
    }

    /// Returns true for floating point kinds, durations included.
    #[must_use]
    pub const fn is_floating_point(&self) -> bool {
        matches!(
            self,
            Self::Double | Self::Float | Self::Seconds | Self::Milliseconds
        )
    }
}

/// Default value literal attached to a property.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// Absent value (`nil`).
    Nil,
    /// Boolean literal.
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// Floating point literal.
    Float(f64),
    /// String literal.
    String(String),
    /// The current date at construction time.
    CurrentDate,
    /// Enum subtype case name.
    Case(String),
}

impl DefaultValue {
    /// Parses a default value for a scalar property.
    ///
    /// `nil` is accepted for every kind.
    #[must_use]
    pub fn parse_scalar(raw: &str, scalar: ScalarType) -> Option<Self> {
        if raw == "nil" {
            return Some(Self::Nil);
        }
        match scalar {
            ScalarType::Bool => raw.parse().ok().map(Self::Bool),
            ScalarType::Int => raw.parse().ok().map(Self::Int),
            ScalarType::Double | ScalarType::Float | ScalarType::Seconds | ScalarType::Milliseconds => {
                raw.parse().ok().map(Self::Float)
            }
            ScalarType::Date => (raw == "current_date").then_some(Self::CurrentDate),
            ScalarType::String | ScalarType::Url | ScalarType::Color => {
                Some(Self::String(raw.to_string()))
            }
        }
    }

    /// Parses a default value for a subtype property.
    #[must_use]
    pub fn parse_case(raw: &str) -> Self {
        if raw == "nil" {
            Self::Nil
        } else {
            Self::Case(raw.to_string())
        }
    }
}

/// Enum subtype case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtypeCase {
    /// Case name, also the raw value on the wire.
    pub name: String,
    /// Retired case: still recognised on decode but rejected.
    pub unused: bool,
}

impl SubtypeCase {
    /// Creates a used case.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unused: false,
        }
    }

    /// Creates a retired case.
    #[must_use]
    pub fn unused(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unused: true,
        }
    }
}

/// Option set flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtypeOption {
    /// Option name.
    pub name: String,
    /// Retired flag: keeps its bit position reserved.
    pub unused: bool,
}

impl SubtypeOption {
    /// Creates a used option.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unused: false,
        }
    }

    /// Creates a retired option.
    #[must_use]
    pub fn unused(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unused: true,
        }
    }
}

/// Value type of a struct subtype member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubtypePropertyType {
    /// Scalar member.
    Scalar(ScalarType),
    /// Nested subtype, by name.
    Subtype(String),
}

/// Struct subtype member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtypeProperty {
    /// Member name.
    pub name: String,
    /// Payload key.
    pub key: String,
    /// Member type.
    pub property_type: SubtypePropertyType,
    /// Whether the member may be absent.
    pub optional: bool,
    /// Whether the member is a list.
    pub is_array: bool,
}

impl SubtypeProperty {
    /// Creates a required member keyed by its name.
    #[must_use]
    pub fn new(name: impl Into<String>, property_type: SubtypePropertyType) -> Self {
        let name = name.into();
        Self {
            key: name.clone(),
            name,
            property_type,
            optional: false,
            is_array: false,
        }
    }
}

/// Shape of a subtype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubtypeItems {
    /// String-backed enum.
    Cases(Vec<SubtypeCase>),
    /// Bit-flag option set.
    Options(Vec<SubtypeOption>),
    /// Value struct.
    Properties(Vec<SubtypeProperty>),
}

/// Auxiliary type referenced by entity properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subtype {
    /// Subtype name.
    pub name: String,
    /// Shape and members.
    pub items: SubtypeItems,
}

impl Subtype {
    /// Creates a subtype.
    #[must_use]
    pub fn new(name: impl Into<String>, items: SubtypeItems) -> Self {
        Self {
            name: name.into(),
            items,
        }
    }

    /// Returns true if the subtype is an enum.
    #[must_use]
    pub fn is_enum(&self) -> bool {
        matches!(self.items, SubtypeItems::Cases(_))
    }

    /// Returns true if the subtype is an option set.
    #[must_use]
    pub fn is_option_set(&self) -> bool {
        matches!(self.items, SubtypeItems::Options(_))
    }

    /// Returns true if the subtype is a value struct.
    #[must_use]
    pub fn is_struct(&self) -> bool {
        matches!(self.items, SubtypeItems::Properties(_))
    }

    /// Returns the used cases of an enum subtype, in declared order.
    pub fn used_cases(&self) -> impl Iterator<Item = &SubtypeCase> {
        let cases = match &self.items {
            SubtypeItems::Cases(cases) => cases.as_slice(),
            _ => &[],
        };
        cases.iter().filter(|case| !case.unused)
    }

    /// Returns the used options with their bit positions.
    ///
    /// The bit position of an option is its index in the full declared list,
    /// so retiring an option never shifts the others.
    pub fn option_bits(&self) -> impl Iterator<Item = (&SubtypeOption, u32)> {
        let options = match &self.items {
            SubtypeItems::Options(options) => options.as_slice(),
            _ => &[],
        };
        options
            .iter()
            .zip(0u32..)
            .filter(|(option, _)| !option.unused)
    }
}
