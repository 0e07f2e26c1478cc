//! Type references and type-level attributes.
//!
//! This module provides [`TypeIdentifier`], the structural name of a target
//! language type, along with the small enums describing declared types:
//! - [`TypeKind`] - class, struct, enum or protocol
//! - [`AccessLevel`] - visibility modifier
//! - [`TypeWrapper`] - optional/array wrapping applied to a base name

use crate::expr::Reference;

/// Wrapping applied on top of a named type.
///
/// Wrappers are stacked from the innermost to the outermost, so
/// `[Optional, Array]` is `[T?]` while `[Array, Optional]` is `[T]?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeWrapper {
    /// `T?`
    Optional,
    /// `[T]`
    Array,
}

/// Structural reference to a type.
///
/// Two identifiers are equal when they name the same type with the same
/// generic parameters and the same wrapper stack. Identifiers are hashable
/// and ordered so generators can collect them in sets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeIdentifier {
    /// Base name, e.g. `AnySequence`.
    pub name: String,
    /// Generic parameters, e.g. `<ItemIdentifier>`.
    pub generic_parameters: Vec<TypeIdentifier>,
    /// Wrapper stack, innermost first.
    pub wrappers: Vec<TypeWrapper>,
    /// Whether the identifier is used as a value (`T.self`).
    pub is_metatype: bool,
}

impl TypeIdentifier {
    /// Creates an identifier for a plain named type.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            generic_parameters: Vec::new(),
            wrappers: Vec::new(),
            is_metatype: false,
        }
    }

    /// Appends a generic parameter.
    #[must_use]
    pub fn adding_generic_parameter(mut self, parameter: TypeIdentifier) -> Self {
        self.generic_parameters.push(parameter);
        self
    }

    /// Replaces the generic parameters.
    #[must_use]
    pub fn with_generic_parameters(mut self, parameters: Vec<TypeIdentifier>) -> Self {
        self.generic_parameters = parameters;
        self
    }

    /// Wraps the identifier in an optional. Calling it twice yields `T??`.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.wrappers.push(TypeWrapper::Optional);
        self
    }

    /// Wraps the identifier in an optional unless `condition` is false.
    #[must_use]
    pub fn optional_if(self, condition: bool) -> Self {
        if condition { self.optional() } else { self }
    }

    /// Wraps the identifier in an array.
    #[must_use]
    pub fn array(mut self) -> Self {
        self.wrappers.push(TypeWrapper::Array);
        self
    }

    /// Marks the identifier as a value-level reference (`T.self`).
    #[must_use]
    pub fn metatype(mut self) -> Self {
        self.is_metatype = true;
        self
    }

    /// Returns true if the outermost wrapper is an optional.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.wrappers.last() == Some(&TypeWrapper::Optional)
    }

    /// Returns true if the outermost wrapper is an array.
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.wrappers.last() == Some(&TypeWrapper::Array)
    }

    /// Removes the outermost optional wrapper, if any.
    #[must_use]
    pub fn unwrapped(mut self) -> Self {
        if self.is_optional() {
            self.wrappers.pop();
        }
        self
    }

    /// Returns the type wrapped by the outermost wrapper: the element of an
    /// array or the value of an optional. Unwrapped identifiers are returned
    /// unchanged.
    #[must_use]
    pub fn wrapped_value(mut self) -> Self {
        self.wrappers.pop();
        self
    }

    /// Returns the identifier with every wrapper removed.
    #[must_use]
    pub fn base(&self) -> Self {
        Self {
            name: self.name.clone(),
            generic_parameters: self.generic_parameters.clone(),
            wrappers: Vec::new(),
            is_metatype: false,
        }
    }

    /// Returns the identifier as an expression, e.g. `Item` or `Item.self`.
    #[must_use]
    pub fn reference(&self) -> Reference {
        Reference::Type(self.clone())
    }

    /// `String`
    #[must_use]
    pub fn string() -> Self {
        Self::named("String")
    }

    /// `Int`
    #[must_use]
    pub fn int() -> Self {
        Self::named("Int")
    }

    /// `Int64`
    #[must_use]
    pub fn int64() -> Self {
        Self::named("Int64")
    }

    /// `Bool`
    #[must_use]
    pub fn bool() -> Self {
        Self::named("Bool")
    }

    /// `Date`
    #[must_use]
    pub fn date() -> Self {
        Self::named("Date")
    }

    /// `Double`
    #[must_use]
    pub fn double() -> Self {
        Self::named("Double")
    }

    /// `Float`
    #[must_use]
    pub fn float() -> Self {
        Self::named("Float")
    }

    /// `URL`
    #[must_use]
    pub fn url() -> Self {
        Self::named("URL")
    }

    /// `Data`
    #[must_use]
    pub fn data() -> Self {
        Self::named("Data")
    }

    /// `Void`
    #[must_use]
    pub fn void() -> Self {
        Self::named("Void")
    }

    /// `Self`
    #[must_use]
    pub fn self_type() -> Self {
        Self::named("Self")
    }

    /// `AnySequence<element>`
    #[must_use]
    pub fn any_sequence(element: TypeIdentifier) -> Self {
        Self::named("AnySequence").adding_generic_parameter(element)
    }

    /// `Lazy<value>`
    #[must_use]
    pub fn lazy(value: TypeIdentifier) -> Self {
        Self::named("Lazy").adding_generic_parameter(value)
    }

    /// `[key: value]`
    #[must_use]
    pub fn dictionary(key: TypeIdentifier, value: TypeIdentifier) -> Self {
        Self::named("Dictionary")
            .adding_generic_parameter(key)
            .adding_generic_parameter(value)
    }
}

impl From<&str> for TypeIdentifier {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

impl From<String> for TypeIdentifier {
    fn from(name: String) -> Self {
        Self::named(name)
    }
}

/// Kind of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// `class`, optionally `final`.
    Class {
        /// Whether the class is `final`.
        is_final: bool,
    },
    /// `struct`
    Struct,
    /// `enum`, optionally `indirect`.
    Enum {
        /// Whether the enum is `indirect`.
        indirect: bool,
    },
    /// `protocol`
    Protocol,
}

impl TypeKind {
    /// `final class`
    pub const FINAL_CLASS: Self = Self::Class { is_final: true };
    /// `enum`
    pub const ENUM: Self = Self::Enum { indirect: false };

    /// Returns the keyword(s) introducing the declaration.
    #[must_use]
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::Class { is_final: true } => "final class",
            Self::Class { is_final: false } => "class",
            Self::Struct => "struct",
            Self::Enum { indirect: true } => "indirect enum",
            Self::Enum { indirect: false } => "enum",
            Self::Protocol => "protocol",
        }
    }
}

/// Access level modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AccessLevel {
    /// No modifier (module-internal by default).
    #[default]
    Default,
    /// `open`
    Open,
    /// `public`
    Public,
    /// `internal`
    Internal,
    /// `fileprivate`
    FilePrivate,
    /// `private`
    Private,
}

impl AccessLevel {
    /// Returns the modifier keyword, or `None` for [`AccessLevel::Default`].
    #[must_use]
    pub const fn keyword(&self) -> Option<&'static str> {
        match self {
            Self::Default => None,
            Self::Open => Some("open"),
            Self::Public => Some("public"),
            Self::Internal => Some("internal"),
            Self::FilePrivate => Some("fileprivate"),
            Self::Private => Some("private"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_nested_optionals_are_distinct() {
        let single = TypeIdentifier::string().optional();
        let double = TypeIdentifier::string().optional().optional();
        assert_ne!(single, double);
        assert_eq!(double.clone().unwrapped(), single);
    }

    #[test]
    fn test_wrapper_order_matters() {
        let array_of_optionals = TypeIdentifier::int().optional().array();
        let optional_array = TypeIdentifier::int().array().optional();
        assert_ne!(array_of_optionals, optional_array);
        assert!(array_of_optionals.is_array());
        assert!(optional_array.is_optional());
    }

    #[test]
    fn test_identifiers_deduplicate_in_sets() {
        let mut set = HashSet::new();
        set.insert(TypeIdentifier::named("Codable"));
        set.insert(TypeIdentifier::named("Codable"));
        set.insert(TypeIdentifier::named("Codable").metatype());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_base_drops_wrappers() {
        let ty = TypeIdentifier::any_sequence(TypeIdentifier::named("TagIdentifier")).optional();
        let base = ty.base();
        assert!(base.wrappers.is_empty());
        assert_eq!(base.generic_parameters.len(), 1);
    }

    #[test]
    fn test_kind_keywords() {
        assert_eq!(TypeKind::FINAL_CLASS.keyword(), "final class");
        assert_eq!(TypeKind::Enum { indirect: true }.keyword(), "indirect enum");
        assert_eq!(AccessLevel::Default.keyword(), None);
        assert_eq!(AccessLevel::Public.keyword(), Some("public"));
    }
}
