//! Program fragment nodes.
//!
//! [`Node`] is the closed set of everything a generator can emit: type
//! declarations, members, comments, formatting markers and statements. The
//! tree is strictly owned from the file down to its leaves; there are no
//! parent pointers, so nested structures can be assembled in any order.
//!
//! Nodes are permissive: a [`Case`] inside a struct, for instance, is not
//! rejected here. Structural validity is the caller's responsibility.

use crate::expr::{Block, Reference};
use crate::types::{AccessLevel, TypeIdentifier, TypeKind};

/// Any program fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Type declaration.
    Type(Type),
    /// Extension of an existing type.
    Extension(Extension),
    /// Stored or computed property, or local binding.
    Property(Property),
    /// Function, initializer, operator or subscript.
    Function(Function),
    /// `typealias`
    TypeAlias(TypeAlias),
    /// Enum case.
    Case(Case),
    /// Comment.
    Comment(Comment),
    /// Blank line.
    EmptyLine,
    /// `if`
    If(If),
    /// `guard`
    Guard(Guard),
    /// `switch`
    Switch(Switch),
    /// `do { } catch { }`
    DoCatch(DoCatch),
    /// `lhs = rhs`
    Assignment(Assignment),
    /// `return` with an optional value.
    Return(Option<Reference>),
    /// Expression statement.
    Expr(Reference),
}

impl Node {
    /// `return value`
    #[must_use]
    pub fn return_value(value: Reference) -> Self {
        Self::Return(Some(value))
    }

    /// Returns true if executing the node may throw out of its context.
    #[must_use]
    pub fn contains_throwing(&self) -> bool {
        match self {
            Self::Property(property) => {
                property.value.as_ref().is_some_and(Reference::contains_throwing)
            }
            Self::If(node) => {
                node.conditions.iter().any(Condition::contains_throwing)
                    || body_contains_throwing(&node.body)
                    || node.else_body.as_deref().is_some_and(body_contains_throwing)
            }
            Self::Guard(node) => {
                node.conditions.iter().any(Condition::contains_throwing)
                    || body_contains_throwing(&node.else_body)
            }
            Self::Switch(node) => {
                node.reference.contains_throwing()
                    || node.cases.iter().any(|case| body_contains_throwing(&case.body))
            }
            Self::DoCatch(node) => {
                let exhaustive = node.catches.iter().any(|catch| catch.pattern.is_none());
                (!exhaustive && body_contains_throwing(&node.body))
                    || node.catches.iter().any(|catch| body_contains_throwing(&catch.body))
            }
            Self::Assignment(node) => node.value.contains_throwing(),
            Self::Return(value) => value.as_ref().is_some_and(Reference::contains_throwing),
            Self::Expr(value) => value.contains_throwing(),
            Self::Type(_)
            | Self::Extension(_)
            | Self::Function(_)
            | Self::TypeAlias(_)
            | Self::Case(_)
            | Self::Comment(_)
            | Self::EmptyLine => false,
        }
    }
}

/// Returns true if any statement of `body` may throw.
#[must_use]
pub fn body_contains_throwing(body: &[Node]) -> bool {
    body.iter().any(Node::contains_throwing)
}

macro_rules! impl_into_node {
    ($($variant:ident($ty:ty)),+ $(,)?) => {
        $(
            impl From<$ty> for Node {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )+
    };
}

impl_into_node! {
    Type(Type),
    Extension(Extension),
    Property(Property),
    Function(Function),
    TypeAlias(TypeAlias),
    Case(Case),
    Comment(Comment),
    If(If),
    Guard(Guard),
    Switch(Switch),
    DoCatch(DoCatch),
    Assignment(Assignment),
    Expr(Reference),
}

/// Type declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    /// Declared name and generic parameters.
    pub identifier: TypeIdentifier,
    /// Kind of declaration.
    pub kind: TypeKind,
    /// Access level.
    pub access_level: AccessLevel,
    /// Inherited types and conformances, without duplicates.
    pub inherited_types: Vec<TypeIdentifier>,
    /// Members in declaration order.
    pub body: Vec<Node>,
    /// Whether the type is exported to Objective-C.
    pub objc: bool,
}

impl Type {
    /// Creates a type declaration.
    #[must_use]
    pub fn new(identifier: TypeIdentifier, kind: TypeKind) -> Self {
        Self {
            identifier,
            kind,
            access_level: AccessLevel::Default,
            inherited_types: Vec::new(),
            body: Vec::new(),
            objc: false,
        }
    }

    /// Replaces the kind.
    #[must_use]
    pub fn with_kind(mut self, kind: TypeKind) -> Self {
        self.kind = kind;
        self
    }

    /// Replaces the access level.
    #[must_use]
    pub fn with_access_level(mut self, access_level: AccessLevel) -> Self {
        self.access_level = access_level;
        self
    }

    /// Marks the type as exported to Objective-C.
    #[must_use]
    pub fn with_objc(mut self, objc: bool) -> Self {
        self.objc = objc;
        self
    }

    /// Adds an inherited type unless an equal one is already present.
    #[must_use]
    pub fn adding_inherited_type(mut self, identifier: TypeIdentifier) -> Self {
        if !self.inherited_types.contains(&identifier) {
            self.inherited_types.push(identifier);
        }
        self
    }

    /// Adds several inherited types, skipping duplicates.
    #[must_use]
    pub fn adding_inherited_types(self, identifiers: impl IntoIterator<Item = TypeIdentifier>) -> Self {
        identifiers
            .into_iter()
            .fold(self, Self::adding_inherited_type)
    }

    /// Appends a member.
    #[must_use]
    pub fn adding_member(mut self, member: impl Into<Node>) -> Self {
        self.body.push(member.into());
        self
    }

    /// Appends several members.
    #[must_use]
    pub fn adding_members(mut self, members: impl IntoIterator<Item = Node>) -> Self {
        self.body.extend(members);
        self
    }
}

/// Extension of an existing type.
#[derive(Debug, Clone, PartialEq)]
pub struct Extension {
    /// Extended type.
    pub type_identifier: TypeIdentifier,
    /// Access level.
    pub access_level: AccessLevel,
    /// Added conformances, without duplicates.
    pub inherited_types: Vec<TypeIdentifier>,
    /// `where` clause.
    pub constraints: Vec<GenericConstraint>,
    /// Members in declaration order.
    pub body: Vec<Node>,
}

impl Extension {
    /// Creates an extension of `type_identifier`.
    #[must_use]
    pub fn new(type_identifier: TypeIdentifier) -> Self {
        Self {
            type_identifier,
            access_level: AccessLevel::Default,
            inherited_types: Vec::new(),
            constraints: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Replaces the access level.
    #[must_use]
    pub fn with_access_level(mut self, access_level: AccessLevel) -> Self {
        self.access_level = access_level;
        self
    }

    /// Adds a conformance unless an equal one is already present.
    #[must_use]
    pub fn adding_inherited_type(mut self, identifier: TypeIdentifier) -> Self {
        if !self.inherited_types.contains(&identifier) {
            self.inherited_types.push(identifier);
        }
        self
    }

    /// Adds a `where` constraint.
    #[must_use]
    pub fn adding_constraint(mut self, constraint: GenericConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Appends a member.
    #[must_use]
    pub fn adding_member(mut self, member: impl Into<Node>) -> Self {
        self.body.push(member.into());
        self
    }

    /// Appends several members.
    #[must_use]
    pub fn adding_members(mut self, members: impl IntoIterator<Item = Node>) -> Self {
        self.body.extend(members);
        self
    }
}

/// Storage qualifier of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Storage {
    /// `static`
    pub is_static: bool,
    /// `lazy`
    pub is_lazy: bool,
    /// `weak`
    pub is_weak: bool,
}

/// Named binding with an optional declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// Binding name.
    pub name: String,
    /// Declared type.
    pub type_identifier: Option<TypeIdentifier>,
    /// `let` when true, `var` otherwise.
    pub immutable: bool,
    /// Storage qualifiers.
    pub storage: Storage,
}

impl Variable {
    /// Creates an immutable, untyped binding.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_identifier: None,
            immutable: true,
            storage: Storage::default(),
        }
    }

    /// Sets the declared type.
    #[must_use]
    pub fn with_type(mut self, type_identifier: TypeIdentifier) -> Self {
        self.type_identifier = Some(type_identifier);
        self
    }

    /// Sets mutability (`let` when immutable).
    #[must_use]
    pub fn with_immutable(mut self, immutable: bool) -> Self {
        self.immutable = immutable;
        self
    }

    /// Marks the binding `static`.
    #[must_use]
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.storage.is_static = is_static;
        self
    }

    /// Marks the binding `lazy` (and mutable).
    #[must_use]
    pub fn with_lazy(mut self, is_lazy: bool) -> Self {
        self.storage.is_lazy = is_lazy;
        if is_lazy {
            self.immutable = false;
        }
        self
    }

    /// Marks the binding `weak` (and mutable).
    #[must_use]
    pub fn with_weak(mut self, is_weak: bool) -> Self {
        self.storage.is_weak = is_weak;
        if is_weak {
            self.immutable = false;
        }
        self
    }

    /// Returns the binding as an expression.
    #[must_use]
    pub fn reference(&self) -> Reference {
        Reference::named(self.name.clone())
    }
}

/// Stored or computed property.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Binding.
    pub variable: Variable,
    /// Access level.
    pub access_level: AccessLevel,
    /// Setter access level (`private(set)`), if narrower.
    pub setter_access_level: Option<AccessLevel>,
    /// Initial value.
    pub value: Option<Reference>,
    /// Getter body for computed properties.
    pub body: Option<Vec<Node>>,
    /// Whether the property is exported to Objective-C.
    pub objc: bool,
}

impl Property {
    /// Creates a stored property for `variable`.
    #[must_use]
    pub fn new(variable: Variable) -> Self {
        Self {
            variable,
            access_level: AccessLevel::Default,
            setter_access_level: None,
            value: None,
            body: None,
            objc: false,
        }
    }

    /// Replaces the access level.
    #[must_use]
    pub fn with_access_level(mut self, access_level: AccessLevel) -> Self {
        self.access_level = access_level;
        self
    }

    /// Restricts the setter access level.
    #[must_use]
    pub fn with_setter_access_level(mut self, access_level: AccessLevel) -> Self {
        self.setter_access_level = Some(access_level);
        self
    }

    /// Sets the initial value.
    #[must_use]
    pub fn with_value(mut self, value: Reference) -> Self {
        self.value = Some(value);
        self
    }

    /// Turns the property into a computed one with `body` as getter.
    #[must_use]
    pub fn with_body(mut self, body: Vec<Node>) -> Self {
        self.variable.immutable = false;
        self.body = Some(body);
        self
    }

    /// Marks the property as exported to Objective-C.
    #[must_use]
    pub fn with_objc(mut self, objc: bool) -> Self {
        self.objc = objc;
        self
    }
}

/// Kind of function declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    /// `func name`
    Named(String),
    /// `init`, optionally `convenience` and/or failable (`init?`).
    Init {
        /// `convenience init`
        convenience: bool,
        /// `init?`
        failable: bool,
    },
    /// `static func <op>`
    Operator(String),
    /// `subscript`
    Subscript,
}

/// Function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionParameter {
    /// External label; `_` suppresses it.
    pub alias: Option<String>,
    /// Internal name.
    pub name: String,
    /// Declared type.
    pub type_identifier: TypeIdentifier,
    /// Default value.
    pub default_value: Option<Reference>,
    /// `inout`
    pub inout: bool,
    /// `@escaping`
    pub escaping: bool,
}

impl FunctionParameter {
    /// Creates a parameter labelled by its own name.
    #[must_use]
    pub fn new(name: impl Into<String>, type_identifier: TypeIdentifier) -> Self {
        Self {
            alias: None,
            name: name.into(),
            type_identifier,
            default_value: None,
            inout: false,
            escaping: false,
        }
    }

    /// Sets the external label.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default_value(mut self, value: Reference) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Marks the parameter `inout`.
    #[must_use]
    pub fn with_inout(mut self, inout: bool) -> Self {
        self.inout = inout;
        self
    }

    /// Marks the parameter `@escaping`.
    #[must_use]
    pub fn with_escaping(mut self, escaping: bool) -> Self {
        self.escaping = escaping;
        self
    }
}

/// Relation of a generic constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintRelation {
    /// `T: P`
    Conforms,
    /// `T == U`
    Equals,
}

/// Generic `where` constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenericConstraint {
    /// Constrained type.
    pub lhs: TypeIdentifier,
    /// Relation.
    pub relation: ConstraintRelation,
    /// Constraint target.
    pub rhs: TypeIdentifier,
}

impl GenericConstraint {
    /// `lhs: rhs`
    #[must_use]
    pub fn conforms(lhs: TypeIdentifier, rhs: TypeIdentifier) -> Self {
        Self {
            lhs,
            relation: ConstraintRelation::Conforms,
            rhs,
        }
    }

    /// `lhs == rhs`
    #[must_use]
    pub fn equals(lhs: TypeIdentifier, rhs: TypeIdentifier) -> Self {
        Self {
            lhs,
            relation: ConstraintRelation::Equals,
            rhs,
        }
    }
}

/// Function, initializer, operator or subscript declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    /// Kind and name.
    pub kind: FunctionKind,
    /// Access level.
    pub access_level: AccessLevel,
    /// Parameters.
    pub parameters: Vec<FunctionParameter>,
    /// Generic parameters.
    pub generic_parameters: Vec<TypeIdentifier>,
    /// `where` clause.
    pub constraints: Vec<GenericConstraint>,
    /// `throws`
    pub throws: bool,
    /// `async`
    pub is_async: bool,
    /// `static`
    pub is_static: bool,
    /// `override`
    pub is_override: bool,
    /// `mutating`
    pub is_mutating: bool,
    /// `@discardableResult`
    pub discardable_result: bool,
    /// Return type.
    pub result_type: Option<TypeIdentifier>,
    /// Statements.
    pub body: Vec<Node>,
}

impl Function {
    /// Creates a function of the given kind.
    #[must_use]
    pub fn new(kind: FunctionKind) -> Self {
        Self {
            kind,
            access_level: AccessLevel::Default,
            parameters: Vec::new(),
            generic_parameters: Vec::new(),
            constraints: Vec::new(),
            throws: false,
            is_async: false,
            is_static: false,
            is_override: false,
            is_mutating: false,
            discardable_result: false,
            result_type: None,
            body: Vec::new(),
        }
    }

    /// `func name`
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(FunctionKind::Named(name.into()))
    }

    /// Designated `init`.
    #[must_use]
    pub fn init() -> Self {
        Self::new(FunctionKind::Init {
            convenience: false,
            failable: false,
        })
    }

    /// `convenience init`
    #[must_use]
    pub fn convenience_init() -> Self {
        Self::new(FunctionKind::Init {
            convenience: true,
            failable: false,
        })
    }

    /// `static func <symbol>`
    #[must_use]
    pub fn operator(symbol: impl Into<String>) -> Self {
        let mut function = Self::new(FunctionKind::Operator(symbol.into()));
        function.is_static = true;
        function
    }

    /// Replaces the access level.
    #[must_use]
    pub fn with_access_level(mut self, access_level: AccessLevel) -> Self {
        self.access_level = access_level;
        self
    }

    /// Appends a parameter.
    #[must_use]
    pub fn adding_parameter(mut self, parameter: FunctionParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Appends several parameters.
    #[must_use]
    pub fn adding_parameters(mut self, parameters: impl IntoIterator<Item = FunctionParameter>) -> Self {
        self.parameters.extend(parameters);
        self
    }

    /// Appends a generic parameter.
    #[must_use]
    pub fn adding_generic_parameter(mut self, parameter: TypeIdentifier) -> Self {
        self.generic_parameters.push(parameter);
        self
    }

    /// Appends a `where` constraint.
    #[must_use]
    pub fn adding_constraint(mut self, constraint: GenericConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Sets the `throws` effect.
    #[must_use]
    pub fn with_throws(mut self, throws: bool) -> Self {
        self.throws = throws;
        self
    }

    /// Sets the `async` effect.
    #[must_use]
    pub fn with_async(mut self, is_async: bool) -> Self {
        self.is_async = is_async;
        self
    }

    /// Marks the function `static`.
    #[must_use]
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// Marks the function `override`.
    #[must_use]
    pub fn with_override(mut self, is_override: bool) -> Self {
        self.is_override = is_override;
        self
    }

    /// Marks the function `mutating`.
    #[must_use]
    pub fn with_mutating(mut self, is_mutating: bool) -> Self {
        self.is_mutating = is_mutating;
        self
    }

    /// Adds `@discardableResult`.
    #[must_use]
    pub fn with_discardable_result(mut self, discardable: bool) -> Self {
        self.discardable_result = discardable;
        self
    }

    /// Sets the return type.
    #[must_use]
    pub fn with_result_type(mut self, result_type: TypeIdentifier) -> Self {
        self.result_type = Some(result_type);
        self
    }

    /// Appends a statement.
    #[must_use]
    pub fn adding_statement(mut self, statement: impl Into<Node>) -> Self {
        self.body.push(statement.into());
        self
    }

    /// Appends several statements.
    #[must_use]
    pub fn adding_statements(mut self, statements: impl IntoIterator<Item = Node>) -> Self {
        self.body.extend(statements);
        self
    }

    /// Returns the function name, if it is a named function.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            FunctionKind::Named(name) => Some(name),
            _ => None,
        }
    }
}

/// `typealias identifier = value`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAlias {
    /// Alias name.
    pub identifier: TypeIdentifier,
    /// Aliased type.
    pub value: TypeIdentifier,
    /// Access level.
    pub access_level: AccessLevel,
}

impl TypeAlias {
    /// Creates a type alias.
    #[must_use]
    pub fn new(identifier: TypeIdentifier, value: TypeIdentifier) -> Self {
        Self {
            identifier,
            value,
            access_level: AccessLevel::Default,
        }
    }

    /// Replaces the access level.
    #[must_use]
    pub fn with_access_level(mut self, access_level: AccessLevel) -> Self {
        self.access_level = access_level;
        self
    }
}

/// Enum case.
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    /// Case name.
    pub name: String,
    /// Associated value types.
    pub associated_types: Vec<TypeIdentifier>,
    /// Raw value.
    pub raw_value: Option<Reference>,
}

impl Case {
    /// Creates a case without payload.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            associated_types: Vec::new(),
            raw_value: None,
        }
    }

    /// Appends an associated value type.
    #[must_use]
    pub fn adding_associated_type(mut self, type_identifier: TypeIdentifier) -> Self {
        self.associated_types.push(type_identifier);
        self
    }

    /// Sets the raw value.
    #[must_use]
    pub fn with_raw_value(mut self, raw_value: Reference) -> Self {
        self.raw_value = Some(raw_value);
        self
    }
}

/// Comment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Comment {
    /// `// text`
    Line(String),
    /// `/// text`
    Doc(String),
    /// `// MARK: - text`
    Mark(String),
}

impl Comment {
    /// `// text`
    #[must_use]
    pub fn line(text: impl Into<String>) -> Self {
        Self::Line(text.into())
    }

    /// `/// text`
    #[must_use]
    pub fn doc(text: impl Into<String>) -> Self {
        Self::Doc(text.into())
    }

    /// `// MARK: - text`
    #[must_use]
    pub fn mark(text: impl Into<String>) -> Self {
        Self::Mark(text.into())
    }
}

/// Condition of an `if` or `guard`.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Boolean expression.
    Expr(Reference),
    /// Optional binding: `let name = value`.
    Let {
        /// Bound name.
        name: String,
        /// Optional value.
        value: Reference,
    },
}

impl Condition {
    /// `let name = value`
    #[must_use]
    pub fn binding(name: impl Into<String>, value: Reference) -> Self {
        Self::Let {
            name: name.into(),
            value,
        }
    }

    /// Returns true if evaluating the condition may throw.
    #[must_use]
    pub fn contains_throwing(&self) -> bool {
        match self {
            Self::Expr(value) | Self::Let { value, .. } => value.contains_throwing(),
        }
    }
}

impl From<Reference> for Condition {
    fn from(value: Reference) -> Self {
        Self::Expr(value)
    }
}

/// `if conditions { body } else { else_body }`
#[derive(Debug, Clone, PartialEq)]
pub struct If {
    /// Comma separated conditions.
    pub conditions: Vec<Condition>,
    /// Statements executed when every condition holds.
    pub body: Vec<Node>,
    /// `else` branch.
    pub else_body: Option<Vec<Node>>,
}

impl If {
    /// Creates an `if` with a single condition.
    #[must_use]
    pub fn new(condition: impl Into<Condition>) -> Self {
        Self {
            conditions: vec![condition.into()],
            body: Vec::new(),
            else_body: None,
        }
    }

    /// Adds a condition.
    #[must_use]
    pub fn adding_condition(mut self, condition: impl Into<Condition>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    /// Appends a statement to the body.
    #[must_use]
    pub fn adding_statement(mut self, statement: impl Into<Node>) -> Self {
        self.body.push(statement.into());
        self
    }

    /// Appends several statements to the body.
    #[must_use]
    pub fn adding_statements(mut self, statements: impl IntoIterator<Item = Node>) -> Self {
        self.body.extend(statements);
        self
    }

    /// Sets the `else` branch.
    #[must_use]
    pub fn with_else(mut self, else_body: Vec<Node>) -> Self {
        self.else_body = Some(else_body);
        self
    }
}

/// `guard conditions else { else_body }`
#[derive(Debug, Clone, PartialEq)]
pub struct Guard {
    /// Comma separated conditions.
    pub conditions: Vec<Condition>,
    /// Statements executed when a condition fails.
    pub else_body: Vec<Node>,
}

impl Guard {
    /// Creates a `guard` with a single condition.
    #[must_use]
    pub fn new(condition: impl Into<Condition>) -> Self {
        Self {
            conditions: vec![condition.into()],
            else_body: Vec::new(),
        }
    }

    /// Adds a condition.
    #[must_use]
    pub fn adding_condition(mut self, condition: impl Into<Condition>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    /// Appends a statement to the `else` branch.
    #[must_use]
    pub fn adding_else_statement(mut self, statement: impl Into<Node>) -> Self {
        self.else_body.push(statement.into());
        self
    }
}

/// Pattern of a switch case.
#[derive(Debug, Clone, PartialEq)]
pub enum SwitchPattern {
    /// `default`
    Default,
    /// `case .tag`
    Tag(String),
    /// `case .tag(let a, let b)`
    TagWithBindings(String, Vec<String>),
    /// `case value`
    Value(Reference),
}

/// One case of a switch.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    /// Matched pattern.
    pub pattern: SwitchPattern,
    /// Statements.
    pub body: Vec<Node>,
}

impl SwitchCase {
    /// Creates a case for `pattern`.
    #[must_use]
    pub fn new(pattern: SwitchPattern) -> Self {
        Self {
            pattern,
            body: Vec::new(),
        }
    }

    /// `case .tag`
    #[must_use]
    pub fn tag(name: impl Into<String>) -> Self {
        Self::new(SwitchPattern::Tag(name.into()))
    }

    /// `default`
    #[must_use]
    pub fn default_case() -> Self {
        Self::new(SwitchPattern::Default)
    }

    /// Appends a statement.
    #[must_use]
    pub fn adding_statement(mut self, statement: impl Into<Node>) -> Self {
        self.body.push(statement.into());
        self
    }

    /// Appends several statements.
    #[must_use]
    pub fn adding_statements(mut self, statements: impl IntoIterator<Item = Node>) -> Self {
        self.body.extend(statements);
        self
    }
}

/// `switch reference { cases }`
#[derive(Debug, Clone, PartialEq)]
pub struct Switch {
    /// Switched value.
    pub reference: Reference,
    /// Cases in order.
    pub cases: Vec<SwitchCase>,
}

impl Switch {
    /// Creates a switch over `reference`.
    #[must_use]
    pub fn new(reference: Reference) -> Self {
        Self {
            reference,
            cases: Vec::new(),
        }
    }

    /// Appends a case.
    #[must_use]
    pub fn adding_case(mut self, case: SwitchCase) -> Self {
        self.cases.push(case);
        self
    }

    /// Appends several cases.
    #[must_use]
    pub fn adding_cases(mut self, cases: impl IntoIterator<Item = SwitchCase>) -> Self {
        self.cases.extend(cases);
        self
    }
}

/// One `catch` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Catch {
    /// Matched error pattern; `None` catches everything.
    pub pattern: Option<Reference>,
    /// Statements.
    pub body: Vec<Node>,
}

impl Catch {
    /// Creates a catch-all clause.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pattern: None,
            body: Vec::new(),
        }
    }

    /// Restricts the clause to `pattern`.
    #[must_use]
    pub fn with_pattern(mut self, pattern: Reference) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Appends a statement.
    #[must_use]
    pub fn adding_statement(mut self, statement: impl Into<Node>) -> Self {
        self.body.push(statement.into());
        self
    }
}

impl Default for Catch {
    fn default() -> Self {
        Self::new()
    }
}

/// `do { body } catch { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct DoCatch {
    /// Statements that may throw.
    pub body: Vec<Node>,
    /// Catch clauses in order.
    pub catches: Vec<Catch>,
}

impl DoCatch {
    /// Creates an empty `do` block.
    #[must_use]
    pub fn new() -> Self {
        Self {
            body: Vec::new(),
            catches: Vec::new(),
        }
    }

    /// Appends a statement to the `do` body.
    #[must_use]
    pub fn adding_statement(mut self, statement: impl Into<Node>) -> Self {
        self.body.push(statement.into());
        self
    }

    /// Appends several statements to the `do` body.
    #[must_use]
    pub fn adding_statements(mut self, statements: impl IntoIterator<Item = Node>) -> Self {
        self.body.extend(statements);
        self
    }

    /// Appends a catch clause.
    #[must_use]
    pub fn adding_catch(mut self, catch: Catch) -> Self {
        self.catches.push(catch);
        self
    }
}

impl Default for DoCatch {
    fn default() -> Self {
        Self::new()
    }
}

/// `variable = value`
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Assigned location.
    pub variable: Reference,
    /// Assigned value.
    pub value: Reference,
}

impl Assignment {
    /// Creates an assignment.
    #[must_use]
    pub fn new(variable: Reference, value: Reference) -> Self {
        Self { variable, value }
    }
}

impl From<Block> for Node {
    fn from(block: Block) -> Self {
        Self::Expr(Reference::Block(block))
    }
}
