//! Expression algebra.
//!
//! A [`Reference`] is a chain of operations over a root (a name, a type, a
//! literal or a closure). Chains are built left to right with builder
//! methods, so `a.b(x).c` reads as:
//!
//! ```
//! use ironmeta_core::expr::{Reference, Tuple};
//!
//! let expr = Reference::named("a")
//!     .member("b")
//!     .call(Tuple::new().adding_unnamed(Reference::named("x")))
//!     .member("c");
//! assert_eq!(expr.to_string(), "a.b(x).c");
//! ```
//!
//! Every builder consumes its operands and returns a new expression; operands
//! are never mutated in place.

use crate::node::Node;
use crate::types::TypeIdentifier;

/// Literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `nil`
    Nil,
    /// `true` / `false`
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// Floating point literal.
    Float(f64),
    /// String literal, rendered quoted and escaped.
    String(String),
    /// `[a, b]`
    Array(Vec<Reference>),
    /// `[k: v]`, `[:]` when empty.
    Dictionary(Vec<(Reference, Reference)>),
}

/// Prefix operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefixOperator {
    /// Implicit member shorthand: `.name`.
    Dot,
    /// `try`
    Try,
    /// `try?`
    TryOptional,
    /// `try!`
    TryForce,
    /// `throw`
    Throw,
    /// `await`
    Await,
    /// `&`
    AddressOf,
    /// `!`
    Not,
}

impl PrefixOperator {
    /// Returns the operator text, including its trailing separator.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Dot => ".",
            Self::Try => "try ",
            Self::TryOptional => "try? ",
            Self::TryForce => "try! ",
            Self::Throw => "throw ",
            Self::Await => "await ",
            Self::AddressOf => "&",
            Self::Not => "!",
        }
    }
}

/// Binary infix operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfixOperator {
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `<=`
    LessOrEqual,
    /// `>=`
    GreaterOrEqual,
    /// `&&`
    And,
    /// `||`
    Or,
    /// `??`
    NilCoalescing,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `<<`
    ShiftLeft,
    /// `as`
    As,
    /// `as?`
    AsOptional,
    /// `is`
    Is,
}

impl InfixOperator {
    /// Returns the operator symbol.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessOrEqual => "<=",
            Self::GreaterOrEqual => ">=",
            Self::And => "&&",
            Self::Or => "||",
            Self::NilCoalescing => "??",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::ShiftLeft => "<<",
            Self::As => "as",
            Self::AsOptional => "as?",
            Self::Is => "is",
        }
    }
}

/// One argument of a call or tuple literal.
#[derive(Debug, Clone, PartialEq)]
pub struct TupleParameter {
    /// Argument label, if any.
    pub name: Option<String>,
    /// Argument value.
    pub value: Reference,
}

impl TupleParameter {
    /// Creates a labelled argument.
    #[must_use]
    pub fn named(name: impl Into<String>, value: Reference) -> Self {
        Self {
            name: Some(name.into()),
            value,
        }
    }

    /// Creates an unlabelled argument.
    #[must_use]
    pub fn unnamed(value: Reference) -> Self {
        Self { name: None, value }
    }
}

/// Ordered list of optionally named arguments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tuple {
    /// Arguments in call order.
    pub parameters: Vec<TupleParameter>,
}

impl Tuple {
    /// Creates an empty tuple.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an argument.
    #[must_use]
    pub fn adding_parameter(mut self, parameter: TupleParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Appends a labelled argument.
    #[must_use]
    pub fn adding_named(self, name: impl Into<String>, value: Reference) -> Self {
        self.adding_parameter(TupleParameter::named(name, value))
    }

    /// Appends an unlabelled argument.
    #[must_use]
    pub fn adding_unnamed(self, value: Reference) -> Self {
        self.adding_parameter(TupleParameter::unnamed(value))
    }

    /// Appends several arguments.
    #[must_use]
    pub fn adding_parameters(mut self, parameters: impl IntoIterator<Item = TupleParameter>) -> Self {
        self.parameters.extend(parameters);
        self
    }

    /// Returns true if there are no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Returns true if any argument contains a throwing operation.
    #[must_use]
    pub fn contains_throwing(&self) -> bool {
        self.parameters.iter().any(|p| p.value.contains_throwing())
    }
}

/// Closure literal.
///
/// An empty parameter list renders as `{ body }` so the body may use
/// anonymous arguments (`$0`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    /// Parameter names.
    pub parameters: Vec<String>,
    /// Statements.
    pub body: Vec<Node>,
}

impl Block {
    /// Creates an empty closure.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a closure whose body is a single expression.
    #[must_use]
    pub fn expression(value: Reference) -> Self {
        Self {
            parameters: Vec::new(),
            body: vec![Node::Expr(value)],
        }
    }

    /// Appends a parameter name.
    #[must_use]
    pub fn adding_parameter(mut self, name: impl Into<String>) -> Self {
        self.parameters.push(name.into());
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
}

/// Expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Reference {
    /// Bare identifier: `name`.
    Name(String),
    /// Type used as a value: `T` or `T.self`.
    Type(TypeIdentifier),
    /// Literal.
    Value(Value),
    /// Closure literal.
    Block(Block),
    /// `base.name`
    Member {
        /// Receiver.
        base: Box<Reference>,
        /// Member name.
        name: String,
    },
    /// `callee(arguments)`
    Call {
        /// Called expression.
        callee: Box<Reference>,
        /// Arguments.
        arguments: Tuple,
    },
    /// `base[index]`
    Subscript {
        /// Receiver.
        base: Box<Reference>,
        /// Index expression.
        index: Box<Reference>,
    },
    /// Prefix operator application.
    Prefix {
        /// Operator.
        operator: PrefixOperator,
        /// Operand.
        operand: Box<Reference>,
    },
    /// Infix operator application.
    Infix {
        /// Left operand.
        lhs: Box<Reference>,
        /// Operator.
        operator: InfixOperator,
        /// Right operand.
        rhs: Box<Reference>,
    },
    /// Optional chaining hop: `base?`.
    OptionalChain(Box<Reference>),
    /// Force unwrap: `base!`.
    ForceUnwrap(Box<Reference>),
    /// Tuple literal: `(a, b: c)`.
    Tuple(Tuple),
}

impl Reference {
    /// Bare identifier.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Implicit member shorthand: `.name`.
    #[must_use]
    pub fn dot(name: impl Into<String>) -> Self {
        Self::Prefix {
            operator: PrefixOperator::Dot,
            operand: Box::new(Self::named(name)),
        }
    }

    /// `.none`
    #[must_use]
    pub fn none() -> Self {
        Self::dot("none")
    }

    /// `nil`
    #[must_use]
    pub fn nil() -> Self {
        Self::Value(Value::Nil)
    }

    /// `self`
    #[must_use]
    pub fn self_ref() -> Self {
        Self::named("self")
    }

    /// String literal.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::Value(Value::String(value.into()))
    }

    /// Integer literal.
    #[must_use]
    pub fn int(value: i64) -> Self {
        Self::Value(Value::Int(value))
    }

    /// Boolean literal.
    #[must_use]
    pub fn bool(value: bool) -> Self {
        Self::Value(Value::Bool(value))
    }

    /// Floating point literal.
    #[must_use]
    pub fn float(value: f64) -> Self {
        Self::Value(Value::Float(value))
    }

    /// Array literal.
    #[must_use]
    pub fn array(elements: impl IntoIterator<Item = Reference>) -> Self {
        Self::Value(Value::Array(elements.into_iter().collect()))
    }

    /// Closure literal.
    #[must_use]
    pub fn block(block: Block) -> Self {
        Self::Block(block)
    }

    /// Appends a `.name` hop.
    #[must_use]
    pub fn member(self, name: impl Into<String>) -> Self {
        Self::Member {
            base: Box::new(self),
            name: name.into(),
        }
    }

    /// Calls the current chain with `arguments`.
    #[must_use]
    pub fn call(self, arguments: Tuple) -> Self {
        Self::Call {
            callee: Box::new(self),
            arguments,
        }
    }

    /// Calls the current chain without arguments.
    #[must_use]
    pub fn call_empty(self) -> Self {
        self.call(Tuple::new())
    }

    /// Calls the current chain with a single trailing-style closure argument.
    #[must_use]
    pub fn call_block(self, block: Block) -> Self {
        self.call(Tuple::new().adding_unnamed(Self::Block(block)))
    }

    /// Subscripts the current chain.
    #[must_use]
    pub fn subscript(self, index: Reference) -> Self {
        Self::Subscript {
            base: Box::new(self),
            index: Box::new(index),
        }
    }

    /// Optional chaining hop: `self?`.
    #[must_use]
    pub fn optional(self) -> Self {
        Self::OptionalChain(Box::new(self))
    }

    /// Applies an optional chaining hop when `condition` holds.
    #[must_use]
    pub fn optional_if(self, condition: bool) -> Self {
        if condition { self.optional() } else { self }
    }

    /// Force unwrap: `self!`.
    #[must_use]
    pub fn force_unwrapped(self) -> Self {
        Self::ForceUnwrap(Box::new(self))
    }

    /// Combines `self` and `rhs` with `operator`.
    #[must_use]
    pub fn infix(self, operator: InfixOperator, rhs: Reference) -> Self {
        Self::Infix {
            lhs: Box::new(self),
            operator,
            rhs: Box::new(rhs),
        }
    }

    /// `self == rhs`
    #[must_use]
    pub fn equals(self, rhs: Reference) -> Self {
        self.infix(InfixOperator::Equal, rhs)
    }

    /// `self != rhs`
    #[must_use]
    pub fn not_equals(self, rhs: Reference) -> Self {
        self.infix(InfixOperator::NotEqual, rhs)
    }

    /// `self && rhs`
    #[must_use]
    pub fn and(self, rhs: Reference) -> Self {
        self.infix(InfixOperator::And, rhs)
    }

    /// `self || rhs`
    #[must_use]
    pub fn or(self, rhs: Reference) -> Self {
        self.infix(InfixOperator::Or, rhs)
    }

    /// `self ?? rhs`
    #[must_use]
    pub fn nil_coalescing(self, rhs: Reference) -> Self {
        self.infix(InfixOperator::NilCoalescing, rhs)
    }

    fn prefixed(operator: PrefixOperator, operand: Reference) -> Self {
        Self::Prefix {
            operator,
            operand: Box::new(operand),
        }
    }

    /// `try operand`
    #[must_use]
    pub fn try_expr(operand: Reference) -> Self {
        Self::prefixed(PrefixOperator::Try, operand)
    }

    /// `try? operand`
    #[must_use]
    pub fn try_optional(operand: Reference) -> Self {
        Self::prefixed(PrefixOperator::TryOptional, operand)
    }

    /// `throw operand`
    #[must_use]
    pub fn throw_expr(operand: Reference) -> Self {
        Self::prefixed(PrefixOperator::Throw, operand)
    }

    /// `await operand`
    #[must_use]
    pub fn await_expr(operand: Reference) -> Self {
        Self::prefixed(PrefixOperator::Await, operand)
    }

    /// `&operand`
    #[must_use]
    pub fn address_of(operand: Reference) -> Self {
        Self::prefixed(PrefixOperator::AddressOf, operand)
    }

    /// `!operand`
    #[must_use]
    pub fn not(operand: Reference) -> Self {
        Self::prefixed(PrefixOperator::Not, operand)
    }

    /// Returns true if the expression is literally `.none` or `nil`.
    #[must_use]
    pub fn is_none(&self) -> bool {
        match self {
            Self::Value(Value::Nil) => true,
            Self::Prefix {
                operator: PrefixOperator::Dot,
                operand,
            } => matches!(operand.as_ref(), Self::Name(name) if name == "none"),
            _ => false,
        }
    }

    /// Returns true if the expression is a leading-dot shorthand.
    #[must_use]
    pub fn is_implicit_member(&self) -> bool {
        matches!(
            self,
            Self::Prefix {
                operator: PrefixOperator::Dot,
                ..
            }
        )
    }

    /// Returns true if evaluating the expression may throw.
    ///
    /// `try`/`throw` mark the expression as throwing. `try?` and `try!`
    /// absorb errors raised by their operand. Closures are separate throwing
    /// contexts and are not inspected.
    #[must_use]
    pub fn contains_throwing(&self) -> bool {
        match self {
            Self::Prefix { operator, operand } => match operator {
                PrefixOperator::Try | PrefixOperator::Throw => true,
                PrefixOperator::TryOptional | PrefixOperator::TryForce => false,
                _ => operand.contains_throwing(),
            },
            Self::Name(_) | Self::Type(_) | Self::Block(_) => false,
            Self::Value(value) => value_children(value).any(Reference::contains_throwing),
            Self::Member { base, .. } => base.contains_throwing(),
            Self::Call { callee, arguments } => {
                callee.contains_throwing() || arguments.contains_throwing()
            }
            Self::Subscript { base, index } => base.contains_throwing() || index.contains_throwing(),
            Self::Infix { lhs, rhs, .. } => lhs.contains_throwing() || rhs.contains_throwing(),
            Self::OptionalChain(base) | Self::ForceUnwrap(base) => base.contains_throwing(),
            Self::Tuple(tuple) => tuple.contains_throwing(),
        }
    }

    /// Returns true if the expression contains an `await` outside closures.
    #[must_use]
    pub fn contains_await(&self) -> bool {
        match self {
            Self::Prefix { operator, operand } => {
                *operator == PrefixOperator::Await || operand.contains_await()
            }
            Self::Name(_) | Self::Type(_) | Self::Block(_) => false,
            Self::Value(value) => value_children(value).any(Reference::contains_await),
            Self::Member { base, .. } | Self::OptionalChain(base) | Self::ForceUnwrap(base) => {
                base.contains_await()
            }
            Self::Call { callee, arguments } => {
                callee.contains_await() || arguments.parameters.iter().any(|p| p.value.contains_await())
            }
            Self::Subscript { base, index } => base.contains_await() || index.contains_await(),
            Self::Infix { lhs, rhs, .. } => lhs.contains_await() || rhs.contains_await(),
            Self::Tuple(tuple) => tuple.parameters.iter().any(|p| p.value.contains_await()),
        }
    }
}

fn value_children(value: &Value) -> Box<dyn Iterator<Item = &Reference> + '_> {
    match value {
        Value::Array(elements) => Box::new(elements.iter()),
        Value::Dictionary(entries) => Box::new(entries.iter().flat_map(|(k, v)| [k, v])),
        _ => Box::new(std::iter::empty()),
    }
}

impl From<TypeIdentifier> for Reference {
    fn from(identifier: TypeIdentifier) -> Self {
        Self::Type(identifier)
    }
}

impl From<Value> for Reference {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_is_left_to_right() {
        let expr = Reference::named("a")
            .member("b")
            .call(Tuple::new().adding_named("x", Reference::int(1)))
            .member("c");
        match expr {
            Reference::Member { base, name } => {
                assert_eq!(name, "c");
                assert!(matches!(*base, Reference::Call { .. }));
            }
            other => panic!("unexpected expression: {other:?}"),
        }
    }

    #[test]
    fn test_is_none_is_structural() {
        assert!(Reference::none().is_none());
        assert!(Reference::nil().is_none());
        assert!(!Reference::named("none").is_none());
        assert!(!Reference::dot("some").is_none());
        assert!(!Reference::string(".none").is_none());
    }

    #[test]
    fn test_try_propagates_through_chains() {
        let throwing = Reference::try_expr(Reference::named("decode").call_empty());
        let wrapped = Reference::named("Item")
            .call(Tuple::new().adding_named("title", throwing.clone()))
            .member("value");
        assert!(wrapped.contains_throwing());
        assert!(Reference::array([throwing.clone()]).contains_throwing());
        assert!(Reference::named("x").nil_coalescing(throwing).contains_throwing());
    }

    #[test]
    fn test_absorbing_try_and_closures_do_not_throw() {
        let absorbed = Reference::try_optional(Reference::try_expr(Reference::named("f").call_empty()));
        assert!(!absorbed.contains_throwing());

        let closure = Reference::named("values").member("map").call_block(Block::expression(
            Reference::try_expr(Reference::named("decode").call_empty()),
        ));
        assert!(!closure.contains_throwing());
    }

    #[test]
    fn test_throw_is_throwing() {
        let expr = Reference::throw_expr(Reference::named("SubtypeError").member("unknownCase"));
        assert!(expr.contains_throwing());
    }

    #[test]
    fn test_contains_await() {
        let expr = Reference::await_expr(Reference::named("task").member("value"));
        assert!(expr.contains_await());
        assert!(!Reference::named("task").contains_await());
    }

    #[test]
    fn test_operands_are_not_mutated() {
        let lhs = Reference::named("lhs").member("title");
        let rhs = Reference::named("rhs").member("title");
        let eq = lhs.clone().equals(rhs.clone());
        assert_eq!(
            eq,
            Reference::Infix {
                lhs: Box::new(lhs),
                operator: InfixOperator::Equal,
                rhs: Box::new(rhs),
            }
        );
    }
}
