//! # IronMeta Core
//!
//! Target-language syntax tree for IronMeta generators.
//!
//! This crate provides:
//! - Type identifiers, type kinds and access levels
//! - The expression algebra ([`Reference`]) with left-to-right builders
//! - Declaration and statement nodes ([`Node`])
//! - Source file containers ([`File`])
//! - A deterministic Swift renderer

pub mod expr;
pub mod file;
pub mod node;
pub mod render;
pub mod types;

pub use expr::{Block, InfixOperator, PrefixOperator, Reference, Tuple, TupleParameter, Value};
pub use file::File;
pub use node::{
    Assignment, Case, Catch, Comment, Condition, DoCatch, Extension, Function, FunctionKind,
    FunctionParameter, GenericConstraint, Guard, If, Node, Property, Switch, SwitchCase,
    SwitchPattern, Type, TypeAlias, Variable, body_contains_throwing,
};
pub use render::{render_file, render_node, render_nodes};
pub use types::{AccessLevel, TypeIdentifier, TypeKind, TypeWrapper};
