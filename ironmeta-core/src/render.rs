//! Swift rendering front.
//!
//! Turns an AST into source text. Rendering is a pure function of the tree:
//! the same nodes always produce the same bytes, and nothing here reorders
//! members or consults hash-based collections.
//!
//! The renderer performs no validation. A tree that is structurally invalid
//! for the target grammar is rendered as-is.

use std::fmt::{self, Display};

use crate::expr::{Block, PrefixOperator, Reference, Tuple, TupleParameter, Value};
use crate::file::File;
use crate::node::{
    Case, Catch, Comment, Condition, ConstraintRelation, DoCatch, Extension, Function,
    FunctionKind, FunctionParameter, GenericConstraint, Guard, If, Node, Property, Switch,
    SwitchPattern, Type, TypeAlias,
};
use crate::types::{AccessLevel, TypeIdentifier, TypeWrapper};

const INDENT: &str = "    ";

/// Renders a complete file.
#[must_use]
pub fn render_file(file: &File) -> String {
    let mut renderer = Renderer::new();
    renderer.file(file);
    renderer.finish()
}

/// Renders a sequence of top-level nodes.
#[must_use]
pub fn render_nodes(nodes: &[Node]) -> String {
    let mut renderer = Renderer::new();
    renderer.nodes(nodes);
    renderer.finish()
}

/// Renders a single node.
#[must_use]
pub fn render_node(node: &Node) -> String {
    render_nodes(std::slice::from_ref(node))
}

/// Indentation-aware text writer.
#[derive(Debug, Default)]
struct Renderer {
    output: String,
    level: usize,
}

impl Renderer {
    fn new() -> Self {
        Self::default()
    }

    fn finish(self) -> String {
        self.output
    }

    fn push(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn start_line(&mut self) {
        for _ in 0..self.level {
            self.output.push_str(INDENT);
        }
    }

    fn end_line(&mut self) {
        self.output.push('\n');
    }

    fn line(&mut self, text: &str) {
        self.start_line();
        self.push(text);
        self.end_line();
    }

    fn indented(&mut self, f: impl FnOnce(&mut Self)) {
        self.level += 1;
        f(self);
        self.level -= 1;
    }

    fn file(&mut self, file: &File) {
        for comment in &file.header {
            self.comment(comment);
        }
        if !file.header.is_empty() {
            self.end_line();
        }
        for import in &file.imports {
            self.line(&format!("import {import}"));
        }
        for import in &file.testable_imports {
            self.line(&format!("@testable import {import}"));
        }
        let has_imports = !file.imports.is_empty() || !file.testable_imports.is_empty();
        if has_imports && !file.body.is_empty() {
            self.end_line();
        }
        self.nodes(&file.body);
    }

    fn nodes(&mut self, nodes: &[Node]) {
        for node in nodes {
            self.node(node);
        }
    }

    /// Writes `{`, the indented body and the closing `}`.
    fn braced_body(&mut self, body: &[Node]) {
        if body.is_empty() {
            self.push(" {}");
            self.end_line();
            return;
        }
        self.push(" {");
        self.end_line();
        self.indented(|r| r.nodes(body));
        self.line("}");
    }

    fn node(&mut self, node: &Node) {
        match node {
            Node::Type(ty) => self.type_decl(ty),
            Node::Extension(extension) => self.extension(extension),
            Node::Property(property) => self.property(property),
            Node::Function(function) => self.function(function),
            Node::TypeAlias(alias) => self.type_alias(alias),
            Node::Case(case) => self.case(case),
            Node::Comment(comment) => self.comment(comment),
            Node::EmptyLine => self.end_line(),
            Node::If(node) => self.if_statement(node),
            Node::Guard(node) => self.guard(node),
            Node::Switch(node) => self.switch(node),
            Node::DoCatch(node) => self.do_catch(node),
            Node::Assignment(node) => {
                self.start_line();
                self.reference(&node.variable);
                self.push(" = ");
                self.reference(&node.value);
                self.end_line();
            }
            Node::Return(value) => {
                self.start_line();
                self.push("return");
                if let Some(value) = value {
                    self.push(" ");
                    self.reference(value);
                }
                self.end_line();
            }
            Node::Expr(value) => {
                self.start_line();
                self.reference(value);
                self.end_line();
            }
        }
    }

    fn access(&mut self, access_level: AccessLevel) {
        if let Some(keyword) = access_level.keyword() {
            self.push(keyword);
            self.push(" ");
        }
    }

    fn inherited(&mut self, inherited_types: &[TypeIdentifier]) {
        for (index, identifier) in inherited_types.iter().enumerate() {
            self.push(if index == 0 { ": " } else { ", " });
            self.type_identifier(identifier);
        }
    }

    fn constraints(&mut self, constraints: &[GenericConstraint]) {
        for (index, constraint) in constraints.iter().enumerate() {
            self.push(if index == 0 { " where " } else { ", " });
            self.type_identifier(&constraint.lhs);
            self.push(match constraint.relation {
                ConstraintRelation::Conforms => ": ",
                ConstraintRelation::Equals => " == ",
            });
            self.type_identifier(&constraint.rhs);
        }
    }

    fn type_decl(&mut self, ty: &Type) {
        if ty.objc {
            self.line("@objc");
        }
        self.start_line();
        self.access(ty.access_level);
        self.push(ty.kind.keyword());
        self.push(" ");
        self.type_identifier(&ty.identifier);
        self.inherited(&ty.inherited_types);
        self.braced_body(&ty.body);
    }

    fn extension(&mut self, extension: &Extension) {
        self.start_line();
        self.access(extension.access_level);
        self.push("extension ");
        self.type_identifier(&extension.type_identifier);
        self.inherited(&extension.inherited_types);
        self.constraints(&extension.constraints);
        self.braced_body(&extension.body);
    }

    fn property(&mut self, property: &Property) {
        self.start_line();
        if property.objc {
            self.push("@objc ");
        }
        self.access(property.access_level);
        if let Some(setter) = property.setter_access_level
            && let Some(keyword) = setter.keyword()
        {
            self.push(keyword);
            self.push("(set) ");
        }
        let variable = &property.variable;
        if variable.storage.is_static {
            self.push("static ");
        }
        if variable.storage.is_lazy {
            self.push("lazy ");
        }
        if variable.storage.is_weak {
            self.push("weak ");
        }
        self.push(if variable.immutable { "let " } else { "var " });
        self.push(&variable.name);
        if let Some(identifier) = &variable.type_identifier {
            self.push(": ");
            self.type_identifier(identifier);
        }
        if let Some(value) = &property.value {
            self.push(" = ");
            self.reference(value);
        }
        match &property.body {
            Some(body) => self.braced_body(body),
            None => self.end_line(),
        }
    }

    fn parameter(&mut self, parameter: &FunctionParameter) {
        if let Some(alias) = &parameter.alias
            && alias != &parameter.name
        {
            self.push(alias);
            self.push(" ");
        }
        self.push(&parameter.name);
        self.push(": ");
        if parameter.inout {
            self.push("inout ");
        }
        if parameter.escaping {
            self.push("@escaping ");
        }
        self.type_identifier(&parameter.type_identifier);
        if let Some(value) = &parameter.default_value {
            self.push(" = ");
            self.reference(value);
        }
    }

    fn function(&mut self, function: &Function) {
        if function.discardable_result {
            self.line("@discardableResult");
        }
        self.start_line();
        self.access(function.access_level);
        if function.is_override {
            self.push("override ");
        }
        if function.is_static {
            self.push("static ");
        }
        if function.is_mutating {
            self.push("mutating ");
        }
        match &function.kind {
            FunctionKind::Named(name) => {
                self.push("func ");
                self.push(name);
            }
            FunctionKind::Init {
                convenience,
                failable,
            } => {
                if *convenience {
                    self.push("convenience ");
                }
                self.push(if *failable { "init?" } else { "init" });
            }
            FunctionKind::Operator(symbol) => {
                self.push("func ");
                self.push(symbol);
                self.push(" ");
            }
            FunctionKind::Subscript => self.push("subscript"),
        }
        if !function.generic_parameters.is_empty() {
            self.push("<");
            for (index, parameter) in function.generic_parameters.iter().enumerate() {
                if index > 0 {
                    self.push(", ");
                }
                self.type_identifier(parameter);
            }
            self.push(">");
        }
        self.push("(");
        for (index, parameter) in function.parameters.iter().enumerate() {
            if index > 0 {
                self.push(", ");
            }
            self.parameter(parameter);
        }
        self.push(")");
        if function.is_async {
            self.push(" async");
        }
        if function.throws {
            self.push(" throws");
        }
        if let Some(result) = &function.result_type {
            self.push(" -> ");
            self.type_identifier(result);
        }
        self.constraints(&function.constraints);
        self.braced_body(&function.body);
    }

    fn type_alias(&mut self, alias: &TypeAlias) {
        self.start_line();
        self.access(alias.access_level);
        self.push("typealias ");
        self.type_identifier(&alias.identifier);
        self.push(" = ");
        self.type_identifier(&alias.value);
        self.end_line();
    }

    fn case(&mut self, case: &Case) {
        self.start_line();
        self.push("case ");
        self.push(&declared_name(&case.name));
        if !case.associated_types.is_empty() {
            self.push("(");
            for (index, identifier) in case.associated_types.iter().enumerate() {
                if index > 0 {
                    self.push(", ");
                }
                self.type_identifier(identifier);
            }
            self.push(")");
        }
        if let Some(raw_value) = &case.raw_value {
            self.push(" = ");
            self.reference(raw_value);
        }
        self.end_line();
    }

    fn comment(&mut self, comment: &Comment) {
        let (prefix, text) = match comment {
            Comment::Line(text) => ("//", text),
            Comment::Doc(text) => ("///", text),
            Comment::Mark(text) => ("// MARK: -", text),
        };
        for line in text.lines() {
            if line.is_empty() {
                self.line(prefix);
            } else {
                self.line(&format!("{prefix} {line}"));
            }
        }
    }

    fn conditions(&mut self, conditions: &[Condition]) {
        for (index, condition) in conditions.iter().enumerate() {
            if index > 0 {
                self.push(", ");
            }
            match condition {
                Condition::Expr(value) => self.reference(value),
                Condition::Let { name, value } => {
                    self.push("let ");
                    self.push(name);
                    self.push(" = ");
                    self.reference(value);
                }
            }
        }
    }

    fn if_statement(&mut self, node: &If) {
        self.start_line();
        self.push("if ");
        self.conditions(&node.conditions);
        self.push(" {");
        self.end_line();
        self.indented(|r| r.nodes(&node.body));
        match &node.else_body {
            Some(else_body) => {
                self.line("} else {");
                self.indented(|r| r.nodes(else_body));
                self.line("}");
            }
            None => self.line("}"),
        }
    }

    fn guard(&mut self, node: &Guard) {
        self.start_line();
        self.push("guard ");
        self.conditions(&node.conditions);
        self.push(" else");
        if let [Node::Return(value)] = node.else_body.as_slice() {
            self.push(" { return");
            if let Some(value) = value {
                self.push(" ");
                self.reference(value);
            }
            self.push(" }");
            self.end_line();
        } else {
            self.braced_body(&node.else_body);
        }
    }

    fn switch(&mut self, node: &Switch) {
        self.start_line();
        self.push("switch ");
        self.reference(&node.reference);
        self.push(" {");
        self.end_line();
        for case in &node.cases {
            self.start_line();
            match &case.pattern {
                SwitchPattern::Default => self.push("default:"),
                SwitchPattern::Tag(name) => {
                    self.push("case .");
                    self.push(name);
                    self.push(":");
                }
                SwitchPattern::TagWithBindings(name, bindings) => {
                    self.push("case .");
                    self.push(name);
                    self.push("(");
                    for (index, binding) in bindings.iter().enumerate() {
                        if index > 0 {
                            self.push(", ");
                        }
                        self.push("let ");
                        self.push(binding);
                    }
                    self.push("):");
                }
                SwitchPattern::Value(value) => {
                    self.push("case ");
                    self.reference(value);
                    self.push(":");
                }
            }
            self.end_line();
            self.indented(|r| {
                if case.body.is_empty() {
                    r.line("break");
                } else {
                    r.nodes(&case.body);
                }
            });
        }
        self.line("}");
    }

    fn do_catch(&mut self, node: &DoCatch) {
        self.line("do {");
        self.indented(|r| r.nodes(&node.body));
        for Catch { pattern, body } in &node.catches {
            self.start_line();
            self.push("} catch");
            if let Some(pattern) = pattern {
                self.push(" ");
                self.reference(pattern);
            }
            self.push(" {");
            self.end_line();
            self.indented(|r| r.nodes(body));
        }
        self.line("}");
    }

    fn type_identifier(&mut self, identifier: &TypeIdentifier) {
        let mut text = match (identifier.name.as_str(), identifier.generic_parameters.as_slice()) {
            ("Dictionary", [key, value]) => format!("[{key}: {value}]"),
            (name, []) => name.to_string(),
            (name, parameters) => {
                let parameters = parameters
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{name}<{parameters}>")
            }
        };
        for wrapper in &identifier.wrappers {
            text = match wrapper {
                TypeWrapper::Optional => format!("{text}?"),
                TypeWrapper::Array => format!("[{text}]"),
            };
        }
        if identifier.is_metatype {
            text.push_str(".self");
        }
        self.push(&text);
    }

    /// Writes `value`, parenthesized when it would otherwise bind wrongly as
    /// the receiver of a postfix hop.
    fn receiver(&mut self, value: &Reference) {
        let needs_parens = match value {
            Reference::Infix { .. } => true,
            Reference::Prefix { operator, .. } => {
                !matches!(operator, PrefixOperator::Dot | PrefixOperator::AddressOf)
            }
            _ => false,
        };
        if needs_parens {
            self.push("(");
            self.reference(value);
            self.push(")");
        } else {
            self.reference(value);
        }
    }

    fn operand(&mut self, value: &Reference) {
        if matches!(value, Reference::Infix { .. }) {
            self.push("(");
            self.reference(value);
            self.push(")");
        } else {
            self.reference(value);
        }
    }

    fn tuple_parameter(&mut self, parameter: &TupleParameter) {
        if let Some(name) = &parameter.name {
            self.push(name);
            self.push(": ");
        }
        self.reference(&parameter.value);
    }

    fn tuple_parameters(&mut self, parameters: &[TupleParameter]) {
        for (index, parameter) in parameters.iter().enumerate() {
            if index > 0 {
                self.push(", ");
            }
            self.tuple_parameter(parameter);
        }
    }

    fn call(&mut self, callee: &Reference, arguments: &Tuple) {
        self.receiver(callee);
        let trailing = match arguments.parameters.last() {
            Some(TupleParameter {
                name: None,
                value: Reference::Block(block),
            }) => Some(block),
            _ => None,
        };
        match trailing {
            Some(block) => {
                let leading = &arguments.parameters[..arguments.parameters.len() - 1];
                if !leading.is_empty() {
                    self.push("(");
                    self.tuple_parameters(leading);
                    self.push(")");
                }
                self.push(" ");
                self.block(block);
            }
            None => {
                self.push("(");
                self.tuple_parameters(&arguments.parameters);
                self.push(")");
            }
        }
    }

    fn block(&mut self, block: &Block) {
        self.push("{");
        if !block.parameters.is_empty() {
            self.push(" ");
            self.push(&block.parameters.join(", "));
            self.push(" in");
        }
        match block.body.as_slice() {
            [] => self.push(" }"),
            [Node::Expr(value)] | [Node::Return(Some(value))] if !spans_lines(value) => {
                self.push(" ");
                self.reference(value);
                self.push(" }");
            }
            body => {
                self.end_line();
                self.indented(|r| r.nodes(body));
                self.start_line();
                self.push("}");
            }
        }
    }

    fn value(&mut self, value: &Value) {
        match value {
            Value::Nil => self.push("nil"),
            Value::Bool(value) => self.push(if *value { "true" } else { "false" }),
            Value::Int(value) => self.push(&value.to_string()),
            Value::Float(value) if value.is_nan() => self.push(".nan"),
            Value::Float(value) if value.is_infinite() => {
                self.push(if *value > 0.0 { ".infinity" } else { "-.infinity" });
            }
            Value::Float(value) => {
                if value.fract() == 0.0 {
                    self.push(&format!("{value:.1}"));
                } else {
                    self.push(&value.to_string());
                }
            }
            Value::String(text) => {
                self.push("\"");
                self.push(&escape(text));
                self.push("\"");
            }
            Value::Array(elements) => {
                self.push("[");
                for (index, element) in elements.iter().enumerate() {
                    if index > 0 {
                        self.push(", ");
                    }
                    self.reference(element);
                }
                self.push("]");
            }
            Value::Dictionary(entries) if entries.is_empty() => self.push("[:]"),
            Value::Dictionary(entries) => {
                self.push("[");
                for (index, (key, value)) in entries.iter().enumerate() {
                    if index > 0 {
                        self.push(", ");
                    }
                    self.reference(key);
                    self.push(": ");
                    self.reference(value);
                }
                self.push("]");
            }
        }
    }

    fn reference(&mut self, value: &Reference) {
        match value {
            Reference::Name(name) => self.push(name),
            Reference::Type(identifier) => self.type_identifier(identifier),
            Reference::Value(literal) => self.value(literal),
            Reference::Block(block) => self.block(block),
            Reference::Member { base, name } => {
                self.receiver(base);
                self.push(".");
                self.push(name);
            }
            Reference::Call { callee, arguments } => self.call(callee, arguments),
            Reference::Subscript { base, index } => {
                self.receiver(base);
                self.push("[");
                self.reference(index);
                self.push("]");
            }
            Reference::Prefix { operator, operand } => {
                self.push(operator.symbol());
                if matches!(operator, PrefixOperator::Not | PrefixOperator::AddressOf) {
                    self.operand(operand);
                } else {
                    self.reference(operand);
                }
            }
            Reference::Infix { lhs, operator, rhs } => {
                self.operand(lhs);
                self.push(" ");
                self.push(operator.symbol());
                self.push(" ");
                self.operand(rhs);
            }
            Reference::OptionalChain(base) => {
                self.receiver(base);
                self.push("?");
            }
            Reference::ForceUnwrap(base) => {
                self.receiver(base);
                self.push("!");
            }
            Reference::Tuple(tuple) => {
                self.push("(");
                self.tuple_parameters(&tuple.parameters);
                self.push(")");
            }
        }
    }
}

/// Returns true if `value` holds a closure rendered over several lines.
fn spans_lines(value: &Reference) -> bool {
    match value {
        Reference::Block(block) => match block.body.as_slice() {
            [] => false,
            [Node::Expr(inner)] | [Node::Return(Some(inner))] => spans_lines(inner),
            _ => true,
        },
        Reference::Name(_) | Reference::Type(_) => false,
        Reference::Value(Value::Array(elements)) => elements.iter().any(spans_lines),
        Reference::Value(Value::Dictionary(entries)) => {
            entries.iter().any(|(key, value)| spans_lines(key) || spans_lines(value))
        }
        Reference::Value(_) => false,
        Reference::Member { base, .. }
        | Reference::OptionalChain(base)
        | Reference::ForceUnwrap(base) => spans_lines(base),
        Reference::Prefix { operand, .. } => spans_lines(operand),
        Reference::Call { callee, arguments } => {
            spans_lines(callee) || arguments.parameters.iter().any(|p| spans_lines(&p.value))
        }
        Reference::Subscript { base, index } => spans_lines(base) || spans_lines(index),
        Reference::Infix { lhs, rhs, .. } => spans_lines(lhs) || spans_lines(rhs),
        Reference::Tuple(tuple) => tuple.parameters.iter().any(|p| spans_lines(&p.value)),
    }
}

/// Words that must be backquoted where a declaration introduces them.
const KEYWORDS: &[&str] = &[
    "as", "associatedtype", "break", "case", "catch", "class", "continue", "default", "defer",
    "deinit", "do", "else", "enum", "extension", "fallthrough", "false", "fileprivate", "for",
    "func", "guard", "if", "import", "in", "init", "inout", "internal", "is", "let", "nil",
    "open", "operator", "private", "protocol", "public", "repeat", "rethrows", "return",
    "self", "Self", "static", "struct", "subscript", "super", "switch", "throw", "throws",
    "true", "try", "typealias", "var", "where", "while",
];

fn declared_name(name: &str) -> String {
    if KEYWORDS.contains(&name) {
        format!("`{name}`")
    } else {
        name.to_string()
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(c),
        }
    }
    escaped
}

impl Display for TypeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut renderer = Renderer::new();
        renderer.type_identifier(self);
        f.write_str(&renderer.finish())
    }
}

impl Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut renderer = Renderer::new();
        renderer.reference(self);
        f.write_str(&renderer.finish())
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_node(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::InfixOperator;
    use crate::node::{Assignment, SwitchCase, Variable};
    use crate::types::TypeKind;

    #[test]
    fn test_render_type_identifiers() {
        let ty = TypeIdentifier::any_sequence(TypeIdentifier::named("TagIdentifier")).optional();
        assert_eq!(ty.to_string(), "AnySequence<TagIdentifier>?");
        assert_eq!(TypeIdentifier::string().optional().optional().to_string(), "String??");
        assert_eq!(TypeIdentifier::int().optional().array().to_string(), "[Int?]");
        assert_eq!(TypeIdentifier::named("Item").metatype().to_string(), "Item.self");
        assert_eq!(
            TypeIdentifier::dictionary(TypeIdentifier::string(), TypeIdentifier::int()).to_string(),
            "[String: Int]"
        );
    }

    #[test]
    fn test_render_expressions() {
        let expr = Reference::named("payload")
            .member("tags")
            .optional()
            .member("lazy")
            .member("map")
            .call_block(Block::expression(Reference::named("$0").member("identifier")))
            .member("any");
        assert_eq!(expr.to_string(), "payload.tags?.lazy.map { $0.identifier }.any");

        let coalesced = Reference::named("a").nil_coalescing(Reference::none());
        assert_eq!(coalesced.to_string(), "a ?? .none");

        let nested = Reference::named("a")
            .and(Reference::named("b"))
            .infix(InfixOperator::Or, Reference::named("c"));
        assert_eq!(nested.to_string(), "(a && b) || c");

        let tried = Reference::try_expr(Reference::named("decoder").member("decode").call_empty());
        assert_eq!(tried.member("value").to_string(), "(try decoder.decode()).value");
    }

    #[test]
    fn test_render_literals() {
        assert_eq!(Reference::string("a \"b\"").to_string(), "\"a \\\"b\\\"\"");
        assert_eq!(Reference::float(4.0).to_string(), "4.0");
        assert_eq!(Reference::float(4.25).to_string(), "4.25");
        assert_eq!(Reference::Value(Value::Dictionary(Vec::new())).to_string(), "[:]");
        assert_eq!(Reference::array([Reference::int(1), Reference::int(2)]).to_string(), "[1, 2]");
    }

    #[test]
    fn test_render_trailing_closure_with_arguments() {
        let expr = Reference::named("withTaskGroup").call(
            Tuple::new()
                .adding_named("of", TypeIdentifier::void().metatype().reference())
                .adding_unnamed(Reference::Block(
                    Block::new()
                        .adding_parameter("group")
                        .adding_statement(Reference::named("a").call_empty())
                        .adding_statement(Reference::named("b").call_empty()),
                )),
        );
        assert_eq!(
            expr.to_string(),
            "withTaskGroup(of: Void.self) { group in\n    a()\n    b()\n}"
        );
    }

    #[test]
    fn test_render_prefix_operands() {
        let coalesced = Reference::named("container")
            .member("decodeIfPresent")
            .call_empty()
            .nil_coalescing(Reference::dot("fiction"));
        assert_eq!(
            Reference::try_expr(coalesced.clone()).to_string(),
            "try container.decodeIfPresent() ?? .fiction"
        );
        assert_eq!(
            Reference::await_expr(coalesced).to_string(),
            "await container.decodeIfPresent() ?? .fiction"
        );
        let equality = Reference::named("lhs").equals(Reference::named("rhs"));
        assert_eq!(Reference::not(equality).to_string(), "!(lhs == rhs)");
    }

    #[test]
    fn test_render_non_finite_floats() {
        assert_eq!(Reference::float(f64::NAN).to_string(), ".nan");
        assert_eq!(Reference::float(f64::INFINITY).to_string(), ".infinity");
        assert_eq!(Reference::float(f64::NEG_INFINITY).to_string(), "-.infinity");
        assert_eq!(Reference::float(2.0).to_string(), "2.0");
        assert_eq!(Reference::float(4.2).to_string(), "4.2");
    }

    #[test]
    fn test_render_keyword_case_names() {
        assert_eq!(render_node(&Node::Case(Case::new("default"))), "case `default`\n");
        assert_eq!(
            render_node(&Node::Case(Case::new("class").with_raw_value(Reference::string("class")))),
            "case `class` = \"class\"\n"
        );
        assert_eq!(render_node(&Node::Case(Case::new("drama"))), "case drama\n");
    }

    #[test]
    fn test_render_nested_multiline_closure() {
        let expr = Reference::named("items").member("forEach").call_block(
            Block::new().adding_parameter("item").adding_statement(
                Reference::named("group").member("addTask").call_block(
                    Block::new()
                        .adding_statement(Reference::named("a").call_empty())
                        .adding_statement(Reference::named("b").call_empty()),
                ),
            ),
        );
        assert_eq!(
            expr.to_string(),
            "items.forEach { item in\n    group.addTask {\n        a()\n        b()\n    }\n}"
        );
    }

    #[test]
    fn test_render_type_with_members() {
        let ty = Type::new(TypeIdentifier::named("Item"), TypeKind::FINAL_CLASS)
            .with_access_level(AccessLevel::Public)
            .adding_inherited_type(TypeIdentifier::named("Codable"))
            .adding_member(
                Property::new(Variable::new("title").with_type(TypeIdentifier::string()))
                    .with_access_level(AccessLevel::Public),
            )
            .adding_member(Node::EmptyLine)
            .adding_member(
                Function::init()
                    .adding_parameter(FunctionParameter::new("title", TypeIdentifier::string()))
                    .adding_statement(Assignment::new(
                        Reference::self_ref().member("title"),
                        Reference::named("title"),
                    )),
            );
        let text = render_node(&Node::Type(ty));
        assert_eq!(
            text,
            "public final class Item: Codable {\n    public let title: String\n\n    init(title: String) {\n        self.title = title\n    }\n}\n"
        );
    }

    #[test]
    fn test_render_switch_and_guard() {
        let switch = Switch::new(Reference::named("rawValue"))
            .adding_case(
                SwitchCase::new(SwitchPattern::Value(Reference::string("fiction")))
                    .adding_statement(Assignment::new(Reference::self_ref(), Reference::dot("fiction"))),
            )
            .adding_case(SwitchCase::new(SwitchPattern::TagWithBindings(
                "item".to_string(),
                vec!["value".to_string()],
            )))
            .adding_case(SwitchCase::default_case());
        assert_eq!(
            render_node(&Node::Switch(switch)),
            "switch rawValue {\ncase \"fiction\":\n    self = .fiction\ncase .item(let value):\n    break\ndefault:\n    break\n}\n"
        );

        let guard = Guard::new(Reference::named("lhs").equals(Reference::named("rhs")))
            .adding_else_statement(Node::return_value(Reference::bool(false)));
        assert_eq!(render_node(&Node::Guard(guard)), "guard lhs == rhs else { return false }\n");
    }

    #[test]
    fn test_render_file_is_deterministic() {
        let file = File::new("Item.swift")
            .adding_header(Comment::line("Item.swift"))
            .adding_import("Foundation")
            .adding(Node::Comment(Comment::mark("Item")));
        let first = render_file(&file);
        let second = render_file(&file.clone());
        assert_eq!(first, second);
        assert_eq!(first, "// Item.swift\n\nimport Foundation\n\n// MARK: - Item\n");
    }
}
