//! Source file container.

use crate::node::{Comment, Node};

/// One emitted source file: the AST forest of a single artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    /// File name, without directory.
    pub name: String,
    /// Header comments.
    pub header: Vec<Comment>,
    /// Imported modules, in insertion order and without duplicates.
    pub imports: Vec<String>,
    /// Modules imported with `@testable`.
    pub testable_imports: Vec<String>,
    /// Top-level nodes.
    pub body: Vec<Node>,
}

impl File {
    /// Creates an empty file.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            header: Vec::new(),
            imports: Vec::new(),
            testable_imports: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Appends a header comment.
    #[must_use]
    pub fn adding_header(mut self, comment: Comment) -> Self {
        self.header.push(comment);
        self
    }

    /// Adds an import unless it is already present.
    #[must_use]
    pub fn adding_import(mut self, module: impl Into<String>) -> Self {
        let module = module.into();
        if !self.imports.contains(&module) {
            self.imports.push(module);
        }
        self
    }

    /// Adds several imports, skipping duplicates.
    #[must_use]
    pub fn adding_imports<I, S>(self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        modules.into_iter().fold(self, Self::adding_import)
    }

    /// Adds a `@testable` import unless it is already present.
    #[must_use]
    pub fn adding_testable_import(mut self, module: impl Into<String>) -> Self {
        let module = module.into();
        if !self.testable_imports.contains(&module) {
            self.testable_imports.push(module);
        }
        self
    }

    /// Appends a top-level node.
    #[must_use]
    pub fn adding(mut self, node: impl Into<Node>) -> Self {
        self.body.push(node.into());
        self
    }

    /// Appends several top-level nodes.
    #[must_use]
    pub fn adding_all(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.body.extend(nodes);
        self
    }

    /// Appends nodes separated by blank lines.
    #[must_use]
    pub fn adding_separated(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        for node in nodes {
            if !self.body.is_empty() {
                self.body.push(Node::EmptyLine);
            }
            self.body.push(node);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_imports_are_deduplicated_in_order() {
        let file = File::new("Item.swift")
            .adding_import("Foundation")
            .adding_imports(["CoreData", "Foundation", "Combine"]);
        assert_eq!(file.imports, vec!["Foundation", "CoreData", "Combine"]);
    }

    #[test]
    fn test_separated_nodes() {
        let file = File::new("a.swift")
            .adding_separated([Node::Comment(Comment::line("a")), Node::Comment(Comment::line("b"))]);
        assert_eq!(file.body.len(), 3);
        assert_eq!(file.body[1], Node::EmptyLine);
    }
}
