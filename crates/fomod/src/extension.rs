//! Extension hook for game-specific module dependencies
//!
//! Built-in grammars only know the generic dependency kinds. Package-level
//! dependency nodes they do not recognise are offered to a [`ParserExtension`]
//! before the parse fails.

use crate::dependency::{ExtensionPredicate, Predicate};
use crate::document::Element;
use std::collections::HashSet;

/// Game-specific parsing of package-level dependency nodes
pub trait ParserExtension {
    /// Turn `node` into a predicate, or `None` if this extension does not own
    /// the node kind.
    fn try_parse_dependency(&self, node: &Element) -> Option<Predicate>;
}

/// Extension that accepts nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoExtension;

impl ParserExtension for NoExtension {
    fn try_parse_dependency(&self, _node: &Element) -> Option<Predicate> {
        None
    }
}

/// Accepts a registered set of node kinds and keeps them as opaque
/// [`Predicate::Extension`] payloads for the install state to judge.
#[derive(Debug, Default, Clone)]
pub struct PassthroughExtension {
    kinds: HashSet<String>,
}

impl PassthroughExtension {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node kind this extension owns
    pub fn accept<S: Into<String>>(mut self, kind: S) -> Self {
        self.kinds.insert(kind.into());
        self
    }

    pub fn accepts(&self, kind: &str) -> bool {
        self.kinds.contains(kind)
    }
}

impl ParserExtension for PassthroughExtension {
    fn try_parse_dependency(&self, node: &Element) -> Option<Predicate> {
        self.accepts(&node.name)
            .then(|| Predicate::Extension(ExtensionPredicate::from_element(node)))
    }
}
