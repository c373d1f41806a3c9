//! Versioned configuration grammars
//!
//! Each schema revision is a [`Grammar`]: a set of node-kind tables mapping a
//! node name to the function that builds it. A newer grammar only carries the
//! entries it adds or changes and names the grammar it extends as its base;
//! lookups that miss its own tables fall through to the base.
//!
//! ```text
//! 3.0 ──base──▶ 2.0 ──base──▶ 1.0
//! ```

pub mod v10;
pub mod v20;
pub mod v30;

use crate::dependency::{Dependency, Predicate};
use crate::document::{ConfigDocument, Element};
use crate::error::Result;
use crate::parse_fomod::parser::ConfigParser;
use crate::plugin::PluginTypeResolution;
use std::collections::HashMap;

pub use v10::{Grammar10, GRAMMAR_10};
pub use v20::{Grammar20, GRAMMAR_20};
pub use v30::{Grammar30, GRAMMAR_30};

/// Builds a child of a composite dependency; the `usize` is the nesting depth
/// the child would sit at if it is itself a composite.
pub type DependencyBuilder =
    for<'p, 'a, 'n> fn(&'p ConfigParser<'a>, &'n Element, usize) -> Result<Dependency>;

/// Builds a package-level dependency
pub type ModuleDependencyBuilder = for<'p, 'a, 'n> fn(&'p ConfigParser<'a>, &'n Element) -> Result<Predicate>;

/// Builds a plugin type rule from the child of a `typeDescriptor` node
pub type TypeDescriptorBuilder =
    for<'p, 'a, 'n> fn(&'p ConfigParser<'a>, &'n Element) -> Result<PluginTypeResolution>;

/// Node-kind name to builder
pub type KindTable<B> = HashMap<&'static str, B>;

/// Versions this crate can parse, oldest first
pub const SUPPORTED_VERSIONS: &[&str] = &["1.0", "2.0", "3.0"];

/// One schema revision of the configuration format
pub trait Grammar: Send + Sync {
    fn version(&self) -> &'static str;

    /// The grammar this one extends
    fn base(&self) -> Option<&'static dyn Grammar>;

    /// Children allowed inside a composite `dependencies` node
    fn dependency_kinds(&self) -> Option<&'static KindTable<DependencyBuilder>> {
        None
    }

    /// Children allowed under `moduleDependencies`
    fn module_dependency_kinds(&self) -> Option<&'static KindTable<ModuleDependencyBuilder>> {
        None
    }

    /// Children allowed under a plugin's `typeDescriptor`
    fn type_descriptor_kinds(&self) -> Option<&'static KindTable<TypeDescriptorBuilder>> {
        None
    }

    /// Whether plugins carry a `conditionFlags` list
    fn reads_condition_flags(&self) -> bool {
        self.base().is_some_and(|base| base.reads_condition_flags())
    }

    /// Where conditional file install patterns live, if the revision has them
    fn conditional_installs_path(&self) -> Option<&'static str> {
        self.base().and_then(|base| base.conditional_installs_path())
    }

    fn dependency_builder(&self, kind: &str) -> Option<DependencyBuilder> {
        self.dependency_kinds()
            .and_then(|table| table.get(kind).copied())
            .or_else(|| self.base()?.dependency_builder(kind))
    }

    fn module_dependency_builder(&self, kind: &str) -> Option<ModuleDependencyBuilder> {
        self.module_dependency_kinds()
            .and_then(|table| table.get(kind).copied())
            .or_else(|| self.base()?.module_dependency_builder(kind))
    }

    fn type_descriptor_builder(&self, kind: &str) -> Option<TypeDescriptorBuilder> {
        self.type_descriptor_kinds()
            .and_then(|table| table.get(kind).copied())
            .or_else(|| self.base()?.type_descriptor_builder(kind))
    }
}

/// Look up the grammar for a declared configuration version
pub fn grammar_for_version(version: &str) -> Option<&'static dyn Grammar> {
    match version.trim() {
        "1.0" => Some(&GRAMMAR_10),
        "2.0" => Some(&GRAMMAR_20),
        "3.0" => Some(&GRAMMAR_30),
        _ => None,
    }
}

/// Read the version out of the root's schema reference, e.g.
/// `xsi:noNamespaceSchemaLocation="http://example.com/ModConfig2.0.xsd"`.
pub fn detect_version(document: &ConfigDocument) -> Option<String> {
    let location = document.root().attribute("noNamespaceSchemaLocation")?;
    let file_name = location.rsplit(|c: char| c == '/' || c == '\\').next()?;
    let version = file_name.strip_prefix("ModConfig")?.strip_suffix(".xsd")?;
    (!version.is_empty()).then(|| version.to_string())
}
