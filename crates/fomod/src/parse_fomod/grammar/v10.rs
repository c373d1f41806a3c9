//! Version 1.0 configuration grammar
//!
//! The base revision: composite conditions over file states, file
//! requirements at package level and statically typed plugins.

use crate::dependency::{Dependency, ModFileState, Predicate};
use crate::document::Element;
use crate::error::Result;
use crate::parse_fomod::grammar::{
    DependencyBuilder, Grammar, KindTable, ModuleDependencyBuilder, TypeDescriptorBuilder,
};
use crate::parse_fomod::parser::ConfigParser;
use crate::plugin::{PluginType, PluginTypeResolution};
use once_cell::sync::Lazy;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
pub struct Grammar10;

pub static GRAMMAR_10: Grammar10 = Grammar10;

static DEPENDENCY_KINDS: Lazy<KindTable<DependencyBuilder>> = Lazy::new(|| {
    let mut kinds: KindTable<DependencyBuilder> = HashMap::new();
    kinds.insert("dependencies", nested_dependencies);
    kinds.insert("fileDependency", file_dependency);
    kinds
});

static MODULE_DEPENDENCY_KINDS: Lazy<KindTable<ModuleDependencyBuilder>> = Lazy::new(|| {
    let mut kinds: KindTable<ModuleDependencyBuilder> = HashMap::new();
    kinds.insert("fileDependency", required_file);
    kinds
});

static TYPE_DESCRIPTOR_KINDS: Lazy<KindTable<TypeDescriptorBuilder>> = Lazy::new(|| {
    let mut kinds: KindTable<TypeDescriptorBuilder> = HashMap::new();
    kinds.insert("type", static_type);
    kinds
});

impl Grammar for Grammar10 {
    fn version(&self) -> &'static str {
        "1.0"
    }

    fn base(&self) -> Option<&'static dyn Grammar> {
        None
    }

    fn dependency_kinds(&self) -> Option<&'static KindTable<DependencyBuilder>> {
        Some(&*DEPENDENCY_KINDS)
    }

    fn module_dependency_kinds(&self) -> Option<&'static KindTable<ModuleDependencyBuilder>> {
        Some(&*MODULE_DEPENDENCY_KINDS)
    }

    fn type_descriptor_kinds(&self) -> Option<&'static KindTable<TypeDescriptorBuilder>> {
        Some(&*TYPE_DESCRIPTOR_KINDS)
    }
}

/// Parse the `name` attribute of a node as a plugin type
pub(crate) fn plugin_type_attribute(node: &Element) -> Result<PluginType> {
    node.required_attribute("name")?.parse()
}

fn nested_dependencies(parser: &ConfigParser<'_>, node: &Element, depth: usize) -> Result<Dependency> {
    Ok(Dependency::Composite(parser.build_dependency_tree_at(node, depth)?))
}

fn file_dependency(_parser: &ConfigParser<'_>, node: &Element, _depth: usize) -> Result<Dependency> {
    let file = node.required_attribute("file")?;
    let state: ModFileState = node.required_attribute("state")?.parse()?;
    Ok(Predicate::file_state(file, state).into())
}

/// Package-level file requirement: the file must be active. A `state`
/// attribute on the node is not read here.
fn required_file(_parser: &ConfigParser<'_>, node: &Element) -> Result<Predicate> {
    let file = node.required_attribute("file")?;
    Ok(Predicate::file_state(file, ModFileState::Active))
}

fn static_type(_parser: &ConfigParser<'_>, node: &Element) -> Result<PluginTypeResolution> {
    Ok(PluginTypeResolution::Static(plugin_type_attribute(node)?))
}
