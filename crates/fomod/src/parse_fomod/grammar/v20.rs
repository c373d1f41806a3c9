//! Version 2.0 configuration grammar
//!
//! Extends 1.0 with condition flags: plugins set flags, conditions read them
//! through `flagDependency`, and a plugin's type can be computed from ordered
//! condition patterns. Package dependencies gain game and mod manager version
//! requirements, and conditional file installs appear.

use crate::dependency::{Dependency, Predicate};
use crate::document::Element;
use crate::error::Result;
use crate::parse_fomod::grammar::v10::{plugin_type_attribute, GRAMMAR_10};
use crate::parse_fomod::grammar::{
    DependencyBuilder, Grammar, KindTable, ModuleDependencyBuilder, TypeDescriptorBuilder,
};
use crate::parse_fomod::parser::ConfigParser;
use crate::plugin::{PluginTypeResolution, TypePattern};
use crate::version::Version;
use once_cell::sync::Lazy;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
pub struct Grammar20;

pub static GRAMMAR_20: Grammar20 = Grammar20;

static DEPENDENCY_KINDS: Lazy<KindTable<DependencyBuilder>> = Lazy::new(|| {
    let mut kinds: KindTable<DependencyBuilder> = HashMap::new();
    kinds.insert("flagDependency", flag_dependency);
    kinds
});

static MODULE_DEPENDENCY_KINDS: Lazy<KindTable<ModuleDependencyBuilder>> = Lazy::new(|| {
    let mut kinds: KindTable<ModuleDependencyBuilder> = HashMap::new();
    kinds.insert("falloutDependency", required_game_version);
    kinds.insert("fommDependency", required_manager_version);
    kinds
});

static TYPE_DESCRIPTOR_KINDS: Lazy<KindTable<TypeDescriptorBuilder>> = Lazy::new(|| {
    let mut kinds: KindTable<TypeDescriptorBuilder> = HashMap::new();
    kinds.insert("dependencyType", dependency_type);
    kinds
});

impl Grammar for Grammar20 {
    fn version(&self) -> &'static str {
        "2.0"
    }

    fn base(&self) -> Option<&'static dyn Grammar> {
        Some(&GRAMMAR_10)
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

    fn reads_condition_flags(&self) -> bool {
        true
    }

    fn conditional_installs_path(&self) -> Option<&'static str> {
        Some("/config/conditionalFileInstalls/patterns/*")
    }
}

/// Minimum game version from a node's `version` attribute
pub(crate) fn game_version(node: &Element) -> Result<Predicate> {
    Ok(Predicate::GameVersionAtLeast {
        version: node.required_attribute("version")?.parse::<Version>()?,
    })
}

/// Minimum mod manager version from a node's `version` attribute
pub(crate) fn manager_version(node: &Element) -> Result<Predicate> {
    Ok(Predicate::ManagerVersionAtLeast {
        version: node.required_attribute("version")?.parse::<Version>()?,
    })
}

fn required_game_version(_parser: &ConfigParser<'_>, node: &Element) -> Result<Predicate> {
    game_version(node)
}

fn required_manager_version(_parser: &ConfigParser<'_>, node: &Element) -> Result<Predicate> {
    manager_version(node)
}

fn flag_dependency(_parser: &ConfigParser<'_>, node: &Element, _depth: usize) -> Result<Dependency> {
    let flag = node.required_attribute("flag")?;
    let value = node.required_attribute("value")?;
    Ok(Predicate::flag_equals(flag, value).into())
}

/// `dependencyType`: a default type plus `patterns/*` in document order
fn dependency_type(parser: &ConfigParser<'_>, node: &Element) -> Result<PluginTypeResolution> {
    let default_type = plugin_type_attribute(node.required_child("defaultType")?)?;

    let patterns = node
        .select("patterns/*")
        .into_iter()
        .map(|pattern| -> Result<TypePattern> {
            let plugin_type = plugin_type_attribute(pattern.required_child("type")?)?;
            let condition = parser.build_dependency_tree(pattern.required_child("dependencies")?)?;
            Ok(TypePattern::new(plugin_type, condition))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(PluginTypeResolution::Computed {
        default_type,
        patterns,
    })
}
