//! Version 3.0 configuration grammar
//!
//! Extends 2.0 so that game and mod manager version checks can sit inside
//! plugin conditions, not only at package level. `gameDependency` replaces the
//! game-specific `falloutDependency`; the old name still parses.

use crate::dependency::{Dependency, Predicate};
use crate::document::Element;
use crate::error::Result;
use crate::parse_fomod::grammar::v20::{game_version, manager_version, GRAMMAR_20};
use crate::parse_fomod::grammar::{DependencyBuilder, Grammar, KindTable, ModuleDependencyBuilder};
use crate::parse_fomod::parser::ConfigParser;
use once_cell::sync::Lazy;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
pub struct Grammar30;

pub static GRAMMAR_30: Grammar30 = Grammar30;

static DEPENDENCY_KINDS: Lazy<KindTable<DependencyBuilder>> = Lazy::new(|| {
    let mut kinds: KindTable<DependencyBuilder> = HashMap::new();
    kinds.insert("gameDependency", game_dependency);
    kinds.insert("fommDependency", fomm_dependency);
    kinds
});

static MODULE_DEPENDENCY_KINDS: Lazy<KindTable<ModuleDependencyBuilder>> = Lazy::new(|| {
    let mut kinds: KindTable<ModuleDependencyBuilder> = HashMap::new();
    kinds.insert("gameDependency", required_game_version);
    kinds
});

impl Grammar for Grammar30 {
    fn version(&self) -> &'static str {
        "3.0"
    }

    fn base(&self) -> Option<&'static dyn Grammar> {
        Some(&GRAMMAR_20)
    }

    fn dependency_kinds(&self) -> Option<&'static KindTable<DependencyBuilder>> {
        Some(&*DEPENDENCY_KINDS)
    }

    fn module_dependency_kinds(&self) -> Option<&'static KindTable<ModuleDependencyBuilder>> {
        Some(&*MODULE_DEPENDENCY_KINDS)
    }
}

fn game_dependency(_parser: &ConfigParser<'_>, node: &Element, _depth: usize) -> Result<Dependency> {
    Ok(game_version(node)?.into())
}

fn fomm_dependency(_parser: &ConfigParser<'_>, node: &Element, _depth: usize) -> Result<Dependency> {
    Ok(manager_version(node)?.into())
}

fn required_game_version(_parser: &ConfigParser<'_>, node: &Element) -> Result<Predicate> {
    game_version(node)
}
