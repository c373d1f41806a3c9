//! Plugin descriptors and the structures built around them
//!
//! This module defines what a parsed module configuration contains: plugin
//! groups, plugin descriptors with their type resolution rule, file entries,
//! condition flags and conditional file install patterns.

use crate::dependency::CompositeDependency;
use crate::error::{EvaluationError, ParseError};
use crate::image::ImageHandle;
use crate::state::InstallState;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::trace;

/// How the installer should present a plugin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PluginType {
    /// Must be installed
    Required,
    /// Free choice
    Optional,
    /// Pre-selected, but can be deselected
    Recommended,
    /// Cannot be installed
    NotUsable,
    /// Works but may cause problems
    CouldBeUsable,
}

impl FromStr for PluginType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Required" => Ok(PluginType::Required),
            "Optional" => Ok(PluginType::Optional),
            "Recommended" => Ok(PluginType::Recommended),
            "NotUsable" => Ok(PluginType::NotUsable),
            "CouldBeUsable" => Ok(PluginType::CouldBeUsable),
            _ => Err(ParseError::InvalidEnumValue {
                type_name: "PluginType",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for PluginType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PluginType::Required => "Required",
            PluginType::Optional => "Optional",
            PluginType::Recommended => "Recommended",
            PluginType::NotUsable => "NotUsable",
            PluginType::CouldBeUsable => "CouldBeUsable",
        };
        write!(f, "{}", name)
    }
}

/// One (type, condition) alternative of a computed plugin type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypePattern {
    pub plugin_type: PluginType,
    pub condition: CompositeDependency,
}

impl TypePattern {
    pub fn new(plugin_type: PluginType, condition: CompositeDependency) -> Self {
        Self {
            plugin_type,
            condition,
        }
    }
}

/// Rule deciding a plugin's type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PluginTypeResolution {
    Static(PluginType),
    Computed {
        default_type: PluginType,
        /// Document order; the first matching pattern wins
        patterns: Vec<TypePattern>,
    },
}

impl PluginTypeResolution {
    /// Resolve the type against the current install state.
    ///
    /// Patterns are tried in document order and the first one whose condition
    /// holds decides the type. Later patterns are not consulted, even if they
    /// would also match. With no match the default type applies.
    pub fn resolve<S: InstallState + ?Sized>(&self, state: &S) -> Result<PluginType, EvaluationError> {
        match self {
            PluginTypeResolution::Static(plugin_type) => Ok(*plugin_type),
            PluginTypeResolution::Computed {
                default_type,
                patterns,
            } => {
                for (index, pattern) in patterns.iter().enumerate() {
                    if pattern.condition.evaluate(state)? {
                        trace!("Type pattern {} matched: {}", index, pattern.plugin_type);
                        return Ok(pattern.plugin_type);
                    }
                }
                trace!("No type pattern matched, using default {}", default_type);
                Ok(*default_type)
            }
        }
    }
}

/// Whether an entry copies a single file or a whole folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileKind {
    File,
    Folder,
}

/// A file or folder to install
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginFile {
    /// Path inside the package
    pub source: String,
    /// Path relative to the install target
    pub destination: String,
    pub kind: FileKind,
    /// Higher priority wins when two entries write the same destination
    pub priority: i32,
    pub always_install: bool,
    pub install_if_usable: bool,
}

impl PluginFile {
    pub fn new<S: Into<String>>(kind: FileKind, source: S) -> Self {
        let source = source.into();
        Self {
            destination: source.clone(),
            source,
            kind,
            priority: 0,
            always_install: false,
            install_if_usable: false,
        }
    }

    pub fn with_destination<S: Into<String>>(mut self, destination: S) -> Self {
        self.destination = destination.into();
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// A flag a plugin sets when it is selected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalFlag {
    pub name: String,
    pub value: String,
}

impl ConditionalFlag {
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Parsed description of one optional component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    pub name: String,
    pub description: String,
    pub image: Option<ImageHandle>,
    pub type_resolution: PluginTypeResolution,
    /// Document order, duplicates kept
    pub files: Vec<PluginFile>,
    /// Document order, duplicates kept
    pub condition_flags: Vec<ConditionalFlag>,
}

impl PluginDescriptor {
    pub fn resolve_type<S: InstallState + ?Sized>(&self, state: &S) -> Result<PluginType, EvaluationError> {
        self.type_resolution.resolve(state)
    }
}

/// Resolve a plugin's type against the current install state
pub fn resolve_plugin_type<S: InstallState + ?Sized>(
    descriptor: &PluginDescriptor,
    state: &S,
) -> Result<PluginType, EvaluationError> {
    descriptor.resolve_type(state)
}

/// Files installed when a condition holds at install time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalFileInstallPattern {
    pub condition: CompositeDependency,
    pub files: Vec<PluginFile>,
}

impl ConditionalFileInstallPattern {
    pub fn new(condition: CompositeDependency, files: Vec<PluginFile>) -> Self {
        Self { condition, files }
    }

    pub fn applies<S: InstallState + ?Sized>(&self, state: &S) -> Result<bool, EvaluationError> {
        self.condition.evaluate(state)
    }
}

/// Files of every pattern whose condition holds, in pattern order
pub fn select_conditional_files<'a, S: InstallState + ?Sized>(
    patterns: &'a [ConditionalFileInstallPattern],
    state: &S,
) -> Result<Vec<&'a PluginFile>, EvaluationError> {
    let mut files = Vec::new();
    for pattern in patterns {
        if pattern.applies(state)? {
            files.extend(pattern.files.iter());
        }
    }
    Ok(files)
}

/// Selection rule of a plugin group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupType {
    SelectAny,
    SelectAll,
    SelectExactlyOne,
    SelectAtMostOne,
    SelectAtLeastOne,
}

impl FromStr for GroupType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SelectAny" => Ok(GroupType::SelectAny),
            "SelectAll" => Ok(GroupType::SelectAll),
            "SelectExactlyOne" => Ok(GroupType::SelectExactlyOne),
            "SelectAtMostOne" => Ok(GroupType::SelectAtMostOne),
            "SelectAtLeastOne" => Ok(GroupType::SelectAtLeastOne),
            _ => Err(ParseError::InvalidEnumValue {
                type_name: "GroupType",
                value: s.to_string(),
            }),
        }
    }
}

/// A named group of plugins shown together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginGroup {
    pub name: String,
    pub group_type: GroupType,
    pub plugins: Vec<PluginDescriptor>,
}

/// Everything parsed out of one module configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleConfig {
    /// Grammar version the document was parsed with
    pub version: String,
    pub name: String,
    pub image: Option<ImageHandle>,
    pub module_dependencies: CompositeDependency,
    pub required_files: Vec<PluginFile>,
    pub groups: Vec<PluginGroup>,
    pub conditional_file_installs: Vec<ConditionalFileInstallPattern>,
}

impl ModuleConfig {
    /// All plugins across groups, in document order
    pub fn plugins(&self) -> impl Iterator<Item = &PluginDescriptor> {
        self.groups.iter().flat_map(|group| group.plugins.iter())
    }
}
