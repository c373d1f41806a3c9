//! Atomic conditions that appear as leaves of a dependency tree

use crate::document::Element;
use crate::error::{EvaluationError, ParseError};
use crate::state::InstallState;
use crate::version::Version;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Activation state of a plugin file in the user's load order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModFileState {
    Missing,
    Inactive,
    Active,
}

impl FromStr for ModFileState {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Missing" => Ok(ModFileState::Missing),
            "Inactive" => Ok(ModFileState::Inactive),
            "Active" => Ok(ModFileState::Active),
            _ => Err(ParseError::InvalidEnumValue {
                type_name: "ModFileState",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ModFileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModFileState::Missing => write!(f, "Missing"),
            ModFileState::Inactive => write!(f, "Inactive"),
            ModFileState::Active => write!(f, "Active"),
        }
    }
}

/// A condition node owned by a game-specific extension.
///
/// The core keeps the node's data verbatim and leaves its meaning to whatever
/// answers [`InstallState::extension_condition`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionPredicate {
    pub kind: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
}

impl ExtensionPredicate {
    pub fn new<S: Into<String>>(kind: S) -> Self {
        Self {
            kind: kind.into(),
            attributes: Vec::new(),
            text: String::new(),
        }
    }

    /// Capture an extension node as-is
    pub fn from_element(element: &Element) -> Self {
        Self {
            kind: element.name.clone(),
            attributes: element.attributes.clone(),
            text: element.text.clone(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// An atomic, state-dependent condition
///
/// Serialized with a `predicate` tag; extension predicates carry their own
/// `kind` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "predicate")]
pub enum Predicate {
    GameVersionAtLeast { version: Version },
    ManagerVersionAtLeast { version: Version },
    FileState {
        #[serde(deserialize_with = "lowercase")]
        file: String,
        state: ModFileState,
    },
    FlagEquals { flag: String, value: String },
    Extension(ExtensionPredicate),
}

fn lowercase<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(String::deserialize(deserializer)?.to_lowercase())
}

impl Predicate {
    /// File condition; the file id is lower-cased so lookups ignore case
    pub fn file_state<S: AsRef<str>>(file: S, state: ModFileState) -> Self {
        Predicate::FileState {
            file: file.as_ref().to_lowercase(),
            state,
        }
    }

    pub fn flag_equals<F: Into<String>, V: Into<String>>(flag: F, value: V) -> Self {
        Predicate::FlagEquals {
            flag: flag.into(),
            value: value.into(),
        }
    }

    /// Evaluate against the current install state.
    ///
    /// A flag that was never set is absent, which is not equal to any value,
    /// the empty string included.
    pub fn evaluate<S: InstallState + ?Sized>(&self, state: &S) -> Result<bool, EvaluationError> {
        match self {
            Predicate::GameVersionAtLeast { version } => {
                Ok(state.game_version().is_some_and(|current| current >= version))
            }
            Predicate::ManagerVersionAtLeast { version } => {
                Ok(state.manager_version().is_some_and(|current| current >= version))
            }
            Predicate::FileState { file, state: expected } => Ok(state.file_state(file) == *expected),
            Predicate::FlagEquals { flag, value } => Ok(state.flag_value(flag) == Some(value.as_str())),
            Predicate::Extension(predicate) => state.extension_condition(predicate).ok_or_else(|| {
                EvaluationError::UnresolvedExtensionPredicate {
                    kind: predicate.kind.clone(),
                }
            }),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::GameVersionAtLeast { version } => write!(f, "game version >= {}", version),
            Predicate::ManagerVersionAtLeast { version } => write!(f, "manager version >= {}", version),
            Predicate::FileState { file, state } => write!(f, "{} is {}", file, state),
            Predicate::FlagEquals { flag, value } => write!(f, "flag {} == '{}'", flag, value),
            Predicate::Extension(predicate) => write!(f, "{}", predicate.kind),
        }
    }
}
