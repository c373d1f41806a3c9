//! Install state consulted when conditions are evaluated
//!
//! The state belongs to the surrounding install session and changes as the
//! session progresses (a selected plugin sets flags that later conditions
//! read). Condition trees only ever borrow it for the length of one
//! evaluation call.

use crate::dependency::{ExtensionPredicate, ModFileState};
use crate::plugin::PluginDescriptor;
use crate::version::Version;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Read-only queries the condition evaluator makes against the install session
pub trait InstallState {
    /// Installed game version, if known
    fn game_version(&self) -> Option<&Version>;

    /// Running mod manager version, if known
    fn manager_version(&self) -> Option<&Version>;

    /// State of a plugin file. Predicates built by the parser or
    /// deserialized lower-case `file`, but one built by hand may not, so
    /// implementations should compare without regard to case.
    fn file_state(&self, file: &str) -> ModFileState;

    /// Current value of a condition flag, `None` when it was never set
    fn flag_value(&self, flag: &str) -> Option<&str>;

    /// Verdict for a game-specific condition, `None` when nothing can judge it
    fn extension_condition(&self, _predicate: &ExtensionPredicate) -> Option<bool> {
        None
    }
}

/// In-memory install state.
///
/// Extension conditions are answered by kind name from `extensions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StateSnapshot {
    pub game_version: Option<Version>,
    pub manager_version: Option<Version>,
    #[serde(deserialize_with = "lowercase_keys")]
    files: HashMap<String, ModFileState>,
    flags: HashMap<String, String>,
    extensions: HashMap<String, bool>,
}

fn lowercase_keys<'de, D>(deserializer: D) -> Result<HashMap<String, ModFileState>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = HashMap::<String, ModFileState>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|(file, state)| (file.to_lowercase(), state)).collect())
}

impl StateSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot from its JSON form
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_game_version(mut self, version: Version) -> Self {
        self.game_version = Some(version);
        self
    }

    pub fn with_manager_version(mut self, version: Version) -> Self {
        self.manager_version = Some(version);
        self
    }

    pub fn with_file_state<S: AsRef<str>>(mut self, file: S, state: ModFileState) -> Self {
        self.set_file_state(file, state);
        self
    }

    pub fn with_flag<K: Into<String>, V: Into<String>>(mut self, flag: K, value: V) -> Self {
        self.set_flag(flag, value);
        self
    }

    pub fn with_extension_verdict<S: Into<String>>(mut self, kind: S, verdict: bool) -> Self {
        self.extensions.insert(kind.into(), verdict);
        self
    }

    pub fn set_file_state<S: AsRef<str>>(&mut self, file: S, state: ModFileState) {
        self.files.insert(file.as_ref().to_lowercase(), state);
    }

    pub fn set_flag<K: Into<String>, V: Into<String>>(&mut self, flag: K, value: V) {
        self.flags.insert(flag.into(), value.into());
    }

    pub fn clear_flag(&mut self, flag: &str) -> Option<String> {
        self.flags.remove(flag)
    }

    /// Record the flags a selected plugin sets, in the plugin's order.
    /// A flag listed twice ends up with its last value.
    pub fn apply_condition_flags(&mut self, plugin: &PluginDescriptor) {
        for flag in &plugin.condition_flags {
            self.set_flag(flag.name.clone(), flag.value.clone());
        }
    }
}

impl InstallState for StateSnapshot {
    fn game_version(&self) -> Option<&Version> {
        self.game_version.as_ref()
    }

    fn manager_version(&self) -> Option<&Version> {
        self.manager_version.as_ref()
    }

    fn file_state(&self, file: &str) -> ModFileState {
        self.files
            .get(&file.to_lowercase())
            .copied()
            .unwrap_or(ModFileState::Missing)
    }

    fn flag_value(&self, flag: &str) -> Option<&str> {
        self.flags.get(flag).map(String::as_str)
    }

    fn extension_condition(&self, predicate: &ExtensionPredicate) -> Option<bool> {
        self.extensions.get(&predicate.kind).copied()
    }
}
