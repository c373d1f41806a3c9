//! Module configuration parsing
//!
//! This module turns a loaded configuration document into the structured
//! types of [`crate::plugin`] and [`crate::dependency`]. Parsing is driven by a
//! [`grammar::Grammar`] chosen from the version the document declares.
//!
//! Condition trees come out of the parser without any install state attached;
//! evaluating them later is a separate, repeatable step.

pub mod grammar;
pub mod parser;

#[cfg(test)]
mod tests;

// Re-export main types
pub use grammar::{detect_version, grammar_for_version, Grammar, SUPPORTED_VERSIONS};
pub use parser::{load_module_config, parse_module_config, ConfigParser};
