//! FOMOD Library
//!
//! This library parses versioned mod installer configuration documents
//! (`ModuleConfig.xml`) into plugin descriptors, dependency trees and
//! conditional file installs, and evaluates those conditions against the
//! state of an install session.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use fomod::{load_module_config, select_conditional_files, ModFileState, StateSnapshot};
//!
//! # fn example() -> fomod::Result<()> {
//! // Parse with the grammar the document declares
//! let module = load_module_config("fomod/ModuleConfig.xml")?;
//!
//! // Describe the install session
//! let mut state = StateSnapshot::new()
//!     .with_game_version("1.7.0.3".parse()?)
//!     .with_file_state("Fallout3.esm", ModFileState::Active);
//!
//! if !module.module_dependencies.evaluate(&state).unwrap_or(false) {
//!     println!("Package requirements not met");
//! }
//!
//! for plugin in module.plugins() {
//!     match plugin.resolve_type(&state) {
//!         Ok(plugin_type) => println!("{}: {}", plugin.name, plugin_type),
//!         Err(e) => println!("{}: {}", plugin.name, e),
//!     }
//!     state.apply_condition_flags(plugin);
//! }
//!
//! for file in select_conditional_files(&module.conditional_file_installs, &state).unwrap_or_default() {
//!     println!("Install {} -> {}", file.source, file.destination);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Versioned grammars**: 1.0, 2.0 and 3.0 configurations, each extending the one before
//! - **Dependency trees**: AND/OR expressions over file, flag and version predicates
//! - **Computed plugin types**: ordered patterns, first match wins
//! - **Conditional file installs**: file lists gated by dependency trees
//! - **Extensions**: unknown package-level dependency kinds can be handed to the host
//! - **Images**: path-only or loaded from the package directory

pub mod config;
pub mod dependency;
pub mod document;
pub mod error;
pub mod extension;
pub mod image;
pub mod parse_fomod;
pub mod plugin;
pub mod state;
pub mod version;

// Re-export commonly used types for convenience
pub use config::{ParserOptions, ParserOptionsBuilder};
pub use dependency::{
    CompositeDependency, Dependency, DependencyOperator, ExtensionPredicate, ModFileState, Predicate,
};
pub use document::{ConfigDocument, Element, MAX_DOCUMENT_DEPTH};
pub use error::{EvaluationError, ImageError, ParseError, Result};
pub use extension::{NoExtension, ParserExtension, PassthroughExtension};
pub use image::{DirectoryImageLoader, ImageHandle, ImageLoader, PathOnlyImageLoader};
pub use parse_fomod::{load_module_config, parse_module_config, ConfigParser, Grammar};
pub use plugin::{
    resolve_plugin_type, select_conditional_files, ConditionalFileInstallPattern, ConditionalFlag, FileKind,
    GroupType, ModuleConfig, PluginDescriptor, PluginFile, PluginGroup, PluginType, PluginTypeResolution,
    TypePattern,
};
pub use state::{InstallState, StateSnapshot};
pub use version::Version;
