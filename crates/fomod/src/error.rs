//! Error types for configuration parsing and condition evaluation

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building structures from a module configuration
///
/// The document is assumed to be schema-valid before it reaches the parser, so
/// every node/attribute/enum failure here points at a parser or schema version
/// mismatch rather than at the user. None of them are retried or recovered.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid dependency node: {kind}. The config file has already been validated against the schema, so the parser is out of step with it")]
    InvalidDependencyNode { kind: String },

    #[error("Invalid file node: {kind}")]
    InvalidFileNode { kind: String },

    #[error("Node '{node}' is missing required attribute '{attribute}'")]
    MissingAttribute { node: String, attribute: String },

    #[error("Node '{node}' is missing required child '{child}'")]
    MissingChild { node: String, child: String },

    #[error("'{value}' is not a valid {type_name}")]
    InvalidEnumValue {
        type_name: &'static str,
        value: String,
    },

    #[error("Invalid version string '{value}'")]
    InvalidVersion { value: String },

    #[error("Dependency nesting exceeds the limit of {limit} levels")]
    DependencyTooDeep { limit: usize },

    #[error("Unsupported configuration file version: {version}")]
    UnsupportedConfigVersion { version: String },

    #[error("Configuration file does not declare a schema version")]
    UnknownConfigVersion,

    #[error("Document nesting exceeds the limit of {limit} levels")]
    DocumentTooDeep { limit: usize },

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Malformed document: {reason}")]
    MalformedDocument { reason: String },

    #[error("IO error reading '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Image(#[from] ImageError),
}

pub type Result<T> = std::result::Result<T, ParseError>;

impl ParseError {
    /// Shorthand used by the grammar builders
    pub fn invalid_node<S: Into<String>>(kind: S) -> Self {
        ParseError::InvalidDependencyNode { kind: kind.into() }
    }

    /// True for every failure that means the document and the parser disagree.
    ///
    /// Missing attributes, missing children and bad enum names on a validated
    /// document are the same class of defect as an unknown node kind.
    pub fn is_internal_consistency(&self) -> bool {
        matches!(
            self,
            ParseError::InvalidDependencyNode { .. }
                | ParseError::InvalidFileNode { .. }
                | ParseError::MissingAttribute { .. }
                | ParseError::MissingChild { .. }
                | ParseError::InvalidEnumValue { .. }
                | ParseError::InvalidVersion { .. }
        )
    }

    /// Get error category for logs
    pub fn category(&self) -> &'static str {
        match self {
            ParseError::InvalidDependencyNode { .. } => "invalid_node",
            ParseError::InvalidFileNode { .. } => "invalid_node",
            ParseError::MissingAttribute { .. } => "invalid_node",
            ParseError::MissingChild { .. } => "invalid_node",
            ParseError::InvalidEnumValue { .. } => "invalid_node",
            ParseError::InvalidVersion { .. } => "invalid_node",
            ParseError::DependencyTooDeep { .. } => "too_deep",
            ParseError::UnsupportedConfigVersion { .. } => "version",
            ParseError::UnknownConfigVersion => "version",
            ParseError::DocumentTooDeep { .. } => "too_deep",
            ParseError::Xml(_) => "xml",
            ParseError::MalformedDocument { .. } => "xml",
            ParseError::Io { .. } => "io",
            ParseError::Image(_) => "image",
        }
    }
}

/// Errors raised while evaluating a condition tree against install state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    #[error("No extension could evaluate the '{kind}' condition")]
    UnresolvedExtensionPredicate { kind: String },

    #[error("Condition nesting exceeds the limit of {limit} levels")]
    DependencyTooDeep { limit: usize },
}

/// Errors from the image collaborator, passed through to the caller unchanged
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read image '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
