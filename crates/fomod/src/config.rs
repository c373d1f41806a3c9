//! Configuration types for the configuration parser

/// Default nesting limit for composite dependencies
pub const DEFAULT_MAX_DEPENDENCY_DEPTH: usize = 64;

/// Options controlling how a module configuration is parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    /// Maximum nesting of `dependencies` nodes before building fails.
    /// Condition trees come from untrusted packages, so recursion is bounded.
    pub max_dependency_depth: usize,
    /// Trim surrounding whitespace from plugin descriptions
    pub trim_descriptions: bool,
    /// Grammar version to assume when the document carries no schema reference
    pub fallback_version: Option<String>,
}

impl ParserOptions {
    /// Start building options from the defaults
    pub fn builder() -> ParserOptionsBuilder {
        ParserOptionsBuilder::default()
    }
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_dependency_depth: DEFAULT_MAX_DEPENDENCY_DEPTH,
            trim_descriptions: true,
            fallback_version: None,
        }
    }
}

/// Fluent builder for [`ParserOptions`]
#[derive(Debug, Default)]
pub struct ParserOptionsBuilder {
    options: ParserOptions,
}

impl ParserOptionsBuilder {
    pub fn max_dependency_depth(mut self, depth: usize) -> Self {
        self.options.max_dependency_depth = depth;
        self
    }

    pub fn trim_descriptions(mut self, trim: bool) -> Self {
        self.options.trim_descriptions = trim;
        self
    }

    pub fn fallback_version<S: Into<String>>(mut self, version: S) -> Self {
        self.options.fallback_version = Some(version.into());
        self
    }

    pub fn build(self) -> ParserOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_defaults() {
        let options = ParserOptions::builder()
            .max_dependency_depth(8)
            .trim_descriptions(false)
            .fallback_version("2.0")
            .build();

        assert_eq!(options.max_dependency_depth, 8);
        assert!(!options.trim_descriptions);
        assert_eq!(options.fallback_version.as_deref(), Some("2.0"));
    }

    #[test]
    fn test_defaults() {
        let options = ParserOptions::default();
        assert_eq!(options.max_dependency_depth, DEFAULT_MAX_DEPENDENCY_DEPTH);
        assert!(options.trim_descriptions);
        assert!(options.fallback_version.is_none());
    }
}
