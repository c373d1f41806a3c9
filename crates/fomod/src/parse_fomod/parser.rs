//! Module configuration parser
//!
//! [`ConfigParser`] walks a [`ConfigDocument`] with the node-kind tables of one
//! [`Grammar`] and produces the structures in [`crate::plugin`]. The document
//! is expected to be schema-valid already: any node the grammar cannot place
//! fails the whole call instead of being skipped.

use crate::config::ParserOptions;
use crate::dependency::{CompositeDependency, DependencyOperator};
use crate::document::{ConfigDocument, Element};
use crate::error::{ParseError, Result};
use crate::extension::{NoExtension, ParserExtension};
use crate::image::{ImageHandle, ImageLoader, PathOnlyImageLoader};
use crate::parse_fomod::grammar::{detect_version, grammar_for_version, Grammar};
use crate::plugin::{
    ConditionalFileInstallPattern, ConditionalFlag, FileKind, GroupType, ModuleConfig, PluginDescriptor,
    PluginFile, PluginGroup,
};
use std::path::Path;
use tracing::{debug, trace};

static NO_EXTENSION: NoExtension = NoExtension;
static PATH_ONLY_IMAGES: PathOnlyImageLoader = PathOnlyImageLoader;

/// Parser for one module configuration grammar
pub struct ConfigParser<'a> {
    grammar: &'static dyn Grammar,
    options: ParserOptions,
    extension: &'a dyn ParserExtension,
    images: &'a dyn ImageLoader,
}

impl<'a> ConfigParser<'a> {
    /// Create a parser for a known grammar with default options, no
    /// extension and path-only images
    pub fn new(grammar: &'static dyn Grammar) -> Self {
        Self {
            grammar,
            options: ParserOptions::default(),
            extension: &NO_EXTENSION,
            images: &PATH_ONLY_IMAGES,
        }
    }

    /// Create a parser for the version the document declares, falling back to
    /// `options.fallback_version` when it declares none
    pub fn for_document(document: &ConfigDocument, options: ParserOptions) -> Result<Self> {
        let version = detect_version(document)
            .or_else(|| options.fallback_version.clone())
            .ok_or(ParseError::UnknownConfigVersion)?;

        let grammar = grammar_for_version(&version)
            .ok_or_else(|| ParseError::UnsupportedConfigVersion { version: version.clone() })?;
        debug!("Using configuration grammar {}", grammar.version());

        Ok(Self::new(grammar).with_options(options))
    }

    /// Set parser options and return self for chaining
    pub fn with_options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the extension consulted for unknown package dependencies
    pub fn with_extension(mut self, extension: &'a dyn ParserExtension) -> Self {
        self.extension = extension;
        self
    }

    /// Set the image loader used for plugin and module images
    pub fn with_image_loader(mut self, images: &'a dyn ImageLoader) -> Self {
        self.images = images;
        self
    }

    pub fn grammar(&self) -> &'static dyn Grammar {
        self.grammar
    }

    pub fn version(&self) -> &'static str {
        self.grammar.version()
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Package-level requirements, combined under AND.
    ///
    /// Kinds the grammar does not know are offered to the extension; if it
    /// declines too, the parse fails with [`ParseError::InvalidDependencyNode`].
    pub fn parse_module_dependencies(&self, document: &ConfigDocument) -> Result<CompositeDependency> {
        let mut dependencies = CompositeDependency::and();

        for node in document.select("/config/moduleDependencies/*") {
            match self.grammar.module_dependency_builder(&node.name) {
                Some(build) => {
                    trace!("Module dependency '{}'", node.name);
                    dependencies.push(build(self, node)?);
                }
                None => {
                    let predicate = self
                        .extension
                        .try_parse_dependency(node)
                        .ok_or_else(|| ParseError::invalid_node(node.name.as_str()))?;
                    debug!("Extension accepted module dependency '{}'", node.name);
                    dependencies.push(predicate);
                }
            }
        }

        debug!("Parsed {} module dependencies", dependencies.len());
        Ok(dependencies)
    }

    /// Build a composite dependency from a `dependencies` node
    pub fn build_dependency_tree(&self, node: &Element) -> Result<CompositeDependency> {
        self.build_dependency_tree_at(node, 1)
    }

    /// Build a composite that sits `depth` levels deep (the root is level 1)
    pub(crate) fn build_dependency_tree_at(&self, node: &Element, depth: usize) -> Result<CompositeDependency> {
        let limit = self.options.max_dependency_depth;
        if depth > limit {
            return Err(ParseError::DependencyTooDeep { limit });
        }

        let operator: DependencyOperator = node.required_attribute("operator")?.parse()?;
        let mut composite = CompositeDependency::new(operator);

        for child in &node.children {
            let build = self
                .grammar
                .dependency_builder(&child.name)
                .ok_or_else(|| ParseError::invalid_node(child.name.as_str()))?;
            trace!("Dependency '{}' at depth {}", child.name, depth);
            composite.push(build(self, child, depth + 1)?);
        }

        Ok(composite)
    }

    /// Parse one `plugin` node
    pub fn parse_plugin(&self, node: &Element) -> Result<PluginDescriptor> {
        let name = node.required_attribute("name")?.to_string();

        let description = node.required_child("description")?.text();
        let description = if self.options.trim_descriptions {
            description.trim().to_string()
        } else {
            description.to_string()
        };

        let descriptor = node
            .required_child("typeDescriptor")?
            .first_child()
            .ok_or_else(|| ParseError::MissingChild {
                node: "typeDescriptor".to_string(),
                child: "*".to_string(),
            })?;
        let build_type = self
            .grammar
            .type_descriptor_builder(&descriptor.name)
            .ok_or_else(|| ParseError::invalid_node(descriptor.name.as_str()))?;
        let type_resolution = build_type(self, descriptor)?;

        let image = match node.select_single("image") {
            Some(image) => Some(self.images.load_image(image.required_attribute("path")?)?),
            None => None,
        };

        let files = read_files(&node.select("files/*"))?;
        let condition_flags = if self.grammar.reads_condition_flags() {
            read_flags(&node.select("conditionFlags/*"))?
        } else {
            Vec::new()
        };

        Ok(PluginDescriptor {
            name,
            description,
            image,
            type_resolution,
            files,
            condition_flags,
        })
    }

    /// Plugin groups in document order
    pub fn parse_groups(&self, document: &ConfigDocument) -> Result<Vec<PluginGroup>> {
        document
            .select("/config/groups/*")
            .into_iter()
            .map(|group| -> Result<PluginGroup> {
                let name = group.required_attribute("name")?.to_string();
                let group_type: GroupType = group.required_attribute("type")?.parse()?;
                let plugins = group
                    .select("plugins/*")
                    .into_iter()
                    .map(|plugin| self.parse_plugin(plugin))
                    .collect::<Result<Vec<_>>>()?;
                debug!("Group '{}' has {} plugins", name, plugins.len());
                Ok(PluginGroup {
                    name,
                    group_type,
                    plugins,
                })
            })
            .collect()
    }

    /// Every plugin in the document, group by group, in document order
    pub fn parse_plugins(&self, document: &ConfigDocument) -> Result<Vec<PluginDescriptor>> {
        Ok(self
            .parse_groups(document)?
            .into_iter()
            .flat_map(|group| group.plugins)
            .collect())
    }

    /// Conditional file install patterns in document order; empty for
    /// grammars that predate them
    pub fn parse_conditional_file_install_patterns(
        &self,
        document: &ConfigDocument,
    ) -> Result<Vec<ConditionalFileInstallPattern>> {
        let Some(path) = self.grammar.conditional_installs_path() else {
            return Ok(Vec::new());
        };

        let patterns = document
            .select(path)
            .into_iter()
            .map(|pattern| -> Result<ConditionalFileInstallPattern> {
                let condition = self.build_dependency_tree(pattern.required_child("dependencies")?)?;
                let files = read_files(&pattern.select("files/*"))?;
                Ok(ConditionalFileInstallPattern::new(condition, files))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!("Parsed {} conditional file install patterns", patterns.len());
        Ok(patterns)
    }

    /// Files installed regardless of plugin selection
    pub fn parse_required_install_files(&self, document: &ConfigDocument) -> Result<Vec<PluginFile>> {
        read_files(&document.select("/config/requiredInstallFiles/*"))
    }

    pub fn parse_module_name(&self, document: &ConfigDocument) -> Result<String> {
        document
            .select_single("/config/moduleName")
            .map(|node| node.text().trim().to_string())
            .ok_or_else(|| ParseError::MissingChild {
                node: document.root().name.clone(),
                child: "moduleName".to_string(),
            })
    }

    pub fn parse_module_image(&self, document: &ConfigDocument) -> Result<Option<ImageHandle>> {
        match document.select_single("/config/moduleImage") {
            Some(node) => Ok(Some(self.images.load_image(node.required_attribute("path")?)?)),
            None => Ok(None),
        }
    }

    /// Parse the whole document
    pub fn parse_module_config(&self, document: &ConfigDocument) -> Result<ModuleConfig> {
        Ok(ModuleConfig {
            version: self.version().to_string(),
            name: self.parse_module_name(document)?,
            image: self.parse_module_image(document)?,
            module_dependencies: self.parse_module_dependencies(document)?,
            required_files: self.parse_required_install_files(document)?,
            groups: self.parse_groups(document)?,
            conditional_file_installs: self.parse_conditional_file_install_patterns(document)?,
        })
    }
}

/// Read `file` and `folder` entries in document order, duplicates kept
fn read_files(nodes: &[&Element]) -> Result<Vec<PluginFile>> {
    nodes
        .iter()
        .map(|node| -> Result<PluginFile> {
            let kind = match node.name.as_str() {
                "file" => FileKind::File,
                "folder" => FileKind::Folder,
                other => return Err(ParseError::InvalidFileNode { kind: other.to_string() }),
            };

            let mut file = PluginFile::new(kind, node.required_attribute("source")?);
            if let Some(destination) = node.attribute("destination") {
                file.destination = destination.to_string();
            }
            if let Some(priority) = node.attribute("priority") {
                file.priority = priority.trim().parse().map_err(|_| ParseError::InvalidEnumValue {
                    type_name: "priority",
                    value: priority.to_string(),
                })?;
            }
            file.always_install = bool_attribute(node, "alwaysInstall")?;
            file.install_if_usable = bool_attribute(node, "installIfUsable")?;
            Ok(file)
        })
        .collect()
}

/// Read condition flags in document order; the value is the node's raw
/// inner content, entities and comments as written
fn read_flags(nodes: &[&Element]) -> Result<Vec<ConditionalFlag>> {
    nodes
        .iter()
        .map(|node| -> Result<ConditionalFlag> {
            Ok(ConditionalFlag::new(node.required_attribute("name")?, node.inner_xml()))
        })
        .collect()
}

/// Optional xs:boolean attribute, false when absent
fn bool_attribute(node: &Element, name: &str) -> Result<bool> {
    match node.attribute(name) {
        None => Ok(false),
        Some("true") | Some("1") => Ok(true),
        Some("false") | Some("0") => Ok(false),
        Some(other) => Err(ParseError::InvalidEnumValue {
            type_name: "boolean",
            value: other.to_string(),
        }),
    }
}

/// Parse configuration XML with the grammar it declares and default
/// collaborators
pub fn parse_module_config(xml: &str) -> Result<ModuleConfig> {
    let document = ConfigDocument::parse(xml)?;
    ConfigParser::for_document(&document, ParserOptions::default())?.parse_module_config(&document)
}

/// Load and parse a configuration file from disk
pub fn load_module_config<P: AsRef<Path>>(path: P) -> Result<ModuleConfig> {
    let document = ConfigDocument::load(path)?;
    ConfigParser::for_document(&document, ParserOptions::default())?.parse_module_config(&document)
}
