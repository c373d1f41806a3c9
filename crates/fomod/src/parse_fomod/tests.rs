//! Tests for parsing module configurations end to end

use super::*;
use crate::config::ParserOptions;
use crate::dependency::{CompositeDependency, Dependency, ModFileState, Predicate};
use crate::document::ConfigDocument;
use crate::error::{ImageError, ParseError};
use crate::extension::PassthroughExtension;
use crate::image::DirectoryImageLoader;
use crate::plugin::{select_conditional_files, resolve_plugin_type, FileKind, GroupType, PluginType, PluginTypeResolution};
use crate::state::StateSnapshot;
use crate::error::EvaluationError;
use tempfile::tempdir;

const ARMOR_CONFIG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<config xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:noNamespaceSchemaLocation="ModConfig2.0.xsd">
  <moduleName>Better Armor</moduleName>
  <moduleImage path="fomod\images\banner.png" />
  <moduleDependencies>
    <falloutDependency version="1.7.0.3" />
    <fommDependency version="0.13.21" />
    <fileDependency file="Fallout3.esm" />
  </moduleDependencies>
  <requiredInstallFiles>
    <file source="BetterArmor.esm" />
    <folder source="textures\core" destination="textures" priority="1" />
  </requiredInstallFiles>
  <groups>
    <group name="Body" type="SelectExactlyOne">
      <plugins>
        <plugin name="Type 3">
          <description>
            Type 3 body replacer.
          </description>
          <image path="fomod\images\type3.png" />
          <files>
            <file source="meshes\type3\body.nif" destination="meshes\body.nif" />
            <file source="meshes\type3\hands.nif" destination="meshes\hands.nif" alwaysInstall="true" />
            <file source="meshes\type3\body.nif" destination="meshes\body.nif" />
          </files>
          <conditionFlags>
            <flag name="Body">Type3</flag>
            <flag name="Armor">Light</flag>
            <flag name="Body">Type3</flag>
          </conditionFlags>
          <typeDescriptor>
            <type name="Recommended" />
          </typeDescriptor>
        </plugin>
        <plugin name="Robert">
          <description>Robert body.</description>
          <files>
            <folder source="meshes\robert" destination="meshes" />
          </files>
          <conditionFlags>
            <flag name="Body">Robert</flag>
          </conditionFlags>
          <typeDescriptor>
            <dependencyType>
              <defaultType name="Optional" />
              <patterns>
                <pattern>
                  <dependencies operator="And">
                    <fileDependency file="Robert.esp" state="Missing" />
                  </dependencies>
                  <type name="NotUsable" />
                </pattern>
                <pattern>
                  <dependencies operator="Or">
                    <fileDependency file="RobertMale.esp" state="Active" />
                    <flagDependency flag="Armor" value="Light" />
                  </dependencies>
                  <type name="Recommended" />
                </pattern>
                <pattern>
                  <dependencies operator="And">
                    <fileDependency file="RobertMale.esp" state="Active" />
                  </dependencies>
                  <type name="Required" />
                </pattern>
              </patterns>
            </dependencyType>
          </typeDescriptor>
        </plugin>
      </plugins>
    </group>
    <group name="Extras" type="SelectAny">
      <plugins>
        <plugin name="Capes">
          <description>Optional capes.</description>
          <files>
            <file source="capes.esp" />
          </files>
          <typeDescriptor>
            <type name="Optional" />
          </typeDescriptor>
        </plugin>
      </plugins>
    </group>
  </groups>
  <conditionalFileInstalls>
    <patterns>
      <pattern>
        <dependencies operator="And">
          <flagDependency flag="Body" value="Type3" />
          <dependencies operator="Or">
            <fileDependency file="Weapons.esp" state="Active" />
            <fileDependency file="Weapons.esp" state="Inactive" />
          </dependencies>
        </dependencies>
        <files>
          <file source="patches\type3_weapons.esp" destination="type3_weapons.esp" />
        </files>
      </pattern>
      <pattern>
        <dependencies operator="And">
          <flagDependency flag="Body" value="Robert" />
        </dependencies>
        <files>
          <file source="patches\robert.esp" destination="robert.esp" />
        </files>
      </pattern>
    </patterns>
  </conditionalFileInstalls>
</config>"#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Wrap configuration body text in a root declaring `version`
fn config(version: &str, body: &str) -> ConfigDocument {
    let xml = format!(
        r#"<config xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:noNamespaceSchemaLocation="ModConfig{}.xsd">
  <moduleName>Test</moduleName>
  {}
</config>"#,
        version, body
    );
    ConfigDocument::parse(&xml).expect("Failed to parse test document")
}

/// A one-plugin document whose type descriptor is `type_descriptor`
fn plugin_config(version: &str, type_descriptor: &str) -> ConfigDocument {
    config(
        version,
        &format!(
            r#"<groups><group name="G" type="SelectAny"><plugins>
                 <plugin name="P">
                   <description>d</description>
                   <conditionFlags><flag name="F">1</flag></conditionFlags>
                   <typeDescriptor>{}</typeDescriptor>
                 </plugin>
               </plugins></group></groups>"#,
            type_descriptor
        ),
    )
}

fn parser<'a>(document: &ConfigDocument) -> ConfigParser<'a> {
    ConfigParser::for_document(document, ParserOptions::default()).expect("No grammar for test document")
}

fn full_state() -> StateSnapshot {
    StateSnapshot::new()
        .with_game_version("1.7.0.3".parse().unwrap())
        .with_manager_version("0.13.21".parse().unwrap())
        .with_file_state("Fallout3.esm", ModFileState::Active)
}

#[cfg(test)]
mod document_tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        init_tracing();
        let module = parse_module_config(ARMOR_CONFIG).expect("Failed to parse armor config");

        assert_eq!(module.version, "2.0");
        assert_eq!(module.name, "Better Armor");
        assert_eq!(module.image.as_ref().map(|i| i.path.as_str()), Some("fomod\\images\\banner.png"));

        assert_eq!(module.groups.len(), 2);
        assert_eq!(module.groups[0].group_type, GroupType::SelectExactlyOne);
        assert_eq!(module.groups[1].group_type, GroupType::SelectAny);

        let names: Vec<&str> = module.plugins().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Type 3", "Robert", "Capes"]);
        assert_eq!(module.conditional_file_installs.len(), 2);
    }

    #[test]
    fn test_module_dependencies_in_document_order() {
        let document = ConfigDocument::parse(ARMOR_CONFIG).unwrap();
        let dependencies = parser(&document).parse_module_dependencies(&document).unwrap();

        assert_eq!(dependencies.operator, crate::dependency::DependencyOperator::And);
        assert_eq!(
            dependencies.dependencies,
            vec![
                Dependency::Predicate(Predicate::GameVersionAtLeast { version: "1.7.0.3".parse().unwrap() }),
                Dependency::Predicate(Predicate::ManagerVersionAtLeast { version: "0.13.21".parse().unwrap() }),
                Dependency::Predicate(Predicate::file_state("fallout3.esm", ModFileState::Active)),
            ]
        );

        assert!(dependencies.evaluate(&full_state()).unwrap());

        let old_game = full_state().with_game_version("1.6".parse().unwrap());
        assert!(!dependencies.evaluate(&old_game).unwrap());

        let missing_master = full_state().with_file_state("FALLOUT3.ESM", ModFileState::Inactive);
        assert!(!dependencies.evaluate(&missing_master).unwrap());
    }

    #[test]
    fn test_package_file_requirement_is_always_active() {
        let document = config(
            "2.0",
            r#"<moduleDependencies><fileDependency file="A.esp" state="Missing" /></moduleDependencies>"#,
        );
        let dependencies = parser(&document).parse_module_dependencies(&document).unwrap();

        assert_eq!(
            dependencies.dependencies,
            vec![Dependency::Predicate(Predicate::file_state("a.esp", ModFileState::Active))]
        );
        let state = StateSnapshot::new().with_file_state("A.esp", ModFileState::Active);
        assert!(dependencies.evaluate(&state).unwrap());
        assert!(!dependencies.evaluate(&StateSnapshot::new()).unwrap());
    }

    #[test]
    fn test_module_image_without_path_fails() {
        let document = config("2.0", "<moduleImage />");
        let err = parser(&document).parse_module_image(&document).unwrap_err();
        assert!(matches!(err, ParseError::MissingAttribute { ref attribute, .. } if attribute == "path"));

        let document = config("2.0", "");
        assert!(parser(&document).parse_module_image(&document).unwrap().is_none());
    }

    #[test]
    fn test_parsed_config_json_round_trip() {
        let document = config(
            "2.0",
            r#"<moduleDependencies>
                 <fileDependency file="Fallout3.esm" />
                 <foseDependency version="1.2" />
               </moduleDependencies>"#,
        );
        let extension = PassthroughExtension::new().accept("foseDependency");
        let module = parser(&document)
            .with_extension(&extension)
            .parse_module_config(&document)
            .unwrap();

        let json = serde_json::to_string(&module).unwrap();
        let back: crate::plugin::ModuleConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, module);

        let armor = parse_module_config(ARMOR_CONFIG).unwrap();
        let json = serde_json::to_string(&armor).unwrap();
        let back: crate::plugin::ModuleConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, armor);
    }

    #[test]
    fn test_required_files_defaults() {
        let module = parse_module_config(ARMOR_CONFIG).unwrap();
        let files = &module.required_files;

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].kind, FileKind::File);
        assert_eq!(files[0].destination, "BetterArmor.esm");
        assert_eq!(files[0].priority, 0);
        assert!(!files[0].always_install);
        assert_eq!(files[1].kind, FileKind::Folder);
        assert_eq!(files[1].destination, "textures");
        assert_eq!(files[1].priority, 1);
    }
}

#[cfg(test)]
mod plugin_tests {
    use super::*;

    #[test]
    fn test_plugin_lists_keep_order_and_duplicates() {
        let module = parse_module_config(ARMOR_CONFIG).unwrap();
        let type3 = &module.groups[0].plugins[0];

        assert_eq!(type3.description, "Type 3 body replacer.");
        assert_eq!(type3.image.as_ref().map(|i| i.path.as_str()), Some("fomod\\images\\type3.png"));
        assert_eq!(type3.type_resolution, PluginTypeResolution::Static(PluginType::Recommended));

        let sources: Vec<&str> = type3.files.iter().map(|f| f.source.as_str()).collect();
        assert_eq!(
            sources,
            vec!["meshes\\type3\\body.nif", "meshes\\type3\\hands.nif", "meshes\\type3\\body.nif"]
        );
        assert!(type3.files[1].always_install);

        let flags: Vec<(&str, &str)> = type3
            .condition_flags
            .iter()
            .map(|f| (f.name.as_str(), f.value.as_str()))
            .collect();
        assert_eq!(flags, vec![("Body", "Type3"), ("Armor", "Light"), ("Body", "Type3")]);
    }

    #[test]
    fn test_flag_value_is_raw_inner_content() {
        let document = config(
            "2.0",
            r#"<groups><group name="G" type="SelectAny"><plugins>
                 <plugin name="P">
                   <description>d</description>
                   <conditionFlags>
                     <flag name="F">a<!-- c -->b</flag>
                     <flag name="G">x &amp; y</flag>
                     <flag name="H"></flag>
                   </conditionFlags>
                   <typeDescriptor><type name="Optional" /></typeDescriptor>
                 </plugin>
               </plugins></group></groups>"#,
        );
        let plugins = parser(&document).parse_plugins(&document).unwrap();

        let values: Vec<&str> = plugins[0].condition_flags.iter().map(|f| f.value.as_str()).collect();
        assert_eq!(values, vec!["a<!-- c -->b", "x &amp; y", ""]);
    }

    #[test]
    fn test_untrimmed_description_option() {
        let document = ConfigDocument::parse(ARMOR_CONFIG).unwrap();
        let options = ParserOptions::builder().trim_descriptions(false).build();
        let parser = ConfigParser::for_document(&document, options).unwrap();

        let plugins = parser.parse_plugins(&document).unwrap();
        assert!(plugins[0].description.starts_with('\n'));
        assert_eq!(plugins[0].description.trim(), "Type 3 body replacer.");
    }

    #[test]
    fn test_computed_type_first_match_wins() {
        let module = parse_module_config(ARMOR_CONFIG).unwrap();
        let robert = &module.groups[0].plugins[1];

        match &robert.type_resolution {
            PluginTypeResolution::Computed { default_type, patterns } => {
                assert_eq!(*default_type, PluginType::Optional);
                let order: Vec<PluginType> = patterns.iter().map(|p| p.plugin_type).collect();
                assert_eq!(order, vec![PluginType::NotUsable, PluginType::Recommended, PluginType::Required]);
            }
            other => panic!("Expected computed type, got {:?}", other),
        }

        // Robert.esp missing: the first pattern decides
        assert_eq!(resolve_plugin_type(robert, &StateSnapshot::new()).unwrap(), PluginType::NotUsable);

        // Both later patterns hold; the earlier one wins
        let state = StateSnapshot::new()
            .with_file_state("robert.esp", ModFileState::Active)
            .with_file_state("RobertMale.esp", ModFileState::Active);
        assert_eq!(resolve_plugin_type(robert, &state).unwrap(), PluginType::Recommended);

        // Nothing matches: default
        let state = StateSnapshot::new().with_file_state("Robert.esp", ModFileState::Inactive);
        assert_eq!(resolve_plugin_type(robert, &state).unwrap(), PluginType::Optional);
    }

    #[test]
    fn test_flags_from_earlier_selection_change_later_types() {
        let module = parse_module_config(ARMOR_CONFIG).unwrap();
        let type3 = &module.groups[0].plugins[0];
        let robert = &module.groups[0].plugins[1];

        let mut state = StateSnapshot::new().with_file_state("Robert.esp", ModFileState::Active);
        assert_eq!(robert.resolve_type(&state).unwrap(), PluginType::Optional);

        // Selecting Type 3 sets Armor=Light, which Robert's second pattern reads
        state.apply_condition_flags(type3);
        assert_eq!(robert.resolve_type(&state).unwrap(), PluginType::Recommended);
    }

    #[test]
    fn test_unknown_type_descriptor_fails() {
        let document = plugin_config("2.0", r#"<computedType name="Optional" />"#);
        let err = parser(&document).parse_plugins(&document).unwrap_err();
        match err {
            ParseError::InvalidDependencyNode { kind } => assert_eq!(kind, "computedType"),
            other => panic!("Expected InvalidDependencyNode, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_plugin_type_name_fails() {
        let document = plugin_config("2.0", r#"<type name="Mandatory" />"#);
        let err = parser(&document).parse_plugins(&document).unwrap_err();
        assert!(matches!(err, ParseError::InvalidEnumValue { type_name: "PluginType", .. }));
        assert!(err.is_internal_consistency());
    }

    #[test]
    fn test_missing_default_type_is_missing_child() {
        let document = plugin_config("2.0", r#"<dependencyType><patterns /></dependencyType>"#);
        let err = parser(&document).parse_plugins(&document).unwrap_err();
        assert!(matches!(err, ParseError::MissingChild { .. }));
        assert!(err.is_internal_consistency());
    }

    #[test]
    fn test_unknown_file_node_fails() {
        let document = config(
            "2.0",
            r#"<requiredInstallFiles><file source="a" /><link source="b" /></requiredInstallFiles>"#,
        );
        let err = parser(&document).parse_required_install_files(&document).unwrap_err();
        assert!(matches!(err, ParseError::InvalidFileNode { ref kind } if kind == "link"));
    }

    #[test]
    fn test_missing_image_surfaces_unchanged() {
        let dir = tempdir().unwrap();
        let images = DirectoryImageLoader::new(dir.path());
        let document = ConfigDocument::parse(ARMOR_CONFIG).unwrap();
        let parser = parser(&document).with_image_loader(&images);

        let err = parser.parse_plugins(&document).unwrap_err();
        assert!(matches!(err, ParseError::Image(ImageError::NotFound { .. })));
    }

    #[test]
    fn test_images_load_from_package_directory() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("fomod/images")).unwrap();
        std::fs::write(dir.path().join("fomod/images/type3.png"), b"type3").unwrap();
        std::fs::write(dir.path().join("fomod/images/banner.png"), b"banner").unwrap();

        let images = DirectoryImageLoader::new(dir.path());
        let document = ConfigDocument::parse(ARMOR_CONFIG).unwrap();
        let module = parser(&document)
            .with_image_loader(&images)
            .parse_module_config(&document)
            .unwrap();

        let banner = module.image.unwrap();
        assert_eq!(banner.data.as_deref(), Some(&b"banner"[..]));
        assert!(module.groups[0].plugins[0].image.as_ref().unwrap().data.is_some());
        assert!(module.groups[0].plugins[1].image.is_none());
    }
}

#[cfg(test)]
mod dependency_tests {
    use super::*;

    #[test]
    fn test_unknown_module_dependency_without_extension_fails() {
        let document = config(
            "2.0",
            r#"<moduleDependencies>
                 <fileDependency file="Fallout3.esm" />
                 <foseDependency version="1.2" />
               </moduleDependencies>"#,
        );
        let err = parser(&document).parse_module_dependencies(&document).unwrap_err();
        match err {
            ParseError::InvalidDependencyNode { kind } => assert_eq!(kind, "foseDependency"),
            other => panic!("Expected InvalidDependencyNode, got {:?}", other),
        }
    }

    #[test]
    fn test_extension_absorbs_unknown_module_dependency() {
        let document = config(
            "2.0",
            r#"<moduleDependencies>
                 <fileDependency file="Fallout3.esm" />
                 <foseDependency version="1.2" />
               </moduleDependencies>"#,
        );
        let extension = PassthroughExtension::new().accept("foseDependency");
        let dependencies = parser(&document)
            .with_extension(&extension)
            .parse_module_dependencies(&document)
            .unwrap();
        assert_eq!(dependencies.len(), 2);

        let state = full_state().with_extension_verdict("foseDependency", true);
        assert!(dependencies.evaluate(&state).unwrap());

        let state = full_state().with_extension_verdict("foseDependency", false);
        assert!(!dependencies.evaluate(&state).unwrap());

        let err = dependencies.evaluate(&full_state()).unwrap_err();
        assert_eq!(
            err,
            EvaluationError::UnresolvedExtensionPredicate { kind: "foseDependency".to_string() }
        );
    }

    #[test]
    fn test_extension_is_not_consulted_inside_conditions() {
        let document = config(
            "2.0",
            r#"<conditionalFileInstalls><patterns><pattern>
                 <dependencies operator="And"><foseDependency version="1.2" /></dependencies>
                 <files />
               </pattern></patterns></conditionalFileInstalls>"#,
        );
        let extension = PassthroughExtension::new().accept("foseDependency");
        let err = parser(&document)
            .with_extension(&extension)
            .parse_conditional_file_install_patterns(&document)
            .unwrap_err();
        assert!(matches!(err, ParseError::InvalidDependencyNode { ref kind } if kind == "foseDependency"));
    }

    #[test]
    fn test_conditional_patterns_follow_state() {
        let module = parse_module_config(ARMOR_CONFIG).unwrap();
        let patterns = &module.conditional_file_installs;

        let state = StateSnapshot::new()
            .with_flag("Body", "Type3")
            .with_file_state("weapons.esp", ModFileState::Inactive);
        assert!(patterns[0].applies(&state).unwrap());
        assert!(!patterns[1].applies(&state).unwrap());

        let files = select_conditional_files(patterns, &state).unwrap();
        let destinations: Vec<&str> = files.iter().map(|f| f.destination.as_str()).collect();
        assert_eq!(destinations, vec!["type3_weapons.esp"]);

        // Flag right, but Weapons.esp is not installed
        let state = StateSnapshot::new().with_flag("Body", "Type3");
        assert!(select_conditional_files(patterns, &state).unwrap().is_empty());
    }

    #[test]
    fn test_built_trees_hold_when_leaves_hold() {
        let document = config("2.0", "");
        let parser = parser(&document);
        let fragment = ConfigDocument::parse(
            r#"<dependencies operator="And">
                 <fileDependency file="A.esp" state="Active" />
                 <flagDependency flag="Mode" value="Full" />
                 <dependencies operator="Or">
                   <fileDependency file="B.esp" state="Missing" />
                   <flagDependency flag="Never" value="Set" />
                 </dependencies>
               </dependencies>"#,
        )
        .unwrap();

        let tree = parser.build_dependency_tree(fragment.root()).unwrap();
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.depth(), 2);

        let state = StateSnapshot::new()
            .with_file_state("a.esp", ModFileState::Active)
            .with_flag("Mode", "Full");
        assert!(tree.evaluate(&state).unwrap());

        let state = state.with_file_state("B.esp", ModFileState::Active);
        assert!(!tree.evaluate(&state).unwrap());
    }

    #[test]
    fn test_empty_composites_parse() {
        let document = config("2.0", "");
        let parser = parser(&document);

        let and = ConfigDocument::parse(r#"<dependencies operator="And" />"#).unwrap();
        let or = ConfigDocument::parse(r#"<dependencies operator="Or" />"#).unwrap();

        let state = StateSnapshot::new();
        assert!(parser.build_dependency_tree(and.root()).unwrap().evaluate(&state).unwrap());
        assert!(!parser.build_dependency_tree(or.root()).unwrap().evaluate(&state).unwrap());
    }

    #[test]
    fn test_bad_operator_and_missing_attributes() {
        let document = config("2.0", "");
        let parser = parser(&document);

        let bad_operator = ConfigDocument::parse(r#"<dependencies operator="Xor" />"#).unwrap();
        assert!(matches!(
            parser.build_dependency_tree(bad_operator.root()),
            Err(ParseError::InvalidEnumValue { type_name: "DependencyOperator", .. })
        ));

        let no_state = ConfigDocument::parse(
            r#"<dependencies operator="And"><fileDependency file="A.esp" /></dependencies>"#,
        )
        .unwrap();
        let err = parser.build_dependency_tree(no_state.root()).unwrap_err();
        assert!(matches!(err, ParseError::MissingAttribute { ref attribute, .. } if attribute == "state"));
        assert!(err.is_internal_consistency());
    }

    #[test]
    fn test_nesting_limit() {
        let document = config("2.0", "");
        let options = ParserOptions::builder().max_dependency_depth(3).build();
        let parser = parser(&document).with_options(options);

        let nested = |levels: usize| {
            let mut xml = String::new();
            for _ in 0..levels {
                xml.push_str(r#"<dependencies operator="And">"#);
            }
            for _ in 0..levels {
                xml.push_str("</dependencies>");
            }
            ConfigDocument::parse(&xml).unwrap()
        };

        assert_eq!(parser.build_dependency_tree(nested(3).root()).unwrap().depth(), 3);
        assert!(matches!(
            parser.build_dependency_tree(nested(4).root()),
            Err(ParseError::DependencyTooDeep { limit: 3 })
        ));
    }
}

#[cfg(test)]
mod version_tests {
    use super::*;

    const VERSION_IN_CONDITION: &str = r#"<conditionalFileInstalls><patterns><pattern>
        <dependencies operator="And">
          <gameDependency version="1.5" />
          <fommDependency version="0.13" />
        </dependencies>
        <files><file source="new.esp" /></files>
      </pattern></patterns></conditionalFileInstalls>"#;

    #[test]
    fn test_v30_allows_version_checks_in_conditions() {
        let document = config("3.0", VERSION_IN_CONDITION);
        let patterns = parser(&document)
            .parse_conditional_file_install_patterns(&document)
            .unwrap();

        let tree: &CompositeDependency = &patterns[0].condition;
        let state = StateSnapshot::new()
            .with_game_version("1.7".parse().unwrap())
            .with_manager_version("0.13.21".parse().unwrap());
        assert!(tree.evaluate(&state).unwrap());
        assert!(!tree.evaluate(&StateSnapshot::new()).unwrap());
    }

    #[test]
    fn test_v20_rejects_version_checks_in_conditions() {
        let document = config("2.0", VERSION_IN_CONDITION);
        let err = parser(&document)
            .parse_conditional_file_install_patterns(&document)
            .unwrap_err();
        assert!(matches!(err, ParseError::InvalidDependencyNode { ref kind } if kind == "gameDependency"));
    }

    #[test]
    fn test_v30_keeps_older_module_dependency_kinds() {
        let document = config(
            "3.0",
            r#"<moduleDependencies>
                 <gameDependency version="1.5" />
                 <falloutDependency version="1.4" />
                 <fommDependency version="0.13" />
               </moduleDependencies>"#,
        );
        let dependencies = parser(&document).parse_module_dependencies(&document).unwrap();
        assert_eq!(dependencies.len(), 3);
    }

    #[test]
    fn test_v10_has_static_types_only() {
        let document = plugin_config("1.0", r#"<type name="Required" />"#);
        let plugins = parser(&document).parse_plugins(&document).unwrap();
        assert_eq!(plugins[0].type_resolution, PluginTypeResolution::Static(PluginType::Required));
        // 1.0 has no condition flags; the node is not read
        assert!(plugins[0].condition_flags.is_empty());

        let document = plugin_config(
            "1.0",
            r#"<dependencyType><defaultType name="Optional" /><patterns /></dependencyType>"#,
        );
        let err = parser(&document).parse_plugins(&document).unwrap_err();
        assert!(matches!(err, ParseError::InvalidDependencyNode { ref kind } if kind == "dependencyType"));
    }

    #[test]
    fn test_v10_has_no_flags_or_conditional_installs() {
        let document = config(
            "1.0",
            r#"<moduleDependencies><fommDependency version="0.13" /></moduleDependencies>
               <conditionalFileInstalls><patterns><pattern>
                 <dependencies operator="And" /><files />
               </pattern></patterns></conditionalFileInstalls>"#,
        );
        let parser = parser(&document);
        assert!(parser.parse_conditional_file_install_patterns(&document).unwrap().is_empty());
        assert!(matches!(
            parser.parse_module_dependencies(&document),
            Err(ParseError::InvalidDependencyNode { ref kind }) if kind == "fommDependency"
        ));
    }

    #[test]
    fn test_version_selection() {
        let no_schema = ConfigDocument::parse("<config><moduleName>x</moduleName></config>").unwrap();
        assert!(matches!(
            ConfigParser::for_document(&no_schema, ParserOptions::default()),
            Err(ParseError::UnknownConfigVersion)
        ));

        let options = ParserOptions::builder().fallback_version("2.0").build();
        let parser = ConfigParser::for_document(&no_schema, options).unwrap();
        assert_eq!(parser.version(), "2.0");

        let future = config("9.0", "");
        assert!(matches!(
            ConfigParser::for_document(&future, ParserOptions::default()),
            Err(ParseError::UnsupportedConfigVersion { ref version }) if version == "9.0"
        ));
    }
}
