//! Inspect a module configuration against an install state
//!
//! Run with:
//! ```
//! cargo run -p cli -- fomod/ModuleConfig.xml --state state.json --select "Type 3"
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use fomod::{
    select_conditional_files, ConfigDocument, ConfigParser, DirectoryImageLoader, ImageLoader, ModuleConfig,
    ParserOptions, PassthroughExtension, PathOnlyImageLoader, PluginFile, PluginType, StateSnapshot,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Grammar used when a document does not declare its schema version
const FALLBACK_VERSION_VAR: &str = "FOMOD_FALLBACK_VERSION";

#[derive(Debug, Parser)]
#[command(name = "fomod-cli", about = "Parse a ModuleConfig.xml and evaluate it against an install state")]
struct Args {
    /// Path to the configuration document
    config: PathBuf,

    /// JSON install state (game and manager versions, files, flags)
    #[arg(long)]
    state: Option<PathBuf>,

    /// Package directory images are loaded from
    #[arg(long)]
    package_dir: Option<PathBuf>,

    /// Plugins selected in this session; their condition flags are applied in order
    #[arg(long = "select", value_name = "PLUGIN")]
    selected: Vec<String>,

    /// Package dependency kinds handed to the host instead of rejected
    #[arg(long = "accept", value_name = "KIND")]
    accepted: Vec<String>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    name: &'a str,
    version: &'a str,
    requirements: Verdict<bool>,
    plugins: Vec<PluginReport<'a>>,
    conditional_files: Verdict<Vec<&'a PluginFile>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PluginReport<'a> {
    group: &'a str,
    name: &'a str,
    plugin_type: Verdict<PluginType>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum Verdict<T> {
    Value(T),
    Error(String),
}

impl<T, E: std::fmt::Display> From<std::result::Result<T, E>> for Verdict<T> {
    fn from(result: std::result::Result<T, E>) -> Self {
        match result {
            Ok(value) => Verdict::Value(value),
            Err(e) => Verdict::Error(e.to_string()),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    if dotenv::dotenv().is_ok() {
        debug!("Loaded environment variables from .env file");
    }

    let document = ConfigDocument::load(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;

    let mut options = ParserOptions::builder();
    if let Ok(version) = std::env::var(FALLBACK_VERSION_VAR) {
        options = options.fallback_version(version);
    }

    let extension = args
        .accepted
        .iter()
        .fold(PassthroughExtension::new(), |extension, kind| extension.accept(kind.as_str()));
    let directory_images = args.package_dir.as_ref().map(DirectoryImageLoader::new);
    let images: &dyn ImageLoader = match &directory_images {
        Some(loader) => loader,
        None => &PathOnlyImageLoader,
    };

    let parser = ConfigParser::for_document(&document, options.build())
        .context("Failed to select a configuration grammar")?
        .with_extension(&extension)
        .with_image_loader(images);
    let module = parser
        .parse_module_config(&document)
        .with_context(|| format!("Failed to parse {}", args.config.display()))?;
    info!("Parsed '{}' (grammar {})", module.name, module.version);

    let mut state = match &args.state {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read state file {}", path.display()))?;
            StateSnapshot::from_json(&json).with_context(|| format!("Invalid state file {}", path.display()))?
        }
        None => StateSnapshot::new(),
    };

    let report = build_report(&module, &mut state, &args.selected);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

/// Resolve plugin types in document order, applying the flags of selected
/// plugins as the walk reaches them, then pick the conditional files
fn build_report<'a>(module: &'a ModuleConfig, state: &mut StateSnapshot, selected: &[String]) -> Report<'a> {
    let requirements = module.module_dependencies.evaluate(&*state).into();

    let mut plugins = Vec::new();
    for group in &module.groups {
        for plugin in &group.plugins {
            plugins.push(PluginReport {
                group: &group.name,
                name: &plugin.name,
                plugin_type: plugin.resolve_type(&*state).into(),
            });
            if selected.iter().any(|name| name == &plugin.name) {
                debug!("Applying condition flags of '{}'", plugin.name);
                state.apply_condition_flags(plugin);
            }
        }
    }

    for name in selected {
        if !module.plugins().any(|plugin| &plugin.name == name) {
            warn!("Selected plugin '{}' is not in the configuration", name);
        }
    }

    Report {
        name: &module.name,
        version: &module.version,
        requirements,
        plugins,
        conditional_files: select_conditional_files(&module.conditional_file_installs, &*state).into(),
    }
}

fn print_report(report: &Report<'_>) {
    println!("{} (configuration {})", report.name, report.version);

    match &report.requirements {
        Verdict::Value(true) => println!("Requirements: met"),
        Verdict::Value(false) => println!("Requirements: not met"),
        Verdict::Error(e) => println!("Requirements: {}", e),
    }

    let mut group = "";
    for plugin in &report.plugins {
        if plugin.group != group {
            group = plugin.group;
            println!("\n[{}]", group);
        }
        match &plugin.plugin_type {
            Verdict::Value(plugin_type) => println!("  {:<40} {}", plugin.name, plugin_type),
            Verdict::Error(e) => println!("  {:<40} error: {}", plugin.name, e),
        }
    }

    println!("\nConditional files:");
    match &report.conditional_files {
        Verdict::Value(files) if files.is_empty() => println!("  (none)"),
        Verdict::Value(files) => {
            for file in files {
                println!("  {} -> {}", file.source, file.destination);
            }
        }
        Verdict::Error(e) => println!("  error: {}", e),
    }
}
