//! `gestdoc config` command - Configuration management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::helpers::open_project;
use crate::cli::GlobalOpts;
use crate::core::config::{Config, KEYS};
use crate::core::diagnostics::CorruptData;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration values
    Show(ShowArgs),

    /// Set a configuration value
    Set(SetArgs),

    /// Unset (remove) a configuration value
    Unset(UnsetArgs),

    /// Show paths to configuration files
    Path,

    /// List all available configuration keys
    Keys,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show only this key's value
    pub key: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Configuration key (e.g., operator, phone_prefix)
    pub key: String,

    /// Value to set
    pub value: String,

    /// Set in global (user) config instead of project config
    #[arg(long, short = 'g')]
    pub global: bool,
}

#[derive(clap::Args, Debug)]
pub struct UnsetArgs {
    /// Configuration key to remove
    pub key: String,

    /// Remove from global (user) config instead of project config
    #[arg(long, short = 'g')]
    pub global: bool,
}

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => run_show(args, global),
        ConfigCommands::Set(args) => run_set(args, global),
        ConfigCommands::Unset(args) => run_unset(args, global),
        ConfigCommands::Path => run_path(global),
        ConfigCommands::Keys => run_keys(),
    }
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global).ok();
    let config = Config::load_for(project.as_ref());

    if let Some(key) = &args.key {
        check_key(key)?;
        return match config.get(key) {
            Some(v) => {
                println!("{}", v);
                Ok(())
            }
            None => Err(miette::miette!("Key '{}' is not set", key)),
        };
    }

    println!("{}", style("Effective Configuration").bold().underlined());
    println!();
    for (key, _) in KEYS {
        match config.get(key) {
            Some(v) => println!("  {}: {}", style(key).cyan(), style(v).yellow()),
            None => println!("  {}: {}", style(key).cyan(), style("(not set)").dim()),
        }
    }

    println!();
    println!("{}", style("Config Sources (in priority order):").dim());
    println!("  1. Environment variables (GESTDOC_OPERATOR, GESTDOC_FORMAT, GESTDOC_PHONE_PREFIX)");
    println!("  2. Project config (.gestdoc/config.yaml)");
    println!("  3. Global config (~/.config/gestdoc/config.yaml)");
    Ok(())
}

fn run_set(args: SetArgs, global: &GlobalOpts) -> Result<()> {
    check_key(&args.key)?;
    let config_path = target_path(args.global, global)?;

    let mut map = read_mapping(&config_path)?;
    map.insert(
        serde_yml::Value::String(args.key.clone()),
        serde_yml::Value::String(args.value.clone()),
    );

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).into_diagnostic()?;
    }
    write_mapping(&config_path, map)?;

    println!(
        "{} Set {} {} {} in {} config",
        style("✓").green(),
        style(&args.key).cyan(),
        style("→").dim(),
        style(&args.value).yellow(),
        scope(args.global)
    );
    Ok(())
}

fn run_unset(args: UnsetArgs, global: &GlobalOpts) -> Result<()> {
    check_key(&args.key)?;
    let config_path = target_path(args.global, global)?;

    if !config_path.exists() {
        return Err(miette::miette!(
            "Config file does not exist: {}",
            config_path.display()
        ));
    }

    let mut map = read_mapping(&config_path)?;
    if map.remove(args.key.as_str()).is_none() {
        return Err(miette::miette!("Key '{}' not found in config", args.key));
    }
    write_mapping(&config_path, map)?;

    println!(
        "{} Removed {} from {} config",
        style("✓").green(),
        style(&args.key).cyan(),
        scope(args.global)
    );
    Ok(())
}

fn run_path(global: &GlobalOpts) -> Result<()> {
    println!("{}", style("Configuration file paths:").bold());
    println!();

    match Config::global_config_path() {
        Some(path) => print_path("Global:", &path),
        None => println!("  {} {}", style("Global:").cyan(), style("(unavailable)").dim()),
    }

    println!();
    match open_project(global) {
        Ok(project) => print_path("Project:", &project.config_path()),
        Err(_) => println!(
            "  {} {}",
            style("Project:").cyan(),
            style("(not in a gestdoc project)").dim()
        ),
    }
    Ok(())
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available configuration keys:").bold());
    println!();

    for (key, description) in KEYS {
        println!("  {:<20} {}", style(key).cyan(), style(description).dim());
    }

    println!();
    println!(
        "{}",
        style("Use 'gestdoc config set <key> <value>' to set a value.").dim()
    );
    Ok(())
}

// Helper functions

fn check_key(key: &str) -> Result<()> {
    if Config::is_known_key(key) {
        Ok(())
    } else {
        Err(miette::miette!(
            help = "Run 'gestdoc config keys' to list them.",
            "Unknown configuration key '{}'",
            key
        ))
    }
}

fn scope(global: bool) -> &'static str {
    if global {
        "global"
    } else {
        "project"
    }
}

fn target_path(global_scope: bool, global: &GlobalOpts) -> Result<PathBuf> {
    if global_scope {
        Config::global_config_path()
            .ok_or_else(|| miette::miette!("Could not determine global config directory"))
    } else {
        Ok(open_project(global)?.config_path())
    }
}

fn print_path(label: &str, path: &Path) {
    let width = label.len();
    println!("  {} {}", style(label).cyan(), path.display());
    let marker = if path.exists() {
        style("(exists)").green()
    } else {
        style("(not created)").dim()
    };
    println!("  {:width$} {}", "", marker, width = width);
}

fn read_mapping(path: &Path) -> Result<serde_yml::Mapping> {
    if !path.exists() {
        return Ok(serde_yml::Mapping::new());
    }
    let content = fs::read_to_string(path).into_diagnostic()?;
    match serde_yml::from_str::<serde_yml::Value>(&content) {
        Ok(serde_yml::Value::Mapping(map)) => Ok(map),
        // Comment-only or empty files parse as null
        Ok(serde_yml::Value::Null) => Ok(serde_yml::Mapping::new()),
        Ok(_) => Err(miette::miette!("{} is not a YAML mapping", path.display())),
        Err(e) => Err(CorruptData::from_yaml_error(&e, &content, &path.display().to_string()).into()),
    }
}

fn write_mapping(path: &Path, map: serde_yml::Mapping) -> Result<()> {
    let yaml = serde_yml::to_string(&serde_yml::Value::Mapping(map)).into_diagnostic()?;
    fs::write(path, yaml).into_diagnostic()
}
