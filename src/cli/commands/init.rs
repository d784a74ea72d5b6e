//! `gestdoc init` command - Create a project and report its starting data

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::{Path, PathBuf};

use crate::core::project::{Project, ProjectError};
use crate::core::storage::Storage;
use crate::entities::entity::EntityType;
use crate::store::Archive;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Rewrite the config even if .gestdoc/ already exists (stored data is kept)
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let root = project_root(&args.path)?;
    let created = if args.force {
        Project::init_force(&root)
    } else {
        Project::init(&root)
    };

    let project = match created {
        Ok(project) => project,
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} gestdoc project already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!(
                "  Stored data is kept by {}",
                style("gestdoc init --force").yellow()
            );
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!(
        "{} Initialized gestdoc project at {}",
        style("✓").green(),
        style(project.root().display()).cyan()
    );
    println!();

    // A forced init over unreadable buckets still succeeds; the data is left as is
    match Archive::open(project.storage()) {
        Ok(archive) => print_buckets(&archive),
        Err(e) => eprintln!(
            "{} Stored data could not be read: {}",
            style("!").yellow(),
            e
        ),
    }

    println!();
    println!(
        "Register a request with {}",
        style("gestdoc request new --interactive").yellow()
    );
    Ok(())
}

/// `path` made absolute, created when missing
fn project_root(path: &Path) -> Result<PathBuf> {
    let root = if path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        path.to_path_buf()
    };
    if !root.exists() {
        std::fs::create_dir_all(&root).into_diagnostic()?;
    }
    Ok(root)
}

/// Reference data per type, then the number of stored requests
fn print_buckets<S: Storage>(archive: &Archive<S>) {
    println!("{}", style("Reference data").bold());
    for &entity_type in EntityType::all() {
        let names: Vec<&str> = archive
            .entities()
            .query(entity_type, None)
            .map(|e| e.name.as_str())
            .collect();
        if !names.is_empty() {
            println!("  {:<14} {}", entity_type.label(), names.join(", "));
        }
    }
    println!(
        "{}  {}",
        style("Requests").bold(),
        style(archive.requests().len()).cyan()
    );
}
