//! Shared helper functions for CLI commands

use clap::ValueEnum;
use console::style;
use miette::{Diagnostic, Result};
use thiserror::Error;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;
use crate::core::project::Project;
use crate::core::storage::FileStorage;
use crate::store::{Archive, Committed, Confirmation};

/// Rejections raised by the request and entity forms before the stores
/// are touched
#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum FormError {
    #[error("no sector named '{name}'")]
    #[diagnostic(
        code(gestdoc::form::unknown_sector),
        help("Sector names are matched exactly. List them with 'gestdoc entity list --type sector'.")
    )]
    UnknownSector { name: String },

    #[error("'{requester}' is not a requester of sector '{sector}'")]
    #[diagnostic(
        code(gestdoc::form::ineligible_requester),
        help("List the sector's requesters with 'gestdoc entity requesters --sector <NAME>'.")
    )]
    IneligibleRequester { requester: String, sector: String },

    #[error("sector '{sector}' has no requesters")]
    #[diagnostic(
        code(gestdoc::form::no_requesters),
        help("Add one with 'gestdoc entity add requester <NAME> --sector <SECTOR>'.")
    )]
    NoRequesters { sector: String },

    #[error("no {what} registered")]
    #[diagnostic(code(gestdoc::form::empty_list))]
    EmptyChoice { what: &'static str },
}

/// Project selected by `--project`, or discovered from the current directory
pub fn open_project(global: &GlobalOpts) -> Result<Project> {
    let project = match &global.project {
        Some(path) => Project::discover_from(path)?,
        None => Project::discover()?,
    };
    Ok(project)
}

/// Open the project's archive along with its layered configuration
pub fn open_archive(global: &GlobalOpts) -> Result<(Project, Config, Archive<FileStorage>)> {
    let project = open_project(global)?;
    let config = Config::load_for(Some(&project));
    let archive = Archive::open(project.storage())?;
    Ok((project, config, archive))
}

/// `--format`, falling back to the configured default when left at auto
pub fn effective_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    if global.format != OutputFormat::Auto {
        return global.format;
    }
    config
        .default_format
        .as_deref()
        .and_then(|f| OutputFormat::from_str(f, true).ok())
        .unwrap_or(OutputFormat::Auto)
}

/// Surface a failed save as an error after the change was applied
pub fn finish<T>(committed: Committed<T>) -> Result<T> {
    Ok(committed.persisted()?)
}

/// Confirmation backed by an interactive yes/no prompt.
///
/// With `assume_yes` every prompt is accepted. Without a terminal the
/// prompt cannot be answered and counts as declined.
pub struct PromptConfirmation {
    pub assume_yes: bool,
}

impl Confirmation for PromptConfirmation {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

/// Print the standard notice for a declined confirmation
pub fn print_cancelled() {
    println!(
        "{} Cancelled, nothing was deleted. Pass --yes to skip the prompt.",
        style("!").yellow()
    );
}

/// Contact phone with the country prefix in front
pub fn format_phone(prefix: &str, phone: &str) -> String {
    format!("{} {}", prefix, phone)
}

/// Truncate a string to `max_len` characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
