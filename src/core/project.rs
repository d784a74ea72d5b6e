//! Project discovery and structure

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

use crate::core::storage::FileStorage;

/// Name of the project marker directory
pub const PROJECT_DIR: &str = ".gestdoc";

/// Represents a gestdoc project
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of .gestdoc/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                tracing::debug!(root = %current.display(), "project found");
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project structure at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if root.join(PROJECT_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }
        Self::create(root)
    }

    /// Initialize even if .gestdoc/ exists. Stored data is left alone,
    /// only the config file is rewritten.
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::create(root)
    }

    fn create(root: PathBuf) -> Result<Self, ProjectError> {
        let project = Self { root };
        std::fs::create_dir_all(project.data_dir())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::write(project.config_path(), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        tracing::info!(root = %project.root.display(), "project initialized");
        Ok(project)
    }

    fn default_config() -> &'static str {
        r#"# gestdoc project configuration

# Default operator for new requests (can be overridden by GESTDOC_OPERATOR)
# operator: ""

# Default output format (auto, tsv, json, yaml, csv, md, id)
# default_format: auto

# Country prefix shown in front of contact phone numbers
# phone_prefix: "+244"
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .gestdoc directory
    pub fn gestdoc_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Directory holding one JSON file per bucket
    pub fn data_dir(&self) -> PathBuf {
        self.gestdoc_dir().join("data")
    }

    pub fn config_path(&self) -> PathBuf {
        self.gestdoc_dir().join("config.yaml")
    }

    /// File-backed storage rooted at the data directory
    pub fn storage(&self) -> FileStorage {
        FileStorage::new(self.data_dir())
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error, Diagnostic)]
pub enum ProjectError {
    #[error("not a gestdoc project (searched from {searched_from:?})")]
    #[diagnostic(
        code(gestdoc::project::not_found),
        help("Run 'gestdoc init' to create one, or pass --project <DIR>.")
    )]
    NotFound { searched_from: PathBuf },

    #[error("gestdoc project already exists at {0:?}")]
    #[diagnostic(code(gestdoc::project::exists), help("Use --force to rewrite its config."))]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    #[diagnostic(code(gestdoc::project::io))]
    IoError(String),
}
