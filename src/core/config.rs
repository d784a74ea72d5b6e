//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::Project;

/// Country prefix used when none is configured
pub const DEFAULT_PHONE_PREFIX: &str = "+244";

/// Every recognised key with a one-line description
pub const KEYS: &[(&str, &str)] = &[
    ("operator", "Default operator recorded on new requests"),
    ("default_format", "Default output format (auto, tsv, json, yaml, csv, md, id)"),
    ("phone_prefix", "Country prefix shown before contact phone numbers"),
];

/// gestdoc configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Default operator for new requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,

    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_format: Option<String>,

    /// Country prefix for contact phones
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_prefix: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load_for(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // Global user config (~/.config/gestdoc/config.yaml)
        if let Some(global) = Self::global_config_path().and_then(|p| Self::read_file(&p)) {
            config.merge(global);
        }

        // Project config (.gestdoc/config.yaml)
        if let Some(local) = project.and_then(|p| Self::read_file(&p.config_path())) {
            config.merge(local);
        }

        config.merge(Self::from_env());
        config
    }

    /// Parse one config file; missing or malformed files contribute nothing
    fn read_file(path: &Path) -> Option<Config> {
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Option<Config>>(&contents) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config file");
                None
            }
        }
    }

    fn from_env() -> Config {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Config {
            operator: var("GESTDOC_OPERATOR"),
            default_format: var("GESTDOC_FORMAT"),
            phone_prefix: var("GESTDOC_PHONE_PREFIX"),
        }
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "gestdoc")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Config) {
        if other.operator.is_some() {
            self.operator = other.operator;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.phone_prefix.is_some() {
            self.phone_prefix = other.phone_prefix;
        }
    }

    /// Value of a key by name, if set
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "operator" => self.operator.as_deref(),
            "default_format" => self.default_format.as_deref(),
            "phone_prefix" => self.phone_prefix.as_deref(),
            _ => None,
        }
    }

    pub fn is_known_key(key: &str) -> bool {
        KEYS.iter().any(|(k, _)| *k == key)
    }

    /// Operator for new requests, empty when unset
    pub fn operator(&self) -> String {
        self.operator.clone().unwrap_or_default()
    }

    pub fn phone_prefix(&self) -> &str {
        self.phone_prefix.as_deref().unwrap_or(DEFAULT_PHONE_PREFIX)
    }
}
