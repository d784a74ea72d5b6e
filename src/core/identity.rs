//! Record identity: opaque ids, generated as type-prefixed ULIDs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ulid::Ulid;

/// Prefixes used when generating new ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdPrefix {
    /// Reference-data entity (sector, warehouse, requester, ...)
    Ent,
    /// Custody request ("solicitação")
    Sol,
}

impl IdPrefix {
    /// Get the string representation of the prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            IdPrefix::Ent => "ENT",
            IdPrefix::Sol => "SOL",
        }
    }
}

impl fmt::Display for IdPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An opaque record identifier.
///
/// Freshly generated ids look like `ENT-01J...`, but any non-empty string is
/// a valid id: buckets written by older tools carry ids such as `"2"` or
/// `"imp_k3j9x0a1b"`, and those must keep resolving.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(String);

impl RecordId {
    /// Generate a new id with the given prefix
    pub fn new(prefix: IdPrefix) -> Self {
        Self(format!("{}-{}", prefix, Ulid::new()))
    }

    /// Parse an id from user input
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        s.parse()
    }

    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The generation prefix, if this id was generated by this tool
    pub fn prefix(&self) -> Option<IdPrefix> {
        let (prefix, rest) = self.0.split_once('-')?;
        if Ulid::from_string(rest).is_err() {
            return None;
        }
        match prefix {
            "ENT" => Some(IdPrefix::Ent),
            "SOL" => Some(IdPrefix::Sol),
            _ => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RecordId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(IdParseError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Serialize for RecordId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when parsing record IDs
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdParseError {
    #[error("record id must not be empty")]
    Empty,
}
