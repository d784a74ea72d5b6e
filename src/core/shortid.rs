//! Short ID system for easier entity selection
//!
//! List commands hand out numeric aliases like `@1`, `@2` for the ids they
//! print. The table is rewritten on every listing and kept in
//! `.gestdoc/shortids.json` so the next command can refer back to it.

use std::collections::HashMap;
use std::fs;

use crate::core::identity::RecordId;
use crate::core::project::Project;

/// Index file location within a project
const INDEX_FILE: &str = ".gestdoc/shortids.json";

/// A mapping of short IDs (@N) to full record IDs
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct ShortIdIndex {
    /// Maps short number to full entity ID string
    entries: HashMap<u32, String>,
    /// Maps full entity ID to short number (reverse lookup)
    #[serde(skip)]
    reverse: HashMap<String, u32>,
    /// Next available short ID
    next_id: u32,
}

impl ShortIdIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            reverse: HashMap::new(),
            next_id: 1,
        }
    }

    /// Load the index from a project, or create empty if not found
    pub fn load(project: &Project) -> Self {
        let path = project.root().join(INDEX_FILE);
        if path.exists() {
            if let Ok(content) = fs::read_to_string(&path) {
                if let Ok(mut index) = serde_json::from_str::<ShortIdIndex>(&content) {
                    // Rebuild reverse lookup
                    index.reverse = index.entries.iter()
                        .map(|(k, v)| (v.clone(), *k))
                        .collect();
                    return index;
                }
            }
        }
        Self::new()
    }

    /// Save the index to a project
    pub fn save(&self, project: &Project) -> std::io::Result<()> {
        let path = project.root().join(INDEX_FILE);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
    }

    /// Rebuild from `ids` and save, logging rather than failing on IO errors
    pub fn refresh<'a>(project: &Project, ids: impl IntoIterator<Item = &'a RecordId>) -> Self {
        let mut index = Self::new();
        index.rebuild(ids.into_iter().map(|id| id.to_string()));
        if let Err(e) = index.save(project) {
            tracing::warn!(error = %e, "could not save short id index");
        }
        index
    }

    /// Clear and rebuild the index with new entity IDs
    pub fn rebuild(&mut self, entity_ids: impl IntoIterator<Item = String>) {
        self.entries.clear();
        self.reverse.clear();
        self.next_id = 1;

        for id in entity_ids {
            self.add(id);
        }
    }

    /// Add an entity ID and return its short ID
    pub fn add(&mut self, entity_id: String) -> u32 {
        if let Some(&short_id) = self.reverse.get(&entity_id) {
            return short_id;
        }

        let short_id = self.next_id;
        self.next_id += 1;
        self.entries.insert(short_id, entity_id.clone());
        self.reverse.insert(entity_id, short_id);
        short_id
    }

    /// Resolve a short ID reference to a full entity ID
    ///
    /// Accepts `@N` (e.g. `@1`, `@42`); anything else is passed through,
    /// so bare numeric record ids keep meaning themselves.
    pub fn resolve(&self, reference: &str) -> Option<String> {
        // Check if it's a short ID reference
        let Some(num_str) = reference.strip_prefix('@') else {
            return Some(reference.to_string());
        };

        // Parse the number and look up
        num_str.parse::<u32>().ok()
            .and_then(|n| self.entries.get(&n).cloned())
    }

    /// Get the short ID for a full entity ID
    pub fn get_short_id(&self, entity_id: &str) -> Option<u32> {
        self.reverse.get(entity_id).copied()
    }

    /// `@N` for an id listed in this index
    pub fn alias(&self, id: &RecordId) -> Option<String> {
        self.reverse.get(id.as_str()).map(|n| format!("@{}", n))
    }

    /// Number of entries in the index
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse a reference that might be a short ID or a full record ID
pub fn parse_reference(reference: &str, project: &Project) -> RecordId {
    let index = ShortIdIndex::load(project);
    RecordId::from(
        index
            .resolve(reference)
            .unwrap_or_else(|| reference.to_string())
            .as_str(),
    )
}
