//! Cascading sector → requester selection for the request form

use crate::entities::entity::{Entity, EntityType};
use crate::store::entities::EntityStore;

/// Requesters whose sector is the sector named exactly `sector_name`.
///
/// The lookup is by exact name, unlike the case-insensitive duplicate check
/// of the Entity Store. An unknown or empty sector yields no requesters.
pub fn eligible_requesters<'a>(store: &'a EntityStore, sector_name: &str) -> Vec<&'a Entity> {
    if sector_name.is_empty() {
        return Vec::new();
    }
    let Some(sector) = store
        .query(EntityType::Sector, None)
        .find(|s| s.name == sector_name)
    else {
        return Vec::new();
    };
    store
        .query(EntityType::Requester, Some(&sector.id))
        .collect()
}

/// Form state for the two dependent choices
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadingSelection {
    sector: Option<String>,
    requester: Option<String>,
}

impl CascadingSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sector(&self) -> Option<&str> {
        self.sector.as_deref()
    }

    pub fn requester(&self) -> Option<&str> {
        self.requester.as_deref()
    }

    /// Choose a sector (or none). Any chosen requester is cleared.
    pub fn select_sector(&mut self, sector: Option<&str>) {
        self.sector = sector.filter(|s| !s.is_empty()).map(str::to_string);
        self.requester = None;
    }

    /// Requester choice is only possible once a sector is chosen
    pub fn requester_enabled(&self) -> bool {
        self.sector.is_some()
    }

    /// Options for the requester choice under the current sector
    pub fn requester_options<'a>(&self, store: &'a EntityStore) -> Vec<&'a Entity> {
        match &self.sector {
            Some(sector) => eligible_requesters(store, sector),
            None => Vec::new(),
        }
    }

    /// Choose a requester by name; refused unless it is among the current options
    pub fn select_requester(&mut self, store: &EntityStore, name: &str) -> bool {
        let eligible = self
            .requester_options(store)
            .iter()
            .any(|e| e.name == name);
        if eligible {
            self.requester = Some(name.to_string());
        }
        eligible
    }
}
