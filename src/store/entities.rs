//! Entity Store: reference data with per-type case-insensitive unique names

use std::collections::HashSet;

use miette::Diagnostic;
use thiserror::Error;

use crate::core::identity::RecordId;
use crate::entities::entity::{digits_only, Entity, EntityType};

/// One row read from an import source
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportRow {
    /// Column 0
    pub name: String,
    /// Column 1, if present
    pub extra: Option<String>,
}

impl ImportRow {
    pub fn new(name: impl Into<String>, extra: Option<&str>) -> Self {
        Self {
            name: name.into(),
            extra: extra.map(str::to_string),
        }
    }
}

/// Outcome of a bulk import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportResult {
    /// Rows appended to the store
    pub inserted: usize,
    /// Rows dropped because the name already existed or was empty
    pub skipped: usize,
}

/// Rejections raised by Entity Store mutations
#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum EntityError {
    #[error("{entity_type} name must not be empty")]
    #[diagnostic(code(gestdoc::entity::empty_name))]
    EmptyName { entity_type: EntityType },

    #[error("a {entity_type} named '{name}' already exists")]
    #[diagnostic(
        code(gestdoc::entity::duplicate_name),
        help("Names are compared case-insensitively within each type.")
    )]
    DuplicateName { entity_type: EntityType, name: String },

    #[error("a requester needs a sector")]
    #[diagnostic(
        code(gestdoc::entity::missing_parent),
        help("Pass --sector with the name or id of the requester's sector.")
    )]
    MissingParent,
}

/// Flat collection of reference entities, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityStore {
    entities: Vec<Entity>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entities(entities: Vec<Entity>) -> Self {
        Self { entities }
    }

    /// The fixed default set used when no entities were ever stored
    pub fn seeded() -> Self {
        Self::from_entities(vec![
            Entity::seed("1", "Armazém Central", EntityType::Warehouse),
            Entity::seed("2", "Financeiro", EntityType::Sector),
            Entity::seed("3", "João Silva", EntityType::Operator),
        ])
    }

    pub fn all(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, id: &RecordId) -> Option<&Entity> {
        self.entities.iter().find(|e| &e.id == id)
    }

    /// Whether an entity of `entity_type` already uses `name` (case-insensitive, trimmed)
    pub fn contains_name(&self, entity_type: EntityType, name: &str) -> bool {
        self.entities
            .iter()
            .any(|e| e.entity_type == entity_type && e.has_name(name))
    }

    /// Add one entity.
    ///
    /// Checks run in order: empty name, duplicate name, missing sector for a
    /// requester. The parent id is not checked against existing sectors.
    pub fn add(
        &mut self,
        entity_type: EntityType,
        name: &str,
        parent_id: Option<RecordId>,
        phone: Option<&str>,
    ) -> Result<&Entity, EntityError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EntityError::EmptyName { entity_type });
        }
        if self.contains_name(entity_type, name) {
            return Err(EntityError::DuplicateName {
                entity_type,
                name: name.to_string(),
            });
        }
        if entity_type == EntityType::Requester && parent_id.is_none() {
            return Err(EntityError::MissingParent);
        }

        self.entities
            .push(Entity::new(entity_type, name.to_string(), parent_id, phone));
        Ok(&self.entities[self.entities.len() - 1])
    }

    /// Append every row whose name is new to `entity_type`.
    ///
    /// Names are checked against the store as it was before the import
    /// started, so two equal new names in one batch are both inserted.
    /// Requesters all receive `parent_id`; contacts take their phone from
    /// `extra`, or from the digits of the name when `extra` is empty.
    pub fn bulk_import(
        &mut self,
        entity_type: EntityType,
        rows: &[ImportRow],
        parent_id: Option<RecordId>,
    ) -> Result<ImportResult, EntityError> {
        if entity_type == EntityType::Requester && parent_id.is_none() {
            return Err(EntityError::MissingParent);
        }

        let existing: HashSet<String> = self
            .query(entity_type, None)
            .map(|e| e.name.to_lowercase())
            .collect();

        let mut result = ImportResult::default();
        let mut fresh = Vec::new();

        for row in rows {
            let name = row.name.trim();
            if name.is_empty() || existing.contains(&name.to_lowercase()) {
                result.skipped += 1;
                continue;
            }

            let phone = match entity_type {
                EntityType::Contact => {
                    let extra = row.extra.as_deref().map(str::trim).unwrap_or_default();
                    if extra.is_empty() {
                        Some(digits_only(name))
                    } else {
                        Some(extra.to_string())
                    }
                }
                _ => None,
            };

            fresh.push(Entity::new(
                entity_type,
                name.to_string(),
                parent_id.clone(),
                phone.as_deref(),
            ));
        }

        result.inserted = fresh.len();
        self.entities.extend(fresh);
        Ok(result)
    }

    /// Remove every entity whose id is in `ids`; returns how many were removed.
    ///
    /// Nothing cascades: requesters of a removed sector keep their dangling
    /// `parent_id`.
    pub fn delete(&mut self, ids: &HashSet<RecordId>) -> usize {
        let before = self.entities.len();
        self.entities.retain(|e| !ids.contains(&e.id));
        before - self.entities.len()
    }

    /// Entities of `entity_type`, optionally restricted to one parent, in store order
    ///
    /// The returned entities borrow the store only, never `parent_id`.
    pub fn query<'a, 'p>(
        &'a self,
        entity_type: EntityType,
        parent_id: Option<&'p RecordId>,
    ) -> impl Iterator<Item = &'a Entity> + 'p
    where
        'a: 'p,
    {
        self.entities.iter().filter(move |e| {
            e.entity_type == entity_type
                && parent_id.map_or(true, |p| e.parent_id.as_ref() == Some(p))
        })
    }

    /// Name of a requester's sector, or `None` when it has none or it dangles
    pub fn parent_name(&self, entity: &Entity) -> Option<&str> {
        let parent = entity.parent_id.as_ref()?;
        self.entities
            .iter()
            .find(|e| &e.id == parent && e.entity_type == EntityType::Sector)
            .map(|e| e.name.as_str())
    }

    /// Resolve a user reference (id or exact name) to an entity of `entity_type`
    pub fn resolve(&self, entity_type: EntityType, reference: &str) -> Option<&Entity> {
        let reference = reference.trim();
        self.query(entity_type, None)
            .find(|e| e.id.as_str() == reference)
            .or_else(|| self.query(entity_type, None).find(|e| e.name == reference))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sector_id() -> RecordId {
        RecordId::from("2")
    }

    #[test]
    fn test_seeded_store() {
        let store = EntityStore::seeded();
        assert_eq!(store.len(), 3);
        let sectors: Vec<_> = store.query(EntityType::Sector, None).collect();
        assert_eq!(sectors.len(), 1);
        assert_eq!(sectors[0].name, "Financeiro");
        assert_eq!(sectors[0].id.as_str(), "2");
    }

    #[test]
    fn test_add_requester_then_case_duplicate_rejected() {
        let mut store = EntityStore::seeded();
        store
            .add(EntityType::Requester, "Ana", Some(sector_id()), None)
            .unwrap();

        let err = store
            .add(EntityType::Requester, "ana", Some(sector_id()), None)
            .unwrap_err();
        assert!(matches!(err, EntityError::DuplicateName { .. }));
        assert_eq!(store.query(EntityType::Requester, None).count(), 1);
    }

    #[test]
    fn test_same_name_allowed_across_types() {
        let mut store = EntityStore::seeded();
        store.add(EntityType::Client, "Financeiro", None, None).unwrap();
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_add_trims_and_rejects_empty() {
        let mut store = EntityStore::new();
        let e = store.add(EntityType::Client, "  BAI  ", None, None).unwrap();
        assert_eq!(e.name, "BAI");

        let err = store.add(EntityType::Client, "   ", None, None).unwrap_err();
        assert_eq!(err, EntityError::EmptyName { entity_type: EntityType::Client });

        let err = store.add(EntityType::Client, " bai", None, None).unwrap_err();
        assert!(matches!(err, EntityError::DuplicateName { .. }));
    }

    #[test]
    fn test_requester_without_parent_rejected() {
        let mut store = EntityStore::seeded();
        let err = store.add(EntityType::Requester, "Rui", None, None).unwrap_err();
        assert_eq!(err, EntityError::MissingParent);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_duplicate_checked_before_missing_parent() {
        let mut store = EntityStore::seeded();
        store.add(EntityType::Requester, "Ana", Some(sector_id()), None).unwrap();
        let err = store.add(EntityType::Requester, "ANA", None, None).unwrap_err();
        assert!(matches!(err, EntityError::DuplicateName { .. }));
    }

    #[test]
    fn test_bulk_import_contacts_phone_from_extra() {
        let mut store = EntityStore::new();
        let rows = vec![
            ImportRow::new("Carlos", Some("923111222")),
            ImportRow::new("Ana", Some("923333444")),
        ];
        let result = store.bulk_import(EntityType::Contact, &rows, None).unwrap();
        assert_eq!(result.inserted, 2);

        let contacts: Vec<_> = store.query(EntityType::Contact, None).collect();
        assert_eq!(contacts[0].name, "Carlos");
        assert_eq!(contacts[0].phone.as_deref(), Some("923111222"));
        assert_eq!(contacts[1].phone.as_deref(), Some("923333444"));
    }

    #[test]
    fn test_bulk_import_contact_phone_from_name_digits() {
        let mut store = EntityStore::new();
        let rows = vec![ImportRow::new("Rui 923 444 555", None), ImportRow::new("Eva", Some(" "))];
        store.bulk_import(EntityType::Contact, &rows, None).unwrap();

        let contacts: Vec<_> = store.query(EntityType::Contact, None).collect();
        assert_eq!(contacts[0].phone.as_deref(), Some("923444555"));
        // No digits anywhere: no phone
        assert_eq!(contacts[1].phone, None);
    }

    #[test]
    fn test_bulk_import_skips_existing_names() {
        let mut store = EntityStore::seeded();
        let rows = vec![
            ImportRow::new("FINANCEIRO", None),
            ImportRow::new("Recursos Humanos", None),
            ImportRow::new("   ", None),
        ];
        let result = store.bulk_import(EntityType::Sector, &rows, None).unwrap();
        assert_eq!(result, ImportResult { inserted: 1, skipped: 2 });
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_bulk_import_checks_against_snapshot_only() {
        let mut store = EntityStore::new();
        let rows = vec![ImportRow::new("Cais 1", None), ImportRow::new("cais 1", None)];
        let result = store.bulk_import(EntityType::Warehouse, &rows, None).unwrap();
        assert_eq!(result.inserted, 2);
    }

    #[test]
    fn test_bulk_import_nothing_new_leaves_store_size() {
        let mut store = EntityStore::seeded();
        let before = store.clone();
        let rows = vec![ImportRow::new("Armazém Central", None)];
        let result = store.bulk_import(EntityType::Warehouse, &rows, None).unwrap();
        assert_eq!(result.inserted, 0);
        assert_eq!(store, before);
    }

    #[test]
    fn test_bulk_import_requesters_share_parent() {
        let mut store = EntityStore::seeded();
        store.add(EntityType::Sector, "RH", None, None).unwrap();
        store.add(EntityType::Requester, "Zé", Some(sector_id()), None).unwrap();

        let rows = vec![ImportRow::new("Ana", None), ImportRow::new("Rui", None)];
        store
            .bulk_import(EntityType::Requester, &rows, Some(sector_id()))
            .unwrap();

        let names: Vec<_> = store
            .query(EntityType::Requester, Some(&sector_id()))
            .map(|e| e.name.as_str())
            .collect();
        // Imported rows come after pre-existing ones, in import order
        assert_eq!(names, vec!["Zé", "Ana", "Rui"]);
    }

    #[test]
    fn test_query_results_outlive_parent_filter() {
        let mut store = EntityStore::seeded();
        store.add(EntityType::Requester, "Ana", Some(sector_id()), None).unwrap();

        let found: Vec<&Entity> = {
            let parent = sector_id();
            store.query(EntityType::Requester, Some(&parent)).collect()
        };
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Ana");
    }

    #[test]
    fn test_bulk_import_requesters_need_parent() {
        let mut store = EntityStore::seeded();
        let rows = vec![ImportRow::new("Ana", None)];
        let err = store.bulk_import(EntityType::Requester, &rows, None).unwrap_err();
        assert_eq!(err, EntityError::MissingParent);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_delete_leaves_dangling_requesters() {
        let mut store = EntityStore::seeded();
        store.add(EntityType::Requester, "Ana", Some(sector_id()), None).unwrap();

        let removed = store.delete(&HashSet::from([sector_id(), RecordId::from("missing")]));
        assert_eq!(removed, 1);

        let ana = store.query(EntityType::Requester, None).next().unwrap();
        assert_eq!(ana.parent_id, Some(sector_id()));
        assert_eq!(store.parent_name(ana), None);
    }

    #[test]
    fn test_parent_name_resolves() {
        let mut store = EntityStore::seeded();
        let ana = store
            .add(EntityType::Requester, "Ana", Some(sector_id()), None)
            .unwrap()
            .clone();
        assert_eq!(store.parent_name(&ana), Some("Financeiro"));
    }

    #[test]
    fn test_resolve_by_id_or_exact_name() {
        let store = EntityStore::seeded();
        assert_eq!(store.resolve(EntityType::Sector, "2").unwrap().name, "Financeiro");
        assert_eq!(store.resolve(EntityType::Sector, "Financeiro").unwrap().id.as_str(), "2");
        assert!(store.resolve(EntityType::Sector, "financeiro").is_none());
        assert!(store.resolve(EntityType::Warehouse, "2").is_none());
    }
}
