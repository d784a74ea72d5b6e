//! The archive: both stores plus the storage they are flushed to
//!
//! Every successful mutation is followed by a save of the bucket it touched.
//! A failed save never rolls the mutation back; it is handed to the caller
//! in [`Committed::persistence`] so it can be surfaced.

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use miette::Diagnostic;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::core::diagnostics::CorruptData;
use crate::core::identity::RecordId;
use crate::core::storage::{Bucket, Storage, StorageError};
use crate::entities::entity::{Entity, EntityType};
use crate::entities::request::{RequestDraft, RequestRecord, RequestStatus};
use crate::import::{self, ImportError};
use crate::store::dashboard::Dashboard;
use crate::store::entities::{EntityError, EntityStore, ImportResult, ImportRow};
use crate::store::requests::{RequestError, RequestStore};

/// Yes/no confirmation asked before destructive actions
pub trait Confirmation {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirmation for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// The result of a mutation that was applied in memory
#[derive(Debug)]
#[must_use = "a failed save must be surfaced"]
pub struct Committed<T> {
    pub value: T,
    /// Set when the follow-up save failed; the in-memory change stands
    pub persistence: Option<PersistenceError>,
}

impl<T> Committed<T> {
    fn saved(value: T) -> Self {
        Self {
            value,
            persistence: None,
        }
    }

    /// The value, or the save failure as an error
    pub fn persisted(self) -> Result<T, ArchiveError> {
        match self.persistence {
            None => Ok(self.value),
            Some(err) => Err(err.into()),
        }
    }
}

/// A destructive action's outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The confirmation was declined; nothing changed
    Cancelled,
    /// Confirmed; this many records were removed (possibly zero)
    Deleted(usize),
}

/// A mutation succeeded but its bucket could not be written
#[derive(Debug, Error, Diagnostic)]
#[error("the change was applied but {bucket} could not be saved")]
#[diagnostic(
    code(gestdoc::persistence),
    help("The change is lost once this session ends. Free up space or fix permissions and repeat it.")
)]
pub struct PersistenceError {
    pub bucket: Bucket,
    #[source]
    #[diagnostic_source]
    pub source: StorageError,
}

/// Errors raised by archive operations
#[derive(Debug, Error, Diagnostic)]
pub enum ArchiveError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Entity(#[from] EntityError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Corrupt(#[from] CorruptData),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Entity and Request stores backed by durable storage
#[derive(Debug)]
pub struct Archive<S: Storage> {
    storage: S,
    entities: EntityStore,
    requests: RequestStore,
}

impl<S: Storage> Archive<S> {
    /// Load both buckets. A missing entities bucket starts from the seed set,
    /// a missing requests bucket starts empty.
    pub fn open(storage: S) -> Result<Self, ArchiveError> {
        let entities = match load_bucket::<Entity>(&storage, Bucket::Entities)? {
            Some(list) => EntityStore::from_entities(list),
            None => {
                tracing::debug!("no entities stored yet, using seed set");
                EntityStore::seeded()
            }
        };
        let requests = load_bucket::<RequestRecord>(&storage, Bucket::Requests)?
            .map(RequestStore::from_records)
            .unwrap_or_default();

        Ok(Self {
            storage,
            entities,
            requests,
        })
    }

    pub fn entities(&self) -> &EntityStore {
        &self.entities
    }

    pub fn requests(&self) -> &RequestStore {
        &self.requests
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard::from_store(&self.requests)
    }

    // ---- entities -------------------------------------------------------

    pub fn add_entity(
        &mut self,
        entity_type: EntityType,
        name: &str,
        parent_id: Option<RecordId>,
        phone: Option<&str>,
    ) -> Result<Committed<Entity>, ArchiveError> {
        let entity = self
            .entities
            .add(entity_type, name, parent_id, phone)?
            .clone();
        tracing::info!(id = %entity.id, entity_type = %entity_type, name = %entity.name, "entity added");
        Ok(self.commit(Bucket::Entities, entity))
    }

    /// Bulk import already-read rows
    pub fn import_entities(
        &mut self,
        entity_type: EntityType,
        rows: &[ImportRow],
        parent_id: Option<RecordId>,
    ) -> Result<Committed<ImportResult>, ArchiveError> {
        let result = self.entities.bulk_import(entity_type, rows, parent_id)?;
        tracing::info!(
            entity_type = %entity_type,
            inserted = result.inserted,
            skipped = result.skipped,
            "entities imported"
        );
        if result.inserted == 0 {
            return Ok(Committed::saved(result));
        }
        Ok(self.commit(Bucket::Entities, result))
    }

    /// Read `path` and bulk import its rows; an unreadable source leaves
    /// the store untouched
    pub fn import_file(
        &mut self,
        entity_type: EntityType,
        path: &Path,
        parent_id: Option<RecordId>,
    ) -> Result<Committed<ImportResult>, ArchiveError> {
        let rows = import::read_rows(path)?;
        self.import_entities(entity_type, &rows, parent_id)
    }

    /// Remove a set of entities after confirmation.
    ///
    /// Only ids present in the store are counted in the prompt; when none
    /// are present nothing is asked and nothing is removed.
    pub fn delete_entities(
        &mut self,
        ids: &HashSet<RecordId>,
        confirm: &dyn Confirmation,
    ) -> Result<Committed<DeleteOutcome>, ArchiveError> {
        let present = ids
            .iter()
            .filter(|id| self.entities.get(id).is_some())
            .count();
        if present == 0 {
            return Ok(Committed::saved(DeleteOutcome::Deleted(0)));
        }
        let prompt = format!("Permanently delete the {} selected record(s)?", present);
        if !confirm.confirm(&prompt) {
            tracing::warn!(count = present, "entity deletion cancelled");
            return Ok(Committed::saved(DeleteOutcome::Cancelled));
        }

        let removed = self.entities.delete(ids);
        tracing::info!(removed, "entities deleted");
        Ok(self.commit(Bucket::Entities, DeleteOutcome::Deleted(removed)))
    }

    // ---- requests -------------------------------------------------------

    pub fn create_request(
        &mut self,
        draft: RequestDraft,
    ) -> Result<Committed<RequestRecord>, ArchiveError> {
        self.create_request_at(draft, Utc::now())
    }

    /// Register a request as of `now`
    pub fn create_request_at(
        &mut self,
        draft: RequestDraft,
        now: DateTime<Utc>,
    ) -> Result<Committed<RequestRecord>, ArchiveError> {
        let record = self.requests.create(draft, now)?.clone();
        tracing::info!(id = %record.id, caixa = %record.caixa, dias = record.dias, "request created");
        Ok(self.commit(Bucket::Requests, record))
    }

    /// Remove one request after confirmation; an unknown id removes nothing
    pub fn delete_request(
        &mut self,
        id: &RecordId,
        confirm: &dyn Confirmation,
    ) -> Result<Committed<DeleteOutcome>, ArchiveError> {
        if !confirm.confirm("Delete this request? This cannot be undone.") {
            tracing::warn!(id = %id, "request deletion cancelled");
            return Ok(Committed::saved(DeleteOutcome::Cancelled));
        }
        if !self.requests.delete(id) {
            return Ok(Committed::saved(DeleteOutcome::Deleted(0)));
        }
        tracing::info!(id = %id, "request deleted");
        Ok(self.commit(Bucket::Requests, DeleteOutcome::Deleted(1)))
    }

    /// Set a request's status; returns whether the request exists
    pub fn update_request_status(
        &mut self,
        id: &RecordId,
        status: RequestStatus,
    ) -> Result<Committed<bool>, ArchiveError> {
        if !self.requests.update_status(id, status) {
            return Ok(Committed::saved(false));
        }
        tracing::info!(id = %id, status = %status, "request status updated");
        Ok(self.commit(Bucket::Requests, true))
    }

    // ---- persistence ----------------------------------------------------

    fn commit<T>(&mut self, bucket: Bucket, value: T) -> Committed<T> {
        let persistence = self.save(bucket).err();
        if let Some(err) = &persistence {
            tracing::warn!(bucket = %bucket, error = %err.source, "save failed, change held in memory only");
        }
        Committed { value, persistence }
    }

    /// Write one bucket from the in-memory state
    pub fn save(&mut self, bucket: Bucket) -> Result<(), PersistenceError> {
        let encoded = match bucket {
            Bucket::Entities => serde_json::to_string_pretty(self.entities.all()),
            Bucket::Requests => serde_json::to_string_pretty(self.requests.all()),
        }
        .map_err(|source| PersistenceError {
            bucket,
            source: StorageError::Encode { bucket, source },
        })?;

        self.storage
            .save(bucket, &encoded)
            .map_err(|source| PersistenceError { bucket, source })
    }
}

fn load_bucket<T: DeserializeOwned>(
    storage: &impl Storage,
    bucket: Bucket,
) -> Result<Option<Vec<T>>, ArchiveError> {
    let Some(contents) = storage.load(bucket)? else {
        return Ok(None);
    };
    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|e| CorruptData::from_json_error(&e, &contents, &bucket.file_name()).into())
}
