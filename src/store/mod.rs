//! Stores and the operations that mutate and aggregate them

pub mod archive;
pub mod dashboard;
pub mod entities;
pub mod requests;
pub mod selection;

pub use archive::{Archive, ArchiveError, Committed, Confirmation, DeleteOutcome, PersistenceError};
pub use dashboard::Dashboard;
pub use entities::{EntityError, EntityStore, ImportResult, ImportRow};
pub use requests::{elapsed_days, RequestError, RequestStore, RequiredField};
pub use selection::{eligible_requesters, CascadingSelection};
