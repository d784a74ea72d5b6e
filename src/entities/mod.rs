//! Record types: reference-data entities and custody requests

pub mod entity;
pub mod request;

pub use entity::{Entity, EntityType};
pub use request::{RequestDraft, RequestRecord, RequestStatus, Treatment};
