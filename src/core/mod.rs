//! Core module - fundamental types and utilities

pub mod config;
pub mod diagnostics;
pub mod identity;
pub mod project;
pub mod shortid;
pub mod storage;

pub use config::Config;
pub use diagnostics::CorruptData;
pub use identity::{IdParseError, IdPrefix, RecordId};
pub use project::{Project, ProjectError};
pub use shortid::ShortIdIndex;
pub use storage::{Bucket, FileStorage, MemoryStorage, Storage, StorageError};
