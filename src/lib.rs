//! gestdoc: document custody requests and their reference data
//!
//! Keeps the requests an archive registers for each box it holds, and the
//! reference lists (warehouses, clients, sectors, requesters, ...) those
//! requests are filled from, as JSON buckets inside a project directory.

pub mod cli;
pub mod core;
pub mod entities;
pub mod import;
pub mod store;
