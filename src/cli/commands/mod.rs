//! CLI command implementations

pub mod completions;
pub mod config;
pub mod entity;
pub mod init;
pub mod request;
pub mod status;
