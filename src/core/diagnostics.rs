//! Diagnostics for stored data that no longer parses

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// A bucket or config file whose contents failed to deserialize
#[derive(Debug, Error, Diagnostic)]
#[error("{name} could not be read: {message}")]
#[diagnostic(code(gestdoc::data::corrupt))]
pub struct CorruptData {
    name: String,

    #[source_code]
    src: NamedSource<String>,

    #[label("here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    message: String,
}

impl CorruptData {
    /// Build from a serde_json error; serde_json reports 1-based line/column
    pub fn from_json_error(err: &serde_json::Error, source: &str, name: &str) -> Self {
        let offset = line_col_to_offset(source, err.line(), err.column());
        let message = err.to_string();

        Self {
            name: name.to_string(),
            src: NamedSource::new(name, source.to_string()),
            span: SourceSpan::from(offset..offset.saturating_add(1).min(source.len().max(1))),
            help: generate_help(&message),
            message,
        }
    }

    /// Build from a serde_yml error (config files)
    pub fn from_yaml_error(err: &serde_yml::Error, source: &str, name: &str) -> Self {
        let (line, column) = err
            .location()
            .map(|loc| (loc.line(), loc.column()))
            .unwrap_or((1, 1));
        let offset = line_col_to_offset(source, line, column);
        let message = err.to_string();

        Self {
            name: name.to_string(),
            src: NamedSource::new(name, source.to_string()),
            span: SourceSpan::from(offset..offset.saturating_add(1).min(source.len().max(1))),
            help: generate_help(&message),
            message,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Convert a 1-based line/column to a byte offset, clamped to the source
fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    let mut offset = 0;
    for (idx, text) in source.split_inclusive('\n').enumerate() {
        if idx + 1 == line {
            let col = column.saturating_sub(1).min(text.len());
            return offset + col;
        }
        offset += text.len();
    }
    source.len().saturating_sub(1)
}

fn generate_help(message: &str) -> Option<String> {
    let msg_lower = message.to_lowercase();

    if msg_lower.contains("eof while parsing") {
        return Some("The file looks truncated. Restore it from a backup or remove it to start empty.".to_string());
    }

    if msg_lower.contains("unknown variant") {
        return Some("A type, status or treatment label is not recognised. Check the spelling.".to_string());
    }

    if msg_lower.contains("missing field") {
        return Some("A record is missing a required field.".to_string());
    }

    if msg_lower.contains("tab") {
        return Some("YAML requires spaces for indentation, not tabs.".to_string());
    }

    None
}
