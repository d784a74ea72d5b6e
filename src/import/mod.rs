//! Import source reader
//!
//! Turns a file into `(name, extra)` rows for the Entity Store's bulk import.
//! Spreadsheets (`.xlsx`, `.xls`, `.xlsm`, `.ods`) are read from their first
//! sheet, column A = name and column B = extra. Anything else is read as
//! text: one row per non-blank line, fields split on `;` or `,`.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

use crate::store::entities::ImportRow;

/// Source format, decided from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Spreadsheet,
    Text,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => SourceKind::Spreadsheet,
            _ => SourceKind::Text,
        }
    }
}

/// The source could not be turned into rows. The store is never touched.
#[derive(Debug, Error, Diagnostic)]
pub enum ImportError {
    #[error("cannot read {path:?}: {source}")]
    #[diagnostic(code(gestdoc::import::unreadable))]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path:?} is not UTF-8 text")]
    #[diagnostic(
        code(gestdoc::import::encoding),
        help("Save the file as UTF-8, or import it as a spreadsheet (.xlsx).")
    )]
    NotText { path: PathBuf },

    #[error("cannot read spreadsheet {path:?}: {message}")]
    #[diagnostic(code(gestdoc::import::spreadsheet))]
    Spreadsheet { path: PathBuf, message: String },

    #[error("spreadsheet {path:?} has no sheets")]
    #[diagnostic(code(gestdoc::import::no_sheet))]
    NoSheet { path: PathBuf },
}

/// Read a source file into rows
pub fn read_rows(path: &Path) -> Result<Vec<ImportRow>, ImportError> {
    let rows = match SourceKind::from_path(path) {
        SourceKind::Spreadsheet => read_spreadsheet(path)?,
        SourceKind::Text => {
            let bytes = std::fs::read(path).map_err(|source| ImportError::Unreadable {
                path: path.to_path_buf(),
                source,
            })?;
            let content = String::from_utf8(bytes).map_err(|_| ImportError::NotText {
                path: path.to_path_buf(),
            })?;
            parse_text(&content)
        }
    };
    tracing::debug!(path = %path.display(), rows = rows.len(), "read import source");
    Ok(rows)
}

/// Split line-delimited text into rows
pub fn parse_text(content: &str) -> Vec<ImportRow> {
    content
        .trim_start_matches('\u{feff}')
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let mut parts = line.split([';', ',']);
            let name = parts.next().unwrap_or_default().trim().to_string();
            let extra = parts.next().map(|s| s.trim().to_string());
            ImportRow { name, extra }
        })
        .collect()
}

fn read_spreadsheet(path: &Path) -> Result<Vec<ImportRow>, ImportError> {
    use calamine::{open_workbook_auto, Reader};

    let mut workbook = open_workbook_auto(path).map_err(|e| ImportError::Spreadsheet {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ImportError::NoSheet {
            path: path.to_path_buf(),
        })?;

    let range = workbook
        .worksheet_range(&first)
        .map_err(|e| ImportError::Spreadsheet {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    Ok(range
        .rows()
        .filter_map(|row| {
            let name = row.first().map(cell_to_string).unwrap_or_default();
            if name.trim().is_empty() {
                return None;
            }
            let extra = row
                .get(1)
                .map(cell_to_string)
                .filter(|s| !s.trim().is_empty());
            Some(ImportRow { name, extra })
        })
        .collect())
}

fn cell_to_string(cell: &calamine::Data) -> String {
    use calamine::Data;
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(n) => n.to_string(),
        // Numbers typed into a cell (phones, box numbers) arrive as floats
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::Error(_) => String::new(),
        Data::DateTime(dt) => format!("{}", dt),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}
