//! Table formatting for list commands
//!
//! Rows are built once from typed cells and rendered as aligned TSV for
//! terminals, CSV through the `csv` writer, Markdown through `tabled`, or a
//! bare id list.

use chrono::NaiveDate;
use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::truncate_str;
use crate::cli::OutputFormat;
use crate::core::identity::RecordId;
use crate::core::shortid::ShortIdIndex;
use crate::entities::request::RequestStatus;

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Plain text, truncated to the column width in TSV
    Text(String),
    /// Entity type or treatment
    Type(String),
    /// Request status with color coding
    Status(RequestStatus),
    /// Calendar date
    Date(NaiveDate),
    /// Right-aligned count
    Number(i64),
    /// Placeholder shown as "-"
    Empty,
}

impl CellValue {
    /// Format for TSV output (with colors if terminal)
    pub fn format_tsv(&self, width: usize) -> String {
        match self {
            CellValue::Text(s) | CellValue::Type(s) => {
                format!("{:<width$}", truncate_str(s, width), width = width)
            }
            CellValue::Status(status) => {
                let s = status.label();
                let styled = match status {
                    RequestStatus::InProgress => style(s).yellow(),
                    RequestStatus::Finished => style(s).green(),
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Date(d) => format!("{:<width$}", d.format("%Y-%m-%d"), width = width),
            CellValue::Number(n) => format!("{:>width$}", n, width = width),
            CellValue::Empty => format!("{:<width$}", "-", width = width),
        }
    }

    /// Get raw string value (no formatting)
    pub fn raw(&self) -> String {
        match self {
            CellValue::Text(s) | CellValue::Type(s) => s.clone(),
            CellValue::Status(status) => status.label().to_string(),
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Empty => String::new(),
        }
    }

    /// Content width, used to size TSV columns
    pub fn display_width(&self) -> usize {
        match self {
            CellValue::Date(_) => 10,
            CellValue::Empty => 1,
            other => other.raw().chars().count(),
        }
    }
}

/// Column definition with header label and maximum width
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

/// A row of cell values for table output
pub struct TableRow {
    pub short_id: String,
    pub full_id: String,
    pub cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(id: &RecordId, short_ids: &ShortIdIndex) -> Self {
        Self {
            short_id: short_ids.alias(id).unwrap_or_default(),
            full_id: id.to_string(),
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.push((key, value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    fn raw(&self, key: &str) -> String {
        self.get(key).map(CellValue::raw).unwrap_or_default()
    }
}

/// Table formatter that outputs rows in various formats
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    noun: &'static str,
    show_summary: bool,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], noun: &'static str) -> Self {
        Self {
            columns,
            noun,
            show_summary: true,
        }
    }

    /// Drop the trailing "N found" line
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.show_summary = !quiet;
        self
    }

    /// Output rows in the specified list format
    pub fn output(&self, rows: &[TableRow], format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Csv => self.output_csv(rows),
            OutputFormat::Md => {
                print!("{}", self.render_md(rows));
                Ok(())
            }
            OutputFormat::Id => {
                for row in rows {
                    println!("{}", row.full_id);
                }
                Ok(())
            }
            _ => {
                self.output_tsv(rows);
                Ok(())
            }
        }
    }

    /// Calculate column widths from content, capped at each column's width
    fn calculate_widths(&self, rows: &[TableRow]) -> Vec<usize> {
        let short_width = rows
            .iter()
            .map(|r| r.short_id.len())
            .max()
            .unwrap_or(0)
            .max(5);

        let mut widths = vec![short_width];
        for col in self.columns {
            let content = rows
                .iter()
                .filter_map(|r| r.get(col.key))
                .map(CellValue::display_width)
                .max()
                .unwrap_or(0);
            widths.push(col.header.len().max(content).min(col.width));
        }
        widths
    }

    fn output_tsv(&self, rows: &[TableRow]) {
        let widths = self.calculate_widths(rows);

        let mut header = vec![format!(
            "{:<width$}",
            style("SHORT").bold().dim(),
            width = widths[0]
        )];
        for (col, w) in self.columns.iter().zip(&widths[1..]) {
            header.push(format!("{:<width$}", style(col.header).bold(), width = *w));
        }
        println!("{}", header.join(" "));

        let total_width: usize = widths.iter().sum::<usize>() + widths.len() - 1;
        println!("{}", "-".repeat(total_width));

        for row in rows {
            let mut parts = vec![format!(
                "{:<width$}",
                style(&row.short_id).cyan(),
                width = widths[0]
            )];
            for (col, w) in self.columns.iter().zip(&widths[1..]) {
                parts.push(match row.get(col.key) {
                    Some(value) => value.format_tsv(*w),
                    None => CellValue::Empty.format_tsv(*w),
                });
            }
            println!("{}", parts.join(" "));
        }

        if self.show_summary {
            println!();
            println!(
                "{} {}(s) found. Use {} to reference by short ID.",
                style(rows.len()).cyan(),
                self.noun,
                style("@N").cyan()
            );
        }
    }

    fn output_csv(&self, rows: &[TableRow]) -> Result<()> {
        let mut writer = csv::Writer::from_writer(std::io::stdout());

        let mut header = vec!["short_id", "id"];
        header.extend(self.columns.iter().map(|c| c.key));
        writer.write_record(&header).into_diagnostic()?;

        for row in rows {
            let mut record = vec![row.short_id.clone(), row.full_id.clone()];
            record.extend(self.columns.iter().map(|c| row.raw(c.key)));
            writer.write_record(&record).into_diagnostic()?;
        }
        writer.flush().into_diagnostic()
    }

    /// Markdown table with a Short and ID column in front
    pub fn render_md(&self, rows: &[TableRow]) -> String {
        let mut builder = Builder::default();

        let mut header = vec!["Short".to_string(), "ID".to_string()];
        header.extend(self.columns.iter().map(|c| c.header.to_string()));
        builder.push_record(header);

        for row in rows {
            let mut record = vec![row.short_id.clone(), row.full_id.clone()];
            record.extend(
                self.columns
                    .iter()
                    .map(|c| row.raw(c.key).replace('|', "\\|")),
            );
            builder.push_record(record);
        }

        let mut table = builder.build();
        table.with(Style::markdown());
        format!("{}\n", table)
    }
}
