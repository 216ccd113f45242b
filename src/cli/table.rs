//! Table formatting utilities for CLI list commands
//!
//! One table system shared by every list-style command so the tsv/csv/md/id
//! output shapes stay consistent.

use chrono::{DateTime, Local, NaiveDate, Utc};
use console::style;

use crate::cli::helpers::{escape_csv, truncate_str};
use crate::cli::OutputFormat;
use crate::core::document::Category;
use crate::core::version::Status;

/// Configuration for table output
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Show summary line after the table (e.g. "5 document(s) found")
    pub show_summary: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self { show_summary: true }
    }
}

impl TableConfig {
    /// Config optimized for piping (no summary line)
    pub fn for_pipe() -> Self {
        Self {
            show_summary: false,
        }
    }
}

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Record ID (truncated for display, cyan colored)
    Id(String),
    /// Plain text, truncated to the column width
    Text(String),
    /// Lifecycle status with color coding
    Status(Status),
    /// Document category
    Category(Category),
    /// Calendar date
    Date(NaiveDate),
    /// Timestamp displayed in local time
    DateTime(DateTime<Utc>),
    /// Numeric value, right aligned
    Number(i64),
    /// Tags as comma-separated text
    Tags(Vec<String>),
    /// Empty/placeholder
    Empty,
}

impl CellValue {
    /// Format for TSV output (with colors if terminal)
    pub fn format_tsv(&self, width: usize) -> String {
        match self {
            CellValue::Id(id) => {
                let display = if id.len() > 16 {
                    format!("{}...", &id[..13])
                } else {
                    id.clone()
                };
                format!("{:<width$}", style(&display).cyan(), width = width)
            }
            CellValue::Text(s) => {
                let truncated = truncate_str(s, width.saturating_sub(2));
                format!("{:<width$}", truncated, width = width)
            }
            CellValue::Status(status) => {
                let s = status.to_string();
                let styled = match status {
                    Status::Draft => style(&s).dim(),
                    Status::PendingReview => style(&s).yellow(),
                    Status::Approved => style(&s).green(),
                    Status::Obsolete => style(&s).red().dim(),
                    Status::Archived => style(&s).magenta().dim(),
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Category(category) => {
                format!("{:<width$}", category.as_str(), width = width)
            }
            CellValue::Date(date) => {
                format!("{:<width$}", date.format("%Y-%m-%d"), width = width)
            }
            CellValue::DateTime(dt) => {
                let local: DateTime<Local> = dt.with_timezone(&Local);
                format!("{:<width$}", local.format("%Y-%m-%d %H:%M"), width = width)
            }
            CellValue::Number(n) => {
                format!("{:>width$}", n, width = width)
            }
            CellValue::Tags(tags) => {
                let joined = tags.join(", ");
                format!(
                    "{:<width$}",
                    truncate_str(&joined, width.saturating_sub(2)),
                    width = width
                )
            }
            CellValue::Empty => format!("{:<width$}", "-", width = width),
        }
    }

    /// Format for CSV output (RFC 4180, no colors)
    pub fn format_csv(&self) -> String {
        match self {
            CellValue::Id(id) => escape_csv(id),
            CellValue::Text(s) => escape_csv(s),
            CellValue::Status(status) => status.to_string(),
            CellValue::Category(category) => category.to_string(),
            CellValue::Date(date) => date.format("%Y-%m-%d").to_string(),
            CellValue::DateTime(dt) => {
                let local: DateTime<Local> = dt.with_timezone(&Local);
                local.format("%Y-%m-%dT%H:%M:%S").to_string()
            }
            CellValue::Number(n) => n.to_string(),
            CellValue::Tags(tags) => escape_csv(&tags.join(", ")),
            CellValue::Empty => String::new(),
        }
    }

    /// Format for Markdown output (no colors, escaped pipes)
    pub fn format_md(&self) -> String {
        let raw = match self {
            CellValue::Id(id) => id.clone(),
            CellValue::Text(s) => s.clone(),
            CellValue::Status(status) => status.to_string(),
            CellValue::Category(category) => category.to_string(),
            CellValue::Date(date) => date.format("%Y-%m-%d").to_string(),
            CellValue::DateTime(dt) => {
                let local: DateTime<Local> = dt.with_timezone(&Local);
                local.format("%Y-%m-%d %H:%M").to_string()
            }
            CellValue::Number(n) => n.to_string(),
            CellValue::Tags(tags) => tags.join(", "),
            CellValue::Empty => "-".to_string(),
        };
        raw.replace('|', "\\|")
    }

    /// Get the display width of this cell's content (for dynamic sizing)
    pub fn display_width(&self) -> usize {
        match self {
            CellValue::Id(id) => id.len().min(16),
            CellValue::Text(s) => s.len(),
            CellValue::Status(status) => status.to_string().len(),
            CellValue::Category(category) => category.as_str().len(),
            CellValue::Date(_) => 10,
            CellValue::DateTime(_) => 16,
            CellValue::Number(n) => n.to_string().len(),
            CellValue::Tags(tags) => tags.join(", ").len(),
            CellValue::Empty => 1,
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
    pub full_id: String,
    pub cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(full_id: String) -> Self {
        Self {
            full_id,
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
}

/// Table formatter that outputs rows in various formats
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    record_name: &'static str,
    config: TableConfig,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], record_name: &'static str) -> Self {
        Self {
            columns,
            record_name,
            config: TableConfig::default(),
        }
    }

    pub fn with_config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }

    /// Output rows in the specified format
    pub fn output<I>(&self, rows: I, format: OutputFormat)
    where
        I: IntoIterator<Item = TableRow>,
    {
        let rows: Vec<TableRow> = rows.into_iter().collect();

        match format {
            OutputFormat::Csv => self.output_csv(&rows),
            OutputFormat::Md => self.output_md(&rows),
            OutputFormat::Id => self.output_ids(&rows),
            _ => self.output_tsv(&rows),
        }
    }

    /// Calculate dynamic column widths based on actual content
    fn calculate_widths(&self, rows: &[TableRow]) -> Vec<usize> {
        self.columns
            .iter()
            .map(|col| {
                let max_content = rows
                    .iter()
                    .filter_map(|r| r.get(col.key))
                    .map(|v| v.display_width())
                    .max()
                    .unwrap_or(0);
                // +2 buffer matches the truncation margin in format_tsv
                let natural = col.header.len().max(max_content.saturating_add(2));
                natural.min(col.width)
            })
            .collect()
    }

    fn output_tsv(&self, rows: &[TableRow]) {
        let widths = self.calculate_widths(rows);

        let header_parts: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(col, w)| format!("{:<width$}", style(col.header).bold(), width = w))
            .collect();
        println!("{}", header_parts.join(" "));

        let total_width: usize = widths.iter().sum::<usize>() + widths.len().saturating_sub(1);
        println!("{}", "-".repeat(total_width));

        for row in rows {
            let parts: Vec<String> = self
                .columns
                .iter()
                .zip(&widths)
                .map(|(col, w)| match row.get(col.key) {
                    Some(value) => value.format_tsv(*w),
                    None => format!("{:<width$}", "-", width = w),
                })
                .collect();
            println!("{}", parts.join(" "));
        }

        if self.config.show_summary {
            println!();
            println!(
                "{} {}(s) found",
                style(rows.len()).cyan(),
                self.record_name
            );
        }
    }

    fn output_csv(&self, rows: &[TableRow]) {
        let mut headers = vec!["id".to_string()];
        headers.extend(self.columns.iter().map(|c| c.key.to_string()));
        println!("{}", headers.join(","));

        for row in rows {
            let mut values = vec![escape_csv(&row.full_id)];
            for col in self.columns {
                values.push(
                    row.get(col.key)
                        .map(|v| v.format_csv())
                        .unwrap_or_default(),
                );
            }
            println!("{}", values.join(","));
        }
    }

    fn output_md(&self, rows: &[TableRow]) {
        let mut headers = vec!["ID".to_string()];
        headers.extend(self.columns.iter().map(|c| c.header.to_string()));
        println!("| {} |", headers.join(" | "));

        let separators: Vec<&str> = headers.iter().map(|_| "---").collect();
        println!("|{}|", separators.join("|"));

        for row in rows {
            let mut values = vec![row.full_id.clone()];
            for col in self.columns {
                values.push(
                    row.get(col.key)
                        .map(|v| v.format_md())
                        .unwrap_or_else(|| "-".to_string()),
                );
            }
            println!("| {} |", values.join(" | "));
        }
    }

    fn output_ids(&self, rows: &[TableRow]) {
        for row in rows {
            println!("{}", row.full_id);
        }
    }
}
