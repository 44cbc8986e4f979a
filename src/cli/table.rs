//! Table formatting utilities for CLI list commands
//!
//! Commands describe rows as typed cells; the formatter renders them as
//! aligned TSV for terminals, CSV for spreadsheets, markdown via `tabled`,
//! or bare keys for piping.

use chrono::{DateTime, Local, Utc};
use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::truncate_str;
use crate::cli::OutputFormat;
use crate::entities::{format_minutes, WingType};

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Component id or system name (cyan)
    Key(String),
    /// Plain text, truncated to the column width
    Text(String),
    /// Airframe category
    Wing(WingType),
    /// Flight time in minutes
    Minutes(f64),
    /// Damage flag (red when set)
    Damaged(bool),
    /// Active flag (dim when inactive)
    Active(bool),
    /// DateTime displayed as date only
    Date(DateTime<Utc>),
    Number(i64),
    Empty,
}

impl CellValue {
    /// Format for TSV output (with colors if terminal)
    pub fn format_tsv(&self, width: usize) -> String {
        match self {
            CellValue::Key(key) => format!("{:<width$}", style(key).cyan(), width = width),
            CellValue::Text(s) => {
                let truncated = truncate_str(s, width.saturating_sub(2));
                format!("{:<width$}", truncated, width = width)
            }
            CellValue::Wing(wing) => {
                let styled = match wing {
                    WingType::None | WingType::Unspecified => style(wing.to_string()).dim(),
                    _ => style(wing.to_string()).white(),
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Minutes(m) => format!("{:>width$}", format_minutes(*m), width = width),
            CellValue::Damaged(damaged) => {
                let styled = if *damaged {
                    style("yes").red().bold()
                } else {
                    style("no").dim()
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Active(active) => {
                let styled = if *active {
                    style("yes").green()
                } else {
                    style("no").dim()
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Date(dt) => format!("{:<width$}", local_date(dt), width = width),
            CellValue::Number(n) => format!("{:>width$}", n, width = width),
            CellValue::Empty => format!("{:<width$}", "-", width = width),
        }
    }

    /// Get raw string value (no formatting, for CSV and ID output)
    pub fn raw(&self) -> String {
        match self {
            CellValue::Key(s) | CellValue::Text(s) => s.clone(),
            CellValue::Wing(wing) => wing.as_str().to_string(),
            CellValue::Minutes(m) => m.to_string(),
            CellValue::Damaged(b) | CellValue::Active(b) => b.to_string(),
            CellValue::Date(dt) => local_date(dt),
            CellValue::Number(n) => n.to_string(),
            CellValue::Empty => String::new(),
        }
    }

    /// Format for Markdown output (no colors, escaped pipes)
    pub fn format_md(&self) -> String {
        let raw = match self {
            CellValue::Wing(wing) => wing.to_string(),
            CellValue::Minutes(m) => format_minutes(*m),
            CellValue::Damaged(true) => "**yes**".to_string(),
            CellValue::Damaged(false) | CellValue::Active(false) => "no".to_string(),
            CellValue::Active(true) => "yes".to_string(),
            CellValue::Empty => "-".to_string(),
            other => other.raw(),
        };
        raw.replace('|', "\\|")
    }

    /// Get the display width of this cell's content (for dynamic column sizing)
    pub fn display_width(&self) -> usize {
        match self {
            CellValue::Key(s) | CellValue::Text(s) => s.chars().count(),
            CellValue::Wing(wing) => wing.to_string().len(),
            CellValue::Minutes(m) => format_minutes(*m).len(),
            CellValue::Damaged(_) | CellValue::Active(_) => 3,
            CellValue::Date(_) => 10,
            CellValue::Number(n) => n.to_string().len(),
            CellValue::Empty => 1,
        }
    }
}

fn local_date(dt: &DateTime<Utc>) -> String {
    let local: DateTime<Local> = dt.with_timezone(&Local);
    local.format("%Y-%m-%d").to_string()
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
    /// Value printed by `--format id`
    pub key: String,
    pub cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
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
    entity_name: &'static str,
    show_summary: bool,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], entity_name: &'static str) -> Self {
        Self {
            columns,
            entity_name,
            show_summary: true,
        }
    }

    /// Drop the "N found" line (for piping)
    pub fn without_summary(mut self) -> Self {
        self.show_summary = false;
        self
    }

    /// Output rows in the specified format
    ///
    /// YAML and JSON are handled by the caller, which has the typed data.
    pub fn output(&self, rows: &[TableRow], format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Csv => self.output_csv(rows),
            OutputFormat::Md => {
                print!("{}", self.render_md(rows));
                Ok(())
            }
            OutputFormat::Id => {
                for row in rows {
                    println!("{}", row.key);
                }
                Ok(())
            }
            _ => {
                self.output_tsv(rows);
                Ok(())
            }
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
                // +2 leaves room for the truncation buffer in Text cells
                col.header.len().max(max_content + 2).min(col.width)
            })
            .collect()
    }

    fn output_tsv(&self, rows: &[TableRow]) {
        let widths = self.calculate_widths(rows);

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(col, w)| format!("{:<width$}", style(col.header).bold(), width = *w))
            .collect();
        println!("{}", header.join(" "));

        let total_width: usize = widths.iter().sum::<usize>() + widths.len().saturating_sub(1);
        println!("{}", "-".repeat(total_width));

        for row in rows {
            let parts: Vec<String> = self
                .columns
                .iter()
                .zip(&widths)
                .map(|(col, w)| match row.get(col.key) {
                    Some(value) => value.format_tsv(*w),
                    None => format!("{:<width$}", "-", width = *w),
                })
                .collect();
            println!("{}", parts.join(" "));
        }

        if self.show_summary {
            println!();
            println!("{} {}(s) found.", style(rows.len()).cyan(), self.entity_name);
        }
    }

    fn output_csv(&self, rows: &[TableRow]) -> Result<()> {
        let mut writer = csv::Writer::from_writer(std::io::stdout());
        writer
            .write_record(self.columns.iter().map(|c| c.key))
            .into_diagnostic()?;
        for row in rows {
            let record: Vec<String> = self
                .columns
                .iter()
                .map(|col| row.get(col.key).map(|v| v.raw()).unwrap_or_default())
                .collect();
            writer.write_record(&record).into_diagnostic()?;
        }
        writer.flush().into_diagnostic()?;
        Ok(())
    }

    /// Render rows as a markdown table
    pub fn render_md(&self, rows: &[TableRow]) -> String {
        let mut builder = Builder::default();
        builder.push_record(self.columns.iter().map(|c| c.header.to_string()));
        for row in rows {
            builder.push_record(self.columns.iter().map(|col| {
                row.get(col.key)
                    .map(|v| v.format_md())
                    .unwrap_or_else(|| "-".to_string())
            }));
        }
        format!("{}\n", builder.build().with(Style::markdown()))
    }
}
