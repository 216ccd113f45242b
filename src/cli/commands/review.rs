//! `fdc review` - periodic review report

use chrono::Utc;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::cli::table::{CellValue, ColumnDef, TableConfig, TableFormatter, TableRow};
use crate::core::notify::notify_best_effort;
use crate::core::store::{DocumentFilter, DueBucket};
use crate::core::{Config, Document, Event, Notification};

use super::utils;

/// Periodic review report
#[derive(Debug, clap::Args)]
pub struct ReviewArgs {
    /// Days ahead to include in the due-soon bucket
    #[arg(long)]
    pub horizon_days: Option<u32>,

    /// Skip overdue notifications
    #[arg(long)]
    pub no_notify: bool,
}

const REVIEW_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("reference", "REFERENCE", 14),
    ColumnDef::new("title", "TITLE", 34),
    ColumnDef::new("owner", "OWNER", 12),
    ColumnDef::new("next_review", "NEXT REVIEW", 11),
];

fn review_row(doc: &Document) -> TableRow {
    TableRow::new(doc.id.to_string())
        .cell("reference", CellValue::Text(doc.reference.clone()))
        .cell("title", CellValue::Text(doc.title.clone()))
        .cell("owner", CellValue::Text(doc.owner.clone()))
        .cell(
            "next_review",
            match doc.next_review {
                Some(date) => CellValue::Date(date),
                None => CellValue::Empty,
            },
        )
}

impl ReviewArgs {
    pub fn run(&self, global: &GlobalOpts) -> Result<()> {
        let vault = utils::discover_vault(global)?;
        let config = Config::load();
        let registry = utils::open_registry(&vault)?;
        let horizon = self.horizon_days.unwrap_or_else(|| config.due_soon_days());

        let overdue = registry
            .list_documents(&DocumentFilter {
                due: Some(DueBucket::Overdue),
                ..Default::default()
            })
            .into_diagnostic()?;
        let due_soon = registry
            .list_documents(&DocumentFilter {
                due: Some(DueBucket::DueSoon),
                due_horizon_days: horizon,
                ..Default::default()
            })
            .into_diagnostic()?;

        let format = match utils::output_format(global, &config) {
            OutputFormat::Auto => OutputFormat::Tsv,
            f => f,
        };

        if !global.quiet {
            println!(
                "{} ({})",
                style("Overdue for review").red().bold(),
                overdue.len()
            );
        }
        if !overdue.is_empty() {
            TableFormatter::new(REVIEW_COLUMNS, "document")
                .with_config(TableConfig::for_pipe())
                .output(overdue.iter().map(review_row), format);
        }

        if !global.quiet {
            println!();
            println!(
                "{} ({}, next {} days)",
                style("Due soon").yellow().bold(),
                due_soon.len(),
                horizon
            );
        }
        if !due_soon.is_empty() {
            TableFormatter::new(REVIEW_COLUMNS, "document")
                .with_config(TableConfig::for_pipe())
                .output(due_soon.iter().map(review_row), format);
        }

        if !self.no_notify {
            let notifier = utils::notifier(&vault);
            let today = Utc::now().date_naive();
            for doc in &overdue {
                let days = doc
                    .next_review
                    .map(|due| (today - due).num_days())
                    .unwrap_or(0);
                notify_best_effort(
                    &notifier,
                    &Notification {
                        event: Event::OverdueDetected,
                        document_id: doc.id.to_string(),
                        reference: doc.reference.clone(),
                        actor: doc.owner.clone(),
                        detail: format!("review overdue by {} day(s)", days),
                    },
                );
            }
        }

        if !global.quiet && overdue.is_empty() && due_soon.is_empty() {
            println!();
            println!("{} Nothing due - reviews are up to date", style("✓").green());
        }
        Ok(())
    }
}
