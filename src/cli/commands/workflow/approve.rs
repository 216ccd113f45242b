//! Approve command - approve versions under review

use console::style;
use dialoguer::Confirm;
use miette::{bail, IntoDiagnostic, Result};

use crate::cli::args::GlobalOpts;
use crate::cli::commands::utils;
use crate::core::notify::notify_best_effort;
use crate::core::{Config, Document, Event, Notification, Status, Version};

/// Approve pending versions
#[derive(Debug, clap::Args)]
pub struct ApproveArgs {
    /// Document ids or references (accepts multiple, or - for stdin)
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Approval comment
    #[arg(long, short = 'm')]
    pub message: Option<String>,

    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Show what would be done without making changes
    #[arg(long)]
    pub dry_run: bool,
}

impl ApproveArgs {
    pub fn run(&self, global: &GlobalOpts) -> Result<()> {
        let vault = utils::discover_vault(global)?;
        let config = Config::load();
        let actor = utils::current_actor(&vault, &config)?;
        let mut registry = utils::open_registry(&vault)?;
        let notifier = utils::notifier(&vault);

        if global.verbose {
            eprintln!(
                "Approving as {} (can_approve: {})",
                actor.display_name, actor.can_approve
            );
        }

        let ids = super::collect_ids(&self.ids)?;
        if ids.is_empty() {
            bail!("no documents to approve");
        }

        // Resolve everything first so a bad id aborts before any write
        let mut pending: Vec<(Document, Version)> = Vec::new();
        for id in &ids {
            let document = registry.find_document(id).into_diagnostic()?;
            match registry.open_version(&document.id).into_diagnostic()? {
                Some(v) if v.status == Status::PendingReview => pending.push((document, v)),
                Some(v) => bail!(
                    "{} v{} is {} - only pending versions can be approved",
                    document.reference,
                    v.number,
                    v.status
                ),
                None => bail!(
                    "{} has nothing pending review (current status: {})",
                    document.reference,
                    document.status
                ),
            }
        }

        if self.dry_run {
            for (document, version) in &pending {
                println!(
                    "Would approve {} v{}",
                    style(&document.reference).cyan(),
                    version.number
                );
            }
            return Ok(());
        }

        if !self.yes && pending.len() > 1 {
            let confirmed = Confirm::new()
                .with_prompt(format!("Approve {} document(s)?", pending.len()))
                .default(false)
                .interact()
                .into_diagnostic()?;
            if !confirmed {
                println!("Aborted.");
                return Ok(());
            }
        }

        for (document, version) in pending {
            let approved = registry
                .approve_version(&document.id, &version.id, &actor, self.message.as_deref())
                .into_diagnostic()?;

            notify_best_effort(
                &notifier,
                &Notification {
                    event: Event::Approved,
                    document_id: document.id.to_string(),
                    reference: document.reference.clone(),
                    actor: actor.id.clone(),
                    detail: format!("v{} approved", approved.number),
                },
            );

            if !global.quiet {
                let refreshed = registry.get_document(&document.id).into_diagnostic()?;
                let next = refreshed
                    .next_review
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{} Approved {} v{} (next review {})",
                    style("✓").green(),
                    style(&document.reference).cyan(),
                    approved.number,
                    style(next).yellow()
                );
            }
        }
        Ok(())
    }
}
