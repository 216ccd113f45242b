//! Reject command - send pending versions back to draft

use console::style;
use miette::{bail, IntoDiagnostic, Result};

use crate::cli::args::GlobalOpts;
use crate::cli::commands::utils;
use crate::core::notify::notify_best_effort;
use crate::core::{Config, Event, Notification, Status};

/// Reject pending versions back to draft
#[derive(Debug, clap::Args)]
pub struct RejectArgs {
    /// Document ids or references (accepts multiple, or - for stdin)
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Why the version is rejected (recorded in the audit trail)
    #[arg(long, short = 'r')]
    pub reason: String,

    /// Show what would be done without making changes
    #[arg(long)]
    pub dry_run: bool,
}

impl RejectArgs {
    pub fn run(&self, global: &GlobalOpts) -> Result<()> {
        let vault = utils::discover_vault(global)?;
        let config = Config::load();
        let actor = utils::current_actor(&vault, &config)?;
        let mut registry = utils::open_registry(&vault)?;
        let notifier = utils::notifier(&vault);

        let ids = super::collect_ids(&self.ids)?;
        if ids.is_empty() {
            bail!("no documents to reject");
        }

        for id in &ids {
            let document = registry.find_document(id).into_diagnostic()?;
            let version = match registry.open_version(&document.id).into_diagnostic()? {
                Some(v) if v.status == Status::PendingReview => v,
                Some(v) => bail!(
                    "{} v{} is {} - only pending versions can be rejected",
                    document.reference,
                    v.number,
                    v.status
                ),
                None => bail!(
                    "{} has nothing pending review (current status: {})",
                    document.reference,
                    document.status
                ),
            };

            if self.dry_run {
                println!(
                    "Would reject {} v{}: {}",
                    style(&document.reference).cyan(),
                    version.number,
                    self.reason
                );
                continue;
            }

            let rejected = registry
                .reject_version(&document.id, &version.id, &actor, &self.reason)
                .into_diagnostic()?;

            notify_best_effort(
                &notifier,
                &Notification {
                    event: Event::Rejected,
                    document_id: document.id.to_string(),
                    reference: document.reference.clone(),
                    actor: actor.id.clone(),
                    detail: format!("v{} rejected: {}", rejected.number, self.reason),
                },
            );

            if !global.quiet {
                println!(
                    "{} Rejected {} v{} back to draft",
                    style("✗").red(),
                    style(&document.reference).cyan(),
                    rejected.number
                );
            }
        }
        Ok(())
    }
}
