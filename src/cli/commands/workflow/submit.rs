//! Submit command - move draft versions into review

use console::style;
use miette::{bail, IntoDiagnostic, Result};

use crate::cli::args::GlobalOpts;
use crate::cli::commands::utils;
use crate::core::notify::notify_best_effort;
use crate::core::{Config, Event, Notification, Status};

/// Submit draft versions for review
#[derive(Debug, clap::Args)]
pub struct SubmitArgs {
    /// Document ids or references (accepts multiple, or - for stdin)
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Show what would be done without making changes
    #[arg(long)]
    pub dry_run: bool,
}

impl SubmitArgs {
    pub fn run(&self, global: &GlobalOpts) -> Result<()> {
        let vault = utils::discover_vault(global)?;
        let config = Config::load();
        let actor = utils::current_actor(&vault, &config)?;
        let mut registry = utils::open_registry(&vault)?;
        let notifier = utils::notifier(&vault);

        let ids = super::collect_ids(&self.ids)?;
        if ids.is_empty() {
            bail!("no documents to submit");
        }

        for id in &ids {
            let document = registry.find_document(id).into_diagnostic()?;
            let version = match registry.open_version(&document.id).into_diagnostic()? {
                Some(v) if v.status == Status::Draft => v,
                Some(v) => bail!(
                    "{} has no draft to submit; v{} is already {}",
                    document.reference,
                    v.number,
                    v.status
                ),
                None => bail!(
                    "{} has no draft to submit (current status: {})",
                    document.reference,
                    document.status
                ),
            };

            if self.dry_run {
                println!(
                    "Would submit {} v{} for review",
                    style(&document.reference).cyan(),
                    version.number
                );
                continue;
            }

            let submitted = registry
                .submit_version(&document.id, &version.id, &actor)
                .into_diagnostic()?;

            notify_best_effort(
                &notifier,
                &Notification {
                    event: Event::Submitted,
                    document_id: document.id.to_string(),
                    reference: document.reference.clone(),
                    actor: actor.id.clone(),
                    detail: format!("v{} pending review", submitted.number),
                },
            );

            if !global.quiet {
                println!(
                    "{} Submitted {} v{} for review",
                    style("✓").green(),
                    style(&document.reference).cyan(),
                    submitted.number
                );
            }
        }
        Ok(())
    }
}
