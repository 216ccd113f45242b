//! `fdc roster` commands - manage the approval roster

use clap::Subcommand;
use console::style;
use miette::{bail, IntoDiagnostic, Result};

use crate::cli::args::GlobalOpts;
use crate::core::{Roster, RosterMember};

use super::utils;

#[derive(Debug, Subcommand)]
pub enum RosterCommands {
    /// Write a roster template to .fdc/roster.yaml
    Init(InitArgs),
    /// Add a member
    Add(AddArgs),
    /// Remove a member by username
    Remove(RemoveArgs),
    /// List members
    List,
}

#[derive(Debug, clap::Args)]
pub struct InitArgs {
    /// Overwrite an existing roster
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, clap::Args)]
pub struct AddArgs {
    /// Full display name
    #[arg(long, short = 'n')]
    pub name: String,

    /// Email address
    #[arg(long, short = 'e')]
    pub email: String,

    /// Username (matched against git config user.name or FDC_USER)
    #[arg(long, short = 'u')]
    pub username: String,

    /// Grant approval authority
    #[arg(long)]
    pub approver: bool,
}

#[derive(Debug, clap::Args)]
pub struct RemoveArgs {
    pub username: String,
}

pub fn run(cmd: RosterCommands, global: &GlobalOpts) -> Result<()> {
    let vault = utils::discover_vault(global)?;

    match cmd {
        RosterCommands::Init(args) => {
            let path = vault.fdc_dir().join("roster.yaml");
            if path.exists() && !args.force {
                bail!(
                    "roster already exists at {}; use --force to overwrite",
                    path.display()
                );
            }
            std::fs::write(&path, Roster::default_template()).into_diagnostic()?;
            println!(
                "{} Wrote roster template to {}",
                style("✓").green(),
                style(path.display()).cyan()
            );
            Ok(())
        }
        RosterCommands::Add(args) => {
            let mut roster = Roster::load(&vault).unwrap_or_default();
            if roster.find_member(&args.username).is_some() {
                bail!("'{}' is already on the roster", args.username);
            }
            roster.add_member(RosterMember {
                name: args.name.clone(),
                email: args.email,
                username: args.username.clone(),
                can_approve: args.approver,
                active: true,
            });
            roster.save(&vault).into_diagnostic()?;
            println!(
                "{} Added {} ({}){}",
                style("✓").green(),
                style(&args.name).cyan(),
                args.username,
                if args.approver { " with approval authority" } else { "" }
            );
            Ok(())
        }
        RosterCommands::Remove(args) => {
            let mut roster = Roster::load(&vault)
                .ok_or_else(|| miette::miette!("no roster at .fdc/roster.yaml"))?;
            if !roster.remove_member(&args.username) {
                bail!("'{}' is not on the roster", args.username);
            }
            roster.save(&vault).into_diagnostic()?;
            println!("{} Removed {}", style("✓").green(), args.username);
            Ok(())
        }
        RosterCommands::List => {
            let roster = Roster::load(&vault).unwrap_or_default();
            if roster.members.is_empty() {
                println!("Roster is empty. Add members with {}", style("fdc roster add").yellow());
                return Ok(());
            }
            for member in &roster.members {
                let authority = if member.can_approve {
                    style("approver").green().to_string()
                } else {
                    style("member").dim().to_string()
                };
                let status = if member.active { "" } else { " (inactive)" };
                println!(
                    "{:<20} {:<28} {}{}",
                    member.username, member.email, authority, status
                );
            }
            Ok(())
        }
    }
}
