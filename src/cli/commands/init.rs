//! `fdc init` command - create a new document vault

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::core::project::{Vault, VaultError};
use crate::core::{Registry, Roster};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Force initialization even if .fdc/ already exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    let vault = if args.force {
        Vault::init_force(&path)
    } else {
        Vault::init(&path)
    };

    match vault {
        Ok(vault) => {
            // Create the registry up front so the first command is not the
            // one paying for schema creation
            Registry::open(&vault.registry_path()).into_diagnostic()?;

            let roster_path = vault.fdc_dir().join("roster.yaml");
            if !roster_path.exists() {
                std::fs::write(&roster_path, Roster::default_template()).into_diagnostic()?;
            }

            println!(
                "{} Initialized document vault at {}",
                style("✓").green(),
                style(vault.root().display()).cyan()
            );
            println!();
            println!("Created vault structure:");
            println!("  .fdc/registry.db        document registry");
            println!("  .fdc/blobs/             stored content");
            println!("  .fdc/config.yaml        vault configuration");
            println!("  .fdc/roster.yaml        approval roster");
            println!();
            println!("Next steps:");
            println!(
                "  {} Register your first document",
                style("fdc doc new --reference QP-01 --title \"...\" --category procedure --file <path>").yellow()
            );
            println!("  {} List documents", style("fdc doc list").yellow());
            println!(
                "  {} Add reviewers to the roster",
                style("fdc roster add").yellow()
            );
            Ok(())
        }
        Err(VaultError::AlreadyExists(path)) => {
            println!(
                "{} Document vault already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!("Use {} to reinitialize", style("fdc init --force").yellow());
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}
