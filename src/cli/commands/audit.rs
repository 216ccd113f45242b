//! `fdc audit` - verify stored content against the registry
//!
//! Every version's blob must exist and hash back to the address it is
//! stored under. Blobs no version references are reported as orphans but
//! do not fail the audit; deduplicated content is expected to be shared.

use console::style;
use miette::{bail, Result};
use std::collections::HashSet;
use walkdir::WalkDir;

use crate::cli::args::GlobalOpts;
use crate::core::FsBlobStore;

use super::utils;

/// Verify stored content against the registry
#[derive(Debug, clap::Args)]
pub struct AuditArgs {}

pub fn run(_args: AuditArgs, global: &GlobalOpts) -> Result<()> {
    let vault = utils::discover_vault(global)?;
    let registry = utils::open_registry(&vault)?;
    let store = FsBlobStore::new(vault.blobs_dir());

    let mut referenced: HashSet<std::path::PathBuf> = HashSet::new();
    let mut missing = 0usize;
    let mut corrupt = 0usize;
    let mut checked = 0usize;

    for (reference, version) in registry.list_all_versions().map_err(|e| miette::miette!("{}", e))? {
        checked += 1;
        let path = match store.path_for(&version.content.url) {
            Some(p) => p,
            None => {
                corrupt += 1;
                eprintln!(
                    "{} {} v{}: malformed content url {}",
                    style("✗").red(),
                    reference,
                    version.number,
                    version.content.url
                );
                continue;
            }
        };
        referenced.insert(path.clone());

        let bytes = match std::fs::read(&path) {
            Ok(b) => b,
            Err(_) => {
                missing += 1;
                eprintln!(
                    "{} {} v{}: blob missing ({})",
                    style("✗").red(),
                    reference,
                    version.number,
                    version.content.url
                );
                continue;
            }
        };

        let expected = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if FsBlobStore::digest(&bytes) != expected {
            corrupt += 1;
            eprintln!(
                "{} {} v{}: blob content does not match its address",
                style("✗").red(),
                reference,
                version.number
            );
        } else if global.verbose {
            println!(
                "{} {} v{} ({} bytes)",
                style("✓").green(),
                reference,
                version.number,
                bytes.len()
            );
        }
    }

    let mut orphans = 0usize;
    for entry in WalkDir::new(vault.blobs_dir())
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        if !referenced.contains(entry.path()) {
            orphans += 1;
            if global.verbose {
                println!("{} orphan blob {}", style("!").yellow(), entry.path().display());
            }
        }
    }

    if !global.quiet {
        println!();
        println!(
            "Checked {} version(s): {} missing, {} corrupt, {} orphan blob(s)",
            checked, missing, corrupt, orphans
        );
    }

    if missing > 0 || corrupt > 0 {
        bail!("audit failed: {} missing, {} corrupt", missing, corrupt);
    }
    if !global.quiet {
        println!("{} Audit passed", style("✓").green());
    }
    Ok(())
}
