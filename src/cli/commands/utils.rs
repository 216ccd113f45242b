//! Shared utilities for CLI commands

use miette::{IntoDiagnostic, Result};
use std::path::Path;

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::core::{
    Actor, Config, ContentRef, FileNotifier, FsBlobStore, Registry, Roster, Vault,
};
use crate::core::blob::BlobStore;

/// Locate the vault from --vault or by walking up from the current directory
pub fn discover_vault(global: &GlobalOpts) -> Result<Vault> {
    match &global.vault {
        Some(path) => Vault::discover_from(path).into_diagnostic(),
        None => Vault::discover().into_diagnostic(),
    }
}

/// Open the vault's registry database
pub fn open_registry(vault: &Vault) -> Result<Registry> {
    Registry::open(&vault.registry_path()).into_diagnostic()
}

/// The notifier every workflow command reports to
pub fn notifier(vault: &Vault) -> FileNotifier {
    FileNotifier::new(vault.notifications_path())
}

/// Effective output format: an explicit --format wins, then the configured
/// `default_format`, then auto
pub fn output_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    if !matches!(global.format, OutputFormat::Auto) {
        return global.format;
    }
    config
        .default_format
        .as_deref()
        .and_then(|s| <OutputFormat as clap::ValueEnum>::from_str(s, true).ok())
        .unwrap_or(OutputFormat::Auto)
}

/// Resolve the acting identity.
///
/// With a roster present the current user must be on it and carries exactly
/// the capability the roster grants. Without a roster the vault is treated
/// as single-operator and the configured owner may do everything.
pub fn current_actor(vault: &Vault, config: &Config) -> Result<Actor> {
    match Roster::load(vault) {
        // A roster with no members is the freshly-initialized template;
        // enforcement starts once someone is actually on it
        Some(roster) if !roster.members.is_empty() => match roster.current_member() {
            Some(member) => Ok(member.as_actor()),
            None => Err(miette::miette!(
                "you are not on the approval roster.\n\
                 Add yourself with 'fdc roster add' or set FDC_USER to a roster username."
            )),
        },
        _ => {
            let owner = config.owner();
            Ok(Actor {
                id: owner.clone(),
                display_name: owner,
                can_approve: true,
            })
        }
    }
}

/// Upload a local file into the vault's blob store and return its reference
pub fn upload_file(vault: &Vault, path: &Path) -> Result<ContentRef> {
    let bytes = std::fs::read(path)
        .map_err(|e| miette::miette!("cannot read {}: {}", path.display(), e))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| miette::miette!("{} has no file name", path.display()))?;
    let media_type = media_type_for(path);

    let store = FsBlobStore::new(vault.blobs_dir());
    let blob = store
        .store(&bytes, &file_name, media_type)
        .into_diagnostic()?;

    Ok(ContentRef {
        file_name,
        file_size: blob.size,
        media_type: media_type.to_string(),
        url: blob.url,
    })
}

/// Best-effort media type from the file extension
pub fn media_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        Some("xls") => "application/vnd.ms-excel",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("md") => "text/markdown",
        Some("txt") => "text/plain",
        Some("csv") => "text/csv",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_current_actor_with_empty_roster_template() {
        let tmp = tempfile::tempdir().unwrap();
        let vault = Vault::init(tmp.path()).unwrap();
        std::fs::write(
            vault.fdc_dir().join("roster.yaml"),
            Roster::default_template(),
        )
        .unwrap();

        // The template has no members, so the vault is single-operator
        let actor = current_actor(&vault, &Config::default()).unwrap();
        assert!(actor.can_approve);
    }

    #[test]
    fn test_output_format_resolution() {
        let explicit = GlobalOpts {
            format: OutputFormat::Json,
            quiet: false,
            verbose: false,
            vault: None,
        };
        let auto = GlobalOpts {
            format: OutputFormat::Auto,
            ..explicit.clone()
        };

        let mut config = Config::default();
        config.default_format = Some("csv".to_string());
        assert_eq!(output_format(&explicit, &config), OutputFormat::Json);
        assert_eq!(output_format(&auto, &config), OutputFormat::Csv);

        config.default_format = Some("bogus".to_string());
        assert_eq!(output_format(&auto, &config), OutputFormat::Auto);

        config.default_format = None;
        assert_eq!(output_format(&auto, &config), OutputFormat::Auto);
    }

    #[test]
    fn test_media_type_for() {
        assert_eq!(
            media_type_for(&PathBuf::from("proc.pdf")),
            "application/pdf"
        );
        assert_eq!(media_type_for(&PathBuf::from("NOTES.TXT")), "text/plain");
        assert_eq!(
            media_type_for(&PathBuf::from("blob.bin")),
            "application/octet-stream"
        );
        assert_eq!(
            media_type_for(&PathBuf::from("no_extension")),
            "application/octet-stream"
        );
    }
}
