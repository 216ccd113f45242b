//! `fdc doc` commands - controlled document management

use clap::Subcommand;
use console::style;
use csv::ReaderBuilder;
use dialoguer::Confirm;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::cli::table::{CellValue, ColumnDef, TableConfig, TableFormatter, TableRow};
use crate::core::store::{DocumentFilter, DocumentUpdate, DueBucket, NewDocument};
use crate::core::{
    Category, Config, Document, Event, Notification, Status, Version,
};
use crate::core::notify::notify_best_effort;

use super::utils;

#[derive(Debug, Subcommand)]
pub enum DocCommands {
    /// Register a new controlled document with its initial draft
    New(NewArgs),
    /// List documents
    List(ListArgs),
    /// Show one document in full
    Show(ShowArgs),
    /// Show version history and the audit trail
    History(HistoryArgs),
    /// Edit document metadata
    Update(UpdateArgs),
    /// Archive (soft-retire) a document
    Archive(ArchiveArgs),
    /// Start a revision of an approved document
    Revise(ReviseArgs),
    /// Bulk-register documents from a CSV file
    Import(ImportArgs),
}

pub fn run(cmd: DocCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        DocCommands::New(args) => run_new(args, global),
        DocCommands::List(args) => run_list(args, global),
        DocCommands::Show(args) => run_show(args, global),
        DocCommands::History(args) => run_history(args, global),
        DocCommands::Update(args) => run_update(args, global),
        DocCommands::Archive(args) => run_archive(args, global),
        DocCommands::Revise(args) => run_revise(args, global),
        DocCommands::Import(args) => run_import(args, global),
    }
}

// ---------------------------------------------------------------------------
// doc new
// ---------------------------------------------------------------------------

#[derive(Debug, clap::Args)]
pub struct NewArgs {
    /// Reference code, unique in the registry (e.g. QP-7.5-01)
    #[arg(long, short = 'r')]
    pub reference: String,

    /// Document title
    #[arg(long, short = 't')]
    pub title: String,

    /// Category (procedure, manual, standard, record, instruction)
    #[arg(long, short = 'c')]
    pub category: String,

    /// File holding the initial content
    #[arg(long)]
    pub file: PathBuf,

    /// Free-text description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Owning process or organizational unit
    #[arg(long)]
    pub process: Option<String>,

    /// Document owner (default: configured owner)
    #[arg(long)]
    pub owner: Option<String>,

    /// Original author when distinct from the owner
    #[arg(long)]
    pub author: Option<String>,

    /// Review frequency in months
    #[arg(long, default_value_t = 12)]
    pub frequency: u32,

    /// Tags (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let vault = utils::discover_vault(global)?;
    let config = Config::load();
    let actor = utils::current_actor(&vault, &config)?;
    let mut registry = utils::open_registry(&vault)?;

    let category: Category = args
        .category
        .parse()
        .map_err(|e: String| miette::miette!("{}", e))?;
    let content = utils::upload_file(&vault, &args.file)?;

    let new = NewDocument {
        reference: args.reference,
        title: args.title,
        description: args.description,
        category,
        process: args.process,
        tags: args.tags,
        owner: args.owner.unwrap_or_else(|| config.owner()),
        author: args.author,
        review_frequency_months: args.frequency,
    };

    let (document, version) = registry
        .create_document(new, content, &actor)
        .into_diagnostic()?;

    if !global.quiet {
        println!(
            "{} Registered {} ({})",
            style("✓").green(),
            style(&document.reference).cyan(),
            document.id
        );
        println!(
            "  v{} is {} - submit it with {}",
            version.number,
            style(version.status).dim(),
            style(format!("fdc submit {}", document.reference)).yellow()
        );
    } else {
        println!("{}", document.id);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// doc list
// ---------------------------------------------------------------------------

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum DueFilter {
    /// Review date has passed
    Overdue,
    /// Review date inside the horizon window
    Soon,
}

#[derive(Debug, clap::Args)]
pub struct ListArgs {
    /// Filter by category
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Filter by lifecycle status
    #[arg(long, short = 's')]
    pub status: Option<String>,

    /// Filter by owner
    #[arg(long)]
    pub owner: Option<String>,

    /// Filter by owning process
    #[arg(long)]
    pub process: Option<String>,

    /// Free-text search over title and reference
    #[arg(long)]
    pub search: Option<String>,

    /// Review-due bucket
    #[arg(long, value_enum)]
    pub due: Option<DueFilter>,

    /// Include archived documents
    #[arg(long)]
    pub archived: bool,

    /// Maximum number of rows
    #[arg(long)]
    pub limit: Option<usize>,

    /// Skip the first N rows
    #[arg(long)]
    pub offset: Option<usize>,
}

const DOC_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 16),
    ColumnDef::new("reference", "REFERENCE", 14),
    ColumnDef::new("title", "TITLE", 34),
    ColumnDef::new("category", "CATEGORY", 11),
    ColumnDef::new("status", "STATUS", 14),
    ColumnDef::new("owner", "OWNER", 12),
    ColumnDef::new("next_review", "NEXT REVIEW", 11),
    ColumnDef::new("updated", "UPDATED", 16),
];

fn document_row(doc: &Document) -> TableRow {
    TableRow::new(doc.id.to_string())
        .cell("id", CellValue::Id(doc.id.to_string()))
        .cell("reference", CellValue::Text(doc.reference.clone()))
        .cell("title", CellValue::Text(doc.title.clone()))
        .cell("category", CellValue::Category(doc.category))
        .cell("status", CellValue::Status(doc.status))
        .cell("owner", CellValue::Text(doc.owner.clone()))
        .cell(
            "next_review",
            match doc.next_review {
                Some(date) => CellValue::Date(date),
                None => CellValue::Empty,
            },
        )
        .cell("updated", CellValue::DateTime(doc.updated_at))
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let vault = utils::discover_vault(global)?;
    let config = Config::load();
    let registry = utils::open_registry(&vault)?;

    let filter = DocumentFilter {
        category: args
            .category
            .map(|c| c.parse::<Category>())
            .transpose()
            .map_err(|e| miette::miette!("{}", e))?,
        status: args
            .status
            .map(|s| s.parse::<Status>())
            .transpose()
            .map_err(|e| miette::miette!("{}", e))?,
        owner: args.owner,
        process: args.process,
        search: args.search,
        due: args.due.map(|d| match d {
            DueFilter::Overdue => DueBucket::Overdue,
            DueFilter::Soon => DueBucket::DueSoon,
        }),
        due_horizon_days: config.due_soon_days(),
        include_archived: args.archived,
        limit: args.limit,
        offset: args.offset,
    };

    let documents = registry.list_documents(&filter).into_diagnostic()?;

    match utils::output_format(global, &config) {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&documents).into_diagnostic()?
            );
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&documents).into_diagnostic()?);
        }
        format => {
            let config = if global.quiet {
                TableConfig::for_pipe()
            } else {
                TableConfig::default()
            };
            TableFormatter::new(DOC_COLUMNS, "document")
                .with_config(config)
                .output(documents.iter().map(document_row), format);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// doc show
// ---------------------------------------------------------------------------

#[derive(Debug, clap::Args)]
pub struct ShowArgs {
    /// Document id or reference code
    pub id: String,
}

#[derive(Serialize)]
struct DocumentDetail {
    document: Document,
    versions: Vec<Version>,
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let vault = utils::discover_vault(global)?;
    let config = Config::load();
    let registry = utils::open_registry(&vault)?;

    let document = registry.find_document(&args.id).into_diagnostic()?;
    let versions = registry.list_versions(&document.id).into_diagnostic()?;
    let detail = DocumentDetail { document, versions };

    match utils::output_format(global, &config) {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&detail).into_diagnostic()?
            );
        }
        _ => {
            print!("{}", serde_yml::to_string(&detail).into_diagnostic()?);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// doc history
// ---------------------------------------------------------------------------

#[derive(Debug, clap::Args)]
pub struct HistoryArgs {
    /// Document id or reference code
    pub id: String,
}

const VERSION_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 16),
    ColumnDef::new("number", "VER", 4),
    ColumnDef::new("status", "STATUS", 14),
    ColumnDef::new("file", "FILE", 26),
    ColumnDef::new("created_by", "CREATED BY", 12),
    ColumnDef::new("created", "CREATED", 16),
    ColumnDef::new("decided_by", "DECIDED BY", 12),
    ColumnDef::new("change", "CHANGE", 34),
];

fn run_history(args: HistoryArgs, global: &GlobalOpts) -> Result<()> {
    let vault = utils::discover_vault(global)?;
    let config = Config::load();
    let registry = utils::open_registry(&vault)?;

    let document = registry.find_document(&args.id).into_diagnostic()?;
    let versions = registry.list_versions(&document.id).into_diagnostic()?;
    let events = registry.list_events(&document.id).into_diagnostic()?;

    if !global.quiet {
        println!(
            "{} - {} ({})",
            style(&document.reference).cyan().bold(),
            document.title,
            document.id
        );
        println!();
    }

    let rows = versions.iter().map(|v| {
        TableRow::new(v.id.to_string())
            .cell("id", CellValue::Id(v.id.to_string()))
            .cell("number", CellValue::Number(i64::from(v.number)))
            .cell("status", CellValue::Status(v.status))
            .cell("file", CellValue::Text(v.content.file_name.clone()))
            .cell("created_by", CellValue::Text(v.created_by.clone()))
            .cell("created", CellValue::DateTime(v.created_at))
            .cell(
                "decided_by",
                match &v.approved_by {
                    Some(who) => CellValue::Text(who.clone()),
                    None => CellValue::Empty,
                },
            )
            .cell("change", CellValue::Text(v.change_description.clone()))
    });
    TableFormatter::new(VERSION_COLUMNS, "version")
        .with_config(TableConfig::for_pipe())
        .output(rows, utils::output_format(global, &config));

    if !global.quiet && !events.is_empty() {
        println!();
        println!("{}", style("Audit trail").bold());
        for event in &events {
            let note = event
                .note
                .as_deref()
                .map(|n| format!(": {}", n))
                .unwrap_or_default();
            println!(
                "  {}  {:<16} {}{}",
                event.at.format("%Y-%m-%d %H:%M"),
                event.event,
                event.actor,
                note
            );
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// doc update
// ---------------------------------------------------------------------------

#[derive(Debug, clap::Args)]
pub struct UpdateArgs {
    /// Document id or reference code
    pub id: String,

    /// New title
    #[arg(long, short = 't')]
    pub title: Option<String>,

    /// New description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// New owning process
    #[arg(long)]
    pub process: Option<String>,

    /// New owner
    #[arg(long)]
    pub owner: Option<String>,

    /// Replace the tag set (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// New review frequency in months (applies at the next approval)
    #[arg(long)]
    pub frequency: Option<u32>,
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let vault = utils::discover_vault(global)?;
    let mut registry = utils::open_registry(&vault)?;
    let document = registry.find_document(&args.id).into_diagnostic()?;

    let update = DocumentUpdate {
        title: args.title,
        description: args.description,
        process: args.process,
        owner: args.owner,
        tags: if args.tags.is_empty() {
            None
        } else {
            Some(args.tags)
        },
    };

    if update.is_empty() && args.frequency.is_none() {
        return Err(miette::miette!("nothing to update"));
    }

    if !update.is_empty() {
        registry
            .update_document(&document.id, update)
            .into_diagnostic()?;
    }
    if let Some(months) = args.frequency {
        registry
            .set_review_frequency(&document.id, months)
            .into_diagnostic()?;
        if !global.quiet {
            println!(
                "  review frequency is now {} month(s); the next approval reschedules the review",
                months
            );
        }
    }

    if !global.quiet {
        println!(
            "{} Updated {}",
            style("✓").green(),
            style(&document.reference).cyan()
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// doc archive
// ---------------------------------------------------------------------------

#[derive(Debug, clap::Args)]
pub struct ArchiveArgs {
    /// Document id or reference code
    pub id: String,

    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

fn run_archive(args: ArchiveArgs, global: &GlobalOpts) -> Result<()> {
    let vault = utils::discover_vault(global)?;
    let config = Config::load();
    let actor = utils::current_actor(&vault, &config)?;
    let mut registry = utils::open_registry(&vault)?;
    let document = registry.find_document(&args.id).into_diagnostic()?;

    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Archive {} \"{}\"? It will leave default listings",
                document.reference, document.title
            ))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let archived = registry
        .archive_document(&document.id, &actor)
        .into_diagnostic()?;

    if !global.quiet {
        println!(
            "{} Archived {} ({})",
            style("✓").green(),
            style(&archived.reference).cyan(),
            archived.id
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// doc revise
// ---------------------------------------------------------------------------

#[derive(Debug, clap::Args)]
pub struct ReviseArgs {
    /// Document id or reference code
    pub id: String,

    /// File holding the revised content
    #[arg(long)]
    pub file: PathBuf,

    /// What changed relative to the approved version
    #[arg(long, short = 'm')]
    pub message: String,
}

fn run_revise(args: ReviseArgs, global: &GlobalOpts) -> Result<()> {
    let vault = utils::discover_vault(global)?;
    let config = Config::load();
    let actor = utils::current_actor(&vault, &config)?;
    let mut registry = utils::open_registry(&vault)?;
    let document = registry.find_document(&args.id).into_diagnostic()?;

    let content = utils::upload_file(&vault, &args.file)?;
    let version = registry
        .revise_document(&document.id, content, &args.message, &actor)
        .into_diagnostic()?;

    notify_best_effort(
        &utils::notifier(&vault),
        &Notification {
            event: Event::Submitted,
            document_id: document.id.to_string(),
            reference: document.reference.clone(),
            actor: actor.id.clone(),
            detail: format!("v{} pending review", version.number),
        },
    );

    if !global.quiet {
        println!(
            "{} Created v{} of {} ({})",
            style("✓").green(),
            version.number,
            style(&document.reference).cyan(),
            style(version.status).yellow()
        );
        println!("  the approved version keeps serving until this one is approved");
    } else {
        println!("{}", version.id);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// doc import
// ---------------------------------------------------------------------------

#[derive(Debug, clap::Args)]
pub struct ImportArgs {
    /// CSV file with columns: reference,title,category,file
    /// (optional: description,process,owner,frequency,tags)
    pub file: PathBuf,

    /// Validate rows without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Keep going past bad rows
    #[arg(long)]
    pub skip_errors: bool,
}

#[derive(Default)]
struct ImportStats {
    rows: usize,
    created: usize,
    errors: usize,
}

fn run_import(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let vault = utils::discover_vault(global)?;
    let config = Config::load();
    let actor = utils::current_actor(&vault, &config)?;
    let mut registry = utils::open_registry(&vault)?;

    let file = File::open(&args.file)
        .map_err(|e| miette::miette!("cannot open {}: {}", args.file.display(), e))?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));

    let headers = rdr.headers().into_diagnostic()?.clone();
    let index_of = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
    let col_reference = index_of("reference");
    let col_title = index_of("title");
    let col_category = index_of("category");
    let col_file = index_of("file");
    let col_description = index_of("description");
    let col_process = index_of("process");
    let col_owner = index_of("owner");
    let col_frequency = index_of("frequency");
    let col_tags = index_of("tags");

    let base_dir = args.file.parent().map(PathBuf::from).unwrap_or_default();
    let mut stats = ImportStats::default();

    for (row_idx, result) in rdr.records().enumerate() {
        let row_num = row_idx + 2; // 1-indexed plus header row
        stats.rows += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                stats.errors += 1;
                eprintln!("{} Row {}: CSV parse error: {}", style("✗").red(), row_num, e);
                if !args.skip_errors {
                    return Err(miette::miette!("CSV parse error at row {}: {}", row_num, e));
                }
                continue;
            }
        };

        let field = |idx: Option<usize>| -> Option<String> {
            idx.and_then(|i| record.get(i))
                .map(str::to_string)
                .filter(|s| !s.is_empty())
        };

        let row = (|| -> Result<()> {
            let reference = field(col_reference)
                .ok_or_else(|| miette::miette!("missing required field 'reference'"))?;
            let title = field(col_title)
                .ok_or_else(|| miette::miette!("missing required field 'title'"))?;
            let category: Category = field(col_category)
                .ok_or_else(|| miette::miette!("missing required field 'category'"))?
                .parse()
                .map_err(|e: String| miette::miette!("{}", e))?;
            let file_path = field(col_file)
                .ok_or_else(|| miette::miette!("missing required field 'file'"))?;
            let frequency = match field(col_frequency) {
                Some(raw) => raw
                    .parse::<u32>()
                    .map_err(|e| miette::miette!("bad frequency '{}': {}", raw, e))?,
                None => 12,
            };
            let tags = field(col_tags)
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default();

            if args.dry_run {
                return Ok(());
            }

            // Relative file paths resolve next to the CSV
            let path = {
                let p = PathBuf::from(&file_path);
                if p.is_absolute() {
                    p
                } else {
                    base_dir.join(p)
                }
            };
            let content = utils::upload_file(&vault, &path)?;

            let new = NewDocument {
                reference,
                title,
                description: field(col_description),
                category,
                process: field(col_process),
                tags,
                owner: field(col_owner).unwrap_or_else(|| config.owner()),
                author: None,
                review_frequency_months: frequency,
            };
            registry.create_document(new, content, &actor).into_diagnostic()?;
            Ok(())
        })();

        match row {
            Ok(()) => stats.created += 1,
            Err(e) => {
                stats.errors += 1;
                eprintln!("{} Row {}: {}", style("✗").red(), row_num, e);
                if !args.skip_errors {
                    return Err(e);
                }
            }
        }
    }

    if !global.quiet {
        let verb = if args.dry_run { "validated" } else { "imported" };
        println!(
            "{} {} {} of {} row(s), {} error(s)",
            style("✓").green(),
            verb,
            stats.created,
            stats.rows,
            stats.errors
        );
    }
    Ok(())
}
