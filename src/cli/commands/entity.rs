//! `gestdoc entity` command - Reference data management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::cli::helpers::{
    effective_format, finish, format_phone, open_archive, print_cancelled, FormError,
    PromptConfirmation,
};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;
use crate::core::identity::RecordId;
use crate::core::project::Project;
use crate::core::shortid::{parse_reference, ShortIdIndex};
use crate::entities::entity::{Entity, EntityType};
use crate::store::{eligible_requesters, DeleteOutcome, EntityStore};

#[derive(Subcommand, Debug)]
pub enum EntityCommands {
    /// List entities with filtering
    List(ListArgs),

    /// Register one entity
    Add(AddArgs),

    /// Delete entities by id, or every entity of one type
    Delete(DeleteArgs),

    /// Bulk import names from a text file or spreadsheet
    Import(ImportArgs),

    /// Requesters eligible for a sector (exact sector name)
    Requesters(RequestersArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only this type (warehouse, client, sector, operator, requester, contact, user)
    #[arg(long, short = 't')]
    pub r#type: Option<EntityType>,

    /// Only requesters of this sector (name, id or @N)
    #[arg(long, short = 's')]
    pub sector: Option<String>,

    /// Search in names (case-insensitive substring)
    #[arg(long)]
    pub search: Option<String>,

    /// Limit output to N items
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show count only, not the items
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Entity type
    pub r#type: EntityType,

    /// Name, unique within the type (case-insensitive)
    pub name: String,

    /// Sector of a requester (name, id or @N)
    #[arg(long, short = 's')]
    pub sector: Option<String>,

    /// Phone of a contact; only the digits are kept
    #[arg(long)]
    pub phone: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Entity ids or @N short ids
    #[arg(required_unless_present = "all")]
    pub ids: Vec<String>,

    /// Delete every entity of --type
    #[arg(long, requires = "type", conflicts_with = "ids")]
    pub all: bool,

    /// Type whose entities --all deletes
    #[arg(long, short = 't')]
    pub r#type: Option<EntityType>,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// Entity type to import as
    pub r#type: EntityType,

    /// Source file (.txt/.csv lines, or .xlsx/.xls/.ods first sheet)
    pub file: PathBuf,

    /// Sector every imported requester is attached to (name, id or @N)
    #[arg(long, short = 's')]
    pub sector: Option<String>,

    /// Report what would be inserted without saving
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(clap::Args, Debug)]
pub struct RequestersArgs {
    /// Sector name, matched exactly
    #[arg(long, short = 's')]
    pub sector: String,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("type", "TYPE", 10),
    ColumnDef::new("name", "NAME", 40),
    ColumnDef::new("detail", "SECTOR/PHONE", 24),
];

pub fn run(cmd: EntityCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        EntityCommands::List(args) => run_list(args, global),
        EntityCommands::Add(args) => run_add(args, global),
        EntityCommands::Delete(args) => run_delete(args, global),
        EntityCommands::Import(args) => run_import(args, global),
        EntityCommands::Requesters(args) => run_requesters(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let (project, config, archive) = open_archive(global)?;
    let store = archive.entities();

    let sector_id = match &args.sector {
        Some(reference) => Some(resolve_sector(&project, store, reference)?.id.clone()),
        None => None,
    };

    let search = args.search.as_deref().map(str::to_lowercase);
    let mut entities: Vec<&Entity> = store
        .all()
        .iter()
        .filter(|e| args.r#type.map_or(true, |t| e.entity_type == t))
        .filter(|e| match &sector_id {
            Some(id) => e.entity_type == EntityType::Requester && e.parent_id.as_ref() == Some(id),
            None => true,
        })
        .filter(|e| match &search {
            Some(needle) => e.name.to_lowercase().contains(needle),
            None => true,
        })
        .collect();

    if let Some(limit) = args.limit {
        entities.truncate(limit);
    }

    if args.count {
        println!("{}", entities.len());
        return Ok(());
    }

    print_entities(&project, &config, store, &entities, global)
}

fn print_entities(
    project: &Project,
    config: &Config,
    store: &EntityStore,
    entities: &[&Entity],
    global: &GlobalOpts,
) -> Result<()> {
    let format = match effective_format(global, config) {
        OutputFormat::Auto => OutputFormat::Tsv,
        f => f,
    };

    if entities.is_empty() {
        match format {
            OutputFormat::Json | OutputFormat::Yaml => println!("[]"),
            OutputFormat::Tsv if !global.quiet => {
                println!("No entities found.");
                println!();
                println!(
                    "Add one with: {}",
                    style("gestdoc entity add <TYPE> <NAME>").yellow()
                );
            }
            _ => {}
        }
        return Ok(());
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(entities).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(entities).into_diagnostic()?);
        }
        _ => {
            let short_ids = ShortIdIndex::refresh(project, entities.iter().map(|e| &e.id));
            let rows: Vec<TableRow> = entities
                .iter()
                .map(|e| {
                    TableRow::new(&e.id, &short_ids)
                        .cell("type", CellValue::Type(e.entity_type.singular().to_string()))
                        .cell("name", CellValue::Text(e.name.clone()))
                        .cell("detail", detail_cell(config, store, e))
                })
                .collect();
            TableFormatter::new(COLUMNS, "entity")
                .quiet(global.quiet)
                .output(&rows, format)?;
        }
    }
    Ok(())
}

/// Sector name for requesters ("N/A" when dangling), prefixed phone for contacts
fn detail_cell(config: &Config, store: &EntityStore, entity: &Entity) -> CellValue {
    match entity.entity_type {
        EntityType::Requester => {
            CellValue::Text(store.parent_name(entity).unwrap_or("N/A").to_string())
        }
        EntityType::Contact => match &entity.phone {
            Some(phone) => CellValue::Text(format_phone(config.phone_prefix(), phone)),
            None => CellValue::Empty,
        },
        _ => CellValue::Empty,
    }
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let (project, _config, mut archive) = open_archive(global)?;

    let parent_id = match (&args.sector, args.r#type) {
        (Some(reference), EntityType::Requester) => {
            Some(resolve_sector(&project, archive.entities(), reference)?.id.clone())
        }
        _ => None,
    };

    let entity = finish(archive.add_entity(
        args.r#type,
        &args.name,
        parent_id,
        args.phone.as_deref(),
    )?)?;

    if global.quiet {
        println!("{}", entity.id);
    } else {
        println!(
            "{} Added {} {} ({})",
            style("✓").green(),
            entity.entity_type,
            style(&entity.name).yellow(),
            style(&entity.id).cyan()
        );
    }
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let (project, _config, mut archive) = open_archive(global)?;

    let ids: HashSet<RecordId> = if args.all {
        match args.r#type {
            Some(t) => archive.entities().query(t, None).map(|e| e.id.clone()).collect(),
            None => HashSet::new(),
        }
    } else {
        args.ids
            .iter()
            .map(|r| parse_reference(r, &project))
            .collect()
    };

    let unknown: Vec<&RecordId> = ids
        .iter()
        .filter(|id| archive.entities().get(id).is_none())
        .collect();
    for id in &unknown {
        eprintln!("{} No entity with id {}", style("!").yellow(), id);
    }

    let confirm = PromptConfirmation {
        assume_yes: args.yes,
    };
    match finish(archive.delete_entities(&ids, &confirm)?)? {
        DeleteOutcome::Cancelled => print_cancelled(),
        DeleteOutcome::Deleted(n) => {
            if !global.quiet {
                println!("{} Deleted {} entit(ies)", style("✓").green(), n);
            }
        }
    }
    Ok(())
}

fn run_import(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let (project, _config, mut archive) = open_archive(global)?;

    let parent_id = match &args.sector {
        Some(reference) if args.r#type == EntityType::Requester => {
            Some(resolve_sector(&project, archive.entities(), reference)?.id.clone())
        }
        _ => None,
    };

    let result = if args.dry_run {
        let rows = crate::import::read_rows(&args.file)?;
        let mut preview = archive.entities().clone();
        preview.bulk_import(args.r#type, &rows, parent_id)?
    } else {
        finish(archive.import_file(args.r#type, &args.file, parent_id)?)?
    };

    let verb = if args.dry_run { "Would import" } else { "Imported" };
    println!(
        "{} {} {} {}(s), skipped {}",
        style("✓").green(),
        verb,
        style(result.inserted).cyan(),
        args.r#type,
        result.skipped
    );
    Ok(())
}

fn run_requesters(args: RequestersArgs, global: &GlobalOpts) -> Result<()> {
    let (project, config, archive) = open_archive(global)?;
    let store = archive.entities();
    let requesters = eligible_requesters(store, &args.sector);
    print_entities(&project, &config, store, &requesters, global)
}

/// Find a sector by @N alias, id, or exact name
pub(crate) fn resolve_sector<'a>(
    project: &Project,
    store: &'a EntityStore,
    reference: &str,
) -> Result<&'a Entity, FormError> {
    let id = parse_reference(reference, project);
    store
        .resolve(EntityType::Sector, id.as_str())
        .or_else(|| store.resolve(EntityType::Sector, reference))
        .ok_or_else(|| FormError::UnknownSector {
            name: reference.trim().to_string(),
        })
}
