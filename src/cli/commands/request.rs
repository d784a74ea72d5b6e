//! `gestdoc request` command - Custody request management

use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{
    effective_format, finish, open_archive, print_cancelled, FormError, PromptConfirmation,
};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;
use crate::core::identity::RecordId;
use crate::core::project::Project;
use crate::core::shortid::{parse_reference, ShortIdIndex};
use crate::entities::entity::EntityType;
use crate::entities::request::{RequestDraft, RequestRecord, RequestStatus, Treatment};
use crate::store::requests::validate;
use crate::store::{eligible_requesters, CascadingSelection, DeleteOutcome, EntityStore};

#[derive(Subcommand, Debug)]
pub enum RequestCommands {
    /// List requests, most recent first
    List(ListArgs),

    /// Register a new request
    New(NewArgs),

    /// Show a request's details
    Show(ShowArgs),

    /// Set a request's status
    Status(StatusArgs),

    /// Delete a request
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by status (in-progress, finished)
    #[arg(long, short = 's')]
    pub status: Option<RequestStatus>,

    /// Filter by sector (exact name)
    #[arg(long)]
    pub sector: Option<String>,

    /// Search in box number and client (case-insensitive substring)
    #[arg(long)]
    pub search: Option<String>,

    /// Limit output to N items
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show count only, not the items
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug, Default)]
pub struct NewArgs {
    /// Box number
    #[arg(long)]
    pub caixa: Option<String>,

    /// Client
    #[arg(long)]
    pub cliente: Option<String>,

    /// Location the box came from
    #[arg(long = "origem")]
    pub localizacao_origem: Option<String>,

    /// Location the box is in now
    #[arg(long = "atual")]
    pub localizacao_atual: Option<String>,

    /// Sector (exact name)
    #[arg(long)]
    pub sector: Option<String>,

    /// Requester, one of the sector's requesters
    #[arg(long)]
    pub solicitante: Option<String>,

    /// Treatment (e.g. preparacao-z1, digitalizacao)
    #[arg(long)]
    pub tratamento: Option<Treatment>,

    /// Responsible operator (default: configured operator)
    #[arg(long)]
    pub operador: Option<String>,

    /// Start date, YYYY-MM-DD (default: today)
    #[arg(long = "inicio")]
    pub data_inicio: Option<NaiveDate>,

    /// Initial status
    #[arg(long)]
    pub estado: Option<RequestStatus>,

    /// Prompt for each field, choosing the requester from the sector's list
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Request id or @N short id
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// Request id or @N short id
    pub id: String,

    /// New status (in-progress, finished)
    pub status: RequestStatus,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Request id or @N short id
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("caixa", "CAIXA", 12),
    ColumnDef::new("cliente", "CLIENTE", 20),
    ColumnDef::new("sector", "SECTOR", 16),
    ColumnDef::new("solicitante", "SOLICITANTE", 20),
    ColumnDef::new("tratamento", "TRATAMENTO", 22),
    ColumnDef::new("inicio", "INÍCIO", 10),
    ColumnDef::new("dias", "DIAS", 5),
    ColumnDef::new("estado", "ESTADO", 10),
];

pub fn run(cmd: RequestCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        RequestCommands::List(args) => run_list(args, global),
        RequestCommands::New(args) => run_new(args, global),
        RequestCommands::Show(args) => run_show(args, global),
        RequestCommands::Status(args) => run_status(args, global),
        RequestCommands::Delete(args) => run_delete(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let (project, config, archive) = open_archive(global)?;

    let search = args.search.as_deref().map(str::to_lowercase);
    let mut records: Vec<&RequestRecord> = archive
        .requests()
        .query(|r| {
            args.status.map_or(true, |s| r.estado == s)
                && args.sector.as_deref().map_or(true, |s| r.sector == s)
                && search.as_deref().map_or(true, |needle| {
                    r.caixa.to_lowercase().contains(needle)
                        || r.cliente.to_lowercase().contains(needle)
                })
        })
        .collect();

    if let Some(limit) = args.limit {
        records.truncate(limit);
    }

    if args.count {
        println!("{}", records.len());
        return Ok(());
    }

    let format = match effective_format(global, &config) {
        OutputFormat::Auto => OutputFormat::Tsv,
        f => f,
    };

    if records.is_empty() {
        match format {
            OutputFormat::Json | OutputFormat::Yaml => println!("[]"),
            OutputFormat::Tsv if !global.quiet => {
                println!("No requests found.");
                println!();
                println!(
                    "Register one with: {}",
                    style("gestdoc request new --interactive").yellow()
                );
            }
            _ => {}
        }
        return Ok(());
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&records).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&records).into_diagnostic()?);
        }
        _ => {
            let short_ids = ShortIdIndex::refresh(&project, records.iter().map(|r| &r.id));
            let rows: Vec<TableRow> = records
                .iter()
                .map(|r| {
                    TableRow::new(&r.id, &short_ids)
                        .cell("caixa", CellValue::Text(r.caixa.clone()))
                        .cell("cliente", CellValue::Text(r.cliente.clone()))
                        .cell("sector", CellValue::Text(r.sector.clone()))
                        .cell("solicitante", CellValue::Text(r.solicitante.clone()))
                        .cell("tratamento", CellValue::Type(r.tratamento.label().to_string()))
                        .cell("inicio", CellValue::Date(r.data_inicio))
                        .cell("dias", CellValue::Number(i64::from(r.dias)))
                        .cell("estado", CellValue::Status(r.estado))
                })
                .collect();
            TableFormatter::new(COLUMNS, "request")
                .quiet(global.quiet)
                .output(&rows, format)?;
        }
    }
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let (_project, config, mut archive) = open_archive(global)?;

    let draft = if args.interactive {
        prompt_draft(archive.entities(), &config, args)?
    } else {
        let draft = draft_from_args(&config, args);
        validate(&draft)?;
        check_selection(archive.entities(), &draft)?;
        draft
    };

    let record = finish(archive.create_request(draft)?)?;

    if global.quiet {
        println!("{}", record.id);
    } else {
        println!(
            "{} Registered request {} for box {} ({} day(s))",
            style("✓").green(),
            style(&record.id).cyan(),
            style(&record.caixa).yellow(),
            record.dias
        );
    }
    Ok(())
}

fn draft_from_args(config: &Config, args: NewArgs) -> RequestDraft {
    RequestDraft {
        caixa: args.caixa.unwrap_or_default(),
        cliente: args.cliente.unwrap_or_default(),
        localizacao_origem: args.localizacao_origem.unwrap_or_default(),
        localizacao_atual: args.localizacao_atual.unwrap_or_default(),
        sector: args.sector.unwrap_or_default(),
        solicitante: args.solicitante.unwrap_or_default(),
        tratamento: args.tratamento.unwrap_or_default(),
        operador: args.operador.unwrap_or_else(|| config.operator()),
        data_inicio: args.data_inicio,
        estado: args.estado.unwrap_or_default(),
    }
}

/// The sector must exist under its exact name and the requester must be one
/// of its requesters
fn check_selection(store: &EntityStore, draft: &RequestDraft) -> Result<(), FormError> {
    let sector = draft.sector.trim();
    let requester = draft.solicitante.trim();

    if !store.query(EntityType::Sector, None).any(|s| s.name == sector) {
        return Err(FormError::UnknownSector {
            name: sector.to_string(),
        });
    }
    if !eligible_requesters(store, sector)
        .iter()
        .any(|e| e.name == requester)
    {
        return Err(FormError::IneligibleRequester {
            requester: requester.to_string(),
            sector: sector.to_string(),
        });
    }
    Ok(())
}

/// Walk the form fields in order; values passed as flags become defaults
fn prompt_draft(store: &EntityStore, config: &Config, args: NewArgs) -> Result<RequestDraft> {
    let theme = ColorfulTheme::default();

    println!();
    println!("{} New custody request", style("◆").cyan());
    println!("{}", style("─".repeat(50)).dim());

    let caixa = prompt_text(&theme, "Número da caixa", args.caixa, false)?;
    let cliente = prompt_text(&theme, "Cliente", args.cliente, false)?;
    let localizacao_origem =
        prompt_text(&theme, "Localização origem", args.localizacao_origem, true)?;
    let localizacao_atual = prompt_text(&theme, "Localização atual", args.localizacao_atual, true)?;

    let sectors: Vec<&str> = store
        .query(EntityType::Sector, None)
        .map(|e| e.name.as_str())
        .collect();
    if sectors.is_empty() {
        return Err(FormError::EmptyChoice { what: "sectors" }.into());
    }
    let default_sector = args
        .sector
        .as_deref()
        .and_then(|s| sectors.iter().position(|n| *n == s))
        .unwrap_or(0);
    let sector_idx = Select::with_theme(&theme)
        .with_prompt("Sector")
        .items(&sectors)
        .default(default_sector)
        .interact()
        .into_diagnostic()?;

    let mut selection = CascadingSelection::new();
    selection.select_sector(Some(sectors[sector_idx]));

    let requesters: Vec<String> = selection
        .requester_options(store)
        .iter()
        .map(|e| e.name.clone())
        .collect();
    if requesters.is_empty() {
        return Err(FormError::NoRequesters {
            sector: sectors[sector_idx].to_string(),
        }
        .into());
    }
    let default_requester = args
        .solicitante
        .as_deref()
        .and_then(|s| requesters.iter().position(|n| n == s))
        .unwrap_or(0);
    let requester_idx = Select::with_theme(&theme)
        .with_prompt("Solicitante")
        .items(&requesters)
        .default(default_requester)
        .interact()
        .into_diagnostic()?;
    selection.select_requester(store, &requesters[requester_idx]);

    let treatments: Vec<&str> = Treatment::all().iter().map(|t| t.label()).collect();
    let default_treatment = args
        .tratamento
        .and_then(|t| Treatment::all().iter().position(|x| *x == t))
        .unwrap_or(0);
    let treatment_idx = Select::with_theme(&theme)
        .with_prompt("Tratamento")
        .items(&treatments)
        .default(default_treatment)
        .interact()
        .into_diagnostic()?;

    let operador = prompt_operator(&theme, store, args.operador.unwrap_or_else(|| config.operator()))?;

    let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
    let start: String = Input::with_theme(&theme)
        .with_prompt("Data de início (YYYY-MM-DD)")
        .with_initial_text(
            args.data_inicio
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or(today),
        )
        .validate_with(|input: &String| -> Result<(), String> {
            NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
                .map(|_| ())
                .map_err(|_| "expected a date like 2026-10-17".to_string())
        })
        .interact_text()
        .into_diagnostic()?;
    let data_inicio = NaiveDate::parse_from_str(start.trim(), "%Y-%m-%d").into_diagnostic()?;

    Ok(RequestDraft {
        caixa,
        cliente,
        localizacao_origem,
        localizacao_atual,
        sector: selection.sector().unwrap_or_default().to_string(),
        solicitante: selection.requester().unwrap_or_default().to_string(),
        tratamento: Treatment::all()[treatment_idx],
        operador,
        data_inicio: Some(data_inicio),
        estado: args.estado.unwrap_or_default(),
    })
}

fn prompt_text(
    theme: &ColorfulTheme,
    prompt: &str,
    initial: Option<String>,
    optional: bool,
) -> Result<String> {
    let mut input = Input::<String>::with_theme(theme)
        .with_prompt(prompt)
        .allow_empty(optional);
    if let Some(text) = initial {
        input = input.with_initial_text(text);
    }
    input.interact_text().into_diagnostic()
}

/// Operator choice from the registered operators, plus a blank entry
fn prompt_operator(theme: &ColorfulTheme, store: &EntityStore, current: String) -> Result<String> {
    let mut options: Vec<&str> = vec!["(nenhum)"];
    options.extend(
        store
            .query(EntityType::Operator, None)
            .map(|e| e.name.as_str()),
    );
    let default = options
        .iter()
        .skip(1)
        .position(|n| *n == current)
        .map_or(0, |i| i + 1);
    let idx = Select::with_theme(theme)
        .with_prompt("Operador responsável")
        .items(&options)
        .default(default)
        .interact()
        .into_diagnostic()?;
    Ok(if idx == 0 {
        String::new()
    } else {
        options[idx].to_string()
    })
}

fn find_request<'a>(
    project: &Project,
    records: &'a [RequestRecord],
    reference: &str,
) -> Result<&'a RequestRecord> {
    let id = parse_reference(reference, project);
    records.iter().find(|r| r.id == id).ok_or_else(|| {
        miette::miette!(
            help = "Run 'gestdoc request list' to refresh @N short ids.",
            "No request found matching '{}'",
            reference
        )
    })
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let (project, config, archive) = open_archive(global)?;
    let record = find_request(&project, archive.requests().all(), &args.id)?;

    match effective_format(global, &config) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(record).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(record).into_diagnostic()?);
        }
        OutputFormat::Id => println!("{}", record.id),
        _ => {
            let operador = if record.operador.is_empty() {
                "-"
            } else {
                record.operador.as_str()
            };
            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("ID").bold(), style(&record.id).cyan());
            println!("{}: {}", style("Caixa").bold(), style(&record.caixa).yellow());
            println!("{}: {}", style("Cliente").bold(), record.cliente);
            println!("{}: {}", style("Origem").bold(), record.localizacao_origem);
            println!("{}: {}", style("Atual").bold(), record.localizacao_atual);
            println!("{}: {}", style("Sector").bold(), record.sector);
            println!("{}: {}", style("Solicitante").bold(), record.solicitante);
            println!("{}: {}", style("Tratamento").bold(), record.tratamento);
            println!("{}: {}", style("Operador").bold(), operador);
            println!("{}: {}", style("Estado").bold(), record.estado);
            println!("{}", style("─".repeat(60)).dim());
            println!(
                "{}: {} | {}: {} | {}: {}",
                style("Início").dim(),
                record.data_inicio.format("%Y-%m-%d"),
                style("Registo").dim(),
                record.data_atual.format("%Y-%m-%d"),
                style("Dias").dim(),
                record.dias
            );
        }
    }
    Ok(())
}

fn run_status(args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let (project, _config, mut archive) = open_archive(global)?;
    let id: RecordId = find_request(&project, archive.requests().all(), &args.id)?
        .id
        .clone();

    finish(archive.update_request_status(&id, args.status)?)?;
    if !global.quiet {
        println!(
            "{} Request {} is now {}",
            style("✓").green(),
            style(&id).cyan(),
            style(args.status).yellow()
        );
    }
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let (project, _config, mut archive) = open_archive(global)?;
    let id: RecordId = find_request(&project, archive.requests().all(), &args.id)?
        .id
        .clone();

    let confirm = PromptConfirmation {
        assume_yes: args.yes,
    };
    match finish(archive.delete_request(&id, &confirm)?)? {
        DeleteOutcome::Cancelled => print_cancelled(),
        DeleteOutcome::Deleted(_) => {
            if !global.quiet {
                println!("{} Deleted request {}", style("✓").green(), style(&id).cyan());
            }
        }
    }
    Ok(())
}
