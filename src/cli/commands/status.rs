//! `gestdoc status` command - Request dashboard

use console::style;
use miette::{IntoDiagnostic, Result};
use std::collections::BTreeMap;

use crate::cli::helpers::{effective_format, open_archive};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::entity::EntityType;
use crate::entities::request::RequestStatus;
use crate::store::dashboard::bar;

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// Width of the proportion bars
    #[arg(long, default_value_t = 30)]
    pub bar_width: usize,
}

pub fn run(args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let (_project, config, archive) = open_archive(global)?;
    let dashboard = archive.dashboard();

    let entity_counts: BTreeMap<&str, usize> = EntityType::all()
        .iter()
        .map(|&t| (t.singular(), archive.entities().query(t, None).count()))
        .collect();

    match effective_format(global, &config) {
        OutputFormat::Json => {
            let status = serde_json::json!({
                "requests": dashboard,
                "entities": entity_counts,
            });
            println!("{}", serde_json::to_string_pretty(&status).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            let status = serde_json::json!({
                "requests": dashboard,
                "entities": entity_counts,
            });
            print!("{}", serde_yml::to_string(&status).into_diagnostic()?);
        }
        _ => {
            let width = 60;

            println!("{}", style("gestdoc Status").bold().underlined());
            println!("{}", "═".repeat(width));
            println!();
            println!(
                "{}  {}",
                style("REQUESTS").bold(),
                style(format!("{} total", dashboard.total)).cyan()
            );
            println!("{}", "─".repeat(width));
            for share in &dashboard.by_status {
                let filled = bar(share.proportion, args.bar_width);
                let filled = match share.status {
                    RequestStatus::InProgress => style(filled).yellow(),
                    RequestStatus::Finished => style(filled).green(),
                };
                println!(
                    "  {:<12} {:>5}  {}  {:>5.1}%",
                    share.status.label(),
                    share.count,
                    filled,
                    share.proportion * 100.0
                );
            }

            println!();
            println!("{}", style("REFERENCE DATA").bold());
            println!("{}", "─".repeat(width));
            for t in EntityType::all() {
                println!(
                    "  {:<14} {:>5}",
                    t.label(),
                    entity_counts.get(t.singular()).copied().unwrap_or_default()
                );
            }
            println!("{}", "═".repeat(width));
        }
    }
    Ok(())
}
