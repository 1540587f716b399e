//! # History Subcommand
//!
//! Browse the JSONL history and re-render stored reports.
//!
//! ```bash
//! tde history list --limit 10
//! tde history show 6f1c...e2 --json
//! tde history refresh 6f1c...e2
//! ```

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tde_core::{format_brl, Timestamp};
use tde_engine::{EventKind, HistoryEvent};
use uuid::Uuid;

use crate::Settings;

#[derive(Args, Debug)]
pub struct HistoryArgs {
    #[command(subcommand)]
    pub command: HistoryCommand,
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    /// List stored events, most recent first.
    List {
        /// Maximum number of events to show.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Print a stored report.
    Show {
        uuid: Uuid,

        /// Print the whole event as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Re-render a stored report and record it as a new event.
    Refresh { uuid: Uuid },
}

/// Execute the history subcommand.
pub fn run_history(args: &HistoryArgs, settings: &Settings) -> Result<u8> {
    let history = settings.history();
    let location = || format!("history file: {}", history.path().display());

    match &args.command {
        HistoryCommand::List { limit } => {
            let events = history.list(*limit).with_context(location)?;
            if events.is_empty() {
                println!("No diagnostics recorded in {}", history.path().display());
            }
            for event in &events {
                println!("{}", summary_line(event));
            }
        }
        HistoryCommand::Show { uuid, json } => {
            let event = history.find(uuid).with_context(location)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&event)?);
            } else {
                println!("{}", event.output.relatorio_texto);
            }
        }
        HistoryCommand::Refresh { uuid } => {
            let event = history.refresh(uuid, Timestamp::now()).with_context(location)?;
            println!("{}", event.output.relatorio_texto);
            eprintln!("refreshed as {}", event.uuid);
        }
    }
    Ok(0)
}

/// One-line listing entry.
pub fn summary_line(event: &HistoryEvent) -> String {
    let kind = match event.evento_tipo {
        EventKind::Diagnostico => "diagnostico",
        EventKind::ReportRefresh => "refresh",
    };
    format!(
        "{}  {}  {:<11}  {:<8}  {:>16}  {}",
        event.timestamp.to_br(),
        event.uuid,
        kind,
        event.output.regime.as_str(),
        format_brl(event.output.imposto_atual),
        event.output.nome_empresa,
    )
}
