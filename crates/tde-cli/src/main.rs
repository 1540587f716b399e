//! # tde CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tde_cli::audit::{run_audit, AuditArgs};
use tde_cli::diagnose::{run_diagnose, DiagnoseArgs};
use tde_cli::history::{run_history, HistoryArgs};
use tde_cli::{GlobalArgs, Settings};

/// Tax-regime diagnostic for Brazilian companies.
///
/// Compares Simples Nacional, Lucro Presumido and Lucro Real under a
/// versioned ruleset, recommends a regime and audits the ruleset itself.
#[derive(Parser, Debug)]
#[command(name = "tde", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a diagnostic from a JSON request.
    Diagnose(DiagnoseArgs),

    /// Audit a ruleset against its baseline and write the report.
    Audit(AuditArgs),

    /// List, show and refresh stored diagnostics.
    History(HistoryArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let settings = match Settings::resolve(&cli.global) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(1);
        }
    };
    tracing::debug!(
        rulesets_dir = %settings.engine.rulesets_dir.display(),
        ruleset_id = %settings.engine.default_ruleset_id,
        demo = settings.engine.demo,
        "configuration resolved"
    );

    let result = match &cli.command {
        Commands::Diagnose(args) => run_diagnose(args, &settings),
        Commands::Audit(args) => run_audit(args, &settings),
        Commands::History(args) => run_history(args, &settings),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tde_cli::history::HistoryCommand;

    #[test]
    fn cli_parse_diagnose_defaults() {
        let cli = Cli::try_parse_from(["tde", "diagnose", "req.json"]).unwrap();
        if let Commands::Diagnose(args) = cli.command {
            assert_eq!(args.input, PathBuf::from("req.json"));
            assert!(!args.json);
            assert!(!args.no_history);
            assert!(!args.report);
            assert!(args.mode.is_none());
        } else {
            panic!("expected diagnose");
        }
    }

    #[test]
    fn cli_parse_diagnose_all_options() {
        let cli = Cli::try_parse_from([
            "tde",
            "diagnose",
            "-",
            "--json",
            "--no-history",
            "--report",
            "--mode",
            "estrategico",
        ])
        .unwrap();
        if let Commands::Diagnose(args) = cli.command {
            assert_eq!(args.input, PathBuf::from("-"));
            assert!(args.json && args.no_history && args.report);
            assert_eq!(args.mode.as_deref(), Some("estrategico"));
        } else {
            panic!("expected diagnose");
        }
    }

    #[test]
    fn cli_parse_audit() {
        let cli = Cli::try_parse_from(["tde", "audit", "BR_TAX_2026_V1", "--no-report"]).unwrap();
        if let Commands::Audit(args) = cli.command {
            assert_eq!(args.ruleset.as_deref(), Some("BR_TAX_2026_V1"));
            assert!(args.no_report);
        } else {
            panic!("expected audit");
        }
    }

    #[test]
    fn cli_parse_history_commands() {
        let cli = Cli::try_parse_from(["tde", "history", "list", "--limit", "3"]).unwrap();
        let Commands::History(args) = cli.command else {
            panic!("expected history");
        };
        assert!(matches!(args.command, HistoryCommand::List { limit: Some(3) }));

        let id = "67e55044-10b1-426f-9247-bb680e5fe0c8";
        let cli = Cli::try_parse_from(["tde", "history", "refresh", id]).unwrap();
        let Commands::History(args) = cli.command else {
            panic!("expected history");
        };
        assert!(matches!(args.command, HistoryCommand::Refresh { uuid } if uuid.to_string() == id));
    }

    #[test]
    fn cli_parse_history_rejects_bad_uuid() {
        assert!(Cli::try_parse_from(["tde", "history", "show", "not-a-uuid"]).is_err());
    }

    #[test]
    fn cli_parse_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "tde",
            "audit",
            "--demo",
            "--rulesets-dir",
            "/srv/rulesets",
            "--ruleset-id",
            "BR_TAX_2026_V1",
            "--output-dir",
            "/tmp/out",
        ])
        .unwrap();
        assert!(cli.global.demo);
        assert_eq!(cli.global.rulesets_dir, Some(PathBuf::from("/srv/rulesets")));
        assert_eq!(cli.global.ruleset_id.as_deref(), Some("BR_TAX_2026_V1"));
        assert_eq!(cli.global.output_dir, Some(PathBuf::from("/tmp/out")));
    }

    #[test]
    fn cli_parse_verbose_levels() {
        let cli = Cli::try_parse_from(["tde", "-vv", "history", "list"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn cli_parse_no_subcommand_errors() {
        assert!(Cli::try_parse_from(["tde"]).is_err());
    }
}
