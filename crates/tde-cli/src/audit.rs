//! # Audit Subcommand
//!
//! Runs the ruleset integrity audit, writes the full report and prints a
//! summary. Exit codes: 0 on PASS, 1 on FAIL, 2 when the audit cannot run.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tde_integrity::{audit_ruleset, write_report, IntegrityAudit};

use crate::Settings;

pub const EXIT_PASS: u8 = 0;
pub const EXIT_FAIL: u8 = 1;
pub const EXIT_ERROR: u8 = 2;

#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Ruleset to audit. Defaults to the configured ruleset.
    pub ruleset: Option<String>,

    /// Print the summary as JSON.
    #[arg(long)]
    pub json: bool,

    /// Skip writing the report file.
    #[arg(long)]
    pub no_report: bool,
}

/// Execute the audit subcommand.
pub fn run_audit(args: &AuditArgs, settings: &Settings) -> Result<u8> {
    let ruleset_id = args
        .ruleset
        .clone()
        .unwrap_or_else(|| settings.engine.default_ruleset_id.clone());

    let audit = match audit_ruleset(&settings.store(), &ruleset_id) {
        Ok(audit) => audit,
        Err(e) => {
            tracing::error!(ruleset_id = %ruleset_id, "integrity audit could not run: {e}");
            return Ok(EXIT_ERROR);
        }
    };

    let report = if args.no_report {
        None
    } else {
        Some(
            write_report(&audit, &settings.storage.outputs_dir)
                .context("failed to write the audit report")?,
        )
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&audit.summary())?);
    } else {
        print_summary(&audit, report.as_ref());
    }
    Ok(exit_code(&audit))
}

pub fn exit_code(audit: &IntegrityAudit) -> u8 {
    if audit.status.is_pass() {
        EXIT_PASS
    } else {
        EXIT_FAIL
    }
}

fn print_summary(audit: &IntegrityAudit, report: Option<&PathBuf>) {
    let summary = audit.summary();
    println!("  ruleset:      {}", audit.ruleset_id);
    println!("  status:       {}", summary.status);
    println!("  files:        {}", summary.checked_files.len());
    println!("  differences:  {}", summary.difference_count);
    println!("  failed:       {}", summary.failed_checks);
    println!("  warnings:     {}", summary.warning_count);
    println!("  ruleset hash: {}", summary.ruleset_hash);
    println!("  baseline:     {}", summary.baseline_hash);
    for check in audit.failures() {
        println!("  FAIL {}", check.name);
    }
    if let Some(path) = report {
        println!("  report:       {}", path.display());
    }
}
