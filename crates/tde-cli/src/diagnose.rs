//! # Diagnose Subcommand
//!
//! Reads a JSON request, runs the diagnostic and prints either the
//! narrative report or the full output as JSON.
//!
//! ```bash
//! tde diagnose request.json
//! cat request.json | tde diagnose - --json --no-history
//! tde diagnose request.json --mode estrategico --report
//! ```

use std::io::Read as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tde_core::Timestamp;
use tde_engine::{DiagnosticInput, DiagnosticOutput};

use crate::Settings;

#[derive(Args, Debug)]
pub struct DiagnoseArgs {
    /// JSON request file, or `-` to read standard input.
    pub input: PathBuf,

    /// Print the full output as JSON instead of the narrative.
    #[arg(long)]
    pub json: bool,

    /// Analysis mode (`conservador` or `estrategico`), overriding the request.
    #[arg(long)]
    pub mode: Option<String>,

    /// Do not append the diagnostic to the history file.
    #[arg(long)]
    pub no_history: bool,

    /// Also write the narrative into the outputs directory.
    #[arg(long)]
    pub report: bool,
}

/// What a diagnose run produced besides its printout.
#[derive(Debug)]
pub struct DiagnoseOutcome {
    pub output: DiagnosticOutput,
    pub recorded: bool,
    pub report_path: Option<PathBuf>,
}

/// Execute the diagnose subcommand.
pub fn run_diagnose(args: &DiagnoseArgs, settings: &Settings) -> Result<u8> {
    let outcome = execute(args, settings, Timestamp::now())?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome.output)?);
    } else {
        println!("{}", outcome.output.relatorio_texto);
    }
    if let Some(path) = &outcome.report_path {
        eprintln!("report written: {}", path.display());
    }
    Ok(0)
}

/// Run the diagnostic and persist what `args` asks for.
pub fn execute(args: &DiagnoseArgs, settings: &Settings, at: Timestamp) -> Result<DiagnoseOutcome> {
    let mut input = read_input(&args.input)?;
    if let Some(mode) = &args.mode {
        input.modo_analise = Some(mode.clone());
    }

    let output = settings
        .service()
        .run_at(&input, at)
        .with_context(|| format!("diagnostic failed for {:?}", input.nome_empresa))?;

    if !args.no_history {
        let history = settings.history();
        history
            .append(&output)
            .with_context(|| format!("failed to record history in {}", history.path().display()))?;
    }

    let report_path = if args.report {
        Some(write_narrative(&output, &settings.storage.outputs_dir)?)
    } else {
        None
    };

    Ok(DiagnoseOutcome {
        recorded: !args.no_history,
        output,
        report_path,
    })
}

fn read_input(path: &Path) -> Result<DiagnosticInput> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read request from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read request: {}", path.display()))?
    };
    serde_json::from_str(&raw)
        .with_context(|| format!("malformed diagnostic request: {}", path.display()))
}

fn write_narrative(output: &DiagnosticOutput, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory: {}", dir.display()))?;
    let path = dir.join(format!(
        "diagnostico_{}_{}.txt",
        output.audit.generated_at.file_stamp(),
        output.id.simple()
    ));
    std::fs::write(&path, &output.relatorio_texto)
        .with_context(|| format!("failed to write report: {}", path.display()))?;
    tracing::info!(path = %path.display(), "diagnostic report written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_request_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("req.json");
        std::fs::write(&path, "{\"nome_empresa\": 3}").unwrap();
        let err = read_input(&path).unwrap_err();
        assert!(format!("{err:#}").contains("malformed diagnostic request"));
    }

    #[test]
    fn missing_request_file() {
        let err = read_input(Path::new("/nonexistent/req.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read request"));
    }
}
