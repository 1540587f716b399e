//! # Audit Report
//!
//! Plain-text rendering of an [`IntegrityAudit`] and the file writer used
//! by `tde audit`. File names are `ruleset_audit_<id>_<YYYYMMDD_HHMMSS>.txt`.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::audit::IntegrityAudit;
use crate::check::display_value;
use crate::error::{IntegrityError, IntegrityResult};

/// First line of every rendered report.
pub const REPORT_TITLE: &str = "=== RULESET AUDIT REPORT (FULL) ===";

fn or_na(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("N/D")
}

pub fn render_report(audit: &IntegrityAudit) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report_text(&mut out, audit);
    out
}

fn write_report_text(out: &mut String, audit: &IntegrityAudit) -> std::fmt::Result {
    writeln!(out, "{REPORT_TITLE}")?;
    writeln!(out, "Ruleset: {}", audit.ruleset_id)?;
    writeln!(out, "Timestamp: {}", audit.timestamp)?;
    writeln!(out, "Overall: {}", audit.status)?;
    writeln!(out, "Ruleset hash (SHA-256): {}", audit.ruleset_hash)?;
    writeln!(out, "Baseline hash (SHA-256): {}", audit.baseline_hash)?;
    writeln!(out)?;

    let meta = &audit.metadata;
    writeln!(out, "Metadata:")?;
    writeln!(out, "- ruleset_id: {}", meta.ruleset_id)?;
    writeln!(out, "- vigencia_inicio: {}", or_na(&meta.vigencia_inicio))?;
    writeln!(out, "- vigencia_fim: {}", or_na(&meta.vigencia_fim))?;
    writeln!(out, "- descricao: {}", or_na(&meta.descricao))?;
    writeln!(out)?;

    writeln!(out, "File hashes:")?;
    for file in &audit.checked_files {
        let hash_of = |map: &crate::hash::FileHashes| map.get(file).cloned().unwrap_or_default();
        writeln!(out, "- {file}")?;
        writeln!(out, "  ruleset : {}", hash_of(&audit.ruleset_file_hashes))?;
        writeln!(out, "  baseline: {}", hash_of(&audit.baseline_file_hashes))?;
    }
    writeln!(out)?;

    writeln!(out, "Warnings:")?;
    if audit.warnings.is_empty() {
        writeln!(out, "- none")?;
    }
    for warning in &audit.warnings {
        writeln!(out, "- {warning}")?;
    }
    writeln!(out)?;

    writeln!(out, "Checks:")?;
    for check in &audit.checks {
        writeln!(out, "{check}")?;
        if check.expected.is_some() || check.actual.is_some() {
            let side = |v: &Option<serde_json::Value>| v.as_ref().map(display_value).unwrap_or_default();
            writeln!(out, "  expected={} | actual={}", side(&check.expected), side(&check.actual))?;
        }
        if let Some(detail) = &check.detail {
            writeln!(out, "  details={detail}")?;
        }
    }
    writeln!(out)?;

    writeln!(out, "JSON diffs (baseline vs ruleset):")?;
    if audit.json_differences.is_empty() {
        write!(out, "- none")?;
    }
    for (idx, diff) in audit.json_differences.iter().enumerate() {
        if idx > 0 {
            writeln!(out)?;
        }
        write!(
            out,
            "- path={} | expected={} | actual={} | details={}",
            diff.path,
            display_value(&diff.expected),
            display_value(&diff.actual),
            diff.kind
        )?;
    }
    Ok(())
}

/// Render and write the report under `dir`, creating it when needed.
pub fn write_report(audit: &IntegrityAudit, dir: &Path) -> IntegrityResult<PathBuf> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source: std::io::Error| IntegrityError::ReportWrite { path, source }
    };
    std::fs::create_dir_all(dir).map_err(io_err(dir))?;
    let path = dir.join(format!(
        "ruleset_audit_{}_{}.txt",
        audit.ruleset_id,
        audit.timestamp.file_stamp()
    ));
    std::fs::write(&path, render_report(audit)).map_err(io_err(&path))?;
    tracing::info!(path = %path.display(), "ruleset audit report written");
    Ok(path)
}
