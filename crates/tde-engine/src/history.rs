//! # JSONL History
//!
//! Append-only event log, one JSON object per line. Each event embeds the
//! full [`DiagnosticOutput`], so any stored diagnostic can be re-rendered
//! without touching the ruleset.
//!
//! A refresh never rewrites history: it appends a new `report_refresh`
//! event that points back at its source.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tde_core::Timestamp;
use uuid::Uuid;

use crate::error::HistoryError;
use crate::output::DiagnosticOutput;
use crate::report::render_narrative;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Diagnostico,
    ReportRefresh,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEvent {
    pub uuid: Uuid,
    pub timestamp: Timestamp,
    pub evento_tipo: EventKind,
    /// Event a refresh was rendered from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origem: Option<Uuid>,
    pub output: DiagnosticOutput,
}

#[derive(Debug, Clone)]
pub struct JsonlHistoryStore {
    path: PathBuf,
}

impl JsonlHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a fresh diagnostic.
    pub fn append(&self, output: &DiagnosticOutput) -> Result<HistoryEvent, HistoryError> {
        let event = HistoryEvent {
            uuid: output.id,
            timestamp: output.audit.generated_at,
            evento_tipo: EventKind::Diagnostico,
            origem: None,
            output: output.clone(),
        };
        self.append_event(&event)?;
        Ok(event)
    }

    pub fn append_event(&self, event: &HistoryEvent) -> Result<(), HistoryError> {
        let line = serde_json::to_string(event)?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| self.io(source))?;
        }
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.io(source))?;
        writeln!(file, "{line}").map_err(|source| self.io(source))?;
        tracing::debug!(uuid = %event.uuid, kind = ?event.evento_tipo, path = %self.path.display(), "history event appended");
        Ok(())
    }

    /// Most recent first. A missing file is an empty history; malformed
    /// lines are skipped.
    pub fn list(&self, limit: Option<usize>) -> Result<Vec<HistoryEvent>, HistoryError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(self.io(source)),
        };
        let mut events: Vec<HistoryEvent> = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(idx, line)| match serde_json::from_str(line) {
                Ok(event) => Some(event),
                Err(e) => {
                    tracing::warn!(line = idx + 1, error = %e, path = %self.path.display(), "skipping malformed history line");
                    None
                }
            })
            .collect();
        events.reverse();
        if let Some(limit) = limit {
            events.truncate(limit);
        }
        Ok(events)
    }

    pub fn find(&self, uuid: &Uuid) -> Result<HistoryEvent, HistoryError> {
        self.list(None)?
            .into_iter()
            .find(|e| &e.uuid == uuid)
            .ok_or_else(|| HistoryError::NotFound(uuid.to_string()))
    }

    /// Re-render the narrative of a stored event and append it as a new
    /// `report_refresh` event. Nothing is recalculated.
    pub fn refresh(&self, uuid: &Uuid, at: Timestamp) -> Result<HistoryEvent, HistoryError> {
        let source = self.find(uuid)?;
        let mut output = source.output;
        output.relatorio_texto = render_narrative(&output);
        let event = HistoryEvent {
            uuid: Uuid::new_v4(),
            timestamp: at,
            evento_tipo: EventKind::ReportRefresh,
            origem: Some(source.uuid),
            output,
        };
        self.append_event(&event)?;
        tracing::info!(source = %source.uuid, refreshed = %event.uuid, "report refreshed");
        Ok(event)
    }

    fn io(&self, source: std::io::Error) -> HistoryError {
        HistoryError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
