//! services/status_service.rs
//! Publica el estado de la ejecución en status.json para el dashboard.
//!
//! Cada publicación reemplaza el archivo completo: se escribe en un temporal
//! del mismo directorio y se renombra encima, así un lector nunca ve un JSON a medias.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::Utc;
use tempfile::NamedTempFile;

use crate::models::status_model::RunStatus;

#[derive(Debug)]
pub struct StatusPublisher {
    path: PathBuf,
    last_timestamp: f64,
}

impl StatusPublisher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StatusPublisher {
            path: path.into(),
            last_timestamp: 0.0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sella el timestamp (nunca retrocede) y reemplaza el archivo.
    pub fn publish(&mut self, mut status: RunStatus) -> Result<RunStatus> {
        let now = Utc::now().timestamp_millis() as f64 / 1000.0;
        self.last_timestamp = self.last_timestamp.max(now);
        status.timestamp = self.last_timestamp;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;

        let mut tmp = NamedTempFile::new_in(&dir).context("Failed to create temp status file")?;
        serde_json::to_writer(&mut tmp, &status).context("Failed to serialize status")?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        Ok(status)
    }

    /// Lado observador: ausente o ilegible equivale a "sin estado todavía".
    pub fn read(path: &Path) -> Option<RunStatus> {
        let raw = fs::read_to_string(path).ok()?;
        serde_json::from_str(&raw).ok()
    }
}
