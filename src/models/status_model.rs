//! models/status_model.rs
//! Estado observable de una ejecución, serializado a status.json.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunMode {
    /// Dry-run: nada sale por SMTP.
    Test,
    Real,
}

impl RunMode {
    pub fn from_real_flag(real: bool) -> Self {
        if real {
            RunMode::Real
        } else {
            RunMode::Test
        }
    }

    pub fn is_dry_run(self) -> bool {
        self == RunMode::Test
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Test => f.write_str("TEST"),
            RunMode::Real => f.write_str("REAL"),
        }
    }
}

/// Contadores de una ejecución.
///
/// `remaining` se deriva siempre de los otros dos, de modo que
/// `sent + failed + remaining == total` en cada publicación.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounters {
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
}

impl RunCounters {
    pub fn new(total: usize) -> Self {
        RunCounters {
            total,
            ..Default::default()
        }
    }

    pub fn processed(&self) -> usize {
        self.sent + self.failed
    }

    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.processed())
    }

    /// Porcentaje de destinatarios ya procesados, en [0, 100].
    pub fn progress(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        (self.processed().min(self.total) * 100 / self.total) as u8
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStatus {
    pub running: bool,
    pub message: String,
    /// Segundos Unix; lo asigna el publicador.
    pub timestamp: f64,
    pub sent: usize,
    pub remaining: usize,
    pub failed: usize,
    pub progress: u8,
    pub mode: RunMode,
}

impl RunStatus {
    fn build(message: String, running: bool, counters: &RunCounters, mode: RunMode) -> Self {
        RunStatus {
            running,
            message,
            timestamp: 0.0,
            sent: counters.sent,
            remaining: counters.remaining(),
            failed: counters.failed,
            progress: counters.progress(),
            mode,
        }
    }

    pub fn active(message: impl Into<String>, counters: &RunCounters, mode: RunMode) -> Self {
        Self::build(message.into(), true, counters, mode)
    }

    /// Estado terminal (STOPPED o FAILED).
    pub fn finished(message: impl Into<String>, counters: &RunCounters, mode: RunMode) -> Self {
        Self::build(message.into(), false, counters, mode)
    }

    pub fn completed(message: impl Into<String>, counters: &RunCounters, mode: RunMode) -> Self {
        RunStatus {
            progress: 100,
            ..Self::build(message.into(), false, counters, mode)
        }
    }
}
