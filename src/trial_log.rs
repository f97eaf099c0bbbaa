// Scenario logging
//
// Writes one JSON line per judged scenario so failures can be replayed later.
// The writer is shared behind a mutex; a logger that failed to open, or was
// never enabled, silently drops records.

use chrono::Utc;
use log::{error, info};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::sync::Arc;

use crate::types::{Scenario, ScenarioOutcome};

/// One logged scenario and how the decision function fared on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    pub index: usize,
    pub seed: Option<u64>,
    pub scenario: Scenario,
    /// `None` when the decision function faulted
    pub outcome: Option<ScenarioOutcome>,
    #[serde(default)]
    pub error: Option<String>,
    /// Calls made; 0 when the run faulted
    pub invocations: u32,
    pub timestamp: String,
}

impl ScenarioRecord {
    pub fn new(
        index: usize,
        seed: Option<u64>,
        scenario: Scenario,
        outcome: ScenarioOutcome,
        invocations: u32,
    ) -> Self {
        ScenarioRecord {
            index,
            seed,
            scenario,
            outcome: Some(outcome),
            error: None,
            invocations,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    /// Record of a scenario on which the decision function returned `Err`
    pub fn faulted(index: usize, seed: Option<u64>, scenario: Scenario, error: String) -> Self {
        ScenarioRecord {
            index,
            seed,
            scenario,
            outcome: None,
            error: Some(error),
            invocations: 0,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Shared JSONL writer
#[derive(Clone)]
pub struct ScenarioLogger {
    file: Arc<Mutex<Option<BufWriter<File>>>>,
    enabled: bool,
}

impl ScenarioLogger {
    /// Creates a logger; when enabled the file is truncated
    pub fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return ScenarioLogger::disabled();
        }

        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)
        {
            Ok(file) => {
                info!("Scenario logging enabled: {}", log_file_path);
                ScenarioLogger {
                    file: Arc::new(Mutex::new(Some(BufWriter::new(file)))),
                    enabled: true,
                }
            }
            Err(e) => {
                error!("Failed to create scenario log file '{}': {}", log_file_path, e);
                ScenarioLogger::disabled()
            }
        }
    }

    /// Creates a disabled logger (no-op)
    pub fn disabled() -> Self {
        ScenarioLogger {
            file: Arc::new(Mutex::new(None)),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Appends one record and flushes
    pub fn log(&self, record: &ScenarioRecord) {
        if !self.enabled {
            return;
        }

        let mut guard = self.file.lock();
        if let Some(writer) = guard.as_mut() {
            match serde_json::to_string(record) {
                Ok(line) => {
                    if let Err(e) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
                        error!("Failed to write scenario log entry: {}", e);
                    }
                }
                Err(e) => {
                    error!("Failed to serialize scenario log entry: {}", e);
                }
            }
        }
    }
}
