//! Session workflow: the config gate and the simulate/persist round-trip.

use anyhow::{Context, Result};
use chrono::Utc;
use estimator_calc::build_record;
use estimator_core::{validate_config, validate_input, AppConfig, SimulationInput, SimulationRecord};
use persistence::{prepend, HistoryStore};
use std::fs;
use std::path::Path;
use tracing::info;

/// Lifecycle of the externally supplied configuration. Only one load ever
/// happens per session; calculation commands are accepted only in `Ready`.
pub enum ConfigState {
    Ready(AppConfig),
    Failed(String),
}

/// Read, deserialize, and validate the configuration file. Any failure is
/// fatal for the session: the caller disables calculation entirely.
pub fn load_config(path: &Path) -> ConfigState {
    match read_config(path) {
        Ok(config) => {
            info!(path = %path.display(), provinces = config.provinces.len(), "configuration loaded");
            ConfigState::Ready(config)
        }
        Err(e) => ConfigState::Failed(format!("{e:#}")),
    }
}

fn read_config(path: &Path) -> Result<AppConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("no se pudo leer {}", path.display()))?;
    let config: AppConfig = serde_json::from_str(&raw)
        .with_context(|| format!("configuración inválida en {}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Run one validated submission to completion: build the record, prepend it
/// to the loaded history, and persist synchronously. Returns the fresh
/// record together with the full updated history.
pub fn run_simulation(
    input: &SimulationInput,
    config: &AppConfig,
    store: &HistoryStore,
) -> Result<(SimulationRecord, Vec<SimulationRecord>)> {
    validate_input(input)?;
    let record = build_record(input, config, Utc::now())?;
    let history = prepend(record.clone(), store.load());
    store
        .save(&history)
        .context("no se pudo guardar el historial")?;
    info!(id = record.id, total = %record.grand_total, "simulación guardada");
    Ok((record, history))
}
