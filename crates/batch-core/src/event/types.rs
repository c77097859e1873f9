//! Tipos de evento de un run y estructura `RunEvent`.
//!
//! Rol en la ejecución:
//! - El `JobDriver` emite eventos a un `EventStore` append-only.
//! - El `ExecutionRepository` reconstruye el `ExecutionRecord` por replay, sin
//!   estructuras mutables compartidas.
//! - `RunEventKind` es el contrato estable que persisten los stores durables.
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::model::{RunFailure, RunParameters};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunEventKind {
    /// Primer evento de un `run_id`. Fija la identidad de la instancia.
    RunStarted {
        job_name: String,
        fingerprint: String,
        parameters: RunParameters,
        restart_from: u64,
    },
    /// Snapshot del `ExecutionContext` tras los listeners `before_run`.
    ContextUpdated { entries: BTreeMap<String, Value> },
    /// Un chunk se escribió y confirmó. `consumed` cuenta las posiciones de
    /// la fuente avanzadas (registros leídos + líneas descartadas).
    ChunkCommitted {
        chunk_index: usize,
        read_count: u64,
        filter_count: u64,
        write_count: u64,
        skip_count: u64,
        consumed: u64,
    },
    RunCompleted { exit_description: Option<String> },
    /// Terminó con error fatal (o un listener forzó FAILED).
    RunFailed {
        failure: Option<RunFailure>,
        exit_description: Option<String>,
    },
    RunStopped { exit_description: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEvent {
    pub seq: u64, // orden de append dentro del run
    pub run_id: Uuid,
    pub kind: RunEventKind,
    pub ts: DateTime<Utc>,
}
