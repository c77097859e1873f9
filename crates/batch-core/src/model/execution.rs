//! Registro de ejecución reconstruido por replay de eventos.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::BatchError;
use crate::step::{ChunkPhase, RunStatus};

use super::{ExecutionContext, RunParameters};

/// Fallo fatal de un run: qué chunk, en qué fase y por qué.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFailure {
    pub chunk_index: Option<usize>, // None: antes del primer chunk o al cerrar
    pub phase: ChunkPhase,
    pub error: BatchError,
}

impl RunFailure {
    pub fn before_chunks(phase: ChunkPhase, error: BatchError) -> Self {
        Self { chunk_index: None,
               phase,
               error }
    }

    pub fn at_chunk(chunk_index: usize, phase: ChunkPhase, error: BatchError) -> Self {
        Self { chunk_index: Some(chunk_index),
               phase,
               error }
    }
}

/// Estado observable de una ejecución.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub run_id: Uuid,
    pub job_name: String,
    pub fingerprint: String,
    pub parameters: RunParameters,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub context: ExecutionContext, // snapshot tras los listeners before_run
    pub chunk_count: usize,
    pub read_count: u64,
    pub filter_count: u64,
    pub write_count: u64,
    pub skip_count: u64,
    /// Posición de la fuente desde la que arrancó este run (restart).
    pub restart_from: u64,
    /// Posición de la fuente confirmada por el último chunk commiteado.
    pub committed_position: u64,
    pub failure: Option<RunFailure>,
    pub exit_description: Option<String>,
}

impl ExecutionRecord {
    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }

    /// Convierte un run FAILED en `BatchError::RunFailed` para callers que
    /// prefieren propagar con `?`.
    pub fn into_result(self) -> Result<Self, BatchError> {
        if self.status != RunStatus::Failed {
            return Ok(self);
        }
        let (chunk_index, cause) = match &self.failure {
            Some(f) => (f.chunk_index, f.error.clone()),
            None => (None,
                     BatchError::Internal(self.exit_description
                                              .clone()
                                              .unwrap_or_else(|| "run marked FAILED".into()))),
        };
        Err(BatchError::RunFailed { run_id: self.run_id,
                                    chunk_index,
                                    cause: Box::new(cause) })
    }
}
