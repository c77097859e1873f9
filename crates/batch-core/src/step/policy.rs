//! Políticas de tolerancia a fallos del `ChunkRunner`.
use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::errors::BatchError;

/// Qué hacer ante un error a nivel de registro (línea malformada o error del
/// processor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FaultPolicy {
    /// Error fatal: el run termina FAILED.
    #[default]
    Abort,
    /// Se registra y se descarta el registro. `limit` acota la cantidad total
    /// de skips del run.
    Skip { limit: Option<u64> },
}

impl FaultPolicy {
    /// Decide si el skip número `skipped + 1` está permitido.
    pub fn allows_skip(&self, skipped: u64) -> bool {
        match self {
            FaultPolicy::Abort => false,
            FaultPolicy::Skip { limit: None } => true,
            FaultPolicy::Skip { limit: Some(l) } => skipped < *l,
        }
    }

    pub fn limit(&self) -> Option<u64> {
        match self {
            FaultPolicy::Skip { limit } => *limit,
            FaultPolicy::Abort => None,
        }
    }
}

/// Punto de extensión para reintentar el `write_all` de un chunk.
pub trait WriteRetryPolicy: Send + Sync + Debug {
    /// `attempt` empieza en 1 (el intento que acaba de fallar).
    fn should_retry(&self, chunk_index: usize, attempt: u32, error: &BatchError) -> bool;
}

/// Política por defecto: un fallo de escritura es definitivo.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverRetry;

impl WriteRetryPolicy for NeverRetry {
    fn should_retry(&self, _chunk_index: usize, _attempt: u32, _error: &BatchError) -> bool {
        false
    }
}

/// Reintenta hasta `max_attempts` intentos en total.
#[derive(Debug, Clone, Copy)]
pub struct FixedRetry {
    pub max_attempts: u32,
}

impl WriteRetryPolicy for FixedRetry {
    fn should_retry(&self, _chunk_index: usize, attempt: u32, error: &BatchError) -> bool {
        matches!(error, BatchError::Write(_)) && attempt < self.max_attempts
    }
}
