//! Errores del core de ejecución batch.
//!
//! `BatchError` es serializable porque viaja dentro de los eventos
//! `RunFailed` y debe sobrevivir a un event store persistente.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::model::InputRecord;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum BatchError {
    /// Falta un valor de configuración con alcance de run (p.ej. ruta de salida).
    #[error("configuration error: {0}")]
    Configuration(String),
    /// La línea no tiene la cantidad de campos declarada.
    #[error("malformed record at line {line}: expected {expected} fields, found {found}")]
    MalformedRecord { line: u64, expected: usize, found: usize },
    /// El processor no pudo manejar el registro.
    #[error("processing error on record at line {}: {reason}", .record.line())]
    Processing { record: InputRecord, reason: String },
    #[error("skip limit of {limit} exceeded: {cause}")]
    SkipLimitExceeded { limit: u64, cause: Box<BatchError> },
    #[error("read error: {0}")]
    Read(String),
    #[error("write error: {0}")]
    Write(String),
    /// Ya existe una ejecución COMPLETED con el mismo fingerprint.
    #[error("run with fingerprint {fingerprint} already completed")]
    DuplicateRun { fingerprint: String },
    #[error("another run is already in progress")]
    RunInProgress,
    #[error("run {run_id} failed{}: {cause}", .chunk_index.map(|i| format!(" at chunk {i}")).unwrap_or_default())]
    RunFailed {
        run_id: Uuid,
        chunk_index: Option<usize>,
        cause: Box<BatchError>,
    },
    #[error("event store error: {0}")]
    Store(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl BatchError {
    /// Crea un `Processing` a partir del registro ofensor.
    pub fn processing(record: &InputRecord, reason: impl Into<String>) -> Self {
        Self::Processing { record: record.clone(),
                           reason: reason.into() }
    }

    /// Indica si el error es candidato a la política de skip (el resto son
    /// siempre fatales).
    pub fn is_skippable(&self) -> bool {
        matches!(self, Self::MalformedRecord { .. } | Self::Processing { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_failed_mentions_chunk_when_known() {
        let id = Uuid::nil();
        let err = BatchError::RunFailed { run_id: id,
                                          chunk_index: Some(2),
                                          cause: Box::new(BatchError::Write("disk full".into())) };
        assert_eq!(err.to_string(),
                   format!("run {id} failed at chunk 2: write error: disk full"));

        let err = BatchError::RunFailed { run_id: id,
                                          chunk_index: None,
                                          cause: Box::new(BatchError::Configuration("x".into())) };
        assert_eq!(err.to_string(), format!("run {id} failed: configuration error: x"));
    }

    #[test]
    fn only_record_level_errors_are_skippable() {
        assert!(BatchError::MalformedRecord { line: 3, expected: 9, found: 2 }.is_skippable());
        assert!(!BatchError::Write("x".into()).is_skippable());
        assert!(!BatchError::Configuration("x".into()).is_skippable());
    }
}
