//! Errores de persistencia.
//! Se convierten a `BatchError::Store` al cruzar el contrato `EventStore`.

use batch_core::BatchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Línea del log que no es un `RunEvent` válido.
    #[error("corrupt run log at line {line}: {message}")]
    Corrupt { line: usize, message: String },
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<PersistenceError> for BatchError {
    fn from(err: PersistenceError) -> Self {
        BatchError::Store(err.to_string())
    }
}
