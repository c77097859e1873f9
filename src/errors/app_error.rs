use batch_core::BatchError;
use batch_persistence::PersistenceError;
use thiserror::Error;

/// Errores del host (configuración, store y runs).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error de configuración: {0}")]
    Config(String),
    #[error("Error en run log: {0}")]
    Store(#[from] PersistenceError),
    #[error("Error de batch: {0}")]
    Batch(#[from] BatchError),
}

impl AppError {
    /// Código de salida del proceso: 2 para errores de configuración o de
    /// store (no se llegó a ejecutar), 1 para fallas de run.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) | AppError::Store(_) => 2,
            AppError::Batch(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_variant_format() {
        let err = AppError::Config("falta input.file".into());
        assert_eq!(err.to_string(), "Error de configuración: falta input.file");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn batch_variant_from() {
        let err: AppError = BatchError::RunInProgress.into();
        assert_eq!(err.to_string(), "Error de batch: another run is already in progress");
        assert_eq!(err.exit_code(), 1);
    }
}
