use crate::errors::BatchError;
use crate::model::OutputRecord;

/// Sink de un run. La ubicación del recurso la resuelve la factory a partir
/// del `ExecutionContext` antes de construir el writer.
pub trait RecordWriter: Send {
    /// Crea/abre el recurso. Siempre se llama, incluso con entrada vacía.
    fn open(&mut self) -> Result<(), BatchError>;

    /// Escribe el chunk completo. Éxito implica que todos los registros están
    /// en el sink; cualquier fallo parcial es `BatchError::Write`.
    fn write_all(&mut self, records: &[OutputRecord]) -> Result<(), BatchError>;

    /// Libera el recurso. Debe tolerar llamadas repetidas.
    fn close(&mut self) -> Result<(), BatchError>;
}
