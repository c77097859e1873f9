use crate::errors::BatchError;
use crate::model::InputRecord;

/// Fuente de registros de un run. Se abre una vez por run y el `ChunkRunner`
/// garantiza `close` en todas las salidas.
pub trait RecordReader: Send {
    /// Adquiere el recurso (y salta líneas de cabecera si aplica).
    fn open(&mut self) -> Result<(), BatchError>;

    /// Siguiente registro; `None` señala fin de entrada.
    fn next_record(&mut self) -> Result<Option<InputRecord>, BatchError>;

    /// Avanza `count` registros sin entregarlos (restart). Devuelve cuántos
    /// se saltaron realmente; menos de `count` significa fin de entrada.
    fn skip_records(&mut self, count: u64) -> Result<u64, BatchError> {
        let mut skipped = 0;
        while skipped < count {
            match self.next_record() {
                Ok(Some(_)) => skipped += 1,
                Ok(None) => break,
                Err(e) if e.is_skippable() => skipped += 1,
                Err(e) => return Err(e),
            }
        }
        Ok(skipped)
    }

    /// Libera el recurso. Debe tolerar llamadas repetidas.
    fn close(&mut self) -> Result<(), BatchError>;
}
