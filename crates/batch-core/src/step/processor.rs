use crate::errors::BatchError;
use crate::model::{InputRecord, OutputRecord};

/// Resultado de procesar un registro.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    Output(OutputRecord),
    /// El registro se descarta sin error.
    Filtered,
}

/// Transformación pura de un registro. Sin IO ni estado mutable compartido:
/// la misma instancia se reutiliza entre chunks y puede evaluarse en paralelo
/// dentro de un chunk.
pub trait RecordProcessor: Send + Sync {
    fn process(&self, record: &InputRecord) -> Result<ProcessOutcome, BatchError>;
}

impl<F> RecordProcessor for F where F: Fn(&InputRecord) -> Result<ProcessOutcome, BatchError> + Send + Sync
{
    fn process(&self, record: &InputRecord) -> Result<ProcessOutcome, BatchError> {
        self(record)
    }
}
