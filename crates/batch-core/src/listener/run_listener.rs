//! Contrato de listeners de run.
//!
//! `before_run` puebla el `ExecutionContext` antes de que se construyan reader
//! y writer; `after_run` observa el estado final y puede sustituirlo.

use crate::errors::BatchError;
use crate::model::ExecutionContext;
use crate::step::RunStatus;

pub trait RunListener: Send + Sync + std::fmt::Debug {
    /// Un error aquí aborta el run antes del primer chunk.
    fn before_run(&self, _ctx: &mut ExecutionContext) -> Result<(), BatchError> {
        Ok(())
    }

    /// Devuelve `Some(status)` para reemplazar el estado con que termina el run.
    fn after_run(&self, _ctx: &ExecutionContext, _status: RunStatus) -> Option<RunStatus> {
        None
    }
}
