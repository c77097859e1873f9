use std::fmt;

use serde::{Deserialize, Serialize};

/// Estado de una ejecución.
///
/// Las transiciones válidas son:
/// - `Started` -> `Completed`
/// - `Started` -> `Failed`
/// - `Started` -> `Stopped`
///
/// Un listener `after_run` puede sustituir el estado terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    /// El run está en curso (o el proceso murió antes de cerrarlo).
    Started,
    /// Todos los chunks se confirmaron.
    Completed,
    /// Un error fatal abortó el run.
    Failed,
    /// Se pidió detener el run; terminó tras el chunk en curso.
    Stopped,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RunStatus::Started)
    }

    /// Código de salida para un proceso anfitrión: 0 sólo si completó.
    pub fn exit_code(self) -> i32 {
        match self {
            RunStatus::Completed => 0,
            _ => 1,
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Started => "STARTED",
            RunStatus::Completed => "COMPLETED",
            RunStatus::Failed => "FAILED",
            RunStatus::Stopped => "STOPPED",
        };
        f.write_str(s)
    }
}

/// Fase del ciclo de chunk en la que ocurrió un fallo.
///
/// `Reading -> Processing -> Writing -> Commit -> (Reading | Done)`; `Opening`
/// y `Closing` enmarcan el loop, `BeforeRun` cubre listeners y factories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChunkPhase {
    BeforeRun,
    Opening,
    Restarting,
    Reading,
    Processing,
    Writing,
    Commit,
    Closing,
}
