//! Modelos neutrales (registros, contexto, parámetros, ejecución, fingerprint).

pub mod context;
pub mod execution;
pub mod fingerprint;
pub mod params;
pub mod record;

pub use context::ExecutionContext;
pub use execution::{ExecutionRecord, RunFailure};
pub use fingerprint::{run_fingerprint, RunFingerprintInput};
pub use params::RunParameters;
pub use record::{InputRecord, OutputRecord};
