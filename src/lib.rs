//! batchflow
//!
//! Host del pipeline batch:
//! - `config`: `AppConfig` desde entorno / `.env`.
//! - `errors`: errores del host.
//! - `pipeline`: composición del job (reader de personas, filtro de títulos,
//!   writer con ruta por run).
//! - `scheduler`: trigger periódico sobre tokio.
//!
//! `main.rs` y la CLI (`batch-cli`) usan esta librería.

pub mod config;
pub mod errors;
pub mod pipeline;
pub mod scheduler;

pub use config::AppConfig;
pub use errors::AppError;
pub use pipeline::{build_job, run_once, serve, Job, JOB_NAME};
pub use scheduler::{ScheduledTrigger, TriggerReport};
