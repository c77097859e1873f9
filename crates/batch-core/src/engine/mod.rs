//! Engine module: chunk runner, job driver, builder y launcher.
//!
//! `JobDriver` es dueño de un run de punta a punta; `ChunkRunner` ejecuta el
//! loop read → process → write → commit; `JobLauncher` serializa los runs
//! disparados desde otros hilos.

pub mod builder;
pub mod chunk;
pub mod driver;
pub mod launcher;
pub mod stop;

pub use builder::{JobBuilder, JobBuilderInit};
pub use chunk::{ChunkReport, ChunkRunner, ChunkSettings, ChunkSummary};
pub use driver::{JobDriver, ReaderFactory, WriterFactory};
pub use launcher::JobLauncher;
pub use stop::StopSignal;
