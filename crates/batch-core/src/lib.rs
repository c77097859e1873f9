//! batch-core: motor de ejecución batch orientado a chunks.
//!
//! Un run lee registros de un `RecordReader`, los transforma con un
//! `RecordProcessor` y los escribe con un `RecordWriter` en grupos de tamaño
//! fijo. Cada chunk es la unidad de commit. El estado de cada ejecución se
//! registra como eventos append-only y se reconstruye por replay.
pub mod constants;
pub mod engine;
pub mod errors;
pub mod event;
pub mod hashing;
pub mod listener;
pub mod model;
pub mod repo;
pub mod step;

pub use engine::{ChunkRunner, ChunkSettings, JobDriver, JobLauncher, StopSignal};
pub use errors::BatchError;
pub use event::{EventStore, InMemoryEventStore, RunEvent, RunEventKind};
pub use listener::{CompositeListener, FnListener, RunListener};
pub use model::{ExecutionContext, ExecutionRecord, InputRecord, OutputRecord, RunFailure, RunParameters};
pub use repo::{ExecutionRepository, InMemoryExecutionRepository};
pub use step::{ChunkPhase, FaultPolicy, ProcessOutcome, RecordProcessor, RecordReader, RecordWriter, RunStatus,
               WriteRetryPolicy};
