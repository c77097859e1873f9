//! Contratos de los componentes de un step orientado a chunks.
//!
//! - `RecordReader`: entrega un registro por llamada y señala fin de entrada.
//! - `RecordProcessor`: función pura registro → salida | filtrado.
//! - `RecordWriter`: escribe un chunk completo en el sink.
//! - Políticas (`FaultPolicy`, `WriteRetryPolicy`) y estados (`RunStatus`,
//!   `ChunkPhase`).

pub mod policy;
pub mod processor;
pub mod reader;
mod status;
pub mod writer;

pub use policy::{FaultPolicy, FixedRetry, NeverRetry, WriteRetryPolicy};
pub use processor::{ProcessOutcome, RecordProcessor};
pub use reader::RecordReader;
pub use status::{ChunkPhase, RunStatus};
pub use writer::RecordWriter;
