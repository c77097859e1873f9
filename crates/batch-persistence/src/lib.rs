//! batch-persistence
//!
//! Implementación durable de `EventStore` sobre un archivo JSON lines (un
//! `RunEvent` por línea). El replay lo sigue haciendo el
//! `ExecutionRepository` del core, por lo que el estado observado es el mismo
//! que con el store en memoria.
//!
//! Módulos:
//! - `jsonl`: `JsonLinesEventStore`.
//! - `config`: carga de configuración desde .env.
//! - `error`: `PersistenceError` y su conversión a `BatchError`.

pub mod config;
pub mod error;
pub mod jsonl;

pub use config::{init_dotenv, StoreConfig};
pub use error::PersistenceError;
pub use jsonl::JsonLinesEventStore;
