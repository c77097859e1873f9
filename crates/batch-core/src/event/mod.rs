//! Definiciones de eventos de ejecución y trait EventStore.

mod store;
mod types;

pub use store::{EventStore, InMemoryEventStore};
pub use types::{RunEvent, RunEventKind};
