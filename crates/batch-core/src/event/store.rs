use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use super::{RunEvent, RunEventKind};
use crate::errors::BatchError;

/// Almacenamiento de eventos append-only.
pub trait EventStore: Send {
    /// Agrega un evento a partir de su kind y devuelve el evento completo (con seq y ts).
    fn append_kind(&mut self, run_id: Uuid, kind: RunEventKind) -> Result<RunEvent, BatchError>;
    /// Lista eventos de un run (orden ascendente por seq).
    fn list(&self, run_id: Uuid) -> Vec<RunEvent>;
    /// Ids de runs conocidos en orden de creación.
    fn run_ids(&self) -> Vec<Uuid>;

    /// Primer evento del run (normalmente `RunStarted`).
    fn first(&self, run_id: Uuid) -> Option<RunEvent> {
        self.list(run_id).into_iter().next()
    }
}

/// Store en memoria. Crece con cada run y nunca descarta eventos: en un host
/// de larga vida la memoria es proporcional a la cantidad total de chunks
/// ejecutados.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    inner: HashMap<Uuid, Vec<RunEvent>>,
    order: Vec<Uuid>,
}

impl EventStore for InMemoryEventStore {
    fn append_kind(&mut self, run_id: Uuid, kind: RunEventKind) -> Result<RunEvent, BatchError> {
        let events = self.inner.entry(run_id).or_insert_with(|| {
                                                 self.order.push(run_id);
                                                 Vec::new()
                                             });
        let ev = RunEvent { seq: events.len() as u64,
                            run_id,
                            kind,
                            ts: Utc::now() };
        events.push(ev.clone());
        Ok(ev)
    }

    fn list(&self, run_id: Uuid) -> Vec<RunEvent> {
        self.inner.get(&run_id).cloned().unwrap_or_default()
    }

    fn run_ids(&self) -> Vec<Uuid> {
        self.order.clone()
    }

    fn first(&self, run_id: Uuid) -> Option<RunEvent> {
        self.inner.get(&run_id).and_then(|v| v.first()).cloned()
    }
}
