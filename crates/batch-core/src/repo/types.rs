//! Repositorio de ejecuciones: reconstruye `ExecutionRecord` a partir de
//! eventos.
//!
//! El replay es lineal: consume eventos en orden y actualiza el registro.
//! Cualquier `EventStore` (memoria, archivo, base de datos) comparte esta
//! misma lógica, por lo que el estado observado es idéntico entre backends.
use uuid::Uuid;

use crate::event::{EventStore, RunEvent, RunEventKind};
use crate::model::{ExecutionContext, ExecutionRecord};
use crate::step::RunStatus;

/// Trait para reconstruir (`replay`) el estado de un run a partir de eventos.
pub trait ExecutionRepository: Send {
    /// `None` si la secuencia no empieza con `RunStarted`.
    fn load(&self, run_id: Uuid, events: &[RunEvent]) -> Option<ExecutionRecord>;

    /// Ejecuciones previas con el mismo fingerprint, en orden de creación.
    ///
    /// Sólo se reproducen los runs cuyo `RunStarted` coincide; el resto se
    /// descarta mirando su primer evento. El costo sigue siendo lineal en la
    /// cantidad de runs del store.
    fn history<E: EventStore>(&self, store: &E, fingerprint: &str) -> Vec<ExecutionRecord>
        where Self: Sized
    {
        store.run_ids()
             .into_iter()
             .filter(|id| {
                 matches!(store.first(*id).map(|ev| ev.kind),
                          Some(RunEventKind::RunStarted { fingerprint: fp, .. }) if fp == fingerprint)
             })
             .filter_map(|id| self.load(id, &store.list(id)))
             .collect()
    }
}

#[derive(Debug, Default)]
pub struct InMemoryExecutionRepository;

impl InMemoryExecutionRepository {
    pub fn new() -> Self {
        Self
    }
}

impl ExecutionRepository for InMemoryExecutionRepository {
    fn load(&self, run_id: Uuid, events: &[RunEvent]) -> Option<ExecutionRecord> {
        let (first, rest) = events.split_first()?;
        let mut record = match &first.kind {
            RunEventKind::RunStarted { job_name,
                                       fingerprint,
                                       parameters,
                                       restart_from, } => ExecutionRecord { run_id,
                                                                            job_name: job_name.clone(),
                                                                            fingerprint: fingerprint.clone(),
                                                                            parameters: parameters.clone(),
                                                                            status: RunStatus::Started,
                                                                            started_at: first.ts,
                                                                            ended_at: None,
                                                                            context: ExecutionContext::new(),
                                                                            chunk_count: 0,
                                                                            read_count: 0,
                                                                            filter_count: 0,
                                                                            write_count: 0,
                                                                            skip_count: 0,
                                                                            restart_from: *restart_from,
                                                                            committed_position: *restart_from,
                                                                            failure: None,
                                                                            exit_description: None },
            _ => return None,
        };
        for ev in rest {
            match &ev.kind {
                RunEventKind::RunStarted { .. } => {}
                RunEventKind::ContextUpdated { entries } => record.context = ExecutionContext::from(entries.clone()),
                RunEventKind::ChunkCommitted { read_count,
                                               filter_count,
                                               write_count,
                                               skip_count,
                                               consumed,
                                               .. } => {
                    record.chunk_count += 1;
                    record.read_count += read_count;
                    record.filter_count += filter_count;
                    record.write_count += write_count;
                    record.skip_count += skip_count;
                    record.committed_position += consumed;
                }
                RunEventKind::RunCompleted { exit_description } => {
                    record.status = RunStatus::Completed;
                    record.exit_description = exit_description.clone();
                    record.ended_at = Some(ev.ts);
                }
                RunEventKind::RunFailed { failure, exit_description } => {
                    record.status = RunStatus::Failed;
                    record.failure = failure.clone();
                    record.exit_description = exit_description.clone();
                    record.ended_at = Some(ev.ts);
                }
                RunEventKind::RunStopped { exit_description } => {
                    record.status = RunStatus::Stopped;
                    record.exit_description = exit_description.clone();
                    record.ended_at = Some(ev.ts);
                }
            }
        }
        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::InMemoryEventStore;
    use crate::model::RunParameters;

    fn started(fp: &str, restart_from: u64) -> RunEventKind {
        RunEventKind::RunStarted { job_name: "job".into(),
                                   fingerprint: fp.into(),
                                   parameters: RunParameters::new().with("timestamp", 1),
                                   restart_from }
    }

    fn committed(index: usize, read: u64, written: u64) -> RunEventKind {
        RunEventKind::ChunkCommitted { chunk_index: index,
                                       read_count: read,
                                       filter_count: read - written,
                                       write_count: written,
                                       skip_count: 0,
                                       consumed: read }
    }

    #[test]
    fn replay_accumulates_chunk_counters() {
        let mut store = InMemoryEventStore::default();
        let id = Uuid::new_v4();
        store.append_kind(id, started("fp", 3)).unwrap();
        store.append_kind(id, committed(0, 3, 2)).unwrap();
        store.append_kind(id, committed(1, 1, 1)).unwrap();
        store.append_kind(id, RunEventKind::RunCompleted { exit_description: None }).unwrap();

        let rec = InMemoryExecutionRepository::new().load(id, &store.list(id)).unwrap();
        assert_eq!(rec.status, RunStatus::Completed);
        assert_eq!(rec.chunk_count, 2);
        assert_eq!(rec.read_count, 4);
        assert_eq!(rec.write_count, 3);
        assert_eq!(rec.filter_count, 1);
        assert_eq!(rec.committed_position, 7);
        assert!(rec.ended_at.is_some());
    }

    #[test]
    fn replay_without_run_started_yields_nothing() {
        let mut store = InMemoryEventStore::default();
        let id = Uuid::new_v4();
        store.append_kind(id, committed(0, 1, 1)).unwrap();
        assert!(InMemoryExecutionRepository::new().load(id, &store.list(id)).is_none());
    }

    #[test]
    fn history_filters_by_fingerprint_in_creation_order() {
        let mut store = InMemoryEventStore::default();
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        store.append_kind(a, started("x", 0)).unwrap();
        store.append_kind(b, started("y", 0)).unwrap();
        store.append_kind(c, started("x", 0)).unwrap();

        let ids: Vec<Uuid> = InMemoryExecutionRepository::new().history(&store, "x")
                                                               .into_iter()
                                                               .map(|r| r.run_id)
                                                               .collect();
        assert_eq!(ids, vec![a, c]);
    }

    /// Store que falla si se pide la lista completa de un run ajeno.
    struct GuardedStore {
        inner: InMemoryEventStore,
        forbidden: Uuid,
    }

    impl EventStore for GuardedStore {
        fn append_kind(&mut self, run_id: Uuid, kind: RunEventKind) -> Result<RunEvent, crate::BatchError> {
            self.inner.append_kind(run_id, kind)
        }

        fn list(&self, run_id: Uuid) -> Vec<RunEvent> {
            assert_ne!(run_id, self.forbidden, "history replayed a run with another fingerprint");
            self.inner.list(run_id)
        }

        fn run_ids(&self) -> Vec<Uuid> {
            self.inner.run_ids()
        }

        fn first(&self, run_id: Uuid) -> Option<RunEvent> {
            self.inner.first(run_id)
        }
    }

    #[test]
    fn history_does_not_replay_other_fingerprints() {
        let (mine, other) = (Uuid::new_v4(), Uuid::new_v4());
        let mut store = GuardedStore { inner: InMemoryEventStore::default(),
                                       forbidden: other };
        store.append_kind(other, started("y", 0)).unwrap();
        store.append_kind(other, committed(0, 2, 2)).unwrap();
        store.append_kind(mine, started("x", 0)).unwrap();

        let history = InMemoryExecutionRepository::new().history(&store, "x");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].run_id, mine);
    }
}
