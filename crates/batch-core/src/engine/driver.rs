//! `JobDriver`: ejecuta un run completo y registra su ciclo de vida como
//! eventos.
//!
//! Secuencia de eventos de un run:
//! `RunStarted -> ContextUpdated? -> ChunkCommitted* -> (RunCompleted | RunFailed | RunStopped)`.
//!
//! Antes de iniciar, el historial del mismo fingerprint decide:
//! - un run COMPLETED previo rechaza el lanzamiento (`DuplicateRun`);
//! - un run previo no completado (FAILED, STOPPED o STARTED huérfano) hace
//!   que el nuevo run reanude desde su `committed_position`.
use log::{error, info, warn};
use uuid::Uuid;

use crate::errors::BatchError;
use crate::event::{EventStore, InMemoryEventStore, RunEventKind};
use crate::listener::{CompositeListener, RunListener};
use crate::model::{run_fingerprint, ExecutionContext, ExecutionRecord, RunFailure, RunParameters};
use crate::repo::{ExecutionRepository, InMemoryExecutionRepository};
use crate::step::{ChunkPhase, RecordProcessor, RecordReader, RecordWriter, RunStatus};

use super::{ChunkRunner, ChunkSettings, ChunkSummary, JobBuilderInit, StopSignal};

/// Construye el reader de un run a partir del contexto ya poblado por los
/// listeners.
pub type ReaderFactory = Box<dyn Fn(&ExecutionContext) -> Result<Box<dyn RecordReader>, BatchError> + Send + Sync>;
/// Idem para el writer (típicamente lee la ruta de salida del contexto).
pub type WriterFactory = Box<dyn Fn(&ExecutionContext) -> Result<Box<dyn RecordWriter>, BatchError> + Send + Sync>;

pub struct JobDriver<E: EventStore, R: ExecutionRepository> {
    pub(crate) name: String,
    pub(crate) event_store: E,
    pub(crate) repository: R,
    pub(crate) reader_factory: ReaderFactory,
    pub(crate) processor: Box<dyn RecordProcessor>,
    pub(crate) writer_factory: WriterFactory,
    pub(crate) listeners: CompositeListener,
    pub(crate) settings: ChunkSettings,
    pub(crate) stop: StopSignal,
}

impl JobDriver<InMemoryEventStore, InMemoryExecutionRepository> {
    /// Builder con stores en memoria.
    pub fn new() -> JobBuilderInit<InMemoryEventStore, InMemoryExecutionRepository> {
        JobBuilderInit { event_store: InMemoryEventStore::default(),
                         repository: InMemoryExecutionRepository::new() }
    }
}

impl<E: EventStore, R: ExecutionRepository> JobDriver<E, R> {
    pub fn builder(event_store: E, repository: R) -> JobBuilderInit<E, R> {
        JobBuilderInit { event_store, repository }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn event_store(&self) -> &E {
        &self.event_store
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn settings(&self) -> &ChunkSettings {
        &self.settings
    }

    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Todas las ejecuciones registradas en el store, en orden de creación.
    pub fn executions(&self) -> Vec<ExecutionRecord> {
        self.event_store
            .run_ids()
            .into_iter()
            .filter_map(|id| self.repository.load(id, &self.event_store.list(id)))
            .collect()
    }

    pub fn last_execution(&self) -> Option<ExecutionRecord> {
        self.executions().pop()
    }

    /// Lanza un run con los parámetros dados.
    ///
    /// `Err` sólo para rechazos previos al inicio (`DuplicateRun`) o fallas
    /// del store; un run que falla durante los chunks devuelve `Ok` con
    /// `status == Failed` y el detalle en `failure` (ver
    /// `ExecutionRecord::into_result`).
    ///
    /// Un stop pedido antes o durante el run lo deja STOPPED y se consume:
    /// el siguiente `run` arranca con la señal rearmada.
    pub fn run(&mut self, params: RunParameters) -> Result<ExecutionRecord, BatchError> {
        let fingerprint = run_fingerprint(&self.name, &params);
        let history = self.repository.history(&self.event_store, &fingerprint);
        if history.iter().any(ExecutionRecord::is_completed) {
            warn!("job '{}': parameters already completed (fingerprint {fingerprint})", self.name);
            return Err(BatchError::DuplicateRun { fingerprint });
        }
        let restart_from = history.last().map(|r| r.committed_position).unwrap_or(0);

        let run_id = Uuid::new_v4();
        self.event_store.append_kind(run_id,
                                     RunEventKind::RunStarted { job_name: self.name.clone(),
                                                                fingerprint,
                                                                parameters: params,
                                                                restart_from })?;
        info!("job '{}': run {run_id} started (restart_from={restart_from})", self.name);

        let mut ctx = ExecutionContext::new();
        let outcome = self.execute(run_id, &mut ctx, restart_from);
        if matches!(&outcome, Ok(summary) if summary.stopped) {
            self.stop.reset();
        }

        let status = match &outcome {
            Ok(summary) if summary.stopped => RunStatus::Stopped,
            Ok(_) => RunStatus::Completed,
            Err(_) => RunStatus::Failed,
        };
        let failure = outcome.as_ref().err().cloned();
        if let Some(f) = &failure {
            error!("job '{}': run {run_id} failed in {:?}{}: {}",
                   self.name,
                   f.phase,
                   f.chunk_index.map(|i| format!(" at chunk {i}")).unwrap_or_default(),
                   f.error);
        }

        let (status, exit_description) = match self.listeners.after_run(&ctx, status) {
            Some(over) if over != status && over.is_terminal() => {
                info!("job '{}': run {run_id} status overridden {status} -> {over}", self.name);
                let mut desc = format!("status overridden by listener: {status} -> {over}");
                if let (Some(f), false) = (&failure, over == RunStatus::Failed) {
                    desc.push_str(&format!(" (original failure: {})", f.error));
                }
                (over, Some(desc))
            }
            _ => (status, None),
        };

        let terminal = match status {
            RunStatus::Completed => RunEventKind::RunCompleted { exit_description },
            RunStatus::Stopped => RunEventKind::RunStopped { exit_description },
            RunStatus::Failed | RunStatus::Started => RunEventKind::RunFailed { failure, exit_description },
        };
        self.event_store.append_kind(run_id, terminal)?;

        let record = self.repository
                         .load(run_id, &self.event_store.list(run_id))
                         .ok_or_else(|| BatchError::Internal(format!("run {run_id} has no RunStarted event")))?;
        info!("job '{}': run {run_id} finished {} (chunks={} read={} written={} filtered={} skipped={})",
              self.name,
              record.status,
              record.chunk_count,
              record.read_count,
              record.write_count,
              record.filter_count,
              record.skip_count);
        Ok(record)
    }

    fn execute(&mut self,
               run_id: Uuid,
               ctx: &mut ExecutionContext,
               restart_from: u64)
               -> Result<ChunkSummary, RunFailure> {
        let before = |e: BatchError| RunFailure::before_chunks(ChunkPhase::BeforeRun, e);
        self.listeners.before_run(ctx).map_err(before)?;
        if !ctx.is_empty() {
            self.event_store
                .append_kind(run_id, RunEventKind::ContextUpdated { entries: ctx.entries().clone() })
                .map_err(before)?;
        }
        let reader = (self.reader_factory)(ctx).map_err(before)?;
        let writer = (self.writer_factory)(ctx).map_err(before)?;

        let runner = ChunkRunner::new(reader, self.processor.as_ref(), writer, &self.settings)
            .with_stop_signal(self.stop.clone());
        let store = &mut self.event_store;
        runner.run(restart_from, |report| store.append_kind(run_id, report.to_event()).map(|_| ()))
    }
}
