//! Loop de chunks de un run.
//!
//! Máquina de estados por chunk:
//! `Reading -> Processing -> Writing -> Commit -> (Reading | Done)`.
//!
//! Invariantes:
//! - El tamaño de chunk cuenta registros leídos (los filtrados cuentan, las
//!   líneas descartadas por política no).
//! - Un chunk vacío tras filtrar no invoca `write_all`.
//! - Un fallo en cualquier fase aborta el run: no se intenta el chunk
//!   siguiente y los chunks ya confirmados no se revierten.
//! - Reader y writer se cierran en todas las salidas.
use std::sync::Arc;

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::constants::DEFAULT_CHUNK_SIZE;
use crate::errors::BatchError;
use crate::event::RunEventKind;
use crate::model::{InputRecord, OutputRecord, RunFailure};
use crate::step::{ChunkPhase, FaultPolicy, NeverRetry, ProcessOutcome, RecordProcessor, RecordReader, RecordWriter,
                  WriteRetryPolicy};

use super::StopSignal;

/// Parámetros del loop de chunks.
#[derive(Debug, Clone)]
pub struct ChunkSettings {
    /// Registros de entrada por commit (mínimo efectivo 1).
    pub chunk_size: usize,
    pub on_malformed: FaultPolicy,
    pub on_processing_error: FaultPolicy,
    /// Procesa los registros de un chunk con rayon (el orden de salida se conserva).
    pub parallel: bool,
    pub write_retry: Arc<dyn WriteRetryPolicy>,
}

impl Default for ChunkSettings {
    fn default() -> Self {
        Self { chunk_size: DEFAULT_CHUNK_SIZE,
               on_malformed: FaultPolicy::Abort,
               on_processing_error: FaultPolicy::Abort,
               parallel: false,
               write_retry: Arc::new(NeverRetry) }
    }
}

/// Contadores de un chunk confirmado.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkReport {
    pub chunk_index: usize,
    pub read_count: u64,
    pub filter_count: u64,
    pub write_count: u64,
    pub skip_count: u64,
    pub consumed: u64,
}

impl ChunkReport {
    pub fn to_event(&self) -> RunEventKind {
        RunEventKind::ChunkCommitted { chunk_index: self.chunk_index,
                                       read_count: self.read_count,
                                       filter_count: self.filter_count,
                                       write_count: self.write_count,
                                       skip_count: self.skip_count,
                                       consumed: self.consumed }
    }
}

/// Totales del loop completo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkSummary {
    pub chunk_count: usize,
    pub read_count: u64,
    pub filter_count: u64,
    pub write_count: u64,
    pub skip_count: u64,
    pub consumed: u64,
    pub restart_skipped: u64,
    pub stopped: bool,
}

impl ChunkSummary {
    fn absorb(&mut self, report: &ChunkReport) {
        self.chunk_count += 1;
        self.read_count += report.read_count;
        self.filter_count += report.filter_count;
        self.write_count += report.write_count;
        self.skip_count += report.skip_count;
        self.consumed += report.consumed;
    }
}

/// Ejecuta los chunks de un run. Es dueño exclusivo de reader y writer
/// durante el run y los libera al terminar `run`.
pub struct ChunkRunner<'a> {
    reader: Box<dyn RecordReader>,
    processor: &'a dyn RecordProcessor,
    writer: Box<dyn RecordWriter>,
    settings: &'a ChunkSettings,
    stop: Option<StopSignal>,
    malformed_skipped: u64,
    processing_skipped: u64,
}

impl<'a> ChunkRunner<'a> {
    pub fn new(reader: Box<dyn RecordReader>,
               processor: &'a dyn RecordProcessor,
               writer: Box<dyn RecordWriter>,
               settings: &'a ChunkSettings)
               -> Self {
        Self { reader,
               processor,
               writer,
               settings,
               stop: None,
               malformed_skipped: 0,
               processing_skipped: 0 }
    }

    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Abre reader y writer, ejecuta chunks hasta fin de entrada (o stop) y
    /// cierra ambos. `on_commit` se invoca tras escribir cada chunk; un error
    /// suyo también aborta el run.
    pub fn run<F>(mut self, restart_from: u64, mut on_commit: F) -> Result<ChunkSummary, RunFailure>
        where F: FnMut(&ChunkReport) -> Result<(), BatchError>
    {
        self.reader
            .open()
            .map_err(|e| RunFailure::before_chunks(ChunkPhase::Opening, e))?;
        if let Err(e) = self.writer.open() {
            if let Err(close_err) = self.reader.close() {
                warn!("reader close after failed writer open: {close_err}");
            }
            return Err(RunFailure::before_chunks(ChunkPhase::Opening, e));
        }

        let result = self.drive(restart_from, &mut on_commit);

        let writer_closed = self.writer.close();
        let reader_closed = self.reader.close();
        match result {
            Ok(summary) => {
                writer_closed.and(reader_closed)
                             .map_err(|e| RunFailure { chunk_index: None,
                                                       phase: ChunkPhase::Closing,
                                                       error: e })?;
                Ok(summary)
            }
            Err(failure) => {
                for e in [writer_closed.err(), reader_closed.err()].into_iter().flatten() {
                    warn!("close after failed chunk: {e}");
                }
                Err(failure)
            }
        }
    }

    fn drive(&mut self,
             restart_from: u64,
             on_commit: &mut dyn FnMut(&ChunkReport) -> Result<(), BatchError>)
             -> Result<ChunkSummary, RunFailure> {
        let mut summary = ChunkSummary::default();
        if restart_from > 0 {
            let skipped = self.reader
                              .skip_records(restart_from)
                              .map_err(|e| RunFailure::before_chunks(ChunkPhase::Restarting, e))?;
            info!("restart: skipped {skipped} of {restart_from} already committed records");
            summary.restart_skipped = skipped;
        }

        let size = self.settings.chunk_size.max(1);
        let mut chunk_index = 0usize;
        loop {
            if self.stop.as_ref().is_some_and(StopSignal::is_stop_requested) {
                info!("stop requested, ending before chunk {chunk_index}");
                summary.stopped = true;
                break;
            }

            let mut report = ChunkReport { chunk_index,
                                           ..Default::default() };
            let (items, exhausted) = self.read_chunk(size, &mut report)?;
            if items.is_empty() {
                // Sólo pudo quedar un resto de líneas descartadas.
                summary.skip_count += report.skip_count;
                break;
            }
            report.read_count = items.len() as u64;
            report.consumed += report.read_count;

            let outputs = self.process_chunk(&items, &mut report)?;

            if !outputs.is_empty() {
                self.write_chunk(chunk_index, &outputs)?;
            }
            report.write_count = outputs.len() as u64;

            on_commit(&report).map_err(|e| RunFailure::at_chunk(chunk_index, ChunkPhase::Commit, e))?;
            debug!("chunk {chunk_index} committed: read={} filtered={} written={} skipped={}",
                   report.read_count,
                   report.filter_count,
                   report.write_count,
                   report.skip_count);
            summary.absorb(&report);
            chunk_index += 1;

            if exhausted {
                break;
            }
        }
        Ok(summary)
    }

    /// Acumula hasta `size` registros. El booleano indica fin de entrada.
    fn read_chunk(&mut self, size: usize, report: &mut ChunkReport) -> Result<(Vec<InputRecord>, bool), RunFailure> {
        let mut items = Vec::with_capacity(size);
        while items.len() < size {
            match self.reader.next_record() {
                Ok(Some(record)) => items.push(record),
                Ok(None) => return Ok((items, true)),
                Err(e @ BatchError::MalformedRecord { .. }) => {
                    admit_skip(self.settings.on_malformed, &mut self.malformed_skipped, e)
                        .map_err(|e| RunFailure::at_chunk(report.chunk_index, ChunkPhase::Reading, e))?;
                    report.skip_count += 1;
                    report.consumed += 1;
                }
                Err(e) => return Err(RunFailure::at_chunk(report.chunk_index, ChunkPhase::Reading, e)),
            }
        }
        Ok((items, false))
    }

    fn process_chunk(&mut self,
                     items: &[InputRecord],
                     report: &mut ChunkReport)
                     -> Result<Vec<OutputRecord>, RunFailure> {
        let processor = self.processor;
        let outcomes: Vec<Result<ProcessOutcome, BatchError>> = if self.settings.parallel {
            items.par_iter().map(|r| processor.process(r)).collect()
        } else {
            items.iter().map(|r| processor.process(r)).collect()
        };

        let mut outputs = Vec::with_capacity(items.len());
        for outcome in outcomes {
            match outcome {
                Ok(ProcessOutcome::Output(o)) => outputs.push(o),
                Ok(ProcessOutcome::Filtered) => report.filter_count += 1,
                Err(e) if e.is_skippable() => {
                    admit_skip(self.settings.on_processing_error, &mut self.processing_skipped, e)
                        .map_err(|e| RunFailure::at_chunk(report.chunk_index, ChunkPhase::Processing, e))?;
                    report.skip_count += 1;
                }
                Err(e) => return Err(RunFailure::at_chunk(report.chunk_index, ChunkPhase::Processing, e)),
            }
        }
        Ok(outputs)
    }

    fn write_chunk(&mut self, chunk_index: usize, records: &[OutputRecord]) -> Result<(), RunFailure> {
        let mut attempt = 1u32;
        loop {
            match self.writer.write_all(records) {
                Ok(()) => return Ok(()),
                Err(e) if self.settings.write_retry.should_retry(chunk_index, attempt, &e) => {
                    warn!("chunk {chunk_index}: write attempt {attempt} failed, retrying: {e}");
                    attempt += 1;
                }
                Err(e) => return Err(RunFailure::at_chunk(chunk_index, ChunkPhase::Writing, e)),
            }
        }
    }
}

/// Aplica la política de skip: descarta y registra, o devuelve el error
/// (envuelto en `SkipLimitExceeded` si se agotó el cupo).
fn admit_skip(policy: FaultPolicy, skipped: &mut u64, error: BatchError) -> Result<(), BatchError> {
    match policy {
        FaultPolicy::Abort => Err(error),
        _ if policy.allows_skip(*skipped) => {
            warn!("skipping record: {error}");
            *skipped += 1;
            Ok(())
        }
        _ => Err(BatchError::SkipLimitExceeded { limit: policy.limit().unwrap_or_default(),
                                                 cause: Box::new(error) }),
    }
}
