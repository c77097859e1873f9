//! Builder para `JobDriver`.
//!
//! `JobBuilderInit` contiene las stores; `steps` fija reader, processor y
//! writer y transiciona a `JobBuilder`, donde se ajustan nombre, política de
//! chunks y listeners antes de `build`.
//!
//! ```ignore
//! let mut job = JobDriver::new()
//!     .steps(reader_factory, processor, writer_factory)
//!     .name("importUserJob")
//!     .chunk_size(3)
//!     .listener(output_listener)
//!     .build();
//! ```
use std::sync::Arc;

use crate::constants::DEFAULT_JOB_NAME;
use crate::errors::BatchError;
use crate::event::EventStore;
use crate::listener::{CompositeListener, RunListener};
use crate::model::ExecutionContext;
use crate::repo::ExecutionRepository;
use crate::step::{FaultPolicy, RecordProcessor, RecordReader, RecordWriter, WriteRetryPolicy};

use super::{ChunkSettings, JobDriver, ReaderFactory, StopSignal, WriterFactory};

/// Estado inicial del builder: sólo stores.
#[derive(Debug)]
pub struct JobBuilderInit<E: EventStore, R: ExecutionRepository> {
    pub event_store: E,
    pub repository: R,
}

impl<E: EventStore, R: ExecutionRepository> JobBuilderInit<E, R> {
    /// Define el paso del job. Reader y writer se construyen por run (a
    /// partir del contexto); el processor se comparte entre runs.
    pub fn steps<RF, P, WF>(self, reader_factory: RF, processor: P, writer_factory: WF) -> JobBuilder<E, R>
        where RF: Fn(&ExecutionContext) -> Result<Box<dyn RecordReader>, BatchError> + Send + Sync + 'static,
              P: RecordProcessor + 'static,
              WF: Fn(&ExecutionContext) -> Result<Box<dyn RecordWriter>, BatchError> + Send + Sync + 'static
    {
        JobBuilder { event_store: self.event_store,
                     repository: self.repository,
                     name: DEFAULT_JOB_NAME.to_string(),
                     reader_factory: Box::new(reader_factory),
                     processor: Box::new(processor),
                     writer_factory: Box::new(writer_factory),
                     listeners: CompositeListener::new(),
                     settings: ChunkSettings::default(),
                     stop: StopSignal::new() }
    }
}

pub struct JobBuilder<E: EventStore, R: ExecutionRepository> {
    event_store: E,
    repository: R,
    name: String,
    reader_factory: ReaderFactory,
    processor: Box<dyn RecordProcessor>,
    writer_factory: WriterFactory,
    listeners: CompositeListener,
    settings: ChunkSettings,
    stop: StopSignal,
}

impl<E: EventStore, R: ExecutionRepository> JobBuilder<E, R> {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn chunk_size(mut self, size: usize) -> Self {
        self.settings.chunk_size = size;
        self
    }

    pub fn on_malformed(mut self, policy: FaultPolicy) -> Self {
        self.settings.on_malformed = policy;
        self
    }

    pub fn on_processing_error(mut self, policy: FaultPolicy) -> Self {
        self.settings.on_processing_error = policy;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.settings.parallel = parallel;
        self
    }

    pub fn write_retry<W: WriteRetryPolicy + 'static>(mut self, policy: W) -> Self {
        self.settings.write_retry = Arc::new(policy);
        self
    }

    /// Reemplaza todos los ajustes de chunk de una vez.
    pub fn settings(mut self, settings: ChunkSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Los listeners se invocan en el orden en que se registran.
    pub fn listener<L: RunListener + 'static>(mut self, listener: L) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    pub fn stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    pub fn build(self) -> JobDriver<E, R> {
        JobDriver { name: self.name,
                    event_store: self.event_store,
                    repository: self.repository,
                    reader_factory: self.reader_factory,
                    processor: self.processor,
                    writer_factory: self.writer_factory,
                    listeners: self.listeners,
                    settings: self.settings,
                    stop: self.stop }
    }
}
