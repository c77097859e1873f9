//! Composición del job de importación de personas.
//!
//! Arma reader, processor, writer y listeners a partir de `AppConfig`; el
//! core no conoce rutas ni formatos.
use batch_adapters::fields::{name_writer, person_reader};
use batch_adapters::{TimestampedOutputListener, TitleFilterProcessor};
use batch_core::constants::OUTPUT_PATH_KEY;
use batch_core::repo::InMemoryExecutionRepository;
use batch_core::{BatchError, EventStore, ExecutionContext, ExecutionRecord, JobDriver, JobLauncher, RecordReader,
                 RecordWriter, RunParameters};
use chrono::{DateTime, Utc};
use log::info;

use crate::config::AppConfig;
use crate::scheduler::{ScheduledTrigger, TriggerReport};

pub const JOB_NAME: &str = "importUserJob";
/// Parámetro de unicidad que agrega el trigger a cada run.
pub const TIMESTAMP_PARAM: &str = "timestamp";

pub type Job<E> = JobDriver<E, InMemoryExecutionRepository>;

pub fn build_job<E: EventStore>(cfg: &AppConfig, store: E) -> Job<E> {
    let input = cfg.input_file.clone();
    JobDriver::builder(store, InMemoryExecutionRepository::new())
        .steps(move |_ctx: &ExecutionContext| Ok(Box::new(person_reader(&input)) as Box<dyn RecordReader>),
               TitleFilterProcessor::new(cfg.skip_title.clone()),
               |ctx: &ExecutionContext| {
                   let path = ctx.require_str(OUTPUT_PATH_KEY)?;
                   Ok(Box::new(name_writer(path)) as Box<dyn RecordWriter>)
               })
        .name(JOB_NAME)
        .settings(cfg.chunk_settings())
        .listener(TimestampedOutputListener::new(cfg.output_base.clone()))
        .build()
}

pub fn trigger_params(at: DateTime<Utc>) -> RunParameters {
    RunParameters::new().with_timestamp(TIMESTAMP_PARAM, at)
}

/// Un run inmediato (CLI).
pub fn run_once<E: EventStore>(job: &mut Job<E>) -> Result<ExecutionRecord, BatchError> {
    job.run(trigger_params(Utc::now()))
}

/// Ejecuta el job con el trigger periódico hasta Ctrl-C.
pub async fn serve<E: EventStore + 'static>(cfg: &AppConfig, store: E) -> TriggerReport {
    let job = build_job(cfg, store);
    let stop = job.stop_signal();
    info!("scheduling '{JOB_NAME}' every {}s (input={}, output={}_<millis>.csv)",
          cfg.schedule.as_secs(),
          cfg.input_file.display(),
          cfg.output_base);
    ScheduledTrigger::new(JobLauncher::new(job), cfg.schedule).stop_signal(stop)
                                                              .run()
                                                              .await
}
