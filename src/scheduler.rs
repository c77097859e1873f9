//! Trigger periódico.
//!
//! Cada tick lanza un run con `{"timestamp": <epoch millis>}` en
//! `spawn_blocking` y espera su fin antes del siguiente tick; los ticks
//! perdidos durante un run largo se descartan. Los errores se registran y
//! nunca terminan el loop.
use std::future::Future;
use std::time::Duration;

use batch_core::{BatchError, EventStore, ExecutionRecord, ExecutionRepository, JobLauncher, RunStatus, StopSignal};
use chrono::Utc;
use log::{error, info, warn};
use tokio::task::JoinError;
use tokio::time::MissedTickBehavior;

use crate::pipeline::trigger_params;

/// Totales de una sesión del trigger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriggerReport {
    pub ticks: usize,
    pub completed: usize,
    pub failed: usize,
    pub stopped: usize,
    /// Lanzamientos rechazados (duplicado o run en curso).
    pub rejected: usize,
}

pub struct ScheduledTrigger<E: EventStore + 'static, R: ExecutionRepository + 'static> {
    launcher: JobLauncher<E, R>,
    every: Duration,
    max_runs: Option<usize>,
    stop: StopSignal,
}

impl<E: EventStore + 'static, R: ExecutionRepository + 'static> ScheduledTrigger<E, R> {
    pub fn new(launcher: JobLauncher<E, R>, every: Duration) -> Self {
        Self { launcher,
               every,
               max_runs: None,
               stop: StopSignal::new() }
    }

    /// Corta el loop tras `n` ticks.
    pub fn max_runs(mut self, n: usize) -> Self {
        self.max_runs = Some(n);
        self
    }

    /// Señal que se activa al apagar (la misma que consulta el job).
    pub fn stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    pub async fn run(self) -> TriggerReport {
        self.run_until(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!("cannot listen for ctrl-c: {e}");
                    std::future::pending::<()>().await;
                }
            })
            .await
    }

    /// Loop del trigger hasta que `shutdown` resuelva. Un shutdown durante un
    /// run pide stop: el chunk en curso termina y el run queda STOPPED.
    pub async fn run_until<F: Future<Output = ()>>(self, shutdown: F) -> TriggerReport {
        let mut ticker = tokio::time::interval(self.every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);
        let mut report = TriggerReport::default();

        loop {
            if self.max_runs.is_some_and(|max| report.ticks >= max) {
                info!("trigger reached {} runs", report.ticks);
                break;
            }
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("trigger shutting down");
                    self.stop.request_stop();
                    break;
                }
                _ = ticker.tick() => {}
            }

            report.ticks += 1;
            let launcher = self.launcher.clone();
            let params = trigger_params(Utc::now());
            let mut handle = tokio::task::spawn_blocking(move || launcher.try_launch(params));

            let finished = tokio::select! {
                res = &mut handle => Some(res),
                _ = &mut shutdown => None,
            };
            match finished {
                Some(outcome) => record_outcome(&mut report, outcome),
                None => {
                    info!("shutdown requested during run; stopping after current chunk");
                    self.stop.request_stop();
                    record_outcome(&mut report, handle.await);
                    break;
                }
            }
        }
        report
    }
}

fn record_outcome(report: &mut TriggerReport, outcome: Result<Result<ExecutionRecord, BatchError>, JoinError>) {
    match outcome {
        Ok(Ok(rec)) => match rec.status {
            RunStatus::Completed => report.completed += 1,
            RunStatus::Stopped => report.stopped += 1,
            RunStatus::Failed | RunStatus::Started => {
                report.failed += 1;
                if let Err(e) = rec.into_result() {
                    error!("{e}");
                }
            }
        },
        Ok(Err(e @ (BatchError::DuplicateRun { .. } | BatchError::RunInProgress))) => {
            warn!("launch rejected: {e}");
            report.rejected += 1;
        }
        Ok(Err(e)) => {
            error!("launch failed: {e}");
            report.failed += 1;
        }
        Err(e) => {
            error!("run task panicked: {e}");
            report.failed += 1;
        }
    }
}
