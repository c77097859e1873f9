use std::sync::{Arc, Mutex, TryLockError};

use log::{debug, warn};

use crate::errors::BatchError;
use crate::event::EventStore;
use crate::model::{ExecutionRecord, RunParameters};
use crate::repo::ExecutionRepository;

use super::JobDriver;

/// Handle compartible para lanzar runs desde varios hilos (trigger, CLI).
/// Un run a la vez: un lanzamiento mientras otro está en curso se rechaza
/// con `RunInProgress` en lugar de quedar en cola.
pub struct JobLauncher<E: EventStore, R: ExecutionRepository> {
    driver: Arc<Mutex<JobDriver<E, R>>>,
}

impl<E: EventStore, R: ExecutionRepository> Clone for JobLauncher<E, R> {
    fn clone(&self) -> Self {
        Self { driver: Arc::clone(&self.driver) }
    }
}

impl<E: EventStore, R: ExecutionRepository> JobLauncher<E, R> {
    pub fn new(driver: JobDriver<E, R>) -> Self {
        Self { driver: Arc::new(Mutex::new(driver)) }
    }

    pub fn try_launch(&self, params: RunParameters) -> Result<ExecutionRecord, BatchError> {
        let mut driver = match self.driver.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => {
                debug!("launch rejected: a run is already in progress");
                return Err(BatchError::RunInProgress);
            }
            Err(TryLockError::Poisoned(poisoned)) => {
                // El estado vive en el event store; el run interrumpido queda
                // STARTED y el siguiente lo trata como restart.
                warn!("previous run panicked; continuing with event-sourced state");
                poisoned.into_inner()
            }
        };
        driver.run(params)
    }

    /// Acceso de sólo lectura al driver (espera a que termine un run en curso).
    pub fn inspect<T>(&self, f: impl FnOnce(&JobDriver<E, R>) -> T) -> T {
        let driver = match self.driver.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&driver)
    }
}
