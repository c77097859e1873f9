//! `CompositeListener`: aplica una secuencia de `RunListener` de forma
//! determinista.

use crate::errors::BatchError;
use crate::model::ExecutionContext;
use crate::step::RunStatus;

use super::RunListener;

/// Ejecuta los listeners en orden. `before_run` se corta en el primer error;
/// en `after_run` cada listener ve el estado que dejó el anterior.
#[derive(Debug, Default)]
pub struct CompositeListener {
    pub listeners: Vec<Box<dyn RunListener>>,
}

impl CompositeListener {
    pub fn new() -> Self {
        Self { listeners: vec![] }
    }

    pub fn with_listeners(listeners: Vec<Box<dyn RunListener>>) -> Self {
        Self { listeners }
    }

    pub fn push(&mut self, listener: Box<dyn RunListener>) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl RunListener for CompositeListener {
    fn before_run(&self, ctx: &mut ExecutionContext) -> Result<(), BatchError> {
        for l in self.listeners.iter() {
            l.before_run(ctx)?;
        }
        Ok(())
    }

    fn after_run(&self, ctx: &ExecutionContext, status: RunStatus) -> Option<RunStatus> {
        let mut current = status;
        let mut overridden = false;
        for l in self.listeners.iter() {
            if let Some(s) = l.after_run(ctx, current) {
                current = s;
                overridden = true;
            }
        }
        overridden.then_some(current)
    }
}
