use std::fmt;

use crate::errors::BatchError;
use crate::model::ExecutionContext;
use crate::step::RunStatus;

use super::RunListener;

type BeforeFn = Box<dyn Fn(&mut ExecutionContext) -> Result<(), BatchError> + Send + Sync>;
type AfterFn = Box<dyn Fn(&ExecutionContext, RunStatus) -> Option<RunStatus> + Send + Sync>;

/// Listener armado a partir de un par de closures.
#[derive(Default)]
pub struct FnListener {
    before: Option<BeforeFn>,
    after: Option<AfterFn>,
}

impl FnListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn before<F>(mut self, f: F) -> Self
        where F: Fn(&mut ExecutionContext) -> Result<(), BatchError> + Send + Sync + 'static
    {
        self.before = Some(Box::new(f));
        self
    }

    pub fn after<F>(mut self, f: F) -> Self
        where F: Fn(&ExecutionContext, RunStatus) -> Option<RunStatus> + Send + Sync + 'static
    {
        self.after = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for FnListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnListener")
         .field("before", &self.before.is_some())
         .field("after", &self.after.is_some())
         .finish()
    }
}

impl RunListener for FnListener {
    fn before_run(&self, ctx: &mut ExecutionContext) -> Result<(), BatchError> {
        match &self.before {
            Some(f) => f(ctx),
            None => Ok(()),
        }
    }

    fn after_run(&self, ctx: &ExecutionContext, status: RunStatus) -> Option<RunStatus> {
        self.after.as_ref().and_then(|f| f(ctx, status))
    }
}
