use std::fmt;
use std::sync::Arc;

use batch_core::constants::OUTPUT_PATH_KEY;
use batch_core::{BatchError, ExecutionContext, RunListener};
use chrono::{DateTime, Utc};
use log::info;

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Hook previo al run: calcula `<base>_<epoch millis><suffix>` y lo deja en
/// el contexto bajo `OUTPUT_PATH_KEY`, donde lo lee la factory del writer.
pub struct TimestampedOutputListener {
    base: String,
    suffix: String,
    clock: Clock,
}

impl TimestampedOutputListener {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into(),
               suffix: ".csv".to_string(),
               clock: Arc::new(Utc::now) }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Reloj inyectable (tests).
    pub fn with_clock<F>(mut self, clock: F) -> Self
        where F: Fn() -> DateTime<Utc> + Send + Sync + 'static
    {
        self.clock = Arc::new(clock);
        self
    }

    pub fn path_at(&self, at: DateTime<Utc>) -> String {
        format!("{}_{}{}", self.base, at.timestamp_millis(), self.suffix)
    }
}

impl fmt::Debug for TimestampedOutputListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimestampedOutputListener")
         .field("base", &self.base)
         .field("suffix", &self.suffix)
         .finish()
    }
}

impl RunListener for TimestampedOutputListener {
    fn before_run(&self, ctx: &mut ExecutionContext) -> Result<(), BatchError> {
        let path = self.path_at((self.clock)());
        info!("output for this run: {path}");
        ctx.put(OUTPUT_PATH_KEY, path);
        Ok(())
    }
}
