use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Señal de detención cooperativa. El `ChunkRunner` la consulta entre chunks:
/// el chunk en curso termina y el run queda STOPPED. El `JobDriver` la
/// rearma al cerrar ese run.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Rearma la señal para un próximo run.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
