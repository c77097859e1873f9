//! Configuración del store desde variables de entorno.
//! Convención: `BATCH_RUN_LOG` apunta al archivo JSON lines.

use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

pub const RUN_LOG_VAR: &str = "BATCH_RUN_LOG";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreConfig {
    /// `None`: el host usa el store en memoria.
    pub run_log: Option<PathBuf>,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        Lazy::force(&DOTENV_LOADED);
        let run_log = env::var(RUN_LOG_VAR).ok()
                                           .filter(|v| !v.trim().is_empty())
                                           .map(PathBuf::from);
        Self { run_log }
    }
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
