//! Configuración central de la aplicación.
//!
//! Cada clave se acepta en forma de propiedad (`input.file`) o de variable de
//! entorno (`INPUT_FILE`); la forma de propiedad tiene prioridad. El `.env`
//! se carga una sola vez (`Lazy`). `from_lookup` permite construir la
//! configuración desde cualquier fuente (tests, overrides de la CLI).
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use batch_core::constants::DEFAULT_CHUNK_SIZE;
use batch_core::engine::ChunkSettings;
use batch_core::step::NeverRetry;
use batch_core::FaultPolicy;
use dotenvy::dotenv;
use once_cell::sync::Lazy;

use crate::errors::AppError;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

pub const INPUT_FILE: &str = "input.file";
pub const OUTPUT_FILE: &str = "output.file";
pub const CHUNK_SIZE: &str = "batch.chunk-size";
pub const SKIP_TITLE: &str = "batch.skip-title";
pub const SCHEDULE_SECS: &str = "batch.schedule-secs";
pub const ON_PROCESSING_ERROR: &str = "batch.on-processing-error";
pub const ON_MALFORMED: &str = "batch.on-malformed";
pub const SKIP_LIMIT: &str = "batch.skip-limit";
pub const PARALLEL: &str = "batch.parallel";
pub const RUN_LOG: &str = "batch.run-log";

pub const DEFAULT_SKIP_TITLE: &str = "Professor";
pub const DEFAULT_SCHEDULE_SECS: u64 = 60;

/// Configuración del pipeline y del trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub input_file: PathBuf,
    /// Prefijo de la ruta de salida; cada run agrega `_<epoch millis>.csv`.
    pub output_base: String,
    pub chunk_size: usize,
    pub skip_title: String,
    pub schedule: Duration,
    pub on_processing_error: FaultPolicy,
    pub on_malformed: FaultPolicy,
    pub parallel: bool,
    /// Archivo JSON lines para el event store durable (`None`: memoria).
    pub run_log: Option<PathBuf>,
}

/// Nombre en forma de variable de entorno: `batch.chunk-size` → `BATCH_CHUNK_SIZE`.
pub fn env_name(key: &str) -> String {
    key.chars()
       .map(|c| if c == '.' || c == '-' { '_' } else { c.to_ascii_uppercase() })
       .collect()
}

/// Busca `key` en el entorno del proceso (tras cargar `.env`).
pub fn env_lookup(key: &str) -> Option<String> {
    Lazy::force(&DOTENV_LOADED);
    env::var(key).ok().or_else(|| env::var(env_name(key)).ok())
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
        where F: Fn(&str) -> Option<String>
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| AppError::Config(format!("{key} (or {}) is required", env_name(key))))
        };

        let chunk_size: usize = parse_or(get(CHUNK_SIZE), CHUNK_SIZE, DEFAULT_CHUNK_SIZE)?;
        if chunk_size == 0 {
            return Err(AppError::Config(format!("{CHUNK_SIZE} must be at least 1")));
        }
        let schedule_secs: u64 = parse_or(get(SCHEDULE_SECS), SCHEDULE_SECS, DEFAULT_SCHEDULE_SECS)?;
        if schedule_secs == 0 {
            return Err(AppError::Config(format!("{SCHEDULE_SECS} must be at least 1")));
        }
        let skip_limit = get(SKIP_LIMIT).map(|v| parse_value::<u64>(&v, SKIP_LIMIT)).transpose()?;

        Ok(Self { input_file: PathBuf::from(required(INPUT_FILE)?),
                  output_base: required(OUTPUT_FILE)?,
                  chunk_size,
                  skip_title: get(SKIP_TITLE).unwrap_or_else(|| DEFAULT_SKIP_TITLE.to_string()),
                  schedule: Duration::from_secs(schedule_secs),
                  on_processing_error: fault_policy(get(ON_PROCESSING_ERROR), ON_PROCESSING_ERROR, skip_limit)?,
                  on_malformed: fault_policy(get(ON_MALFORMED), ON_MALFORMED, skip_limit)?,
                  parallel: parse_or(get(PARALLEL), PARALLEL, false)?,
                  run_log: get(RUN_LOG).map(PathBuf::from) })
    }

    pub fn chunk_settings(&self) -> ChunkSettings {
        ChunkSettings { chunk_size: self.chunk_size,
                        on_malformed: self.on_malformed,
                        on_processing_error: self.on_processing_error,
                        parallel: self.parallel,
                        write_retry: Arc::new(NeverRetry) }
    }
}

fn parse_value<T: FromStr>(raw: &str, key: &str) -> Result<T, AppError> {
    raw.parse()
       .map_err(|_| AppError::Config(format!("invalid value for {key}: '{raw}'")))
}

fn parse_or<T: FromStr>(raw: Option<String>, key: &str, default: T) -> Result<T, AppError> {
    raw.map(|v| parse_value(&v, key)).unwrap_or(Ok(default))
}

fn fault_policy(raw: Option<String>, key: &str, limit: Option<u64>) -> Result<FaultPolicy, AppError> {
    match raw.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None | Some("abort") => Ok(FaultPolicy::Abort),
        Some("skip") => Ok(FaultPolicy::Skip { limit }),
        Some(other) => Err(AppError::Config(format!("invalid value for {key}: '{other}' (expected abort|skip)"))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn defaults_apply_when_only_paths_are_given() {
        let cfg = AppConfig::from_lookup(lookup(&[(INPUT_FILE, "in.csv"), (OUTPUT_FILE, "out")])).unwrap();
        assert_eq!(cfg.chunk_size, 3);
        assert_eq!(cfg.skip_title, "Professor");
        assert_eq!(cfg.schedule, Duration::from_secs(60));
        assert_eq!(cfg.on_processing_error, FaultPolicy::Abort);
        assert!(!cfg.parallel);
        assert!(cfg.run_log.is_none());
    }

    #[test]
    fn missing_input_is_a_config_error() {
        let err = AppConfig::from_lookup(lookup(&[(OUTPUT_FILE, "out")])).unwrap_err();
        assert!(err.to_string().contains("INPUT_FILE"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let base = [(INPUT_FILE, "in.csv"), (OUTPUT_FILE, "out")];
        for bad in [(CHUNK_SIZE, "0"), (CHUNK_SIZE, "three"), (ON_MALFORMED, "ignore"), (PARALLEL, "maybe")] {
            let mut pairs = base.to_vec();
            pairs.push(bad);
            assert!(matches!(AppConfig::from_lookup(lookup(&pairs)), Err(AppError::Config(_))), "{bad:?}");
        }
    }

    #[test]
    fn skip_policies_share_the_limit() {
        let cfg = AppConfig::from_lookup(lookup(&[(INPUT_FILE, "in.csv"),
                                                  (OUTPUT_FILE, "out"),
                                                  (ON_PROCESSING_ERROR, "Skip"),
                                                  (SKIP_LIMIT, "5")])).unwrap();
        assert_eq!(cfg.on_processing_error, FaultPolicy::Skip { limit: Some(5) });
        assert_eq!(cfg.on_malformed, FaultPolicy::Abort);
    }

    #[test]
    fn env_name_uppercases_and_replaces_separators() {
        assert_eq!(env_name("batch.chunk-size"), "BATCH_CHUNK_SIZE");
        assert_eq!(env_name(INPUT_FILE), "INPUT_FILE");
    }
}
