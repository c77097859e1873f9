//! Constantes del motor core.
//!
//! Este módulo agrupa valores estáticos que participan en el cálculo de
//! fingerprints de ejecución y en el contrato entre listeners y factories.
//! Cambiar `ENGINE_VERSION` altera la identidad de todas las instancias de run.

/// Versión lógica del motor. Forma parte del `RunFingerprintInput`, de modo
/// que un cambio incompatible del engine no confunda ejecuciones antiguas con
/// nuevas aunque los parámetros coincidan.
pub const ENGINE_VERSION: &str = "B1.0";

/// Tamaño de chunk por defecto (registros de entrada por commit).
pub const DEFAULT_CHUNK_SIZE: usize = 3;

/// Clave del `ExecutionContext` donde el listener previo al run deja la ruta
/// de salida calculada para esa ejecución.
pub const OUTPUT_PATH_KEY: &str = "output.path";

/// Nombre de job usado cuando el builder no recibe uno.
pub const DEFAULT_JOB_NAME: &str = "batchJob";
