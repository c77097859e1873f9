use serde::Serialize;
use serde_json::Value;

use crate::constants::ENGINE_VERSION;
use crate::hashing::hash_value;

use super::RunParameters;

/// Insumos del fingerprint de una instancia de run. NO es el fingerprint
/// final sino el modelo previo a canonicalizar.
#[derive(Serialize)]
pub struct RunFingerprintInput<'a> {
    pub engine_version: &'a str,
    pub job_name: &'a str,
    pub params: Value,
}

/// Identidad estable de `(job, parámetros)`; independiente del orden de
/// inserción de los parámetros.
pub fn run_fingerprint(job_name: &str, params: &RunParameters) -> String {
    let input = RunFingerprintInput { engine_version: ENGINE_VERSION,
                                      job_name,
                                      params: params.to_value() };
    hash_value(&serde_json::json!(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_ignores_insertion_order_but_not_values() {
        let a = RunParameters::new().with("timestamp", 1).with("run.id", 5);
        let b = RunParameters::new().with("run.id", 5).with("timestamp", 1);
        let c = RunParameters::new().with("run.id", 5).with("timestamp", 2);
        assert_eq!(run_fingerprint("job", &a), run_fingerprint("job", &b));
        assert_ne!(run_fingerprint("job", &a), run_fingerprint("job", &c));
        assert_ne!(run_fingerprint("job", &a), run_fingerprint("other", &a));
    }
}
