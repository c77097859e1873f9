use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::BatchError;

/// Contexto de ejecución de un run.
///
/// Se crea vacío al iniciar cada run, lo pueblan los listeners `before_run` y
/// lo leen las factories de reader/writer. Nunca se comparte entre runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionContext {
    values: BTreeMap<String, Value>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Lee un valor string obligatorio. Ausente o de otro tipo es un
    /// `BatchError::Configuration`: nunca se cae a un valor por defecto.
    pub fn require_str(&self, key: &str) -> Result<&str, BatchError> {
        self.get_str(key)
            .ok_or_else(|| BatchError::Configuration(format!("execution context has no string value for '{key}'")))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn entries(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<BTreeMap<String, Value>> for ExecutionContext {
    fn from(values: BTreeMap<String, Value>) -> Self {
        Self { values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_str_fails_fast_on_missing_or_non_string() {
        let mut ctx = ExecutionContext::new();
        assert!(matches!(ctx.require_str("output.path"), Err(BatchError::Configuration(_))));

        ctx.put("output.path", 42);
        assert!(matches!(ctx.require_str("output.path"), Err(BatchError::Configuration(_))));

        ctx.put("output.path", "/tmp/out_1.csv");
        assert_eq!(ctx.require_str("output.path").unwrap(), "/tmp/out_1.csv");
    }
}
