use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parámetros de un run.
///
/// Deben contener al menos un valor que haga única a cada ejecución
/// (timestamp o id incremental); dos runs con parámetros idénticos son la
/// misma instancia y el segundo se rechaza si el primero completó.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunParameters {
    values: BTreeMap<String, Value>,
}

impl RunParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Variante encadenable de `insert`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Agrega un instante como epoch millis (mismo formato que usa el trigger).
    pub fn with_timestamp(self, key: impl Into<String>, at: DateTime<Utc>) -> Self {
        self.with(key, at.timestamp_millis())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.values.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}
