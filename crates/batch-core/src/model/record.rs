//! Registros de entrada y salida.
//!
//! Ambos son inmutables una vez construidos y conservan el orden de sus
//! campos (`IndexMap`): el de la lista de nombres configurada para la entrada
//! y el de la proyección para la salida.
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::BatchError;

/// Registro parseado de una línea delimitada.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    line: u64, // número de línea en la fuente (1-based)
    fields: IndexMap<String, String>,
}

impl InputRecord {
    pub fn new(line: u64, fields: IndexMap<String, String>) -> Self {
        Self { line, fields }
    }

    /// Construye el registro emparejando nombres y valores en orden.
    pub fn from_pairs<K, V, I>(line: u64, pairs: I) -> Self
        where I: IntoIterator<Item = (K, V)>,
              K: Into<String>,
              V: Into<String>
    {
        Self::new(line, pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Igual que `get` pero un campo ausente es un `BatchError::Processing`
    /// que lleva el registro ofensor.
    pub fn require(&self, name: &str) -> Result<&str, BatchError> {
        self.get(name)
            .ok_or_else(|| BatchError::processing(self, format!("missing field '{name}'")))
    }

    pub fn fields(&self) -> &IndexMap<String, String> {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for InputRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<&str> = self.fields.values().map(String::as_str).collect();
        write!(f, "{}", values.join(","))
    }
}

/// Proyección de un `InputRecord` con sólo los campos que selecciona la regla
/// de negocio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    fields: IndexMap<String, String>,
}

impl OutputRecord {
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
        where I: IntoIterator<Item = (K, V)>,
              K: Into<String>,
              V: Into<String>
    {
        Self { fields: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn fields(&self) -> &IndexMap<String, String> {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
