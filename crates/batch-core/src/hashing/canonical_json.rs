//! Canonical JSON mínimo: claves de objetos ordenadas y sin espacios, de modo
//! que dos `RunParameters` equivalentes produzcan el mismo texto (y el mismo
//! fingerprint) sin importar el orden de inserción.

use serde_json::Value;
use std::collections::BTreeMap;

pub fn to_canonical_json(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(_) => value.to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(to_canonical_json).collect();
            format!("[{}]", items.join(","))
        }
        Value::Object(map) => {
            let tree: BTreeMap<&String, String> = map.iter().map(|(k, v)| (k, to_canonical_json(v))).collect();
            let items: Vec<String> = tree.into_iter()
                                         .map(|(k, v)| format!("{}:{}", Value::String(k.clone()), v))
                                         .collect();
            format!("{{{}}}", items.join(","))
        }
    }
}
