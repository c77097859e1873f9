//! Store append-only en formato JSON lines.
//!
//! Al abrir se carga el archivo completo en memoria (índice por `run_id`);
//! cada `append_kind` escribe una línea y hace `flush` antes de actualizar el
//! índice, de modo que lo que se ve en memoria siempre está en disco.
//!
//! Recuperación: si la última línea está truncada (crash a mitad de
//! escritura) se descarta y el archivo se recorta; una línea inválida en
//! cualquier otra posición es `PersistenceError::Corrupt`. Un append que
//! falla a mitad de escritura recorta el archivo a la última línea completa,
//! y antes de cada append se descartan bytes sobrantes de una escritura
//! previa interrumpida.
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use batch_core::{BatchError, EventStore, RunEvent, RunEventKind};
use chrono::Utc;
use log::{debug, warn};
use uuid::Uuid;

use crate::error::PersistenceError;

#[derive(Debug)]
pub struct JsonLinesEventStore {
    path: PathBuf,
    file: File,
    /// Bytes del archivo que corresponden a eventos indexados.
    committed_len: u64,
    inner: HashMap<Uuid, Vec<RunEvent>>,
    order: Vec<Uuid>,
}

impl JsonLinesEventStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).read(true).append(true).open(&path)?;

        let mut store = Self { path,
                               file,
                               committed_len: 0,
                               inner: HashMap::new(),
                               order: Vec::new() };
        store.load()?;
        store.committed_len = store.file.metadata()?.len();
        debug!("run log {} loaded: {} runs", store.path.display(), store.order.len());
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&mut self) -> Result<(), PersistenceError> {
        let reader = BufReader::new(File::open(&self.path)?);
        let lines: Vec<String> = reader.lines().collect::<Result<_, _>>()?;
        let mut good_len = 0u64;
        for (idx, line) in lines.iter().enumerate() {
            if line.trim().is_empty() {
                good_len += line.len() as u64 + 1;
                continue;
            }
            match serde_json::from_str::<RunEvent>(line) {
                Ok(ev) => {
                    self.index(ev);
                    good_len += line.len() as u64 + 1;
                }
                Err(e) if idx + 1 == lines.len() => {
                    warn!("run log {}: dropping truncated last line ({e})", self.path.display());
                    self.file.set_len(good_len)?;
                }
                Err(e) => {
                    return Err(PersistenceError::Corrupt { line: idx + 1,
                                                           message: e.to_string() })
                }
            }
        }
        Ok(())
    }

    fn index(&mut self, ev: RunEvent) {
        let run_id = ev.run_id;
        let events = self.inner.entry(run_id).or_insert_with(|| {
                                                 self.order.push(run_id);
                                                 Vec::new()
                                             });
        events.push(ev);
    }

    fn persist(&mut self, ev: &RunEvent) -> Result<(), PersistenceError> {
        let mut line = serde_json::to_string(ev)?;
        line.push('\n');
        if self.file.metadata()?.len() != self.committed_len {
            warn!("run log {}: discarding bytes past last complete event", self.path.display());
            self.file.set_len(self.committed_len)?;
        }
        let written = self.file.write_all(line.as_bytes()).and_then(|_| self.file.flush());
        if let Err(e) = written {
            if let Err(trim) = self.file.set_len(self.committed_len) {
                warn!("run log {}: cannot roll back failed append: {trim}", self.path.display());
            }
            return Err(e.into());
        }
        self.committed_len += line.len() as u64;
        Ok(())
    }
}

impl EventStore for JsonLinesEventStore {
    fn append_kind(&mut self, run_id: Uuid, kind: RunEventKind) -> Result<RunEvent, BatchError> {
        let seq = self.inner.get(&run_id).map(|v| v.len() as u64).unwrap_or(0);
        let ev = RunEvent { seq,
                            run_id,
                            kind,
                            ts: Utc::now() };
        self.persist(&ev)?;
        self.index(ev.clone());
        Ok(ev)
    }

    fn list(&self, run_id: Uuid) -> Vec<RunEvent> {
        self.inner.get(&run_id).cloned().unwrap_or_default()
    }

    fn run_ids(&self) -> Vec<Uuid> {
        self.order.clone()
    }

    fn first(&self, run_id: Uuid) -> Option<RunEvent> {
        self.inner.get(&run_id).and_then(|v| v.first()).cloned()
    }
}
