#![allow(dead_code)]
//! Fixtures en memoria compartidas por los tests de integración.
use std::sync::{Arc, Mutex};

use batch_core::constants::OUTPUT_PATH_KEY;
use batch_core::{BatchError, ExecutionContext, FnListener, InputRecord, OutputRecord, ProcessOutcome, RecordReader,
                 RecordWriter};

pub type Journal = Arc<Mutex<Vec<String>>>;
pub type Written = Arc<Mutex<Vec<Vec<OutputRecord>>>>;

pub fn person(line: u64, first: &str, last: &str, title: &str) -> InputRecord {
    InputRecord::from_pairs(line, [("first", first), ("last", last), ("title", title)])
}

/// Registros `p0..pN` donde los índices en `professors` tienen título Professor.
pub fn people(n: usize, professors: &[usize]) -> Vec<InputRecord> {
    (0..n).map(|i| {
              let title = if professors.contains(&i) { "Associate Professor" } else { "Engineer" };
              person(i as u64 + 1, &format!("p{i}"), &format!("l{i}"), title)
          })
          .collect()
}

pub fn firsts(chunks: &[Vec<OutputRecord>]) -> Vec<String> {
    chunks.iter()
          .flatten()
          .map(|r| r.get("first").unwrap_or_default().to_string())
          .collect()
}

/// Descarta títulos que contienen "Professor" y proyecta (first, last).
pub fn professor_filter(r: &InputRecord) -> Result<ProcessOutcome, BatchError> {
    if r.require("title")?.contains("Professor") {
        return Ok(ProcessOutcome::Filtered);
    }
    Ok(ProcessOutcome::Output(OutputRecord::from_pairs([("first", r.require("first")?),
                                                        ("last", r.require("last")?)])))
}

pub fn output_listener(path: &str) -> FnListener {
    let path = path.to_string();
    FnListener::new().before(move |ctx: &mut ExecutionContext| {
                         ctx.put(OUTPUT_PATH_KEY, path.clone());
                         Ok(())
                     })
}

pub struct VecReader {
    items: Vec<Result<InputRecord, BatchError>>,
    cursor: usize,
    journal: Journal,
}

impl VecReader {
    pub fn new(records: Vec<InputRecord>, journal: Journal) -> Self {
        Self::with_results(records.into_iter().map(Ok).collect(), journal)
    }

    pub fn with_results(items: Vec<Result<InputRecord, BatchError>>, journal: Journal) -> Self {
        Self { items,
               cursor: 0,
               journal }
    }
}

impl RecordReader for VecReader {
    fn open(&mut self) -> Result<(), BatchError> {
        self.journal.lock().unwrap().push("reader.open".into());
        Ok(())
    }

    fn next_record(&mut self) -> Result<Option<InputRecord>, BatchError> {
        let item = self.items.get(self.cursor).cloned();
        self.cursor += 1;
        item.transpose()
    }

    fn close(&mut self) -> Result<(), BatchError> {
        self.journal.lock().unwrap().push("reader.close".into());
        Ok(())
    }
}

/// Writer que guarda cada chunk recibido. `fail_on` indica qué llamadas a
/// `write_all` (base 0) fallan.
pub struct RecordingWriter {
    pub written: Written,
    journal: Journal,
    fail_on: Vec<usize>,
    calls: usize,
}

impl RecordingWriter {
    pub fn new(written: Written, journal: Journal) -> Self {
        Self { written,
               journal,
               fail_on: vec![],
               calls: 0 }
    }

    pub fn failing_on(mut self, calls: &[usize]) -> Self {
        self.fail_on = calls.to_vec();
        self
    }
}

impl RecordWriter for RecordingWriter {
    fn open(&mut self) -> Result<(), BatchError> {
        self.journal.lock().unwrap().push("writer.open".into());
        Ok(())
    }

    fn write_all(&mut self, records: &[OutputRecord]) -> Result<(), BatchError> {
        let call = self.calls;
        self.calls += 1;
        if self.fail_on.contains(&call) {
            return Err(BatchError::Write(format!("disk full on call {call}")));
        }
        self.written.lock().unwrap().push(records.to_vec());
        Ok(())
    }

    fn close(&mut self) -> Result<(), BatchError> {
        self.journal.lock().unwrap().push("writer.close".into());
        Ok(())
    }
}
