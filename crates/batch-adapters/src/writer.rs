//! Writer de archivos delimitados.
//!
//! Cada `write_all` codifica el chunk completo en memoria y lo escribe en una
//! sola llamada seguida de `flush`: un error de codificación (campo ausente)
//! no deja líneas parciales del chunk en el archivo.
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use batch_core::{BatchError, OutputRecord, RecordWriter};
use csv::{Terminator, WriterBuilder};
use log::debug;

pub struct DelimitedFileWriter {
    path: PathBuf,
    delimiter: u8,
    field_names: Vec<String>,
    file: Option<File>,
}

impl DelimitedFileWriter {
    pub fn new<I, S>(path: impl AsRef<Path>, field_names: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        Self { path: path.as_ref().to_path_buf(),
               delimiter: b',',
               field_names: field_names.into_iter().map(Into::into).collect(),
               file: None }
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, e: impl std::fmt::Display) -> BatchError {
        BatchError::Write(format!("{}: {e}", self.path.display()))
    }

    fn encode(&self, records: &[OutputRecord]) -> Result<Vec<u8>, BatchError> {
        let mut enc = WriterBuilder::new().has_headers(false)
                                          .delimiter(self.delimiter)
                                          .terminator(Terminator::Any(b'\n'))
                                          .from_writer(Vec::new());
        for record in records {
            let row = self.field_names
                          .iter()
                          .map(|name| {
                              record.get(name)
                                    .ok_or_else(|| BatchError::Write(format!("record lacks field '{name}'")))
                          })
                          .collect::<Result<Vec<&str>, _>>()?;
            enc.write_record(&row).map_err(|e| self.io_err(e))?;
        }
        enc.into_inner().map_err(|e| self.io_err(e))
    }
}

impl RecordWriter for DelimitedFileWriter {
    fn open(&mut self) -> Result<(), BatchError> {
        let file = File::create(&self.path).map_err(|e| self.io_err(e))?;
        self.file = Some(file);
        debug!("opened {} for writing", self.path.display());
        Ok(())
    }

    fn write_all(&mut self, records: &[OutputRecord]) -> Result<(), BatchError> {
        let bytes = self.encode(records)?;
        let file = self.file
                       .as_mut()
                       .ok_or_else(|| BatchError::Write(format!("{} is not open", self.path.display())))?;
        let written = file.write_all(&bytes).and_then(|_| file.flush());
        written.map_err(|e| self.io_err(e))
    }

    fn close(&mut self) -> Result<(), BatchError> {
        if let Some(file) = self.file.take() {
            file.sync_all().map_err(|e| self.io_err(e))?;
            debug!("closed {}", self.path.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn out(first: &str, last: &str) -> OutputRecord {
        OutputRecord::from_pairs([("first", first), ("last", last)])
    }

    #[test]
    fn writes_fixed_field_order_without_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("names.csv");
        let mut w = DelimitedFileWriter::new(&path, ["first", "last"]);
        w.open().unwrap();
        w.write_all(&[out("Ann", "Lee"), out("Bo", "Kim")]).unwrap();
        w.write_all(&[OutputRecord::from_pairs([("last", "Roe"), ("first", "Jo")])]).unwrap();
        w.close().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Ann,Lee\nBo,Kim\nJo,Roe\n");
    }

    #[test]
    fn missing_field_fails_without_partial_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("names.csv");
        let mut w = DelimitedFileWriter::new(&path, ["first", "last"]);
        w.open().unwrap();
        let err = w.write_all(&[out("Ann", "Lee"), OutputRecord::from_pairs([("first", "X")])])
                   .unwrap_err();
        assert!(matches!(err, BatchError::Write(_)));
        w.close().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn write_before_open_is_an_error() {
        let mut w = DelimitedFileWriter::new("unused.csv", ["first"]);
        assert!(matches!(w.write_all(&[out("a", "b")]), Err(BatchError::Write(_))));
    }

    #[test]
    fn open_in_missing_directory_fails() {
        let mut w = DelimitedFileWriter::new("/no/such/dir/out.csv", ["first"]);
        assert!(matches!(w.open(), Err(BatchError::Write(_))));
    }
}
