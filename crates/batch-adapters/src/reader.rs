//! Reader de archivos delimitados.
//!
//! Cada registro ocupa una línea física. El número de línea lo lleva este
//! reader (el crate `csv` omite las líneas vacías y no las cuenta); `csv`
//! sólo separa los campos de cada línea. Una línea vacía es un registro de
//! cero campos y por lo tanto `MalformedRecord`.
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use batch_core::{BatchError, InputRecord, RecordReader};
use csv::{ReaderBuilder, StringRecord};
use indexmap::IndexMap;
use log::debug;

pub struct DelimitedFileReader {
    path: PathBuf,
    delimiter: u8,
    lines_to_skip: usize,
    field_names: Vec<String>,
    inner: Option<BufReader<File>>,
    line_no: u64,
    raw: String,
    buf: StringRecord,
}

impl DelimitedFileReader {
    pub fn new<I, S>(path: impl AsRef<Path>, field_names: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        Self { path: path.as_ref().to_path_buf(),
               delimiter: b',',
               lines_to_skip: 0,
               field_names: field_names.into_iter().map(Into::into).collect(),
               inner: None,
               line_no: 0,
               raw: String::new(),
               buf: StringRecord::new() }
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Líneas de cabecera a descartar al abrir.
    pub fn lines_to_skip(mut self, lines: usize) -> Self {
        self.lines_to_skip = lines;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lee la próxima línea física en `raw`, sin terminador.
    fn read_line(&mut self) -> Result<bool, BatchError> {
        let reader = self.inner
                         .as_mut()
                         .ok_or_else(|| BatchError::Read(format!("{} is not open", self.path.display())))?;
        self.raw.clear();
        let n = reader.read_line(&mut self.raw)
                      .map_err(|e| BatchError::Read(format!("{}: {e}", self.path.display())))?;
        if n == 0 {
            return Ok(false);
        }
        self.line_no += 1;
        let len = self.raw.trim_end_matches(&['\n', '\r'][..]).len();
        self.raw.truncate(len);
        Ok(true)
    }

    fn split_fields(&mut self) -> Result<(), BatchError> {
        self.buf.clear();
        if self.raw.is_empty() {
            return Ok(());
        }
        let mut line = ReaderBuilder::new().has_headers(false)
                                           .flexible(true)
                                           .delimiter(self.delimiter)
                                           .from_reader(self.raw.as_bytes());
        line.read_record(&mut self.buf)
            .map_err(|e| BatchError::Read(format!("{} line {}: {e}", self.path.display(), self.line_no)))?;
        Ok(())
    }
}

impl RecordReader for DelimitedFileReader {
    fn open(&mut self) -> Result<(), BatchError> {
        let file = File::open(&self.path).map_err(|e| BatchError::Read(format!("cannot open {}: {e}",
                                                                                self.path.display())))?;
        self.inner = Some(BufReader::new(file));
        self.line_no = 0;
        for _ in 0..self.lines_to_skip {
            if !self.read_line()? {
                break;
            }
        }
        debug!("opened {} (skipped {} header lines)", self.path.display(), self.lines_to_skip);
        Ok(())
    }

    fn next_record(&mut self) -> Result<Option<InputRecord>, BatchError> {
        if !self.read_line()? {
            return Ok(None);
        }
        self.split_fields()?;
        if self.buf.len() != self.field_names.len() {
            return Err(BatchError::MalformedRecord { line: self.line_no,
                                                     expected: self.field_names.len(),
                                                     found: self.buf.len() });
        }
        let fields: IndexMap<String, String> = self.field_names
                                                   .iter()
                                                   .cloned()
                                                   .zip(self.buf.iter().map(str::to_string))
                                                   .collect();
        Ok(Some(InputRecord::new(self.line_no, fields)))
    }

    /// Avanza sin construir registros; una línea malformada o vacía también
    /// cuenta como posición consumida.
    fn skip_records(&mut self, count: u64) -> Result<u64, BatchError> {
        let mut skipped = 0;
        while skipped < count && self.read_line()? {
            skipped += 1;
        }
        Ok(skipped)
    }

    fn close(&mut self) -> Result<(), BatchError> {
        if self.inner.take().is_some() {
            debug!("closed {}", self.path.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn file_with(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn skips_header_and_names_fields() {
        let f = file_with("a,b\n1,2\n3,4\n");
        let mut r = DelimitedFileReader::new(f.path(), ["x", "y"]).lines_to_skip(1);
        r.open().unwrap();
        let first = r.next_record().unwrap().unwrap();
        assert_eq!(first.get("x"), Some("1"));
        assert_eq!(first.get("y"), Some("2"));
        assert_eq!(first.line(), 2);
        assert_eq!(r.next_record().unwrap().unwrap().get("x"), Some("3"));
        assert!(r.next_record().unwrap().is_none());
        r.close().unwrap();
        r.close().unwrap();
    }

    #[test]
    fn field_count_mismatch_is_malformed_with_line_number() {
        let f = file_with("h\n1,2\n3\n");
        let mut r = DelimitedFileReader::new(f.path(), ["x", "y"]).lines_to_skip(1);
        r.open().unwrap();
        assert!(r.next_record().unwrap().is_some());
        assert_eq!(r.next_record().unwrap_err(),
                   BatchError::MalformedRecord { line: 3,
                                                 expected: 2,
                                                 found: 1 });
    }

    #[test]
    fn missing_file_fails_on_open() {
        let mut r = DelimitedFileReader::new("/definitely/not/here.csv", ["x"]);
        assert!(matches!(r.open(), Err(BatchError::Read(_))));
    }

    #[test]
    fn skip_records_counts_until_end() {
        let f = file_with("1,2\n3,4\n");
        let mut r = DelimitedFileReader::new(f.path(), ["x", "y"]);
        r.open().unwrap();
        assert_eq!(r.skip_records(5).unwrap(), 2);
        assert!(r.next_record().unwrap().is_none());
    }

    #[test]
    fn blank_line_is_malformed_and_keeps_physical_line_numbers() {
        let f = file_with("h\n1,2\n\n3\n5,6\n");
        let mut r = DelimitedFileReader::new(f.path(), ["x", "y"]).lines_to_skip(1);
        r.open().unwrap();
        assert_eq!(r.next_record().unwrap().unwrap().line(), 2);
        assert_eq!(r.next_record().unwrap_err(),
                   BatchError::MalformedRecord { line: 3,
                                                 expected: 2,
                                                 found: 0 });
        assert_eq!(r.next_record().unwrap_err(),
                   BatchError::MalformedRecord { line: 4,
                                                 expected: 2,
                                                 found: 1 });
        let last = r.next_record().unwrap().unwrap();
        assert_eq!(last.line(), 5);
        assert_eq!(last.get("y"), Some("6"));
        assert!(r.next_record().unwrap().is_none());
    }

    #[test]
    fn crlf_and_quoted_fields() {
        let f = file_with("1,\"a, b\"\r\n3,4\r\n");
        let mut r = DelimitedFileReader::new(f.path(), ["x", "y"]);
        r.open().unwrap();
        assert_eq!(r.next_record().unwrap().unwrap().get("y"), Some("a, b"));
        assert_eq!(r.next_record().unwrap().unwrap().get("y"), Some("4"));
        assert!(r.next_record().unwrap().is_none());
    }

    #[test]
    fn skip_records_counts_blank_lines_as_positions() {
        let f = file_with("1,2\n\n3,4\n");
        let mut r = DelimitedFileReader::new(f.path(), ["x", "y"]);
        r.open().unwrap();
        assert_eq!(r.skip_records(2).unwrap(), 2);
        assert_eq!(r.next_record().unwrap().unwrap().line(), 3);
    }
}
