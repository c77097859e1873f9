//! Layouts del archivo de personas y constructores de conveniencia.
use std::path::Path;

use crate::reader::DelimitedFileReader;
use crate::writer::DelimitedFileWriter;

/// Columnas del archivo de entrada, en orden.
pub const PERSON_FIELDS: [&str; 9] = ["person_ID", "name", "first", "last", "middle", "email", "phone", "fax", "title"];

/// Columnas del archivo de salida, en orden.
pub const OUTPUT_FIELDS: [&str; 2] = ["first", "last"];

/// Campo evaluado por el filtro de títulos.
pub const TITLE_FIELD: &str = "title";

/// Reader de personas: coma, una línea de cabecera.
pub fn person_reader(path: impl AsRef<Path>) -> DelimitedFileReader {
    DelimitedFileReader::new(path, PERSON_FIELDS).lines_to_skip(1)
}

/// Writer de `first,last` sin cabecera.
pub fn name_writer(path: impl AsRef<Path>) -> DelimitedFileWriter {
    DelimitedFileWriter::new(path, OUTPUT_FIELDS)
}
