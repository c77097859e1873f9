//! batch-adapters: componentes concretos para el motor batch.
//!
//! Este crate provee:
//! - `DelimitedFileReader` / `DelimitedFileWriter`: lectura y escritura de
//!   archivos delimitados con el crate `csv`.
//! - `TitleFilterProcessor`: la regla de negocio (descarta títulos que
//!   contienen una subcadena y proyecta nombre y apellido).
//! - `TimestampedOutputListener`: hook previo al run que decide la ruta de
//!   salida `<base>_<epoch millis>.csv`.
//! - `fields`: layouts del archivo de personas.
//!
//! Nota: el core no conoce archivos; todo el IO vive aquí.

pub mod fields;
pub mod listener;
pub mod processor;
pub mod reader;
pub mod writer;

pub use listener::TimestampedOutputListener;
pub use processor::TitleFilterProcessor;
pub use reader::DelimitedFileReader;
pub use writer::DelimitedFileWriter;
