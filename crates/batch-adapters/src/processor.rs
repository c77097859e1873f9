use batch_core::{BatchError, InputRecord, OutputRecord, ProcessOutcome, RecordProcessor};

use crate::fields::{OUTPUT_FIELDS, TITLE_FIELD};

/// Descarta los registros cuyo título contiene `needle` (sensible a
/// mayúsculas) y proyecta el resto sobre `projection`.
#[derive(Debug, Clone)]
pub struct TitleFilterProcessor {
    title_field: String,
    needle: String,
    projection: Vec<String>,
}

impl TitleFilterProcessor {
    pub fn new(needle: impl Into<String>) -> Self {
        Self { title_field: TITLE_FIELD.to_string(),
               needle: needle.into(),
               projection: OUTPUT_FIELDS.iter().map(|s| s.to_string()).collect() }
    }

    pub fn with_projection<I, S>(mut self, fields: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        self.projection = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn needle(&self) -> &str {
        &self.needle
    }
}

impl RecordProcessor for TitleFilterProcessor {
    fn process(&self, record: &InputRecord) -> Result<ProcessOutcome, BatchError> {
        if record.require(&self.title_field)?.contains(self.needle.as_str()) {
            return Ok(ProcessOutcome::Filtered);
        }
        let pairs = self.projection
                        .iter()
                        .map(|name| record.require(name).map(|v| (name.as_str(), v)))
                        .collect::<Result<Vec<_>, _>>()?;
        Ok(ProcessOutcome::Output(OutputRecord::from_pairs(pairs)))
    }
}
