use crate::error::Result;
use crate::models::schema::OUTPUT_COLUMNS;
use crate::models::EnrichedObservation;
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub struct CsvWriter {
    delimiter: u8,
}

impl CsvWriter {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn write_records(&self, records: &[EnrichedObservation], path: &Path) -> Result<()> {
        let file = File::create(path)?;
        self.write_to(records, file)
    }

    /// Write a header row and one line per observation. The header is
    /// written even when the batch is empty.
    pub fn write_to<W: Write>(&self, records: &[EnrichedObservation], sink: W) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .from_writer(sink);

        writer.write_record(OUTPUT_COLUMNS)?;
        for record in records {
            writer.serialize(record)?;
        }

        writer.flush()?;
        Ok(())
    }
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}
