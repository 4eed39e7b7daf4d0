use crate::error::{ProcessingError, Result};
use crate::models::RawObservation;
use crate::utils::constants::DEFAULT_BUFFER_SIZE;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Columns a batch must carry for the transform to run. Every other model
/// feature is optional and passed through when present.
pub const REQUIRED_COLUMNS: [&str; 5] =
    ["latitude", "longitude", "acq_date", "acq_time", "satellite"];

pub struct ObservationReader {
    delimiter: u8,
}

impl ObservationReader {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Read a detection batch from a CSV file with a header row
    pub fn read_observations(&self, path: &Path) -> Result<Vec<RawObservation>> {
        let file = File::open(path)?;
        let records = self.read_from(BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file))?;

        debug!(path = %path.display(), rows = records.len(), "Read observation batch");
        Ok(records)
    }

    /// Read a detection batch from any CSV source
    pub fn read_from<R: Read>(&self, source: R) -> Result<Vec<RawObservation>> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(csv::Trim::Headers)
            .from_reader(source);

        let headers = reader.headers()?.clone();
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|column| !headers.iter().any(|h| h == *column))
            .collect();

        if !missing.is_empty() {
            return Err(ProcessingError::MissingData(format!(
                "Missing required columns: {}",
                missing.join(", ")
            )));
        }

        let mut records = Vec::new();
        for result in reader.deserialize() {
            let record: RawObservation = result?;
            records.push(record);
        }

        Ok(records)
    }
}

impl Default for ObservationReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "latitude,longitude,brightness,scan,track,acq_date,acq_time,satellite,instrument,confidence,version,bright_t31,frp,daynight,type";

    #[test]
    fn test_read_observation_file() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "{}", HEADER)?;
        writeln!(
            temp_file,
            "34.567,-118.123,325.4,1.1,1.0,2020-01-05,1200,T,MODIS,78,6.1NRT,290.2,15.6,D,0"
        )?;
        writeln!(
            temp_file,
            "-12.301,131.05,310.0,2.3,1.4,2020-08-14,5,A,MODIS,55,6.1NRT,296.9,8.1,N,"
        )?;

        let reader = ObservationReader::new();
        let records = reader.read_observations(temp_file.path())?;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].latitude, 34.567);
        assert_eq!(records[0].satellite, "T");
        assert_eq!(records[0].detection_type, Some(0));
        assert_eq!(records[1].acq_time, "5");
        assert_eq!(records[1].detection_type, None);
        assert_eq!(records[1].confidence.as_deref(), Some("55"));

        Ok(())
    }

    #[test]
    fn test_optional_columns_may_be_absent() -> Result<()> {
        let data = "\
latitude,longitude,brightness,scan,track,acq_date,acq_time,satellite,confidence,bright_t31,frp,daynight
10.5,20.25,300.1,1.0,1.0,2021-03-02,0130,A,n,280.0,3.3,N
";
        let records = ObservationReader::new().read_from(data.as_bytes())?;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].instrument, None);
        assert_eq!(records[0].version, None);
        assert_eq!(records[0].confidence.as_deref(), Some("n"));
        Ok(())
    }

    #[test]
    fn test_non_numeric_latitude_is_conversion_error() {
        let data = format!(
            "{}\nnorth,-118.123,325.4,1.1,1.0,2020-01-05,1200,T,MODIS,78,6.1NRT,290.2,15.6,D,0\n",
            HEADER
        );

        let result = ObservationReader::new().read_from(data.as_bytes());
        assert!(matches!(result, Err(ProcessingError::Csv(_))));
    }

    #[test]
    fn test_missing_required_column() {
        let data = "latitude,longitude,acq_date\n1.0,2.0,2020-01-01\n";

        match ObservationReader::new().read_from(data.as_bytes()) {
            Err(ProcessingError::MissingData(message)) => {
                assert!(message.contains("acq_time"));
                assert!(message.contains("satellite"));
                assert!(!message.contains("latitude"));
            }
            other => panic!("expected missing columns error, got {:?}", other),
        }
    }

    #[test]
    fn test_minimal_columns() -> Result<()> {
        let data = "latitude,longitude,acq_date,acq_time,satellite
34.567,-118.123,2020-01-05,1200,T
";
        let records = ObservationReader::new().read_from(data.as_bytes())?;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].latitude, 34.567);
        assert_eq!(records[0].satellite, "T");
        assert_eq!(records[0].brightness, None);
        assert_eq!(records[0].daynight, None);
        assert_eq!(records[0].confidence, None);
        Ok(())
    }

    #[test]
    fn test_field_whitespace_preserved() -> Result<()> {
        let data = "latitude , longitude,acq_date,acq_time,satellite
10.0,20.0,2021-03-02,0130, X 
";
        let records = ObservationReader::new().read_from(data.as_bytes())?;

        assert_eq!(records[0].satellite, " X ");
        assert_eq!(records[0].latitude, 10.0);
        Ok(())
    }

    #[test]
    fn test_semicolon_delimiter() -> Result<()> {
        let data = "latitude;longitude;acq_date;acq_time;satellite
10.0;20.0;2021-03-02;0130;A
";
        let records = ObservationReader::new()
            .with_delimiter(b';')
            .read_from(data.as_bytes())?;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].satellite, "A");
        Ok(())
    }
}
