use crate::error::{ProcessingError, Result};
use crate::models::schema;
use crate::models::EnrichedObservation;
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_ROW_GROUP_SIZE,
};
use arrow::array::*;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Write enriched observations in batches of `batch_size` rows
    pub fn write_records_batched(
        &self,
        records: &[EnrichedObservation],
        path: &Path,
        batch_size: usize,
    ) -> Result<()> {
        let schema = self.create_schema();
        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

        for chunk in records.chunks(batch_size.max(1)) {
            let batch = self.records_to_batch(chunk, schema.clone())?;
            writer.write(&batch)?;
        }

        writer.close()?;
        Ok(())
    }

    pub fn write_records(&self, records: &[EnrichedObservation], path: &Path) -> Result<()> {
        self.write_records_batched(records, path, records.len())
    }

    /// Arrow schema mirroring `EnrichedObservation`
    fn create_schema(&self) -> Arc<Schema> {
        let fields = vec![
            Field::new(schema::LATITUDE, DataType::Float64, false),
            Field::new(schema::LONGITUDE, DataType::Float64, false),
            Field::new(schema::BRIGHTNESS, DataType::Float64, true),
            Field::new(schema::SCAN, DataType::Float64, true),
            Field::new(schema::TRACK, DataType::Float64, true),
            Field::new(schema::SATELLITE, DataType::Utf8, false),
            Field::new(schema::INSTRUMENT, DataType::Utf8, true),
            Field::new(schema::CONFIDENCE, DataType::Utf8, true),
            Field::new(schema::VERSION, DataType::Utf8, true),
            Field::new(schema::BRIGHT_T31, DataType::Float64, true),
            Field::new(schema::FRP, DataType::Float64, true),
            Field::new(schema::DAYNIGHT, DataType::Utf8, true),
            Field::new(schema::DETECTION_TYPE, DataType::UInt8, true),
            Field::new(schema::MONTH, DataType::UInt32, false),
            Field::new(schema::WEEK_OF_YEAR, DataType::UInt32, false),
            Field::new(schema::CLUSTER_MEMBERSHIP, DataType::Boolean, false),
        ];

        Arc::new(Schema::new(fields))
    }

    fn records_to_batch(
        &self,
        records: &[EnrichedObservation],
        schema: Arc<Schema>,
    ) -> Result<RecordBatch> {
        let f64_column = |f: fn(&EnrichedObservation) -> f64| -> ArrayRef {
            Arc::new(Float64Array::from(records.iter().map(f).collect::<Vec<_>>()))
        };
        let nullable_f64_column = |f: fn(&EnrichedObservation) -> Option<f64>| -> ArrayRef {
            Arc::new(Float64Array::from(records.iter().map(f).collect::<Vec<_>>()))
        };

        let columns: Vec<ArrayRef> = vec![
            f64_column(|r| r.latitude),
            f64_column(|r| r.longitude),
            nullable_f64_column(|r| r.brightness),
            nullable_f64_column(|r| r.scan),
            nullable_f64_column(|r| r.track),
            Arc::new(StringArray::from(
                records.iter().map(|r| r.satellite.clone()).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                records.iter().map(|r| r.instrument.clone()).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                records.iter().map(|r| r.confidence.clone()).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                records.iter().map(|r| r.version.clone()).collect::<Vec<_>>(),
            )),
            nullable_f64_column(|r| r.bright_t31),
            nullable_f64_column(|r| r.frp),
            Arc::new(StringArray::from(
                records.iter().map(|r| r.daynight.clone()).collect::<Vec<_>>(),
            )),
            Arc::new(UInt8Array::from(
                records.iter().map(|r| r.detection_type).collect::<Vec<_>>(),
            )),
            Arc::new(UInt32Array::from(
                records.iter().map(|r| r.month).collect::<Vec<_>>(),
            )),
            Arc::new(UInt32Array::from(
                records.iter().map(|r| r.week_of_year).collect::<Vec<_>>(),
            )),
            Arc::new(BooleanArray::from(
                records
                    .iter()
                    .map(|r| r.cluster_membership)
                    .collect::<Vec<_>>(),
            )),
        ];

        Ok(RecordBatch::try_new(schema, columns)?)
    }

    /// Read back up to `limit` enriched observations
    pub fn read_sample_records(&self, path: &Path, limit: usize) -> Result<Vec<EnrichedObservation>> {
        use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

        let file = File::open(path)?;
        let parquet_reader = ParquetRecordBatchReaderBuilder::try_new(file)?
            .with_batch_size(limit.clamp(1, 8192))
            .build()?;

        let mut records = Vec::new();

        for batch_result in parquet_reader {
            let batch = batch_result?;

            let latitudes = column::<Float64Array>(&batch, schema::LATITUDE)?;
            let longitudes = column::<Float64Array>(&batch, schema::LONGITUDE)?;
            let brightness = column::<Float64Array>(&batch, schema::BRIGHTNESS)?;
            let scans = column::<Float64Array>(&batch, schema::SCAN)?;
            let tracks = column::<Float64Array>(&batch, schema::TRACK)?;
            let satellites = column::<StringArray>(&batch, schema::SATELLITE)?;
            let instruments = column::<StringArray>(&batch, schema::INSTRUMENT)?;
            let confidences = column::<StringArray>(&batch, schema::CONFIDENCE)?;
            let versions = column::<StringArray>(&batch, schema::VERSION)?;
            let bright_t31s = column::<Float64Array>(&batch, schema::BRIGHT_T31)?;
            let frps = column::<Float64Array>(&batch, schema::FRP)?;
            let daynights = column::<StringArray>(&batch, schema::DAYNIGHT)?;
            let types = column::<UInt8Array>(&batch, schema::DETECTION_TYPE)?;
            let months = column::<UInt32Array>(&batch, schema::MONTH)?;
            let weeks = column::<UInt32Array>(&batch, schema::WEEK_OF_YEAR)?;
            let membership = column::<BooleanArray>(&batch, schema::CLUSTER_MEMBERSHIP)?;

            for i in 0..batch.num_rows() {
                if records.len() >= limit {
                    return Ok(records);
                }

                records.push(EnrichedObservation {
                    latitude: latitudes.value(i),
                    longitude: longitudes.value(i),
                    brightness: optional_f64(brightness, i),
                    scan: optional_f64(scans, i),
                    track: optional_f64(tracks, i),
                    satellite: satellites.value(i).to_string(),
                    instrument: optional_string(instruments, i),
                    confidence: optional_string(confidences, i),
                    version: optional_string(versions, i),
                    bright_t31: optional_f64(bright_t31s, i),
                    frp: optional_f64(frps, i),
                    daynight: optional_string(daynights, i),
                    detection_type: (!types.is_null(i)).then(|| types.value(i)),
                    month: months.value(i),
                    week_of_year: weeks.value(i),
                    cluster_membership: membership.value(i),
                });
            }
        }

        Ok(records)
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let row_groups = metadata.num_row_groups();
        let total_rows = metadata.file_metadata().num_rows();
        let file_size = std::fs::metadata(path)?.len();

        let row_group_sizes = (0..row_groups)
            .map(|i| metadata.row_group(i).num_rows())
            .collect();

        let columns = metadata
            .file_metadata()
            .schema_descr()
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        Ok(ParquetFileInfo {
            total_rows,
            row_groups: row_groups as i32,
            row_group_sizes,
            file_size,
            compression: self.compression,
            columns,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn column<'a, T: Array + 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<T>())
        .ok_or_else(|| ProcessingError::InvalidFormat(format!("Invalid {} column type", name)))
}

fn optional_string(array: &StringArray, i: usize) -> Option<String> {
    (!array.is_null(i)).then(|| array.value(i).to_string())
}

fn optional_f64(array: &Float64Array, i: usize) -> Option<f64> {
    (!array.is_null(i)).then(|| array.value(i))
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
    pub compression: Compression,
    pub columns: Vec<String>,
}

impl ParquetFileInfo {
    /// Which of `expected` are present in the file, and which are not
    pub fn partition_columns<'a>(&self, expected: &[&'a str]) -> (Vec<&'a str>, Vec<&'a str>) {
        expected
            .iter()
            .copied()
            .partition(|name| self.columns.iter().any(|c| c == name))
    }

    pub fn summary(&self) -> String {
        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} MB\n\
            - Compression: {:?}\n\
            - Avg rows per group: {:.0}",
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1_048_576.0, // Convert to MB
            self.compression,
            self.total_rows as f64 / self.row_groups.max(1) as f64
        )
    }
}
