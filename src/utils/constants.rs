/// Satellite short codes and their normalized names
pub const SATELLITE_TERRA_CODE: &str = "T";
pub const SATELLITE_TERRA: &str = "Terra";
pub const SATELLITE_AQUA_CODE: &str = "A";
pub const SATELLITE_AQUA: &str = "Aqua";

/// Clustering defaults
pub const DEFAULT_MIN_CLUSTER_SIZE: usize = 50;
pub const DEFAULT_MIN_SAMPLES: usize = 20;
pub const DEFAULT_COORDINATE_PRECISION: u32 = 2;
pub const NOISE_LABEL: i32 = -1;

/// Input formats
pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H%M";

/// Processing defaults
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB

/// Environment variable prefix for configuration overrides
pub const CONFIG_ENV_PREFIX: &str = "WILDFIRE";

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
