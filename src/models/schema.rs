//! Column names shared by the writers and the `info` command.

pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";
pub const BRIGHTNESS: &str = "brightness";
pub const SCAN: &str = "scan";
pub const TRACK: &str = "track";
pub const SATELLITE: &str = "satellite";
pub const INSTRUMENT: &str = "instrument";
pub const CONFIDENCE: &str = "confidence";
pub const VERSION: &str = "version";
pub const BRIGHT_T31: &str = "bright_t31";
pub const FRP: &str = "frp";
pub const DAYNIGHT: &str = "daynight";
pub const DETECTION_TYPE: &str = "type";
pub const MONTH: &str = "month";
pub const WEEK_OF_YEAR: &str = "week_of_year";
pub const CLUSTER_MEMBERSHIP: &str = "cluster_membership";

/// Enriched output columns, in record order
pub const OUTPUT_COLUMNS: [&str; 16] = [
    LATITUDE,
    LONGITUDE,
    BRIGHTNESS,
    SCAN,
    TRACK,
    SATELLITE,
    INSTRUMENT,
    CONFIDENCE,
    VERSION,
    BRIGHT_T31,
    FRP,
    DAYNIGHT,
    DETECTION_TYPE,
    MONTH,
    WEEK_OF_YEAR,
    CLUSTER_MEMBERSHIP,
];

/// Raw timestamp columns that never reach the output
pub const DROPPED_COLUMNS: [&str; 2] = ["acq_date", "acq_time"];

/// Columns the downstream pipeline one-hot encodes
pub const CATEGORICAL_FEATURES: [&str; 5] =
    [SATELLITE, DAYNIGHT, MONTH, WEEK_OF_YEAR, CLUSTER_MEMBERSHIP];

/// Columns the downstream pipeline standard-scales
pub const NUMERIC_FEATURES: [&str; 5] = [BRIGHTNESS, TRACK, SCAN, BRIGHT_T31, FRP];
