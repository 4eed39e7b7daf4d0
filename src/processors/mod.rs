pub mod batch_summary;
pub mod cluster_feature;
pub mod hdbscan;
pub mod integrity_checker;
pub mod normalizer;

pub use batch_summary::{BatchSummary, GeographicBounds};
pub use cluster_feature::{membership_from_labels, ClusterFeatureExtractor};
pub use hdbscan::{DensityClusterer, Hdbscan, HdbscanParams};
pub use integrity_checker::{CoordinateReport, CoordinateViolation, IntegrityChecker};
pub use normalizer::{calendar_fields, ObservationNormalizer};
