pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod processors;
pub mod readers;
pub mod utils;
pub mod writers;

pub use config::{ClusteringConfig, FeatureConfig};
pub use error::{ProcessingError, Result};
pub use models::{EnrichedObservation, RawObservation};
pub use processors::{ClusterFeatureExtractor, DensityClusterer, Hdbscan, HdbscanParams};
