//! Layered configuration for the cluster feature.
//!
//! Sources are applied in order: built-in defaults, an optional TOML file,
//! then environment variables such as `WILDFIRE__CLUSTERING__MIN_SAMPLES=10`.
//! CLI flags are applied on top by the command layer.

use crate::error::Result;
use crate::utils::constants::{
    CONFIG_ENV_PREFIX, DEFAULT_COORDINATE_PRECISION, DEFAULT_MIN_CLUSTER_SIZE,
    DEFAULT_MIN_SAMPLES,
};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct FeatureConfig {
    #[validate(nested)]
    pub clustering: ClusteringConfig,

    /// Decimal places kept on latitude/longitude before clustering
    #[validate(range(max = 10))]
    pub coordinate_precision: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ClusteringConfig {
    #[validate(range(min = 2))]
    pub min_cluster_size: usize,

    #[validate(range(min = 1))]
    pub min_samples: usize,

    /// Let the whole batch form one cluster instead of labelling it noise
    pub allow_single_cluster: bool,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            min_cluster_size: DEFAULT_MIN_CLUSTER_SIZE,
            min_samples: DEFAULT_MIN_SAMPLES,
            allow_single_cluster: false,
        }
    }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            clustering: ClusteringConfig::default(),
            coordinate_precision: DEFAULT_COORDINATE_PRECISION,
        }
    }
}

impl FeatureConfig {
    /// Load configuration from defaults, an optional file and `WILDFIRE__*` variables
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        Self::load_with_prefix(config_file, CONFIG_ENV_PREFIX)
    }

    pub fn load_with_prefix(config_file: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let defaults = Self::default();

        let mut builder = Config::builder()
            .set_default(
                "clustering.min_cluster_size",
                defaults.clustering.min_cluster_size as i64,
            )?
            .set_default(
                "clustering.min_samples",
                defaults.clustering.min_samples as i64,
            )?
            .set_default(
                "clustering.allow_single_cluster",
                defaults.clustering.allow_single_cluster,
            )?
            .set_default(
                "coordinate_precision",
                defaults.coordinate_precision as i64,
            )?;

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix(env_prefix)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: FeatureConfig = settings.try_deserialize()?;
        config.validate()?;

        tracing::debug!(?config, "Loaded feature configuration");
        Ok(config)
    }

    pub fn with_min_cluster_size(mut self, min_cluster_size: usize) -> Self {
        self.clustering.min_cluster_size = min_cluster_size;
        self
    }

    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.clustering.min_samples = min_samples;
        self
    }

    pub fn with_coordinate_precision(mut self, precision: u32) -> Self {
        self.coordinate_precision = precision;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = FeatureConfig::load_with_prefix(None, "WILDFIRE_TEST_DEFAULTS").unwrap();
        assert_eq!(config, FeatureConfig::default());
        assert_eq!(config.clustering.min_cluster_size, 50);
        assert_eq!(config.clustering.min_samples, 20);
        assert_eq!(config.coordinate_precision, 2);
    }

    #[test]
    fn test_file_overrides() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "coordinate_precision = 3")?;
        writeln!(file, "[clustering]")?;
        writeln!(file, "min_cluster_size = 25")?;

        let config = FeatureConfig::load_with_prefix(Some(file.path()), "WILDFIRE_TEST_FILE")?;

        assert_eq!(config.coordinate_precision, 3);
        assert_eq!(config.clustering.min_cluster_size, 25);
        assert_eq!(config.clustering.min_samples, 20);
        Ok(())
    }

    #[test]
    fn test_env_overrides() -> Result<()> {
        std::env::set_var("WILDFIRE_TEST_ENV__CLUSTERING__MIN_SAMPLES", "7");

        let config = FeatureConfig::load_with_prefix(None, "WILDFIRE_TEST_ENV")?;
        std::env::remove_var("WILDFIRE_TEST_ENV__CLUSTERING__MIN_SAMPLES");

        assert_eq!(config.clustering.min_samples, 7);
        assert_eq!(config.clustering.min_cluster_size, 50);
        Ok(())
    }

    #[test]
    fn test_invalid_values_rejected() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "[clustering]")?;
        writeln!(file, "min_cluster_size = 1")?;

        let result = FeatureConfig::load_with_prefix(Some(file.path()), "WILDFIRE_TEST_INVALID");
        assert!(result.is_err());
        Ok(())
    }
}
