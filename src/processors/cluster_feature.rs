//! The spatial cluster membership feature.
//!
//! Raw cluster ids depend on the size and density of the batch they were
//! computed on, so they cannot be one-hot encoded consistently between a
//! training table and a small live batch. The extractor keeps only whether a
//! point landed in any cluster, which gives the classifier a feature with the
//! fixed domain `{true, false}`.

use tracing::{debug, info};

use crate::config::FeatureConfig;
use crate::error::{ProcessingError, Result};
use crate::models::{EnrichedObservation, RawObservation};
use crate::processors::hdbscan::{DensityClusterer, Hdbscan, HdbscanParams};
use crate::processors::normalizer::ObservationNormalizer;
use crate::utils::constants::NOISE_LABEL;

pub struct ClusterFeatureExtractor<C = Hdbscan> {
    clusterer: C,
    normalizer: ObservationNormalizer,
}

impl ClusterFeatureExtractor<Hdbscan> {
    pub fn new(config: &FeatureConfig) -> Result<Self> {
        let clusterer = Hdbscan::new(HdbscanParams::from(&config.clustering))?;
        Ok(Self::with_clusterer(clusterer, config.coordinate_precision))
    }
}

impl<C: DensityClusterer> ClusterFeatureExtractor<C> {
    pub fn with_clusterer(clusterer: C, precision: u32) -> Self {
        Self {
            clusterer,
            normalizer: ObservationNormalizer::with_precision(precision),
        }
    }

    /// Enrich one batch. Output rows match input rows one to one, in order.
    pub fn transform(&self, batch: &[RawObservation]) -> Result<Vec<EnrichedObservation>> {
        let builders = batch
            .iter()
            .map(|raw| self.normalizer.normalize(raw))
            .collect::<Result<Vec<_>>>()?;

        let points = builders
            .iter()
            .map(|b| {
                b.current_coordinates()
                    .ok_or_else(|| ProcessingError::MissingData("coordinates".to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            rows = points.len(),
            precision = self.normalizer.precision(),
            "Clustering rounded coordinates"
        );
        let labels = self.clusterer.fit_predict(&points)?;

        if labels.len() != points.len() {
            return Err(ProcessingError::Clustering(format!(
                "Clusterer returned {} labels for {} points",
                labels.len(),
                points.len()
            )));
        }

        let membership = membership_from_labels(&labels);
        let clustered = membership.iter().filter(|&&m| m).count();
        info!(
            rows = batch.len(),
            clustered,
            noise = batch.len() - clustered,
            "Computed cluster membership"
        );

        builders
            .into_iter()
            .zip(membership)
            .map(|(builder, member)| builder.cluster_membership(member).build())
            .collect()
    }
}

/// Collapse batch-relative cluster ids to "belongs to some cluster"
pub fn membership_from_labels(labels: &[i32]) -> Vec<bool> {
    labels.iter().map(|&label| label != NOISE_LABEL).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::observation::fixtures::observation;
    use pretty_assertions::assert_eq;

    /// Labels points by a fixed rule, for checking the extractor plumbing
    struct FixedClusterer(Vec<i32>);

    impl DensityClusterer for FixedClusterer {
        fn fit_predict(&self, _points: &[[f64; 2]]) -> Result<Vec<i32>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_membership_from_labels() {
        assert_eq!(
            membership_from_labels(&[-1, 0, 3, -1, 17]),
            vec![false, true, true, false, true]
        );
        assert!(membership_from_labels(&[]).is_empty());
    }

    #[test]
    fn test_labels_collapse_to_membership() {
        let batch = vec![
            observation(10.0, 10.0, "T"),
            observation(10.0, 10.0, "A"),
            observation(10.0, 10.0, "N"),
        ];
        let extractor = ClusterFeatureExtractor::with_clusterer(FixedClusterer(vec![4, -1, 0]), 2);

        let enriched = extractor.transform(&batch).unwrap();
        let membership: Vec<bool> = enriched.iter().map(|r| r.cluster_membership).collect();
        assert_eq!(membership, vec![true, false, true]);

        let satellites: Vec<&str> = enriched.iter().map(|r| r.satellite.as_str()).collect();
        assert_eq!(satellites, vec!["Terra", "Aqua", "N"]);
    }

    #[test]
    fn test_label_count_mismatch_is_error() {
        let batch = vec![observation(10.0, 10.0, "T"), observation(11.0, 11.0, "T")];
        let extractor = ClusterFeatureExtractor::with_clusterer(FixedClusterer(vec![0]), 2);

        assert!(matches!(
            extractor.transform(&batch),
            Err(ProcessingError::Clustering(_))
        ));
    }

    #[test]
    fn test_schema_example_row() {
        let extractor = ClusterFeatureExtractor::new(&FeatureConfig::default()).unwrap();
        let batch = vec![observation(34.567, -118.123, "T")];

        let enriched = extractor.transform(&batch).unwrap();
        assert_eq!(enriched.len(), 1);

        let row = &enriched[0];
        assert_eq!(row.latitude, 34.57);
        assert_eq!(row.longitude, -118.12);
        assert_eq!(row.satellite, "Terra");
        assert_eq!(row.month, 1);
        assert_eq!(row.week_of_year, 1);
        assert!(!row.cluster_membership);
    }

    #[test]
    fn test_empty_batch() {
        let extractor = ClusterFeatureExtractor::new(&FeatureConfig::default()).unwrap();
        assert!(extractor.transform(&[]).unwrap().is_empty());
    }
}
