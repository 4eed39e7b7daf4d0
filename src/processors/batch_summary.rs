use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::Result;
use crate::models::EnrichedObservation;
use crate::utils::coordinates::haversine_distance;

#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub total_records: usize,
    pub clustered_records: usize,
    pub noise_records: usize,
    pub satellite_counts: BTreeMap<String, usize>,
    pub daynight_counts: BTreeMap<String, usize>,
    pub month_counts: BTreeMap<u32, usize>,
    pub geographic_bounds: Option<GeographicBounds>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeographicBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
    /// Great-circle distance between opposite corners
    pub diagonal_km: f64,
}

impl BatchSummary {
    pub fn from_records(records: &[EnrichedObservation]) -> Self {
        let mut summary = BatchSummary {
            total_records: records.len(),
            clustered_records: 0,
            noise_records: 0,
            satellite_counts: BTreeMap::new(),
            daynight_counts: BTreeMap::new(),
            month_counts: BTreeMap::new(),
            geographic_bounds: None,
        };

        for record in records {
            if record.cluster_membership {
                summary.clustered_records += 1;
            } else {
                summary.noise_records += 1;
            }

            *summary
                .satellite_counts
                .entry(record.satellite.clone())
                .or_default() += 1;
            if let Some(flag) = &record.daynight {
                *summary.daynight_counts.entry(flag.clone()).or_default() += 1;
            }
            *summary.month_counts.entry(record.month).or_default() += 1;
        }

        summary.geographic_bounds = geographic_bounds(records);
        summary
    }

    pub fn clustered_percentage(&self) -> f64 {
        if self.total_records == 0 {
            return 0.0;
        }
        100.0 * self.clustered_records as f64 / self.total_records as f64
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn detailed_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Cluster Feature Summary ===\n");
        summary.push_str(&format!("Total Records: {}\n", self.total_records));
        summary.push_str(&format!(
            "In Dense Cluster: {} ({:.1}%)\n",
            self.clustered_records,
            self.clustered_percentage()
        ));
        summary.push_str(&format!("Noise: {}\n", self.noise_records));

        if !self.satellite_counts.is_empty() {
            summary.push_str("\nBy Satellite:\n");
            for (satellite, count) in &self.satellite_counts {
                summary.push_str(&format!("  {}: {}\n", satellite, count));
            }
        }

        if !self.daynight_counts.is_empty() {
            summary.push_str("\nDay/Night:\n");
            for (flag, count) in &self.daynight_counts {
                summary.push_str(&format!("  {}: {}\n", flag, count));
            }
        }

        if !self.month_counts.is_empty() {
            summary.push_str("\nBy Month:\n");
            for (month, count) in &self.month_counts {
                summary.push_str(&format!("  {:02}: {}\n", month, count));
            }
        }

        if let Some(bounds) = &self.geographic_bounds {
            summary.push_str(&format!(
                "\nGeographic Bounds: lat [{:.2}, {:.2}], lon [{:.2}, {:.2}] (~{:.0} km across)\n",
                bounds.min_lat, bounds.max_lat, bounds.min_lon, bounds.max_lon, bounds.diagonal_km
            ));
        }

        summary
    }
}

fn geographic_bounds(records: &[EnrichedObservation]) -> Option<GeographicBounds> {
    let first = records.first()?;

    let mut bounds = GeographicBounds {
        min_lat: first.latitude,
        max_lat: first.latitude,
        min_lon: first.longitude,
        max_lon: first.longitude,
        diagonal_km: 0.0,
    };

    for record in &records[1..] {
        bounds.min_lat = bounds.min_lat.min(record.latitude);
        bounds.max_lat = bounds.max_lat.max(record.latitude);
        bounds.min_lon = bounds.min_lon.min(record.longitude);
        bounds.max_lon = bounds.max_lon.max(record.longitude);
    }

    bounds.diagonal_km =
        haversine_distance(bounds.min_lat, bounds.min_lon, bounds.max_lat, bounds.max_lon);
    Some(bounds)
}
