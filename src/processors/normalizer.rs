use chrono::{Datelike, NaiveDateTime};

use crate::error::Result;
use crate::models::{EnrichedObservationBuilder, RawObservation, Satellite};
use crate::utils::coordinates::round_coordinate;
use crate::utils::constants::DEFAULT_COORDINATE_PRECISION;

/// Per-row preparation ahead of clustering: satellite names, rounded
/// coordinates and calendar fields.
pub struct ObservationNormalizer {
    precision: u32,
}

impl ObservationNormalizer {
    pub fn new() -> Self {
        Self {
            precision: DEFAULT_COORDINATE_PRECISION,
        }
    }

    pub fn with_precision(precision: u32) -> Self {
        Self { precision }
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Everything except cluster membership, which needs the whole batch
    pub fn normalize(&self, raw: &RawObservation) -> Result<EnrichedObservationBuilder> {
        let (month, week_of_year) = calendar_fields(&raw.acquired_at()?);

        Ok(EnrichedObservationBuilder::new()
            .pass_through(raw)
            .coordinates(
                round_coordinate(raw.latitude, self.precision),
                round_coordinate(raw.longitude, self.precision),
            )
            .satellite(Satellite::from_code(&raw.satellite))
            .calendar(month, week_of_year))
    }
}

impl Default for ObservationNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Month (1-12) and ISO week of year (1-53)
pub fn calendar_fields(timestamp: &NaiveDateTime) -> (u32, u32) {
    (timestamp.month(), timestamp.iso_week().week())
}
