use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::models::{RawObservation, Satellite};

/// A detection row ready for the classifier pipeline.
///
/// The acquisition timestamp is replaced by `month` and `week_of_year`, and
/// `cluster_membership` records only whether the point sat in a dense
/// cluster of its own batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct EnrichedObservation {
    pub latitude: f64,
    pub longitude: f64,
    pub brightness: Option<f64>,
    pub scan: Option<f64>,
    pub track: Option<f64>,
    pub satellite: String,
    pub instrument: Option<String>,
    pub confidence: Option<String>,
    pub version: Option<String>,
    pub bright_t31: Option<f64>,
    pub frp: Option<f64>,
    pub daynight: Option<String>,

    #[serde(rename = "type")]
    pub detection_type: Option<u8>,

    #[validate(range(min = 1, max = 12))]
    pub month: u32,

    #[validate(range(min = 1, max = 53))]
    pub week_of_year: u32,

    pub cluster_membership: bool,
}

impl EnrichedObservation {
    pub fn builder() -> EnrichedObservationBuilder {
        EnrichedObservationBuilder::new()
    }

    pub fn coordinates(&self) -> [f64; 2] {
        [self.latitude, self.longitude]
    }
}

/// Pass-through columns copied untouched from the raw row
#[derive(Debug, Clone)]
struct PassThrough {
    brightness: Option<f64>,
    scan: Option<f64>,
    track: Option<f64>,
    instrument: Option<String>,
    confidence: Option<String>,
    version: Option<String>,
    bright_t31: Option<f64>,
    frp: Option<f64>,
    daynight: Option<String>,
    detection_type: Option<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct EnrichedObservationBuilder {
    latitude: Option<f64>,
    longitude: Option<f64>,
    satellite: Option<Satellite>,
    month: Option<u32>,
    week_of_year: Option<u32>,
    cluster_membership: Option<bool>,
    pass_through: Option<PassThrough>,
}

impl EnrichedObservationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the model features that are not transformed
    pub fn pass_through(mut self, raw: &RawObservation) -> Self {
        self.pass_through = Some(PassThrough {
            brightness: raw.brightness,
            scan: raw.scan,
            track: raw.track,
            instrument: raw.instrument.clone(),
            confidence: raw.confidence.clone(),
            version: raw.version.clone(),
            bright_t31: raw.bright_t31,
            frp: raw.frp,
            daynight: raw.daynight.clone(),
            detection_type: raw.detection_type,
        });
        self
    }

    pub fn coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    pub fn satellite(mut self, satellite: Satellite) -> Self {
        self.satellite = Some(satellite);
        self
    }

    pub fn calendar(mut self, month: u32, week_of_year: u32) -> Self {
        self.month = Some(month);
        self.week_of_year = Some(week_of_year);
        self
    }

    pub fn cluster_membership(mut self, member: bool) -> Self {
        self.cluster_membership = Some(member);
        self
    }

    /// Coordinates set so far, used to feed the clusterer before membership is known
    pub fn current_coordinates(&self) -> Option<[f64; 2]> {
        Some([self.latitude?, self.longitude?])
    }

    pub fn build(self) -> Result<EnrichedObservation> {
        let pass = self
            .pass_through
            .ok_or_else(|| ProcessingError::MissingData("pass-through features".to_string()))?;

        let record = EnrichedObservation {
            latitude: self
                .latitude
                .ok_or_else(|| ProcessingError::MissingData("latitude".to_string()))?,
            longitude: self
                .longitude
                .ok_or_else(|| ProcessingError::MissingData("longitude".to_string()))?,
            brightness: pass.brightness,
            scan: pass.scan,
            track: pass.track,
            satellite: self
                .satellite
                .ok_or_else(|| ProcessingError::MissingData("satellite".to_string()))?
                .to_string(),
            instrument: pass.instrument,
            confidence: pass.confidence,
            version: pass.version,
            bright_t31: pass.bright_t31,
            frp: pass.frp,
            daynight: pass.daynight,
            detection_type: pass.detection_type,
            month: self
                .month
                .ok_or_else(|| ProcessingError::MissingData("month".to_string()))?,
            week_of_year: self
                .week_of_year
                .ok_or_else(|| ProcessingError::MissingData("week_of_year".to_string()))?,
            cluster_membership: self
                .cluster_membership
                .ok_or_else(|| ProcessingError::MissingData("cluster_membership".to_string()))?,
        };

        record.validate()?;
        Ok(record)
    }
}
