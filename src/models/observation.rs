use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::utils::constants::{DATE_FORMAT, TIME_FORMAT};

/// One detection row as delivered by the FIRMS MODIS feed.
///
/// Only the coordinates, the acquisition timestamp and the satellite code are
/// needed to build the features; the remaining columns are carried through
/// when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RawObservation {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    #[serde(default)]
    pub brightness: Option<f64>,
    #[serde(default)]
    pub scan: Option<f64>,
    #[serde(default)]
    pub track: Option<f64>,

    /// `YYYY-MM-DD`
    pub acq_date: String,

    /// `HHMM`, leading zeros optional
    pub acq_time: String,

    pub satellite: String,

    #[serde(default)]
    pub instrument: Option<String>,

    #[serde(default)]
    pub confidence: Option<String>,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub bright_t31: Option<f64>,
    #[serde(default)]
    pub frp: Option<f64>,
    #[serde(default)]
    pub daynight: Option<String>,

    #[serde(default, rename = "type")]
    pub detection_type: Option<u8>,
}

impl RawObservation {
    /// Acquisition timestamp assembled from `acq_date` and `acq_time`
    pub fn acquired_at(&self) -> Result<NaiveDateTime> {
        let date = NaiveDate::parse_from_str(self.acq_date.trim(), DATE_FORMAT).map_err(|_| {
            ProcessingError::InvalidFormat(format!("Invalid acquisition date: '{}'", self.acq_date))
        })?;

        let raw_time = self.acq_time.trim();
        if raw_time.is_empty() || raw_time.len() > 4 || !raw_time.chars().all(|c| c.is_ascii_digit())
        {
            return Err(ProcessingError::InvalidFormat(format!(
                "Invalid acquisition time: '{}'",
                self.acq_time
            )));
        }

        let time = NaiveTime::parse_from_str(&format!("{:0>4}", raw_time), TIME_FORMAT).map_err(
            |_| {
                ProcessingError::InvalidFormat(format!(
                    "Invalid acquisition time: '{}'",
                    self.acq_time
                ))
            },
        )?;

        Ok(date.and_time(time))
    }
}
