use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::constants::{
    SATELLITE_AQUA, SATELLITE_AQUA_CODE, SATELLITE_TERRA, SATELLITE_TERRA_CODE,
};

/// Acquiring satellite, normalized from the FIRMS short code
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Satellite {
    Terra,
    Aqua,
    /// Any code outside the fixed mapping, kept verbatim
    Other(String),
}

impl Satellite {
    pub fn from_code(code: &str) -> Self {
        match code {
            SATELLITE_TERRA_CODE | SATELLITE_TERRA => Satellite::Terra,
            SATELLITE_AQUA_CODE | SATELLITE_AQUA => Satellite::Aqua,
            other => Satellite::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Satellite::Terra => SATELLITE_TERRA,
            Satellite::Aqua => SATELLITE_AQUA,
            Satellite::Other(code) => code,
        }
    }
}

impl fmt::Display for Satellite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
