use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// A point on the earth's surface in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    longitude: f64,
    latitude: f64,
}

impl Coordinate {
    pub fn new(longitude: f64, latitude: f64) -> Result<Self> {
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::BadRequest(format!(
                "longitude {} is outside [-180, 180]",
                longitude
            )));
        }
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::BadRequest(format!(
                "latitude {} is outside [-90, 90]",
                latitude
            )));
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }
}

impl<'de> Deserialize<'de> for Coordinate {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            longitude: f64,
            latitude: f64,
        }

        let raw = Raw::deserialize(deserializer)?;
        Coordinate::new(raw.longitude, raw.latitude).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_values() {
        assert!(Coordinate::new(180.5, 0.0).is_err());
        assert!(Coordinate::new(0.0, -90.1).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(-180.0, 90.0).is_ok());
    }

    #[test]
    fn deserialization_goes_through_validation() {
        let ok: Coordinate = serde_json::from_str(r#"{"longitude":106.8,"latitude":-6.2}"#).unwrap();
        assert_eq!(ok.longitude(), 106.8);
        assert!(serde_json::from_str::<Coordinate>(r#"{"longitude":200,"latitude":0}"#).is_err());
    }
}
