//! Latitude/longitude pair

use crate::{Error, Result};
use std::fmt;

/// A WGS84 coordinate pair. Construction validates the ranges; the wire
/// shape (GeoJSON) is owned by the codec, not this type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Create a point, validating latitude in [-90, 90] and longitude in
    /// [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) || latitude.is_nan() {
            return Err(Error::assertion(
                "geo_point",
                format!("latitude {latitude} is outside [-90, 90]"),
            ));
        }
        if !(-180.0..=180.0).contains(&longitude) || longitude.is_nan() {
            return Err(Error::assertion(
                "geo_point",
                format!("longitude {longitude} is outside [-180, 180]"),
            ));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}
