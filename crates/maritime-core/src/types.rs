//! Fundamental geographic types.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::constants::EARTH_RADIUS_M;

/// Geographic position in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

impl Position {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// (lat, lon) as a vector for interpolation arithmetic.
    pub fn as_dvec2(self) -> DVec2 {
        DVec2::new(self.lat, self.lon)
    }

    pub fn from_dvec2(v: DVec2) -> Self {
        Self { lat: v.x, lon: v.y }
    }

    /// Great-circle distance to another position in meters (haversine).
    pub fn distance_to(&self, other: &Position) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let sin_dlat = ((other.lat - self.lat).to_radians() / 2.0).sin();
        let sin_dlon = ((other.lon - self.lon).to_radians() / 2.0).sin();
        let a = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }
}

impl From<(f64, f64)> for Position {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self::new(lat, lon)
    }
}
