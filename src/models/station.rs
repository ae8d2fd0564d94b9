//! Station model: identity, display name and geographic position

use serde::{Deserialize, Serialize};

use crate::{PlannerError, Result};

/// Geographic coordinate in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinates {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are finite and within their valid ranges
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// An air-quality monitoring station
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Station {
    /// Identifier, unique within a region (e.g. "DL001")
    pub id: String,
    /// Display name (place)
    pub name: String,
    /// Position of the station
    pub coordinates: Coordinates,
}

impl Station {
    /// Create a new station
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            coordinates: Coordinates::new(latitude, longitude),
        }
    }

    /// Region code a station belongs to: the first two characters of its id
    #[must_use]
    pub fn region_code(&self) -> String {
        region_code_of(&self.id)
    }

    /// Fail with a data-quality error when the coordinate cannot be used
    pub fn ensure_valid_coordinates(&self) -> Result<()> {
        if self.coordinates.is_valid() {
            Ok(())
        } else {
            Err(PlannerError::InvalidCoordinate {
                station: self.id.clone(),
                latitude: self.coordinates.latitude,
                longitude: self.coordinates.longitude,
            })
        }
    }
}

/// Region code for a station id
pub(crate) fn region_code_of(station_id: &str) -> String {
    station_id.chars().take(2).collect()
}
