//! Pairwise station distances
//!
//! Distances are great-circle (WGS-84 geodesic by default) in kilometers and are
//! computed once per region, then only read.

use geo::{Distance, Geodesic, Point};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Coordinates, Station};
use crate::{PlannerError, Result};

/// Earth model used for station-to-station distances
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceModel {
    /// Ellipsoidal WGS-84 geodesic (Karney)
    #[default]
    Geodesic,
    /// Spherical great circle with mean Earth radius
    Haversine,
}

impl DistanceModel {
    /// Distance between two coordinates in kilometers
    #[must_use]
    pub fn distance_km(self, from: &Coordinates, to: &Coordinates) -> f64 {
        match self {
            DistanceModel::Geodesic => {
                let a = Point::new(from.longitude, from.latitude);
                let b = Point::new(to.longitude, to.latitude);
                Geodesic.distance(a, b) / 1000.0
            }
            DistanceModel::Haversine => haversine::distance(
                haversine::Location {
                    latitude: from.latitude,
                    longitude: from.longitude,
                },
                haversine::Location {
                    latitude: to.latitude,
                    longitude: to.longitude,
                },
                haversine::Units::Kilometers,
            ),
        }
    }
}

/// Square matrix of distances in station-list order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceMatrix {
    size: usize,
    cells: Vec<f64>,
}

impl DistanceMatrix {
    /// Compute all pairwise distances for `stations`.
    ///
    /// Every coordinate is checked first; one malformed coordinate fails the
    /// whole matrix with [`PlannerError::InvalidCoordinate`].
    pub fn build(stations: &[Station], model: DistanceModel) -> Result<Self> {
        for station in stations {
            station.ensure_valid_coordinates()?;
        }

        let size = stations.len();
        let mut cells = vec![0.0; size * size];
        for i in 0..size {
            for j in (i + 1)..size {
                let d = model.distance_km(&stations[i].coordinates, &stations[j].coordinates);
                cells[i * size + j] = d;
                cells[j * size + i] = d;
            }
        }

        debug!("Computed {}x{} distance matrix ({:?})", size, size, model);
        Ok(Self { size, cells })
    }

    /// Build a matrix from explicit rows; rows must form a square
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let size = rows.len();
        let mut cells = Vec::with_capacity(size * size);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(PlannerError::dimension_mismatch(format!(
                    "row {i} has {} entries, expected {size}",
                    row.len()
                )));
            }
            cells.extend(row);
        }
        Ok(Self { size, cells })
    }

    /// Distance in km between station `i` and station `j`
    ///
    /// # Panics
    /// Panics if either index is out of bounds.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.size && j < self.size, "distance index out of bounds");
        self.cells[i * self.size + j]
    }

    /// Number of stations (rows)
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Rows as nested vectors
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.cells.chunks(self.size.max(1)).map(<[f64]>::to_vec).collect()
    }
}

/// Geodesic distance matrix for an ordered station list
pub fn distance_matrix(stations: &[Station]) -> Result<DistanceMatrix> {
    DistanceMatrix::build(stations, DistanceModel::Geodesic)
}
