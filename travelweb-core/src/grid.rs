//! Conversion from geographic coordinates to the KMA forecast grid.
//!
//! The short-term forecast service publishes data per grid cell, not per
//! arbitrary coordinate. Cells are indexed on a Lambert Conformal Conic
//! projection with fixed provider-defined parameters; the constant set below
//! must match the provider's own grid math exactly, otherwise a coordinate
//! resolves to a neighboring cell and the wrong forecast is fetched.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Earth radius used by the provider, in km.
const EARTH_RADIUS_KM: f64 = 6371.00877;
/// Grid spacing, in km.
const GRID_SPACING_KM: f64 = 5.0;
/// First standard parallel, in degrees.
const STD_PARALLEL_1_DEG: f64 = 30.0;
/// Second standard parallel, in degrees.
const STD_PARALLEL_2_DEG: f64 = 60.0;
/// Longitude of the projection origin, in degrees.
const ORIGIN_LON_DEG: f64 = 126.0;
/// Latitude of the projection origin, in degrees.
const ORIGIN_LAT_DEG: f64 = 38.0;
/// Grid x offset of the origin (210 km / 5 km).
const ORIGIN_X: f64 = 43.0;
/// Grid y offset of the origin (675 km / 5 km).
const ORIGIN_Y: f64 = 136.0;

const DEG_TO_RAD: f64 = PI / 180.0;

/// A cell on the provider's forecast grid.
///
/// The projection does not bound-check its output; coordinates outside the
/// serviced territory still map to some integer cell, and the forecast
/// endpoint itself rejects cells it has no data for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    pub nx: i32,
    pub ny: i32,
}

impl std::fmt::Display for GridCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.nx, self.ny)
    }
}

/// Project a geographic coordinate (decimal degrees) onto the forecast grid.
///
/// Pure and total over finite inputs except latitude ±90°, where the
/// tangent term is singular; callers must guard the poles themselves.
pub fn project_to_grid(latitude: f64, longitude: f64) -> GridCell {
    let re = EARTH_RADIUS_KM / GRID_SPACING_KM;
    let slat1 = STD_PARALLEL_1_DEG * DEG_TO_RAD;
    let slat2 = STD_PARALLEL_2_DEG * DEG_TO_RAD;
    let olon = ORIGIN_LON_DEG * DEG_TO_RAD;
    let olat = ORIGIN_LAT_DEG * DEG_TO_RAD;

    // Cone constant from the two standard parallels.
    let sn = (PI * 0.25 + slat2 * 0.5).tan() / (PI * 0.25 + slat1 * 0.5).tan();
    let sn = (slat1.cos() / slat2.cos()).ln() / sn.ln();
    // Scale factor at the first standard parallel.
    let sf = (PI * 0.25 + slat1 * 0.5).tan();
    let sf = sf.powf(sn) * slat1.cos() / sn;
    // Projected radius of the origin latitude.
    let ro = (PI * 0.25 + olat * 0.5).tan();
    let ro = re * sf / ro.powf(sn);

    // Projected radius of the target latitude.
    let ra = (PI * 0.25 + latitude * DEG_TO_RAD * 0.5).tan();
    let ra = re * sf / ra.powf(sn);

    // Angle from the central meridian, normalized into (-pi, pi].
    let mut theta = longitude * DEG_TO_RAD - olon;
    if theta > PI {
        theta -= 2.0 * PI;
    }
    if theta < -PI {
        theta += 2.0 * PI;
    }
    theta *= sn;

    // Round half up.
    GridCell {
        nx: (ra * theta.sin() + ORIGIN_X + 0.5).floor() as i32,
        ny: (ro - ra * theta.cos() + ORIGIN_Y + 0.5).floor() as i32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_maps_to_origin_offset() {
        // At the projection origin ra == ro and theta == 0, so the result
        // must be exactly the configured grid offset.
        let cell = project_to_grid(38.0, 126.0);
        assert_eq!(cell, GridCell { nx: 43, ny: 136 });
    }

    #[test]
    fn known_city_cells() {
        assert_eq!(project_to_grid(37.5665, 126.9780), GridCell { nx: 60, ny: 127 }); // Seoul
        assert_eq!(project_to_grid(35.1796, 129.0756), GridCell { nx: 98, ny: 76 }); // Busan
        assert_eq!(project_to_grid(33.4996, 126.5312), GridCell { nx: 53, ny: 38 }); // Jeju
    }

    #[test]
    fn city_cells_are_distinct_and_positive() {
        let cells = [
            project_to_grid(37.5665, 126.9780),
            project_to_grid(35.1796, 129.0756),
            project_to_grid(33.4996, 126.5312),
        ];
        for cell in &cells {
            assert!(cell.nx > 0 && cell.ny > 0, "non-positive cell {cell}");
        }
        assert_ne!(cells[0], cells[1]);
        assert_ne!(cells[0], cells[2]);
        assert_ne!(cells[1], cells[2]);
    }

    #[test]
    fn nx_does_not_decrease_moving_east() {
        for &(lat, lon) in &[(37.5665, 126.9780), (35.1796, 129.0756), (33.4996, 126.5312)] {
            let mut prev = project_to_grid(lat, lon).nx;
            for step in 1..=20 {
                let nx = project_to_grid(lat, lon + f64::from(step) * 0.05).nx;
                assert!(nx >= prev, "nx decreased moving east at lat {lat}");
                prev = nx;
            }
        }
    }

    #[test]
    fn projection_is_deterministic() {
        let a = project_to_grid(36.3504, 127.3845);
        let b = project_to_grid(36.3504, 127.3845);
        assert_eq!(a, b);
    }
}
