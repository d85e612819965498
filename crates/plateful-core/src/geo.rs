//! Great-circle distance and radius filtering over restaurant coordinates.
//!
//! The proximity path loads the full candidate set and filters in memory;
//! there is no store-side geospatial predicate.

use crate::restaurant::Restaurant;

const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Great-circle distance between two points in kilometers (haversine).
///
/// Inputs are degrees. Coordinate ranges are not validated; out-of-range
/// input produces a mathematically defined but meaningless result.
#[must_use]
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Keep the restaurants within `radius_km` of `center`, preserving the
/// input order (stable filter).
///
/// The radius comparison is inclusive, so `radius_km = 0.0` matches only
/// coincident coordinates. Records whose stored coordinates are missing or
/// unparseable are excluded, never an error.
#[must_use]
pub fn filter_within_radius(
    restaurants: Vec<Restaurant>,
    center: GeoPoint,
    radius_km: f64,
) -> Vec<Restaurant> {
    restaurants
        .into_iter()
        .filter(|r| {
            r.coordinates()
                .is_some_and(|p| haversine_km(center, p) <= radius_km)
        })
        .collect()
}
