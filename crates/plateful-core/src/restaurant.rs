//! The restaurant record and its parsing boundary.
//!
//! Field representations mirror the source dataset: coordinates, ratings,
//! and vote counts arrive as strings, and delivery/booking flags are 0/1
//! integers. The accessor methods convert to typed values and treat
//! missing or malformed input as absent rather than failing.

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Restaurant {
    /// Externally-assigned identifier from the source dataset. Expected
    /// unique but not enforced; the duplicate purge exists because the
    /// data carries repeats.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Free-text comma-concatenated cuisine list, e.g. `"Cafe, Italian"`.
    /// Cuisine filtering is substring matching, not set membership.
    #[serde(default)]
    pub cuisines: String,
    #[serde(default)]
    pub average_cost_for_two: i32,
    #[serde(default)]
    pub price_range: i16,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub has_online_delivery: i32,
    #[serde(default)]
    pub has_table_booking: i32,
    #[serde(default)]
    pub is_delivering_now: i32,
    #[serde(default)]
    pub user_rating: UserRating,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub thumb: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub menu_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserRating {
    #[serde(default)]
    pub aggregate_rating: String,
    #[serde(default)]
    pub votes: String,
    #[serde(default)]
    pub rating_text: String,
    #[serde(default)]
    pub rating_color: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country_id: i32,
    /// Country name resolved from `country_id` at ingest time.
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub locality: String,
    #[serde(default)]
    pub locality_verbose: String,
    #[serde(default)]
    pub zipcode: String,
    /// Stored verbatim as text; parse via [`Restaurant::coordinates`].
    #[serde(default)]
    pub latitude: Option<String>,
    #[serde(default)]
    pub longitude: Option<String>,
}

impl Restaurant {
    /// Parse the stored coordinate strings into a [`GeoPoint`].
    ///
    /// Returns `None` when either coordinate is missing, empty, or not a
    /// number. Proximity queries treat such records as non-matching.
    #[must_use]
    pub fn coordinates(&self) -> Option<GeoPoint> {
        let lat = parse_coordinate(self.location.latitude.as_deref())?;
        let lng = parse_coordinate(self.location.longitude.as_deref())?;
        Some(GeoPoint { lat, lng })
    }

    /// Numeric aggregate rating, with `0.0` for malformed or empty values.
    #[must_use]
    pub fn rating_value(&self) -> f64 {
        self.user_rating
            .aggregate_rating
            .trim()
            .parse::<f64>()
            .unwrap_or(0.0)
    }
}

fn parse_coordinate(raw: Option<&str>) -> Option<f64> {
    raw?.trim().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_coords(lat: Option<&str>, lng: Option<&str>) -> Restaurant {
        Restaurant {
            location: Location {
                latitude: lat.map(str::to_owned),
                longitude: lng.map(str::to_owned),
                ..Location::default()
            },
            ..Restaurant::default()
        }
    }

    #[test]
    fn coordinates_parses_valid_strings() {
        let r = with_coords(Some("28.5525"), Some("77.1947"));
        let p = r.coordinates().expect("should parse");
        assert!((p.lat - 28.5525).abs() < 1e-9);
        assert!((p.lng - 77.1947).abs() < 1e-9);
    }

    #[test]
    fn coordinates_tolerates_surrounding_whitespace() {
        let r = with_coords(Some(" 28.5 "), Some("\t77.2"));
        assert!(r.coordinates().is_some());
    }

    #[test]
    fn coordinates_none_when_missing() {
        assert!(with_coords(None, Some("77.1947")).coordinates().is_none());
        assert!(with_coords(Some("28.5"), None).coordinates().is_none());
    }

    #[test]
    fn coordinates_none_when_not_numeric() {
        assert!(with_coords(Some("not-a-lat"), Some("77.1"))
            .coordinates()
            .is_none());
        assert!(with_coords(Some(""), Some("")).coordinates().is_none());
    }

    #[test]
    fn rating_value_falls_back_to_zero() {
        let mut r = Restaurant::default();
        r.user_rating.aggregate_rating = "4.6".to_owned();
        assert!((r.rating_value() - 4.6).abs() < f64::EPSILON);
        r.user_rating.aggregate_rating = "NEW".to_owned();
        assert!((r.rating_value() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn deserializes_partial_dump_record() {
        // Dump records routinely omit fields; defaults must absorb that.
        let r: Restaurant = serde_json::from_str(
            r#"{"id":"18429148","name":"Pirates of Grill","cuisines":"North Indian, Chinese"}"#,
        )
        .expect("partial record should deserialize");
        assert_eq!(r.name, "Pirates of Grill");
        assert!(r.coordinates().is_none());
    }
}
