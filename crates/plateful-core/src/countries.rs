//! Country-code resolution for the source dataset.
//!
//! The dump stores a numeric `country_id`; the dataset covers this fixed
//! set of countries. Names are resolved at ingest time and stored, so the
//! filter operation substring-matches on the stored name. Spellings are
//! kept exactly as the dataset publishes them.

const COUNTRIES: &[(i32, &str)] = &[
    (1, "India"),
    (14, "Australia"),
    (30, "Brazil"),
    (37, "Canada"),
    (94, "Indonesia"),
    (148, "New Zealand"),
    (162, "Phillipines"),
    (166, "Qatar"),
    (184, "Singapore"),
    (189, "South Africa"),
    (191, "Sri Lanka"),
    (208, "Turkey"),
    (214, "UAE"),
    (215, "United Kingdom"),
    (216, "United States"),
];

/// Resolve a dataset country code to its display name.
#[must_use]
pub fn country_name(country_id: i32) -> Option<&'static str> {
    COUNTRIES
        .iter()
        .find(|(id, _)| *id == country_id)
        .map(|(_, name)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_codes() {
        assert_eq!(country_name(1), Some("India"));
        assert_eq!(country_name(216), Some("United States"));
    }

    #[test]
    fn unknown_code_is_none() {
        assert_eq!(country_name(999), None);
        assert_eq!(country_name(0), None);
    }
}
