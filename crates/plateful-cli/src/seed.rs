//! Bulk loading of scraped restaurant dumps.
//!
//! The dump is a JSON object of scrape pages. Each page either carries a
//! `restaurants` array of `{ "restaurant": {...} }` wrappers or an error
//! `message` (pages that hit the upstream API limit are skipped). Country
//! names are resolved from the numeric country code at ingest so the filter
//! endpoint can match on them. Batches that fail to insert are logged and
//! skipped; the remaining batches continue.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use sqlx::PgPool;

use plateful_core::countries::country_name;
use plateful_core::Restaurant;

const API_LIMIT_MESSAGE: &str = "API limit exceeded";

#[derive(Debug, Deserialize)]
struct DumpEntry {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    restaurants: Option<Vec<DumpRestaurant>>,
}

#[derive(Debug, Deserialize)]
struct DumpRestaurant {
    restaurant: Restaurant,
}

#[derive(Debug, Default)]
pub struct SeedSummary {
    pub inserted: u64,
    pub failed_batches: usize,
    pub skipped_entries: usize,
}

/// Parse a dump file's contents into restaurant records ready to insert.
///
/// Returns the records plus the number of skipped (API-limit) entries.
///
/// # Errors
///
/// Returns [`serde_json::Error`] if the dump is not valid JSON of the
/// expected overall shape.
pub fn extract_restaurants(raw: &str) -> Result<(Vec<Restaurant>, usize), serde_json::Error> {
    let dump: BTreeMap<String, DumpEntry> = serde_json::from_str(raw)?;

    let mut skipped = 0usize;
    let mut records = Vec::new();
    for entry in dump.into_values() {
        if entry.message.as_deref() == Some(API_LIMIT_MESSAGE) {
            skipped += 1;
            continue;
        }
        let Some(restaurants) = entry.restaurants else {
            continue;
        };
        for wrapper in restaurants {
            records.push(resolve_country(wrapper.restaurant));
        }
    }

    Ok((records, skipped))
}

fn resolve_country(mut restaurant: Restaurant) -> Restaurant {
    if let Some(name) = country_name(restaurant.location.country_id) {
        restaurant.location.country = Some(name.to_owned());
    }
    restaurant
}

/// Load a dump file and insert its records in batches.
///
/// A batch that fails rolls back and is logged; the remaining batches are
/// still attempted, so one bad batch never aborts the whole run.
///
/// # Errors
///
/// Returns an error only if the file cannot be read or parsed; insert
/// failures are reported through [`SeedSummary::failed_batches`].
pub async fn run_seed(
    pool: &PgPool,
    file: &Path,
    batch_size: usize,
) -> anyhow::Result<SeedSummary> {
    let raw = std::fs::read_to_string(file)?;
    let (records, skipped_entries) = extract_restaurants(&raw)?;
    let batch_size = batch_size.max(1);

    let mut summary = SeedSummary {
        skipped_entries,
        ..SeedSummary::default()
    };

    for (index, batch) in records.chunks(batch_size).enumerate() {
        match plateful_db::insert_batch(pool, batch).await {
            Ok(count) => {
                summary.inserted += count;
                tracing::info!(batch = index + 1, inserted = count, "batch inserted");
            }
            Err(e) => {
                summary.failed_batches += 1;
                tracing::error!(batch = index + 1, error = %e, "batch insert failed; continuing");
            }
        }
    }

    Ok(summary)
}
