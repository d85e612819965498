//! Query functions for the `restaurants` table.
//!
//! All persistence lives here; handlers never write SQL. Functions return
//! domain [`Restaurant`] values, keeping the internal `record_id` out of
//! the API surface — callers only ever see the external id.

use plateful_core::{Location, Restaurant, UserRating};
use sqlx::{PgPool, Postgres, QueryBuilder};

const RESTAURANT_COLUMNS: &str = "external_id, name, cuisines, average_cost_for_two, price_range, \
     currency, has_online_delivery, has_table_booking, is_delivering_now, \
     aggregate_rating, votes, rating_text, rating_color, \
     address, city, country_id, country, locality, locality_verbose, zipcode, \
     latitude, longitude, featured_image, thumb, url, menu_url";

// Non-numeric ratings (e.g. "NEW") sort as 0 instead of erroring the cast.
const RATING_ORDER: &str = "(CASE WHEN aggregate_rating ~ '^[0-9]+(\\.[0-9]+)?$' \
     THEN aggregate_rating::float8 ELSE 0 END) DESC";

/// Conjunctive filter criteria; `None` means the criterion is not applied.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterParams<'a> {
    pub name: Option<&'a str>,
    pub country: Option<&'a str>,
    pub cuisines: Option<&'a str>,
    pub min_avg_cost: Option<i32>,
    pub max_avg_cost: Option<i32>,
}

#[derive(sqlx::FromRow)]
struct RestaurantRow {
    external_id: String,
    name: String,
    cuisines: String,
    average_cost_for_two: i32,
    price_range: i16,
    currency: String,
    has_online_delivery: i32,
    has_table_booking: i32,
    is_delivering_now: i32,
    aggregate_rating: String,
    votes: String,
    rating_text: String,
    rating_color: String,
    address: String,
    city: String,
    country_id: i32,
    country: Option<String>,
    locality: String,
    locality_verbose: String,
    zipcode: String,
    latitude: Option<String>,
    longitude: Option<String>,
    featured_image: Option<String>,
    thumb: Option<String>,
    url: Option<String>,
    menu_url: Option<String>,
}

impl From<RestaurantRow> for Restaurant {
    fn from(row: RestaurantRow) -> Self {
        Restaurant {
            id: row.external_id,
            name: row.name,
            cuisines: row.cuisines,
            average_cost_for_two: row.average_cost_for_two,
            price_range: row.price_range,
            currency: row.currency,
            has_online_delivery: row.has_online_delivery,
            has_table_booking: row.has_table_booking,
            is_delivering_now: row.is_delivering_now,
            user_rating: UserRating {
                aggregate_rating: row.aggregate_rating,
                votes: row.votes,
                rating_text: row.rating_text,
                rating_color: row.rating_color,
            },
            location: Location {
                address: row.address,
                city: row.city,
                country_id: row.country_id,
                country: row.country,
                locality: row.locality,
                locality_verbose: row.locality_verbose,
                zipcode: row.zipcode,
                latitude: row.latitude,
                longitude: row.longitude,
            },
            featured_image: row.featured_image,
            thumb: row.thumb,
            url: row.url,
            menu_url: row.menu_url,
        }
    }
}

/// Escape LIKE metacharacters and wrap in `%...%` for substring matching.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// List restaurants, optionally narrowed by a case-insensitive substring
/// match on the name, ordered by internal record id.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn search_by_name(
    pool: &PgPool,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Restaurant>, sqlx::Error> {
    let rows: Vec<RestaurantRow> = if let Some(search) = search {
        sqlx::query_as(&format!(
            "SELECT {RESTAURANT_COLUMNS} FROM restaurants \
             WHERE name ILIKE $1 \
             ORDER BY record_id ASC LIMIT $2 OFFSET $3"
        ))
        .bind(like_pattern(search))
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?
    } else {
        sqlx::query_as(&format!(
            "SELECT {RESTAURANT_COLUMNS} FROM restaurants \
             ORDER BY record_id ASC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?
    };
    Ok(rows.into_iter().map(Restaurant::from).collect())
}

/// Count the restaurants a [`search_by_name`] call would match.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn count_by_name(pool: &PgPool, search: Option<&str>) -> Result<i64, sqlx::Error> {
    if let Some(search) = search {
        sqlx::query_scalar("SELECT COUNT(*) FROM restaurants WHERE name ILIKE $1")
            .bind(like_pattern(search))
            .fetch_one(pool)
            .await
    } else {
        sqlx::query_scalar("SELECT COUNT(*) FROM restaurants")
            .fetch_one(pool)
            .await
    }
}

fn push_filter_conditions<'a>(qb: &mut QueryBuilder<'a, Postgres>, params: FilterParams<'a>) {
    if let Some(name) = params.name {
        qb.push(" AND name ILIKE ").push_bind(like_pattern(name));
    }
    if let Some(country) = params.country {
        qb.push(" AND country ILIKE ").push_bind(like_pattern(country));
    }
    if let Some(cuisines) = params.cuisines {
        qb.push(" AND cuisines ILIKE ")
            .push_bind(like_pattern(cuisines));
    }
    if let Some(min) = params.min_avg_cost {
        qb.push(" AND average_cost_for_two >= ").push_bind(min);
    }
    if let Some(max) = params.max_avg_cost {
        qb.push(" AND average_cost_for_two <= ").push_bind(max);
    }
}

/// List restaurants matching every provided filter criterion, ordered by
/// internal record id. Omitted criteria are wildcards; the cost range is
/// inclusive on both ends.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_filtered(
    pool: &PgPool,
    params: FilterParams<'_>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Restaurant>, sqlx::Error> {
    let mut qb = QueryBuilder::<Postgres>::new(format!(
        "SELECT {RESTAURANT_COLUMNS} FROM restaurants WHERE TRUE"
    ));
    push_filter_conditions(&mut qb, params);
    qb.push(" ORDER BY record_id ASC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

    let rows: Vec<RestaurantRow> = qb.build_query_as().fetch_all(pool).await?;
    Ok(rows.into_iter().map(Restaurant::from).collect())
}

/// Count the restaurants a [`list_filtered`] call would match.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn count_filtered(pool: &PgPool, params: FilterParams<'_>) -> Result<i64, sqlx::Error> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM restaurants WHERE TRUE");
    push_filter_conditions(&mut qb, params);
    let count: i64 = qb.build_query_scalar().fetch_one(pool).await?;
    Ok(count)
}

/// List restaurants in a city (exact match), ordered by internal record id.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_by_city(
    pool: &PgPool,
    city: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<Restaurant>, sqlx::Error> {
    let rows: Vec<RestaurantRow> = sqlx::query_as(&format!(
        "SELECT {RESTAURANT_COLUMNS} FROM restaurants \
         WHERE city = $1 \
         ORDER BY record_id ASC LIMIT $2 OFFSET $3"
    ))
    .bind(city)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Restaurant::from).collect())
}

/// Count the restaurants in a city (exact match).
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn count_by_city(pool: &PgPool, city: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM restaurants WHERE city = $1")
        .bind(city)
        .fetch_one(pool)
        .await
}

/// Look up a single restaurant by its external id.
///
/// The external id is not unique-constrained; if duplicates exist, the
/// earliest-inserted record wins.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn get_by_external_id(
    pool: &PgPool,
    external_id: &str,
) -> Result<Option<Restaurant>, sqlx::Error> {
    let row: Option<RestaurantRow> = sqlx::query_as(&format!(
        "SELECT {RESTAURANT_COLUMNS} FROM restaurants \
         WHERE external_id = $1 \
         ORDER BY record_id ASC LIMIT 1"
    ))
    .bind(external_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Restaurant::from))
}

/// The top `count` restaurants by aggregate rating, descending, optionally
/// scoped to a city (exact match).
///
/// Ratings are stored as text; values that do not parse as numbers sort
/// as 0. Ties fall back to store order, which is not guaranteed stable.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn top_rated(
    pool: &PgPool,
    city: Option<&str>,
    count: i64,
) -> Result<Vec<Restaurant>, sqlx::Error> {
    let rows: Vec<RestaurantRow> = if let Some(city) = city {
        sqlx::query_as(&format!(
            "SELECT {RESTAURANT_COLUMNS} FROM restaurants \
             WHERE city = $1 \
             ORDER BY {RATING_ORDER} LIMIT $2"
        ))
        .bind(city)
        .bind(count)
        .fetch_all(pool)
        .await?
    } else {
        sqlx::query_as(&format!(
            "SELECT {RESTAURANT_COLUMNS} FROM restaurants \
             ORDER BY {RATING_ORDER} LIMIT $1"
        ))
        .bind(count)
        .fetch_all(pool)
        .await?
    };
    Ok(rows.into_iter().map(Restaurant::from).collect())
}

/// Fetch the entire collection in store iteration order.
///
/// The proximity path filters this candidate set in memory; there is no
/// store-side geospatial predicate at this scale.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn fetch_all(pool: &PgPool) -> Result<Vec<Restaurant>, sqlx::Error> {
    let rows: Vec<RestaurantRow> = sqlx::query_as(&format!(
        "SELECT {RESTAURANT_COLUMNS} FROM restaurants ORDER BY record_id ASC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Restaurant::from).collect())
}

/// Delete all but the first-encountered record of every group of
/// restaurants sharing a `name`. Returns the number of deleted rows.
///
/// Grouping is by name, not external id: two genuinely different
/// restaurants with the same name in different cities WILL be merged.
///
/// Runs as a single statement, so the grouping and the deletion cannot
/// race a concurrent insert.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the statement fails.
pub async fn delete_duplicates_by_name(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM restaurants \
         WHERE record_id NOT IN (\
             SELECT MIN(record_id) FROM restaurants GROUP BY name\
         )",
    )
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// Count the rows [`delete_duplicates_by_name`] would remove, without
/// removing them.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn count_duplicates_by_name(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM restaurants \
         WHERE record_id NOT IN (\
             SELECT MIN(record_id) FROM restaurants GROUP BY name\
         )",
    )
    .fetch_one(pool)
    .await
}

/// Insert a batch of restaurants inside a single transaction.
///
/// Returns the number of rows inserted. If any insert fails the whole
/// batch rolls back; callers that load multiple batches isolate failures
/// per batch.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if any insert fails.
pub async fn insert_batch(pool: &PgPool, restaurants: &[Restaurant]) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut count = 0u64;

    for r in restaurants {
        sqlx::query(
            "INSERT INTO restaurants (\
                 external_id, name, cuisines, average_cost_for_two, price_range, \
                 currency, has_online_delivery, has_table_booking, is_delivering_now, \
                 aggregate_rating, votes, rating_text, rating_color, \
                 address, city, country_id, country, locality, locality_verbose, zipcode, \
                 latitude, longitude, featured_image, thumb, url, menu_url\
             ) VALUES (\
                 $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, \
                 $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26\
             )",
        )
        .bind(&r.id)
        .bind(&r.name)
        .bind(&r.cuisines)
        .bind(r.average_cost_for_two)
        .bind(r.price_range)
        .bind(&r.currency)
        .bind(r.has_online_delivery)
        .bind(r.has_table_booking)
        .bind(r.is_delivering_now)
        .bind(&r.user_rating.aggregate_rating)
        .bind(&r.user_rating.votes)
        .bind(&r.user_rating.rating_text)
        .bind(&r.user_rating.rating_color)
        .bind(&r.location.address)
        .bind(&r.location.city)
        .bind(r.location.country_id)
        .bind(&r.location.country)
        .bind(&r.location.locality)
        .bind(&r.location.locality_verbose)
        .bind(&r.location.zipcode)
        .bind(&r.location.latitude)
        .bind(&r.location.longitude)
        .bind(&r.featured_image)
        .bind(&r.thumb)
        .bind(&r.url)
        .bind(&r.menu_url)
        .execute(&mut *tx)
        .await?;
        count += 1;
    }

    tx.commit().await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("cafe"), "%cafe%");
        assert_eq!(like_pattern("50%"), "%50\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("back\\slash"), "%back\\\\slash%");
    }
}
