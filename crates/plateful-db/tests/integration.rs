//! Integration tests for the restaurant query layer.
//!
//! Each test gets its own migrated database via `#[sqlx::test]`.

use plateful_core::{Location, Restaurant, UserRating};
use plateful_db::FilterParams;
use sqlx::PgPool;

fn restaurant(external_id: &str, name: &str) -> Restaurant {
    Restaurant {
        id: external_id.to_owned(),
        name: name.to_owned(),
        ..Restaurant::default()
    }
}

fn rated(external_id: &str, name: &str, rating: &str) -> Restaurant {
    Restaurant {
        user_rating: UserRating {
            aggregate_rating: rating.to_owned(),
            ..UserRating::default()
        },
        ..restaurant(external_id, name)
    }
}

fn in_city(external_id: &str, name: &str, city: &str) -> Restaurant {
    Restaurant {
        location: Location {
            city: city.to_owned(),
            ..Location::default()
        },
        ..restaurant(external_id, name)
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn search_by_name_is_case_insensitive_substring(pool: PgPool) {
    plateful_db::insert_batch(
        &pool,
        &[
            restaurant("1", "Pirates of Grill"),
            restaurant("2", "The Grill House"),
            restaurant("3", "Sushi Corner"),
        ],
    )
    .await
    .expect("insert");

    let hits = plateful_db::search_by_name(&pool, Some("grill"), 10, 0)
        .await
        .expect("search");
    assert_eq!(hits.len(), 2);

    let total = plateful_db::count_by_name(&pool, Some("grill"))
        .await
        .expect("count");
    assert_eq!(total, 2);

    let all = plateful_db::count_by_name(&pool, None).await.expect("count");
    assert_eq!(all, 3);
}

#[sqlx::test(migrations = "../../migrations")]
async fn search_pagination_offsets_in_store_order(pool: PgPool) {
    let batch: Vec<Restaurant> = (1..=5)
        .map(|i| restaurant(&i.to_string(), &format!("Place {i}")))
        .collect();
    plateful_db::insert_batch(&pool, &batch).await.expect("insert");

    let page2 = plateful_db::search_by_name(&pool, None, 2, 2)
        .await
        .expect("page");
    let names: Vec<&str> = page2.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Place 3", "Place 4"]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn filter_cost_range_is_inclusive(pool: PgPool) {
    let mut cheap = restaurant("1", "Cheap Eats");
    cheap.average_cost_for_two = 99;
    let mut low = restaurant("2", "At The Floor");
    low.average_cost_for_two = 100;
    let mut high = restaurant("3", "At The Ceiling");
    high.average_cost_for_two = 500;
    let mut pricey = restaurant("4", "Pricey");
    pricey.average_cost_for_two = 501;
    plateful_db::insert_batch(&pool, &[cheap, low, high, pricey])
        .await
        .expect("insert");

    let params = FilterParams {
        min_avg_cost: Some(100),
        max_avg_cost: Some(500),
        ..FilterParams::default()
    };
    let hits = plateful_db::list_filtered(&pool, params, 10, 0)
        .await
        .expect("filter");
    let names: Vec<&str> = hits.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["At The Floor", "At The Ceiling"]);
    assert_eq!(
        plateful_db::count_filtered(&pool, params).await.expect("count"),
        2
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn filter_is_conjunctive_over_name_country_cuisines(pool: PgPool) {
    let mut a = restaurant("1", "Spice Route");
    a.cuisines = "North Indian, Mughlai".to_owned();
    a.location.country = Some("India".to_owned());
    let mut b = restaurant("2", "Spice Garden");
    b.cuisines = "Thai".to_owned();
    b.location.country = Some("India".to_owned());
    let mut c = restaurant("3", "Roma");
    c.cuisines = "North Indian".to_owned();
    c.location.country = Some("United Kingdom".to_owned());
    plateful_db::insert_batch(&pool, &[a, b, c]).await.expect("insert");

    let params = FilterParams {
        name: Some("spice"),
        country: Some("ind"),
        cuisines: Some("indian"),
        ..FilterParams::default()
    };
    let hits = plateful_db::list_filtered(&pool, params, 10, 0)
        .await
        .expect("filter");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Spice Route");
}

#[sqlx::test(migrations = "../../migrations")]
async fn city_listing_is_exact_match(pool: PgPool) {
    plateful_db::insert_batch(
        &pool,
        &[
            in_city("1", "A", "Delhi"),
            in_city("2", "B", "New Delhi"),
            in_city("3", "C", "Delhi"),
        ],
    )
    .await
    .expect("insert");

    let hits = plateful_db::list_by_city(&pool, "Delhi", 10, 0)
        .await
        .expect("city");
    assert_eq!(hits.len(), 2);
    assert_eq!(
        plateful_db::count_by_city(&pool, "Delhi").await.expect("count"),
        2
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn external_id_lookup_returns_zero_or_one(pool: PgPool) {
    plateful_db::insert_batch(&pool, &[restaurant("18429148", "Pirates of Grill")])
        .await
        .expect("insert");

    let found = plateful_db::get_by_external_id(&pool, "18429148")
        .await
        .expect("lookup");
    assert_eq!(found.expect("present").name, "Pirates of Grill");

    let missing = plateful_db::get_by_external_id(&pool, "no-such-id")
        .await
        .expect("lookup");
    assert!(missing.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn top_rated_sorts_descending_and_tolerates_garbage_ratings(pool: PgPool) {
    plateful_db::insert_batch(
        &pool,
        &[
            rated("1", "Mid", "3.9"),
            rated("2", "Best", "4.9"),
            rated("3", "Unrated", "NEW"),
            rated("4", "Good", "4.2"),
        ],
    )
    .await
    .expect("insert");

    let top = plateful_db::top_rated(&pool, None, 100).await.expect("top");
    let names: Vec<&str> = top.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Best", "Good", "Mid", "Unrated"]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn top_rated_scopes_to_city(pool: PgPool) {
    let mut a = rated("1", "Delhi Best", "4.8");
    a.location.city = "Delhi".to_owned();
    let mut b = rated("2", "Mumbai Best", "4.9");
    b.location.city = "Mumbai".to_owned();
    plateful_db::insert_batch(&pool, &[a, b]).await.expect("insert");

    let top = plateful_db::top_rated(&pool, Some("Delhi"), 30)
        .await
        .expect("top");
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].name, "Delhi Best");
}

#[sqlx::test(migrations = "../../migrations")]
async fn delete_duplicates_keeps_first_encountered_per_name(pool: PgPool) {
    plateful_db::insert_batch(
        &pool,
        &[
            restaurant("1", "A"),
            restaurant("2", "A"),
            restaurant("3", "B"),
        ],
    )
    .await
    .expect("insert");

    let deleted = plateful_db::delete_duplicates_by_name(&pool)
        .await
        .expect("dedupe");
    assert_eq!(deleted, 1);

    let survivors = plateful_db::fetch_all(&pool).await.expect("fetch");
    assert_eq!(survivors.len(), 2);
    let kept_a = survivors.iter().find(|r| r.name == "A").expect("A kept");
    assert_eq!(kept_a.id, "1", "first-encountered record must survive");
    assert!(survivors.iter().any(|r| r.name == "B"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn count_duplicates_is_a_dry_run(pool: PgPool) {
    plateful_db::insert_batch(
        &pool,
        &[
            restaurant("1", "A"),
            restaurant("2", "A"),
            restaurant("3", "B"),
        ],
    )
    .await
    .expect("insert");

    let would_delete = plateful_db::count_duplicates_by_name(&pool)
        .await
        .expect("count");
    assert_eq!(would_delete, 1);
    assert_eq!(plateful_db::count_by_name(&pool, None).await.expect("count"), 3);
}

#[sqlx::test(migrations = "../../migrations")]
async fn fetch_all_preserves_coordinate_text_verbatim(pool: PgPool) {
    let mut r = restaurant("1", "Broken Coords");
    r.location.latitude = Some("not-a-number".to_owned());
    r.location.longitude = Some("77.21".to_owned());
    plateful_db::insert_batch(&pool, &[r]).await.expect("insert");

    let all = plateful_db::fetch_all(&pool).await.expect("fetch");
    assert_eq!(all[0].location.latitude.as_deref(), Some("not-a-number"));
    assert!(all[0].coordinates().is_none());
}
