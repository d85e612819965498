//! Image-based cuisine lookup: classify an uploaded photo, then run the
//! label through the cuisine filter.

use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use plateful_core::page::page_count;
use plateful_core::Restaurant;
use plateful_db::FilterParams;

use super::{map_db_error, normalize_limit, ApiError, AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CuisineResponse {
    pub cuisine: String,
    pub restaurants: Vec<Restaurant>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PaginationMeta {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_restaurants: i64,
}

#[derive(Debug, Deserialize)]
pub(super) struct PageParams {
    page: Option<i64>,
    limit: Option<i64>,
}

struct UploadedImage {
    bytes: Vec<u8>,
    mime_type: String,
}

/// Pull the first file part out of the multipart payload.
///
/// The original client posts the file under the `image` field name, but any
/// part carrying a filename is accepted.
async fn read_image_part(mut multipart: Multipart) -> Result<Option<UploadedImage>, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::debug!(error = %e, "malformed multipart payload");
        ApiError::new("validation_error", "malformed multipart payload")
    })? {
        let is_file = field.file_name().is_some() || field.name() == Some("image");
        if !is_file {
            continue;
        }

        let mime_type = field
            .content_type()
            .unwrap_or("image/jpeg")
            .to_owned();
        let bytes = field.bytes().await.map_err(|e| {
            tracing::debug!(error = %e, "failed reading uploaded file");
            ApiError::new("validation_error", "failed reading uploaded file")
        })?;

        if bytes.is_empty() {
            continue;
        }

        return Ok(Some(UploadedImage {
            bytes: bytes.to_vec(),
            mime_type,
        }));
    }

    Ok(None)
}

pub(super) async fn cuisine_from_image(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
    multipart: Multipart,
) -> Result<Json<CuisineResponse>, ApiError> {
    let Some(image) = read_image_part(multipart).await? else {
        return Err(ApiError::new("validation_error", "No file uploaded."));
    };

    let Some(vision) = state.vision.as_ref() else {
        return Err(ApiError::new(
            "service_unavailable",
            "cuisine classification is not configured",
        ));
    };

    let cuisine = vision
        .classify_cuisine(&image.bytes, &image.mime_type)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "cuisine classification failed");
            ApiError::new("upstream_error", "cuisine classification failed")
        })?;

    let page = params.page.unwrap_or(1);
    let limit = normalize_limit(params.limit, 15);
    let offset = (page.max(1) - 1).saturating_mul(limit);

    let filter = FilterParams {
        cuisines: Some(&cuisine),
        ..FilterParams::default()
    };
    let restaurants = plateful_db::list_filtered(&state.pool, filter, limit, offset)
        .await
        .map_err(|e| map_db_error(&e))?;
    let total = plateful_db::count_filtered(&state.pool, filter)
        .await
        .map_err(|e| map_db_error(&e))?;

    Ok(Json(CuisineResponse {
        cuisine,
        restaurants,
        pagination: PaginationMeta {
            current_page: page,
            total_pages: page_count(total, limit),
            total_restaurants: total,
        },
    }))
}
