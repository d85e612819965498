//! Page slicing and page-count arithmetic.
//!
//! [`paginate`] serves the in-memory path (proximity results); the
//! SQL-paginated endpoints share [`page_count`] so both paths report the
//! same metadata for the same totals.

/// One page of an ordered result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_results: i64,
    pub total_pages: i64,
    /// The page number as supplied by the caller, echoed without clamping.
    pub current_page: i64,
}

/// `ceil(total / limit)`, with 0 pages for an empty set or a non-positive
/// limit.
#[must_use]
pub fn page_count(total: i64, limit: i64) -> i64 {
    if total <= 0 || limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}

/// Slice `items` into the 1-based page `page` of size `limit`.
///
/// A page past the end yields an empty slice; the supplied page number is
/// echoed back rather than clamped to the last valid page. Pages below 1
/// slice like page 1. A non-positive `limit` yields an empty page with
/// zero total pages while still reporting the total count.
#[must_use]
pub fn paginate<T>(items: Vec<T>, page: i64, limit: i64) -> Page<T> {
    let total_results = i64::try_from(items.len()).unwrap_or(i64::MAX);
    let total_pages = page_count(total_results, limit);

    if limit <= 0 {
        return Page {
            items: Vec::new(),
            total_results,
            total_pages,
            current_page: page,
        };
    }

    let start = (page.max(1) - 1).saturating_mul(limit);
    let items = if start >= total_results {
        Vec::new()
    } else {
        let start = usize::try_from(start).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);
        items.into_iter().skip(start).take(take).collect()
    };

    Page {
        items,
        total_results,
        total_pages,
        current_page: page,
    }
}
