use axum::http::header::HeaderMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

use crate::config::ApiConfig;
use crate::errors::ApiError;

/// Largest offset or limit the database drivers accept
pub const MAX_SQL_ROWS: u64 = i64::MAX.unsigned_abs();

/// Page metadata returned with every list response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Pageable {
    /// 1-based page number
    pub page: u64,
    pub size: u64,
    /// Rows matching the filters, across all pages
    pub total: u64,
    #[serde(rename = "totalPage")]
    pub total_page: u64,
}

impl Pageable {
    #[must_use]
    pub fn new(page: u64, size: u64, total: u64) -> Self {
        Self {
            page,
            size,
            total,
            total_page: total.div_ceil(size.max(1)),
        }
    }

    /// Rows skipped before this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.size)
    }
}

fn parse_number(params: &HashMap<String, String>, key: &str) -> Result<Option<u64>, ApiError> {
    match params.get(key).map(|raw| raw.trim()) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ApiError::bad_request(format!("{key} must be a positive integer"))),
    }
}

/// Read `page` and `size` from the query.
///
/// `page` defaults to 1 and `size` to the configured default; both are clamped to
/// at least 1 and `size` to the configured maximum.
///
/// # Errors
///
/// Returns a 400 when either value is not a non-negative integer, or when the page
/// starts beyond the largest offset a query can carry.
pub fn parse_pagination(
    params: &HashMap<String, String>,
    config: &ApiConfig,
) -> Result<(u64, u64), ApiError> {
    let page = parse_number(params, "page")?.unwrap_or(1).max(1);
    let size = parse_number(params, "size")?
        .unwrap_or(config.default_page_size)
        .clamp(1, config.max_page_size.clamp(1, MAX_SQL_ROWS));

    let in_range = (page - 1)
        .checked_mul(size)
        .is_some_and(|offset| offset <= MAX_SQL_ROWS);
    if !in_range {
        return Err(ApiError::bad_request("page out of range"));
    }
    Ok((page, size))
}

/// Keep only characters that are valid in a header value
fn sanitize_resource_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control())
        .collect()
}

/// Build the `Content-Range` header for a list page, e.g. `posts 0-9/42`.
///
/// A page holding no rows is reported as `posts */42`.
#[must_use]
pub fn calculate_content_range(pageable: &Pageable, resource_name: &str) -> HeaderMap {
    let name = sanitize_resource_name(resource_name);
    let offset = pageable.offset();
    let content_range = if offset >= pageable.total {
        format!("{name} */{}", pageable.total)
    } else {
        let last = offset
            .saturating_add(pageable.size)
            .saturating_sub(1)
            .min(pageable.total - 1);
        format!("{name} {offset}-{last}/{}", pageable.total)
    };

    let mut headers = HeaderMap::new();
    if let Ok(value) = content_range.parse() {
        headers.insert("Content-Range", value);
    }
    headers
}
