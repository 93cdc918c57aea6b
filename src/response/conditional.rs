//! Conditional GET short-circuiting.

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Response, StatusCode};
use chrono::{DateTime, SubsecRound, Utc};

use crate::http_date::{format_http_date, parse_http_date};

/// Answers a conditional GET with `304 Not Modified` when the client's copy
/// is still current, otherwise returns `None` so the caller builds the full
/// response.
///
/// The client's copy is current when `If-Modified-Since` is at or after
/// `last_modified` (compared at whole seconds), or when `If-None-Match` is
/// `*` or lists `etag`.
pub fn handle_conditional_get(
    request_headers: &HeaderMap,
    last_modified: DateTime<Utc>,
    etag: Option<&str>,
) -> Option<Response<Body>> {
    let last_modified = last_modified.trunc_subsecs(0);

    let modified_since_hit = request_headers
        .get(header::IF_MODIFIED_SINCE)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_http_date)
        .is_some_and(|since| since >= last_modified);

    let none_match_hit = request_headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|value| etag_matches(value, etag));

    if !(modified_since_hit || none_match_hit) {
        return None;
    }

    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::NOT_MODIFIED;

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&format_http_date(last_modified)) {
        headers.insert(header::LAST_MODIFIED, value);
    }
    if let Some(value) = etag.and_then(|e| HeaderValue::from_str(e).ok()) {
        headers.insert(header::ETAG, value);
    }

    Some(response)
}

/// Weak comparison of an `If-None-Match` list against `etag`.
fn etag_matches(if_none_match: &str, etag: Option<&str>) -> bool {
    let etag = etag.map(opaque_tag);
    if_none_match.split(',').map(str::trim).any(|candidate| {
        candidate == "*" || etag.is_some_and(|current| opaque_tag(candidate) == current)
    })
}

fn opaque_tag(tag: &str) -> &str {
    tag.trim().trim_start_matches("W/")
}
