//! Caching response headers.

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};
use tracing::warn;

use crate::cache::current_timestamp_ms;
use crate::response::CacheOptions;

/// Cache outcome header: `HIT` or `MISS`.
pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Builds the `Cache-Control` value for `options`.
pub fn cache_control_value(options: &CacheOptions) -> String {
    match options.stale_while_revalidate {
        Some(swr) => format!(
            "public, max-age={}, stale-while-revalidate={}",
            options.revalidate, swr
        ),
        None => format!("public, max-age={}", options.revalidate),
    }
}

/// Generates a fresh strong validator.
pub fn generate_etag() -> String {
    format!("\"{:x}-{:08x}\"", current_timestamp_ms(), rand::random::<u32>())
}

/// Produces `Cache-Control`, `Vary` (when configured) and a fresh `ETag`.
pub fn create_cache_headers(options: &CacheOptions) -> HeaderMap {
    let mut headers = HeaderMap::new();

    if let Ok(value) = HeaderValue::from_str(&cache_control_value(options)) {
        headers.insert(header::CACHE_CONTROL, value);
    }

    if !options.vary.is_empty() {
        match HeaderValue::from_str(&options.vary.join(", ")) {
            Ok(value) => {
                headers.insert(header::VARY, value);
            }
            Err(_) => warn!(vary = ?options.vary, "skipping invalid Vary header"),
        }
    }

    if let Ok(value) = HeaderValue::from_str(&generate_etag()) {
        headers.insert(header::ETAG, value);
    }

    headers
}

/// Overwrites `target`'s caching headers with freshly computed ones.
pub fn apply_cache_headers(target: &mut HeaderMap, options: &CacheOptions) {
    for (name, value) in create_cache_headers(options) {
        if let Some(name) = name {
            target.insert(name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::CachePreset;

    #[test]
    fn test_cache_control_without_swr() {
        let options = CacheOptions::new(120);
        assert_eq!(cache_control_value(&options), "public, max-age=120");
    }

    #[test]
    fn test_cache_control_with_swr() {
        let options = CacheOptions::new(60).with_stale_while_revalidate(300);
        assert_eq!(
            cache_control_value(&options),
            "public, max-age=60, stale-while-revalidate=300"
        );
    }

    #[test]
    fn test_create_cache_headers_static() {
        let headers = create_cache_headers(&CachePreset::Static.options());

        assert_eq!(
            headers[header::CACHE_CONTROL],
            "public, max-age=3600, stale-while-revalidate=86400"
        );
        assert!(headers.get(header::VARY).is_none());
        assert!(headers.contains_key(header::ETAG));
    }

    #[test]
    fn test_create_cache_headers_vary() {
        let headers = create_cache_headers(&CachePreset::User.options());
        assert_eq!(headers[header::VARY], "authorization, cookie");
    }

    #[test]
    fn test_etags_are_fresh_and_quoted() {
        let first = generate_etag();
        let second = generate_etag();

        assert_ne!(first, second);
        assert!(first.starts_with('"') && first.ends_with('"'));
    }

    #[test]
    fn test_apply_cache_headers_overwrites() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        apply_cache_headers(&mut headers, &CacheOptions::new(5));

        assert_eq!(headers[header::CACHE_CONTROL], "public, max-age=5");
        assert_eq!(headers[header::CONTENT_TYPE], "text/plain");
        assert!(headers.contains_key(header::ETAG));
    }
}
