//! Cache-aware handler wrapper
//!
//! Serves whole GET request/response cycles from the process cache and
//! stamps every cacheable response with fresh caching headers.

use std::future::Future;
use std::sync::Arc;

use axum::body::{Body, Bytes, HttpBody};
use axum::extract::Request;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri, Version};
use axum::response::Response;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use futures::StreamExt;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::cache::ProcessCache;
use crate::response::{apply_cache_headers, handle_conditional_get, CacheOptions, X_CACHE};

/// Largest body the wrapper will buffer for storage (8 MiB).
pub const MAX_CACHEABLE_BODY: usize = 8 * 1024 * 1024;

/// Headers recomputed on every replay, never stored.
const UNSTORED_HEADERS: [HeaderName; 6] = [
    header::CACHE_CONTROL,
    header::ETAG,
    header::VARY,
    header::CONTENT_LENGTH,
    header::TRANSFER_ENCODING,
    header::CONNECTION,
];

// == Cached Response ==
/// The stored shape of a handler response.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// When the response was produced
    pub timestamp: DateTime<Utc>,
}

impl CachedResponse {
    fn capture(status: StatusCode, headers: &HeaderMap, body: Bytes) -> Self {
        let mut stored = headers.clone();
        for name in &UNSTORED_HEADERS {
            stored.remove(name);
        }
        Self {
            status,
            headers: stored,
            body,
            timestamp: Utc::now(),
        }
    }

    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

// == Response Cache ==
/// Applies a [`ProcessCache`] to HTTP handlers with one set of options.
#[derive(Clone)]
pub struct ResponseCache {
    cache: ProcessCache<CachedResponse>,
    options: CacheOptions,
}

impl ResponseCache {
    pub fn new(cache: ProcessCache<CachedResponse>, options: impl Into<CacheOptions>) -> Self {
        Self {
            cache,
            options: options.into(),
        }
    }

    pub fn options(&self) -> &CacheOptions {
        &self.options
    }

    pub fn cache(&self) -> &ProcessCache<CachedResponse> {
        &self.cache
    }

    /// Runs `request` through the cache, invoking `handler` on a miss.
    ///
    /// Non-GET requests go straight to `handler` and never touch the cache.
    pub async fn handle<H, Fut>(&self, request: Request, handler: &H) -> Response
    where
        H: Fn(Request) -> Fut,
        Fut: Future<Output = Response>,
    {
        if request.method() != Method::GET {
            return handler(request).await;
        }

        let key = cache_key(request.uri(), request.headers());

        if let Some(stored) = self.cache.get(&key).await {
            debug!(key = %key, "response cache hit");
            let mut response = handle_conditional_get(request.headers(), stored.timestamp, None)
                .unwrap_or_else(|| stored.into_response());
            self.stamp(&mut response, "HIT");
            return response;
        }

        let head = RequestHead::capture(&request);
        let response = handler(request).await;
        if !response.status().is_success() {
            return response;
        }

        let (mut parts, body) = response.into_parts();
        let bytes = match buffer_body(body, &parts.headers, MAX_CACHEABLE_BODY).await {
            Ok(Buffered::Complete(bytes)) => bytes,
            Ok(Buffered::Oversized(body)) => {
                debug!(key = %key, "response too large to cache");
                return Response::from_parts(parts, body);
            }
            Err(err) => {
                warn!(key = %key, error = %err, "could not buffer response, bypassing cache");
                return handler(head.into_request()).await;
            }
        };

        let stored = CachedResponse::capture(parts.status, &parts.headers, bytes.clone());
        if let Err(err) = self
            .cache
            .set(key.clone(), stored, Some(self.options.effective_ttl()))
            .await
        {
            warn!(key = %key, error = %err, "could not store response");
        }

        parts.headers.remove(header::CONTENT_LENGTH);
        let mut response = Response::from_parts(parts, Body::from(bytes));
        self.stamp(&mut response, "MISS");
        response
    }

    fn stamp(&self, response: &mut Response, outcome: &'static str) {
        let headers = response.headers_mut();
        apply_cache_headers(headers, &self.options);
        headers.insert(X_CACHE, HeaderValue::from_static(outcome));
    }
}

/// Wraps `handler` so GET responses are served through `cache`.
///
/// The result is itself an axum handler:
/// ```ignore
/// Router::new().route("/api/articles", get(wrap_handler(list_articles, CachePreset::Dynamic, cache)))
/// ```
pub fn wrap_handler<H, Fut>(
    handler: H,
    options: impl Into<CacheOptions>,
    cache: ProcessCache<CachedResponse>,
) -> impl Fn(Request) -> BoxFuture<'static, Response> + Clone + Send + Sync + 'static
where
    H: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    let wrapper = ResponseCache::new(cache, options);
    let handler = Arc::new(handler);

    move |request: Request| {
        let wrapper = wrapper.clone();
        let handler = Arc::clone(&handler);
        let fut: BoxFuture<'static, Response> =
            Box::pin(async move { wrapper.handle(request, handler.as_ref()).await });
        fut
    }
}

// == Body Buffering ==
enum Buffered {
    Complete(Bytes),
    /// Over the limit; already-read chunks are replayed ahead of the rest
    Oversized(Body),
}

/// Collects `body` up to `limit` bytes without losing it when it is larger.
///
/// Declared sizes (`Content-Length` or an exact size hint) over the limit
/// skip buffering entirely. Only a failing body stream is an error.
async fn buffer_body(body: Body, headers: &HeaderMap, limit: usize) -> Result<Buffered, axum::Error> {
    let limit_u64 = u64::try_from(limit).unwrap_or(u64::MAX);
    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    if body.size_hint().lower() > limit_u64 || declared.is_some_and(|len| len > limit_u64) {
        return Ok(Buffered::Oversized(body));
    }

    let mut stream = body.into_data_stream();
    let mut chunks: Vec<Bytes> = Vec::new();
    let mut len = 0usize;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        len += chunk.len();
        chunks.push(chunk);

        if len > limit {
            let read = futures::stream::iter(chunks.into_iter().map(Ok::<_, axum::Error>));
            return Ok(Buffered::Oversized(Body::from_stream(read.chain(stream))));
        }
    }

    Ok(Buffered::Complete(match chunks.len() {
        0 => Bytes::new(),
        1 => chunks.swap_remove(0),
        _ => Bytes::from(chunks.concat()),
    }))
}

// == Cache Key ==
/// Derives the cache key from path, query and the Authorization header.
///
/// Credentials are hashed so raw tokens never appear in keys; the path stays
/// readable so [`ProcessCache::invalidate_by_pattern`] can target routes.
pub fn cache_key(uri: &Uri, headers: &HeaderMap) -> String {
    let auth = headers
        .get(header::AUTHORIZATION)
        .map(|value| {
            let digest = Sha256::digest(value.as_bytes());
            hex::encode(&digest[..8])
        })
        .unwrap_or_else(|| "anon".to_string());

    format!(
        "response:{}?{}#{}",
        uri.path(),
        uri.query().unwrap_or(""),
        auth
    )
}

/// Request line and headers, kept to re-issue a GET after a failed miss.
struct RequestHead {
    method: Method,
    uri: Uri,
    version: Version,
    headers: HeaderMap,
}

impl RequestHead {
    fn capture(request: &Request) -> Self {
        Self {
            method: request.method().clone(),
            uri: request.uri().clone(),
            version: request.version(),
            headers: request.headers().clone(),
        }
    }

    fn into_request(self) -> Request {
        let mut request = Request::new(Body::empty());
        *request.method_mut() = self.method;
        *request.uri_mut() = self.uri;
        *request.version_mut() = self.version;
        *request.headers_mut() = self.headers;
        request
    }
}
