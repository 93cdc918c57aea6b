//! Intercepted requests, stored responses and request classification.

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri};
use chrono::{DateTime, Utc};

use crate::error::{CacheError, Result};
use crate::http_date::{format_http_date, parse_http_date};

const STATIC_EXTENSIONS: &[&str] = &["js", "css", "woff", "woff2", "ttf", "eot", "otf", "map"];
const STATIC_PREFIXES: &[&str] = &["/_next/static/", "/static/"];
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "svg", "ico", "avif"];
const API_PREFIX: &str = "/api/";

// == Edge Request ==
/// An outgoing request seen by the interception layer.
#[derive(Debug, Clone)]
pub struct EdgeRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
}

impl EdgeRequest {
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
        }
    }

    /// A GET for an absolute URL.
    pub fn get(url: &str) -> Result<Self> {
        let uri = url
            .parse::<Uri>()
            .map_err(|e| CacheError::InvalidRequest(format!("invalid URL {url}: {e}")))?;
        Ok(Self::new(Method::GET, uri))
    }

    /// A GET for `url`, resolving paths against `origin`.
    pub fn resolve(origin: &str, url: &str) -> Result<Self> {
        if url.starts_with('/') {
            Self::get(&format!("{}{}", origin.trim_end_matches('/'), url))
        } else {
            Self::get(url)
        }
    }

    /// Only GETs over http(s) are intercepted; everything else passes through.
    pub fn is_interceptable(&self) -> bool {
        self.method == Method::GET && matches!(self.uri.scheme_str(), Some("http" | "https"))
    }

    /// Key within a named store: method plus full URL.
    pub fn cache_key(&self) -> String {
        format!("{} {}", self.method, self.uri)
    }

    pub fn class(&self) -> RequestClass {
        RequestClass::classify(&self.uri)
    }
}

// == Edge Response ==
/// A network or stored response. Cloning shares the body buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl EdgeResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// Only 2xx responses are worth storing.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The `date` header, if present and parseable.
    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.headers
            .get(header::DATE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_http_date)
    }

    pub fn with_date(mut self, at: DateTime<Utc>) -> Self {
        if let Ok(value) = HeaderValue::from_str(&format_http_date(at)) {
            self.headers.insert(header::DATE, value);
        }
        self
    }

    /// Copy to store: stamped with `now` when the origin sent no `date`.
    pub fn for_storage(&self, now: DateTime<Utc>) -> Self {
        if self.headers.contains_key(header::DATE) {
            self.clone()
        } else {
            self.clone().with_date(now)
        }
    }
}

// == Classification ==
/// Content class of an intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    /// Scripts, styles, fonts, build output
    StaticAsset,
    Image,
    Api,
    /// Everything else
    Page,
}

impl RequestClass {
    pub fn classify(uri: &Uri) -> Self {
        let path = uri.path();
        let extension = path
            .rsplit('/')
            .next()
            .and_then(|segment| segment.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());
        let has_extension = |set: &[&str]| {
            extension
                .as_deref()
                .is_some_and(|ext| set.contains(&ext))
        };

        if has_extension(STATIC_EXTENSIONS) || STATIC_PREFIXES.iter().any(|p| path.starts_with(p)) {
            RequestClass::StaticAsset
        } else if has_extension(IMAGE_EXTENSIONS) {
            RequestClass::Image
        } else if path.starts_with(API_PREFIX) {
            RequestClass::Api
        } else {
            RequestClass::Page
        }
    }

    pub fn strategy(self) -> Strategy {
        match self {
            RequestClass::StaticAsset | RequestClass::Image => Strategy::CacheFirst,
            RequestClass::Api => Strategy::NetworkFirst,
            RequestClass::Page => Strategy::StaleWhileRevalidate,
        }
    }

    pub fn role(self) -> StoreRole {
        match self {
            RequestClass::StaticAsset | RequestClass::Image => StoreRole::Static,
            RequestClass::Api => StoreRole::Api,
            RequestClass::Page => StoreRole::Dynamic,
        }
    }
}

/// How a request class is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    CacheFirst,
    NetworkFirst,
    StaleWhileRevalidate,
}

/// Which named store a request class lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreRole {
    Static,
    Dynamic,
    Api,
}
