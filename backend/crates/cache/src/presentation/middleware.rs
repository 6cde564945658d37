//! HTTP Response Cache Middleware
//!
//! Caches successful `GET` responses under `http:<path>?<query>`, suffixed
//! with `|role=<role>` for authenticated callers so a response rendered for
//! one role is never replayed to another. Responses carry `x-cache: HIT` or
//! `x-cache: MISS`. A cache failure never fails the
//! request; it is logged and the handler runs as if the cache were empty.
//!
//! The path is the one the client sent. Behind `Router::nest` it still
//! carries the mount prefix, so `^http:/api/...` patterns match.

use axum::body::{Body, HttpBody};
use axum::extract::OriginalUri;
use axum::http::{HeaderValue, Method, Request, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use kernel::principal::{Principal, Role};
use serde::{Deserialize, Serialize};

use crate::application::service::CacheService;
use crate::domain::repository::CacheRepository;

pub const CACHE_STATUS_HEADER: &str = "x-cache";
pub const RESPONSE_KEY_PREFIX: &str = "http:";

/// Middleware state
#[derive(Clone)]
pub struct ResponseCacheState<R>
where
    R: CacheRepository + Send + Sync + 'static,
{
    pub cache: CacheService<R>,
}

/// Stored form of a response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl CachedResponse {
    fn into_response_with(self, cache_status: &'static str) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        let mut response = (status, self.body).into_response();

        if let Some(content_type) = self
            .content_type
            .as_deref()
            .and_then(|ct| HeaderValue::from_str(ct).ok())
        {
            response.headers_mut().insert(header::CONTENT_TYPE, content_type);
        }
        response
            .headers_mut()
            .insert(CACHE_STATUS_HEADER, HeaderValue::from_static(cache_status));
        response
    }
}

/// Cache key for a request URI as seen by `role`
pub fn response_cache_key(path: &str, query: Option<&str>, role: Option<Role>) -> String {
    let key = format!("{}{}?{}", RESPONSE_KEY_PREFIX, path, query.unwrap_or_default());
    match role {
        Some(role) => format!("{key}|role={}", role.code()),
        None => key,
    }
}

pub async fn response_cache<R>(
    state: ResponseCacheState<R>,
    req: Request<Body>,
    next: Next,
) -> Response
where
    R: CacheRepository + Send + Sync + 'static,
{
    if req.method() != Method::GET {
        return next.run(req).await;
    }

    let role = req.extensions().get::<Principal>().map(|p| p.role);
    let uri = req
        .extensions()
        .get::<OriginalUri>()
        .map_or_else(|| req.uri().clone(), |original| original.0.clone());
    let key = response_cache_key(uri.path(), uri.query(), role);

    match state.cache.get::<CachedResponse>(&key).await {
        Ok(Some(cached)) => {
            tracing::debug!(key = %key, "Response cache hit");
            return cached.into_response_with("HIT");
        }
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, key = %key, "Response cache read failed"),
    }

    let response = next.run(req).await;
    if response.status() != StatusCode::OK {
        return mark_miss(response);
    }

    let max_bytes = state.cache.config().max_response_bytes;
    let fits = response
        .body()
        .size_hint()
        .upper()
        .is_some_and(|upper| upper <= max_bytes as u64);
    if !fits {
        return mark_miss(response);
    }

    let (parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, max_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, key = %key, "Failed to buffer response body");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if let Ok(text) = std::str::from_utf8(&bytes) {
        let cached = CachedResponse {
            status: parts.status.as_u16(),
            content_type: parts
                .headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body: text.to_string(),
        };
        let ttl = state.cache.config().response_ttl;
        if let Err(e) = state.cache.set(&key, &cached, ttl).await {
            tracing::warn!(error = %e, key = %key, "Response cache write failed");
        }
    }

    mark_miss(Response::from_parts(parts, Body::from(bytes)))
}

fn mark_miss(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(CACHE_STATUS_HEADER, HeaderValue::from_static("MISS"));
    response
}
