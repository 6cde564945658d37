//! Unit tests for the cache crate

#[cfg(test)]
mod service_tests {
    use crate::application::config::CacheConfig;
    use crate::application::service::CacheService;
    use crate::error::CacheError;
    use crate::infra::memory::InMemoryCacheRepository;
    use serde::{Deserialize, Serialize};
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Summary {
        students: u32,
        revenue: f64,
    }

    fn service() -> (CacheService<InMemoryCacheRepository>, InMemoryCacheRepository) {
        let repo = InMemoryCacheRepository::new();
        let service = CacheService::new(Arc::new(repo.clone()), Arc::new(CacheConfig::default()));
        (service, repo)
    }

    #[tokio::test]
    async fn test_set_then_get_within_ttl() {
        let (cache, _) = service();
        let value = Summary {
            students: 12,
            revenue: 4500.5,
        };

        cache
            .set("analytics:system:30d", &value, Duration::from_secs(60))
            .await
            .unwrap();

        let cached: Option<Summary> = cache.get("analytics:system:30d").await.unwrap();
        assert_eq!(cached, Some(value));
    }

    #[tokio::test]
    async fn test_get_returns_none_after_ttl() {
        let (cache, repo) = service();
        cache
            .set("short", &"value", Duration::from_secs(1))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(1100)).await;

        let cached: Option<String> = cache.get("short").await.unwrap();
        assert_eq!(cached, None);
        // Logical expiry only; the row is still there until purged
        assert_eq!(repo.len().await, 1);

        assert_eq!(cache.purge_expired().await.unwrap(), 1);
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let (cache, _) = service();
        let cached: Option<Summary> = cache.get("nothing-here").await.unwrap();
        assert!(cached.is_none());
    }

    #[tokio::test]
    async fn test_set_overwrites_existing_key() {
        let (cache, _) = service();
        let ttl = Duration::from_secs(60);
        cache.set("k", &1, ttl).await.unwrap();
        cache.set("k", &2, ttl).await.unwrap();

        assert_eq!(cache.get::<i32>("k").await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_zero_ttl_rejected() {
        let (cache, _) = service();
        assert!(matches!(
            cache.set("k", &1, Duration::ZERO).await,
            Err(CacheError::InvalidTtl)
        ));
    }

    #[tokio::test]
    async fn test_invalidate_exact_key() {
        let (cache, _) = service();
        cache.set_default("a", &1).await.unwrap();

        assert_eq!(cache.invalidate("a").await.unwrap(), 1);
        assert_eq!(cache.invalidate("a").await.unwrap(), 0);
        assert_eq!(cache.get::<i32>("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalidate_pattern() {
        let (cache, _) = service();
        let ttl = Duration::from_secs(60);
        for key in [
            "analytics:batch:1:7d",
            "analytics:batch:2:30d",
            "analytics:system:30d",
            "http:/api/courses?",
        ] {
            cache.set(key, &key, ttl).await.unwrap();
        }

        assert_eq!(cache.invalidate_pattern("^analytics:batch:").await.unwrap(), 2);
        assert!(cache.get::<String>("analytics:system:30d").await.unwrap().is_some());
        assert!(cache.get::<String>("http:/api/courses?").await.unwrap().is_some());

        assert!(matches!(
            cache.invalidate_pattern("[unclosed").await,
            Err(CacheError::InvalidPattern(_))
        ));
    }

    #[tokio::test]
    async fn test_type_mismatch_is_serialization_error() {
        let (cache, _) = service();
        cache.set_default("n", &"not a summary").await.unwrap();
        assert!(matches!(
            cache.get::<Summary>("n").await,
            Err(CacheError::Serialization(_))
        ));
    }
}

#[cfg(test)]
mod middleware_tests {
    use crate::application::config::CacheConfig;
    use crate::application::service::CacheService;
    use crate::infra::memory::InMemoryCacheRepository;
    use crate::presentation::middleware::{
        CACHE_STATUS_HEADER, ResponseCacheState, response_cache,
    };
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use kernel::id::UserId;
    use kernel::principal::{Principal, Role};
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    fn app(calls: Arc<AtomicUsize>) -> Router {
        let cache = CacheService::new(
            Arc::new(InMemoryCacheRepository::new()),
            Arc::new(CacheConfig::default()),
        );
        let state = ResponseCacheState { cache };

        let handler = move || {
            let calls = calls.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                Json(json!({ "call": n }))
            }
        };

        Router::new()
            .route("/courses", get(handler.clone()).post(handler))
            .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
            .layer(axum::middleware::from_fn(move |req, next| {
                response_cache(state.clone(), req, next)
            }))
    }

    fn request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_second_get_is_served_from_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = app(calls.clone());

        let first = app
            .clone()
            .oneshot(request(Method::GET, "/courses?page=1"))
            .await
            .unwrap();
        assert_eq!(first.headers()[CACHE_STATUS_HEADER], "MISS");
        let first_body = body_string(first).await;

        let second = app
            .clone()
            .oneshot(request(Method::GET, "/courses?page=1"))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::OK);
        assert_eq!(second.headers()[CACHE_STATUS_HEADER], "HIT");
        assert_eq!(second.headers()["content-type"], "application/json");
        assert_eq!(body_string(second).await, first_body);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_query_string_is_part_of_key() {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = app(calls.clone());

        for uri in ["/courses?page=1", "/courses?page=2"] {
            let response = app.clone().oneshot(request(Method::GET, uri)).await.unwrap();
            assert_eq!(response.headers()[CACHE_STATUS_HEADER], "MISS");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_get_and_errors_are_not_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = app(calls.clone());

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(request(Method::POST, "/courses"))
                .await
                .unwrap();
            assert!(response.headers().get(CACHE_STATUS_HEADER).is_none());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(request(Method::GET, "/missing"))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            assert_eq!(response.headers()[CACHE_STATUS_HEADER], "MISS");
        }
    }

    #[tokio::test]
    async fn test_roles_do_not_share_cached_responses() {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = app(calls.clone());

        for role in [Role::Admin, Role::Instructor, Role::Admin] {
            let mut req = request(Method::GET, "/courses");
            req.extensions_mut().insert(Principal {
                user_id: UserId::new(),
                role,
                email: "caller@example.com".to_string(),
            });
            app.clone().oneshot(req).await.unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_nested_routes_are_keyed_by_full_path() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = CacheService::new(
            Arc::new(InMemoryCacheRepository::new()),
            Arc::new(CacheConfig::default()),
        );
        let state = ResponseCacheState {
            cache: cache.clone(),
        };
        let handler = {
            let calls = calls.clone();
            move || {
                let calls = calls.clone();
                async move { Json(json!({ "call": calls.fetch_add(1, Ordering::SeqCst) })) }
            }
        };
        let inner = Router::new()
            .route("/system", get(handler))
            .layer(axum::middleware::from_fn(move |req, next| {
                response_cache(state.clone(), req, next)
            }));
        let app = Router::new().nest("/api/analytics", inner);

        let first = app
            .clone()
            .oneshot(request(Method::GET, "/api/analytics/system?range=7d"))
            .await
            .unwrap();
        assert_eq!(first.headers()[CACHE_STATUS_HEADER], "MISS");

        let removed = cache.invalidate_pattern("^http:/api/analytics/").await.unwrap();
        assert_eq!(removed, 1);

        let after = app
            .oneshot(request(Method::GET, "/api/analytics/system?range=7d"))
            .await
            .unwrap();
        assert_eq!(after.headers()[CACHE_STATUS_HEADER], "MISS");
        assert_eq!(body_string(after).await, r#"{"call":1}"#);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
