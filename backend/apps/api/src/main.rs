//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use analytics::{AnalyticsConfig, PgAnalyticsSource, analytics_router};
use auth::{
    AuthConfig, AuthMiddlewareState, CleanupExpiredUseCase, PgAuthRepository, TokenCodec,
    auth_router, require_access_token, spawn_cleanup_job,
};
use axum::body::Body;
use axum::http::Request;
use axum::middleware::{self, Next};
use axum::{
    Router, http,
    http::{Method, header},
};
use base64::Engine;
use base64::engine::general_purpose;
use cache::{CacheConfig, CacheService, PgCacheRepository};
use progress::{PgProgressRepository, ProgressConfig, progress_router};
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,auth=info,progress=info,analytics=info,cache=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set in environment"))?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let auth_config = load_auth_config()?;
    let auth_repo = PgAuthRepository::new(pool.clone());
    let cache_repo = PgCacheRepository::new(pool.clone());

    // Startup cleanup, then the same job on a fixed interval.
    // Failures are logged inside and never prevent server startup.
    let cleanup = Arc::new(CleanupExpiredUseCase::new(
        Arc::new(auth_repo.clone()),
        Arc::new(auth_repo.clone()),
        Arc::new(auth_repo.clone()),
        Arc::new(cache_repo.clone()),
    ));
    let report = cleanup.execute().await;
    if !report.is_complete() {
        tracing::warn!(
            failed_steps = ?report.failed_steps,
            "Startup cleanup incomplete, continuing anyway"
        );
    }
    spawn_cleanup_job(cleanup, auth_config.cleanup_interval);

    let cache_config = if cfg!(debug_assertions) {
        CacheConfig::development()
    } else {
        CacheConfig::default()
    };
    let cache = CacheService::new(Arc::new(cache_repo), Arc::new(cache_config));

    // Every route outside /api/auth requires an access token
    let guard = AuthMiddlewareState {
        blacklist_repo: Arc::new(auth_repo.clone()),
        codec: Arc::new(TokenCodec::new(&auth_config)),
    };
    let authenticated = middleware::from_fn(move |req: Request<Body>, next: Next| {
        require_access_token(guard.clone(), req, next)
    });

    let progress_routes =
        progress_router(PgProgressRepository::new(pool.clone()), ProgressConfig::default())
            .layer(authenticated.clone());

    // Reports are cached inside the service with per-range TTLs, so no
    // response cache sits in front of these routes
    let analytics_routes = analytics_router(
        PgAnalyticsSource::new(pool.clone()),
        cache,
        AnalyticsConfig::default(),
    )
    .layer(authenticated);

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:40922,http://127.0.0.1:40922".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest("/api/auth", auth_router(auth_repo, auth_config))
        .nest("/api/progress", progress_routes)
        .nest("/api/analytics", analytics_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = env_or("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 31113)))?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn load_auth_config() -> anyhow::Result<AuthConfig> {
    let base = if cfg!(debug_assertions) {
        AuthConfig::development()
    } else {
        // In production, load secrets from environment
        AuthConfig {
            access_secret: secret_from_env("JWT_ACCESS_SECRET")?,
            refresh_secret: secret_from_env("JWT_REFRESH_SECRET")?,
            ..AuthConfig::default()
        }
    };

    let config = AuthConfig {
        access_token_ttl: Duration::from_secs(env_or(
            "ACCESS_TOKEN_TTL_SECS",
            base.access_token_ttl.as_secs(),
        )?),
        refresh_token_ttl: Duration::from_secs(env_or(
            "REFRESH_TOKEN_TTL_SECS",
            base.refresh_token_ttl.as_secs(),
        )?),
        max_devices_per_user: env_or("MAX_DEVICES_PER_USER", base.max_devices_per_user)?,
        cleanup_interval: Duration::from_secs(env_or(
            "CLEANUP_INTERVAL_SECS",
            base.cleanup_interval.as_secs(),
        )?),
        ..base
    };

    if config.access_secret == config.refresh_secret {
        anyhow::bail!("JWT_ACCESS_SECRET and JWT_REFRESH_SECRET must differ");
    }
    if config.max_devices_per_user == 0 {
        anyhow::bail!("MAX_DEVICES_PER_USER must be at least 1");
    }
    Ok(config)
}

/// Base64 secret of at least 32 bytes
fn secret_from_env(name: &str) -> anyhow::Result<Vec<u8>> {
    let encoded =
        env::var(name).map_err(|_| anyhow::anyhow!("{name} must be set in production"))?;
    let secret = Engine::decode(&general_purpose::STANDARD, encoded.trim())?;
    if secret.len() < 32 {
        anyhow::bail!("{name} must decode to at least 32 bytes");
    }
    Ok(secret)
}

fn env_or<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid {name}: {e}")),
        Err(_) => Ok(default),
    }
}
