//! Auth Router

use axum::body::Body;
use axum::http::Request;
use axum::middleware::{self, Next};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::jwt::TokenCodec;
use crate::domain::repository::{BlacklistRepository, RefreshTokenRepository, UserRepository};
use crate::infra::postgres::PgAuthRepository;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{AuthMiddlewareState, require_access_token};

/// Create the Auth router with PostgreSQL repository
pub fn auth_router(repo: PgAuthRepository, config: AuthConfig) -> Router {
    auth_router_generic(repo, config)
}

/// Create a generic Auth router for any repository implementation
///
/// `/refresh` is public (the refresh token is the credential); the other
/// routes require an access token.
pub fn auth_router_generic<R>(repo: R, config: AuthConfig) -> Router
where
    R: RefreshTokenRepository + BlacklistRepository + UserRepository + Clone + Send + Sync + 'static,
{
    let config = Arc::new(config);
    let codec = Arc::new(TokenCodec::new(&config));
    let repo = Arc::new(repo);

    let state = AuthAppState {
        repo: repo.clone(),
        codec: codec.clone(),
        config,
    };
    let guard = AuthMiddlewareState {
        blacklist_repo: repo,
        codec,
    };

    let protected = Router::new()
        .route("/logout", post(handlers::logout::<R>))
        .route("/revoke", post(handlers::revoke::<R>))
        .route("/sessions", get(handlers::list_sessions::<R>))
        .route_layer(middleware::from_fn(
            move |req: Request<Body>, next: Next| require_access_token(guard.clone(), req, next),
        ));

    Router::new()
        .route("/refresh", post(handlers::refresh::<R>))
        .merge(protected)
        .with_state(state)
}
