//! Auth Middleware
//!
//! Middleware for requiring a bearer access token on protected routes. On
//! success the caller's [`Principal`] and the raw token are placed in the
//! request extensions.

use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use kernel::principal::{Principal, Role};
use platform::client::extract_bearer_token;
use std::sync::Arc;

use crate::application::VerifyAccessUseCase;
use crate::application::jwt::TokenCodec;
use crate::domain::repository::BlacklistRepository;
use crate::error::AuthError;

/// Middleware state
#[derive(Clone)]
pub struct AuthMiddlewareState<B>
where
    B: BlacklistRepository + Send + Sync + 'static,
{
    pub blacklist_repo: Arc<B>,
    pub codec: Arc<TokenCodec>,
}

/// Raw access token of the current request
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Middleware that requires a valid, non-blacklisted access token
pub async fn require_access_token<B>(
    state: AuthMiddlewareState<B>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response>
where
    B: BlacklistRepository + Send + Sync + 'static,
{
    let token = extract_bearer_token(req.headers())
        .ok_or_else(|| AuthError::MissingToken.into_response())?;

    let use_case = VerifyAccessUseCase::new(state.blacklist_repo.clone(), state.codec.clone());
    let claims = use_case
        .authenticate(&token)
        .await
        .map_err(IntoResponse::into_response)?;

    req.extensions_mut().insert(claims.principal());
    req.extensions_mut().insert(BearerToken(token));

    Ok(next.run(req).await)
}

/// Middleware that requires the authenticated caller to hold one of `roles`
///
/// Must run after [`require_access_token`].
pub async fn require_roles(
    roles: &'static [Role],
    req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let principal = req
        .extensions()
        .get::<Principal>()
        .ok_or_else(|| AuthError::MissingToken.into_response())?;

    principal
        .require_role(roles)
        .map_err(|e| AuthError::from(e).into_response())?;

    Ok(next.run(req).await)
}
