//! HTTP Handlers

use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, StatusCode};
use axum::{Extension, Json};
use kernel::principal::Principal;
use std::net::SocketAddr;
use std::sync::Arc;

use platform::client::{extract_client_ip, extract_device_info};

use crate::application::config::AuthConfig;
use crate::application::jwt::TokenCodec;
use crate::application::{LogoutUseCase, RevokeTokensUseCase, RotateRefreshUseCase};
use crate::domain::entity::refresh_token::DeviceSession;
use crate::domain::repository::{BlacklistRepository, RefreshTokenRepository, UserRepository};
use crate::domain::value_object::revoke_scope::RevokeScope;
use crate::error::AuthResult;
use crate::presentation::dto::{
    LogoutRequest, RefreshRequest, RefreshResponse, RevokeRequest, RevokeResponse,
};
use crate::presentation::middleware::BearerToken;

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: RefreshTokenRepository + BlacklistRepository + UserRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub codec: Arc<TokenCodec>,
    pub config: Arc<AuthConfig>,
}

// ============================================================================
// Refresh
// ============================================================================

/// POST /api/auth/refresh
pub async fn refresh<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<RefreshRequest>,
) -> AuthResult<Json<RefreshResponse>>
where
    R: RefreshTokenRepository + BlacklistRepository + UserRepository + Clone + Send + Sync + 'static,
{
    let client_ip = extract_client_ip(&headers, Some(addr.ip()));
    let device = extract_device_info(&headers, client_ip);

    let use_case = RotateRefreshUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.codec.clone(),
        state.config.clone(),
    );

    let rotated = use_case.execute(&req.refresh_token, device).await?;

    Ok(Json(RefreshResponse {
        access_token: rotated.tokens.access_token,
        refresh_token: rotated.tokens.refresh_token,
        token_type: rotated.tokens.token_type,
        access_expires_at: rotated.tokens.access_expires_at,
        refresh_expires_at: rotated.tokens.refresh_expires_at,
        user: rotated.user,
    }))
}

// ============================================================================
// Logout (requires access token)
// ============================================================================

/// POST /api/auth/logout
pub async fn logout<R>(
    State(state): State<AuthAppState<R>>,
    Extension(principal): Extension<Principal>,
    Extension(BearerToken(access_token)): Extension<BearerToken>,
    body: Option<Json<LogoutRequest>>,
) -> AuthResult<StatusCode>
where
    R: RefreshTokenRepository + BlacklistRepository + UserRepository + Clone + Send + Sync + 'static,
{
    let req = body.map(|Json(req)| req).unwrap_or_default();

    let use_case = LogoutUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.codec.clone(),
        state.config.clone(),
    );

    use_case
        .execute(&principal.user_id, &access_token, req.refresh_token.as_deref())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Device Management (requires access token)
// ============================================================================

/// POST /api/auth/revoke
pub async fn revoke<R>(
    State(state): State<AuthAppState<R>>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<RevokeRequest>,
) -> AuthResult<Json<RevokeResponse>>
where
    R: RefreshTokenRepository + BlacklistRepository + UserRepository + Clone + Send + Sync + 'static,
{
    let scope = RevokeScope::from_parts(req.refresh_token.as_deref(), req.device_id.as_deref())?;

    let use_case = RevokeTokensUseCase::new(state.repo.clone());
    let revoked = use_case.execute(&principal.user_id, scope).await?;

    Ok(Json(RevokeResponse { revoked }))
}

/// GET /api/auth/sessions
pub async fn list_sessions<R>(
    State(state): State<AuthAppState<R>>,
    Extension(principal): Extension<Principal>,
) -> AuthResult<Json<Vec<DeviceSession>>>
where
    R: RefreshTokenRepository + BlacklistRepository + UserRepository + Clone + Send + Sync + 'static,
{
    let use_case = RevokeTokensUseCase::new(state.repo.clone());
    let sessions = use_case.active_devices(&principal.user_id).await?;

    Ok(Json(sessions))
}
