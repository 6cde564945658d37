//! Unit tests for the auth crate

#[cfg(test)]
mod token_tests {
    use crate::application::config::AuthConfig;
    use crate::application::jwt::TokenCodec;
    use crate::application::{
        BlacklistAccessUseCase, CleanupExpiredUseCase, IssueTokenPairUseCase, LogoutUseCase,
        RevokeTokensUseCase, RotateRefreshUseCase, VerifyAccessUseCase,
    };
    use crate::domain::entity::user::UserSnapshot;
    use crate::domain::value_object::reason::{BlacklistReason, RevocationReason};
    use crate::domain::value_object::revoke_scope::RevokeScope;
    use crate::domain::value_object::token_hash::TokenHash;
    use crate::error::AuthError;
    use crate::infra::memory::InMemoryAuthRepository;
    use cache::{CacheConfig, CacheService, InMemoryCacheRepository};
    use chrono::Utc;
    use kernel::id::UserId;
    use kernel::principal::Role;
    use platform::client::DeviceInfo;
    use std::sync::Arc;
    use std::time::Duration;

    struct Fixture {
        repo: Arc<InMemoryAuthRepository>,
        codec: Arc<TokenCodec>,
        config: Arc<AuthConfig>,
        user: UserSnapshot,
    }

    impl Fixture {
        async fn new(config: AuthConfig) -> Self {
            let repo = Arc::new(InMemoryAuthRepository::new());
            let user = UserSnapshot {
                user_id: UserId::new(),
                email: "asha@example.com".to_string(),
                role: Role::Student,
                is_active: true,
                locked_until: None,
            };
            repo.put_user(user.clone()).await;

            Self {
                repo,
                codec: Arc::new(TokenCodec::new(&config)),
                config: Arc::new(config),
                user,
            }
        }

        fn issue(&self) -> IssueTokenPairUseCase<InMemoryAuthRepository> {
            IssueTokenPairUseCase::new(self.repo.clone(), self.codec.clone(), self.config.clone())
        }

        fn rotate(&self) -> RotateRefreshUseCase<InMemoryAuthRepository, InMemoryAuthRepository> {
            RotateRefreshUseCase::new(
                self.repo.clone(),
                self.repo.clone(),
                self.codec.clone(),
                self.config.clone(),
            )
        }

        fn verify(&self) -> VerifyAccessUseCase<InMemoryAuthRepository> {
            VerifyAccessUseCase::new(self.repo.clone(), self.codec.clone())
        }
    }

    fn device(id: &str) -> DeviceInfo {
        DeviceInfo::from_user_agent(Some(id), None, Some("Mozilla/5.0 Firefox/128.0"), None)
    }

    #[tokio::test]
    async fn test_issue_pair_verifies_and_stores_hash_only() {
        let fx = Fixture::new(AuthConfig::default()).await;
        let pair = fx.issue().execute(&fx.user, device("laptop")).await.unwrap();

        let claims = fx.verify().authenticate(&pair.access_token).await.unwrap();
        assert_eq!(claims.sub, fx.user.user_id);
        assert_eq!(claims.principal().role, Role::Student);

        let records = fx.repo.records_for(&fx.user.user_id).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].token_hash, TokenHash::of(&pair.refresh_token));
        assert_ne!(records[0].token_hash.as_str(), pair.refresh_token);
        assert_eq!(pair.device_id, "laptop");
    }

    #[tokio::test]
    async fn test_refresh_token_is_not_an_access_token() {
        let fx = Fixture::new(AuthConfig::default()).await;
        let pair = fx.issue().execute(&fx.user, device("laptop")).await.unwrap();

        let err = fx.verify().authenticate(&pair.refresh_token).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid));
    }

    #[tokio::test]
    async fn test_sixth_device_evicts_least_recently_used() {
        let fx = Fixture::new(AuthConfig::default()).await;
        for i in 0..5 {
            fx.issue()
                .execute(&fx.user, device(&format!("device-{i}")))
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        fx.issue().execute(&fx.user, device("device-5")).await.unwrap();

        let sessions = RevokeTokensUseCase::new(fx.repo.clone())
            .active_devices(&fx.user.user_id)
            .await
            .unwrap();
        assert_eq!(sessions.len(), 5);
        assert!(sessions.iter().all(|s| s.device_id != "device-0"));
        assert_eq!(sessions[0].device_id, "device-5");
    }

    #[tokio::test]
    async fn test_rotation_deactivates_old_token() {
        let fx = Fixture::new(AuthConfig::default()).await;
        let pair = fx.issue().execute(&fx.user, device("phone")).await.unwrap();

        let rotated = fx
            .rotate()
            .execute(&pair.refresh_token, device("ignored"))
            .await
            .unwrap();
        assert_eq!(rotated.tokens.device_id, "phone");
        assert_eq!(rotated.user, fx.user);

        let records = fx.repo.records_for(&fx.user.user_id).await;
        let old = records
            .iter()
            .find(|r| r.token_hash == TokenHash::of(&pair.refresh_token))
            .unwrap();
        assert!(!old.is_active);
        assert_eq!(old.revoked_reason, Some(RevocationReason::Rotated));

        let new = records
            .iter()
            .find(|r| r.token_hash == TokenHash::of(&rotated.tokens.refresh_token))
            .unwrap();
        assert!(new.is_active);
        assert_eq!(new.device.device_id, "phone");

        // Reuse of the rotated-out token
        let err = fx
            .rotate()
            .execute(&pair.refresh_token, device("phone"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::RefreshTokenNotFound));
    }

    #[tokio::test]
    async fn test_concurrent_rotation_has_one_winner() {
        let fx = Fixture::new(AuthConfig::default()).await;
        let pair = fx.issue().execute(&fx.user, device("phone")).await.unwrap();

        let first = fx.rotate();
        let second = fx.rotate();
        let (a, b) = tokio::join!(
            first.execute(&pair.refresh_token, device("phone")),
            second.execute(&pair.refresh_token, device("phone")),
        );

        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
    }

    #[tokio::test]
    async fn test_expired_refresh_record_is_deleted() {
        let config = AuthConfig {
            refresh_token_ttl: Duration::from_secs(1),
            ..AuthConfig::default()
        };
        let fx = Fixture::new(config).await;
        let pair = fx.issue().execute(&fx.user, device("tablet")).await.unwrap();

        tokio::time::sleep(Duration::from_millis(2100)).await;

        let err = fx
            .rotate()
            .execute(&pair.refresh_token, device("tablet"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::RefreshTokenExpired));
        assert!(fx.repo.records_for(&fx.user.user_id).await.is_empty());
    }

    #[tokio::test]
    async fn test_rotation_rejects_disabled_and_locked_users() {
        let fx = Fixture::new(AuthConfig::default()).await;
        let pair = fx.issue().execute(&fx.user, device("phone")).await.unwrap();

        fx.repo
            .put_user(UserSnapshot {
                is_active: false,
                ..fx.user.clone()
            })
            .await;
        let err = fx
            .rotate()
            .execute(&pair.refresh_token, device("phone"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::AccountDisabled));

        fx.repo
            .put_user(UserSnapshot {
                locked_until: Some(Utc::now() + chrono::Duration::minutes(10)),
                ..fx.user.clone()
            })
            .await;
        let err = fx
            .rotate()
            .execute(&pair.refresh_token, device("phone"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::AccountLocked));

        // The token survives a refused rotation
        let records = fx.repo.records_for(&fx.user.user_id).await;
        assert!(records[0].is_active);
    }

    #[tokio::test]
    async fn test_revoke_scopes() {
        let fx = Fixture::new(AuthConfig::default()).await;
        let a = fx.issue().execute(&fx.user, device("a")).await.unwrap();
        fx.issue().execute(&fx.user, device("b")).await.unwrap();
        fx.issue().execute(&fx.user, device("b")).await.unwrap();
        fx.issue().execute(&fx.user, device("c")).await.unwrap();
        let revoke = RevokeTokensUseCase::new(fx.repo.clone());

        let scope = RevokeScope::from_parts(Some(&a.refresh_token), None).unwrap();
        assert_eq!(revoke.execute(&fx.user.user_id, scope).await.unwrap(), 1);

        let scope = RevokeScope::from_parts(None, Some("b")).unwrap();
        assert_eq!(revoke.execute(&fx.user.user_id, scope).await.unwrap(), 2);

        assert_eq!(
            revoke.execute(&fx.user.user_id, RevokeScope::All).await.unwrap(),
            1
        );
        assert!(
            revoke
                .active_devices(&fx.user.user_id)
                .await
                .unwrap()
                .is_empty()
        );

        let err = RevokeScope::from_parts(Some("t"), Some("b")).unwrap_err();
        assert!(matches!(err, AuthError::InvalidRevokeRequest(_)));
    }

    #[tokio::test]
    async fn test_revoke_does_not_touch_other_users() {
        let fx = Fixture::new(AuthConfig::default()).await;
        let pair = fx.issue().execute(&fx.user, device("a")).await.unwrap();

        let scope = RevokeScope::from_parts(Some(&pair.refresh_token), None).unwrap();
        let revoked = RevokeTokensUseCase::new(fx.repo.clone())
            .execute(&UserId::new(), scope)
            .await
            .unwrap();
        assert_eq!(revoked, 0);
    }

    #[tokio::test]
    async fn test_blacklist_lasts_until_token_expiry() {
        let config = AuthConfig {
            access_token_ttl: Duration::from_secs(1),
            ..AuthConfig::default()
        };
        let fx = Fixture::new(config).await;
        let pair = fx.issue().execute(&fx.user, device("a")).await.unwrap();

        BlacklistAccessUseCase::new(fx.repo.clone(), fx.codec.clone(), fx.config.clone())
            .execute(&pair.access_token, BlacklistReason::Security)
            .await
            .unwrap();

        assert!(fx.verify().is_blacklisted(&pair.access_token).await.unwrap());
        let err = fx.verify().authenticate(&pair.access_token).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenBlacklisted));

        tokio::time::sleep(Duration::from_millis(2100)).await;
        assert!(!fx.verify().is_blacklisted(&pair.access_token).await.unwrap());
    }

    #[tokio::test]
    async fn test_logout_blacklists_and_revokes() {
        let fx = Fixture::new(AuthConfig::default()).await;
        let pair = fx.issue().execute(&fx.user, device("a")).await.unwrap();

        let revoked = LogoutUseCase::new(
            fx.repo.clone(),
            fx.repo.clone(),
            fx.codec.clone(),
            fx.config.clone(),
        )
        .execute(&fx.user.user_id, &pair.access_token, Some(&pair.refresh_token))
        .await
        .unwrap();

        assert_eq!(revoked, 1);
        assert!(fx.verify().is_blacklisted(&pair.access_token).await.unwrap());
        let err = fx
            .rotate()
            .execute(&pair.refresh_token, device("a"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::RefreshTokenNotFound));
    }

    #[tokio::test]
    async fn test_cleanup_removes_expired_state() {
        let config = AuthConfig {
            access_token_ttl: Duration::from_secs(1),
            refresh_token_ttl: Duration::from_secs(1),
            ..AuthConfig::default()
        };
        let fx = Fixture::new(config).await;
        let pair = fx.issue().execute(&fx.user, device("a")).await.unwrap();
        BlacklistAccessUseCase::new(fx.repo.clone(), fx.codec.clone(), fx.config.clone())
            .execute(&pair.access_token, BlacklistReason::Logout)
            .await
            .unwrap();
        fx.repo
            .put_user(UserSnapshot {
                locked_until: Some(Utc::now() + chrono::Duration::seconds(1)),
                ..fx.user.clone()
            })
            .await;

        let cache_repo = Arc::new(InMemoryCacheRepository::new());
        CacheService::new(cache_repo.clone(), Arc::new(CacheConfig::default()))
            .set("analytics:system:7d", &42, Duration::from_secs(1))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(2100)).await;

        let cleanup = CleanupExpiredUseCase::new(
            fx.repo.clone(),
            fx.repo.clone(),
            fx.repo.clone(),
            cache_repo.clone(),
        );
        let report = cleanup.execute().await;

        assert!(report.is_complete());
        assert_eq!(report.refresh_tokens_deleted, 1);
        assert_eq!(report.blacklist_entries_deleted, 1);
        assert_eq!(report.lockouts_reset, 1);
        assert_eq!(report.cache_entries_purged, 1);
        assert!(cache_repo.is_empty().await);

        // Idempotent
        let again = cleanup.execute().await;
        assert_eq!(again.refresh_tokens_deleted, 0);
        assert_eq!(again.lockouts_reset, 0);
    }
}

#[cfg(test)]
mod router_tests {
    use crate::application::config::AuthConfig;
    use crate::application::jwt::TokenCodec;
    use crate::application::{IssueTokenPairUseCase, TokenPair};
    use crate::domain::entity::user::UserSnapshot;
    use crate::infra::memory::InMemoryAuthRepository;
    use crate::presentation::router::auth_router_generic;
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use kernel::id::UserId;
    use kernel::principal::Role;
    use platform::client::DeviceInfo;
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn setup() -> (Router, TokenPair) {
        let config = AuthConfig::default();
        let repo = InMemoryAuthRepository::new();
        let user = UserSnapshot {
            user_id: UserId::new(),
            email: "ravi@example.com".to_string(),
            role: Role::Instructor,
            is_active: true,
            locked_until: None,
        };
        repo.put_user(user.clone()).await;

        let pair = IssueTokenPairUseCase::new(
            Arc::new(repo.clone()),
            Arc::new(TokenCodec::new(&config)),
            Arc::new(config.clone()),
        )
        .execute(
            &user,
            DeviceInfo::from_user_agent(Some("desk"), Some("Office PC"), None, None),
        )
        .await
        .unwrap();

        (auth_router_generic(repo, config), pair)
    }

    fn sessions_request(token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/sessions");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let (app, _) = setup().await;
        let response = app.oneshot(sessions_request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let (app, _) = setup().await;
        let response = app.oneshot(sessions_request(Some("not.a.jwt"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_sessions_lists_devices() {
        let (app, pair) = setup().await;
        let response = app
            .oneshot(sessions_request(Some(&pair.access_token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let sessions: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(sessions.as_array().map(Vec::len), Some(1));
        assert_eq!(sessions[0]["deviceId"], "desk");
        assert_eq!(sessions[0]["deviceName"], "Office PC");
    }

    #[tokio::test]
    async fn test_logout_then_token_is_rejected() {
        let (app, pair) = setup().await;

        let logout = Request::builder()
            .method("POST")
            .uri("/logout")
            .header(header::AUTHORIZATION, format!("Bearer {}", pair.access_token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(format!(
                r#"{{"refreshToken":"{}"}}"#,
                pair.refresh_token
            )))
            .unwrap();
        let response = app.clone().oneshot(logout).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(sessions_request(Some(&pair.access_token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_revoke_with_both_fields_is_bad_request() {
        let (app, pair) = setup().await;
        let request = Request::builder()
            .method("POST")
            .uri("/revoke")
            .header(header::AUTHORIZATION, format!("Bearer {}", pair.access_token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"refreshToken":"x","deviceId":"desk"}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
