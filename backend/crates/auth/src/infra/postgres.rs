//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::{RefreshTokenId, UserId};
use kernel::principal::Role;
use platform::client::DeviceInfo;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{
    blacklist_entry::BlacklistEntry, refresh_token::RefreshTokenRecord, user::UserSnapshot,
};
use crate::domain::repository::{BlacklistRepository, RefreshTokenRepository, UserRepository};
use crate::domain::value_object::{
    reason::{BlacklistReason, RevocationReason},
    token_hash::TokenHash,
};
use crate::error::{AuthError, AuthResult};

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// Refresh Token Repository Implementation
// ============================================================================

const REFRESH_TOKEN_COLUMNS: &str = r#"
    record_id,
    user_id,
    token_hash,
    device_id,
    device_name,
    browser,
    os,
    ip_address,
    created_at,
    expires_at,
    last_used_at,
    is_active,
    revoked_at,
    revoked_reason
"#;

impl RefreshTokenRepository for PgAuthRepository {
    async fn insert(&self, record: &RefreshTokenRecord) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (
                record_id,
                user_id,
                token_hash,
                device_id,
                device_name,
                browser,
                os,
                ip_address,
                created_at,
                expires_at,
                last_used_at,
                is_active
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.user_id.as_uuid())
        .bind(record.token_hash.as_str())
        .bind(&record.device.device_id)
        .bind(&record.device.device_name)
        .bind(&record.device.browser)
        .bind(&record.device.os)
        .bind(&record.device.ip_address)
        .bind(record.created_at)
        .bind(record.expires_at)
        .bind(record.last_used_at)
        .bind(record.is_active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &TokenHash) -> AuthResult<Option<RefreshTokenRecord>> {
        let row = sqlx::query_as::<_, RefreshTokenRow>(&format!(
            "SELECT {REFRESH_TOKEN_COLUMNS} FROM refresh_tokens WHERE token_hash = $1"
        ))
        .bind(token_hash.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_record()).transpose()
    }

    async fn find_active_by_user(&self, user_id: &UserId) -> AuthResult<Vec<RefreshTokenRecord>> {
        let rows = sqlx::query_as::<_, RefreshTokenRow>(&format!(
            r#"
            SELECT {REFRESH_TOKEN_COLUMNS}
            FROM refresh_tokens
            WHERE user_id = $1 AND is_active
            ORDER BY last_used_at ASC
            "#
        ))
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_record()).collect()
    }

    async fn deactivate_if_active(
        &self,
        token_hash: &TokenHash,
        reason: RevocationReason,
        now: DateTime<Utc>,
    ) -> AuthResult<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE refresh_tokens SET
                is_active = FALSE,
                revoked_at = $2,
                revoked_reason = $3,
                last_used_at = $2
            WHERE token_hash = $1 AND is_active
            "#,
        )
        .bind(token_hash.as_str())
        .bind(now)
        .bind(reason.code())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated == 1)
    }

    async fn revoke_token(
        &self,
        user_id: &UserId,
        token_hash: &TokenHash,
        reason: RevocationReason,
        now: DateTime<Utc>,
    ) -> AuthResult<u64> {
        let revoked = sqlx::query(
            r#"
            UPDATE refresh_tokens SET
                is_active = FALSE,
                revoked_at = $3,
                revoked_reason = $4
            WHERE user_id = $1 AND token_hash = $2 AND is_active
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(token_hash.as_str())
        .bind(now)
        .bind(reason.code())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(revoked)
    }

    async fn revoke_device(
        &self,
        user_id: &UserId,
        device_id: &str,
        reason: RevocationReason,
        now: DateTime<Utc>,
    ) -> AuthResult<u64> {
        let revoked = sqlx::query(
            r#"
            UPDATE refresh_tokens SET
                is_active = FALSE,
                revoked_at = $3,
                revoked_reason = $4
            WHERE user_id = $1 AND device_id = $2 AND is_active
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(device_id)
        .bind(now)
        .bind(reason.code())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(revoked)
    }

    async fn revoke_all(
        &self,
        user_id: &UserId,
        reason: RevocationReason,
        now: DateTime<Utc>,
    ) -> AuthResult<u64> {
        let revoked = sqlx::query(
            r#"
            UPDATE refresh_tokens SET
                is_active = FALSE,
                revoked_at = $2,
                revoked_reason = $3
            WHERE user_id = $1 AND is_active
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(now)
        .bind(reason.code())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(revoked)
    }

    async fn delete(&self, id: &RefreshTokenId) -> AuthResult<()> {
        sqlx::query("DELETE FROM refresh_tokens WHERE record_id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Blacklist Repository Implementation
// ============================================================================

impl BlacklistRepository for PgAuthRepository {
    async fn upsert(&self, entry: &BlacklistEntry) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO token_blacklist (token_hash, reason, expires_at, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (token_hash) DO UPDATE SET
                reason = EXCLUDED.reason,
                expires_at = GREATEST(token_blacklist.expires_at, EXCLUDED.expires_at)
            "#,
        )
        .bind(entry.token_hash.as_str())
        .bind(entry.reason.code())
        .bind(entry.expires_at)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, token_hash: &TokenHash) -> AuthResult<Option<BlacklistEntry>> {
        let row = sqlx::query_as::<_, BlacklistRow>(
            r#"
            SELECT token_hash, reason, expires_at, created_at
            FROM token_blacklist
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_entry()).transpose()
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM token_blacklist WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<UserSnapshot>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT user_id, email, role, is_active, locked_until
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn reset_elapsed_lockouts(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let reset = sqlx::query(
            r#"
            UPDATE users SET
                locked_until = NULL,
                failed_login_attempts = 0,
                updated_at = $1
            WHERE locked_until IS NOT NULL AND locked_until <= $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(reset)
    }
}

// ============================================================================
// Row Types for SQLx
// ============================================================================

#[derive(sqlx::FromRow)]
struct RefreshTokenRow {
    record_id: Uuid,
    user_id: Uuid,
    token_hash: String,
    device_id: String,
    device_name: String,
    browser: String,
    os: String,
    ip_address: Option<String>,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    last_used_at: DateTime<Utc>,
    is_active: bool,
    revoked_at: Option<DateTime<Utc>>,
    revoked_reason: Option<String>,
}

impl RefreshTokenRow {
    fn into_record(self) -> AuthResult<RefreshTokenRecord> {
        let revoked_reason = self
            .revoked_reason
            .as_deref()
            .map(str::parse::<RevocationReason>)
            .transpose()?;

        Ok(RefreshTokenRecord {
            id: RefreshTokenId::from_uuid(self.record_id),
            user_id: UserId::from_uuid(self.user_id),
            token_hash: TokenHash::from_stored(self.token_hash),
            device: DeviceInfo {
                device_id: self.device_id,
                device_name: self.device_name,
                browser: self.browser,
                os: self.os,
                ip_address: self.ip_address,
            },
            created_at: self.created_at,
            expires_at: self.expires_at,
            last_used_at: self.last_used_at,
            is_active: self.is_active,
            revoked_at: self.revoked_at,
            revoked_reason,
        })
    }
}

#[derive(sqlx::FromRow)]
struct BlacklistRow {
    token_hash: String,
    reason: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl BlacklistRow {
    fn into_entry(self) -> AuthResult<BlacklistEntry> {
        Ok(BlacklistEntry {
            token_hash: TokenHash::from_stored(self.token_hash),
            reason: self.reason.parse::<BlacklistReason>()?,
            expires_at: self.expires_at,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    email: String,
    role: String,
    is_active: bool,
    locked_until: Option<DateTime<Utc>>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<UserSnapshot> {
        let role = self
            .role
            .parse::<Role>()
            .map_err(|e| AuthError::Internal(format!("Invalid role in storage: {e}")))?;

        Ok(UserSnapshot {
            user_id: UserId::from_uuid(self.user_id),
            email: self.email,
            role,
            is_active: self.is_active,
            locked_until: self.locked_until,
        })
    }
}
