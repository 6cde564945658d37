//! JWT Claims
//!
//! Access and refresh tokens carry different claims and are signed with
//! different secrets; `typ` guards against one being presented as the other.

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use kernel::principal::{Principal, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: UserId,
    pub role: Role,
    pub email: String,
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
    pub typ: TokenType,
}

impl AccessClaims {
    pub fn new(
        user_id: UserId,
        role: Role,
        email: String,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sub: user_id,
            role,
            email,
            jti: Uuid::new_v4(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            typ: TokenType::Access,
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.sub,
            role: self.role,
            email: self.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: UserId,
    pub device_id: String,
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
    pub typ: TokenType,
}

impl RefreshClaims {
    pub fn new(
        user_id: UserId,
        device_id: String,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sub: user_id,
            device_id,
            jti: Uuid::new_v4(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            typ: TokenType::Refresh,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_access_claims_serialize_as_jwt_fields() {
        let now = Utc::now();
        let user_id = UserId::new();
        let claims = AccessClaims::new(
            user_id,
            Role::Instructor,
            "teach@example.com".to_string(),
            now,
            now + Duration::minutes(15),
        );

        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["sub"], user_id.to_string());
        assert_eq!(json["role"], "instructor");
        assert_eq!(json["typ"], "access");
        assert_eq!(json["exp"].as_i64().unwrap() - json["iat"].as_i64().unwrap(), 900);

        let principal = claims.principal();
        assert_eq!(principal.user_id, user_id);
        assert_eq!(principal.role, Role::Instructor);
    }

    #[test]
    fn test_each_claim_set_gets_a_fresh_jti() {
        let now = Utc::now();
        let user_id = UserId::new();
        let a = RefreshClaims::new(user_id, "d".to_string(), now, now);
        let b = RefreshClaims::new(user_id, "d".to_string(), now, now);
        assert_ne!(a.jti, b.jti);
        assert_eq!(a.typ, TokenType::Refresh);
    }
}
