//! JWT signing and verification
//!
//! HS256 with separate keys for access and refresh tokens. Verification
//! uses zero leeway; the expiry-agnostic decoders still check the signature
//! and are for flows that judge expiry elsewhere (refresh records, blacklist
//! lifetime).

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::application::config::AuthConfig;
use crate::domain::value_object::claims::{AccessClaims, RefreshClaims, TokenType};
use crate::error::{AuthError, AuthResult};

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Keys {
    fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

pub struct TokenCodec {
    access: Keys,
    refresh: Keys,
}

impl TokenCodec {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            access: Keys::new(&config.access_secret),
            refresh: Keys::new(&config.refresh_secret),
        }
    }

    pub fn sign_access(&self, claims: &AccessClaims) -> AuthResult<String> {
        sign(claims, &self.access.encoding)
    }

    pub fn sign_refresh(&self, claims: &RefreshClaims) -> AuthResult<String> {
        sign(claims, &self.refresh.encoding)
    }

    /// Signature, expiry and token type
    pub fn verify_access(&self, token: &str) -> AuthResult<AccessClaims> {
        let claims: AccessClaims = verify(token, &self.access.decoding, true)?;
        expect_type(claims.typ, TokenType::Access)?;
        Ok(claims)
    }

    /// Signature and token type only
    pub fn decode_access_ignoring_expiry(&self, token: &str) -> AuthResult<AccessClaims> {
        let claims: AccessClaims = verify(token, &self.access.decoding, false)?;
        expect_type(claims.typ, TokenType::Access)?;
        Ok(claims)
    }

    /// Signature and token type only; the stored record decides expiry
    pub fn decode_refresh_ignoring_expiry(&self, token: &str) -> AuthResult<RefreshClaims> {
        let claims: RefreshClaims = verify(token, &self.refresh.decoding, false)?;
        expect_type(claims.typ, TokenType::Refresh)?;
        Ok(claims)
    }
}

fn sign<T: Serialize>(claims: &T, key: &EncodingKey) -> AuthResult<String> {
    encode(&Header::new(Algorithm::HS256), claims, key)
        .map_err(|e| AuthError::Internal(format!("Failed to sign token: {e}")))
}

fn verify<T: DeserializeOwned + Clone>(
    token: &str,
    key: &DecodingKey,
    check_expiry: bool,
) -> AuthResult<T> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.validate_exp = check_expiry;
    validation.set_required_spec_claims(&["exp", "sub"]);

    Ok(decode::<T>(token, key, &validation)?.claims)
}

fn expect_type(actual: TokenType, expected: TokenType) -> AuthResult<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(AuthError::TokenInvalid)
    }
}
