//! JWT issuance and validation.
//!
//! Tokens are HMAC-SHA256 signed with the configured secret. Issuer/audience
//! validation is disabled and clock skew tolerance is zero. Validation never
//! throws past this module: the outcome is an explicit [`TokenOutcome`] so the
//! fail-open decision in the authentication middleware stays visible and
//! testable.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::jwt::JwtConfig;
use crate::utils::errors::AppError;

/// Marker value of the `admin` claim that flags a system caller.
pub const ADMIN_CLAIM_VALUE: &str = "admin";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject user id. Absent on system tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// `"admin"` on system tokens, absent otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<String>,
    /// Role reference used for permission resolution.
    #[serde(rename = "roleId", skip_serializing_if = "Option::is_none")]
    pub role_id: Option<Uuid>,
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.admin.as_deref() == Some(ADMIN_CLAIM_VALUE)
    }
}

/// Explicit validation outcome. The middleware treats everything but `Valid`
/// as "no context"; nothing here is an error in the `Result` sense.
#[derive(Debug)]
pub enum TokenOutcome {
    Valid(Claims),
    Expired,
    Invalid,
    Malformed,
}

impl TokenOutcome {
    pub fn into_claims(self) -> Option<Claims> {
        match self {
            TokenOutcome::Valid(claims) => Some(claims),
            TokenOutcome::Expired | TokenOutcome::Invalid | TokenOutcome::Malformed => None,
        }
    }
}

pub fn create_user_token(
    user_id: Uuid,
    role_id: Option<Uuid>,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        id: Some(user_id.to_string()),
        admin: None,
        role_id,
        exp: now + jwt_config.access_token_expiry as usize,
        iat: now,
    };
    sign(&claims, jwt_config)
}

pub fn create_system_token(jwt_config: &JwtConfig) -> Result<String, AppError> {
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        id: None,
        admin: Some(ADMIN_CLAIM_VALUE.to_string()),
        role_id: None,
        exp: now + jwt_config.access_token_expiry as usize,
        iat: now,
    };
    sign(&claims, jwt_config)
}

fn sign(claims: &Claims, jwt_config: &JwtConfig) -> Result<String, AppError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(AppError::internal)
}

pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> TokenOutcome {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.validate_aud = false;

    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => TokenOutcome::Valid(data.claims),
        Err(e) => match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenOutcome::Expired,
            jsonwebtoken::errors::ErrorKind::InvalidToken
            | jsonwebtoken::errors::ErrorKind::Base64(_)
            | jsonwebtoken::errors::ErrorKind::Json(_)
            | jsonwebtoken::errors::ErrorKind::Utf8(_) => TokenOutcome::Malformed,
            _ => TokenOutcome::Invalid,
        },
    }
}
