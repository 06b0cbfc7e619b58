//! Service-account token acquisition with expiry-aware caching.
//!
//! A provider holds one service account's credentials and the token obtained
//! with them. The cached token is reused until it is within a safety margin
//! of the expiry recorded in its own `exp` claim, then replaced through the
//! ordinary login flow. State is per-instance, so separate providers can hold
//! separate credentials.

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::client::http::WalkTrackClient;
use crate::media::json_media_type;
use crate::modules::auth::model::{AuthenticateRequest, AuthenticationResponse};
use crate::utils::errors::AppError;
use crate::utils::jwt::Claims;

/// Refresh when the token has less than this many seconds left.
const EXPIRY_MARGIN_SECS: i64 = 60;

struct CachedToken {
    token: String,
    expires_at: i64,
}

pub struct ServiceTokenProvider {
    client: Arc<WalkTrackClient>,
    username: String,
    password: String,
    cached: RwLock<Option<CachedToken>>,
}

impl ServiceTokenProvider {
    pub fn new(
        client: Arc<WalkTrackClient>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            client,
            username: username.into(),
            password: password.into(),
            cached: RwLock::new(None),
        }
    }

    /// Current service token, re-authenticating only when the cached one is
    /// missing or close to expiry.
    #[instrument(skip(self))]
    pub async fn token(&self) -> Result<String, AppError> {
        if let Some(cached) = &*self.cached.read().await {
            if cached.expires_at - Utc::now().timestamp() > EXPIRY_MARGIN_SECS {
                return Ok(cached.token.clone());
            }
        }

        let mut guard = self.cached.write().await;
        // Another request may have refreshed while we waited for the lock.
        if let Some(cached) = &*guard {
            if cached.expires_at - Utc::now().timestamp() > EXPIRY_MARGIN_SECS {
                return Ok(cached.token.clone());
            }
        }

        debug!("Service token missing or near expiry, re-authenticating");
        let response: AuthenticationResponse = self
            .client
            .post(
                "/v1/authenticate",
                &AuthenticateRequest {
                    username: self.username.clone(),
                    password: self.password.clone(),
                },
                &json_media_type("WalkTrack.AuthenticationRequest", 1),
                &json_media_type("WalkTrack.AuthenticationResponse", 1),
                None,
            )
            .await?;

        let expires_at = read_expiry(&response.token)?;
        let token = response.token.clone();
        *guard = Some(CachedToken {
            token: response.token,
            expires_at,
        });

        Ok(token)
    }
}

/// Reads the `exp` claim without verifying the signature. The token came
/// straight from the issuing service over the login flow; only its stated
/// lifetime matters here.
fn read_expiry(token: &str) -> Result<i64, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|e| AppError::internal(anyhow::anyhow!("unreadable service token: {e}")))?;

    Ok(data.claims.exp as i64)
}
