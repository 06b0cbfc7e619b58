//! Remote authorization via a peer service's authorize endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use crate::client::http::WalkTrackClient;
use crate::client::token::ServiceTokenProvider;
use crate::media::json_media_type;
use crate::middleware::authorize::Authorizer;
use crate::modules::auth::model::{AuthorizeRequest, AuthorizeResponse};
use crate::utils::errors::{AppError, ErrorKind};

pub struct RemoteAuthorizer {
    client: Arc<WalkTrackClient>,
    tokens: ServiceTokenProvider,
}

impl RemoteAuthorizer {
    pub fn new(client: Arc<WalkTrackClient>, tokens: ServiceTokenProvider) -> Self {
        Self { client, tokens }
    }
}

#[async_trait]
impl Authorizer for RemoteAuthorizer {
    #[instrument(skip(self, token))]
    async fn authorize(&self, token: &str, permission: &str) -> Result<bool, AppError> {
        let service_token = self.tokens.token().await?;

        let result: Result<AuthorizeResponse, AppError> = self
            .client
            .post(
                "/v1/authorize",
                &AuthorizeRequest {
                    token: token.to_string(),
                    permission: permission.to_string(),
                },
                &json_media_type("WalkTrack.AuthorizationRequest", 1),
                &json_media_type("WalkTrack.AuthorizationResponse", 1),
                Some(&service_token),
            )
            .await;

        match result {
            Ok(response) => Ok(response.authorized),
            // A rejection from the peer is a plain deny, not a failure.
            Err(e) if matches!(e.kind, ErrorKind::Unauthorized | ErrorKind::Forbidden) => {
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
