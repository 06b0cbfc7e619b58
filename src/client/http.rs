//! HTTP client speaking the structured media-type protocol.
//!
//! Peer WalkTrack services are called with the same wire transcoders the
//! server uses: the request body is encoded through the registry, the
//! `Content-Type` and `Accept` headers carry the structured media types, and
//! the response body is decoded back through the registry.

use std::sync::Arc;

use reqwest::header;
use tracing::instrument;

use crate::media::{TranscoderRegistry, TranscoderRole, WalkTrackMediaType};
use crate::utils::errors::AppError;

pub struct WalkTrackClient {
    base_url: String,
    http: reqwest::Client,
    registry: Arc<TranscoderRegistry>,
}

impl WalkTrackClient {
    pub fn new(base_url: impl Into<String>, registry: Arc<TranscoderRegistry>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            registry,
        }
    }

    #[instrument(skip(self, body, bearer))]
    pub async fn post<Req, Res>(
        &self,
        path: &str,
        body: &Req,
        request_type: &WalkTrackMediaType,
        response_type: &WalkTrackMediaType,
        bearer: Option<&str>,
    ) -> Result<Res, AppError>
    where
        Req: Send + Sync + 'static,
        Res: Send + 'static,
    {
        let payload = self
            .registry
            .encode(request_type, body, TranscoderRole::Wire)?;

        let mut request = self
            .http
            .post(format!("{}{path}", self.base_url))
            .header(header::CONTENT_TYPE, request_type.to_string())
            .header(header::ACCEPT, response_type.to_string())
            .body(payload);

        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(AppError::internal)?;
        let status = response.status();

        if !status.is_success() {
            return Err(match status.as_u16() {
                401 => AppError::unauthorized(format!("{path} returned 401")),
                403 => AppError::forbidden(format!("{path} returned 403")),
                404 => AppError::not_found(format!("{path} returned 404")),
                _ => AppError::internal(anyhow::anyhow!("{path} returned {status}")),
            });
        }

        let bytes = response.bytes().await.map_err(AppError::internal)?;
        self.registry
            .decode(response_type, &bytes, TranscoderRole::Wire)
    }
}
