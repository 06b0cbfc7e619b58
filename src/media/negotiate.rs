//! Content negotiation extractors.
//!
//! [`Negotiated`] replaces a plain `Json` body extractor: it parses the
//! request `Content-Type` into a [`WalkTrackMediaType`], decodes the body
//! through the wire transcoder registry, and runs validator rules on the
//! result. [`Accept`] is the response-side counterpart: it captures the
//! declared `Accept` values in order and picks the first with a registered
//! encoder for the response type.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Response;
use validator::Validate;

use crate::media::media_type::WalkTrackMediaType;
use crate::media::registry::{TranscoderRegistry, TranscoderRole};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Request body decoded through the wire transcoder selected by
/// `Content-Type`, then validated.
#[derive(Debug, Clone)]
pub struct Negotiated<T>(pub T);

impl<T> FromRequest<AppState> for Negotiated<T>
where
    T: Validate + Send + Sync + 'static,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::invalid_request(format!("unreadable body: {e}")))?;

        if bytes.is_empty() {
            return Err(AppError::missing_body());
        }

        let Some(content_type) = content_type else {
            return Err(AppError::unparsable("missing Content-Type header"));
        };

        let media_type: WalkTrackMediaType = content_type
            .parse()
            .map_err(|_| AppError::unparsable(format!("unrecognized Content-Type '{content_type}'")))?;

        let value: T = state
            .transcoders
            .decode(&media_type, &bytes, TranscoderRole::Wire)?;

        value
            .validate()
            .map_err(|e| AppError::invalid_request(e.to_string()))?;

        Ok(Negotiated(value))
    }
}

/// Ordered `Accept` preferences plus a handle on the registry, captured from
/// request parts so handlers can encode their response through it.
#[derive(Clone)]
pub struct Accept {
    preferences: Vec<WalkTrackMediaType>,
    /// `*/*` was declared, so the default representation is acceptable even
    /// when no concrete preference matches.
    wildcard: bool,
    /// A concrete value was declared that is not a structured media type;
    /// such a request must not silently fall back to the default.
    unusable_declared: bool,
    registry: Arc<TranscoderRegistry>,
}

impl Accept {
    pub fn from_headers(headers: &HeaderMap, registry: Arc<TranscoderRegistry>) -> Self {
        let mut preferences = Vec::new();
        let mut wildcard = false;
        let mut unusable_declared = false;

        let candidates = headers
            .get_all(header::ACCEPT)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(','))
            .map(str::trim)
            .filter(|candidate| !candidate.is_empty());

        for candidate in candidates {
            if candidate == "*/*" {
                wildcard = true;
            } else {
                match candidate.parse() {
                    Ok(media_type) => preferences.push(media_type),
                    Err(_) => unusable_declared = true,
                }
            }
        }

        Self {
            preferences,
            wildcard,
            unusable_declared,
            registry,
        }
    }

    /// First declared preference with a registered wire encoder for `T`. The
    /// type's default applies when nothing was declared or `*/*` was; a
    /// header naming only representations this service cannot produce is a
    /// 406.
    fn select<T: Send + 'static>(&self) -> Result<WalkTrackMediaType, AppError> {
        for candidate in &self.preferences {
            if self
                .registry
                .can_encode::<T>(candidate, TranscoderRole::Wire)
            {
                return Ok(candidate.clone());
            }
        }

        let no_preference = self.preferences.is_empty() && !self.unusable_declared;
        if self.wildcard || no_preference {
            if let Some(fallback) = self.registry.default_wire_media_type::<T>() {
                return Ok(fallback.clone());
            }
        }

        Err(AppError::not_acceptable(
            "no acceptable representation registered",
        ))
    }

    pub fn render<T: Send + 'static>(
        &self,
        status: StatusCode,
        value: &T,
    ) -> Result<Response, AppError> {
        let media_type = self.select::<T>()?;
        let body = self
            .registry
            .encode(&media_type, value, TranscoderRole::Wire)?;

        Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, media_type.to_string())
            .body(body.into())
            .map_err(AppError::internal)
    }

    pub fn ok<T: Send + 'static>(&self, value: &T) -> Result<Response, AppError> {
        self.render(StatusCode::OK, value)
    }

    pub fn created<T: Send + 'static>(&self, value: &T) -> Result<Response, AppError> {
        self.render(StatusCode::CREATED, value)
    }
}

impl FromRequestParts<AppState> for Accept {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Accept::from_headers(
            &parts.headers,
            Arc::clone(&state.transcoders),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::media_type::json_media_type;
    use crate::media::transcoder::JsonTranscoder;
    use crate::utils::errors::ErrorKind;
    use axum::http::HeaderValue;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Ping {
        n: u32,
    }

    fn registry() -> Arc<TranscoderRegistry> {
        Arc::new(
            TranscoderRegistry::builder()
                .wire::<Ping>(JsonTranscoder::new(json_media_type("WalkTrack.Ping", 1)))
                .unwrap()
                .wire::<Ping>(JsonTranscoder::new(json_media_type("WalkTrack.Ping", 2)))
                .unwrap()
                .build(),
        )
    }

    fn headers(accept: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(value) = accept {
            headers.insert(header::ACCEPT, HeaderValue::from_str(value).unwrap());
        }
        headers
    }

    #[test]
    fn test_first_matching_accept_wins() {
        let accept = Accept::from_headers(
            &headers(Some(
                "application/json; structure=WalkTrack.Other; version=1, \
                 application/json; structure=WalkTrack.Ping; version=2",
            )),
            registry(),
        );
        let response = accept.ok(&Ping { n: 1 }).unwrap();
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json; structure=WalkTrack.Ping; version=2"
        );
    }

    #[test]
    fn test_absent_accept_uses_default_representation() {
        let accept = Accept::from_headers(&headers(None), registry());
        let response = accept.ok(&Ping { n: 1 }).unwrap();
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json; structure=WalkTrack.Ping; version=1"
        );
    }

    #[test]
    fn test_wildcard_accept_uses_default_representation() {
        let accept = Accept::from_headers(&headers(Some("*/*")), registry());
        let response = accept.ok(&Ping { n: 7 }).unwrap();
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json; structure=WalkTrack.Ping; version=1"
        );
    }

    #[test]
    fn test_unstructured_accept_is_not_acceptable() {
        // A concrete preference this service can never produce is a refusal,
        // not an invitation to pick the default.
        let accept = Accept::from_headers(&headers(Some("text/html")), registry());
        let err = accept.ok(&Ping { n: 1 }).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotAcceptable);
    }

    #[test]
    fn test_unstructured_accept_with_wildcard_uses_default() {
        let accept = Accept::from_headers(&headers(Some("text/html, */*")), registry());
        let response = accept.ok(&Ping { n: 1 }).unwrap();
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json; structure=WalkTrack.Ping; version=1"
        );
    }

    #[test]
    fn test_no_match_is_not_acceptable() {
        let accept = Accept::from_headers(
            &headers(Some("application/json; structure=WalkTrack.Other; version=9")),
            registry(),
        );
        let err = accept.ok(&Ping { n: 1 }).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotAcceptable);
    }
}
