//! Application error type and the single error-to-status mapping.
//!
//! Every failure surfaced to a client goes through [`AppError`], which pairs
//! an error kind with an internal detail message. The response body is always
//! the `WalkTrack.ErrorResponse` structure (`{"statusCode": n, "message": s}`)
//! with a fixed public message per kind; internal detail only reaches the
//! logs.

use anyhow::Error;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

pub const ERROR_MEDIA_TYPE: &str =
    "application/json; structure=WalkTrack.ErrorResponse; version=1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingBody,
    MissingQueryString,
    MissingRouteParameter,
    InvalidRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Unparsable,
    NotSupported,
    NotAcceptable,
    Internal,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::MissingBody
            | ErrorKind::MissingQueryString
            | ErrorKind::MissingRouteParameter
            | ErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Unparsable | ErrorKind::NotSupported => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ErrorKind::NotAcceptable => StatusCode::NOT_ACCEPTABLE,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Fixed per kind so internal detail never leaks.
    pub fn message(self) -> &'static str {
        match self {
            ErrorKind::MissingBody => "Request body required",
            ErrorKind::MissingQueryString => "Query string required",
            ErrorKind::MissingRouteParameter => "Route parameter required",
            ErrorKind::InvalidRequest => "Invalid request",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "Not found",
            ErrorKind::Unparsable | ErrorKind::NotSupported => "Unsupported payload",
            ErrorKind::NotAcceptable => "Not acceptable",
            ErrorKind::Internal => "Unknown error",
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub kind: ErrorKind,
    pub detail: Error,
}

impl AppError {
    pub fn new<E>(kind: ErrorKind, detail: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn missing_body() -> Self {
        Self::new(ErrorKind::MissingBody, anyhow::anyhow!("missing body"))
    }

    pub fn missing_query_string() -> Self {
        Self::new(
            ErrorKind::MissingQueryString,
            anyhow::anyhow!("missing query string"),
        )
    }

    pub fn missing_route_parameter() -> Self {
        Self::new(
            ErrorKind::MissingRouteParameter,
            anyhow::anyhow!("missing route parameter"),
        )
    }

    pub fn invalid_request(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRequest, anyhow::anyhow!(detail.into()))
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, anyhow::anyhow!(detail.into()))
    }

    pub fn forbidden(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, anyhow::anyhow!(detail.into()))
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, anyhow::anyhow!(detail.into()))
    }

    pub fn unparsable(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unparsable, anyhow::anyhow!(detail.into()))
    }

    /// No transcoder registered for the media type, as opposed to
    /// [`Self::unparsable`] where the payload or header itself is malformed.
    /// Both answer 415; the kinds stay distinct for logs and tests.
    pub fn not_supported(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotSupported, anyhow::anyhow!(detail.into()))
    }

    pub fn not_acceptable(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotAcceptable, anyhow::anyhow!(detail.into()))
    }

    pub fn internal<E>(detail: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Internal, detail)
    }
}

/// Body shape shared by every error response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status_code: u16,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.kind.status();

        if status.is_server_error() {
            error!(detail = %self.detail, "Unhandled internal error");
        }

        let body = ErrorResponse {
            status_code: status.as_u16(),
            message: self.kind.message().to_string(),
        };

        // The error structure carries its own registered media type, same
        // negotiation scheme as ordinary payloads.
        let payload = serde_json::to_vec(&body).unwrap_or_default();

        (
            status,
            [(header::CONTENT_TYPE, ERROR_MEDIA_TYPE)],
            payload,
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ErrorKind::MissingBody.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorKind::MissingQueryString.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorKind::MissingRouteParameter.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ErrorKind::InvalidRequest.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorKind::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorKind::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorKind::Unparsable.status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            ErrorKind::NotSupported.status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            ErrorKind::Internal.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages_are_fixed_per_kind() {
        assert_eq!(ErrorKind::Forbidden.message(), "Forbidden");
        assert_eq!(ErrorKind::Unauthorized.message(), "Unauthorized");
        assert_eq!(ErrorKind::NotFound.message(), "Not found");
        assert_eq!(ErrorKind::Unparsable.message(), "Unsupported payload");
        assert_eq!(ErrorKind::NotSupported.message(), "Unsupported payload");
        assert_eq!(ErrorKind::Internal.message(), "Unknown error");
    }

    #[test]
    fn test_internal_detail_not_in_public_message() {
        let err = AppError::internal(anyhow::anyhow!("database password leaked"));
        assert_eq!(err.kind.message(), "Unknown error");
    }
}
