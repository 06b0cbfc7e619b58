//! Path and query extractors that reject through [`AppError`].
//!
//! Axum's built-in `Path` and `Query` answer malformed input with their own
//! plain-text rejection bodies. These wrappers route every rejection through
//! the shared error taxonomy instead, so a bad route segment or query value
//! comes back in the `WalkTrack.ErrorResponse` shape like any other failure.

use axum::extract::rejection::PathRejection;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::utils::errors::AppError;

/// Route parameters deserialized from the matched path.
#[derive(Debug, Clone)]
pub struct Path<T>(pub T);

impl<S, T> FromRequestParts<S> for Path<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match axum::extract::Path::<T>::from_request_parts(parts, state).await {
            Ok(axum::extract::Path(value)) => Ok(Path(value)),
            Err(PathRejection::MissingPathParams(_)) => Err(AppError::missing_route_parameter()),
            Err(rejection) => Err(AppError::invalid_request(rejection.body_text())),
        }
    }
}

/// Query string deserialized into a parameter struct.
#[derive(Debug, Clone)]
pub struct Query<T>(pub T);

impl<S, T> FromRequestParts<S> for Query<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match axum::extract::Query::<T>::from_request_parts(parts, state).await {
            Ok(axum::extract::Query(value)) => Ok(Query(value)),
            Err(rejection) => {
                if parts.uri.query().is_none() {
                    Err(AppError::missing_query_string())
                } else {
                    Err(AppError::invalid_request(rejection.body_text()))
                }
            }
        }
    }
}
