//! Middleware and extractors for cross-cutting request concerns.
//!
//! - [`auth`]: bearer token parsing and [`auth::AuthenticationContext`]
//!   attachment (fail-open; runs on every request)
//! - [`authorize`]: the permission decision table, [`authorize::Authorizer`]
//!   implementations and the [`crate::require_permission!`] extractors
//!
//! Flow: request → context attachment → router → permission extractor →
//! handler. Only the permission stage can reject.

pub mod auth;
pub mod authorize;
