//! Client side of the service-to-service protocol.
//!
//! - [`http`]: transcoder-driven HTTP client
//! - [`token`]: cached service-account tokens
//! - [`authorizer`]: permission checks delegated to a peer service

pub mod authorizer;
pub mod http;
pub mod token;

pub use authorizer::RemoteAuthorizer;
pub use http::WalkTrackClient;
pub use token::ServiceTokenProvider;
