//! Structured media types and the transcoder registry.
//!
//! Payload shapes are identified by a versioned media type
//! (`application/json; structure=X; version=N`) rather than bare MIME types.
//! The registry resolves a media type plus a Rust type to a transcoder, for
//! both wire payloads (HTTP bodies) and persisted documents.
//!
//! - [`media_type`]: the [`media_type::WalkTrackMediaType`] value and parser
//! - [`transcoder`]: the transcoder contract and the JSON implementation
//! - [`collection`]: `{count, data}` envelopes around item transcoders
//! - [`registry`]: keyed wire/persist registries built at startup
//! - [`negotiate`]: axum extractors for negotiated request/response bodies

pub mod collection;
pub mod media_type;
pub mod negotiate;
pub mod registry;
pub mod transcoder;

pub use collection::CollectionTranscoder;
pub use media_type::{json_media_type, WalkTrackMediaType};
pub use negotiate::{Accept, Negotiated};
pub use registry::{TranscoderRegistry, TranscoderRole};
pub use transcoder::{JsonTranscoder, Transcoder};
