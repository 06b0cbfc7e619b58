//! Transcoder contract and the built-in JSON implementation.
//!
//! A transcoder is a stateless encode/decode routine bound to exactly one
//! [`WalkTrackMediaType`] and one Rust type. Instances are built once at
//! startup and shared behind `Arc` for the process lifetime; they hold no
//! mutable state, so concurrent use needs no locking.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::media::media_type::WalkTrackMediaType;
use crate::utils::errors::AppError;

pub trait Transcoder<T>: Send + Sync {
    /// The single media type this transcoder handles.
    fn media_type(&self) -> &WalkTrackMediaType;

    fn encode(&self, value: &T, out: &mut Vec<u8>) -> Result<(), AppError>;

    fn decode(&self, bytes: &[u8]) -> Result<T, AppError>;

    fn can_handle(&self, media_type: &WalkTrackMediaType) -> bool {
        self.media_type() == media_type
    }
}

/// Serde-backed transcoder for `application/json; structure=...; version=N`
/// payloads. One instance per (resource type, structure, version) triple.
pub struct JsonTranscoder<T> {
    media_type: WalkTrackMediaType,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonTranscoder<T> {
    pub fn new(media_type: WalkTrackMediaType) -> Self {
        Self {
            media_type,
            _marker: PhantomData,
        }
    }
}

impl<T> Transcoder<T> for JsonTranscoder<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    fn media_type(&self) -> &WalkTrackMediaType {
        &self.media_type
    }

    fn encode(&self, value: &T, out: &mut Vec<u8>) -> Result<(), AppError> {
        serde_json::to_writer(out, value).map_err(AppError::internal)
    }

    fn decode(&self, bytes: &[u8]) -> Result<T, AppError> {
        serde_json::from_slice(bytes)
            .map_err(|e| AppError::unparsable(format!("{}: {e}", self.media_type)))
    }
}
