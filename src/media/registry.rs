//! Keyed transcoder registry.
//!
//! The registry maps `(canonical media type, Rust type)` pairs to transcoders,
//! one map per role (wire vs. persist). It is built once at startup through
//! [`TranscoderRegistryBuilder`]; registering the same pair twice is a startup
//! error rather than silent shadowing, so a media type uniquely selects at
//! most one transcoder per role and type.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use crate::media::media_type::WalkTrackMediaType;
use crate::media::transcoder::Transcoder;
use crate::utils::errors::AppError;

/// Wire transcoders shape HTTP bodies; persist transcoders shape stored
/// documents. The same structure name may have different representations per
/// role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranscoderRole {
    Wire,
    Persist,
}

trait ErasedTranscoder: Send + Sync {
    fn encode_any(&self, value: &dyn Any, out: &mut Vec<u8>) -> Result<(), AppError>;
    fn decode_any(&self, bytes: &[u8]) -> Result<Box<dyn Any + Send>, AppError>;
    fn media_type(&self) -> &WalkTrackMediaType;
}

struct TypedSlot<T> {
    inner: Arc<dyn Transcoder<T>>,
}

impl<T: Send + 'static> ErasedTranscoder for TypedSlot<T> {
    fn encode_any(&self, value: &dyn Any, out: &mut Vec<u8>) -> Result<(), AppError> {
        let value = value
            .downcast_ref::<T>()
            .ok_or_else(|| AppError::internal(anyhow::anyhow!("transcoder type mismatch")))?;
        self.inner.encode(value, out)
    }

    fn decode_any(&self, bytes: &[u8]) -> Result<Box<dyn Any + Send>, AppError> {
        Ok(Box::new(self.inner.decode(bytes)?))
    }

    fn media_type(&self) -> &WalkTrackMediaType {
        self.inner.media_type()
    }
}

type Key = (String, TypeId);

#[derive(Default)]
pub struct TranscoderRegistryBuilder {
    wire: HashMap<Key, Arc<dyn ErasedTranscoder>>,
    persist: HashMap<Key, Arc<dyn ErasedTranscoder>>,
    // Registration order per type, used to pick a default encoder when the
    // client sends no Accept header.
    wire_order: HashMap<TypeId, Vec<WalkTrackMediaType>>,
}

impl TranscoderRegistryBuilder {
    pub fn wire<T>(mut self, transcoder: impl Transcoder<T> + 'static) -> Result<Self, AppError>
    where
        T: Send + 'static,
    {
        let slot: Arc<dyn ErasedTranscoder> = Arc::new(TypedSlot::<T> {
            inner: Arc::new(transcoder),
        });
        let key = (slot.media_type().canonical(), TypeId::of::<T>());
        if self.wire.contains_key(&key) {
            return Err(AppError::internal(anyhow::anyhow!(
                "duplicate wire transcoder registered for '{}'",
                slot.media_type()
            )));
        }
        self.wire_order
            .entry(TypeId::of::<T>())
            .or_default()
            .push(slot.media_type().clone());
        self.wire.insert(key, slot);
        Ok(self)
    }

    pub fn persist<T>(
        mut self,
        transcoder: impl Transcoder<T> + 'static,
    ) -> Result<Self, AppError>
    where
        T: Send + 'static,
    {
        let slot: Arc<dyn ErasedTranscoder> = Arc::new(TypedSlot::<T> {
            inner: Arc::new(transcoder),
        });
        let key = (slot.media_type().canonical(), TypeId::of::<T>());
        if self.persist.contains_key(&key) {
            return Err(AppError::internal(anyhow::anyhow!(
                "duplicate persist transcoder registered for '{}'",
                slot.media_type()
            )));
        }
        self.persist.insert(key, slot);
        Ok(self)
    }

    pub fn build(self) -> TranscoderRegistry {
        TranscoderRegistry {
            wire: self.wire,
            persist: self.persist,
            wire_order: self.wire_order,
        }
    }
}

pub struct TranscoderRegistry {
    wire: HashMap<Key, Arc<dyn ErasedTranscoder>>,
    persist: HashMap<Key, Arc<dyn ErasedTranscoder>>,
    wire_order: HashMap<TypeId, Vec<WalkTrackMediaType>>,
}

impl TranscoderRegistry {
    pub fn builder() -> TranscoderRegistryBuilder {
        TranscoderRegistryBuilder::default()
    }

    fn map(&self, role: TranscoderRole) -> &HashMap<Key, Arc<dyn ErasedTranscoder>> {
        match role {
            TranscoderRole::Wire => &self.wire,
            TranscoderRole::Persist => &self.persist,
        }
    }

    fn lookup<T: 'static>(
        &self,
        media_type: &WalkTrackMediaType,
        role: TranscoderRole,
    ) -> Result<&Arc<dyn ErasedTranscoder>, AppError> {
        self.map(role)
            .get(&(media_type.canonical(), TypeId::of::<T>()))
            .ok_or_else(|| {
                AppError::not_supported(format!(
                    "no {role:?} transcoder registered for '{media_type}'"
                ))
            })
    }

    pub fn decode<T: Send + 'static>(
        &self,
        media_type: &WalkTrackMediaType,
        bytes: &[u8],
        role: TranscoderRole,
    ) -> Result<T, AppError> {
        let slot = self.lookup::<T>(media_type, role)?;
        let value = slot.decode_any(bytes)?;
        value
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| AppError::internal(anyhow::anyhow!("decoded value has unexpected type")))
    }

    pub fn encode<T: Send + 'static>(
        &self,
        media_type: &WalkTrackMediaType,
        value: &T,
        role: TranscoderRole,
    ) -> Result<Vec<u8>, AppError> {
        let slot = self.lookup::<T>(media_type, role)?;
        let mut out = Vec::new();
        slot.encode_any(value, &mut out)?;
        Ok(out)
    }

    pub fn can_encode<T: 'static>(
        &self,
        media_type: &WalkTrackMediaType,
        role: TranscoderRole,
    ) -> bool {
        self.map(role)
            .contains_key(&(media_type.canonical(), TypeId::of::<T>()))
    }

    /// First wire media type registered for `T`, used when a request declares
    /// no `Accept` preference.
    pub fn default_wire_media_type<T: 'static>(&self) -> Option<&WalkTrackMediaType> {
        self.wire_order
            .get(&TypeId::of::<T>())
            .and_then(|order| order.first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::media_type::json_media_type;
    use crate::media::transcoder::JsonTranscoder;
    use crate::utils::errors::ErrorKind;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Walk {
        distance: f64,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Rest {
        minutes: u32,
    }

    fn registry() -> TranscoderRegistry {
        TranscoderRegistry::builder()
            .wire::<Walk>(JsonTranscoder::new(json_media_type("WalkTrack.Walk", 1)))
            .unwrap()
            .wire::<Rest>(JsonTranscoder::new(json_media_type("WalkTrack.Rest", 1)))
            .unwrap()
            .persist::<Walk>(JsonTranscoder::new(json_media_type(
                "WalkTrack.SecureWalk",
                1,
            )))
            .unwrap()
            .build()
    }

    #[test]
    fn test_resolves_unique_transcoder_per_pair() {
        let registry = registry();
        let mt = json_media_type("WalkTrack.Walk", 1);

        let bytes = registry
            .encode(&mt, &Walk { distance: 2.0 }, TranscoderRole::Wire)
            .unwrap();
        let decoded: Walk = registry.decode(&mt, &bytes, TranscoderRole::Wire).unwrap();
        assert_eq!(decoded, Walk { distance: 2.0 });
    }

    #[test]
    fn test_unregistered_pair_is_not_supported() {
        // Distinct from a malformed payload: the media type is well formed,
        // there is just nothing registered for it.
        let registry = registry();
        let unknown = json_media_type("WalkTrack.Nothing", 1);
        let err = registry
            .decode::<Walk>(&unknown, b"{}", TranscoderRole::Wire)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotSupported);
        assert_ne!(err.kind, ErrorKind::Unparsable);
    }

    #[test]
    fn test_wire_and_persist_registries_are_disjoint() {
        let registry = registry();
        let persist_mt = json_media_type("WalkTrack.SecureWalk", 1);

        assert!(registry.can_encode::<Walk>(&persist_mt, TranscoderRole::Persist));
        assert!(!registry.can_encode::<Walk>(&persist_mt, TranscoderRole::Wire));
    }

    #[test]
    fn test_same_media_type_different_types_coexist() {
        // Two resource types can claim the same media type string without
        // colliding because the key includes the Rust type.
        let shared = json_media_type("WalkTrack.Shared", 1);
        let registry = TranscoderRegistry::builder()
            .wire::<Walk>(JsonTranscoder::new(shared.clone()))
            .unwrap()
            .wire::<Rest>(JsonTranscoder::new(shared.clone()))
            .unwrap()
            .build();

        assert!(registry.can_encode::<Walk>(&shared, TranscoderRole::Wire));
        assert!(registry.can_encode::<Rest>(&shared, TranscoderRole::Wire));
    }

    #[test]
    fn test_duplicate_registration_fails_fast() {
        let mt = json_media_type("WalkTrack.Walk", 1);
        let result = TranscoderRegistry::builder()
            .wire::<Walk>(JsonTranscoder::new(mt.clone()))
            .unwrap()
            .wire::<Walk>(JsonTranscoder::new(mt));
        assert!(result.is_err());
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = registry();
        let mt: WalkTrackMediaType = "Application/Json; Structure=WALKTRACK.Walk; Version=1"
            .parse()
            .unwrap();
        assert!(registry.can_encode::<Walk>(&mt, TranscoderRole::Wire));
    }

    #[test]
    fn test_default_wire_media_type_is_first_registered() {
        let registry = registry();
        assert_eq!(
            registry.default_wire_media_type::<Walk>(),
            Some(&json_media_type("WalkTrack.Walk", 1))
        );
        assert!(registry.default_wire_media_type::<Vec<Walk>>().is_none());
    }
}
