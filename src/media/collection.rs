//! Collection wrapper around a single-resource transcoder.
//!
//! Collections go over the wire as `{"count": n, "data": [...]}`. Decoding
//! reads the `data` array once, then decodes items lazily as the returned
//! iterator is driven; null entries are skipped. Iteration order matches
//! array order.

use std::sync::Arc;

use serde_json::Value;

use crate::media::media_type::WalkTrackMediaType;
use crate::media::transcoder::Transcoder;
use crate::utils::errors::AppError;

pub struct CollectionTranscoder<T> {
    inner: Arc<dyn Transcoder<T>>,
}

impl<T> CollectionTranscoder<T> {
    pub fn new(inner: Arc<dyn Transcoder<T>>) -> Self {
        Self { inner }
    }

    /// Decodes the envelope eagerly, the items lazily. The iterator is finite
    /// and not restartable.
    pub fn decode_iter(
        &self,
        bytes: &[u8],
    ) -> Result<impl Iterator<Item = Result<T, AppError>> + '_, AppError> {
        let envelope: Value = serde_json::from_slice(bytes)
            .map_err(|e| AppError::unparsable(format!("collection envelope: {e}")))?;

        let Some(data) = envelope.get("data").and_then(Value::as_array) else {
            return Err(AppError::unparsable("collection envelope missing 'data'"));
        };

        let items: Vec<Value> = data.clone();
        let inner = Arc::clone(&self.inner);

        Ok(items
            .into_iter()
            .filter(|item| !item.is_null())
            .map(move |item| {
                let bytes = serde_json::to_vec(&item).map_err(AppError::internal)?;
                inner.decode(&bytes)
            }))
    }
}

impl<T> Transcoder<Vec<T>> for CollectionTranscoder<T>
where
    T: Send + Sync,
{
    fn media_type(&self) -> &WalkTrackMediaType {
        self.inner.media_type()
    }

    fn encode(&self, values: &Vec<T>, out: &mut Vec<u8>) -> Result<(), AppError> {
        let mut encoded_items = Vec::with_capacity(values.len());
        for value in values {
            let mut buf = Vec::new();
            self.inner.encode(value, &mut buf)?;
            let item: Value = serde_json::from_slice(&buf).map_err(AppError::internal)?;
            encoded_items.push(item);
        }

        let envelope = serde_json::json!({
            "count": encoded_items.len(),
            "data": encoded_items,
        });

        serde_json::to_writer(out, &envelope).map_err(AppError::internal)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<T>, AppError> {
        self.decode_iter(bytes)?.collect()
    }
}
