use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Result, StoreError};

/// Converts a managed value to and from its storage-ready text payload.
///
/// `deserialize(serialize(v))` must reproduce `v` for every representable
/// value. Injected into [`crate::SnapshotLog`]; [`JsonSerializer`] is the
/// default stand-in.
pub trait Serializer<T>: Send + Sync {
    fn serialize(&self, value: &T) -> Result<String>;
    fn deserialize(&self, text: &str) -> Result<T>;
}

/// serde_json-backed serializer for any serde-representable type.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl<T> Serializer<T> for JsonSerializer
where
    T: Serialize + DeserializeOwned,
{
    fn serialize(&self, value: &T) -> Result<String> {
        serde_json::to_string_pretty(value).map_err(|e| StoreError::Encode(e.to_string()))
    }

    fn deserialize(&self, text: &str) -> Result<T> {
        serde_json::from_str(text).map_err(|e| StoreError::Decode(e.to_string()))
    }
}
