//! Codecs de serialización para el tier persistente.

use std::marker::PhantomData;

use serde::{de::DeserializeOwned, Serialize};

use crate::errors::CacheError;

/// Par serialize/deserialize para un tipo de valor cacheado. El round-trip
/// debe ser exacto para que una lectura persistida evite el recomputo.
pub trait Codec<T>: Send + Sync {
    fn encode(&self, value: &T) -> Result<Vec<u8>, CacheError>;
    fn decode(&self, bytes: &[u8]) -> Result<T, CacheError>;
}

/// Codec por defecto: JSON vía serde.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl<T> Codec<T> for JsonCodec where T: Serialize + DeserializeOwned
{
    fn encode(&self, value: &T) -> Result<Vec<u8>, CacheError> {
        serde_json::to_vec(value).map_err(|e| CacheError::Serialization(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<T, CacheError> {
        serde_json::from_slice(bytes).map_err(|e| CacheError::Deserialization(e.to_string()))
    }
}

/// Codec a partir de dos funciones (p.ej. `to_string` / `parse`).
pub struct FnCodec<T, E, D> {
    encode: E,
    decode: D,
    _marker: PhantomData<fn() -> T>,
}

impl<T, E, D> FnCodec<T, E, D>
    where E: Fn(&T) -> Result<Vec<u8>, String> + Send + Sync,
          D: Fn(&[u8]) -> Result<T, String> + Send + Sync
{
    pub fn new(encode: E, decode: D) -> Self {
        Self { encode,
               decode,
               _marker: PhantomData }
    }
}

impl<T, E, D> Codec<T> for FnCodec<T, E, D>
    where E: Fn(&T) -> Result<Vec<u8>, String> + Send + Sync,
          D: Fn(&[u8]) -> Result<T, String> + Send + Sync
{
    fn encode(&self, value: &T) -> Result<Vec<u8>, CacheError> {
        (self.encode)(value).map_err(CacheError::Serialization)
    }

    fn decode(&self, bytes: &[u8]) -> Result<T, CacheError> {
        (self.decode)(bytes).map_err(CacheError::Deserialization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_codec_roundtrip_and_error() {
        let codec = JsonCodec;
        let bytes = Codec::<Vec<u32>>::encode(&codec, &vec![1, 2, 3]).unwrap();
        let back: Vec<u32> = codec.decode(&bytes).unwrap();
        assert_eq!(back, vec![1, 2, 3]);
        let err = Codec::<Vec<u32>>::decode(&codec, b"{oops").unwrap_err();
        assert!(matches!(err, CacheError::Deserialization(_)));
    }

    #[test]
    fn fn_codec_maps_errors() {
        let codec = FnCodec::new(|v: &u64| Ok(v.to_string().into_bytes()),
                                 |b: &[u8]| String::from_utf8_lossy(b).parse::<u64>().map_err(|e| e.to_string()));
        assert_eq!(codec.decode(&codec.encode(&42).unwrap()).unwrap(), 42);
        assert!(matches!(codec.decode(b"x"), Err(CacheError::Deserialization(_))));
    }
}
