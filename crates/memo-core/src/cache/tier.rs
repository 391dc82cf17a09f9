//! Tier persistente: almacenamiento de bytes indexado por el mismo
//! `Fingerprint` que la cache en memoria.

use std::sync::Arc;

use dashmap::DashMap;

use crate::errors::CacheError;
use crate::model::Fingerprint;

/// Almacenamiento de entradas serializadas.
pub trait PersistentTier: Send + Sync {
    /// `Ok(None)` si la clave no existe.
    fn load(&self, key: &Fingerprint) -> Result<Option<Vec<u8>>, CacheError>;
    /// Reemplaza la entrada completa.
    fn store(&self, key: &Fingerprint, bytes: &[u8]) -> Result<(), CacheError>;
    fn flush(&self) -> Result<(), CacheError> {
        Ok(())
    }
}

/// Tier en memoria. Los clones comparten almacenamiento, lo que permite
/// simular un reinicio (cache nueva, mismo tier).
#[derive(Debug, Clone, Default)]
pub struct InMemoryTier {
    inner: Arc<DashMap<Fingerprint, Vec<u8>>>,
}

impl InMemoryTier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Escribe bytes crudos (tests de entradas corruptas).
    pub fn insert_raw(&self, key: Fingerprint, bytes: Vec<u8>) {
        self.inner.insert(key, bytes);
    }
}

impl PersistentTier for InMemoryTier {
    fn load(&self, key: &Fingerprint) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.inner.get(key).map(|b| b.value().clone()))
    }

    fn store(&self, key: &Fingerprint, bytes: &[u8]) -> Result<(), CacheError> {
        self.inner.insert(*key, bytes.to_vec());
        Ok(())
    }
}
