use std::any::Any;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::Fingerprint;

/// Entrada de la cache en memoria. Se reemplaza entera al recomputar;
/// nunca se muta in-place.
#[derive(Clone)]
pub struct CacheEntry {
    pub(crate) value: Arc<dyn Any + Send + Sync>,
    pub populated_at: DateTime<Utc>,
    pub size: usize,
}

impl CacheEntry {
    pub(crate) fn new<T: Send + Sync + 'static>(value: T, size: usize) -> Self {
        Self { value: Arc::new(value),
               populated_at: Utc::now(),
               size }
    }

    pub fn downcast<T: Clone + 'static>(&self) -> Option<T> {
        self.value.downcast_ref::<T>().cloned()
    }
}

impl fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
         .field("populated_at", &self.populated_at)
         .field("size", &self.size)
         .finish_non_exhaustive()
    }
}

/// Metadatos públicos de una entrada.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryInfo {
    pub key: Fingerprint,
    pub populated_at: DateTime<Utc>,
    pub size: usize,
}
