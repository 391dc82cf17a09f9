//! Cache de memoización direccionada por contenido.
//!
//! Flujo de `memoize_with`:
//! 1. `key_for`: fingerprint de (lógica + entorno referenciado + argumentos).
//! 2. Camino rápido en memoria (`DashMap`, sin candado global).
//! 3. Miss: compuerta por clave (`Arc<Mutex<()>>`). Dentro de la compuerta se
//!    revisa memoria otra vez, después el tier persistente y, si nada sirve,
//!    se ejecuta la computación una sola vez.
//! 4. La compuerta se retira del mapa al salir, incluso si la computación
//!    hace panic.
//!
//! Fallos de codec o del tier nunca llegan al llamador: se registran con
//! `warn!` y degradan a recomputo.

pub mod codec;
pub mod entry;
pub mod stats;
pub mod tier;

use std::mem;
use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;
use log::{debug, warn};
use serde::{de::DeserializeOwned, Serialize};

use crate::errors::CacheError;
use crate::hashing::{tags, ContentHasher, DigestWriter};
use crate::heap::{Heap, ObjectId};
use crate::model::{Fingerprint, Value};

pub use codec::{Codec, FnCodec, JsonCodec};
pub use entry::{CacheEntry, EntryInfo};
pub use stats::StatsSnapshot;
pub use tier::{InMemoryTier, PersistentTier};

use stats::CacheStats;

/// Clave de memoización: lógica del callable (descriptor + entorno
/// referenciado) seguida de los argumentos en orden.
pub fn derive_key(heap: &Heap, callable: ObjectId, args: &[Value]) -> Fingerprint {
    let mut hasher = ContentHasher::new(heap);
    let logic = hasher.hash_callable(callable);
    let mut w = DigestWriter::new(tags::MEMO_KEY);
    w.fingerprint(&logic).count(args.len());
    for arg in args {
        let fp = hasher.hash(arg);
        w.fingerprint(&fp);
    }
    w.finish()
}

pub struct MemoCache {
    entries: DashMap<Fingerprint, CacheEntry>,
    in_flight: DashMap<Fingerprint, Arc<Mutex<()>>>,
    tier: Option<Box<dyn PersistentTier>>,
    stats: CacheStats,
}

impl Default for MemoCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoCache {
    /// Cache sólo en memoria.
    pub fn new() -> Self {
        Self { entries: DashMap::new(),
               in_flight: DashMap::new(),
               tier: None,
               stats: CacheStats::default() }
    }

    /// Cache en memoria respaldada por un tier persistente con las mismas claves.
    pub fn with_tier(tier: Box<dyn PersistentTier>) -> Self {
        Self { tier: Some(tier),
               ..Self::new() }
    }

    pub fn has_tier(&self) -> bool {
        self.tier.is_some()
    }

    pub fn key_for(&self, heap: &Heap, callable: ObjectId, args: &[Value]) -> Fingerprint {
        derive_key(heap, callable, args)
    }

    /// `memoize_with` usando `JsonCodec`.
    pub fn memoize<T, F>(&self, heap: &Heap, callable: ObjectId, args: &[Value], compute: F) -> T
        where T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
              F: FnOnce() -> T
    {
        self.memoize_with(&JsonCodec, heap, callable, args, compute)
    }

    /// Devuelve el valor cacheado para (callable, args) o ejecuta `compute`
    /// exactamente una vez por clave, incluso con llamadores concurrentes.
    pub fn memoize_with<T, C, F>(&self, codec: &C, heap: &Heap, callable: ObjectId, args: &[Value], compute: F) -> T
        where T: Clone + Send + Sync + 'static,
              C: Codec<T> + ?Sized,
              F: FnOnce() -> T
    {
        let key = self.key_for(heap, callable, args);
        if let Some(value) = self.lookup::<T>(&key) {
            self.stats.hit();
            debug!("memoize:hit key={}", key.short());
            return value;
        }
        self.stats.miss();

        // `release` se suelta después del candado, también si `compute` hace panic
        let release = GateRelease { in_flight: &self.in_flight,
                                    key,
                                    gate: self.gate_for(key) };
        let _guard = release.gate.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(value) = self.lookup::<T>(&key) {
            // otro llamador pobló la clave mientras esperábamos
            self.stats.hit();
            debug!("memoize:hit_after_wait key={}", key.short());
            value
        } else if let Some(value) = self.load_from_tier(codec, &key) {
            value
        } else {
            self.compute_and_store(codec, &key, compute)
        }
    }

    pub fn contains(&self, key: &Fingerprint) -> bool {
        self.entries.contains_key(key)
    }

    pub fn entry_info(&self, key: &Fingerprint) -> Option<EntryInfo> {
        self.entries.get(key).map(|e| EntryInfo { key: *key,
                                                  populated_at: e.populated_at,
                                                  size: e.size })
    }

    /// Número de entradas en memoria.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Vacía la memoria. El tier persistente no se toca.
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn flush(&self) -> Result<(), CacheError> {
        match &self.tier {
            Some(tier) => tier.flush(),
            None => Ok(()),
        }
    }

    /// Cierra la cache haciendo `flush` del tier.
    pub fn close(self) -> Result<(), CacheError> {
        debug!("memo_cache:close entries={}", self.entries.len());
        self.flush()
    }

    fn gate_for(&self, key: Fingerprint) -> Arc<Mutex<()>> {
        self.in_flight.entry(key).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }

    /// Entrada de otro tipo Rust = miss.
    fn lookup<T: Clone + 'static>(&self, key: &Fingerprint) -> Option<T> {
        let entry = self.entries.get(key)?;
        let value = entry.downcast::<T>();
        if value.is_none() {
            warn!("memoize:type_mismatch key={} expected={}", key.short(), std::any::type_name::<T>());
        }
        value
    }

    fn load_from_tier<T, C>(&self, codec: &C, key: &Fingerprint) -> Option<T>
        where T: Clone + Send + Sync + 'static,
              C: Codec<T> + ?Sized
    {
        let tier = self.tier.as_ref()?;
        let bytes = match tier.load(key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                self.stats.tier_failure();
                warn!("memoize:tier_load_failed key={} err={}", key.short(), e);
                return None;
            }
        };
        match codec.decode(&bytes) {
            Ok(value) => {
                self.stats.tier_hit();
                debug!("memoize:tier_hit key={} bytes={}", key.short(), bytes.len());
                self.entries.insert(*key, CacheEntry::new(value.clone(), bytes.len()));
                Some(value)
            }
            Err(e) => {
                self.stats.tier_failure();
                warn!("memoize:tier_decode_failed key={} err={}", key.short(), e);
                None
            }
        }
    }

    fn compute_and_store<T, C, F>(&self, codec: &C, key: &Fingerprint, compute: F) -> T
        where T: Clone + Send + Sync + 'static,
              C: Codec<T> + ?Sized,
              F: FnOnce() -> T
    {
        debug!("memoize:compute key={}", key.short());
        let value = compute();
        self.stats.computed();
        let mut size = mem::size_of::<T>();
        if let Some(tier) = &self.tier {
            match codec.encode(&value).and_then(|bytes| tier.store(key, &bytes).map(|_| bytes.len())) {
                Ok(n) => size = n,
                Err(e) => {
                    self.stats.tier_failure();
                    warn!("memoize:tier_store_failed key={} err={}", key.short(), e);
                }
            }
        }
        self.entries.insert(*key, CacheEntry::new(value.clone(), size));
        value
    }
}

/// Retira la compuerta de `in_flight` al salir de `memoize_with`, salvo que
/// otro llamador ya la haya reemplazado.
struct GateRelease<'a> {
    in_flight: &'a DashMap<Fingerprint, Arc<Mutex<()>>>,
    key: Fingerprint,
    gate: Arc<Mutex<()>>,
}

impl Drop for GateRelease<'_> {
    fn drop(&mut self) {
        self.in_flight.remove_if(&self.key, |_, g| Arc::ptr_eq(g, &self.gate));
    }
}
