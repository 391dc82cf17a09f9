//! memoflow
//!
//! Librería de entrada para memoizar computaciones por contenido:
//! - Re-exporta el hasher y la cache de `memo_core`.
//! - Monta la cache con el tier en disco de `memo_persistence` según
//!   `config::CONFIG` (o una `CacheConfig` explícita).

pub mod config;
pub mod errors;

use log::debug;
pub use memo_core::{hash, BinOp, CacheError, CallableBuilder, Codec, FnCodec, Fingerprint, Heap, InMemoryTier, Instr, JsonCodec, MemoCache, ObjectId, PersistentTier, Value};
pub use memo_persistence::{CacheConfig, DiskTier};

use errors::AppError;

/// Cache según `cfg`: con `DiskTier` si `persist`, sólo memoria si no.
pub fn open_cache(cfg: &CacheConfig) -> Result<MemoCache, AppError> {
    if !cfg.persist {
        debug!("open_cache: memory only");
        return Ok(MemoCache::new());
    }
    let tier = DiskTier::from_config(cfg)?;
    debug!("open_cache: disk tier at {}", tier.root().display());
    Ok(MemoCache::with_tier(Box::new(tier)))
}

/// `open_cache` con la configuración global cargada del entorno.
pub fn open_default_cache() -> Result<MemoCache, AppError> {
    open_cache(&config::CONFIG.cache)
}
