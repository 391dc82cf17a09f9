use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub(crate) struct CacheStats {
    hits: AtomicU64,
    tier_hits: AtomicU64,
    misses: AtomicU64,
    computations: AtomicU64,
    tier_failures: AtomicU64,
}

impl CacheStats {
    pub(crate) fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn tier_hit(&self) {
        self.tier_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn computed(&self) {
        self.computations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn tier_failure(&self) {
        self.tier_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot { hits: self.hits.load(Ordering::Relaxed),
                        tier_hits: self.tier_hits.load(Ordering::Relaxed),
                        misses: self.misses.load(Ordering::Relaxed),
                        computations: self.computations.load(Ordering::Relaxed),
                        tier_failures: self.tier_failures.load(Ordering::Relaxed) }
    }
}

/// Contadores de la cache desde su construcción.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Aciertos en memoria.
    pub hits: u64,
    /// Aciertos servidos desde el tier persistente.
    pub tier_hits: u64,
    /// Búsquedas que no encontraron nada en memoria.
    pub misses: u64,
    /// Ejecuciones reales de la computación.
    pub computations: u64,
    /// Fallos de codec o de IO del tier (degradados a recomputo).
    pub tier_failures: u64,
}
