//! `VisitSet`: identidades en curso dentro de UNA invocación de hashing.

use std::collections::HashSet;

use once_cell::sync::Lazy;

use super::{tags, DigestWriter};
use crate::constants::CYCLE_SENTINEL_SEED;
use crate::heap::ObjectId;
use crate::model::Fingerprint;

static SENTINEL: Lazy<Fingerprint> = Lazy::new(|| DigestWriter::new(tags::CYCLE).bytes(CYCLE_SENTINEL_SEED).finish());

/// Fingerprint fijo que sustituye a una back-reference cíclica.
pub fn sentinel() -> Fingerprint {
    *SENTINEL
}

#[derive(Debug, Default)]
pub struct VisitSet {
    in_flight: HashSet<ObjectId>,
    // métodos ligados: (método, receptor)
    bound: HashSet<(ObjectId, ObjectId)>,
}

impl VisitSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marca `id` como en curso. `false` si ya lo estaba (ciclo).
    pub fn enter(&mut self, id: ObjectId) -> bool {
        self.in_flight.insert(id)
    }

    pub fn leave(&mut self, id: ObjectId) {
        self.in_flight.remove(&id);
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.in_flight.contains(&id)
    }

    /// Igual que `enter` pero para un método ligado. El mismo método sobre
    /// otro receptor no es un ciclo.
    pub fn enter_bound(&mut self, method: ObjectId, receiver: ObjectId) -> bool {
        self.bound.insert((method, receiver))
    }

    pub fn leave_bound(&mut self, method: ObjectId, receiver: ObjectId) {
        self.bound.remove(&(method, receiver));
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty() && self.bound.is_empty()
    }
}
