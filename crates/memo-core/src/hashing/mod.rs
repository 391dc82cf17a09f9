//! Módulo de hashing de contenido.

pub mod hash;
pub mod hasher;
pub mod tags;
pub mod visit;

pub use hash::{minimal_int_bytes, DigestWriter};
pub use hasher::{hash, ContentHasher};
pub use visit::{sentinel, VisitSet};
