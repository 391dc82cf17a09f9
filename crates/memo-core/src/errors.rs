//! Errores del core.
//!
//! Ninguno de estos errores llega al llamador de `hash` ni de `memoize`:
//! - `HashError` sólo se registra en log; el hasher sustituye el valor por un
//!   fingerprint de respaldo (identidad o sólo-nombre).
//! - `CacheError` se captura en la frontera de la cache y fuerza recomputo.
//! - `CoreError` sí se devuelve, pero únicamente al construir/mutar el heap o
//!   tablas (uso incorrecto de la API, no fallos de hashing).

use thiserror::Error;

use crate::heap::ObjectId;
use crate::model::ColumnKind;

/// Degradaciones del hasher (no fatales).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HashError {
    #[error("unsupported value of type `{type_name}`, using identity fingerprint")]
    UnsupportedValue { type_name: String },
    #[error("unresolvable reference `{name}`, using name-only fingerprint")]
    UnresolvableReference { name: String },
    #[error("offset unavailable for file `{path}` ({reason}), hashing path only")]
    FileOffset { path: String, reason: String },
}

/// Fallos en la frontera de la cache (codec o tier persistente).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("serialization failure: {0}")]
    Serialization(String),
    #[error("deserialization failure: {0}")]
    Deserialization(String),
    #[error("store io failure: {0}")]
    StoreIo(String),
}

/// Errores de construcción del modelo de valores.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("row has {found} cells but table has {expected} columns")]
    RowWidth { expected: usize, found: usize },
    #[error("column `{column}` has {found} cells, expected {expected}")]
    ColumnLength { column: String, expected: usize, found: usize },
    #[error("column `{column}` is {expected:?} but got a `{found}` cell")]
    CellKind { column: String, expected: ColumnKind, found: &'static str },
    #[error("unknown object {0}")]
    UnknownObject(ObjectId),
    #[error("object {id} is not a {expected}")]
    WrongKind { id: ObjectId, expected: &'static str },
}
