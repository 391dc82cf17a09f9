//! memo-core: hashing de contenido y cache de memoización.
//!
//! - `hashing`: `ContentHasher` sobre el modelo `Value` + `Heap`.
//! - `descriptor`: traza declarada de un callable y su forma canónica.
//! - `environment`: resolución estática de referencias externas.
//! - `cache`: `MemoCache` con tier persistente opcional.
pub mod cache;
pub mod constants;
pub mod descriptor;
pub mod environment;
pub mod errors;
pub mod hashing;
pub mod heap;
pub mod model;

pub use cache::{derive_key, CacheEntry, Codec, EntryInfo, FnCodec, InMemoryTier, JsonCodec, MemoCache, PersistentTier, StatsSnapshot};
pub use descriptor::{BinOp, CallableDescriptor, CmpOp, Instr, Literal, UnOp};
pub use environment::{Binding, EnvEntry, ReferenceEnvironment};
pub use errors::{CacheError, CoreError, HashError};
pub use hashing::{hash, ContentHasher};
pub use heap::{CallableBuilder, Heap, ObjectId};
pub use model::{Column, ColumnKind, FileRef, Fingerprint, Opaque, Table, Value};
