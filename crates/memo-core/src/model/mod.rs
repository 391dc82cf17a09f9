//! Modelo de valores hasheables (Value, Fingerprint, Table, FileRef, Opaque).

pub mod file;
pub mod fingerprint;
pub mod opaque;
pub mod table;
pub mod value;

pub use file::FileRef;
pub use fingerprint::{Fingerprint, FingerprintParseError};
pub use opaque::Opaque;
pub use table::{Column, ColumnKind, Table};
pub use value::Value;
