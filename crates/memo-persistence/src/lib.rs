//! memo-persistence
//!
//! Tier persistente en disco para `memo_core::MemoCache`.
//!
//! Módulos:
//! - `disk`: `DiskTier`, un fichero por entrada con escritura atómica.
//! - `config`: carga de configuración desde .env / entorno.
//! - `error`: errores de IO clasificados (transitorios vs permanentes).

pub mod config;
pub mod disk;
pub mod error;

pub use config::{init_dotenv, CacheConfig};
pub use disk::DiskTier;
pub use error::PersistenceError;
