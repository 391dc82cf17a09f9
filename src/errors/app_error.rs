use memo_core::CacheError;
use memo_persistence::PersistenceError;
use thiserror::Error;

/// Errores al montar la cache desde la aplicación.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error de persistencia: {0}")]
    Persistence(#[from] PersistenceError),
    #[error("Error de cache: {0}")]
    Cache(#[from] CacheError),
}
