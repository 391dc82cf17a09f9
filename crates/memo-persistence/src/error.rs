//! Errores de persistencia.
//! Mapea errores de IO a variantes semánticas; los transitorios son
//! reintentables.

use std::io;
use std::path::PathBuf;

use memo_core::CacheError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("io error: {0}")]
    Io(#[source] io::Error),
    #[error("cache root `{}` is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("transient io error (retryable): {0}")]
    TransientIo(String),
}

/// `Interrupted`, `WouldBlock` y `TimedOut` son transitorios.
impl From<io::Error> for PersistenceError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => Self::TransientIo(err.to_string()),
            _ => Self::Io(err),
        }
    }
}

impl PersistenceError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientIo(_))
    }
}

impl From<PersistenceError> for CacheError {
    fn from(err: PersistenceError) -> Self {
        CacheError::StoreIo(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_kinds_are_retryable() {
        let e = PersistenceError::from(io::Error::new(io::ErrorKind::TimedOut, "slow disk"));
        assert!(e.is_retryable());
        let e = PersistenceError::from(io::Error::new(io::ErrorKind::PermissionDenied, "nope"));
        assert!(!e.is_retryable());
        assert!(matches!(CacheError::from(e), CacheError::StoreIo(msg) if msg.contains("nope")));
    }
}
