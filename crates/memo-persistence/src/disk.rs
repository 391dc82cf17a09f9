//! `DiskTier`: un fichero por entrada bajo `root/<hex[0..2]>/<hex>.bin`.
//!
//! Escritura: fichero temporal hermano + `rename` (la entrada se reemplaza
//! completa, nunca queda a medias). Fichero ausente = `Ok(None)`.
//! Errores transitorios de IO se reintentan con backoff (15/30/45 ms).

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use memo_core::{CacheError, Fingerprint, PersistentTier};
use uuid::Uuid;

use crate::config::CacheConfig;
use crate::error::PersistenceError;

const MAX_RETRIES: u32 = 3;
const BACKOFF_STEP_MS: u64 = 15;

#[derive(Debug, Clone)]
pub struct DiskTier {
    root: PathBuf,
}

impl DiskTier {
    /// Abre (creando si hace falta) el directorio raíz.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let root = root.into();
        if root.exists() && !root.is_dir() {
            return Err(PersistenceError::NotADirectory(root));
        }
        with_retry(|| fs::create_dir_all(&root).map_err(PersistenceError::from))?;
        debug!("disk_tier:open root={}", root.display());
        Ok(Self { root })
    }

    pub fn from_config(cfg: &CacheConfig) -> Result<Self, PersistenceError> {
        Self::open(&cfg.root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &Fingerprint) -> PathBuf {
        let hex = key.to_hex();
        self.root.join(&hex[..2]).join(format!("{hex}.bin"))
    }

    fn read_entry(&self, key: &Fingerprint) -> Result<Option<Vec<u8>>, PersistenceError> {
        let path = self.path_for(key);
        with_retry(|| match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        })
    }

    fn write_entry(&self, key: &Fingerprint, bytes: &[u8]) -> Result<(), PersistenceError> {
        let path = self.path_for(key);
        let Some(dir) = path.parent() else {
            return Err(PersistenceError::NotADirectory(path));
        };
        with_retry(|| {
            fs::create_dir_all(dir)?;
            let tmp = dir.join(format!(".{}.tmp", Uuid::new_v4()));
            let written = fs::File::create(&tmp).and_then(|mut f| {
                                                    f.write_all(bytes)?;
                                                    f.sync_all()
                                                })
                                                .and_then(|_| fs::rename(&tmp, &path));
            if written.is_err() {
                let _ = fs::remove_file(&tmp);
            }
            written.map_err(PersistenceError::from)
        })
    }
}

impl PersistentTier for DiskTier {
    fn load(&self, key: &Fingerprint) -> Result<Option<Vec<u8>>, CacheError> {
        debug!("disk_tier:load:start key={}", key.short());
        let out = self.read_entry(key)?;
        debug!("disk_tier:load:done key={} found={}", key.short(), out.is_some());
        Ok(out)
    }

    fn store(&self, key: &Fingerprint, bytes: &[u8]) -> Result<(), CacheError> {
        debug!("disk_tier:store:start key={} bytes={}", key.short(), bytes.len());
        self.write_entry(key, bytes)?;
        debug!("disk_tier:store:done key={}", key.short());
        Ok(())
    }

    /// Cada `store` ya hace `sync_all` + `rename`; aquí sólo se valida que
    /// la raíz siga accesible.
    fn flush(&self) -> Result<(), CacheError> {
        if self.root.is_dir() {
            Ok(())
        } else {
            Err(PersistenceError::NotADirectory(self.root.clone()).into())
        }
    }
}

/// Reintenta `f` ante errores transitorios (hasta 3 veces, backoff lineal).
fn with_retry<F, T>(mut f: F) -> Result<T, PersistenceError>
    where F: FnMut() -> Result<T, PersistenceError>
{
    let mut attempts = 0;
    loop {
        match f() {
            Err(e) if e.is_retryable() && attempts < MAX_RETRIES => {
                let delay_ms = BACKOFF_STEP_MS * ((attempts + 1) as u64);
                warn!("retryable io error (attempt {}): {} -> sleeping {}ms", attempts + 1, e, delay_ms);
                std::thread::sleep(std::time::Duration::from_millis(delay_ms));
                attempts += 1;
            }
            r => return r,
        }
    }
}
