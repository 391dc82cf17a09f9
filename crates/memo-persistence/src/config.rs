//! Configuración del tier en disco desde variables de entorno.
//! Variables: `MEMOFLOW_CACHE_DIR` y `MEMOFLOW_CACHE_PERSIST`.

use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

pub const DEFAULT_CACHE_DIR: &str = ".memoflow/cache";

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv();
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Directorio raíz de las entradas persistidas.
    pub root: PathBuf,
    /// `false` = cache sólo en memoria.
    pub persist: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { root: PathBuf::from(DEFAULT_CACHE_DIR),
               persist: true }
    }
}

impl CacheConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(),
               persist: true }
    }

    pub fn from_env() -> Self {
        Lazy::force(&DOTENV_LOADED);
        let root = env::var("MEMOFLOW_CACHE_DIR").ok()
                                                 .filter(|v| !v.trim().is_empty())
                                                 .map(PathBuf::from)
                                                 .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR));
        let persist = env::var("MEMOFLOW_CACHE_PERSIST").ok().and_then(|v| parse_flag(&v)).unwrap_or(true);
        Self { root, persist }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
