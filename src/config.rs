//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) y expone una estructura inmutable (`CONFIG`).
use memo_persistence::CacheConfig;
use once_cell::sync::Lazy;

/// Configuración global de la aplicación.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Ubicación y activación del tier persistente de la cache.
    pub cache: CacheConfig,
}

/// Instancia global perezosa de configuración, evaluada una sola vez.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(|| AppConfig { cache: CacheConfig::from_env() });
