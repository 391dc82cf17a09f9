//! Constantes del motor de hashing.
//!
//! Estos valores participan en el input de cada digest. Cambiarlos invalida
//! de forma determinista todos los fingerprints (y por tanto todas las
//! entradas persistidas) aunque los valores hasheados no cambien.

/// Versión del formato de digest. Es el primer byte de todo input hasheado.
/// Incrementar ante cualquier cambio de tags, framing o canonicalización.
pub const HASH_FORMAT_VERSION: u8 = 1;

/// Semilla del fingerprint centinela que sustituye a una referencia cíclica.
pub const CYCLE_SENTINEL_SEED: &[u8] = b"memoflow/cycle-sentinel";

/// Longitud del prefijo hex usado en logs y en `Fingerprint::short`.
pub const SHORT_FINGERPRINT_LEN: usize = 12;
