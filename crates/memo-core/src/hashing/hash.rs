//! Hash helpers – abstracción sobre blake3 para que el resto del core nunca
//! escriba bytes "sueltos": todo input lleva versión de formato, tag de tipo
//! y framing de longitud, de modo que dos secuencias distintas de campos no
//! puedan concatenarse al mismo stream.

use blake3::Hasher;

use crate::constants::HASH_FORMAT_VERSION;
use crate::model::Fingerprint;

/// Acumulador de input para un único fingerprint.
pub struct DigestWriter {
    inner: Hasher,
}

impl DigestWriter {
    /// Abre un digest para un valor del tipo `tag`.
    pub fn new(tag: u8) -> Self {
        let mut inner = Hasher::new();
        inner.update(&[HASH_FORMAT_VERSION, tag]);
        Self { inner }
    }

    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.inner.update(&[v]);
        self
    }

    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.inner.update(&v.to_le_bytes());
        self
    }

    pub fn u64(&mut self, v: u64) -> &mut Self {
        self.inner.update(&v.to_le_bytes());
        self
    }

    /// Cantidad de elementos (siempre 8 bytes, independiente de la plataforma).
    pub fn count(&mut self, n: usize) -> &mut Self {
        self.u64(n as u64)
    }

    /// Bytes con prefijo de longitud.
    pub fn bytes(&mut self, b: &[u8]) -> &mut Self {
        self.count(b.len());
        self.inner.update(b);
        self
    }

    pub fn str(&mut self, s: &str) -> &mut Self {
        self.bytes(s.as_bytes())
    }

    /// Entero con codificación mínima en complemento a dos.
    pub fn int(&mut self, v: i128) -> &mut Self {
        let encoded = minimal_int_bytes(v);
        self.bytes(&encoded)
    }

    /// Fingerprint hijo (tamaño fijo, sin prefijo).
    pub fn fingerprint(&mut self, fp: &Fingerprint) -> &mut Self {
        self.inner.update(fp.as_bytes());
        self
    }

    pub fn finish(&self) -> Fingerprint {
        Fingerprint::from_bytes(*self.inner.finalize().as_bytes())
    }
}

/// Codificación big-endian mínima con signo: se eliminan los bytes de
/// extensión de signo redundantes (`0x00` delante de un byte con bit alto a
/// 0, `0xff` delante de uno con bit alto a 1). `127 -> [7f]`,
/// `128 -> [00 80]`, `-1 -> [ff]`, `-129 -> [ff 7f]`.
pub fn minimal_int_bytes(v: i128) -> Vec<u8> {
    let raw = v.to_be_bytes();
    let mut start = 0;
    while start < raw.len() - 1 {
        let (cur, next) = (raw[start], raw[start + 1]);
        let redundant = (cur == 0x00 && next & 0x80 == 0) || (cur == 0xff && next & 0x80 != 0);
        if !redundant {
            break;
        }
        start += 1;
    }
    raw[start..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_encoding_boundaries() {
        assert_eq!(minimal_int_bytes(0), vec![0x00]);
        assert_eq!(minimal_int_bytes(127), vec![0x7f]);
        assert_eq!(minimal_int_bytes(128), vec![0x00, 0x80]);
        assert_eq!(minimal_int_bytes(-1), vec![0xff]);
        assert_eq!(minimal_int_bytes(-128), vec![0x80]);
        assert_eq!(minimal_int_bytes(-129), vec![0xff, 0x7f]);
        assert_eq!(minimal_int_bytes(i128::MIN).len(), 16);
    }

    #[test]
    fn framing_separates_adjacent_fields() {
        let a = DigestWriter::new(1).str("ab").str("c").finish();
        let b = DigestWriter::new(1).str("a").str("bc").finish();
        assert_ne!(a, b);
    }
}
