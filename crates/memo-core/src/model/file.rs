//! Handle de fichero abierto. Se hashea por ruta resuelta + offset actual,
//! nunca por contenido.

use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Handle compartible. Los clones comparten el mismo cursor.
#[derive(Debug, Clone)]
pub struct FileRef {
    path: PathBuf,
    file: Arc<Mutex<File>>,
}

impl FileRef {
    /// Abre `path` en sólo lectura. La ruta se canoniza cuando es posible.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Ok(Self::from_file(path, file))
    }

    /// Envuelve un `File` ya abierto (p.ej. uno temporal).
    pub fn from_file(path: impl AsRef<Path>, file: File) -> Self {
        let path = path.as_ref();
        let resolved = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        Self { path: resolved,
               file: Arc::new(Mutex::new(file)) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn offset(&self) -> io::Result<u64> {
        self.lock().stream_position()
    }

    pub fn seek(&self, pos: SeekFrom) -> io::Result<u64> {
        self.lock().seek(pos)
    }

    pub fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        self.lock().read(buf)
    }

    /// Lee hasta `\n` inclusive, byte a byte, para que el offset quede
    /// exactamente tras la línea (sin buffer intermedio).
    pub fn read_line(&self) -> io::Result<String> {
        let mut file = self.lock();
        let mut out = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            if file.read(&mut byte)? == 0 {
                break;
            }
            out.push(byte[0]);
            if byte[0] == b'\n' {
                break;
            }
        }
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    fn lock(&self) -> MutexGuard<'_, File> {
        self.file.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
