use super::ResourceLookup;
use std::fs;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use zip::result::ZipError;
use zip::ZipArchive;

/// Resources packed in a zip archive (a jar, an app bundle, a release zip).
///
/// Entries are read fully into memory on `open`, so a reader never observes
/// a half-decompressed entry.
pub struct ZipResources {
    path: PathBuf,
    archive: Mutex<ZipArchive<fs::File>>,
}

impl ZipResources {
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let f = fs::File::open(&path)?;
        let archive = ZipArchive::new(f).map_err(zip_to_io)?;
        Ok(Self {
            path,
            archive: Mutex::new(archive),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ZipArchive<fs::File>> {
        self.archive.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for ZipResources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipResources").field("path", &self.path).finish()
    }
}

impl ResourceLookup for ZipResources {
    fn open(&self, name: &str) -> io::Result<Option<Box<dyn Read + '_>>> {
        let mut archive = self.lock();
        let mut file = match archive.by_name(name) {
            Ok(f) => f,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(zip_to_io(e)),
        };
        if file.is_dir() {
            return Ok(None);
        }
        // The header's size is not trusted; the buffer grows with what is actually read.
        let mut buf = Vec::new();
        io::copy(&mut file, &mut buf)?;
        Ok(Some(Box::new(Cursor::new(buf))))
    }
}

fn zip_to_io(e: ZipError) -> io::Error {
    match e {
        ZipError::Io(e) => e,
        other => io::Error::new(io::ErrorKind::InvalidData, other),
    }
}
