use super::ResourceLookup;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Resources laid out on disk under a root directory.
#[derive(Debug, Clone)]
pub struct DirResources {
    root: PathBuf,
}

impl DirResources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a `/`-separated resource name below the root; `None` if it would escape it.
    fn path_for(&self, name: &str) -> Option<PathBuf> {
        let mut p = self.root.clone();
        for seg in name.split('/') {
            if seg.is_empty() || seg == "." || seg == ".." || seg.contains(['\\', ':']) {
                return None;
            }
            p.push(seg);
        }
        Some(p)
    }
}

impl ResourceLookup for DirResources {
    fn open(&self, name: &str) -> io::Result<Option<Box<dyn Read + '_>>> {
        let Some(path) = self.path_for(name) else {
            return Ok(None);
        };
        match fs::metadata(&path) {
            Ok(m) if m.is_file() => Ok(Some(Box::new(fs::File::open(&path)?))),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}
