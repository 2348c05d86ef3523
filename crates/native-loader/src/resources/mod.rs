//! Where bundled copies of native libraries come from.

mod archive;
mod dir;
mod embedded;

pub use archive::ZipResources;
pub use dir::DirResources;
pub use embedded::EmbeddedResources;

use std::io::{self, Read};
use std::sync::Arc;

/// Locates bundled resources by exact `/`-separated name.
pub trait ResourceLookup {
    /// `Ok(None)` when no resource has this name; `Err` when it exists but cannot be read.
    fn open(&self, name: &str) -> io::Result<Option<Box<dyn Read + '_>>>;

    fn exists(&self, name: &str) -> io::Result<bool> {
        Ok(self.open(name)?.is_some())
    }
}

impl<T: ResourceLookup + ?Sized> ResourceLookup for &T {
    fn open(&self, name: &str) -> io::Result<Option<Box<dyn Read + '_>>> {
        (**self).open(name)
    }
}

impl<T: ResourceLookup + ?Sized> ResourceLookup for Box<T> {
    fn open(&self, name: &str) -> io::Result<Option<Box<dyn Read + '_>>> {
        (**self).open(name)
    }
}

impl<T: ResourceLookup + ?Sized> ResourceLookup for Arc<T> {
    fn open(&self, name: &str) -> io::Result<Option<Box<dyn Read + '_>>> {
        (**self).open(name)
    }
}

/// Ordered search over several lookups, first hit wins (a classpath of sorts).
#[derive(Default)]
pub struct ResourceChain {
    entries: Vec<Box<dyn ResourceLookup + Send + Sync>>,
}

impl std::fmt::Debug for ResourceChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceChain")
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl ResourceChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<R: ResourceLookup + Send + Sync + 'static>(&mut self, lookup: R) -> &mut Self {
        self.entries.push(Box::new(lookup));
        self
    }

    pub fn with<R: ResourceLookup + Send + Sync + 'static>(mut self, lookup: R) -> Self {
        self.push(lookup);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResourceLookup for ResourceChain {
    fn open(&self, name: &str) -> io::Result<Option<Box<dyn Read + '_>>> {
        for entry in &self.entries {
            if let Some(r) = entry.open(name)? {
                return Ok(Some(r));
            }
        }
        Ok(None)
    }
}
