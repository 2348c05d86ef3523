use super::ResourceLookup;
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::{self, Cursor, Read};

/// In-memory resources, usually filled from `include_bytes!`.
///
/// ```
/// use native_loader::{EmbeddedResources, ResourceLookup};
///
/// static GREETER: &[u8] = b"\x7fELF...";
/// let res = EmbeddedResources::new().with_static("libgreeter.so", GREETER);
/// assert!(res.exists("libgreeter.so").unwrap());
/// ```
#[derive(Debug, Clone, Default)]
pub struct EmbeddedResources {
    entries: HashMap<String, Cow<'static, [u8]>>,
}

impl EmbeddedResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, bytes: impl Into<Cow<'static, [u8]>>) {
        self.entries.insert(name.into(), bytes.into());
    }

    pub fn with(mut self, name: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(name, bytes);
        self
    }

    pub fn with_static(mut self, name: impl Into<String>, bytes: &'static [u8]) -> Self {
        self.insert(name, bytes);
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl ResourceLookup for EmbeddedResources {
    fn open(&self, name: &str) -> io::Result<Option<Box<dyn Read + '_>>> {
        Ok(self
            .entries
            .get(name)
            .map(|b| Box::new(Cursor::new(&b[..])) as Box<dyn Read + '_>))
    }
}
