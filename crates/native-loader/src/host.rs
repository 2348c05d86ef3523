//! The host dynamic loader: `dlopen`/`LoadLibraryExW` behind a small trait.

use crate::errors::BoxError;
use libloading::Library;
use std::error::Error as StdError;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Windows `ERROR_MOD_NOT_FOUND`.
const ERROR_MOD_NOT_FOUND: i32 = 126;

#[derive(Debug, Error)]
pub enum HostLoadError {
    /// Nothing by that name on the search path. Recoverable: the caller may fall back.
    #[error("library not found: {source}")]
    NotFound {
        #[source]
        source: BoxError,
    },
    /// The library exists but could not be loaded (wrong arch, corrupt, bad deps).
    #[error("library failed to load: {source}")]
    Failed {
        #[source]
        source: BoxError,
    },
}

impl HostLoadError {
    pub fn not_found(e: impl Into<BoxError>) -> Self {
        HostLoadError::NotFound { source: e.into() }
    }

    pub fn failed(e: impl Into<BoxError>) -> Self {
        HostLoadError::Failed { source: e.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, HostLoadError::NotFound { .. })
    }

    /// The underlying platform error.
    pub fn into_source(self) -> BoxError {
        match self {
            HostLoadError::NotFound { source } | HostLoadError::Failed { source } => source,
        }
    }
}

/// The two operations consumed from the host's dynamic linker.
pub trait HostLoader {
    type Handle;

    /// Load by bare file name, honoring the platform search path.
    fn load_by_name(&self, name: &str) -> Result<Self::Handle, HostLoadError>;

    /// Load from an absolute path.
    fn load_by_path(&self, path: &Path) -> Result<Self::Handle, HostLoadError>;
}

impl<H: HostLoader + ?Sized> HostLoader for &H {
    type Handle = H::Handle;

    fn load_by_name(&self, name: &str) -> Result<Self::Handle, HostLoadError> {
        (**self).load_by_name(name)
    }

    fn load_by_path(&self, path: &Path) -> Result<Self::Handle, HostLoadError> {
        (**self).load_by_path(path)
    }
}

/// `libloading`-backed host loader.
///
/// Loaded libraries stay loaded for the rest of the process; the handle is a
/// leaked `&'static Library`, so symbols can be looked up at any time and the
/// module is never unmapped under code that still runs in it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LibloadingHost;

impl HostLoader for LibloadingHost {
    type Handle = &'static Library;

    fn load_by_name(&self, name: &str) -> Result<Self::Handle, HostLoadError> {
        let lib = unsafe { Library::new(name) }.map_err(classify)?;
        Ok(Box::leak(Box::new(lib)))
    }

    fn load_by_path(&self, path: &Path) -> Result<Self::Handle, HostLoadError> {
        let lib = unsafe { Library::new(path) }.map_err(classify)?;
        Ok(Box::leak(Box::new(lib)))
    }
}

fn classify(err: libloading::Error) -> HostLoadError {
    if is_not_found(&err) {
        HostLoadError::not_found(err)
    } else {
        HostLoadError::failed(err)
    }
}

fn is_not_found(err: &libloading::Error) -> bool {
    let mut cur: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = cur {
        if let Some(io) = e.downcast_ref::<io::Error>() {
            if cfg!(windows) && io.raw_os_error() == Some(ERROR_MOD_NOT_FOUND) {
                return true;
            }
            if io.kind() == io::ErrorKind::NotFound {
                return true;
            }
        }
        match message_verdict(&e.to_string()) {
            Some(found) => return found,
            None => cur = e.source(),
        }
    }
    false
}

/// Read a dynamic-linker message. `Some(true)` means missing, `Some(false)` means
/// the file was found but rejected, `None` means the message says neither.
///
/// dyld lists every path it tried, so a rejected candidate wins over the
/// "(no such file)" entries for the others.
fn message_verdict(msg: &str) -> Option<bool> {
    const REJECTED: &[&str] = &[
        "incompatible architecture",
        "not a mach-o file",
        "code signature",
        "wrong elf class",
        "invalid elf header",
        "file too short",
        "not a valid win32 application",
    ];
    const MISSING: &[&str] = &[
        "cannot open shared object file",
        "no such file",
        "image not found",
        "module could not be found",
    ];

    let msg = msg.to_ascii_lowercase();
    if REJECTED.iter().any(|m| msg.contains(m)) {
        Some(false)
    } else if MISSING.iter().any(|m| msg.contains(m)) {
        Some(true)
    } else {
        None
    }
}
