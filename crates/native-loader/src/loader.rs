use crate::cleanup;
use crate::config::LoaderConfig;
use crate::errors::{LoaderError, Result};
use crate::extract::extract_to_temp;
use crate::host::{HostLoadError, HostLoader, LibloadingHost};
use crate::naming::{LibraryId, Resolution};
use crate::platform::Platform;
use crate::resources::ResourceLookup;
use libloading::Library;
use once_cell::sync::{Lazy, OnceCell};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Where a loaded library came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LoadOrigin {
    /// Found by the host linker under this name.
    System { name: String },
    /// Extracted from bundled resource `resource` to `path`.
    Extracted { resource: String, path: PathBuf },
}

impl fmt::Display for LoadOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadOrigin::System { name } => write!(f, "system library {name}"),
            LoadOrigin::Extracted { resource, path } => {
                write!(f, "bundled resource {resource} (extracted to {})", path.display())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedLibrary<H> {
    identifier: String,
    origin: LoadOrigin,
    handle: H,
}

impl<H> LoadedLibrary<H> {
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn origin(&self) -> &LoadOrigin {
        &self.origin
    }

    pub fn is_extracted(&self) -> bool {
        matches!(self.origin, LoadOrigin::Extracted { .. })
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn into_handle(self) -> H {
        self.handle
    }
}

/// Outcome of the direct attempt: either done, or "not found" and worth a fallback.
#[derive(Debug)]
pub enum DirectLoad<H> {
    Loaded(H),
    NeedsExtraction(HostLoadError),
}

/// Successful loads keyed by identifier.
///
/// Each identifier gets its own cell, so a slow load only blocks callers
/// asking for that same identifier. A failed load leaves its cell empty.
pub struct LoadTable<H> {
    cells: Mutex<HashMap<String, Arc<OnceCell<LoadedLibrary<H>>>>>,
}

impl<H> Default for LoadTable<H> {
    fn default() -> Self {
        Self {
            cells: Mutex::new(HashMap::new()),
        }
    }
}

impl<H> LoadTable<H> {
    pub fn new() -> Self {
        Self::default()
    }

    fn cell(&self, identifier: &str) -> Arc<OnceCell<LoadedLibrary<H>>> {
        let mut cells = self.cells.lock().unwrap_or_else(|e| e.into_inner());
        cells.entry(identifier.to_string()).or_default().clone()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        let cells = self.cells.lock().unwrap_or_else(|e| e.into_inner());
        cells.get(identifier).is_some_and(|c| c.get().is_some())
    }
}

/// Backs [`load_library`] when `NATIVE_LOADER_MEMOIZE` is set.
static PROCESS_TABLE: Lazy<LoadTable<&'static Library>> = Lazy::new(LoadTable::new);

/// Loads native libraries: system search path first, bundled resources second.
pub struct NativeLoader<R, H: HostLoader = LibloadingHost> {
    resources: R,
    host: H,
    platform: Platform,
    config: LoaderConfig,
    loaded: LoadTable<H::Handle>,
}

/// A loader backed by the real dynamic linker.
pub type SystemLoader<R> = NativeLoader<R, LibloadingHost>;

impl<R: ResourceLookup> NativeLoader<R, LibloadingHost> {
    pub fn new(resources: R) -> Self {
        Self::with_host(resources, LibloadingHost)
    }
}

impl<R: ResourceLookup, H: HostLoader> NativeLoader<R, H> {
    pub fn with_host(resources: R, host: H) -> Self {
        Self {
            resources,
            host,
            platform: Platform::current(),
            config: LoaderConfig::default(),
            loaded: LoadTable::new(),
        }
    }

    /// Override the naming platform (the host linker is unaffected).
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn resources(&self) -> &R {
        &self.resources
    }

    /// Names that a load of `identifier` would use, without loading anything.
    pub fn resolve(&self, identifier: &str) -> Result<Resolution> {
        let id = LibraryId::parse(identifier)?;
        Ok(Resolution::new(&id, self.platform))
    }

    /// True once a memoized load of `identifier` has succeeded.
    pub fn is_loaded(&self, identifier: &str) -> bool {
        self.loaded.contains(identifier)
    }

    /// Try the host linker by name; a "not found" miss is not an error here.
    pub fn try_direct(&self, resolution: &Resolution) -> Result<DirectLoad<H::Handle>> {
        match self.host.load_by_name(&resolution.system_name) {
            Ok(handle) => Ok(DirectLoad::Loaded(handle)),
            Err(e) if e.is_not_found() => Ok(DirectLoad::NeedsExtraction(e)),
            Err(e) => Err(LoaderError::Load {
                target: resolution.system_name.clone(),
                source: e.into_source(),
            }),
        }
    }

    fn load_uncached(&self, id: &LibraryId) -> Result<LoadedLibrary<H::Handle>> {
        let resolution = Resolution::new(id, self.platform);

        match self.try_direct(&resolution)? {
            DirectLoad::Loaded(handle) => {
                debug!(library = %id, name = %resolution.system_name, "loaded from system search path");
                Ok(LoadedLibrary {
                    identifier: id.as_str().to_string(),
                    origin: LoadOrigin::System {
                        name: resolution.system_name,
                    },
                    handle,
                })
            }
            DirectLoad::NeedsExtraction(miss) => {
                debug!(library = %id, "not on system search path: {miss}");
                self.load_bundled(id, resolution)
            }
        }
    }

    fn load_bundled(
        &self,
        id: &LibraryId,
        resolution: Resolution,
    ) -> Result<LoadedLibrary<H::Handle>> {
        let resource = resolution.resource_name;

        let mut reader = self
            .resources
            .open(&resource)
            .map_err(|source| LoaderError::Extraction {
                resource: resource.clone(),
                source,
            })?
            .ok_or_else(|| LoaderError::ResourceNotFound {
                identifier: id.as_str().to_string(),
                resource: resource.clone(),
            })?;

        let extracted = extract_to_temp(
            &mut *reader,
            &self.config.extraction_dir(),
            &self.config.temp_prefix,
            &resolution.temp_suffix,
        )
        .map_err(|source| LoaderError::Extraction {
            resource: resource.clone(),
            source,
        })?;
        drop(reader);

        info!(
            library = %id,
            resource = %resource,
            path = %extracted.path.display(),
            bytes = extracted.bytes,
            "extracted bundled library"
        );

        let path = extracted.path;
        match self.host.load_by_path(&path) {
            Ok(handle) => Ok(LoadedLibrary {
                identifier: id.as_str().to_string(),
                origin: LoadOrigin::Extracted { resource, path },
                handle,
            }),
            Err(e) => {
                // Never mapped, so nothing needs the file until exit.
                if let Err(rm) = fs::remove_file(&path) {
                    warn!(path = %path.display(), "could not remove rejected extraction: {rm}");
                } else {
                    cleanup::forget(&path);
                }
                Err(LoaderError::Load {
                    target: path.display().to_string(),
                    source: e.into_source(),
                })
            }
        }
    }
}

impl<R: ResourceLookup, H: HostLoader> NativeLoader<R, H>
where
    H::Handle: Clone,
{
    /// Load `identifier`, trying the system search path before the bundled resources.
    ///
    /// With `memoize` on, the first success is remembered and later calls for
    /// the same identifier return it without touching the host or the
    /// resources. Concurrent calls for the same identifier load it once.
    pub fn load(&self, identifier: &str) -> Result<LoadedLibrary<H::Handle>> {
        if self.config.memoize {
            self.load_with(&self.loaded, identifier)
        } else {
            self.load_uncached(&LibraryId::parse(identifier)?)
        }
    }

    /// Load through `table`, which may be shared with other loaders.
    pub fn load_with(
        &self,
        table: &LoadTable<H::Handle>,
        identifier: &str,
    ) -> Result<LoadedLibrary<H::Handle>> {
        let id = LibraryId::parse(identifier)?;
        let cell = table.cell(id.as_str());
        if let Some(hit) = cell.get() {
            debug!(library = %id, "already loaded");
            return Ok(hit.clone());
        }
        cell.get_or_try_init(|| self.load_uncached(&id)).cloned()
    }
}

/// Load with the real dynamic linker and [`LoaderConfig::from_env`].
///
/// With `NATIVE_LOADER_MEMOIZE` set, successes are remembered for the whole
/// process: a later call for the same identifier returns the first library
/// whatever `resources` it is given.
pub fn load_library<R: ResourceLookup>(
    resources: R,
    identifier: &str,
) -> Result<LoadedLibrary<&'static Library>> {
    let config = LoaderConfig::from_env();
    let memoize = config.memoize;
    let loader = NativeLoader::new(resources).with_config(config);
    if memoize {
        loader.load_with(&PROCESS_TABLE, identifier)
    } else {
        loader.load(identifier)
    }
}
