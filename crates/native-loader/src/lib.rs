//! native-loader
//!
//! Blocking helpers for loading JNI-style native libraries.
//! - Tries the host dynamic linker first (system search path, platform naming).
//! - Falls back to a bundled copy: resource dir, zip archive, or embedded bytes.
//! - Extracts the bundled copy to a `jni*` temp file, loads it, deletes it at exit.
//!
//! ```no_run
//! use native_loader::{load_library, DirResources};
//!
//! let resources = DirResources::new("resources");
//! let lib = load_library(&resources, "greeter")?;
//! println!("loaded from {}", lib.origin());
//! # Ok::<(), native_loader::LoaderError>(())
//! ```

pub mod cleanup;
pub mod config;
pub mod errors;
pub mod extract;
pub mod host;
pub mod loader;
pub mod naming;
pub mod platform;
pub mod resources;

pub use config::LoaderConfig;
pub use errors::{LoaderError, Result};
pub use host::{HostLoadError, HostLoader, LibloadingHost};
pub use loader::{
    load_library, DirectLoad, LoadOrigin, LoadTable, LoadedLibrary, NativeLoader, SystemLoader,
};
pub use naming::{decorate, resource_name, LibraryId, Resolution};
pub use platform::Platform;
pub use resources::{DirResources, EmbeddedResources, ResourceChain, ResourceLookup, ZipResources};
