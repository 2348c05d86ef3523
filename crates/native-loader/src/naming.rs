//! Library identifiers and the file names derived from them.
//!
//! Everything here is pure: the same identifier and platform always give the
//! same names.

use crate::errors::{LoaderError, Result};
use crate::platform::Platform;
use serde::Serialize;
use std::fmt;

/// A logical library name, e.g. `"greeter"` or `"com/example/greeter"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LibraryId {
    raw: String,
    // index where the base name starts; 0 when there is no prefix
    split: usize,
}

impl LibraryId {
    pub fn parse(identifier: &str) -> Result<Self> {
        if identifier.is_empty() {
            return Err(LoaderError::InvalidIdentifier {
                identifier: identifier.to_string(),
                reason: "identifier is empty",
            });
        }
        let split = identifier.rfind('/').map(|i| i + 1).unwrap_or(0);
        if split == identifier.len() {
            return Err(LoaderError::InvalidIdentifier {
                identifier: identifier.to_string(),
                reason: "identifier ends with '/' and has no base name",
            });
        }
        Ok(Self {
            raw: identifier.to_string(),
            split,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Path portion including the trailing `/`; empty when there is none.
    pub fn prefix(&self) -> &str {
        &self.raw[..self.split]
    }

    /// Final path segment.
    pub fn base_name(&self) -> &str {
        &self.raw[self.split..]
    }
}

impl fmt::Display for LibraryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Platform file name for a bare base name: `libfoo.so`, `libfoo.dylib`, `foo.dll`.
///
/// On macOS/Unix a base name that already ends with the extension is returned
/// unchanged. Windows always appends `.dll`.
pub fn decorate(base_name: &str, platform: Platform) -> String {
    match platform {
        Platform::Windows => format!("{base_name}{}", platform.extension()),
        Platform::MacOs | Platform::Unix => {
            if base_name.ends_with(platform.extension()) {
                base_name.to_string()
            } else {
                format!("{}{base_name}{}", platform.lib_prefix(), platform.extension())
            }
        }
    }
}

/// Name of the bundled resource searched for when the direct load misses.
///
/// Windows resources are flat: the identifier's prefix is dropped.
/// macOS/Unix keep it (`sub/greeter` -> `sub/libgreeter.so`).
pub fn resource_name(id: &LibraryId, platform: Platform) -> String {
    match platform {
        Platform::Windows => decorate(id.base_name(), platform),
        Platform::MacOs | Platform::Unix => {
            format!("{}{}", id.prefix(), decorate(id.base_name(), platform))
        }
    }
}

/// Every name computed for one identifier on one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub identifier: String,
    pub platform: Platform,
    /// Name handed to the host search path on the direct attempt.
    pub system_name: String,
    /// Bundled resource looked up on fallback.
    pub resource_name: String,
    /// Suffix of the temp file the resource is extracted to.
    pub temp_suffix: String,
}

impl Resolution {
    pub fn new(id: &LibraryId, platform: Platform) -> Self {
        let decorated = decorate(id.base_name(), platform);
        Self {
            identifier: id.as_str().to_string(),
            platform,
            system_name: decorated.clone(),
            resource_name: resource_name(id, platform),
            temp_suffix: decorated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> LibraryId {
        LibraryId::parse(s).unwrap()
    }

    #[test]
    fn rejects_empty_identifiers() {
        assert!(matches!(
            LibraryId::parse(""),
            Err(LoaderError::InvalidIdentifier { .. })
        ));
        assert!(matches!(
            LibraryId::parse("sub/dir/"),
            Err(LoaderError::InvalidIdentifier { .. })
        ));
    }

    #[test]
    fn splits_prefix_and_base_name() {
        let plain = id("greeter");
        assert_eq!(plain.prefix(), "");
        assert_eq!(plain.base_name(), "greeter");

        let nested = id("com/example/greeter");
        assert_eq!(nested.prefix(), "com/example/");
        assert_eq!(nested.base_name(), "greeter");
    }

    #[test]
    fn windows_appends_dll() {
        for name in ["greeter", "a", "my-lib_2", "foo.dll"] {
            assert_eq!(
                resource_name(&id(name), Platform::Windows),
                format!("{name}.dll")
            );
        }
    }

    #[test]
    fn windows_drops_the_prefix() {
        assert_eq!(resource_name(&id("sub/greeter"), Platform::Windows), "greeter.dll");
        assert_eq!(
            resource_name(&id("com/example/greeter"), Platform::Windows),
            "greeter.dll"
        );
    }

    #[test]
    fn unix_adds_lib_and_extension() {
        assert_eq!(resource_name(&id("greeter"), Platform::Unix), "libgreeter.so");
        assert_eq!(resource_name(&id("greeter"), Platform::MacOs), "libgreeter.dylib");
    }

    #[test]
    fn unix_leaves_decorated_names_alone() {
        assert_eq!(resource_name(&id("libgreeter.so"), Platform::Unix), "libgreeter.so");
        assert_eq!(resource_name(&id("greeter.dylib"), Platform::MacOs), "greeter.dylib");
        // only the platform's own extension counts
        assert_eq!(resource_name(&id("greeter.so"), Platform::MacOs), "libgreeter.so.dylib");
    }

    #[test]
    fn unix_keeps_the_prefix() {
        assert_eq!(resource_name(&id("sub/greeter"), Platform::Unix), "sub/libgreeter.so");
        assert_eq!(
            resource_name(&id("linux-x86-64/greeter.so"), Platform::Unix),
            "linux-x86-64/greeter.so"
        );
    }

    #[test]
    fn naming_is_stable() {
        for platform in [Platform::Windows, Platform::MacOs, Platform::Unix] {
            let i = id("sub/greeter");
            assert_eq!(resource_name(&i, platform), resource_name(&i, platform));
            assert_eq!(Resolution::new(&i, platform), Resolution::new(&i, platform));
        }
    }

    #[test]
    fn resolution_uses_base_name_for_system_and_temp_names() {
        let r = Resolution::new(&id("sub/greeter"), Platform::MacOs);
        assert_eq!(r.system_name, "libgreeter.dylib");
        assert_eq!(r.resource_name, "sub/libgreeter.dylib");
        assert_eq!(r.temp_suffix, "libgreeter.dylib");

        let w = Resolution::new(&id("sub/greeter"), Platform::Windows);
        assert_eq!(w.system_name, "greeter.dll");
        assert_eq!(w.resource_name, "greeter.dll");
    }
}
