use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Naming family of the host operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    MacOs,
    /// Linux, the BSDs, Solaris and anything else that uses `lib*.so`.
    Unix,
}

impl Platform {
    /// Platform of the running process (fixed at compile time).
    pub fn current() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    /// Classify an OS identifier such as `"Windows 10"`, `"Mac OS X"`, `"darwin"` or `"linux"`.
    pub fn from_os_name(os: &str) -> Self {
        let os = os.trim().to_ascii_lowercase();
        if os.starts_with("windows") {
            Platform::Windows
        } else if os.starts_with("mac") || os == "darwin" || os == "ios" {
            Platform::MacOs
        } else {
            Platform::Unix
        }
    }

    /// Shared-library extension, dot included.
    pub fn extension(self) -> &'static str {
        match self {
            Platform::Windows => ".dll",
            Platform::MacOs => ".dylib",
            Platform::Unix => ".so",
        }
    }

    /// Prefix the platform linker expects in front of a library base name.
    pub fn lib_prefix(self) -> &'static str {
        match self {
            Platform::Windows => "",
            Platform::MacOs | Platform::Unix => "lib",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::MacOs => "macos",
            Platform::Unix => "unix",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "windows" | "win" => Ok(Platform::Windows),
            "macos" | "darwin" | "osx" => Ok(Platform::MacOs),
            "unix" | "linux" => Ok(Platform::Unix),
            other => Err(format!(
                "unknown platform {other:?} (expected windows, macos or unix)"
            )),
        }
    }
}
