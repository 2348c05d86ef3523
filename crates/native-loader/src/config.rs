use crate::errors::{LoaderError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_TMPDIR: &str = "NATIVE_LOADER_TMPDIR";
pub const ENV_MEMOIZE: &str = "NATIVE_LOADER_MEMOIZE";

pub const DEFAULT_TEMP_PREFIX: &str = "jni";

/// Knobs for [`NativeLoader`](crate::NativeLoader).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Where bundled libraries are extracted; `None` = the OS temp dir.
    pub temp_dir: Option<PathBuf>,
    /// File-name prefix of extracted copies.
    pub temp_prefix: String,
    /// Remember successful loads per identifier and skip repeat work.
    pub memoize: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            temp_dir: None,
            temp_prefix: DEFAULT_TEMP_PREFIX.to_string(),
            memoize: false,
        }
    }
}

impl LoaderConfig {
    /// Defaults with `NATIVE_LOADER_TMPDIR` / `NATIVE_LOADER_MEMOIZE` applied.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Some(dir) = env::var_os(ENV_TMPDIR).filter(|v| !v.is_empty()) {
            self.temp_dir = Some(PathBuf::from(dir));
        }
        if let Ok(v) = env::var(ENV_MEMOIZE) {
            self.memoize = truthy(&v);
        }
        self
    }

    /// Read a JSON config file; missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| LoaderError::Config {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        serde_json::from_slice(&bytes).map_err(|e| LoaderError::Config {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Directory extracted copies go to.
    pub fn extraction_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(env::temp_dir)
    }

    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn with_memoize(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }
}

fn truthy(v: &str) -> bool {
    v == "1" || v.eq_ignore_ascii_case("true")
}
