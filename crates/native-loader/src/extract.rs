use crate::cleanup;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// A bundled resource copied out to a private temp file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Copy `reader` into a fresh `<prefix>XXXXXX<suffix>` file under `dir`.
///
/// The returned path is absolute and canonical. Until the copy is complete the
/// file is owned by a `NamedTempFile`, so a failed copy removes only the file
/// this call created and a caller never sees a truncated library. Once kept,
/// the file is registered for deletion at exit.
pub fn extract_to_temp<R: Read + ?Sized>(
    reader: &mut R,
    dir: &Path,
    prefix: &str,
    suffix: &str,
) -> io::Result<Extracted> {
    fs::create_dir_all(dir)?;
    let dir = fs::canonicalize(dir)?;
    let mut file = tempfile::Builder::new()
        .prefix(prefix)
        .suffix(suffix)
        .tempfile_in(&dir)?;

    let bytes = io::copy(reader, &mut file)?;
    file.as_file().sync_all()?;

    let path = file.into_temp_path().keep().map_err(|e| e.error)?;
    cleanup::delete_on_exit(&path);
    Ok(Extracted { path, bytes })
}
