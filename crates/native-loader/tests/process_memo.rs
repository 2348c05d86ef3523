//! `load_library` with `NATIVE_LOADER_MEMOIZE` set. Kept in its own test binary
//! because it changes the process environment.
#![cfg(target_os = "linux")]

use native_loader::{load_library, DirResources};
use std::fs;
use std::path::PathBuf;

fn system_libm() -> Option<PathBuf> {
    [
        "/lib/x86_64-linux-gnu/libm.so.6",
        "/usr/lib/x86_64-linux-gnu/libm.so.6",
        "/lib/aarch64-linux-gnu/libm.so.6",
        "/usr/lib/aarch64-linux-gnu/libm.so.6",
        "/lib64/libm.so.6",
        "/usr/lib64/libm.so.6",
        "/usr/lib/libm.so.6",
        "/lib/libm.so.6",
    ]
    .iter()
    .map(PathBuf::from)
    .find(|p| p.is_file())
}

#[test]
fn memoized_load_library_extracts_once_per_process() {
    let Some(libm) = system_libm() else {
        eprintln!("skipping: no libm.so.6 found");
        return;
    };
    let tmp = tempfile::tempdir().unwrap();
    let res_root = tmp.path().join("resources");
    fs::create_dir_all(&res_root).unwrap();
    fs::copy(&libm, res_root.join("libnative_loader_memo_m.so")).unwrap();
    let extract_dir = tmp.path().join("extract");

    std::env::set_var("NATIVE_LOADER_MEMOIZE", "1");
    std::env::set_var("NATIVE_LOADER_TMPDIR", &extract_dir);

    let first = load_library(DirResources::new(&res_root), "native_loader_memo_m").unwrap();
    let second = load_library(DirResources::new(&res_root), "native_loader_memo_m").unwrap();

    assert!(first.is_extracted());
    assert_eq!(first.origin(), second.origin());
    assert!(std::ptr::eq(*first.handle(), *second.handle()));
    assert_eq!(fs::read_dir(&extract_dir).unwrap().count(), 1);
}
