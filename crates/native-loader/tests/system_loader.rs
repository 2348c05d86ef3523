//! Loads through the real dynamic linker.

use native_loader::{
    DirResources, EmbeddedResources, HostLoader, LibloadingHost, LoadOrigin, LoaderConfig,
    LoaderError, NativeLoader, Platform, ZipResources,
};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

fn files_in(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir).unwrap().map(|e| e.unwrap().path()).collect()
}

#[test]
fn missing_system_library_is_classified_as_not_found() {
    let name = native_loader::decorate("native_loader_definitely_missing_3141", Platform::current());
    let err = LibloadingHost.load_by_name(&name).unwrap_err();
    assert!(err.is_not_found(), "{err}");
}

#[test]
fn garbage_file_is_a_terminal_failure() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join(native_loader::decorate("garbage", Platform::current()));
    fs::write(&path, b"this is not a shared library, not even close").unwrap();

    let err = LibloadingHost.load_by_path(&path).unwrap_err();
    assert!(!err.is_not_found(), "{err}");
}

#[test]
fn unknown_library_without_bundle_is_resource_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let extract_dir = tmp.path().join("extract");
    let loader = NativeLoader::new(DirResources::new(tmp.path().join("resources")))
        .with_config(LoaderConfig::default().with_temp_dir(&extract_dir));

    let err = loader.load("native_loader_missing_greeter").unwrap_err();

    assert!(matches!(err, LoaderError::ResourceNotFound { .. }), "{err}");
    assert!(!extract_dir.exists() || files_in(&extract_dir).is_empty());
}

#[test]
fn corrupt_bundled_library_fails_to_load_and_is_removed() {
    let tmp = tempfile::tempdir().unwrap();
    let extract_dir = tmp.path().join("extract");
    let platform = Platform::current();
    let resources = EmbeddedResources::new().with(
        native_loader::decorate("native_loader_corrupt", platform),
        b"\x00\x01\x02 corrupt".to_vec(),
    );
    let loader = NativeLoader::new(resources)
        .with_config(LoaderConfig::default().with_temp_dir(&extract_dir));

    let err = loader.load("native_loader_corrupt").unwrap_err();

    assert!(matches!(err, LoaderError::Load { .. }), "{err}");
    assert!(files_in(&extract_dir).is_empty());
}

/// Copies of a real system library, so the fallback path can be exercised end to end.
#[cfg(target_os = "linux")]
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

#[cfg(target_os = "linux")]
#[test]
fn bundled_copy_in_a_directory_is_extracted_and_callable() {
    let Some(libm) = system_libm() else {
        eprintln!("skipping: no libm.so.6 found");
        return;
    };
    let tmp = tempfile::tempdir().unwrap();
    let res_root = tmp.path().join("resources");
    fs::create_dir_all(res_root.join("natives")).unwrap();
    fs::copy(&libm, res_root.join("natives/libnative_loader_m.so")).unwrap();
    let extract_dir = tmp.path().join("extract");

    let loader = NativeLoader::new(DirResources::new(&res_root))
        .with_config(LoaderConfig::default().with_temp_dir(&extract_dir));
    let lib = loader.load("natives/native_loader_m").unwrap();

    let LoadOrigin::Extracted { resource, path } = lib.origin() else {
        panic!("expected extraction, got {}", lib.origin());
    };
    assert_eq!(resource, "natives/libnative_loader_m.so");
    assert!(path.exists());
    assert_eq!(
        path.parent().map(Path::to_path_buf),
        Some(fs::canonicalize(&extract_dir).unwrap())
    );

    let cos: libloading::Symbol<unsafe extern "C" fn(f64) -> f64> =
        unsafe { lib.handle().get(b"cos\0") }.unwrap();
    assert_eq!(unsafe { cos(0.0) }, 1.0);
}

#[cfg(target_os = "linux")]
#[test]
fn bundled_copy_in_an_archive_is_extracted() {
    let Some(libm) = system_libm() else {
        eprintln!("skipping: no libm.so.6 found");
        return;
    };
    let tmp = tempfile::tempdir().unwrap();
    let jar = tmp.path().join("natives.jar");
    {
        let mut w = zip::ZipWriter::new(fs::File::create(&jar).unwrap());
        w.start_file("libnative_loader_zm.so", zip::write::FileOptions::default())
            .unwrap();
        w.write_all(&fs::read(&libm).unwrap()).unwrap();
        w.finish().unwrap();
    }

    let loader = NativeLoader::new(ZipResources::open(&jar).unwrap())
        .with_config(LoaderConfig::default().with_temp_dir(tmp.path().join("extract")));
    let lib = loader.load("native_loader_zm").unwrap();

    assert!(lib.is_extracted());
    let floor: libloading::Symbol<unsafe extern "C" fn(f64) -> f64> =
        unsafe { lib.handle().get(b"floor\0") }.unwrap();
    assert_eq!(unsafe { floor(2.5) }, 2.0);
}
