//! Test support utilities for iconforge.
//!
//! Helpers for building icon directories on disk in tests and benchmarks;
//! not part of the generation API.

use std::fs;
use std::path::{Path, PathBuf};

/// A tiny but valid SVG icon.
pub const SAMPLE_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><path d="M4 4h16v16H4z" fill="#202020"/></svg>"##;

/// Minimal PNG signature, enough to be recognized as a raster by extension tests.
pub const SAMPLE_PNG: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Writes `contents` to `dir/rel`, creating parent directories.
pub fn write_file(dir: &Path, rel: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directory");
    }
    fs::write(&path, contents).expect("write test file");
    path
}

/// Creates a temporary directory holding one sample icon per entry in `names`.
/// Entries ending in `.png` get raster content, everything else SVG.
pub fn icon_dir(names: &[&str]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    for name in names {
        if name.ends_with(".png") {
            write_file(dir.path(), name, SAMPLE_PNG);
        } else {
            write_file(dir.path(), name, SAMPLE_SVG.as_bytes());
        }
    }
    dir
}
