//! Input directory scanning and icon name canonicalization.
use crate::{
    error::{InputError, Result},
    sanitize::canonicalize,
};
use jwalk::WalkDir;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const RASTER_REASON: &str = "color fonts require vector input";
pub const UNNAMED_REASON: &str = "file name has no usable characters";

const VECTOR_EXTENSIONS: &[&str] = &["svg"];
const RASTER_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "webp", "ico", "tif", "tiff",
];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IconKind {
    Vector,
    Raster,
}

impl IconKind {
    /// Classifies by extension, `None` for files that are not images at all.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        if VECTOR_EXTENSIONS.contains(&ext.as_str()) {
            Some(IconKind::Vector)
        } else if RASTER_EXTENSIONS.contains(&ext.as_str()) {
            Some(IconKind::Raster)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IconSource {
    pub canonical_name: String,
    pub original_path: PathBuf,
    /// Path relative to the scanned directory.
    pub relative_path: PathBuf,
    pub kind: IconKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Clone, Debug)]
pub struct PreparedInput {
    /// Accepted icons sorted by canonical name.
    pub files: Vec<IconSource>,
    pub name_map: BTreeMap<String, PathBuf>,
    pub skipped: Vec<SkippedFile>,
}

impl PreparedInput {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.canonical_name.as_str())
    }

    /// Canonical name to path relative to the input directory.
    pub fn relative_paths(&self) -> BTreeMap<String, PathBuf> {
        self.files
            .iter()
            .map(|f| (f.canonical_name.clone(), f.relative_path.clone()))
            .collect()
    }
}

/// Scans `input_dir` recursively and returns the accepted vector icons.
pub fn prepare(input_dir: &Path) -> Result<PreparedInput> {
    if !input_dir.exists() {
        return Err(InputError::NotFound(input_dir.to_path_buf()).into());
    }
    if !input_dir.is_dir() {
        return Err(InputError::NotADirectory(input_dir.to_path_buf()).into());
    }

    let mut files = Vec::new();
    let mut skipped = Vec::new();
    for entry in WalkDir::new(input_dir).sort(true) {
        let entry = entry.map_err(|e| InputError::Walk(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(kind) = IconKind::from_path(&path) else {
            continue;
        };
        let relative_path = path
            .strip_prefix(input_dir)
            .unwrap_or(path.as_path())
            .to_path_buf();

        if kind == IconKind::Raster {
            warn!("skipping {}: {RASTER_REASON}", relative_path.display());
            skipped.push(SkippedFile {
                path: relative_path,
                reason: RASTER_REASON.to_string(),
            });
            continue;
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let canonical_name = canonicalize(&stem);
        if canonical_name.is_empty() {
            warn!("skipping {}: {UNNAMED_REASON}", relative_path.display());
            skipped.push(SkippedFile {
                path: relative_path,
                reason: UNNAMED_REASON.to_string(),
            });
            continue;
        }

        debug!("accepted {} as `{canonical_name}`", relative_path.display());
        files.push(IconSource {
            canonical_name,
            original_path: path,
            relative_path,
            kind,
        });
    }

    if files.is_empty() {
        return Err(InputError::Empty(input_dir.to_path_buf()).into());
    }

    files.sort_by(|a, b| {
        a.canonical_name
            .cmp(&b.canonical_name)
            .then_with(|| a.relative_path.cmp(&b.relative_path))
    });
    if let Some(pair) = files
        .windows(2)
        .find(|pair| pair[0].canonical_name == pair[1].canonical_name)
    {
        return Err(InputError::DuplicateName {
            name: pair[0].canonical_name.clone(),
            first: pair[0].relative_path.clone(),
            second: pair[1].relative_path.clone(),
        }
        .into());
    }

    let name_map = files
        .iter()
        .map(|f| (f.canonical_name.clone(), f.original_path.clone()))
        .collect();
    Ok(PreparedInput {
        files,
        name_map,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_extensions() {
        assert_eq!(IconKind::from_path(Path::new("a.svg")), Some(IconKind::Vector));
        assert_eq!(IconKind::from_path(Path::new("a.SVG")), Some(IconKind::Vector));
        assert_eq!(IconKind::from_path(Path::new("a.png")), Some(IconKind::Raster));
        assert_eq!(IconKind::from_path(Path::new("a.JPeG")), Some(IconKind::Raster));
        assert_eq!(IconKind::from_path(Path::new("notes.txt")), None);
        assert_eq!(IconKind::from_path(Path::new("README")), None);
    }
}
