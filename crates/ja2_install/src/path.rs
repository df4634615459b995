//! Case insensitive path resolution
//!
//! Archives and plans name files without regard to case (`TileSets\0\SMITEMS.STI`), while the
//! directories they are installed into may live on a case sensitive filesystem. [`resolve`] maps
//! such a logical path onto whatever spelling already exists on disk.

use derive_more::Deref;
use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};
use tracing::trace;

use crate::error::{Error, Result};

/// A logical path mapped onto the filesystem below some base directory
#[derive(Debug, Clone, PartialEq, Eq, Deref)]
pub struct ResolvedPath {
    #[deref]
    full: PathBuf,
    relative: PathBuf,
}

impl ResolvedPath {
    /// Path relative to the base directory, using the spelling found on disk
    pub fn relative(&self) -> &Path {
        &self.relative
    }

    /// Relative path with `/` separators
    pub fn logical(&self) -> String {
        self.relative
            .iter()
            .map(|s| s.to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Consume and return the full path
    pub fn into_path_buf(self) -> PathBuf {
        self.full
    }
}

/// Split a logical path into its segments, accepting both `\` and `/` as separators
pub fn segments(logical: &str) -> impl Iterator<Item = &str> {
    logical
        .split(['\\', '/'])
        .filter(|s| !s.is_empty() && *s != ".")
}

/// Resolve `logical` below `base`, ignoring case
///
/// Each segment is matched against the entries of the directory resolved so far. An entry with
/// the exact spelling wins, otherwise the case insensitive match that sorts first is taken. Once a
/// segment has no match it and every following segment are kept as given, so the result can be
/// used to create new files. Only a directory that exists but cannot be listed is an error.
pub fn resolve(base: &Path, logical: &str) -> Result<ResolvedPath> {
    let mut full = base.to_path_buf();
    let mut relative = PathBuf::new();
    let mut on_disk = full.is_dir();

    for segment in segments(logical) {
        let found = if on_disk {
            find_entry(&full, segment)?
        } else {
            None
        };
        on_disk = match &found {
            Some(name) => full.join(name).is_dir(),
            None => false,
        };

        let name = found.unwrap_or_else(|| OsString::from(segment));
        full.push(&name);
        relative.push(&name);
    }

    trace!("resolved {logical} to {}", full.display());
    Ok(ResolvedPath { full, relative })
}

fn find_entry(dir: &Path, segment: &str) -> Result<Option<OsString>> {
    let unavailable = |source| Error::FilesystemUnavailable {
        path: dir.to_path_buf(),
        source,
    };

    let wanted = segment.to_lowercase();
    let mut candidates = Vec::new();
    for entry in fs::read_dir(dir).map_err(unavailable)? {
        let name = entry.map_err(unavailable)?.file_name();
        if name.to_str() == Some(segment) {
            return Ok(Some(name));
        }
        if name.to_string_lossy().to_lowercase() == wanted {
            candidates.push(name);
        }
    }

    candidates.sort();
    Ok(candidates.into_iter().next())
}

#[cfg(test)]
mod test {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use crate::error::Result;
    use crate::path::resolve;

    #[test]
    fn matches_existing_spelling() -> Result<()> {
        let base = TempDir::new()?;
        fs::create_dir_all(base.path().join("TileSets").join("0"))?;
        fs::write(base.path().join("TileSets/0/SMITEMS.STI"), b"x")?;

        let resolved = resolve(base.path(), "tilesets\\0\\smitems.sti")?;
        assert_eq!(resolved.logical(), "TileSets/0/SMITEMS.STI");
        assert!(resolved.is_file());

        Ok(())
    }

    #[test]
    fn missing_segments_keep_their_spelling() -> Result<()> {
        let base = TempDir::new()?;
        fs::create_dir(base.path().join("Maps"))?;

        let resolved = resolve(base.path(), "MAPS/New/A9.dat")?;
        assert_eq!(resolved.logical(), "Maps/New/A9.dat");
        assert_eq!(*resolved, base.path().join("Maps").join("New").join("A9.dat"));

        Ok(())
    }

    #[test]
    fn exact_spelling_is_preferred() -> Result<()> {
        let base = TempDir::new()?;
        fs::write(base.path().join("b_map.sti"), b"lower")?;
        fs::write(base.path().join("B_MAP.STI"), b"upper")?;

        // filesystems that fold case only keep one of the two
        if fs::read_dir(base.path())?.count() == 2 {
            assert_eq!(resolve(base.path(), "B_MAP.STI")?.logical(), "B_MAP.STI");
            assert_eq!(resolve(base.path(), "b_map.sti")?.logical(), "b_map.sti");
            assert_eq!(resolve(base.path(), "B_map.sti")?.logical(), "B_MAP.STI");
        }

        Ok(())
    }

    #[test]
    fn missing_base_resolves_verbatim() -> Result<()> {
        let base = TempDir::new()?;
        let resolved = resolve(&base.path().join("nowhere"), "Maps")?;
        assert_eq!(resolved.logical(), "Maps");
        assert!(!resolved.exists());

        Ok(())
    }
}
