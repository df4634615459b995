//! Composition of a read only source with a writable directory
//!
//! An [`Overlay`] is built for a single unpack or extract operation: the source is an SLF archive
//! (or a plain directory) and the sink is a directory on disk. Names from the source are mapped
//! onto the sink with [`crate::path::resolve`], so a file that exists with a different spelling is
//! overwritten in place instead of gaining a sibling.

use ja2_slf::SlfArchive;
use std::{
    fs, io,
    io::{Read, Seek},
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument};
use walkdir::WalkDir;

use crate::{
    error::{Error, Result},
    path::{resolve, segments, ResolvedPath},
};

/// A directory used as a source or as a sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryMount {
    root: PathBuf,
}

impl DirectoryMount {
    /// Use an existing directory, nothing is created
    pub fn open(root: impl Into<PathBuf>) -> Self {
        DirectoryMount { root: root.into() }
    }

    /// Use `root` as a sink, creating it when needed
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| Error::IOWrite {
            path: root.clone(),
            source,
        })?;
        Ok(DirectoryMount { root })
    }

    /// Root directory of the mount
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a logical name onto the mount
    pub fn resolve(&self, name: &str) -> Result<ResolvedPath> {
        resolve(&self.root, name)
    }

    /// Every file below the root, `/` separated and sorted
    pub fn names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::FilesystemUnavailable {
                path: e.path().unwrap_or(&self.root).to_path_buf(),
                source: e.into(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .unwrap_or(entry.path());
            names.push(
                relative
                    .iter()
                    .map(|s| s.to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/"),
            );
        }
        Ok(names)
    }

    /// Read a file, ignoring the case of `name`
    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.resolve(name)?;
        fs::read(&*path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::ResourceNotFound {
                resource: name.to_owned(),
                location: self.root.display().to_string(),
            },
            _ => Error::IOError(e),
        })
    }

    /// Write `data` to `name`, replacing whatever was there
    ///
    /// Missing directories are created. The data goes to a temporary sibling first and is renamed
    /// over the target, so an interrupted write never leaves a partial file under the final name.
    /// Names that would climb out of the root are rejected.
    pub fn write(&self, name: &str, data: &[u8]) -> Result<PathBuf> {
        if segments(name).any(|s| s == ".." || s.contains(':')) {
            return Err(Error::UnsafeEntryPath(name.to_owned()));
        }
        let path = self.resolve(name)?.into_path_buf();
        write_atomically(&path, data)?;
        Ok(path)
    }
}

/// Replace the contents of `path` with `data` through a temporary sibling
pub fn write_atomically(path: &Path, data: &[u8]) -> Result<()> {
    let failed = |source| Error::IOWrite {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(failed)?;
    }

    let mut temporary = path.as_os_str().to_owned();
    temporary.push(".part");
    let temporary = PathBuf::from(temporary);

    fs::write(&temporary, data).map_err(failed)?;
    fs::rename(&temporary, path).map_err(|source| {
        let _ = fs::remove_file(&temporary);
        failed(source)
    })
}

/// Where an overlay reads from
#[derive(Debug)]
pub enum Mount<'a, R> {
    /// Entries of an opened SLF archive
    Archive(&'a mut SlfArchive<R>),
    /// Files below a directory
    Directory(DirectoryMount),
}

impl<R: Read + Seek> Mount<'_, R> {
    /// Human readable name for log messages and errors
    pub fn describe(&self) -> String {
        match self {
            Mount::Archive(archive) => archive.library_name(),
            Mount::Directory(dir) => dir.root().display().to_string(),
        }
    }

    /// Every name the mount holds, in the order they are copied
    pub fn names(&self) -> Result<Vec<String>> {
        match self {
            Mount::Archive(archive) => Ok(archive.file_names().map(str::to_owned).collect()),
            Mount::Directory(dir) => dir.names(),
        }
    }

    /// Read `name`, ignoring case
    ///
    /// Returns the name as spelled by the mount together with the data.
    pub fn read(&mut self, name: &str) -> Result<(String, Vec<u8>)> {
        match self {
            Mount::Archive(archive) => {
                let entry = archive
                    .find(name)
                    .map_err(|_| Error::ResourceNotFound {
                        resource: name.to_owned(),
                        location: archive.library_name(),
                    })?
                    .clone();
                if !entry.is_contained() {
                    return Err(Error::UnsafeEntryPath(entry.name.to_string()));
                }
                let data = archive.read_entry(&entry).map_err(|source| Error::Archive {
                    name: archive.library_name(),
                    source,
                })?;
                Ok((entry.name.to_string(), data))
            }
            Mount::Directory(dir) => {
                let path = dir.resolve(name)?;
                let data = dir.read(name)?;
                Ok((path.logical(), data))
            }
        }
    }
}

/// A source mounted over a directory sink
#[derive(Debug)]
pub struct Overlay<'a, R> {
    source: Mount<'a, R>,
    sink: DirectoryMount,
}

impl<'a, R: Read + Seek> Overlay<'a, R> {
    /// Mount `archive` over the directory `output`, creating it when needed
    pub fn mount(archive: &'a mut SlfArchive<R>, output: impl Into<PathBuf>) -> Result<Self> {
        Ok(Overlay {
            source: Mount::Archive(archive),
            sink: DirectoryMount::create(output)?,
        })
    }

    /// Compose an arbitrary source and sink
    pub fn new(source: Mount<'a, R>, sink: DirectoryMount) -> Self {
        Overlay { source, sink }
    }

    /// The directory written to
    pub fn sink(&self) -> &DirectoryMount {
        &self.sink
    }

    /// Copy every file of the source into the sink
    ///
    /// Existing files are overwritten, so copying the same source twice leaves the same tree.
    #[instrument(skip(self), fields(source = %self.source.describe()), err)]
    pub fn copy_all(&mut self) -> Result<Vec<PathBuf>> {
        let names = self.source.names()?;
        let mut written = Vec::with_capacity(names.len());
        for name in names {
            written.push(self.copy_one(&name)?);
        }
        info!(
            "copied {} files into {}",
            written.len(),
            self.sink.root().display()
        );
        Ok(written)
    }

    /// Copy a single file of the source into the sink, keeping its relative path
    pub fn copy_one(&mut self, name: &str) -> Result<PathBuf> {
        let (stored, data) = self.source.read(name)?;
        let path = self.sink.write(&stored, &data)?;
        debug!("wrote {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod test {
    use std::{fs, io::Cursor};

    use ja2_slf::SlfArchive;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use crate::error::{Error, Result};
    use crate::overlay::{write_atomically, DirectoryMount, Mount, Overlay};

    #[test]
    fn directory_names_are_sorted_and_relative() -> Result<()> {
        let root = TempDir::new()?;
        let mount = DirectoryMount::create(root.path().join("out"))?;
        mount.write("b\\two.dat", b"2")?;
        mount.write("a.dat", b"1")?;

        assert_eq!(mount.names()?, vec!["a.dat", "b/two.dat"]);
        assert_eq!(mount.read("B/TWO.DAT")?, b"2");

        Ok(())
    }

    #[test]
    fn write_replaces_existing_spelling() -> Result<()> {
        let root = TempDir::new()?;
        fs::create_dir(root.path().join("Maps"))?;
        fs::write(root.path().join("Maps/A9.DAT"), b"old")?;

        let mount = DirectoryMount::open(root.path());
        let path = mount.write("maps\\a9.dat", b"new")?;

        assert_eq!(path, root.path().join("Maps").join("A9.DAT"));
        assert_eq!(fs::read(&path)?, b"new");
        assert_eq!(mount.names()?, vec!["Maps/A9.DAT"]);

        Ok(())
    }

    #[test]
    fn atomic_write_leaves_no_temporary() -> Result<()> {
        let root = TempDir::new()?;
        let target = root.path().join("deep").join("file.bin");
        write_atomically(&target, b"data")?;

        assert_eq!(fs::read(&target)?, b"data");
        assert_eq!(fs::read_dir(root.path().join("deep"))?.count(), 1);

        Ok(())
    }

    #[test]
    fn write_rejects_parent_segments() -> Result<()> {
        let root = TempDir::new()?;
        let mount = DirectoryMount::create(root.path().join("out"))?;
        assert!(matches!(
            mount.write("..\\escape.dat", b"x"),
            Err(Error::UnsafeEntryPath(_))
        ));
        assert!(!root.path().join("escape.dat").exists());

        Ok(())
    }

    #[test]
    fn missing_directory_file() -> Result<()> {
        let root = TempDir::new()?;
        let mut source: Mount<'_, Cursor<Vec<u8>>> =
            Mount::Directory(DirectoryMount::open(root.path()));
        assert!(matches!(
            source.read("absent.dat"),
            Err(Error::ResourceNotFound { .. })
        ));

        Ok(())
    }

    #[test]
    fn directory_overlay_copies_tree() -> Result<()> {
        let root = TempDir::new()?;
        let from = DirectoryMount::create(root.path().join("from"))?;
        from.write("x/y.txt", b"y")?;
        from.write("z.txt", b"z")?;

        let to = DirectoryMount::create(root.path().join("to"))?;
        let mut overlay: Overlay<'_, Cursor<Vec<u8>>> =
            Overlay::new(Mount::Directory(from.clone()), to.clone());
        overlay.copy_all()?;

        assert_eq!(to.names()?, from.names()?);

        Ok(())
    }

    #[test]
    fn archive_missing_resource() -> Result<()> {
        let root = TempDir::new()?;
        // header of an archive without entries
        let data = vec![0u8; 532];
        let mut archive = SlfArchive::new(Cursor::new(data)).map_err(|source| Error::Archive {
            name: "empty".into(),
            source,
        })?;
        let mut overlay = Overlay::mount(&mut archive, root.path())?;

        assert!(matches!(
            overlay.copy_one("nothing.dat"),
            Err(Error::ResourceNotFound { .. })
        ));
        assert_eq!(overlay.copy_all()?, Vec::<std::path::PathBuf>::new());

        Ok(())
    }
}
