//! Types for reading SLF archives
//!

use binrw::BinRead;
use indexmap::IndexMap;
use std::{
    fmt::{self, Debug},
    fs::File,
    io::{self, BufReader, Read, Seek, SeekFrom},
    path::Path,
    sync::Arc,
};
use tracing::{debug, instrument};

use crate::{
    error::{Error, FileNotFoundError, Result},
    types::{SlfEntry, SlfHeader, SlfRecord, HEADER_SIZE, RECORD_SIZE},
};

/// A struct for reading an entry from an SLF file
pub struct SlfFile<'a, R: Read + Seek> {
    entry: &'a SlfEntry,
    reader: io::Take<&'a mut R>,
}

impl<'a, R: Read + Seek> Debug for SlfFile<'a, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "SlfFile({:#?})", self.entry)
    }
}

/// Methods for retrieving information on SLF file entries
impl<'a, R: Read + Seek> SlfFile<'a, R> {
    /// Get the name of the file
    ///
    /// # Warnings
    ///
    /// It is dangerous to use this name directly when extracting an archive.
    /// It may contain an absolute path (`\windows`), or break out of the
    /// current directory (`..\runtime`). Check [`SlfEntry::is_contained`]
    /// before writing to it.
    pub fn name(&self) -> &str {
        &self.entry.name
    }

    /// Get the size of the file, in bytes
    pub fn size(&self) -> u64 {
        self.entry.length
    }

    /// Get the starting offset of the data of the file
    pub fn data_start(&self) -> u64 {
        self.entry.offset
    }

    /// Get the table entry this file was opened from
    pub fn entry(&self) -> &SlfEntry {
        self.entry
    }
}

impl<R: Read + Seek> Read for SlfFile<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

#[derive(Debug)]
pub(crate) struct Shared {
    header: SlfHeader,
    entries: Vec<SlfEntry>,
    lookup: IndexMap<Box<str>, usize>,
    extent: u64,
}

/// SLF archive reader
///
/// The whole entry table is parsed and validated when the archive is opened, so every entry handed
/// out afterwards points inside the archive.
///
/// ```no_run
/// use std::io::prelude::*;
///
/// fn list_slf_contents(reader: impl Read + Seek) -> ja2_slf::error::Result<()> {
///     let mut slf = ja2_slf::SlfArchive::new(reader)?;
///
///     for i in 0..slf.len() {
///         let mut file = slf.by_index(i)?;
///         println!("Filename: {}", file.name());
///         std::io::copy(&mut file, &mut std::io::stdout())?;
///     }
///
///     Ok(())
/// }
/// ```
pub struct SlfArchive<R> {
    reader: R,
    shared: Arc<Shared>,
}

impl<R> Debug for SlfArchive<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SlfArchive")
            .field("library", &self.shared.header.library_name())
            .field("entries", &self.shared.entries.len())
            .field("extent", &self.shared.extent)
            .finish()
    }
}

impl SlfArchive<BufReader<File>> {
    /// Open the archive stored at `path`
    #[instrument(err)]
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file))
    }
}

impl<R> SlfArchive<R> {
    /// Number of readable entries contained in this SLF.
    pub fn len(&self) -> usize {
        self.shared.entries.len()
    }

    /// Whether this SLF archive contains no readable entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the archive in bytes
    pub fn extent(&self) -> u64 {
        self.shared.extent
    }

    /// Name of the library as recorded in the header
    pub fn library_name(&self) -> String {
        self.shared.header.library_name()
    }

    /// Path of the library as recorded in the header
    pub fn library_path(&self) -> String {
        self.shared.header.library_path()
    }

    /// All readable entries, in the order they are stored
    ///
    /// The slice can be walked any number of times.
    pub fn entries(&self) -> &[SlfEntry] {
        &self.shared.entries
    }

    /// Returns an iterator over all the file names in this archive.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.shared.entries.iter().map(|e| e.name.as_ref())
    }

    /// Get the index of a file entry by name, ignoring case.
    ///
    /// When several entries only differ by case the first one in stored order is returned.
    #[inline(always)]
    pub fn index_for_name(&self, name: &str) -> Option<usize> {
        self.shared
            .lookup
            .get(lookup_key(name).as_str())
            .copied()
    }

    /// Find an entry by name, ignoring case
    pub fn find(&self, name: &str) -> Result<&SlfEntry> {
        self.index_for_name(name)
            .map(|i| &self.shared.entries[i])
            .ok_or_else(|| Error::FileNotFound(FileNotFoundError::Name(name.to_owned())))
    }

    /// Unwrap and return the inner reader object
    ///
    /// The position of the reader is undefined.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read + Seek> SlfArchive<R> {
    /// Read an SLF archive collecting the files it contains.
    pub fn new(mut reader: R) -> Result<SlfArchive<R>> {
        let shared = Self::get_metadata(&mut reader)?;
        Ok(SlfArchive {
            reader,
            shared: shared.into(),
        })
    }

    /// Search for a file entry by name, ignoring case
    pub fn by_name(&mut self, name: &str) -> Result<SlfFile<'_, R>> {
        let Some(index) = self.index_for_name(name) else {
            return Err(Error::FileNotFound(FileNotFoundError::Name(
                name.to_owned(),
            )));
        };
        self.by_index(index)
    }

    /// Get a contained file by index
    pub fn by_index(&mut self, file_number: usize) -> Result<SlfFile<'_, R>> {
        let entry = self
            .shared
            .entries
            .get(file_number)
            .ok_or(Error::FileNotFound(FileNotFoundError::Index(file_number)))?;

        check_range(entry, self.shared.extent)?;
        self.reader.seek(SeekFrom::Start(entry.offset))?;

        Ok(SlfFile {
            entry,
            reader: self.reader.by_ref().take(entry.length),
        })
    }

    /// Read the complete data of an entry
    ///
    /// The range of the entry is checked against the archive before anything is read, and a
    /// short read is reported as [`Error::TruncatedEntry`].
    #[instrument(skip(self), fields(name = %entry.name), err)]
    pub fn read_entry(&mut self, entry: &SlfEntry) -> Result<Vec<u8>> {
        check_range(entry, self.shared.extent)?;
        self.reader.seek(SeekFrom::Start(entry.offset))?;

        let mut data = vec![0; entry.length as usize];
        self.reader
            .read_exact(&mut data)
            .map_err(|e| match e.kind() {
                io::ErrorKind::UnexpectedEof => truncated(entry, self.shared.extent),
                _ => Error::from(e),
            })?;

        Ok(data)
    }

    fn get_metadata(reader: &mut R) -> Result<Shared> {
        let extent = reader.seek(SeekFrom::End(0))?;
        if extent < HEADER_SIZE {
            return Err(Error::MalformedContainer(format!(
                "{extent} bytes is too small for the {HEADER_SIZE} byte header"
            )));
        }

        reader.seek(SeekFrom::Start(0))?;
        let header = SlfHeader::read(reader)?;

        let table_size = u64::from(header.entries) * RECORD_SIZE;
        if table_size > extent - HEADER_SIZE {
            return Err(Error::MalformedContainer(format!(
                "entry table of {} records does not fit in {extent} bytes",
                header.entries
            )));
        }

        let table_start = extent - table_size;
        reader.seek(SeekFrom::Start(table_start))?;

        let mut entries = Vec::with_capacity(header.entries as usize);
        let mut lookup = IndexMap::with_capacity(header.entries as usize);
        for _ in 0..header.entries {
            let record = SlfRecord::read(reader)?;
            let entry = SlfEntry::from_record(&record)?;
            if !entry.state.is_live() {
                debug!("skipping {} in state {:?}", entry.name, entry.state);
                continue;
            }

            // data always sits between the header and the entry table
            if entry.end().map_or(true, |end| end > table_start) {
                return Err(Error::MalformedContainer(format!(
                    "entry {} spans {}+{} beyond the data area ending at {table_start} of {extent} bytes",
                    entry.name, entry.offset, entry.length
                )));
            }

            lookup
                .entry(lookup_key(&entry.name).into_boxed_str())
                .or_insert(entries.len());
            entries.push(entry);
        }

        Ok(Shared {
            header,
            entries,
            lookup,
            extent,
        })
    }
}

fn lookup_key(name: &str) -> String {
    name.replace('/', "\\").to_lowercase()
}

fn check_range(entry: &SlfEntry, extent: u64) -> Result<()> {
    match entry.end() {
        Some(end) if end <= extent => Ok(()),
        _ => Err(truncated(entry, extent)),
    }
}

fn truncated(entry: &SlfEntry, extent: u64) -> Error {
    Error::TruncatedEntry {
        name: entry.name.to_string(),
        offset: entry.offset,
        length: entry.length,
        extent,
    }
}
