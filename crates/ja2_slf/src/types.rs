//! Base types for structure of SLF file.

use binrw::BinRead;

use crate::error::{Error, Result};

/// Size in bytes of the [`SlfHeader`]
pub const HEADER_SIZE: u64 = 532;

/// Size in bytes of a single [`SlfRecord`] in the entry table
pub const RECORD_SIZE: u64 = 280;

/// Length of the fixed, NUL padded name fields
pub const NAME_SIZE: usize = 256;

/// SLF file header
///
/// Defines the header at the very start of an SLF file. All data is stored in little endian format
#[derive(BinRead, Debug, Clone, PartialEq)]
#[br(little)]
pub struct SlfHeader {
    /// Name of the library, usually the file name of the archive
    pub library_name: [u8; NAME_SIZE],

    /// Path the library is mounted at inside the game data directory
    pub library_path: [u8; NAME_SIZE],

    /// The number of records stored in the entry table
    pub entries: u32,

    /// The number of records that are in use
    pub used: u32,

    /// Sort order of the entry table
    pub sort: u16,

    /// Format version
    pub version: u16,

    /// Whether entry names contain directory separators
    #[br(map = |b: u8| b != 0, pad_after = 3)]
    pub contains_subdirectories: bool,

    #[allow(dead_code)]
    pub reserved: u32,
}

impl SlfHeader {
    /// Name of the library with its padding stripped
    pub fn library_name(&self) -> String {
        c_string(&self.library_name)
    }

    /// Library path with its padding stripped
    pub fn library_path(&self) -> String {
        c_string(&self.library_path)
    }
}

/// SLF entry table record
///
/// Defines an entry in the table stored at the end of the SLF file
#[derive(BinRead, Debug, Clone, PartialEq)]
#[br(little)]
pub struct SlfRecord {
    /// Name of the entry, `\` separates directories
    pub name: [u8; NAME_SIZE],

    /// The offset to the data for this record from the start of the file
    pub offset: u32,

    /// The size of this record's data
    pub length: u32,

    /// Raw storage state, see [`EntryState`]
    #[br(pad_after = 1)]
    pub state: u8,

    /// Windows FILETIME of the original file
    #[br(pad_before = 2)]
    pub file_time: u64,

    #[allow(dead_code)]
    #[br(pad_after = 2)]
    pub reserved: u16,
}

/// Storage state of an entry
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EntryState {
    /// Data is stored uncompressed and can be read
    Stored,

    /// Superseded by a later entry
    Old,

    /// Placeholder for a file that does not exist
    DoesNotExist,

    /// Removed from the library
    Deleted,
}

impl EntryState {
    /// Whether an entry in this state carries readable data
    pub fn is_live(self) -> bool {
        self == EntryState::Stored
    }
}

impl TryFrom<u8> for EntryState {
    type Error = u8;

    fn try_from(value: u8) -> core::result::Result<Self, Self::Error> {
        match value {
            0x00 => Ok(EntryState::Stored),
            0x01 => Ok(EntryState::Old),
            0xFE => Ok(EntryState::DoesNotExist),
            0xFF => Ok(EntryState::Deleted),
            other => Err(other),
        }
    }
}

/// A readable entry of an SLF archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlfEntry {
    /// Name as stored in the archive, `\` separates directories
    pub name: Box<str>,

    /// Offset of the data from the start of the archive
    pub offset: u64,

    /// Size of the data in bytes
    pub length: u64,

    /// Storage state of the entry
    pub state: EntryState,

    /// Windows FILETIME of the original file
    pub file_time: u64,
}

impl SlfEntry {
    pub(crate) fn from_record(record: &SlfRecord) -> Result<Self> {
        let name = c_string(&record.name);
        let state = EntryState::try_from(record.state)
            .map_err(|state| Error::UnsupportedEntryState {
                name: name.clone(),
                state,
            })?;

        Ok(SlfEntry {
            name: name.into(),
            offset: record.offset.into(),
            length: record.length.into(),
            state,
            file_time: record.file_time,
        })
    }

    /// End of the data of this entry, exclusive
    pub fn end(&self) -> Option<u64> {
        self.offset.checked_add(self.length)
    }

    /// Split the name into its path segments, accepting both `\` and `/` as separators
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.name
            .split(['\\', '/'])
            .filter(|s| !s.is_empty() && *s != ".")
    }

    /// Whether the name stays inside the directory it is extracted to
    ///
    /// Names may contain an absolute path (`\windows\system.ini`), a drive (`c:`) or parent
    /// references (`..\..\runtime`). None of those may be used as extraction targets.
    pub fn is_contained(&self) -> bool {
        !self.name.starts_with(['\\', '/'])
            && self.segments().all(|s| s != ".." && !s.contains(':'))
    }
}

/// Decode a NUL padded name field
pub(crate) fn c_string(raw: &[u8]) -> String {
    let end = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use binrw::BinRead;
    use pretty_assertions::assert_eq;

    use crate::error::{Error, Result};
    use crate::types::{EntryState, SlfEntry, SlfHeader, SlfRecord, HEADER_SIZE, RECORD_SIZE};

    fn padded(name: &str) -> Vec<u8> {
        let mut field = name.as_bytes().to_vec();
        field.resize(256, 0);
        field
    }

    #[test]
    fn read_header() -> Result<()> {
        let mut input = padded("Maps.slf");
        input.extend(padded("maps\\"));
        #[rustfmt::skip]
        input.extend([
            0x02, 0x00, 0x00, 0x00,
            0x02, 0x00, 0x00, 0x00,
            0xFF, 0xFF,
            0x00, 0x02,
            0x01, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
        ]);
        assert_eq!(input.len() as u64, HEADER_SIZE);

        let header = SlfHeader::read(&mut Cursor::new(input))?;
        assert_eq!(header.library_name(), "Maps.slf");
        assert_eq!(header.library_path(), "maps\\");
        assert_eq!(header.entries, 2);
        assert_eq!(header.used, 2);
        assert_eq!(header.version, 0x0200);
        assert!(header.contains_subdirectories);

        Ok(())
    }

    #[test]
    fn read_record() -> Result<()> {
        let mut input = padded("tilesets\\0\\smguns.sti");
        #[rustfmt::skip]
        input.extend([
            0x14, 0x02, 0x00, 0x00,
            0x0B, 0x00, 0x00, 0x00,
            0x00, 0x00,
            0x00, 0x00,
            0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08,
            0x00, 0x00,
            0x00, 0x00,
        ]);
        assert_eq!(input.len() as u64, RECORD_SIZE);

        let record = SlfRecord::read(&mut Cursor::new(input))?;
        let entry = SlfEntry::from_record(&record)?;

        assert_eq!(&*entry.name, "tilesets\\0\\smguns.sti");
        assert_eq!(entry.offset, 532);
        assert_eq!(entry.length, 11);
        assert_eq!(entry.state, EntryState::Stored);
        assert_eq!(entry.file_time, 0x0807060504030201);
        assert_eq!(
            entry.segments().collect::<Vec<_>>(),
            vec!["tilesets", "0", "smguns.sti"]
        );

        Ok(())
    }

    #[test]
    fn reject_unknown_state() -> Result<()> {
        let mut input = padded("a.dat");
        input.extend([0u8; 8]);
        input.extend([0x07, 0x00]);
        input.extend([0u8; 14]);

        let record = SlfRecord::read(&mut Cursor::new(input))?;
        assert!(matches!(
            SlfEntry::from_record(&record),
            Err(Error::UnsupportedEntryState { state: 0x07, .. })
        ));

        Ok(())
    }

    #[test]
    fn containment() {
        let entry = |name: &str| SlfEntry {
            name: name.into(),
            offset: 0,
            length: 0,
            state: EntryState::Stored,
            file_time: 0,
        };

        assert!(entry("A9.dat").is_contained());
        assert!(entry("0\\smguns.sti").is_contained());
        assert!(!entry("..\\..\\runtime.dll").is_contained());
        assert!(!entry("\\windows\\system.ini").is_contained());
        assert!(!entry("c:\\autoexec.bat").is_contained());
    }
}
