//! This library handles reading **SLF** files used by *Jagged Alliance 2*.
//!
//! # SLF Archive Format Documentation
//!
//! This crate provides utilities to read and extract data from the **SLF** library format used by
//! the game *Jagged Alliance 2* and its derivatives such as *Wildfire*. An SLF file bundles many
//! game assets (maps, tilesets, images) into a single file. SLF files are identified with the
//! `.slf` extension.
//!
//! ## File Structure
//!
//! An SLF file consists of a header, followed by the data of every entry, followed by the entry
//! table which occupies the last `entries * 280` bytes of the file.
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Library Name           | 256 bytes: NUL padded name of the library                  |
//! | 0x0100         | Library Path           | 256 bytes: NUL padded path the library is mounted at       |
//! | 0x0200         | Entry Count            | 4 bytes: Number of records in the entry table              |
//! | 0x0204         | Used Count             | 4 bytes: Number of records in use                          |
//! | 0x0208         | Sort                   | 2 bytes: Sort order of the entry table                     |
//! | 0x020A         | Version                | 2 bytes: Format version                                    |
//! | 0x020C         | Subdirectories         | 1 byte: Whether names contain directories, 3 bytes padding |
//! | 0x0210         | Reserved               | 4 bytes                                                    |
//!
//! ### Entry Table
//!
//! Each record of the entry table has the following structure:
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Name                   | 256 bytes: NUL padded name, `\` separates directories   |
//! | 0x0100         | Offset                 | 4 bytes: Offset to the data from the start of the file  |
//! | 0x0104         | Length                 | 4 bytes: Size of the data                               |
//! | 0x0108         | State                  | 1 byte: Storage state of the entry                      |
//! | 0x0109         | Reserved               | 1 byte, followed by 2 bytes padding                     |
//! | 0x010C         | File Time              | 8 bytes: Windows FILETIME of the original file          |
//! | 0x0114         | Reserved               | 2 bytes, followed by 2 bytes padding                    |
//!
//! - **State**: Possible values are:
//!   - `0x00`: stored, the data is kept uncompressed and can be read
//!   - `0x01`: old, superseded by another entry
//!   - `0xFE`: placeholder for a file that does not exist
//!   - `0xFF`: deleted
//!
//!   Only stored entries are exposed by [`SlfArchive`]. Any other value is rejected when the
//!   archive is opened.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.slf`
//! - **Endianness**: Little-endian for all multi-byte integers
//! - **Names**: compared without regard to case, the game itself runs on case-insensitive
//!   filesystems
//!

pub mod error;
pub mod read;
pub mod types;

pub use read::SlfArchive;
pub use types::SlfEntry;
