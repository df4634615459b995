//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent warpper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// The entry table does not agree with the size of the file
    #[error("malformed slf archive: {0}")]
    #[diagnostic(help("the archive is probably truncated or not an slf file"))]
    MalformedContainer(String),

    /// An entry uses a storage state this reader does not understand
    #[error("entry {name} uses unsupported storage state {state:#04x}")]
    UnsupportedEntryState {
        /// Name of the offending entry
        name: String,
        /// Raw state byte
        state: u8,
    },

    /// The bytes of an entry could not be read in full
    #[error("entry {name} is truncated: expected {length} bytes at offset {offset}, archive holds {extent}")]
    TruncatedEntry {
        /// Name of the entry being read
        name: String,
        /// Start of the entry data
        offset: u64,
        /// Declared length of the entry data
        length: u64,
        /// Size of the archive in bytes
        extent: u64,
    },

    /// unable to find requested file
    #[error("unable to find requested file {0}")]
    FileNotFound(#[from] FileNotFoundError),
}

/// Error type to provide further information when a file has not been found
#[derive(Error, Diagnostic, Debug)]
#[error("unable to find requested file")]
pub enum FileNotFoundError {
    /// at index {0}
    #[error("at index {0}")]
    Index(usize),

    /// by name {0}
    #[error("by name {0}")]
    Name(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
