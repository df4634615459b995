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

    /// The image is an STI, but not one holding a single uncompressed 16-bit picture
    #[error("unsupported sti variant: {0}")]
    #[diagnostic(help("only uncompressed 16-bit RGB images can be converted"))]
    UnsupportedImageVariant(String),

    /// The pixel payload is shorter than the header declares
    #[error("image is truncated: expected {expected} bytes, found {actual}")]
    TruncatedImage {
        /// Bytes required by the header
        expected: usize,
        /// Bytes available
        actual: usize,
    },

    /// Pixel data does not match the declared dimensions
    #[error("{width}x{height} image cannot hold {pixels} pixels")]
    DimensionMismatch {
        /// Declared width
        width: u32,
        /// Declared height
        height: u32,
        /// Number of pixels supplied
        pixels: usize,
    },

    /// Palettes hold between 1 and 256 colors
    #[error("palette size {0} is outside of 1..=256")]
    InvalidPaletteSize(usize),

    /// A pixel refers to a color the palette does not have
    #[error("index {index} is outside of a {palette} color palette")]
    IndexOutOfPalette {
        /// Offending index
        index: u8,
        /// Number of colors in the palette
        palette: usize,
    },

    /// PCX cannot represent an image without pixels
    #[error("cannot encode an image without pixels")]
    EmptyImage,

    /// The data is not a PCX file this library can read
    #[error("invalid pcx: {0}")]
    InvalidPcx(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
