//! This library decodes **STI** images used by *Jagged Alliance 2* and converts them to **PCX**.
//!
//! # STI Image Format Documentation
//!
//! STI ("Sir-Tech Image") files hold either a single 16-bit truecolor picture or a set of 8-bit
//! indexed sub images. Only the uncompressed 16-bit variant is decoded here, which is what
//! *Wildfire* uses for its strategic map screen.
//!
//! ## File Structure
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: "STCI"                                            |
//! | 0x0004         | Original Size          | 4 bytes: Size of the pixel data before compression         |
//! | 0x0008         | Stored Size            | 4 bytes: Size of the pixel data as stored                  |
//! | 0x000C         | Transparent Value      | 4 bytes: Color treated as transparent                      |
//! | 0x0010         | Flags                  | 4 bytes: `0x04` RGB, `0x08` indexed, `0x10` zlib, `0x20` ETRLE |
//! | 0x0014         | Height                 | 2 bytes                                                    |
//! | 0x0016         | Width                  | 2 bytes                                                    |
//! | 0x0018         | Channel Masks          | 16 bytes: red, green, blue and alpha masks                 |
//! | 0x0028         | Channel Depths         | 4 bytes: red, green, blue and alpha bit counts             |
//! | 0x002C         | Depth                  | 1 byte: bits per pixel                                     |
//! | 0x002D         | App Data Size          | 4 bytes, followed by 15 unused bytes                       |
//!
//! The header is packed, the 64 bytes carry no alignment padding.
//!
//! The pixels follow the header as little-endian 16-bit samples, row by row from the top. The
//! channel masks describe the bit layout of a sample, usually 5-6-5 or 5-5-5. Each channel is
//! scaled to 8 bits as `(v * 255 + max / 2) / max`, `max` being the largest value the channel can
//! hold.
//!
//! # PCX Output
//!
//! Converted images are written as version 5, 8 bits per pixel, single plane PCX files with run
//! length encoded scanlines followed by `0x0C` and a 256 entry VGA palette. The number of colors
//! is reduced with [`quantize::quantize`] beforehand.
//!
//! ## Additional Information
//!
//! - **File Extensions**: `.sti`, `.pcx`
//! - **Endianness**: Little-endian for all multi-byte integers
//!

pub mod error;
pub mod pcx;
pub mod pixels;
pub mod quantize;
pub mod read;
pub mod types;

pub use pixels::{PaletteImage, PixelBuffer, Rgb};
pub use read::decode_16bit;

use tracing::info;

/// Decode a 16-bit STI and re-encode it as a PCX with at most `colors` colors
pub fn convert_to_pcx(sti: &[u8], colors: usize) -> error::Result<Vec<u8>> {
    let image = decode_16bit(sti)?;
    let quantized = quantize::quantize(&image.pixels, colors)?;
    info!(
        "converted {}x{} {} image to {} colors",
        image.pixels.width(),
        image.pixels.height(),
        image.layout,
        quantized.palette().len()
    );
    pcx::write_pcx(&quantized)
}
