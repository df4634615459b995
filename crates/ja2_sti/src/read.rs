//! Types for decoding 16-bit STI images
//!

use binrw::BinRead;
use byteorder::{LittleEndian, ReadBytesExt};
use std::{fmt, io::Cursor};
use tracing::{debug, instrument};

use crate::{
    error::{Error, Result},
    pixels::{PixelBuffer, Rgb},
    types::{flags, StciHeader, STCI_HEADER_SIZE},
};

/// Position and width of one color channel inside a 16-bit sample
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Channel {
    shift: u32,
    bits: u32,
}

impl Channel {
    fn from_mask(mask: u32, name: &str) -> Result<Self> {
        let bits = mask.count_ones();
        let shift = mask.trailing_zeros();
        // masks have to be a single contiguous run inside the 16 bits of a sample
        if bits == 0 || bits > 8 || mask > 0xFFFF || (mask >> shift) != (1 << bits) - 1 {
            return Err(Error::UnsupportedImageVariant(format!(
                "{name} mask {mask:#06x}"
            )));
        }
        Ok(Channel { shift, bits })
    }

    /// Number of bits holding this channel
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Extract the channel from `sample`, scaled to the full 8-bit range
    pub fn expand(&self, sample: u16) -> u8 {
        let max = (1u32 << self.bits) - 1;
        let value = (u32::from(sample) >> self.shift) & max;
        ((value * 255 + max / 2) / max) as u8
    }
}

/// Bit layout of a 16-bit sample, such as 5-6-5 or 5-5-5
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BitLayout {
    /// Red channel
    pub red: Channel,
    /// Green channel
    pub green: Channel,
    /// Blue channel
    pub blue: Channel,
}

impl BitLayout {
    /// Derive the layout from the channel masks of a header
    pub fn from_header(header: &StciHeader) -> Result<Self> {
        Ok(BitLayout {
            red: Channel::from_mask(header.red_mask, "red")?,
            green: Channel::from_mask(header.green_mask, "green")?,
            blue: Channel::from_mask(header.blue_mask, "blue")?,
        })
    }

    /// Expand a sample to truecolor
    pub fn expand(&self, sample: u16) -> Rgb {
        Rgb::new(
            self.red.expand(sample),
            self.green.expand(sample),
            self.blue.expand(sample),
        )
    }
}

impl fmt::Display for BitLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            self.red.bits, self.green.bits, self.blue.bits
        )
    }
}

/// A decoded 16-bit STI
#[derive(Debug, Clone)]
pub struct StiImage {
    /// Header as stored in the file
    pub header: StciHeader,
    /// Layout the samples were decoded with
    pub layout: BitLayout,
    /// Decoded pixels
    pub pixels: PixelBuffer,
}

/// Read the header of an STI image, checking it describes an image this crate can decode
pub fn read_header(data: &[u8]) -> Result<StciHeader> {
    if data.len() < STCI_HEADER_SIZE {
        return Err(Error::TruncatedImage {
            expected: STCI_HEADER_SIZE,
            actual: data.len(),
        });
    }

    let header = StciHeader::read(&mut Cursor::new(data))?;

    if header.depth != 16 {
        return Err(Error::UnsupportedImageVariant(format!(
            "{} bits per pixel",
            header.depth
        )));
    }

    if header.flags & flags::INDEXED != 0 || header.flags & flags::RGB == 0 {
        return Err(Error::UnsupportedImageVariant(format!(
            "flags {:#04x} do not describe an rgb image",
            header.flags
        )));
    }

    if header.flags & (flags::ZLIB | flags::ETRLE) != 0 {
        return Err(Error::UnsupportedImageVariant(format!(
            "flags {:#04x} describe a compressed image",
            header.flags
        )));
    }

    Ok(header)
}

/// Decode a 16-bit STI image into truecolor pixels
#[instrument(skip_all, err)]
pub fn decode_16bit(data: &[u8]) -> Result<StiImage> {
    let header = read_header(data)?;
    let layout = BitLayout::from_header(&header)?;

    let width = u32::from(header.width);
    let height = u32::from(header.height);
    let expected = (width as usize) * (height as usize) * 2;
    let payload = &data[STCI_HEADER_SIZE..];
    if payload.len() < expected {
        return Err(Error::TruncatedImage {
            expected,
            actual: payload.len(),
        });
    }

    debug!("decoding {width}x{height} image with {layout} layout");

    let mut samples = Cursor::new(&payload[..expected]);
    let pixels = (0..expected / 2)
        .map(|_| {
            samples
                .read_u16::<LittleEndian>()
                .map(|s| layout.expand(s))
        })
        .collect::<std::io::Result<Vec<_>>>()?;

    Ok(StiImage {
        header,
        layout,
        pixels: PixelBuffer::new(width, height, pixels)?,
    })
}
