//! Base types for structure of STI and PCX files.

use binrw::{BinRead, BinWrite};

/// Size in bytes of the [`StciHeader`]
pub const STCI_HEADER_SIZE: usize = 64;

/// Size in bytes of the [`PcxHeader`]
pub const PCX_HEADER_SIZE: usize = 128;

/// Marker byte in front of the 256 color palette at the end of a PCX file
pub const PCX_PALETTE_MARKER: u8 = 0x0C;

/// Size in bytes of the VGA palette at the end of a PCX file
pub const PCX_PALETTE_SIZE: usize = 768;

/// Flags describing how the pixel data of an STI is stored
pub mod flags {
    /// Pixels are RGB samples
    pub const RGB: u32 = 0x04;
    /// Pixels are palette indices
    pub const INDEXED: u32 = 0x08;
    /// Pixel data is zlib compressed
    pub const ZLIB: u32 = 0x10;
    /// Pixel data is run length encoded per sub image
    pub const ETRLE: u32 = 0x20;
}

/// STI file header
///
/// Defines the header of an STI file which always starts with "STCI". All data is stored in
/// little endian format. Only the RGB layout of the format specific block is modelled, indexed
/// images are rejected before it matters.
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq, Eq)]
#[brw(magic = b"STCI", little)]
pub struct StciHeader {
    /// Size of the pixel data before compression
    pub original_size: u32,

    /// Size of the pixel data as stored
    pub stored_size: u32,

    /// Color treated as transparent
    pub transparent_value: u32,

    /// Combination of [`flags`]
    pub flags: u32,

    /// Height in pixels
    pub height: u16,

    /// Width in pixels
    pub width: u16,

    /// Bits of a sample holding the red channel
    pub red_mask: u32,

    /// Bits of a sample holding the green channel
    pub green_mask: u32,

    /// Bits of a sample holding the blue channel
    pub blue_mask: u32,

    /// Bits of a sample holding the alpha channel
    pub alpha_mask: u32,

    /// Width of the red channel
    pub red_depth: u8,

    /// Width of the green channel
    pub green_depth: u8,

    /// Width of the blue channel
    pub blue_depth: u8,

    /// Width of the alpha channel
    pub alpha_depth: u8,

    /// Bits per pixel
    pub depth: u8,

    /// Size of application specific data following the pixels
    #[brw(pad_after = 15)]
    pub app_data_size: u32,
}

impl StciHeader {
    /// Header of an uncompressed 5-6-5 image
    pub fn rgb565(width: u16, height: u16) -> Self {
        let size = u32::from(width) * u32::from(height) * 2;
        StciHeader {
            original_size: size,
            stored_size: size,
            transparent_value: 0,
            flags: flags::RGB,
            height,
            width,
            red_mask: 0xF800,
            green_mask: 0x07E0,
            blue_mask: 0x001F,
            alpha_mask: 0,
            red_depth: 5,
            green_depth: 6,
            blue_depth: 5,
            alpha_depth: 0,
            depth: 16,
            app_data_size: 0,
        }
    }

    /// Header of an uncompressed 5-5-5 image
    pub fn rgb555(width: u16, height: u16) -> Self {
        StciHeader {
            red_mask: 0x7C00,
            green_mask: 0x03E0,
            blue_mask: 0x001F,
            green_depth: 5,
            ..Self::rgb565(width, height)
        }
    }
}

/// PCX file header
///
/// Only 8 bits per pixel, single plane, run length encoded images (version 5) are produced and
/// accepted.
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq, Eq)]
#[brw(magic = b"\x0A\x05\x01\x08", little)]
pub struct PcxHeader {
    /// Left edge
    pub x_min: u16,

    /// Top edge
    pub y_min: u16,

    /// Right edge, inclusive
    pub x_max: u16,

    /// Bottom edge, inclusive
    pub y_max: u16,

    /// Horizontal resolution in DPI
    pub h_dpi: u16,

    /// Vertical resolution in DPI
    pub v_dpi: u16,

    /// 16 color palette, unused for 256 color images
    pub ega_palette: [u8; 48],

    #[allow(dead_code)]
    pub reserved: u8,

    /// Number of color planes
    pub planes: u8,

    /// Bytes of a decoded scanline, always even
    pub bytes_per_line: u16,

    /// 1 for color palettes, 2 for grayscale
    pub palette_info: u16,

    /// Horizontal screen size
    pub h_screen: u16,

    /// Vertical screen size
    #[brw(pad_after = 54)]
    pub v_screen: u16,
}

impl PcxHeader {
    /// Header of a `width` by `height` image
    ///
    /// `None` when a dimension is 0 or the scanline of `width` pixels cannot be padded to an even
    /// length.
    pub fn indexed(width: u16, height: u16) -> Option<Self> {
        Some(PcxHeader {
            x_min: 0,
            y_min: 0,
            x_max: width.checked_sub(1)?,
            y_max: height.checked_sub(1)?,
            h_dpi: 72,
            v_dpi: 72,
            ega_palette: [0; 48],
            reserved: 0,
            planes: 1,
            bytes_per_line: width.checked_add(width % 2)?,
            palette_info: 1,
            h_screen: 0,
            v_screen: 0,
        })
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        u32::from(self.x_max) + 1 - u32::from(self.x_min)
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        u32::from(self.y_max) + 1 - u32::from(self.y_min)
    }
}
