//! In-memory image representations shared by the decoder, the quantizer and the PCX codec.

use crate::error::{Error, Result};

/// A color with 8 bits per channel
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rgb {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Rgb {
    /// Create a color from its channels
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Channels in `r, g, b` order
    pub const fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// A decoded truecolor image, rows top to bottom
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl PixelBuffer {
    /// Create a buffer, `pixels` must hold exactly `width * height` samples
    pub fn new(width: u32, height: u32, pixels: Vec<Rgb>) -> Result<Self> {
        if u64::from(width) * u64::from(height) != pixels.len() as u64 {
            return Err(Error::DimensionMismatch {
                width,
                height,
                pixels: pixels.len(),
            });
        }

        Ok(PixelBuffer {
            width,
            height,
            pixels,
        })
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// All samples, row-major
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// Sample at column `x` of row `y`
    pub fn get(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get((y as usize) * (self.width as usize) + x as usize)
            .copied()
    }
}

/// An image made of palette indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteImage {
    width: u32,
    height: u32,
    palette: Vec<Rgb>,
    indices: Vec<u8>,
}

impl PaletteImage {
    /// Create an indexed image
    ///
    /// The palette holds at most 256 colors, there is one index per pixel and every index points
    /// into the palette.
    pub fn new(width: u32, height: u32, palette: Vec<Rgb>, indices: Vec<u8>) -> Result<Self> {
        if palette.len() > 256 {
            return Err(Error::InvalidPaletteSize(palette.len()));
        }

        if u64::from(width) * u64::from(height) != indices.len() as u64 {
            return Err(Error::DimensionMismatch {
                width,
                height,
                pixels: indices.len(),
            });
        }

        if let Some(bad) = indices.iter().find(|i| usize::from(**i) >= palette.len()) {
            return Err(Error::IndexOutOfPalette {
                index: *bad,
                palette: palette.len(),
            });
        }

        Ok(PaletteImage {
            width,
            height,
            palette,
            indices,
        })
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The colors referenced by [`PaletteImage::indices`]
    pub fn palette(&self) -> &[Rgb] {
        &self.palette
    }

    /// One palette index per pixel, row-major
    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    /// Expand back into truecolor
    pub fn to_pixels(&self) -> PixelBuffer {
        PixelBuffer {
            width: self.width,
            height: self.height,
            pixels: self
                .indices
                .iter()
                .map(|i| self.palette[usize::from(*i)])
                .collect(),
        }
    }
}

#[cfg(test)]
mod test {
    use crate::error::Error;
    use crate::pixels::{PaletteImage, PixelBuffer, Rgb};

    #[test]
    fn buffer_checks_dimensions() {
        assert!(PixelBuffer::new(2, 2, vec![Rgb::default(); 4]).is_ok());
        assert!(matches!(
            PixelBuffer::new(2, 2, vec![Rgb::default(); 3]),
            Err(Error::DimensionMismatch { pixels: 3, .. })
        ));
    }

    #[test]
    fn palette_image_checks_indices() {
        let palette = vec![Rgb::new(0, 0, 0), Rgb::new(255, 255, 255)];
        assert!(PaletteImage::new(2, 1, palette.clone(), vec![0, 1]).is_ok());
        assert!(PaletteImage::new(2, 1, palette, vec![0, 2]).is_err());
    }
}
