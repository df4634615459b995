//! Median cut color quantization.
//!
//! The histogram of the image is split into boxes until the requested number of colors is
//! reached or no box holds more than one distinct color. Every pixel is mapped to the box its
//! color ended up in, so each palette slot is used by at least one pixel. All ordering decisions
//! are made on the colors themselves, the result only depends on the pixel values.

use std::collections::{BTreeMap, HashMap};
use tracing::{debug, instrument};

use crate::{
    error::{Error, Result},
    pixels::{PaletteImage, PixelBuffer, Rgb},
};

/// Palette size used for the Wildfire map screen
pub const DEFAULT_PALETTE_SIZE: usize = 8;

#[derive(Debug)]
struct ColorBox {
    colors: Vec<(Rgb, u64)>,
}

impl ColorBox {
    fn population(&self) -> u64 {
        self.colors.iter().map(|(_, n)| n).sum()
    }

    /// Channel with the widest spread and that spread
    fn widest_channel(&self) -> (usize, u8) {
        let mut widest = (0, 0);
        for channel in 0..3 {
            let values = self.colors.iter().map(|(c, _)| c.channels()[channel]);
            let min = values.clone().min().unwrap_or(0);
            let max = values.max().unwrap_or(0);
            if max - min > widest.1 {
                widest = (channel, max - min);
            }
        }
        widest
    }

    fn split(mut self) -> (ColorBox, ColorBox) {
        let (channel, _) = self.widest_channel();
        self.colors
            .sort_by_key(|(c, _)| (c.channels()[channel], *c));

        let half = self.population().div_ceil(2);
        let mut seen = 0;
        let mut at = self.colors.len() - 1;
        for (i, (_, n)) in self.colors.iter().enumerate() {
            seen += n;
            if seen >= half {
                at = i + 1;
                break;
            }
        }
        // both halves keep at least one color
        let at = at.clamp(1, self.colors.len() - 1);

        let upper = self.colors.split_off(at);
        (self, ColorBox { colors: upper })
    }

    fn average(&self) -> Rgb {
        let population = self.population().max(1);
        let mut sums = [0u64; 3];
        for (color, n) in &self.colors {
            for (sum, value) in sums.iter_mut().zip(color.channels()) {
                *sum += u64::from(value) * n;
            }
        }
        let [r, g, b] = sums.map(|s| ((s + population / 2) / population) as u8);
        Rgb::new(r, g, b)
    }
}

/// Reduce `image` to at most `colors` colors
#[instrument(skip(image), fields(width = image.width(), height = image.height()), err)]
pub fn quantize(image: &PixelBuffer, colors: usize) -> Result<PaletteImage> {
    if !(1..=256).contains(&colors) {
        return Err(Error::InvalidPaletteSize(colors));
    }

    let mut histogram = BTreeMap::new();
    for pixel in image.pixels() {
        *histogram.entry(*pixel).or_insert(0u64) += 1;
    }

    let mut boxes = Vec::with_capacity(colors);
    if !histogram.is_empty() {
        boxes.push(ColorBox {
            colors: histogram.into_iter().collect(),
        });
    }

    while boxes.len() < colors {
        // widest box first, then the most populated one, then the earliest
        let mut pick: Option<(usize, (u8, u64))> = None;
        for (i, b) in boxes.iter().enumerate() {
            if b.colors.len() < 2 {
                continue;
            }
            let score = (b.widest_channel().1, b.population());
            if pick.map_or(true, |(_, best)| score > best) {
                pick = Some((i, score));
            }
        }

        let Some((i, _)) = pick else {
            break;
        };

        let (lower, upper) = boxes.remove(i).split();
        boxes.insert(i, upper);
        boxes.insert(i, lower);
    }

    let palette = boxes.iter().map(ColorBox::average).collect::<Vec<_>>();
    let lookup = boxes
        .iter()
        .enumerate()
        .flat_map(|(i, b)| b.colors.iter().map(move |(c, _)| (*c, i as u8)))
        .collect::<HashMap<_, _>>();

    let indices = image
        .pixels()
        .iter()
        .map(|p| lookup[p])
        .collect::<Vec<_>>();

    debug!("reduced to {} colors", palette.len());

    PaletteImage::new(image.width(), image.height(), palette, indices)
}
