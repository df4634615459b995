//! Reading and writing 256 color PCX images
//!

use binrw::{BinRead, BinWrite};
use std::io::{Cursor, Write};
use tracing::instrument;

use crate::{
    error::{Error, Result},
    pixels::{PaletteImage, Rgb},
    types::{PcxHeader, PCX_HEADER_SIZE, PCX_PALETTE_MARKER, PCX_PALETTE_SIZE},
};

/// Longest run a single RLE count byte can describe
const MAX_RUN: usize = 0x3F;

/// Count bytes have both upper bits set
const RUN_FLAG: u8 = 0xC0;

/// Serialize an indexed image as an 8-bit PCX
///
/// Scanlines are run length encoded and padded to an even length. The palette is written as a
/// 256 entry VGA palette with unused slots left black.
#[instrument(skip_all, fields(width = image.width(), height = image.height()), err)]
pub fn write_pcx(image: &PaletteImage) -> Result<Vec<u8>> {
    let (Ok(width), Ok(height)) = (u16::try_from(image.width()), u16::try_from(image.height()))
    else {
        return Err(Error::InvalidPcx(format!(
            "{}x{} exceeds the largest pcx image",
            image.width(),
            image.height()
        )));
    };
    if width == 0 || height == 0 {
        return Err(Error::EmptyImage);
    }

    let header = PcxHeader::indexed(width, height).ok_or_else(|| {
        Error::InvalidPcx(format!("{width} pixels cannot be padded to an even scanline"))
    })?;
    let mut out = Cursor::new(Vec::with_capacity(
        PCX_HEADER_SIZE + image.indices().len() + PCX_PALETTE_SIZE + 1,
    ));
    header.write(&mut out)?;

    let mut line = vec![0u8; usize::from(header.bytes_per_line)];
    for row in image.indices().chunks(usize::from(width)) {
        line[..row.len()].copy_from_slice(row);
        encode_line(&line, &mut out)?;
    }

    out.write_all(&[PCX_PALETTE_MARKER])?;
    let mut vga = [0u8; PCX_PALETTE_SIZE];
    for (slot, color) in vga.chunks_mut(3).zip(image.palette()) {
        slot.copy_from_slice(&color.channels());
    }
    out.write_all(&vga)?;

    Ok(out.into_inner())
}

fn encode_line(line: &[u8], out: &mut impl Write) -> Result<()> {
    let mut i = 0;
    while i < line.len() {
        let value = line[i];
        let run = line[i..]
            .iter()
            .take(MAX_RUN)
            .take_while(|v| **v == value)
            .count();

        if run > 1 || value & RUN_FLAG == RUN_FLAG {
            out.write_all(&[RUN_FLAG | run as u8, value])?;
        } else {
            out.write_all(&[value])?;
        }
        i += run;
    }
    Ok(())
}

/// Parse an 8-bit PCX image
///
/// The palette is trimmed to the highest index in use, which gives back exactly the palette of
/// images produced by [`crate::quantize::quantize`] and [`write_pcx`].
#[instrument(skip_all, err)]
pub fn read_pcx(data: &[u8]) -> Result<PaletteImage> {
    if data.len() < PCX_HEADER_SIZE + PCX_PALETTE_SIZE + 1 {
        return Err(Error::InvalidPcx(format!("{} bytes is too short", data.len())));
    }

    let header = PcxHeader::read(&mut Cursor::new(data))
        .map_err(|e| Error::InvalidPcx(e.to_string()))?;
    if header.planes != 1 {
        return Err(Error::InvalidPcx(format!("{} color planes", header.planes)));
    }
    if header.x_max < header.x_min || header.y_max < header.y_min {
        return Err(Error::InvalidPcx("negative dimensions".into()));
    }

    let width = header.width();
    let height = header.height();
    let bytes_per_line = usize::from(header.bytes_per_line);
    if bytes_per_line < width as usize {
        return Err(Error::InvalidPcx(format!(
            "{bytes_per_line} bytes per line cannot hold {width} pixels"
        )));
    }

    let palette_start = data.len() - PCX_PALETTE_SIZE - 1;
    if data[palette_start] != PCX_PALETTE_MARKER {
        return Err(Error::InvalidPcx("missing 256 color palette".into()));
    }

    let lines = decode_lines(
        &data[PCX_HEADER_SIZE..palette_start],
        bytes_per_line,
        height as usize,
    )?;
    let indices = lines
        .chunks(bytes_per_line)
        .flat_map(|line| &line[..width as usize])
        .copied()
        .collect::<Vec<_>>();

    let used = indices.iter().max().map_or(0, |m| usize::from(*m) + 1);
    let palette = data[palette_start + 1..]
        .chunks(3)
        .take(used)
        .map(|c| Rgb::new(c[0], c[1], c[2]))
        .collect();

    PaletteImage::new(width, height, palette, indices)
}

fn decode_lines(mut encoded: &[u8], bytes_per_line: usize, lines: usize) -> Result<Vec<u8>> {
    let total = bytes_per_line * lines;
    let mut decoded = Vec::with_capacity(total);

    while decoded.len() < total {
        let (run, value, rest) = match encoded {
            [count, value, rest @ ..] if count & RUN_FLAG == RUN_FLAG => {
                (usize::from(count & !RUN_FLAG), *value, rest)
            }
            [value, rest @ ..] if value & RUN_FLAG != RUN_FLAG => (1, *value, rest),
            _ => {
                return Err(Error::InvalidPcx(format!(
                    "pixel data ends after {} of {total} bytes",
                    decoded.len()
                )))
            }
        };

        let run = run.min(total - decoded.len());
        decoded.extend(std::iter::repeat(value).take(run));
        encoded = rest;
    }

    Ok(decoded)
}
