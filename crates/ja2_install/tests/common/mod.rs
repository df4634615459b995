#![allow(dead_code)]

use binrw::BinWrite;
use byteorder::{LittleEndian, WriteBytesExt};
use ja2_sti::types::StciHeader;
use std::{
    collections::BTreeMap,
    fs,
    io::{Cursor, Write},
    path::Path,
};
use walkdir::WalkDir;

/// Assemble an SLF archive holding `files` in the given order
pub fn build_slf(library: &str, files: &[(&str, &[u8])]) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::new();
    write_name(&mut out, library)?;
    write_name(&mut out, "")?;
    out.write_u32::<LittleEndian>(files.len() as u32)?;
    out.write_u32::<LittleEndian>(files.len() as u32)?;
    out.write_u16::<LittleEndian>(0xFFFF)?;
    out.write_u16::<LittleEndian>(0x0200)?;
    out.write_u8(1)?;
    out.write_all(&[0; 3])?;
    out.write_u32::<LittleEndian>(0)?;

    let mut offsets = Vec::with_capacity(files.len());
    for (_, data) in files {
        offsets.push(out.len() as u32);
        out.write_all(data)?;
    }

    for ((name, data), offset) in files.iter().zip(offsets) {
        write_name(&mut out, name)?;
        out.write_u32::<LittleEndian>(offset)?;
        out.write_u32::<LittleEndian>(data.len() as u32)?;
        out.write_all(&[0; 4])?;
        out.write_u64::<LittleEndian>(0)?;
        out.write_all(&[0; 4])?;
    }

    Ok(out)
}

fn write_name(out: &mut Vec<u8>, name: &str) -> std::io::Result<()> {
    let mut field = [0u8; 256];
    field[..name.len()].copy_from_slice(name.as_bytes());
    out.write_all(&field)
}

/// Write an archive named `file_name` into `dir`
pub fn write_slf(dir: &Path, file_name: &str, files: &[(&str, &[u8])]) -> std::io::Result<()> {
    fs::write(dir.join(file_name), build_slf(file_name, files)?)
}

/// A 5-6-5 STI with a gradient of `width` by `height` pixels
pub fn gradient_sti(width: u16, height: u16) -> binrw::BinResult<Vec<u8>> {
    let mut data = Vec::new();
    StciHeader::rgb565(width, height).write(&mut Cursor::new(&mut data))?;
    for y in 0..height {
        for x in 0..width {
            let sample = ((x % 32) << 11) | ((y % 64) << 5) | ((x + y) % 32);
            data.extend(sample.to_le_bytes());
        }
    }
    Ok(data)
}

/// Every file below `root` with its contents, keyed by `/` separated relative path
pub fn snapshot(root: &Path) -> BTreeMap<String, Vec<u8>> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let relative = e
                .path()
                .strip_prefix(root)
                .unwrap()
                .iter()
                .map(|s| s.to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            (relative, fs::read(e.path()).unwrap())
        })
        .collect()
}
