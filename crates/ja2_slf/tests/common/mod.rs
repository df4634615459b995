use byteorder::{LittleEndian, WriteBytesExt};
use std::io::Write;

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
        out.write_u8(0)?;
        out.write_u8(0)?;
        out.write_all(&[0; 2])?;
        out.write_u64::<LittleEndian>(0)?;
        out.write_u16::<LittleEndian>(0)?;
        out.write_all(&[0; 2])?;
    }

    Ok(out)
}

fn write_name(out: &mut Vec<u8>, name: &str) -> std::io::Result<()> {
    let mut field = [0u8; 256];
    field[..name.len()].copy_from_slice(name.as_bytes());
    out.write_all(&field)
}
