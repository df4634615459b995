mod common;

use std::io::{Cursor, Read};

use ja2_slf::{error::Error, SlfArchive};
use pretty_assertions::assert_eq;
use tracing::info;
use tracing_test::traced_test;

const FILES: &[(&str, &[u8])] = &[
    ("A9.dat", b"sector a9 map data"),
    ("tilesets\\0\\smguns.sti", b"STCI small guns"),
    ("b_map.sti", b""),
    ("Interface\\militiamaps.sti", &[0xC0, 0xFF, 0x00, 0x12, 0x34]),
];

#[traced_test]
#[test]
fn every_entry_matches_its_span() -> Result<(), Error> {
    let raw = common::build_slf("Test.slf", FILES)?;
    let mut slf = SlfArchive::new(Cursor::new(raw.clone()))?;
    assert_eq!(slf.len(), FILES.len());

    let entries = slf.entries().to_vec();
    for (entry, (name, data)) in entries.iter().zip(FILES) {
        info!("comparing {}", entry.name);
        assert_eq!(&*entry.name, *name);

        let actual = slf.read_entry(entry)?;
        assert_eq!(actual.len() as u64, entry.length);
        assert_eq!(&actual[..], *data);

        let span = &raw[entry.offset as usize..(entry.offset + entry.length) as usize];
        assert_eq!(&actual[..], span);
    }

    Ok(())
}

#[traced_test]
#[test]
fn streaming_reads_match_read_entry() -> Result<(), Error> {
    let raw = common::build_slf("Test.slf", FILES)?;
    let mut slf = SlfArchive::new(Cursor::new(raw))?;

    for i in 0..slf.len() {
        let entry = slf.entries()[i].clone();
        let expected = slf.read_entry(&entry)?;

        let mut actual = Vec::new();
        slf.by_index(i)?.read_to_end(&mut actual)?;
        assert_eq!(actual, expected);
    }

    let mut data = Vec::new();
    slf.by_name("TILESETS/0/SMGUNS.STI")?
        .read_to_end(&mut data)?;
    assert_eq!(data, b"STCI small guns");

    Ok(())
}

#[test]
fn listing_is_replayable() -> Result<(), Error> {
    let raw = common::build_slf("Test.slf", FILES)?;
    let slf = SlfArchive::new(Cursor::new(raw))?;

    let first = slf.file_names().collect::<Vec<_>>();
    let second = slf.file_names().collect::<Vec<_>>();
    assert_eq!(first, second);
    assert_eq!(first[1], "tilesets\\0\\smguns.sti");

    Ok(())
}

#[test]
fn case_duplicates_resolve_to_first_stored() -> Result<(), Error> {
    let raw = common::build_slf(
        "Maps.slf",
        &[("Sector.dat", b"lower"), ("SECTOR.DAT", b"upper")],
    )?;
    let slf = SlfArchive::new(Cursor::new(raw))?;

    let picks = (0..10)
        .map(|_| slf.find("sector.dat").map(|e| e.name.to_string()))
        .collect::<Result<Vec<_>, _>>()?;
    assert!(picks.iter().all(|p| p == "Sector.dat"));

    Ok(())
}

#[test]
fn truncated_file_is_malformed() -> Result<(), Error> {
    let mut raw = common::build_slf("Test.slf", FILES)?;
    // cut into the data of the last entry while keeping a plausible table size
    let table = raw.split_off(raw.len() - 4 * 280);
    raw.truncate(540);
    raw.extend(table);

    assert!(matches!(
        SlfArchive::new(Cursor::new(raw)),
        Err(Error::MalformedContainer(_))
    ));

    Ok(())
}

#[test]
fn open_from_disk() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Maps.slf");
    std::fs::write(&path, common::build_slf("Maps.slf", FILES)?)?;

    let mut slf = SlfArchive::open(&path)?;
    let entry = slf.find("a9.DAT")?.clone();
    assert_eq!(slf.read_entry(&entry)?, b"sector a9 map data");

    Ok(())
}
