mod common;

use std::fs;

use ja2_install::{
    error::{Error, Result},
    overlay::Overlay,
};
use ja2_slf::SlfArchive;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use common::{snapshot, write_slf};

fn open(dir: &TempDir, name: &str) -> Result<SlfArchive<std::io::BufReader<fs::File>>> {
    SlfArchive::open(&dir.path().join(name)).map_err(|source| Error::Archive {
        name: name.into(),
        source,
    })
}

#[test]
fn copy_all_preserves_structure() -> Result<()> {
    let dir = TempDir::new()?;
    write_slf(
        dir.path(),
        "TileSets.slf",
        &[("0\\tiles.sti", b"tiles"), ("1\\SMITEMS.STI", b"items"), ("readme.txt", b"hi")],
    )?;

    let mut archive = open(&dir, "TileSets.slf")?;
    let out = dir.path().join("TileSets");
    let written = Overlay::mount(&mut archive, &out)?.copy_all()?;

    assert_eq!(written.len(), 3);
    let tree = snapshot(&out);
    assert_eq!(
        tree.keys().collect::<Vec<_>>(),
        vec!["0/tiles.sti", "1/SMITEMS.STI", "readme.txt"]
    );
    assert_eq!(tree["1/SMITEMS.STI"], b"items");

    Ok(())
}

#[test]
fn copying_twice_gives_the_same_tree() -> Result<()> {
    let dir = TempDir::new()?;
    write_slf(
        dir.path(),
        "Maps.slf",
        &[("A9.dat", b"a9"), ("g6_a.dat", b"alternate"), ("radar\\a9.sti", b"r")],
    )?;
    let out = dir.path().join("Maps");

    let mut archive = open(&dir, "Maps.slf")?;
    Overlay::mount(&mut archive, &out)?.copy_all()?;
    Overlay::mount(&mut archive, &out)?.copy_one("g6_A.DAT")?;
    let first = snapshot(&out);

    Overlay::mount(&mut archive, &out)?.copy_all()?;
    Overlay::mount(&mut archive, &out)?.copy_one("g6_A.DAT")?;
    assert_eq!(snapshot(&out), first);

    Ok(())
}

#[test]
fn copy_overwrites_differently_cased_file() -> Result<()> {
    let dir = TempDir::new()?;
    write_slf(dir.path(), "Maps.slf", &[("a9.dat", b"fresh")])?;
    let out = dir.path().join("Maps");
    fs::create_dir(&out)?;
    fs::write(out.join("A9.DAT"), b"stale")?;

    let mut archive = open(&dir, "Maps.slf")?;
    Overlay::mount(&mut archive, &out)?.copy_one("A9.dat")?;

    let tree = snapshot(&out);
    assert_eq!(tree.keys().collect::<Vec<_>>(), vec!["A9.DAT"]);
    assert_eq!(tree["A9.DAT"], b"fresh");

    Ok(())
}

#[test]
fn escaping_entries_are_refused() -> Result<()> {
    let dir = TempDir::new()?;
    write_slf(dir.path(), "Evil.slf", &[("..\\..\\evil.dat", b"x")])?;
    let out = dir.path().join("Evil");

    let mut archive = open(&dir, "Evil.slf")?;
    let result = Overlay::mount(&mut archive, &out)?.copy_all();

    assert!(matches!(result, Err(Error::UnsafeEntryPath(_))));
    assert!(!dir.path().join("evil.dat").exists());

    Ok(())
}

#[test]
fn output_directory_is_created() -> Result<()> {
    let dir = TempDir::new()?;
    write_slf(dir.path(), "Empty.slf", &[])?;
    let out = dir.path().join("nested").join("Empty");

    let mut archive = open(&dir, "Empty.slf")?;
    Overlay::mount(&mut archive, &out)?.copy_all()?;
    assert!(out.is_dir());

    Ok(())
}
