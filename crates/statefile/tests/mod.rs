use statefile::{Error, MAX_PATH_LEN, Result, StateFile};
use std::fs;
use tempfile::TempDir;

/// Helper to create a state file inside a fresh temporary directory
fn setup_state_file(name: &str) -> Result<(StateFile, TempDir)> {
    let temp_dir = TempDir::new()?;
    let file = StateFile::new(temp_dir.path().join(name))?;
    Ok((file, temp_dir))
}

#[test]
fn test_missing_file_is_not_valid() -> Result<()> {
    let (file, _temp) = setup_state_file("slot0.state")?;

    assert!(!file.is_valid());
    assert!(file.read().is_err());

    Ok(())
}

#[test]
fn test_directory_is_not_valid() -> Result<()> {
    let temp = TempDir::new()?;
    let file = StateFile::new(temp.path())?;

    assert!(!file.is_valid());

    Ok(())
}

#[test]
fn test_write_then_read() -> Result<()> {
    let (file, _temp) = setup_state_file("slot0.state")?;

    file.write(b"Hello, State!")?;

    assert!(file.is_valid());
    assert_eq!(file.read()?, b"Hello, State!");
    assert_eq!(file.len()?, 13);

    Ok(())
}

#[test]
fn test_write_replaces_content() -> Result<()> {
    let (file, _temp) = setup_state_file("slot0.state")?;

    file.write(&[1u8; 4096])?;
    file.write(b"short")?;

    // Must not keep the tail of the longer write
    assert_eq!(file.read()?, b"short");

    Ok(())
}

#[test]
fn test_write_leaves_no_tmp_file() -> Result<()> {
    let (file, temp) = setup_state_file("slot0.state")?;

    file.write(b"data")?;

    assert!(!file.tmp_path().exists());
    let entries: Vec<_> = fs::read_dir(temp.path())?.collect::<Result<_, _>>()?;
    assert_eq!(entries.len(), 1);

    Ok(())
}

#[test]
fn test_write_creates_parent_dirs() -> Result<()> {
    let temp = TempDir::new()?;
    let file = StateFile::new(temp.path().join("a").join("b").join("slot1.state"))?;

    file.write(b"nested")?;

    assert_eq!(file.read()?, b"nested");

    Ok(())
}

#[test]
fn test_write_empty() -> Result<()> {
    let (file, _temp) = setup_state_file("empty.state")?;

    file.write(&[])?;

    assert!(file.is_valid());
    assert_eq!(file.len()?, 0);

    Ok(())
}

#[test]
fn test_path_validation() {
    assert!(matches!(StateFile::new(""), Err(Error::EmptyPath)));

    let too_long = "s".repeat(MAX_PATH_LEN + 10);
    match StateFile::new(too_long) {
        Err(Error::PathTooLong { len, max }) => {
            assert_eq!(len, MAX_PATH_LEN + 10);
            assert_eq!(max, MAX_PATH_LEN);
        }
        other => panic!("expected PathTooLong, got {other:?}"),
    }
}

#[test]
fn test_exists_matches_is_valid() -> Result<()> {
    let (file, _temp) = setup_state_file("slot0.state")?;

    assert_eq!(StateFile::exists(file.path()), file.is_valid());
    file.write(b"x")?;
    assert!(StateFile::exists(file.path()));

    Ok(())
}
