use std::{
    ffi::OsString,
    fs::{self, File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use log::debug;

use crate::{Error, MAX_PATH_LEN, Result, TMP_EXTENSION};

/// A save-state file on disk.
///
/// The path is validated once on construction. Writes never leave a partially
/// written file at the target path: data lands in a sibling temporary file
/// that is synced and then renamed over the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    /// Wraps `path` after checking it is non-empty and at most [`MAX_PATH_LEN`] bytes.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        Self::validate(&path)?;
        Ok(Self { path })
    }

    /// Checks the path bounds without constructing a `StateFile`.
    pub fn validate(path: &Path) -> Result<()> {
        let len = path.as_os_str().len();
        if len == 0 {
            return Err(Error::EmptyPath);
        }
        if len > MAX_PATH_LEN {
            return Err(Error::PathTooLong {
                len,
                max: MAX_PATH_LEN,
            });
        }
        Ok(())
    }

    /// Returns true if the path names an existing regular file.
    #[inline]
    pub fn is_valid(&self) -> bool {
        Self::exists(&self.path)
    }

    /// Same as [`StateFile::is_valid`] for an unwrapped path.
    #[inline]
    pub fn exists(path: &Path) -> bool {
        path.is_file()
    }

    /// Reads the whole file.
    pub fn read(&self) -> Result<Vec<u8>> {
        let data = fs::read(&self.path)?;
        debug!("Read {} bytes from {:?}", data.len(), self.path);
        Ok(data)
    }

    /// Replaces the file content with `data`.
    ///
    /// Missing parent directories are created. The previous content stays
    /// intact until the final rename succeeds.
    pub fn write(&self, data: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.tmp_path();
        let written = Self::write_synced(&tmp, data);
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        debug!("Wrote {} bytes to {:?}", data.len(), tmp);

        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        debug!("Renamed {:?} to {:?}", tmp, self.path);

        Ok(())
    }

    fn write_synced(path: &Path, data: &[u8]) -> Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.write_all(data)?;
        file.sync_all()?;
        Ok(())
    }

    /// Returns the current length of the file in bytes.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> Result<u64> {
        Ok(File::open(&self.path)?.metadata()?.len())
    }

    /// Path of the temporary file used by [`StateFile::write`].
    pub fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(".");
        name.push(TMP_EXTENSION);
        self.path.with_file_name(name)
    }

    #[inline(always)]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AsRef<Path> for StateFile {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}
