use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Browser user-data directory for one session
pub struct ProfileManager {
    path: PathBuf,
    is_temporary: bool,
}

impl ProfileManager {
    /// A fresh profile that is deleted on drop
    pub fn temporary() -> Result<Self> {
        let temp_dir = tempfile::Builder::new()
            .prefix("autobook-profile-")
            .tempdir()
            .map_err(Error::Io)?;

        Ok(Self {
            path: temp_dir.keep(),
            is_temporary: true,
        })
    }

    /// A profile kept between runs, so identity-provider cookies survive
    pub fn persistent(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            std::fs::create_dir_all(&path)?;
        }

        Ok(Self {
            path,
            is_temporary: false,
        })
    }

    /// Temporary unless a persistent location is given
    pub fn from_option(path: Option<PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::persistent(path),
            None => Self::temporary(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_temporary(&self) -> bool {
        self.is_temporary
    }
}

impl Drop for ProfileManager {
    fn drop(&mut self) {
        if self.is_temporary && self.path.exists() {
            if let Err(e) = std::fs::remove_dir_all(&self.path) {
                tracing::debug!("Could not remove profile {}: {}", self.path.display(), e);
            }
        }
    }
}
