use autobook_browser::BrowserDriver;
use std::path::{Path, PathBuf};

/// Points in the run where a screenshot is taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Login,
    IdentityProvider,
    Authenticated,
    Dashboard,
    Booked,
    Error,
}

impl Stage {
    fn file_stem(&self) -> &'static str {
        match self {
            Stage::Login => "login",
            Stage::IdentityProvider => "idp",
            Stage::Authenticated => "authenticated",
            Stage::Dashboard => "dashboard",
            Stage::Booked => "booked",
            Stage::Error => "error",
        }
    }
}

/// Best-effort screenshots and page dumps for post-mortem debugging.
///
/// Failures are logged and never affect the run.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    dir: PathBuf,
}

impl Diagnostics {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write into the system temp directory
    pub fn in_temp_dir() -> Self {
        Self::new(std::env::temp_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn screenshot_path(&self, stage: Stage) -> PathBuf {
        self.dir.join(format!("autobook_{}.png", stage.file_stem()))
    }

    pub fn page_source_path(&self) -> PathBuf {
        self.dir.join("autobook_page_source.html")
    }

    pub async fn screenshot<D>(&self, driver: &D, stage: Stage) -> Option<PathBuf>
    where
        D: BrowserDriver + ?Sized,
    {
        let path = self.screenshot_path(stage);
        match driver.screenshot(&path).await {
            Ok(()) => {
                tracing::debug!("Screenshot saved to {}", path.display());
                Some(path)
            }
            Err(e) => {
                tracing::warn!("Could not take {:?} screenshot: {}", stage, e);
                None
            }
        }
    }

    /// Save the current page's HTML
    pub async fn dump_page_source<D>(&self, driver: &D) -> Option<PathBuf>
    where
        D: BrowserDriver + ?Sized,
    {
        let source = match driver.page_source().await {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!("Could not read page source: {}", e);
                return None;
            }
        };

        let path = self.page_source_path();
        match std::fs::write(&path, source) {
            Ok(()) => {
                tracing::info!("Page source saved to {}", path.display());
                Some(path)
            }
            Err(e) => {
                tracing::warn!("Could not write {}: {}", path.display(), e);
                None
            }
        }
    }
}
