use crate::{Error, Result};
use chromiumoxide::browser::BrowserConfig;
use std::path::{Path, PathBuf};

const WINDOW_WIDTH: u32 = 1920;
const WINDOW_HEIGHT: u32 = 1080;

/// How to start the browser for a booking run
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub chrome_path: PathBuf,
    pub headless: bool,
}

impl LaunchOptions {
    pub fn new(chrome_path: PathBuf) -> Self {
        Self {
            chrome_path,
            headless: true,
        }
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Extra command-line switches on top of chromiumoxide's defaults
    fn build_args(&self) -> Vec<String> {
        vec![
            "--disable-dev-shm-usage".to_string(),
            "--disable-gpu".to_string(),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
        ]
    }

    /// chromiumoxide configuration using `profile` as the user-data dir
    pub fn browser_config(&self, profile: &Path) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .chrome_executable(&self.chrome_path)
            .user_data_dir(profile)
            .no_sandbox()
            .window_size(WINDOW_WIDTH, WINDOW_HEIGHT)
            .args(self.build_args());

        if !self.headless {
            builder = builder.with_head();
        }

        builder
            .build()
            .map_err(|e| Error::Browser(format!("Invalid browser configuration: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_args() {
        let options = LaunchOptions::new(PathBuf::from("/usr/bin/chromium"));
        let args = options.build_args();

        assert!(args.contains(&"--disable-dev-shm-usage".to_string()));
        assert!(args.contains(&"--disable-gpu".to_string()));
        assert!(args.contains(&"--no-first-run".to_string()));
    }

    #[test]
    fn test_headless_by_default() {
        let options = LaunchOptions::new(PathBuf::from("/usr/bin/chromium"));
        assert!(options.headless);
        assert!(!options.headless(false).headless);
    }

    #[test]
    fn test_browser_config_builds() {
        let profile = tempfile::tempdir().unwrap();
        let options = LaunchOptions::new(PathBuf::from("/usr/bin/chromium"));

        assert!(options.browser_config(profile.path()).is_ok());
    }
}
