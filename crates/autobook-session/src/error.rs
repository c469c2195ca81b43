use crate::AuthState;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication timed out after {waited:?} while {stage}")]
    AuthenticationTimeout { stage: AuthState, waited: Duration },

    #[error("No bookable desk found{}", .page_source.as_ref().map(|p| format!(" (page source saved to {})", p.display())).unwrap_or_default())]
    BookingNotFound { page_source: Option<PathBuf> },

    #[error(transparent)]
    Browser(#[from] autobook_browser::Error),
}

impl From<autobook_core::Error> for Error {
    fn from(err: autobook_core::Error) -> Self {
        Error::Configuration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
