// Browser driver abstraction and its Chrome DevTools Protocol backend

mod cdp_driver;
mod chain;
mod chrome_finder;
mod driver;
mod error;
mod launcher;
mod locator;
mod profile;
mod wait;

#[cfg(any(test, feature = "test-util"))]
pub mod fake;

pub use cdp_driver::{CdpDriver, CdpElement};
pub use chain::{ChainMatch, Requirement, SelectorChain};
pub use chrome_finder::ChromeFinder;
pub use driver::{BrowserDriver, WindowHandle};
pub use error::{Error, Result};
pub use launcher::LaunchOptions;
pub use locator::Locator;
pub use profile::ProfileManager;
pub use wait::{DEFAULT_POLL_INTERVAL, Waiter};
