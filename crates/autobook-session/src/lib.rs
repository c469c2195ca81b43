// Microsoft SSO login and desk booking against the Deskbird web app

pub mod auth;
pub mod desk_matcher;
pub mod detector;
pub mod diagnostics;
pub mod error;
pub mod full_day;
pub mod secrets;
pub mod selectors;
pub mod session;
pub mod timeouts;

pub use auth::{AuthMachine, AuthState, ConsentOutcome};
pub use desk_matcher::{DeskMatcher, DeskSelection};
pub use detector::BookingState;
pub use diagnostics::{Diagnostics, Stage};
pub use error::{Error, Result};
pub use full_day::FullDayOutcome;
pub use secrets::{Credentials, OnePasswordCli, SecretStore, StaticSecrets};
pub use session::{BookingSession, Outcome, SessionContext};
pub use timeouts::Timeouts;
