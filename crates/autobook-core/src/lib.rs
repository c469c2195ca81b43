pub mod booking_url;
pub mod config;
pub mod desk;
pub mod env;
pub mod error;
pub mod window;

pub use booking_url::BookingTarget;
pub use config::{BookingConfig, RawSettings};
pub use desk::DeskDescriptor;
pub use error::{Error, Result};
pub use window::BookingWindow;
