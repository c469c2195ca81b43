use autobook_browser::DEFAULT_POLL_INTERVAL;
use std::time::Duration;

/// Bounded wait for each stage of a booking run
#[derive(Debug, Clone)]
pub struct Timeouts {
    pub login_page: Duration,
    pub sign_in_button: Duration,
    pub sso_button: Duration,
    pub popup_open: Duration,
    pub idp_email: Duration,
    /// "Next" and "Sign in" on the identity provider
    pub idp_button: Duration,
    pub idp_password: Duration,
    pub second_factor: Duration,
    pub verify_button: Duration,
    pub consent: Duration,
    pub popup_close: Duration,
    pub authenticated: Duration,
    pub booking_state: Duration,
    pub my_spaces: Duration,
    pub quick_book: Duration,
    pub full_day: Duration,
    /// Pause after booking so the request completes before teardown
    pub settle: Duration,
    pub poll: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            login_page: Duration::from_secs(10),
            sign_in_button: Duration::from_secs(3),
            sso_button: Duration::from_secs(10),
            popup_open: Duration::from_secs(5),
            idp_email: Duration::from_secs(10),
            idp_button: Duration::from_secs(5),
            idp_password: Duration::from_secs(10),
            second_factor: Duration::from_secs(10),
            verify_button: Duration::from_secs(5),
            consent: Duration::from_secs(5),
            popup_close: Duration::from_secs(30),
            authenticated: Duration::from_secs(60),
            booking_state: Duration::from_secs(10),
            my_spaces: Duration::from_secs(10),
            quick_book: Duration::from_secs(15),
            full_day: Duration::from_secs(5),
            settle: Duration::from_secs(3),
            poll: DEFAULT_POLL_INTERVAL,
        }
    }
}
