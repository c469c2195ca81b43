use crate::selectors;
use autobook_browser::{BrowserDriver, ChainMatch, Requirement, Waiter};
use std::time::Duration;
use tokio::time::Instant;

/// Whether the dashboard already shows a booking for the day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingState {
    /// The "no bookings" marker is shown
    Free,
    /// A booking card is shown
    AlreadyBooked,
    /// Neither marker appeared in time
    Inconclusive,
}

impl BookingState {
    /// Only a visible booking stops a new one; inconclusive pages are booked
    pub fn should_book(&self) -> bool {
        !matches!(self, BookingState::AlreadyBooked)
    }
}

/// Classify the booking dashboard.
///
/// Each poll checks the "no bookings" marker before the booking-card marker,
/// so a page showing both counts as free.
pub async fn detect<D>(waiter: &Waiter<'_, D>, timeout: Duration) -> BookingState
where
    D: BrowserDriver + ?Sized,
{
    let driver = waiter.driver();
    let deadline = Instant::now() + timeout;

    loop {
        if selectors::NO_BOOKINGS_MARKER
            .resolve(driver, None, Requirement::Present)
            .await
            .is_found()
        {
            tracing::info!("No booking yet for this day");
            return BookingState::Free;
        }

        if let ChainMatch::Found { element, .. } = selectors::BOOKING_CARD_MARKER
            .resolve(driver, None, Requirement::Present)
            .await
        {
            match driver.inner_text(&element).await {
                Ok(text) if !text.trim().is_empty() => {
                    tracing::info!("A desk is already booked for this day: {}", text.trim())
                }
                _ => tracing::info!("A desk is already booked for this day"),
            }
            return BookingState::AlreadyBooked;
        }

        if Instant::now() >= deadline {
            tracing::warn!("Could not tell whether a desk is already booked, booking anyway");
            return BookingState::Inconclusive;
        }
        tokio::time::sleep(waiter.poll_interval()).await;
    }
}
