use crate::selectors;
use autobook_browser::{BrowserDriver, Requirement, Waiter};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FullDayOutcome {
    AlreadyOn,
    Enabled,
    /// No toggle in the booking dialog; the dashboard URL presets full day
    NotFound,
    /// The toggle was there but could not be read or clicked
    Failed(String),
}

/// Make sure the booking dialog's full-day checkbox is ticked.
///
/// Never fails: every problem is reported through the outcome.
pub async fn ensure_full_day<D>(waiter: &Waiter<'_, D>, timeout: Duration) -> FullDayOutcome
where
    D: BrowserDriver + ?Sized,
{
    let driver = waiter.driver();
    let Some(toggle) = waiter
        .chain(&selectors::FULL_DAY_TOGGLE, Requirement::Present, timeout)
        .await
        .into_element()
    else {
        tracing::info!("No full-day toggle found, keeping the dialog defaults");
        return FullDayOutcome::NotFound;
    };

    let outcome = match driver.is_checked(&toggle).await {
        Ok(true) => FullDayOutcome::AlreadyOn,
        Ok(false) => match driver.click(&toggle).await {
            Ok(()) => FullDayOutcome::Enabled,
            Err(e) => FullDayOutcome::Failed(e.to_string()),
        },
        Err(e) => FullDayOutcome::Failed(e.to_string()),
    };

    match &outcome {
        FullDayOutcome::Failed(reason) => tracing::warn!("Could not set full day: {}", reason),
        other => tracing::info!("Full day: {:?}", other),
    }
    outcome
}
