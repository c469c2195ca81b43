use crate::auth::AuthMachine;
use crate::desk_matcher::{DeskMatcher, DeskSelection};
use crate::detector;
use crate::diagnostics::{Diagnostics, Stage};
use crate::full_day::{FullDayOutcome, ensure_full_day};
use crate::secrets::{Credentials, SecretStore};
use crate::{Error, Result, Timeouts};
use autobook_browser::{BrowserDriver, Waiter};
use autobook_core::{BookingConfig, BookingTarget, BookingWindow, DeskDescriptor};
use chrono::NaiveDate;
use std::fmt;

/// What one booking run works on
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Secret-store item holding the login
    pub op_item: String,
    pub target: BookingTarget,
    pub preferred_desk: Option<DeskDescriptor>,
    pub window: BookingWindow,
}

impl SessionContext {
    pub fn new(config: &BookingConfig, window: BookingWindow) -> Self {
        Self {
            op_item: config.op_item.clone(),
            target: config.target.clone(),
            preferred_desk: config.preferred_desk.clone(),
            window,
        }
    }
}

/// How a successful run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Booked {
        date: NaiveDate,
        desk: DeskSelection,
        full_day: FullDayOutcome,
    },
    AlreadyBooked {
        date: NaiveDate,
    },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Booked { date, desk, .. } => write!(f, "Booked {} for {}", desk, date),
            Outcome::AlreadyBooked { date } => write!(f, "Already booked for {}", date),
        }
    }
}

/// One unattended pass: sign in, open the dashboard, book, shut down.
///
/// The session owns the browser and quits it when [`BookingSession::run`]
/// returns, whatever the result.
pub struct BookingSession<D: BrowserDriver, S: SecretStore> {
    driver: D,
    secrets: S,
    credentials: Credentials,
    context: SessionContext,
    timeouts: Timeouts,
    diagnostics: Diagnostics,
}

impl<D: BrowserDriver, S: SecretStore> BookingSession<D, S> {
    pub fn new(driver: D, secrets: S, credentials: Credentials, context: SessionContext) -> Self {
        Self {
            driver,
            secrets,
            credentials,
            context,
            timeouts: Timeouts::default(),
            diagnostics: Diagnostics::in_temp_dir(),
        }
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Run the booking and release the browser
    pub async fn run(&self) -> Result<Outcome> {
        let result = self.book().await;

        if let Err(e) = &result {
            tracing::error!("Booking failed: {}", e);
            if let Some(path) = self.diagnostics.screenshot(&self.driver, Stage::Error).await {
                tracing::info!("Error screenshot saved to {}", path.display());
            }
        }

        if let Err(e) = self.driver.quit().await {
            tracing::warn!("Browser did not shut down cleanly: {}", e);
        }

        result
    }

    async fn book(&self) -> Result<Outcome> {
        let driver = &self.driver;
        let context = &self.context;
        let date = context.window.date;

        tracing::info!(
            "Booking {} in office {}, floor {}",
            date,
            context.target.office_id(),
            context.target.floor_id()
        );

        let mut auth = AuthMachine::new(
            driver,
            &self.secrets,
            &context.op_item,
            &self.credentials,
            &context.target,
        )
        .with_timeouts(self.timeouts.clone())
        .with_diagnostics(self.diagnostics.clone());
        auth.run().await?;

        let dashboard = context.target.dashboard_url(&context.window)?;
        tracing::info!("Opening booking dashboard for {}", date);
        tracing::debug!("Dashboard URL: {}", dashboard);
        driver.goto(dashboard.as_str()).await?;
        self.diagnostics.screenshot(driver, Stage::Dashboard).await;

        let waiter = Waiter::new(driver).with_poll_interval(self.timeouts.poll);

        let state = detector::detect(&waiter, self.timeouts.booking_state).await;
        if !state.should_book() {
            return Ok(Outcome::AlreadyBooked { date });
        }

        let selection = DeskMatcher::new(&waiter, &self.timeouts)
            .select(context.preferred_desk.as_ref())
            .await?;

        let Some(desk) = selection else {
            tracing::error!("No quick book button found");
            let page_source = self.diagnostics.dump_page_source(driver).await;
            return Err(Error::BookingNotFound { page_source });
        };

        let full_day = ensure_full_day(&waiter, self.timeouts.full_day).await;

        tokio::time::sleep(self.timeouts.settle).await;
        self.diagnostics.screenshot(driver, Stage::Booked).await;

        Ok(Outcome::Booked {
            date,
            desk,
            full_day,
        })
    }
}
