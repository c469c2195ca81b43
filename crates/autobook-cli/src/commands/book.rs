use crate::BookingArgs;
use anyhow::Result;
use autobook_browser::{CdpDriver, ChromeFinder, LaunchOptions, ProfileManager};
use autobook_core::{BookingConfig, BookingWindow};
use autobook_session::{
    BookingSession, Credentials, Diagnostics, OnePasswordCli, Outcome, SessionContext,
};
use chrono::Local;
use console::style;
use std::path::PathBuf;

/// Browser and diagnostics settings for a run
#[derive(Debug, Clone, Default)]
pub struct BookOptions {
    pub chrome_path: Option<PathBuf>,
    pub profile_dir: Option<PathBuf>,
    pub screenshot_dir: Option<PathBuf>,
    pub headed: bool,
}

pub fn execute(args: &BookingArgs, options: BookOptions) -> Result<()> {
    // Step 1: Validate configuration before touching secrets or the browser
    let config = BookingConfig::from_raw(args.raw_settings())?;

    // Step 2: Credentials
    let secrets = OnePasswordCli::new(config.op_vault.clone())?;
    let credentials = Credentials::fetch(&secrets, &config.op_item)?;

    // Step 3: Booking window
    let window = BookingWindow::compute(&Local::now())?;
    println!("📅 Booking {} ({} - {})", window.date, window.start_ms, window.end_ms);

    let diagnostics = match options.screenshot_dir {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            Diagnostics::new(dir)
        }
        None => Diagnostics::in_temp_dir(),
    };
    tracing::debug!("Diagnostics go to {}", diagnostics.dir().display());

    // Step 4: Browser
    let chrome = ChromeFinder::new(options.chrome_path).find()?;
    let profile = ProfileManager::from_option(options.profile_dir)?;
    let launch = LaunchOptions::new(chrome).headless(!options.headed);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    // Step 5: Sign in and book; the session quits the browser on every path
    let outcome = runtime.block_on(async {
        let driver = CdpDriver::launch(&launch, profile).await?;
        let session = BookingSession::new(
            driver,
            secrets,
            credentials,
            SessionContext::new(&config, window),
        )
        .with_diagnostics(diagnostics);

        let outcome = session.run().await?;
        Ok::<_, anyhow::Error>(outcome)
    })?;

    match &outcome {
        Outcome::Booked { .. } => println!("{} {}", style("✅").green(), outcome),
        Outcome::AlreadyBooked { .. } => println!("{} {}", style("ℹ️").cyan(), outcome),
    }
    Ok(())
}
