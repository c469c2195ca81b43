use crate::{BookingArgs, OutputFormat};
use anyhow::Result;
use autobook_core::{BookingConfig, BookingWindow};
use chrono::{Local, TimeZone};
use console::style;
use serde::Serialize;

/// What a booking run would do right now
#[derive(Debug, Serialize)]
pub struct Plan {
    pub office_id: String,
    pub floor_id: String,
    #[serde(flatten)]
    pub window: BookingWindow,
    /// Desk setting as given, kept even when it does not parse
    pub preferred_desk_spec: Option<String>,
    pub preferred_desk: Option<String>,
    pub login_url: String,
    pub dashboard_url: String,
}

impl Plan {
    pub fn build<Tz: TimeZone>(config: &BookingConfig, now: &chrono::DateTime<Tz>) -> Result<Self> {
        let window = BookingWindow::compute(now)?;
        let target = &config.target;

        Ok(Self {
            office_id: target.office_id().to_string(),
            floor_id: target.floor_id().to_string(),
            window,
            preferred_desk_spec: config.preferred_desk_spec.clone(),
            preferred_desk: config.preferred_desk.as_ref().map(|desk| desk.to_string()),
            login_url: target.login_url()?.to_string(),
            dashboard_url: target.dashboard_url(&window)?.to_string(),
        })
    }
}

/// Print the booking window and dashboard URL without starting a browser
pub fn execute(args: &BookingArgs, format: OutputFormat) -> Result<()> {
    let config = BookingConfig::from_raw(args.raw_settings())?;
    let plan = Plan::build(&config, &Local::now())?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
        OutputFormat::Pretty => print_pretty(&plan),
    }
    Ok(())
}

fn print_pretty(plan: &Plan) {
    println!("{}", style("📅 Booking plan").bold());
    println!("   Date:      {}", plan.window.date);
    println!("   Window:    {} - {} (epoch ms)", plan.window.start_ms, plan.window.end_ms);
    println!("   Office:    {}", plan.office_id);
    println!("   Floor:     {}", plan.floor_id);
    match (&plan.preferred_desk, &plan.preferred_desk_spec) {
        (Some(desk), _) => println!("   Desk:      {}", desk),
        (None, Some(spec)) => println!(
            "   Desk:      first available ({} '{}' not understood)",
            style("⚠️").yellow(),
            spec
        ),
        (None, None) => println!("   Desk:      first available"),
    }
    println!("   Login:     {}", plan.login_url);
    println!("   Dashboard: {}", plan.dashboard_url);
}
